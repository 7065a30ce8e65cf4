//! Compiled output: absolute-tick events grouped per track.

use serde::Serialize;

use crate::model::InstrumentClass;

/// Payload of a compiled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EventKind {
    ProgramChange { program: u8 },
    NoteOn { pitch: u8, velocity: u8 },
    NoteOff { pitch: u8, velocity: u8 },
    TempoChange { bpm: u32 },
}

/// A single event on the absolute timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompiledEvent {
    /// Absolute tick from the start of the sequence
    pub tick: u64,
    /// Channel of the owning track; tempo changes carry it for bookkeeping
    pub channel: u8,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Events compiled from one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackEvents {
    /// Position of the track in the score
    pub index: usize,
    pub name: Option<String>,
    pub channel: u8,
    pub class: InstrumentClass,
    /// Events in non-decreasing tick order
    pub events: Vec<CompiledEvent>,
    /// Tick cursor after the last note or rest
    pub end_tick: u64,
}

/// The full compiled sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// Ticks per quarter note
    pub resolution: u32,
    /// Tempo in effect before the first tempo change
    pub initial_tempo: u32,
    pub tracks: Vec<TrackEvents>,
}

impl EventKind {
    /// Pitch for note events.
    pub fn pitch(&self) -> Option<u8> {
        match self {
            EventKind::NoteOn { pitch, .. } | EventKind::NoteOff { pitch, .. } => Some(*pitch),
            _ => None,
        }
    }
}

/// Microseconds per quarter note at the given tempo, or `None` at 0 bpm.
pub fn micros_per_quarter(bpm: u32) -> Option<u32> {
    60_000_000u32.checked_div(bpm)
}

impl TrackEvents {
    pub fn new(index: usize, name: Option<String>, channel: u8, class: InstrumentClass) -> Self {
        Self {
            index,
            name,
            channel,
            class,
            events: Vec::new(),
            end_tick: 0,
        }
    }

    /// Insert an event in tick order.  An event at a tick already present
    /// goes after the existing events at that tick.
    pub fn insert(&mut self, tick: u64, kind: EventKind) {
        let event = CompiledEvent {
            tick,
            channel: self.channel,
            kind,
        };
        tracing::trace!(track = self.index, tick, ?kind, "event");
        let pos = self.events.partition_point(|e| e.tick <= tick);
        self.events.insert(pos, event);
    }

    /// Tick of the last event, if any.
    pub fn last_tick(&self) -> Option<u64> {
        self.events.last().map(|e| e.tick)
    }

    pub fn note_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::NoteOn { .. }))
            .count()
    }
}

impl Timeline {
    /// Every event across all tracks ordered by tick; ties keep track order.
    pub fn merged(&self) -> Vec<CompiledEvent> {
        let mut all: Vec<CompiledEvent> = self
            .tracks
            .iter()
            .flat_map(|t| t.events.iter().copied())
            .collect();
        all.sort_by_key(|e| e.tick);
        all
    }

    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(|t| t.events.len()).sum()
    }

    /// Tick of the last event in any track.
    pub fn last_tick(&self) -> u64 {
        self.tracks
            .iter()
            .filter_map(TrackEvents::last_tick)
            .max()
            .unwrap_or(0)
    }
}
