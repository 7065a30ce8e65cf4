//! Data model for a symbolic score handed to the compiler.
//!
//! These structures are built by an authoring layer and are read-only as
//! far as compilation is concerned.

use serde::{Deserialize, Serialize};

use crate::catalog::{DrumNote, NoteDuration};

/// A complete score: an ordered list of instrument tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Title of the piece
    #[serde(default)]
    pub title: Option<String>,
    /// Tracks in playback order
    pub tracks: Vec<Track>,
}

/// One instrument line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track name, written as the MIDI track name when present
    #[serde(default)]
    pub name: Option<String>,
    pub instrument: Instrument,
    /// Ordered list of bars
    pub bars: Vec<Bar>,
}

/// The instrument a track is played with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Instrument {
    /// A General MIDI program (0..=127)
    Melodic { program: u8 },
    /// The percussion kit
    Percussion,
}

/// The two disjoint channel pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    Melodic,
    Percussion,
}

/// A single bar (measure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Optional label used in diagnostics
    #[serde(default)]
    pub name: Option<String>,
    /// Tempo in beats per minute
    pub tempo: u32,
    /// Number of quarter notes the bar spans
    pub resolution: u32,
    /// Notes and rests in this bar
    pub notes: Vec<Note>,
}

/// A single note or rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch (None if this is a rest)
    pub pitch: Option<u8>,
    pub duration: NoteDuration,
}

impl Score {
    /// Create a new empty score.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        Self { title: None, tracks }
    }
}

impl Track {
    pub fn melodic(program: u8, bars: Vec<Bar>) -> Self {
        Self {
            name: None,
            instrument: Instrument::Melodic { program },
            bars,
        }
    }

    pub fn percussion(bars: Vec<Bar>) -> Self {
        Self {
            name: None,
            instrument: Instrument::Percussion,
            bars,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Instrument {
    pub fn class(&self) -> InstrumentClass {
        match self {
            Instrument::Melodic { .. } => InstrumentClass::Melodic,
            Instrument::Percussion => InstrumentClass::Percussion,
        }
    }

    /// The program number, for melodic instruments only.
    pub fn program(&self) -> Option<u8> {
        match self {
            Instrument::Melodic { program } => Some(*program),
            Instrument::Percussion => None,
        }
    }
}

impl std::fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentClass::Melodic => f.write_str("melodic"),
            InstrumentClass::Percussion => f.write_str("percussion"),
        }
    }
}

impl Bar {
    /// An empty bar.
    pub fn new(tempo: u32, resolution: u32) -> Self {
        Self {
            name: None,
            tempo,
            resolution,
            notes: Vec::new(),
        }
    }

    pub fn with_notes(tempo: u32, resolution: u32, notes: Vec<Note>) -> Self {
        Self {
            notes,
            ..Self::new(tempo, resolution)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn push(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Insert a note before `position`; a position past the end appends.
    pub fn insert_note(&mut self, position: usize, note: Note) {
        let position = position.min(self.notes.len());
        self.notes.insert(position, note);
    }

    /// Replace the note at `position`, returning the old one.
    pub fn replace_note(&mut self, position: usize, note: Note) -> Option<Note> {
        self.notes
            .get_mut(position)
            .map(|slot| std::mem::replace(slot, note))
    }

    /// Remove notes `start..=end` (or just `start` when `end` is `None`).
    /// An end before the start removes nothing; an end past the last note
    /// stops at the last note.
    pub fn remove_notes(&mut self, start: usize, end: Option<usize>) -> Vec<Note> {
        let end = end.unwrap_or(start);
        if end < start || start >= self.notes.len() {
            return Vec::new();
        }
        let end = end.min(self.notes.len() - 1);
        self.notes.drain(start..=end).collect()
    }

    /// Total notated length in sixteenth notes.
    pub fn total_sixteenths(&self) -> u64 {
        self.notes
            .iter()
            .map(|n| u64::from(n.duration.sixteenths()))
            .sum()
    }
}

impl Note {
    pub fn new(pitch: u8, duration: NoteDuration) -> Self {
        Self {
            pitch: Some(pitch),
            duration,
        }
    }

    pub fn rest(duration: NoteDuration) -> Self {
        Self {
            pitch: None,
            duration,
        }
    }

    pub fn drum(drum: DrumNote, duration: NoteDuration) -> Self {
        Self::new(drum.pitch(), duration)
    }
}
