//! Score-to-timeline compilation.
//!
//! Runs in two passes: the global resolution is computed over the whole
//! score first, then each track is walked bar by bar and note by note
//! with a tick cursor, emitting absolute-tick events.
//!
//! All mutable state lives in a [`CompileContext`] owned by the caller and
//! a per-track [`TrackCursor`], so independent compiles never share state.

use tracing::{debug, warn};

use crate::channel::ChannelAllocator;
use crate::config::{CompilerOptions, NoteOffPlacement, FIRST_TICK, NOTE_VELOCITY};
use crate::error::{CompileError, EmptyScoreReason};
use crate::model::{Bar, Instrument, Note, Score, Track};
use crate::resolution::{global_resolution, tick_multiplier};
use crate::timeline::{EventKind, Timeline, TrackEvents};
use crate::validate::check_bar;

/// Highest valid MIDI data byte (program, pitch).
const MAX_DATA_BYTE: u8 = 127;

/// State shared by every track of one compile call.
#[derive(Debug)]
pub struct CompileContext<'a> {
    pub options: &'a CompilerOptions,
    /// Global resolution (ticks per quarter note)
    pub resolution: u32,
    pub channels: ChannelAllocator,
}

/// Position of the walk within one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackCursor {
    pub tick: u64,
    /// Last tempo seen in this track
    pub tempo: u32,
    /// Resolution of the bar being compiled
    pub resolution: u32,
}

impl TrackCursor {
    fn new(tempo: u32) -> Self {
        Self {
            tick: FIRST_TICK,
            tempo,
            resolution: 4,
        }
    }
}

/// Compile a score into a timeline.
///
/// Fails without partial output if the score is empty, a channel pool is
/// exhausted, or any bar's notes do not fill its resolution.
pub fn compile(score: &Score, options: &CompilerOptions) -> Result<Timeline, CompileError> {
    compile_score(score, options).map_err(|e| {
        warn!(error = %e, "compilation failed");
        e
    })
}

fn compile_score(score: &Score, options: &CompilerOptions) -> Result<Timeline, CompileError> {
    check_not_empty(score)?;
    if options.initial_tempo == 0 {
        return Err(CompileError::ZeroInitialTempo);
    }

    let resolution = global_resolution(score)?;
    debug!(resolution, tracks = score.tracks.len(), "global resolution");

    let mut ctx = CompileContext::new(options, resolution);
    let tracks = score
        .tracks
        .iter()
        .enumerate()
        .map(|(index, track)| ctx.compile_track(index, track))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Timeline {
        resolution,
        initial_tempo: options.initial_tempo,
        tracks,
    })
}

/// Reject scores with no tracks, or whose first track has no bars.
pub fn check_not_empty(score: &Score) -> Result<(), CompileError> {
    let first = score
        .tracks
        .first()
        .ok_or(CompileError::EmptyScore(EmptyScoreReason::NoTracks))?;
    if first.bars.is_empty() {
        return Err(CompileError::EmptyScore(EmptyScoreReason::NoBarsInFirstTrack));
    }
    Ok(())
}

impl<'a> CompileContext<'a> {
    pub fn new(options: &'a CompilerOptions, resolution: u32) -> Self {
        Self {
            options,
            resolution,
            channels: ChannelAllocator::new(),
        }
    }

    /// Allocate a channel for `track` and compile all of its bars.
    pub fn compile_track(&mut self, index: usize, track: &Track) -> Result<TrackEvents, CompileError> {
        let class = track.instrument.class();
        let channel = self.channels.allocate(index, class)?;
        let mut events = TrackEvents::new(index, track.name.clone(), channel, class);
        let mut cursor = TrackCursor::new(self.options.initial_tempo);

        if let Instrument::Melodic { program } = track.instrument {
            if program > MAX_DATA_BYTE {
                return Err(CompileError::InvalidProgram {
                    track: index,
                    program,
                });
            }
            events.insert(cursor.tick, EventKind::ProgramChange { program });
        }

        for (bar_index, bar) in track.bars.iter().enumerate() {
            self.compile_bar(index, bar_index, bar, &mut cursor, &mut events)?;
        }

        events.end_tick = cursor.tick;
        debug!(
            track = index,
            channel,
            bars = track.bars.len(),
            notes = events.note_count(),
            end_tick = cursor.tick,
            last_resolution = cursor.resolution,
            "compiled track"
        );
        Ok(events)
    }

    /// Emit a tempo change if needed, validate the bar, then compile its notes.
    pub fn compile_bar(
        &self,
        track: usize,
        bar_index: usize,
        bar: &Bar,
        cursor: &mut TrackCursor,
        events: &mut TrackEvents,
    ) -> Result<(), CompileError> {
        if bar.tempo == 0 {
            return Err(CompileError::ZeroTempo {
                track,
                bar: bar_index,
            });
        }
        if bar.tempo != cursor.tempo {
            events.insert(cursor.tick, EventKind::TempoChange { bpm: bar.tempo });
            cursor.tempo = bar.tempo;
        }
        cursor.resolution = bar.resolution;

        check_bar(track, bar_index, bar)?;

        let multiplier = tick_multiplier(self.resolution, bar.resolution);
        for (note_index, note) in bar.notes.iter().enumerate() {
            if let Some(pitch) = note.pitch.filter(|p| *p > MAX_DATA_BYTE) {
                return Err(CompileError::InvalidPitch {
                    track,
                    bar: bar_index,
                    note: note_index,
                    pitch,
                });
            }
            self.compile_note(note, multiplier, cursor, events);
        }
        Ok(())
    }

    /// Advance the cursor over one note or rest.
    ///
    /// A rest moves the cursor by its length plus one tick.  A pitched note
    /// emits note-on at the cursor, moves the cursor by its length, emits
    /// note-off per [`NoteOffPlacement`], then leaves a one-tick gap.
    pub fn compile_note(
        &self,
        note: &Note,
        multiplier: u64,
        cursor: &mut TrackCursor,
        events: &mut TrackEvents,
    ) {
        let length = u64::from(note.duration.sixteenths()) * multiplier;

        let Some(pitch) = note.pitch else {
            cursor.tick += length + 1;
            return;
        };

        events.insert(
            cursor.tick,
            EventKind::NoteOn {
                pitch,
                velocity: NOTE_VELOCITY,
            },
        );
        cursor.tick += length;

        let off_tick = match self.options.note_off {
            NoteOffPlacement::Doubled => cursor.tick + length,
            NoteOffPlacement::NominalEnd => cursor.tick,
        };
        events.insert(
            off_tick,
            EventKind::NoteOff {
                pitch,
                velocity: NOTE_VELOCITY,
            },
        );

        cursor.tick += 1;
    }
}
