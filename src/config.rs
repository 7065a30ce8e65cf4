//! Compiler configuration and fixed protocol constants.

use serde::{Deserialize, Serialize};

/// Velocity used for every note-on and note-off.
pub const NOTE_VELOCITY: u8 = 60;

/// Channel shared by percussion tracks first; melodic tracks skip it.
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Highest channel in the 16-channel protocol.
pub const MAX_CHANNEL: u8 = 15;

/// Tempo assumed before any bar sets one.
pub const DEFAULT_TEMPO: u32 = 120;

/// Tick of the first event in every track.  Tick 0 is left free so the
/// program change always precedes the first note.
pub const FIRST_TICK: u64 = 1;

/// Where a note-off lands relative to its note-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteOffPlacement {
    /// One full note length past the nominal end, so each note sounds
    /// for twice its notated length.
    #[default]
    Doubled,
    /// At the nominal end of the note.
    NominalEnd,
}

/// Options controlling timeline compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Tempo each track starts from; a bar at a different tempo emits a
    /// tempo change.
    pub initial_tempo: u32,
    pub note_off: NoteOffPlacement,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            initial_tempo: DEFAULT_TEMPO,
            note_off: NoteOffPlacement::Doubled,
        }
    }
}

impl CompilerOptions {
    pub fn with_note_off(mut self, note_off: NoteOffPlacement) -> Self {
        self.note_off = note_off;
        self
    }
}
