//! Error types for compilation and event output.

use std::fmt;

use crate::model::InstrumentClass;

/// Why a score was rejected as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyScoreReason {
    NoTracks,
    NoBarsInFirstTrack,
}

impl fmt::Display for EmptyScoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyScoreReason::NoTracks => f.write_str("no track in the score"),
            EmptyScoreReason::NoBarsInFirstTrack => f.write_str("no bar in the first track"),
        }
    }
}

/// A fatal compile failure.  Track, bar and note indices are 0-based.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("empty score: {0}")]
    EmptyScore(EmptyScoreReason),
    #[error("too many {class} tracks: track {track} exceeds the limit of {limit}")]
    ChannelCapacityExceeded {
        track: usize,
        class: InstrumentClass,
        limit: usize,
    },
    #[error(
        "inconsistent bar {bar}{} in track {track}: notes span {actual} sixteenths, \
         resolution {resolution} requires {expected}",
        bar_label(.name)
    )]
    InconsistentBar {
        track: usize,
        bar: usize,
        name: Option<String>,
        resolution: u32,
        expected: u64,
        actual: u64,
    },
    #[error("bar {bar} in track {track} has a resolution of zero")]
    ZeroResolution { track: usize, bar: usize },
    #[error("global resolution overflows: product of {resolutions:?}")]
    ResolutionOverflow { resolutions: Vec<u32> },
    #[error("bar {bar} in track {track} has a tempo of zero")]
    ZeroTempo { track: usize, bar: usize },
    #[error("initial tempo of zero")]
    ZeroInitialTempo,
    #[error("track {track} has program {program}, outside 0..=127")]
    InvalidProgram { track: usize, program: u8 },
    #[error("note {note} of bar {bar} in track {track} has pitch {pitch}, outside 0..=127")]
    InvalidPitch {
        track: usize,
        bar: usize,
        note: usize,
        pitch: u8,
    },
}

fn bar_label(name: &Option<String>) -> String {
    name.as_deref()
        .map(|n| format!(" ('{n}')"))
        .unwrap_or_default()
}

/// A failure while handing a compiled timeline to an output.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("resolution {0} cannot be written as a MIDI division (1..=32767)")]
    ResolutionOutOfRange(u32),
    #[error("tempo {0} bpm cannot be written as a 24-bit MIDI tempo")]
    TempoOutOfRange(u32),
    #[error("delta time {0} exceeds the MIDI variable-length limit")]
    DeltaOutOfRange(u64),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-level error for the convenience entry points.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
