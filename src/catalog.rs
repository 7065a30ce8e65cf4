//! Fixed lookup tables: note-duration symbols and percussion pitches.
//!
//! Durations are stored in sixteenth-note units so that every catalog
//! length is an exact integer.  A quarter note is 4 sixteenths, which is
//! the "4 subdivisions per quarter" that bar validation divides by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A notated note length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteDuration {
    Whole,
    DottedHalf,
    Half,
    DottedQuarter,
    Quarter,
    DottedEighth,
    Eighth,
    Sixteenth,
}

impl NoteDuration {
    /// Every duration, longest first.
    pub const ALL: [NoteDuration; 8] = [
        NoteDuration::Whole,
        NoteDuration::DottedHalf,
        NoteDuration::Half,
        NoteDuration::DottedQuarter,
        NoteDuration::Quarter,
        NoteDuration::DottedEighth,
        NoteDuration::Eighth,
        NoteDuration::Sixteenth,
    ];

    /// Length in sixteenth notes.
    pub fn sixteenths(self) -> u32 {
        match self {
            NoteDuration::Whole => 16,
            NoteDuration::DottedHalf => 12,
            NoteDuration::Half => 8,
            NoteDuration::DottedQuarter => 6,
            NoteDuration::Quarter => 4,
            NoteDuration::DottedEighth => 3,
            NoteDuration::Eighth => 2,
            NoteDuration::Sixteenth => 1,
        }
    }

    /// Length relative to a quarter note (quarter = 1.0, eighth = 0.5).
    pub fn quarters(self) -> f64 {
        f64::from(self.sixteenths()) / 4.0
    }

    /// The symbol accepted by `FromStr`.
    pub fn symbol(self) -> &'static str {
        match self {
            NoteDuration::Whole => "whole",
            NoteDuration::DottedHalf => "dotted-half",
            NoteDuration::Half => "half",
            NoteDuration::DottedQuarter => "dotted-quarter",
            NoteDuration::Quarter => "quarter",
            NoteDuration::DottedEighth => "dotted-eighth",
            NoteDuration::Eighth => "eighth",
            NoteDuration::Sixteenth => "16th",
        }
    }
}

impl fmt::Display for NoteDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Returned when a catalog symbol is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} symbol '{symbol}'")]
pub struct UnknownSymbol {
    pub kind: &'static str,
    pub symbol: String,
}

impl FromStr for NoteDuration {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let duration = match normalized.as_str() {
            "whole" => NoteDuration::Whole,
            "dotted-half" | "half." => NoteDuration::DottedHalf,
            "half" => NoteDuration::Half,
            "dotted-quarter" | "quarter." => NoteDuration::DottedQuarter,
            "quarter" => NoteDuration::Quarter,
            "dotted-eighth" | "eighth." => NoteDuration::DottedEighth,
            "eighth" => NoteDuration::Eighth,
            "16th" | "sixteenth" => NoteDuration::Sixteenth,
            _ => {
                return Err(UnknownSymbol {
                    kind: "duration",
                    symbol: s.to_string(),
                })
            }
        };
        Ok(duration)
    }
}

/// Percussion pitch symbols on the General MIDI drum map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrumNote {
    /// Bell (B)
    Bell,
    /// Bass drum (BD)
    BassDrum,
    /// Snare drum (SD)
    Snare,
    /// Closed hi-hat (CH)
    ClosedHiHat,
    /// Open hi-hat (OH)
    OpenHiHat,
    /// Crash cymbal (CC)
    Crash,
    /// Ride cymbal (RC)
    Ride,
}

impl DrumNote {
    /// MIDI pitch number on the percussion channel.
    pub fn pitch(self) -> u8 {
        match self {
            DrumNote::Bell => 71,
            DrumNote::BassDrum => 36,
            DrumNote::Snare => 38,
            DrumNote::ClosedHiHat => 42,
            DrumNote::OpenHiHat => 46,
            DrumNote::Crash => 49,
            DrumNote::Ride => 51,
        }
    }
}

impl FromStr for DrumNote {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "B" => Ok(DrumNote::Bell),
            "BD" => Ok(DrumNote::BassDrum),
            "SD" => Ok(DrumNote::Snare),
            "CH" => Ok(DrumNote::ClosedHiHat),
            "OH" => Ok(DrumNote::OpenHiHat),
            "CC" => Ok(DrumNote::Crash),
            "RC" => Ok(DrumNote::Ride),
            _ => Err(UnknownSymbol {
                kind: "drum",
                symbol: s.to_string(),
            }),
        }
    }
}

/// Convert a named pitch to a MIDI note number.
/// Middle C (C4) = 60.  Returns `None` for an unknown step or a result
/// outside 0..=127.
pub fn midi_pitch(step: char, octave: i32, alter: i32) -> Option<u8> {
    let step_semitone = match step.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let number = (octave + 1) * 12 + step_semitone + alter;
    u8::try_from(number).ok().filter(|n| *n <= 127)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_relative_lengths() {
        assert_eq!(NoteDuration::Quarter.quarters(), 1.0);
        assert_eq!(NoteDuration::Eighth.quarters(), 0.5);
        assert_eq!(NoteDuration::DottedHalf.quarters(), 3.0);
    }

    #[test]
    fn durations_parse_from_symbols() {
        for d in NoteDuration::ALL {
            assert_eq!(d.symbol().parse::<NoteDuration>(), Ok(d));
        }
        assert_eq!("Quarter.".parse::<NoteDuration>(), Ok(NoteDuration::DottedQuarter));
        assert!("breve".parse::<NoteDuration>().is_err());
    }

    #[test]
    fn drum_symbols() {
        assert_eq!("bd".parse::<DrumNote>().map(DrumNote::pitch), Ok(36));
        assert_eq!("B".parse::<DrumNote>().map(DrumNote::pitch), Ok(71));
        let err = "XX".parse::<DrumNote>().unwrap_err();
        assert_eq!(err.to_string(), "unknown drum symbol 'XX'");
    }

    #[test]
    fn named_pitches() {
        assert_eq!(midi_pitch('C', 4, 0), Some(60));
        assert_eq!(midi_pitch('a', 4, 0), Some(69));
        assert_eq!(midi_pitch('B', 3, 1), Some(60));
        assert_eq!(midi_pitch('G', 9, 1), None);
        assert_eq!(midi_pitch('C', -2, 0), None);
        assert_eq!(midi_pitch('H', 4, 0), None);
    }
}
