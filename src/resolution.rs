//! Global tick resolution across every bar of a score.
//!
//! The distinct bar resolutions are multiplied together (not reduced to
//! their least common multiple).  The product is a multiple of every bar's
//! resolution, so each bar's tick multiplier is an exact integer.

use std::collections::BTreeSet;

use crate::error::CompileError;
use crate::model::Score;

/// Compute the global resolution of a score.
///
/// A single distinct resolution is returned as-is.  A score with no bars
/// at all yields 1, though `compile` rejects such scores before this runs.
pub fn global_resolution(score: &Score) -> Result<u32, CompileError> {
    let mut distinct = BTreeSet::new();
    for (t, track) in score.tracks.iter().enumerate() {
        for (b, bar) in track.bars.iter().enumerate() {
            if bar.resolution == 0 {
                return Err(CompileError::ZeroResolution { track: t, bar: b });
            }
            distinct.insert(bar.resolution);
        }
    }

    distinct
        .iter()
        .try_fold(1u32, |acc, r| acc.checked_mul(*r))
        .ok_or_else(|| CompileError::ResolutionOverflow {
            resolutions: distinct.iter().copied().collect(),
        })
}

/// Ticks per notated sixteenth inside a bar of the given resolution.
pub fn tick_multiplier(global: u32, bar_resolution: u32) -> u64 {
    debug_assert!(
        bar_resolution > 0 && global % bar_resolution == 0,
        "global resolution {global} is not a multiple of {bar_resolution}"
    );
    u64::from(global / bar_resolution)
}
