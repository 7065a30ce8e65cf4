//! Bar length validation.

use crate::error::CompileError;
use crate::model::Bar;

/// Sixteenth notes per quarter-note unit of bar resolution.
const SUBDIVISIONS: u64 = 4;

/// Check that a bar's notes fill exactly its declared resolution.
///
/// The summed durations divided by 4 must equal the resolution, with no
/// tolerance.  `track` and `bar_index` locate the bar in the error.
pub fn check_bar(track: usize, bar_index: usize, bar: &Bar) -> Result<(), CompileError> {
    let actual = bar.total_sixteenths();
    let expected = u64::from(bar.resolution) * SUBDIVISIONS;
    if actual == expected {
        return Ok(());
    }
    Err(CompileError::InconsistentBar {
        track,
        bar: bar_index,
        name: bar.name.clone(),
        resolution: bar.resolution,
        expected,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NoteDuration::*;
    use crate::model::Note;

    #[test]
    fn full_bar_passes() {
        let bar = Bar::with_notes(
            120,
            4,
            vec![Note::rest(Quarter), Note::new(60, Quarter), Note::new(62, Half)],
        );
        assert_eq!(check_bar(0, 0, &bar), Ok(()));
    }

    #[test]
    fn three_four_bar() {
        let bar = Bar::with_notes(120, 3, vec![Note::new(60, DottedHalf)]);
        assert_eq!(check_bar(0, 0, &bar), Ok(()));
    }

    #[test]
    fn short_bar_fails_with_location() {
        let bar = Bar::with_notes(120, 4, vec![Note::new(60, Half), Note::new(62, DottedQuarter)])
            .named("intro");
        assert_eq!(
            check_bar(2, 5, &bar),
            Err(CompileError::InconsistentBar {
                track: 2,
                bar: 5,
                name: Some("intro".into()),
                resolution: 4,
                expected: 16,
                actual: 14,
            })
        );
    }

    #[test]
    fn empty_bar_only_matches_zero() {
        assert!(check_bar(0, 0, &Bar::new(120, 1)).is_err());
        assert_eq!(check_bar(0, 0, &Bar::new(120, 0)), Ok(()));
    }
}
