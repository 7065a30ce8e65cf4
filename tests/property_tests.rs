//! Randomized checks over generated scores.  Seeds are fixed so failures
//! reproduce.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use scoreseq::channel::ChannelAllocator;
use scoreseq::resolution::tick_multiplier;
use scoreseq::{
    compile, global_resolution, Bar, CompileError, CompilerOptions, InstrumentClass, Note,
    NoteDuration, NoteOffPlacement, Score, Track,
};

const ROUNDS: usize = 200;

/// A bar whose notes exactly fill `resolution` quarters.
fn random_bar(rng: &mut ChaCha8Rng, resolution: u32) -> Bar {
    let mut remaining = resolution * 4;
    let mut notes = Vec::new();
    while remaining > 0 {
        let fitting: Vec<NoteDuration> = NoteDuration::ALL
            .iter()
            .copied()
            .filter(|d| d.sixteenths() <= remaining)
            .collect();
        let duration = *fitting.choose(rng).unwrap();
        remaining -= duration.sixteenths();
        if rng.gen_bool(0.2) {
            notes.push(Note::rest(duration));
        } else {
            notes.push(Note::new(rng.gen_range(21..=108), duration));
        }
    }
    let tempo = *[90, 120, 140].choose(rng).unwrap();
    Bar::with_notes(tempo, resolution, notes)
}

fn random_track(rng: &mut ChaCha8Rng, resolutions: &[u32]) -> Track {
    let bars = (0..rng.gen_range(1..=4))
        .map(|_| {
            let r = *resolutions.choose(rng).unwrap();
            random_bar(rng, r)
        })
        .collect();
    if rng.gen_bool(0.2) {
        Track::percussion(bars)
    } else {
        Track::melodic(rng.gen_range(0..=127), bars)
    }
}

fn random_score(rng: &mut ChaCha8Rng, resolutions: &[u32], max_tracks: usize) -> Score {
    let tracks = (0..rng.gen_range(1..=max_tracks))
        .map(|_| random_track(rng, resolutions))
        .collect();
    Score::with_tracks(tracks)
}

/// A random non-empty subset of 1..=7.
fn random_resolutions(rng: &mut ChaCha8Rng) -> Vec<u32> {
    let mut pool: Vec<u32> = (1..=7).collect();
    pool.shuffle(rng);
    pool.truncate(rng.gen_range(1..=pool.len()));
    pool
}

#[test]
fn single_resolution_is_global() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..ROUNDS {
        let r = rng.gen_range(1..=12);
        let score = random_score(&mut rng, &[r], 4);
        assert_eq!(global_resolution(&score), Ok(r));
    }
}

#[test]
fn distinct_resolutions_multiply_and_divide_exactly() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    for _ in 0..ROUNDS {
        let resolutions = random_resolutions(&mut rng);
        let score = random_score(&mut rng, &resolutions, 6);

        let used: HashSet<u32> = score
            .tracks
            .iter()
            .flat_map(|t| t.bars.iter().map(|b| b.resolution))
            .collect();
        let expected: u32 = used.iter().product();
        let global = global_resolution(&score).unwrap();
        assert_eq!(global, expected, "resolutions {used:?}");

        for r in &used {
            assert_eq!(global % r, 0);
            assert_eq!(tick_multiplier(global, *r) * u64::from(*r), u64::from(global));
        }
    }
}

#[test]
fn any_duration_change_breaks_the_bar() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..ROUNDS {
        let resolution = rng.gen_range(1..=6);
        let mut bar = random_bar(&mut rng, resolution);
        let score = Score::with_tracks(vec![Track::melodic(0, vec![bar.clone()])]);
        assert!(compile(&score, &CompilerOptions::default()).is_ok());

        let idx = rng.gen_range(0..bar.notes.len());
        let original = bar.notes[idx].duration;
        let others: Vec<NoteDuration> = NoteDuration::ALL
            .iter()
            .copied()
            .filter(|d| *d != original)
            .collect();
        let replacement = *others.choose(&mut rng).unwrap();
        bar.notes[idx].duration = replacement;

        let score = Score::with_tracks(vec![Track::melodic(0, vec![bar])]);
        assert!(
            matches!(
                compile(&score, &CompilerOptions::default()),
                Err(CompileError::InconsistentBar { track: 0, bar: 0, .. })
            ),
            "changing note {idx} from {original} to {replacement} should fail"
        );
    }
}

#[test]
fn channel_allocation_is_injective_and_bounded() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    for _ in 0..ROUNDS {
        let mut alloc = ChannelAllocator::new();
        let mut seen = HashSet::new();
        let (mut melodic, mut percussion) = (0usize, 0usize);

        for track in 0..rng.gen_range(1..=20) {
            let class = if rng.gen_bool(0.25) {
                InstrumentClass::Percussion
            } else {
                InstrumentClass::Melodic
            };
            let count = match class {
                InstrumentClass::Melodic => &mut melodic,
                InstrumentClass::Percussion => &mut percussion,
            };
            *count += 1;
            let over = match class {
                InstrumentClass::Melodic => *count > 14,
                InstrumentClass::Percussion => *count > 2,
            };

            let result = alloc.allocate(track, class);
            if over {
                assert!(matches!(
                    result,
                    Err(CompileError::ChannelCapacityExceeded { track: t, .. }) if t == track
                ));
                break;
            }
            let channel = result.unwrap();
            assert!(seen.insert(channel), "channel {channel} reused");
            assert!(channel <= 15);
            match class {
                InstrumentClass::Melodic => assert!(channel != 9 && channel != 10),
                InstrumentClass::Percussion => assert!(channel == 9 || channel == 10),
            }
        }
    }
}

#[test]
fn compile_fails_exactly_when_a_pool_overflows() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..ROUNDS {
        let score = random_score(&mut rng, &[4], 20);
        let melodic = score
            .tracks
            .iter()
            .filter(|t| t.instrument.class() == InstrumentClass::Melodic)
            .count();
        let percussion = score.tracks.len() - melodic;

        let result = compile(&score, &CompilerOptions::default());
        if melodic > 14 || percussion > 2 {
            assert!(matches!(result, Err(CompileError::ChannelCapacityExceeded { .. })));
        } else {
            assert_eq!(result.unwrap().tracks.len(), score.tracks.len());
        }
    }
}

#[test]
fn track_events_never_go_back_in_time() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    for round in 0..ROUNDS {
        let resolutions = random_resolutions(&mut rng);
        let score = random_score(&mut rng, &resolutions, 5);
        let placement = if round % 2 == 0 {
            NoteOffPlacement::Doubled
        } else {
            NoteOffPlacement::NominalEnd
        };
        let options = CompilerOptions::default().with_note_off(placement);

        let Ok(timeline) = compile(&score, &options) else {
            // too many percussion tracks
            continue;
        };
        for track in &timeline.tracks {
            assert!(
                track.events.windows(2).all(|w| w[0].tick <= w[1].tick),
                "track {} not monotonic",
                track.index
            );
            assert!(track.events.iter().all(|e| e.channel == track.channel));
            let ons = track.note_count();
            let offs = track
                .events
                .iter()
                .filter(|e| matches!(e.kind, scoreseq::EventKind::NoteOff { .. }))
                .count();
            assert_eq!(ons, offs);
        }
    }
}
