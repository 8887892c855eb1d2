use std::time::Duration;

use dark_spiral_core::Event;
use dark_spiral_orchestrator::{SessionReport, Spiral, SpiralTuning};

const STEP: Duration = Duration::from_millis(500);
const STEPS: usize = 400;

#[test]
fn seeded_sessions_replay_identically() {
    let first = replay(0x5eed_cafe);
    let second = replay(0x5eed_cafe);

    assert_eq!(first.events, second.events, "event log diverged between runs");
    assert_eq!(first.report, second.report, "report diverged between runs");
    assert!(first.report.presentations > 0);
}

#[test]
fn different_seeds_take_different_paths() {
    let first = replay(1);
    let second = replay(2);

    assert_ne!(first.events, second.events);
}

#[test]
fn replayed_session_never_breaks_scoring_ranges() {
    for seed in [3, 17, 256, 9_001] {
        let outcome = replay(seed);
        let scoring = &outcome.report.scoring;
        assert!((0.0..=15.0).contains(&scoring.frustration));
        assert!((0.0..=10.0).contains(&scoring.suspicion));
        assert!(scoring.chaos_level <= 10);

        let presented = outcome
            .events
            .iter()
            .filter(|event| matches!(event, Event::PatternPresented { .. }))
            .count();
        assert_eq!(presented, outcome.report.presentations as usize);
        assert!(outcome.report.completions + outcome.report.failures <= outcome.report.presentations);
    }
}

struct ReplayOutcome {
    events: Vec<Event>,
    report: SessionReport,
}

/// Drives a session with a player that alternates failures and completions,
/// reporting a little frustration before each verdict.
fn replay(seed: u64) -> ReplayOutcome {
    let mut spiral = Spiral::seeded(seed, SpiralTuning::default());
    let mut log = Vec::new();
    let mut verdicts = 0_u32;

    let mut events = Vec::new();
    spiral.start(&mut events);
    log.append(&mut events);

    for _ in 0..STEPS {
        spiral.advance(STEP, &mut events);
        let presented = events.iter().find_map(|event| match event {
            Event::PatternPresented { lifecycle, .. } => Some(*lifecycle),
            _ => None,
        });
        log.append(&mut events);

        if let Some(token) = presented {
            let _ = spiral.increase_frustration(token, 0.5, &mut events);
            if spiral.shell_view().takeover.is_some() {
                spiral.dismiss_override(&mut events);
            }
            verdicts += 1;
            let _ = if verdicts % 2 == 0 {
                spiral.complete(token, &mut events)
            } else {
                spiral.fail(token, &mut events)
            };
            log.append(&mut events);
        }

        if spiral.has_exited() {
            break;
        }
    }

    ReplayOutcome {
        events: log,
        report: spiral.report(),
    }
}
