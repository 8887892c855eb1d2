use std::time::Duration;

use dark_spiral_core::{Event, LifecycleId, Phase};
use dark_spiral_orchestrator::{SessionReport, Spiral, SpiralTuning};

use crate::{
    player::{SimulatedPlayer, Verdict},
    transcript,
};

/// Step used while waiting for the spiral to present something.
const IDLE_STEP: Duration = Duration::from_millis(250);
/// Upper bound on simulated time so a misconfigured run still terminates.
const MAX_SESSION: Duration = Duration::from_secs(6 * 60 * 60);

/// Parameters for one simulated session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SessionOptions {
    /// Seed shared by the spiral and the player.
    pub(crate) seed: u64,
    /// Verdicts after which the run stops.
    pub(crate) presentations: u32,
    /// Player skill in `0.0..=1.0`.
    pub(crate) skill: f64,
}

/// Result of a simulated session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SessionOutcome {
    /// Time-stamped transcript lines.
    pub(crate) transcript: Vec<String>,
    /// Final report.
    pub(crate) report: SessionReport,
}

/// Runs the spiral against a simulated player until it exits or the
/// presentation budget is spent.
pub(crate) fn run(options: SessionOptions, tuning: SpiralTuning) -> anyhow::Result<SessionOutcome> {
    let mut spiral = Spiral::seeded(options.seed, tuning);
    let mut player = SimulatedPlayer::new(options.seed, options.skill)?;
    let mut transcript = Vec::new();
    let mut events = Vec::new();
    let mut verdicts = 0;

    spiral.start(&mut events);
    record(&spiral, &mut events, &mut transcript);

    while verdicts < options.presentations && !spiral.has_exited() {
        if spiral.now() >= MAX_SESSION {
            log::warn!("session reached the simulated time limit");
            break;
        }
        let Some(token) = presentation_token(&spiral) else {
            spiral.advance(IDLE_STEP, &mut events);
            record(&spiral, &mut events, &mut transcript);
            continue;
        };
        let Some(pattern) = spiral.current_pattern().copied() else {
            spiral.advance(IDLE_STEP, &mut events);
            record(&spiral, &mut events, &mut transcript);
            continue;
        };

        let attempt = player.attempt(&pattern);
        spiral.record_activity();
        spiral.advance(attempt.think, &mut events);
        if let Some(amount) = attempt.complaint {
            let _ = spiral.increase_frustration(token, amount, &mut events);
        }
        if spiral.shell_view().takeover.is_some() {
            spiral.dismiss_override(&mut events);
        }
        let accepted = match attempt.verdict {
            Verdict::Complete => spiral.complete(token, &mut events),
            Verdict::Fail => spiral.fail(token, &mut events),
        };
        if accepted {
            verdicts += 1;
        } else {
            log::debug!("verdict for {token:?} arrived after the presentation ended");
        }
        record(&spiral, &mut events, &mut transcript);
    }

    log::info!(
        "session finished after {verdicts} verdicts at depth {}",
        spiral.shell_view().spiral_depth
    );
    Ok(SessionOutcome {
        transcript,
        report: spiral.report(),
    })
}

fn presentation_token<R>(spiral: &Spiral<R>) -> Option<LifecycleId>
where
    R: dark_spiral_core::RandomSource,
{
    (spiral.phase() == Phase::Presenting).then(|| spiral.lifecycle())
}

fn record<R>(spiral: &Spiral<R>, events: &mut Vec<Event>, transcript: &mut Vec<String>)
where
    R: dark_spiral_core::RandomSource,
{
    let at = spiral.now();
    transcript.extend(
        events
            .drain(..)
            .filter_map(|event| transcript::describe(&event, spiral.catalog()))
            .map(|line| transcript::stamp(at, &line)),
    );
}
