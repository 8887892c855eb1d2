use std::time::Duration;

use anyhow::{bail, Context, Result};
use dark_spiral_core::Pattern;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Mean seconds a player spends on a challenge.
const THINK_MEAN_SECS: f64 = 4.0;
/// Spread of the think time.
const THINK_STD_DEV_SECS: f64 = 1.5;
/// Shortest think time the player ever takes.
const THINK_MIN_SECS: f64 = 0.5;
/// Longest think time the player ever takes.
const THINK_MAX_SECS: f64 = 20.0;
/// Completion chance lost per difficulty step above one.
const DIFFICULTY_PENALTY: f64 = 0.1;
/// Chance the player complains about friction before a verdict.
const COMPLAINT_CHANCE: f64 = 0.4;
/// Frustration reported per point of the pattern's frustration factor.
const COMPLAINT_PER_FACTOR: f32 = 0.25;
/// Separates the player's stream from the session seed.
const PLAYER_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Terminal verdict the simulated player reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    Complete,
    Fail,
}

/// Everything the simulated player does with one presentation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Attempt {
    /// Time spent before the verdict.
    pub(crate) think: Duration,
    /// Frustration reported while working on the challenge.
    pub(crate) complaint: Option<f32>,
    /// How the attempt ends.
    pub(crate) verdict: Verdict,
}

/// Collaborator standing in for a human working through challenges.
#[derive(Clone, Debug)]
pub(crate) struct SimulatedPlayer {
    rng: ChaCha8Rng,
    think: Normal<f64>,
    skill: f64,
}

impl SimulatedPlayer {
    /// Creates a player whose decisions are fully determined by `seed`.
    pub(crate) fn new(seed: u64, skill: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&skill) {
            bail!("skill must lie within 0.0..=1.0, got {skill}");
        }
        let think = Normal::new(THINK_MEAN_SECS, THINK_STD_DEV_SECS)
            .context("failed to build think-time distribution")?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed ^ PLAYER_STREAM),
            think,
            skill,
        })
    }

    /// Decides how to handle `pattern`.
    pub(crate) fn attempt(&mut self, pattern: &Pattern) -> Attempt {
        let seconds = self
            .think
            .sample(&mut self.rng)
            .clamp(THINK_MIN_SECS, THINK_MAX_SECS);
        let complaint = self
            .rng
            .gen_bool(COMPLAINT_CHANCE)
            .then(|| f32::from(pattern.frustration_factor) * COMPLAINT_PER_FACTOR);
        let verdict = if self.rng.gen_bool(self.completion_chance(pattern)) {
            Verdict::Complete
        } else {
            Verdict::Fail
        };
        Attempt {
            think: Duration::from_secs_f64(seconds),
            complaint,
            verdict,
        }
    }

    fn completion_chance(&self, pattern: &Pattern) -> f64 {
        let penalty = f64::from(pattern.difficulty.saturating_sub(1)) * DIFFICULTY_PENALTY;
        (self.skill - penalty).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dark_spiral_catalog::Catalog;

    #[test]
    fn equal_seeds_make_equal_decisions() {
        let catalog = Catalog::standard();
        let mut first = SimulatedPlayer::new(42, 0.6).expect("player");
        let mut second = SimulatedPlayer::new(42, 0.6).expect("player");
        for pattern in catalog.patterns().iter().cycle().take(48) {
            assert_eq!(first.attempt(pattern), second.attempt(pattern));
        }
    }

    #[test]
    fn think_time_stays_within_bounds() {
        let catalog = Catalog::standard();
        let mut player = SimulatedPlayer::new(7, 0.5).expect("player");
        for pattern in catalog.patterns().iter().cycle().take(500) {
            let think = player.attempt(pattern).think.as_secs_f64();
            assert!((THINK_MIN_SECS..=THINK_MAX_SECS).contains(&think));
        }
    }

    #[test]
    fn hopeless_player_never_completes() {
        let catalog = Catalog::standard();
        let mut player = SimulatedPlayer::new(3, 0.0).expect("player");
        for pattern in catalog.patterns() {
            assert_eq!(player.attempt(pattern).verdict, Verdict::Fail);
        }
    }

    #[test]
    fn harder_patterns_lower_completion_chance() {
        let catalog = Catalog::standard();
        let player = SimulatedPlayer::new(3, 0.9).expect("player");
        let easy = catalog
            .patterns()
            .iter()
            .find(|pattern| pattern.difficulty == 1)
            .expect("easy pattern");
        let hard = catalog
            .patterns()
            .iter()
            .find(|pattern| pattern.difficulty == 5)
            .expect("hard pattern");
        assert!(player.completion_chance(easy) > player.completion_chance(hard));
        assert!((player.completion_chance(hard) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_skill_is_rejected() {
        assert!(SimulatedPlayer::new(1, 1.5).is_err());
        assert!(SimulatedPlayer::new(1, -0.1).is_err());
    }
}
