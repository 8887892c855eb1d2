#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative scoring state for a Dark Spiral session.
//!
//! The state is mutated exclusively through [`apply`], which interprets a
//! [`Command`] as a delta against the current value, enforces every range
//! invariant, and reports what changed as [`Event`] values. Read access goes
//! through the [`query`] module.

use std::{collections::BTreeMap, time::Duration};

use dark_spiral_core::{
    BadgeId, Command, Event, PatternId, CHAOS_MAX, FRUSTRATION_MAX, FRUSTRATION_MIN,
    SUSPICION_MAX,
};
use serde::Serialize;

/// What the narrator remembers about a single pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PatternMemory {
    /// Number of times the pattern has been loaded.
    pub attempts: u32,
    /// Number of failed attempts.
    pub failures: u32,
    /// Whether the pattern was completed at least once.
    pub completed: bool,
    /// Session time of the most recent encounter.
    pub last_seen: Duration,
}

/// Mutable behavioural model owned by the orchestrator for one session.
#[derive(Clone, Debug, Default)]
pub struct ScoringState {
    frustration: f32,
    chaos_level: u8,
    suspicion: f32,
    spiral_depth: u32,
    learned_patterns: Vec<PatternId>,
    earned_badges: Vec<BadgeId>,
    narrator_memory: BTreeMap<PatternId, PatternMemory>,
    highest_triggered_scene: Option<f32>,
    loop_count: u32,
}

impl ScoringState {
    /// Creates a fresh state for a new session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn memory_mut(&mut self, pattern: PatternId) -> &mut PatternMemory {
        self.narrator_memory.entry(pattern).or_default()
    }
}

/// Applies the provided command to the state, mutating it deterministically.
///
/// Commands that leave the state unchanged emit no events. Non-finite
/// amounts are discarded.
pub fn apply(state: &mut ScoringState, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::IncreaseFrustration { amount } => {
            adjust_frustration(state, amount, out_events);
        }
        Command::RelieveFrustration { amount } => {
            adjust_frustration(state, -amount.abs(), out_events);
        }
        Command::RaiseSuspicion { amount } => {
            if !amount.is_finite() {
                log::warn!("discarding non-finite suspicion delta {amount}");
                return;
            }
            let previous = state.suspicion;
            let current = (previous + amount).clamp(0.0, SUSPICION_MAX);
            if current != previous {
                state.suspicion = current;
                out_events.push(Event::SuspicionChanged { previous, current });
            }
        }
        Command::SetChaosLevel { level } => {
            let previous = state.chaos_level;
            let current = level.min(CHAOS_MAX);
            if current != previous {
                state.chaos_level = current;
                out_events.push(Event::ChaosChanged { previous, current });
            }
        }
        Command::BumpDepth { levels } => {
            let previous = state.spiral_depth;
            let current = previous.saturating_add(levels);
            if current != previous {
                state.spiral_depth = current;
                out_events.push(Event::DepthChanged { previous, current });
            }
        }
        Command::ResetDepth => {
            let previous = state.spiral_depth;
            if previous != 0 {
                state.spiral_depth = 0;
                out_events.push(Event::DepthChanged {
                    previous,
                    current: 0,
                });
            }
        }
        Command::MarkLearned { pattern } => {
            if !state.learned_patterns.contains(&pattern) {
                state.learned_patterns.push(pattern);
                out_events.push(Event::PatternLearned { pattern });
            }
        }
        Command::AwardBadge { badge } => {
            state.earned_badges.push(badge);
            out_events.push(Event::BadgeEarned { badge });
        }
        Command::RecordEncounter { pattern, at } => {
            let seen_before = state.narrator_memory.contains_key(&pattern);
            if seen_before {
                state.loop_count = state.loop_count.saturating_add(1);
            }
            let memory = state.memory_mut(pattern);
            memory.attempts = memory.attempts.saturating_add(1);
            memory.last_seen = at;
            let attempts = memory.attempts;
            out_events.push(Event::PatternEncountered { pattern, attempts });
        }
        Command::RecordFailure { pattern } => {
            let memory = state.memory_mut(pattern);
            memory.failures = memory.failures.saturating_add(1);
            let failures = memory.failures;
            out_events.push(Event::PatternFailed { pattern, failures });
        }
        Command::RecordCompletion { pattern } => {
            state.memory_mut(pattern).completed = true;
            out_events.push(Event::PatternCompleted { pattern });
        }
        Command::RecordHiddenScene { threshold } => {
            if !threshold.is_finite() {
                log::warn!("discarding non-finite hidden scene threshold");
                return;
            }
            let advances = state
                .highest_triggered_scene
                .map_or(true, |recorded| threshold > recorded);
            if advances {
                state.highest_triggered_scene = Some(threshold);
                out_events.push(Event::HiddenSceneRecorded { threshold });
            }
        }
    }
}

fn adjust_frustration(state: &mut ScoringState, delta: f32, out_events: &mut Vec<Event>) {
    if !delta.is_finite() {
        log::warn!("discarding non-finite frustration delta {delta}");
        return;
    }
    let previous = state.frustration;
    let current = (previous + delta).clamp(FRUSTRATION_MIN, FRUSTRATION_MAX);
    if current != previous {
        state.frustration = current;
        out_events.push(Event::FrustrationChanged { previous, current });
    }
}

/// Query functions that provide read-only access to the scoring state.
pub mod query {
    use dark_spiral_core::{Alignment, BadgeId, PatternId};
    use serde::Serialize;

    use super::{PatternMemory, ScoringState};

    const SUSPICIOUS_ABOVE: f32 = 5.0;
    const CHAOTIC_ABOVE: u8 = 3;
    const REBELLIOUS_ABOVE: f32 = 8.0;

    /// Current frustration score in `[0, 15]`.
    #[must_use]
    pub fn frustration(state: &ScoringState) -> f32 {
        state.frustration
    }

    /// Current chaos level in `[0, 10]`.
    #[must_use]
    pub fn chaos_level(state: &ScoringState) -> u8 {
        state.chaos_level
    }

    /// Current suspicion level in `[0, 10]`.
    #[must_use]
    pub fn suspicion(state: &ScoringState) -> f32 {
        state.suspicion
    }

    /// Current spiral depth.
    #[must_use]
    pub fn spiral_depth(state: &ScoringState) -> u32 {
        state.spiral_depth
    }

    /// Patterns learned so far in the order they were learned.
    #[must_use]
    pub fn learned_patterns(state: &ScoringState) -> &[PatternId] {
        &state.learned_patterns
    }

    /// Reports whether the pattern has been learned.
    #[must_use]
    pub fn is_learned(state: &ScoringState, pattern: PatternId) -> bool {
        state.learned_patterns.contains(&pattern)
    }

    /// Badges earned so far in award order, duplicates included.
    #[must_use]
    pub fn earned_badges(state: &ScoringState) -> &[BadgeId] {
        &state.earned_badges
    }

    /// Memory recorded for the pattern, if it has been encountered.
    #[must_use]
    pub fn memory(state: &ScoringState, pattern: PatternId) -> Option<&PatternMemory> {
        state.narrator_memory.get(&pattern)
    }

    /// Threshold of the highest hidden scene fired so far.
    #[must_use]
    pub fn highest_triggered_scene(state: &ScoringState) -> Option<f32> {
        state.highest_triggered_scene
    }

    /// Number of times an already-seen pattern was encountered again.
    #[must_use]
    pub fn loop_count(state: &ScoringState) -> u32 {
        state.loop_count
    }

    /// Narrative stance implied by the current signals.
    #[must_use]
    pub fn alignment(state: &ScoringState) -> Alignment {
        if state.suspicion > SUSPICIOUS_ABOVE {
            Alignment::Suspicious
        } else if state.chaos_level > CHAOTIC_ABOVE {
            Alignment::Chaotic
        } else if state.frustration > REBELLIOUS_ABOVE {
            Alignment::Rebellious
        } else {
            Alignment::Compliant
        }
    }

    /// Captures a serializable copy of the state.
    #[must_use]
    pub fn snapshot(state: &ScoringState) -> ScoringSnapshot {
        ScoringSnapshot {
            frustration: state.frustration,
            chaos_level: state.chaos_level,
            suspicion: state.suspicion,
            spiral_depth: state.spiral_depth,
            learned_patterns: state.learned_patterns.clone(),
            earned_badges: state.earned_badges.clone(),
            narrator_memory: state
                .narrator_memory
                .iter()
                .map(|(pattern, memory)| (*pattern, *memory))
                .collect(),
            highest_triggered_scene: state.highest_triggered_scene,
            loop_count: state.loop_count,
        }
    }

    /// Immutable copy of the scoring state used for reports.
    #[derive(Clone, Debug, PartialEq, Serialize)]
    pub struct ScoringSnapshot {
        /// Frustration score.
        pub frustration: f32,
        /// Chaos level.
        pub chaos_level: u8,
        /// Suspicion level.
        pub suspicion: f32,
        /// Spiral depth.
        pub spiral_depth: u32,
        /// Learned patterns in learning order.
        pub learned_patterns: Vec<PatternId>,
        /// Earned badges in award order.
        pub earned_badges: Vec<BadgeId>,
        /// Per-pattern memory ordered by identifier.
        pub narrator_memory: Vec<(PatternId, PatternMemory)>,
        /// Highest hidden scene threshold fired.
        pub highest_triggered_scene: Option<f32>,
        /// Re-encounter count.
        pub loop_count: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dark_spiral_core::Alignment;

    fn run(state: &mut ScoringState, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(state, command, &mut events);
        }
        events
    }

    #[test]
    fn frustration_clamps_to_upper_bound() {
        let mut state = ScoringState::new();
        let events = run(
            &mut state,
            vec![
                Command::IncreaseFrustration { amount: 10.0 },
                Command::IncreaseFrustration { amount: 10.0 },
                Command::IncreaseFrustration { amount: 10.0 },
            ],
        );
        assert_eq!(query::frustration(&state), FRUSTRATION_MAX);
        assert_eq!(events.len(), 2, "saturated increase must not emit");
    }

    #[test]
    fn relief_never_drops_below_zero() {
        let mut state = ScoringState::new();
        let events = run(
            &mut state,
            vec![
                Command::IncreaseFrustration { amount: 0.5 },
                Command::RelieveFrustration { amount: 1.0 },
            ],
        );
        assert_eq!(query::frustration(&state), 0.0);
        assert_eq!(
            events.last(),
            Some(&Event::FrustrationChanged {
                previous: 0.5,
                current: 0.0
            })
        );
    }

    #[test]
    fn non_finite_deltas_are_discarded() {
        let mut state = ScoringState::new();
        let events = run(
            &mut state,
            vec![
                Command::IncreaseFrustration { amount: f32::NAN },
                Command::RaiseSuspicion {
                    amount: f32::INFINITY,
                },
            ],
        );
        assert!(events.is_empty());
        assert_eq!(query::frustration(&state), 0.0);
        assert_eq!(query::suspicion(&state), 0.0);
    }

    #[test]
    fn learned_patterns_are_deduplicated() {
        let mut state = ScoringState::new();
        let pattern = PatternId::new("confirmshaming");
        let events = run(
            &mut state,
            vec![
                Command::MarkLearned { pattern },
                Command::MarkLearned { pattern },
            ],
        );
        assert_eq!(query::learned_patterns(&state), &[pattern]);
        assert_eq!(events, vec![Event::PatternLearned { pattern }]);
    }

    #[test]
    fn duplicate_badges_are_kept() {
        let mut state = ScoringState::new();
        let badge = BadgeId::new("time_lord");
        let _ = run(
            &mut state,
            vec![
                Command::AwardBadge { badge },
                Command::AwardBadge { badge },
            ],
        );
        assert_eq!(query::earned_badges(&state), &[badge, badge]);
    }

    #[test]
    fn encounters_track_attempts_and_loops() {
        let mut state = ScoringState::new();
        let pattern = PatternId::new("roach_motel");
        let events = run(
            &mut state,
            vec![
                Command::RecordEncounter {
                    pattern,
                    at: Duration::from_secs(2),
                },
                Command::RecordFailure { pattern },
                Command::RecordEncounter {
                    pattern,
                    at: Duration::from_secs(9),
                },
                Command::RecordCompletion { pattern },
            ],
        );

        let memory = query::memory(&state, pattern).expect("memory recorded");
        assert_eq!(memory.attempts, 2);
        assert_eq!(memory.failures, 1);
        assert!(memory.completed);
        assert_eq!(memory.last_seen, Duration::from_secs(9));
        assert_eq!(query::loop_count(&state), 1);
        assert!(events.contains(&Event::PatternEncountered {
            pattern,
            attempts: 2
        }));
    }

    #[test]
    fn depth_only_resets_explicitly() {
        let mut state = ScoringState::new();
        let events = run(
            &mut state,
            vec![
                Command::BumpDepth { levels: 5 },
                Command::BumpDepth { levels: 0 },
                Command::BumpDepth { levels: 1 },
                Command::ResetDepth,
            ],
        );
        assert_eq!(query::spiral_depth(&state), 0);
        assert_eq!(
            events,
            vec![
                Event::DepthChanged {
                    previous: 0,
                    current: 5
                },
                Event::DepthChanged {
                    previous: 5,
                    current: 6
                },
                Event::DepthChanged {
                    previous: 6,
                    current: 0
                },
            ]
        );
    }

    #[test]
    fn hidden_scene_threshold_only_advances() {
        let mut state = ScoringState::new();
        let events = run(
            &mut state,
            vec![
                Command::RecordHiddenScene { threshold: 7.0 },
                Command::RecordHiddenScene { threshold: 5.0 },
                Command::RecordHiddenScene { threshold: 7.0 },
            ],
        );
        assert_eq!(query::highest_triggered_scene(&state), Some(7.0));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn chaos_level_is_capped() {
        let mut state = ScoringState::new();
        let _ = run(&mut state, vec![Command::SetChaosLevel { level: 42 }]);
        assert_eq!(query::chaos_level(&state), CHAOS_MAX);
    }

    #[test]
    fn alignment_prefers_suspicion_over_chaos() {
        let mut state = ScoringState::new();
        assert_eq!(query::alignment(&state), Alignment::Compliant);

        let _ = run(&mut state, vec![Command::IncreaseFrustration { amount: 9.0 }]);
        assert_eq!(query::alignment(&state), Alignment::Rebellious);

        let _ = run(&mut state, vec![Command::SetChaosLevel { level: 6 }]);
        assert_eq!(query::alignment(&state), Alignment::Chaotic);

        let _ = run(&mut state, vec![Command::RaiseSuspicion { amount: 6.0 }]);
        assert_eq!(query::alignment(&state), Alignment::Suspicious);
    }
}
