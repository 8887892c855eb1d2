#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dark Spiral engine.
//!
//! This crate defines the message surface that connects the orchestrator,
//! the authoritative scoring state, and the pure systems. The orchestrator
//! submits [`Command`] values describing score deltas, the scoring crate
//! executes them via its `apply` entry point, and then broadcasts [`Event`]
//! values that systems and the UI shell react to. Systems read immutable
//! state and respond exclusively with new command batches, drawing every
//! random roll through [`RandomSource`].

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

mod random;

pub use random::{choose, RandomSource, ScriptedRandom, SeededRandom};

/// Lower bound of the frustration score.
pub const FRUSTRATION_MIN: f32 = 0.0;
/// Upper bound of the frustration score.
pub const FRUSTRATION_MAX: f32 = 15.0;
/// Upper bound of the suspicion level.
pub const SUSPICION_MAX: f32 = 10.0;
/// Upper bound of the chaos level.
pub const CHAOS_MAX: u8 = 10;
/// Upper bound of the glitch intensity shown by the shell.
pub const GLITCH_MAX: u8 = 10;

/// Identifier of a catalog pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PatternId(&'static str);

impl PatternId {
    /// Wraps a static catalog identifier.
    #[must_use]
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    /// Retrieves the textual identifier.
    #[must_use]
    pub const fn get(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Identifier of a catalog badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BadgeId(&'static str);

impl BadgeId {
    /// Wraps a static catalog identifier.
    #[must_use]
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    /// Retrieves the textual identifier.
    #[must_use]
    pub const fn get(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Identifier of a hidden scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SceneId(&'static str);

impl SceneId {
    /// Wraps a static catalog identifier.
    #[must_use]
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    /// Retrieves the textual identifier.
    #[must_use]
    pub const fn get(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Token identifying one Loading or Presenting instance.
///
/// Timers and collaborator callbacks carry the token of the lifecycle that
/// created them; anything arriving with a token other than the current one
/// is stale and must be ignored.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LifecycleId(u64);

impl LifecycleId {
    /// Token owning timers that live for the whole session.
    pub const SESSION: Self = Self(0);

    /// Creates a token with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the token.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the token that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Catalog entry describing one interactive challenge and its scoring metadata.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pattern {
    /// Unique identifier of the pattern.
    pub id: PatternId,
    /// Short title shown by the shell.
    pub title: &'static str,
    /// Longer description shown by the shell.
    pub description: &'static str,
    /// Interactions that provoke the pattern.
    pub triggers: &'static [&'static str],
    /// Effects the pattern has on the presenting collaborator.
    pub effects: &'static [&'static str],
    /// Line the narrator may use when commenting on the pattern.
    pub narrator_reaction: &'static str,
    /// Difficulty rating in `1..=5`.
    pub difficulty: u8,
    /// Frustration rating in `1..=5`.
    pub frustration_factor: u8,
    /// Frustration added when the pattern is failed; `None` falls back to the default.
    pub frustration_increment: Option<f32>,
}

/// Achievement awarded when a pattern is completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Badge {
    /// Unique identifier of the badge.
    pub id: BadgeId,
    /// Display name of the badge.
    pub name: &'static str,
    /// Human readable description of how the badge is earned.
    pub condition: &'static str,
    /// Short quip shown when the badge is awarded.
    pub microcopy: &'static str,
    /// Lesson appended to the microcopy.
    pub lesson: &'static str,
}

/// One-shot event unlocked when frustration crosses a threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HiddenScene {
    /// Frustration score at which the scene becomes reachable.
    pub frustration_threshold: f32,
    /// Unique identifier of the scene.
    pub id: SceneId,
    /// Line the narrator speaks when the scene fires.
    pub narrator_line: &'static str,
}

/// Usability law displayed in the overlay layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UxLaw {
    /// Name of the law.
    pub name: &'static str,
    /// One-sentence statement of the law.
    pub statement: &'static str,
}

/// Fake error page text used during override takeovers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorOverride {
    /// Status code shown in the override.
    pub code: u16,
    /// Text shown beneath the code.
    pub message: &'static str,
}

/// Narrative stance derived from the current scoring signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    /// Calm player following the interface's lead.
    Compliant,
    /// Highly frustrated player pushing back.
    Rebellious,
    /// Player whose session has become erratic.
    Chaotic,
    /// Player who has started to distrust the interface.
    Suspicious,
}

/// Lifecycle phase of a spiral session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Session constructed but not started.
    Dormant,
    /// Selecting the next pattern.
    Loading,
    /// A challenge is on screen awaiting its terminal callback.
    Presenting,
    /// The last challenge was completed.
    Completed,
    /// The last challenge was failed.
    Failed,
    /// The player left the spiral; no further transitions occur.
    ExitedSpiral,
}

/// Commands that express all permissible scoring mutations.
///
/// Every variant is a delta against the current value so independently
/// scheduled effects never overwrite each other.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Adds frustration, clamping to the permitted range.
    IncreaseFrustration {
        /// Amount added; negative values relieve frustration.
        amount: f32,
    },
    /// Removes frustration, never dropping below zero.
    RelieveFrustration {
        /// Amount removed.
        amount: f32,
    },
    /// Adds suspicion, clamping to the permitted range.
    RaiseSuspicion {
        /// Amount added.
        amount: f32,
    },
    /// Sets the chaos level, clamping to the permitted range.
    SetChaosLevel {
        /// Requested chaos level.
        level: u8,
    },
    /// Descends further into the spiral.
    BumpDepth {
        /// Number of levels to descend.
        levels: u32,
    },
    /// Explicit external reset of the spiral depth.
    ResetDepth,
    /// Records that a pattern has been learned.
    MarkLearned {
        /// Pattern that was learned.
        pattern: PatternId,
    },
    /// Appends a badge to the earned list.
    AwardBadge {
        /// Badge that was earned.
        badge: BadgeId,
    },
    /// Records that a pattern is about to be presented.
    RecordEncounter {
        /// Pattern being presented.
        pattern: PatternId,
        /// Session time of the encounter.
        at: Duration,
    },
    /// Records a failed attempt at a pattern.
    RecordFailure {
        /// Pattern that was failed.
        pattern: PatternId,
    },
    /// Records a completed attempt at a pattern.
    RecordCompletion {
        /// Pattern that was completed.
        pattern: PatternId,
    },
    /// Records the threshold of the hidden scene that just fired.
    RecordHiddenScene {
        /// Frustration threshold of the scene.
        threshold: f32,
    },
}

/// Events broadcast after processing commands or advancing timers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Event {
    /// Frustration score changed.
    FrustrationChanged {
        /// Score before the change.
        previous: f32,
        /// Score after the change.
        current: f32,
    },
    /// Suspicion level changed.
    SuspicionChanged {
        /// Level before the change.
        previous: f32,
        /// Level after the change.
        current: f32,
    },
    /// Chaos level changed.
    ChaosChanged {
        /// Level before the change.
        previous: u8,
        /// Level after the change.
        current: u8,
    },
    /// Spiral depth changed.
    DepthChanged {
        /// Depth before the change.
        previous: u32,
        /// Depth after the change.
        current: u32,
    },
    /// A pattern was learned for the first time.
    PatternLearned {
        /// Pattern that was learned.
        pattern: PatternId,
    },
    /// A badge was appended to the earned list.
    BadgeEarned {
        /// Badge that was earned.
        badge: BadgeId,
    },
    /// A pattern was encountered.
    PatternEncountered {
        /// Pattern that was encountered.
        pattern: PatternId,
        /// Attempts recorded after the encounter.
        attempts: u32,
    },
    /// A pattern attempt failed.
    PatternFailed {
        /// Pattern that was failed.
        pattern: PatternId,
        /// Failures recorded after the attempt.
        failures: u32,
    },
    /// A pattern attempt completed.
    PatternCompleted {
        /// Pattern that was completed.
        pattern: PatternId,
    },
    /// The highest triggered hidden scene threshold advanced.
    HiddenSceneRecorded {
        /// Threshold now recorded.
        threshold: f32,
    },
    /// The speech-bubble message changed.
    MessageShown {
        /// Text now displayed.
        text: String,
    },
    /// The speech-bubble message auto-hid.
    MessageHidden,
    /// A usability law appeared in the overlay layer.
    UxLawShown {
        /// Name of the law.
        name: &'static str,
    },
    /// The usability law overlay disappeared.
    UxLawHidden,
    /// The exclusive override takeover started.
    OverrideEngaged {
        /// Text shown by the takeover.
        message: String,
    },
    /// The override takeover was dismissed.
    OverrideDismissed,
    /// A fake error page appeared.
    ErrorOverrideShown {
        /// Status code displayed.
        code: u16,
    },
    /// The fake error page disappeared.
    ErrorOverrideHidden,
    /// Glitch intensity changed.
    GlitchChanged {
        /// Intensity before the change.
        previous: u8,
        /// Intensity after the change.
        current: u8,
    },
    /// A hidden scene fired.
    HiddenSceneTriggered {
        /// Scene that fired.
        scene: SceneId,
    },
    /// The session entered a new lifecycle phase.
    PhaseChanged {
        /// Phase now active.
        phase: Phase,
        /// Lifecycle token owning the phase.
        lifecycle: LifecycleId,
    },
    /// A challenge is ready for the presenting collaborator.
    PatternPresented {
        /// Token the collaborator must pass back with its callbacks.
        lifecycle: LifecycleId,
        /// Pattern to present.
        pattern: PatternId,
        /// Whether the challenge should offer a visible exit.
        escapable: bool,
    },
    /// A badge toast should be displayed.
    BadgeToast {
        /// Badge to display.
        badge: BadgeId,
    },
    /// Every pattern was learned and the selector fell back to the full catalog.
    SpiralExhausted,
    /// The navigation collaborator should leave the spiral.
    ExitSpiral {
        /// Depth reached when leaving.
        depth: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{Event, LifecycleId, PatternId, Phase};

    #[test]
    fn lifecycle_tokens_advance_monotonically() {
        let first = LifecycleId::SESSION.next();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.get(), 2);
        assert_eq!(LifecycleId::new(u64::MAX).next().get(), u64::MAX);
    }

    #[test]
    fn presented_event_serializes_with_identifier_text() {
        let event = Event::PatternPresented {
            lifecycle: LifecycleId::new(3),
            pattern: PatternId::new("glitched_inputs"),
            escapable: true,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("glitched_inputs"), "unexpected json: {json}");
    }

    #[test]
    fn phase_round_trips_through_json() {
        let encoded = serde_json::to_string(&Phase::ExitedSpiral).expect("serialize");
        let decoded: Phase = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, Phase::ExitedSpiral);
    }
}
