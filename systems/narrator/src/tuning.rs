use std::time::Duration;

use serde::Deserialize;

/// Timing knobs controlling every narrator timer, expressed in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NarratorTuning {
    /// How long a speech-bubble message stays visible.
    pub message_ms: u64,
    /// Interval between ambient message rolls.
    pub ambient_interval_ms: u64,
    /// Idle duration that must be exceeded before the idle line fires.
    pub idle_threshold_ms: u64,
    /// Interval between idle checks.
    pub idle_poll_ms: u64,
    /// How long a usability law stays in the overlay.
    pub ux_law_ms: u64,
    /// Delay before a scene-induced glitch spike decays.
    pub glitch_decay_ms: u64,
    /// How long a fake error page stays visible.
    pub error_override_ms: u64,
}

impl Default for NarratorTuning {
    fn default() -> Self {
        Self {
            message_ms: 5_000,
            ambient_interval_ms: 10_000,
            idle_threshold_ms: 15_000,
            idle_poll_ms: 1_000,
            ux_law_ms: 6_000,
            glitch_decay_ms: 5_000,
            error_override_ms: 4_000,
        }
    }
}

impl NarratorTuning {
    pub(crate) fn message(&self) -> Duration {
        Duration::from_millis(self.message_ms)
    }

    pub(crate) fn ambient_interval(&self) -> Duration {
        Duration::from_millis(self.ambient_interval_ms.max(1))
    }

    pub(crate) fn idle_threshold(&self) -> Duration {
        Duration::from_millis(self.idle_threshold_ms)
    }

    pub(crate) fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms.max(1))
    }

    pub(crate) fn ux_law(&self) -> Duration {
        Duration::from_millis(self.ux_law_ms)
    }

    pub(crate) fn glitch_decay(&self) -> Duration {
        Duration::from_millis(self.glitch_decay_ms)
    }

    pub(crate) fn error_override(&self) -> Duration {
        Duration::from_millis(self.error_override_ms)
    }
}
