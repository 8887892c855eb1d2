use std::time::Duration;

use dark_spiral_system_narrator::NarratorTuning;
use serde::Deserialize;

/// Session timings and the exit depth, loadable from a TOML table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpiralTuning {
    /// Simulated delay between selecting a pattern and presenting it.
    pub load_ms: u64,
    /// Delay between a completion and the next loading phase.
    pub completion_ms: u64,
    /// Delay between a failure and the next loading phase.
    pub failure_ms: u64,
    /// Depth beyond which every completion leaves the spiral.
    pub exit_depth: u32,
    /// Narrator timer settings.
    pub narrator: NarratorTuning,
}

impl Default for SpiralTuning {
    fn default() -> Self {
        Self {
            load_ms: 2_000,
            completion_ms: 3_000,
            failure_ms: 2_000,
            exit_depth: 15,
            narrator: NarratorTuning::default(),
        }
    }
}

impl SpiralTuning {
    pub(crate) fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_ms)
    }

    pub(crate) fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_ms)
    }

    pub(crate) fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_ms)
    }
}
