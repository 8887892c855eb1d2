use dark_spiral_core::{Badge, ErrorOverride, Phase, SceneId, UxLaw};
use dark_spiral_scoring::query::ScoringSnapshot;
use serde::Serialize;

/// Everything the UI shell renders for the current instant.
#[derive(Clone, Debug, PartialEq)]
pub struct ShellView {
    /// Lifecycle phase of the session.
    pub phase: Phase,
    /// Title of the pattern on screen.
    pub pattern_title: Option<&'static str>,
    /// Description of the pattern on screen.
    pub pattern_description: Option<&'static str>,
    /// Whether the pattern on screen should offer a visible exit.
    pub escapable: bool,
    /// Speech-bubble message.
    pub narrator_message: Option<String>,
    /// Usability law shown in the overlay layer.
    pub ux_law: Option<UxLaw>,
    /// Takeover text while the narrator override is active.
    pub takeover: Option<String>,
    /// Fake error page on screen.
    pub error_override: Option<ErrorOverride>,
    /// Glitch intensity in `0..=10`.
    pub glitch_intensity: u8,
    /// Badge toast raised by the latest completion.
    pub badge_toast: Option<Badge>,
    /// Stage counter.
    pub spiral_depth: u32,
}

/// Serializable summary of a session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionReport {
    /// Milliseconds of simulated time elapsed.
    pub elapsed_ms: u128,
    /// Patterns handed to the presenting collaborator.
    pub presentations: u32,
    /// Presentations that ended in completion.
    pub completions: u32,
    /// Presentations that ended in failure.
    pub failures: u32,
    /// Hidden scenes in firing order.
    pub hidden_scenes: Vec<SceneId>,
    /// Whether the session left the spiral.
    pub exited: bool,
    /// Final phase.
    pub phase: Phase,
    /// Final scoring state.
    pub scoring: ScoringSnapshot,
}
