#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Narrator scheduler owning every piece of narrative display state.
//!
//! The narrator holds the single speech-bubble slot (last write wins, with
//! an auto-hide deadline), the usability-law overlay, the exclusive override
//! takeover, fake error pages, and the glitch intensity. It rolls ambient
//! lines on a fixed interval, detects idle players, and fires hidden scenes
//! when frustration reaches a new highest threshold. All timers live on the
//! narrator's own [`Timeline`] and are cancelled by [`Narrator::shutdown`].
//!
//! The narrator never writes scoring state. Anything it needs recorded,
//! such as the threshold of a fired hidden scene, is emitted as a
//! [`Command`] for the orchestrator to apply.

use std::time::Duration;

use dark_spiral_catalog::Catalog;
use dark_spiral_core::{
    choose, Command, ErrorOverride, Event, LifecycleId, RandomSource, UxLaw, GLITCH_MAX,
};
use dark_spiral_scoring::{query, ScoringState};
use dark_spiral_timeline::{TaskHandle, Timeline};

mod tuning;

pub use tuning::NarratorTuning;

/// Ambient roll threshold before chaos and suspicion lower it.
const AMBIENT_BASE_THRESHOLD: f64 = 0.7;
/// Threshold reduction per chaos level.
const AMBIENT_CHAOS_WEIGHT: f64 = 0.05;
/// Threshold reduction per suspicion point.
const AMBIENT_SUSPICION_WEIGHT: f64 = 0.03;
/// Suspicion beyond which suspicious lines join the ambient pool.
const SUSPICION_POOL_ABOVE: f32 = 5.0;
/// Chaos beyond which chaotic lines join the ambient pool.
const CHAOS_POOL_ABOVE: u8 = 3;
/// Suspicion added each time the idle line fires.
const IDLE_SUSPICION: f32 = 1.0;
/// Glitch change applied by an override takeover.
const OVERRIDE_GLITCH_STEP: u8 = 3;
/// Depth from which the narrator starts invading the interface.
const INVASIVE_DEPTH: u32 = 10;
/// Chance of a usability law on each deep depth change.
const INVASIVE_LAW_CHANCE: f64 = 0.2;
/// Chance of a takeover on each deep depth change.
const INVASIVE_OVERRIDE_CHANCE: f64 = 0.1;
/// Ceiling of the depth-driven glitch floor.
const INVASIVE_GLITCH_CEILING: u32 = 5;
/// Glitch spike caused by the interface rebellion scene.
const REBELLION_GLITCH: u8 = 5;
/// Level the rebellion spike decays to.
const REBELLION_GLITCH_SETTLED: u8 = 2;
/// Glitch forced by the narrator override scene.
const NARRATOR_OVERRIDE_GLITCH: u8 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NarratorTask {
    HideMessage,
    HideUxLaw,
    HideErrorOverride,
    SettleGlitch { from: u8, to: u8 },
    AmbientTick,
    IdlePoll,
}

/// Stateful narrator scheduler.
#[derive(Debug)]
pub struct Narrator {
    tuning: NarratorTuning,
    timeline: Timeline<NarratorTask>,
    message: Option<String>,
    message_deadline: Option<Duration>,
    hide_message: Option<TaskHandle>,
    ux_law: Option<UxLaw>,
    hide_ux_law: Option<TaskHandle>,
    takeover: Option<String>,
    error_override: Option<ErrorOverride>,
    hide_error_override: Option<TaskHandle>,
    glitch: u8,
    settle_glitch: Option<TaskHandle>,
    last_activity: Duration,
    idle_fired: bool,
    running: bool,
}

impl Default for Narrator {
    fn default() -> Self {
        Self::new(NarratorTuning::default())
    }
}

impl Narrator {
    /// Creates an idle narrator using the supplied timings.
    #[must_use]
    pub fn new(tuning: NarratorTuning) -> Self {
        Self {
            tuning,
            timeline: Timeline::new(),
            message: None,
            message_deadline: None,
            hide_message: None,
            ux_law: None,
            hide_ux_law: None,
            takeover: None,
            error_override: None,
            hide_error_override: None,
            glitch: 0,
            settle_glitch: None,
            last_activity: Duration::ZERO,
            idle_fired: false,
            running: false,
        }
    }

    /// Starts the ambient tick and the idle poll.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_activity = self.timeline.now();
        let _ = self.timeline.schedule_after(
            self.tuning.ambient_interval(),
            LifecycleId::SESSION,
            NarratorTask::AmbientTick,
        );
        let _ = self.timeline.schedule_after(
            self.tuning.idle_poll(),
            LifecycleId::SESSION,
            NarratorTask::IdlePoll,
        );
    }

    /// Cancels every outstanding narrator timer.
    pub fn shutdown(&mut self) {
        let cancelled = self.timeline.cancel_all();
        log::debug!("narrator shut down; cancelled {cancelled} timers");
        self.running = false;
        self.hide_message = None;
        self.hide_ux_law = None;
        self.hide_error_override = None;
        self.settle_glitch = None;
    }

    /// Current narrator time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// Due time of the next narrator timer.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timeline.next_due()
    }

    /// Moves the narrator clock to `until` without firing timers.
    pub fn settle(&mut self, until: Duration) {
        self.timeline.settle(until);
    }

    /// Fires the earliest timer due at or before `until`.
    ///
    /// Returns `false` when nothing was due.
    #[allow(clippy::too_many_arguments)]
    pub fn fire_next<R>(
        &mut self,
        until: Duration,
        state: &ScoringState,
        catalog: &Catalog,
        rng: &mut R,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let Some(fired) = self.timeline.pop_due(until) else {
            return false;
        };

        match fired.task {
            NarratorTask::HideMessage => {
                self.hide_message = None;
                self.message_deadline = None;
                if self.message.take().is_some() {
                    out_events.push(Event::MessageHidden);
                }
            }
            NarratorTask::HideUxLaw => {
                self.hide_ux_law = None;
                if self.ux_law.take().is_some() {
                    out_events.push(Event::UxLawHidden);
                }
            }
            NarratorTask::HideErrorOverride => {
                self.hide_error_override = None;
                if self.error_override.take().is_some() {
                    out_events.push(Event::ErrorOverrideHidden);
                }
            }
            NarratorTask::SettleGlitch { from, to } => {
                self.settle_glitch = None;
                if self.glitch == from {
                    self.set_glitch(to, out_events);
                }
            }
            NarratorTask::AmbientTick => {
                if self.takeover.is_none() {
                    self.tick_ambient(state, catalog, rng, out_events);
                }
                let _ = self.timeline.schedule_after(
                    self.tuning.ambient_interval(),
                    LifecycleId::SESSION,
                    NarratorTask::AmbientTick,
                );
            }
            NarratorTask::IdlePoll => {
                let idle = self.timeline.now().saturating_sub(self.last_activity);
                self.on_idle(idle, catalog, rng, out_commands, out_events);
                let _ = self.timeline.schedule_after(
                    self.tuning.idle_poll(),
                    LifecycleId::SESSION,
                    NarratorTask::IdlePoll,
                );
            }
        }
        true
    }

    /// Fires every timer due up to `until`, then moves the clock there.
    #[allow(clippy::too_many_arguments)]
    pub fn advance_to<R>(
        &mut self,
        until: Duration,
        state: &ScoringState,
        catalog: &Catalog,
        rng: &mut R,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) where
        R: RandomSource + ?Sized,
    {
        while self.fire_next(until, state, catalog, rng, out_commands, out_events) {}
        self.settle(until);
    }

    /// Replaces the speech-bubble message and restarts its auto-hide timer.
    pub fn set_message(&mut self, text: impl Into<String>, out_events: &mut Vec<Event>) {
        if let Some(handle) = self.hide_message.take() {
            let _ = self.timeline.cancel(handle);
        }
        let text = text.into();
        let display = self.tuning.message();
        self.message = Some(text.clone());
        self.message_deadline = Some(self.timeline.now().saturating_add(display));
        self.hide_message = Some(self.timeline.schedule_after(
            display,
            LifecycleId::SESSION,
            NarratorTask::HideMessage,
        ));
        out_events.push(Event::MessageShown { text });
    }

    /// Speaks a random line from `lines`. Returns `false` when `lines` is empty.
    pub fn speak_from<R>(
        &mut self,
        lines: &[&str],
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> bool
    where
        R: RandomSource + ?Sized,
    {
        match choose(rng, lines) {
            Some(line) => {
                self.set_message(*line, out_events);
                true
            }
            None => false,
        }
    }

    /// Rolls for an ambient line drawn from the pools the current state unlocks.
    pub fn tick_ambient<R>(
        &mut self,
        state: &ScoringState,
        catalog: &Catalog,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) where
        R: RandomSource + ?Sized,
    {
        let chaos = query::chaos_level(state);
        let suspicion = query::suspicion(state);
        let threshold = AMBIENT_BASE_THRESHOLD
            - f64::from(chaos) * AMBIENT_CHAOS_WEIGHT
            - f64::from(suspicion) * AMBIENT_SUSPICION_WEIGHT;
        if !rng.roll_above(threshold) {
            return;
        }

        let narration = catalog.narration();
        let mut pool: Vec<&str> = narration.base.to_vec();
        if suspicion > SUSPICION_POOL_ABOVE {
            pool.extend_from_slice(narration.suspicion);
        }
        if chaos > CHAOS_POOL_ABOVE {
            pool.extend_from_slice(narration.chaos);
        }
        if query::loop_count(state) > 0 {
            pool.extend_from_slice(narration.loops);
        }
        let _ = self.speak_from(&pool, rng, out_events);
    }

    /// Reacts to the player having been idle for `idle`.
    ///
    /// Fires at most once per idle episode and only while no message is shown.
    pub fn on_idle<R>(
        &mut self,
        idle: Duration,
        catalog: &Catalog,
        rng: &mut R,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) where
        R: RandomSource + ?Sized,
    {
        if idle <= self.tuning.idle_threshold() || self.message.is_some() || self.idle_fired {
            return;
        }
        if self.speak_from(catalog.narration().idle, rng, out_events) {
            self.idle_fired = true;
            out_commands.push(Command::RaiseSuspicion {
                amount: IDLE_SUSPICION,
            });
        }
    }

    /// Records player activity, ending the current idle episode.
    pub fn record_activity(&mut self) {
        self.last_activity = self.timeline.now();
        self.idle_fired = false;
    }

    /// Fires the highest reachable hidden scene if it exceeds the last one fired.
    pub fn check_hidden_scenes<R>(
        &mut self,
        state: &ScoringState,
        catalog: &Catalog,
        rng: &mut R,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) where
        R: RandomSource + ?Sized,
    {
        let Some(scene) = catalog.highest_scene_at(query::frustration(state)) else {
            return;
        };
        let is_new_high = query::highest_triggered_scene(state)
            .map_or(true, |recorded| scene.frustration_threshold > recorded);
        if !is_new_high {
            return;
        }

        log::info!(
            "hidden scene `{}` fired at threshold {}",
            scene.id,
            scene.frustration_threshold
        );
        out_commands.push(Command::RecordHiddenScene {
            threshold: scene.frustration_threshold,
        });
        out_events.push(Event::HiddenSceneTriggered { scene: scene.id });

        match scene.id.get() {
            "narrator_mockery" => self.trigger_ux_law(catalog, rng, out_events),
            "interface_rebellion" => {
                self.set_glitch(REBELLION_GLITCH, out_events);
                self.schedule_glitch_settle(REBELLION_GLITCH_SETTLED);
            }
            "meta_breakdown" => self.takeover_from_pool(catalog.narration().overrides, rng, out_events),
            "narrator_override" => {
                self.takeover_from_pool(catalog.narration().overrides, rng, out_events);
                self.set_glitch(NARRATOR_OVERRIDE_GLITCH, out_events);
                self.show_error_override(catalog, rng, out_events);
            }
            other => log::debug!("hidden scene `{other}` has no side effect"),
        }

        self.set_message(scene.narrator_line, out_events);
    }

    /// Applies depth-driven invasiveness after the spiral depth changed.
    pub fn depth_invasiveness<R>(
        &mut self,
        state: &ScoringState,
        catalog: &Catalog,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) where
        R: RandomSource + ?Sized,
    {
        let depth = query::spiral_depth(state);
        if depth < INVASIVE_DEPTH {
            return;
        }

        if rng.chance(INVASIVE_LAW_CHANCE) {
            self.trigger_ux_law(catalog, rng, out_events);
        }
        if rng.chance(INVASIVE_OVERRIDE_CHANCE) {
            self.takeover_from_pool(catalog.narration().invasive, rng, out_events);
        }

        let floor = ((depth - INVASIVE_DEPTH) / 2).min(INVASIVE_GLITCH_CEILING);
        let floor = u8::try_from(floor).unwrap_or(GLITCH_MAX);
        if self.glitch < floor {
            self.set_glitch(floor, out_events);
        }
    }

    /// Shows a random usability law in the overlay layer.
    pub fn trigger_ux_law<R>(&mut self, catalog: &Catalog, rng: &mut R, out_events: &mut Vec<Event>)
    where
        R: RandomSource + ?Sized,
    {
        let Some(law) = choose(rng, catalog.ux_laws()).copied() else {
            return;
        };
        if let Some(handle) = self.hide_ux_law.take() {
            let _ = self.timeline.cancel(handle);
        }
        self.ux_law = Some(law);
        self.hide_ux_law = Some(self.timeline.schedule_after(
            self.tuning.ux_law(),
            LifecycleId::SESSION,
            NarratorTask::HideUxLaw,
        ));
        out_events.push(Event::UxLawShown { name: law.name });
    }

    /// Enters the exclusive takeover mode until [`Narrator::dismiss_override`].
    ///
    /// Only the transition into takeover raises the glitch intensity; a
    /// takeover already on screen just has its text replaced.
    pub fn trigger_override(&mut self, message: impl Into<String>, out_events: &mut Vec<Event>) {
        let message = message.into();
        if self.takeover.is_none() {
            let raised = self.glitch.saturating_add(OVERRIDE_GLITCH_STEP);
            self.set_glitch(raised, out_events);
        }
        self.takeover = Some(message.clone());
        out_events.push(Event::OverrideEngaged { message });
    }

    /// Leaves takeover mode. Does nothing when no takeover is active.
    pub fn dismiss_override(&mut self, out_events: &mut Vec<Event>) {
        if self.takeover.take().is_none() {
            return;
        }
        let lowered = self.glitch.saturating_sub(OVERRIDE_GLITCH_STEP);
        self.set_glitch(lowered, out_events);
        out_events.push(Event::OverrideDismissed);
    }

    /// Shows a random fake error page for a limited time.
    pub fn show_error_override<R>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) where
        R: RandomSource + ?Sized,
    {
        let Some(page) = choose(rng, catalog.error_overrides()).copied() else {
            return;
        };
        if let Some(handle) = self.hide_error_override.take() {
            let _ = self.timeline.cancel(handle);
        }
        self.error_override = Some(page);
        self.hide_error_override = Some(self.timeline.schedule_after(
            self.tuning.error_override(),
            LifecycleId::SESSION,
            NarratorTask::HideErrorOverride,
        ));
        out_events.push(Event::ErrorOverrideShown { code: page.code });
    }

    /// Message currently in the speech bubble.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Instant at which the current message auto-hides.
    #[must_use]
    pub fn message_deadline(&self) -> Option<Duration> {
        self.message_deadline
    }

    /// Usability law currently in the overlay.
    #[must_use]
    pub fn ux_law(&self) -> Option<&UxLaw> {
        self.ux_law.as_ref()
    }

    /// Takeover text, when the override is active.
    #[must_use]
    pub fn takeover(&self) -> Option<&str> {
        self.takeover.as_deref()
    }

    /// Fake error page currently displayed.
    #[must_use]
    pub fn error_override(&self) -> Option<&ErrorOverride> {
        self.error_override.as_ref()
    }

    /// Current glitch intensity in `0..=10`.
    #[must_use]
    pub fn glitch_intensity(&self) -> u8 {
        self.glitch
    }

    fn takeover_from_pool<R>(&mut self, lines: &[&str], rng: &mut R, out_events: &mut Vec<Event>)
    where
        R: RandomSource + ?Sized,
    {
        let line = choose(rng, lines).copied().unwrap_or("...");
        self.trigger_override(line, out_events);
    }

    fn schedule_glitch_settle(&mut self, to: u8) {
        if let Some(handle) = self.settle_glitch.take() {
            let _ = self.timeline.cancel(handle);
        }
        self.settle_glitch = Some(self.timeline.schedule_after(
            self.tuning.glitch_decay(),
            LifecycleId::SESSION,
            NarratorTask::SettleGlitch {
                from: self.glitch,
                to,
            },
        ));
    }

    fn set_glitch(&mut self, level: u8, out_events: &mut Vec<Event>) {
        let previous = self.glitch;
        let current = level.min(GLITCH_MAX);
        if current != previous {
            self.glitch = current;
            out_events.push(Event::GlitchChanged { previous, current });
        }
    }
}
