#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Top-level controller sequencing the spiral.
//!
//! [`Spiral`] owns the scoring state, the narrator, and the session clock.
//! It cycles through Loading, Presenting, and Completed or Failed phases,
//! applies every scoring command through
//! [`dark_spiral_scoring::apply`], and reacts to the resulting events by
//! re-deriving chaos, checking hidden scenes, and applying depth
//! invasiveness. Collaborator callbacks carry the [`LifecycleId`] of the
//! presentation they belong to; anything stale is ignored.

use std::time::Duration;

use dark_spiral_catalog::Catalog;
use dark_spiral_core::{
    choose, Badge, Command, Event, LifecycleId, Pattern, Phase, RandomSource, SceneId,
    SeededRandom, CHAOS_MAX,
};
use dark_spiral_scoring::{apply, query, ScoringState};
use dark_spiral_system_badge_awarder::award_for_completion;
use dark_spiral_system_narrator::Narrator;
use dark_spiral_system_pattern_selector::PatternSelector;
use dark_spiral_timeline::Timeline;

mod tuning;
mod view;

pub use tuning::SpiralTuning;
pub use view::{SessionReport, ShellView};

/// Roll a loading phase must exceed to speak a depth line.
const DEPTH_LINE_ROLL: f64 = 0.7;
/// Roll a completion must exceed to leave the spiral early.
const EXIT_ROLL: f64 = 0.9;
/// Frustration added by a failure on a pattern without its own increment.
const DEFAULT_FAILURE_INCREMENT: f32 = 2.0;
/// Suspicion added by every failure.
const FAILURE_SUSPICION: f32 = 0.5;
/// Frustration relieved by every completion.
const COMPLETION_RELIEF: f32 = 1.0;
/// Frustration beyond which a failure may show a usability law.
const FAILURE_LAW_ABOVE: f32 = 8.0;
/// Roll that must be exceeded for the failure usability law.
const FAILURE_LAW_ROLL: f64 = 0.6;
/// Frustration beyond which a failure may start a takeover.
const FAILURE_OVERRIDE_ABOVE: f32 = 12.0;
/// Roll that must be exceeded for the failure takeover.
const FAILURE_OVERRIDE_ROLL: f64 = 0.7;
/// Frustration points per chaos level.
const FRUSTRATION_PER_CHAOS: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SpiralTask {
    FinishLoading,
    BeginLoading,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Presentation {
    pattern: Pattern,
    escapable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NextTimer {
    Spiral(Duration),
    Narrator(Duration),
}

/// One spiral session driven by the supplied random source.
#[derive(Debug)]
pub struct Spiral<R> {
    catalog: Catalog,
    tuning: SpiralTuning,
    rng: R,
    state: ScoringState,
    selector: PatternSelector,
    narrator: Narrator,
    timeline: Timeline<SpiralTask>,
    phase: Phase,
    lifecycle: LifecycleId,
    current: Option<Presentation>,
    badge_toast: Option<Badge>,
    presentations: u32,
    completions: u32,
    failures: u32,
    hidden_scenes: Vec<SceneId>,
}

impl Spiral<SeededRandom> {
    /// Creates a session over the standard catalog seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64, tuning: SpiralTuning) -> Self {
        Self::new(Catalog::standard(), tuning, SeededRandom::new(seed))
    }
}

impl<R: RandomSource> Spiral<R> {
    /// Creates a dormant session with fresh scoring state.
    #[must_use]
    pub fn new(catalog: Catalog, tuning: SpiralTuning, rng: R) -> Self {
        Self::resume(catalog, tuning, rng, ScoringState::new())
    }

    /// Creates a dormant session continuing from an existing scoring state.
    #[must_use]
    pub fn resume(catalog: Catalog, tuning: SpiralTuning, rng: R, state: ScoringState) -> Self {
        Self {
            catalog,
            narrator: Narrator::new(tuning.narrator),
            tuning,
            rng,
            state,
            selector: PatternSelector::new(),
            timeline: Timeline::new(),
            phase: Phase::Dormant,
            lifecycle: LifecycleId::SESSION,
            current: None,
            badge_toast: None,
            presentations: 0,
            completions: 0,
            failures: 0,
            hidden_scenes: Vec::new(),
        }
    }

    /// Starts the narrator and enters the first loading phase.
    ///
    /// Does nothing unless the session is dormant.
    pub fn start(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Dormant {
            log::debug!("ignoring start while {:?}", self.phase);
            return;
        }
        log::info!("spiral session starting");
        self.narrator.start();
        self.enter_loading(out_events);
    }

    /// Advances simulated time by `dt`, firing every timer that falls due.
    ///
    /// Orchestrator and narrator timers fire in due order; on a tie the
    /// orchestrator timer fires first.
    pub fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let target = self.timeline.now().saturating_add(dt);

        loop {
            let spiral_due = self.timeline.next_due().filter(|due| *due <= target);
            let narrator_due = self.narrator.next_due().filter(|due| *due <= target);
            let next = match (spiral_due, narrator_due) {
                (None, None) => break,
                (Some(spiral), Some(narrator)) if narrator < spiral => {
                    NextTimer::Narrator(narrator)
                }
                (Some(spiral), _) => NextTimer::Spiral(spiral),
                (None, Some(narrator)) => NextTimer::Narrator(narrator),
            };

            match next {
                NextTimer::Spiral(due) => {
                    self.narrator.settle(due);
                    self.fire_spiral_timer(due, out_events);
                }
                NextTimer::Narrator(due) => {
                    self.timeline.settle(due);
                    self.fire_narrator_timer(due, out_events);
                }
            }
        }

        self.timeline.settle(target);
        self.narrator.settle(target);
    }

    /// Terminal callback: the collaborator reports the pattern was completed.
    ///
    /// Returns `false` when the call was ignored as stale, repeated, or
    /// out of phase.
    pub fn complete(&mut self, token: LifecycleId, out_events: &mut Vec<Event>) -> bool {
        let Some(presentation) = self.accept_callback(token, "complete") else {
            return false;
        };
        let pattern = presentation.pattern;
        self.narrator.record_activity();
        self.completions = self.completions.saturating_add(1);
        self.set_phase(Phase::Completed, out_events);

        let mut commands = vec![Command::MarkLearned {
            pattern: pattern.id,
        }];
        let badge = award_for_completion(pattern.id, &self.catalog, &mut self.rng).copied();
        let mut narrator_events = Vec::new();
        if let Some(badge) = badge {
            commands.push(Command::AwardBadge { badge: badge.id });
            self.badge_toast = Some(badge);
            narrator_events.push(Event::BadgeToast { badge: badge.id });
            self.narrator.set_message(
                format!("{} {}", badge.microcopy, badge.lesson),
                &mut narrator_events,
            );
        }
        commands.extend([
            Command::RecordCompletion {
                pattern: pattern.id,
            },
            Command::BumpDepth { levels: 1 },
            Command::RelieveFrustration {
                amount: COMPLETION_RELIEF,
            },
        ]);
        self.publish(narrator_events, out_events);
        self.execute_and_react(commands, out_events);

        let depth = query::spiral_depth(&self.state);
        if depth > self.tuning.exit_depth || self.rng.roll_above(EXIT_ROLL) {
            self.exit_spiral(out_events);
        } else {
            let _ = self.timeline.schedule_after(
                self.tuning.completion_delay(),
                self.lifecycle,
                SpiralTask::BeginLoading,
            );
        }
        true
    }

    /// Terminal callback: the collaborator reports the pattern was failed.
    ///
    /// Returns `false` when the call was ignored as stale, repeated, or
    /// out of phase.
    pub fn fail(&mut self, token: LifecycleId, out_events: &mut Vec<Event>) -> bool {
        let Some(presentation) = self.accept_callback(token, "fail") else {
            return false;
        };
        let pattern = presentation.pattern;
        self.narrator.record_activity();
        self.failures = self.failures.saturating_add(1);
        self.set_phase(Phase::Failed, out_events);

        let increment = pattern
            .frustration_increment
            .unwrap_or(DEFAULT_FAILURE_INCREMENT);
        let events = self.execute(
            vec![
                Command::IncreaseFrustration { amount: increment },
                Command::RecordFailure {
                    pattern: pattern.id,
                },
                Command::RaiseSuspicion {
                    amount: FAILURE_SUSPICION,
                },
            ],
            out_events,
        );

        let frustration = query::frustration(&self.state);
        let mut narrator_events = Vec::new();
        let lines = self
            .catalog
            .narration()
            .failure_lines(query::alignment(&self.state));
        let _ = self
            .narrator
            .speak_from(lines, &mut self.rng, &mut narrator_events);
        if frustration > FAILURE_LAW_ABOVE && self.rng.roll_above(FAILURE_LAW_ROLL) {
            self.narrator
                .trigger_ux_law(&self.catalog, &mut self.rng, &mut narrator_events);
        }
        if frustration > FAILURE_OVERRIDE_ABOVE && self.rng.roll_above(FAILURE_OVERRIDE_ROLL) {
            let line = choose(&mut self.rng, self.catalog.narration().overrides)
                .copied()
                .unwrap_or("...");
            self.narrator.trigger_override(line, &mut narrator_events);
        }
        self.publish(narrator_events, out_events);
        self.react(events, out_events);

        let _ = self.timeline.schedule_after(
            self.tuning.failure_delay(),
            self.lifecycle,
            SpiralTask::BeginLoading,
        );
        true
    }

    /// Additive frustration reported by the collaborator during a presentation.
    ///
    /// May be called any number of times before the terminal callback.
    pub fn increase_frustration(
        &mut self,
        token: LifecycleId,
        amount: f32,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if self.phase != Phase::Presenting || token != self.lifecycle {
            log::debug!("ignoring frustration report for {token:?} while {:?}", self.phase);
            return false;
        }
        self.narrator.record_activity();
        self.execute_and_react(vec![Command::IncreaseFrustration { amount }], out_events);
        true
    }

    /// Records user activity, ending the current idle episode.
    pub fn record_activity(&mut self) {
        self.narrator.record_activity();
    }

    /// Dismisses the narrator override takeover.
    pub fn dismiss_override(&mut self, out_events: &mut Vec<Event>) {
        let mut narrator_events = Vec::new();
        self.narrator.dismiss_override(&mut narrator_events);
        self.publish(narrator_events, out_events);
    }

    /// Explicit external reset of the spiral depth.
    pub fn reset_depth(&mut self, out_events: &mut Vec<Event>) {
        log::info!("spiral depth reset requested");
        self.execute_and_react(vec![Command::ResetDepth], out_events);
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Token of the current loading or presenting instance.
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleId {
        self.lifecycle
    }

    /// Simulated time since the session was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// Pattern currently in front of the player.
    #[must_use]
    pub fn current_pattern(&self) -> Option<&Pattern> {
        self.current.as_ref().map(|presentation| &presentation.pattern)
    }

    /// Read-only access to the scoring state.
    #[must_use]
    pub fn state(&self) -> &ScoringState {
        &self.state
    }

    /// Read-only access to the narrator.
    #[must_use]
    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    /// Catalog the session draws from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reports whether the session left the spiral.
    #[must_use]
    pub fn has_exited(&self) -> bool {
        self.phase == Phase::ExitedSpiral
    }

    /// Builds the view rendered by the UI shell.
    #[must_use]
    pub fn shell_view(&self) -> ShellView {
        ShellView {
            phase: self.phase,
            pattern_title: self.current.map(|presentation| presentation.pattern.title),
            pattern_description: self
                .current
                .map(|presentation| presentation.pattern.description),
            escapable: self.current.is_some_and(|presentation| presentation.escapable),
            narrator_message: self.narrator.message().map(str::to_owned),
            ux_law: self.narrator.ux_law().copied(),
            takeover: self.narrator.takeover().map(str::to_owned),
            error_override: self.narrator.error_override().copied(),
            glitch_intensity: self.narrator.glitch_intensity(),
            badge_toast: self.badge_toast,
            spiral_depth: query::spiral_depth(&self.state),
        }
    }

    /// Summarises the session so far.
    #[must_use]
    pub fn report(&self) -> SessionReport {
        SessionReport {
            elapsed_ms: self.timeline.now().as_millis(),
            presentations: self.presentations,
            completions: self.completions,
            failures: self.failures,
            hidden_scenes: self.hidden_scenes.clone(),
            exited: self.has_exited(),
            phase: self.phase,
            scoring: query::snapshot(&self.state),
        }
    }

    fn enter_loading(&mut self, out_events: &mut Vec<Event>) {
        let finished = self.timeline.cancel_owner(self.lifecycle);
        if finished > 0 {
            log::debug!("cancelled {finished} timers owned by {:?}", self.lifecycle);
        }
        self.lifecycle = self.lifecycle.next();
        self.current = None;
        self.badge_toast = None;
        self.set_phase(Phase::Loading, out_events);

        let mut narrator_events = Vec::new();
        if self.rng.roll_above(DEPTH_LINE_ROLL) {
            let lines = self
                .catalog
                .narration()
                .depth_lines(query::spiral_depth(&self.state));
            let _ = self
                .narrator
                .speak_from(lines, &mut self.rng, &mut narrator_events);
        }

        let mut commands = Vec::new();
        let selection =
            self.selector
                .select_next(&self.state, &self.catalog, &mut self.rng, &mut commands);
        let presentation = Presentation {
            pattern: *selection.pattern,
            escapable: selection.escapable,
        };
        if selection.exhausted {
            narrator_events.push(Event::SpiralExhausted);
            let _ = self.narrator.speak_from(
                self.catalog.narration().exhausted,
                &mut self.rng,
                &mut narrator_events,
            );
        }

        let pattern = presentation.pattern.id;
        let seen_before = query::memory(&self.state, pattern).is_some();
        commands.push(Command::RecordEncounter {
            pattern,
            at: self.timeline.now(),
        });
        self.publish(narrator_events, out_events);
        self.execute_and_react(commands, out_events);

        if seen_before {
            let attempts = query::memory(&self.state, pattern).map_or(0, |memory| memory.attempts);
            let mut narrator_events = Vec::new();
            self.narrator.set_message(
                format!("You have seen this one before. {attempts} attempts and counting."),
                &mut narrator_events,
            );
            self.publish(narrator_events, out_events);
        }

        self.current = Some(presentation);
        let _ = self.timeline.schedule_after(
            self.tuning.load_delay(),
            self.lifecycle,
            SpiralTask::FinishLoading,
        );
    }

    fn present(&mut self, out_events: &mut Vec<Event>) {
        let Some(presentation) = self.current else {
            log::warn!("loading finished without a selected pattern");
            return;
        };
        self.presentations = self.presentations.saturating_add(1);
        self.set_phase(Phase::Presenting, out_events);
        out_events.push(Event::PatternPresented {
            lifecycle: self.lifecycle,
            pattern: presentation.pattern.id,
            escapable: presentation.escapable,
        });
    }

    fn exit_spiral(&mut self, out_events: &mut Vec<Event>) {
        let depth = query::spiral_depth(&self.state);
        log::info!("leaving the spiral at depth {depth}");
        out_events.push(Event::ExitSpiral { depth });
        self.set_phase(Phase::ExitedSpiral, out_events);
        let _ = self.timeline.cancel_all();
        self.narrator.shutdown();
    }

    fn accept_callback(&self, token: LifecycleId, name: &str) -> Option<Presentation> {
        if self.phase != Phase::Presenting || token != self.lifecycle {
            log::debug!(
                "ignoring {name} for {token:?}; current {:?} is {:?}",
                self.lifecycle,
                self.phase
            );
            return None;
        }
        self.current
    }

    fn set_phase(&mut self, phase: Phase, out_events: &mut Vec<Event>) {
        log::debug!("phase {:?} -> {phase:?}", self.phase);
        self.phase = phase;
        out_events.push(Event::PhaseChanged {
            phase,
            lifecycle: self.lifecycle,
        });
    }

    fn fire_spiral_timer(&mut self, due: Duration, out_events: &mut Vec<Event>) {
        let Some(fired) = self.timeline.pop_due(due) else {
            return;
        };
        if fired.owner != self.lifecycle {
            log::debug!("dropping stale {:?} owned by {:?}", fired.task, fired.owner);
            return;
        }
        match (fired.task, self.phase) {
            (SpiralTask::FinishLoading, Phase::Loading) => self.present(out_events),
            (SpiralTask::BeginLoading, Phase::Completed | Phase::Failed) => {
                self.enter_loading(out_events);
            }
            (task, phase) => log::debug!("dropping {task:?} while {phase:?}"),
        }
    }

    fn fire_narrator_timer(&mut self, due: Duration, out_events: &mut Vec<Event>) {
        let mut commands = Vec::new();
        let mut narrator_events = Vec::new();
        let _ = self.narrator.fire_next(
            due,
            &self.state,
            &self.catalog,
            &mut self.rng,
            &mut commands,
            &mut narrator_events,
        );
        self.publish(narrator_events, out_events);
        self.execute_and_react(commands, out_events);
    }

    fn execute_and_react(&mut self, commands: Vec<Command>, out_events: &mut Vec<Event>) {
        let events = self.execute(commands, out_events);
        self.react(events, out_events);
    }

    /// Applies `commands` in order, returning the events they produced.
    ///
    /// The events are also appended to `out_events`.
    fn execute(&mut self, commands: Vec<Command>, out_events: &mut Vec<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(&mut self.state, command, &mut events);
        }
        out_events.extend(events.iter().cloned());
        events
    }

    /// Runs the reactive pass until no further commands are produced.
    ///
    /// Each batch re-derives chaos and checks hidden scenes at most once when
    /// frustration moved, and applies depth invasiveness at most once when
    /// the depth moved.
    fn react(&mut self, mut events: Vec<Event>, out_events: &mut Vec<Event>) {
        loop {
            let frustration_moved = events
                .iter()
                .any(|event| matches!(event, Event::FrustrationChanged { .. }));
            let depth_moved = events
                .iter()
                .any(|event| matches!(event, Event::DepthChanged { .. }));

            let mut commands = Vec::new();
            let mut narrator_events = Vec::new();
            if frustration_moved {
                let chaos = derived_chaos(query::frustration(&self.state));
                if chaos != query::chaos_level(&self.state) {
                    commands.push(Command::SetChaosLevel { level: chaos });
                }
                self.narrator.check_hidden_scenes(
                    &self.state,
                    &self.catalog,
                    &mut self.rng,
                    &mut commands,
                    &mut narrator_events,
                );
            }
            if depth_moved {
                self.narrator.depth_invasiveness(
                    &self.state,
                    &self.catalog,
                    &mut self.rng,
                    &mut narrator_events,
                );
            }
            self.publish(narrator_events, out_events);

            if commands.is_empty() {
                break;
            }
            events = self.execute(commands, out_events);
        }
    }

    fn publish(&mut self, events: Vec<Event>, out_events: &mut Vec<Event>) {
        for event in &events {
            if let Event::HiddenSceneTriggered { scene } = event {
                self.hidden_scenes.push(*scene);
            }
        }
        out_events.extend(events);
    }
}

/// Chaos level implied by a frustration score.
#[must_use]
pub fn derived_chaos(frustration: f32) -> u8 {
    let level = (frustration / FRUSTRATION_PER_CHAOS).round();
    if level.is_nan() || level <= 0.0 {
        0
    } else if level >= f32::from(CHAOS_MAX) {
        CHAOS_MAX
    } else {
        level as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaos_tracks_frustration_in_steps_of_one_and_a_half() {
        assert_eq!(derived_chaos(0.0), 0);
        assert_eq!(derived_chaos(0.7), 0);
        assert_eq!(derived_chaos(0.8), 1);
        assert_eq!(derived_chaos(6.0), 4);
        assert_eq!(derived_chaos(15.0), 10);
        assert_eq!(derived_chaos(f32::NAN), 0);
    }

    #[test]
    fn tuning_defaults_match_session_timings() {
        let tuning = SpiralTuning::default();
        assert_eq!(tuning.load_delay(), Duration::from_secs(2));
        assert_eq!(tuning.completion_delay(), Duration::from_secs(3));
        assert_eq!(tuning.failure_delay(), Duration::from_secs(2));
        assert_eq!(tuning.exit_depth, 15);
    }
}
