use std::collections::HashMap;

use dark_spiral_catalog::{Catalog, CatalogParts, PLACEHOLDER_PATTERN};
use dark_spiral_core::{Command, Event, PatternId, ScriptedRandom, SeededRandom};
use dark_spiral_scoring::{apply, query, ScoringState};
use dark_spiral_system_pattern_selector::{pattern_weight, PatternSelector, EXHAUSTION_DEPTH_BUMP};

fn state_with(commands: Vec<Command>) -> ScoringState {
    let mut state = ScoringState::new();
    let mut events = Vec::new();
    for command in commands {
        apply(&mut state, command, &mut events);
    }
    state
}

fn learn_everything(catalog: &Catalog) -> Vec<Command> {
    catalog
        .patterns()
        .iter()
        .map(|pattern| Command::MarkLearned {
            pattern: pattern.id,
        })
        .collect()
}

#[test]
fn glitched_inputs_weight_at_fresh_state() {
    let catalog = Catalog::standard();
    let pattern = catalog
        .pattern(PatternId::new("glitched_inputs"))
        .expect("glitched_inputs present");
    let state = ScoringState::new();

    assert_eq!(pattern_weight(pattern, &state), 7);
}

#[test]
fn weights_invert_with_frustration_and_depth() {
    let catalog = Catalog::standard();
    let pattern = catalog
        .pattern(PatternId::new("glitched_inputs"))
        .expect("glitched_inputs present");
    let state = state_with(vec![
        Command::IncreaseFrustration { amount: 8.0 },
        Command::BumpDepth { levels: 6 },
    ]);

    assert_eq!(pattern_weight(pattern, &state), (6 - 4) + 3);
}

#[test]
fn weights_stay_within_range() {
    let catalog = Catalog::standard();
    for commands in [
        Vec::new(),
        vec![Command::IncreaseFrustration { amount: 12.0 }],
        vec![Command::BumpDepth { levels: 9 }],
    ] {
        let state = state_with(commands);
        for pattern in catalog.patterns() {
            let weight = pattern_weight(pattern, &state);
            assert!((2..=10).contains(&weight), "{} weighed {weight}", pattern.id);
        }
    }
}

#[test]
fn empirical_frequencies_match_weights() {
    let catalog = Catalog::standard();
    let state = ScoringState::new();
    let selector = PatternSelector::new();
    let mut rng = SeededRandom::new(0x0dd5_eed5);
    let trials = 20_000;

    let mut counts: HashMap<PatternId, usize> = HashMap::new();
    for _ in 0..trials {
        let mut commands = Vec::new();
        let selection = selector.select_next(&state, &catalog, &mut rng, &mut commands);
        assert!(commands.is_empty());
        *counts.entry(selection.pattern.id).or_default() += 1;
    }

    let total: u32 = catalog
        .patterns()
        .iter()
        .map(|pattern| pattern_weight(pattern, &state))
        .sum();
    for pattern in catalog.patterns() {
        let expected = f64::from(pattern_weight(pattern, &state)) / f64::from(total);
        let observed = counts.get(&pattern.id).copied().unwrap_or(0) as f64 / trials as f64;
        assert!(
            (expected - observed).abs() < 0.015,
            "{}: expected {expected:.4}, observed {observed:.4}",
            pattern.id
        );
    }
}

#[test]
fn learned_patterns_are_skipped_at_shallow_depth() {
    let catalog = Catalog::standard();
    let keep = catalog.patterns()[3].id;
    let commands = catalog
        .patterns()
        .iter()
        .filter(|pattern| pattern.id != keep)
        .map(|pattern| Command::MarkLearned {
            pattern: pattern.id,
        })
        .collect();
    let state = state_with(commands);
    let mut rng = SeededRandom::new(7);

    for _ in 0..50 {
        let mut out = Vec::new();
        let selection = PatternSelector::new().select_next(&state, &catalog, &mut rng, &mut out);
        assert_eq!(selection.pattern.id, keep);
        assert!(!selection.exhausted);
    }
}

#[test]
fn learned_patterns_may_repeat_beyond_depth_five() {
    let catalog = Catalog::standard();
    let mut commands = learn_everything(&catalog);
    commands.push(Command::BumpDepth { levels: 6 });
    let state = state_with(commands);

    // Every admission roll passes, then a zero selection draw.
    let mut draws = vec![0.9; catalog.patterns().len()];
    draws.extend([0.0, 0.1]);
    let mut rng = ScriptedRandom::new(draws);
    let mut out = Vec::new();

    let selection = PatternSelector::new().select_next(&state, &catalog, &mut rng, &mut out);
    assert_eq!(selection.pattern.id, catalog.patterns()[0].id);
    assert!(!selection.exhausted);
    assert!(!selection.escapable);
    assert!(out.is_empty(), "repeats must not bump depth");
}

#[test]
fn exhaustion_bumps_depth_by_five_and_returns_catalog_pattern() {
    let catalog = Catalog::standard();
    let mut state = state_with(learn_everything(&catalog));
    assert_eq!(query::spiral_depth(&state), 0);

    let mut rng = SeededRandom::new(99);
    let mut commands = Vec::new();
    let selection = PatternSelector::new().select_next(&state, &catalog, &mut rng, &mut commands);

    assert!(selection.exhausted);
    assert!(catalog.pattern(selection.pattern.id).is_some());
    assert_eq!(
        commands,
        vec![Command::BumpDepth {
            levels: EXHAUSTION_DEPTH_BUMP
        }]
    );

    let mut events = Vec::new();
    for command in commands {
        apply(&mut state, command, &mut events);
    }
    assert_eq!(query::spiral_depth(&state), 5);
    assert_eq!(
        events,
        vec![Event::DepthChanged {
            previous: 0,
            current: 5
        }]
    );
}

#[test]
fn empty_catalog_yields_placeholder() {
    let standard = Catalog::standard();
    let catalog = Catalog::new(CatalogParts {
        patterns: Vec::new(),
        badges: standard.badges().to_vec(),
        hidden_scenes: standard.hidden_scenes().to_vec(),
        ux_laws: standard.ux_laws().to_vec(),
        error_overrides: standard.error_overrides().to_vec(),
        completion_badges: Vec::new(),
        narration: *standard.narration(),
    })
    .expect("empty pattern list is valid");

    let mut rng = SeededRandom::new(1);
    let mut commands = Vec::new();
    let selection =
        PatternSelector::new().select_next(&ScoringState::new(), &catalog, &mut rng, &mut commands);

    assert_eq!(selection.pattern.id, PLACEHOLDER_PATTERN.id);
    assert!(selection.exhausted);
}

#[test]
fn high_frustration_forces_escapability() {
    let catalog = Catalog::standard();
    let state = state_with(vec![Command::IncreaseFrustration { amount: 8.5 }]);
    let mut rng = ScriptedRandom::constant(0.0);
    let mut out = Vec::new();

    let selection = PatternSelector::new().select_next(&state, &catalog, &mut rng, &mut out);
    assert!(selection.escapable);
}

#[test]
fn escape_roll_alone_grants_escapability() {
    let catalog = Catalog::standard();
    let state = ScoringState::new();
    let mut rng = ScriptedRandom::new(vec![0.0, 0.75]);
    let mut out = Vec::new();

    let selection = PatternSelector::new().select_next(&state, &catalog, &mut rng, &mut out);
    assert!(selection.escapable);
}
