#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted selection of the next pattern to present.
//!
//! Selection reads the scoring state and catalog, draws from the supplied
//! random source, and never mutates state directly: the only side effect,
//! the depth bump that accompanies catalog exhaustion, is emitted as a
//! [`Command`] for the orchestrator to apply.

use dark_spiral_catalog::{Catalog, PLACEHOLDER_PATTERN};
use dark_spiral_core::{Command, Pattern, RandomSource};
use dark_spiral_scoring::{query, ScoringState};

/// Depth added when every pattern has been learned.
pub const EXHAUSTION_DEPTH_BUMP: u32 = 5;

/// Depth beyond which learned patterns may repeat.
const REPEAT_DEPTH: u32 = 5;
/// Roll a learned pattern must exceed to be admitted again.
const REPEAT_ROLL: f64 = 0.7;
/// Frustration beyond which gentler patterns are favoured.
const GENTLE_ABOVE: f32 = 7.0;
/// Depth beyond which harder patterns are favoured.
const HARDER_ABOVE: u32 = 5;
/// Roll that makes a pattern escapable regardless of frustration.
const ESCAPE_ROLL: f64 = 0.7;
/// Frustration beyond which every pattern is escapable.
const ESCAPE_ABOVE: f32 = 8.0;
/// Ratings are expressed on a one-to-five scale.
const RATING_CEILING: u32 = 6;

/// Outcome of a selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection<'a> {
    /// Pattern to present next.
    pub pattern: &'a Pattern,
    /// Advisory flag telling the collaborator to offer a visible exit.
    pub escapable: bool,
    /// Whether the catalog was exhausted and the selection ignored eligibility.
    pub exhausted: bool,
}

/// Pure system choosing the next pattern for the spiral.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternSelector;

impl PatternSelector {
    /// Creates a new selector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Chooses the next pattern, emitting a depth bump when the catalog is exhausted.
    ///
    /// Draw order: one admission roll per learned pattern (only beyond the
    /// repeat depth), one selection draw, then one escapability roll.
    pub fn select_next<'a, R>(
        &self,
        state: &ScoringState,
        catalog: &'a Catalog,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> Selection<'a>
    where
        R: RandomSource + ?Sized,
    {
        let depth = query::spiral_depth(state);
        let eligible: Vec<&Pattern> = catalog
            .patterns()
            .iter()
            .filter(|pattern| {
                !query::is_learned(state, pattern.id)
                    || (depth > REPEAT_DEPTH && rng.roll_above(REPEAT_ROLL))
            })
            .collect();

        let (pattern, exhausted) = if eligible.is_empty() {
            out.push(Command::BumpDepth {
                levels: EXHAUSTION_DEPTH_BUMP,
            });
            log::info!("pattern catalog exhausted at depth {depth}; repeating from full catalog");
            (pick_uniform(catalog, rng), true)
        } else {
            (pick_weighted(state, &eligible, rng), false)
        };

        let escapable = rng.roll_above(ESCAPE_ROLL) || query::frustration(state) > ESCAPE_ABOVE;

        Selection {
            pattern,
            escapable,
            exhausted,
        }
    }
}

/// Selection weight of `pattern` under the current state, in `2..=10`.
#[must_use]
pub fn pattern_weight(pattern: &Pattern, state: &ScoringState) -> u32 {
    let frustration_factor = u32::from(pattern.frustration_factor);
    let difficulty = u32::from(pattern.difficulty);

    let frustration_weight = if query::frustration(state) > GENTLE_ABOVE {
        RATING_CEILING.saturating_sub(frustration_factor)
    } else {
        frustration_factor
    };
    let difficulty_weight = if query::spiral_depth(state) > HARDER_ABOVE {
        difficulty
    } else {
        RATING_CEILING.saturating_sub(difficulty)
    };

    frustration_weight + difficulty_weight
}

fn pick_weighted<'a, R>(state: &ScoringState, eligible: &[&'a Pattern], rng: &mut R) -> &'a Pattern
where
    R: RandomSource + ?Sized,
{
    let weights: Vec<u32> = eligible
        .iter()
        .map(|pattern| pattern_weight(pattern, state))
        .collect();
    let draw = rng.next_unit();
    let index = weighted_index(&weights, draw).unwrap_or_else(|| {
        log::warn!("weighted draw {draw} selected nothing; using first eligible pattern");
        0
    });
    eligible.get(index).copied().unwrap_or(&PLACEHOLDER_PATTERN)
}

fn pick_uniform<'a, R>(catalog: &'a Catalog, rng: &mut R) -> &'a Pattern
where
    R: RandomSource + ?Sized,
{
    let patterns = catalog.patterns();
    match rng.pick_index(patterns.len()) {
        Some(index) => &patterns[index],
        None => {
            log::warn!("pattern catalog is empty; presenting placeholder challenge");
            &PLACEHOLDER_PATTERN
        }
    }
}

/// Walks `weights` subtracting each from `draw * total` until the remainder is spent.
///
/// Returns `None` when the weights sum to zero or the remainder is never
/// spent.
fn weighted_index(weights: &[u32], draw: f64) -> Option<usize> {
    let total: u64 = weights.iter().map(|weight| u64::from(*weight)).sum();
    if total == 0 {
        return None;
    }

    let mut remaining = draw * total as f64;
    for (index, weight) in weights.iter().enumerate() {
        remaining -= f64::from(*weight);
        if remaining <= 0.0 {
            return Some(index);
        }
    }
    None
}
