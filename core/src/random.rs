//! Injectable randomness used by every roll the engine performs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniformly distributed values in `[0, 1)`.
///
/// Selection, ambient rolls, and threshold checks draw exclusively through
/// this trait so sessions can be replayed under a seeded or scripted source.
pub trait RandomSource {
    /// Draws the next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Rolls once and reports whether the draw exceeded `threshold`.
    fn roll_above(&mut self, threshold: f64) -> bool {
        self.next_unit() > threshold
    }

    /// Rolls once and reports whether the draw fell below `probability`.
    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }

    /// Draws an index in `0..len`, or `None` when `len` is zero.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let scaled = (self.next_unit() * len as f64).floor();
        let index = if scaled.is_finite() && scaled > 0.0 {
            scaled as usize
        } else {
            0
        };
        Some(index.min(len - 1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Picks a uniformly random element, or `None` when `items` is empty.
pub fn choose<'a, T, R>(rng: &mut R, items: &'a [T]) -> Option<&'a T>
where
    R: RandomSource + ?Sized,
{
    rng.pick_index(items.len()).and_then(|index| items.get(index))
}

/// ChaCha-backed source seeded from a single `u64`.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a source whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling once the list is exhausted.
///
/// An empty script always yields `0.0`.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Creates a scripted source from the provided draws.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Creates a source that returns `value` forever.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws taken so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
