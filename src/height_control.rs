use crate::error::{Error, Result};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default probability with which a node is promoted one more level.
pub const DEFAULT_ITERATION_PROBABILITY: f64 = 0.5;

/// Source of node levels for a `SkipListMap`.
pub trait HeightControl {
    /// Probability with which a level draw keeps climbing.
    fn probability(&self) -> f64;

    /// Draws the level for a freshly inserted node. Must never return more
    /// than `ceiling`.
    fn random_level(&mut self, ceiling: usize) -> usize;
}

/// Generates levels following a geometric distribution: every success of a
/// coin with bias `probability` adds one level.
#[derive(Debug, Clone)]
pub struct GeometricalGenerator {
    iteration_probability_: f64,
    rng_: StdRng,
}

impl GeometricalGenerator {
    pub fn new(iteration_probability: f64) -> Result<GeometricalGenerator> {
        Self::with_rng(iteration_probability, StdRng::from_entropy())
    }

    /// Builds a generator whose sequence of levels is fully determined by
    /// `seed`.
    pub fn with_seed(iteration_probability: f64, seed: u64) -> Result<GeometricalGenerator> {
        Self::with_rng(iteration_probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(iteration_probability: f64, rng: StdRng) -> Result<GeometricalGenerator> {
        // Written so that NaN is rejected as well.
        if !(iteration_probability > 0.0 && iteration_probability <= 1.0) {
            return Err(Error::InvalidProbability(iteration_probability));
        }

        Ok(GeometricalGenerator {
            iteration_probability_: iteration_probability,
            rng_: rng,
        })
    }
}

impl Default for GeometricalGenerator {
    fn default() -> Self {
        GeometricalGenerator {
            iteration_probability_: DEFAULT_ITERATION_PROBABILITY,
            rng_: StdRng::from_entropy(),
        }
    }
}

impl HeightControl for GeometricalGenerator {
    #[inline(always)]
    fn probability(&self) -> f64 {
        self.iteration_probability_
    }

    fn random_level(&mut self, ceiling: usize) -> usize {
        // Number of successes until the first failure, cut off at `ceiling`.
        let mut level = 0;

        while level < ceiling {
            let throw: f64 = self.rng_.gen();
            if throw >= self.iteration_probability_ {
                return level;
            }

            level += 1;
        }

        level
    }
}
