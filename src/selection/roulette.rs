//! Fitness-proportional (roulette wheel) selection

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::fitness::traits::FitnessValue;
use crate::genome::traits::EvolutionaryGenome;
use crate::population::population::Population;
use crate::selection::{gather, Selection};

/// Samples `count` individuals with replacement, with probability
/// proportional to sense-adjusted fitness.
///
/// Fitness is first mapped to a "higher is better" scale and shifted so
/// the smallest weight is non-negative. Non-finite fitness gets weight 0.
/// When every weight is zero the pick is uniform.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouletteSelection {
    offset: f64,
}

impl RouletteSelection {
    pub fn new() -> Self {
        Self { offset: 0.0 }
    }

    /// Extra constant added to every weight after shifting
    pub fn with_offset(offset: f64) -> Self {
        Self {
            offset: offset.max(0.0),
        }
    }

    fn weights<G, F>(&self, population: &Population<G, F>) -> Vec<f64>
    where
        G: EvolutionaryGenome,
        F: FitnessValue,
    {
        let sense = population.sense();
        let scaled: Vec<Option<f64>> = population
            .iter()
            .map(|i| {
                let f = i.fitness_f64();
                f.is_finite().then(|| sense.to_maximization(f))
            })
            .collect();
        let min = scaled
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let shift = if min.is_finite() && min < 0.0 { -min } else { 0.0 };
        scaled
            .into_iter()
            .map(|s| s.map_or(0.0, |v| v + shift + self.offset))
            .collect()
    }
}

impl Selection for RouletteSelection {
    fn name(&self) -> &'static str {
        "roulette"
    }

    fn select<G, F, R>(
        &self,
        population: &Population<G, F>,
        count: usize,
        rng: &mut R,
    ) -> Population<G, F>
    where
        G: EvolutionaryGenome,
        F: FitnessValue,
        R: Rng,
    {
        let n = population.len();
        if n == 0 {
            return gather(population, &[]);
        }
        let weights = self.weights(population);
        let picks: Vec<usize> = match WeightedIndex::new(&weights) {
            Ok(dist) => (0..count).map(|_| dist.sample(rng)).collect(),
            // All-zero or invalid weights
            Err(_) => (0..count).map(|_| rng.gen_range(0..n)).collect(),
        };
        gather(population, &picks)
    }
}
