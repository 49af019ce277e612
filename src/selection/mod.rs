//! Selection
//!
//! Reduces a population to the individuals a model is fitted on. Selection
//! never mutates its input; the result is a fresh population that shares
//! the input's objective sense and generation.

pub mod roulette;
pub mod tournament;
pub mod truncation;

use rand::Rng;

use crate::fitness::traits::FitnessValue;
use crate::genome::traits::EvolutionaryGenome;
use crate::population::population::Population;

pub use roulette::RouletteSelection;
pub use tournament::TournamentSelection;
pub use truncation::TruncationSelection;

/// Picks `count` individuals from a population
pub trait Selection: Send + Sync {
    fn name(&self) -> &'static str;

    /// Select `count` individuals. Implementations clamp or sample with
    /// replacement as documented; an empty input yields an empty result.
    fn select<G, F, R>(
        &self,
        population: &Population<G, F>,
        count: usize,
        rng: &mut R,
    ) -> Population<G, F>
    where
        G: EvolutionaryGenome,
        F: FitnessValue,
        R: Rng;
}

/// Copy the individuals at `indices` into a new population
pub(crate) fn gather<G, F>(population: &Population<G, F>, indices: &[usize]) -> Population<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    let mut selected = Population::from_individuals(
        indices.iter().map(|&i| population[i].clone()).collect(),
        population.sense(),
    );
    selected.set_generation(population.generation());
    selected
}

pub mod prelude {
    pub use super::roulette::*;
    pub use super::tournament::*;
    pub use super::truncation::*;
    pub use super::Selection;
}
