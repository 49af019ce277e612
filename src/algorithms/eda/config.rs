//! Driver configuration and elitism policies

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::FitnessValue;
use crate::genome::traits::EvolutionaryGenome;
use crate::population::population::Population;

/// How previous-generation individuals survive into the next one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElitismPolicy {
    /// Offspring replace the population entirely
    None,
    /// The `k` best of the previous population compete with the offspring;
    /// the best `population_size` of the union survive
    PreserveBest(usize),
    /// The previous best replaces the worst offspring when it beats the
    /// best offspring
    #[default]
    ReplaceWorstIfBetter,
}

impl ElitismPolicy {
    /// Merge `previous` into `offspring` according to the policy.
    ///
    /// Both populations must be evaluated. The result keeps the size of
    /// `offspring` and the generation number of `offspring`.
    pub fn apply<G, F>(&self, previous: &Population<G, F>, mut offspring: Population<G, F>) -> Population<G, F>
    where
        G: EvolutionaryGenome,
        F: FitnessValue,
    {
        let size = offspring.len();
        match *self {
            ElitismPolicy::None => offspring,
            ElitismPolicy::PreserveBest(0) => offspring,
            ElitismPolicy::PreserveBest(k) => {
                let generation = offspring.generation();
                let elites = previous
                    .ranked_indices()
                    .into_iter()
                    .take(k)
                    .map(|i| previous[i].clone());
                let mut merged = Population::from_individuals(
                    elites.chain(offspring.into_individuals()).collect(),
                    previous.sense(),
                );
                merged.truncate_to_best(size);
                merged.set_generation(generation);
                merged
            }
            ElitismPolicy::ReplaceWorstIfBetter => {
                let sense = offspring.sense();
                let (Some(elite), Some(current)) = (previous.best(), offspring.best()) else {
                    return offspring;
                };
                if elite.is_better_than(current, sense) {
                    let elite = elite.clone();
                    if let Some(worst) = offspring.worst_index().and_then(|w| offspring.get_mut(w)) {
                        *worst = elite;
                    }
                }
                offspring
            }
        }
    }
}

/// Sizes, elitism and seed of one run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdaConfig {
    /// Individuals per generation
    pub population_size: usize,
    /// Individuals handed to the model each generation
    pub selection_size: usize,
    pub elitism: ElitismPolicy,
    /// Hard cap on generations, combined with any extra stopping condition
    pub max_generations: usize,
    /// Master seed for every random stream of the run
    pub seed: u64,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            selection_size: 50,
            elitism: ElitismPolicy::default(),
            max_generations: 100,
            seed: 42,
        }
    }
}

impl EdaConfig {
    /// Reject configurations the driver cannot run
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_size == 0 {
            return Err(EvolutionError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }
        if self.selection_size == 0 {
            return Err(EvolutionError::Configuration(
                "Selection size must be positive".to_string(),
            ));
        }
        if self.selection_size > self.population_size {
            return Err(EvolutionError::Configuration(format!(
                "Selection size {} exceeds population size {}",
                self.selection_size, self.population_size
            )));
        }
        if let ElitismPolicy::PreserveBest(k) = self.elitism {
            if k > self.population_size {
                return Err(EvolutionError::Configuration(format!(
                    "Cannot preserve {} elites in a population of {}",
                    k, self.population_size
                )));
            }
        }
        Ok(())
    }
}
