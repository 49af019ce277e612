//! Truncation selection

use rand::Rng;

use crate::fitness::traits::FitnessValue;
use crate::genome::traits::EvolutionaryGenome;
use crate::population::population::Population;
use crate::selection::{gather, Selection};

/// Keeps the `count` best individuals.
///
/// Ties keep their population order. `count` above the population size is
/// clamped to the population size.
#[derive(Clone, Copy, Debug, Default)]
pub struct TruncationSelection;

impl TruncationSelection {
    pub fn new() -> Self {
        Self
    }
}

impl Selection for TruncationSelection {
    fn name(&self) -> &'static str {
        "truncation"
    }

    fn select<G, F, R>(
        &self,
        population: &Population<G, F>,
        count: usize,
        _rng: &mut R,
    ) -> Population<G, F>
    where
        G: EvolutionaryGenome,
        F: FitnessValue,
        R: Rng,
    {
        let mut ranked = population.ranked_indices();
        ranked.truncate(count);
        gather(population, &ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::ObjectiveSense;
    use crate::genome::real_vector::RealVector;
    use crate::population::individual::Individual;
    use crate::rng::RngStream;

    fn population(sense: ObjectiveSense) -> Population<RealVector> {
        let values = [5.0, 1.0, 3.0, 1.0, 4.0];
        Population::from_individuals(
            values
                .iter()
                .enumerate()
                .map(|(i, &f)| Individual::with_fitness(RealVector::from([i as f64]), f))
                .collect(),
            sense,
        )
    }

    #[test]
    fn test_keeps_best_minimize() {
        let pop = population(ObjectiveSense::Minimize);
        let mut rng = RngStream::from_seed(0);
        let sel = TruncationSelection.select(&pop, 3, &mut rng);
        let ids: Vec<f64> = sel.iter().map(|i| i.genome[0]).collect();
        // Fitness 1.0 appears at indices 1 and 3; population order is kept
        assert_eq!(ids, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_keeps_best_maximize() {
        let pop = population(ObjectiveSense::Maximize);
        let mut rng = RngStream::from_seed(0);
        let sel = TruncationSelection.select(&pop, 2, &mut rng);
        let values: Vec<f64> = sel.iter().map(|i| i.fitness_f64()).collect();
        assert_eq!(values, vec![5.0, 4.0]);
        assert_eq!(sel.sense(), ObjectiveSense::Maximize);
    }

    #[test]
    fn test_count_is_clamped() {
        let pop = population(ObjectiveSense::Minimize);
        let mut rng = RngStream::from_seed(0);
        assert_eq!(TruncationSelection.select(&pop, 50, &mut rng).len(), 5);
        assert!(TruncationSelection.select(&pop, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_input_untouched() {
        let pop = population(ObjectiveSense::Minimize);
        let before: Vec<f64> = pop.iter().map(|i| i.fitness_f64()).collect();
        let mut rng = RngStream::from_seed(0);
        let _ = TruncationSelection.select(&pop, 2, &mut rng);
        let after: Vec<f64> = pop.iter().map(|i| i.fitness_f64()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reselection_is_idempotent() {
        let pop = population(ObjectiveSense::Minimize);
        let mut rng = RngStream::from_seed(0);
        let once = TruncationSelection.select(&pop, 3, &mut rng);
        let twice = TruncationSelection.select(&once, 3, &mut rng);
        assert_eq!(once.individuals(), twice.individuals());
    }
}
