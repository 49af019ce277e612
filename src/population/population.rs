//! Population type
//!
//! An ordered collection of individuals that share one genotype length and
//! one objective sense. All rankings are sense-aware and stable, so ties keep
//! their original order.

use std::cmp::Ordering;

use crate::error::GenomeError;
use crate::fitness::traits::{FitnessValue, ObjectiveSense};
use crate::genome::traits::EvolutionaryGenome;
use crate::population::individual::Individual;

/// A population of individuals
#[derive(Clone, Debug)]
pub struct Population<G, F = f64>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    individuals: Vec<Individual<G, F>>,
    sense: ObjectiveSense,
    generation: usize,
}

impl<G, F> Population<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// Create an empty population
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            individuals: Vec::new(),
            sense,
            generation: 0,
        }
    }

    /// Create an empty population with the given capacity
    pub fn with_capacity(capacity: usize, sense: ObjectiveSense) -> Self {
        Self {
            individuals: Vec::with_capacity(capacity),
            sense,
            generation: 0,
        }
    }

    /// Create a population from a vector of individuals
    pub fn from_individuals(individuals: Vec<Individual<G, F>>, sense: ObjectiveSense) -> Self {
        Self {
            individuals,
            sense,
            generation: 0,
        }
    }

    /// Unevaluated population born in `generation`
    pub fn from_genomes(genomes: Vec<G>, sense: ObjectiveSense, generation: usize) -> Self {
        Self {
            individuals: genomes
                .into_iter()
                .map(|g| Individual::with_generation(g, generation))
                .collect(),
            sense,
            generation,
        }
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Individual<G, F>> {
        self.individuals.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Individual<G, F>> {
        self.individuals.get_mut(index)
    }

    /// Append an individual, rejecting a genotype length that differs from
    /// the rest of the population
    pub fn push(&mut self, individual: Individual<G, F>) -> Result<(), GenomeError> {
        if let Some(expected) = self.dimension() {
            let actual = individual.genome.dimension();
            if actual != expected {
                return Err(GenomeError::DimensionMismatch { expected, actual });
            }
        }
        self.individuals.push(individual);
        Ok(())
    }

    /// Remove and return the individual at `index`
    pub fn remove(&mut self, index: usize) -> Option<Individual<G, F>> {
        if index < self.individuals.len() {
            Some(self.individuals.remove(index))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual<G, F>> {
        self.individuals.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Individual<G, F>> {
        self.individuals.iter_mut()
    }

    pub fn individuals(&self) -> &[Individual<G, F>] {
        &self.individuals
    }

    pub fn into_individuals(self) -> Vec<Individual<G, F>> {
        self.individuals
    }

    /// Shared genotype length, `None` when empty
    pub fn dimension(&self) -> Option<usize> {
        self.individuals.first().map(|i| i.genome.dimension())
    }

    /// Whether every genotype has the same length
    pub fn is_uniform(&self) -> bool {
        match self.dimension() {
            Some(d) => self.individuals.iter().all(|i| i.genome.dimension() == d),
            None => true,
        }
    }

    /// Best individual under the population's sense; the first one wins ties
    pub fn best(&self) -> Option<&Individual<G, F>> {
        self.individuals.iter().reduce(|best, candidate| {
            if candidate.is_better_than(best, self.sense) {
                candidate
            } else {
                best
            }
        })
    }

    /// Index of the best individual
    pub fn best_index(&self) -> Option<usize> {
        self.ranked_indices().first().copied()
    }

    /// Worst individual under the population's sense; the last one wins ties
    pub fn worst(&self) -> Option<&Individual<G, F>> {
        self.worst_index().map(|i| &self.individuals[i])
    }

    /// Index of the worst individual
    pub fn worst_index(&self) -> Option<usize> {
        self.ranked_indices().last().copied()
    }

    /// Indices ordered best first; stable with respect to population order
    pub fn ranked_indices(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.individuals.len()).collect();
        order.sort_by(|&a, &b| self.compare_at(a, b));
        order
    }

    /// Stable sort, best first
    pub fn sort_by_fitness(&mut self) {
        let sense = self.sense;
        self.individuals.sort_by(|a, b| a.compare(b, sense));
    }

    /// Keep only the `size` best individuals
    pub fn truncate_to_best(&mut self, size: usize) {
        self.sort_by_fitness();
        self.individuals.truncate(size);
    }

    /// Check if all individuals have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.individuals.iter().all(|i| i.is_evaluated())
    }

    /// Genotypes in population order
    pub fn genomes(&self) -> Vec<&G> {
        self.individuals.iter().map(|i| &i.genome).collect()
    }

    /// Mean of the finite fitness values
    pub fn mean_fitness(&self) -> Option<f64> {
        let values = self.finite_fitness();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Sample standard deviation of the finite fitness values
    pub fn fitness_std(&self) -> Option<f64> {
        let values = self.finite_fitness();
        if values.len() < 2 {
            return None;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        Some(variance.sqrt())
    }

    /// Average pairwise genotype distance
    pub fn diversity(&self) -> f64 {
        let n = self.len();
        if n < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                total += self.individuals[i]
                    .genome
                    .distance(&self.individuals[j].genome);
            }
        }
        total / (n * (n - 1) / 2) as f64
    }

    fn compare_at(&self, a: usize, b: usize) -> Ordering {
        self.individuals[a].compare(&self.individuals[b], self.sense)
    }

    fn finite_fitness(&self) -> Vec<f64> {
        self.individuals
            .iter()
            .map(Individual::fitness_f64)
            .filter(|f| f.is_finite())
            .collect()
    }
}

impl<G, F> Default for Population<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    fn default() -> Self {
        Self::new(ObjectiveSense::default())
    }
}

impl<G, F> std::ops::Index<usize> for Population<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    type Output = Individual<G, F>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl<G, F> IntoIterator for Population<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    type Item = Individual<G, F>;
    type IntoIter = std::vec::IntoIter<Individual<G, F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::bit_string::BitString;
    use crate::genome::real_vector::RealVector;

    fn create_test_population(sense: ObjectiveSense) -> Population<RealVector> {
        let individuals = vec![
            Individual::with_fitness(RealVector::new(vec![1.0]), 30.0),
            Individual::with_fitness(RealVector::new(vec![2.0]), 10.0),
            Individual::with_fitness(RealVector::new(vec![3.0]), 50.0),
            Individual::with_fitness(RealVector::new(vec![4.0]), 20.0),
            Individual::with_fitness(RealVector::new(vec![5.0]), 40.0),
        ];
        Population::from_individuals(individuals, sense)
    }

    #[test]
    fn test_best_worst_minimize() {
        let pop = create_test_population(ObjectiveSense::Minimize);
        assert_eq!(pop.best().unwrap().fitness_f64(), 10.0);
        assert_eq!(pop.worst().unwrap().fitness_f64(), 50.0);
        assert_eq!(pop.best_index(), Some(1));
        assert_eq!(pop.worst_index(), Some(2));
    }

    #[test]
    fn test_best_worst_maximize() {
        let pop = create_test_population(ObjectiveSense::Maximize);
        assert_eq!(pop.best().unwrap().fitness_f64(), 50.0);
        assert_eq!(pop.worst().unwrap().fitness_f64(), 10.0);
    }

    #[test]
    fn test_sort_by_fitness_is_stable() {
        let individuals = vec![
            Individual::with_fitness(BitString::from([true, false]), 1.0),
            Individual::with_fitness(BitString::from([false, false]), 2.0),
            Individual::with_fitness(BitString::from([false, true]), 1.0),
        ];
        let mut pop = Population::from_individuals(individuals, ObjectiveSense::Maximize);
        pop.sort_by_fitness();
        let order: Vec<String> = pop.iter().map(|i| i.genome.to_string()).collect();
        assert_eq!(order, vec!["00", "10", "01"]);
    }

    #[test]
    fn test_unevaluated_sorts_last() {
        let mut pop: Population<RealVector> = Population::new(ObjectiveSense::Minimize);
        pop.push(Individual::new(RealVector::zeros(1))).unwrap();
        pop.push(Individual::with_fitness(RealVector::zeros(1), 1e6))
            .unwrap();
        pop.sort_by_fitness();
        assert!(pop[0].is_evaluated());
        assert!(!pop[1].is_evaluated());
    }

    #[test]
    fn test_push_rejects_length_mismatch() {
        let mut pop: Population<BitString> = Population::new(ObjectiveSense::Maximize);
        pop.push(Individual::new(BitString::zeros(3))).unwrap();
        let err = pop.push(Individual::new(BitString::zeros(4))).unwrap_err();
        assert_eq!(
            err,
            GenomeError::DimensionMismatch {
                expected: 3,
                actual: 4
            }
        );
        assert_eq!(pop.len(), 1);
    }

    #[test]
    fn test_truncate_to_best() {
        let mut pop = create_test_population(ObjectiveSense::Minimize);
        pop.truncate_to_best(2);
        let values: Vec<f64> = pop.iter().map(|i| i.fitness_f64()).collect();
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_mean_and_std_skip_unevaluated() {
        let mut pop = create_test_population(ObjectiveSense::Minimize);
        pop.push(Individual::new(RealVector::new(vec![6.0])))
            .unwrap();
        assert_eq!(pop.mean_fitness(), Some(30.0));
        let std = pop.fitness_std().unwrap();
        assert!((std - 250.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_diversity() {
        let pop: Population<BitString> = Population::from_genomes(
            vec![BitString::zeros(4), BitString::ones(4)],
            ObjectiveSense::Maximize,
            0,
        );
        assert_eq!(pop.diversity(), 4.0);
    }

    #[test]
    fn test_remove() {
        let mut pop = create_test_population(ObjectiveSense::Minimize);
        let removed = pop.remove(0).unwrap();
        assert_eq!(removed.fitness_f64(), 30.0);
        assert_eq!(pop.len(), 4);
        assert!(pop.remove(99).is_none());
    }
}
