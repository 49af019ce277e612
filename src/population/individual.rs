//! Individual wrapper type
//!
//! This module provides the Individual type that pairs a genome with its fitness.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::fitness::traits::{FitnessValue, ObjectiveSense};
use crate::genome::traits::EvolutionaryGenome;

/// An individual in the population
///
/// Fitness is `None` until evaluated; unevaluated individuals rank worst.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Individual<G, F = f64>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// The genome of this individual
    pub genome: G,
    /// The fitness value (None if not yet evaluated)
    pub fitness: Option<F>,
    /// Generation when this individual was created
    pub birth_generation: usize,
}

impl<G, F> Individual<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// Create a new individual with an unevaluated genome
    pub fn new(genome: G) -> Self {
        Self {
            genome,
            fitness: None,
            birth_generation: 0,
        }
    }

    /// Create a new individual with a known fitness
    pub fn with_fitness(genome: G, fitness: F) -> Self {
        Self {
            genome,
            fitness: Some(fitness),
            birth_generation: 0,
        }
    }

    /// Create a new individual born in `generation`
    pub fn with_generation(genome: G, generation: usize) -> Self {
        Self {
            genome,
            fitness: None,
            birth_generation: generation,
        }
    }

    /// Check if this individual has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Scalar fitness, `NaN` when unevaluated
    pub fn fitness_f64(&self) -> f64 {
        self.fitness.as_ref().map_or(f64::NAN, FitnessValue::to_f64)
    }

    /// Set the fitness value
    pub fn set_fitness(&mut self, fitness: F) {
        self.fitness = Some(fitness);
    }

    /// Take the genome out of this individual
    pub fn into_genome(self) -> G {
        self.genome
    }

    /// Get a reference to the genome
    pub fn genome(&self) -> &G {
        &self.genome
    }

    /// Sense-aware ordering; `Less` means `self` is better
    pub fn compare(&self, other: &Self, sense: ObjectiveSense) -> Ordering {
        sense.compare(self.fitness_f64(), other.fitness_f64())
    }

    /// Check if this individual is strictly better than another
    pub fn is_better_than(&self, other: &Self, sense: ObjectiveSense) -> bool {
        self.compare(other, sense) == Ordering::Less
    }

    /// Age of this individual (generations since birth)
    pub fn age(&self, current_generation: usize) -> usize {
        current_generation.saturating_sub(self.birth_generation)
    }
}

impl<G, F> PartialEq for Individual<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome && self.fitness == other.fitness
    }
}
