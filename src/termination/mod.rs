//! Termination criteria
//!
//! Predicates checked by the driver at the end of every generation. Fitness
//! comparisons follow the population's objective sense.

use crate::fitness::traits::{FitnessValue, ObjectiveSense};
use crate::genome::traits::EvolutionaryGenome;
use crate::population::population::Population;

/// Evolution state for termination checking
#[derive(Clone, Debug)]
pub struct EvolutionState<'a, G, F = f64>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// Current generation number
    pub generation: usize,
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Best fitness found so far
    pub best_fitness: f64,
    /// Reference to the current population
    pub population: &'a Population<G, F>,
    /// Tracked best fitness per generation, oldest first
    pub fitness_history: &'a [f64],
}

impl<G, F> EvolutionState<'_, G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    pub fn sense(&self) -> ObjectiveSense {
        self.population.sense()
    }
}

/// Termination criterion trait
pub trait TerminationCriterion<G: EvolutionaryGenome, F: FitnessValue = f64>: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;

    /// Reason for stopping in `state`; combinators name the criterion that fired
    fn explain(&self, _state: &EvolutionState<G, F>) -> &'static str {
        self.reason()
    }
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl<G: EvolutionaryGenome, F: FitnessValue> TerminationCriterion<G, F> for MaxGenerations {
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate after a maximum number of fitness evaluations
#[derive(Clone, Debug)]
pub struct MaxEvaluations(pub usize);

impl MaxEvaluations {
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl<G: EvolutionaryGenome, F: FitnessValue> TerminationCriterion<G, F> for MaxEvaluations {
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool {
        state.evaluations >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum evaluations reached"
    }
}

/// Terminate when the tracked best has improved by less than `epsilon`
/// over the last `window` generations
#[derive(Clone, Debug)]
pub struct FitnessStagnation {
    pub window: usize,
    pub epsilon: f64,
}

impl FitnessStagnation {
    pub fn new(window: usize, epsilon: f64) -> Self {
        Self {
            window: window.max(2),
            epsilon,
        }
    }
}

impl<G: EvolutionaryGenome, F: FitnessValue> TerminationCriterion<G, F> for FitnessStagnation {
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool {
        let history = state.fitness_history;
        if history.len() < self.window {
            return false;
        }
        let window = &history[history.len() - self.window..];
        let sense = state.sense();
        let first = sense.to_maximization(window[0]);
        let last = sense.to_maximization(window[window.len() - 1]);
        // NaN means nothing was evaluated yet, which is not stagnation
        !(last - first).is_nan() && last - first < self.epsilon
    }

    fn reason(&self) -> &'static str {
        "Fitness stagnation detected"
    }
}

/// Terminate when the best fitness reaches `target` within `tolerance`
#[derive(Clone, Debug)]
pub struct TargetFitness {
    pub target: f64,
    pub tolerance: f64,
}

impl TargetFitness {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            tolerance: 0.0,
        }
    }

    pub fn with_tolerance(target: f64, tolerance: f64) -> Self {
        Self {
            target,
            tolerance: tolerance.abs(),
        }
    }
}

impl<G: EvolutionaryGenome, F: FitnessValue> TerminationCriterion<G, F> for TargetFitness {
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool {
        match state.sense() {
            ObjectiveSense::Maximize => state.best_fitness >= self.target - self.tolerance,
            ObjectiveSense::Minimize => state.best_fitness <= self.target + self.tolerance,
        }
    }

    fn reason(&self) -> &'static str {
        "Target fitness reached"
    }
}

/// Terminate when population diversity drops below threshold
#[derive(Clone, Debug)]
pub struct DiversityThreshold {
    pub min_diversity: f64,
}

impl DiversityThreshold {
    pub fn new(min_diversity: f64) -> Self {
        Self { min_diversity }
    }
}

impl<G: EvolutionaryGenome, F: FitnessValue> TerminationCriterion<G, F> for DiversityThreshold {
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool {
        state.population.len() > 1 && state.population.diversity() < self.min_diversity
    }

    fn reason(&self) -> &'static str {
        "Diversity threshold reached"
    }
}

/// Stops when any inner criterion fires
pub struct AnyOf<G: EvolutionaryGenome, F: FitnessValue = f64> {
    criteria: Vec<Box<dyn TerminationCriterion<G, F>>>,
}

impl<G: EvolutionaryGenome, F: FitnessValue> AnyOf<G, F> {
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion<G, F>>>) -> Self {
        Self { criteria }
    }
}

impl<G: EvolutionaryGenome, F: FitnessValue> TerminationCriterion<G, F> for AnyOf<G, F> {
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool {
        self.criteria.iter().any(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "One of multiple criteria met"
    }

    fn explain(&self, state: &EvolutionState<G, F>) -> &'static str {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map_or(self.reason(), |c| c.explain(state))
    }
}

/// Stops only when every inner criterion fires
pub struct AllOf<G: EvolutionaryGenome, F: FitnessValue = f64> {
    criteria: Vec<Box<dyn TerminationCriterion<G, F>>>,
}

impl<G: EvolutionaryGenome, F: FitnessValue> AllOf<G, F> {
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion<G, F>>>) -> Self {
        Self { criteria }
    }
}

impl<G: EvolutionaryGenome, F: FitnessValue> TerminationCriterion<G, F> for AllOf<G, F> {
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool {
        !self.criteria.is_empty() && self.criteria.iter().all(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "All criteria met"
    }
}

pub mod prelude {
    pub use super::{
        AllOf, AnyOf, DiversityThreshold, EvolutionState, FitnessStagnation, MaxEvaluations,
        MaxGenerations, TargetFitness, TerminationCriterion,
    };
}
