//! Fitness traits
//!
//! Problems are external collaborators: a pure mapping from genotype to a
//! scalar (or scalarisable) fitness under a declared [`ObjectiveSense`].

use std::cmp::Ordering;
use std::fmt::Debug;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::EvoResult;
use crate::genome::traits::EvolutionaryGenome;

/// Direction of optimisation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    /// Order two raw fitness values so that `Less` means "`a` is better".
    ///
    /// `NaN` always ranks worst, under either sense.
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
                match self {
                    ObjectiveSense::Minimize => ord,
                    ObjectiveSense::Maximize => ord.reverse(),
                }
            }
        }
    }

    /// Strictly better under this sense
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Better than or equal to under this sense
    pub fn is_at_least_as_good(&self, a: f64, b: f64) -> bool {
        self.compare(a, b) != Ordering::Greater
    }

    /// Map a raw value onto a "higher is better" scale
    pub fn to_maximization(&self, value: f64) -> f64 {
        match self {
            ObjectiveSense::Minimize => -value,
            ObjectiveSense::Maximize => value,
        }
    }
}

/// Trait bound for fitness values
///
/// Every fitness must reduce to one `f64` for ranking. Values are
/// serialisable so populations can be persisted by an external sink.
pub trait FitnessValue:
    Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static
{
    /// Scalar used for sense-aware ranking
    fn to_f64(&self) -> f64;
}

impl FitnessValue for f64 {
    fn to_f64(&self) -> f64 {
        *self
    }
}

impl FitnessValue for f32 {
    fn to_f64(&self) -> f64 {
        *self as f64
    }
}

impl FitnessValue for i64 {
    fn to_f64(&self) -> f64 {
        *self as f64
    }
}

impl FitnessValue for i32 {
    fn to_f64(&self) -> f64 {
        *self as f64
    }
}

impl FitnessValue for usize {
    fn to_f64(&self) -> f64 {
        *self as f64
    }
}

/// Multi-objective fitness collapsed to a weighted sum for ranking
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorFitness {
    pub objectives: Vec<f64>,
    pub weights: Vec<f64>,
}

impl VectorFitness {
    /// Equal unit weights
    pub fn new(objectives: Vec<f64>) -> Self {
        let weights = vec![1.0; objectives.len()];
        Self { objectives, weights }
    }

    /// Explicit weights; missing weights count as 1.0
    pub fn weighted(objectives: Vec<f64>, weights: Vec<f64>) -> Self {
        Self { objectives, weights }
    }

    pub fn num_objectives(&self) -> usize {
        self.objectives.len()
    }
}

impl FitnessValue for VectorFitness {
    fn to_f64(&self) -> f64 {
        self.objectives
            .iter()
            .enumerate()
            .map(|(i, v)| v * self.weights.get(i).copied().unwrap_or(1.0))
            .sum()
    }
}

/// An optimisation problem over one genotype type.
///
/// Implementations must be safe to evaluate concurrently on different
/// genotypes.
pub trait Problem: Send + Sync {
    /// The genome type being evaluated
    type Genome: EvolutionaryGenome;

    /// The fitness value type
    type Value: FitnessValue;

    /// Evaluate one genotype
    fn evaluate(&self, genome: &Self::Genome) -> Self::Value;

    /// Fallible evaluation; errors abort the run
    fn try_evaluate(&self, genome: &Self::Genome) -> EvoResult<Self::Value> {
        Ok(self.evaluate(genome))
    }

    /// Whether fitness is minimised or maximised
    fn objective_sense(&self) -> ObjectiveSense;

    /// Feasibility predicate consulted by constraint handling
    fn is_feasible(&self, _genome: &Self::Genome) -> bool {
        true
    }

    fn name(&self) -> &str {
        "problem"
    }
}

/// Object-safe view of a problem's feasibility predicate
pub trait FeasibilityCheck<G>: Send + Sync {
    fn is_feasible(&self, genome: &G) -> bool;
}

impl<P: Problem> FeasibilityCheck<P::Genome> for P {
    fn is_feasible(&self, genome: &P::Genome) -> bool {
        Problem::is_feasible(self, genome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_minimize() {
        let s = ObjectiveSense::Minimize;
        assert_eq!(s.compare(1.0, 2.0), Ordering::Less);
        assert!(s.is_better(-3.0, 0.0));
        assert!(!s.is_better(1.0, 1.0));
        assert!(s.is_at_least_as_good(1.0, 1.0));
    }

    #[test]
    fn test_compare_maximize() {
        let s = ObjectiveSense::Maximize;
        assert_eq!(s.compare(1.0, 2.0), Ordering::Greater);
        assert!(s.is_better(5.0, 4.0));
    }

    #[test]
    fn test_nan_ranks_worst_under_both_senses() {
        for s in [ObjectiveSense::Minimize, ObjectiveSense::Maximize] {
            assert!(s.is_better(1e300, f64::NAN));
            assert!(s.is_better(-1e300, f64::NAN));
            assert!(!s.is_better(f64::NAN, 0.0));
            assert_eq!(s.compare(f64::NAN, f64::NAN), Ordering::Equal);
        }
    }

    #[test]
    fn test_to_maximization() {
        assert_eq!(ObjectiveSense::Minimize.to_maximization(3.0), -3.0);
        assert_eq!(ObjectiveSense::Maximize.to_maximization(3.0), 3.0);
    }

    #[test]
    fn test_vector_fitness_weighted_sum() {
        let v = VectorFitness::weighted(vec![1.0, 2.0, 3.0], vec![1.0, 0.5]);
        assert!((v.to_f64() - 5.0).abs() < 1e-12);
        assert_eq!(VectorFitness::new(vec![1.0, 1.0]).to_f64(), 2.0);
        assert_eq!(v.num_objectives(), 3);
    }

    #[test]
    fn test_scalar_fitness_to_f64() {
        assert_eq!(3usize.to_f64(), 3.0);
        assert_eq!((-2i32).to_f64(), -2.0);
        assert_eq!(0.5f32.to_f64(), 0.5);
    }
}
