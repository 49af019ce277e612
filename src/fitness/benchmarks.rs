//! Benchmark problems
//!
//! Discrete problems over [`BitString`] are maximised; continuous functions
//! over [`RealVector`] report raw values and are minimised.

use std::f64::consts::PI;

use crate::fitness::traits::{ObjectiveSense, Problem};
use crate::genome::bit_string::BitString;
use crate::genome::bounds::MultiBounds;
use crate::genome::real_vector::RealVector;
use crate::genome::traits::{BinaryGenome, RealValuedGenome};

/// Continuous test function with a known optimum
pub trait BenchmarkFunction: Send + Sync {
    /// Name of the benchmark function
    fn name(&self) -> &'static str;

    /// Dimensionality of the problem
    fn dimension(&self) -> usize;

    /// Per-coordinate search interval
    fn bounds(&self) -> (f64, f64);

    /// Optimal (minimum) value
    fn optimal_fitness(&self) -> f64;

    /// Evaluate the function (value to be minimised)
    fn evaluate_raw(&self, x: &[f64]) -> f64;

    /// Bounds for every coordinate
    fn search_space(&self) -> MultiBounds {
        let (min, max) = self.bounds();
        (0..self.dimension()).map(|_| (min, max)).collect()
    }
}

macro_rules! continuous_problem {
    ($ty:ty) => {
        impl Problem for $ty {
            type Genome = RealVector;
            type Value = f64;

            fn evaluate(&self, genome: &RealVector) -> f64 {
                self.evaluate_raw(genome.genes())
            }

            fn objective_sense(&self) -> ObjectiveSense {
                ObjectiveSense::Minimize
            }

            fn name(&self) -> &str {
                BenchmarkFunction::name(self)
            }
        }
    };
}

/// Sphere function: f(x) = Σxᵢ²
///
/// Unimodal, convex, separable. Optimum at origin.
#[derive(Clone, Debug)]
pub struct Sphere {
    dimension: usize,
}

impl Sphere {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl BenchmarkFunction for Sphere {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn bounds(&self) -> (f64, f64) {
        (-5.12, 5.12)
    }

    fn optimal_fitness(&self) -> f64 {
        0.0
    }

    fn evaluate_raw(&self, x: &[f64]) -> f64 {
        x.iter().map(|xi| xi * xi).sum()
    }
}

continuous_problem!(Sphere);

/// Rastrigin function: f(x) = 10n + Σ(xᵢ² - 10cos(2πxᵢ))
///
/// Highly multimodal. Optimum at origin.
#[derive(Clone, Debug)]
pub struct Rastrigin {
    dimension: usize,
}

impl Rastrigin {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl BenchmarkFunction for Rastrigin {
    fn name(&self) -> &'static str {
        "rastrigin"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn bounds(&self) -> (f64, f64) {
        (-5.12, 5.12)
    }

    fn optimal_fitness(&self) -> f64 {
        0.0
    }

    fn evaluate_raw(&self, x: &[f64]) -> f64 {
        let a = 10.0;
        a * x.len() as f64
            + x.iter()
                .map(|xi| xi * xi - a * (2.0 * PI * xi).cos())
                .sum::<f64>()
    }
}

continuous_problem!(Rastrigin);

/// Rosenbrock function: f(x) = Σ[100(xᵢ₊₁-xᵢ²)² + (1-xᵢ)²]
///
/// Curved valley, non-separable. Optimum at (1,1,...,1).
#[derive(Clone, Debug)]
pub struct Rosenbrock {
    dimension: usize,
}

impl Rosenbrock {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl BenchmarkFunction for Rosenbrock {
    fn name(&self) -> &'static str {
        "rosenbrock"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn bounds(&self) -> (f64, f64) {
        (-5.0, 10.0)
    }

    fn optimal_fitness(&self) -> f64 {
        0.0
    }

    fn evaluate_raw(&self, x: &[f64]) -> f64 {
        x.windows(2)
            .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
            .sum()
    }
}

continuous_problem!(Rosenbrock);

/// OneMax: number of ones
#[derive(Clone, Debug, Default)]
pub struct OneMax;

impl Problem for OneMax {
    type Genome = BitString;
    type Value = f64;

    fn evaluate(&self, genome: &BitString) -> f64 {
        genome.count_ones() as f64
    }

    fn objective_sense(&self) -> ObjectiveSense {
        ObjectiveSense::Maximize
    }

    fn name(&self) -> &str {
        "onemax"
    }
}

/// LeadingOnes: length of the prefix of ones
#[derive(Clone, Debug, Default)]
pub struct LeadingOnes;

impl Problem for LeadingOnes {
    type Genome = BitString;
    type Value = f64;

    fn evaluate(&self, genome: &BitString) -> f64 {
        genome.bits().iter().take_while(|&&b| b).count() as f64
    }

    fn objective_sense(&self) -> ObjectiveSense {
        ObjectiveSense::Maximize
    }

    fn name(&self) -> &str {
        "leading-ones"
    }
}

/// Concatenated deceptive trap of block size `k`.
///
/// A full block scores `k`; otherwise a block with `u` ones scores
/// `k - 1 - u`. A trailing partial block is scored the same way with its
/// own size.
#[derive(Clone, Debug)]
pub struct DeceptiveTrap {
    k: usize,
}

impl DeceptiveTrap {
    /// Block size is clamped to at least 1
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }

    pub fn block_size(&self) -> usize {
        self.k
    }
}

impl Default for DeceptiveTrap {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Problem for DeceptiveTrap {
    type Genome = BitString;
    type Value = f64;

    fn evaluate(&self, genome: &BitString) -> f64 {
        genome
            .bits()
            .chunks(self.k)
            .map(|block| {
                let size = block.len();
                let ones = block.iter().filter(|&&b| b).count();
                if ones == size {
                    size as f64
                } else {
                    (size - 1 - ones) as f64
                }
            })
            .sum()
    }

    fn objective_sense(&self) -> ObjectiveSense {
        ObjectiveSense::Maximize
    }

    fn name(&self) -> &str {
        "deceptive-trap"
    }
}

/// 0/1 knapsack with a linear overweight penalty.
///
/// A genotype is feasible when its total weight fits the capacity.
#[derive(Clone, Debug)]
pub struct Knapsack {
    weights: Vec<u32>,
    values: Vec<u32>,
    capacity: u32,
    penalty_per_unit: f64,
}

impl Knapsack {
    /// Items beyond the shorter of `weights`/`values` are ignored
    pub fn new(weights: Vec<u32>, values: Vec<u32>, capacity: u32, penalty_per_unit: f64) -> Self {
        let items = weights.len().min(values.len());
        Self {
            weights: weights[..items].to_vec(),
            values: values[..items].to_vec(),
            capacity,
            penalty_per_unit: penalty_per_unit.max(0.0),
        }
    }

    pub fn item_count(&self) -> usize {
        self.weights.len()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total (weight, value) of the chosen items
    pub fn totals(&self, genome: &BitString) -> (u64, u64) {
        genome
            .bits()
            .iter()
            .zip(self.weights.iter().zip(self.values.iter()))
            .filter(|(chosen, _)| **chosen)
            .fold((0, 0), |(w, v), (_, (&wi, &vi))| {
                (w + u64::from(wi), v + u64::from(vi))
            })
    }
}

impl Problem for Knapsack {
    type Genome = BitString;
    type Value = f64;

    fn evaluate(&self, genome: &BitString) -> f64 {
        let (weight, value) = self.totals(genome);
        let overweight = weight.saturating_sub(u64::from(self.capacity));
        value as f64 - self.penalty_per_unit * overweight as f64
    }

    fn objective_sense(&self) -> ObjectiveSense {
        ObjectiveSense::Maximize
    }

    fn is_feasible(&self, genome: &BitString) -> bool {
        genome.len() == self.item_count() && self.totals(genome).0 <= u64::from(self.capacity)
    }

    fn name(&self) -> &str {
        "knapsack"
    }
}
