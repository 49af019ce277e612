//! Diagnostics and statistics
//!
//! Per-generation population statistics, phase timings and the model
//! diagnostics snapshot. Nothing here feeds back into the search.

pub mod model;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fitness::traits::{FitnessValue, ObjectiveSense};
use crate::genome::traits::EvolutionaryGenome;
use crate::population::individual::Individual;
use crate::population::population::Population;

pub use model::ModelDiagnostics;

/// Statistics for a single generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Best fitness in this generation (sense-aware)
    pub best_fitness: f64,
    /// Worst fitness in this generation (sense-aware)
    pub worst_fitness: f64,
    pub mean_fitness: f64,
    pub median_fitness: f64,
    pub fitness_std: f64,
    /// Population diversity
    pub diversity: f64,
    /// Timing information
    pub timing: TimingStats,
    /// Snapshot of the model after this generation's fit
    pub model: ModelDiagnostics,
}

/// Wall-clock time per phase of one generation, in milliseconds
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimingStats {
    pub selection_ms: f64,
    pub fitting_ms: f64,
    pub sampling_ms: f64,
    pub evaluation_ms: f64,
    pub total_ms: f64,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(mut self, duration: Duration) -> Self {
        self.selection_ms = millis(duration);
        self
    }

    pub fn with_fitting(mut self, duration: Duration) -> Self {
        self.fitting_ms = millis(duration);
        self
    }

    pub fn with_sampling(mut self, duration: Duration) -> Self {
        self.sampling_ms = millis(duration);
        self
    }

    pub fn with_evaluation(mut self, duration: Duration) -> Self {
        self.evaluation_ms = millis(duration);
        self
    }

    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = millis(duration);
        self
    }
}

impl GenerationStats {
    /// Compute statistics from a population, ranking by its objective sense.
    ///
    /// Non-finite fitness values are ignored; with none left, best and
    /// worst are `NaN` and the moments are zero.
    pub fn from_population<G, F>(
        population: &Population<G, F>,
        generation: usize,
        evaluations: usize,
    ) -> Self
    where
        G: EvolutionaryGenome,
        F: FitnessValue,
    {
        let sense = population.sense();
        let mut fitnesses: Vec<f64> = population
            .iter()
            .map(Individual::fitness_f64)
            .filter(|f| f.is_finite())
            .collect();

        let mut stats = Self {
            generation,
            evaluations,
            best_fitness: f64::NAN,
            worst_fitness: f64::NAN,
            mean_fitness: 0.0,
            median_fitness: 0.0,
            fitness_std: 0.0,
            diversity: population.diversity(),
            timing: TimingStats::default(),
            model: ModelDiagnostics::empty(),
        };
        if fitnesses.is_empty() {
            return stats;
        }

        fitnesses.sort_by(|a, b| a.total_cmp(b));
        let n = fitnesses.len();
        let (low, high) = (fitnesses[0], fitnesses[n - 1]);
        (stats.best_fitness, stats.worst_fitness) = match sense {
            ObjectiveSense::Minimize => (low, high),
            ObjectiveSense::Maximize => (high, low),
        };
        stats.mean_fitness = fitnesses.iter().sum::<f64>() / n as f64;
        stats.median_fitness = if n % 2 == 0 {
            (fitnesses[n / 2 - 1] + fitnesses[n / 2]) / 2.0
        } else {
            fitnesses[n / 2]
        };
        if n > 1 {
            let mean = stats.mean_fitness;
            let variance = fitnesses.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            stats.fitness_std = variance.sqrt();
        }
        stats
    }

    pub fn with_timing(mut self, timing: TimingStats) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_model(mut self, model: ModelDiagnostics) -> Self {
        self.model = model;
        self
    }
}

/// Statistics collector for an entire run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvolutionStats {
    pub sense: ObjectiveSense,
    /// Statistics per generation
    pub generations: Vec<GenerationStats>,
    /// Total runtime in milliseconds
    pub total_runtime_ms: f64,
    /// Reason for termination
    pub termination_reason: Option<String>,
}

impl EvolutionStats {
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            sense,
            ..Self::default()
        }
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Best fitness across all generations under the recorded sense
    pub fn best_fitness(&self) -> Option<f64> {
        self.generations
            .iter()
            .map(|g| g.best_fitness)
            .filter(|f| !f.is_nan())
            .reduce(|a, b| if self.sense.is_better(b, a) { b } else { a })
    }

    pub fn final_best_fitness(&self) -> Option<f64> {
        self.generations.last().map(|g| g.best_fitness)
    }

    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.best_fitness).collect()
    }

    pub fn mean_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.mean_fitness).collect()
    }

    pub fn diversity_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.diversity).collect()
    }

    /// History of one named model metric; generations without it are skipped
    pub fn model_metric_history(&self, name: &str) -> Vec<f64> {
        self.generations
            .iter()
            .filter_map(|g| g.model.get(name))
            .collect()
    }

    pub fn set_termination_reason(&mut self, reason: &str) {
        self.termination_reason = Some(reason.to_string());
    }

    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = millis(duration);
    }

    /// Human-readable summary of the run
    pub fn summary(&self) -> String {
        let best = self.best_fitness().unwrap_or(f64::NAN);
        let final_best = self.final_best_fitness().unwrap_or(f64::NAN);
        let fit_ms: f64 = self.generations.iter().map(|g| g.timing.fitting_ms).sum();
        let eval_ms: f64 = self.generations.iter().map(|g| g.timing.evaluation_ms).sum();

        format!(
            "Evolution Summary:\n\
             - Generations: {}\n\
             - Best fitness: {:.6}\n\
             - Final best: {:.6}\n\
             - Runtime: {:.2}ms (fit {:.2}ms, eval {:.2}ms)\n\
             - Termination: {}",
            self.num_generations(),
            best,
            final_best,
            self.total_runtime_ms,
            fit_ms,
            eval_ms,
            self.termination_reason.as_deref().unwrap_or("unknown")
        )
    }
}

/// Result of a run
#[derive(Clone, Debug)]
pub struct EvolutionResult<G, F = f64>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// Best individual seen during the run
    pub best: Individual<G, F>,
    /// Population after the last generation
    pub population: Population<G, F>,
    /// Number of generations completed
    pub generations: usize,
    /// Total fitness evaluations
    pub evaluations: usize,
    pub stats: EvolutionStats,
}

impl<G, F> EvolutionResult<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    pub fn best_genome(&self) -> &G {
        &self.best.genome
    }

    /// Best fitness as `f64`, `NaN` if never evaluated
    pub fn best_fitness(&self) -> f64 {
        self.best.fitness_f64()
    }
}

pub mod prelude {
    pub use super::model::ModelDiagnostics;
    pub use super::{EvolutionResult, EvolutionStats, GenerationStats, TimingStats};
}
