//! Univariate (independent-bit) model: UMDA and PBIL

use rand::Rng;
use tracing::trace;

use crate::diagnostics::model::ModelDiagnostics;
use crate::error::ModelError;
use crate::fitness::traits::{FeasibilityCheck, FitnessValue};
use crate::genome::traits::BinaryGenome;
use crate::models::binary_math::{collect_bits, total_entropy};
use crate::models::{check_length, Model};
use crate::population::population::Population;
use crate::representation::{ConstraintHandling, Representation};

/// One Bernoulli probability per position.
///
/// Each fit estimates `p_i = (ones_i + ε) / (n + 2ε)`. With a learning rate
/// `α < 1` the estimate is blended into the previous fit,
/// `p_i ← (1 - α) p_i + α p̂_i` (PBIL); `α = 1` overwrites (UMDA).
#[derive(Clone, Debug)]
pub struct IndependentModel {
    smoothing: f64,
    learning_rate: f64,
    probabilities: Option<Vec<f64>>,
}

impl IndependentModel {
    /// UMDA with Laplace smoothing `ε` (negative values are treated as 0)
    pub fn new(smoothing: f64) -> Self {
        Self {
            smoothing: smoothing.max(0.0),
            learning_rate: 1.0,
            probabilities: None,
        }
    }

    /// PBIL with learning rate clamped to `[0.01, 1]`
    pub fn pbil(learning_rate: f64, smoothing: f64) -> Self {
        Self::new(smoothing).with_learning_rate(learning_rate)
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate.clamp(0.01, 1.0);
        self
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Learned probabilities, `None` before the first fit
    pub fn probabilities(&self) -> Option<&[f64]> {
        self.probabilities.as_deref()
    }
}

impl Default for IndependentModel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl<G: BinaryGenome> Model<G> for IndependentModel {
    fn name(&self) -> &'static str {
        if self.learning_rate < 1.0 {
            "pbil"
        } else {
            "umda"
        }
    }

    fn fit<F, R>(
        &mut self,
        selected: &Population<G, F>,
        representation: &dyn Representation<G>,
        _rng: &mut R,
    ) -> Result<(), ModelError>
    where
        F: FitnessValue,
        R: Rng,
    {
        let samples = collect_bits(selected, Model::<G>::name(self))?;
        let length = samples[0].len();
        check_length(representation, length)?;

        let n = samples.len() as f64;
        let denom = n + 2.0 * self.smoothing;
        let mut estimate = vec![0.0; length];
        for bits in &samples {
            for (count, &bit) in estimate.iter_mut().zip(bits.iter()) {
                if bit {
                    *count += 1.0;
                }
            }
        }
        for p in estimate.iter_mut() {
            *p = ((*p + self.smoothing) / denom).clamp(0.0, 1.0);
        }

        let next = match self.probabilities.as_ref() {
            Some(previous) if previous.len() == length && self.learning_rate < 1.0 => previous
                .iter()
                .zip(estimate.iter())
                .map(|(&old, &new)| {
                    ((1.0 - self.learning_rate) * old + self.learning_rate * new).clamp(0.0, 1.0)
                })
                .collect(),
            _ => estimate,
        };

        trace!(
            model = Model::<G>::name(self),
            selected = samples.len(),
            "independent model fitted"
        );
        self.probabilities = Some(next);
        Ok(())
    }

    fn sample<R: Rng>(
        &self,
        count: usize,
        representation: &dyn Representation<G>,
        problem: Option<&dyn FeasibilityCheck<G>>,
        constraint: &dyn ConstraintHandling<G>,
        rng: &mut R,
    ) -> Result<Vec<G>, ModelError> {
        let probabilities = self.probabilities.as_ref().ok_or(ModelError::NotFitted {
            model: Model::<G>::name(self),
        })?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let bits = probabilities.iter().map(|&p| rng.gen::<f64>() < p).collect();
            let raw = G::from_bits(bits)?;
            out.push(constraint.enforce(raw, representation, problem, rng));
        }
        Ok(out)
    }

    fn diagnostics(&self) -> ModelDiagnostics {
        let Some(p) = self.probabilities.as_ref() else {
            return ModelDiagnostics::empty();
        };
        let mean = if p.is_empty() {
            0.0
        } else {
            p.iter().sum::<f64>() / p.len() as f64
        };
        ModelDiagnostics::empty()
            .with("model_entropy", total_entropy(p))
            .with("mean_probability", mean)
            .with("learning_rate", self.learning_rate)
            .with("dimension", p.len() as f64)
    }

    fn is_fitted(&self) -> bool {
        self.probabilities.is_some()
    }
}
