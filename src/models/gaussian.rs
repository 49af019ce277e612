//! Diagonal Gaussian model over real vectors

use rand::Rng;
use rand_distr::StandardNormal;

use crate::diagnostics::model::ModelDiagnostics;
use crate::error::ModelError;
use crate::fitness::traits::{FeasibilityCheck, FitnessValue};
use crate::genome::traits::RealValuedGenome;
use crate::models::{check_length, Model};
use crate::population::population::Population;
use crate::representation::{ConstraintHandling, Representation};

/// Borrow the gene vectors of `selected`, checking non-empty and uniform length
pub(crate) fn collect_genes<'a, G, F>(
    selected: &'a Population<G, F>,
    model: &'static str,
) -> Result<Vec<&'a [f64]>, ModelError>
where
    G: RealValuedGenome,
    F: FitnessValue,
{
    let samples: Vec<&[f64]> = selected.iter().map(|i| i.genome.genes()).collect();
    let expected = samples
        .first()
        .map(|s| s.len())
        .ok_or(ModelError::EmptySelection { model })?;
    if let Some(bad) = samples.iter().find(|s| s.len() != expected) {
        return Err(ModelError::DimensionMismatch {
            expected,
            actual: bad.len(),
        });
    }
    Ok(samples)
}

/// Per-dimension mean and sample standard deviation (divisor `max(1, n-1)`)
pub(crate) fn mean_and_std(samples: &[&[f64]]) -> (Vec<f64>, Vec<f64>) {
    let dim = samples.first().map_or(0, |s| s.len());
    let n = samples.len().max(1) as f64;
    let mut mean = vec![0.0; dim];
    for x in samples {
        for (m, v) in mean.iter_mut().zip(x.iter()) {
            *m += v;
        }
    }
    mean.iter_mut().for_each(|m| *m /= n);

    let mut var = vec![0.0; dim];
    for x in samples {
        for ((s, v), m) in var.iter_mut().zip(x.iter()).zip(mean.iter()) {
            *s += (v - m).powi(2);
        }
    }
    let divisor = samples.len().saturating_sub(1).max(1) as f64;
    let std = var.into_iter().map(|s| (s / divisor).sqrt()).collect();
    (mean, std)
}

/// Smallest and largest entry, `(0, 0)` for an empty slice
pub(crate) fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Independent normal per dimension, refit from scratch on every `fit`
#[derive(Clone, Debug)]
pub struct DiagonalGaussianModel {
    min_sigma: f64,
    state: Option<(Vec<f64>, Vec<f64>)>,
}

impl DiagonalGaussianModel {
    /// `min_sigma` is floored at `1e-8`
    pub fn new(min_sigma: f64) -> Self {
        Self {
            min_sigma: min_sigma.max(1.0e-8),
            state: None,
        }
    }

    pub fn min_sigma(&self) -> f64 {
        self.min_sigma
    }

    pub fn mean(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|(m, _)| m.as_slice())
    }

    pub fn sigma(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|(_, s)| s.as_slice())
    }

    /// Install parameters directly, e.g. from a saved run.
    ///
    /// Deviations are floored at `min_sigma`.
    pub fn restore(&mut self, mean: Vec<f64>, sigma: Vec<f64>) -> Result<(), ModelError> {
        if mean.len() != sigma.len() {
            return Err(ModelError::DimensionMismatch {
                expected: mean.len(),
                actual: sigma.len(),
            });
        }
        let sigma = sigma.into_iter().map(|s| s.max(self.min_sigma)).collect();
        self.state = Some((mean, sigma));
        Ok(())
    }
}

impl Default for DiagonalGaussianModel {
    fn default() -> Self {
        Self::new(1.0e-8)
    }
}

impl<G: RealValuedGenome> Model<G> for DiagonalGaussianModel {
    fn name(&self) -> &'static str {
        "gaussian-diag"
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
        let samples = collect_genes(selected, "gaussian-diag")?;
        check_length(representation, samples[0].len())?;
        let (mean, std) = mean_and_std(&samples);
        let sigma = std
            .into_iter()
            .map(|s| if s.is_finite() { s.max(self.min_sigma) } else { self.min_sigma })
            .collect();
        self.state = Some((mean, sigma));
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
        let (mean, sigma) = self.state.as_ref().ok_or(ModelError::NotFitted {
            model: "gaussian-diag",
        })?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let genes = mean
                .iter()
                .zip(sigma.iter())
                .map(|(m, s)| {
                    let z: f64 = rng.sample(StandardNormal);
                    m + s * z
                })
                .collect();
            let raw = G::from_genes(genes)?;
            out.push(constraint.enforce(raw, representation, problem, rng));
        }
        Ok(out)
    }

    fn diagnostics(&self) -> ModelDiagnostics {
        let Some((mean, sigma)) = self.state.as_ref() else {
            return ModelDiagnostics::empty();
        };
        let (lo, hi) = min_max(sigma);
        ModelDiagnostics::empty()
            .with("dimension", mean.len() as f64)
            .with("sigma_min", lo)
            .with("sigma_max", hi)
            .with("condition_number", hi / lo.max(self.min_sigma))
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }
}
