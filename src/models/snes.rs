//! Separable natural evolution strategy (SNES)
//!
//! Unlike the other models, SNES carries its search distribution across
//! generations. Each `fit` ranks the individuals it is given, turns ranks
//! into utilities and takes one natural-gradient step on `(mean, sigma)`.
//! The standard samples are recovered as `z = (x - mean) / sigma` with the
//! parameters that generated `x`; this also accounts for any repair applied
//! by constraint handling.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::diagnostics::model::ModelDiagnostics;
use crate::error::ModelError;
use crate::fitness::traits::{FeasibilityCheck, FitnessValue};
use crate::genome::traits::RealValuedGenome;
use crate::models::gaussian::{collect_genes, mean_and_std, min_max};
use crate::models::{check_length, Model};
use crate::population::population::Population;
use crate::representation::{ConstraintHandling, Representation};

/// Search distribution after the last update
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnesState {
    pub mean: Vec<f64>,
    pub sigma: Vec<f64>,
    pub gradient_norm: f64,
}

/// Zero-centred rank utilities for `lambda` ranked samples (best first).
///
/// `u_k = max(0, ln(λ/2 + 1) - ln(k + 1))`, normalised to sum to one, then
/// shifted by `-1/λ`.
pub fn utilities(lambda: usize) -> Vec<f64> {
    if lambda == 0 {
        return Vec::new();
    }
    let l = lambda as f64;
    let raw: Vec<f64> = (0..lambda)
        .map(|k| ((l / 2.0 + 1.0).ln() - (k as f64 + 1.0).ln()).max(0.0))
        .collect();
    let sum: f64 = raw.iter().sum();
    if sum <= 0.0 {
        return vec![1.0 / l; lambda];
    }
    raw.into_iter().map(|u| u / sum - 1.0 / l).collect()
}

/// Default sigma learning rate `(3 + ln d) / (5 sqrt d)`
pub fn default_eta_sigma(dimension: usize) -> f64 {
    let d = dimension.max(1) as f64;
    (3.0 + d.ln()) / (5.0 * d.sqrt())
}

/// SNES with rank-based natural-gradient updates
#[derive(Clone, Debug)]
pub struct SeparableNesModel {
    eta_mean: f64,
    eta_sigma: Option<f64>,
    min_sigma: f64,
    max_sigma: f64,
    initial: Option<(Vec<f64>, Vec<f64>)>,
    state: Option<SnesState>,
}

impl SeparableNesModel {
    /// Learning rates default to `η_mean = 1` and [`default_eta_sigma`]
    pub fn new() -> Self {
        Self {
            eta_mean: 1.0,
            eta_sigma: None,
            min_sigma: 1.0e-12,
            max_sigma: 1.0e6,
            initial: None,
            state: None,
        }
    }

    /// Floored at `1e-4`
    pub fn with_eta_mean(mut self, eta: f64) -> Self {
        self.eta_mean = eta.max(1.0e-4);
        self
    }

    /// Floored at `1e-4`
    pub fn with_eta_sigma(mut self, eta: f64) -> Self {
        self.eta_sigma = Some(eta.max(1.0e-4));
        self
    }

    /// Sigma is kept in `[min, max]` after every update
    pub fn with_sigma_range(mut self, min: f64, max: f64) -> Self {
        self.min_sigma = min.max(1.0e-12);
        self.max_sigma = max.max(self.min_sigma);
        self
    }

    /// Start from an explicit distribution instead of the first selected set
    pub fn with_initial(mut self, mean: Vec<f64>, sigma: Vec<f64>) -> Self {
        self.initial = Some((mean, sigma));
        self
    }

    pub fn eta_mean(&self) -> f64 {
        self.eta_mean
    }

    /// Sigma learning rate for a given dimension
    pub fn eta_sigma(&self, dimension: usize) -> f64 {
        self.eta_sigma
            .unwrap_or_else(|| default_eta_sigma(dimension))
    }

    pub fn state(&self) -> Option<&SnesState> {
        self.state.as_ref()
    }

    fn clamp_sigma(&self, s: f64) -> f64 {
        if s.is_finite() {
            s.clamp(self.min_sigma, self.max_sigma)
        } else {
            self.max_sigma
        }
    }

    fn initial_state(&self, samples: &[&[f64]], dim: usize) -> SnesState {
        let (mean, sigma) = match &self.initial {
            Some((m, s)) if m.len() == dim && s.len() == dim => (m.clone(), s.clone()),
            _ => mean_and_std(samples),
        };
        SnesState {
            mean,
            sigma: sigma.into_iter().map(|s| self.clamp_sigma(s)).collect(),
            gradient_norm: 0.0,
        }
    }
}

impl Default for SeparableNesModel {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: RealValuedGenome> Model<G> for SeparableNesModel {
    fn name(&self) -> &'static str {
        "snes"
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
        let samples = collect_genes(selected, "snes")?;
        let dim = samples[0].len();
        check_length(representation, dim)?;

        let mut state = match self.state.take() {
            Some(s) if s.mean.len() == dim => s,
            _ => self.initial_state(&samples, dim),
        };

        let ranked = selected.ranked_indices();
        let weights = utilities(ranked.len());
        let mut grad_mean = vec![0.0; dim];
        let mut grad_sigma = vec![0.0; dim];
        for (&index, &u) in ranked.iter().zip(weights.iter()) {
            let x = samples[index];
            for d in 0..dim {
                let z = (x[d] - state.mean[d]) / state.sigma[d].max(self.min_sigma);
                grad_mean[d] += u * z;
                grad_sigma[d] += u * (z * z - 1.0);
            }
        }

        let eta_sigma = self.eta_sigma(dim);
        for d in 0..dim {
            state.mean[d] += self.eta_mean * state.sigma[d] * grad_mean[d];
            state.sigma[d] = self.clamp_sigma(state.sigma[d] * (0.5 * eta_sigma * grad_sigma[d]).exp());
        }
        state.gradient_norm = grad_mean
            .iter()
            .chain(grad_sigma.iter())
            .map(|g| g * g)
            .sum::<f64>()
            .sqrt();
        trace!(gradient_norm = state.gradient_norm, "snes update");
        self.state = Some(state);
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
        let state = self
            .state
            .as_ref()
            .ok_or(ModelError::NotFitted { model: "snes" })?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let genes = state
                .mean
                .iter()
                .zip(state.sigma.iter())
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
        let Some(state) = self.state.as_ref() else {
            return ModelDiagnostics::empty();
        };
        let (lo, hi) = min_max(&state.sigma);
        ModelDiagnostics::empty()
            .with("gradient_norm", state.gradient_norm)
            .with("sigma_min", lo)
            .with("sigma_max", hi)
            .with("dimension", state.mean.len() as f64)
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }
}
