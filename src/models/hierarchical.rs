//! Hierarchical BOA with incremental tables
//!
//! Structure is a mutual-information forest: nodes are processed by
//! descending marginal entropy and each one takes at most one parent, the
//! earlier node it shares the most information with, provided that
//! information exceeds a threshold. Marginals and conditional tables are
//! carried between generations as exponential moving averages.

use rand::Rng;
use tracing::trace;

use crate::diagnostics::model::ModelDiagnostics;
use crate::error::ModelError;
use crate::fitness::traits::{FeasibilityCheck, FitnessValue};
use crate::genome::traits::BinaryGenome;
use crate::models::binary_math::{
    clamp_probability, collect_bits, entropy, marginal_one, mutual_information, order_by_entropy,
};
use crate::models::structure::{ConditionalTable, DependencyStructure, DiscreteNetwork};
use crate::models::{check_length, Model};
use crate::population::population::Population;
use crate::representation::{ConstraintHandling, Representation};

#[derive(Clone, Debug)]
struct FittedForest {
    network: DiscreteNetwork,
    marginals: Vec<f64>,
    mean_mutual_information: f64,
}

/// Mutual-information forest with blended tables.
///
/// Every fit estimates fresh marginals and tables and then blends them into
/// the previous fit, `p ← (1 - α) p_prev + α p̂`. A table is blended only
/// when its node kept the same parent; otherwise the fresh estimate is used.
/// Roots sample from the blended marginal.
#[derive(Clone, Debug)]
pub struct HierarchicalBoaModel {
    smoothing: f64,
    min_mutual_information: f64,
    learning_rate: f64,
    state: Option<FittedForest>,
}

impl HierarchicalBoaModel {
    /// Smoothing is floored at `1e-9`, the threshold at 0 and the learning
    /// rate clamped to `[0, 1]`
    pub fn new(smoothing: f64, min_mutual_information: f64, learning_rate: f64) -> Self {
        Self {
            smoothing: smoothing.max(1.0e-9),
            min_mutual_information: min_mutual_information.max(0.0),
            learning_rate: learning_rate.clamp(0.0, 1.0),
            state: None,
        }
    }

    pub fn min_mutual_information(&self) -> f64 {
        self.min_mutual_information
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn structure(&self) -> Option<&DependencyStructure> {
        self.state.as_ref().map(|s| s.network.structure())
    }

    pub fn network(&self) -> Option<&DiscreteNetwork> {
        self.state.as_ref().map(|s| &s.network)
    }

    /// Blended marginals, `None` before the first fit
    pub fn marginals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.marginals.as_slice())
    }

    /// Strongest earlier partner of each node, if above the threshold.
    /// Returns the parent lists and the mean information of the kept edges.
    fn forest(&self, order: &[usize], mi: &[Vec<f64>]) -> (Vec<Vec<usize>>, f64) {
        let mut parents = vec![Vec::new(); order.len()];
        let mut total = 0.0;
        let mut edges = 0usize;
        for (pos, &node) in order.iter().enumerate().skip(1) {
            let mut best: Option<usize> = None;
            let mut best_mi = self.min_mutual_information;
            for &candidate in &order[..pos] {
                if mi[node][candidate] > best_mi {
                    best_mi = mi[node][candidate];
                    best = Some(candidate);
                }
            }
            if let Some(p) = best {
                parents[node].push(p);
                total += best_mi;
                edges += 1;
            }
        }
        let mean = if edges == 0 { 0.0 } else { total / edges as f64 };
        (parents, mean)
    }

    /// `Σ H(X_i | parent)` with the parent weighted by its marginal
    fn conditional_entropy(state: &FittedForest) -> f64 {
        let structure = state.network.structure();
        state
            .network
            .tables()
            .iter()
            .enumerate()
            .map(|(node, table)| match structure.parents(node) {
                [p] => {
                    let q = state.marginals[*p];
                    let probs = table.probabilities();
                    (1.0 - q) * entropy(probs[0]) + q * entropy(probs[1])
                }
                _ => entropy(state.marginals[node]),
            })
            .sum()
    }
}

impl Default for HierarchicalBoaModel {
    fn default() -> Self {
        Self::new(1.0, 0.01, 0.1)
    }
}

impl<G: BinaryGenome> Model<G> for HierarchicalBoaModel {
    fn name(&self) -> &'static str {
        "hboa"
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
        let samples = collect_bits(selected, "hboa")?;
        let length = samples[0].len();
        check_length(representation, length)?;

        let estimate = marginal_one(&samples, self.smoothing);
        let mi = mutual_information(&samples, self.smoothing);
        let order = order_by_entropy(&estimate, true);
        let (parents, mean_mutual_information) = self.forest(&order, &mi);

        let previous = self
            .state
            .as_ref()
            .filter(|s| s.marginals.len() == length);
        let rate = self.learning_rate;
        let marginals: Vec<f64> = match previous {
            Some(prev) => prev
                .marginals
                .iter()
                .zip(estimate.iter())
                .map(|(&old, &new)| clamp_probability((1.0 - rate) * old + rate * new))
                .collect(),
            None => estimate,
        };

        let tables: Vec<ConditionalTable> = (0..length)
            .map(|node| {
                if parents[node].is_empty() {
                    return ConditionalTable::from_probabilities(Vec::new(), vec![marginals[node]]);
                }
                let mut table =
                    ConditionalTable::estimate(&samples, node, &parents[node], self.smoothing);
                if let Some(prev) = previous {
                    table.blend_from(&prev.network.tables()[node], rate);
                }
                table
            })
            .collect();

        let structure = DependencyStructure::from_ordered_parents(order, parents);
        trace!(
            edges = structure.edge_count(),
            mean_mutual_information,
            blended = previous.is_some(),
            "hboa forest learned"
        );
        self.state = Some(FittedForest {
            network: DiscreteNetwork::from_tables(structure, tables),
            marginals,
            mean_mutual_information,
        });
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
            .ok_or(ModelError::NotFitted { model: "hboa" })?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let raw = G::from_bits(state.network.sample_bits(rng))?;
            out.push(constraint.enforce(raw, representation, problem, rng));
        }
        Ok(out)
    }

    fn diagnostics(&self) -> ModelDiagnostics {
        let Some(state) = self.state.as_ref() else {
            return ModelDiagnostics::empty();
        };
        ModelDiagnostics::empty()
            .with("edge_count", state.network.structure().edge_count() as f64)
            .with("mean_mutual_information", state.mean_mutual_information)
            .with("conditional_entropy", Self::conditional_entropy(state))
            .with("learning_rate", self.learning_rate)
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }
}
