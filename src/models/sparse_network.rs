//! Bounded in-degree Bayesian network (BOA / EBNA)

use rand::Rng;
use tracing::trace;

use crate::diagnostics::model::ModelDiagnostics;
use crate::error::ModelError;
use crate::fitness::traits::{FeasibilityCheck, FitnessValue};
use crate::genome::traits::BinaryGenome;
use crate::models::binary_math::{collect_bits, entropy, marginal_one, order_by_entropy};
use crate::models::structure::{ConditionalTable, DependencyStructure, DiscreteNetwork};
use crate::models::{check_length, Model};
use crate::population::population::Population;
use crate::representation::{ConstraintHandling, Representation};

/// Hard cap on parents per node; tables have `2^k` rows
pub const MAX_PARENTS_LIMIT: usize = 8;

#[derive(Clone, Debug)]
struct FittedNetwork {
    network: DiscreteNetwork,
    root_entropy: f64,
    log_likelihood: f64,
}

/// Sparse DAG learned by greedy parent addition.
///
/// Nodes are processed by descending marginal entropy. A node may only take
/// parents among the nodes processed before it, so the graph is acyclic by
/// construction. Each candidate parent set is scored as
///
/// ```text
/// LL(node | parents) - penalty * 0.5 * ln(n) * 2^|parents|
/// ```
///
/// and parents are added one at a time while the score strictly improves.
#[derive(Clone, Debug)]
pub struct SparseNetworkModel {
    max_parents: usize,
    smoothing: f64,
    complexity_penalty: f64,
    state: Option<FittedNetwork>,
}

impl SparseNetworkModel {
    /// `max_parents` is clamped to [`MAX_PARENTS_LIMIT`]
    pub fn new(max_parents: usize, smoothing: f64) -> Self {
        Self {
            max_parents: max_parents.min(MAX_PARENTS_LIMIT),
            smoothing: smoothing.max(1.0e-9),
            complexity_penalty: 1.0,
            state: None,
        }
    }

    /// Weight of the parent-count penalty; `0.0` scores by likelihood alone
    pub fn with_complexity_penalty(mut self, penalty: f64) -> Self {
        self.complexity_penalty = penalty.max(0.0);
        self
    }

    pub fn max_parents(&self) -> usize {
        self.max_parents
    }

    pub fn complexity_penalty(&self) -> f64 {
        self.complexity_penalty
    }

    pub fn structure(&self) -> Option<&DependencyStructure> {
        self.state.as_ref().map(|s| s.network.structure())
    }

    pub fn network(&self) -> Option<&DiscreteNetwork> {
        self.state.as_ref().map(|s| &s.network)
    }

    fn score(&self, samples: &[&[bool]], node: usize, parents: &[usize]) -> f64 {
        let table = ConditionalTable::estimate(samples, node, parents, self.smoothing);
        let n = samples.len().max(1) as f64;
        let size = (1usize << parents.len()) as f64;
        table.log_likelihood(samples, node) - self.complexity_penalty * 0.5 * n.ln() * size
    }

    /// Greedy parent search for `node` among `candidates`
    fn choose_parents(&self, samples: &[&[bool]], node: usize, candidates: &[usize]) -> Vec<usize> {
        let mut parents: Vec<usize> = Vec::new();
        let mut current = self.score(samples, node, &parents);
        while parents.len() < self.max_parents {
            let mut best: Option<(f64, usize)> = None;
            for &c in candidates.iter().filter(|c| !parents.contains(c)) {
                let mut trial = parents.clone();
                trial.push(c);
                let s = self.score(samples, node, &trial);
                let threshold = best.map_or(current, |(bs, _)| bs);
                if s > threshold {
                    best = Some((s, c));
                }
            }
            match best {
                Some((s, c)) => {
                    parents.push(c);
                    current = s;
                }
                None => break,
            }
        }
        parents
    }
}

impl Default for SparseNetworkModel {
    fn default() -> Self {
        Self::new(3, 1.0)
    }
}

impl<G: BinaryGenome> Model<G> for SparseNetworkModel {
    fn name(&self) -> &'static str {
        "boa"
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
        let samples = collect_bits(selected, "boa")?;
        let length = samples[0].len();
        check_length(representation, length)?;

        let marginals = marginal_one(&samples, self.smoothing);
        let order = order_by_entropy(&marginals, true);

        let mut parents = vec![Vec::new(); length];
        let mut candidates: Vec<usize> = Vec::with_capacity(length);
        for &node in &order {
            let mut chosen = self.choose_parents(&samples, node, &candidates);
            trace!(node, parents = ?chosen, "parents chosen");
            chosen.sort_unstable();
            parents[node] = chosen;
            let at = candidates.partition_point(|&c| c < node);
            candidates.insert(at, node);
        }

        let structure = DependencyStructure::from_ordered_parents(order, parents);
        trace!(
            edges = structure.edge_count(),
            max_in_degree = structure.max_in_degree(),
            "network learned"
        );
        let root_entropy = structure
            .order()
            .first()
            .map_or(0.0, |&r| entropy(marginals[r]));
        let network = DiscreteNetwork::fit(&samples, structure, self.smoothing);
        let log_likelihood = network.log_likelihood(&samples);
        self.state = Some(FittedNetwork {
            network,
            root_entropy,
            log_likelihood,
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
            .ok_or(ModelError::NotFitted { model: "boa" })?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let raw = G::from_bits(state.network.sample_bits(rng))?;
            out.push(constraint.enforce(raw, representation, problem, rng));
        }
        Ok(out)
    }

    fn diagnostics(&self) -> ModelDiagnostics {
        match &self.state {
            None => ModelDiagnostics::empty(),
            Some(state) => {
                let s = state.network.structure();
                ModelDiagnostics::empty()
                    .with("edge_count", s.edge_count() as f64)
                    .with("mean_parent_count", s.mean_in_degree())
                    .with("max_parent_count", s.max_in_degree() as f64)
                    .with("root_entropy", state.root_entropy)
                    .with("log_likelihood", state.log_likelihood)
            }
        }
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }
}
