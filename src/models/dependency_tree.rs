//! Tree-structured dependency models
//!
//! Every node has at most one parent. Three structure learners share the
//! pairwise mutual-information matrix:
//!
//! - [`TreeStrategy::SpanningTree`]: Prim-style maximum spanning tree grown
//!   from a root chosen by marginal entropy (Chow-Liu, BMDA)
//! - [`TreeStrategy::Chain`]: MIMIC chain, each step appending the variable
//!   with the lowest conditional entropy given the previous one
//! - [`TreeStrategy::Agglomerative`]: UPGMA linkage tree; every merge adds
//!   the strongest edge between the two merged clusters
//!
//! Ties always go to the smallest position index.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::diagnostics::model::ModelDiagnostics;
use crate::error::ModelError;
use crate::fitness::traits::{FeasibilityCheck, FitnessValue};
use crate::genome::traits::BinaryGenome;
use crate::models::binary_math::{
    collect_bits, conditional_entropy, entropy, marginal_one, max_entropy_index,
    min_entropy_index, mutual_information, total_entropy,
};
use crate::models::structure::{DependencyStructure, DiscreteNetwork};
use crate::models::{check_length, Model};
use crate::population::population::Population;
use crate::representation::{ConstraintHandling, Representation};

/// Which marginal becomes the tree root
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootChoice {
    MaxEntropy,
    MinEntropy,
}

/// Structure learner for [`DependencyTreeModel`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeStrategy {
    SpanningTree { root: RootChoice },
    Chain,
    Agglomerative,
}

/// UPGMA merge history.
///
/// Starts with one singleton cluster per position; each later entry is the
/// union produced by one merge, so a length-`L` genotype yields `2L - 1`
/// clusters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkageTree {
    pub clusters: Vec<Vec<usize>>,
}

impl LinkageTree {
    /// Number of merges performed
    pub fn merges(&self) -> usize {
        self.clusters.iter().filter(|c| c.len() > 1).count()
    }
}

#[derive(Clone, Debug)]
struct FittedTree {
    network: DiscreteNetwork,
    root: usize,
    root_entropy: f64,
    model_entropy: f64,
    avg_mutual_information: f64,
    linkage: Option<LinkageTree>,
}

/// Tree-structured model: a root marginal plus `P(child | parent)` per edge
#[derive(Clone, Debug)]
pub struct DependencyTreeModel {
    strategy: TreeStrategy,
    smoothing: f64,
    state: Option<FittedTree>,
}

impl DependencyTreeModel {
    /// Smoothing is floored at `1e-9`
    pub fn new(strategy: TreeStrategy, smoothing: f64) -> Self {
        Self {
            strategy,
            smoothing: smoothing.max(1.0e-9),
            state: None,
        }
    }

    /// MIMIC chain
    pub fn mimic(smoothing: f64) -> Self {
        Self::new(TreeStrategy::Chain, smoothing)
    }

    /// Chow-Liu spanning tree rooted at the lowest-entropy variable
    pub fn chow_liu(smoothing: f64) -> Self {
        Self::new(
            TreeStrategy::SpanningTree {
                root: RootChoice::MinEntropy,
            },
            smoothing,
        )
    }

    /// BMDA spanning tree rooted at the highest-entropy variable
    pub fn bmda(smoothing: f64) -> Self {
        Self::new(
            TreeStrategy::SpanningTree {
                root: RootChoice::MaxEntropy,
            },
            smoothing,
        )
    }

    /// UPGMA linkage tree
    pub fn linkage_tree_model(smoothing: f64) -> Self {
        Self::new(TreeStrategy::Agglomerative, smoothing)
    }

    pub fn strategy(&self) -> TreeStrategy {
        self.strategy
    }

    /// Learned structure, `None` before the first fit
    pub fn structure(&self) -> Option<&DependencyStructure> {
        self.state.as_ref().map(|s| s.network.structure())
    }

    /// Learned network, `None` before the first fit
    pub fn network(&self) -> Option<&DiscreteNetwork> {
        self.state.as_ref().map(|s| &s.network)
    }

    /// Merge history of the last agglomerative fit
    pub fn linkage_tree(&self) -> Option<&LinkageTree> {
        self.state.as_ref().and_then(|s| s.linkage.as_ref())
    }

    fn label(&self) -> &'static str {
        match self.strategy {
            TreeStrategy::SpanningTree {
                root: RootChoice::MaxEntropy,
            } => "bmda",
            TreeStrategy::SpanningTree {
                root: RootChoice::MinEntropy,
            } => "chow-liu",
            TreeStrategy::Chain => "mimic",
            TreeStrategy::Agglomerative => "linkage-tree",
        }
    }
}

impl Default for DependencyTreeModel {
    fn default() -> Self {
        Self::mimic(1.0)
    }
}

/// Prim growth over `weights` from `root`.
///
/// Scans attached nodes and then unattached nodes in ascending index order,
/// keeping the first strictly heavier edge. A `root` outside the matrix
/// leaves every node parentless.
pub fn maximum_spanning_tree(weights: &[Vec<f64>], root: usize) -> Vec<Option<usize>> {
    let n = weights.len();
    let mut parent = vec![None; n];
    if root >= n {
        return parent;
    }
    let mut attached = vec![false; n];
    attached[root] = true;
    for _ in 1..n {
        let mut best: Option<(f64, usize, usize)> = None;
        for from in (0..n).filter(|&i| attached[i]) {
            for to in (0..n).filter(|&j| !attached[j]) {
                let w = weights[from][to];
                if best.map_or(true, |(bw, _, _)| w > bw) {
                    best = Some((w, from, to));
                }
            }
        }
        let Some((_, from, to)) = best else { break };
        attached[to] = true;
        parent[to] = Some(from);
    }
    parent
}

/// MIMIC chain: start at the lowest-entropy variable and repeatedly append
/// the unattached variable with the lowest `H(X_j | X_last)`
fn chain(samples: &[&[bool]], marginals: &[f64], smoothing: f64) -> (Vec<Option<usize>>, usize) {
    let n = marginals.len();
    let mut parent = vec![None; n];
    if n == 0 {
        return (parent, 0);
    }
    let root = min_entropy_index(marginals);
    let mut attached = vec![false; n];
    attached[root] = true;
    let mut last = root;
    for _ in 1..n {
        let mut best: Option<(f64, usize)> = None;
        for j in (0..n).filter(|&j| !attached[j]) {
            let h = conditional_entropy(samples, j, last, smoothing);
            if best.map_or(true, |(bh, _)| h < bh) {
                best = Some((h, j));
            }
        }
        let Some((_, next)) = best else { break };
        attached[next] = true;
        parent[next] = Some(last);
        last = next;
    }
    (parent, root)
}

/// UPGMA over `mi`, returning the undirected merge edges and the history
fn agglomerate(mi: &[Vec<f64>]) -> (Vec<(usize, usize)>, LinkageTree) {
    let n = mi.len();
    let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    let mut history = LinkageTree {
        clusters: clusters.clone(),
    };
    let mut edges = Vec::with_capacity(n.saturating_sub(1));

    while clusters.len() > 1 {
        let mut best: Option<(f64, usize, usize)> = None;
        for a in 0..clusters.len() {
            for b in (a + 1)..clusters.len() {
                let total: f64 = clusters[a]
                    .iter()
                    .flat_map(|&x| clusters[b].iter().map(move |&y| (x, y)))
                    .map(|(x, y)| mi[x][y])
                    .sum();
                let avg = total / (clusters[a].len() * clusters[b].len()) as f64;
                if best.map_or(true, |(bv, _, _)| avg > bv) {
                    best = Some((avg, a, b));
                }
            }
        }
        let Some((_, a, b)) = best else { break };

        let mut edge: Option<(f64, usize, usize)> = None;
        for &x in &clusters[a] {
            for &y in &clusters[b] {
                if edge.map_or(true, |(ev, _, _)| mi[x][y] > ev) {
                    edge = Some((mi[x][y], x, y));
                }
            }
        }
        if let Some((_, x, y)) = edge {
            edges.push((x, y));
        }

        let absorbed = clusters.remove(b);
        clusters[a].extend(absorbed);
        clusters[a].sort_unstable();
        history.clusters.push(clusters[a].clone());
    }
    (edges, history)
}

/// Orient undirected edges away from `root` by breadth-first search
fn orient(n: usize, edges: &[(usize, usize)], root: usize) -> Vec<Option<usize>> {
    let mut adjacency = vec![Vec::new(); n];
    for &(x, y) in edges {
        adjacency[x].push(y);
        adjacency[y].push(x);
    }
    for list in adjacency.iter_mut() {
        list.sort_unstable();
    }
    let mut parent = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    if root < n {
        visited[root] = true;
        queue.push_back(root);
    }
    while let Some(node) = queue.pop_front() {
        for &next in &adjacency[node] {
            if !visited[next] {
                visited[next] = true;
                parent[next] = Some(node);
                queue.push_back(next);
            }
        }
    }
    parent
}

impl<G: BinaryGenome> Model<G> for DependencyTreeModel {
    fn name(&self) -> &'static str {
        self.label()
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
        let samples = collect_bits(selected, self.label())?;
        let length = samples[0].len();
        check_length(representation, length)?;

        let marginals = marginal_one(&samples, self.smoothing);
        let mi = mutual_information(&samples, self.smoothing);

        let (parent, root, linkage) = match self.strategy {
            TreeStrategy::SpanningTree { root: choice } => {
                let root = match choice {
                    RootChoice::MaxEntropy => max_entropy_index(&marginals),
                    RootChoice::MinEntropy => min_entropy_index(&marginals),
                };
                (maximum_spanning_tree(&mi, root), root, None)
            }
            TreeStrategy::Chain => {
                let (parent, root) = chain(&samples, &marginals, self.smoothing);
                (parent, root, None)
            }
            TreeStrategy::Agglomerative => {
                let root = max_entropy_index(&marginals);
                let (edges, history) = agglomerate(&mi);
                (orient(length, &edges, root), root, Some(history))
            }
        };

        let edge_mi: Vec<f64> = parent
            .iter()
            .enumerate()
            .filter_map(|(child, p)| p.map(|p| mi[child][p]))
            .collect();
        let avg_mutual_information = if edge_mi.is_empty() {
            0.0
        } else {
            edge_mi.iter().sum::<f64>() / edge_mi.len() as f64
        };

        let structure = DependencyStructure::from_tree(&parent, root);
        trace!(
            model = self.label(),
            edges = structure.edge_count(),
            depth = structure.depth(),
            root,
            "dependency tree learned"
        );

        self.state = Some(FittedTree {
            network: DiscreteNetwork::fit(&samples, structure, self.smoothing),
            root,
            root_entropy: marginals.get(root).map_or(0.0, |&p| entropy(p)),
            model_entropy: total_entropy(&marginals),
            avg_mutual_information,
            linkage,
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
        let state = self.state.as_ref().ok_or(ModelError::NotFitted {
            model: self.label(),
        })?;
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
        let structure = state.network.structure();
        let mut d = ModelDiagnostics::empty()
            .with("edge_count", structure.edge_count() as f64)
            .with("tree_depth", structure.depth() as f64)
            .with("avg_mutual_information", state.avg_mutual_information)
            .with("root_entropy", state.root_entropy)
            .with("model_entropy", state.model_entropy)
            .with("root", state.root as f64);
        if let Some(linkage) = &state.linkage {
            d.insert("linkage_merges", linkage.merges() as f64);
        }
        d
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::ObjectiveSense;
    use crate::genome::bit_string::BitString;
    use crate::representation::{BitStringRepresentation, IdentityConstraint};
    use crate::rng::RngStream;

    /// Bits 0 and 1 always equal, bit 2 the complement of bit 0, bit 3 noise
    fn correlated(n: usize, seed: u64) -> Population<BitString> {
        let mut rng = RngStream::from_seed(seed);
        let genomes = (0..n)
            .map(|_| {
                let a = rng.next_double() < 0.5;
                let noise = rng.next_double() < 0.5;
                BitString::new(vec![a, a, !a, noise])
            })
            .collect();
        Population::from_genomes(genomes, ObjectiveSense::Maximize, 0)
    }

    fn fit(model: &mut DependencyTreeModel, pop: &Population<BitString>) {
        let rep = BitStringRepresentation::new(pop[0].genome.len());
        let mut rng = RngStream::from_seed(0);
        Model::<BitString>::fit(model, pop, &rep, &mut rng).unwrap();
    }

    #[test]
    fn test_maximum_spanning_tree_prefers_heavy_edges() {
        let w = vec![
            vec![0.0, 0.9, 0.1],
            vec![0.9, 0.0, 0.5],
            vec![0.1, 0.5, 0.0],
        ];
        assert_eq!(maximum_spanning_tree(&w, 0), vec![None, Some(0), Some(1)]);
    }

    #[test]
    fn test_maximum_spanning_tree_ties_pick_smallest() {
        let w = vec![vec![0.0; 3]; 3];
        // node 0 attaches to the root first, then 2 ties between 0 and 1
        assert_eq!(maximum_spanning_tree(&w, 1), vec![Some(1), None, Some(0)]);
    }

    #[test]
    fn test_maximum_spanning_tree_root_out_of_range() {
        let w = vec![vec![0.5; 3]; 3];
        assert_eq!(maximum_spanning_tree(&w, 3), vec![None, None, None]);
        assert!(maximum_spanning_tree(&[], 0).is_empty());
    }

    #[test]
    fn test_every_strategy_yields_a_tree() {
        let pop = correlated(200, 3);
        for mut model in [
            DependencyTreeModel::mimic(1.0),
            DependencyTreeModel::chow_liu(1.0),
            DependencyTreeModel::bmda(1.0),
            DependencyTreeModel::linkage_tree_model(1.0),
        ] {
            fit(&mut model, &pop);
            let s = model.structure().unwrap();
            assert!(s.is_topologically_ordered(), "{:?}", model.strategy());
            assert_eq!(s.edge_count(), 3);
            assert!(s.max_in_degree() <= 1);
            assert_eq!(s.roots().len(), 1);
        }
    }

    #[test]
    fn test_correlated_pair_is_linked() {
        let pop = correlated(200, 5);
        let mut model = DependencyTreeModel::bmda(1.0);
        fit(&mut model, &pop);
        let edges = model.structure().unwrap().edges();
        assert!(edges.contains(&(0, 1)) || edges.contains(&(1, 0)));
    }

    #[test]
    fn test_sampling_reproduces_dependencies() {
        let pop = correlated(300, 8);
        let mut model = DependencyTreeModel::mimic(0.01);
        fit(&mut model, &pop);
        let rep = BitStringRepresentation::new(4);
        let mut rng = RngStream::from_seed(1);
        let out =
            Model::<BitString>::sample(&model, 200, &rep, None, &IdentityConstraint, &mut rng)
                .unwrap();
        let agree = out.iter().filter(|g| g[0] == g[1] && g[2] != g[0]).count();
        assert!(agree >= 190, "agree {agree}");
    }

    #[test]
    fn test_linkage_tree_history() {
        let pop = correlated(100, 2);
        let mut model = DependencyTreeModel::linkage_tree_model(1.0);
        fit(&mut model, &pop);
        let history = model.linkage_tree().unwrap();
        assert_eq!(history.clusters.len(), 7);
        assert_eq!(history.merges(), 3);
        assert_eq!(history.clusters.last().unwrap(), &vec![0, 1, 2, 3]);
        // The perfectly linked trio merges before the noise bit joins
        assert_eq!(history.clusters[4].len(), 2);
        assert!(!history.clusters[4].contains(&3));
    }

    #[test]
    fn test_diagnostics_after_fit() {
        let pop = correlated(50, 1);
        let mut model = DependencyTreeModel::chow_liu(1.0);
        assert!(Model::<BitString>::diagnostics(&model).is_empty());
        fit(&mut model, &pop);
        let d = Model::<BitString>::diagnostics(&model);
        assert_eq!(d.get("edge_count"), Some(3.0));
        assert!(d.get("avg_mutual_information").unwrap() > 0.0);
        assert!(d.get("tree_depth").unwrap() >= 1.0);
    }

    #[test]
    fn test_single_position_genotype() {
        let pop = Population::from_genomes(
            vec![BitString::ones(1), BitString::zeros(1)],
            ObjectiveSense::Maximize,
            0,
        );
        let mut model = DependencyTreeModel::linkage_tree_model(1.0);
        fit(&mut model, &pop);
        assert_eq!(model.structure().unwrap().edge_count(), 0);
    }
}
