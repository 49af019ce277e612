//! Dependency structures and conditional probability tables
//!
//! A [`DependencyStructure`] is a DAG over genotype positions stored as a
//! parent list per node plus a topological order. Acyclicity follows from
//! how the learners build it: a parent is always placed earlier in the
//! order than its child.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::binary_math::clamp_probability;

/// Parent sets and a topological order over `0..len`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStructure {
    parents: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl DependencyStructure {
    /// No edges; order is `0..length`
    pub fn independent(length: usize) -> Self {
        Self {
            parents: vec![Vec::new(); length],
            order: (0..length).collect(),
        }
    }

    /// Build from a parent array of a tree or forest.
    ///
    /// The order is a breadth-first walk from `root`, followed by walks from
    /// any other parentless node in index order. Children are visited in
    /// index order.
    pub fn from_tree(parent: &[Option<usize>], root: usize) -> Self {
        let n = parent.len();
        let mut children = vec![Vec::new(); n];
        for (node, p) in parent.iter().enumerate() {
            if let Some(p) = *p {
                children[p].push(node);
            }
        }

        let mut visited = vec![false; n];
        let mut order = Vec::with_capacity(n);
        let roots = std::iter::once(root)
            .filter(|&r| r < n)
            .chain((0..n).filter(|&i| parent[i].is_none() && i != root));
        for start in roots {
            if visited[start] {
                continue;
            }
            let mut queue = VecDeque::from([start]);
            visited[start] = true;
            while let Some(node) = queue.pop_front() {
                order.push(node);
                for &child in &children[node] {
                    if !visited[child] {
                        visited[child] = true;
                        queue.push_back(child);
                    }
                }
            }
        }

        Self {
            parents: parent.iter().map(|p| p.iter().copied().collect()).collect(),
            order,
        }
    }

    /// Build from a processing order and the parents chosen for each node,
    /// where every parent precedes its child in `order`
    pub fn from_ordered_parents(order: Vec<usize>, parents: Vec<Vec<usize>>) -> Self {
        debug_assert_eq!(order.len(), parents.len());
        Self { parents, order }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parents(&self, node: usize) -> &[usize] {
        &self.parents[node]
    }

    /// Topological order used for ancestral sampling
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// `(parent, child)` pairs
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.parents
            .iter()
            .enumerate()
            .flat_map(|(child, ps)| ps.iter().map(move |&p| (p, child)))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.parents.iter().map(Vec::len).sum()
    }

    pub fn max_in_degree(&self) -> usize {
        self.parents.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn mean_in_degree(&self) -> f64 {
        if self.parents.is_empty() {
            0.0
        } else {
            self.edge_count() as f64 / self.parents.len() as f64
        }
    }

    /// Nodes without parents
    pub fn roots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.parents[i].is_empty()).collect()
    }

    /// Length of the longest parent chain
    pub fn depth(&self) -> usize {
        let mut depth = vec![0usize; self.len()];
        for &node in &self.order {
            depth[node] = self.parents[node]
                .iter()
                .map(|&p| depth[p] + 1)
                .max()
                .unwrap_or(0);
        }
        depth.into_iter().max().unwrap_or(0)
    }

    /// Whether the order covers every node once and lists each parent
    /// before its child
    pub fn is_topologically_ordered(&self) -> bool {
        let n = self.len();
        let mut position = vec![usize::MAX; n];
        for (pos, &node) in self.order.iter().enumerate() {
            if node >= n || position[node] != usize::MAX {
                return false;
            }
            position[node] = pos;
        }
        if self.order.len() != n {
            return false;
        }
        self.edges()
            .into_iter()
            .all(|(p, c)| p < n && position[p] < position[c])
    }
}

/// `P(node = 1 | parents)` for every assignment of the parents.
///
/// Parent assignments are keyed by bitmask: bit `i` of the state is the
/// value of the `i`-th parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionalTable {
    parents: Vec<usize>,
    probabilities: Vec<f64>,
}

impl ConditionalTable {
    /// Smoothed estimate from samples; a parentless node gets its marginal
    pub fn estimate(samples: &[&[bool]], node: usize, parents: &[usize], smoothing: f64) -> Self {
        let states = 1usize << parents.len();
        let mut totals = vec![0.0; states];
        let mut ones = vec![0.0; states];
        for bits in samples {
            let state = Self::state_of(bits, parents);
            totals[state] += 1.0;
            if bits[node] {
                ones[state] += 1.0;
            }
        }
        let probabilities = totals
            .iter()
            .zip(ones.iter())
            .map(|(&t, &o)| {
                let denom = t + 2.0 * smoothing;
                if denom > 0.0 {
                    clamp_probability((o + smoothing) / denom)
                } else {
                    0.5
                }
            })
            .collect();
        Self {
            parents: parents.to_vec(),
            probabilities,
        }
    }

    /// Table with explicit per-state probabilities, clamped into `(0, 1)`
    pub fn from_probabilities(parents: Vec<usize>, probabilities: Vec<f64>) -> Self {
        debug_assert_eq!(probabilities.len(), 1 << parents.len());
        Self {
            parents,
            probabilities: probabilities.into_iter().map(clamp_probability).collect(),
        }
    }

    /// Exponential moving average with a previous table over the same
    /// parents: `p = (1 - rate) * previous + rate * p`.
    ///
    /// Returns `false` and leaves `self` untouched when the parents differ.
    pub fn blend_from(&mut self, previous: &ConditionalTable, rate: f64) -> bool {
        if previous.parents != self.parents {
            return false;
        }
        for (p, &old) in self.probabilities.iter_mut().zip(previous.probabilities.iter()) {
            *p = clamp_probability((1.0 - rate) * old + rate * *p);
        }
        true
    }

    /// Bitmask of the parents' values in `genes`
    pub fn state_of(genes: &[bool], parents: &[usize]) -> usize {
        parents
            .iter()
            .enumerate()
            .filter(|&(_, &p)| genes[p])
            .fold(0, |state, (i, _)| state | (1 << i))
    }

    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// `P(node = 1)` given the parents' values in `genes`
    pub fn probability_one(&self, genes: &[bool]) -> f64 {
        self.probabilities[Self::state_of(genes, &self.parents)]
    }

    /// Log-likelihood of the node's column under this table
    pub fn log_likelihood(&self, samples: &[&[bool]], node: usize) -> f64 {
        samples
            .iter()
            .map(|bits| {
                let p = self.probability_one(bits);
                if bits[node] {
                    p.ln()
                } else {
                    (1.0 - p).ln()
                }
            })
            .sum()
    }
}

/// A structure together with one conditional table per node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscreteNetwork {
    structure: DependencyStructure,
    tables: Vec<ConditionalTable>,
}

impl DiscreteNetwork {
    /// Estimate every node's table for a fixed structure
    pub fn fit(samples: &[&[bool]], structure: DependencyStructure, smoothing: f64) -> Self {
        let tables = (0..structure.len())
            .map(|node| {
                ConditionalTable::estimate(samples, node, structure.parents(node), smoothing)
            })
            .collect();
        Self { structure, tables }
    }

    /// Pair a structure with tables built elsewhere; `tables[i]` belongs
    /// to node `i` and must condition on its parents
    pub fn from_tables(structure: DependencyStructure, tables: Vec<ConditionalTable>) -> Self {
        debug_assert_eq!(structure.len(), tables.len());
        Self { structure, tables }
    }

    pub fn structure(&self) -> &DependencyStructure {
        &self.structure
    }

    pub fn tables(&self) -> &[ConditionalTable] {
        &self.tables
    }

    /// Ancestral sampling: each node in topological order, conditioned on
    /// its already drawn parents
    pub fn sample_bits<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<bool> {
        let mut genes = vec![false; self.structure.len()];
        for &node in self.structure.order() {
            let p = self.tables[node].probability_one(&genes);
            genes[node] = rng.gen::<f64>() < p;
        }
        genes
    }

    pub fn log_likelihood(&self, samples: &[&[bool]]) -> f64 {
        self.tables
            .iter()
            .enumerate()
            .map(|(node, table)| table.log_likelihood(samples, node))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngStream;

    #[test]
    fn test_from_tree_breadth_first() {
        // 2 is the root; 0 and 3 hang off 2; 1 hangs off 0
        let parent = [Some(2), Some(0), None, Some(2)];
        let s = DependencyStructure::from_tree(&parent, 2);
        assert_eq!(s.order(), &[2, 0, 3, 1]);
        assert_eq!(s.edge_count(), 3);
        assert_eq!(s.depth(), 2);
        assert_eq!(s.roots(), vec![2]);
        assert!(s.is_topologically_ordered());
    }

    #[test]
    fn test_from_tree_forest_covers_all_nodes() {
        let parent = [None, Some(0), None, Some(2)];
        let s = DependencyStructure::from_tree(&parent, 2);
        assert_eq!(s.order(), &[2, 3, 0, 1]);
        assert!(s.is_topologically_ordered());
    }

    #[test]
    fn test_out_of_order_structure_detected() {
        let s = DependencyStructure::from_ordered_parents(vec![0, 1], vec![vec![1], vec![]]);
        assert!(!s.is_topologically_ordered());
    }

    #[test]
    fn test_conditional_table_bitmask() {
        let data: Vec<Vec<bool>> = vec![
            vec![true, false, true],
            vec![true, true, false],
            vec![false, true, true],
        ];
        let samples: Vec<&[bool]> = data.iter().map(Vec::as_slice).collect();
        let table = ConditionalTable::estimate(&samples, 2, &[0, 1], 0.0);
        assert_eq!(table.probabilities().len(), 4);
        // state 0b01: parent 0 set, parent 1 clear
        assert_eq!(ConditionalTable::state_of(&data[0], &[0, 1]), 1);
        assert!(table.probabilities()[1] > 0.99);
        assert!(table.probabilities()[3] < 0.01);
        // unseen state falls back to 0.5
        assert_eq!(table.probabilities()[0], 0.5);
    }

    #[test]
    fn test_blend_needs_matching_parents() {
        let previous = ConditionalTable::from_probabilities(vec![0], vec![0.2, 0.8]);
        let mut table = ConditionalTable::from_probabilities(vec![0], vec![0.6, 0.4]);
        assert!(table.blend_from(&previous, 0.25));
        assert!((table.probabilities()[0] - 0.3).abs() < 1e-12);
        assert!((table.probabilities()[1] - 0.7).abs() < 1e-12);

        let mut other = ConditionalTable::from_probabilities(vec![1], vec![0.6, 0.4]);
        assert!(!other.blend_from(&previous, 0.25));
        assert_eq!(other.probabilities(), &[0.6, 0.4]);
    }

    #[test]
    fn test_network_sampling_follows_parent() {
        // Position 1 copies position 0
        let data: Vec<Vec<bool>> = (0..40).map(|i| vec![i % 2 == 0, i % 2 == 0]).collect();
        let samples: Vec<&[bool]> = data.iter().map(Vec::as_slice).collect();
        let structure = DependencyStructure::from_tree(&[None, Some(0)], 0);
        let network = DiscreteNetwork::fit(&samples, structure, 0.0);
        let mut rng = RngStream::from_seed(12);
        for _ in 0..100 {
            let g = network.sample_bits(&mut rng);
            assert_eq!(g[0], g[1]);
        }
        assert!(network.log_likelihood(&samples).is_finite());
    }
}
