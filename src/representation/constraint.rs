//! Constraint-handling policies
//!
//! Applied once per sampled genotype, after the model draws it and before
//! it is evaluated.

use rand::RngCore;
use tracing::trace;

use crate::fitness::traits::FeasibilityCheck;
use crate::genome::traits::EvolutionaryGenome;
use crate::representation::Representation;

/// Turns a sampled candidate into the genotype that enters the population
pub trait ConstraintHandling<G: EvolutionaryGenome>: Send + Sync {
    fn name(&self) -> &'static str;

    fn enforce(
        &self,
        candidate: G,
        representation: &dyn Representation<G>,
        problem: Option<&dyn FeasibilityCheck<G>>,
        rng: &mut dyn RngCore,
    ) -> G;
}

fn acceptable<G: EvolutionaryGenome>(
    genotype: &G,
    representation: &dyn Representation<G>,
    problem: Option<&dyn FeasibilityCheck<G>>,
) -> bool {
    representation.is_valid(genotype) && problem.map_or(true, |p| p.is_feasible(genotype))
}

/// Passes candidates through unchanged
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityConstraint;

impl<G: EvolutionaryGenome> ConstraintHandling<G> for IdentityConstraint {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn enforce(
        &self,
        candidate: G,
        _representation: &dyn Representation<G>,
        _problem: Option<&dyn FeasibilityCheck<G>>,
        _rng: &mut dyn RngCore,
    ) -> G {
        candidate
    }
}

/// Replaces invalid candidates with the representation's repair
#[derive(Clone, Copy, Debug, Default)]
pub struct RepairConstraint;

impl<G: EvolutionaryGenome> ConstraintHandling<G> for RepairConstraint {
    fn name(&self) -> &'static str {
        "repair"
    }

    fn enforce(
        &self,
        candidate: G,
        representation: &dyn Representation<G>,
        problem: Option<&dyn FeasibilityCheck<G>>,
        _rng: &mut dyn RngCore,
    ) -> G {
        if acceptable(&candidate, representation, problem) {
            candidate
        } else {
            representation.repair(candidate)
        }
    }
}

/// Redraws infeasible candidates uniformly up to `max_attempts` times, then
/// falls back to repairing the original candidate
#[derive(Clone, Copy, Debug)]
pub struct RejectionConstraint {
    pub max_attempts: usize,
}

impl RejectionConstraint {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }
}

impl Default for RejectionConstraint {
    fn default() -> Self {
        Self::new(10)
    }
}

impl<G: EvolutionaryGenome> ConstraintHandling<G> for RejectionConstraint {
    fn name(&self) -> &'static str {
        "rejection"
    }

    fn enforce(
        &self,
        candidate: G,
        representation: &dyn Representation<G>,
        problem: Option<&dyn FeasibilityCheck<G>>,
        rng: &mut dyn RngCore,
    ) -> G {
        if acceptable(&candidate, representation, problem) {
            return candidate;
        }
        for attempt in 0..self.max_attempts {
            let redraw = representation.random(rng);
            if acceptable(&redraw, representation, problem) {
                trace!(attempt, "rejection sampling accepted redraw");
                return redraw;
            }
        }
        representation.repair(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::benchmarks::Knapsack;
    use crate::genome::bit_string::BitString;
    use crate::genome::real_vector::RealVector;
    use crate::genome::traits::RealValuedGenome;
    use crate::representation::{BitStringRepresentation, RealVectorRepresentation};
    use crate::rng::RngStream;

    #[test]
    fn test_identity_passes_through() {
        let rep = RealVectorRepresentation::uniform(2, 0.0, 1.0);
        let mut rng = RngStream::from_seed(0);
        let out = IdentityConstraint.enforce(RealVector::from([5.0, 5.0]), &rep, None, &mut rng);
        assert_eq!(out.genes(), &[5.0, 5.0]);
    }

    #[test]
    fn test_repair_clamps_out_of_bounds() {
        let rep = RealVectorRepresentation::uniform(2, 0.0, 1.0);
        let mut rng = RngStream::from_seed(0);
        let out = RepairConstraint.enforce(RealVector::from([5.0, 0.5]), &rep, None, &mut rng);
        assert_eq!(out.genes(), &[1.0, 0.5]);
    }

    #[test]
    fn test_rejection_finds_feasible_knapsack() {
        // Only light selections fit: capacity 3 over four weight-2 items
        let problem = Knapsack::new(vec![2, 2, 2, 2], vec![1, 1, 1, 1], 3, 1.0);
        let rep = BitStringRepresentation::new(4);
        let mut rng = RngStream::from_seed(21);
        let out = RejectionConstraint::new(200).enforce(
            BitString::ones(4),
            &rep,
            Some(&problem),
            &mut rng,
        );
        assert!(FeasibilityCheck::is_feasible(&problem, &out));
    }

    #[test]
    fn test_rejection_keeps_feasible_candidate() {
        let problem = Knapsack::new(vec![1, 1], vec![1, 1], 5, 1.0);
        let rep = BitStringRepresentation::new(2);
        let mut rng = RngStream::from_seed(2);
        let candidate = BitString::ones(2);
        let out = RejectionConstraint::default().enforce(
            candidate.clone(),
            &rep,
            Some(&problem),
            &mut rng,
        );
        assert_eq!(out, candidate);
    }

    #[test]
    fn test_rejection_zero_attempts_repairs() {
        let rep = BitStringRepresentation::new(3);
        let mut rng = RngStream::from_seed(2);
        let out = RejectionConstraint::new(0).enforce(BitString::ones(5), &rep, None, &mut rng);
        assert_eq!(out.len(), 3);
    }
}
