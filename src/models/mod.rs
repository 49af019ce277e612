//! Probabilistic models
//!
//! A model learns a distribution from a selected sub-population (`fit`) and
//! draws new genotypes from it (`sample`). Every model keeps its learned
//! parameters in one owned value that `fit` replaces as a whole, so `sample`
//! only ever sees the result of the last completed `fit`.
//!
//! Discrete models work on any [`BinaryGenome`](crate::genome::traits::BinaryGenome):
//! - [`IndependentModel`]: univariate frequencies (UMDA, PBIL)
//! - [`DependencyTreeModel`]: one parent per node (MIMIC, Chow-Liu, BMDA, linkage tree)
//! - [`SparseNetworkModel`]: bounded in-degree Bayesian network (BOA/EBNA)
//! - [`HierarchicalBoaModel`]: mutual-information forest with blended tables (hBOA)
//!
//! Continuous models work on any [`RealValuedGenome`](crate::genome::traits::RealValuedGenome):
//! - [`DiagonalGaussianModel`]: per-dimension mean and deviation
//! - [`SeparableNesModel`]: separable natural evolution strategy (SNES)

pub mod binary_math;
pub mod dependency_tree;
pub mod gaussian;
pub mod hierarchical;
pub mod independent;
pub mod kind;
pub mod snes;
pub mod sparse_network;
pub mod structure;

use rand::Rng;

use crate::diagnostics::model::ModelDiagnostics;
use crate::error::ModelError;
use crate::fitness::traits::{FeasibilityCheck, FitnessValue};
use crate::genome::traits::EvolutionaryGenome;
use crate::population::population::Population;
use crate::representation::{ConstraintHandling, Representation};

pub use dependency_tree::{DependencyTreeModel, LinkageTree, RootChoice, TreeStrategy};
pub use gaussian::DiagonalGaussianModel;
pub use hierarchical::HierarchicalBoaModel;
pub use independent::IndependentModel;
pub use kind::{BinaryModel, ModelKind, ModelSettings, RealModel};
pub use snes::SeparableNesModel;
pub use sparse_network::SparseNetworkModel;
pub use structure::{ConditionalTable, DependencyStructure, DiscreteNetwork};

/// A learnable, sampleable distribution over genotypes of type `G`
pub trait Model<G: EvolutionaryGenome>: Send + Sync {
    /// Identifier used in logs and diagnostics
    fn name(&self) -> &'static str;

    /// Learn parameters from `selected`, replacing any previous fit.
    ///
    /// Fails with [`ModelError::EmptySelection`] when `selected` is empty
    /// and leaves the previous fit in place on any error.
    fn fit<F, R>(
        &mut self,
        selected: &Population<G, F>,
        representation: &dyn Representation<G>,
        rng: &mut R,
    ) -> Result<(), ModelError>
    where
        F: FitnessValue,
        R: Rng;

    /// Draw `count` genotypes, each passed through `constraint` once.
    ///
    /// Fails with [`ModelError::NotFitted`] before the first successful fit.
    /// `count == 0` returns an empty vector.
    fn sample<R: Rng>(
        &self,
        count: usize,
        representation: &dyn Representation<G>,
        problem: Option<&dyn FeasibilityCheck<G>>,
        constraint: &dyn ConstraintHandling<G>,
        rng: &mut R,
    ) -> Result<Vec<G>, ModelError>;

    /// Snapshot of the current fit; empty before the first fit
    fn diagnostics(&self) -> ModelDiagnostics;

    fn is_fitted(&self) -> bool;
}

/// Check that the representation agrees with the fitted genotype length
pub(crate) fn check_length<G: EvolutionaryGenome>(
    representation: &dyn Representation<G>,
    actual: usize,
) -> Result<(), ModelError> {
    let expected = representation.length();
    if expected != actual {
        return Err(ModelError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

pub mod prelude {
    pub use super::dependency_tree::*;
    pub use super::gaussian::*;
    pub use super::hierarchical::*;
    pub use super::independent::*;
    pub use super::kind::*;
    pub use super::snes::*;
    pub use super::sparse_network::*;
    pub use super::structure::*;
    pub use super::Model;
}
