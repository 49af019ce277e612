//! Model selection by identifier
//!
//! [`ModelKind`] names every model variant; [`ModelSettings`] carries the
//! tunables. Together they build a [`BinaryModel`] or [`RealModel`], enums
//! that dispatch `fit`/`sample`/`diagnostics` to the concrete model.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::diagnostics::model::ModelDiagnostics;
use crate::error::{EvoResult, EvolutionError, ModelError};
use crate::fitness::traits::{FeasibilityCheck, FitnessValue};
use crate::genome::traits::{BinaryGenome, RealValuedGenome};
use crate::models::dependency_tree::DependencyTreeModel;
use crate::models::gaussian::DiagonalGaussianModel;
use crate::models::hierarchical::HierarchicalBoaModel;
use crate::models::independent::IndependentModel;
use crate::models::snes::SeparableNesModel;
use crate::models::sparse_network::SparseNetworkModel;
use crate::models::Model;
use crate::population::population::Population;
use crate::representation::{ConstraintHandling, Representation};

/// Every model variant, keyed by a short identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    Umda,
    Pbil,
    Mimic,
    ChowLiu,
    Bmda,
    Ltga,
    Boa,
    Hboa,
    #[serde(rename = "gaussian-diag")]
    GaussianDiag,
    Snes,
}

impl ModelKind {
    pub const ALL: [ModelKind; 10] = [
        ModelKind::Umda,
        ModelKind::Pbil,
        ModelKind::Mimic,
        ModelKind::ChowLiu,
        ModelKind::Bmda,
        ModelKind::Ltga,
        ModelKind::Boa,
        ModelKind::Hboa,
        ModelKind::GaussianDiag,
        ModelKind::Snes,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ModelKind::Umda => "umda",
            ModelKind::Pbil => "pbil",
            ModelKind::Mimic => "mimic",
            ModelKind::ChowLiu => "chow-liu",
            ModelKind::Bmda => "bmda",
            ModelKind::Ltga => "ltga",
            ModelKind::Boa => "boa",
            ModelKind::Hboa => "hboa",
            ModelKind::GaussianDiag => "gaussian-diag",
            ModelKind::Snes => "snes",
        }
    }

    /// True for models over bit strings
    pub fn is_discrete(self) -> bool {
        !matches!(self, ModelKind::GaussianDiag | ModelKind::Snes)
    }

    /// Build a discrete model; fails for continuous kinds
    pub fn binary_model(self, settings: &ModelSettings) -> EvoResult<BinaryModel> {
        let s = settings.smoothing;
        let model = match self {
            ModelKind::Umda => BinaryModel::Independent(IndependentModel::new(s)),
            ModelKind::Pbil => {
                BinaryModel::Independent(IndependentModel::pbil(settings.learning_rate, s))
            }
            ModelKind::Mimic => BinaryModel::Tree(DependencyTreeModel::mimic(s)),
            ModelKind::ChowLiu => BinaryModel::Tree(DependencyTreeModel::chow_liu(s)),
            ModelKind::Bmda => BinaryModel::Tree(DependencyTreeModel::bmda(s)),
            ModelKind::Ltga => BinaryModel::Tree(DependencyTreeModel::linkage_tree_model(s)),
            ModelKind::Boa => BinaryModel::Network(
                SparseNetworkModel::new(settings.max_parents, s)
                    .with_complexity_penalty(settings.complexity_penalty),
            ),
            ModelKind::Hboa => BinaryModel::Hierarchical(HierarchicalBoaModel::new(
                s,
                settings.min_mutual_information,
                settings.learning_rate,
            )),
            ModelKind::GaussianDiag | ModelKind::Snes => {
                return Err(EvolutionError::Configuration(format!(
                    "Model '{}' needs a real-valued representation",
                    self.id()
                )))
            }
        };
        Ok(model)
    }

    /// Build a continuous model; fails for discrete kinds
    pub fn real_model(self, settings: &ModelSettings) -> EvoResult<RealModel> {
        match self {
            ModelKind::GaussianDiag => Ok(RealModel::Gaussian(DiagonalGaussianModel::new(
                settings.min_sigma,
            ))),
            ModelKind::Snes => {
                let mut model = SeparableNesModel::new()
                    .with_sigma_range(settings.min_sigma, settings.max_sigma);
                if let Some(eta) = settings.eta_mean {
                    model = model.with_eta_mean(eta);
                }
                if let Some(eta) = settings.eta_sigma {
                    model = model.with_eta_sigma(eta);
                }
                Ok(RealModel::Snes(model))
            }
            _ => Err(EvolutionError::Configuration(format!(
                "Model '{}' needs a bit-string representation",
                self.id()
            ))),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModelKind {
    type Err = EvolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ModelKind::ALL
            .into_iter()
            .find(|k| k.id() == wanted)
            .ok_or_else(|| EvolutionError::Configuration(format!("Unknown model '{}'", s)))
    }
}

/// Tunables shared by all model kinds; each kind reads the ones it uses
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Laplace smoothing for discrete estimates
    pub smoothing: f64,
    /// Blend factor for PBIL and hBOA
    pub learning_rate: f64,
    /// Parent cap for the sparse network
    pub max_parents: usize,
    /// Weight of the network size penalty
    pub complexity_penalty: f64,
    /// Weakest mutual information that still earns an hBOA edge
    pub min_mutual_information: f64,
    pub min_sigma: f64,
    pub max_sigma: f64,
    pub eta_mean: Option<f64>,
    pub eta_sigma: Option<f64>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            smoothing: 1.0,
            learning_rate: 0.1,
            max_parents: 3,
            complexity_penalty: 1.0,
            min_mutual_information: 0.01,
            min_sigma: 1.0e-8,
            max_sigma: 1.0e6,
            eta_mean: None,
            eta_sigma: None,
        }
    }
}

/// Closed set of discrete models
#[derive(Clone, Debug)]
pub enum BinaryModel {
    Independent(IndependentModel),
    Tree(DependencyTreeModel),
    Network(SparseNetworkModel),
    Hierarchical(HierarchicalBoaModel),
}

/// Closed set of continuous models
#[derive(Clone, Debug)]
pub enum RealModel {
    Gaussian(DiagonalGaussianModel),
    Snes(SeparableNesModel),
}

macro_rules! delegate_model {
    ($enum:ident, $bound:ident, $($variant:ident),+) => {
        impl<G: $bound> Model<G> for $enum {
            fn name(&self) -> &'static str {
                match self {
                    $($enum::$variant(m) => Model::<G>::name(m),)+
                }
            }

            fn fit<F, R>(
                &mut self,
                selected: &Population<G, F>,
                representation: &dyn Representation<G>,
                rng: &mut R,
            ) -> Result<(), ModelError>
            where
                F: FitnessValue,
                R: Rng,
            {
                match self {
                    $($enum::$variant(m) => Model::<G>::fit(m, selected, representation, rng),)+
                }
            }

            fn sample<R: Rng>(
                &self,
                count: usize,
                representation: &dyn Representation<G>,
                problem: Option<&dyn FeasibilityCheck<G>>,
                constraint: &dyn ConstraintHandling<G>,
                rng: &mut R,
            ) -> Result<Vec<G>, ModelError> {
                match self {
                    $($enum::$variant(m) => {
                        Model::<G>::sample(m, count, representation, problem, constraint, rng)
                    })+
                }
            }

            fn diagnostics(&self) -> ModelDiagnostics {
                match self {
                    $($enum::$variant(m) => Model::<G>::diagnostics(m),)+
                }
            }

            fn is_fitted(&self) -> bool {
                match self {
                    $($enum::$variant(m) => Model::<G>::is_fitted(m),)+
                }
            }
        }
    };
}

delegate_model!(BinaryModel, BinaryGenome, Independent, Tree, Network, Hierarchical);
delegate_model!(RealModel, RealValuedGenome, Gaussian, Snes);
