//! # edaf
//!
//! Estimation-of-distribution algorithms for Rust.
//!
//! Instead of crossover and mutation, an EDA learns a probabilistic model of
//! the best individuals of each generation and samples the next generation
//! from it.
//!
//! ## Core Concepts
//!
//! - **Models**: discrete models over bit strings (independent, dependency
//!   tree, sparse Bayesian network) and continuous models over real vectors
//!   (diagonal Gaussian, separable NES), all behind one [`models::Model`] trait
//! - **Driver**: [`algorithms::eda::Eda`] runs select, fit, sample, evaluate
//!   and elitism until a termination criterion fires
//! - **Determinism**: every consumer of randomness owns a named stream
//!   derived from one master seed ([`rng::RngManager`]), so a seed fixes
//!   the whole run regardless of evaluation threads
//!
//! ## Quick Start
//!
//! ```rust
//! use edaf::prelude::*;
//!
//! let mut eda = Eda::builder()
//!     .problem(DeceptiveTrap::new(3))
//!     .representation(BitStringRepresentation::new(12))
//!     .model(DependencyTreeModel::linkage_tree_model(1.0))
//!     .selection(TournamentSelection::new(4))
//!     .population_size(200)
//!     .selection_size(100)
//!     .max_generations(30)
//!     .seed(42)
//!     .build()?;
//! let result = eda.run()?;
//! println!("{}", result.stats.summary());
//! # Ok::<(), EvolutionError>(())
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod models;
pub mod population;
pub mod representation;
pub mod rng;
pub mod selection;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::models::prelude::*;
    pub use crate::models::Model;
    pub use crate::population::prelude::*;
    pub use crate::representation::prelude::*;
    pub use crate::rng::{RngManager, RngStream};
    pub use crate::selection::prelude::*;
    pub use crate::termination::prelude::*;
}
