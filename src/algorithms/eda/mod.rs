//! Estimation of Distribution Algorithms (EDAs)
//!
//! EDAs work by:
//! 1. Selecting promising individuals from the population
//! 2. Estimating a probability distribution from the selected individuals
//! 3. Sampling new individuals from the learned distribution
//! 4. Repeating until termination
//!
//! Every named variant (UMDA, PBIL, MIMIC, BMDA, linkage-tree, BOA, SNES)
//! is the same [`Eda`] driver with a different [`Model`](crate::models::Model).
//!
//! ```rust
//! use edaf::prelude::*;
//!
//! let mut eda = Eda::builder()
//!     .problem(OneMax)
//!     .representation(BitStringRepresentation::new(20))
//!     .model(IndependentModel::default())
//!     .selection(TruncationSelection)
//!     .population_size(100)
//!     .selection_size(50)
//!     .max_generations(20)
//!     .seed(7)
//!     .build()?;
//! let result = eda.run()?;
//! assert!(result.best_fitness() >= 15.0);
//! # Ok::<(), edaf::error::EvolutionError>(())
//! ```

pub mod config;
pub mod driver;
pub mod evaluator;

pub use config::{EdaConfig, ElitismPolicy};
pub use driver::{Eda, EdaBuilder, ProgressObserver};
pub use evaluator::Evaluator;
