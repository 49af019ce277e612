//! Fitness evaluation and benchmarks
//!
//! This module provides the objective sense, the problem abstraction and a
//! small set of benchmark problems for both genotype families.

pub mod benchmarks;
pub mod traits;

pub mod prelude {
    pub use super::benchmarks::*;
    pub use super::traits::*;
}
