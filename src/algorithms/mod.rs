//! Evolutionary algorithms
//!
//! The generational EDA driver and its policies.

pub mod eda;

pub mod prelude {
    pub use super::eda::*;
}
