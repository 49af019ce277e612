//! Genome abstractions and implementations
//!
//! Fixed-length genotypes used by the models: bit strings for the discrete
//! models and real vectors for the continuous ones.

pub mod bit_string;
pub mod bounds;
pub mod real_vector;
pub mod traits;

pub mod prelude {
    pub use super::bit_string::*;
    pub use super::bounds::*;
    pub use super::real_vector::*;
    pub use super::traits::*;
}
