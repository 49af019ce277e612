//! Genotype representations and constraint handling
//!
//! A [`Representation`] fixes the genotype shape, draws random genotypes and
//! repairs malformed ones. [`ConstraintHandling`] policies are applied once
//! to every genotype a model samples.

pub mod binary;
pub mod constraint;
pub mod real;

use rand::RngCore;

use crate::genome::traits::EvolutionaryGenome;

pub use binary::BitStringRepresentation;
pub use constraint::{ConstraintHandling, IdentityConstraint, RejectionConstraint, RepairConstraint};
pub use real::RealVectorRepresentation;

/// Shape of a fixed-length genotype.
///
/// Object safe, so drivers and models can hold `&dyn Representation<G>`.
pub trait Representation<G: EvolutionaryGenome>: Send + Sync {
    /// Short identifier, e.g. `"bitstring"`
    fn name(&self) -> &'static str;

    /// Genotype length
    fn length(&self) -> usize;

    /// Uniformly random genotype
    fn random(&self, rng: &mut dyn RngCore) -> G;

    /// Structural validity (length, domain)
    fn is_valid(&self, genotype: &G) -> bool;

    /// Nearest valid genotype
    fn repair(&self, genotype: G) -> G;

    /// Compact human-readable rendering for logs
    fn summarize(&self, genotype: &G) -> String;
}

/// Truncate `text` to at most `max` characters, marking the cut with `...`
pub(crate) fn abbreviate(text: String, max: usize) -> String {
    if text.chars().count() <= max {
        return text;
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

pub mod prelude {
    pub use super::binary::*;
    pub use super::constraint::*;
    pub use super::real::*;
    pub use super::Representation;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("0101".to_string(), 64), "0101");
        let long = "1".repeat(70);
        let short = abbreviate(long, 64);
        assert_eq!(short.len(), 64);
        assert!(short.ends_with("..."));
    }
}
