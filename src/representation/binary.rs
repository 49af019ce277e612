//! Fixed-length bit string representation

use rand::{Rng, RngCore};

use crate::genome::bit_string::BitString;
use crate::genome::traits::BinaryGenome;
use crate::representation::{abbreviate, Representation};

/// Bit strings of one fixed length
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitStringRepresentation {
    length: usize,
}

impl BitStringRepresentation {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Representation<BitString> for BitStringRepresentation {
    fn name(&self) -> &'static str {
        "bitstring"
    }

    fn length(&self) -> usize {
        self.length
    }

    fn random(&self, rng: &mut dyn RngCore) -> BitString {
        BitString::new((0..self.length).map(|_| rng.gen::<f64>() < 0.5).collect())
    }

    fn is_valid(&self, genotype: &BitString) -> bool {
        genotype.len() == self.length
    }

    /// Truncates long genotypes and pads short ones with zeros
    fn repair(&self, genotype: BitString) -> BitString {
        if genotype.len() == self.length {
            return genotype;
        }
        let mut bits = genotype.bits().to_vec();
        bits.resize(self.length, false);
        BitString::new(bits)
    }

    fn summarize(&self, genotype: &BitString) -> String {
        abbreviate(genotype.to_string(), 64)
    }
}
