//! Bit string genome
//!
//! Fixed-length binary genotype consumed by the discrete models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::genome::traits::{BinaryGenome, EvolutionaryGenome};

/// Fixed-length bit string genome
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    /// Create a new bit string with the given bits
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Create an all-zeros bit string of the given length
    pub fn zeros(length: usize) -> Self {
        Self {
            bits: vec![false; length],
        }
    }

    /// Create an all-ones bit string of the given length
    pub fn ones(length: usize) -> Self {
        Self {
            bits: vec![true; length],
        }
    }

    /// Create a bit string from the low `length` bits of `value`, least
    /// significant bit first. Lengths above 64 are truncated to 64.
    pub fn from_u64(value: u64, length: usize) -> Self {
        let length = length.min(64);
        let bits = (0..length).map(|i| (value >> i) & 1 == 1).collect();
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Get a specific bit
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Set a specific bit; out-of-range indices are ignored
    pub fn set(&mut self, index: usize, value: bool) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = value;
        }
    }

    /// Flip a specific bit; out-of-range indices are ignored
    pub fn flip(&mut self, index: usize) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = !*bit;
        }
    }

    /// Number of positions where the two strings differ, counting any
    /// length difference as mismatches
    pub fn hamming_distance(&self, other: &Self) -> usize {
        let common = self
            .bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(a, b)| a != b)
            .count();
        common + self.bits.len().abs_diff(other.bits.len())
    }

    /// Iterate over the bits
    pub fn iter(&self) -> std::slice::Iter<'_, bool> {
        self.bits.iter()
    }
}

impl EvolutionaryGenome for BitString {
    type Allele = bool;

    fn dimension(&self) -> usize {
        self.bits.len()
    }

    fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    fn distance(&self, other: &Self) -> f64 {
        self.hamming_distance(other) as f64
    }
}

impl BinaryGenome for BitString {
    fn bits(&self) -> &[bool] {
        &self.bits
    }

    fn bits_mut(&mut self) -> &mut [bool] {
        &mut self.bits
    }

    fn from_bits(bits: Vec<bool>) -> Result<Self, GenomeError> {
        Ok(Self::new(bits))
    }
}

impl std::ops::Index<usize> for BitString {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.bits[index]
    }
}

impl From<Vec<bool>> for BitString {
    fn from(bits: Vec<bool>) -> Self {
        Self::new(bits)
    }
}

impl<const N: usize> From<[bool; N]> for BitString {
    fn from(bits: [bool; N]) -> Self {
        Self::new(bits.to_vec())
    }
}

impl<'a> IntoIterator for &'a BitString {
    type Item = &'a bool;
    type IntoIter = std::slice::Iter<'a, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.bits.iter()
    }
}

/// Parses strings of `0` and `1`, e.g. `"10110"`
impl FromStr for BitString {
    type Err = GenomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(GenomeError::InvalidStructure(format!(
                    "unexpected character '{other}' in bit string"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl std::fmt::Display for BitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &bit in &self.bits {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_string_zeros_and_ones() {
        let z = BitString::zeros(5);
        assert_eq!(z.count_ones(), 0);
        let o = BitString::ones(5);
        assert_eq!(o.count_ones(), 5);
        assert_eq!(o.dimension(), 5);
    }

    #[test]
    fn test_bit_string_from_u64() {
        let bs = BitString::from_u64(0b1011, 4);
        assert_eq!(bs.bits(), &[true, true, false, true]);
        assert_eq!(BitString::from_u64(u64::MAX, 100).len(), 64);
    }

    #[test]
    fn test_bit_string_get_set_flip() {
        let mut bs = BitString::zeros(3);
        bs.set(1, true);
        assert_eq!(bs.get(1), Some(true));
        bs.flip(1);
        bs.flip(2);
        assert_eq!(bs.bits(), &[false, false, true]);
        bs.set(10, true);
        assert_eq!(bs.get(10), None);
    }

    #[test]
    fn test_bit_string_hamming_distance() {
        let a: BitString = "10110".parse().unwrap();
        let b: BitString = "10011".parse().unwrap();
        assert_eq!(a.hamming_distance(&b), 2);
        assert_eq!(a.distance(&b), 2.0);
        let short: BitString = "10".parse().unwrap();
        assert_eq!(a.hamming_distance(&short), 3);
    }

    #[test]
    fn test_bit_string_parse_and_display() {
        let bs: BitString = "0110".parse().unwrap();
        assert_eq!(bs.to_string(), "0110");
        assert!("01x".parse::<BitString>().is_err());
    }

    #[test]
    fn test_bit_string_serialization() {
        let bs = BitString::from([true, false, true]);
        let json = serde_json::to_string(&bs).unwrap();
        let back: BitString = serde_json::from_str(&json).unwrap();
        assert_eq!(bs, back);
    }
}
