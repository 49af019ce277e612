//! Real-valued vector genome
//!
//! Fixed-length genotype consumed by the continuous models.

use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::genome::traits::{EvolutionaryGenome, RealValuedGenome};

/// Fixed-length real vector genome
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealVector {
    genes: Vec<f64>,
}

impl RealVector {
    pub fn new(genes: Vec<f64>) -> Self {
        Self { genes }
    }

    pub fn zeros(dimension: usize) -> Self {
        Self {
            genes: vec![0.0; dimension],
        }
    }

    /// Every coordinate set to `value`
    pub fn filled(dimension: usize, value: f64) -> Self {
        Self {
            genes: vec![value; dimension],
        }
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    pub fn norm_squared(&self) -> f64 {
        self.genes.iter().map(|x| x * x).sum()
    }

    /// Element-wise difference
    pub fn sub(&self, other: &Self) -> Result<Self, GenomeError> {
        if self.genes.len() != other.genes.len() {
            return Err(GenomeError::DimensionMismatch {
                expected: self.genes.len(),
                actual: other.genes.len(),
            });
        }
        Ok(Self::new(
            self.genes
                .iter()
                .zip(other.genes.iter())
                .map(|(a, b)| a - b)
                .collect(),
        ))
    }

    /// Whether every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.genes.iter().all(|x| x.is_finite())
    }
}

impl EvolutionaryGenome for RealVector {
    type Allele = f64;

    fn dimension(&self) -> usize {
        self.genes.len()
    }

    fn as_slice(&self) -> &[f64] {
        &self.genes
    }

    fn distance(&self, other: &Self) -> f64 {
        self.genes
            .iter()
            .zip(other.genes.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl RealValuedGenome for RealVector {
    fn genes(&self) -> &[f64] {
        &self.genes
    }

    fn genes_mut(&mut self) -> &mut [f64] {
        &mut self.genes
    }

    fn from_genes(genes: Vec<f64>) -> Result<Self, GenomeError> {
        Ok(Self::new(genes))
    }
}

impl std::ops::Index<usize> for RealVector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.genes[index]
    }
}

impl std::ops::IndexMut<usize> for RealVector {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.genes[index]
    }
}

impl From<Vec<f64>> for RealVector {
    fn from(genes: Vec<f64>) -> Self {
        Self::new(genes)
    }
}

impl<const N: usize> From<[f64; N]> for RealVector {
    fn from(genes: [f64; N]) -> Self {
        Self::new(genes.to_vec())
    }
}
