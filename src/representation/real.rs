//! Bounded real vector representation

use rand::RngCore;

use crate::genome::bounds::MultiBounds;
use crate::genome::real_vector::RealVector;
use crate::genome::traits::RealValuedGenome;
use crate::representation::{abbreviate, Representation};

/// Real vectors inside a box
#[derive(Clone, Debug, PartialEq)]
pub struct RealVectorRepresentation {
    bounds: MultiBounds,
}

impl RealVectorRepresentation {
    pub fn new(bounds: MultiBounds) -> Self {
        Self { bounds }
    }

    /// The same interval on every coordinate
    pub fn uniform(dimension: usize, min: f64, max: f64) -> Self {
        Self::new((0..dimension).map(|_| (min, max)).collect())
    }

    pub fn bounds(&self) -> &MultiBounds {
        &self.bounds
    }
}

impl Representation<RealVector> for RealVectorRepresentation {
    fn name(&self) -> &'static str {
        "real-vector"
    }

    fn length(&self) -> usize {
        self.bounds.dimension()
    }

    fn random(&self, rng: &mut dyn RngCore) -> RealVector {
        RealVector::new(self.bounds.sample(rng))
    }

    fn is_valid(&self, genotype: &RealVector) -> bool {
        self.bounds.contains_vec(genotype.genes())
    }

    /// Clamps every coordinate into its interval and fixes the length,
    /// filling missing coordinates with interval centers
    fn repair(&self, genotype: RealVector) -> RealVector {
        let mut genes = genotype.into_inner();
        let centers = self.bounds.centers();
        genes.truncate(centers.len());
        genes.extend_from_slice(&centers[genes.len()..]);
        self.bounds.clamp_vec(&mut genes);
        RealVector::new(genes)
    }

    fn summarize(&self, genotype: &RealVector) -> String {
        let parts: Vec<String> = genotype.genes().iter().map(|x| format!("{x:.4}")).collect();
        abbreviate(format!("[{}]", parts.join(", ")), 96)
    }
}
