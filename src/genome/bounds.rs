//! Search-space bounds for real-valued genotypes

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;

/// Closed interval `[min, max]` for one real coordinate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Create an interval, rejecting inverted or non-finite limits
    pub fn try_new(min: f64, max: f64) -> Result<Self, GenomeError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(GenomeError::InvalidStructure(format!(
                "invalid bounds [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    /// Create an interval.
    ///
    /// # Panics
    /// Panics if `min > max`.
    pub fn new(min: f64, max: f64) -> Self {
        assert!(min <= max, "min ({min}) must be <= max ({max})");
        Self { min, max }
    }

    /// `[-half_width, half_width]`
    pub fn symmetric(half_width: f64) -> Self {
        Self::new(-half_width.abs(), half_width.abs())
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Project a value onto the interval; NaN maps to the center
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.center()
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Uniform draw from the interval
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.width() <= 0.0 {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Per-coordinate bounds of a real vector representation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiBounds {
    pub bounds: Vec<Bounds>,
}

impl MultiBounds {
    pub fn new(bounds: Vec<Bounds>) -> Self {
        Self { bounds }
    }

    /// The same interval for every coordinate
    pub fn uniform(bound: Bounds, dimension: usize) -> Self {
        Self {
            bounds: vec![bound; dimension],
        }
    }

    pub fn symmetric(half_width: f64, dimension: usize) -> Self {
        Self::uniform(Bounds::symmetric(half_width), dimension)
    }

    pub fn dimension(&self) -> usize {
        self.bounds.len()
    }

    pub fn get(&self, index: usize) -> Option<&Bounds> {
        self.bounds.get(index)
    }

    /// Clamp every coordinate in place
    pub fn clamp_vec(&self, values: &mut [f64]) {
        for (value, bound) in values.iter_mut().zip(self.bounds.iter()) {
            *value = bound.clamp(*value);
        }
    }

    /// True when the lengths agree and every coordinate is inside its interval
    pub fn contains_vec(&self, values: &[f64]) -> bool {
        values.len() == self.bounds.len()
            && values
                .iter()
                .zip(self.bounds.iter())
                .all(|(v, b)| b.contains(*v))
    }

    /// Indices of the coordinates that fall outside their interval
    pub fn violations(&self, values: &[f64]) -> Vec<usize> {
        values
            .iter()
            .zip(self.bounds.iter())
            .enumerate()
            .filter(|(_, (v, b))| !b.contains(**v))
            .map(|(i, _)| i)
            .collect()
    }

    /// Midpoint of every interval
    pub fn centers(&self) -> Vec<f64> {
        self.bounds.iter().map(Bounds::center).collect()
    }

    /// Width of every interval
    pub fn widths(&self) -> Vec<f64> {
        self.bounds.iter().map(Bounds::width).collect()
    }

    /// Uniform draw from the box
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.bounds.iter().map(|b| b.sample(rng)).collect()
    }
}

impl FromIterator<Bounds> for MultiBounds {
    fn from_iter<I: IntoIterator<Item = Bounds>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FromIterator<(f64, f64)> for MultiBounds {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Bounds::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngStream;

    #[test]
    fn test_bounds_try_new_rejects_inverted() {
        assert!(Bounds::try_new(1.0, 0.0).is_err());
        assert!(Bounds::try_new(f64::NAN, 1.0).is_err());
        assert!(Bounds::try_new(-1.0, 1.0).is_ok());
    }

    #[test]
    #[should_panic]
    fn test_bounds_new_panics_on_inverted() {
        let _ = Bounds::new(2.0, 1.0);
    }

    #[test]
    fn test_bounds_clamp_and_contains() {
        let b = Bounds::new(-2.0, 3.0);
        assert_eq!(b.clamp(-5.0), -2.0);
        assert_eq!(b.clamp(10.0), 3.0);
        assert_eq!(b.clamp(1.0), 1.0);
        assert_eq!(b.clamp(f64::NAN), 0.5);
        assert!(b.contains(3.0));
        assert!(!b.contains(3.01));
    }

    #[test]
    fn test_bounds_sample_in_range() {
        let b = Bounds::new(-1.0, 4.0);
        let mut rng = RngStream::from_seed(4);
        for _ in 0..200 {
            assert!(b.contains(b.sample(&mut rng)));
        }
        assert_eq!(Bounds::new(2.0, 2.0).sample(&mut rng), 2.0);
    }

    #[test]
    fn test_multi_bounds_violations() {
        let mb: MultiBounds = vec![(0.0, 1.0), (0.0, 1.0), (-1.0, 1.0)]
            .into_iter()
            .collect();
        assert_eq!(mb.violations(&[0.5, 1.5, -2.0]), vec![1, 2]);
        assert!(mb.contains_vec(&[0.0, 1.0, 0.0]));
        assert!(!mb.contains_vec(&[0.0, 1.0]));
    }

    #[test]
    fn test_multi_bounds_clamp_vec() {
        let mb = MultiBounds::symmetric(1.0, 3);
        let mut values = vec![-3.0, 0.25, 7.0];
        mb.clamp_vec(&mut values);
        assert_eq!(values, vec![-1.0, 0.25, 1.0]);
    }

    #[test]
    fn test_multi_bounds_centers_and_widths() {
        let mb: MultiBounds = vec![(0.0, 2.0), (-4.0, 4.0)].into_iter().collect();
        assert_eq!(mb.centers(), vec![1.0, 0.0]);
        assert_eq!(mb.widths(), vec![2.0, 8.0]);
    }
}
