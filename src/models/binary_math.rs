//! Frequency, entropy and mutual-information estimates over bit samples
//!
//! Every estimate is Laplace-smoothed with a caller-supplied `smoothing`
//! constant. Entropies are in nats.

use crate::error::ModelError;
use crate::fitness::traits::FitnessValue;
use crate::genome::traits::BinaryGenome;
use crate::population::population::Population;

/// Probabilities handed to samplers never reach exactly 0 or 1
pub const PROBABILITY_EPSILON: f64 = 1.0e-9;

/// Borrow the bit vectors of a selected population, checking that it is
/// non-empty and uniform in length.
pub fn collect_bits<'a, G, F>(
    selected: &'a Population<G, F>,
    model: &'static str,
) -> Result<Vec<&'a [bool]>, ModelError>
where
    G: BinaryGenome,
    F: FitnessValue,
{
    let samples: Vec<&[bool]> = selected.iter().map(|i| i.genome.bits()).collect();
    let expected = samples
        .first()
        .map(|s| s.len())
        .ok_or(ModelError::EmptySelection { model })?;
    if let Some(bad) = samples.iter().find(|s| s.len() != expected) {
        return Err(ModelError::DimensionMismatch {
            expected,
            actual: bad.len(),
        });
    }
    Ok(samples)
}

/// Clamp into `[ε, 1-ε]`; `NaN` becomes 0.5
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.5
    } else {
        p.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON)
    }
}

/// Binary entropy of a Bernoulli variable
pub fn entropy(p_one: f64) -> f64 {
    let p = clamp_probability(p_one);
    let q = 1.0 - p;
    -p * p.ln() - q * q.ln()
}

/// Smoothed frequency of ones per position
pub fn marginal_one(samples: &[&[bool]], smoothing: f64) -> Vec<f64> {
    let length = samples.first().map_or(0, |s| s.len());
    let mut ones = vec![0.0; length];
    for bits in samples {
        for (count, &bit) in ones.iter_mut().zip(bits.iter()) {
            if bit {
                *count += 1.0;
            }
        }
    }
    let denom = samples.len() as f64 + 2.0 * smoothing;
    ones.into_iter()
        .map(|c| clamp_probability((c + smoothing) / denom))
        .collect()
}

/// Smoothed 2×2 joint distribution of positions `i` and `j`, indexed
/// `[x_i][x_j]`
pub fn joint_table(samples: &[&[bool]], i: usize, j: usize, smoothing: f64) -> [[f64; 2]; 2] {
    let mut joint = [[0.0; 2]; 2];
    for bits in samples {
        joint[usize::from(bits[i])][usize::from(bits[j])] += 1.0;
    }
    let total = samples.len() as f64 + 4.0 * smoothing;
    for row in joint.iter_mut() {
        for cell in row.iter_mut() {
            *cell = if total > 0.0 {
                (*cell + smoothing) / total
            } else {
                0.25
            };
        }
    }
    joint
}

/// Mutual information of a 2×2 joint table; zero cells contribute zero
pub fn mutual_information_of(joint: &[[f64; 2]; 2]) -> f64 {
    let pi = [joint[0][0] + joint[0][1], joint[1][0] + joint[1][1]];
    let pj = [joint[0][0] + joint[1][0], joint[0][1] + joint[1][1]];
    let mut mi = 0.0;
    for (xi, row) in joint.iter().enumerate() {
        for (xj, &pxy) in row.iter().enumerate() {
            let denom = pi[xi] * pj[xj];
            if pxy > 0.0 && denom > 0.0 {
                mi += pxy * (pxy / denom).ln();
            }
        }
    }
    mi.max(0.0)
}

/// Symmetric pairwise mutual-information matrix with a zero diagonal.
///
/// With fewer than two samples every entry is zero.
pub fn mutual_information(samples: &[&[bool]], smoothing: f64) -> Vec<Vec<f64>> {
    let length = samples.first().map_or(0, |s| s.len());
    let mut matrix = vec![vec![0.0; length]; length];
    if samples.len() <= 1 {
        return matrix;
    }
    for i in 0..length {
        for j in (i + 1)..length {
            let mi = mutual_information_of(&joint_table(samples, i, j, smoothing));
            matrix[i][j] = mi;
            matrix[j][i] = mi;
        }
    }
    matrix
}

/// `H(child | parent)` from the smoothed joint table
pub fn conditional_entropy(samples: &[&[bool]], child: usize, parent: usize, smoothing: f64) -> f64 {
    let joint = joint_table(samples, parent, child, smoothing);
    let mut h_joint = 0.0;
    for &p in joint.iter().flatten() {
        if p > 0.0 {
            h_joint -= p * p.ln();
        }
    }
    let p_parent_one = joint[1][0] + joint[1][1];
    (h_joint - entropy(p_parent_one)).max(0.0)
}

/// Position of the highest-entropy marginal; ties go to the lowest index
pub fn max_entropy_index(marginals: &[f64]) -> usize {
    extreme_entropy_index(marginals, |candidate, best| candidate > best)
}

/// Position of the lowest-entropy marginal; ties go to the lowest index
pub fn min_entropy_index(marginals: &[f64]) -> usize {
    extreme_entropy_index(marginals, |candidate, best| candidate < best)
}

fn extreme_entropy_index(marginals: &[f64], wins: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    let mut best_entropy = marginals.first().map_or(0.0, |&p| entropy(p));
    for (i, &p) in marginals.iter().enumerate().skip(1) {
        let h = entropy(p);
        if wins(h, best_entropy) {
            best = i;
            best_entropy = h;
        }
    }
    best
}

/// Positions sorted by marginal entropy; stable, so equal entropies keep
/// index order
pub fn order_by_entropy(marginals: &[f64], descending: bool) -> Vec<usize> {
    let entropies: Vec<f64> = marginals.iter().map(|&p| entropy(p)).collect();
    let mut order: Vec<usize> = (0..marginals.len()).collect();
    order.sort_by(|&a, &b| {
        let ord = entropies[a].total_cmp(&entropies[b]);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    order
}

/// Sum of binary entropies, the entropy of the product distribution
pub fn total_entropy(marginals: &[f64]) -> f64 {
    marginals.iter().map(|&p| entropy(p)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&str]) -> Vec<Vec<bool>> {
        data.iter()
            .map(|s| s.chars().map(|c| c == '1').collect())
            .collect()
    }

    #[test]
    fn test_marginal_one_laplace() {
        let data = rows(&["10", "11", "10", "00"]);
        let samples: Vec<&[bool]> = data.iter().map(Vec::as_slice).collect();
        let p = marginal_one(&samples, 1.0);
        assert!((p[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((p[1] - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_mutual_information_identical_columns() {
        let data = rows(&["11", "00", "11", "00"]);
        let samples: Vec<&[bool]> = data.iter().map(Vec::as_slice).collect();
        let mi = mutual_information(&samples, 0.0);
        assert!((mi[0][1] - std::f64::consts::LN_2).abs() < 1e-12);
        assert_eq!(mi[0][1], mi[1][0]);
        assert_eq!(mi[0][0], 0.0);
    }

    #[test]
    fn test_mutual_information_independent_columns() {
        let data = rows(&["00", "01", "10", "11"]);
        let samples: Vec<&[bool]> = data.iter().map(Vec::as_slice).collect();
        let mi = mutual_information(&samples, 0.0);
        assert!(mi[0][1].abs() < 1e-12);
    }

    #[test]
    fn test_zero_cells_contribute_zero() {
        let joint = [[0.5, 0.0], [0.0, 0.5]];
        let mi = mutual_information_of(&joint);
        assert!(mi.is_finite());
        assert!((mi - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_gives_zero_matrix() {
        let data = rows(&["101"]);
        let samples: Vec<&[bool]> = data.iter().map(Vec::as_slice).collect();
        let mi = mutual_information(&samples, 1.0);
        assert!(mi.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn test_conditional_entropy_of_copy_is_zero() {
        let data = rows(&["11", "00", "11", "00"]);
        let samples: Vec<&[bool]> = data.iter().map(Vec::as_slice).collect();
        assert!(conditional_entropy(&samples, 1, 0, 0.0) < 1e-9);
    }

    #[test]
    fn test_entropy_index_ties_pick_lowest() {
        let marginals = [0.5, 0.9, 0.5, 0.9];
        assert_eq!(max_entropy_index(&marginals), 0);
        assert_eq!(min_entropy_index(&marginals), 1);
        assert_eq!(order_by_entropy(&marginals, true), vec![0, 2, 1, 3]);
        assert_eq!(order_by_entropy(&marginals, false), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_clamp_probability() {
        assert_eq!(clamp_probability(0.0), PROBABILITY_EPSILON);
        assert_eq!(clamp_probability(f64::NAN), 0.5);
        assert!(entropy(0.0).is_finite());
    }
}
