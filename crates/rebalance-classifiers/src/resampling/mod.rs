//! Minority oversampling strategies.
//!
//! Every resampler keeps the original rows untouched and in order, and appends
//! synthetic (or duplicated) minority rows after them until the minority class
//! reaches `round(ratio * majority_count)`.
use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1, Axis};
use rand::rngs::StdRng;

use crate::error::{ClassifierError, Result};

pub mod adasyn;
pub mod random;
pub mod smote;

pub use adasyn::Adasyn;
pub use random::RandomOversampler;
pub use smote::Smote;

/// Output of a resampler: the augmented training set.
#[derive(Debug, Clone)]
pub struct Resampled {
    pub x: Array2<f32>,
    pub y: Vec<u8>,
    /// Number of rows appended after the original ones.
    pub n_synthetic: usize,
}

/// A strategy that rebalances a binary training set before training.
pub trait Resampler {
    fn name(&self) -> &'static str;

    /// Rebalance `(x, y)`. Original rows come first, generated rows after.
    fn resample(&self, x: &Array2<f32>, y: &[u8], rng: &mut StdRng) -> Result<Resampled>;
}

/// Class layout of a binary label vector.
#[derive(Debug, Clone)]
pub struct ClassSplit {
    pub minority_label: u8,
    pub minority: Vec<usize>,
    pub majority: Vec<usize>,
}

impl ClassSplit {
    /// Split row indices by class. On a tie, class 1 is treated as the minority.
    pub fn new(y: &[u8]) -> Self {
        let zeros: Vec<usize> = (0..y.len()).filter(|&i| y[i] == 0).collect();
        let ones: Vec<usize> = (0..y.len()).filter(|&i| y[i] != 0).collect();
        if zeros.len() < ones.len() {
            ClassSplit {
                minority_label: 0,
                minority: zeros,
                majority: ones,
            }
        } else {
            ClassSplit {
                minority_label: 1,
                minority: ones,
                majority: zeros,
            }
        }
    }

    /// Number of minority rows to add so the minority reaches `ratio * majority`.
    pub fn deficit(&self, ratio: f64) -> usize {
        let target = (ratio * self.majority.len() as f64).round().max(0.0) as usize;
        target.saturating_sub(self.minority.len())
    }

    /// Fail fast when a strategy needs more minority rows than are available.
    pub fn require_minority(&self, strategy: &'static str, required: usize) -> Result<()> {
        if self.minority.len() < required {
            return Err(ClassifierError::InsufficientSamples {
                strategy,
                required,
                found: self.minority.len(),
            });
        }
        Ok(())
    }
}

pub(crate) fn validate_ratio(strategy: &str, ratio: f64) -> Result<()> {
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(ClassifierError::InvalidConfig(format!(
            "{} sampling ratio must be positive, got {}",
            strategy, ratio
        )));
    }
    Ok(())
}

pub(crate) fn check_aligned(x: &Array2<f32>, y: &[u8]) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(ClassifierError::ShapeMismatch(format!(
            "{} samples but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    Ok(())
}

fn squared_distance(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(p, q)| (p - q) * (p - q)).sum()
}

/// Indices (into `candidates`) of the `k` rows nearest to `x[query]`, closest first.
/// The query row itself is excluded by index, so exact duplicates still count.
pub(crate) fn nearest_neighbors(
    x: &Array2<f32>,
    query: usize,
    candidates: &[usize],
    k: usize,
) -> Vec<usize> {
    let point = x.row(query);
    let mut distances: Vec<(f32, usize)> = candidates
        .iter()
        .enumerate()
        .filter(|&(_, &row)| row != query)
        .map(|(pos, &row)| (squared_distance(point, x.row(row)), pos))
        .collect();

    distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    distances.into_iter().take(k).map(|(_, pos)| pos).collect()
}

/// Linear interpolation `a + gap * (b - a)` between two rows.
pub(crate) fn interpolate(a: ArrayView1<f32>, b: ArrayView1<f32>, gap: f32) -> Vec<f32> {
    a.iter().zip(b.iter()).map(|(&p, &q)| p + gap * (q - p)).collect()
}

/// Append generated rows (flattened) and their label to the original data.
pub(crate) fn append_rows(
    x: &Array2<f32>,
    y: &[u8],
    synthetic: Vec<f32>,
    label: u8,
) -> Result<Resampled> {
    let n_features = x.ncols();
    let n_synthetic = if n_features == 0 {
        0
    } else {
        synthetic.len() / n_features
    };
    let extra = Array2::from_shape_vec((n_synthetic, n_features), synthetic)
        .map_err(|e| ClassifierError::ShapeMismatch(e.to_string()))?;
    let x_out = ndarray::concatenate(Axis(0), &[x.view(), extra.view()])
        .map_err(|e| ClassifierError::ShapeMismatch(e.to_string()))?;

    let mut y_out = y.to_vec();
    y_out.extend(std::iter::repeat(label).take(n_synthetic));

    Ok(Resampled {
        x: x_out,
        y: y_out,
        n_synthetic,
    })
}

#[cfg(test)]
pub(crate) mod test_data {
    use ndarray::Array2;

    /// 30 majority points on a grid near the origin, 5 minority points near (10, 10),
    /// and one minority point placed inside the majority grid.
    pub fn imbalanced() -> (Array2<f32>, Vec<u8>) {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            data.push((i % 6) as f32);
            data.push((i / 6) as f32);
            labels.push(0u8);
        }
        for i in 0..5 {
            data.push(10.0 + (i % 3) as f32);
            data.push(10.0 + (i / 3) as f32);
            labels.push(1u8);
        }
        data.push(2.5);
        data.push(2.5);
        labels.push(1u8);
        (Array2::from_shape_vec((36, 2), data).unwrap(), labels)
    }
}
