use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resampling::{
    append_rows, check_aligned, interpolate, nearest_neighbors, validate_ratio, ClassSplit,
    Resampled, Resampler,
};

/// SMOTE (Synthetic Minority Over-sampling Technique).
///
/// A synthetic row is placed at a uniformly random point on the segment between
/// a random minority row and one of its `k_neighbors` nearest minority rows.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Smote {
    pub k_neighbors: usize,
    /// Target minority/majority ratio after resampling.
    pub ratio: f64,
}

impl Default for Smote {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            ratio: 1.0,
        }
    }
}

impl Smote {
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k.max(1);
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }
}

impl Resampler for Smote {
    fn name(&self) -> &'static str {
        "smote"
    }

    fn resample(&self, x: &Array2<f32>, y: &[u8], rng: &mut StdRng) -> Result<Resampled> {
        validate_ratio(self.name(), self.ratio)?;
        check_aligned(x, y)?;

        let split = ClassSplit::new(y);
        split.require_minority(self.name(), 2)?;
        let n_new = split.deficit(self.ratio);

        let k = self.k_neighbors.max(1).min(split.minority.len() - 1);
        if k < self.k_neighbors {
            log::debug!(
                "SMOTE: only {} minority samples, using {} neighbours instead of {}",
                split.minority.len(),
                k,
                self.k_neighbors
            );
        }

        let neighbors: Vec<Vec<usize>> = split
            .minority
            .iter()
            .map(|&row| nearest_neighbors(x, row, &split.minority, k))
            .collect();

        let mut synthetic = Vec::with_capacity(n_new * x.ncols());
        for _ in 0..n_new {
            let base = rng.gen_range(0..split.minority.len());
            let candidates = &neighbors[base];
            let neighbor = candidates[rng.gen_range(0..candidates.len())];
            let gap: f32 = rng.gen();
            synthetic.extend(interpolate(
                x.row(split.minority[base]),
                x.row(split.minority[neighbor]),
                gap,
            ));
        }

        log::debug!(
            "SMOTE generated {} rows of class {} (k = {})",
            n_new,
            split.minority_label,
            k
        );
        append_rows(x, y, synthetic, split.minority_label)
    }
}
