use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resampling::{
    append_rows, check_aligned, interpolate, nearest_neighbors, validate_ratio, ClassSplit,
    Resampled, Resampler,
};

/// ADASYN (Adaptive Synthetic Sampling).
///
/// Minority rows whose neighbourhood is dominated by the majority class are
/// harder to learn, so they receive a larger share of the synthetic budget.
/// Generation itself follows SMOTE: interpolation towards a random one of the
/// `k_neighbors` nearest minority rows.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Adasyn {
    pub k_neighbors: usize,
    /// Target minority/majority ratio after resampling.
    pub ratio: f64,
}

impl Default for Adasyn {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            ratio: 1.0,
        }
    }
}

impl Adasyn {
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k.max(1);
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    /// Fraction of majority rows among the `k` nearest neighbours (over all rows)
    /// of each minority row.
    fn difficulty(&self, x: &Array2<f32>, split: &ClassSplit, y: &[u8]) -> Vec<f64> {
        let all_rows: Vec<usize> = (0..x.nrows()).collect();
        let k = self.k_neighbors.max(1).min(x.nrows() - 1);

        split
            .minority
            .iter()
            .map(|&row| {
                let neighbors = nearest_neighbors(x, row, &all_rows, k);
                let n_majority = neighbors
                    .iter()
                    .filter(|&&pos| y[all_rows[pos]] != split.minority_label)
                    .count();
                n_majority as f64 / k as f64
            })
            .collect()
    }
}

/// Split `total` into integer shares proportional to `weights` (largest remainder),
/// so the shares always sum to exactly `total`.
pub(crate) fn allocate(weights: &[f64], total: usize) -> Vec<usize> {
    let sum: f64 = weights.iter().sum();
    let normalized: Vec<f64> = if sum > 0.0 {
        weights.iter().map(|w| w / sum).collect()
    } else {
        vec![1.0 / weights.len() as f64; weights.len()]
    };

    let exact: Vec<f64> = normalized.iter().map(|r| r * total as f64).collect();
    let mut shares: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let assigned: usize = shares.iter().sum();

    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for &i in order.iter().take(total.saturating_sub(assigned)) {
        shares[i] += 1;
    }
    shares
}

impl Resampler for Adasyn {
    fn name(&self) -> &'static str {
        "adasyn"
    }

    fn resample(&self, x: &Array2<f32>, y: &[u8], rng: &mut StdRng) -> Result<Resampled> {
        validate_ratio(self.name(), self.ratio)?;
        check_aligned(x, y)?;

        let split = ClassSplit::new(y);
        split.require_minority(self.name(), 2)?;
        let n_new = split.deficit(self.ratio);

        let difficulty = self.difficulty(x, &split, y);
        if difficulty.iter().all(|&r| r == 0.0) {
            log::warn!(
                "ADASYN: no minority sample has a majority neighbour, spreading {} samples uniformly",
                n_new
            );
        }
        let shares = allocate(&difficulty, n_new);

        let k = self.k_neighbors.max(1).min(split.minority.len() - 1);
        let mut synthetic = Vec::with_capacity(n_new * x.ncols());
        for (pos, &share) in shares.iter().enumerate() {
            if share == 0 {
                continue;
            }
            let row = split.minority[pos];
            let candidates = nearest_neighbors(x, row, &split.minority, k);
            for _ in 0..share {
                let neighbor = candidates[rng.gen_range(0..candidates.len())];
                let gap: f32 = rng.gen();
                synthetic.extend(interpolate(
                    x.row(row),
                    x.row(split.minority[neighbor]),
                    gap,
                ));
            }
        }

        log::debug!(
            "ADASYN generated {} rows of class {} (k = {})",
            n_new,
            split.minority_label,
            k
        );
        append_rows(x, y, synthetic, split.minority_label)
    }
}
