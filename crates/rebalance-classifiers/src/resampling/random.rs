use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resampling::{append_rows, check_aligned, validate_ratio, ClassSplit, Resampled, Resampler};

/// Random oversampling: duplicate minority rows, drawn with replacement.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RandomOversampler {
    /// Target minority/majority ratio after resampling.
    pub ratio: f64,
}

impl Default for RandomOversampler {
    fn default() -> Self {
        Self { ratio: 1.0 }
    }
}

impl RandomOversampler {
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }
}

impl Resampler for RandomOversampler {
    fn name(&self) -> &'static str {
        "random_oversampling"
    }

    fn resample(&self, x: &Array2<f32>, y: &[u8], rng: &mut StdRng) -> Result<Resampled> {
        validate_ratio(self.name(), self.ratio)?;
        check_aligned(x, y)?;

        let split = ClassSplit::new(y);
        split.require_minority(self.name(), 1)?;
        let n_new = split.deficit(self.ratio);

        let mut synthetic = Vec::with_capacity(n_new * x.ncols());
        for _ in 0..n_new {
            let row = split.minority[rng.gen_range(0..split.minority.len())];
            synthetic.extend(x.row(row).iter().copied());
        }

        log::debug!(
            "Random oversampling duplicated {} rows of class {}",
            n_new,
            split.minority_label
        );
        append_rows(x, y, synthetic, split.minority_label)
    }
}
