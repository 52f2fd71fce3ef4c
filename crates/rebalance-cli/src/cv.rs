//! Repeated stratified k-fold cross-validation.
use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossValidation {
    pub n_splits: usize,
    pub n_repeats: usize,
    pub seed: u64,
}

impl Default for CrossValidation {
    fn default() -> Self {
        Self {
            n_splits: 5,
            n_repeats: 2,
            seed: 42,
        }
    }
}

/// One train/test split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub repeat: usize,
    pub split: usize,
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Fold {
    /// Position of the fold in the flattened `repeat x split` sequence.
    pub fn index(&self, n_splits: usize) -> usize {
        self.repeat * n_splits + self.split
    }
}

impl CrossValidation {
    pub fn n_folds(&self) -> usize {
        self.n_splits * self.n_repeats
    }

    /// Every fold of every repeat. Within a repeat the test sets partition the
    /// indices, and each class is spread over the splits as evenly as possible.
    pub fn split(&self, y: &[u8]) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            bail!("Cross-validation needs at least 2 splits, got {}", self.n_splits);
        }
        if self.n_repeats == 0 {
            bail!("Cross-validation needs at least 1 repeat");
        }
        if y.len() < self.n_splits {
            bail!(
                "Cannot split {} samples into {} folds",
                y.len(),
                self.n_splits
            );
        }

        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(), Vec::new()];
        for (i, &label) in y.iter().enumerate() {
            by_class[usize::from(label != 0)].push(i);
        }
        for (class, members) in by_class.iter().enumerate() {
            if !members.is_empty() && members.len() < self.n_splits {
                log::warn!(
                    "Class {} has only {} members, fewer than n_splits = {}",
                    class,
                    members.len(),
                    self.n_splits
                );
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut folds = Vec::with_capacity(self.n_folds());
        for repeat in 0..self.n_repeats {
            let mut assignment = vec![0usize; y.len()];
            let mut offset = 0;
            for members in by_class.iter() {
                let mut shuffled = members.clone();
                shuffled.shuffle(&mut rng);
                for (pos, &idx) in shuffled.iter().enumerate() {
                    assignment[idx] = (offset + pos) % self.n_splits;
                }
                offset += shuffled.len();
            }

            for split in 0..self.n_splits {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..y.len()).partition(|&i| assignment[i] == split);
                folds.push(Fold {
                    repeat,
                    split,
                    train,
                    test,
                });
            }
        }
        Ok(folds)
    }
}
