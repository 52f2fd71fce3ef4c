//! Weighted sample storage and shuffled mini-batch iteration.
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{ClassifierError, Result};

/// Training samples paired with their labels and per-sample loss weights.
#[derive(Debug, Clone)]
pub struct WeightedDataset {
    x: Array2<f32>,
    y: Vec<u8>,
    weights: Vec<f32>,
}

/// One mini-batch: aligned rows, float targets and weights.
#[derive(Debug, Clone)]
pub struct WeightedBatch {
    pub features: Array2<f32>,
    pub targets: Vec<f32>,
    pub weights: Vec<f32>,
}

impl WeightedBatch {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl WeightedDataset {
    pub fn new(x: Array2<f32>, y: Vec<u8>, weights: Vec<f32>) -> Result<Self> {
        if x.nrows() != y.len() || y.len() != weights.len() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "{} samples, {} labels and {} weights must be aligned",
                x.nrows(),
                y.len(),
                weights.len()
            )));
        }
        if let Some(pos) = weights.iter().position(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(ClassifierError::DegenerateWeight(format!(
                "weight {} for sample {} is not a non-negative finite number",
                weights[pos], pos
            )));
        }
        Ok(Self { x, y, weights })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.x
    }

    pub fn labels(&self) -> &[u8] {
        &self.y
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of batches per pass, counting the trailing partial batch.
    pub fn num_batches(&self, batch_size: usize) -> usize {
        if batch_size == 0 {
            return 0;
        }
        (self.len() + batch_size - 1) / batch_size
    }

    /// A fresh pass over the data in a newly shuffled order.
    ///
    /// Each call draws a new permutation from `rng`, so successive epochs see
    /// different groupings. The last batch holds the remainder when the size
    /// does not divide evenly.
    pub fn batches(&self, batch_size: usize, rng: &mut StdRng) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        Batches {
            dataset: self,
            order,
            batch_size,
            cursor: 0,
        }
    }

    fn gather(&self, indices: &[usize]) -> WeightedBatch {
        WeightedBatch {
            features: self.x.select(Axis(0), indices),
            targets: indices.iter().map(|&i| f32::from(self.y[i])).collect(),
            weights: indices.iter().map(|&i| self.weights[i]).collect(),
        }
    }
}

/// Lazy iterator over the mini-batches of one pass.
pub struct Batches<'a> {
    dataset: &'a WeightedDataset,
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = WeightedBatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batch_size == 0 || self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let batch = self.dataset.gather(&self.order[self.cursor..end]);
        self.cursor = end;
        Some(batch)
    }
}
