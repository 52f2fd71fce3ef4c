use ndarray::Array2;
use rand::rngs::StdRng;

use crate::batching::WeightedDataset;
use crate::error::Result;
use crate::resampling::Resampler;
use crate::weights::{count_weights, kde_weights, uniform_weights, KdeWeighting};

/// Turns a raw training set into the weighted dataset the training loop consumes.
///
/// Implementations either compute per-sample weights on the original rows or
/// resample the rows and weight them uniformly; never both.
pub trait ImbalanceHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn prepare(&self, x: &Array2<f32>, y: &[u8], rng: &mut StdRng) -> Result<WeightedDataset>;
}

/// Every sample weighs 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWeighting;

impl ImbalanceHandler for NoWeighting {
    fn name(&self) -> &'static str {
        "none"
    }

    fn prepare(&self, x: &Array2<f32>, y: &[u8], _rng: &mut StdRng) -> Result<WeightedDataset> {
        WeightedDataset::new(x.clone(), y.to_vec(), uniform_weights(y.len()))
    }
}

/// Inverse class frequency weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountWeighting;

impl ImbalanceHandler for CountWeighting {
    fn name(&self) -> &'static str {
        "count_weighting"
    }

    fn prepare(&self, x: &Array2<f32>, y: &[u8], _rng: &mut StdRng) -> Result<WeightedDataset> {
        WeightedDataset::new(x.clone(), y.to_vec(), count_weights(y))
    }
}

impl ImbalanceHandler for KdeWeighting {
    fn name(&self) -> &'static str {
        "density_weighting"
    }

    fn prepare(&self, x: &Array2<f32>, y: &[u8], _rng: &mut StdRng) -> Result<WeightedDataset> {
        let weights = kde_weights(x, y, self)?;
        WeightedDataset::new(x.clone(), y.to_vec(), weights)
    }
}

/// Adapts a [`Resampler`] into a handler: resample once, then weight uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Oversampling<R>(pub R);

impl<R: Resampler + Send + Sync> ImbalanceHandler for Oversampling<R> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn prepare(&self, x: &Array2<f32>, y: &[u8], rng: &mut StdRng) -> Result<WeightedDataset> {
        let resampled = self.0.resample(x, y, rng)?;
        log::debug!(
            "{}: {} -> {} training rows ({} synthetic)",
            self.name(),
            x.nrows(),
            resampled.x.nrows(),
            resampled.n_synthetic
        );
        let weights = uniform_weights(resampled.y.len());
        WeightedDataset::new(resampled.x, resampled.y, weights)
    }
}
