//! Epoch loop shared by every classifier variant.
use candle_core::{Device, Tensor};
use candle_nn::{Module, Optimizer, ParamsAdamW, VarMap};
use log::{debug, info};
use rand::rngs::StdRng;

use crate::batching::{WeightedBatch, WeightedDataset};
use crate::error::{ClassifierError, Result};
use crate::loss::weighted_bce_with_logits;
use crate::metrics::{ConfusionMatrix, EpochStatistics};
use crate::models::feed_forward::{to_tensor, FeedForwardNet};

/// Hyper-parameters of one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub learning_rate: f64,
    pub batch_size: usize,
    pub num_epochs: usize,
    pub log_every: usize,
}

impl TrainingParams {
    fn should_log(&self, epoch: usize) -> bool {
        epoch + 1 == self.num_epochs || (self.log_every > 0 && epoch % self.log_every == 0)
    }
}

/// Trains `net` (whose parameters live in `var_map`) on `dataset`.
///
/// Each epoch visits every sample once in a fresh random order and takes one
/// Adam step per mini-batch. Predictions made during the epoch (before each
/// step) are scored against the batch targets, giving one row of statistics
/// per epoch.
pub fn train(
    net: &FeedForwardNet,
    var_map: &VarMap,
    dataset: &WeightedDataset,
    params: &TrainingParams,
    rng: &mut StdRng,
    device: &Device,
) -> Result<EpochStatistics> {
    info!(
        "Training on {} samples with {} features ({} batches of {}) for {} epochs",
        dataset.len(),
        dataset.n_features(),
        dataset.num_batches(params.batch_size),
        params.batch_size,
        params.num_epochs
    );

    let adam = ParamsAdamW {
        lr: params.learning_rate,
        weight_decay: 0.0,
        ..Default::default()
    };
    let mut opt = candle_nn::AdamW::new(var_map.all_vars(), adam)?;

    let mut stats = EpochStatistics::default();
    for epoch in 0..params.num_epochs {
        let mut confusion = ConfusionMatrix::default();
        let mut total_loss = 0.0f64;
        let mut num_batches = 0usize;

        for batch in dataset.batches(params.batch_size, rng) {
            let (xs, targets, weights) = batch_tensors(&batch, device)?;

            let logits = net.forward(&xs)?;
            let loss = weighted_bce_with_logits(&logits, &targets, &weights)?;
            opt.backward_step(&loss)?;

            let loss_value = loss.to_scalar::<f32>()? as f64;
            if num_batches == 0 && params.should_log(epoch) {
                debug!(
                    "Epoch {}/{}: first batch loss {:.6}",
                    epoch + 1,
                    params.num_epochs,
                    loss_value
                );
            }
            total_loss += loss_value;
            num_batches += 1;

            for (&logit, &target) in logits.to_vec1::<f32>()?.iter().zip(batch.targets.iter()) {
                confusion.record(target as u8, u8::from(logit >= 0.0));
            }
        }

        if num_batches == 0 {
            return Err(ClassifierError::EmptyEpoch { epoch: epoch + 1 });
        }
        stats.push(&confusion, total_loss / num_batches as f64);
    }

    if let (Some(acc), Some(loss)) = (stats.accuracy.last(), stats.loss.last()) {
        info!(
            "Finished {} epochs: training accuracy {:.4}, mean loss {:.6}",
            params.num_epochs, acc, loss
        );
    }
    Ok(stats)
}

fn batch_tensors(batch: &WeightedBatch, device: &Device) -> Result<(Tensor, Tensor, Tensor)> {
    let xs = to_tensor(&batch.features, device)?;
    let targets = Tensor::new(batch.targets.as_slice(), device)?;
    let weights = Tensor::new(batch.weights.as_slice(), device)?;
    Ok((xs, targets, weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::SeedableRng;

    fn separable(n: usize) -> WeightedDataset {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let sign = if i % 2 == 0 { -1.0 } else { 1.0 };
            sign * (1.0 + j as f32 * 0.5)
        });
        let y = (0..n).map(|i| (i % 2) as u8).collect();
        WeightedDataset::new(x, y, vec![1.0; n]).unwrap()
    }

    fn params(num_epochs: usize, batch_size: usize) -> TrainingParams {
        TrainingParams {
            learning_rate: 0.01,
            batch_size,
            num_epochs,
            log_every: 50,
        }
    }

    #[test]
    fn test_one_row_of_statistics_per_epoch() {
        let device = Device::Cpu;
        let mut rng = StdRng::seed_from_u64(3);
        let (net, var_map) = FeedForwardNet::initialise(2, &mut rng, &device).unwrap();
        let stats = train(&net, &var_map, &separable(40), &params(6, 7), &mut rng, &device).unwrap();

        assert_eq!(stats.len(), 6);
        assert_eq!(stats.loss.len(), 6);
        assert!(stats.accuracy.iter().all(|a| (0.0..=1.0).contains(a)));
        assert!(stats.loss.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn test_learns_separable_data() {
        let device = Device::Cpu;
        let mut rng = StdRng::seed_from_u64(1);
        let (net, var_map) = FeedForwardNet::initialise(2, &mut rng, &device).unwrap();
        let stats = train(&net, &var_map, &separable(60), &params(60, 10), &mut rng, &device).unwrap();

        assert!(stats.loss[59] < stats.loss[0]);
        assert!(stats.accuracy[59] > 0.9);
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let device = Device::Cpu;
        let mut rng = StdRng::seed_from_u64(0);
        let (net, var_map) = FeedForwardNet::initialise(2, &mut rng, &device).unwrap();
        let empty = WeightedDataset::new(Array2::zeros((0, 2)), vec![], vec![]).unwrap();

        let err = train(&net, &var_map, &empty, &params(3, 4), &mut rng, &device).unwrap_err();
        assert!(matches!(err, ClassifierError::EmptyEpoch { epoch: 1 }));
    }
}
