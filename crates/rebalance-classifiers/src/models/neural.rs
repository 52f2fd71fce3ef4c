use candle_core::{Device, Module, Tensor};
use candle_nn::VarMap;
use log::debug;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ClassifierConfig, StatsPolicy};
use crate::error::{ClassifierError, Result};
use crate::metrics::{EpochStatistics, Stat};
use crate::models::classifier_trait::Classifier;
use crate::models::feed_forward::{to_tensor, FeedForwardNet};
use crate::models::handler::{CountWeighting, ImbalanceHandler, NoWeighting, Oversampling};
use crate::resampling::{Adasyn, RandomOversampler, Smote};
use crate::training::{train, TrainingParams};
use crate::weights::KdeWeighting;

struct FittedNet {
    net: FeedForwardNet,
    // keeps the trained parameters alive alongside the network
    _var_map: VarMap,
    n_features: usize,
}

/// Feed-forward binary classifier trained through an [`ImbalanceHandler`].
pub struct NeuralClassifier<H> {
    config: ClassifierConfig,
    handler: H,
    device: Device,
    stats: Option<EpochStatistics>,
    fitted: Option<FittedNet>,
}

pub type UnweightedClassifier = NeuralClassifier<NoWeighting>;
pub type CountWeightedClassifier = NeuralClassifier<CountWeighting>;
pub type DensityWeightedClassifier = NeuralClassifier<KdeWeighting>;
pub type RandomOversamplingClassifier = NeuralClassifier<Oversampling<RandomOversampler>>;
pub type SmoteClassifier = NeuralClassifier<Oversampling<Smote>>;
pub type AdasynClassifier = NeuralClassifier<Oversampling<Adasyn>>;

impl<H: ImbalanceHandler> NeuralClassifier<H> {
    pub fn new(config: ClassifierConfig, handler: H, device: Device) -> Self {
        Self {
            config,
            handler,
            device,
            stats: None,
            fitted: None,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn training_params(&self) -> TrainingParams {
        TrainingParams {
            learning_rate: self.config.learning_rate,
            batch_size: self.config.batch_size,
            num_epochs: self.config.num_epochs,
            log_every: self.config.log_every,
        }
    }

    fn statistics(&self, operation: &'static str) -> Result<&EpochStatistics> {
        self.stats
            .as_ref()
            .ok_or(ClassifierError::NotFitted(operation))
    }

    /// Fail unless the model is fitted and `x` has the width it was fitted on.
    fn check_input(&self, x: &Array2<f32>) -> Result<&FittedNet> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(ClassifierError::NotFitted("predict"))?;
        if x.ncols() != fitted.n_features {
            return Err(ClassifierError::FeatureDimensionMismatch {
                expected: fitted.n_features,
                found: x.ncols(),
            });
        }
        Ok(fitted)
    }

    fn logits(&self, x: &Array2<f32>) -> Result<Tensor> {
        let fitted = self.check_input(x)?;
        let xs = to_tensor(x, &self.device)?;
        Ok(fitted.net.forward(&xs)?.detach())
    }
}

fn validate_training_data(x: &Array2<f32>, y: &[u8]) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ClassifierError::ShapeMismatch(format!(
            "training data must be a non-empty 2D matrix, got {}x{}",
            x.nrows(),
            x.ncols()
        )));
    }
    if x.nrows() != y.len() {
        return Err(ClassifierError::ShapeMismatch(format!(
            "{} samples but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if let Some(row) = y.iter().position(|&label| label > 1) {
        return Err(ClassifierError::InvalidLabel {
            row,
            label: y[row],
        });
    }
    Ok(())
}

impl<H> Clone for NeuralClassifier<H>
where
    H: Clone,
{
    /// Configuration-only copy: the trained model and statistics are not carried over.
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            handler: self.handler.clone(),
            device: self.device.clone(),
            stats: None,
            fitted: None,
        }
    }
}

impl<H> Classifier for NeuralClassifier<H>
where
    H: ImbalanceHandler + Clone + 'static,
{
    fn fit(&mut self, x: &Array2<f32>, y: &[u8]) -> Result<()> {
        self.config.validate()?;
        validate_training_data(x, y)?;

        self.fitted = None;
        let previous = match self.config.stats_policy {
            StatsPolicy::ResetOnFit => None,
            StatsPolicy::Accumulate => self.stats.take(),
        };
        self.stats = previous.clone();

        let mut rng = self.rng();
        let (net, var_map) = FeedForwardNet::initialise(x.ncols(), &mut rng, &self.device)?;
        let dataset = self.handler.prepare(x, y, &mut rng)?;
        debug!(
            "{}: prepared {} weighted samples from {} inputs",
            self.handler.name(),
            dataset.len(),
            x.nrows()
        );

        let epoch_stats = train(
            &net,
            &var_map,
            &dataset,
            &self.training_params(),
            &mut rng,
            &self.device,
        )?;

        let mut stats = previous.unwrap_or_default();
        stats.extend(epoch_stats);
        self.stats = Some(stats);
        self.fitted = Some(FittedNet {
            net,
            _var_map: var_map,
            n_features: x.ncols(),
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<u8>> {
        self.check_input(x)?;
        if x.nrows() == 0 {
            return Ok(Vec::new());
        }
        let logits = self.logits(x)?.to_vec1::<f32>()?;
        Ok(logits.into_iter().map(|z| u8::from(z >= 0.0)).collect())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>> {
        self.check_input(x)?;
        if x.nrows() == 0 {
            return Ok(Vec::new());
        }
        let probs = candle_nn::ops::sigmoid(&self.logits(x)?)?;
        Ok(probs.to_vec1::<f32>()?)
    }

    fn get_stat(&self, name: &str) -> Result<&[f64]> {
        let stat: Stat = name.parse()?;
        Ok(self.statistics("get_stat")?.get(stat))
    }

    fn epoch_losses(&self) -> Result<&[f64]> {
        Ok(&self.statistics("epoch_losses")?.loss)
    }

    fn name(&self) -> &str {
        self.handler.name()
    }

    fn clone_unfitted(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}
