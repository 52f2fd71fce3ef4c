use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::error::{ClassifierError, Result};
use crate::resampling::{Adasyn, RandomOversampler, Smote};
use crate::weights::KdeWeighting;

/// Central configuration for the imbalance-aware classifiers.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub learning_rate: f64,
    pub batch_size: usize,
    pub num_epochs: usize,
    /// Seed for parameter initialisation, shuffling and resampling. `None` draws from entropy.
    pub seed: Option<u64>,
    pub stats_policy: StatsPolicy,
    /// Log the first batch loss every `log_every` epochs (and on the last one).
    pub log_every: usize,

    /// Flattened into the config object; a missing `method` key means `none`.
    #[serde(flatten, deserialize_with = "strategy_or_none")]
    pub strategy: ImbalanceStrategy,
}

fn strategy_or_none<'de, D>(deserializer: D) -> std::result::Result<ImbalanceStrategy, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    if !fields.contains_key("method") {
        return Ok(ImbalanceStrategy::None);
    }
    ImbalanceStrategy::deserialize(serde_json::Value::Object(fields)).map_err(serde::de::Error::custom)
}

/// How per-epoch statistics behave when the same instance is fitted repeatedly.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatsPolicy {
    /// Every `fit` starts from empty statistics.
    #[default]
    ResetOnFit,
    /// Statistics of successive `fit` calls are appended to each other.
    Accumulate,
}

/// Supported imbalance handling strategies and their parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ImbalanceStrategy {
    #[default]
    None,
    CountWeighting,
    DensityWeighting(KdeWeighting),
    RandomOversampling(RandomOversampler),
    Smote(Smote),
    Adasyn(Adasyn),
}

impl ImbalanceStrategy {
    /// Every strategy with its default parameters, in benchmark order.
    pub fn all() -> Vec<ImbalanceStrategy> {
        vec![
            ImbalanceStrategy::None,
            ImbalanceStrategy::CountWeighting,
            ImbalanceStrategy::DensityWeighting(KdeWeighting::default()),
            ImbalanceStrategy::Adasyn(Adasyn::default()),
            ImbalanceStrategy::RandomOversampling(RandomOversampler::default()),
            ImbalanceStrategy::Smote(Smote::default()),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImbalanceStrategy::None => "none",
            ImbalanceStrategy::CountWeighting => "count_weighting",
            ImbalanceStrategy::DensityWeighting(_) => "density_weighting",
            ImbalanceStrategy::RandomOversampling(_) => "random_oversampling",
            ImbalanceStrategy::Smote(_) => "smote",
            ImbalanceStrategy::Adasyn(_) => "adasyn",
        }
    }
}

impl FromStr for ImbalanceStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "none" | "no_weighting" => Ok(ImbalanceStrategy::None),
            "count_weighting" | "count" => Ok(ImbalanceStrategy::CountWeighting),
            "density_weighting" | "density" | "kde" => {
                Ok(ImbalanceStrategy::DensityWeighting(KdeWeighting::default()))
            }
            "random_oversampling" | "ros" => {
                Ok(ImbalanceStrategy::RandomOversampling(RandomOversampler::default()))
            }
            "smote" => Ok(ImbalanceStrategy::Smote(Smote::default())),
            "adasyn" => Ok(ImbalanceStrategy::Adasyn(Adasyn::default())),
            _ => Err(format!(
                "Unknown imbalance strategy: {}. Expected one of none, count_weighting, density_weighting, random_oversampling, smote, adasyn",
                s
            )),
        }
    }
}

impl ClassifierConfig {
    pub fn new(
        learning_rate: f64,
        batch_size: usize,
        num_epochs: usize,
        strategy: ImbalanceStrategy,
    ) -> Self {
        Self {
            learning_rate,
            batch_size,
            num_epochs,
            strategy,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_stats_policy(mut self, policy: StatsPolicy) -> Self {
        self.stats_policy = policy;
        self
    }

    /// Reject hyper-parameters the training loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ClassifierError::InvalidConfig(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size == 0 {
            return Err(ClassifierError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.num_epochs == 0 {
            return Err(ClassifierError::InvalidConfig(
                "num_epochs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.005,
            batch_size: 100,
            num_epochs: 100,
            seed: None,
            stats_policy: StatsPolicy::ResetOnFit,
            log_every: 50,
            strategy: ImbalanceStrategy::None,
        }
    }
}
