use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use rebalance_classifiers::config::{ClassifierConfig, ImbalanceStrategy};

use crate::cv::CrossValidation;
use crate::synthetic::SyntheticConfig;

/// Everything a benchmark run needs: data sources, strategies, training and output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// KEEL `.dat` files to benchmark on.
    pub datasets: Vec<PathBuf>,
    pub synthetic: SyntheticConfig,
    pub strategies: Vec<ImbalanceStrategy>,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub num_epochs: usize,
    /// Base seed for the classifiers; fold `i` trains with `seed + i`.
    pub seed: Option<u64>,
    pub log_every: usize,
    pub cross_validation: CrossValidation,
    pub device: String,
    pub output_dir: PathBuf,
    pub report: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            datasets: Vec::new(),
            synthetic: SyntheticConfig::default(),
            strategies: ImbalanceStrategy::all(),
            learning_rate: 0.005,
            batch_size: 100,
            num_epochs: 100,
            seed: Some(42),
            log_every: 50,
            cross_validation: CrossValidation::default(),
            device: String::from("cpu"),
            output_dir: PathBuf::from("."),
            report: true,
        }
    }
}

impl BenchmarkConfig {
    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let config: BenchmarkConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        Ok(config)
    }

    /// Build the configuration from an optional JSON file, then apply command line overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load(path)?,
            None => BenchmarkConfig::default(),
        };

        if let Some(datasets) = matches.get_many::<PathBuf>("dataset") {
            config.datasets = datasets.cloned().collect();
        }
        if matches.get_flag("synthetic") {
            config.synthetic.enabled = true;
        }
        if let Some(strategies) = matches.get_many::<String>("strategy") {
            config.strategies = strategies
                .map(|s| s.parse::<ImbalanceStrategy>().map_err(anyhow::Error::msg))
                .collect::<Result<_>>()?;
        }
        if let Some(epochs) = matches.get_one::<usize>("epochs") {
            config.num_epochs = *epochs;
        }
        if let Some(device) = matches.get_one::<String>("device") {
            config.device = device.clone();
        }
        if let Some(output_dir) = matches.get_one::<PathBuf>("output_dir") {
            config.output_dir = output_dir.clone();
        }
        if matches.get_flag("no_report") {
            config.report = false;
        }

        config.validate()?;
        Ok(config)
    }

    /// Classifier settings for one strategy and fold.
    pub fn classifier_config(&self, strategy: &ImbalanceStrategy, fold_index: usize) -> ClassifierConfig {
        let mut config = ClassifierConfig::new(
            self.learning_rate,
            self.batch_size,
            self.num_epochs,
            strategy.clone(),
        );
        config.seed = self.seed.map(|s| s.wrapping_add(fold_index as u64));
        config.log_every = self.log_every;
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            bail!("At least one imbalance strategy must be configured");
        }
        for strategy in &self.strategies {
            self.classifier_config(strategy, 0)
                .validate()
                .with_context(|| format!("Invalid settings for strategy {}", strategy.name()))?;
        }
        Ok(())
    }

    /// Fail when neither dataset files nor synthetic datasets are configured.
    pub fn require_data(&self) -> Result<()> {
        if self.datasets.is_empty() && !self.synthetic.enabled {
            bail!("No datasets configured: pass --dataset FILE, --synthetic, or set them in the config file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BenchmarkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategies.len(), 6);
        assert!(config.require_data().is_err());
    }

    #[test]
    fn test_classifier_config_seeds_per_fold() {
        let config = BenchmarkConfig::default();
        let a = config.classifier_config(&ImbalanceStrategy::CountWeighting, 0);
        let b = config.classifier_config(&ImbalanceStrategy::CountWeighting, 3);
        assert_eq!(a.seed, Some(42));
        assert_eq!(b.seed, Some(45));
        assert_eq!(a.num_epochs, 100);
        assert_eq!(a.strategy, ImbalanceStrategy::CountWeighting);
    }

    #[test]
    fn test_empty_strategies_rejected() {
        let config = BenchmarkConfig {
            strategies: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
