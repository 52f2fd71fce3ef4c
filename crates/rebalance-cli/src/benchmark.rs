//! Cross-validated comparison of imbalance strategies across datasets.
use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::{Context, Result};
use candle_core::Device;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

use rebalance_classifiers::config::ImbalanceStrategy;
use rebalance_classifiers::metrics::{ConfusionMatrix, Stat};
use rebalance_classifiers::models::factory::build_classifier;

use crate::config::BenchmarkConfig;
use crate::cv::Fold;
use crate::data::Dataset;

/// Held-out scores and training curves of one classifier on one fold.
#[derive(Debug, Clone, Serialize)]
pub struct FoldResult {
    pub dataset: String,
    pub strategy: String,
    pub repeat: usize,
    pub split: usize,
    pub scores: BTreeMap<Stat, f64>,
    #[serde(skip)]
    pub curves: BTreeMap<Stat, Vec<f64>>,
    #[serde(skip)]
    pub losses: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub std: f64,
}

/// Aggregate of all folds for one (dataset, strategy) pair.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub dataset: String,
    pub strategy: String,
    pub n_folds: usize,
    pub scores: BTreeMap<Stat, ScoreSummary>,
    /// Per-epoch training statistics averaged over folds.
    pub mean_curves: BTreeMap<Stat, Vec<f64>>,
    pub mean_loss: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub name: String,
    pub n_samples: usize,
    pub n_features: usize,
    pub majority_fraction: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResults {
    pub datasets: Vec<DatasetInfo>,
    pub strategies: Vec<String>,
    pub summaries: Vec<StrategySummary>,
    #[serde(skip)]
    pub folds: Vec<FoldResult>,
}

impl BenchmarkResults {
    pub fn summary(&self, dataset: &str, strategy: &str) -> Option<&StrategySummary> {
        self.summaries
            .iter()
            .find(|s| s.dataset == dataset && s.strategy == strategy)
    }
}

/// Train and score every configured strategy on every dataset.
///
/// Folds of one (dataset, strategy) pair run in parallel, each on its own
/// freshly built classifier.
pub fn run_benchmark(config: &BenchmarkConfig, datasets: &[Dataset], device: &Device) -> Result<BenchmarkResults> {
    let cv = config.cross_validation;
    let mut folds_out = Vec::new();
    let mut summaries = Vec::new();

    for strategy in &config.strategies {
        for dataset in datasets {
            let start = Instant::now();
            let folds = cv
                .split(&dataset.y)
                .with_context(|| format!("Failed to split dataset {}", dataset.name))?;

            let results: Vec<FoldResult> = folds
                .par_iter()
                .map(|fold| run_fold(config, strategy, dataset, fold, cv.n_splits, device))
                .collect::<Result<_>>()?;

            let summary = summarize(&dataset.name, strategy.name(), &results);
            log::info!(
                "{} on {}: balanced accuracy {:.4} ± {:.4} over {} folds ({:.1?})",
                strategy.name(),
                dataset.name,
                summary.scores[&Stat::BalancedAccuracy].mean,
                summary.scores[&Stat::BalancedAccuracy].std,
                results.len(),
                start.elapsed()
            );
            summaries.push(summary);
            folds_out.extend(results);
        }
    }

    Ok(BenchmarkResults {
        datasets: datasets
            .iter()
            .map(|d| DatasetInfo {
                name: d.name.clone(),
                n_samples: d.n_samples(),
                n_features: d.n_features(),
                majority_fraction: d.majority_fraction(),
            })
            .collect(),
        strategies: config.strategies.iter().map(|s| s.name().to_string()).collect(),
        summaries,
        folds: folds_out,
    })
}

fn run_fold(
    config: &BenchmarkConfig,
    strategy: &ImbalanceStrategy,
    dataset: &Dataset,
    fold: &Fold,
    n_splits: usize,
    device: &Device,
) -> Result<FoldResult> {
    let context = || {
        format!(
            "{} failed on {} (repeat {}, split {})",
            strategy.name(),
            dataset.name,
            fold.repeat,
            fold.split
        )
    };

    let x_train = dataset.x.select(ndarray::Axis(0), &fold.train);
    let y_train: Vec<u8> = fold.train.iter().map(|&i| dataset.y[i]).collect();
    let x_test = dataset.x.select(ndarray::Axis(0), &fold.test);
    let y_test: Vec<u8> = fold.test.iter().map(|&i| dataset.y[i]).collect();

    let classifier_config = config.classifier_config(strategy, fold.index(n_splits));
    let mut clf = build_classifier(&classifier_config, device.clone());
    clf.fit(&x_train, &y_train).with_context(context)?;
    let y_pred = clf.predict(&x_test).with_context(context)?;

    let confusion = ConfusionMatrix::from_labels(&y_test, &y_pred)?;
    let mut scores = BTreeMap::new();
    let mut curves = BTreeMap::new();
    for stat in Stat::ALL {
        scores.insert(stat, confusion.stat(stat));
        curves.insert(stat, clf.get_stat(stat.as_str())?.to_vec());
    }

    log::debug!(
        "{} / {} fold {}: {:?}",
        dataset.name,
        strategy.name(),
        fold.index(n_splits),
        scores
    );

    Ok(FoldResult {
        dataset: dataset.name.clone(),
        strategy: strategy.name().to_string(),
        repeat: fold.repeat,
        split: fold.split,
        scores,
        curves,
        losses: clf.epoch_losses()?.to_vec(),
    })
}

/// Element-wise mean of equally long sequences.
pub fn mean_curve<'a, I>(curves: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut sum: Vec<f64> = Vec::new();
    let mut count = 0usize;
    for curve in curves {
        if sum.len() < curve.len() {
            sum.resize(curve.len(), 0.0);
        }
        for (acc, v) in sum.iter_mut().zip(curve) {
            *acc += v;
        }
        count += 1;
    }
    if count > 0 {
        sum.iter_mut().for_each(|v| *v /= count as f64);
    }
    sum
}

pub fn summarize(dataset: &str, strategy: &str, folds: &[FoldResult]) -> StrategySummary {
    let mut scores = BTreeMap::new();
    let mut mean_curves = BTreeMap::new();
    for stat in Stat::ALL {
        let values: Vec<f64> = folds.iter().map(|f| f.scores[&stat]).collect();
        let std = if values.len() > 1 {
            values.iter().std_dev()
        } else {
            0.0
        };
        scores.insert(
            stat,
            ScoreSummary {
                mean: values.iter().mean(),
                std,
            },
        );
        mean_curves.insert(
            stat,
            mean_curve(folds.iter().map(|f| f.curves[&stat].as_slice())),
        );
    }

    StrategySummary {
        dataset: dataset.to_string(),
        strategy: strategy.to_string(),
        n_folds: folds.len(),
        scores,
        mean_curves,
        mean_loss: mean_curve(folds.iter().map(|f| f.losses.as_slice())),
    }
}
