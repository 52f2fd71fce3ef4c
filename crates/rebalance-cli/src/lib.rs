//! rebalance-cli: benchmark driver for the imbalance-aware classifiers.
//!
//! Loads KEEL datasets (or generates synthetic ones), runs repeated stratified
//! cross-validation for every configured strategy and writes fold scores, a
//! JSON summary and an HTML report.
pub mod benchmark;
pub mod config;
pub mod cv;
pub mod data;
pub mod report;
pub mod synthetic;

use anyhow::{Context, Result};

use rebalance_classifiers::device::get_device;

use crate::benchmark::{run_benchmark, BenchmarkResults};
use crate::config::BenchmarkConfig;
use crate::data::{load_keel, Dataset};

/// Every dataset the configuration points at, files first, then synthetic ones.
pub fn load_datasets(config: &BenchmarkConfig) -> Result<Vec<Dataset>> {
    config.require_data()?;
    let mut datasets = config
        .datasets
        .iter()
        .map(load_keel)
        .collect::<Result<Vec<_>>>()?;
    if config.synthetic.enabled {
        datasets.extend(
            config
                .synthetic
                .generate()
                .context("Failed to generate synthetic datasets")?,
        );
    }
    Ok(datasets)
}

/// Load data, run the benchmark and write its outputs.
pub fn run(config: &BenchmarkConfig) -> Result<BenchmarkResults> {
    let device = get_device(&config.device)
        .with_context(|| format!("Failed to initialise device '{}'", config.device))?;
    let datasets = load_datasets(config)?;
    log::info!(
        "Benchmarking {} strategies on {} datasets ({} folds each, {} epochs, device {:?})",
        config.strategies.len(),
        datasets.len(),
        config.cross_validation.n_folds(),
        config.num_epochs,
        device
    );

    let results = run_benchmark(config, &datasets, &device)?;
    report::write_outputs(&results, config)?;
    Ok(results)
}
