//! Synthetic imbalanced datasets: two Gaussian classes in a shared feature space.
use anyhow::{bail, Result};
use ndarray::Array2;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::data::Dataset;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub enabled: bool,
    pub n_samples: usize,
    pub n_features: usize,
    /// Majority class fraction of each generated dataset.
    pub majority_ratios: Vec<f64>,
    /// Distance between the class means along every feature, in units of standard deviation.
    pub class_separation: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            n_samples: 1000,
            n_features: 15,
            majority_ratios: vec![0.55, 0.6, 0.7, 0.8, 0.9, 0.95],
            class_separation: 1.0,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    /// One dataset per configured majority ratio.
    pub fn generate(&self) -> Result<Vec<Dataset>> {
        self.majority_ratios
            .iter()
            .enumerate()
            .map(|(i, &ratio)| make_imbalanced(self, ratio, self.seed.wrapping_add(i as u64)))
            .collect()
    }
}

/// Draw `n_samples` rows where a `majority_ratio` share belongs to class 0.
///
/// Class 0 is centred on the origin, class 1 on `class_separation` along every
/// feature; both have unit variance. Rows are shuffled.
pub fn make_imbalanced(config: &SyntheticConfig, majority_ratio: f64, seed: u64) -> Result<Dataset> {
    if !(majority_ratio > 0.0 && majority_ratio < 1.0) {
        bail!("Majority ratio must be in (0, 1), got {}", majority_ratio);
    }
    if config.n_features == 0 {
        bail!("Synthetic datasets need at least one feature");
    }

    let n_majority = (majority_ratio * config.n_samples as f64).round() as usize;
    let n_minority = config.n_samples.saturating_sub(n_majority);
    if n_majority == 0 || n_minority == 0 {
        bail!(
            "{} samples at majority ratio {} leave one class empty",
            config.n_samples,
            majority_ratio
        );
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let majority = Normal::new(0.0, 1.0)?;
    let minority = Normal::new(config.class_separation, 1.0)?;

    let mut labels: Vec<u8> = std::iter::repeat(0u8)
        .take(n_majority)
        .chain(std::iter::repeat(1u8).take(n_minority))
        .collect();
    labels.shuffle(&mut rng);

    let mut values = Vec::with_capacity(config.n_samples * config.n_features);
    for &label in &labels {
        let dist = if label == 0 { &majority } else { &minority };
        for _ in 0..config.n_features {
            values.push(dist.sample(&mut rng) as f32);
        }
    }

    Ok(Dataset {
        name: format!("synthetic_{:.2}", majority_ratio),
        x: Array2::from_shape_vec((config.n_samples, config.n_features), values)?,
        y: labels,
        classes: vec!["0".to_string(), "1".to_string()],
    })
}
