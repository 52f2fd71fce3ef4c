//! Kernel density estimate (KDE) based sample weights.
//!
//! A Gaussian product kernel is placed on every training sample and the
//! log-density of each sample is evaluated against the whole set (or against
//! the samples of its own class). Samples that sit in sparse regions of the
//! feature space receive larger weights than samples in dense regions.
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;

use crate::error::{ClassifierError, Result};

/// Smallest per-feature bandwidth; constant features would otherwise collapse the kernel.
const MIN_BANDWIDTH: f64 = 1e-6;
/// Upper bound for the relative weight produced by [`DensityTransform::Inverse`].
const MAX_INVERSE_WEIGHT: f64 = 1e3;

/// Bandwidth selection for the Gaussian kernel.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Bandwidth {
    /// Scott's rule: `sigma_d * n^(-1 / (d + 4))` per feature.
    Scott,
    /// Silverman's rule: `sigma_d * (n (d + 2) / 4)^(-1 / (d + 4))` per feature.
    Silverman,
    /// Same bandwidth for every feature.
    Fixed(f64),
}

/// Which samples a density is estimated from.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KdeScope {
    /// One estimate over the whole training set.
    Global,
    /// One estimate per class; a sample is scored against its own class only.
    PerClass,
}

/// Mapping from log-densities to sample weights.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DensityTransform {
    /// Min-max normalise the log-densities to `[0, 1]`, invert them so the
    /// sparsest sample scores 1, then expand linearly onto
    /// `[min_weight, max_weight]`. Relative ordering is preserved.
    NormalizeExpand { min_weight: f32, max_weight: f32 },
    /// Weight proportional to `1 / density` relative to the densest sample,
    /// capped, then scaled to a mean of 1.
    Inverse,
}

impl Default for DensityTransform {
    fn default() -> Self {
        DensityTransform::NormalizeExpand {
            min_weight: 0.5,
            max_weight: 2.0,
        }
    }
}

/// Parameters of the density weighting strategy.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct KdeWeighting {
    pub bandwidth: Bandwidth,
    pub scope: KdeScope,
    pub transform: DensityTransform,
}

impl Default for KdeWeighting {
    fn default() -> Self {
        Self {
            bandwidth: Bandwidth::Scott,
            scope: KdeScope::Global,
            transform: DensityTransform::default(),
        }
    }
}

impl KdeWeighting {
    pub fn validate(&self) -> Result<()> {
        if let Bandwidth::Fixed(h) = self.bandwidth {
            if !(h.is_finite() && h > 0.0) {
                return Err(ClassifierError::InvalidConfig(format!(
                    "fixed KDE bandwidth must be positive, got {}",
                    h
                )));
            }
        }
        if let DensityTransform::NormalizeExpand {
            min_weight,
            max_weight,
        } = self.transform
        {
            if !(min_weight.is_finite() && min_weight > 0.0 && max_weight.is_finite())
                || max_weight < min_weight
            {
                return Err(ClassifierError::InvalidConfig(format!(
                    "normalize-expand needs 0 < min_weight <= max_weight, got [{}, {}]",
                    min_weight, max_weight
                )));
            }
        }
        Ok(())
    }
}

/// Per-feature kernel bandwidths for `x` under the given rule.
fn bandwidths(x: &Array2<f32>, rule: Bandwidth) -> Vec<f64> {
    let (n, d) = x.dim();
    let n = n as f64;
    let d_f = d as f64;

    let factor = match rule {
        Bandwidth::Scott => n.powf(-1.0 / (d_f + 4.0)),
        Bandwidth::Silverman => (n * (d_f + 2.0) / 4.0).powf(-1.0 / (d_f + 4.0)),
        Bandwidth::Fixed(h) => return vec![h.max(MIN_BANDWIDTH); d],
    };

    x.axis_iter(Axis(1))
        .map(|column| {
            let sigma = column.iter().map(|&v| v as f64).std_dev();
            let h = sigma * factor;
            if h.is_finite() && h > MIN_BANDWIDTH {
                h
            } else {
                MIN_BANDWIDTH
            }
        })
        .collect()
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Log-density of every row of `x` under a Gaussian KDE fitted on `x` itself.
///
/// Densities are evaluated in log space, so samples far away from everything
/// else get a very negative but finite value instead of underflowing to zero.
pub fn kde_log_density(x: &Array2<f32>, bandwidth: Bandwidth) -> Result<Vec<f64>> {
    let n = x.nrows();
    if n == 0 {
        return Ok(Vec::new());
    }

    let kernels = bandwidths(x, bandwidth)
        .into_iter()
        .map(|h| {
            Normal::new(0.0, h).map_err(|e| {
                ClassifierError::DegenerateWeight(format!("invalid kernel bandwidth {}: {}", h, e))
            })
        })
        .collect::<Result<Vec<Normal>>>()?;

    let ln_n = (n as f64).ln();
    let mut terms = vec![0.0f64; n];
    let log_density = x
        .outer_iter()
        .map(|xi| {
            for (term, xj) in terms.iter_mut().zip(x.outer_iter()) {
                *term = xi
                    .iter()
                    .zip(xj.iter())
                    .zip(kernels.iter())
                    .map(|((&a, &b), kernel)| kernel.ln_pdf(a as f64 - b as f64))
                    .sum();
            }
            log_sum_exp(&terms) - ln_n
        })
        .collect();

    Ok(log_density)
}

/// Turn log-densities into weights according to `transform`.
fn apply_transform(log_density: &[f64], transform: DensityTransform) -> Result<Vec<f32>> {
    if let Some(pos) = log_density.iter().position(|v| !v.is_finite()) {
        return Err(ClassifierError::DegenerateWeight(format!(
            "non-finite density {} for sample {}",
            log_density[pos], pos
        )));
    }
    if log_density.is_empty() {
        return Ok(Vec::new());
    }

    let max = log_density.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = log_density.iter().copied().fold(f64::INFINITY, f64::min);

    let weights: Vec<f32> = match transform {
        DensityTransform::NormalizeExpand {
            min_weight,
            max_weight,
        } => {
            let span = max - min;
            if span <= f64::EPSILON * max.abs().max(1.0) {
                vec![1.0; log_density.len()]
            } else {
                let (lo, hi) = (min_weight as f64, max_weight as f64);
                log_density
                    .iter()
                    .map(|&ld| (lo + (hi - lo) * (max - ld) / span) as f32)
                    .collect()
            }
        }
        DensityTransform::Inverse => {
            let cap = MAX_INVERSE_WEIGHT.ln();
            let raw: Vec<f64> = log_density
                .iter()
                .map(|&ld| (max - ld).min(cap).exp())
                .collect();
            let mean = raw.iter().sum::<f64>() / raw.len() as f64;
            raw.iter().map(|&w| (w / mean) as f32).collect()
        }
    };

    if let Some(pos) = weights.iter().position(|w| !(w.is_finite() && *w > 0.0)) {
        return Err(ClassifierError::DegenerateWeight(format!(
            "weight {} for sample {} is not a positive finite number",
            weights[pos], pos
        )));
    }

    Ok(weights)
}

/// Density based sample weights: sparser samples receive larger weights.
pub fn kde_weights(x: &Array2<f32>, y: &[u8], config: &KdeWeighting) -> Result<Vec<f32>> {
    config.validate()?;
    if x.nrows() != y.len() {
        return Err(ClassifierError::ShapeMismatch(format!(
            "{} samples but {} labels",
            x.nrows(),
            y.len()
        )));
    }

    let log_density = match config.scope {
        KdeScope::Global => kde_log_density(x, config.bandwidth)?,
        KdeScope::PerClass => {
            let mut log_density = vec![0.0f64; x.nrows()];
            for class in [0u8, 1u8] {
                let idx: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
                if idx.is_empty() {
                    continue;
                }
                let class_x = x.select(Axis(0), &idx);
                let class_density = kde_log_density(&class_x, config.bandwidth)?;
                for (&i, ld) in idx.iter().zip(class_density) {
                    log_density[i] = ld;
                }
            }
            log_density
        }
    };

    let weights = apply_transform(&log_density, config.transform)?;
    log::debug!(
        "KDE weights for {} samples: min {:.4}, max {:.4}",
        weights.len(),
        weights.iter().copied().fold(f32::INFINITY, f32::min),
        weights.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    );
    Ok(weights)
}
