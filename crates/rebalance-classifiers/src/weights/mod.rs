//! Per-sample weight estimators.
//!
//! Each estimator maps a training set to one non-negative weight per sample.
//! Count based weights only look at labels, density based weights only look at
//! the feature space (optionally split by class).
pub mod count;
pub mod density;

pub use count::count_weights;
pub use density::{kde_log_density, kde_weights, Bandwidth, DensityTransform, KdeScope, KdeWeighting};

/// Weight of 1.0 for every sample, used when no imbalance strategy is selected.
pub fn uniform_weights(n_samples: usize) -> Vec<f32> {
    vec![1.0; n_samples]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_weights() {
        let w = uniform_weights(7);
        assert_eq!(w.len(), 7);
        assert!(w.iter().all(|&v| v == 1.0));
        assert!(uniform_weights(0).is_empty());
    }
}
