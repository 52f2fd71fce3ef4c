//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

/// Failures surfaced by weighting, resampling, training and prediction.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid label {label} at row {row}: labels must be 0 or 1")]
    InvalidLabel { row: usize, label: u8 },

    #[error("Feature dimension mismatch: model was fitted on {expected} features, got {found}")]
    FeatureDimensionMismatch { expected: usize, found: usize },

    #[error("Classifier is not fitted: call `fit` before `{0}`")]
    NotFitted(&'static str),

    #[error("Unknown statistic '{0}': expected one of accuracy, bal_accuracy, precision, recall")]
    UnknownStat(String),

    #[error("Insufficient samples: {strategy} needs at least {required} minority samples, found {found}")]
    InsufficientSamples {
        strategy: &'static str,
        required: usize,
        found: usize,
    },

    #[error("Degenerate sample weights: {0}")]
    DegenerateWeight(String),

    #[error("Epoch {epoch} produced no batches: the training set is empty")]
    /// `epoch` is 1-based.
    EmptyEpoch { epoch: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Tensor(#[from] candle_core::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClassifierError>;
