//! rebalance-classifiers: imbalance-aware neural binary classifiers.
//!
//! A small feed-forward network is trained with one of six strategies for
//! handling class imbalance: no reweighting, inverse-count weights, kernel
//! density weights, random oversampling, SMOTE or ADASYN. Every variant
//! implements the same [`Classifier`] contract (`fit`, `predict`, `get_stat`)
//! and records accuracy, balanced accuracy, precision and recall per epoch.
pub mod batching;
pub mod config;
pub mod device;
pub mod error;
pub mod loss;
pub mod metrics;
pub mod models;
pub mod resampling;
pub mod training;
pub mod weights;

pub use config::{ClassifierConfig, ImbalanceStrategy, StatsPolicy};
pub use device::get_device;
pub use error::{ClassifierError, Result};
pub use metrics::{ConfusionMatrix, EpochStatistics, Stat};
pub use models::classifier_trait::Classifier;
pub use models::factory::build_classifier;
pub use models::neural::NeuralClassifier;
