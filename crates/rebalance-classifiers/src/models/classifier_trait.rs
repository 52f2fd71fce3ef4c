use ndarray::Array2;

use crate::error::Result;

/// The contract every imbalance-aware classifier exposes to a benchmark driver.
///
/// Labels are binary (`0` or `1`). Statistics are recorded once per training
/// epoch and can be read back by name after `fit`.
pub trait Classifier: Send + Sync {
    /// Train a freshly initialised model on `(x, y)`.
    fn fit(&mut self, x: &Array2<f32>, y: &[u8]) -> Result<()>;

    /// One hard label per row.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<u8>>;

    /// Probability of class 1 for each row.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>>;

    /// Per-epoch sequence of `accuracy`, `bal_accuracy`, `precision` or `recall`.
    fn get_stat(&self, name: &str) -> Result<&[f64]>;

    /// Mean weighted training loss of each recorded epoch.
    fn epoch_losses(&self) -> Result<&[f64]>;

    /// Name of the imbalance strategy this classifier trains with.
    fn name(&self) -> &str;

    /// A copy with the same configuration, no trained model and no statistics.
    fn clone_unfitted(&self) -> Box<dyn Classifier>;
}
