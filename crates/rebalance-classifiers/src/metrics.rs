//! Binary classification statistics.
//!
//! Class 1 is the positive class. Precision with no predicted positives is 1.0,
//! recall with no actual positives is 0.0.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ClassifierError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }

        let mut cm = ConfusionMatrix::default();
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            cm.record(t, p);
        }
        Ok(cm)
    }

    /// Add one (truth, prediction) pair.
    pub fn record(&mut self, truth: u8, predicted: u8) {
        match (truth != 0, predicted != 0) {
            (true, true) => self.true_positives += 1,
            (false, true) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (true, false) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_positives + self.true_negatives) as f64 / total as f64
    }

    pub fn precision(&self) -> f64 {
        let predicted = self.true_positives + self.false_positives;
        if predicted == 0 {
            return 1.0;
        }
        self.true_positives as f64 / predicted as f64
    }

    pub fn recall(&self) -> f64 {
        let actual = self.true_positives + self.false_negatives;
        if actual == 0 {
            return 0.0;
        }
        self.true_positives as f64 / actual as f64
    }

    fn specificity(&self) -> Option<f64> {
        let actual = self.true_negatives + self.false_positives;
        (actual > 0).then(|| self.true_negatives as f64 / actual as f64)
    }

    /// Mean recall over the classes present in the ground truth.
    pub fn balanced_accuracy(&self) -> f64 {
        let positive = (self.true_positives + self.false_negatives > 0).then(|| self.recall());
        match (positive, self.specificity()) {
            (Some(r), Some(s)) => (r + s) / 2.0,
            (Some(r), None) => r,
            (None, Some(s)) => s,
            (None, None) => 0.0,
        }
    }

    pub fn stat(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Accuracy => self.accuracy(),
            Stat::BalancedAccuracy => self.balanced_accuracy(),
            Stat::Precision => self.precision(),
            Stat::Recall => self.recall(),
        }
    }
}

/// The statistics tracked per epoch and per fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stat {
    #[serde(rename = "accuracy")]
    Accuracy,
    #[serde(rename = "bal_accuracy")]
    BalancedAccuracy,
    #[serde(rename = "precision")]
    Precision,
    #[serde(rename = "recall")]
    Recall,
}

impl Stat {
    pub const ALL: [Stat; 4] = [
        Stat::Accuracy,
        Stat::BalancedAccuracy,
        Stat::Precision,
        Stat::Recall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Accuracy => "accuracy",
            Stat::BalancedAccuracy => "bal_accuracy",
            Stat::Precision => "precision",
            Stat::Recall => "recall",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accuracy" => Ok(Stat::Accuracy),
            "bal_accuracy" => Ok(Stat::BalancedAccuracy),
            "precision" => Ok(Stat::Precision),
            "recall" => Ok(Stat::Recall),
            _ => Err(ClassifierError::UnknownStat(s.to_string())),
        }
    }
}

/// Per-epoch statistics, one parallel sequence per [`Stat`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochStatistics {
    pub accuracy: Vec<f64>,
    pub bal_accuracy: Vec<f64>,
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub loss: Vec<f64>,
}

impl EpochStatistics {
    pub fn push(&mut self, cm: &ConfusionMatrix, mean_loss: f64) {
        self.accuracy.push(cm.accuracy());
        self.bal_accuracy.push(cm.balanced_accuracy());
        self.precision.push(cm.precision());
        self.recall.push(cm.recall());
        self.loss.push(mean_loss);
    }

    pub fn get(&self, stat: Stat) -> &[f64] {
        match stat {
            Stat::Accuracy => &self.accuracy,
            Stat::BalancedAccuracy => &self.bal_accuracy,
            Stat::Precision => &self.precision,
            Stat::Recall => &self.recall,
        }
    }

    /// Number of recorded epochs.
    pub fn len(&self) -> usize {
        self.accuracy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accuracy.is_empty()
    }

    pub fn clear(&mut self) {
        *self = EpochStatistics::default();
    }

    pub fn extend(&mut self, other: EpochStatistics) {
        self.accuracy.extend(other.accuracy);
        self.bal_accuracy.extend(other.bal_accuracy);
        self.precision.extend(other.precision);
        self.recall.extend(other.recall);
        self.loss.extend(other.loss);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_counts() {
        let y_true = [1, 1, 0, 0, 0, 1];
        let y_pred = [1, 0, 0, 1, 0, 1];
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred).unwrap();
        assert_eq!(cm.true_positives, 2);
        assert_eq!(cm.false_negatives, 1);
        assert_eq!(cm.false_positives, 1);
        assert_eq!(cm.true_negatives, 2);

        assert!((cm.accuracy() - 4.0 / 6.0).abs() < 1e-12);
        assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.recall() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.balanced_accuracy() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_majority_only_predictions() {
        // 8 negatives, 2 positives, everything predicted negative
        let y_true = [0, 0, 0, 0, 0, 0, 0, 0, 1, 1];
        let y_pred = [0; 10];
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred).unwrap();
        assert!((cm.accuracy() - 0.8).abs() < 1e-12);
        assert!((cm.balanced_accuracy() - 0.5).abs() < 1e-12);
        assert_eq!(cm.precision(), 1.0);
        assert_eq!(cm.recall(), 0.0);
    }

    #[test]
    fn test_single_class_ground_truth() {
        let cm = ConfusionMatrix::from_labels(&[0, 0, 0, 0], &[0, 1, 0, 0]).unwrap();
        assert!((cm.balanced_accuracy() - 0.75).abs() < 1e-12);
        assert_eq!(cm.recall(), 0.0);
        assert_eq!(cm.precision(), 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[0, 1], &[0]),
            Err(ClassifierError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_stat_names() {
        for stat in Stat::ALL {
            assert_eq!(stat.as_str().parse::<Stat>().unwrap(), stat);
        }
        assert!(matches!(
            "f1".parse::<Stat>(),
            Err(ClassifierError::UnknownStat(name)) if name == "f1"
        ));
    }

    #[test]
    fn test_epoch_statistics_push_and_extend() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 1]).unwrap();
        let mut stats = EpochStatistics::default();
        stats.push(&cm, 0.3);
        stats.push(&cm, 0.2);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.get(Stat::Accuracy), &[1.0, 1.0]);
        assert_eq!(stats.loss, vec![0.3, 0.2]);

        let mut more = EpochStatistics::default();
        more.push(&cm, 0.1);
        stats.extend(more);
        assert_eq!(stats.get(Stat::Recall).len(), 3);

        stats.clear();
        assert!(stats.is_empty());
    }
}
