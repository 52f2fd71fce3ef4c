use candle_core::Device;

use crate::config::{ClassifierConfig, ImbalanceStrategy};
use crate::models::classifier_trait::Classifier;
use crate::models::handler::{CountWeighting, NoWeighting, Oversampling};
use crate::models::neural::NeuralClassifier;

/// Build a boxed classifier from a `ClassifierConfig`, picking the handler from its strategy.
pub fn build_classifier(config: &ClassifierConfig, device: Device) -> Box<dyn Classifier> {
    let config = config.clone();
    match config.strategy.clone() {
        ImbalanceStrategy::None => Box::new(NeuralClassifier::new(config, NoWeighting, device)),
        ImbalanceStrategy::CountWeighting => {
            Box::new(NeuralClassifier::new(config, CountWeighting, device))
        }
        ImbalanceStrategy::DensityWeighting(kde) => {
            Box::new(NeuralClassifier::new(config, kde, device))
        }
        ImbalanceStrategy::RandomOversampling(ros) => {
            Box::new(NeuralClassifier::new(config, Oversampling(ros), device))
        }
        ImbalanceStrategy::Smote(smote) => {
            Box::new(NeuralClassifier::new(config, Oversampling(smote), device))
        }
        ImbalanceStrategy::Adasyn(adasyn) => {
            Box::new(NeuralClassifier::new(config, Oversampling(adasyn), device))
        }
    }
}
