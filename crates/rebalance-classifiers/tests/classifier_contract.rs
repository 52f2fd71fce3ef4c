use candle_core::Device;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rebalance_classifiers::config::{ClassifierConfig, ImbalanceStrategy, StatsPolicy};
use rebalance_classifiers::error::ClassifierError;
use rebalance_classifiers::models::factory::build_classifier;
use rebalance_classifiers::resampling::{Adasyn, RandomOversampler, Smote};
use rebalance_classifiers::weights::KdeWeighting;

/// 100 samples with 2 features, the first 80 labelled 0 and the last 20 labelled 1.
fn imbalanced_dataset(seed: u64) -> (Array2<f32>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let y: Vec<u8> = (0..100).map(|i| u8::from(i >= 80)).collect();
    let x = Array2::from_shape_fn((100, 2), |(i, _)| {
        let center = if y[i] == 1 { 1.5 } else { -0.5 };
        center + rng.gen_range(-1.0f32..1.0)
    });
    (x, y)
}

fn config(strategy: ImbalanceStrategy) -> ClassifierConfig {
    ClassifierConfig::new(0.005, 10, 10, strategy).with_seed(42)
}

#[test]
fn test_count_weighting_records_one_stat_per_epoch() {
    let (x, y) = imbalanced_dataset(0);
    let mut clf = build_classifier(&config(ImbalanceStrategy::CountWeighting), Device::Cpu);
    clf.fit(&x, &y).expect("fit failed");

    for name in ["accuracy", "bal_accuracy", "precision", "recall"] {
        let values = clf.get_stat(name).unwrap();
        assert_eq!(values.len(), 10, "{} has wrong length", name);
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }
    assert_eq!(clf.epoch_losses().unwrap().len(), 10);
}

#[test]
fn test_every_strategy_fits_and_predicts() {
    let (x, y) = imbalanced_dataset(1);
    let strategies = vec![
        ImbalanceStrategy::None,
        ImbalanceStrategy::CountWeighting,
        ImbalanceStrategy::DensityWeighting(KdeWeighting::default()),
        ImbalanceStrategy::RandomOversampling(RandomOversampler::default()),
        ImbalanceStrategy::Smote(Smote::default()),
        ImbalanceStrategy::Adasyn(Adasyn::default()),
    ];

    for strategy in strategies {
        let mut clf = build_classifier(&config(strategy.clone()), Device::Cpu);
        clf.fit(&x, &y).unwrap();

        let labels = clf.predict(&x).unwrap();
        assert_eq!(labels.len(), x.nrows());
        assert!(labels.iter().all(|&l| l <= 1));

        let probs = clf.predict_proba(&x).unwrap();
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(clf.get_stat("recall").unwrap().len(), 10, "{}", strategy.name());
    }
}

#[test]
fn test_unfitted_classifier_errors() {
    let (x, _) = imbalanced_dataset(2);
    let clf = build_classifier(&config(ImbalanceStrategy::None), Device::Cpu);

    assert!(matches!(clf.predict(&x), Err(ClassifierError::NotFitted(_))));
    assert!(matches!(clf.get_stat("accuracy"), Err(ClassifierError::NotFitted(_))));
}

#[test]
fn test_unknown_stat_name() {
    let (x, y) = imbalanced_dataset(3);
    let mut clf = build_classifier(&config(ImbalanceStrategy::None), Device::Cpu);
    clf.fit(&x, &y).unwrap();

    assert!(matches!(
        clf.get_stat("f1_score"),
        Err(ClassifierError::UnknownStat(name)) if name == "f1_score"
    ));
}

#[test]
fn test_feature_dimension_mismatch() {
    let (x, y) = imbalanced_dataset(4);
    let mut clf = build_classifier(&config(ImbalanceStrategy::CountWeighting), Device::Cpu);
    clf.fit(&x, &y).unwrap();

    let wider = Array2::<f32>::zeros((5, 3));
    assert!(matches!(
        clf.predict(&wider),
        Err(ClassifierError::FeatureDimensionMismatch { expected: 2, found: 3 })
    ));
}

#[test]
fn test_predict_is_idempotent() {
    let (x, y) = imbalanced_dataset(5);
    let mut clf = build_classifier(&config(ImbalanceStrategy::None), Device::Cpu);
    clf.fit(&x, &y).unwrap();

    assert_eq!(clf.predict(&x).unwrap(), clf.predict(&x).unwrap());
}

#[test]
fn test_fixed_seed_reproduces_training() {
    let (x, y) = imbalanced_dataset(6);
    let cfg = config(ImbalanceStrategy::Smote(Smote::default()));

    let mut a = build_classifier(&cfg, Device::Cpu);
    let mut b = build_classifier(&cfg, Device::Cpu);
    a.fit(&x, &y).unwrap();
    b.fit(&x, &y).unwrap();

    assert_eq!(a.get_stat("accuracy").unwrap(), b.get_stat("accuracy").unwrap());
    assert_eq!(a.epoch_losses().unwrap(), b.epoch_losses().unwrap());
    assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
}

#[test]
fn test_refit_resets_statistics_by_default() {
    let (x, y) = imbalanced_dataset(7);
    let mut clf = build_classifier(&config(ImbalanceStrategy::None), Device::Cpu);
    clf.fit(&x, &y).unwrap();
    clf.fit(&x, &y).unwrap();
    assert_eq!(clf.get_stat("accuracy").unwrap().len(), 10);
}

#[test]
fn test_accumulate_policy_appends_statistics() {
    let (x, y) = imbalanced_dataset(8);
    let cfg = config(ImbalanceStrategy::None).with_stats_policy(StatsPolicy::Accumulate);
    let mut clf = build_classifier(&cfg, Device::Cpu);
    clf.fit(&x, &y).unwrap();
    clf.fit(&x, &y).unwrap();
    assert_eq!(clf.get_stat("bal_accuracy").unwrap().len(), 20);
}

#[test]
fn test_clone_unfitted_has_no_model() {
    let (x, y) = imbalanced_dataset(9);
    let mut clf = build_classifier(&config(ImbalanceStrategy::CountWeighting), Device::Cpu);
    clf.fit(&x, &y).unwrap();

    let copy = clf.clone_unfitted();
    assert_eq!(copy.name(), "count_weighting");
    assert!(matches!(copy.predict(&x), Err(ClassifierError::NotFitted(_))));
    assert!(clf.predict(&x).is_ok());
}

#[test]
fn test_empty_minority_class_fails_for_resampling() {
    let x = Array2::from_shape_fn((20, 2), |(i, j)| (i + j) as f32);
    let y = vec![0u8; 20];

    for strategy in [
        ImbalanceStrategy::RandomOversampling(RandomOversampler::default()),
        ImbalanceStrategy::Smote(Smote::default()),
        ImbalanceStrategy::Adasyn(Adasyn::default()),
    ] {
        let mut clf = build_classifier(&config(strategy), Device::Cpu);
        assert!(matches!(
            clf.fit(&x, &y),
            Err(ClassifierError::InsufficientSamples { found: 0, .. })
        ));
    }
}

#[test]
fn test_invalid_config_is_rejected_at_fit() {
    let (x, y) = imbalanced_dataset(10);
    let mut cfg = config(ImbalanceStrategy::None);
    cfg.batch_size = 0;
    let mut clf = build_classifier(&cfg, Device::Cpu);
    assert!(matches!(clf.fit(&x, &y), Err(ClassifierError::InvalidConfig(_))));
}
