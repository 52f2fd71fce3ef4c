//! End-to-end tests of data loading, cross-validation and output writing.

use std::fmt::Write as _;
use std::path::Path;

use rebalance_cli::config::BenchmarkConfig;
use rebalance_cli::cv::CrossValidation;
use rebalance_cli::data::load_keel;
use rebalance_cli::report::{REPORT_FILE, SCORES_FILE, SUMMARY_FILE};

fn write_keel(path: &Path, n_negative: usize, n_positive: usize) {
    let mut content = String::new();
    content.push_str("@relation toy\n");
    content.push_str("@attribute a real [0.0, 10.0]\n");
    content.push_str("@attribute b real [0.0, 10.0]\n");
    content.push_str("@attribute class {positive, negative}\n");
    content.push_str("@inputs a, b\n@outputs class\n@data\n");
    for i in 0..n_negative {
        writeln!(content, "{:.2}, {:.2}, negative", (i % 7) as f32 * 0.3, (i % 5) as f32 * 0.2).unwrap();
    }
    for i in 0..n_positive {
        writeln!(content, "{:.2}, {:.2}, positive", 3.0 + (i % 3) as f32 * 0.3, 2.0 + (i % 4) as f32 * 0.2).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

// ---------------------------------------------------------------------------
// KEEL loading
// ---------------------------------------------------------------------------

#[test]
fn keel_loader_skips_headers_and_encodes_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toy.dat");
    write_keel(&path, 12, 4);

    let ds = load_keel(&path).unwrap();
    assert_eq!(ds.name, "toy");
    assert_eq!(ds.x.dim(), (16, 2));
    assert_eq!(ds.classes, vec!["negative", "positive"]);
    assert_eq!(ds.y.iter().filter(|&&l| l == 1).count(), 4);
    assert!((ds.x[[12, 0]] - 3.0).abs() < 1e-6);
}

#[test]
fn keel_loader_rejects_non_numeric_features() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.dat");
    std::fs::write(&path, "@relation bad\n1.0, x, positive\n2.0, 3.0, negative\n").unwrap();
    assert!(load_keel(&path).is_err());
}

#[test]
fn keel_loader_missing_file_errors() {
    assert!(load_keel("/nonexistent/dataset.dat").is_err());
}

// ---------------------------------------------------------------------------
// BenchmarkConfig
// ---------------------------------------------------------------------------

#[test]
fn benchmark_config_round_trips_json() {
    let config = BenchmarkConfig::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    assert!(json.contains("\"method\": \"density_weighting\""));
    let parsed: BenchmarkConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn benchmark_config_loads_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"num_epochs": 7, "strategies": [{"method": "smote", "k_neighbors": 3}]}"#,
    )
    .unwrap();

    let config = BenchmarkConfig::load(&path).unwrap();
    assert_eq!(config.num_epochs, 7);
    assert_eq!(config.batch_size, 100);
    assert_eq!(config.strategies.len(), 1);
    assert_eq!(config.strategies[0].name(), "smote");
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

#[test]
fn benchmark_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("toy.dat");
    write_keel(&data_path, 30, 10);

    let config = BenchmarkConfig {
        datasets: vec![data_path],
        num_epochs: 2,
        batch_size: 16,
        cross_validation: CrossValidation {
            n_splits: 2,
            n_repeats: 1,
            seed: 42,
        },
        output_dir: dir.path().join("out"),
        ..Default::default()
    };

    let results = rebalance_cli::run(&config).unwrap();
    assert_eq!(results.folds.len(), 6 * 2);
    assert_eq!(results.summaries.len(), 6);
    for summary in &results.summaries {
        for curve in summary.mean_curves.values() {
            assert_eq!(curve.len(), 2);
        }
    }

    let scores = std::fs::read_to_string(config.output_dir.join(SCORES_FILE)).unwrap();
    let mut lines = scores.lines();
    assert_eq!(
        lines.next().unwrap(),
        "dataset\tstrategy\trepeat\tsplit\taccuracy\tbal_accuracy\tprecision\trecall"
    );
    assert_eq!(lines.count(), 12);

    let summary: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(config.output_dir.join(SUMMARY_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["strategies"].as_array().unwrap().len(), 6);

    let report = std::fs::read_to_string(config.output_dir.join(REPORT_FILE)).unwrap();
    assert!(report.contains("count_weighting"));
    assert!(report.contains("toy"));
}

#[test]
fn benchmark_without_data_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = BenchmarkConfig {
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    assert!(rebalance_cli::run(&config).is_err());
}
