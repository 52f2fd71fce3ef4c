use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rebalance_classifiers::resampling::{Adasyn, RandomOversampler, Resampler, Smote};
use rebalance_classifiers::weights::{count_weights, kde_log_density, kde_weights, Bandwidth, KdeWeighting};

fn blobs(n_major: usize, n_minor: usize, seed: u64) -> (Array2<f32>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = n_major + n_minor;
    let y: Vec<u8> = (0..n).map(|i| u8::from(i >= n_major)).collect();
    let x = Array2::from_shape_fn((n, 3), |(i, _)| {
        let offset = if y[i] == 1 { 2.0 } else { 0.0 };
        offset + rng.gen_range(-1.0f32..1.0)
    });
    (x, y)
}

#[test]
fn test_resamplers_balance_and_keep_majority_rows() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (x, y) = blobs(70, 12, 0);
    let resamplers: Vec<Box<dyn Resampler>> = vec![
        Box::new(RandomOversampler::default()),
        Box::new(Smote::default()),
        Box::new(Adasyn::default()),
    ];

    for resampler in resamplers {
        let mut rng = StdRng::seed_from_u64(1);
        let out = resampler.resample(&x, &y, &mut rng).unwrap();

        let majority = out.y.iter().filter(|&&l| l == 0).count();
        let minority = out.y.iter().filter(|&&l| l == 1).count();
        assert_eq!(majority, 70, "{}", resampler.name());
        assert_eq!(minority, 70, "{}", resampler.name());
        assert_eq!(out.n_synthetic, 58);

        // every majority row of the output is an original majority row
        for (row, &label) in out.x.rows().into_iter().zip(out.y.iter()) {
            if label == 0 {
                assert!((0..70).any(|i| x.row(i) == row));
            }
        }
    }
}

#[test]
fn test_count_weight_ratio_matches_count_ratio() {
    let (_, y) = blobs(80, 20, 2);
    let w = count_weights(&y);
    assert!((w[99] / w[0] - 4.0).abs() < 1e-5);
    assert!(w.iter().all(|v| v.is_finite() && *v > 0.0));
}

#[test]
fn test_density_weights_favour_sparse_samples() {
    let (x, y) = blobs(60, 10, 3);
    let config = KdeWeighting::default();
    let weights = kde_weights(&x, &y, &config).unwrap();
    let log_density = kde_log_density(&x, Bandwidth::Scott).unwrap();

    let densest = (0..x.nrows())
        .max_by(|&a, &b| log_density[a].total_cmp(&log_density[b]))
        .unwrap();
    let sparsest = (0..x.nrows())
        .min_by(|&a, &b| log_density[a].total_cmp(&log_density[b]))
        .unwrap();

    assert!(weights.iter().all(|w| w.is_finite() && *w >= 0.0));
    assert!(weights[sparsest] >= weights[densest]);
}
