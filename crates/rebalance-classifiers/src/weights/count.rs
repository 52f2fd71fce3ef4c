/// Inverse class frequency weights.
///
/// Every sample of class `c` receives `n / (k * count_c)`, where `k` is the
/// number of classes present. A balanced label set therefore gets weight 1.0
/// everywhere and the weight ratio between two classes is the inverse of
/// their count ratio.
pub fn count_weights(y: &[u8]) -> Vec<f32> {
    let counts = [
        y.iter().filter(|&&label| label == 0).count(),
        y.iter().filter(|&&label| label != 0).count(),
    ];
    let n_present = counts.iter().filter(|&&c| c > 0).count().max(1);
    let n = y.len() as f64;

    let per_class: Vec<f32> = counts
        .iter()
        .map(|&c| {
            if c == 0 {
                0.0
            } else {
                (n / (n_present as f64 * c as f64)) as f32
            }
        })
        .collect();

    y.iter()
        .map(|&label| per_class[usize::from(label != 0)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_weights_inverse_ratio() {
        let mut y = vec![0u8; 80];
        y.extend(vec![1u8; 20]);
        let w = count_weights(&y);

        assert_eq!(w.len(), 100);
        let w_major = w[0];
        let w_minor = w[99];
        assert!((w_minor / w_major - 4.0).abs() < 1e-5);
        assert!((w_major - 0.625).abs() < 1e-6);
        assert!((w_minor - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_count_weights_balanced_is_uniform() {
        let y = vec![0u8, 1, 0, 1, 1, 0];
        assert!(count_weights(&y).iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_count_weights_single_class() {
        let y = vec![1u8; 4];
        assert_eq!(count_weights(&y), vec![1.0; 4]);
    }
}
