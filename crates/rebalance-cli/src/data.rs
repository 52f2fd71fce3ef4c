//! Dataset loading for the benchmark.
use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Trim};
use ndarray::Array2;

/// A labelled binary dataset ready for cross-validation.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub x: Array2<f32>,
    pub y: Vec<u8>,
    /// Original class names, indexed by encoded label.
    pub classes: Vec<String>,
}

impl Dataset {
    pub fn n_samples(&self) -> usize {
        self.y.len()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Fraction of samples in the larger class.
    pub fn majority_fraction(&self) -> f64 {
        if self.y.is_empty() {
            return 0.0;
        }
        let ones = self.y.iter().filter(|&&l| l == 1).count();
        ones.max(self.y.len() - ones) as f64 / self.y.len() as f64
    }
}

/// Read a KEEL `.dat` file.
///
/// Lines starting with `@` (relation, attribute and data headers) are skipped.
/// Every remaining line is a comma separated row whose last column is the
/// class. Class names are encoded as 0/1 in sorted order.
pub fn load_keel<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'@'))
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let mut values: Vec<f32> = Vec::new();
    let mut raw_labels: Vec<String> = Vec::new();
    let mut n_features: Option<usize> = None;

    for (line, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Failed to read row {} of {}", line + 1, path.display()))?;
        if record.len() < 2 {
            bail!(
                "Row {} of {} has {} columns, expected features and a class",
                line + 1,
                path.display(),
                record.len()
            );
        }

        let width = record.len() - 1;
        match n_features {
            None => n_features = Some(width),
            Some(expected) if expected != width => bail!(
                "Row {} of {} has {} features, expected {}",
                line + 1,
                path.display(),
                width,
                expected
            ),
            _ => {}
        }

        for field in record.iter().take(width) {
            let value: f32 = field.parse().with_context(|| {
                format!(
                    "Non-numeric feature '{}' in row {} of {}",
                    field,
                    line + 1,
                    path.display()
                )
            })?;
            values.push(value);
        }
        raw_labels.push(record[width].to_string());
    }

    let n_features = match n_features {
        Some(n) => n,
        None => bail!("Dataset {} contains no data rows", path.display()),
    };
    let (y, classes) = encode_labels(&raw_labels)
        .with_context(|| format!("Invalid class column in {}", path.display()))?;
    let x = Array2::from_shape_vec((raw_labels.len(), n_features), values)?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    log::info!(
        "Loaded {}: {} samples, {} features, classes {:?}",
        name,
        y.len(),
        n_features,
        classes
    );

    Ok(Dataset {
        name,
        x,
        y,
        classes,
    })
}

/// Encode string labels to 0/1 following their sorted order.
pub fn encode_labels(labels: &[String]) -> Result<(Vec<u8>, Vec<String>)> {
    let classes: Vec<String> = labels
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if classes.len() != 2 {
        bail!(
            "Expected exactly two classes, found {}: {:?}",
            classes.len(),
            classes
        );
    }

    let encoded = labels
        .iter()
        .map(|l| u8::from(*l == classes[1]))
        .collect();
    Ok((encoded, classes))
}
