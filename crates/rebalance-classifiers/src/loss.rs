use candle_core::Tensor;

use crate::error::{ClassifierError, Result};

/// Mean of per-sample binary cross-entropy terms, each scaled by its weight.
///
/// Computed from logits as `max(z, 0) - z * y + ln(1 + exp(-|z|))`, which stays
/// finite for large `|z|`. All three tensors must be 1-D with the same length.
pub fn weighted_bce_with_logits(logits: &Tensor, targets: &Tensor, weights: &Tensor) -> Result<Tensor> {
    let n = logits.dims1()?;
    if targets.dims1()? != n || weights.dims1()? != n {
        return Err(ClassifierError::ShapeMismatch(format!(
            "loss inputs must be aligned: {} logits, {} targets, {} weights",
            n,
            targets.dims1()?,
            weights.dims1()?
        )));
    }

    let softplus = logits.abs()?.neg()?.exp()?.affine(1.0, 1.0)?.log()?;
    let per_sample = logits
        .relu()?
        .sub(&logits.mul(targets)?)?
        .add(&softplus)?;

    Ok(per_sample.mul(weights)?.mean_all()?)
}
