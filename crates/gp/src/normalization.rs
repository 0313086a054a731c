//! Pure transforms between raw space and the space the GP is fitted in.
//!
//! Inputs are mapped onto the unit hypercube given domain bounds, outputs are
//! centered and scaled given a mean and a spread computed on the training values.

use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};

fn check_bounds<F: Float>(
    nx: usize,
    lower: &ArrayBase<impl Data<Elem = F>, Ix1>,
    upper: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Result<()> {
    if lower.len() != nx || upper.len() != nx {
        return Err(GpError::InvalidArgument(format!(
            "Bounds dimensions ({}, {}) do not match input dimension {}",
            lower.len(),
            upper.len(),
            nx
        )));
    }
    Ok(())
}

/// `x'[i] = (x[i] - lower[i]) / (upper[i] - lower[i])` for every row of `x`
pub fn normalize_inputs<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    lower: &ArrayBase<impl Data<Elem = F>, Ix1>,
    upper: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Result<Array2<F>> {
    check_bounds(x.ncols(), lower, upper)?;
    let width = upper - lower;
    Ok((x - lower) / &width)
}

/// Inverse of [`normalize_inputs`]
pub fn denormalize_inputs<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    lower: &ArrayBase<impl Data<Elem = F>, Ix1>,
    upper: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Result<Array2<F>> {
    check_bounds(x.ncols(), lower, upper)?;
    let width = upper - lower;
    Ok(x * &width + lower)
}

/// `(v - mean) / std` for every value.
///
/// Fails with [`GpError::DegenerateData`] when `std` is zero, that is when all
/// values used to compute the statistics are the same.
pub fn normalize_outputs<F: Float>(
    y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    mean: F,
    std: F,
) -> Result<Array1<F>> {
    if std == F::zero() {
        return Err(GpError::DegenerateData(
            "Cannot normalize output. All targets have the same value!".to_string(),
        ));
    }
    Ok(y.mapv(|v| (v - mean) / std))
}

/// Inverse of [`normalize_outputs`]: `v * std + mean`
pub fn denormalize_outputs<F: Float>(
    y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    mean: F,
    std: F,
) -> Array1<F> {
    y.mapv(|v| v * std + mean)
}

/// Output statistics `(mean, std)` used by the surrogate where
/// `std = sqrt(sum((v - mean)^2))`.
///
/// The spread is the square root of the sum of squared deviations, it is
/// not divided by the number of values.
pub fn output_stats<F: Float>(y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<(F, F)> {
    let mean = y.mean().ok_or_else(|| {
        GpError::InvalidArgument("Cannot compute statistics of empty values".to_string())
    })?;
    let ss = y.fold(F::zero(), |acc, &v| acc + (v - mean) * (v - mean));
    Ok((mean, ss.sqrt()))
}
