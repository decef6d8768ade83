//! Elementwise subtraction of aligned matrices.

use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;

/// Compute `reference - condition` elementwise.
///
/// Both matrices must come from the same alignment, so their rows already
/// describe the same proteins in the same order.
pub fn difference(reference: &DMatrix<f64>, condition: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if reference.shape() != condition.shape() {
        return Err(ProfileError::ShapeMismatch {
            context: "difference",
            expected: reference.shape(),
            actual: condition.shape(),
        });
    }
    Ok(reference - condition)
}
