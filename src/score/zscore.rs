//! Modified z-scores from neighbour location and MAD estimates.

use crate::error::{ProfileError, Result};
use crate::neighbors::RobustProfiles;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Converts a MAD into a standard-normal equivalent scale.
pub const MAD_SCALE: f64 = 0.6745;

/// Which neighbour statistic centres the modified z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Neighbour median.
    #[default]
    Median,
    /// Neighbour arithmetic mean.
    Mean,
}

impl Location {
    /// The matching location matrix from a set of neighbour statistics.
    pub fn select<'a>(&self, profiles: &'a RobustProfiles) -> &'a DMatrix<f64> {
        match self {
            Location::Median => &profiles.medians,
            Location::Mean => &profiles.means,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Median => f.write_str("median"),
            Location::Mean => f.write_str("mean"),
        }
    }
}

/// Compute modified z-scores elementwise.
///
/// # Formula
/// z = 0.6745 * (x - location) / MAD
///
/// # Note
/// A zero MAD is not guarded: the score becomes `±inf` (or NaN when the
/// difference is also zero) following IEEE division. Consumers should treat
/// non-finite scores as undefined.
///
/// # Errors
/// `ShapeMismatch` if the three matrices differ in shape.
pub fn modified_zscores(
    values: &DMatrix<f64>,
    location: &DMatrix<f64>,
    mad: &DMatrix<f64>,
) -> Result<DMatrix<f64>> {
    for (context, other) in [("score location", location), ("score MAD", mad)] {
        if other.shape() != values.shape() {
            return Err(ProfileError::ShapeMismatch {
                context,
                expected: values.shape(),
                actual: other.shape(),
            });
        }
    }

    Ok(values.zip_zip_map(location, mad, |x, center, scale| {
        MAD_SCALE * (x - center) / scale
    }))
}

/// Score `values` against neighbour statistics using the chosen location.
pub fn score_profiles(
    values: &DMatrix<f64>,
    profiles: &RobustProfiles,
    location: Location,
) -> Result<DMatrix<f64>> {
    let scores = modified_zscores(values, location.select(profiles), &profiles.mad)?;

    let undefined = scores.iter().filter(|z| !z.is_finite()).count();
    if undefined > 0 {
        log::warn!(
            "{} of {} scores are undefined (zero neighbour MAD)",
            undefined,
            scores.len()
        );
    }
    Ok(scores)
}
