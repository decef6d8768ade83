//! Neighbour-based robust location and scale estimates.
//!
//! For every protein, the expected variation of each feature is estimated
//! from its `k` nearest neighbours rather than the whole screen. Neighbours
//! are chosen in one feature space (typically the reference screen) while
//! the statistics are taken over another matrix with the same rows
//! (typically the reference-minus-condition differences).

use super::knn::{check_k, nearest_neighbors, NeighborSets};
use super::metric::{pairwise_distances, Metric};
use super::progress::{is_due, LogProgress, ProgressObserver};
use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Default neighbourhood size.
pub const DEFAULT_K: usize = 50;

/// Default number of proteins between progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 200;

/// Configuration for neighbour-based estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Number of neighbours per protein.
    pub k: usize,
    /// Metric used to rank neighbours.
    pub metric: Metric,
    /// Proteins between progress notifications (0 reports only completion).
    pub progress_interval: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            metric: Metric::Euclidean,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Per-protein, per-feature statistics over each protein's neighbours.
#[derive(Debug, Clone)]
pub struct RobustProfiles {
    /// Arithmetic mean of the neighbours' values (proteins × features).
    pub means: DMatrix<f64>,
    /// Median of the neighbours' values.
    pub medians: DMatrix<f64>,
    /// Median absolute deviation of the neighbours' values from `medians`.
    pub mad: DMatrix<f64>,
    /// The neighbours each statistic was computed from.
    pub neighbors: NeighborSets,
}

impl RobustProfiles {
    /// Number of (protein, feature) cells whose MAD is exactly zero.
    pub fn zero_mad_count(&self) -> usize {
        self.mad.iter().filter(|&&v| v == 0.0).count()
    }
}

/// Estimate neighbour statistics, logging progress.
///
/// See [`estimate_with_observer`].
pub fn estimate(
    target: &DMatrix<f64>,
    distance_space: &DMatrix<f64>,
    config: &EstimatorConfig,
) -> Result<RobustProfiles> {
    estimate_with_observer(target, distance_space, config, &mut LogProgress)
}

/// Estimate neighbour statistics for every protein.
///
/// # Arguments
/// * `target` - Matrix the statistics are computed over (proteins × features)
/// * `distance_space` - Matrix neighbours are selected in; same rows as `target`
/// * `config` - Neighbourhood size, metric and progress interval
/// * `observer` - Receives progress notifications
///
/// # Note
/// A MAD of zero is returned as is. Scores derived from it are undefined and
/// must be filtered or clipped by the caller.
///
/// # Errors
/// - `ShapeMismatch` if the two matrices have different row counts
/// - `InvalidParameter` unless `1 <= k < rows`
pub fn estimate_with_observer(
    target: &DMatrix<f64>,
    distance_space: &DMatrix<f64>,
    config: &EstimatorConfig,
    observer: &mut dyn ProgressObserver,
) -> Result<RobustProfiles> {
    if target.nrows() != distance_space.nrows() {
        return Err(ProfileError::ShapeMismatch {
            context: "estimate",
            expected: (distance_space.nrows(), target.ncols()),
            actual: target.shape(),
        });
    }
    let n_proteins = distance_space.nrows();
    check_k(config.k, n_proteins)?;

    let distances = pairwise_distances(distance_space, config.metric);
    let neighbors = nearest_neighbors(&distances, config.k)?;

    let n_features = target.ncols();
    let mut means = DMatrix::zeros(n_proteins, n_features);
    let mut medians = DMatrix::zeros(n_proteins, n_features);
    let mut mad = DMatrix::zeros(n_proteins, n_features);

    let mut values = Vec::with_capacity(config.k);
    let mut deviations = Vec::with_capacity(config.k);
    for protein in 0..n_proteins {
        let set = neighbors.neighbors(protein);
        for feature in 0..n_features {
            values.clear();
            values.extend(set.iter().map(|&other| target[(other, feature)]));
            means[(protein, feature)] = values.iter().mean();

            let center = median(&mut values);
            deviations.clear();
            deviations.extend(values.iter().map(|v| (center - v).abs()));
            medians[(protein, feature)] = center;
            mad[(protein, feature)] = median(&mut deviations);
        }

        if is_due(protein + 1, n_proteins, config.progress_interval) {
            observer.on_progress(protein + 1, n_proteins);
        }
    }

    Ok(RobustProfiles {
        means,
        medians,
        mad,
        neighbors,
    })
}

/// Median of `values`, sorting them in place.
///
/// Even-length input averages the two middle values. Returns NaN for empty
/// input or when any value is NaN.
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}
