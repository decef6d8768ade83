//! Pairwise distance metrics over matrix rows.

use crate::error::{ProfileError, Result};
use nalgebra::{DMatrix, Dyn, MatrixView, U1};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

type RowView<'a> = MatrixView<'a, f64, U1, Dyn, U1, Dyn>;

/// Distance metric used to select neighbours.
///
/// Names are parsed the same way from config files and the command line,
/// case-insensitively and with the aliases accepted by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Straight-line distance.
    #[default]
    Euclidean,
    /// Squared straight-line distance (same neighbour order as Euclidean).
    SqEuclidean,
    /// Sum of absolute differences.
    Manhattan,
    /// Largest absolute difference.
    Chebyshev,
    /// One minus the cosine similarity.
    Cosine,
}

impl Metric {
    /// Canonical name of the metric.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::SqEuclidean => "sqeuclidean",
            Metric::Manhattan => "manhattan",
            Metric::Chebyshev => "chebyshev",
            Metric::Cosine => "cosine",
        }
    }

    /// Distance between two rows.
    pub fn distance(&self, a: RowView<'_>, b: RowView<'_>) -> f64 {
        let pairs = a.iter().zip(b.iter());
        match self {
            Metric::Euclidean => pairs.map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt(),
            Metric::SqEuclidean => pairs.map(|(x, y)| (x - y).powi(2)).sum(),
            Metric::Manhattan => pairs.map(|(x, y)| (x - y).abs()).sum(),
            Metric::Chebyshev => pairs.map(|(x, y)| (x - y).abs()).fold(0.0, f64::max),
            Metric::Cosine => {
                let dot: f64 = pairs.map(|(x, y)| x * y).sum();
                let norm_a = a.norm();
                let norm_b = b.norm();
                // zero rows have zero similarity with everything
                let similarity = if norm_a == 0.0 || norm_b == 0.0 {
                    0.0
                } else {
                    dot / (norm_a * norm_b)
                };
                (1.0 - similarity).clamp(0.0, 2.0)
            }
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "sqeuclidean" => Ok(Metric::SqEuclidean),
            "manhattan" | "cityblock" | "l1" => Ok(Metric::Manhattan),
            "chebyshev" => Ok(Metric::Chebyshev),
            "cosine" => Ok(Metric::Cosine),
            _ => Err(ProfileError::UnsupportedMetric(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Square matrix of pairwise distances between the rows of a matrix.
///
/// Symmetric, with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: DMatrix<f64>,
}

impl DistanceMatrix {
    /// Number of rows the distances were computed over.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Whether the matrix is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Distance between rows `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[(i, j)]
    }
}

/// Compute all pairwise distances between the rows of `data`.
///
/// Only the upper triangle is evaluated; the lower triangle is mirrored and
/// the diagonal is fixed at zero.
pub fn pairwise_distances(data: &DMatrix<f64>, metric: Metric) -> DistanceMatrix {
    let n = data.nrows();
    let mut distances = DMatrix::zeros(n, n);
    for i in 0..n {
        let row_i = data.row(i);
        for j in (i + 1)..n {
            let d = metric.distance(row_i, data.row(j));
            distances[(i, j)] = d;
            distances[(j, i)] = d;
        }
    }
    DistanceMatrix { data: distances }
}
