//! k-nearest-neighbour selection from a precomputed distance matrix.

use super::metric::DistanceMatrix;
use crate::error::{ProfileError, Result};

/// The `k` closest other rows for every row, closest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborSets {
    k: usize,
    indices: Vec<Vec<usize>>,
}

impl NeighborSets {
    /// Neighbour count per row.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether there are no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Neighbours of `row`, ordered by ascending distance.
    #[inline]
    pub fn neighbors(&self, row: usize) -> &[usize] {
        &self.indices[row]
    }

    /// Iterate over all neighbour sets in row order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.indices.iter().map(Vec::as_slice)
    }
}

/// Select the `k` nearest other rows for each row.
///
/// Rows are ranked by ascending distance with a stable sort, so rows at
/// equal distance keep their original order. A row is never its own
/// neighbour, even when another row sits at distance zero. NaN distances
/// rank last.
///
/// # Errors
/// `InvalidParameter` unless `1 <= k < distances.len()`.
pub fn nearest_neighbors(distances: &DistanceMatrix, k: usize) -> Result<NeighborSets> {
    let n = distances.len();
    check_k(k, n)?;

    let indices = (0..n)
        .map(|row| {
            let mut others: Vec<usize> = (0..n).filter(|&other| other != row).collect();
            others.sort_by(|&a, &b| {
                rank_key(distances.get(row, a)).total_cmp(&rank_key(distances.get(row, b)))
            });
            others.truncate(k);
            others
        })
        .collect();

    Ok(NeighborSets { k, indices })
}

/// Validate a neighbourhood size against the number of rows.
pub(crate) fn check_k(k: usize, n: usize) -> Result<()> {
    if k == 0 || k >= n {
        return Err(ProfileError::InvalidParameter(format!(
            "k must satisfy 1 <= k < {} (number of proteins), got {}",
            n, k
        )));
    }
    Ok(())
}

#[inline]
fn rank_key(distance: f64) -> f64 {
    if distance.is_nan() {
        f64::INFINITY
    } else {
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::metric::{pairwise_distances, Metric};
    use nalgebra::DMatrix;

    fn line_points() -> DistanceMatrix {
        // points on a line at 0, 1, 3, 7
        let points = DMatrix::from_row_slice(4, 1, &[0.0, 1.0, 3.0, 7.0]);
        pairwise_distances(&points, Metric::Euclidean)
    }

    #[test]
    fn test_nearest_neighbors_order() {
        let sets = nearest_neighbors(&line_points(), 2).unwrap();
        assert_eq!(sets.len(), 4);
        assert_eq!(sets.neighbors(0), &[1, 2]);
        assert_eq!(sets.neighbors(1), &[0, 2]);
        assert_eq!(sets.neighbors(2), &[1, 0]);
        assert_eq!(sets.neighbors(3), &[2, 1]);
    }

    #[test]
    fn test_neighbor_count_invariant() {
        let dist = line_points();
        for k in 1..4 {
            let sets = nearest_neighbors(&dist, k).unwrap();
            assert_eq!(sets.k(), k);
            assert!(sets.iter().all(|set| set.len() == k));
        }
    }

    #[test]
    fn test_self_never_included() {
        let sets = nearest_neighbors(&line_points(), 3).unwrap();
        for (row, set) in sets.iter().enumerate() {
            assert!(!set.contains(&row));
        }
    }

    #[test]
    fn test_ties_keep_row_order() {
        // rows 1, 2 and 3 are all at distance 1 from row 0; row 2 duplicates row 0
        let points = DMatrix::from_row_slice(4, 1, &[5.0, 6.0, 5.0, 4.0]);
        let dist = pairwise_distances(&points, Metric::Euclidean);

        let sets = nearest_neighbors(&dist, 3).unwrap();
        assert_eq!(sets.neighbors(0), &[2, 1, 3]);
        assert_eq!(sets.neighbors(2), &[0, 1, 3]);
    }

    #[test]
    fn test_nan_distances_rank_last() {
        let points = DMatrix::from_row_slice(3, 1, &[0.0, f64::NAN, 2.0]);
        let dist = pairwise_distances(&points, Metric::Euclidean);

        let sets = nearest_neighbors(&dist, 1).unwrap();
        assert_eq!(sets.neighbors(0), &[2]);
    }

    #[test]
    fn test_invalid_k() {
        let dist = line_points();
        assert!(matches!(nearest_neighbors(&dist, 0), Err(ProfileError::InvalidParameter(_))));
        assert!(matches!(nearest_neighbors(&dist, 4), Err(ProfileError::InvalidParameter(_))));
        assert!(matches!(nearest_neighbors(&dist, 10), Err(ProfileError::InvalidParameter(_))));
    }
}
