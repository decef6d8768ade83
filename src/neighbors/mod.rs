//! Neighbour search and neighbour-based robust statistics.
//!
//! - **metric**: pairwise distance metrics and the distance matrix
//! - **knn**: k-nearest-neighbour selection with stable tie-breaking
//! - **robust**: per-protein mean, median and MAD over the neighbours
//! - **progress**: observers notified while estimation runs

pub mod knn;
pub mod metric;
pub mod progress;
pub mod robust;

pub use knn::{nearest_neighbors, NeighborSets};
pub use metric::{pairwise_distances, DistanceMatrix, Metric};
pub use progress::{LogProgress, NoProgress, ProgressObserver};
pub use robust::{
    estimate, estimate_with_observer, median, EstimatorConfig, RobustProfiles, DEFAULT_K,
    DEFAULT_PROGRESS_INTERVAL,
};
