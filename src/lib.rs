//! Protein Change Profiles Library
//!
//! This library turns per-protein feature tables from two image-based screens
//! (a reference and a perturbation) into per-protein change profiles: robust
//! z-scores describing how far each protein's feature change departs from
//! the change seen in its nearest neighbours.
//!
//! # Overview
//!
//! The library is organized into modules, one per stage:
//!
//! - **data**: Core data structures (GeneMatrix and its TSV format)
//! - **align**: Protein alignment (reference/condition intersection, screen concatenation)
//! - **diff**: Per-feature differences between aligned screens
//! - **neighbors**: Distance metrics, k-nearest neighbours, neighbour median/MAD estimates
//! - **score**: Modified z-scores
//! - **profile**: Summaries of score tables
//! - **pipeline**: Pipeline configuration and execution
//!
//! # Example
//!
//! ```no_run
//! use protein_change_profiles::prelude::*;
//!
//! let profile = ChangeProfilePipeline::new()
//!     .k(50)
//!     .metric(Metric::Euclidean)
//!     .run_files("wild_type.tsv", "rapamycin.tsv", "rapamycin_zscores.tsv")
//!     .unwrap();
//! println!("{} proteins scored", profile.n_proteins());
//! ```

pub mod align;
pub mod data;
pub mod diff;
pub mod error;
pub mod neighbors;
pub mod pipeline;
pub mod profile;
pub mod score;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::align::{align, concat_screens, read_protein_list, screen_name, AlignedPair};
    pub use crate::data::{GeneMatrix, Values};
    pub use crate::diff::difference;
    pub use crate::error::{ProfileError, Result};
    pub use crate::neighbors::{
        estimate, estimate_with_observer, nearest_neighbors, pairwise_distances, DistanceMatrix,
        EstimatorConfig, LogProgress, Metric, NeighborSets, NoProgress, ProgressObserver,
        RobustProfiles,
    };
    pub use crate::pipeline::{
        change_profiles, ChangeProfile, ChangeProfilePipeline, ProfileConfig, Stage,
    };
    pub use crate::profile::{summarize_scores, ScoreSummary};
    pub use crate::score::{modified_zscores, score_profiles, Location};
}
