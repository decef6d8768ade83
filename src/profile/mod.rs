//! Descriptive profiling of change-profile score tables.

mod summary;

pub use summary::{
    summarize_scores, FeatureSummary, ProteinSummary, ScoreSummary, DEFAULT_OUTLIER_THRESHOLD,
};
