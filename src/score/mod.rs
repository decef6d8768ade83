//! Robust scoring of per-protein differences.

pub mod zscore;

pub use zscore::{modified_zscores, score_profiles, Location, MAD_SCALE};
