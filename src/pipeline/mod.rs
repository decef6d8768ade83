//! Pipeline composition and execution for change profiling.

mod runner;

pub use runner::{change_profiles, ChangeProfile, ChangeProfilePipeline, ProfileConfig, Stage};
