//! Error types for the protein-change-profiles library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("No protein identifiers shared between reference and condition")]
    EmptyIntersection,

    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Unsupported distance metric '{0}'")]
    UnsupportedMetric(String),

    #[error("Non-numeric value '{value}' at row {row}, column {col}")]
    NonNumeric {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<ProfileError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProfileError {
    /// Tag an error with the pipeline stage it came from.
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        ProfileError::Stage {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error with any stage tags removed.
    pub fn root(&self) -> &ProfileError {
        match self {
            ProfileError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
