//! Pipeline runner turning a reference and a condition screen into change profiles.

use crate::align::align;
use crate::data::GeneMatrix;
use crate::diff::difference;
use crate::error::{ProfileError, Result};
use crate::neighbors::{
    estimate_with_observer, EstimatorConfig, LogProgress, Metric, ProgressObserver, RobustProfiles,
};
use crate::score::{score_profiles, Location};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A stage of the change-profile pipeline, used to tag errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadReference,
    LoadCondition,
    Align,
    Difference,
    Estimate,
    Score,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LoadReference => "loading reference",
            Stage::LoadCondition => "loading condition",
            Stage::Align => "alignment",
            Stage::Difference => "difference",
            Stage::Estimate => "neighbour estimation",
            Stage::Score => "scoring",
            Stage::Write => "writing output",
        };
        f.write_str(name)
    }
}

/// Pipeline configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Name of the run.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Neighbourhood size, metric and progress interval.
    #[serde(flatten)]
    pub estimator: EstimatorConfig,
    /// Statistic the scores are centred on.
    pub location: Location,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: "change-profile".to_string(),
            description: None,
            estimator: EstimatorConfig::default(),
            location: Location::default(),
        }
    }
}

impl ProfileConfig {
    /// Load from YAML string.
    ///
    /// The metric name is resolved like a `--metric` flag, so an unknown
    /// name fails with `UnsupportedMetric`.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        if let Some(metric) = value.get_mut("metric") {
            if let Some(name) = metric.as_str() {
                let parsed: Metric = name.parse()?;
                *metric = serde_yaml::Value::from(parsed.name());
            }
        }
        serde_yaml::from_value(value).map_err(ProfileError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ProfileError::from)
    }
}

/// Output of a change-profile run.
#[derive(Debug, Clone)]
pub struct ChangeProfile {
    /// Column labels, copied from the reference screen.
    pub headers: Vec<String>,
    /// Shared proteins, ascending; row order of every matrix below.
    pub proteins: Vec<String>,
    /// Reference minus condition.
    pub difference: DMatrix<f64>,
    /// Neighbour statistics over `difference`.
    pub robust: RobustProfiles,
    /// Modified z-scores.
    pub scores: DMatrix<f64>,
}

impl ChangeProfile {
    /// Number of proteins scored.
    pub fn n_proteins(&self) -> usize {
        self.proteins.len()
    }

    /// The z-scores as a GeneMatrix ready to be written.
    pub fn to_gene_matrix(&self) -> Result<GeneMatrix> {
        GeneMatrix::new(self.headers.clone(), self.proteins.clone(), self.scores.clone())
    }
}

/// Builder for configuring and running change profiling.
#[derive(Debug, Clone, Default)]
pub struct ChangeProfilePipeline {
    config: ProfileConfig,
}

impl ChangeProfilePipeline {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a config.
    pub fn from_config(config: &ProfileConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Set the run name.
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    /// Set the number of neighbours.
    pub fn k(mut self, k: usize) -> Self {
        self.config.estimator.k = k;
        self
    }

    /// Set the neighbour distance metric.
    pub fn metric(mut self, metric: Metric) -> Self {
        self.config.estimator.metric = metric;
        self
    }

    /// Set the statistic scores are centred on.
    pub fn location(mut self, location: Location) -> Self {
        self.config.location = location;
        self
    }

    /// Set how many proteins pass between progress notifications.
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.config.estimator.progress_interval = interval;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Convert to config for serialization.
    pub fn to_config(&self, description: Option<&str>) -> ProfileConfig {
        ProfileConfig {
            description: description.map(String::from),
            ..self.config.clone()
        }
    }

    /// Run on in-memory screens, logging progress.
    pub fn run(&self, reference: &GeneMatrix, condition: &GeneMatrix) -> Result<ChangeProfile> {
        self.run_with_observer(reference, condition, &mut LogProgress)
    }

    /// Run on in-memory screens.
    ///
    /// Neighbours are selected in the aligned reference space; statistics
    /// and scores are computed over the reference-minus-condition matrix.
    pub fn run_with_observer(
        &self,
        reference: &GeneMatrix,
        condition: &GeneMatrix,
        observer: &mut dyn ProgressObserver,
    ) -> Result<ChangeProfile> {
        log::info!(
            "Running '{}' (k={}, metric={}, location={})",
            self.config.name,
            self.config.estimator.k,
            self.config.estimator.metric,
            self.config.location
        );

        let aligned =
            align(reference, condition).map_err(|e| e.in_stage(Stage::Align.to_string()))?;
        let diff = difference(&aligned.reference, &aligned.condition)
            .map_err(|e| e.in_stage(Stage::Difference.to_string()))?;
        let robust =
            estimate_with_observer(&diff, &aligned.reference, &self.config.estimator, observer)
                .map_err(|e| e.in_stage(Stage::Estimate.to_string()))?;
        let scores = score_profiles(&diff, &robust, self.config.location)
            .map_err(|e| e.in_stage(Stage::Score.to_string()))?;

        Ok(ChangeProfile {
            headers: reference.headers().to_vec(),
            proteins: aligned.proteins,
            difference: diff,
            robust,
            scores,
        })
    }

    /// Load both screens, run, and write the z-score table to `output`.
    ///
    /// Nothing is written unless every stage succeeds.
    pub fn run_files<P, Q, R>(&self, reference: P, condition: Q, output: R) -> Result<ChangeProfile>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        let reference = reference.as_ref();
        let condition = condition.as_ref();
        let output = output.as_ref();

        let ref_matrix = GeneMatrix::from_tsv(reference).map_err(|e| {
            e.in_stage(format!("{} ({})", Stage::LoadReference, reference.display()))
        })?;
        let cond_matrix = GeneMatrix::from_tsv(condition).map_err(|e| {
            e.in_stage(format!("{} ({})", Stage::LoadCondition, condition.display()))
        })?;

        let profile = self.run(&ref_matrix, &cond_matrix)?;

        profile
            .to_gene_matrix()
            .and_then(|scores| scores.to_tsv(output))
            .map_err(|e| e.in_stage(format!("{} ({})", Stage::Write, output.display())))?;

        Ok(profile)
    }
}

/// Convenience function for a default change-profile run with `k` neighbours.
pub fn change_profiles(
    reference: &GeneMatrix,
    condition: &GeneMatrix,
    k: usize,
) -> Result<ChangeProfile> {
    ChangeProfilePipeline::new().k(k).run(reference, condition)
}
