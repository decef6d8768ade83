//! Summary of a modified z-score table.

use crate::data::GeneMatrix;
use crate::error::Result;
use crate::neighbors::median;
use serde::{Deserialize, Serialize};

/// Conventional cut-off above which a modified z-score marks an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.5;

/// Per-feature score statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSummary {
    /// Feature name.
    pub feature: String,
    /// Scores that are NaN or infinite.
    pub undefined: usize,
    /// Finite scores whose magnitude exceeds the threshold.
    pub outliers: usize,
    /// Median magnitude of the finite scores (NaN if there are none).
    pub median_abs_score: f64,
}

/// Per-protein score statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProteinSummary {
    /// Protein identifier.
    pub protein: String,
    /// Scores that are NaN or infinite.
    pub undefined: usize,
    /// Finite scores whose magnitude exceeds the threshold.
    pub outliers: usize,
}

/// Summary of a z-score GeneMatrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Number of proteins.
    pub n_proteins: usize,
    /// Number of features.
    pub n_features: usize,
    /// Magnitude above which a finite score counts as an outlier.
    pub threshold: f64,
    /// Total undefined scores.
    pub undefined_scores: usize,
    /// Total outlier scores.
    pub outlier_scores: usize,
    /// Statistics per feature, in column order.
    pub features: Vec<FeatureSummary>,
    /// Statistics per protein, most outlying first.
    pub proteins: Vec<ProteinSummary>,
}

impl ScoreSummary {
    /// Proportion of scores that are undefined.
    pub fn undefined_fraction(&self) -> f64 {
        let total = self.n_proteins * self.n_features;
        if total == 0 {
            0.0
        } else {
            self.undefined_scores as f64 / total as f64
        }
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Change Profile Summary")?;
        writeln!(f, "  Proteins:          {}", self.n_proteins)?;
        writeln!(f, "  Features:          {}", self.n_features)?;
        writeln!(
            f,
            "  Undefined scores:  {} ({:.2}%)",
            self.undefined_scores,
            self.undefined_fraction() * 100.0
        )?;
        writeln!(f, "  |z| > {}:          {}", self.threshold, self.outlier_scores)?;

        let top: Vec<_> = self.proteins.iter().filter(|p| p.outliers > 0).take(10).collect();
        if !top.is_empty() {
            writeln!(f)?;
            writeln!(f, "Most changed proteins:")?;
            for p in top {
                writeln!(f, "  {}: {} outlying features", p.protein, p.outliers)?;
            }
        }
        Ok(())
    }
}

/// Summarize a z-score table.
///
/// # Errors
/// `NonNumeric` if the table holds unparsed cells.
pub fn summarize_scores(scores: &GeneMatrix, threshold: f64) -> Result<ScoreSummary> {
    let data = scores.numeric()?;
    let (n_proteins, n_features) = data.shape();

    let features: Vec<FeatureSummary> = scores
        .feature_names()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let column = data.column(col);
            let mut magnitudes: Vec<f64> = column
                .iter()
                .filter(|z| z.is_finite())
                .map(|z| z.abs())
                .collect();
            FeatureSummary {
                feature: name.clone(),
                undefined: n_proteins - magnitudes.len(),
                outliers: magnitudes.iter().filter(|&&z| z > threshold).count(),
                median_abs_score: median(&mut magnitudes),
            }
        })
        .collect();

    let mut proteins: Vec<ProteinSummary> = scores
        .genelist()
        .iter()
        .enumerate()
        .map(|(row, protein)| {
            let values = data.row(row);
            ProteinSummary {
                protein: protein.clone(),
                undefined: values.iter().filter(|z| !z.is_finite()).count(),
                outliers: values
                    .iter()
                    .filter(|z| z.is_finite() && z.abs() > threshold)
                    .count(),
            }
        })
        .collect();
    // stable: ties stay in table order
    proteins.sort_by(|a, b| b.outliers.cmp(&a.outliers));

    Ok(ScoreSummary {
        n_proteins,
        n_features,
        threshold,
        undefined_scores: features.iter().map(|f| f.undefined).sum(),
        outlier_scores: features.iter().map(|f| f.outliers).sum(),
        features,
        proteins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn create_scores() -> GeneMatrix {
        let data = DMatrix::from_row_slice(3, 2, &[
            0.5, f64::NAN,
            -4.0, 5.0,
            1.0, f64::INFINITY,
        ]);
        GeneMatrix::new(
            vec!["ID".into(), "size".into(), "ecc".into()],
            vec!["A".into(), "B".into(), "C".into()],
            data,
        )
        .unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let summary = summarize_scores(&create_scores(), DEFAULT_OUTLIER_THRESHOLD).unwrap();

        assert_eq!(summary.n_proteins, 3);
        assert_eq!(summary.n_features, 2);
        assert_eq!(summary.undefined_scores, 2);
        assert_eq!(summary.outlier_scores, 2);

        assert_eq!(summary.features[0].feature, "size");
        assert_eq!(summary.features[0].undefined, 0);
        assert_eq!(summary.features[0].outliers, 1);
        assert_eq!(summary.features[0].median_abs_score, 1.0);
        assert_eq!(summary.features[1].undefined, 2);
        assert_eq!(summary.features[1].median_abs_score, 5.0);

        assert_eq!(summary.proteins[0].protein, "B");
        assert_eq!(summary.proteins[0].outliers, 2);
        assert!((summary.undefined_fraction() - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_serialization() {
        let summary = summarize_scores(&create_scores(), 3.5).unwrap();

        let yaml = summary.to_yaml().unwrap();
        assert!(yaml.contains("n_proteins: 3"));

        let json = summary.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["undefined_scores"], 2);
    }

    #[test]
    fn test_summary_display() {
        let summary = summarize_scores(&create_scores(), 3.5).unwrap();
        let text = summary.to_string();
        assert!(text.contains("Proteins:          3"));
        assert!(text.contains("B: 2 outlying features"));
    }
}
