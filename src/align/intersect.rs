//! Intersection of a reference and a condition screen.

use crate::data::GeneMatrix;
use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;

/// Two screens reduced to the same ordered set of proteins.
///
/// Row `i` of `reference` and `condition` both describe `proteins[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    /// Shared protein identifiers, ascending.
    pub proteins: Vec<String>,
    /// Reference rows (proteins × features).
    pub reference: DMatrix<f64>,
    /// Condition rows (proteins × features).
    pub condition: DMatrix<f64>,
}

impl AlignedPair {
    /// Number of shared proteins.
    pub fn n_proteins(&self) -> usize {
        self.proteins.len()
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.reference.ncols()
    }
}

/// Align a reference and a condition screen on their shared proteins.
///
/// The shared identifiers are sorted ascending so every downstream output is
/// indexed in the same reproducible order. When an identifier occurs more
/// than once in a screen, its first row is used and later rows are dropped.
///
/// # Errors
/// - `NonNumeric` if either screen holds unparsed cells
/// - `ShapeMismatch` if the screens disagree on the number of features
/// - `EmptyIntersection` if no protein appears in both screens
pub fn align(reference: &GeneMatrix, condition: &GeneMatrix) -> Result<AlignedPair> {
    let ref_data = reference.numeric()?;
    let cond_data = condition.numeric()?;

    if ref_data.ncols() != cond_data.ncols() {
        return Err(ProfileError::ShapeMismatch {
            context: "align",
            expected: (reference.n_proteins(), ref_data.ncols()),
            actual: (condition.n_proteins(), cond_data.ncols()),
        });
    }

    let ref_index = reference.first_occurrences();
    let cond_index = condition.first_occurrences();
    log_duplicates("reference", reference.n_proteins(), ref_index.len());
    log_duplicates("condition", condition.n_proteins(), cond_index.len());

    let mut shared: Vec<&str> = ref_index
        .keys()
        .filter(|id| cond_index.contains_key(*id))
        .copied()
        .collect();
    if shared.is_empty() {
        return Err(ProfileError::EmptyIntersection);
    }
    shared.sort_unstable();

    let ref_rows: Vec<usize> = shared.iter().map(|id| ref_index[id]).collect();
    let cond_rows: Vec<usize> = shared.iter().map(|id| cond_index[id]).collect();

    log::info!(
        "Aligned {} shared proteins ({} reference, {} condition)",
        shared.len(),
        reference.n_proteins(),
        condition.n_proteins()
    );

    Ok(AlignedPair {
        proteins: shared.into_iter().map(String::from).collect(),
        reference: ref_data.select_rows(ref_rows.iter()),
        condition: cond_data.select_rows(cond_rows.iter()),
    })
}

fn log_duplicates(label: &str, n_rows: usize, n_unique: usize) {
    if n_rows > n_unique {
        log::debug!(
            "{} duplicate identifier rows in {} ignored; first occurrence kept",
            n_rows - n_unique,
            label
        );
    }
}
