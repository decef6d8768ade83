//! Concatenation of several screens onto a master protein list.
//!
//! Each screen is re-indexed by the master list: proteins the screen does
//! not contain get a row of NaN, and feature names are prefixed with the
//! screen name so columns from different screens stay distinguishable.

use crate::data::GeneMatrix;
use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Header of the identifier column in concatenated output.
pub const PROTEIN_COLUMN: &str = "PROTEIN";

/// Screen name derived from a file path: the file name up to its first dot.
pub fn screen_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(String::from))
        .unwrap_or_default()
}

/// Read a master protein list, one identifier per line.
pub fn read_protein_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ProfileError::NotFound(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    reader
        .lines()
        .map(|line| line.map_err(ProfileError::from))
        .collect()
}

/// Concatenate named screens column-wise, ordered by `reference` proteins.
///
/// Identifiers in each screen are compared after stripping surrounding
/// spaces; the first matching row is used.
///
/// # Errors
/// - `InvalidParameter` when no screens are given
/// - `NonNumeric` when a screen holds unparsed cells
pub fn concat_screens(screens: &[(String, GeneMatrix)], reference: &[String]) -> Result<GeneMatrix> {
    if screens.is_empty() {
        return Err(ProfileError::InvalidParameter(
            "at least one screen is required".to_string(),
        ));
    }

    let n_total: usize = screens.iter().map(|(_, screen)| screen.n_features()).sum();
    let mut headers = Vec::with_capacity(n_total + 1);
    headers.push(PROTEIN_COLUMN.to_string());
    let mut data = DMatrix::from_element(reference.len(), n_total, f64::NAN);

    let mut offset = 0;
    for (name, screen) in screens {
        let values = screen.numeric()?;
        let index = trimmed_index(screen);

        let mut missing = 0usize;
        for (row, protein) in reference.iter().enumerate() {
            match index.get(protein.as_str()) {
                Some(&src) => {
                    for col in 0..values.ncols() {
                        data[(row, offset + col)] = values[(src, col)];
                    }
                }
                None => missing += 1,
            }
        }
        if missing > 0 {
            log::info!("{}: {} of {} proteins not found", name, missing, reference.len());
        }

        headers.extend(
            screen
                .feature_names()
                .iter()
                .map(|feature| format!("{}_{}", name, feature)),
        );
        offset += values.ncols();
    }

    GeneMatrix::new(headers, reference.to_vec(), data)
}

/// First row of each space-trimmed identifier in `screen`.
fn trimmed_index(screen: &GeneMatrix) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(screen.n_proteins());
    for (row, id) in screen.genelist().iter().enumerate() {
        index.entry(id.trim_matches(' ')).or_insert(row);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn screen(ids: &[&str], features: &[&str], values: &[f64]) -> GeneMatrix {
        let mut headers = vec!["ID".to_string()];
        headers.extend(features.iter().map(|f| f.to_string()));
        GeneMatrix::new(
            headers,
            ids.iter().map(|s| s.to_string()).collect(),
            DMatrix::from_row_slice(ids.len(), features.len(), values),
        )
        .unwrap()
    }

    #[test]
    fn test_screen_name() {
        assert_eq!(screen_name("/data/screens/rapamycin.profile.tsv"), "rapamycin");
        assert_eq!(screen_name("wt.txt"), "wt");
    }

    #[test]
    fn test_concat_fills_missing_with_nan() {
        let wt = screen(&["A", "B"], &["size"], &[1.0, 2.0]);
        let hu = screen(&[" B ", "C"], &["size", "ecc"], &[3.0, 4.0, 5.0, 6.0]);
        let reference: Vec<String> = vec!["A".into(), "B".into(), "C".into()];

        let merged = concat_screens(
            &[("wt".to_string(), wt), ("hu".to_string(), hu)],
            &reference,
        )
        .unwrap();

        assert_eq!(merged.headers(), &["PROTEIN", "wt_size", "hu_size", "hu_ecc"]);
        assert_eq!(merged.genelist(), reference.as_slice());

        let values = merged.numeric().unwrap();
        assert_eq!(values[(0, 0)], 1.0);
        assert!(values[(0, 1)].is_nan());
        assert!(values[(0, 2)].is_nan());
        assert_eq!(values[(1, 1)], 3.0);
        assert_eq!(values[(1, 2)], 4.0);
        assert!(values[(2, 0)].is_nan());
        assert_eq!(values[(2, 2)], 6.0);
    }

    #[test]
    fn test_concat_first_trimmed_match_wins() {
        let screen_a = screen(&[" A", "B", "A "], &["size"], &[1.0, 2.0, 3.0]);
        let reference: Vec<String> = vec!["B".into(), "A".into()];

        let merged = concat_screens(&[("a".to_string(), screen_a)], &reference).unwrap();
        let values = merged.numeric().unwrap();
        assert_eq!(values[(0, 0)], 2.0);
        assert_eq!(values[(1, 0)], 1.0);
    }

    #[test]
    fn test_concat_requires_screens() {
        let result = concat_screens(&[], &["A".to_string()]);
        assert!(matches!(result, Err(ProfileError::InvalidParameter(_))));
    }

    #[test]
    fn test_read_protein_list() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "YAL001C").unwrap();
        writeln!(file, "YAL002W").unwrap();
        file.flush().unwrap();

        let proteins = read_protein_list(file.path()).unwrap();
        assert_eq!(proteins, vec!["YAL001C", "YAL002W"]);
    }
}
