//! Labelled protein-by-feature matrix and its tab-separated file format.

use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Cell contents of a gene matrix.
///
/// Tables whose value cells all parse as numbers are stored as a dense
/// matrix. Anything else is kept as the raw strings read from disk so the
/// table can still be passed through or written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// Dense numeric values (proteins × features).
    Numeric(DMatrix<f64>),
    /// Unparsed cells, one inner vector per protein.
    Raw(Vec<Vec<String>>),
}

/// A labelled matrix keyed by protein identifier.
///
/// Rows represent proteins, columns represent features. The first header
/// entry names the identifier column, so `headers.len() == n_features + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneMatrix {
    /// Column labels, identifier column first.
    headers: Vec<String>,
    /// Protein identifiers (row names). Not guaranteed unique.
    genelist: Vec<String>,
    /// Row-aligned values.
    values: Values,
}

impl GeneMatrix {
    /// Create a numeric GeneMatrix from a dense matrix and its labels.
    pub fn new(headers: Vec<String>, genelist: Vec<String>, data: DMatrix<f64>) -> Result<Self> {
        check_labels(&headers, &genelist, data.shape())?;
        Ok(Self {
            headers,
            genelist,
            values: Values::Numeric(data),
        })
    }

    /// Create a GeneMatrix from raw string cells.
    ///
    /// Cells are parsed as numbers when every one of them parses; otherwise
    /// the strings are kept verbatim.
    pub fn from_cells(
        headers: Vec<String>,
        genelist: Vec<String>,
        cells: Vec<Vec<String>>,
    ) -> Result<Self> {
        if headers.is_empty() {
            return Err(ProfileError::MalformedTable(
                "header row is empty".to_string(),
            ));
        }
        let n_features = headers.len() - 1;
        for (row, fields) in cells.iter().enumerate() {
            if fields.len() != n_features {
                return Err(ProfileError::MalformedTable(format!(
                    "row {} ('{}') has {} values, header declares {}",
                    row + 1,
                    genelist.get(row).map(String::as_str).unwrap_or(""),
                    fields.len(),
                    n_features
                )));
            }
        }
        if cells.len() != genelist.len() {
            return Err(ProfileError::MalformedTable(format!(
                "{} identifiers for {} rows",
                genelist.len(),
                cells.len()
            )));
        }

        let values = match parse_numeric(&cells, n_features) {
            Some(data) => Values::Numeric(data),
            None => {
                log::debug!("Table has non-numeric cells; keeping raw strings");
                Values::Raw(cells)
            }
        };

        Ok(Self {
            headers,
            genelist,
            values,
        })
    }

    /// Load a gene matrix from a TSV file.
    ///
    /// Expected format:
    /// - First row: `ID` followed by the feature names
    /// - Subsequent rows: protein identifier followed by one value per feature
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ProfileError::NotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        let mut records = reader.records();

        let headers: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(String::from).collect(),
            None => {
                return Err(ProfileError::MalformedTable(format!(
                    "{} has no header row",
                    path.display()
                )))
            }
        };

        let mut genelist = Vec::new();
        let mut cells = Vec::new();
        for (row_idx, record) in records.enumerate() {
            let record = record?;
            if record.len() != headers.len() {
                return Err(ProfileError::MalformedTable(format!(
                    "{}: line {} has {} fields, header has {}",
                    path.display(),
                    row_idx + 2,
                    record.len(),
                    headers.len()
                )));
            }
            genelist.push(record[0].to_string());
            cells.push(record.iter().skip(1).map(String::from).collect());
        }

        Self::from_cells(headers, genelist, cells)
    }

    /// Write the gene matrix to a TSV file.
    ///
    /// The table is written to a temporary file next to `path` and renamed
    /// into place, so an existing file is only replaced by a complete one.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        // same mode as File::create, before the umask
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut temp = builder.tempfile_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            writeln!(writer, "{}", self.headers.join("\t"))?;

            for (row, protein) in self.genelist.iter().enumerate() {
                write!(writer, "{}", protein)?;
                match &self.values {
                    Values::Numeric(data) => {
                        for col in 0..data.ncols() {
                            write!(writer, "\t{}", format_value(data[(row, col)]))?;
                        }
                    }
                    Values::Raw(cells) => {
                        for cell in &cells[row] {
                            write!(writer, "\t{}", cell)?;
                        }
                    }
                }
                writeln!(writer)?;
            }
            writer.flush()?;
        }
        temp.persist(path).map_err(|e| e.error)?;

        log::info!("Written to file {}", path.display());
        Ok(())
    }

    /// Column labels including the identifier column.
    #[inline]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Feature names (headers without the identifier column).
    #[inline]
    pub fn feature_names(&self) -> &[String] {
        &self.headers[1..]
    }

    /// Protein identifiers in row order.
    #[inline]
    pub fn genelist(&self) -> &[String] {
        &self.genelist
    }

    /// Number of proteins (rows).
    #[inline]
    pub fn n_proteins(&self) -> usize {
        self.genelist.len()
    }

    /// Number of features (columns).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.headers.len() - 1
    }

    /// Underlying cell values.
    #[inline]
    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Whether every value cell parsed as a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self.values, Values::Numeric(_))
    }

    /// The numeric matrix, or the first cell that failed to parse.
    pub fn numeric(&self) -> Result<&DMatrix<f64>> {
        match &self.values {
            Values::Numeric(data) => Ok(data),
            Values::Raw(cells) => Err(first_non_numeric(cells)),
        }
    }

    /// Row index of the first occurrence of each identifier.
    ///
    /// Later duplicates are ignored.
    pub fn first_occurrences(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.genelist.len());
        for (row, id) in self.genelist.iter().enumerate() {
            index.entry(id.as_str()).or_insert(row);
        }
        index
    }
}

fn check_labels(headers: &[String], genelist: &[String], shape: (usize, usize)) -> Result<()> {
    let (nrows, ncols) = shape;
    if headers.len() != ncols + 1 || genelist.len() != nrows {
        return Err(ProfileError::ShapeMismatch {
            context: "gene matrix labels",
            expected: (nrows, ncols),
            actual: (genelist.len(), headers.len().saturating_sub(1)),
        });
    }
    Ok(())
}

fn parse_numeric(cells: &[Vec<String>], n_features: usize) -> Option<DMatrix<f64>> {
    let mut data = DMatrix::zeros(cells.len(), n_features);
    for (row, fields) in cells.iter().enumerate() {
        for (col, field) in fields.iter().enumerate() {
            data[(row, col)] = field.trim().parse::<f64>().ok()?;
        }
    }
    Some(data)
}

fn first_non_numeric(cells: &[Vec<String>]) -> ProfileError {
    for (row, fields) in cells.iter().enumerate() {
        for (col, field) in fields.iter().enumerate() {
            if field.trim().parse::<f64>().is_err() {
                return ProfileError::NonNumeric {
                    value: field.clone(),
                    row,
                    col,
                };
            }
        }
    }
    ProfileError::MalformedTable("raw table has no unparseable cell".to_string())
}

/// Format a value the way downstream tools read it back.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        value.to_string()
    }
}
