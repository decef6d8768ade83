//! Data structures for protein change profiling.

mod gene_matrix;

pub use gene_matrix::{GeneMatrix, Values};
