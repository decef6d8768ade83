//! Row alignment of screens by protein identifier.
//!
//! - **intersect**: reduce a reference/condition pair to their shared proteins
//! - **concat**: re-index several screens onto a master protein list

pub mod concat;
pub mod intersect;

pub use concat::{concat_screens, read_protein_list, screen_name};
pub use intersect::{align, AlignedPair};
