//! Per-feature differences between aligned screens.

pub mod subtract;

pub use subtract::difference;
