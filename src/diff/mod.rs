//! Diff extraction and normalization for the review pipeline.

pub mod extract;
pub mod model;
pub mod normalize;

pub use extract::DiffExtractor;
pub use model::{DiffClassification, PathFilterSet};
