//! Candidate enumeration, scoring, and the tracker entry point.

pub mod candidates;
pub mod scorer;
pub mod tracker;

pub use candidates::enumerate_transforms;
pub use scorer::TransformScorer;
pub use tracker::{AlignmentRequest, DensityGridTracker};
