//! Error types for DhruvaTrack.

use thiserror::Error;

/// DhruvaTrack error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    /// A step size, range, or config field is unusable (zero, negative,
    /// inverted, or non-finite). Raised before any grid allocation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The motion model returned a probability outside (0, 1]. Its log is
    /// undefined, so this surfaces as an error instead of a -inf score.
    #[error("Motion model returned non-positive probability {prob} at offset ({dx}, {dy}, {dz})")]
    MotionModel {
        /// Candidate x offset that triggered the failure.
        dx: f64,
        /// Candidate y offset that triggered the failure.
        dy: f64,
        /// Candidate z offset that triggered the failure.
        dz: f64,
        /// The offending probability.
        prob: f64,
    },
}

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, TrackError>;
