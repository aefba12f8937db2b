//! # DhruvaTrack
//!
//! Probabilistic scan alignment for 3D point-cloud object tracking.
//!
//! Given two consecutive scans of a tracked object (e.g. segmented out of a
//! spinning-lidar frame), DhruvaTrack estimates the rigid translation between
//! them as a *distribution*: every candidate translation on a search lattice
//! is scored with a log-probability that combines a measurement likelihood
//! with a motion-model prior. Downstream consumers can pick the maximum or
//! fuse the whole distribution into a velocity estimate.
//!
//! ## Pipeline
//!
//! ```text
//! previous scan ──► GridGeometry ──► SpilloverKernel ──► DensityGrid
//!                                                            │
//! search ranges ──► enumerate_transforms ─────────────► TransformScorer ──► ScoredTransforms
//!                                                            ▲
//! current scan ──────────────────────────────────────────────┘
//! ```
//!
//! The density grid is a bounded 3D array of log densities built once per
//! tracking step from the previous scan: each point splats a precomputed
//! Gaussian kernel into its neighborhood, and overlapping contributions are
//! combined with `max` rather than `+`. Scoring a candidate then reduces to
//! shifting the current scan and summing grid lookups.
//!
//! ## Quick Start
//!
//! ```rust
//! use dhruva_track::{
//!     AlignmentRequest, ConstantMotionModel, DensityGridTracker, Point3, PointCloud3,
//!     TrackerConfig,
//! };
//!
//! let mut previous = PointCloud3::new();
//! let mut current = PointCloud3::new();
//! for i in 0..10 {
//!     let t = i as f64 * 0.1;
//!     previous.push(Point3::new(t, t * 0.5, 0.2));
//!     current.push(Point3::new(t + 0.05, t * 0.5, 0.2));
//! }
//!
//! let mut tracker = DensityGridTracker::new(TrackerConfig::default());
//! let request = AlignmentRequest {
//!     xy_step: 0.05,
//!     z_step: 0.05,
//!     x_range: (-0.25, 0.25),
//!     y_range: (-0.25, 0.25),
//!     z_range: (-0.025, 0.025),
//!     current: &current,
//!     previous: &previous,
//!     current_centroid: current.centroid().unwrap(),
//!     sensor_distance: 5.0,
//!     downsample_factor: 1.0,
//! };
//! let scored = tracker.track(&request, &ConstantMotionModel::new(1.0)).unwrap();
//! let best = scored.best().unwrap();
//! assert!(best.transform.x < 0.0); // current is shifted +x, so the correction is -x
//! ```
//!
//! ## Scope
//!
//! Only translation is estimated; rotation, multi-object association, and
//! point-cloud preprocessing live upstream. The motion model is a
//! caller-supplied collaborator behind the [`MotionModel`] trait.

#![warn(missing_docs)]

// Core types (no internal deps)
pub mod core;

// Density grid: geometry, spillover kernel, storage
pub mod grid;

// Candidate enumeration and scoring
pub mod tracking;

// Tracker configuration
pub mod config;

// Error types
pub mod error;

pub use config::{EnumerationPolicy, GridLimits, TrackerConfig};
pub use error::{Result, TrackError};

pub use crate::core::motion::{ConstantMotionModel, MotionModel};
pub use crate::core::point_cloud::{Point3, PointCloud3};
pub use crate::core::transforms::{ScoredTransform, ScoredTransforms, XyzTransform};

pub use grid::density::DensityGrid;
pub use grid::geometry::GridGeometry;
pub use grid::kernel::SpilloverKernel;

pub use tracking::candidates::enumerate_transforms;
pub use tracking::scorer::TransformScorer;
pub use tracking::tracker::{AlignmentRequest, DensityGridTracker};
