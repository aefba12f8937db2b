//! Density grid: per-step geometry, the spillover kernel, and grid storage.
//!
//! The grid models where the previous scan's points plausibly occupy space.
//! [`geometry::GridGeometry`] derives the grid's placement and uncertainty
//! parameters from the scan's bounding box and the sensor physics;
//! [`kernel::SpilloverKernel`] precomputes the Gaussian log-density falloff
//! per integer cell distance; [`density::DensityGrid`] is the populated
//! bounded 3D array the scorer reads.
//!
//! All three are step-scoped values: rebuilt for every tracking call and
//! immutable once built, so scoring can read them from any thread.

pub mod density;
pub mod geometry;
pub mod kernel;

pub use density::DensityGrid;
pub use geometry::GridGeometry;
pub use kernel::SpilloverKernel;
