//! Density-grid tracker entry point.

use crate::config::TrackerConfig;
use crate::core::motion::MotionModel;
use crate::core::point_cloud::{Point3, PointCloud3};
use crate::core::transforms::ScoredTransforms;
use crate::error::Result;
use crate::grid::density::DensityGrid;
use crate::grid::geometry::GridGeometry;
use crate::grid::kernel::SpilloverKernel;
use crate::tracking::candidates::enumerate_transforms;
use crate::tracking::scorer::TransformScorer;

/// One tracking step's inputs.
///
/// Both clouds are borrowed read-only; the caller keeps ownership.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentRequest<'a> {
    /// Horizontal resolution of both the search lattice and the grid.
    pub xy_step: f64,
    /// Vertical resolution of both the search lattice and the grid.
    pub z_step: f64,
    /// Inclusive x search range for candidate offsets, in meters.
    pub x_range: (f64, f64),
    /// Inclusive y search range.
    pub y_range: (f64, f64),
    /// Inclusive z search range (subject to the enumeration policy).
    pub z_range: (f64, f64),
    /// The current scan of the tracked object.
    pub current: &'a PointCloud3,
    /// The previous scan, which the density grid is built from.
    pub previous: &'a PointCloud3,
    /// Centroid of the current scan. Carried for callers that precompute it
    /// for other alignment backends; the density scorer does not read it.
    pub current_centroid: Point3,
    /// Horizontal distance from the sensor to the tracked object, in meters.
    pub sensor_distance: f64,
    /// How much the caller downsampled the scans (1.0 = not at all).
    pub downsample_factor: f64,
}

/// The density-grid tracker.
///
/// Owns the tracker configuration and a recycled grid buffer; everything
/// else is step-scoped. Two calls with identical inputs produce identical
/// output: the buffer is the only state that survives a step, and its active
/// region is fully reinitialized on every build.
#[derive(Debug, Default)]
pub struct DensityGridTracker {
    config: TrackerConfig,
    /// Grid buffer reused across steps (grow-only).
    grid_buffer: Vec<f64>,
}

impl DensityGridTracker {
    /// Create a tracker with the given configuration.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            grid_buffer: Vec::new(),
        }
    }

    /// Create a tracker with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TrackerConfig::default())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Score every candidate translation between the previous and current
    /// scans.
    ///
    /// Builds the density grid from the previous scan, enumerates the
    /// candidate lattice, and scores each candidate by combining the
    /// measurement likelihood with `motion_model`'s prior. The returned
    /// collection preserves enumeration order; it is up to the caller to
    /// select or fuse.
    pub fn track<M: MotionModel>(
        &mut self,
        request: &AlignmentRequest<'_>,
        motion_model: &M,
    ) -> Result<ScoredTransforms> {
        self.config.validate()?;

        let candidates = enumerate_transforms(
            request.xy_step,
            request.z_step,
            request.x_range,
            request.y_range,
            request.z_range,
            self.config.enumeration,
        )?;

        let geometry = GridGeometry::compute(
            request.previous,
            &self.config,
            request.xy_step,
            request.z_step,
            request.sensor_distance,
            request.downsample_factor,
        )?;
        let kernel = SpilloverKernel::from_geometry(&geometry);

        let buffer = std::mem::take(&mut self.grid_buffer);
        let grid = DensityGrid::build_into(&geometry, &kernel, request.previous, buffer);

        log::debug!(
            "scoring {} candidates: {} current points against {} grid cells",
            candidates.len(),
            request.current.len(),
            grid.len(),
        );

        let scorer = TransformScorer::new(&grid, &geometry, request.current);
        let result = scorer.score_all(&candidates, motion_model, self.config.use_parallel);

        // Recover the buffer for the next step, error or not.
        self.grid_buffer = grid.into_buffer();
        result
    }
}
