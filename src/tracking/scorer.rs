//! Candidate scoring against the density grid.

use rayon::prelude::*;

use crate::core::motion::MotionModel;
use crate::core::point_cloud::PointCloud3;
use crate::core::transforms::{ScoredTransform, ScoredTransforms, XyzTransform};
use crate::error::{Result, TrackError};
use crate::grid::density::DensityGrid;
use crate::grid::geometry::GridGeometry;

/// Scores candidate translations of the current scan against the density
/// grid built from the previous scan.
///
/// Read-only over the grid: every candidate's evaluation is independent,
/// which makes the search an order-preserving parallel map when
/// `use_parallel` is set.
pub struct TransformScorer<'a> {
    grid: &'a DensityGrid,
    geometry: &'a GridGeometry,
    points: &'a PointCloud3,
}

impl<'a> TransformScorer<'a> {
    /// Create a scorer for one tracking step.
    pub fn new(
        grid: &'a DensityGrid,
        geometry: &'a GridGeometry,
        points: &'a PointCloud3,
    ) -> Self {
        Self {
            grid,
            geometry,
            points,
        }
    }

    /// Score every candidate, preserving enumeration order.
    pub fn score_all<M: MotionModel>(
        &self,
        candidates: &[XyzTransform],
        motion_model: &M,
        use_parallel: bool,
    ) -> Result<ScoredTransforms> {
        let scored: Vec<ScoredTransform> = if use_parallel {
            candidates
                .par_iter()
                .map(|t| self.score_candidate(t, motion_model))
                .collect::<Result<_>>()?
        } else {
            candidates
                .iter()
                .map(|t| self.score_candidate(t, motion_model))
                .collect::<Result<_>>()?
        };
        Ok(scored.into())
    }

    /// Score a single candidate translation.
    ///
    /// Shifts every point of the current scan by the candidate offset, looks
    /// up its log density (clamped to the grid, so out-of-range points land
    /// on floor-density boundary cells instead of being dropped), and fuses
    /// the discounted sum with the motion-model prior:
    ///
    /// ```text
    /// log_prob = ln(motion_prob) + discount * total_log_density
    /// ```
    pub fn score_candidate<M: MotionModel>(
        &self,
        transform: &XyzTransform,
        motion_model: &M,
    ) -> Result<ScoredTransform> {
        let g = self.geometry;

        // Per-axis shift, in cells, applied to every point of the scan.
        let x_offset = (transform.x - g.origin.x) / g.xy_step;
        let y_offset = (transform.y - g.origin.y) / g.xy_step;
        let z_offset = (transform.z - g.origin.z) / g.z_step;

        let mut total_log_density = 0.0;
        for p in self.points {
            let ix = (p.x / g.xy_step + x_offset).round() as i64;
            let iy = (p.y / g.xy_step + y_offset).round() as i64;
            let iz = (p.z / g.z_step + z_offset).round() as i64;
            total_log_density += self.grid.value_clamped(ix, iy, iz);
        }

        let motion_prob = motion_model.compute_score(transform.x, transform.y, transform.z);
        if !motion_prob.is_finite() || motion_prob <= 0.0 {
            return Err(TrackError::MotionModel {
                dx: transform.x,
                dy: transform.y,
                dz: transform.z,
                prob: motion_prob,
            });
        }

        let log_prob = motion_prob.ln() + g.discount_factor * total_log_density;
        Ok(ScoredTransform::new(*transform, log_prob))
    }
}
