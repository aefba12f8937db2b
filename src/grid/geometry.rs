//! Per-step grid geometry derived from the previous scan and sensor physics.

use crate::config::TrackerConfig;
use crate::core::point_cloud::{Point3, PointCloud3};
use crate::error::{Result, TrackError};

/// Margin added to the min corner so points sitting exactly on a cell
/// boundary round into the grid.
const PADDING_EPSILON: f64 = 1e-4;

/// Placement, resolution, and uncertainty parameters of one density grid.
///
/// Computed once per tracking step from the previous scan, then threaded
/// immutably through grid construction and candidate scoring.
///
/// The grid dimensions are clamped to [`TrackerConfig::grid_limits`], which
/// bounds worst-case memory independent of the scan's extent. A scan wider
/// than the cap is tracked over a truncated region; this is an intentional
/// approximation, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Minimum corner of the grid in world coordinates, already padded.
    pub origin: Point3,
    /// Horizontal cell size in meters.
    pub xy_step: f64,
    /// Vertical cell size in meters.
    pub z_step: f64,
    /// Grid cells along x (1 ..= max_x).
    pub size_x: usize,
    /// Grid cells along y (1 ..= max_y).
    pub size_y: usize,
    /// Grid cells along z (1 ..= max_z).
    pub size_z: usize,
    /// Combined horizontal measurement uncertainty (meters).
    pub sigma_xy: f64,
    /// Combined vertical measurement uncertainty (meters).
    pub sigma_z: f64,
    /// Horizontal spillover radius in cells (may be 0).
    pub spillover_steps_xy: usize,
    /// Vertical spillover radius in cells (always >= 1).
    pub spillover_steps_z: usize,
    /// Multiplier on the summed measurement log-likelihood, compensating
    /// for non-independence of dense point sets.
    pub discount_factor: f64,
    /// Smoothing constant added before taking logs; no cell ever implies
    /// zero probability.
    pub floor_density: f64,
}

impl GridGeometry {
    /// Derive the geometry for one tracking step.
    ///
    /// `previous` is the scan the density grid will be built from,
    /// `sensor_distance` the horizontal range from the sensor to the tracked
    /// object, and `downsample_factor` how much the caller downsampled the
    /// scan (it sharpens the effective sensor resolution).
    ///
    /// Fails fast with [`TrackError::InvalidConfig`] on zero or negative
    /// step sizes before anything is divided by them.
    pub fn compute(
        previous: &PointCloud3,
        config: &TrackerConfig,
        xy_step: f64,
        z_step: f64,
        sensor_distance: f64,
        downsample_factor: f64,
    ) -> Result<GridGeometry> {
        if !xy_step.is_finite() || xy_step <= 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "xy step must be positive and finite, got {xy_step}"
            )));
        }
        if !z_step.is_finite() || z_step <= 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "z step must be positive and finite, got {z_step}"
            )));
        }
        if !downsample_factor.is_finite() || downsample_factor <= 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "downsample factor must be positive and finite, got {downsample_factor}"
            )));
        }
        if !sensor_distance.is_finite() || sensor_distance < 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "sensor distance must be non-negative and finite, got {sensor_distance}"
            )));
        }

        // An empty previous scan degrades to a degenerate box at the origin;
        // the grid stays at floor density and scores collapse to the prior.
        let (raw_min, raw_max) = previous
            .bounds()
            .unwrap_or((Point3::default(), Point3::default()));

        // Two cells of padding per side: the outer shell stays at floor
        // density and represents the free space around the tracked object.
        let mut min = raw_min;
        let mut max = raw_max;
        min.x -= 2.0 * xy_step + PADDING_EPSILON;
        min.y -= 2.0 * xy_step + PADDING_EPSILON;

        // When the vertical step is coarser than the object's vertical
        // extent, shift the padding so the object sits centered in its cell
        // instead of biased toward one edge.
        let z_extent = raw_max.z - raw_min.z;
        let z_centering = (z_step - z_extent).abs() / 2.0;
        min.z -= 2.0 * z_step + z_centering;

        max.x += 2.0 * xy_step;
        max.y += 2.0 * xy_step;
        max.z += 2.0 * z_step;

        let limits = config.grid_limits;
        let size_x = (((max.x - min.x) / xy_step).ceil().max(1.0) as usize).min(limits.max_x);
        let size_y = (((max.y - min.y) / xy_step).ceil().max(1.0) as usize).min(limits.max_y);
        let size_z = (((max.z - min.z) / z_step).ceil().max(1.0) as usize).min(limits.max_z);

        // Effective linear sensor resolution at the object's range: the
        // angular resolution converted via 2*d*tan(half angle), sharpened by
        // the downsample factor.
        let half_angle = (config.horizontal_resolution_deg / 2.0).to_radians();
        let horizontal_res = 2.0 * sensor_distance * half_angle.tan() / downsample_factor;
        let vertical_res = config.vertical_resolution_factor * horizontal_res;

        // Three independent error sources per axis, combined in quadrature.
        let sampling_error_xy = config.sigma_grid_factor * xy_step;
        let resolution_error_xy = horizontal_res * config.sigma_factor;
        let noise_error = config.min_measurement_variance;
        let sigma_xy = (sampling_error_xy.powi(2)
            + resolution_error_xy.powi(2)
            + noise_error.powi(2))
        .sqrt();

        // No vertical sampling term; the tuned model treats the z step as
        // centering error, handled by z_centering above.
        let resolution_error_z = vertical_res * config.sigma_factor;
        let sigma_z = (resolution_error_z.powi(2) + noise_error.powi(2)).sqrt();

        // Number of whole cells the Gaussian reaches beyond the center cell.
        // Vertical spillover must reach at least the adjacent layer; the
        // grid builder has a dedicated fast path for exactly 1.
        let radius = config.spillover_radius_sigmas;
        let spillover_steps_xy = (radius * sigma_xy / xy_step - 1.0).ceil().max(0.0) as usize;
        let spillover_steps_z = (radius * sigma_z / z_step - 1.0).ceil().max(1.0) as usize;

        // Beyond max_discount_points, points are no longer treated as
        // independent evidence.
        let num_points = previous.len() as f64;
        let discount_factor = if num_points < config.max_discount_points {
            config.measurement_discount_factor
        } else {
            config.measurement_discount_factor * config.max_discount_points / num_points
        };

        let geometry = GridGeometry {
            origin: min,
            xy_step,
            z_step,
            size_x,
            size_y,
            size_z,
            sigma_xy,
            sigma_z,
            spillover_steps_xy,
            spillover_steps_z,
            discount_factor,
            floor_density: config.smoothing_factor,
        };

        log::debug!(
            "grid geometry: {}x{}x{} cells, sigma_xy={:.4} sigma_z={:.4}, \
             spillover {}x{} cells, discount {:.3}",
            geometry.size_x,
            geometry.size_y,
            geometry.size_z,
            geometry.sigma_xy,
            geometry.sigma_z,
            geometry.spillover_steps_xy,
            geometry.spillover_steps_z,
            geometry.discount_factor,
        );

        Ok(geometry)
    }

    /// Log of the floor density, the baseline value of every cell.
    #[inline]
    pub fn log_floor(&self) -> f64 {
        self.floor_density.ln()
    }

    /// Total number of cells in the active grid.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.size_x * self.size_y * self.size_z
    }

    /// Nominal cell index of a point: `round(coord/step + offset)` per axis,
    /// with `offset = -origin/step`. Unclamped; callers clamp to the window
    /// they need.
    #[inline]
    pub fn cell_of(&self, point: &Point3) -> (i64, i64, i64) {
        let ix = (point.x / self.xy_step - self.origin.x / self.xy_step).round() as i64;
        let iy = (point.y / self.xy_step - self.origin.y / self.xy_step).round() as i64;
        let iz = (point.z / self.z_step - self.origin.z / self.z_step).round() as i64;
        (ix, iy, iz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube_cloud(n_per_edge: usize, size: f64) -> PointCloud3 {
        let mut cloud = PointCloud3::new();
        for i in 0..n_per_edge {
            for j in 0..n_per_edge {
                for k in 0..n_per_edge {
                    let s = size / (n_per_edge - 1) as f64;
                    cloud.push_xyz(i as f64 * s, j as f64 * s, k as f64 * s);
                }
            }
        }
        cloud
    }

    fn flat_cloud(n: usize) -> PointCloud3 {
        let mut cloud = PointCloud3::new();
        for i in 0..n {
            cloud.push_xyz(i as f64 * 0.01, 0.0, 0.0);
        }
        cloud
    }

    #[test]
    fn test_rejects_degenerate_steps() {
        let cloud = cube_cloud(3, 1.0);
        let config = TrackerConfig::default();
        assert!(GridGeometry::compute(&cloud, &config, 0.0, 0.1, 5.0, 1.0).is_err());
        assert!(GridGeometry::compute(&cloud, &config, -0.1, 0.1, 5.0, 1.0).is_err());
        assert!(GridGeometry::compute(&cloud, &config, 0.1, f64::NAN, 5.0, 1.0).is_err());
        assert!(GridGeometry::compute(&cloud, &config, 0.1, 0.1, 5.0, 0.0).is_err());
        assert!(GridGeometry::compute(&cloud, &config, 0.1, 0.1, -1.0, 1.0).is_err());
    }

    #[test]
    fn test_discount_factor_thresholds() {
        let config = TrackerConfig::default();
        for (n, expected) in [(10usize, 1.0), (150, 1.0), (300, 0.5)] {
            let cloud = flat_cloud(n);
            let geometry =
                GridGeometry::compute(&cloud, &config, 0.05, 0.05, 5.0, 1.0).unwrap();
            assert_relative_eq!(geometry.discount_factor, expected);
        }
    }

    #[test]
    fn test_sizes_cover_padded_bounds() {
        let cloud = cube_cloud(5, 1.0);
        let config = TrackerConfig::default();
        let geometry = GridGeometry::compute(&cloud, &config, 0.1, 0.1, 5.0, 1.0).unwrap();

        // 1 m extent + 4 steps of padding (+ epsilon) at 0.1 m resolution.
        assert_eq!(geometry.size_x, 15);
        assert_eq!(geometry.size_y, 15);
        // z additionally gets |z_step - z_extent| / 2 = 0.45 m of centering.
        assert!(geometry.size_z >= 18 && geometry.size_z <= 20);

        // Origin is padded below the cloud minimum.
        assert!(geometry.origin.x < 0.0);
        assert!(geometry.origin.y < 0.0);
        assert!(geometry.origin.z < 0.0);
    }

    #[test]
    fn test_dimensions_capped_for_pathological_extent() {
        let mut cloud = PointCloud3::new();
        cloud.push_xyz(0.0, 0.0, 0.0);
        cloud.push_xyz(10_000.0, 10_000.0, 10_000.0);
        let config = TrackerConfig::default();

        let geometry = GridGeometry::compute(&cloud, &config, 0.01, 0.01, 5.0, 1.0).unwrap();
        assert_eq!(geometry.size_x, 1000);
        assert_eq!(geometry.size_y, 1000);
        assert_eq!(geometry.size_z, 500);
    }

    #[test]
    fn test_empty_cloud_degrades_gracefully() {
        let cloud = PointCloud3::new();
        let config = TrackerConfig::default();
        let geometry = GridGeometry::compute(&cloud, &config, 0.1, 0.1, 5.0, 1.0).unwrap();

        // Degenerate box at the origin, padding only.
        assert!(geometry.size_x >= 4);
        assert_relative_eq!(geometry.discount_factor, 1.0);
    }

    #[test]
    fn test_vertical_spillover_at_least_one() {
        // Huge z step relative to sigma would give radius 0 without the clamp.
        let cloud = cube_cloud(3, 1.0);
        let config = TrackerConfig::default();
        let geometry = GridGeometry::compute(&cloud, &config, 0.05, 1.0, 5.0, 1.0).unwrap();
        assert!(geometry.spillover_steps_z >= 1);
    }

    #[test]
    fn test_sigma_quadrature() {
        let cloud = cube_cloud(3, 1.0);
        let config = TrackerConfig::default();
        let geometry = GridGeometry::compute(&cloud, &config, 0.05, 0.05, 5.0, 1.0).unwrap();

        // sigma_xy must dominate each of its three components.
        let sampling = config.sigma_grid_factor * 0.05;
        assert!(geometry.sigma_xy >= sampling);
        assert!(geometry.sigma_xy >= config.min_measurement_variance);
        // And be below their sum.
        assert!(geometry.sigma_xy <= sampling + 0.1 + config.min_measurement_variance);

        // Downsampling sharpens resolution, shrinking sigma.
        let downsampled =
            GridGeometry::compute(&cloud, &config, 0.05, 0.05, 5.0, 4.0).unwrap();
        assert!(downsampled.sigma_xy < geometry.sigma_xy);
        assert!(downsampled.sigma_z < geometry.sigma_z);
    }

    #[test]
    fn test_cell_of_roundtrips_origin() {
        let cloud = cube_cloud(3, 1.0);
        let config = TrackerConfig::default();
        let geometry = GridGeometry::compute(&cloud, &config, 0.1, 0.1, 5.0, 1.0).unwrap();

        // The cloud minimum lands strictly inside the grid (2 padding cells).
        let (ix, iy, iz) = geometry.cell_of(&Point3::new(0.0, 0.0, 0.0));
        assert!(ix >= 1 && (ix as usize) < geometry.size_x - 1);
        assert!(iy >= 1 && (iy as usize) < geometry.size_y - 1);
        assert!(iz >= 1 && (iz as usize) < geometry.size_z - 1);
    }
}
