//! Tracker configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};

/// How candidate translations are enumerated over the search ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationPolicy {
    /// Collapse the vertical range to the single offset `z = 0` whenever the
    /// z step exceeds the magnitude of the lower z bound. With the step
    /// sizes this tracker is normally run at, that means no vertical offsets
    /// are ever evaluated.
    CollapseZ,

    /// Walk the full (x, y, z) lattice.
    Full3d,
}

/// Hard caps on density grid dimensions.
///
/// The grid is clamped to these maxima regardless of the scan's spatial
/// extent, bounding worst-case memory (~3.7 GB of f64 cells at the
/// defaults). An oversized request is truncated, not rejected: tracking
/// still proceeds over the clipped region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLimits {
    /// Maximum cells along x. At 1.2 cm resolution, 1000 cells cover a
    /// 10 m wide object.
    #[serde(default = "default_max_xy")]
    pub max_x: usize,
    /// Maximum cells along y.
    #[serde(default = "default_max_xy")]
    pub max_y: usize,
    /// Maximum cells along z. At 1.2 cm resolution, 500 cells cover a
    /// 5 m tall object.
    #[serde(default = "default_max_z")]
    pub max_z: usize,
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            max_x: default_max_xy(),
            max_y: default_max_xy(),
            max_z: default_max_z(),
        }
    }
}

/// Configuration for the density-grid tracker.
///
/// The defaults reproduce the measurement model this tracker was tuned with
/// on a Velodyne HDL-64E; fields exist so different sensors can be described
/// without recompiling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Number of points assumed to be statistically independent per object.
    /// Beyond this many, the measurement likelihood is discounted by
    /// `max_discount_points / point_count`.
    #[serde(default = "default_max_discount_points")]
    pub max_discount_points: f64,

    /// How far a point's density spills into neighboring cells, in sigmas.
    #[serde(default = "default_spillover_radius")]
    pub spillover_radius_sigmas: f64,

    /// Factor applied to the sensor resolution term of the measurement
    /// model. Each point is modeled as `exp(-x^2 / 2 sigma^2)` with
    /// `sigma^2 = (sensor_resolution * sigma_factor)^2 + other terms`.
    #[serde(default = "default_sigma_factor")]
    pub sigma_factor: f64,

    /// Factor applied to the sampling (grid step) term of the measurement
    /// model.
    #[serde(default = "default_sigma_grid_factor")]
    pub sigma_grid_factor: f64,

    /// Sensor noise independent of the distance to the tracked object
    /// (meters).
    #[serde(default = "default_min_measurement_variance")]
    pub min_measurement_variance: f64,

    /// Smoothing constant added to the Gaussian before taking the log, so
    /// that no cell ever implies zero probability.
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f64,

    /// Base multiplier on the measurement log-likelihood, applied on top of
    /// the point-count discount.
    #[serde(default = "default_measurement_discount")]
    pub measurement_discount_factor: f64,

    /// Horizontal angular resolution of the sensor (degrees). 0.18 is the
    /// Velodyne HDL-64E at 10 Hz.
    #[serde(default = "default_horizontal_resolution_deg")]
    pub horizontal_resolution_deg: f64,

    /// Vertical resolution as a multiple of the horizontal resolution.
    #[serde(default = "default_vertical_resolution_factor")]
    pub vertical_resolution_factor: f64,

    /// Hard caps on grid dimensions.
    #[serde(default)]
    pub grid_limits: GridLimits,

    /// Candidate enumeration policy.
    #[serde(default = "default_enumeration")]
    pub enumeration: EnumerationPolicy,

    /// Whether to score candidates in parallel (rayon). Each candidate only
    /// reads the shared grid, so the search is an order-preserving parallel
    /// map.
    #[serde(default)]
    pub use_parallel: bool,
}

fn default_max_discount_points() -> f64 {
    150.0
}

fn default_spillover_radius() -> f64 {
    2.0
}

fn default_sigma_factor() -> f64 {
    0.5
}

fn default_sigma_grid_factor() -> f64 {
    1.0
}

fn default_min_measurement_variance() -> f64 {
    0.03
}

fn default_smoothing_factor() -> f64 {
    0.8
}

fn default_measurement_discount() -> f64 {
    1.0
}

fn default_horizontal_resolution_deg() -> f64 {
    0.18
}

fn default_vertical_resolution_factor() -> f64 {
    2.2
}

fn default_max_xy() -> usize {
    1000
}

fn default_max_z() -> usize {
    500
}

fn default_enumeration() -> EnumerationPolicy {
    EnumerationPolicy::CollapseZ
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_discount_points: default_max_discount_points(),
            spillover_radius_sigmas: default_spillover_radius(),
            sigma_factor: default_sigma_factor(),
            sigma_grid_factor: default_sigma_grid_factor(),
            min_measurement_variance: default_min_measurement_variance(),
            smoothing_factor: default_smoothing_factor(),
            measurement_discount_factor: default_measurement_discount(),
            horizontal_resolution_deg: default_horizontal_resolution_deg(),
            vertical_resolution_factor: default_vertical_resolution_factor(),
            grid_limits: GridLimits::default(),
            enumeration: default_enumeration(),
            use_parallel: false,
        }
    }
}

impl TrackerConfig {
    /// Check that every field describes a usable measurement model.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_discount_points", self.max_discount_points),
            ("spillover_radius_sigmas", self.spillover_radius_sigmas),
            ("sigma_factor", self.sigma_factor),
            ("min_measurement_variance", self.min_measurement_variance),
            ("smoothing_factor", self.smoothing_factor),
            ("measurement_discount_factor", self.measurement_discount_factor),
            ("horizontal_resolution_deg", self.horizontal_resolution_deg),
            ("vertical_resolution_factor", self.vertical_resolution_factor),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrackError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if !self.sigma_grid_factor.is_finite() || self.sigma_grid_factor < 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "sigma_grid_factor must be non-negative and finite, got {}",
                self.sigma_grid_factor
            )));
        }
        let limits = self.grid_limits;
        if limits.max_x == 0 || limits.max_y == 0 || limits.max_z == 0 {
            return Err(TrackError::InvalidConfig(
                "grid_limits must be at least 1 cell per axis".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_matches_hdl64e_tuning() {
        let config = TrackerConfig::default();
        assert_eq!(config.max_discount_points, 150.0);
        assert_eq!(config.spillover_radius_sigmas, 2.0);
        assert_eq!(config.smoothing_factor, 0.8);
        assert_eq!(config.grid_limits.max_x, 1000);
        assert_eq!(config.grid_limits.max_z, 500);
        assert_eq!(config.enumeration, EnumerationPolicy::CollapseZ);
        assert!(!config.use_parallel);
    }

    #[test]
    fn test_rejects_non_positive_fields() {
        let mut config = TrackerConfig::default();
        config.smoothing_factor = 0.0;
        assert!(config.validate().is_err());

        let mut config = TrackerConfig::default();
        config.sigma_factor = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = TrackerConfig::default();
        config.grid_limits.max_z = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: TrackerConfig = serde_json::from_str(r#"{"use_parallel": true}"#).unwrap();
        assert!(config.use_parallel);
        assert_eq!(config.max_discount_points, 150.0);
        assert_eq!(config.enumeration, EnumerationPolicy::CollapseZ);
    }
}
