//! Precomputed Gaussian spillover kernel.

use crate::grid::geometry::GridGeometry;

/// Log-density contribution as a function of integer cell distance.
///
/// Each point is modeled as a separable Gaussian over grid cells. Converting
/// sigma into a per-axis exponent factor once,
///
/// ```text
/// exp(-(d * step)^2 / 2 sigma^2) = exp(d^2 * factor),  factor = -step^2 / 2 sigma^2
/// ```
///
/// lets a squared cell distance map straight to a log density. The table
/// stores `ln(exp((di^2 + dj^2) * f_xy + dk^2 * f_z) + floor)` for every
/// distance triple within the spillover radii, so grid construction is pure
/// lookups. The kernel depends only on the step's geometry and is rebuilt
/// with it each step.
#[derive(Debug, Clone)]
pub struct SpilloverKernel {
    steps_xy: usize,
    steps_z: usize,
    values: Vec<f64>,
}

impl SpilloverKernel {
    /// Precompute the kernel table for one step's geometry.
    pub fn from_geometry(geometry: &GridGeometry) -> Self {
        let steps_xy = geometry.spillover_steps_xy;
        let steps_z = geometry.spillover_steps_z;

        let exp_factor_xy =
            -geometry.xy_step.powi(2) / (2.0 * geometry.sigma_xy.powi(2));
        let exp_factor_z = -geometry.z_step.powi(2) / (2.0 * geometry.sigma_z.powi(2));

        let floor = geometry.floor_density;
        let mut values = Vec::with_capacity((steps_xy + 1) * (steps_xy + 1) * (steps_z + 1));
        for i in 0..=steps_xy {
            let i_dist_sq = (i * i) as f64;
            for j in 0..=steps_xy {
                let j_dist_sq = (j * j) as f64;
                let log_xy_density = (i_dist_sq + j_dist_sq) * exp_factor_xy;
                for k in 0..=steps_z {
                    let k_dist_sq = (k * k) as f64;
                    let log_z_density = k_dist_sq * exp_factor_z;
                    values.push(((log_xy_density + log_z_density).exp() + floor).ln());
                }
            }
        }

        Self {
            steps_xy,
            steps_z,
            values,
        }
    }

    /// Horizontal radius of the table in cells.
    #[inline]
    pub fn steps_xy(&self) -> usize {
        self.steps_xy
    }

    /// Vertical radius of the table in cells.
    #[inline]
    pub fn steps_z(&self) -> usize {
        self.steps_z
    }

    /// Kernel value at absolute cell distances `(di, dj, dk)`.
    ///
    /// Distances are clamped to the table edge. In-radius lookups are always
    /// exact; the clamp is only reachable when a capped grid truncated the
    /// cloud and a nominal index fell outside the interior window.
    #[inline]
    pub fn value(&self, di: usize, dj: usize, dk: usize) -> f64 {
        let di = di.min(self.steps_xy);
        let dj = dj.min(self.steps_xy);
        let dk = dk.min(self.steps_z);
        self.values[(di * (self.steps_xy + 1) + dj) * (self.steps_z + 1) + dk]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point_cloud::Point3;
    use approx::assert_relative_eq;

    /// Hand-built geometry with sigmas chosen to give an xy radius of 2.
    fn test_geometry() -> GridGeometry {
        GridGeometry {
            origin: Point3::default(),
            xy_step: 0.05,
            z_step: 0.05,
            size_x: 20,
            size_y: 20,
            size_z: 20,
            sigma_xy: 0.06,
            sigma_z: 0.06,
            spillover_steps_xy: 2,
            spillover_steps_z: 2,
            discount_factor: 1.0,
            floor_density: 0.8,
        }
    }

    #[test]
    fn test_center_value_is_log_one_plus_floor() {
        let kernel = SpilloverKernel::from_geometry(&test_geometry());
        // Zero distance: exp(0) + floor = 1.8.
        assert_relative_eq!(kernel.value(0, 0, 0), 1.8f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_monotonic_falloff_with_distance() {
        let kernel = SpilloverKernel::from_geometry(&test_geometry());
        // Strictly decreasing along each axis (radius 2 gives two steps).
        assert!(kernel.value(0, 0, 0) > kernel.value(1, 0, 0));
        assert!(kernel.value(1, 0, 0) > kernel.value(2, 0, 0));
        assert!(kernel.value(0, 0, 0) > kernel.value(0, 0, 1));
        assert!(kernel.value(0, 0, 1) > kernel.value(0, 0, 2));
        // And with diagonal distance.
        assert!(kernel.value(1, 0, 0) > kernel.value(1, 1, 0));
        assert!(kernel.value(1, 1, 0) > kernel.value(2, 2, 0));
    }

    #[test]
    fn test_every_value_at_least_log_floor() {
        let geometry = test_geometry();
        let kernel = SpilloverKernel::from_geometry(&geometry);
        let log_floor = geometry.log_floor();
        for i in 0..=2 {
            for j in 0..=2 {
                for k in 0..=2 {
                    assert!(kernel.value(i, j, k) > log_floor);
                }
            }
        }
    }

    #[test]
    fn test_symmetric_in_i_and_j() {
        let kernel = SpilloverKernel::from_geometry(&test_geometry());
        assert_relative_eq!(kernel.value(1, 2, 0), kernel.value(2, 1, 0));
    }

    #[test]
    fn test_out_of_radius_lookup_clamps() {
        let kernel = SpilloverKernel::from_geometry(&test_geometry());
        assert_relative_eq!(kernel.value(10, 0, 0), kernel.value(2, 0, 0));
    }
}
