//! Bounded 3D density grid built from the previous scan.

use crate::core::point_cloud::PointCloud3;
use crate::grid::geometry::GridGeometry;
use crate::grid::kernel::SpilloverKernel;

/// A 3D array of log densities modeling where the previous scan's points
/// plausibly occupy space.
///
/// Built once per tracking step and read-only afterwards. Every cell starts
/// at `ln(floor_density)`; each point then splats the spillover kernel into
/// its neighborhood with **max** aggregation: overlapping points reinforce
/// a region as plausibly occupied, they do not accumulate unbounded mass.
/// Substituting a sum here changes tracking behavior substantially; max is
/// an invariant of the model, not an implementation detail.
///
/// The outermost one-cell shell in every dimension represents the free space
/// around the tracked object and is never written: splat windows are clamped
/// to the interior `[1, size - 2]`.
///
/// Storage is a flat row-major `Vec<f64>` (`(x * size_y + y) * size_z + z`).
/// The backing buffer may be recycled across steps via [`DensityGrid::build_into`]
/// and [`DensityGrid::into_buffer`]; it only ever grows, and the active
/// region is fully reinitialized on every build.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    size_x: usize,
    size_y: usize,
    size_z: usize,
    cells: Vec<f64>,
}

impl DensityGrid {
    /// Build a grid with a freshly allocated buffer.
    pub fn build(
        geometry: &GridGeometry,
        kernel: &SpilloverKernel,
        cloud: &PointCloud3,
    ) -> Self {
        Self::build_into(geometry, kernel, cloud, Vec::new())
    }

    /// Build a grid into a recycled buffer.
    ///
    /// The buffer is grown if needed (never shrunk), the active region is
    /// reset to the floor density, and the cloud is splatted on top. Cells
    /// beyond the active region are never addressed: every read clamps into
    /// the active dimensions.
    pub fn build_into(
        geometry: &GridGeometry,
        kernel: &SpilloverKernel,
        cloud: &PointCloud3,
        mut buffer: Vec<f64>,
    ) -> Self {
        let size_x = geometry.size_x;
        let size_y = geometry.size_y;
        let size_z = geometry.size_z;
        let required = size_x * size_y * size_z;

        if buffer.len() < required {
            buffer.resize(required, 0.0);
        }
        let log_floor = geometry.log_floor();
        for cell in buffer[..required].iter_mut() {
            *cell = log_floor;
        }

        let mut grid = Self {
            size_x,
            size_y,
            size_z,
            cells: buffer,
        };
        grid.splat_cloud(geometry, kernel, cloud);
        grid
    }

    /// Grid dimensions `(size_x, size_y, size_z)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.size_x, self.size_y, self.size_z)
    }

    /// Number of active cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.size_x * self.size_y * self.size_z
    }

    /// Whether the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Log density at an in-range cell index.
    #[inline]
    pub fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        debug_assert!(x < self.size_x && y < self.size_y && z < self.size_z);
        self.cells[self.index(x, y, z)]
    }

    /// Log density at a possibly out-of-range index, clamped (saturating)
    /// to `[0, size - 1]` per axis.
    ///
    /// Scoring never discards points: an offset that pushes a point outside
    /// the grid lands on a boundary cell, which carries floor density.
    #[inline]
    pub fn value_clamped(&self, ix: i64, iy: i64, iz: i64) -> f64 {
        let x = ix.clamp(0, self.size_x as i64 - 1) as usize;
        let y = iy.clamp(0, self.size_y as i64 - 1) as usize;
        let z = iz.clamp(0, self.size_z as i64 - 1) as usize;
        self.cells[self.index(x, y, z)]
    }

    /// Recover the backing buffer for reuse in the next step.
    pub fn into_buffer(self) -> Vec<f64> {
        self.cells
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.size_y + y) * self.size_z + z
    }

    /// Splat every point's kernel into its clamped interior window.
    fn splat_cloud(
        &mut self,
        geometry: &GridGeometry,
        kernel: &SpilloverKernel,
        cloud: &PointCloud3,
    ) {
        let sx = self.size_x as i64;
        let sy = self.size_y as i64;
        let sz = self.size_z as i64;
        // A grid this small has no interior to spill into. Unreachable with
        // the standard two-cell padding; guards hostile grid caps.
        if sx < 3 || sy < 3 || sz < 3 {
            return;
        }

        let steps_xy = geometry.spillover_steps_xy as i64;
        let steps_z = geometry.spillover_steps_z;

        for point in cloud {
            let (ix, iy, iz) = geometry.cell_of(point);

            let min_x = (ix - steps_xy).clamp(1, sx - 2);
            let max_x = (ix + steps_xy).clamp(1, sx - 2);
            let min_y = (iy - steps_xy).clamp(1, sy - 2);
            let max_y = (iy + steps_xy).clamp(1, sy - 2);

            if steps_z > 1 {
                let min_z = (iz - steps_z as i64).clamp(1, sz - 2);
                let max_z = (iz + steps_z as i64).clamp(1, sz - 2);

                for x_spill in min_x..=max_x {
                    let di = (ix - x_spill).unsigned_abs() as usize;
                    for y_spill in min_y..=max_y {
                        let dj = (iy - y_spill).unsigned_abs() as usize;
                        for z_spill in min_z..=max_z {
                            let dk = (iz - z_spill).unsigned_abs() as usize;
                            let spill = kernel.value(di, dj, dk);
                            let idx =
                                self.index(x_spill as usize, y_spill as usize, z_spill as usize);
                            if spill > self.cells[idx] {
                                self.cells[idx] = spill;
                            }
                        }
                    }
                }
            } else {
                // Radius-1 fast path, the common case: z only reaches one
                // layer up and one down, so skip the inner loop and use the
                // two precomputed kernel slices directly. Behaviorally
                // identical to the general path above.
                let z_center = iz.clamp(1, sz - 2) as usize;
                let z_up = (z_center + 1).min(sz as usize - 2);
                let z_down = (z_center - 1).max(1);

                for x_spill in min_x..=max_x {
                    let di = (ix - x_spill).unsigned_abs() as usize;
                    for y_spill in min_y..=max_y {
                        let dj = (iy - y_spill).unsigned_abs() as usize;

                        let spill0 = kernel.value(di, dj, 0);
                        let idx = self.index(x_spill as usize, y_spill as usize, z_center);
                        if spill0 > self.cells[idx] {
                            self.cells[idx] = spill0;
                        }

                        let spill1 = kernel.value(di, dj, 1);
                        let idx_up = self.index(x_spill as usize, y_spill as usize, z_up);
                        if spill1 > self.cells[idx_up] {
                            self.cells[idx_up] = spill1;
                        }
                        let idx_down = self.index(x_spill as usize, y_spill as usize, z_down);
                        if spill1 > self.cells[idx_down] {
                            self.cells[idx_down] = spill1;
                        }
                    }
                }
            }
        }
    }
}
