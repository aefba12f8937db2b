//! Candidate translation lattice.

use crate::config::EnumerationPolicy;
use crate::core::transforms::XyzTransform;
use crate::error::{Result, TrackError};

/// Enumerate the candidate translations to evaluate.
///
/// Candidates walk a regular lattice over the inclusive ranges, x outermost
/// and y (then z) innermost, and the output preserves that order. The walk
/// is a literal stepped accumulation (`x += step` until `x > max`), so the
/// upper bound is included up to floating-point slack in the accumulated
/// sum.
///
/// Vertical handling depends on the policy:
///
/// - [`EnumerationPolicy::CollapseZ`]: no vertical offsets are evaluated at
///   all; every candidate carries `z = 0`. This matches how the tracker has
///   always been run (the z search range is coarser than one vertical step).
/// - [`EnumerationPolicy::Full3d`]: the z lattice is walked like x and y,
///   except that a z step larger than `|z_min|` could step over zero
///   entirely, so the range collapses to exactly `{0}` in that case.
///
/// Every candidate is tagged with the integration volume of its search cell,
/// `xy_step² × z_step`, for downstream consumers that integrate the scored
/// distribution.
pub fn enumerate_transforms(
    xy_step: f64,
    z_step: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
    z_range: (f64, f64),
    policy: EnumerationPolicy,
) -> Result<Vec<XyzTransform>> {
    validate_step("xy step", xy_step)?;
    validate_step("z step", z_step)?;
    validate_range("x range", x_range)?;
    validate_range("y range", y_range)?;
    validate_range("z range", z_range)?;

    // Make sure the z walk hits 0 in case the step is too large.
    let z_values: Vec<f64> = match policy {
        EnumerationPolicy::CollapseZ => vec![0.0],
        EnumerationPolicy::Full3d => {
            if z_step > z_range.0.abs() {
                vec![0.0]
            } else {
                let mut values = Vec::new();
                let mut z = z_range.0;
                while z <= z_range.1 {
                    values.push(z);
                    z += z_step;
                }
                values
            }
        }
    };

    let num_x = ((x_range.1 - x_range.0) / xy_step) as usize + 1;
    let num_y = ((y_range.1 - y_range.0) / xy_step) as usize + 1;
    let mut transforms = Vec::with_capacity(num_x * num_y * z_values.len());

    let volume = xy_step.powi(2) * z_step;

    let mut x = x_range.0;
    while x <= x_range.1 {
        let mut y = y_range.0;
        while y <= y_range.1 {
            for &z in &z_values {
                transforms.push(XyzTransform::new(x, y, z, volume));
            }
            y += xy_step;
        }
        x += xy_step;
    }

    Ok(transforms)
}

fn validate_step(name: &str, step: f64) -> Result<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(TrackError::InvalidConfig(format!(
            "{name} must be positive and finite, got {step}"
        )));
    }
    Ok(())
}

fn validate_range(name: &str, range: (f64, f64)) -> Result<()> {
    if !range.0.is_finite() || !range.1.is_finite() || range.0 > range.1 {
        return Err(TrackError::InvalidConfig(format!(
            "{name} must be a finite, ordered interval, got ({}, {})",
            range.0, range.1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: (f64, f64) = (-0.5, 0.5);

    #[test]
    fn test_candidate_count_matches_lattice() {
        // floor((0.5 - -0.5) / 0.25) + 1 = 5 per axis.
        let transforms = enumerate_transforms(
            0.25,
            0.25,
            RANGE,
            RANGE,
            (-0.1, 0.1),
            EnumerationPolicy::CollapseZ,
        )
        .unwrap();
        assert_eq!(transforms.len(), 25);
    }

    #[test]
    fn test_collapse_z_never_offsets_vertically() {
        // Even a z range wider than the step stays collapsed in this mode.
        let transforms = enumerate_transforms(
            0.25,
            0.25,
            RANGE,
            RANGE,
            (-1.0, 1.0),
            EnumerationPolicy::CollapseZ,
        )
        .unwrap();
        assert_eq!(transforms.len(), 25);
        assert!(transforms.iter().all(|t| t.z == 0.0));
    }

    #[test]
    fn test_full_3d_walks_z_lattice() {
        let transforms = enumerate_transforms(
            0.25,
            0.25,
            RANGE,
            RANGE,
            (-0.25, 0.25),
            EnumerationPolicy::Full3d,
        )
        .unwrap();
        // 5 x 5 x 3 lattice.
        assert_eq!(transforms.len(), 75);
        assert!(transforms.iter().any(|t| t.z == -0.25));
        assert!(transforms.iter().any(|t| t.z == 0.25));
    }

    #[test]
    fn test_full_3d_collapses_when_step_exceeds_lower_bound() {
        let transforms = enumerate_transforms(
            0.25,
            0.25,
            RANGE,
            RANGE,
            (-0.1, 0.1),
            EnumerationPolicy::Full3d,
        )
        .unwrap();
        assert_eq!(transforms.len(), 25);
        assert!(transforms.iter().all(|t| t.z == 0.0));
    }

    #[test]
    fn test_enumeration_order_row_major() {
        let transforms = enumerate_transforms(
            0.5,
            0.5,
            (0.0, 0.5),
            (0.0, 0.5),
            (0.0, 0.0),
            EnumerationPolicy::CollapseZ,
        )
        .unwrap();
        let coords: Vec<(f64, f64)> = transforms.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(
            coords,
            vec![(0.0, 0.0), (0.0, 0.5), (0.5, 0.0), (0.5, 0.5)]
        );
    }

    #[test]
    fn test_volume_tag() {
        let transforms = enumerate_transforms(
            0.25,
            0.5,
            (0.0, 0.0),
            (0.0, 0.0),
            (0.0, 0.0),
            EnumerationPolicy::CollapseZ,
        )
        .unwrap();
        assert_eq!(transforms.len(), 1);
        assert!((transforms[0].volume - 0.25 * 0.25 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_steps_and_ranges() {
        let ok = (0.0, 1.0);
        assert!(
            enumerate_transforms(0.0, 0.1, ok, ok, ok, EnumerationPolicy::CollapseZ).is_err()
        );
        assert!(
            enumerate_transforms(0.1, -1.0, ok, ok, ok, EnumerationPolicy::CollapseZ).is_err()
        );
        assert!(enumerate_transforms(
            0.1,
            0.1,
            (1.0, 0.0),
            ok,
            ok,
            EnumerationPolicy::CollapseZ
        )
        .is_err());
        assert!(enumerate_transforms(
            0.1,
            0.1,
            ok,
            (f64::NAN, 1.0),
            ok,
            EnumerationPolicy::CollapseZ
        )
        .is_err());
    }

    #[test]
    fn test_single_cell_range() {
        let transforms = enumerate_transforms(
            0.1,
            0.1,
            (0.0, 0.0),
            (0.0, 0.0),
            (0.0, 0.0),
            EnumerationPolicy::Full3d,
        )
        .unwrap();
        assert_eq!(transforms.len(), 1);
        assert_eq!(transforms[0].x, 0.0);
    }
}
