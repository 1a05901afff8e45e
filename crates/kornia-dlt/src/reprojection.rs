use serde::{Deserialize, Serialize};

use crate::error::DltError;
use crate::projection::ProjectionMatrix;
use crate::{PixelPoint, WorldPoint};

/// Summary of the reprojection residuals of a projection matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReprojectionReport {
    /// Signed residuals `predicted - observed` for every correspondence.
    pub residuals: Vec<[f64; 2]>,
    /// Largest absolute residual along each pixel axis.
    pub max_abs: [f64; 2],
    /// Root-mean-square reprojection error in pixels.
    pub rmse: f64,
}

impl ReprojectionReport {
    fn from_residuals(residuals: Vec<[f64; 2]>) -> Self {
        let max_abs = residuals.iter().fold([0.0f64; 2], |acc, r| {
            [acc[0].max(r[0].abs()), acc[1].max(r[1].abs())]
        });
        let sq_sum = residuals
            .iter()
            .map(|r| r[0] * r[0] + r[1] * r[1])
            .sum::<f64>();
        let rmse = if residuals.is_empty() {
            0.0
        } else {
            (sq_sum / residuals.len() as f64).sqrt()
        };

        Self {
            residuals,
            max_abs,
            rmse,
        }
    }
}

/// Compute the signed reprojection residual of every correspondence.
///
/// Each world point is mapped with `P`, dehomogenized by its third component and
/// compared with the observed pixel.
///
/// # Arguments
///
/// * `projection` - The projection matrix.
/// * `pixels` - The observed pixel coordinates with shape (N, 2).
/// * `world` - The homogeneous world points with shape (N, 4).
pub fn reprojection_residuals(
    projection: &ProjectionMatrix,
    pixels: &[PixelPoint],
    world: &[WorldPoint],
) -> Result<Vec<[f64; 2]>, DltError> {
    pixels
        .iter()
        .zip(world.iter())
        .enumerate()
        .map(|(index, (px, w))| {
            let predicted = projection
                .project(w)
                .ok_or(DltError::PointAtInfinity { index })?;
            Ok([predicted[0] - px[0], predicted[1] - px[1]])
        })
        .collect()
}

/// Check that the projection matrix reproduces every correspondence.
///
/// Every residual component must be strictly below `tolerance` in absolute
/// value. On failure the error reports the worst correspondence.
///
/// # Arguments
///
/// * `projection` - The projection matrix.
/// * `pixels` - The observed pixel coordinates with shape (N, 2).
/// * `world` - The homogeneous world points with shape (N, 4).
/// * `tolerance` - The per-axis tolerance in pixels.
pub fn validate_reprojection(
    projection: &ProjectionMatrix,
    pixels: &[PixelPoint],
    world: &[WorldPoint],
    tolerance: f64,
) -> Result<ReprojectionReport, DltError> {
    let residuals = reprojection_residuals(projection, pixels, world)?;

    let within = |r: &[f64; 2]| r[0].abs() < tolerance && r[1].abs() < tolerance;
    let failures = residuals.iter().filter(|r| !within(r)).count();

    if failures > 0 {
        let worst = |r: &[f64; 2]| {
            let m = r[0].abs().max(r[1].abs());
            if m.is_nan() {
                f64::INFINITY
            } else {
                m
            }
        };
        let (index, residual) = residuals
            .iter()
            .enumerate()
            .filter(|(_, r)| !within(r))
            .max_by(|a, b| worst(a.1).total_cmp(&worst(b.1)))
            .map(|(i, r)| (i, *r))
            .unwrap_or((0, [f64::NAN; 2]));

        return Err(DltError::ReprojectionTolerance {
            index,
            residual,
            tolerance,
            failures,
        });
    }

    Ok(ReprojectionReport::from_residuals(residuals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const P: ProjectionMatrix = ProjectionMatrix([
        [100.0, 0.0, 50.0, 10.0],
        [0.0, 100.0, 40.0, -20.0],
        [0.0, 0.0, 1.0, 5.0],
    ]);

    fn data() -> (Vec<PixelPoint>, Vec<WorldPoint>) {
        let world = vec![
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 1.0],
            [0.0, 0.0, 5.0, 1.0],
        ];
        let pixels = vec![[2.0, -4.0], [22.0, -4.0], [2.0, 16.0], [26.0, 18.0]];
        (pixels, world)
    }

    #[test]
    fn test_exact_reprojection() -> Result<(), DltError> {
        let (pixels, world) = data();
        let report = validate_reprojection(&P, &pixels, &world, 0.05)?;
        assert_eq!(report.residuals.len(), 4);
        assert_relative_eq!(report.rmse, 0.0, epsilon = 1e-12);
        assert_relative_eq!(report.max_abs[0], 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_worst_point_is_reported() {
        let (mut pixels, world) = data();
        pixels[1][0] += 0.04;
        pixels[2][1] -= 50.0;
        pixels[3][0] += 0.1;

        let res = validate_reprojection(&P, &pixels, &world, 0.05);
        match res {
            Err(DltError::ReprojectionTolerance {
                index,
                residual,
                failures,
                ..
            }) => {
                assert_eq!(index, 2);
                assert_eq!(failures, 2);
                assert_relative_eq!(residual[1], 50.0, epsilon = 1e-9);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_negative_deviation_fails() {
        // the deviation is checked in absolute value
        let (mut pixels, world) = data();
        pixels[0][0] += 1.0;
        let res = validate_reprojection(&P, &pixels, &world, 0.05);
        assert!(matches!(
            res,
            Err(DltError::ReprojectionTolerance { index: 0, .. })
        ));
    }

    #[test]
    fn test_point_at_infinity() {
        let (pixels, mut world) = data();
        world[3] = [0.0, 0.0, -5.0, 1.0];
        let res = reprojection_residuals(&P, &pixels, &world);
        assert!(matches!(res, Err(DltError::PointAtInfinity { index: 3 })));
    }

    #[test]
    fn test_rmse() -> Result<(), DltError> {
        let (mut pixels, world) = data();
        pixels[0][0] += 0.03;
        pixels[1][1] -= 0.04;
        let report = validate_reprojection(&P, &pixels, &world, 0.05)?;
        assert_relative_eq!(report.rmse, (0.0025f64 / 4.0).sqrt(), epsilon = 1e-9);
        assert_relative_eq!(report.max_abs[0], 0.03, epsilon = 1e-9);
        assert_relative_eq!(report.max_abs[1], 0.04, epsilon = 1e-9);
        Ok(())
    }
}
