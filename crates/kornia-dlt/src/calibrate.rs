use crate::degeneracy::check_non_coplanar;
use crate::design::build_design_matrix;
use crate::error::DltError;
use crate::normalize::{denormalize_solution, normalize_pixels, normalize_world};
use crate::params::DltParams;
use crate::projection::{assemble_projection, ProjectionMatrix};
use crate::reprojection::{validate_reprojection, ReprojectionReport};
use crate::solver::{solve_null_vector, NullVector};
use crate::{PixelPoint, WorldPoint};

/// Result of a successful calibration.
#[derive(Debug, Clone)]
pub struct DltCalibration {
    /// The validated projection matrix.
    pub projection: ProjectionMatrix,
    /// Reprojection residuals of the input correspondences.
    pub report: ReprojectionReport,
    /// Indices of the world points spanning the degeneracy test plane.
    pub triple: [usize; 3],
    /// The unit-norm null vector in the input frame, before the last-entry rescale.
    pub null_vector: NullVector,
}

/// Estimate the 3x4 projection matrix from 3D-2D correspondences with the
/// Direct Linear Transform.
///
/// The run checks the input shape and the world point geometry, builds the
/// design matrix, extracts its null vector, rescales it into `P` and finally
/// checks that `P` reprojects every world point onto its pixel. When
/// `params.normalize` is set the design matrix is built on normalized points
/// and the solution is mapped back before the rescale.
///
/// The default [`RowMode::Single`](crate::RowMode::Single) needs at least 11
/// correspondences. Use [`RowMode::Dual`](crate::RowMode::Dual) for 6 to 10
/// correspondences.
///
/// # Arguments
///
/// * `pixels` - The observed pixel coordinates `(u, v)`, shape (N, 2).
/// * `world` - The homogeneous world points `(x, y, z, 1)`, shape (N, 4), index-aligned with `pixels`.
/// * `params` - The calibration parameters.
///
/// Example:
///
/// ```no_run
/// use kornia_dlt::{calibrate_dlt, DltParams, ProjectionMatrix, RowMode};
///
/// let camera = ProjectionMatrix([
///     [100.0, 0.0, 50.0, 10.0],
///     [0.0, 100.0, 40.0, -20.0],
///     [0.0, 0.0, 1.0, 5.0],
/// ]);
/// let world = [
///     [-0.5, -0.5, -0.5, 1.0],
///     [0.5, -0.5, -0.5, 1.0],
///     [0.5, 0.5, -0.5, 1.0],
///     [-0.5, 0.5, -0.5, 1.0],
///     [-0.5, -0.5, 0.5, 1.0],
///     [0.5, -0.5, 0.5, 1.0],
///     [0.5, 0.5, 0.5, 1.0],
///     [-0.5, 0.5, 0.5, 1.0],
/// ];
/// let pixels = world
///     .iter()
///     .filter_map(|w| camera.project(w))
///     .collect::<Vec<_>>();
///
/// let params = DltParams {
///     row_mode: RowMode::Dual,
///     ..Default::default()
/// };
/// let calibration = calibrate_dlt(&pixels, &world, &params)?;
/// println!("{:?}", calibration.projection);
/// # Ok::<(), kornia_dlt::DltError>(())
/// ```
pub fn calibrate_dlt(
    pixels: &[PixelPoint],
    world: &[WorldPoint],
    params: &DltParams,
) -> Result<DltCalibration, DltError> {
    check_input_shape(pixels, world, params)?;

    let triple = check_non_coplanar(world, &params.tol)?;

    let null_vector = if params.normalize {
        let (pixels_n, t_pixels) = normalize_pixels(pixels);
        let (world_n, t_world) = normalize_world(world);
        log::debug!(
            "normalized pixel scale {:e}, world scale {:e}",
            t_pixels.read(0, 0),
            t_world.read(0, 0)
        );
        let null_vector = solve_design(&pixels_n, &world_n, params)?;
        NullVector {
            vector: denormalize_solution(&null_vector.vector, &t_pixels, &t_world),
            ..null_vector
        }
    } else {
        solve_design(pixels, world, params)?
    };

    let projection = assemble_projection(&null_vector.vector, params.last_entry, &params.tol)?;

    let report = validate_reprojection(&projection, pixels, world, params.tol.reprojection)?;

    log::info!(
        "calibrated {} correspondences ({} rows, {} solver): max residual ({:.3e}, {:.3e}) px, rmse {:.3e} px",
        pixels.len(),
        params.row_mode,
        params.solver,
        report.max_abs[0],
        report.max_abs[1],
        report.rmse
    );

    Ok(DltCalibration {
        projection,
        report,
        triple,
        null_vector,
    })
}

fn solve_design(
    pixels: &[PixelPoint],
    world: &[WorldPoint],
    params: &DltParams,
) -> Result<NullVector, DltError> {
    let g = build_design_matrix(pixels, world, params.row_mode);
    log::debug!(
        "design matrix {}x{} ({} row mode)",
        g.nrows(),
        g.ncols(),
        params.row_mode
    );
    solve_null_vector(&g, params.solver, &params.tol)
}

fn check_input_shape(
    pixels: &[PixelPoint],
    world: &[WorldPoint],
    params: &DltParams,
) -> Result<(), DltError> {
    if pixels.len() != world.len() {
        return Err(DltError::MismatchedCorrespondences {
            pixels: pixels.len(),
            world: world.len(),
        });
    }

    let required = params.row_mode.min_correspondences();
    if pixels.len() < required {
        return Err(DltError::InsufficientCorrespondences {
            required,
            actual: pixels.len(),
        });
    }

    if let Some(row) = pixels.iter().position(|p| p.iter().any(|v| !v.is_finite())) {
        return Err(DltError::NonFiniteCoordinate {
            table: "pixel",
            row,
        });
    }
    if let Some(row) = world.iter().position(|p| p.iter().any(|v| !v.is_finite())) {
        return Err(DltError::NonFiniteCoordinate {
            table: "world",
            row,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::params::{NullSpaceSolver, RowMode};

    fn dual() -> DltParams {
        DltParams {
            row_mode: RowMode::Dual,
            ..Default::default()
        }
    }

    #[test]
    fn test_mismatched_correspondences() {
        let pixels = vec![[0.0, 0.0]; 7];
        let world = vec![[0.0, 0.0, 0.0, 1.0]; 8];
        let res = calibrate_dlt(&pixels, &world, &dual());
        assert!(matches!(
            res,
            Err(DltError::MismatchedCorrespondences {
                pixels: 7,
                world: 8
            })
        ));
    }

    #[test]
    fn test_insufficient_correspondences() {
        let pixels = vec![[0.0, 0.0]; 5];
        let world = vec![[0.0, 0.0, 0.0, 1.0]; 5];
        let res = calibrate_dlt(&pixels, &world, &dual());
        assert!(matches!(
            res,
            Err(DltError::InsufficientCorrespondences {
                required: 6,
                actual: 5
            })
        ));

        // one equation per point needs more points
        let pixels = vec![[0.0, 0.0]; 8];
        let world = vec![[0.0, 0.0, 0.0, 1.0]; 8];
        let res = calibrate_dlt(&pixels, &world, &DltParams::default());
        let err = res.err().map(|e| e.kind());
        assert_eq!(err, Some(FailureKind::InputShape));
    }

    #[test]
    fn test_non_finite_coordinate() {
        let pixels = vec![[0.0, 0.0]; 6];
        let mut world = vec![[0.0, 0.0, 0.0, 1.0]; 6];
        world[4][2] = f64::NAN;
        let res = calibrate_dlt(&pixels, &world, &dual());
        assert!(matches!(
            res,
            Err(DltError::NonFiniteCoordinate {
                table: "world",
                row: 4
            })
        ));
    }

    #[test]
    fn test_recover_projection() -> Result<(), DltError> {
        let p = [
            [80.0, 5.0, 40.0, 12.0],
            [-3.0, 90.0, 30.0, -8.0],
            [0.01, -0.02, 1.0, 6.0],
        ];
        let world = [
            [0.3, -0.7, 0.2, 1.0],
            [-0.9, 0.4, 1.1, 1.0],
            [0.8, 0.9, -0.6, 1.0],
            [-0.2, -0.5, -1.2, 1.0],
            [1.1, -0.3, 0.7, 1.0],
            [-0.6, 1.0, 0.1, 1.0],
            [0.1, 0.2, 1.4, 1.0],
            [-1.0, -0.9, 0.5, 1.0],
            [0.6, -1.1, -0.9, 1.0],
            [0.9, 0.5, 1.0, 1.0],
            [-0.4, 0.7, -1.0, 1.0],
            [0.5, 0.0, -0.3, 1.0],
        ];
        let pixels = world
            .iter()
            .map(|w| {
                let mut x = [0.0; 3];
                crate::linalg::mat34_mul_vec4(&p, w, &mut x);
                [x[0] / x[2], x[1] / x[2]]
            })
            .collect::<Vec<_>>();

        for row_mode in [RowMode::Single, RowMode::Dual] {
            for (solver, normalize) in [
                (NullSpaceSolver::NormalEigen, true),
                (NullSpaceSolver::NormalEigen, false),
                (NullSpaceSolver::Svd, true),
                (NullSpaceSolver::Svd, false),
            ] {
                let params = DltParams {
                    row_mode,
                    solver,
                    normalize,
                    ..Default::default()
                };
                let calibration = calibrate_dlt(&pixels, &world, &params)?;
                let recovered = calibration.projection.0;
                assert_eq!(recovered[2][3], 2.0);
                // P is p scaled by 2 / 6
                for (row_r, row_p) in recovered.iter().zip(p.iter()) {
                    for (r, v) in row_r.iter().zip(row_p.iter()) {
                        approx::assert_relative_eq!(
                            *r,
                            v / 3.0,
                            epsilon = 1e-5,
                            max_relative = 1e-5
                        );
                    }
                }
                assert!(calibration.report.max_abs[0] < 1e-4);
                assert!(calibration.report.max_abs[1] < 1e-4);
            }
        }
        Ok(())
    }
}
