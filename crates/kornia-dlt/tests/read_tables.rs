//! End-to-end calibration of the two-plane rig stored in `tests/data`.
//!
//! `Features2D.txt` holds the pixel coordinates `u  v` and `Features3D.txt` the
//! homogeneous world coordinates `x   y   z   1`, one correspondence per row.
//! The first three world points lie on the rig's vertical edge.

use std::io::Write;
use std::path::PathBuf;

use approx::assert_relative_eq;
use kornia_dlt::io::{read_correspondences, read_projection_json, write_projection_json, DltIoError};
use kornia_dlt::{calibrate_dlt, DltParams, NullSpaceSolver, RowMode};

// the rig camera rescaled so that P[2][3] = 2
const EXPECTED: [[f64; 4]; 3] = [
    [-73.345777877, 44.813286676, -11.789473684, 640.0],
    [5.491487881, 4.314740478, -83.80839501, 629.932579493],
    [-0.073684211, -0.057894737, -0.036842105, 2.0],
];

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

#[test]
fn calibrate_rig_tables() -> Result<(), Box<dyn std::error::Error>> {
    let (pixels, world) = read_correspondences(
        data_dir().join("Features2D.txt"),
        data_dir().join("Features3D.txt"),
    )?;
    assert_eq!(pixels.len(), 21);

    for row_mode in [RowMode::Single, RowMode::Dual] {
        for solver in [NullSpaceSolver::NormalEigen, NullSpaceSolver::Svd] {
            let params = DltParams {
                row_mode,
                solver,
                ..Default::default()
            };
            let calibration = calibrate_dlt(&pixels, &world, &params)?;

            // the leading triple is collinear and must be skipped
            assert_eq!(calibration.triple, [0, 1, 3]);

            for (row, row_expected) in calibration.projection.0.iter().zip(EXPECTED.iter()) {
                for (v, e) in row.iter().zip(row_expected.iter()) {
                    assert_relative_eq!(*v, *e, epsilon = 1e-3, max_relative = 1e-4);
                }
            }
            assert!(calibration.report.max_abs[0] < 1e-3);
            assert!(calibration.report.max_abs[1] < 1e-3);
        }
    }
    Ok(())
}

#[test]
fn misaligned_tables_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let pixel_path = dir.path().join("Features2D.txt");
    let world_path = data_dir().join("Features3D.txt");

    // drop the last pixel row
    let contents = std::fs::read_to_string(data_dir().join("Features2D.txt"))?;
    let mut f = std::fs::File::create(&pixel_path)?;
    for line in contents.lines().take(20) {
        writeln!(f, "{line}")?;
    }

    let res = read_correspondences(&pixel_path, &world_path);
    assert!(matches!(res, Err(DltIoError::Shape(_))));
    Ok(())
}

#[test]
fn projection_matrix_is_persisted() -> Result<(), Box<dyn std::error::Error>> {
    let (pixels, world) = read_correspondences(
        data_dir().join("Features2D.txt"),
        data_dir().join("Features3D.txt"),
    )?;
    let calibration = calibrate_dlt(&pixels, &world, &DltParams::default())?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("projection.json");
    write_projection_json(&path, &calibration.projection)?;
    let restored = read_projection_json(&path)?;
    for (a, b) in restored
        .solution()
        .iter()
        .zip(calibration.projection.solution().iter())
    {
        assert_relative_eq!(a, b, max_relative = 1e-12);
    }
    Ok(())
}
