use argh::FromArgs;
use std::path::PathBuf;

use kornia_dlt::io;
use kornia_dlt::{calibrate_dlt, DltParams, NullSpaceSolver, RowMode};

#[derive(FromArgs)]
/// Estimate a camera projection matrix from 3D-2D correspondences
struct Args {
    /// path to the pixel table (u v per row)
    #[argh(option)]
    pixels: PathBuf,

    /// path to the world table (x y z 1 per row)
    #[argh(option)]
    world: PathBuf,

    /// path to a JSON file with the calibration parameters
    #[argh(option)]
    config: Option<PathBuf>,

    /// design matrix rows per correspondence: single or dual
    #[argh(option)]
    row_mode: Option<RowMode>,

    /// null-space solver: eigen or svd
    #[argh(option)]
    solver: Option<NullSpaceSolver>,

    /// path to write the projection matrix as JSON
    #[argh(option)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut params = match &args.config {
        Some(path) => DltParams::from_json_file(path)?,
        None => DltParams::default(),
    };
    if let Some(row_mode) = args.row_mode {
        params.row_mode = row_mode;
    }
    if let Some(solver) = args.solver {
        params.solver = solver;
    }

    let (pixels, world) = io::read_correspondences(&args.pixels, &args.world)?;
    println!("Read #{} correspondences", pixels.len());

    let calibration = match calibrate_dlt(&pixels, &world, &params) {
        Ok(calibration) => calibration,
        Err(e) => {
            log::error!("calibration failed ({:?}): {}", e.kind(), e);
            return Err(e.into());
        }
    };

    println!("Projection matrix ({} rows, {} solver):", params.row_mode, params.solver);
    for row in calibration.projection.as_array() {
        println!(
            "  [{:>14.6} {:>14.6} {:>14.6} {:>14.6}]",
            row[0], row[1], row[2], row[3]
        );
    }
    println!(
        "Max reprojection error: ({:.3e}, {:.3e}) px, rmse {:.3e} px",
        calibration.report.max_abs[0], calibration.report.max_abs[1], calibration.report.rmse
    );

    if let Some(output) = &args.output {
        io::write_projection_json(output, &calibration.projection)?;
        println!("Wrote projection matrix to {}", output.display());
    }

    Ok(())
}
