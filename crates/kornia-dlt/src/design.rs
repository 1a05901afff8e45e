use crate::params::RowMode;
use crate::{PixelPoint, WorldPoint};

/// Build the design matrix `G` of the homogeneous system `G p = 0`.
///
/// `p` holds the 12 entries of the projection matrix in row-major order. The
/// equation relating a world point `w` to the pixel coordinate `u` reads
/// `[w, 0, -u w] p = 0`, and the one for `v` reads `[0, w, -v w] p = 0`.
///
/// With [`RowMode::Single`] correspondence `i` emits one row, using `u` when `i`
/// is even and `v` when `i` is odd, giving an `N x 12` matrix. With
/// [`RowMode::Dual`] it emits both rows `2i` and `2i + 1`, giving `2N x 12`.
///
/// PRECONDITION: `pixels` and `world` have the same length.
///
/// # Arguments
///
/// * `pixels` - The observed pixel coordinates with shape (N, 2).
/// * `world` - The homogeneous world points with shape (N, 4).
/// * `row_mode` - The row construction scheme.
pub fn build_design_matrix(
    pixels: &[PixelPoint],
    world: &[WorldPoint],
    row_mode: RowMode,
) -> faer::Mat<f64> {
    let n = pixels.len().min(world.len());
    let mut g = faer::Mat::<f64>::zeros(n * row_mode.rows_per_point(), 12);

    for (i, (px, w)) in pixels.iter().zip(world.iter()).enumerate() {
        match row_mode {
            RowMode::Single => {
                // even rows use the u equation, odd rows the v equation
                let axis = i % 2;
                write_row(&mut g, i, axis, px[axis], w);
            }
            RowMode::Dual => {
                write_row(&mut g, 2 * i, 0, px[0], w);
                write_row(&mut g, 2 * i + 1, 1, px[1], w);
            }
        }
    }

    g
}

/// Write the equation of one pixel axis into `row`.
fn write_row(g: &mut faer::Mat<f64>, row: usize, axis: usize, coord: f64, w: &WorldPoint) {
    let offset = 4 * axis;
    for (j, &wj) in w.iter().enumerate() {
        g.write(row, offset + j, wj);
        g.write(row, 8 + j, -coord * wj);
    }
}
