use serde::{Deserialize, Serialize};

use crate::error::DltError;
use crate::linalg;
use crate::params::DltTolerances;
use crate::{PixelPoint, WorldPoint};

/// A 3x4 projective camera matrix mapping homogeneous world points to
/// homogeneous pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct ProjectionMatrix(pub [[f64; 4]; 3]);

impl ProjectionMatrix {
    /// Reshape a 12-vector in row-major order into a projection matrix.
    pub fn from_solution(solution: &[f64; 12]) -> Self {
        let mut p = [[0.0; 4]; 3];
        for (i, row) in p.iter_mut().enumerate() {
            row.copy_from_slice(&solution[4 * i..4 * i + 4]);
        }
        Self(p)
    }

    /// The matrix entries in row-major order.
    pub fn solution(&self) -> [f64; 12] {
        let mut out = [0.0; 12];
        for (o, v) in out.iter_mut().zip(self.0.iter().flatten()) {
            *o = *v;
        }
        out
    }

    /// The matrix as a nested array.
    pub fn as_array(&self) -> &[[f64; 4]; 3] {
        &self.0
    }

    /// Compute `P * w`.
    pub fn project_homogeneous(&self, world: &WorldPoint) -> [f64; 3] {
        let mut out = [0.0; 3];
        linalg::mat34_mul_vec4(&self.0, world, &mut out);
        out
    }

    /// Project a world point to pixel coordinates.
    ///
    /// Returns `None` if the point projects onto the plane at infinity.
    pub fn project(&self, world: &WorldPoint) -> Option<PixelPoint> {
        let [x, y, z] = self.project_homogeneous(world);
        if z == 0.0 || !z.is_finite() {
            return None;
        }
        Some([x / z, y / z])
    }
}

/// Scale the solution vector so that its last entry equals `last_entry` and
/// reshape it row-major into a 3x4 projection matrix.
///
/// The projection matrix is only defined up to scale, so any nonzero multiple
/// of `solution` yields the same matrix.
///
/// # Arguments
///
/// * `solution` - The null vector of the design matrix.
/// * `last_entry` - The target value of `P[2][3]`.
/// * `tol` - The tolerances; `scale` is the smallest admissible magnitude of the last entry.
pub fn assemble_projection(
    solution: &[f64; 12],
    last_entry: f64,
    tol: &DltTolerances,
) -> Result<ProjectionMatrix, DltError> {
    let value = solution[11];
    if !(value.abs() > tol.scale) || !(last_entry.abs() > tol.scale) {
        return Err(DltError::VanishingScale { value });
    }

    let factor = last_entry / value;
    log::debug!("scaling the solution by {factor:e}");

    let mut scaled = solution.map(|v| v * factor);
    // fix the last entry exactly
    scaled[11] = last_entry;

    Ok(ProjectionMatrix::from_solution(&scaled))
}
