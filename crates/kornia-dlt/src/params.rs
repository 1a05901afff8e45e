use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::io::DltIoError;

/// How correspondences are turned into rows of the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowMode {
    /// One equation per correspondence, alternating between the `u` equation
    /// (even indices) and the `v` equation (odd indices).
    #[default]
    Single,
    /// Both the `u` and `v` equations for every correspondence.
    Dual,
}

impl RowMode {
    /// Number of design matrix rows emitted for one correspondence.
    pub fn rows_per_point(&self) -> usize {
        match self {
            RowMode::Single => 1,
            RowMode::Dual => 2,
        }
    }

    /// Minimum number of correspondences constraining the 11 degrees of freedom.
    pub fn min_correspondences(&self) -> usize {
        match self {
            RowMode::Single => 11,
            RowMode::Dual => 6,
        }
    }
}

impl fmt::Display for RowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowMode::Single => write!(f, "single"),
            RowMode::Dual => write!(f, "dual"),
        }
    }
}

impl FromStr for RowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(RowMode::Single),
            "dual" => Ok(RowMode::Dual),
            _ => Err(format!("Invalid row mode: {s} (expected single or dual)")),
        }
    }
}

/// Strategy used to extract the null vector of the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullSpaceSolver {
    /// Eigenvector of `G^T G` with the smallest eigenvalue magnitude.
    #[default]
    #[serde(rename = "eigen")]
    NormalEigen,
    /// Right singular vector of `G` with the smallest singular value.
    Svd,
}

impl fmt::Display for NullSpaceSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullSpaceSolver::NormalEigen => write!(f, "eigen"),
            NullSpaceSolver::Svd => write!(f, "svd"),
        }
    }
}

impl FromStr for NullSpaceSolver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eigen" => Ok(NullSpaceSolver::NormalEigen),
            "svd" => Ok(NullSpaceSolver::Svd),
            _ => Err(format!("Invalid solver: {s} (expected eigen or svd)")),
        }
    }
}

/// Numeric tolerances used throughout the DLT pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DltTolerances {
    /// Allowed deviation of the null vector norm from one.
    pub unit_norm: f64,
    /// Per-axis reprojection tolerance in pixels.
    pub reprojection: f64,
    /// Relative spread of the plane equation below which points are coplanar.
    pub coplanarity: f64,
    /// Relative cross product norm below which three points are collinear.
    pub collinearity: f64,
    /// Smallest admissible magnitude of the last solution entry.
    pub scale: f64,
}

impl Default for DltTolerances {
    fn default() -> Self {
        Self {
            unit_norm: 0.01,
            reprojection: 0.05,
            coplanarity: 1e-9,
            collinearity: 1e-9,
            scale: 1e-12,
        }
    }
}

/// Parameters controlling the DLT calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DltParams {
    /// Design matrix row construction.
    pub row_mode: RowMode,
    /// Null-space extraction strategy.
    pub solver: NullSpaceSolver,
    /// Condition the design matrix by normalizing pixels and world points first.
    pub normalize: bool,
    /// Value the last entry of the projection matrix is scaled to.
    pub last_entry: f64,
    /// Shared numeric tolerances.
    pub tol: DltTolerances,
}

impl Default for DltParams {
    fn default() -> Self {
        Self {
            row_mode: RowMode::default(),
            solver: NullSpaceSolver::default(),
            normalize: true,
            last_entry: 2.0,
            tol: DltTolerances::default(),
        }
    }
}

impl DltParams {
    /// Load the parameters from a JSON file. Missing fields take their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DltIoError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_mode_from_str() {
        assert_eq!("single".parse::<RowMode>(), Ok(RowMode::Single));
        assert_eq!("Dual".parse::<RowMode>(), Ok(RowMode::Dual));
        assert!("triple".parse::<RowMode>().is_err());
        assert_eq!(RowMode::Dual.to_string(), "dual");
    }

    #[test]
    fn test_solver_from_str() {
        assert_eq!(
            "eigen".parse::<NullSpaceSolver>(),
            Ok(NullSpaceSolver::NormalEigen)
        );
        assert_eq!("SVD".parse::<NullSpaceSolver>(), Ok(NullSpaceSolver::Svd));
        assert!("qr".parse::<NullSpaceSolver>().is_err());
    }

    #[test]
    fn test_min_correspondences() {
        assert_eq!(RowMode::Single.min_correspondences(), 11);
        assert_eq!(RowMode::Dual.min_correspondences(), 6);
        assert_eq!(RowMode::Dual.rows_per_point(), 2);
    }

    #[test]
    fn test_params_partial_json() -> Result<(), Box<dyn std::error::Error>> {
        let params: DltParams =
            serde_json::from_str(r#"{"row_mode": "dual", "tol": {"reprojection": 0.5}}"#)?;
        assert_eq!(params.row_mode, RowMode::Dual);
        assert_eq!(params.solver, NullSpaceSolver::NormalEigen);
        assert_eq!(params.last_entry, 2.0);
        assert!(params.normalize);
        assert_eq!(params.tol.reprojection, 0.5);
        assert_eq!(params.tol.unit_norm, 0.01);

        let params: DltParams = serde_json::from_str(r#"{"solver": "svd"}"#)?;
        assert_eq!(params.solver, NullSpaceSolver::Svd);
        Ok(())
    }
}
