#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// End-to-end calibration pipeline.
pub mod calibrate;

/// Coplanarity check of the world points.
pub mod degeneracy;

/// Homogeneous linear system assembly.
pub mod design;

/// Error types for the calibration pipeline.
pub mod error;

/// Correspondence tables and projection matrix persistence.
pub mod io;

/// Small fixed-size linear algebra helpers.
pub mod linalg;

/// Similarity normalization of the correspondences.
pub mod normalize;

/// Parameters controlling the calibration.
pub mod params;

/// The 3x4 projection matrix.
pub mod projection;

/// Reprojection of world points and residual validation.
pub mod reprojection;

/// Null-space solvers for the design matrix.
pub mod solver;

pub use calibrate::{calibrate_dlt, DltCalibration};
pub use error::{DltError, FailureKind};
pub use params::{DltParams, DltTolerances, NullSpaceSolver, RowMode};
pub use projection::ProjectionMatrix;
pub use reprojection::ReprojectionReport;

/// A pixel coordinate `(u, v)`.
pub type PixelPoint = [f64; 2];

/// A homogeneous world coordinate `(x, y, z, 1)`.
pub type WorldPoint = [f64; 4];
