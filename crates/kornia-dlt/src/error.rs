/// Terminal failure states of a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The correspondence tables are malformed or misaligned.
    InputShape,
    /// The world points do not constrain the projection (coplanar or collinear).
    DegenerateGeometry,
    /// The null-space solver produced an unusable vector.
    NumericalSolver,
    /// The recovered matrix does not explain the observed pixels.
    ReprojectionTolerance,
}

/// Error types for the DLT calibration.
#[derive(Debug, thiserror::Error)]
pub enum DltError {
    /// The pixel and world tables have a different number of rows.
    #[error("Mismatched correspondences: {pixels} pixel points != {world} world points")]
    MismatchedCorrespondences {
        /// Number of pixel points.
        pixels: usize,
        /// Number of world points.
        world: usize,
    },

    /// Not enough correspondences to constrain the 11 degrees of freedom.
    #[error("DLT requires at least {required} correspondences, got {actual}")]
    InsufficientCorrespondences {
        /// Minimum number of correspondences for the selected row mode.
        required: usize,
        /// Actual number of correspondences provided.
        actual: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("Non-finite coordinate in {table} table at row {row}")]
    NonFiniteCoordinate {
        /// Name of the offending table.
        table: &'static str,
        /// Row index of the offending point.
        row: usize,
    },

    /// All world points lie on a single line.
    #[error("Degenerate geometry: all world points are collinear")]
    CollinearPoints,

    /// All world points lie on a single plane.
    #[error("Degenerate geometry: world points are coplanar (plane through {triple:?}, spread {spread:e})")]
    CoplanarPoints {
        /// Indices of the triple defining the plane.
        triple: [usize; 3],
        /// Spread of the plane equation over all points.
        spread: f64,
    },

    /// The selected null vector does not have unit norm.
    #[error("Found non-unit null vector with norm {norm}")]
    NonUnitNullVector {
        /// Euclidean norm of the selected vector.
        norm: f64,
    },

    /// The last solution entry is too small to fix the projective scale.
    #[error("Cannot normalize the solution: last entry {value:e} is vanishing")]
    VanishingScale {
        /// Value of the last solution entry.
        value: f64,
    },

    /// A world point projects onto the plane at infinity.
    #[error("World point {index} projects to infinity")]
    PointAtInfinity {
        /// Index of the correspondence.
        index: usize,
    },

    /// The reprojected pixel deviates from the observation by the tolerance or more.
    #[error("Reprojection of point {index} deviates by {residual:?} px (tolerance {tolerance} px, {failures} failing points)")]
    ReprojectionTolerance {
        /// Index of the worst correspondence.
        index: usize,
        /// Signed residual `predicted - observed` of the worst correspondence.
        residual: [f64; 2],
        /// Per-axis tolerance in pixels.
        tolerance: f64,
        /// Number of correspondences outside the tolerance.
        failures: usize,
    },
}

impl DltError {
    /// The terminal state this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            DltError::MismatchedCorrespondences { .. }
            | DltError::InsufficientCorrespondences { .. }
            | DltError::NonFiniteCoordinate { .. } => FailureKind::InputShape,
            DltError::CollinearPoints | DltError::CoplanarPoints { .. } => {
                FailureKind::DegenerateGeometry
            }
            DltError::NonUnitNullVector { .. } | DltError::VanishingScale { .. } => {
                FailureKind::NumericalSolver
            }
            DltError::PointAtInfinity { .. } | DltError::ReprojectionTolerance { .. } => {
                FailureKind::ReprojectionTolerance
            }
        }
    }
}
