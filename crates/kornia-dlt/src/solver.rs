use crate::error::DltError;
use crate::params::{DltTolerances, NullSpaceSolver};

/// The approximate null vector of a design matrix.
#[derive(Debug, Clone)]
pub struct NullVector {
    /// The unit-norm 12-vector, the projection matrix entries in row-major order.
    pub vector: [f64; 12],
    /// Eigenvalue of `G^T G` (or singular value of `G`) attached to the vector.
    pub value: f64,
    /// The next smallest eigenvalue (or singular value). A value close to `value`
    /// means the null space is not unique.
    pub next_value: f64,
}

/// Find the least-squares null vector of the design matrix.
///
/// With [`NullSpaceSolver::NormalEigen`] the normal matrix `M = G^T G` is
/// decomposed and the eigenvector of the smallest-magnitude eigenvalue is
/// selected. With [`NullSpaceSolver::Svd`] the right singular vector of `G`
/// attached to the smallest singular value is selected, which avoids squaring
/// the condition number.
///
/// # Arguments
///
/// * `g` - The design matrix with shape (R, 12).
/// * `solver` - The null-space extraction strategy.
/// * `tol` - The tolerances; `unit_norm` bounds the deviation of the vector norm from one.
pub fn solve_null_vector(
    g: &faer::Mat<f64>,
    solver: NullSpaceSolver,
    tol: &DltTolerances,
) -> Result<NullVector, DltError> {
    let (vector, mut values) = match solver {
        NullSpaceSolver::NormalEigen => null_vector_eigen(g),
        NullSpaceSolver::Svd => null_vector_svd(g),
    };

    values.sort_by(|a, b| a.total_cmp(b));
    let null = NullVector {
        vector,
        value: values[0],
        next_value: values[1],
    };

    let largest = values[values.len() - 1];
    log::debug!(
        "{solver} solver: selected value {:e}, next {:e}, largest {:e}",
        null.value,
        null.next_value,
        largest
    );
    if null.next_value <= 1e-9 * largest {
        log::warn!("the null space of the design matrix is not one-dimensional, the solution is not unique");
    }

    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if !((norm - 1.0).abs() < tol.unit_norm) {
        return Err(DltError::NonUnitNullVector { norm });
    }

    Ok(null)
}

/// Eigen-decomposition of the 12x12 normal matrix. Returns the selected
/// eigenvector and the magnitudes of all eigenvalues.
fn null_vector_eigen(g: &faer::Mat<f64>) -> ([f64; 12], Vec<f64>) {
    // M = G^T G is symmetric, only the lower triangle is read
    let mtm = g.transpose() * g.as_ref();
    let eig = mtm.selfadjoint_eigendecomposition(faer::Side::Lower);
    let eigenvalues = eig.s().column_vector();

    let magnitudes = (0..eigenvalues.nrows())
        .map(|i| eigenvalues.read(i).abs())
        .collect::<Vec<_>>();

    let min_index = magnitudes
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let col = eig.u().col(min_index);
    let mut vector = [0.0; 12];
    for (i, v) in vector.iter_mut().enumerate() {
        *v = col.read(i);
    }

    (vector, magnitudes)
}

/// Full SVD of the design matrix. Returns the last right singular vector and
/// all 12 singular values, padded with zeros when `G` has fewer than 12 rows.
fn null_vector_svd(g: &faer::Mat<f64>) -> ([f64; 12], Vec<f64>) {
    let svd = g.svd();
    let s = svd.s_diagonal();

    let mut singular_values = vec![0.0; 12];
    for (i, sv) in singular_values.iter_mut().enumerate().take(s.nrows()) {
        *sv = s.read(i);
    }

    // singular values are sorted in non-increasing order
    let col = svd.v().col(11);
    let mut vector = [0.0; 12];
    for (i, v) in vector.iter_mut().enumerate() {
        *v = col.read(i);
    }

    (vector, singular_values)
}
