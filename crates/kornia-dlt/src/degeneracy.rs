use crate::error::DltError;
use crate::linalg::{cross_vec3, dot_product4, norm_vec3, sub_vec3, xyz};
use crate::params::DltTolerances;
use crate::WorldPoint;

/// Check that the world points do not all lie on a single plane.
///
/// The plane is spanned by a validated triple: the first point is the anchor,
/// the second is the first point distinct from the anchor and the third is the
/// first point not collinear with the other two. The plane normal, extended with
/// a trailing zero, is evaluated against every homogeneous world point. If all
/// the values collapse to a single one the points are coplanar.
///
/// # Arguments
///
/// * `world` - The homogeneous world points `(x, y, z, 1)`.
/// * `tol` - The collinearity and coplanarity tolerances, relative to the point extent.
///
/// # Returns
///
/// The indices of the triple spanning the plane.
pub fn check_non_coplanar(
    world: &[WorldPoint],
    tol: &DltTolerances,
) -> Result<[usize; 3], DltError> {
    let triple = select_triple(world, tol.collinearity)?;
    let [ia, ib, ic] = triple;

    let a = xyz(&world[ia]);
    let ab = sub_vec3(&xyz(&world[ib]), &a);
    let ac = sub_vec3(&xyz(&world[ic]), &a);

    let mut n = [0.0; 3];
    cross_vec3(&ab, &ac, &mut n);
    let normal = [n[0], n[1], n[2], 0.0];

    let (min, max) = world
        .iter()
        .map(|p| dot_product4(&normal, p))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        });
    let spread = max - min;

    // the plane equation scales with |n| times the distance to the plane
    let extent = max_distance(world, &a);
    let threshold = tol.coplanarity * norm_vec3(&n) * extent;

    log::debug!("plane through {triple:?}: spread {spread:e}, threshold {threshold:e}");

    if spread <= threshold {
        return Err(DltError::CoplanarPoints { triple, spread });
    }

    Ok(triple)
}

/// Find the first triple of world points that are not collinear.
fn select_triple(world: &[WorldPoint], collinearity: f64) -> Result<[usize; 3], DltError> {
    let Some(anchor) = world.first() else {
        return Err(DltError::CollinearPoints);
    };
    let a = xyz(anchor);
    let extent = max_distance(world, &a);
    if extent == 0.0 {
        return Err(DltError::CollinearPoints);
    }

    let ib = world
        .iter()
        .position(|p| norm_vec3(&sub_vec3(&xyz(p), &a)) > collinearity * extent)
        .ok_or(DltError::CollinearPoints)?;
    let ab = sub_vec3(&xyz(&world[ib]), &a);
    let ab_norm = norm_vec3(&ab);

    let mut n = [0.0; 3];
    let ic = world
        .iter()
        .position(|p| {
            let ac = sub_vec3(&xyz(p), &a);
            cross_vec3(&ab, &ac, &mut n);
            norm_vec3(&n) > collinearity * ab_norm * extent
        })
        .ok_or(DltError::CollinearPoints)?;

    Ok([0, ib, ic])
}

fn max_distance(world: &[WorldPoint], origin: &[f64; 3]) -> f64 {
    world
        .iter()
        .map(|p| norm_vec3(&sub_vec3(&xyz(p), origin)))
        .fold(0.0, f64::max)
}
