/// Compute the difference `a - b` of two 3d vectors.
pub fn sub_vec3(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Compute the cross product of two 3d vectors.
///
/// # Arguments
///
/// * `a` - The first vector.
/// * `b` - The second vector.
/// * `out` - The output vector `a x b`.
pub fn cross_vec3(a: &[f64; 3], b: &[f64; 3], out: &mut [f64; 3]) {
    out[0] = a[1] * b[2] - a[2] * b[1];
    out[1] = a[2] * b[0] - a[0] * b[2];
    out[2] = a[0] * b[1] - a[1] * b[0];
}

/// Compute the dot product of two 3d vectors.
pub fn dot_product3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Compute the dot product of two 4d vectors.
pub fn dot_product4(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// Compute the euclidean norm of a 3d vector.
pub fn norm_vec3(a: &[f64; 3]) -> f64 {
    dot_product3(a, a).sqrt()
}

/// Multiply a 3x4 matrix with a 4d vector.
///
/// # Arguments
///
/// * `m` - The 3x4 matrix in row-major order.
/// * `v` - The 4d vector.
/// * `out` - The output 3d vector `m * v`.
pub fn mat34_mul_vec4(m: &[[f64; 4]; 3], v: &[f64; 4], out: &mut [f64; 3]) {
    for (out_i, row) in out.iter_mut().zip(m.iter()) {
        *out_i = dot_product4(row, v);
    }
}

/// Drop the homogeneous component of a world point.
pub fn xyz(point: &[f64; 4]) -> [f64; 3] {
    [point[0], point[1], point[2]]
}
