use crate::{PixelPoint, WorldPoint};

/// Normalize the pixels to zero mean and an average distance of `sqrt(2)`.
///
/// Returns the normalized pixels and the similarity transform
/// `T = [[s, 0, -s*mu], [0, s, -s*mv], [0, 0, 1]]` mapping the input onto them.
/// Coincident pixels keep a unit scale.
pub fn normalize_pixels(pixels: &[PixelPoint]) -> (Vec<PixelPoint>, faer::Mat<f64>) {
    let n = pixels.len().max(1) as f64;
    let (mut mu, mut mv) = (0.0, 0.0);
    for p in pixels {
        mu += p[0];
        mv += p[1];
    }
    mu /= n;
    mv /= n;

    let mut mean_dist = 0.0;
    for p in pixels {
        let du = p[0] - mu;
        let dv = p[1] - mv;
        mean_dist += (du * du + dv * dv).sqrt();
    }
    mean_dist /= n;
    let scale = if mean_dist > f64::EPSILON {
        (2.0f64).sqrt() / mean_dist
    } else {
        1.0
    };

    let normalized = pixels
        .iter()
        .map(|p| [(p[0] - mu) * scale, (p[1] - mv) * scale])
        .collect();

    let t = faer::mat![
        [scale, 0.0, -scale * mu],
        [0.0, scale, -scale * mv],
        [0.0, 0.0, 1.0]
    ];
    (normalized, t)
}

/// Normalize the world points to zero mean and an average distance of `sqrt(3)`.
///
/// The centroid is taken over the `(x, y, z)` components. The returned 4x4
/// transform is applied to the full homogeneous points, so `w` is preserved.
pub fn normalize_world(world: &[WorldPoint]) -> (Vec<WorldPoint>, faer::Mat<f64>) {
    let n = world.len().max(1) as f64;
    let mut mean = [0.0; 3];
    for p in world {
        for (m, v) in mean.iter_mut().zip(p.iter()) {
            *m += v;
        }
    }
    mean.iter_mut().for_each(|m| *m /= n);

    let mut mean_dist = 0.0;
    for p in world {
        let d = [p[0] - mean[0], p[1] - mean[1], p[2] - mean[2]];
        mean_dist += (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
    }
    mean_dist /= n;
    let scale = if mean_dist > f64::EPSILON {
        (3.0f64).sqrt() / mean_dist
    } else {
        1.0
    };

    let normalized = world
        .iter()
        .map(|p| {
            [
                scale * (p[0] - mean[0] * p[3]),
                scale * (p[1] - mean[1] * p[3]),
                scale * (p[2] - mean[2] * p[3]),
                p[3],
            ]
        })
        .collect();

    let t = faer::mat![
        [scale, 0.0, 0.0, -scale * mean[0]],
        [0.0, scale, 0.0, -scale * mean[1]],
        [0.0, 0.0, scale, -scale * mean[2]],
        [0.0, 0.0, 0.0, 1.0]
    ];
    (normalized, t)
}

/// Map a solution estimated on normalized points back to the input frame.
///
/// Computes `P = T_pixels^-1 * P_n * T_world` and rescales it to unit norm.
///
/// # Arguments
///
/// * `solution` - The row-major 12-vector of `P_n`.
/// * `t_pixels` - The pixel similarity transform from [`normalize_pixels`].
/// * `t_world` - The world similarity transform from [`normalize_world`].
pub fn denormalize_solution(
    solution: &[f64; 12],
    t_pixels: &faer::Mat<f64>,
    t_world: &faer::Mat<f64>,
) -> [f64; 12] {
    // inverse of the similarity [[s, 0, tx], [0, s, ty], [0, 0, 1]]
    let s = t_pixels.read(0, 0);
    let (tx, ty) = (t_pixels.read(0, 2), t_pixels.read(1, 2));
    let t_pixels_inv = faer::mat![
        [1.0 / s, 0.0, -tx / s],
        [0.0, 1.0 / s, -ty / s],
        [0.0, 0.0, 1.0]
    ];

    let mut p_n = faer::Mat::<f64>::zeros(3, 4);
    for (i, v) in solution.iter().enumerate() {
        p_n.write(i / 4, i % 4, *v);
    }

    let p = &(&t_pixels_inv * &p_n) * t_world;

    let mut out = [0.0; 12];
    for (i, v) in out.iter_mut().enumerate() {
        *v = p.read(i / 4, i % 4);
    }

    let norm = out.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        out.iter_mut().for_each(|v| *v /= norm);
    }
    out
}
