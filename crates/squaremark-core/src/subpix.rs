//! Iterative sub-pixel corner refinement.
//!
//! For a true corner `q`, every gradient `g(p)` in its neighbourhood is
//! orthogonal to `p - q` (flat regions have `g = 0`, edge pixels have `g`
//! orthogonal to the edge through `q`). Summing `g gᵀ (p - q) = 0` over a
//! Gaussian-weighted window gives a 2×2 linear system for `q`, solved
//! repeatedly from the updated estimate.

use crate::{sample_bilinear, GrayImageView};
use nalgebra::{Matrix2, Point2, Vector2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubPixParams {
    /// Search window is `(2 * half_window + 1)` pixels on each side.
    pub half_window: usize,
    pub max_iterations: usize,
    /// Stop once a corner moves less than this many pixels in one step.
    pub epsilon: f32,
}

impl Default for SubPixParams {
    fn default() -> Self {
        Self {
            half_window: 5,
            max_iterations: 40,
            epsilon: 0.001,
        }
    }
}

/// Refine `corners` in place.
///
/// A corner stays where it was when its window has no usable gradient
/// structure, or when the estimate wanders further than the window half-size.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "trace", skip(img, corners), fields(n = corners.len()))
)]
pub fn refine_corners_subpix(img: &GrayImageView<'_>, corners: &mut [Point2<f32>], params: &SubPixParams) {
    if params.half_window == 0 || img.is_empty() {
        return;
    }
    let weights = gaussian_mask(params.half_window);
    for corner in corners.iter_mut() {
        *corner = refine_one(img, *corner, params, &weights).0;
    }
}

fn gaussian_mask(half: usize) -> Vec<f64> {
    let side = 2 * half + 1;
    let axis: Vec<f64> = (0..side)
        .map(|i| {
            let x = (i as f64 - half as f64) / half as f64;
            (-x * x).exp()
        })
        .collect();
    let mut mask = Vec::with_capacity(side * side);
    for wy in &axis {
        for wx in &axis {
            mask.push(wx * wy);
        }
    }
    mask
}

/// Refined position of one corner and the number of update steps applied.
fn refine_one(
    img: &GrayImageView<'_>,
    start: Point2<f32>,
    params: &SubPixParams,
    weights: &[f64],
) -> (Point2<f32>, usize) {
    let half = params.half_window as i32;
    let side = (2 * half + 1) as usize;
    let eps2 = (params.epsilon as f64).powi(2);
    let (w, h) = (img.width as f64, img.height as f64);

    let mut q = Vector2::new(start.x as f64, start.y as f64);
    let mut steps = 0;

    for _ in 0..params.max_iterations {
        let mut m = Matrix2::<f64>::zeros();
        let mut rhs = Vector2::<f64>::zeros();

        for dy in -half..=half {
            for dx in -half..=half {
                let wgt = weights[(dy + half) as usize * side + (dx + half) as usize];
                let px = q.x as f32 + dx as f32;
                let py = q.y as f32 + dy as f32;
                let gx = 0.5 * (sample_bilinear(img, px + 1.0, py) - sample_bilinear(img, px - 1.0, py)) as f64;
                let gy = 0.5 * (sample_bilinear(img, px, py + 1.0) - sample_bilinear(img, px, py - 1.0)) as f64;

                let gxx = gx * gx * wgt;
                let gxy = gx * gy * wgt;
                let gyy = gy * gy * wgt;
                m[(0, 0)] += gxx;
                m[(0, 1)] += gxy;
                m[(1, 0)] += gxy;
                m[(1, 1)] += gyy;
                rhs.x += gxx * dx as f64 + gxy * dy as f64;
                rhs.y += gxy * dx as f64 + gyy * dy as f64;
            }
        }

        if m.determinant().abs() <= f64::EPSILON * 1e3 {
            break;
        }
        let Some(step) = m.try_inverse().map(|inv| inv * rhs) else {
            break;
        };

        q += step;
        steps += 1;
        if q.x < 0.0 || q.x >= w || q.y < 0.0 || q.y >= h {
            break;
        }
        if step.norm_squared() <= eps2 {
            break;
        }
    }

    let refined = Point2::new(q.x as f32, q.y as f32);
    if (refined - start).norm() > params.half_window as f32 || !refined.x.is_finite() || !refined.y.is_finite() {
        (start, steps)
    } else {
        (refined, steps)
    }
}
