//! Global (Otsu) and local (adaptive mean) thresholding.

use crate::{GrayImage, GrayImageView};
use serde::{Deserialize, Serialize};

/// Parameters of the local mean threshold used to find marker borders.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveThresholdParams {
    /// Side of the square averaging window in pixels. Even values are
    /// rounded up to the next odd size, values below 3 are treated as 3.
    pub block_size: usize,
    /// Offset subtracted from the local mean.
    pub c: f32,
}

impl Default for AdaptiveThresholdParams {
    fn default() -> Self {
        Self {
            block_size: 11,
            c: 5.0,
        }
    }
}

impl AdaptiveThresholdParams {
    #[inline]
    fn radius(&self) -> usize {
        self.block_size.max(3) / 2
    }
}

/// Inverted adaptive mean threshold.
///
/// A pixel becomes foreground (255) when `value <= mean - c`, where `mean` is
/// taken over the `block_size × block_size` window centred on it. Window
/// samples that fall outside the frame count as white (255), so dark shapes
/// touching the border still read as foreground. Everything else is 0.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(src), fields(w = src.width, h = src.height))
)]
pub fn adaptive_threshold_mean(
    src: &GrayImageView<'_>,
    params: &AdaptiveThresholdParams,
) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let mut out = GrayImage::filled(w, h, 0);
    if src.is_empty() {
        return out;
    }

    let integral = integral_image(src);
    let stride = w + 1;
    let r = params.radius() as isize;
    let side = 2 * r + 1;
    let window_area = (side * side) as u64;

    for y in 0..h {
        let y0 = (y as isize - r).max(0) as usize;
        let y1 = ((y as isize + r) as usize).min(h - 1) + 1;
        for x in 0..w {
            let x0 = (x as isize - r).max(0) as usize;
            let x1 = ((x as isize + r) as usize).min(w - 1) + 1;

            let inside = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let inside_count = ((x1 - x0) * (y1 - y0)) as u64;
            let sum = inside + 255 * (window_area - inside_count);
            let mean = sum as f32 / window_area as f32;

            if src.data[y * w + x] as f32 <= mean - params.c {
                out.data[y * w + x] = 255;
            }
        }
    }

    out
}

/// Summed-area table with a zero first row and column.
fn integral_image(src: &GrayImageView<'_>) -> Vec<u64> {
    let (w, h) = (src.width, src.height);
    let stride = w + 1;
    let mut table = vec![0u64; stride * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += src.data[y * w + x] as u64;
            table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
        }
    }
    table
}

/// Otsu threshold over all pixels of `src`.
///
/// Pixels strictly above the returned value belong to the bright class.
pub fn otsu_threshold(src: &GrayImageView<'_>) -> u8 {
    if src.data.is_empty() {
        return 127;
    }

    let mut hist = [0u32; 256];
    let mut min_v = 255u8;
    let mut max_v = 0u8;
    for &v in src.data {
        hist[v as usize] += 1;
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v == max_v {
        // uniform patch: keep every pixel on its own side of the cut
        return min_v.saturating_sub(1);
    }

    let nonzero_bins = hist.iter().filter(|&&h| h > 0).count();
    if nonzero_bins <= 2 {
        return ((min_v as u16 + max_v as u16) / 2) as u8;
    }

    let total = src.data.len() as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 127u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

/// Map pixels above `threshold` to 255 and the rest to 0.
pub fn binarize(src: &GrayImageView<'_>, threshold: u8) -> GrayImage {
    GrayImage {
        width: src.width,
        height: src.height,
        data: src
            .data
            .iter()
            .map(|&v| if v > threshold { 255 } else { 0 })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_has_no_foreground() {
        let img = GrayImage::filled(32, 24, 255);
        let bin = adaptive_threshold_mean(&img.view(), &AdaptiveThresholdParams::default());
        assert!(bin.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn dark_square_edge_becomes_foreground() {
        let mut img = GrayImage::filled(40, 40, 255);
        for y in 10..30 {
            for x in 10..30 {
                img.set(x, y, 0);
            }
        }
        let bin = adaptive_threshold_mean(&img.view(), &AdaptiveThresholdParams::default());
        // border pixels of the dark square see bright neighbours
        assert_eq!(bin.get(10, 10), Some(255));
        assert_eq!(bin.get(20, 10), Some(255));
        // deep inside the square the window is uniformly dark
        assert_eq!(bin.get(20, 20), Some(0));
        // background stays background
        assert_eq!(bin.get(2, 2), Some(0));
    }

    #[test]
    fn frame_edge_reads_as_white() {
        // all-black frame: only the ring near the border sees white padding
        let img = GrayImage::filled(30, 30, 0);
        let bin = adaptive_threshold_mean(&img.view(), &AdaptiveThresholdParams::default());
        assert_eq!(bin.get(0, 0), Some(255));
        assert_eq!(bin.get(15, 0), Some(255));
        assert_eq!(bin.get(15, 15), Some(0));
    }

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let mut data = vec![20u8; 50];
        data.extend(std::iter::repeat(30u8).take(10));
        data.extend(std::iter::repeat(200u8).take(40));
        data.extend(std::iter::repeat(220u8).take(20));
        let img = GrayImage {
            width: data.len(),
            height: 1,
            data,
        };
        let t = otsu_threshold(&img.view());
        assert!((30..200).contains(&t), "threshold {t}");

        let bin = binarize(&img.view(), t);
        assert_eq!(bin.data.iter().filter(|&&v| v == 255).count(), 60);
    }

    #[test]
    fn otsu_keeps_uniform_patch_on_one_side() {
        let white = GrayImage::filled(4, 4, 240);
        let t = otsu_threshold(&white.view());
        assert!(binarize(&white.view(), t).data.iter().all(|&v| v == 255));

        let black = GrayImage::filled(4, 4, 0);
        let t = otsu_threshold(&black.view());
        assert!(binarize(&black.view(), t).data.iter().all(|&v| v == 0));
    }
}
