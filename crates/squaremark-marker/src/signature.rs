//! Canonical-square sampling of a quad into a bit signature.

use crate::MarkerError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use squaremark_core::{
    binarize, erode_3x3, homography_from_4pt, otsu_threshold, warp_perspective_gray,
    GrayImageView, Quad,
};

/// Quads smaller than this (in px²) cannot be rectified meaningfully.
const MIN_SAMPLE_AREA: f32 = 1.0;

/// Row-major grid of 0/1 cells read from the top-left of the canonical square.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitSignature {
    pub side: usize,
    pub cells: Vec<u8>,
}

impl BitSignature {
    /// Build a signature from `side × side` cells, each `0` or `1`.
    pub fn from_cells(side: usize, cells: Vec<u8>) -> Result<Self, MarkerError> {
        if side == 0 || cells.len() != side * side {
            return Err(MarkerError::InvalidBits { bits: cells.len() });
        }
        if let Some(&bad) = cells.iter().find(|&&c| c > 1) {
            return Err(MarkerError::InvalidCode {
                reason: format!("cell value {bad} is not 0 or 1"),
            });
        }
        Ok(Self { side, cells })
    }

    pub fn bits(&self) -> usize {
        self.cells.len()
    }

    /// Number of differing cells.
    pub fn hamming(&self, other: &BitSignature) -> Result<usize, MarkerError> {
        if self.cells.len() != other.cells.len() {
            return Err(MarkerError::SignatureLength {
                left: self.cells.len(),
                right: other.cells.len(),
            });
        }
        Ok(self
            .cells
            .iter()
            .zip(&other.cells)
            .filter(|(a, b)| a != b)
            .count())
    }

    /// Cells as a `0`/`1` string, one `/`-separated group per row.
    pub fn to_bit_string(&self) -> String {
        self.cells
            .chunks(self.side.max(1))
            .map(|row| row.iter().map(|&c| if c == 1 { '1' } else { '0' }).collect::<String>())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Largest supported signature; the sampler warps into a `bits × bits` patch.
pub const MAX_BITS: usize = 1024;

/// Side of the cell grid for `bits` samples, if `bits` is a perfect square in
/// `1..=MAX_BITS`.
pub fn grid_side(bits: usize) -> Result<usize, MarkerError> {
    let side = (bits as f64).sqrt().round() as usize;
    if bits == 0 || bits > MAX_BITS || side.checked_mul(side) != Some(bits) {
        return Err(MarkerError::InvalidBits { bits });
    }
    Ok(side)
}

/// Reads a fixed-size bit grid out of image quads.
///
/// The quad is warped into a `bits × bits` patch, binarized with a global Otsu
/// threshold, eroded once with a 3×3 element, and each of the `side × side`
/// cells is read at its centre pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignatureSampler {
    bits: usize,
    side: usize,
}

impl SignatureSampler {
    pub fn new(bits: usize) -> Result<Self, MarkerError> {
        let side = grid_side(bits)?;
        Ok(Self { bits, side })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Sample `quad` (canonical corner order) from `img`.
    ///
    /// Returns `None` for degenerate or non-convex quads.
    pub fn sample(&self, img: &GrayImageView<'_>, quad: &Quad) -> Option<BitSignature> {
        let area = quad.area();
        if area.is_nan() || area < MIN_SAMPLE_AREA {
            log::trace!("quad area {area:.3} too small to sample");
            return None;
        }
        if !quad.is_convex() {
            log::trace!("quad {:?} is not convex", quad.corners);
            return None;
        }

        let n = self.bits as f32;
        let canonical = [
            Point2::new(0.0, 0.0),
            Point2::new(n, 0.0),
            Point2::new(n, n),
            Point2::new(0.0, n),
        ];
        let Some(h_img_from_patch) = homography_from_4pt(&canonical, &quad.corners) else {
            log::trace!("singular homography for quad {:?}", quad.corners);
            return None;
        };

        let patch = warp_perspective_gray(img, &h_img_from_patch, self.bits, self.bits);
        let threshold = otsu_threshold(&patch.view());
        let binary = binarize(&patch.view(), threshold);
        let eroded = erode_3x3(&binary.view());

        let k = self.side;
        let mut cells = Vec::with_capacity(self.bits);
        for r in 0..k {
            for c in 0..k {
                let x = c * k + k / 2;
                let y = r * k + k / 2;
                let v = eroded.data[y * eroded.width + x];
                cells.push(u8::from(v >= 128));
            }
        }

        Some(BitSignature { side: k, cells })
    }
}

/// One-shot form of [`SignatureSampler::sample`].
///
/// Fails when `bits` is not a positive perfect square; a degenerate quad
/// yields `Ok(None)`.
pub fn sample_signature(
    img: &GrayImageView<'_>,
    quad: &Quad,
    bits: usize,
) -> Result<Option<BitSignature>, MarkerError> {
    Ok(SignatureSampler::new(bits)?.sample(img, quad))
}
