//! Printable reference markers.

use crate::signature::grid_side;
use crate::MarkerError;
use squaremark_core::GrayImage;

/// Parse a code written as `0`/`1` characters.
///
/// Whitespace, `_` and `/` are ignored so rows can be grouped, e.g.
/// `"1001/0110/1100/0011"`.
pub fn parse_code(text: &str) -> Result<Vec<u8>, MarkerError> {
    let mut code = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '0' => code.push(0),
            '1' => code.push(1),
            c if c.is_whitespace() || c == '_' || c == '/' => {}
            other => {
                return Err(MarkerError::InvalidCode {
                    reason: format!("unexpected character {other:?}"),
                })
            }
        }
    }
    if code.is_empty() {
        return Err(MarkerError::InvalidCode {
            reason: "code is empty".to_string(),
        });
    }
    Ok(code)
}

/// Draw a marker: a one-cell black border around the inner `code` cells.
///
/// `code` is row-major with `1` = white and must hold a perfect square
/// number of cells. Every cell is `cell_px × cell_px` pixels and the image
/// has no quiet zone.
pub fn render_marker(code: &[u8], cell_px: usize) -> Result<GrayImage, MarkerError> {
    let inner = grid_side(code.len()).map_err(|_| MarkerError::InvalidCode {
        reason: format!("{} cells do not form a square grid", code.len()),
    })?;
    if let Some(&bad) = code.iter().find(|&&c| c > 1) {
        return Err(MarkerError::InvalidCode {
            reason: format!("cell value {bad} is not 0 or 1"),
        });
    }
    if cell_px == 0 {
        return Err(MarkerError::InvalidCode {
            reason: "cell size must be at least one pixel".to_string(),
        });
    }

    let grid = inner + 2;
    let size = grid * cell_px;
    let mut img = GrayImage::filled(size, size, 0);

    for gy in 1..=inner {
        for gx in 1..=inner {
            if code[(gy - 1) * inner + (gx - 1)] == 0 {
                continue;
            }
            for y in gy * cell_px..(gy + 1) * cell_px {
                img.data[y * size + gx * cell_px..y * size + (gx + 1) * cell_px].fill(255);
            }
        }
    }

    Ok(img)
}

/// Surround `img` with a `margin` pixel band of `value`.
pub fn add_quiet_zone(img: &GrayImage, margin: usize, value: u8) -> GrayImage {
    let w = img.width + 2 * margin;
    let h = img.height + 2 * margin;
    let mut out = GrayImage::filled(w, h, value);
    for y in 0..img.height {
        let dst = (y + margin) * w + margin;
        out.data[dst..dst + img.width].copy_from_slice(&img.data[y * img.width..(y + 1) * img.width]);
    }
    out
}
