#![allow(dead_code)]

use squaremark_core::GrayImage;
use squaremark_marker::{add_quiet_zone, render_marker};

pub const CODE_A: [u8; 16] = [1, 0, 0, 1, 0, 1, 1, 0, 1, 1, 0, 0, 0, 0, 1, 1];
pub const CODE_B: [u8; 16] = [0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 1, 0, 1, 1, 0, 0];

/// Fill the polygon (pixel-centre even-odd test) with `value`.
pub fn fill_polygon(img: &mut GrayImage, vertices: &[(f32, f32)], value: u8) {
    let n = vertices.len();
    for y in 0..img.height {
        for x in 0..img.width {
            let (px, py) = (x as f32, y as f32);
            let mut inside = false;
            for i in 0..n {
                let (xi, yi) = vertices[i];
                let (xj, yj) = vertices[(i + n - 1) % n];
                if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
                    inside = !inside;
                }
            }
            if inside {
                img.set(x, y, value);
            }
        }
    }
}

/// Copy `src` into `dst` with its top-left pixel at `(x0, y0)`.
pub fn blit(dst: &mut GrayImage, src: &GrayImage, x0: usize, y0: usize) {
    for y in 0..src.height {
        for x in 0..src.width {
            if let Some(v) = src.get(x, y) {
                dst.set(x0 + x, y0 + y, v);
            }
        }
    }
}

/// Reference marker filling its own frame.
pub fn reference(code: &[u8], cell_px: usize) -> GrayImage {
    render_marker(code, cell_px).expect("render marker")
}

/// White frame of `size × size` with `marker` pasted at each offset.
pub fn frame_with_markers(size: usize, marker: &GrayImage, offsets: &[(usize, usize)]) -> GrayImage {
    let mut frame = GrayImage::filled(size, size, 255);
    for &(x, y) in offsets {
        blit(&mut frame, marker, x, y);
    }
    frame
}

/// Marker on a white quiet zone, as printed.
pub fn printed(code: &[u8], cell_px: usize, margin: usize) -> GrayImage {
    add_quiet_zone(&reference(code, cell_px), margin, 255)
}
