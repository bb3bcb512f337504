use crate::{GrayImage, GrayImageView};

/// Grayscale erosion with a 3×3 square structuring element.
///
/// Each output pixel is the minimum of its in-frame 3×3 neighbourhood;
/// pixels outside the frame do not take part.
pub fn erode_3x3(src: &GrayImageView<'_>) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let mut out = GrayImage::filled(w, h, 0);

    for y in 0..h {
        let ys = y.saturating_sub(1)..=(y + 1).min(h - 1);
        for x in 0..w {
            let xs = x.saturating_sub(1)..=(x + 1).min(w - 1);
            let mut m = u8::MAX;
            for yy in ys.clone() {
                let row = &src.data[yy * w..(yy + 1) * w];
                for &v in &row[xs.clone()] {
                    m = m.min(v);
                }
            }
            out.data[y * w + x] = m;
        }
    }

    out
}
