use crate::{sample_bilinear_u8, GrayImage, GrayImageView};
use nalgebra::{Matrix3, Point2, RowSVector, SMatrix, SVector, Vector2, Vector3};
use std::f64::consts::SQRT_2;

/// Planar projective transform `dst ~ H * src`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new((v.x / v.z) as f32, (v.y / v.z) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Similarity moving the centroid of `pts` to the origin with mean distance √2.
fn conditioning(pts: &[Point2<f32>; 4]) -> Matrix3<f64> {
    let as_f64 = |p: &Point2<f32>| Vector2::new(p.x as f64, p.y as f64);
    let centroid = pts.iter().map(as_f64).sum::<Vector2<f64>>() / 4.0;
    let spread = pts
        .iter()
        .map(|p| (as_f64(p) - centroid).norm())
        .sum::<f64>()
        / 4.0;
    let s = if spread > 1e-12 { SQRT_2 / spread } else { 1.0 };

    Matrix3::new(
        s, 0.0, -s * centroid.x, //
        0.0, s, -s * centroid.y, //
        0.0, 0.0, 1.0,
    )
}

/// Compute H such that `dst ~ H * src`, from exactly 4 correspondences.
///
/// Both point sets are conditioned before solving the 8×8 system with
/// `h33 = 1`. Corner order must agree between `src` and `dst`. Returns `None`
/// for collinear or coincident points.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let t_src = conditioning(src);
    let t_dst = conditioning(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (k, (ps, pd)) in src.iter().zip(dst).enumerate() {
        let s = t_src * Vector3::new(ps.x as f64, ps.y as f64, 1.0);
        let d = t_dst * Vector3::new(pd.x as f64, pd.y as f64, 1.0);
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);

        a.set_row(
            2 * k,
            &RowSVector::<f64, 8>::from_row_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y]),
        );
        a.set_row(
            2 * k + 1,
            &RowSVector::<f64, 8>::from_row_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y]),
        );
        b[2 * k] = u;
        b[2 * k + 1] = v;
    }

    let sol = a.lu().solve(&b)?;
    if !sol.iter().all(|v| v.is_finite()) {
        return None;
    }
    let conditioned = Matrix3::new(
        sol[0], sol[1], sol[2], //
        sol[3], sol[4], sol[5], //
        sol[6], sol[7], 1.0,
    );

    let h = t_dst.try_inverse()? * conditioned * t_src;
    let scale = h[(2, 2)];
    if scale.abs() < 1e-12 || h.determinant().abs() < 1e-12 {
        return None;
    }
    Some(Homography::new(h / scale))
}

/// Resample `src` into an `out_w × out_h` patch.
///
/// Patch pixel `(x, y)` reads the source at `h_src_from_dst * (x + 0.5, y + 0.5)`
/// with bilinear interpolation.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_src_from_dst: &Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let mut out = GrayImage::filled(out_w, out_h, 0);
    for (i, px) in out.data.iter_mut().enumerate() {
        let (x, y) = (i % out_w, i / out_w);
        let p = h_src_from_dst.apply(Point2::new(x as f32 + 0.5, y as f32 + 0.5));
        *px = sample_bilinear_u8(src, p.x, p.y);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: Point2<f32>, b: Point2<f32>, tol: f32) -> bool {
        (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol
    }

    fn unit_square(side: f32) -> [Point2<f32>; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(side, 0.0),
            Point2::new(side, side),
            Point2::new(0.0, side),
        ]
    }

    #[test]
    fn inverse_maps_points_back() {
        let h = Homography::new(Matrix3::new(
            0.95, -0.08, 12.0, //
            0.04, 1.05, -7.0, //
            0.0006, 0.0011, 1.0,
        ));
        let inv = h.inverse().expect("invertible");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(-30.0, 45.0),
            Point2::new(210.0, 160.0),
        ] {
            let back = inv.apply(h.apply(p));
            assert!(near(back, p, 1e-3), "{back:?} vs {p:?}");
        }
    }

    #[test]
    fn square_to_perspective_quad() {
        let truth = Homography::new(Matrix3::new(
            3.1, 0.4, 150.0, //
            -0.3, 2.7, 90.0, //
            0.002, 0.001, 1.0,
        ));
        let square = unit_square(36.0);
        let quad = square.map(|p| truth.apply(p));

        let h = homography_from_4pt(&square, &quad).expect("solvable");
        for p in [Point2::new(18.0_f32, 18.0), Point2::new(3.0, 33.0), Point2::new(30.0, 6.0)] {
            assert!(near(h.apply(p), truth.apply(p), 1e-2));
        }
    }

    #[test]
    fn degenerate_targets_have_no_homography() {
        let collinear = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(5.0, 5.0),
            Point2::new(10.0, 10.0),
            Point2::new(15.0, 15.0),
        ];
        assert!(homography_from_4pt(&unit_square(1.0), &collinear).is_none());
        assert!(homography_from_4pt(&unit_square(1.0), &[Point2::new(3.0, 4.0); 4]).is_none());
    }

    #[test]
    fn half_pixel_shift_reproduces_the_source() {
        let src = GrayImage {
            width: 5,
            height: 3,
            data: (0..15).map(|v| v as u8 * 7).collect(),
        };
        let shift = Homography::new(Matrix3::new(
            1.0, 0.0, -0.5, //
            0.0, 1.0, -0.5, //
            0.0, 0.0, 1.0,
        ));
        let out = warp_perspective_gray(&src.view(), &shift, 5, 3);
        assert_eq!(out, src);
    }
}
