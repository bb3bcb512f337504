//! Pinhole camera with Brown–Conrady radial/tangential distortion.

use crate::PoseError;
use nalgebra::{Matrix3, Point2, Point3, Vector2};
use serde::{Deserialize, Serialize};

/// Fixed-point iterations used to invert the distortion model.
const UNDISTORT_ITERATIONS: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            fx: 1000.0,
            fy: 1000.0,
            cx: 500.0,
            cy: 500.0,
        }
    }
}

impl CameraIntrinsics {
    pub fn k_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    fn check(&self) -> Result<(), PoseError> {
        let finite = [self.fx, self.fy, self.cx, self.cy]
            .iter()
            .all(|v| v.is_finite());
        if finite && self.fx.abs() > 1e-12 && self.fy.abs() > 1e-12 {
            Ok(())
        } else {
            Err(PoseError::Singular)
        }
    }
}

/// Radial `k1, k2` and tangential `p1, p2` coefficients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distortion {
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
}

impl Distortion {
    pub fn is_zero(&self) -> bool {
        self.k1 == 0.0 && self.k2 == 0.0 && self.p1 == 0.0 && self.p2 == 0.0
    }

    /// Map ideal normalized coordinates to distorted ones.
    pub fn distort(&self, n: Vector2<f64>) -> Vector2<f64> {
        let (x, y) = (n.x, n.y);
        let r2 = x * x + y * y;
        let radial = 1.0 + self.k1 * r2 + self.k2 * r2 * r2;
        Vector2::new(x * radial, y * radial) + self.tangential(n, r2)
    }

    /// Invert [`Distortion::distort`] by fixed-point iteration.
    pub fn undistort(&self, d: Vector2<f64>) -> Vector2<f64> {
        if self.is_zero() {
            return d;
        }
        let mut n = d;
        for _ in 0..UNDISTORT_ITERATIONS {
            let r2 = n.norm_squared();
            let radial = 1.0 + self.k1 * r2 + self.k2 * r2 * r2;
            let next = (d - self.tangential(n, r2)) / radial;
            let converged = (next - n).norm_squared() < 1e-24;
            n = next;
            if converged {
                break;
            }
        }
        n
    }

    fn tangential(&self, n: Vector2<f64>, r2: f64) -> Vector2<f64> {
        let (x, y) = (n.x, n.y);
        Vector2::new(
            2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x),
            self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y,
        )
    }
}

/// Camera geometry passed explicitly to the pose stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraModel {
    pub intrinsics: CameraIntrinsics,
    pub distortion: Distortion,
}

impl CameraModel {
    pub fn new(intrinsics: CameraIntrinsics, distortion: Distortion) -> Self {
        Self {
            intrinsics,
            distortion,
        }
    }

    pub fn validate(&self) -> Result<(), PoseError> {
        self.intrinsics.check()
    }

    /// Project a point in camera coordinates; `None` behind the camera.
    pub fn project(&self, p: &Point3<f64>) -> Option<Point2<f64>> {
        if p.z <= 1e-12 {
            return None;
        }
        let d = self.distortion.distort(Vector2::new(p.x / p.z, p.y / p.z));
        let k = &self.intrinsics;
        Some(Point2::new(k.fx * d.x + k.cx, k.fy * d.y + k.cy))
    }

    /// Pixel to ideal (undistorted) normalized image coordinates.
    pub fn normalize(&self, px: &Point2<f64>) -> Vector2<f64> {
        let k = &self.intrinsics;
        let d = Vector2::new((px.x - k.cx) / k.fx, (px.y - k.cy) / k.fy);
        self.distortion.undistort(d)
    }

    /// Remove lens distortion from a pixel, keeping pixel units.
    pub fn undistort_pixel(&self, px: &Point2<f64>) -> Point2<f64> {
        let n = self.normalize(px);
        let k = &self.intrinsics;
        Point2::new(k.fx * n.x + k.cx, k.fy * n.y + k.cy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> CameraModel {
        CameraModel::new(
            CameraIntrinsics {
                fx: 900.0,
                fy: 880.0,
                cx: 640.0,
                cy: 360.0,
            },
            Distortion {
                k1: -0.2,
                k2: 0.05,
                p1: 0.001,
                p2: -0.0008,
            },
        )
    }

    #[test]
    fn defaults_match_the_reference_camera() {
        let cam = CameraModel::default();
        assert_eq!(cam.intrinsics.fx, 1000.0);
        assert_eq!(cam.intrinsics.cy, 500.0);
        assert!(cam.distortion.is_zero());
        assert_eq!(
            cam.project(&Point3::new(0.0, 0.0, 10.0)),
            Some(Point2::new(500.0, 500.0))
        );
    }

    #[test]
    fn undistort_inverts_distort() {
        let cam = camera();
        for n in [
            Vector2::new(0.0, 0.0),
            Vector2::new(0.2, -0.1),
            Vector2::new(-0.35, 0.25),
        ] {
            let back = cam.distortion.undistort(cam.distortion.distort(n));
            assert_relative_eq!(back, n, epsilon = 1e-9);
        }
    }

    #[test]
    fn projection_and_normalization_are_inverse() {
        let cam = camera();
        let p = Point3::new(0.3, -0.2, 1.5);
        let px = cam.project(&p).expect("in front");
        let n = cam.normalize(&px);
        assert_relative_eq!(n, Vector2::new(0.2, -0.2 / 1.5), epsilon = 1e-9);
        assert!(cam.project(&Point3::new(0.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn camera_json_fills_missing_fields() {
        let cam: CameraModel = serde_json::from_str(
            r#"{ "intrinsics": { "fx": 800, "fy": 800, "cx": 320, "cy": 240 } }"#,
        )
        .expect("json");
        assert!(cam.distortion.is_zero());
        assert_eq!(cam.intrinsics.cx, 320.0);

        let singular = CameraModel::new(
            CameraIntrinsics {
                fx: 0.0,
                ..CameraIntrinsics::default()
            },
            Distortion::default(),
        );
        assert_eq!(singular.validate(), Err(PoseError::Singular));
    }
}
