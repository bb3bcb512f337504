//! Marker pose from four planar correspondences.
//!
//! The marker lies on `z = 0` in its own frame. A plane-to-image homography
//! `H ~ K [r1 r2 t]` is estimated from the undistorted corners and split into
//! rotation and translation; the rotation is projected onto SO(3) with an SVD.

use crate::{CameraModel, PoseError};
use nalgebra::{Isometry3, Matrix3, Point2, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use squaremark_core::homography_from_4pt;

/// Marker points with larger `|z|` are not on the marker plane.
const PLANE_TOLERANCE: f64 = 1e-9;

/// Rigid transform from marker to camera coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerPose {
    pub camera_from_marker: Isometry3<f64>,
    /// RMS pixel distance between observed and reprojected corners.
    pub reprojection_rmse: f64,
}

impl MarkerPose {
    /// Axis-angle rotation vector.
    pub fn rvec(&self) -> Vector3<f64> {
        self.camera_from_marker.rotation.scaled_axis()
    }

    pub fn tvec(&self) -> Vector3<f64> {
        self.camera_from_marker.translation.vector
    }
}

/// Pose estimation seam; marker-frame points in, camera-from-marker out.
pub trait PoseSolver {
    fn solve(
        &self,
        world: &[Point3<f64>],
        image: &[Point2<f64>],
        camera: &CameraModel,
    ) -> Result<MarkerPose, PoseError>;
}

/// Linear pose from the plane-induced homography of the four marker corners.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanarHomographyPose;

impl PoseSolver for PlanarHomographyPose {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, world, image, camera))
    )]
    fn solve(
        &self,
        world: &[Point3<f64>],
        image: &[Point2<f64>],
        camera: &CameraModel,
    ) -> Result<MarkerPose, PoseError> {
        let (world, image) =
            match (<&[Point3<f64>; 4]>::try_from(world), <&[Point2<f64>; 4]>::try_from(image)) {
                (Ok(w), Ok(i)) => (w, i),
                _ => {
                    return Err(PoseError::Correspondences {
                        world: world.len(),
                        image: image.len(),
                    })
                }
            };
        if world.iter().any(|p| p.z.abs() > PLANE_TOLERANCE) {
            return Err(PoseError::NonPlanar);
        }
        camera.validate()?;

        let plane = world.map(|p| Point2::new(p.x as f32, p.y as f32));
        let pixels = image.map(|p| {
            let u = camera.undistort_pixel(&p);
            Point2::new(u.x as f32, u.y as f32)
        });
        let h = homography_from_4pt(&plane, &pixels)
            .ok_or(PoseError::Degenerate("corners do not span a quadrilateral"))?;

        let camera_from_marker = pose_from_homography(&camera.intrinsics.k_matrix(), &h.h)?;
        let reprojection_rmse = reprojection_rmse(&camera_from_marker, camera, world, image);
        log::trace!(
            "pose t = {:?}, rmse = {reprojection_rmse:.4} px",
            camera_from_marker.translation.vector.as_slice()
        );

        Ok(MarkerPose {
            camera_from_marker,
            reprojection_rmse,
        })
    }
}

/// Split `H ~ K [r1 r2 t]` into a rigid transform with the marker in front of
/// the camera.
pub fn pose_from_homography(k: &Matrix3<f64>, h: &Matrix3<f64>) -> Result<Isometry3<f64>, PoseError> {
    let k_inv = k.try_inverse().ok_or(PoseError::Singular)?;

    let b1 = k_inv * h.column(0);
    let b2 = k_inv * h.column(1);
    let b3 = k_inv * h.column(2);

    let norm1 = b1.norm();
    let norm2 = b2.norm();
    if norm1 <= 1e-12 || norm2 <= 1e-12 {
        return Err(PoseError::Degenerate("homography columns vanish"));
    }
    let lambda = 2.0 / (norm1 + norm2);

    let mut r1 = lambda * b1;
    let mut r2 = lambda * b2;
    let mut t = lambda * b3;
    if t.z < 0.0 {
        r1 = -r1;
        r2 = -r2;
        t = -t;
    }
    let r3 = r1.cross(&r2);
    if r3.norm() <= 1e-12 {
        return Err(PoseError::Degenerate("rotation columns are parallel"));
    }

    let r = Matrix3::from_columns(&[r1, r2, r3]);
    let svd = r.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(PoseError::Degenerate("rotation SVD failed"));
    };
    let mut r_orth = u * v_t;
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r_orth));
    Ok(Isometry3::from_parts(Translation3::from(t), rotation))
}

fn reprojection_rmse(
    camera_from_marker: &Isometry3<f64>,
    camera: &CameraModel,
    world: &[Point3<f64>; 4],
    image: &[Point2<f64>; 4],
) -> f64 {
    let mut sum = 0.0;
    for (pw, observed) in world.iter().zip(image) {
        match camera.project(&camera_from_marker.transform_point(pw)) {
            Some(projected) => sum += (projected - *observed).norm_squared(),
            None => return f64::INFINITY,
        }
    }
    (sum / world.len() as f64).sqrt()
}

/// Project marker-frame points into pixels; points behind the camera map to
/// `None`.
pub fn project_points(
    pose: &MarkerPose,
    camera: &CameraModel,
    points: &[Point3<f64>],
) -> Vec<Option<Point2<f64>>> {
    points
        .iter()
        .map(|p| camera.project(&pose.camera_from_marker.transform_point(p)))
        .collect()
}

/// Origin and the ends of the marker's x, y and z axes. The z axis points
/// out of the printed face, towards the camera.
pub fn axis_points(length: f64) -> [Point3<f64>; 4] {
    [
        Point3::origin(),
        Point3::new(length, 0.0, 0.0),
        Point3::new(0.0, length, 0.0),
        Point3::new(0.0, 0.0, -length),
    ]
}
