//! Camera model and marker pose estimation.
//!
//! Every recognized marker carries four image corners; the matched
//! dictionary entry supplies the corresponding marker-frame corners on the
//! `z = 0` plane. A [`PoseSolver`] turns those into a [`MarkerPose`] given an
//! explicit [`CameraModel`].
//!
//! ```no_run
//! use squaremark_pose::{estimate_poses, CameraModel, PlanarHomographyPose};
//! # fn run(
//! #     dictionary: &squaremark_marker::MarkerDictionary,
//! #     markers: &[squaremark_marker::RecognizedMarker],
//! # ) {
//! let camera = CameraModel::default();
//! for pose in estimate_poses(&PlanarHomographyPose, &camera, dictionary, markers) {
//!     match pose {
//!         Ok(p) => println!("t = {:?}", p.tvec()),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! # }
//! ```

mod camera;
mod error;
mod estimate;
mod pose;

pub use camera::{CameraIntrinsics, CameraModel, Distortion};
pub use error::PoseError;
pub use estimate::estimate_poses;
pub use pose::{
    axis_points, pose_from_homography, project_points, MarkerPose, PlanarHomographyPose,
    PoseSolver,
};
