use crate::{CameraModel, MarkerPose, PoseError, PoseSolver};
use nalgebra::Point2;
use squaremark_marker::{MarkerDictionary, RecognizedMarker};

/// Solve one pose per recognized marker, pairing its image corners with the
/// world corners of the matched dictionary entry.
///
/// Results keep the order of `markers`; a failure for one marker does not
/// affect the others.
pub fn estimate_poses<S: PoseSolver + ?Sized>(
    solver: &S,
    camera: &CameraModel,
    dictionary: &MarkerDictionary,
    markers: &[RecognizedMarker],
) -> Vec<Result<MarkerPose, PoseError>> {
    markers
        .iter()
        .map(|marker| {
            let world = dictionary
                .world_corners(marker.index)
                .ok_or(PoseError::UnknownEntry {
                    index: marker.index,
                })?;
            let image = marker
                .corners
                .corners
                .map(|c| Point2::new(c.x as f64, c.y as f64));
            let pose = solver.solve(&world, &image, camera);
            if let Err(e) = &pose {
                log::debug!("pose for entry {} failed: {e}", marker.index);
            }
            pose
        })
        .collect()
}
