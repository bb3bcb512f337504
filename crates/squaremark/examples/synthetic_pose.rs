//! Render a marker, detect it in a synthetic frame and print its pose.
//!
//! ```text
//! cargo run -p squaremark --example synthetic_pose
//! ```

use squaremark::detect;
use squaremark::marker::{
    add_quiet_zone, parse_code, render_marker, DetectorParams, DictionaryParams, MarkerDetector,
};
use squaremark::pose::{estimate_poses, CameraModel, PlanarHomographyPose};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    squaremark::core::init_with_level(log::LevelFilter::Debug)?;

    let code = parse_code("100101/011010/110011/001100/101010/010101")?;
    let reference = detect::from_core_image(&render_marker(&code, 20)?)?;
    let frame = detect::from_core_image(&add_quiet_zone(&render_marker(&code, 30)?, 260, 255))?;

    let params = DictionaryParams::default();
    let dictionary = detect::build_dictionary(&[reference], &params)?;
    let detector = MarkerDetector::new(dictionary, DetectorParams::default())?;

    let markers = detect::detect_markers(&frame, &detector);
    let camera = CameraModel::default();
    let poses = estimate_poses(&PlanarHomographyPose, &camera, detector.dictionary(), &markers);

    for (marker, pose) in markers.iter().zip(poses) {
        println!("entry {} distance {}", marker.index, marker.distance);
        match pose {
            Ok(p) => println!(
                "  t = {:?}, r = {:?}, rmse = {:.3} px",
                p.tvec().as_slice(),
                p.rvec().as_slice(),
                p.reprojection_rmse
            ),
            Err(e) => println!("  pose failed: {e}"),
        }
    }
    Ok(())
}
