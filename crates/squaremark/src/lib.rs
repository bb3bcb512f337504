//! High-level facade crate for the `squaremark-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - JSON configuration and report types for batch detection
//! - (feature-gated) adapters from the `image` crate and an end-to-end batch
//!   runner.
//!
//! ## Quickstart
//!
//! ```no_run
//! use squaremark::detect;
//! use squaremark::marker::{DetectorParams, DictionaryParams, MarkerDetector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reference = detect::load_gray("marker.png")?;
//! let dictionary = detect::build_dictionary(&[reference], &DictionaryParams::default())?;
//! let detector = MarkerDetector::new(dictionary, DetectorParams::default())?;
//!
//! let frame = detect::load_gray("frame.png")?;
//! for m in detect::detect_markers(&frame, &detector) {
//!     println!("entry {} (distance {})", m.index, m.distance);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `squaremark::core`: images, homographies, thresholds, contours, quads.
//! - `squaremark::marker`: candidates, signatures, dictionaries, matching.
//! - `squaremark::pose`: camera model and marker pose estimation.
//! - `squaremark::config`: JSON job configuration and reports.
//! - `squaremark::detect` (feature `image`): end-to-end helpers from `image::GrayImage`.

pub use squaremark_core as core;
pub use squaremark_marker as marker;
pub use squaremark_pose as pose;

pub use squaremark_core::{GrayImage, GrayImageView, Quad, Winding};
pub use squaremark_marker::{DetectorParams, MarkerDetector, MarkerDictionary, RecognizedMarker};
pub use squaremark_pose::{CameraModel, MarkerPose, PoseSolver};

pub mod config;

#[cfg(feature = "image")]
pub mod detect;
