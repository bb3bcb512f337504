//! Square fiducial markers with a binary code inside a black border.
//!
//! The pipeline has four stages:
//! - [`find_candidates`]: convex quadrilaterals from an adaptive threshold of
//!   the frame, corners refined and put in canonical order,
//! - [`SignatureSampler`]: rectify a quad into a `bits × bits` patch and read
//!   a [`BitSignature`],
//! - [`MarkerDictionary`]: four signatures per reference image, one per
//!   quarter turn,
//! - [`Matcher`]: first dictionary entry within a Hamming tolerance.
//!
//! [`MarkerDetector`] runs them in order on a frame.
//!
//! ```no_run
//! use squaremark_marker::{DetectorParams, DictionaryParams, MarkerDetector, MarkerDictionary};
//! # fn run(reference: squaremark_core::GrayImageView<'_>, frame: squaremark_core::GrayImageView<'_>)
//! # -> Result<(), squaremark_marker::MarkerError> {
//! let dictionary = MarkerDictionary::from_reference(&reference, &DictionaryParams::default())?;
//! let detector = MarkerDetector::new(dictionary, DetectorParams::default())?;
//! for marker in detector.detect(&frame) {
//!     println!("entry {} at {:?}", marker.index, marker.corners.corners);
//! }
//! # Ok(())
//! # }
//! ```

mod candidates;
mod detector;
mod dictionary;
mod error;
mod matcher;
mod render;
mod signature;

pub use candidates::{find_candidates, CandidateParams};
pub use detector::{DetectorParams, MarkerDetector, RecognizedMarker};
pub use dictionary::{DictionaryEntry, DictionaryParams, MarkerDictionary, ROTATIONS};
pub use error::MarkerError;
pub use matcher::{match_signature, Matcher, SignatureMatch};
pub use render::{add_quiet_zone, parse_code, render_marker};
pub use signature::{grid_side, sample_signature, MAX_BITS, BitSignature, SignatureSampler};
