//! Core image and geometry primitives for square fiducial marker detection.
//!
//! A small grayscale image container plus the image-processing and geometric
//! building blocks the marker pipeline is made of: thresholding, contour
//! tracing, polygon approximation, sub-pixel refinement and homographies.
//! Nothing here knows about marker codes or dictionaries.

mod contours;
mod homography;
mod image;
mod logger;
mod morphology;
mod polygon;
mod quad;
mod subpix;
mod threshold;

pub use contours::{find_external_contours, Contour};
pub use homography::{homography_from_4pt, warp_perspective_gray, Homography};
pub use image::{sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView};
pub use morphology::erode_3x3;
pub use polygon::{
    approx_poly_dp, arc_length, is_convex, polygon_area, signed_area, Polygon,
};
pub use quad::{normalize_corner_order, Quad, Winding};
pub use subpix::{refine_corners_subpix, SubPixParams};
pub use threshold::{
    adaptive_threshold_mean, binarize, otsu_threshold, AdaptiveThresholdParams,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
