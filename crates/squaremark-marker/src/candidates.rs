//! Quadrilateral candidates for marker borders.

use serde::{Deserialize, Serialize};
use squaremark_core::{
    adaptive_threshold_mean, approx_poly_dp, arc_length, find_external_contours,
    normalize_corner_order, refine_corners_subpix, AdaptiveThresholdParams, GrayImageView, Quad,
    SubPixParams,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateParams {
    pub threshold: AdaptiveThresholdParams,
    /// Polygon simplification tolerance as a fraction of the contour perimeter.
    pub epsilon_frac: f32,
    /// Minimum polygon area in px².
    pub min_area: f32,
    pub subpix: SubPixParams,
}

impl Default for CandidateParams {
    fn default() -> Self {
        Self {
            threshold: AdaptiveThresholdParams::default(),
            epsilon_frac: 0.05,
            min_area: 200.0,
            subpix: SubPixParams::default(),
        }
    }
}

/// Find convex quadrilateral outlines that may be marker borders.
///
/// Dark regions are segmented with an inverted adaptive mean threshold, the
/// outer contour of every external component is simplified, and 4-vertex
/// convex polygons of sufficient area are refined to sub-pixel accuracy and
/// returned in canonical corner order, in raster order of their contours.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(img, params), fields(w = img.width, h = img.height))
)]
/// Sub-pixel refine `quad`, dropping it if the refined corners fold it.
fn refine_quad(img: &GrayImageView<'_>, quad: &Quad, subpix: &SubPixParams) -> Option<Quad> {
    let mut corners = quad.corners;
    refine_corners_subpix(img, &mut corners, subpix);
    let refined = Quad::new(corners);
    if !refined.is_convex() {
        log::trace!("reject quad at {:?}: not convex after refinement", corners[0]);
        return None;
    }
    Some(normalize_corner_order(&refined))
}

pub fn find_candidates(img: &GrayImageView<'_>, params: &CandidateParams) -> Vec<Quad> {
    let binary = adaptive_threshold_mean(img, &params.threshold);
    let contours = find_external_contours(&binary.view());

    let mut out = Vec::new();
    for contour in &contours {
        if contour.len() < 4 {
            continue;
        }

        let eps = params.epsilon_frac * arc_length(&contour.points, true);
        let poly = approx_poly_dp(&contour.points, eps, true);
        let Some(quad) = Quad::from_polygon(&poly) else {
            log::trace!(
                "reject contour at {:?}: {} vertices",
                contour.points[0],
                poly.len()
            );
            continue;
        };
        let area = quad.area();
        if area < params.min_area {
            log::trace!("reject quad at {:?}: area {area:.1}", quad.corners[0]);
            continue;
        }
        if !quad.is_convex() {
            log::trace!("reject quad at {:?}: not convex", quad.corners[0]);
            continue;
        }

        if let Some(refined) = refine_quad(img, &quad, &params.subpix) {
            out.push(refined);
        }
    }

    log::debug!(
        "{} contours -> {} quad candidates",
        contours.len(),
        out.len()
    );
    out
}
