//! Four-corner marker outlines and their corner-order convention.
//!
//! A [`Quad`] in canonical order runs clockwise on screen (y axis down) and
//! starts at the corner nearest the top-left of the shape. Candidate
//! extraction, dictionary construction and signature sampling all rely on it.

use crate::polygon::{is_convex, polygon_area, signed_area};
use crate::Polygon;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Traversal direction of a closed outline as seen on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

impl Winding {
    /// Winding of a closed outline from its shoelace area.
    ///
    /// Returns `None` for outlines with zero area.
    pub fn of(points: &[Point2<f32>]) -> Option<Self> {
        let a = signed_area(points);
        if a > 0.0 {
            Some(Winding::Clockwise)
        } else if a < 0.0 {
            Some(Winding::CounterClockwise)
        } else {
            None
        }
    }
}

/// Quadrilateral in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point2<f32>; 4],
}

impl Quad {
    pub fn new(corners: [Point2<f32>; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned rectangle `(0,0) (w,0) (w,h) (0,h)`, already canonical.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new([
            Point2::new(0.0, 0.0),
            Point2::new(width, 0.0),
            Point2::new(width, height),
            Point2::new(0.0, height),
        ])
    }

    /// Take the vertices of a 4-vertex polygon as they are.
    pub fn from_polygon(poly: &Polygon) -> Option<Self> {
        let corners: [Point2<f32>; 4] = poly.vertices.as_slice().try_into().ok()?;
        Some(Self::new(corners))
    }

    pub fn winding(&self) -> Option<Winding> {
        Winding::of(&self.corners)
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.corners)
    }

    pub fn is_convex(&self) -> bool {
        is_convex(&self.corners)
    }

    pub fn centroid(&self) -> Point2<f32> {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2::new(sx / 4.0, sy / 4.0)
    }

    /// Corners in the same winding, starting at corner `k`.
    pub fn rotated_left(&self, k: usize) -> Self {
        let mut corners = self.corners;
        corners.rotate_left(k % 4);
        Self::new(corners)
    }
}

/// Bring a quad into canonical corner order.
///
/// Clockwise input is first re-expressed counter-clockwise with the same
/// first corner. Then, if that corner lies up and to the left of the
/// centroid (ties included), corners 2 and 4 swap places; otherwise corners
/// 1↔2 and 3↔4 swap. Either way the result runs clockwise. A quad already in
/// canonical order comes back unchanged.
pub fn normalize_corner_order(quad: &Quad) -> Quad {
    let [a, b, c, d] = quad.corners;
    let [p0, p1, p2, p3] = match quad.winding() {
        Some(Winding::Clockwise) => [a, d, c, b],
        _ => [a, b, c, d],
    };

    let centre = quad.centroid();
    if p0.x <= centre.x && p0.y <= centre.y {
        Quad::new([p0, p3, p2, p1])
    } else {
        Quad::new([p1, p0, p3, p2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    #[test]
    fn winding_uses_screen_orientation() {
        let cw = Quad::new([p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]);
        assert_eq!(cw.winding(), Some(Winding::Clockwise));
        let ccw = Quad::new([p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)]);
        assert_eq!(ccw.winding(), Some(Winding::CounterClockwise));
        let flat = Quad::new([p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)]);
        assert_eq!(flat.winding(), None);
    }

    #[test]
    fn ccw_from_top_left_becomes_clockwise() {
        // traced outline order: TL, BL, BR, TR
        let traced = Quad::new([p(100.0, 100.0), p(102.0, 300.0), p(301.0, 298.0), p(299.0, 101.0)]);
        let n = normalize_corner_order(&traced);
        assert_eq!(
            n.corners,
            [p(100.0, 100.0), p(299.0, 101.0), p(301.0, 298.0), p(102.0, 300.0)]
        );
        assert_eq!(n.winding(), Some(Winding::Clockwise));
    }

    #[test]
    fn ccw_from_top_right_starts_at_top_left() {
        // traced outline order: TR, TL, BL, BR
        let traced = Quad::new([p(300.0, 95.0), p(100.0, 100.0), p(105.0, 300.0), p(305.0, 295.0)]);
        let n = normalize_corner_order(&traced);
        assert_eq!(
            n.corners,
            [p(100.0, 100.0), p(300.0, 95.0), p(305.0, 295.0), p(105.0, 300.0)]
        );
        assert_eq!(n.winding(), Some(Winding::Clockwise));
    }

    #[test]
    fn normalization_is_idempotent_on_canonical_quads() {
        let quads = [
            Quad::from_size(240.0, 240.0),
            Quad::new([p(10.0, 12.0), p(90.0, 8.0), p(95.0, 88.0), p(12.0, 93.0)]),
            Quad::new([p(50.5, 40.25), p(140.0, 60.0), p(120.0, 150.0), p(40.0, 130.0)]),
        ];
        for q in quads {
            let once = normalize_corner_order(&q);
            assert_eq!(once, q);
            assert_eq!(normalize_corner_order(&once), once);
        }
    }

    #[test]
    fn polygon_with_wrong_vertex_count_is_not_a_quad() {
        let tri = Polygon {
            vertices: vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)],
        };
        assert!(Quad::from_polygon(&tri).is_none());
    }
}
