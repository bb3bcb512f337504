//! Polygon measures and Douglas–Peucker simplification.

use nalgebra::Point2;

/// Simplified closed polygon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point2<f32>>,
}

impl Polygon {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.vertices)
    }

    pub fn is_convex(&self) -> bool {
        is_convex(&self.vertices)
    }
}

/// Perimeter of the polyline; `closed` adds the last-to-first segment.
pub fn arc_length(points: &[Point2<f32>], closed: bool) -> f32 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let open: f32 = points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    if closed {
        open + (points[0] - points[n - 1]).norm()
    } else {
        open
    }
}

/// Shoelace area. Positive when the points run clockwise on screen (y down).
pub fn signed_area(points: &[Point2<f32>]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    (0.5 * acc) as f32
}

pub fn polygon_area(points: &[Point2<f32>]) -> f32 {
    signed_area(points).abs()
}

/// `true` when every turn of the closed polygon bends the same way.
///
/// Collinear turns are tolerated as long as at least one turn is proper.
pub fn is_convex(points: &[Point2<f32>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0i8;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        let s = if cross > 0.0 {
            1
        } else if cross < 0.0 {
            -1
        } else {
            continue;
        };
        if sign == 0 {
            sign = s;
        } else if sign != s {
            return false;
        }
    }
    sign != 0
}

fn perpendicular_distance(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mag = (dx * dx + dy * dy).sqrt();
    if mag < 1e-9 {
        return (p - a).norm();
    }
    (dy * p.x - dx * p.y + b.x * a.y - b.y * a.x).abs() / mag
}

/// Douglas–Peucker simplification with tolerance `epsilon` in pixels.
///
/// Closed curves are split at their first point and the point farthest from
/// it, each half is simplified on its own, and a final cyclic pass drops any
/// vertex within `epsilon` of the chord joining its neighbours (the first
/// point included). Output vertices keep their input order.
pub fn approx_poly_dp(points: &[Point2<f32>], epsilon: f32, closed: bool) -> Polygon {
    let n = points.len();
    if n < 3 {
        return Polygon {
            vertices: points.to_vec(),
        };
    }

    let mut keep = vec![false; n];
    keep[0] = true;

    if closed {
        let far = farthest_from(points, 0);
        if far == 0 {
            return Polygon {
                vertices: vec![points[0]],
            };
        }
        keep[far] = true;
        simplify_range(points, &mut keep, 0, far, epsilon);
        simplify_range(points, &mut keep, far, n, epsilon);
    } else {
        keep[n - 1] = true;
        simplify_range(points, &mut keep, 0, n - 1, epsilon);
    }

    let mut vertices: Vec<Point2<f32>> = points
        .iter()
        .zip(&keep)
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect();

    if closed {
        drop_near_collinear(&mut vertices, epsilon);
    }

    Polygon { vertices }
}

fn farthest_from(points: &[Point2<f32>], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_d = 0.0f32;
    for (i, p) in points.iter().enumerate() {
        let d = (p - origin).norm_squared();
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

/// Iterative Douglas–Peucker on `start..=end`, indices taken modulo the length.
fn simplify_range(points: &[Point2<f32>], keep: &mut [bool], start: usize, end: usize, epsilon: f32) {
    let n = points.len();
    let mut stack = vec![(start, end)];

    while let Some((s, e)) = stack.pop() {
        if e - s < 2 {
            continue;
        }
        let a = points[s % n];
        let b = points[e % n];

        let mut dmax = 0.0;
        let mut index = s;
        for i in s + 1..e {
            let d = perpendicular_distance(points[i % n], a, b);
            if d > dmax {
                index = i;
                dmax = d;
            }
        }

        if dmax > epsilon {
            keep[index % n] = true;
            stack.push((s, index));
            stack.push((index, e));
        }
    }
}

fn drop_near_collinear(vertices: &mut Vec<Point2<f32>>, epsilon: f32) {
    let mut i = 0;
    while vertices.len() > 3 && i < vertices.len() {
        let n = vertices.len();
        let prev = vertices[(i + n - 1) % n];
        let next = vertices[(i + 1) % n];
        if perpendicular_distance(vertices[i], prev, next) <= epsilon {
            vertices.remove(i);
            // the previous vertex has a new neighbour, look at it again
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    /// Dense closed outline through the given vertices, one point per pixel.
    fn densify(vertices: &[Point2<f32>]) -> Vec<Point2<f32>> {
        let mut out = Vec::new();
        for i in 0..vertices.len() {
            let a = vertices[i];
            let b = vertices[(i + 1) % vertices.len()];
            let steps = (b - a).norm().ceil().max(1.0) as usize;
            for s in 0..steps {
                out.push(a + (b - a) * (s as f32 / steps as f32));
            }
        }
        out
    }

    #[test]
    fn area_sign_follows_screen_winding() {
        let cw = [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 3.0), p(0.0, 3.0)];
        assert_relative_eq!(signed_area(&cw), 12.0);
        let ccw: Vec<_> = cw.iter().rev().copied().collect();
        assert_relative_eq!(signed_area(&ccw), -12.0);
        assert_relative_eq!(polygon_area(&ccw), 12.0);
        assert_relative_eq!(arc_length(&cw, true), 14.0);
        assert_relative_eq!(arc_length(&cw, false), 11.0);
    }

    #[test]
    fn convexity_rejects_reflex_vertex() {
        let square = [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)];
        assert!(is_convex(&square));
        let chevron = [p(100.0, 100.0), p(300.0, 200.0), p(100.0, 300.0), p(180.0, 200.0)];
        assert!(!is_convex(&chevron));
        assert!(!is_convex(&[p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)]));
    }

    #[test]
    fn closed_outline_reduces_to_corners() {
        let corners = [p(10.0, 10.0), p(10.0, 60.0), p(60.0, 60.0), p(60.0, 10.0)];
        let dense = densify(&corners);
        let eps = 0.05 * arc_length(&dense, true);
        let poly = approx_poly_dp(&dense, eps, true);
        assert_eq!(poly.vertices, corners.to_vec());
        assert!(poly.is_convex());
    }

    #[test]
    fn start_point_on_an_edge_is_dropped() {
        // outline starts halfway along the top edge
        let corners = [p(35.0, 10.0), p(10.0, 10.0), p(10.0, 60.0), p(60.0, 60.0), p(60.0, 10.0)];
        let dense = densify(&corners);
        let eps = 0.05 * arc_length(&dense, true);
        let poly = approx_poly_dp(&dense, eps, true);
        assert_eq!(poly.len(), 4);
        assert_eq!(poly.vertices[0], p(10.0, 10.0));
    }

    #[test]
    fn triangle_keeps_three_vertices() {
        let corners = [p(200.0, 100.0), p(100.0, 300.0), p(300.0, 300.0)];
        let dense = densify(&corners);
        let eps = 0.05 * arc_length(&dense, true);
        assert_eq!(approx_poly_dp(&dense, eps, true).len(), 3);
    }

    #[test]
    fn open_polyline_keeps_endpoints() {
        let line = [p(0.0, 0.0), p(1.0, 0.1), p(2.0, -0.1), p(3.0, 0.0)];
        let poly = approx_poly_dp(&line, 0.5, false);
        assert_eq!(poly.vertices, vec![p(0.0, 0.0), p(3.0, 0.0)]);
    }
}
