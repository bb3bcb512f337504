mod common;

use common::fill_polygon;
use squaremark_core::{GrayImage, Winding};
use squaremark_marker::{find_candidates, CandidateParams};

#[test]
fn black_square_on_white_yields_one_quad() {
    let mut img = GrayImage::filled(400, 400, 255);
    for y in 100..300 {
        for x in 100..300 {
            img.set(x, y, 0);
        }
    }

    let quads = find_candidates(&img.view(), &CandidateParams::default());
    assert_eq!(quads.len(), 1);

    let q = quads[0];
    assert_eq!(q.winding(), Some(Winding::Clockwise));
    let expected = [(99.5, 99.5), (299.5, 99.5), (299.5, 299.5), (99.5, 299.5)];
    for (c, (ex, ey)) in q.corners.iter().zip(expected) {
        assert!(
            (c.x - ex).abs() < 1.0 && (c.y - ey).abs() < 1.0,
            "corner {c:?} expected near ({ex}, {ey})"
        );
    }
}

#[test]
fn triangle_is_not_a_candidate() {
    let mut img = GrayImage::filled(400, 400, 255);
    fill_polygon(&mut img, &[(100.0, 300.0), (300.0, 300.0), (200.0, 100.0)], 0);
    assert!(find_candidates(&img.view(), &CandidateParams::default()).is_empty());
}

#[test]
fn non_convex_quad_is_not_a_candidate() {
    let mut img = GrayImage::filled(400, 400, 255);
    fill_polygon(
        &mut img,
        &[(100.0, 100.0), (300.0, 200.0), (100.0, 300.0), (180.0, 200.0)],
        0,
    );
    assert!(find_candidates(&img.view(), &CandidateParams::default()).is_empty());
}

#[test]
fn small_squares_fall_below_min_area() {
    let mut img = GrayImage::filled(100, 100, 255);
    for y in 40..50 {
        for x in 40..50 {
            img.set(x, y, 0);
        }
    }
    assert!(find_candidates(&img.view(), &CandidateParams::default()).is_empty());

    let params = CandidateParams {
        min_area: 50.0,
        ..CandidateParams::default()
    };
    assert_eq!(find_candidates(&img.view(), &params).len(), 1);
}

#[test]
fn blank_frame_has_no_candidates() {
    let img = GrayImage::filled(320, 240, 255);
    assert!(find_candidates(&img.view(), &CandidateParams::default()).is_empty());
}

#[test]
fn rotated_square_starts_near_top_left() {
    let mut img = GrayImage::filled(400, 400, 255);
    // square tilted by roughly 10 degrees
    let corners = [(120.0, 100.0), (300.0, 132.0), (268.0, 312.0), (88.0, 280.0)];
    fill_polygon(&mut img, &corners, 0);

    let quads = find_candidates(&img.view(), &CandidateParams::default());
    assert_eq!(quads.len(), 1);
    let q = quads[0];
    assert_eq!(q.winding(), Some(Winding::Clockwise));
    let first = q.corners[0];
    assert!((first.x - 120.0).abs() < 3.0 && (first.y - 100.0).abs() < 3.0, "{first:?}");
}
