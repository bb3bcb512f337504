mod common;

use common::{frame_with_markers, printed, reference, CODE_A, CODE_B};
use squaremark_core::GrayImage;
use squaremark_marker::{
    DetectorParams, DictionaryParams, MarkerDetector, MarkerDictionary, ROTATIONS,
};

fn detector(references: &[GrayImage], params: DetectorParams) -> MarkerDetector {
    let views: Vec<_> = references.iter().map(|r| r.view()).collect();
    let dictionary = MarkerDictionary::from_references(&views, &DictionaryParams::default())
        .expect("dictionary");
    MarkerDetector::new(dictionary, params).expect("detector")
}

fn exact() -> DetectorParams {
    DetectorParams {
        tolerance: 0,
        ..DetectorParams::default()
    }
}

#[test]
fn reference_detects_itself_as_entry_zero() {
    let refimg = reference(&CODE_A, 40);
    let det = detector(&[refimg.clone()], exact());

    let found = det.detect(&refimg.view());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].index, 0);
    assert_eq!(found[0].distance, 0);
}

#[test]
fn blank_frame_yields_nothing() {
    let det = detector(&[reference(&CODE_A, 40)], DetectorParams::default());
    let frame = GrayImage::filled(640, 480, 255);
    assert!(det.detect(&frame.view()).is_empty());
}

#[test]
fn marker_on_a_white_frame_is_found_with_its_corners() {
    let det = detector(&[reference(&CODE_A, 20)], exact());
    let frame = frame_with_markers(400, &printed(&CODE_A, 40, 0), &[(80, 80)]);

    let found = det.detect(&frame.view());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].index, 0);
    let expected = [(79.5, 79.5), (319.5, 79.5), (319.5, 319.5), (79.5, 319.5)];
    for (c, (ex, ey)) in found[0].corners.corners.iter().zip(expected) {
        assert!((c.x - ex).abs() < 1.0 && (c.y - ey).abs() < 1.0, "{c:?}");
    }
}

#[test]
fn quarter_turned_marker_matches_the_turned_entry() {
    let refimg = reference(&CODE_A, 20);
    let det = detector(&[refimg], exact());

    for k in 0..4u8 {
        let marker = reference(&CODE_A, 40).rotated_cw(k);
        let frame = frame_with_markers(400, &marker, &[(80, 80)]);
        let found = det.detect(&frame.view());
        assert_eq!(found.len(), 1, "rotation {k}");
        assert_eq!(found[0].index, k as usize, "rotation {k}");
    }
}

#[test]
fn second_reference_is_told_apart() {
    let det = detector(&[reference(&CODE_A, 20), reference(&CODE_B, 20)], exact());
    let frame = frame_with_markers(400, &reference(&CODE_B, 40), &[(60, 90)]);

    let found = det.detect(&frame.view());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].index / ROTATIONS, 1);
    let entry = det.dictionary().entry(found[0].index).expect("entry");
    assert_eq!(entry.marker, 1);
}

#[test]
fn unknown_marker_is_ignored() {
    let det = detector(&[reference(&CODE_A, 20)], exact());
    let frame = frame_with_markers(400, &reference(&CODE_B, 40), &[(80, 80)]);
    assert!(det.detect(&frame.view()).is_empty());
}

#[test]
fn detection_stops_at_the_marker_cap() {
    let marker = reference(&CODE_A, 20);
    let offsets = [(40, 40), (340, 40), (40, 340), (340, 340)];
    let frame = frame_with_markers(600, &marker, &offsets);

    let capped = detector(&[marker.clone()], exact());
    assert_eq!(capped.detect(&frame.view()).len(), 3);

    let uncapped = detector(
        &[marker.clone()],
        DetectorParams {
            max_markers: 0,
            ..exact()
        },
    );
    let all = uncapped.detect(&frame.view());
    assert_eq!(all.len(), 4);
    assert!(all.iter().all(|m| m.index == 0));

    let one = detector(
        &[marker],
        DetectorParams {
            max_markers: 1,
            ..exact()
        },
    );
    let first = one.detect(&frame.view());
    assert_eq!(first.len(), 1);
    // scan order: the top-left marker comes first
    assert!(first[0].corners.corners[0].x < 100.0 && first[0].corners.corners[0].y < 100.0);
}
