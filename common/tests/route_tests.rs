//! Route format parsing and reconstruction.
//!
//! Covers:
//! - Segment endpoints appended in file order, seeded at the chip1 bump
//! - Via markers surfaced but contributing no planar point
//! - Block close on `.end`, on end of input, and on a fresh header
//! - Structural failure on junk inside a route block

use d2d_common::formats::route::{self, RouteEvent};
use d2d_common::formats::FormatError;
use d2d_common::geom::point::Point;
use d2d_common::geom::rect::Rect;
use d2d_common::model::core::{Bump, Chip, Layer};
use d2d_common::model::indices::NetId;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn chip1() -> Chip {
    Chip {
        rect: Rect::from_ll_size(Point::new(0, 0), 20, 20),
        bumps: vec![
            Bump {
                idx: 1,
                position: Point::new(0, 0),
            },
            Bump {
                idx: 3,
                position: Point::new(10, 0),
            },
        ],
    }
}

#[test]
fn reconstructs_route_with_via() {
    let content = "\
n3
M1 10 0 7 9
via
M2 7 9 7 12
.end
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "via.lg", content);

    let traces = route::parse(&path).unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].id, NetId(3));
    assert_eq!(traces[0].events.len(), 3);
    assert_eq!(traces[0].events[1], RouteEvent::Via);

    let nets = route::reconstruct(&path, &traces, &chip1()).unwrap();
    let net3 = &nets[&NetId(3)];
    assert_eq!(
        net3.points,
        vec![Point::new(10, 0), Point::new(7, 9), Point::new(7, 12)]
    );
    assert_eq!(net3.vias, 1);
}

#[test]
fn unrouted_nets_keep_their_seed_point() {
    let content = "\
n3
M1 10 0 10 10
.end
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "partial.lg", content);

    let traces = route::parse(&path).unwrap();
    let nets = route::reconstruct(&path, &traces, &chip1()).unwrap();

    assert_eq!(nets[&NetId(1)].points, vec![Point::new(0, 0)]);
    assert_eq!(
        nets[&NetId(3)].points,
        vec![Point::new(10, 0), Point::new(10, 10)]
    );
}

#[test]
fn segment_layers_are_preserved() {
    let content = "\
n1
M1 0 0 0 10
M2 0 10 30 10
.end
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "layers.lg", content);

    let traces = route::parse(&path).unwrap();
    match traces[0].events[0] {
        RouteEvent::Segment { layer, from, to } => {
            assert_eq!(layer, Layer::M1);
            assert_eq!(from, Point::new(0, 0));
            assert_eq!(to, Point::new(0, 10));
        }
        other => panic!("expected segment, got {:?}", other),
    }
    match traces[0].events[1] {
        RouteEvent::Segment { layer, .. } => assert_eq!(layer, Layer::M2),
        other => panic!("expected segment, got {:?}", other),
    }
}

#[test]
fn fresh_header_closes_open_block() {
    let content = "\
n1
M1 0 0 0 10
n3
M1 10 0 10 10
.end
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "noend.lg", content);

    let traces = route::parse(&path).unwrap();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0].id, NetId(1));
    assert_eq!(traces[0].events.len(), 1);
    assert_eq!(traces[1].id, NetId(3));
}

#[test]
fn end_of_input_closes_open_block() {
    let content = "\
n1
M1 0 0 0 10
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "eof.lg", content);

    let traces = route::parse(&path).unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].events.len(), 1);
}

#[test]
fn junk_record_in_route_is_structural() {
    let content = "\
n1
M3 0 0 0 10
.end
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "junk.lg", content);

    let err = route::parse(&path).unwrap_err();
    match err {
        FormatError::Structural { token, .. } => assert_eq!(token, "M3"),
        other => panic!("expected structural error, got {:?}", other),
    }
}

#[test]
fn short_segment_record_is_arity_error() {
    let content = "\
n1
M1 0 0 0
.end
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "shortseg.lg", content);

    let err = route::parse(&path).unwrap_err();
    assert!(
        matches!(
            err,
            FormatError::Arity {
                expected: 5,
                found: 4,
                ..
            }
        ),
        "{:?}",
        err
    );
}

#[test]
fn route_for_unknown_bump_is_rejected() {
    let content = "\
n9
M1 0 0 0 10
.end
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "unknown.lg", content);

    let traces = route::parse(&path).unwrap();
    let err = route::reconstruct(&path, &traces, &chip1()).unwrap_err();
    assert!(matches!(err, FormatError::Consistency { .. }), "{:?}", err);
}
