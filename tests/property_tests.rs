//! Property-based tests using proptest
//!
//! Invariants of the geometry kernel that should hold for any input:
//! - transform composition is associative
//! - a transform composed with its inverse is the identity on points
//! - simple rings triangulate into N-2 triangles covering the ring's area
//! - polygon containment agrees with even-odd ray casting

use std::f64::consts::TAU;

use proptest::prelude::*;

use layout_trace::geometry::{cross, Transform};
use layout_trace::layer::LayerId;
use layout_trace::polygon::triangulate;
use layout_trace::{Point, Polygon};

fn transform() -> impl Strategy<Value = Transform> {
    prop::array::uniform6(-5.0f64..5.0).prop_map(|[a, b, c, d, e, f]| Transform::new(a, b, c, d, e, f))
}

/// Star-shaped ring around the origin: sorted angles, one per sector
fn star_ring() -> impl Strategy<Value = Vec<Point>> {
    (3usize..14).prop_flat_map(|n| {
        prop::collection::vec((0.0f64..0.8, 1.0f64..10.0), n).prop_map(move |samples| {
            samples
                .iter()
                .enumerate()
                .map(|(i, &(jitter, radius))| {
                    let angle = (i as f64 + jitter) * TAU / n as f64;
                    Point::new(radius * angle.cos(), radius * angle.sin())
                })
                .collect()
        })
    })
}

fn shoelace(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

/// Reference even-odd test
fn ray_cast(points: &[Point], p: Point) -> bool {
    let n = points.len();
    let mut inside = false;
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

fn distance_to_segment(a: Point, b: Point, p: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - qx).powi(2) + (p.y - qy).powi(2)).sqrt()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_compose_is_associative(a in transform(), b in transform(), c in transform()) {
        let left = (a * b) * c;
        let right = a * (b * c);
        prop_assert!(left.approx_eq(&right, 1e-9), "{:?} != {:?}", left, right);
    }

    #[test]
    fn prop_inverse_round_trip(m in transform(), x in -100.0f64..100.0, y in -100.0f64..100.0) {
        prop_assume!(m.determinant().abs() > 0.1);
        let inv = m.inverse().expect("non-degenerate");
        let p = Point::new(x, y);

        let q = (m * inv).apply(p);
        prop_assert!((q.x - x).abs() < 1e-6 && (q.y - y).abs() < 1e-6);
        let q = (inv * m).apply(p);
        prop_assert!((q.x - x).abs() < 1e-6 && (q.y - y).abs() < 1e-6);
    }

    #[test]
    fn prop_snap_is_idempotent(m in transform()) {
        let s = m.snapped();
        prop_assert_eq!(s.snapped().key(), s.key());
    }

    #[test]
    fn prop_triangulation_covers_area(points in star_ring(), reverse in any::<bool>()) {
        let mut points = points;
        if reverse {
            points.reverse();
        }
        let tris = triangulate(&points);
        prop_assert_eq!(tris.len(), points.len() - 2);

        let area = shoelace(&points).abs();
        let covered: f64 = tris
            .iter()
            .map(|t| cross(points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]).abs() / 2.0)
            .sum();
        prop_assert!((area - covered).abs() < 1e-6 * area.max(1.0), "area {} covered {}", area, covered);
    }

    #[test]
    fn prop_contains_matches_ray_casting(points in star_ring(), x in -11.0f64..11.0, y in -11.0f64..11.0) {
        let p = Point::new(x, y);
        let n = points.len();
        let clearance = (0..n)
            .map(|i| distance_to_segment(points[i], points[(i + 1) % n], p))
            .fold(f64::INFINITY, f64::min);
        prop_assume!(clearance > 1e-6);

        let expected = ray_cast(&points, p);
        let polygon = Polygon::from_points(LayerId(0), 0.0, 1.0, points);
        prop_assert_eq!(polygon.contains_point(p), expected);
    }
}
