//! Polygon triangulation
//!
//! Convex rings are fanned from vertex 0. Everything else goes through ear
//! clipping; if clipping stalls (self-touching or degenerate rings) the ring
//! is handed to earcut instead. Triangles always share the winding of the
//! ring, which `Polygon::flip` relies on.

use crate::geometry::{cross, point_in_triangle, Point, EPSILON};

/// Turn tolerance for the convexity fast path
const CONVEX_EPSILON: f64 = 1e-7;

/// Triangulate a closed ring into index triples
///
/// A simple ring of N >= 3 vertices yields N-2 triangles; fewer than three
/// vertices yield none.
pub fn triangulate(points: &[Point]) -> Vec<[u32; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    if is_convex(points) {
        return fan(n);
    }

    let clipped = ear_clip(points);
    if clipped.len() == n - 2 {
        return clipped;
    }

    let fallback = earcut(points);
    if fallback.len() > clipped.len() {
        fallback
    } else {
        clipped
    }
}

/// True if consecutive edges never turn in opposite directions
pub fn is_convex(points: &[Point]) -> bool {
    let n = points.len();
    let mut pos = 0usize;
    let mut neg = 0usize;

    for j in 0..n {
        let p0 = points[j];
        let p1 = points[(j + 1) % n];
        let p2 = points[(j + 2) % n];
        let nz = cross(p0, p1, p2);
        if nz > CONVEX_EPSILON {
            pos += 1;
        }
        if nz < -CONVEX_EPSILON {
            neg += 1;
        }
    }

    !(pos > 0 && neg > 0)
}

/// Twice the signed area, accumulated as a fan around vertex 0
pub fn signed_area2(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let p0 = points[0];
    points
        .windows(2)
        .skip(1)
        .map(|w| cross(p0, w[0], w[1]))
        .sum()
}

fn fan(n: usize) -> Vec<[u32; 3]> {
    (0..n - 2)
        .map(|j| [0, (j + 1) as u32, (j + 2) as u32])
        .collect()
}

/// Ear clipping over the live vertex ring
fn ear_clip(points: &[Point]) -> Vec<[u32; 3]> {
    let n = points.len();
    let winding = if signed_area2(points) < 0.0 { -1.0 } else { 1.0 };

    let mut ring: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while ring.len() > 2 {
        let m = ring.len();
        let mut clipped = false;

        for j in 0..m {
            let (a, b, c) = (j, (j + 1) % m, (j + 2) % m);
            let (ia, ib, ic) = (ring[a], ring[b], ring[c]);
            let (pa, pb, pc) = (points[ia], points[ib], points[ic]);

            // Reflex corner for this winding
            if winding * cross(pa, pb, pc) < 0.0 {
                continue;
            }

            let blocked = (0..m).any(|k| {
                if k == a || k == b || k == c {
                    return false;
                }
                let pk = points[ring[k]];

                // Points lying on an original polygon edge of the candidate do not block it
                if is_ring_edge(ia, ib, n) && on_segment(pa, pb, pk) {
                    return false;
                }
                if is_ring_edge(ib, ic, n) && on_segment(pb, pc, pk) {
                    return false;
                }
                if is_ring_edge(ic, ia, n) && on_segment(pc, pa, pk) {
                    return false;
                }

                point_in_triangle(pa, pb, pc, pk)
            });

            if !blocked {
                triangles.push([ia as u32, ib as u32, ic as u32]);
                ring.remove(b);
                clipped = true;
                break;
            }
        }

        if !clipped {
            break;
        }
    }

    triangles
}

/// Earcut fallback, re-wound to match the ring
fn earcut(points: &[Point]) -> Vec<[u32; 3]> {
    let winding = if signed_area2(points) < 0.0 { -1.0 } else { 1.0 };

    let mut flat_coords: Vec<f64> = Vec::with_capacity(points.len() * 2);
    for p in points {
        flat_coords.push(p.x);
        flat_coords.push(p.y);
    }

    let indices = earcutr::earcut(&flat_coords, &[], 2).unwrap_or_default();

    indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (t[0], t[1], t[2]);
            if winding * cross(points[a], points[b], points[c]) < 0.0 {
                [a as u32, c as u32, b as u32]
            } else {
                [a as u32, b as u32, c as u32]
            }
        })
        .collect()
}

fn is_ring_edge(i: usize, j: usize, n: usize) -> bool {
    let d = i.abs_diff(j);
    d == 1 || d == n - 1
}

/// Point lies on segment a-b within `EPSILON`
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    if p.x < a.x.min(b.x) || p.x > a.x.max(b.x) || p.y < a.y.min(b.y) || p.y > a.y.max(b.y) {
        return false;
    }
    let len = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
    if len == 0.0 {
        return p == a;
    }
    (cross(a, b, p) / len).abs() < EPSILON
}
