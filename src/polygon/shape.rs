//! Layer-tagged polygon with lazy triangulation

use std::sync::OnceLock;

use crate::geometry::{point_in_triangle, BoundingBox, Point, Transform, Triangle};
use crate::layer::LayerId;

use super::triangulate::{signed_area2, triangulate};

/// A closed ring of vertices on one layer
///
/// Height and thickness are copied from the layer when the polygon is created
/// and are not refreshed afterwards. The triangulation is computed on first
/// use and survives transformation, since topology does not change.
#[derive(Debug, Clone)]
pub struct Polygon {
    points: Vec<Point>,
    layer: LayerId,
    height: f64,
    thickness: f64,
    bbox: BoundingBox,
    triangles: OnceLock<Vec<[u32; 3]>>,
}

impl Polygon {
    pub fn new(layer: LayerId, height: f64, thickness: f64) -> Self {
        Self {
            points: Vec::new(),
            layer,
            height,
            thickness,
            bbox: BoundingBox::empty(),
            triangles: OnceLock::new(),
        }
    }

    pub fn from_points(layer: LayerId, height: f64, thickness: f64, points: Vec<Point>) -> Self {
        let bbox = BoundingBox::from_points(&points);
        Self {
            points,
            layer,
            height,
            thickness,
            bbox,
            triangles: OnceLock::new(),
        }
    }

    /// Axis-aligned rectangle, counter-clockwise from `(x0, y0)`
    pub fn rect(layer: LayerId, height: f64, thickness: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::from_points(
            layer,
            height,
            thickness,
            vec![
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
        )
    }

    /// Append a vertex; drops any cached triangulation
    pub fn add_point(&mut self, x: f64, y: f64) {
        let p = Point::new(x, y);
        self.points.push(p);
        self.bbox.add_point(p);
        self.triangles = OnceLock::new();
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Extruded prims have a top and bottom copy of every vertex
    pub fn primitive_points(&self) -> usize {
        self.points.len() * 2
    }

    /// Signed area; positive for counter-clockwise rings
    pub fn signed_area(&self) -> f64 {
        signed_area2(&self.points) / 2.0
    }

    /// Triangle index triples, computed on first call
    pub fn triangles(&self) -> &[[u32; 3]] {
        self.triangles.get_or_init(|| triangulate(&self.points))
    }

    pub fn is_triangulated(&self) -> bool {
        self.triangles.get().is_some()
    }

    pub fn clear_triangulation(&mut self) {
        self.triangles = OnceLock::new();
    }

    pub fn triangle(&self, index: &[u32; 3]) -> Triangle {
        Triangle::from_vertices(
            self.points[index[0] as usize],
            self.points[index[1] as usize],
            self.points[index[2] as usize],
        )
    }

    /// Reverse the winding, remapping any cached triangles so they stay valid
    pub fn flip(&mut self) {
        self.points.reverse();

        let last = self.points.len().saturating_sub(1) as u32;
        if let Some(triangles) = self.triangles.get_mut() {
            for t in triangles.iter_mut() {
                let (a, b, c) = (last - t[0], last - t[1], last - t[2]);
                *t = [a, c, b];
            }
        }
    }

    /// Make the ring counter-clockwise; returns true if it was flipped
    pub fn orientate(&mut self) -> bool {
        if signed_area2(&self.points) < 0.0 {
            self.flip();
            true
        } else {
            false
        }
    }

    /// Transform vertices in place; the bounding box is rebuilt, triangles kept
    pub fn transform(&mut self, m: &Transform) {
        self.bbox.clear();
        for p in self.points.iter_mut() {
            *p = m.apply(*p);
            self.bbox.add_point(*p);
        }
    }

    pub fn transformed(&self, m: &Transform) -> Polygon {
        let mut out = self.clone();
        out.transform(m);
        out
    }

    /// Point inside (or on an edge of) some triangle, excluding exact vertices
    pub fn contains_point(&self, p: Point) -> bool {
        if !self.bbox.contains_point(p) {
            return false;
        }
        let points = &self.points;
        self.triangles().iter().any(|t| {
            point_in_triangle(
                points[t[0] as usize],
                points[t[1] as usize],
                points[t[2] as usize],
                p,
            )
        })
    }

    /// Exhaustive triangle-pair separating-axis test after a bounding box reject
    pub fn intersects(p1: &Polygon, p2: &Polygon) -> bool {
        if !p1.bbox.overlaps(&p2.bbox) {
            return false;
        }

        let others: Vec<Triangle> = p2.triangles().iter().map(|t| p2.triangle(t)).collect();
        p1.triangles().iter().any(|t| {
            let t1 = p1.triangle(t);
            others.iter().any(|t2| t1.intersects(t2))
        })
    }
}
