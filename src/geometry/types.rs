//! Core geometry types for the layout hierarchy
//!
//! Points, axis-aligned bounding boxes and the tolerances shared by every
//! geometric predicate in the crate.

use serde::{Deserialize, Serialize};

use super::transform::Transform;

/// Absolute tolerance for box overlap, point-in-box and separating-axis tests (1nm)
pub const EPSILON: f64 = 1e-3;

/// Grid that reference translations are snapped to (1nm in model units of µm)
pub const GRID: f64 = 1e-3;

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product with another point treated as a vector
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Self { x: p[0], y: p[1] }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Twice the signed area of triangle (a, b, c); positive when counter-clockwise
pub fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Axis-aligned bounding box
///
/// The empty box has `min = +inf` and `max = -inf`, so it never overlaps
/// anything and merging into it yields the other operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    pub const fn empty() -> Self {
        Self {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a, I: IntoIterator<Item = &'a Point>>(points: I) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.add_point(*p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    pub fn add_point(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.add_point(other.min);
        self.add_point(other.max);
    }

    /// Bounding box of this box's four corners after transformation
    pub fn transformed(&self, m: &Transform) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        let mut out = BoundingBox::empty();
        for corner in [
            Point::new(self.min.x, self.min.y),
            Point::new(self.min.x, self.max.y),
            Point::new(self.max.x, self.min.y),
            Point::new(self.max.x, self.max.y),
        ] {
            out.add_point(m.apply(corner));
        }
        out
    }

    /// Overlap test with `EPSILON` slack, so touching boxes overlap
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.min.x - other.max.x > EPSILON || other.min.x - self.max.x > EPSILON {
            return false;
        }
        if self.min.y - other.max.y > EPSILON || other.min.y - self.max.y > EPSILON {
            return false;
        }
        true
    }

    pub fn contains_point(&self, p: Point) -> bool {
        if self.is_empty() {
            return false;
        }
        if p.x - self.max.x > EPSILON || self.min.x - p.x > EPSILON {
            return false;
        }
        if p.y - self.max.y > EPSILON || self.min.y - p.y > EPSILON {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::from_points(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)])
    }

    #[test]
    fn test_empty_box_never_overlaps() {
        let empty = BoundingBox::empty();
        assert!(empty.is_empty());
        assert!(!empty.overlaps(&unit_box()));
        assert!(!unit_box().overlaps(&empty));
        assert!(!empty.contains_point(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_overlap_tolerance() {
        let a = unit_box();
        let touching = BoundingBox::from_points(&[Point::new(1.0005, 0.0), Point::new(2.0, 1.0)]);
        let apart = BoundingBox::from_points(&[Point::new(1.01, 0.0), Point::new(2.0, 1.0)]);
        assert!(a.overlaps(&touching));
        assert!(!a.overlaps(&apart));
    }

    #[test]
    fn test_contains_point_tolerance() {
        let a = unit_box();
        assert!(a.contains_point(Point::new(0.5, 0.5)));
        assert!(a.contains_point(Point::new(1.0009, 0.5)));
        assert!(!a.contains_point(Point::new(1.002, 0.5)));
    }

    #[test]
    fn test_merge_with_empty() {
        let mut b = BoundingBox::empty();
        b.merge(&unit_box());
        assert_eq!(b, unit_box());
        b.merge(&BoundingBox::empty());
        assert_eq!(b, unit_box());
    }

    #[test]
    fn test_transformed_rotation() {
        let b = BoundingBox::from_points(&[Point::new(0.0, 0.0), Point::new(2.0, 1.0)]);
        let r = Transform::rotation(90.0).snapped();
        let t = b.transformed(&r);
        assert!((t.min.x + 1.0).abs() < 1e-9);
        assert!((t.max.x - 0.0).abs() < 1e-9);
        assert!((t.min.y - 0.0).abs() < 1e-9);
        assert!((t.max.y - 2.0).abs() < 1e-9);
        assert!(BoundingBox::empty().transformed(&r).is_empty());
    }
}
