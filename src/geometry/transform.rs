//! 2D affine transforms
//!
//! Entries follow the column layout used by layout databases:
//!
//! ```text
//! | a c e |   | x |
//! | b d f | * | y |
//! | 0 0 1 |   | 1 |
//! ```
//!
//! `A * B` applies `B` first. Transforms built from instance references are
//! snapped once (see [`Transform::snapped`]) so that equal placements compare
//! bit-for-bit equal and can key a map.

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::types::{Point, GRID};

/// Determinants smaller than this are treated as singular
pub const DEGENERATE_DETERMINANT: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn scaling(x: f64, y: f64) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    pub const fn translation(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Counter-clockwise rotation by `degrees`
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Mirror about the x axis (y -> -y)
    pub const fn mirror_x() -> Self {
        Self::scaling(1.0, -1.0)
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// `self * other`: `other` is applied first
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform::new(
            self.a * other.a + self.c * other.b,
            self.b * other.a + self.d * other.b,
            self.a * other.c + self.c * other.d,
            self.b * other.c + self.d * other.d,
            self.a * other.e + self.c * other.f + self.e,
            self.b * other.e + self.d * other.f + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.c * self.b
    }

    /// True when the transform reverses winding order
    pub fn is_mirrored(&self) -> bool {
        self.determinant() < 0.0
    }

    /// Closed-form inverse; `None` for singular transforms
    pub fn inverse(&self) -> Option<Transform> {
        let det = self.determinant();
        if det.abs() < DEGENERATE_DETERMINANT {
            return None;
        }
        Some(Transform::new(
            self.d / det,
            -self.b / det,
            -self.c / det,
            self.a / det,
            (self.c * self.f - self.e * self.d) / det,
            -(self.a * self.f - self.e * self.b) / det,
        ))
    }

    /// Rounds the linear part to whole numbers (locking rotation to 90° steps)
    /// and the translation to [`GRID`]
    ///
    /// Entries round to the nearest integer rather than to {-1, 0, 1}, so an
    /// integer magnification is kept intact.
    pub fn snapped(&self) -> Transform {
        // `+ 0.0` folds -0.0 into 0.0 so snapped keys compare equal
        let lin = |v: f64| v.round() + 0.0;
        let grid = |v: f64| (v / GRID).round() * GRID + 0.0;
        Transform::new(
            lin(self.a),
            lin(self.b),
            lin(self.c),
            lin(self.d),
            grid(self.e),
            grid(self.f),
        )
    }

    pub fn key(&self) -> TransformKey {
        TransformKey::from(self)
    }

    pub fn approx_eq(&self, other: &Transform, eps: f64) -> bool {
        (self.a - other.a).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.c - other.c).abs() <= eps
            && (self.d - other.d).abs() <= eps
            && (self.e - other.e).abs() <= eps
            && (self.f - other.f).abs() <= eps
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

impl Mul<Point> for Transform {
    type Output = Point;

    fn mul(self, rhs: Point) -> Point {
        self.apply(rhs)
    }
}

/// Exact, hashable and ordered identity of a transform
///
/// Two keys are equal only if every entry is bit-identical (with -0.0 folded
/// into 0.0). Used to deduplicate search instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransformKey([u64; 6]);

impl From<&Transform> for TransformKey {
    fn from(m: &Transform) -> Self {
        let bits = |v: f64| (v + 0.0).to_bits();
        TransformKey([bits(m.a), bits(m.b), bits(m.c), bits(m.d), bits(m.e), bits(m.f)])
    }
}

impl From<TransformKey> for Transform {
    fn from(key: TransformKey) -> Self {
        let [a, b, c, d, e, f] = key.0.map(f64::from_bits);
        Transform::new(a, b, c, d, e, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_applies_right_first() {
        let t = Transform::translation(10.0, 0.0);
        let r = Transform::rotation(90.0);
        let p = Point::new(1.0, 0.0);

        // Rotate, then translate
        let q = (t * r).apply(p);
        assert!((q.x - 10.0).abs() < 1e-9);
        assert!((q.y - 1.0).abs() < 1e-9);

        // Translate, then rotate
        let q = (r * t).apply(p);
        assert!((q.x - 0.0).abs() < 1e-9);
        assert!((q.y - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = Transform::scaling(2.0, 2.0) * Transform::translation(3.0, -4.0) * Transform::rotation(30.0);
        let inv = m.inverse().expect("non-singular");
        let p = Point::new(7.5, -1.25);
        let q = (m * inv).apply(p);
        assert!((q.x - p.x).abs() < 1e-9);
        assert!((q.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Transform::scaling(0.0, 1.0).inverse().is_none());
        assert!(Transform::new(1.0, 2.0, 2.0, 4.0, 5.0, 6.0).inverse().is_none());
    }

    #[test]
    fn test_snap_locks_rotation_and_grid() {
        let m = Transform::translation(1.00049, -2.0004) * Transform::rotation(90.0);
        let s = m.snapped();
        assert_eq!(s.a, 0.0);
        assert_eq!(s.b, 1.0);
        assert_eq!(s.c, -1.0);
        assert_eq!(s.d, 0.0);
        assert!((s.e - 1.0).abs() < 1e-12);
        assert!((s.f + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_snap_keeps_integer_magnification() {
        let s = (Transform::scaling(2.0, 2.0) * Transform::rotation(90.0)).snapped();
        assert_eq!((s.a, s.b, s.c, s.d), (0.0, 2.0, -2.0, 0.0));
        assert_eq!(s.determinant(), 4.0);
    }

    #[test]
    fn test_snapped_keys_match_despite_drift() {
        let direct = Transform::translation(5.0, 5.0).snapped();
        let drifted = (Transform::translation(2.5000001, 5.0) * Transform::translation(2.5, -0.0000002)).snapped();
        assert_eq!(direct.key(), drifted.key());
        assert_eq!(Transform::from(direct.key()), direct);
    }

    #[test]
    fn test_mirror_detection() {
        assert!(Transform::mirror_x().is_mirrored());
        assert!(!Transform::rotation(180.0).is_mirrored());
        assert!((Transform::rotation(90.0) * Transform::mirror_x()).is_mirrored());
    }
}
