//! Triangles and the separating-axis intersection test

use super::types::{BoundingBox, Point, EPSILON};

/// Triangle with precomputed AABB for fast rejection
#[derive(Clone, Debug)]
pub struct Triangle {
    pub v: [Point; 3],
    pub bbox: BoundingBox,
}

impl Triangle {
    pub fn from_vertices(v0: Point, v1: Point, v2: Point) -> Self {
        Self {
            v: [v0, v1, v2],
            bbox: BoundingBox::from_points(&[v0, v1, v2]),
        }
    }

    /// Projection interval of the triangle onto `axis`
    fn project(&self, axis: &Point) -> (f64, f64) {
        let mut min = axis.dot(&self.v[0]);
        let mut max = min;
        for p in &self.v[1..] {
            let d = axis.dot(p);
            min = min.min(d);
            max = max.max(d);
        }
        (min, max)
    }

    /// Unit normals of the three edges; zero-length edges are skipped
    fn edge_normals(&self) -> impl Iterator<Item = Point> + '_ {
        (0..3).filter_map(move |i| {
            let p1 = self.v[i];
            let p2 = self.v[(i + 1) % 3];
            let n = Point::new(p1.y - p2.y, p2.x - p1.x);
            let len = n.dot(&n).sqrt();
            (len > 0.0).then(|| Point::new(n.x / len, n.y / len))
        })
    }

    /// Separating axis test over the six edge normals
    ///
    /// Triangles closer than `EPSILON` along every axis count as intersecting.
    pub fn intersects(&self, other: &Triangle) -> bool {
        if !self.bbox.overlaps(&other.bbox) {
            return false;
        }

        for axis in self.edge_normals().chain(other.edge_normals()) {
            let (min1, max1) = self.project(&axis);
            let (min2, max2) = other.project(&axis);
            if min1 - max2 > EPSILON || min2 - max1 > EPSILON {
                return false;
            }
        }

        true
    }

    /// Vertex-exclusive point-in-triangle test
    ///
    /// Points on an edge are inside, points equal to a corner are not. Works
    /// for either winding.
    pub fn contains_point(&self, p: Point) -> bool {
        point_in_triangle(self.v[0], self.v[1], self.v[2], p)
    }
}

pub fn point_in_triangle(a: Point, b: Point, c: Point, p: Point) -> bool {
    if p == a || p == b || p == c {
        return false;
    }
    // Degenerate triangles would otherwise accept their whole supporting line
    if p.x < a.x.min(b.x).min(c.x)
        || p.x > a.x.max(b.x).max(c.x)
        || p.y < a.y.min(b.y).min(c.y)
        || p.y > a.y.max(b.y).max(c.y)
    {
        return false;
    }

    let ab = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    let bc = (c.x - b.x) * (p.y - b.y) - (c.y - b.y) * (p.x - b.x);
    let ca = (a.x - c.x) * (p.y - c.y) - (a.y - c.y) * (p.x - c.x);

    (ab >= 0.0 && bc >= 0.0 && ca >= 0.0) || (ab <= 0.0 && bc <= 0.0 && ca <= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(pts: [[f64; 2]; 3]) -> Triangle {
        Triangle::from_vertices(pts[0].into(), pts[1].into(), pts[2].into())
    }

    #[test]
    fn test_overlapping_triangles_intersect() {
        let t1 = tri([[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]]);
        let t2 = tri([[0.5, 0.5], [3.0, 0.5], [0.5, 3.0]]);
        assert!(t1.intersects(&t2));
        assert!(t2.intersects(&t1));
    }

    #[test]
    fn test_bbox_overlap_but_separated_by_diagonal() {
        // Boxes overlap, but the hypotenuse separates them
        let t1 = tri([[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]]);
        let t2 = tri([[2.0, 2.0], [1.2, 2.0], [2.0, 1.2]]);
        assert!(t1.bbox.overlaps(&t2.bbox));
        assert!(!t1.intersects(&t2));
    }

    #[test]
    fn test_touching_edges_intersect() {
        let t1 = tri([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        let t2 = tri([[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
        assert!(t1.intersects(&t2));
    }

    #[test]
    fn test_point_in_triangle_excludes_vertices() {
        let t = tri([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        assert!(t.contains_point(Point::new(0.25, 0.25)));
        assert!(t.contains_point(Point::new(0.5, 0.0)));
        assert!(!t.contains_point(Point::new(0.0, 0.0)));
        assert!(!t.contains_point(Point::new(0.75, 0.75)));

        // Clockwise winding gives the same answer
        let cw = tri([[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]]);
        assert!(cw.contains_point(Point::new(0.25, 0.25)));
    }

    #[test]
    fn test_degenerate_triangle_only_covers_its_segment() {
        let t = tri([[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
        assert!(t.contains_point(Point::new(0.5, 0.0)));
        assert!(!t.contains_point(Point::new(5.0, 0.0)));
        assert!(!t.contains_point(Point::new(0.5, 0.1)));
    }
}
