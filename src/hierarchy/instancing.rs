//! Instance references as delivered by the loader
//!
//! A single reference places a child cell once; an array reference places it
//! on a rows x columns lattice spanned by three anchor points. Both are
//! resolved into plain snapped transforms before any search runs.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Transform};

/// Shared placement parameters of a reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub magnification: f64,
    /// Counter-clockwise rotation in degrees
    pub angle: f64,
    /// Mirror about the x axis before rotating
    pub mirrored: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            magnification: 1.0,
            angle: 0.0,
            mirrored: false,
        }
    }
}

impl Placement {
    /// Compose scale, translation, rotation and mirror (in that product order)
    /// and snap the result
    pub fn transform_at(&self, origin: Point) -> Transform {
        let mut m = Transform::identity();
        if self.magnification != 1.0 {
            m = m * Transform::scaling(self.magnification, self.magnification);
        }
        m = m * Transform::translation(origin.x, origin.y);
        if self.angle != 0.0 {
            m = m * Transform::rotation(self.angle);
        }
        if self.mirrored {
            m = m * Transform::mirror_x();
        }
        m.snapped()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleInstance {
    pub cell: String,
    pub origin: Point,
    #[serde(default)]
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayInstance {
    pub cell: String,
    pub columns: u32,
    pub rows: u32,
    pub origin: Point,
    /// Displacement of `columns` column steps from the origin
    pub column_anchor: Point,
    /// Displacement of `rows` row steps from the origin
    pub row_anchor: Point,
    #[serde(default)]
    pub placement: Placement,
}

impl ArrayInstance {
    /// Lattice origins, row-major
    pub fn offsets(&self) -> Vec<Point> {
        if self.columns == 0 || self.rows == 0 {
            return Vec::new();
        }

        let cols = self.columns as f64;
        let rows = self.rows as f64;
        let dx1 = (self.column_anchor.x - self.origin.x) / cols;
        let dy1 = (self.column_anchor.y - self.origin.y) / cols;
        let dx2 = (self.row_anchor.x - self.origin.x) / rows;
        let dy2 = (self.row_anchor.y - self.origin.y) / rows;

        let mut offsets = Vec::with_capacity((self.columns * self.rows) as usize);
        for i in 0..self.rows {
            for j in 0..self.columns {
                let (fi, fj) = (i as f64, j as f64);
                offsets.push(Point::new(
                    self.origin.x + dx1 * fj + dx2 * fi,
                    self.origin.y + dy1 * fj + dy2 * fi,
                ));
            }
        }
        offsets
    }
}

/// A reference waiting to be resolved against the cell table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instancing {
    Single(SingleInstance),
    Array(ArrayInstance),
}

impl Instancing {
    pub fn cell_name(&self) -> &str {
        match self {
            Instancing::Single(s) => &s.cell,
            Instancing::Array(a) => &a.cell,
        }
    }

    /// One snapped transform per placement
    pub fn transforms(&self) -> Vec<Transform> {
        match self {
            Instancing::Single(s) => vec![s.placement.transform_at(s.origin)],
            Instancing::Array(a) => a
                .offsets()
                .into_iter()
                .map(|o| a.placement.transform_at(o))
                .collect(),
        }
    }
}
