//! Cells, references and the stable ids that name them

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Transform};
use crate::polygon::Polygon;

use super::instancing::Instancing;

/// Index of a cell in its library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl CellId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A polygon owned by a cell, addressed by position in the cell's list
///
/// Polygon lists only ever grow (collapsing appends), so ids stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolygonId {
    pub cell: CellId,
    pub index: u32,
}

/// Resolved placement of a child cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    pub cell: CellId,
    pub transform: Transform,
}

#[derive(Debug, Clone)]
pub struct Cell {
    name: String,
    pub(crate) polygons: Vec<Polygon>,
    pub(crate) references: Vec<Reference>,
    pub(crate) pending: Vec<Instancing>,
    pub(crate) boundary: Option<BoundingBox>,
    pub(crate) collapsed: bool,
    pub(crate) flattened: bool,
    pub(crate) accumulated_points: usize,
}

impl Cell {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            polygons: Vec::new(),
            references: Vec::new(),
            pending: Vec::new(),
            boundary: None,
            collapsed: false,
            flattened: false,
            accumulated_points: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Cached total boundary; `None` before the boundary pass has run
    pub fn boundary(&self) -> Option<&BoundingBox> {
        self.boundary.as_ref()
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// All references were folded into this cell by the collapse pass
    pub fn is_flattened(&self) -> bool {
        self.flattened
    }

    pub fn accumulated_points(&self) -> usize {
        self.accumulated_points
    }

    /// Primitive points contributed by this cell's own polygons
    pub fn own_points(&self) -> usize {
        self.polygons.iter().map(Polygon::primitive_points).sum()
    }

    /// Generated (parameterised) cells carry a `__<n>` suffix with non-zero `n`
    pub fn is_pcell(&self) -> bool {
        is_pcell_name(&self.name)
    }
}

fn is_pcell_name(name: &str) -> bool {
    let Some(pos) = name.rfind("__") else {
        return false;
    };
    let suffix = &name[pos + 2..];
    let digits: String = suffix.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().is_ok_and(|n| n != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcell_detection() {
        assert!(is_pcell_name("nmos__1018272"));
        assert!(is_pcell_name("res___42"));
        assert!(is_pcell_name("a__b__7x"));
        assert!(!is_pcell_name("nmos"));
        assert!(!is_pcell_name("nmos__0"));
        assert!(!is_pcell_name("nmos__core"));
    }
}
