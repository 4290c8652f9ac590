//! Point counting and the one-time hierarchy collapse
//!
//! Small subtrees are folded into their parents so that a search spends its
//! time on polygons rather than on walking tiny cells.

use std::collections::HashMap;
use std::time::Instant;

use tracing::info;

use crate::layer::LayerTable;

use super::cell::{CellId, Reference};
use super::library::Library;

/// Default total point count below which a cell is flattened completely
pub const HIERARCHY_LIMIT: usize = 30_000;

/// Default point count below which a single child is folded into its parent
pub const CHILD_LIMIT: usize = HIERARCHY_LIMIT / 10;

impl Library {
    /// Total primitive points below `root`, counting every placement
    ///
    /// The result for each visited cell is stored on the cell.
    pub fn count_total_points(&mut self, root: CellId) -> usize {
        let mut memo: HashMap<CellId, usize> = HashMap::new();
        for id in self.topological_order(root) {
            let cell = self.cell(id);
            let total = cell
                .references
                .iter()
                .fold(cell.own_points(), |acc, r| {
                    acc.saturating_add(memo.get(&r.cell).copied().unwrap_or(0))
                });
            memo.insert(id, total);
        }

        for (&id, &total) in &memo {
            self.cells[id.index()].accumulated_points = total;
        }
        memo.get(&root).copied().unwrap_or(0)
    }

    /// Fold small subtrees into their parents, bottom-up from the top cell
    ///
    /// A cell whose total is below `threshold` absorbs all its references; any
    /// other cell absorbs only children whose total is below `child_threshold`.
    /// Mirrored placements flip the copied polygons back to counter-clockwise.
    pub fn collapse_hierarchy(&mut self, layers: &LayerTable, threshold: usize, child_threshold: usize) {
        let start = Instant::now();
        let total = self.count_total_points(self.top);

        let mut folded = 0usize;
        let mut copied = 0usize;
        let mut flattened = 0usize;

        for id in self.topological_order(self.top) {
            let cell = &self.cells[id.index()];
            if cell.collapsed {
                continue;
            }

            let flatten = cell.accumulated_points < threshold;
            let mut kept = Vec::with_capacity(cell.references.len());
            let mut absorbed = Vec::new();

            for r in &cell.references {
                let child = &self.cells[r.cell.index()];
                if !flatten && child.accumulated_points >= child_threshold {
                    kept.push(*r);
                    continue;
                }

                // Children are already collapsed, so one level of copying suffices
                for polygon in &child.polygons {
                    let mut p = polygon.transformed(&r.transform);
                    if r.transform.is_mirrored() {
                        p.flip();
                    }
                    absorbed.push(p);
                }
                for grandchild in &child.references {
                    kept.push(Reference {
                        cell: grandchild.cell,
                        transform: (r.transform * grandchild.transform).snapped(),
                    });
                }
                folded += 1;
            }

            copied += absorbed.len();
            let cell = &mut self.cells[id.index()];
            cell.polygons.extend(absorbed);
            cell.references = kept;
            cell.collapsed = true;
            if flatten && cell.references.is_empty() {
                cell.flattened = true;
                flattened += 1;
            }
        }

        self.refresh_boundaries(layers);

        info!(
            "[Hierarchy] Collapsed {} placements ({} polygons copied, {} cells flattened) of {} total points in {:?}",
            folded,
            copied,
            flattened,
            total,
            start.elapsed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::hierarchy::{LibraryBuilder, Placement, SingleInstance};
    use crate::layer::{Layer, LayerId};
    use crate::polygon::Polygon;

    fn layers() -> LayerTable {
        LayerTable::from_layers(vec![Layer::new("metal1", 1.0, 0.5, true)])
    }

    fn place(cell: &str, x: f64, y: f64, mirrored: bool) -> SingleInstance {
        SingleInstance {
            cell: cell.into(),
            origin: Point::new(x, y),
            placement: Placement { mirrored, ..Placement::default() },
        }
    }

    fn two_level() -> (Library, CellId, CellId) {
        let mut b = LibraryBuilder::new();
        let leaf = b.add_cell("leaf");
        b.add_polygon(leaf, Polygon::rect(LayerId(0), 1.0, 0.5, 0.0, 0.0, 1.0, 1.0));
        let top = b.add_cell("top");
        b.add_polygon(top, Polygon::rect(LayerId(0), 1.0, 0.5, 0.0, 0.0, 3.0, 3.0));
        b.add_single(top, place("leaf", 10.0, 0.0, false));
        b.add_single(top, place("leaf", 20.0, 0.0, true));
        (b.build(&layers()).unwrap(), leaf, top)
    }

    #[test]
    fn test_count_total_points() {
        let (mut lib, leaf, top) = two_level();
        // 3 rectangles placed, 8 primitive points each
        assert_eq!(lib.count_total_points(top), 24);
        assert_eq!(lib.cell(leaf).accumulated_points(), 8);
        assert_eq!(lib.cell(top).accumulated_points(), 24);
    }

    #[test]
    fn test_collapse_flattens_small_hierarchy() {
        let (mut lib, _, top) = two_level();
        lib.collapse_hierarchy(&layers(), HIERARCHY_LIMIT, CHILD_LIMIT);

        let cell = lib.cell(top);
        assert!(cell.is_collapsed());
        assert!(cell.is_flattened());
        assert!(cell.references().is_empty());
        assert_eq!(cell.polygons().len(), 3);

        // The mirrored copy is back to counter-clockwise
        for p in cell.polygons() {
            assert!(p.signed_area() > 0.0);
        }
        let mirrored = &cell.polygons()[2];
        assert!(mirrored.contains_point(Point::new(20.5, -0.5)));

        let bbox = lib.boundary(top);
        assert_eq!(bbox.min, Point::new(0.0, -1.0));
        assert_eq!(bbox.max, Point::new(21.0, 3.0));
    }

    #[test]
    fn test_collapse_keeps_large_children() {
        let (mut lib, leaf, top) = two_level();
        // Everything is "large": nothing folds
        lib.collapse_hierarchy(&layers(), 0, 0);
        assert_eq!(lib.cell(top).references().len(), 2);
        assert_eq!(lib.cell(top).polygons().len(), 1);
        assert!(!lib.cell(top).is_flattened());
        assert!(lib.cell(leaf).is_collapsed());
    }

    #[test]
    fn test_collapse_three_levels_composes_transforms() {
        let mut b = LibraryBuilder::new();
        let leaf = b.add_cell("leaf");
        b.add_polygon(leaf, Polygon::rect(LayerId(0), 1.0, 0.5, 0.0, 0.0, 1.0, 1.0));
        let mid = b.add_cell("mid");
        b.add_single(mid, place("leaf", 5.0, 0.0, false));
        let top = b.add_cell("top");
        b.add_single(top, place("mid", 0.0, 7.0, false));
        let mut lib = b.build(&layers()).unwrap();

        // No cell is flattened, but every child is small enough to fold
        lib.collapse_hierarchy(&layers(), 0, 100);
        assert_eq!(lib.cell(mid).polygons().len(), 1);
        assert!(!lib.cell(top).is_flattened());

        let cell = lib.cell(top);
        assert!(cell.references().is_empty());
        assert_eq!(cell.polygons().len(), 1);
        assert_eq!(cell.polygons()[0].bbox().min, Point::new(5.0, 7.0));
        assert_eq!(cell.polygons()[0].bbox().max, Point::new(6.0, 8.0));
    }

    #[test]
    fn test_lifted_references_are_snapped() {
        let mut b = LibraryBuilder::new();
        let leaf = b.add_cell("leaf");
        b.add_polygon(leaf, Polygon::rect(LayerId(0), 1.0, 0.5, 0.0, 0.0, 1.0, 1.0));
        let mid = b.add_cell("mid");
        b.add_single(mid, place("leaf", 0.2, 0.0, false));
        let top = b.add_cell("top");
        b.add_single(top, place("mid", 0.1, 0.0, false));
        let mut lib = b.build(&layers()).unwrap();

        // Left over from an earlier pass: mid still holds its reference
        lib.cells[mid.index()].collapsed = true;
        lib.collapse_hierarchy(&layers(), HIERARCHY_LIMIT, CHILD_LIMIT);

        let refs = lib.cell(top).references();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].cell, leaf);
        // 0.1 + 0.2 drifts off the grid unless snapped
        assert_eq!(refs[0].transform.e, 0.3);
        assert_eq!(refs[0].transform.key(), refs[0].transform.snapped().key());
        assert!(!lib.cell(top).is_flattened());
    }
}
