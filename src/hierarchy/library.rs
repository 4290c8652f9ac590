//! Cell arena, reference resolution and the boundary pass

use std::collections::HashSet;
use std::time::Instant;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::HierarchyError;
use crate::geometry::BoundingBox;
use crate::layer::LayerTable;
use crate::polygon::Polygon;

use super::cell::{Cell, CellId, PolygonId, Reference};
use super::instancing::{ArrayInstance, Instancing, SingleInstance};

/// Collects cells, polygons and unresolved references from a loader
#[derive(Debug, Default)]
pub struct LibraryBuilder {
    cells: Vec<Cell>,
    names: IndexMap<String, CellId>,
    top: Option<String>,
}

impl LibraryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell, or return the existing one with the same name
    pub fn add_cell(&mut self, name: &str) -> CellId {
        if let Some(&id) = self.names.get(name) {
            warn!("[Hierarchy] Cell '{}' defined twice, merging definitions", name);
            return id;
        }
        let id = CellId(self.cells.len() as u32);
        self.cells.push(Cell::new(name));
        self.names.insert(name.to_string(), id);
        id
    }

    pub fn cell_id(&self, name: &str) -> Option<CellId> {
        self.names.get(name).copied()
    }

    /// Add a polygon; its ring is made counter-clockwise
    pub fn add_polygon(&mut self, cell: CellId, mut polygon: Polygon) -> PolygonId {
        polygon.orientate();
        let polygons = &mut self.cells[cell.index()].polygons;
        polygons.push(polygon);
        PolygonId {
            cell,
            index: (polygons.len() - 1) as u32,
        }
    }

    pub fn add_instancing(&mut self, cell: CellId, instancing: Instancing) {
        self.cells[cell.index()].pending.push(instancing);
    }

    pub fn add_single(&mut self, cell: CellId, single: SingleInstance) {
        self.add_instancing(cell, Instancing::Single(single));
    }

    pub fn add_array(&mut self, cell: CellId, array: ArrayInstance) {
        self.add_instancing(cell, Instancing::Array(array));
    }

    /// Use `name` as the root instead of detecting it
    pub fn set_top(&mut self, name: &str) {
        self.top = Some(name.to_string());
    }

    /// Resolve references, reject cycles, pick the top cell and run the boundary pass
    pub fn build(self, layers: &LayerTable) -> Result<Library, HierarchyError> {
        let start = Instant::now();
        let mut library = Library {
            cells: self.cells,
            names: self.names,
            top: CellId(0),
        };

        library.resolve_references();
        library.check_acyclic()?;

        library.top = match self.top {
            Some(name) => library
                .find(&name)
                .ok_or(HierarchyError::UnknownTopCell { name })?,
            None => library.find_top_cell().ok_or(HierarchyError::NoTopCell)?,
        };

        library.refresh_boundaries(layers);

        info!(
            "[Hierarchy] Built library: {} cells, top '{}' in {:?}",
            library.cells.len(),
            library.cell(library.top).name(),
            start.elapsed()
        );

        Ok(library)
    }
}

/// Immutable-after-construction cell hierarchy
///
/// Only the one-time collapse pass and explicit boundary refreshes mutate it;
/// a search borrows it shared.
#[derive(Debug, Clone)]
pub struct Library {
    pub(crate) cells: Vec<Cell>,
    names: IndexMap<String, CellId>,
    pub(crate) top: CellId,
}

impl Library {
    pub fn top(&self) -> CellId {
        self.top
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (CellId(i as u32), c))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<CellId> {
        self.names.get(name).copied()
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        self.cells
            .get(id.cell.index())
            .and_then(|c| c.polygons.get(id.index as usize))
    }

    /// Cached boundary of a cell, empty if the pass has not covered it
    pub fn boundary(&self, id: CellId) -> BoundingBox {
        self.cell(id).boundary.unwrap_or_default()
    }

    /// Turn every pending instancing record into resolved references
    fn resolve_references(&mut self) {
        let mut dropped = 0usize;
        let mut resolved = 0usize;

        for index in 0..self.cells.len() {
            let pending = std::mem::take(&mut self.cells[index].pending);
            for instancing in pending {
                let Some(child) = self.find(instancing.cell_name()) else {
                    warn!(
                        "[Hierarchy] Dropping reference from '{}' to unknown cell '{}'",
                        self.cells[index].name(),
                        instancing.cell_name()
                    );
                    dropped += 1;
                    continue;
                };

                let transforms = instancing.transforms();
                if transforms.is_empty() {
                    warn!(
                        "[Hierarchy] Array reference from '{}' to '{}' has no rows or columns",
                        self.cells[index].name(),
                        instancing.cell_name()
                    );
                }
                resolved += transforms.len();
                self.cells[index]
                    .references
                    .extend(transforms.into_iter().map(|transform| Reference { cell: child, transform }));
            }
        }

        debug!("[Hierarchy] Resolved {} placements, dropped {} references", resolved, dropped);
    }

    /// Depth-first search for a back edge
    fn check_acyclic(&self) -> Result<(), HierarchyError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let mut marks = vec![Mark::New; self.cells.len()];
        for root in 0..self.cells.len() {
            if marks[root] != Mark::New {
                continue;
            }
            // (cell, next reference to visit)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::Open;

            while let Some(frame) = stack.last_mut() {
                let cell = frame.0;
                let refs = &self.cells[cell].references;
                if frame.1 < refs.len() {
                    let child = refs[frame.1].cell.index();
                    frame.1 += 1;
                    match marks[child] {
                        Mark::Open => {
                            return Err(HierarchyError::Cycle {
                                cell: self.cells[child].name().to_string(),
                            })
                        }
                        Mark::New => {
                            marks[child] = Mark::Open;
                            stack.push((child, 0));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[cell] = Mark::Done;
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    /// First cell, in definition order, that nobody references
    pub fn find_top_cell(&self) -> Option<CellId> {
        let referenced: HashSet<CellId> = self
            .cells
            .iter()
            .flat_map(|c| c.references.iter().map(|r| r.cell))
            .collect();
        (0..self.cells.len())
            .map(|i| CellId(i as u32))
            .find(|id| !referenced.contains(id))
    }

    /// Cells reachable from `root`, children before parents
    pub fn topological_order(&self, root: CellId) -> Vec<CellId> {
        let mut visited = vec![false; self.cells.len()];
        let mut order = Vec::new();
        self.post_order(root, &mut visited, &mut order);
        order
    }

    fn post_order(&self, root: CellId, visited: &mut [bool], order: &mut Vec<CellId>) {
        if visited[root.index()] {
            return;
        }
        visited[root.index()] = true;
        let mut stack: Vec<(usize, usize)> = vec![(root.index(), 0)];

        while let Some(frame) = stack.last_mut() {
            let cell = frame.0;
            let refs = &self.cells[cell].references;
            if frame.1 < refs.len() {
                let child = refs[frame.1].cell.index();
                frame.1 += 1;
                if !visited[child] {
                    visited[child] = true;
                    stack.push((child, 0));
                }
            } else {
                order.push(CellId(cell as u32));
                stack.pop();
            }
        }
    }

    /// Group all cells by height above the leaves (leaves are level 0)
    fn levels(&self) -> Vec<Vec<CellId>> {
        let mut visited = vec![false; self.cells.len()];
        let mut order = Vec::with_capacity(self.cells.len());
        for root in 0..self.cells.len() {
            self.post_order(CellId(root as u32), &mut visited, &mut order);
        }

        let mut level = vec![0usize; self.cells.len()];
        let mut levels: Vec<Vec<CellId>> = Vec::new();
        for id in order {
            let l = self.cells[id.index()]
                .references
                .iter()
                .map(|r| level[r.cell.index()] + 1)
                .max()
                .unwrap_or(0);
            level[id.index()] = l;
            if levels.len() <= l {
                levels.resize_with(l + 1, Vec::new);
            }
            levels[l].push(id);
        }
        levels
    }

    /// Recompute every cell's total boundary, children before parents
    ///
    /// Polygons on hidden layers do not contribute, so this must run after any
    /// visibility change before the next pick. Cells on one level only
    /// read boundaries of lower levels, so each level is computed in parallel.
    pub fn refresh_boundaries(&mut self, layers: &LayerTable) {
        let start = Instant::now();
        for cell in self.cells.iter_mut() {
            cell.boundary = None;
        }

        let levels = self.levels();
        for ids in &levels {
            let computed: Vec<(CellId, BoundingBox)> = ids
                .par_iter()
                .map(|&id| (id, self.compute_boundary(id, layers)))
                .collect();
            for (id, bbox) in computed {
                self.cells[id.index()].boundary = Some(bbox);
            }
        }

        debug!(
            "[Hierarchy] Boundary pass over {} levels in {:?}",
            levels.len(),
            start.elapsed()
        );
    }

    fn compute_boundary(&self, id: CellId, layers: &LayerTable) -> BoundingBox {
        let cell = self.cell(id);
        let mut bbox = BoundingBox::empty();

        for polygon in &cell.polygons {
            if layers.is_shown(polygon.layer()) {
                bbox.merge(polygon.bbox());
            }
        }

        for r in &cell.references {
            let child = self.boundary(r.cell);
            bbox.merge(&child.transformed(&r.transform));
        }

        bbox
    }

    /// Triangulate every owned polygon up front, in parallel
    pub fn prepare_triangulations(&self) {
        let start = Instant::now();
        let triangles: usize = self
            .cells
            .par_iter()
            .map(|c| c.polygons.iter().map(|p| p.triangles().len()).sum::<usize>())
            .sum();
        debug!(
            "[Hierarchy] Triangulated {} polygons into {} triangles in {:?}",
            self.cells.iter().map(|c| c.polygons.len()).sum::<usize>(),
            triangles,
            start.elapsed()
        );
    }

    /// Emit the cell tree below the top cell at debug level
    pub fn log_hierarchy(&self) {
        self.log_cell(self.top, 0);
    }

    fn log_cell(&self, id: CellId, depth: usize) {
        let cell = self.cell(id);
        debug!(
            "{}{}, {} total points{}",
            "  ".repeat(depth),
            cell.name(),
            cell.accumulated_points(),
            if cell.is_pcell() { " (pcell)" } else { "" }
        );

        if cell.is_flattened() {
            return;
        }

        let mut seen = HashSet::new();
        for r in &cell.references {
            if seen.insert(r.cell) {
                self.log_cell(r.cell, depth + 1);
            }
        }
    }
}
