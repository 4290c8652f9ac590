//! One frontier expansion: a polygon against the whole hierarchy

use std::collections::BTreeMap;

use tracing::debug;

use crate::geometry::{BoundingBox, Transform, TransformKey};
use crate::hierarchy::{CellId, Library, PolygonId};
use crate::layer::{Layer, LayerId, LayerTable};
use crate::polygon::Polygon;

use super::context::Instance;

/// Whether geometry on `target` can continue a net arriving on `source`
///
/// Different layers connect only between a via and a metal within `gap` of
/// each other vertically. A layer connects to itself only if it is metal.
pub fn layers_connect(source: (LayerId, &Layer), target: (LayerId, &Layer), gap: f64) -> bool {
    let (source_id, src) = source;
    let (target_id, tgt) = target;

    if !tgt.shown {
        return false;
    }
    if target_id == source_id {
        return tgt.metal;
    }
    if tgt.height > src.height + src.thickness + gap {
        return false;
    }
    if tgt.height + tgt.thickness + gap < src.height {
        return false;
    }
    tgt.metal != src.metal
}

pub(crate) struct Expansion<'a> {
    pub library: &'a Library,
    pub layers: &'a LayerTable,
    pub vertical_gap: f64,
}

impl Expansion<'_> {
    /// Queue every polygon touching `source` (placed by `placement`) into
    /// the instance of its owning cell's world transform
    ///
    /// Returns the number of polygons newly queued.
    pub fn expand(
        &self,
        source: &Polygon,
        placement: &Transform,
        instances: &mut BTreeMap<TransformKey, Instance>,
    ) -> usize {
        let Some(src_layer) = self.layers.get(source.layer()) else {
            return 0;
        };
        let world = source.transformed(placement);
        let mut walk = Walk {
            expansion: self,
            source: (source.layer(), src_layer),
            world: &world,
            instances,
            queued: 0,
        };
        walk.visit(self.library.top(), &Transform::identity());
        walk.queued
    }
}

struct Walk<'a, 'b> {
    expansion: &'a Expansion<'a>,
    source: (LayerId, &'a Layer),
    world: &'b Polygon,
    instances: &'b mut BTreeMap<TransformKey, Instance>,
    queued: usize,
}

impl Walk<'_, '_> {
    fn visit(&mut self, cell_id: CellId, m: &Transform) {
        let library = self.expansion.library;
        let boundary: BoundingBox = library.boundary(cell_id).transformed(m);
        if !boundary.overlaps(self.world.bbox()) {
            return;
        }

        let Some(inverse) = m.inverse() else {
            debug!("[Trace] Skipping subtree of '{}' under a degenerate transform", library.cell(cell_id).name());
            return;
        };

        let cell = library.cell(cell_id);
        if !cell.polygons().is_empty() {
            let local = self.world.transformed(&inverse);
            self.intersect_cell(cell_id, &local, m.key());
        }

        for r in cell.references() {
            self.visit(r.cell, &(*m * r.transform));
        }
    }

    fn intersect_cell(&mut self, cell_id: CellId, local: &Polygon, key: TransformKey) {
        let layers = self.expansion.layers;
        let gap = self.expansion.vertical_gap;
        let cell = self.expansion.library.cell(cell_id);

        for (index, target) in cell.polygons().iter().enumerate() {
            let Some(tgt_layer) = layers.get(target.layer()) else {
                continue;
            };
            if !layers_connect(self.source, (target.layer(), tgt_layer), gap) {
                continue;
            }
            if !local.bbox().overlaps(target.bbox()) {
                continue;
            }

            let id = PolygonId { cell: cell_id, index: index as u32 };
            if self
                .instances
                .get(&key)
                .is_some_and(|inst| inst.checked.contains(&id))
            {
                continue;
            }
            if !Polygon::intersects(local, target) {
                continue;
            }

            if self.instances.entry(key).or_default().unchecked.insert(id) {
                self.queued += 1;
            }
        }
    }
}
