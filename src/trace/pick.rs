//! Seed selection under a world-space point

use crate::geometry::{Point, Transform};
use crate::hierarchy::{CellId, Library, PolygonId};
use crate::layer::{LayerId, LayerTable};

use super::context::Seed;

struct Candidate {
    polygon: PolygonId,
    layer: LayerId,
    top: f64,
    transform: Transform,
}

/// Find the polygon to start a trace from
///
/// Shown metal layers are examined from the highest upper surface down. The
/// first hit is kept; a hit on a different layer replaces it only when that
/// layer's top is at least as high. Later hits on the same layer never do.
pub(crate) fn find_seed(library: &Library, layers: &LayerTable, at: Point) -> Option<Seed> {
    let mut accepted: Option<Candidate> = None;

    for layer_id in layers.by_top_descending() {
        let Some(layer) = layers.get(layer_id) else {
            continue;
        };
        if !layer.shown || !layer.metal {
            continue;
        }
        // Nothing lower can win against an accepted hit
        if accepted.as_ref().is_some_and(|a| layer.top() < a.top) {
            break;
        }

        pick_in_cell(
            library,
            library.top(),
            &Transform::identity(),
            layer_id,
            layer.top(),
            at,
            &mut accepted,
        );
    }

    accepted.map(|c| Seed {
        polygon: c.polygon,
        transform: c.transform.key(),
    })
}

fn pick_in_cell(
    library: &Library,
    cell_id: CellId,
    m: &Transform,
    layer: LayerId,
    top: f64,
    at: Point,
    accepted: &mut Option<Candidate>,
) {
    if !library.boundary(cell_id).transformed(m).contains_point(at) {
        return;
    }
    let Some(inverse) = m.inverse() else {
        return;
    };
    let local = inverse.apply(at);
    let cell = library.cell(cell_id);

    for (index, polygon) in cell.polygons().iter().enumerate() {
        if polygon.layer() != layer || !polygon.contains_point(local) {
            continue;
        }

        let replace = match accepted {
            None => true,
            Some(a) => a.layer != layer && top >= a.top,
        };
        if replace {
            *accepted = Some(Candidate {
                polygon: PolygonId { cell: cell_id, index: index as u32 },
                layer,
                top,
                transform: *m,
            });
        }
    }

    for r in cell.references() {
        pick_in_cell(library, r.cell, &(*m * r.transform), layer, top, at, accepted);
    }
}
