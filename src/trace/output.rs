//! Render snapshot of a trace

use serde::Serialize;

use crate::layer::LayerId;
use crate::polygon::Polygon;

/// A traced polygon in world space, ready for an external renderer
#[derive(Clone, Debug, Serialize)]
pub struct TracedPolygon {
    /// Counter-clockwise ring
    pub vertices: Vec<[f64; 2]>,
    /// Triangles into `vertices`
    pub indices: Vec<[u32; 3]>,
    pub layer: LayerId,
    pub height: f64,
    pub thickness: f64,
}

impl TracedPolygon {
    /// Snapshot an already world-space, orientated polygon
    pub fn from_polygon(polygon: &Polygon) -> Self {
        Self {
            vertices: polygon.points().iter().map(|p| [p.x, p.y]).collect(),
            indices: polygon.triangles().to_vec(),
            layer: polygon.layer(),
            height: polygon.height(),
            thickness: polygon.thickness(),
        }
    }
}
