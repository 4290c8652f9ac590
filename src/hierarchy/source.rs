//! JSON description of a cell library
//!
//! This is the hand-off format from an external layout reader: cells with
//! named-layer polygons and unresolved instance records.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::HierarchyError;
use crate::geometry::Point;
use crate::layer::LayerTable;
use crate::polygon::Polygon;

use super::instancing::Instancing;
use super::library::{Library, LibraryBuilder};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibrarySource {
    /// Root cell; detected when absent
    #[serde(default)]
    pub top: Option<String>,
    pub cells: Vec<CellSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellSource {
    pub name: String,
    #[serde(default)]
    pub polygons: Vec<PolygonSource>,
    #[serde(default)]
    pub instances: Vec<Instancing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonSource {
    pub layer: String,
    pub points: Vec<[f64; 2]>,
}

impl LibrarySource {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse library JSON")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read library file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("In {}", path.display()))
    }

    /// Build a library, taking polygon height and thickness from the layer table
    pub fn build(&self, layers: &LayerTable) -> Result<Library> {
        let mut builder = LibraryBuilder::new();

        for cell in &self.cells {
            let id = builder.add_cell(&cell.name);

            for poly in &cell.polygons {
                let layer_id = layers.by_name(&poly.layer).ok_or_else(|| HierarchyError::UnknownLayer {
                    cell: cell.name.clone(),
                    layer: poly.layer.clone(),
                })?;
                let (height, thickness) = layers
                    .get(layer_id)
                    .map(|l| (l.height, l.thickness))
                    .unwrap_or_default();

                let points = poly.points.iter().map(|&p| Point::from(p)).collect();
                builder.add_polygon(id, Polygon::from_points(layer_id, height, thickness, points));
            }

            for inst in &cell.instances {
                builder.add_instancing(id, inst.clone());
            }
        }

        if let Some(top) = &self.top {
            builder.set_top(top);
        }

        let library = builder.build(layers)?;
        Ok(library)
    }
}
