//! Process layer table
//!
//! Layers are owned by the caller (the process configuration). The hierarchy
//! and the tracer only ever read them: visibility, metal/via classification,
//! height and thickness.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Index of a layer in its [`LayerTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

/// A physical stratum of the process stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    /// GDSII layer number
    #[serde(default)]
    pub gds_layer: i16,
    #[serde(default)]
    pub datatype: i16,
    pub height: f64,
    pub thickness: f64,
    #[serde(default = "default_shown")]
    pub shown: bool,
    /// Metal layers conduct laterally; every other layer is treated as a via
    #[serde(default)]
    pub metal: bool,
}

fn default_shown() -> bool {
    true
}

impl Layer {
    pub fn new(name: impl Into<String>, height: f64, thickness: f64, metal: bool) -> Self {
        Self {
            name: name.into(),
            gds_layer: 0,
            datatype: 0,
            height,
            thickness,
            shown: true,
            metal,
        }
    }

    /// Height of the layer's upper surface
    pub fn top(&self) -> f64 {
        self.height + self.thickness
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerTable {
    layers: Vec<Layer>,
}

impl LayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    pub fn push(&mut self, layer: Layer) -> LayerId {
        self.layers.push(layer);
        LayerId((self.layers.len() - 1) as u32)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, l)| (LayerId(i as u32), l))
    }

    pub fn by_name(&self, name: &str) -> Option<LayerId> {
        self.iter().find(|(_, l)| l.name == name).map(|(id, _)| id)
    }

    pub fn by_gds(&self, gds_layer: i16, datatype: i16) -> Option<LayerId> {
        self.iter()
            .find(|(_, l)| l.gds_layer == gds_layer && l.datatype == datatype)
            .map(|(id, _)| id)
    }

    /// Unknown layers are treated as hidden
    pub fn is_shown(&self, id: LayerId) -> bool {
        self.get(id).is_some_and(|l| l.shown)
    }

    pub fn set_shown(&mut self, id: LayerId, shown: bool) {
        if let Some(layer) = self.layers.get_mut(id.0 as usize) {
            layer.shown = shown;
        }
    }

    /// Layer ids ordered from the highest upper surface down; ties keep table order
    pub fn by_top_descending(&self) -> Vec<LayerId> {
        let mut ids: Vec<LayerId> = self.iter().map(|(id, _)| id).collect();
        ids.sort_by(|a, b| {
            let ta = self.layers[a.0 as usize].top();
            let tb = self.layers[b.0 as usize].top();
            tb.total_cmp(&ta)
        });
        ids
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse layer table JSON")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layer table {}", path.display()))?;
        Self::from_json_str(&text)
    }
}
