//! Caller-owned search state
//!
//! Everything a search needs between steps lives here, keyed by stable ids,
//! so it can be held across ticks or written out and restored.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::geometry::TransformKey;
use crate::hierarchy::PolygonId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchState {
    #[default]
    Idle,
    /// Only held inside [`NetTracer::pick`](super::NetTracer::pick); a pick
    /// always returns with the context `Tracing` or `Idle`
    Picking,
    Tracing,
    Done,
    Aborted,
}

/// Frontier and visited polygons for one composed world transform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub(crate) unchecked: BTreeSet<PolygonId>,
    pub(crate) checked: HashSet<PolygonId>,
}

impl Instance {
    pub fn unchecked(&self) -> impl Iterator<Item = &PolygonId> {
        self.unchecked.iter()
    }

    pub fn checked(&self) -> impl Iterator<Item = &PolygonId> {
        self.checked.iter()
    }

    pub fn is_drained(&self) -> bool {
        self.unchecked.is_empty()
    }
}

/// The picked polygon and the transform of its owning cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    pub polygon: PolygonId,
    pub transform: TransformKey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchContext {
    pub(crate) state: SearchState,
    pub(crate) instances: BTreeMap<TransformKey, Instance>,
    pub(crate) current: Option<TransformKey>,
    pub(crate) seed: Option<Seed>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_tracing(&self) -> bool {
        self.state == SearchState::Tracing
    }

    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    pub fn instances(&self) -> impl Iterator<Item = (&TransformKey, &Instance)> {
        self.instances.iter()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn checked_count(&self) -> usize {
        self.instances.values().map(|i| i.checked.len()).sum()
    }

    pub fn unchecked_count(&self) -> usize {
        self.instances.values().map(|i| i.unchecked.len()).sum()
    }

    fn clear(&mut self) {
        self.instances.clear();
        self.current = None;
        self.seed = None;
    }

    /// Drop all search state and return to `Idle`
    pub fn reset(&mut self) {
        self.clear();
        self.state = SearchState::Idle;
    }

    /// Drop all search state and mark the search as cancelled
    pub fn abort(&mut self) {
        self.clear();
        self.state = SearchState::Aborted;
    }

    pub fn to_msgpack(&self) -> anyhow::Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).context("Failed to encode search context")
    }

    pub fn from_msgpack(bytes: &[u8]) -> anyhow::Result<Self> {
        rmp_serde::from_slice(bytes).context("Failed to decode search context")
    }
}
