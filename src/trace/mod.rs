//! Connectivity search (net tracing)
//!
//! A pick seeds the search with the topmost metal polygon under a point; each
//! step then expands frontier polygons against the whole hierarchy until no
//! instance has unchecked polygons left. All state between steps lives in a
//! caller-owned [`SearchContext`].
//!
//! # Submodules
//! - `clock` - Step budget time source
//! - `context` - Search state, per-transform instances, MessagePack snapshots
//! - `pick` - Layer-ordered seed selection
//! - `expand` - Layer rules and hierarchy descent for one frontier polygon
//! - `tracer` - `NetTracer`: pick, step, run and result snapshot
//! - `output` - World-space render records

mod clock;
mod context;
mod expand;
mod output;
mod pick;
mod tracer;

pub use clock::{
    StepClock,
    InstantClock,
};

pub use context::{
    SearchState,
    SearchContext,
    Instance,
    Seed,
};

pub use expand::layers_connect;

pub use output::TracedPolygon;

pub use tracer::NetTracer;
