//! Instanced layout hierarchy and net tracing
//!
//! Cells own layer-tagged polygons and reference other cells through snapped
//! affine transforms. A [`trace::NetTracer`] finds every polygon connected to
//! a picked point across layers and placements, one time-budgeted step at a
//! time.
//!
//! # Modules
//! - `geometry` - Points, bounding boxes, transforms, triangles
//! - `polygon` - Polygons with lazy triangulation and intersection
//! - `layer` - Process layer table
//! - `hierarchy` - Cell library, instancing and collapse
//! - `trace` - Pick and time-sliced connectivity search
//! - `config` - Search and collapse settings
//! - `error` - Typed errors

pub mod config;
pub mod error;
pub mod geometry;
pub mod hierarchy;
pub mod layer;
pub mod polygon;
pub mod trace;

pub use config::TraceConfig;
pub use error::{ConfigError, HierarchyError};
pub use geometry::{BoundingBox, Point, Transform};
pub use hierarchy::{Library, LibraryBuilder, LibrarySource};
pub use layer::{Layer, LayerId, LayerTable};
pub use polygon::Polygon;
pub use trace::{NetTracer, SearchContext, SearchState, TracedPolygon};
