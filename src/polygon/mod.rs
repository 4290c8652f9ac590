//! Layer-tagged polygons
//!
//! # Submodules
//! - `shape` - The polygon type: orientation, containment, intersection
//! - `triangulate` - Convex fan, ear clipping and earcut fallback

mod shape;
mod triangulate;

pub use shape::Polygon;

pub use triangulate::{
    triangulate,
    is_convex,
    signed_area2,
};
