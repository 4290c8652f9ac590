//! Geometry kernel for the layout hierarchy
//!
//! # Submodules
//! - `types` - Points, bounding boxes and shared tolerances
//! - `transform` - 2D affine transforms with snapping and exact keys
//! - `triangle` - Triangles with separating-axis intersection

mod types;
mod transform;
mod triangle;

pub use types::{
    Point,
    BoundingBox,
    cross,
    EPSILON,
    GRID,
};

pub use transform::{
    Transform,
    TransformKey,
    DEGENERATE_DETERMINANT,
};

pub use triangle::{
    Triangle,
    point_in_triangle,
};
