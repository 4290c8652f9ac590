//! Instanced cell hierarchy
//!
//! # Submodules
//! - `cell` - Cells, references and polygon/cell ids
//! - `instancing` - Single and array instance records and their transforms
//! - `library` - Builder, reference resolution, top cell and boundary pass
//! - `collapse` - Point counting and folding of small subtrees
//! - `source` - JSON library description consumed by loaders

mod cell;
mod collapse;
mod instancing;
mod library;
mod source;

pub use cell::{
    Cell,
    CellId,
    PolygonId,
    Reference,
};

pub use instancing::{
    Placement,
    SingleInstance,
    ArrayInstance,
    Instancing,
};

pub use library::{
    Library,
    LibraryBuilder,
};

pub use collapse::{
    HIERARCHY_LIMIT,
    CHILD_LIMIT,
};

pub use source::{
    LibrarySource,
    CellSource,
    PolygonSource,
};
