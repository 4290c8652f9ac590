//! Error types for hierarchy construction and configuration

use thiserror::Error;

/// Errors raised while turning a loaded cell table into a [`crate::hierarchy::Library`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HierarchyError {
    #[error("reference cycle through cell '{cell}'")]
    Cycle { cell: String },

    #[error("no top cell: library is empty or every cell is referenced")]
    NoTopCell,

    #[error("unknown top cell '{name}'")]
    UnknownTopCell { name: String },

    #[error("cell '{cell}' uses layer '{layer}' which is not in the layer table")]
    UnknownLayer { cell: String, layer: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("child threshold {child} exceeds hierarchy threshold {hierarchy}")]
    ChildThresholdTooLarge { child: usize, hierarchy: usize },

    #[error("step budget must be non-zero")]
    ZeroStepBudget,
}
