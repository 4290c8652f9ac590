//! Search and collapse settings

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hierarchy::{CHILD_LIMIT, HIERARCHY_LIMIT};

/// Tunables for the net tracer and the hierarchy collapse pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Time budget of one trace step; one polygon is always expanded
    pub step_budget_ms: u64,
    /// Vertical distance allowed between a via and the metal it lands on
    pub vertical_gap: f64,
    /// Fold small subtrees into their parents before searching
    pub collapse: bool,
    pub hierarchy_threshold: usize,
    pub child_threshold: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            step_budget_ms: 1000,
            vertical_gap: 1.0,
            collapse: true,
            hierarchy_threshold: HIERARCHY_LIMIT,
            child_threshold: CHILD_LIMIT,
        }
    }
}

impl TraceConfig {
    pub fn step_budget(&self) -> Duration {
        Duration::from_millis(self.step_budget_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_budget_ms == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        if self.child_threshold > self.hierarchy_threshold {
            return Err(ConfigError::ChildThresholdTooLarge {
                child: self.child_threshold,
                hierarchy: self.hierarchy_threshold,
            });
        }
        Ok(())
    }

    /// Load and validate a JSON config; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: TraceConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
