//! Default task parameters applied when a batch request omits them.

use serde::Deserialize;

use crate::domain::TaskCategory;

/// Batch defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchDefaults {
    #[serde(default)]
    pub task: TaskCategory,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BatchDefaults {
    fn default() -> Self {
        Self {
            task: TaskCategory::default(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_temperature() -> f64 {
    0.3
}

const fn default_max_tokens() -> u32 {
    1024
}

const fn default_concurrency() -> usize {
    5
}
