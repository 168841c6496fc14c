//! Engine settings

use std::path::Path;

use regulatory_corpus::RetrievalConfig;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Engine settings, loadable from a YAML file. Every field has a default,
/// so a partial file works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entity type assumed when no detection pattern matches.
    pub default_entity_type: String,
    /// Retrieval pipeline settings.
    pub rag: RetrievalConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_entity_type: "Private Company Limited by Shares (Non-Financial)".to_string(),
            rag: RetrievalConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| EngineError::Configuration {
            path: path.to_path_buf(),
            source,
        })
    }
}
