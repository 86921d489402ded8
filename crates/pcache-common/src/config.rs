//! PCache Config - Configuration Structures
//!
//! Configuration for the cache engine and for process-level logging.
//! Supports TOML files and programmatic construction; every field has a
//! default so partial files are accepted.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Engine Configuration
// =============================================================================

/// Capacity limits for the cache engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_namespaces: usize,
    pub max_structures_per_namespace: usize,
    pub max_instances_per_structure: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_namespaces: 1024,
            max_structures_per_namespace: 4096,
            max_instances_per_structure: 1_000_000,
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Configuration for the tracing subscriber installed by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG` when set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// =============================================================================
// Top-level Configuration
// =============================================================================

/// Top-level pcache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PCacheConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

impl PCacheConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::PCacheError::Configuration(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
