//! Settings schema definitions.
//!
//! All settings structs use `#[serde(default)]` to allow partial
//! configuration files. Missing fields are filled with defaults.

use serde::{Deserialize, Serialize};

/// Root settings structure.
///
/// Loaded from `~/.sheetwiz/settings.toml` with environment variable
/// interpolation support. Version field enables future migrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetwizSettings {
    /// Schema version for migrations
    pub version: u32,

    /// Remote analysis engine configuration
    pub engine: EngineSettings,

    /// Local storage configuration
    pub storage: StorageSettings,
}

impl Default for SheetwizSettings {
    fn default() -> Self {
        Self {
            version: 1,
            engine: EngineSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

/// Remote analysis engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Base URL of the analysis engine (supports $ENV_VAR syntax)
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageSettings {
    /// Override for the blob store directory (default: `~/.sheetwiz/store`,
    /// supports $ENV_VAR syntax)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}
