//! Top-level configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use warden_presence::{IdleConfig, RequestConfig};

use crate::WardenError;

/// Everything a host can tune. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Where the punishment ledger is persisted.
    pub ledger_path: PathBuf,

    /// Teleport request settings.
    pub request: RequestConfig,

    /// Idle detection settings.
    pub idle: IdleConfig,

    /// How often expired punishments are evicted proactively. Queries
    /// evict lazily regardless.
    pub expiry_sweep_interval: Duration,

    /// Log filter used when `RUST_LOG` isn't set.
    pub log_filter: String,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("data/punishments.json"),
            request: RequestConfig::default(),
            idle: IdleConfig::default(),
            expiry_sweep_interval: Duration::from_secs(60),
            log_filter: "info".to_string(),
        }
    }
}

impl WardenConfig {
    /// Reads a JSON config file.
    ///
    /// # Errors
    /// [`WardenError::Config`] if the file can't be read or isn't valid.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, WardenError> {
        let path = path.as_ref();
        let config_err = |reason: String| WardenError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| config_err(e.to_string()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}
