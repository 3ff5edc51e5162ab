//! Timing configuration for the presence engines.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RequestConfig
// ---------------------------------------------------------------------------

/// Settings for the teleport request table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// How long a request waits for an answer before it lapses.
    pub timeout: Duration,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

// ---------------------------------------------------------------------------
// IdleConfig
// ---------------------------------------------------------------------------

/// Settings for the idleness tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Inactivity after which the sweep marks a player idle.
    pub threshold: Duration,

    /// How often the sweep runs. A player can stay un-flagged for up to
    /// this long past the threshold.
    pub sweep_interval: Duration,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(RequestConfig::default().timeout, Duration::from_secs(60));
        let idle = IdleConfig::default();
        assert_eq!(idle.threshold, Duration::from_secs(300));
        assert_eq!(idle.sweep_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let idle: IdleConfig =
            serde_json::from_str(r#"{"threshold":{"secs":120,"nanos":0}}"#).unwrap();
        assert_eq!(idle.threshold, Duration::from_secs(120));
        assert_eq!(idle.sweep_interval, Duration::from_secs(5));
    }
}
