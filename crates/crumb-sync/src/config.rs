//! # Sync Configuration
//!
//! Configuration for the persistence gateway and connectivity probe.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     CRUMB_DB_PATH=/data/crumb.db                                        │
//! │     CRUMB_PROBE_INTERVAL_SECS=10                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/crumb/crumb.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.crumb.crumb/crumb.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     Database next to the config dir, 30s probe interval                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # crumb.toml
//! [database]
//! path = "/home/shop/crumb.db"
//!
//! [probe]
//! interval_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Database Settings
// =============================================================================

/// Where the durable store lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "crumb", "crumb")
        .map(|dirs| dirs.data_dir().join("crumb.db"))
        .unwrap_or_else(|| PathBuf::from("crumb.db"))
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
        }
    }
}

// =============================================================================
// Probe Settings
// =============================================================================

/// Connectivity probe behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Seconds between reachability checks.
    #[serde(default = "default_probe_interval")]
    pub interval_secs: u64,
}

fn default_probe_interval() -> u64 {
    30
}

impl Default for ProbeSettings {
    fn default() -> Self {
        ProbeSettings {
            interval_secs: default_probe_interval(),
        }
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete sync configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Durable store location.
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Connectivity probe settings.
    #[serde(default)]
    pub probe: ProbeSettings,
}

impl SyncConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (crumb.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::InvalidConfig("no config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.probe.interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "probe interval_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CRUMB_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(secs) = std::env::var("CRUMB_PROBE_INTERVAL_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                debug!(interval_secs = parsed, "Overriding probe interval from environment");
                self.probe.interval_secs = parsed;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "crumb", "crumb")
            .map(|dirs| dirs.config_dir().join("crumb.toml"))
    }

    /// The probe interval as a Duration.
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe.interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.probe.interval_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = SyncConfig::default();
        config.probe.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SyncConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[probe]"));

        let parsed: SyncConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.probe.interval_secs, config.probe.interval_secs);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: SyncConfig = toml::from_str("[database]\npath = \"/tmp/x.db\"\n").unwrap();
        assert_eq!(parsed.database.path, PathBuf::from("/tmp/x.db"));
        assert_eq!(parsed.probe.interval_secs, 30);
    }
}
