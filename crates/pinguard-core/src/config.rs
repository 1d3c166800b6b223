//! Guard configuration persistence
//!
//! Configuration lives as JSON under `$XDG_CONFIG_HOME/pinguard` (or the
//! platform config dir). The JSON helpers here are shared with the biometric
//! crate so both halves of the add-on read the same directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::signal::LOCK_CANCELLED;

/// Configuration directory under the platform config dir
const CONFIG_DIR_NAME: &str = "pinguard";

/// Guard configuration file name
pub const GUARD_CONFIG_FILE: &str = "guard.json";

/// Lifecycle guard configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuardConfig {
    /// Signal-bus topic that ends every attached screen's session
    #[serde(default = "default_cancel_topic")]
    pub cancel_topic: String,
}

fn default_cancel_topic() -> String {
    LOCK_CANCELLED.to_string()
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            cancel_topic: default_cancel_topic(),
        }
    }
}

impl GuardConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    /// Load from the default location
    ///
    /// Returns default configuration if the file doesn't exist or can't be parsed.
    pub fn load_or_default() -> Self {
        load_or_default(GUARD_CONFIG_FILE)
    }

    /// Save to the default location, returning the file written
    pub fn save_default(&self) -> Result<PathBuf> {
        let path = config_path(GUARD_CONFIG_FILE)?;
        self.save(&path)?;
        Ok(path)
    }
}

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    // Try XDG_CONFIG_HOME first, then fall back to the platform dir
    if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
    }

    dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
}

/// Path of `file_name` inside the config directory
pub fn config_path(file_name: &str) -> Result<PathBuf> {
    config_dir()
        .map(|dir| dir.join(file_name))
        .ok_or(GuardError::NoConfigDir)
}

/// Read and parse a JSON config file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    let value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Serialize a config value to a pretty JSON file, creating parent dirs
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;

    tracing::debug!("Saved config to {:?}", path);
    Ok(())
}

/// Load `file_name` from the config dir, falling back to defaults
pub fn load_or_default<T: DeserializeOwned + Default>(file_name: &str) -> T {
    let path = match config_path(file_name) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("{}, using defaults", e);
            return T::default();
        }
    };

    if !path.exists() {
        return T::default();
    }

    match load_json(&path) {
        Ok(value) => value,
        Err(GuardError::Serialization(e)) => {
            tracing::warn!("Failed to parse config file {:?}: {}", path, e);
            T::default()
        }
        Err(e) => {
            tracing::warn!("Failed to read config file {:?}: {}", path, e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GuardConfig::default();
        assert_eq!(config.cancel_topic, "lock-cancelled");
    }

    #[test]
    fn test_missing_topic_uses_default() {
        let config: GuardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GuardConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(GUARD_CONFIG_FILE);

        let config = GuardConfig {
            cancel_topic: "pin-cancelled".to_string(),
        };
        config.save(&path).unwrap();

        let loaded = GuardConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_location_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", dir.path());

        assert_eq!(
            config_path(GUARD_CONFIG_FILE).unwrap(),
            dir.path().join("pinguard").join(GUARD_CONFIG_FILE)
        );
        assert_eq!(GuardConfig::load_or_default(), GuardConfig::default());

        let config = GuardConfig {
            cancel_topic: "vault-cancelled".to_string(),
        };
        let written = config.save_default().unwrap();
        assert!(written.starts_with(dir.path()));
        assert_eq!(GuardConfig::load_or_default(), config);

        std::env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    fn test_load_garbage_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(GUARD_CONFIG_FILE);
        fs::write(&path, "not json").unwrap();

        let err = GuardConfig::load(&path).unwrap_err();
        assert!(matches!(err, GuardError::Serialization(_)));
    }
}
