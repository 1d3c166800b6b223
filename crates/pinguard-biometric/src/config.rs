//! Fingerprint helper configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::feedback::FeedbackStrings;
use crate::prompt::PromptInfo;

/// Biometric config file name
pub const BIOMETRIC_CONFIG_FILE: &str = "biometric.json";

/// Default key alias in the secure key store
pub const DEFAULT_KEY_ALIAS: &str = "my_key";

/// How long an error stays on screen before the hint returns (ms)
const ERROR_TIMEOUT_MS: u64 = 1600;

/// How long success is shown before the callback fires (ms)
const SUCCESS_DELAY_MS: u64 = 1300;

/// Fingerprint helper configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BiometricConfig {
    /// Alias of the biometric key
    #[serde(default = "default_key_alias")]
    pub key_alias: String,

    /// Error display time, also the delay before `on_error`
    #[serde(default = "default_error_timeout_ms")]
    pub error_timeout_ms: u64,

    /// Success display time before `on_authenticated`
    #[serde(default = "default_success_delay_ms")]
    pub success_delay_ms: u64,

    /// Platform prompt texts
    #[serde(default)]
    pub prompt: PromptInfo,

    /// Feedback texts
    #[serde(default)]
    pub strings: FeedbackStrings,
}

fn default_key_alias() -> String {
    DEFAULT_KEY_ALIAS.to_string()
}

fn default_error_timeout_ms() -> u64 {
    ERROR_TIMEOUT_MS
}

fn default_success_delay_ms() -> u64 {
    SUCCESS_DELAY_MS
}

impl Default for BiometricConfig {
    fn default() -> Self {
        Self {
            key_alias: default_key_alias(),
            error_timeout_ms: ERROR_TIMEOUT_MS,
            success_delay_ms: SUCCESS_DELAY_MS,
            prompt: PromptInfo::default(),
            strings: FeedbackStrings::default(),
        }
    }
}

impl BiometricConfig {
    pub fn error_timeout(&self) -> Duration {
        Duration::from_millis(self.error_timeout_ms)
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> pinguard_core::Result<Self> {
        pinguard_core::config::load_json(path)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> pinguard_core::Result<()> {
        pinguard_core::config::save_json(self, path)
    }

    /// Load from the default location, falling back to defaults
    pub fn load_or_default() -> Self {
        pinguard_core::config::load_or_default(BIOMETRIC_CONFIG_FILE)
    }

    /// Save to the default location, returning the file written
    pub fn save_default(&self) -> pinguard_core::Result<PathBuf> {
        let path = pinguard_core::config::config_path(BIOMETRIC_CONFIG_FILE)?;
        self.save(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BiometricConfig::default();
        assert_eq!(config.key_alias, "my_key");
        assert_eq!(config.error_timeout(), Duration::from_millis(1600));
        assert_eq!(config.success_delay(), Duration::from_millis(1300));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: BiometricConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BiometricConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BIOMETRIC_CONFIG_FILE);

        let config = BiometricConfig {
            key_alias: "vault_key".to_string(),
            error_timeout_ms: 2000,
            ..Default::default()
        };
        config.save(&path).unwrap();

        assert_eq!(BiometricConfig::load(&path).unwrap(), config);
    }
}
