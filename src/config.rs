use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tap_tempo::DEFAULT_SMOOTHING_WINDOW;

/// Gap after which a tapping session starts over.
pub const DEFAULT_IDLE_RESET_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a tapping session, usually read from `tap-deejay.yml`.
///
/// ```yaml
/// smoothing_window: 8
/// idle_reset_ms: 3000
/// show_decimals: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TapConfig {
    /// Maximum number of tap intervals averaged into the BPM.
    pub smoothing_window: usize,
    /// Reset automatically when no tap arrives for this long. `None` disables it.
    pub idle_reset_ms: Option<u64>,
    /// Show BPM with two decimals instead of rounding to a whole number.
    pub show_decimals: bool,
}

impl Default for TapConfig {
    fn default() -> Self {
        TapConfig {
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            idle_reset_ms: Some(DEFAULT_IDLE_RESET_MS),
            show_decimals: false,
        }
    }
}

impl TapConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: TapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing_window == 0 {
            return Err(ConfigError::Invalid(
                "smoothing_window must be at least 1".into(),
            ));
        }
        if self.idle_reset_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "idle_reset_ms must be positive; omit it or use null to disable".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TapConfig, DEFAULT_IDLE_RESET_MS};
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = TapConfig::default();
        assert_eq!(config.smoothing_window, 10);
        assert_eq!(config.idle_reset_ms, Some(DEFAULT_IDLE_RESET_MS));
        assert!(!config.show_decimals);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_yaml() {
        let config = TapConfig::from_yaml_str(
            "smoothing_window: 8\nidle_reset_ms: 3000\nshow_decimals: true\n",
        )
        .unwrap();
        assert_eq!(config.smoothing_window, 8);
        assert_eq!(config.idle_reset_ms, Some(3000));
        assert!(config.show_decimals);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config = TapConfig::from_yaml_str("show_decimals: true\n").unwrap();
        assert_eq!(config.smoothing_window, 10);
        assert_eq!(config.idle_reset_ms, Some(DEFAULT_IDLE_RESET_MS));
    }

    #[test]
    fn null_disables_idle_reset() {
        let config = TapConfig::from_yaml_str("idle_reset_ms: null\n").unwrap();
        assert_eq!(config.idle_reset_ms, None);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = TapConfig::from_yaml_str("smoothing: 8\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_zero_window() {
        let err = TapConfig::from_yaml_str("smoothing_window: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_idle_reset() {
        let err = TapConfig::from_yaml_str("idle_reset_ms: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "smoothing_window: 4").unwrap();

        let config = TapConfig::load(file.path()).unwrap();
        assert_eq!(config.smoothing_window, 4);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TapConfig::load(dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
