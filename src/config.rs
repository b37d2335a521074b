//! Configuration management
//!
//! Loads settings from a TOML file with graceful fallback to defaults when
//! no file is given or the file is missing. Numeric settings are validated
//! after parsing so a bad config fails fast instead of producing nonsense
//! scores at runtime.

use crate::error::ConfigError;
use log::warn;
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub summarizer: SummarizerConfig,
}

/// Settings for the alert classification engine
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Alerts scoring below this are auto-acknowledged at creation
    pub auto_ack_threshold: f64,
    /// Window for grouping similar alerts, in hours
    pub group_window_hours: i64,
    /// Permit status transitions that move backwards in the lifecycle
    /// (manual reopening). Off by default.
    pub allow_reopen: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            auto_ack_threshold: 0.3,
            group_window_hours: 1,
            allow_reopen: false,
        }
    }
}

/// Settings for the log summarization engine
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Standard deviations from the hourly mean before a bucket is
    /// flagged as anomalous
    pub anomaly_threshold: f64,
    /// Maximum number of key events in a summary
    pub max_events: usize,
    /// Default summary window when the caller gives no range, in hours
    pub default_window_hours: i64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: 2.5,
            max_events: 10,
            default_window_hours: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, fails to parse,
    /// or contains out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional path, falling back to defaults
    ///
    /// Missing or unreadable files produce a warning and the default
    /// configuration rather than an error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::load(path) {
                Ok(config) => config,
                Err(e) => {
                    warn!(
                        "Failed to load config from {}, using defaults: {}",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.classifier.auto_ack_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "auto_ack_threshold must be within [0.0, 1.0], got {}",
                self.classifier.auto_ack_threshold
            )));
        }
        if self.classifier.group_window_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "group_window_hours must be positive".to_string(),
            ));
        }
        if self.summarizer.anomaly_threshold <= 0.0 {
            return Err(ConfigError::ValidationError(
                "anomaly_threshold must be positive".to_string(),
            ));
        }
        if self.summarizer.max_events == 0 {
            return Err(ConfigError::ValidationError(
                "max_events must be at least 1".to_string(),
            ));
        }
        if self.summarizer.default_window_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "default_window_hours must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.classifier.auto_ack_threshold, 0.3);
        assert_eq!(config.classifier.group_window_hours, 1);
        assert!(!config.classifier.allow_reopen);
        assert_eq!(config.summarizer.anomaly_threshold, 2.5);
        assert_eq!(config.summarizer.max_events, 10);
        assert_eq!(config.summarizer.default_window_hours, 1);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[classifier]\nauto_ack_threshold = 0.5\n\n[summarizer]\nmax_events = 20"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.classifier.auto_ack_threshold, 0.5);
        assert_eq!(config.summarizer.max_events, 20);
        // Unspecified settings keep their defaults
        assert_eq!(config.summarizer.anomaly_threshold, 2.5);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[classifier]\nauto_ack_threshold = 1.5").unwrap();

        let result = Config::load(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_zero_max_events_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[summarizer]\nmax_events = 0").unwrap();

        let result = Config::load(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default(Some(Path::new("/nonexistent/lookout.toml")));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_no_path_uses_defaults() {
        assert_eq!(Config::load_or_default(None), Config::default());
    }
}
