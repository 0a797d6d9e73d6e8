use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TranslitError};

// Default values for the recovery policy
fn default_source_codepage() -> String {
    "windows-1252".to_string()
}

fn default_destination_codepage() -> String {
    "windows-1251".to_string()
}

fn default_placeholder() -> char {
    '?'
}

fn default_threshold() -> f64 {
    0.25
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub recovery: RecoveryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Codepage the mis-encoded text was wrongly decoded with
    #[serde(default = "default_source_codepage")]
    pub source_codepage: String,
    /// Codepage the original bytes were written in
    #[serde(default = "default_destination_codepage")]
    pub destination_codepage: String,
    /// Character standing in for bytes a codepage cannot represent (ASCII only)
    #[serde(default = "default_placeholder")]
    pub placeholder: char,
    /// Placeholder ratio above which recovery is abandoned
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Console log level used when --verbose is not given
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for daily-rotated log files; file logging is off when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            source_codepage: default_source_codepage(),
            destination_codepage: default_destination_codepage(),
            placeholder: default_placeholder(),
            threshold: default_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl RecoveryConfig {
    /// Resolve a codepage label to its encoding.
    pub fn resolve_codepage(label: &str) -> Result<&'static Encoding> {
        Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| TranslitError::Config(format!("Unknown codepage '{}'", label)))
    }

    pub fn validate(&self) -> Result<()> {
        Self::resolve_codepage(&self.source_codepage)?;
        Self::resolve_codepage(&self.destination_codepage)?;

        if !self.placeholder.is_ascii() {
            return Err(TranslitError::Config(format!(
                "Placeholder '{}' must be an ASCII character",
                self.placeholder
            )));
        }

        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(TranslitError::Config(format!(
                "Recovery threshold {} is outside 0.0..=1.0",
                self.threshold
            )));
        }

        Ok(())
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslitError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| TranslitError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.recovery.validate()
    }
}
