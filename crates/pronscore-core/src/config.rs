//! Pronscore Configuration Management
//!
//! Handles configuration from environment variables and config files,
//! with defaults matching the layout used by the evaluation runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{Setting, StackMode};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Evaluation configuration
    pub eval: EvalConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|message| ConfigError::ParseError { path, message })
    }

    fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Merge with environment variables (env takes precedence)
    ///
    /// Every variable that is set overrides the loaded value, including
    /// values equal to the built-in defaults.
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Apply the variables `lookup` returns a value for
    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(setting) = lookup("PRONSCORE_SETTING") {
            self.eval.setting = setting.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PRONSCORE_SETTING".to_string(),
                value: setting,
            })?;
        }
        if let Some(mode) = lookup("PRONSCORE_STACK_MODE") {
            self.eval.stack_mode = mode.parse()?;
        }
        if let Some(dir) = lookup("PRONSCORE_CONLL_DIR") {
            self.eval.conll_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PRONSCORE_LOGS_DIR") {
            self.eval.logs_dir = PathBuf::from(dir);
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }
}

/// Evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Pronoun setting evaluated when none is given on the command line
    pub setting: Setting,

    /// Coarse POS tag a token must carry to be considered a pronoun
    pub pronoun_pos: String,

    /// Tracking of re-opened cluster ids
    pub stack_mode: StackMode,

    /// Directory holding `<model>_<data_type>.{gold,pred}.conll` files
    pub conll_dir: PathBuf,

    /// Directory holding `<model>.json` results files
    pub logs_dir: PathBuf,

    /// Data files evaluated by the batch command
    pub data_files: Vec<String>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            setting: Setting::All,
            pronoun_pos: "PRON".to_string(),
            stack_mode: StackMode::Overwrite,
            conll_dir: PathBuf::from("./data/conll_logs"),
            logs_dir: PathBuf::from("data/train_logs"),
            data_files: vec![
                "hij_test_head.jsonlines".to_string(),
                "zij_test_head.jsonlines".to_string(),
                "hen_test_head.jsonlines".to_string(),
                "die_test_head.jsonlines".to_string(),
            ],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
