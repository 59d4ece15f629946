//! Store configuration module
//!
//! Provides type-safe configuration loading from environment variables
//! using the `config` crate. Values are read with the `PARLOUR_` prefix
//! (e.g. `PARLOUR_MAX_MESSAGE_CHARS=8192`) on top of built-in defaults.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_MAX_MESSAGE_CHARS: usize = 32_768;
const DEFAULT_MAX_TITLE_CHARS: usize = 200;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying source could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A loaded value failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Conversation store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Maximum accepted length of a user message, in characters.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Maximum accepted length of a conversation title, in characters.
    #[serde(default = "default_max_title_chars")]
    pub max_title_chars: usize,

    /// Whether a newly created conversation becomes the active one.
    #[serde(default = "default_true")]
    pub auto_select_created: bool,

    /// Snapshot file for the filesystem storage adapter, if used.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

fn default_max_message_chars() -> usize {
    DEFAULT_MAX_MESSAGE_CHARS
}

fn default_max_title_chars() -> usize {
    DEFAULT_MAX_TITLE_CHARS
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
            auto_select_created: true,
            snapshot_path: None,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from `PARLOUR_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("PARLOUR"))
            .build()?;

        let cfg: StoreConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates loaded values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_message_chars must be greater than zero".to_string(),
            ));
        }
        if self.max_title_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_title_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
