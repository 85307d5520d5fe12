//! Runtime configuration.
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! document is valid. `TASKTREE_DATABASE_URL` and `TASKTREE_LOG` override
//! the corresponding file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding [`DatabaseConfig::url`].
pub const DATABASE_URL_ENV: &str = "TASKTREE_DATABASE_URL";

/// Environment variable overriding [`LogConfig::filter`].
pub const LOG_FILTER_ENV: &str = "TASKTREE_LOG";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskTreeConfig {
    /// Relational store settings.
    pub database: DatabaseConfig,
    /// Input size limits.
    pub limits: TaskLimits,
    /// Logging settings.
    pub log: LogConfig,
}

/// Relational store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL. Required only by the relational adapters.
    pub url: Option<String>,
    /// Upper bound on pooled connections.
    pub max_pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_pool_size: 10,
        }
    }
}

impl DatabaseConfig {
    /// Returns the configured URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when no URL is set.
    pub fn require_url(&self) -> Result<&str, ConfigError> {
        self.url.as_deref().ok_or(ConfigError::MissingDatabaseUrl)
    }
}

/// Input size limits, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskLimits {
    /// Longest accepted task description.
    pub max_description_len: usize,
    /// Longest accepted task message.
    pub max_message_len: usize,
}

impl Default for TaskLimits {
    fn default() -> Self {
        Self {
            max_description_len: 2000,
            max_message_len: 2000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing-subscriber` env-filter directive.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// A relational adapter was requested without a database URL.
    #[error("database.url is not configured (set it or TASKTREE_DATABASE_URL)")]
    MissingDatabaseUrl,
}

impl TaskTreeConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from an optional file, then applies process
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, plus the
    /// errors of [`TaskTreeConfig::from_toml_str`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(file) => {
                let document =
                    std::fs::read_to_string(file).map_err(|source| ConfigError::Io {
                        path: file.to_path_buf(),
                        source,
                    })?;
                toml::from_str(&document)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|value| !value.is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|value| !value.is_empty()) {
            self.log.filter = filter;
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_pool_size == 0 {
            return Err(ConfigError::Invalid {
                field: "database.max_pool_size",
                reason: "must be at least 1",
            });
        }
        if self.limits.max_description_len == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.max_description_len",
                reason: "must be at least 1",
            });
        }
        if self.limits.max_message_len == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.max_message_len",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
