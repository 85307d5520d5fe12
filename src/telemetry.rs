//! Tracing subscriber installation.

use crate::config::LogConfig;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive does not parse.
    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser error.
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialised: {0}")]
    AlreadyInitialised(#[from] tracing_subscriber::util::TryInitError),
}

/// Builds the env filter for `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when the directive is malformed.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.filter).map_err(|source| TelemetryError::InvalidFilter {
        directive: config.filter.clone(),
        source,
    })
}

/// Installs the process-wide `tracing` subscriber.
///
/// Call once at process start-up. Output goes to stderr, as plain text or
/// JSON lines depending on [`LogConfig::json`].
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_tracing(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}
