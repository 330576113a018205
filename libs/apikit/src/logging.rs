//! Global `tracing` subscriber setup.

use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::fmt;

use crate::config::{LogFormat, LoggingConfig};

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: ParseError,
    },
    #[error("global tracing subscriber already installed: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Filter directive for a `-v` count (`-v` info, `-vv` debug, `-vvv` trace).
#[must_use]
pub fn verbosity_directive(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Resolve the filter: `-v` wins over `RUST_LOG`, which wins over the configured level.
///
/// # Errors
/// Returns `LoggingError::InvalidFilter` when the chosen directive does not parse.
pub fn build_filter(config: &LoggingConfig, verbose: u8) -> Result<EnvFilter, LoggingError> {
    let directive = match verbosity_directive(verbose) {
        Some(d) => d.to_owned(),
        None => std::env::var(EnvFilter::DEFAULT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| config.level.clone()),
    };

    EnvFilter::try_new(&directive).map_err(|source| LoggingError::InvalidFilter {
        directive,
        source,
    })
}

/// Install the global subscriber in text or JSON format.
///
/// # Errors
/// Fails on an invalid filter or when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, verbose: u8) -> Result<(), LoggingError> {
    let filter = build_filter(config, verbose)?;

    let (text, json) = match config.format {
        LogFormat::Text => (Some(fmt::layer().with_target(true)), None),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_current_span(true).with_span_list(false)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "logging initialized");
    Ok(())
}
