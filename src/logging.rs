//! Logging setup for the command-line tool.
//!
//! Installs a global tracing subscriber writing to stderr, so stdout stays
//! free for reports. `RUST_LOG` overrides the configured filter.

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The configured filter directive could not be parsed.
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    /// Failed to set the global tracing subscriber.
    #[error("failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Build the filter: `RUST_LOG` when set and valid, else `fallback`.
pub fn build_env_filter(fallback: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(fallback).map_err(|source| LoggingError::Filter {
        filter: fallback.to_string(),
        source,
    })
}

/// Initialize tracing to stderr.
pub fn init(filter: &str) -> Result<(), LoggingError> {
    let env_filter = build_env_filter(filter)?;
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let subscriber = Registry::default().with(env_filter).with(stderr_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(filter, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directive_is_reported() {
        // only meaningful when RUST_LOG does not take precedence
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = build_env_filter("diabetes_screen=notalevel").unwrap_err();
        assert!(matches!(err, LoggingError::Filter { .. }));
        assert!(build_env_filter("info,diabetes_screen=debug").is_ok());
    }
}
