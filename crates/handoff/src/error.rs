//! # Relay Error Types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a [`RelayConfig`](crate::RelayConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parsed but make no sense.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that stop a relay run.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A worker thread could not be started.
    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        /// Which side of the relay.
        role: &'static str,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A worker thread panicked.
    #[error("{role} thread panicked")]
    ThreadPanicked {
        /// Which side of the relay.
        role: &'static str,
    },
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
