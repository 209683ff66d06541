//! # Relay Configuration
//!
//! Loaded once at startup from TOML. Every key is optional; unknown keys are
//! rejected so typos do not silently fall back to defaults.
//!
//! ```toml
//! frames = 5000
//! producer_interval_us = 0
//! consumer_interval_us = 100
//! payload_len = 512
//! controller = "atomic"
//! log_filter = "info"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Which role controller the relay's buffer uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Compare-and-swap on the role word.
    #[default]
    Atomic,
    /// `parking_lot` mutex around the role word.
    Locked,
}

/// Settings for one relay run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// Snapshots published by the producer.
    pub frames: u64,
    /// Pause between productions, in microseconds.
    pub producer_interval_us: u64,
    /// Pause between consumer polls, in microseconds.
    pub consumer_interval_us: u64,
    /// Samples per snapshot.
    pub payload_len: usize,
    /// Role controller implementation.
    pub controller: ControllerKind,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            frames: 10_000,
            producer_interval_us: 0,
            consumer_interval_us: 50,
            payload_len: 256,
            controller: ControllerKind::Atomic,
            log_filter: "info".to_owned(),
        }
    }
}

impl RelayConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on bad syntax or unknown keys,
    /// [`ConfigError::Invalid`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frames == 0 {
            return Err(ConfigError::Invalid("frames must be greater than zero".into()));
        }
        if self.payload_len == 0 {
            return Err(ConfigError::Invalid(
                "payload_len must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Producer pacing.
    #[must_use]
    pub fn producer_interval(&self) -> Duration {
        Duration::from_micros(self.producer_interval_us)
    }

    /// Consumer pacing.
    #[must_use]
    pub fn consumer_interval(&self) -> Duration {
        Duration::from_micros(self.consumer_interval_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RelayConfig::from_toml_str("").unwrap();
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = RelayConfig::from_toml_str(
            r#"
            frames = 12
            controller = "locked"
            "#,
        )
        .unwrap();
        assert_eq!(config.frames, 12);
        assert_eq!(config.controller, ControllerKind::Locked);
        assert_eq!(config.payload_len, 256);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = RelayConfig::from_toml_str("frame = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_unknown_controller_rejected() {
        let err = RelayConfig::from_toml_str(r#"controller = "spin""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_zero_values_rejected() {
        let err = RelayConfig::from_toml_str("frames = 0").unwrap_err();
        assert_eq!(err.to_string(), "invalid config: frames must be greater than zero");

        let err = RelayConfig::from_toml_str("payload_len = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_intervals() {
        let config = RelayConfig {
            producer_interval_us: 1500,
            ..RelayConfig::default()
        };
        assert_eq!(config.producer_interval(), Duration::from_micros(1500));
        assert_eq!(config.consumer_interval(), Duration::from_micros(50));
    }
}
