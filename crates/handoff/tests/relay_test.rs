//! # Frame Relay Integration Tests
//!
//! End-to-end runs of the producer/consumer pump with both controllers,
//! plus config file handling.
//!
//! Run with: cargo test -p handoff --test relay_test

use std::path::PathBuf;

use handoff::{relay, ConfigError, ControllerKind, RelayConfig, RelayError};

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/relay.toml")
}

fn quick(controller: ControllerKind) -> RelayConfig {
    RelayConfig {
        frames: 3_000,
        producer_interval_us: 0,
        consumer_interval_us: 0,
        payload_len: 64,
        controller,
        ..RelayConfig::default()
    }
}

#[test]
fn test_relay_atomic_is_clean() {
    let report = relay::run(&quick(ControllerKind::Atomic)).unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.published, 3_000);
    assert_eq!(report.consumed + report.discarded, report.published);
}

#[test]
fn test_relay_locked_is_clean() {
    let report = relay::run(&quick(ControllerKind::Locked)).unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.consumed + report.discarded, report.published);
}

#[test]
fn test_slow_consumer_never_stalls_producer() {
    // The consumer polls far slower than the producer publishes: most
    // frames are discarded, but the newest one always arrives intact.
    let config = RelayConfig {
        frames: 2_000,
        consumer_interval_us: 2_000,
        ..quick(ControllerKind::Atomic)
    };
    let report = relay::run(&config).unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert!(report.consumed < report.published);
    assert!(report.discarded > 0);
}

#[test]
fn test_slow_producer_yields_empty_polls() {
    let config = RelayConfig {
        frames: 20,
        producer_interval_us: 1_000,
        consumer_interval_us: 50,
        ..quick(ControllerKind::Locked)
    };
    let report = relay::run(&config).unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert!(report.empty_polls > 0);
}

#[test]
fn test_shipped_config_loads() {
    let config = RelayConfig::load(shipped_config()).unwrap();
    assert_eq!(config.frames, 5_000);
    assert_eq!(config.controller, ControllerKind::Atomic);
    assert_eq!(config.payload_len, 512);
}

#[test]
fn test_missing_config_file() {
    let err = RelayConfig::load("does/not/exist.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("does/not/exist.toml"));
}

#[test]
fn test_invalid_config_rejected_by_run() {
    let config = RelayConfig {
        frames: 0,
        ..RelayConfig::default()
    };
    let err = relay::run(&config).unwrap_err();
    assert!(matches!(err, RelayError::Config(ConfigError::Invalid(_))));
}
