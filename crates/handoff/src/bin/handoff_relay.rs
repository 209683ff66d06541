//! # HANDOFF Relay
//!
//! Pumps snapshots from a producer thread to a consumer thread through a
//! `HandoffBuffer` and reports what the consumer saw.
//!
//! ```bash
//! # Defaults
//! ./handoff_relay
//!
//! # From a config file, with per-frame tracing
//! RUST_LOG=trace ./handoff_relay crates/handoff/config/relay.toml
//! ```
//!
//! Exits non-zero if any snapshot was torn, arrived out of order, or the
//! final frame never reached the consumer.

use std::env;
use std::process::ExitCode;

use handoff::{relay, telemetry, RelayConfig};
use tracing::{error, info};

fn main() -> ExitCode {
    let config = match env::args_os().nth(1) {
        Some(path) => match RelayConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("handoff_relay: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => RelayConfig::default(),
    };

    telemetry::init_logging(&config.log_filter);

    match relay::run(&config) {
        Ok(report) => {
            info!(
                published = report.published,
                consumed = report.consumed,
                discarded = report.discarded,
                empty_polls = report.empty_polls,
                delivery_pct = report.delivery_ratio() * 100.0,
                elapsed_ms = report.elapsed.as_secs_f64() * 1e3,
                "relay complete"
            );
            if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                error!(
                    torn = report.torn,
                    regressions = report.regressions,
                    last_frame = report.last_frame,
                    frames = report.frames,
                    "relay observed an inconsistent handoff"
                );
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            error!(%err, "relay failed");
            ExitCode::FAILURE
        }
    }
}
