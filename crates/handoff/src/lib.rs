//! # HANDOFF
//!
//! Frame relay built on [`handoff_core`]: a producer thread publishes
//! per-frame snapshots, a consumer thread picks up the newest one whenever it
//! polls, and every received snapshot is checked for tearing and ordering.
//!
//! ## Modules
//!
//! - `config`: TOML settings for a relay run
//! - `relay`: the producer/consumer pump and its report
//! - `telemetry`: tracing subscriber setup
//! - `error`: config and relay errors
//!
//! ## Example
//!
//! ```rust,no_run
//! use handoff::{relay, RelayConfig};
//!
//! let config = RelayConfig::load("crates/handoff/config/relay.toml")?;
//! let report = relay::run(&config)?;
//! assert!(report.is_clean());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod relay;
pub mod telemetry;

// Re-export the primitive
pub use handoff_core;

pub use config::{ControllerKind, RelayConfig};
pub use error::{ConfigError, RelayError, RelayResult};
pub use relay::{FrameSnapshot, RelayReport};
