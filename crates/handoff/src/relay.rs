//! # Frame Relay
//!
//! ```text
//! Producer thread:                       Consumer thread:
//!   for frame in 1..=frames                loop
//!     acquire_write                          acquire_read ─▶ verify checksum
//!     rewrite snapshot in place                           ─▶ verify frame order
//!     drop (publish)                         wait(consumer_interval) or done
//!     sleep(producer_interval)
//!   send(done) ───────────────────────────▶ drain last frame, stop
//! ```
//!
//! The producer never waits for the consumer. The consumer checks that every
//! snapshot it receives is whole (checksum matches) and newer than the last.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use handoff_core::{
    AtomicRoles, Consumer, HandoffBuffer, LockedRoles, Producer, RoleController, StatsSnapshot,
};
use tracing::{debug, error, info, trace, warn};

use crate::config::{ControllerKind, RelayConfig};
use crate::error::{RelayError, RelayResult};

/// FNV-1a offset basis.
const CHECKSUM_SEED: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a prime.
const CHECKSUM_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Payload carried through the relay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSnapshot {
    /// Frame number, starting at 1. Zero means "never written".
    pub frame: u64,
    /// Frame-derived samples.
    pub samples: Vec<u64>,
    /// Checksum over `frame` and `samples`.
    pub checksum: u64,
}

impl FrameSnapshot {
    /// Rewrites the snapshot for `frame`, reusing the sample allocation.
    pub fn fill(&mut self, frame: u64, len: usize) {
        self.frame = frame;
        self.samples.clear();
        self.samples
            .extend((0..len as u64).map(|i| frame.wrapping_mul(31).wrapping_add(i)));
        self.checksum = checksum(frame, &self.samples);
    }

    /// True when the checksum matches the contents.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.checksum == checksum(self.frame, &self.samples)
    }
}

fn checksum(frame: u64, samples: &[u64]) -> u64 {
    std::iter::once(frame)
        .chain(samples.iter().copied())
        .fold(CHECKSUM_SEED, |hash, word| {
            (hash ^ word).wrapping_mul(CHECKSUM_PRIME)
        })
}

/// Outcome of a relay run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayReport {
    /// Frames the producer was asked to publish.
    pub frames: u64,
    /// Write scopes released.
    pub published: u64,
    /// Snapshots the consumer received.
    pub consumed: u64,
    /// Snapshots replaced before the consumer saw them.
    pub discarded: u64,
    /// Polls that found nothing new.
    pub empty_polls: u64,
    /// Highest frame the consumer received.
    pub last_frame: u64,
    /// Snapshots whose checksum did not match.
    pub torn: u64,
    /// Snapshots not newer than their predecessor.
    pub regressions: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RelayReport {
    /// No torn or out-of-order snapshots, and the final frame arrived.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.torn == 0 && self.regressions == 0 && self.last_frame == self.frames
    }

    /// Fraction of published frames the consumer actually saw.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn delivery_ratio(&self) -> f64 {
        if self.published == 0 {
            return 0.0;
        }
        self.consumed as f64 / self.published as f64
    }
}

/// Consumer-side observations.
#[derive(Debug, Default)]
struct Tally {
    empty_polls: u64,
    last_frame: u64,
    torn: u64,
    regressions: u64,
}

impl Tally {
    fn observe(&mut self, snapshot: &FrameSnapshot) {
        if !snapshot.is_consistent() {
            self.torn += 1;
            warn!(frame = snapshot.frame, "torn snapshot");
        }
        if snapshot.frame <= self.last_frame {
            self.regressions += 1;
            warn!(frame = snapshot.frame, last = self.last_frame, "snapshot went backwards");
        }
        self.last_frame = self.last_frame.max(snapshot.frame);
    }
}

/// Runs the relay described by `config` to completion.
///
/// # Errors
///
/// [`RelayError::Config`] if `config` is invalid, [`RelayError::Spawn`] or
/// [`RelayError::ThreadPanicked`] if a worker thread fails.
pub fn run(config: &RelayConfig) -> RelayResult<RelayReport> {
    config.validate()?;
    match config.controller {
        ControllerKind::Atomic => run_with::<AtomicRoles>(config),
        ControllerKind::Locked => run_with::<LockedRoles>(config),
    }
}

fn run_with<C: RoleController + 'static>(config: &RelayConfig) -> RelayResult<RelayReport> {
    info!(
        controller = C::NAME,
        frames = config.frames,
        payload_len = config.payload_len,
        "relay starting"
    );
    let started = Instant::now();

    let (producer, consumer) = HandoffBuffer::<FrameSnapshot, C>::with_controller().split();
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);

    let producer_thread = {
        let (frames, len, interval) = (
            config.frames,
            config.payload_len,
            config.producer_interval(),
        );
        thread::Builder::new()
            .name("handoff-producer".into())
            .spawn(move || produce(producer, frames, len, interval, &done_tx))
            .map_err(|source| RelayError::Spawn {
                role: "producer",
                source,
            })?
    };

    let consumer_thread = {
        let interval = config.consumer_interval();
        thread::Builder::new()
            .name("handoff-consumer".into())
            .spawn(move || consume(consumer, interval, &done_rx))
            .map_err(|source| RelayError::Spawn {
                role: "consumer",
                source,
            })?
    };

    // Join both before reporting, so a failed producer never leaves the
    // consumer detached.
    let produced = join_worker(producer_thread, "producer");
    let consumed = join_worker(consumer_thread, "consumer");
    produced?;
    let (tally, stats) = consumed?;

    let report = RelayReport {
        frames: config.frames,
        published: stats.published,
        consumed: stats.consumed,
        discarded: stats.discarded,
        empty_polls: tally.empty_polls,
        last_frame: tally.last_frame,
        torn: tally.torn,
        regressions: tally.regressions,
        elapsed: started.elapsed(),
    };
    debug!(?report, "relay finished");
    Ok(report)
}

fn join_worker<T>(handle: JoinHandle<T>, role: &'static str) -> RelayResult<T> {
    handle.join().map_err(|_| {
        error!(role, "relay worker panicked");
        RelayError::ThreadPanicked { role }
    })
}

fn produce<C: RoleController>(
    mut producer: Producer<FrameSnapshot, C>,
    frames: u64,
    len: usize,
    interval: Duration,
    done: &Sender<u64>,
) {
    for frame in 1..=frames {
        producer.write_with(|snapshot| snapshot.fill(frame, len));
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
    debug!(frames, "producer finished");

    // A closed channel means the consumer is already gone.
    if done.send(frames).is_err() {
        warn!("consumer stopped before the producer finished");
    }
}

fn consume<C: RoleController>(
    mut consumer: Consumer<FrameSnapshot, C>,
    interval: Duration,
    done: &Receiver<u64>,
) -> (Tally, StatsSnapshot) {
    let mut tally = Tally::default();
    let mut final_frame = None;

    loop {
        match consumer.acquire() {
            Some(snapshot) => {
                trace!(frame = snapshot.frame, slot = %snapshot.slot(), "snapshot received");
                tally.observe(&snapshot);
            }
            None => tally.empty_polls += 1,
        }

        if let Some(last) = final_frame {
            if tally.last_frame >= last || !consumer.has_unread() {
                break;
            }
        }

        match done.recv_timeout(interval) {
            Ok(last) => final_frame = Some(last),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                if final_frame.is_none() {
                    warn!("producer vanished without signalling completion");
                    break;
                }
            }
        }
    }

    debug!(last_frame = tally.last_frame, "consumer finished");
    (tally, consumer.stats())
}
