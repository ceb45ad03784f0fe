//! Arrival feed polling loop.
//!
//! One poller serves one stop: fetch a snapshot, hand it to the consumer,
//! sleep, repeat. Failures are never fatal: they surface as an error
//! status and a shorter retry delay. Every await (the fetch and both
//! sleeps) races the cancellation token, so teardown stops pending timers
//! and drops in-flight responses immediately.
//!
//! # Status
//!
//! The poller publishes a tri-state fetch status for UI consumption:
//! `Loading` as each request starts, `Online` when the snapshot has at
//! least one service, `Idle` when it is empty, `Error` on failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ArrivalResponse, ArrivalsApi};

/// Default delay between successful polls, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Default delay before retrying a failed poll, in seconds.
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 3;

/// Polling cadence configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between successful polls.
    pub poll_interval: Duration,

    /// Delay before retrying after a failure.
    pub retry_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
        }
    }
}

impl PollerConfig {
    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the retry interval.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}

/// Fetch status published for UI consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No snapshot activity to report (startup, or an empty snapshot).
    #[default]
    Idle,

    /// A request is in flight.
    Loading,

    /// The latest snapshot arrived and has at least one service.
    Online,

    /// The latest request failed; a retry is scheduled.
    Error,
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::Idle => write!(f, "idle"),
            FetchStatus::Loading => write!(f, "loading"),
            FetchStatus::Online => write!(f, "online"),
            FetchStatus::Error => write!(f, "error"),
        }
    }
}

/// Shared fetch status cell, readable from the UI at any time.
#[derive(Debug, Default)]
pub struct SharedFetchStatus {
    inner: RwLock<FetchStatus>,
}

impl SharedFetchStatus {
    /// Create a shared status cell starting at [`FetchStatus::Idle`].
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Current status.
    pub fn get(&self) -> FetchStatus {
        *self.inner.read()
    }

    /// Publish a new status.
    pub fn set(&self, status: FetchStatus) {
        let mut current = self.inner.write();
        if *current != status {
            debug!(from = %*current, to = %status, "fetch status changed");
            *current = status;
        }
    }
}

/// A fetched snapshot, tagged with the stop it belongs to.
///
/// The tag lets consumers discard deliveries that raced a stop switch.
#[derive(Debug, Clone)]
pub struct ArrivalSnapshot {
    /// Stop code the snapshot was fetched for.
    pub stop_code: String,

    /// The raw feed payload.
    pub response: ArrivalResponse,
}

/// Polls the arrival feed for one stop and delivers snapshots on a channel.
pub struct Poller<A: ArrivalsApi> {
    api: Arc<A>,
    config: PollerConfig,
    status: Arc<SharedFetchStatus>,
    paused: Arc<AtomicBool>,
}

impl<A: ArrivalsApi> Poller<A> {
    /// Create a poller.
    ///
    /// `paused` is read on every tick: while set, the tick skips its fetch
    /// but the schedule keeps running, so clearing the flag resumes polling
    /// at the normal cadence without restarting anything.
    pub fn new(
        api: Arc<A>,
        config: PollerConfig,
        status: Arc<SharedFetchStatus>,
        paused: Arc<AtomicBool>,
    ) -> Self {
        Self {
            api,
            config,
            status,
            paused,
        }
    }

    /// Run the poll loop until cancelled.
    ///
    /// The first fetch happens immediately; afterwards each tick sleeps
    /// `poll_interval` on success and `retry_interval` on failure. The loop
    /// also ends when the snapshot receiver goes away.
    pub async fn run(
        self,
        stop_code: String,
        tx: mpsc::Sender<ArrivalSnapshot>,
        cancel: CancellationToken,
    ) {
        info!(stop = %stop_code, "arrival poll loop starting");

        loop {
            let delay = if self.paused.load(Ordering::Relaxed) {
                debug!(stop = %stop_code, "poll tick skipped while paused");
                self.config.poll_interval
            } else {
                self.status.set(FetchStatus::Loading);

                let fetched = tokio::select! {
                    biased;

                    _ = cancel.cancelled() => break,
                    result = self.api.fetch(&stop_code) => result,
                };

                match fetched {
                    Ok(response) => {
                        let services = response.services.len();
                        self.status.set(if services > 0 {
                            FetchStatus::Online
                        } else {
                            FetchStatus::Idle
                        });
                        debug!(stop = %stop_code, services, "arrival snapshot received");

                        let snapshot = ArrivalSnapshot {
                            stop_code: stop_code.clone(),
                            response,
                        };
                        if tx.send(snapshot).await.is_err() {
                            debug!(stop = %stop_code, "snapshot receiver dropped; stopping");
                            break;
                        }
                        self.config.poll_interval
                    }
                    Err(e) => {
                        warn!(stop = %stop_code, error = %e, "arrival fetch failed");
                        self.status.set(FetchStatus::Error);
                        self.config.retry_interval
                    }
                }
            };

            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(stop = %stop_code, "arrival poll loop stopped");
    }
}
