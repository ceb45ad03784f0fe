//! Stop session: one live poll loop at a time.
//!
//! Switching the watched stop must not leak the old loop: its pending
//! timers are cancelled, its in-flight response is dropped, and its channel
//! dies with the receiver the caller discards. At most one loop runs per
//! session, so two stops can never cross-talk.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::ArrivalsApi;
use crate::poller::{ArrivalSnapshot, Poller, PollerConfig, SharedFetchStatus};

/// Buffered snapshots per poll loop channel.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 8;

/// The currently running poll loop.
struct ActiveLoop {
    stop_code: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the poll loop for the currently watched stop.
pub struct StopSession<A: ArrivalsApi + 'static> {
    api: Arc<A>,
    config: PollerConfig,
    status: Arc<SharedFetchStatus>,
    paused: Arc<AtomicBool>,
    active: Option<ActiveLoop>,
}

impl<A: ArrivalsApi + 'static> StopSession<A> {
    /// Create a session with no active stop.
    pub fn new(api: Arc<A>, config: PollerConfig) -> Self {
        Self {
            api,
            config,
            status: SharedFetchStatus::new(),
            paused: Arc::new(AtomicBool::new(false)),
            active: None,
        }
    }

    /// Shared fetch status for UI display.
    pub fn status(&self) -> Arc<SharedFetchStatus> {
        Arc::clone(&self.status)
    }

    /// Pause or resume fetching. The poll schedule keeps ticking while
    /// paused; fetches simply resume on the next tick after unpausing.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    /// The stop currently being watched, if any.
    pub fn current_stop(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.stop_code.as_str())
    }

    /// Start watching a stop, tearing down any previous loop first.
    ///
    /// Returns the receiver for the new loop's snapshots. Each snapshot is
    /// tagged with its stop code; together with the fresh channel this
    /// guarantees a stale loop's results are never applied to the new stop.
    pub fn watch(&mut self, stop_code: impl Into<String>) -> mpsc::Receiver<ArrivalSnapshot> {
        let stop_code = stop_code.into();
        self.stop();

        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let poller = Poller::new(
            Arc::clone(&self.api),
            self.config.clone(),
            Arc::clone(&self.status),
            Arc::clone(&self.paused),
        );
        let handle = tokio::spawn(poller.run(stop_code.clone(), tx, cancel.clone()));

        self.active = Some(ActiveLoop {
            stop_code,
            cancel,
            handle,
        });
        rx
    }

    /// Stop watching. Cancels the loop's pending timer and any in-flight
    /// fetch; the loop task winds down on its own.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            info!(stop = %active.stop_code, "stopping arrival poll loop");
            active.cancel.cancel();
            drop(active.handle);
        }
    }

    /// Stop watching and wait for the loop task to finish.
    pub async fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            info!(stop = %active.stop_code, "shutting down arrival poll loop");
            active.cancel.cancel();
            let _ = active.handle.await;
        }
    }
}

impl<A: ArrivalsApi + 'static> Drop for StopSession<A> {
    fn drop(&mut self) {
        self.stop();
    }
}
