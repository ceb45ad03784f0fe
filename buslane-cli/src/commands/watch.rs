//! Watch command - live arrival countdowns for one stop.

use std::sync::Arc;
use std::time::Duration;

use buslane::engine::{EngineConfig, StopEngine};
use buslane::normalize::has_multiple_visits;
use buslane::poller::PollerConfig;
use buslane::session::StopSession;
use buslane::HttpArrivalsApi;

use tracing::debug;

use crate::error::CliError;
use crate::render;

/// Track width in character cells.
const TRACK_COLS: usize = 48;

/// Arguments for the watch command.
pub struct WatchArgs {
    /// Stop code to watch.
    pub stop_code: String,

    /// Seconds between successful polls.
    pub interval: u64,

    /// Seconds before retrying a failed poll.
    pub retry_interval: u64,

    /// Render one snapshot and exit.
    pub once: bool,

    /// Services to list first.
    pub pins: Vec<String>,

    /// Override the feed endpoint.
    pub endpoint: Option<String>,
}

/// Run the watch command until Ctrl-C (or after one snapshot with `--once`).
pub async fn run(args: WatchArgs) -> Result<(), CliError> {
    let api = match &args.endpoint {
        Some(endpoint) => HttpArrivalsApi::with_base_url(endpoint.clone())?,
        None => HttpArrivalsApi::new()?,
    };

    let config = PollerConfig::default()
        .with_poll_interval(Duration::from_secs(args.interval))
        .with_retry_interval(Duration::from_secs(args.retry_interval));

    let mut session = StopSession::new(Arc::new(api), config);
    let status = session.status();

    let engine_config = EngineConfig::new();
    let lane_width_px = engine_config.lane_width_px;
    let mut engine = StopEngine::new(engine_config);
    engine.set_pinned(args.pins.clone());

    println!("buslane v{}", buslane::VERSION);
    println!("watching stop {} (Ctrl-C to quit)", args.stop_code);

    let mut rx = session.watch(args.stop_code.clone());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            snapshot = rx.recv() => {
                let Some(snapshot) = snapshot else { break };
                if session.current_stop() != Some(snapshot.stop_code.as_str()) {
                    debug!(stop = %snapshot.stop_code, "discarding stale snapshot");
                    continue;
                }

                let services = engine.apply(&snapshot.response);
                render::print_snapshot(
                    &snapshot.stop_code,
                    status.get(),
                    &services,
                    has_multiple_visits(&snapshot.response),
                    TRACK_COLS,
                    lane_width_px,
                );

                if args.once {
                    break;
                }
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
