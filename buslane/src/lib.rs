//! Buslane - live bus-arrival tracking for a transit stop.
//!
//! This library polls an arrival feed for one stop and turns its anonymous
//! per-service snapshots into continuously tracked lanes: each upcoming bus
//! gets a synthetic identity that persists across polls, buses that vanish
//! fade out through a one-cycle ghost placeholder, and every bus carries a
//! lane offset plus a transition duration so a renderer can animate smooth
//! motion toward the stop.
//!
//! # Architecture
//!
//! ```text
//! Poller ──► Normalizer ──► Identity Reconciler ──► Position Model ──► consumer
//!  (HTTP)    (per lane)      (stateful, per lane)      (offsets)
//! ```
//!
//! The poller is the only asynchronous component; everything downstream is
//! pure and deterministic. [`engine::StopEngine`] composes the synchronous
//! stages, and [`session::StopSession`] owns the poll loop's lifecycle.

pub mod api;
pub mod engine;
pub mod model;
pub mod normalize;
pub mod poller;
pub mod position;
pub mod reconcile;
pub mod session;

pub use api::{ArrivalsApi, FetchError, HttpArrivalsApi};
pub use engine::{BusView, EngineConfig, LaneView, ServiceLanes, StopEngine};
pub use model::{BusId, Observation, OccupancyLoad, TrackedBus, VehicleType};
pub use poller::{ArrivalSnapshot, FetchStatus, PollerConfig, SharedFetchStatus};
pub use session::StopSession;

/// Crate version, for CLI banners.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
