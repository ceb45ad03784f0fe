//! Arrival feed access.
//!
//! The feed is an HTTP endpoint returning, per stop, a JSON array of
//! services with up to three upcoming visit slots. It is treated as
//! untrusted: any slot field may be missing and whole slots may be absent.
//!
//! # Architecture
//!
//! ```text
//! Poller ──► ArrivalsApi (trait) ──► HttpArrivalsApi (reqwest)
//!                      └──────────► mock clients in tests
//! ```

mod client;
mod models;

pub use client::{ArrivalsApi, FetchError, HttpArrivalsApi, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use models::{ArrivalResponse, RawService, RawVisit};
