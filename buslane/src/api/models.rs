//! Serde models for the raw arrival feed payload.
//!
//! Every slot field is optional: the feed omits fields freely and the
//! normalizer decides what is usable. Unknown fields (operator, coordinates,
//! absolute timestamps) are ignored.

use serde::Deserialize;

use crate::model::{OccupancyLoad, VehicleType};

/// Top-level feed payload for one stop.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArrivalResponse {
    /// Services currently calling at the stop.
    #[serde(default)]
    pub services: Vec<RawService>,
}

/// One service record with up to three upcoming visit slots.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawService {
    /// Service number, e.g. `"315"`.
    #[serde(default)]
    pub no: String,

    /// Next arriving bus.
    #[serde(default)]
    pub next: Option<RawVisit>,

    /// Second arriving bus.
    #[serde(default)]
    pub next2: Option<RawVisit>,

    /// Third arriving bus.
    #[serde(default)]
    pub next3: Option<RawVisit>,
}

impl RawService {
    /// The three visit slots in feed order, skipping absent ones.
    pub fn slots(&self) -> impl Iterator<Item = &RawVisit> {
        [&self.next, &self.next2, &self.next3]
            .into_iter()
            .flatten()
    }
}

/// One visit slot as sent by the feed.
///
/// A slot without `duration_ms` is unusable and is dropped during
/// normalization rather than rejected at decode time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVisit {
    /// Signed milliseconds until arrival.
    #[serde(default)]
    pub duration_ms: Option<i64>,

    /// Vehicle type (`"SD"`, `"DD"`, `"BD"`).
    #[serde(rename = "type", default)]
    pub vehicle_type: Option<VehicleType>,

    /// Accessibility feature flag (`"WAB"` when wheelchair accessible).
    #[serde(default)]
    pub feature: Option<String>,

    /// Passenger load (`"SEA"`, `"SDA"`, `"LSD"`).
    #[serde(default)]
    pub load: Option<OccupancyLoad>,

    /// Visit number for routes serving the stop twice per loop.
    #[serde(default)]
    pub visit_number: Option<u8>,

    /// Stop code where the trip started.
    #[serde(default)]
    pub origin_code: Option<String>,

    /// Stop code where the trip ends.
    #[serde(default)]
    pub destination_code: Option<String>,
}
