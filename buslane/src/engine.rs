//! Per-stop tracking engine.
//!
//! Composes the normalizer, the per-lane reconcilers, and the position
//! model into one stateful unit: raw snapshot in, renderer-ready lanes out.
//!
//! # Architecture
//!
//! ```text
//! ArrivalResponse ──► normalize ──► LaneReconciler (per LaneKey) ──► PositionModel
//!                                        │                              │
//!                                        └───────── StopEngine ─────────┘
//!                                                      │
//!                                                      ▼
//!                                             Vec<ServiceLanes>
//! ```
//!
//! Lane state is keyed by service and visit-number slice. Lanes absent from
//! a snapshot lose their state immediately, so tracking never crosses
//! unrelated lanes and a returning service always starts fresh.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::api::{ArrivalResponse, RawService};
use crate::model::{BusId, LaneKey, Observation};
use crate::normalize::normalize_service;
use crate::position::{LaneOffset, OffsetHistory, PositionConfig, PositionModel};
use crate::reconcile::{IdAllocator, LaneReconciler, MatchWindow};

/// Default visible lane width handed to the position model, in px.
pub const DEFAULT_LANE_WIDTH_PX: f64 = 360.0;

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// ETA-delta window for identity matching.
    pub window: MatchWindow,

    /// Position model constants.
    pub position: PositionConfig,

    /// Visible lane width in px, for overflow placement.
    pub lane_width_px: f64,
}

impl EngineConfig {
    /// Create a config with default matching and position constants.
    pub fn new() -> Self {
        Self {
            window: MatchWindow::default(),
            position: PositionConfig::default(),
            lane_width_px: DEFAULT_LANE_WIDTH_PX,
        }
    }

    /// Set the visible lane width.
    pub fn with_lane_width(mut self, lane_width_px: f64) -> Self {
        self.lane_width_px = lane_width_px;
        self
    }
}

/// One bus, ready to draw.
#[derive(Debug, Clone)]
pub struct BusView {
    /// Synthetic identity, stable while the bus keeps matching.
    pub id: BusId,

    /// True for the single fade-out cycle after the bus vanished.
    pub ghost: bool,

    /// Current observation (last known values for ghosts).
    pub observation: Observation,

    /// Placement along the lane.
    pub offset: LaneOffset,

    /// Seconds the move from the previous placement should take.
    pub transition_secs: f64,
}

/// One rendered lane of a service.
#[derive(Debug, Clone)]
pub struct LaneView {
    /// Visit number label, when the service splits into two lanes.
    pub visit_number: Option<u8>,

    /// Buses in lane order.
    pub buses: Vec<BusView>,
}

/// All lanes of one service.
#[derive(Debug, Clone)]
pub struct ServiceLanes {
    /// Service number.
    pub service: String,

    /// One or two lanes, by visit-number slice.
    pub lanes: Vec<LaneView>,
}

/// Sort key giving bus services their natural order: numeric prefix first,
/// full string as tiebreak (`"10" < "10e" < "12"`).
fn service_sort_key(no: &str) -> (u32, String) {
    let digits: String = no.chars().take_while(|c| c.is_ascii_digit()).collect();
    let number = digits.parse().unwrap_or(u32::MAX);
    (number, no.to_string())
}

/// Stateful tracker for one stop.
pub struct StopEngine {
    config: EngineConfig,
    position: PositionModel,
    ids: IdAllocator,
    lanes: HashMap<LaneKey, LaneReconciler>,
    offsets: OffsetHistory,
    pinned: Vec<String>,
}

impl StopEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        let position = PositionModel::new(config.position.clone());
        Self {
            config,
            position,
            ids: IdAllocator::new(),
            lanes: HashMap::new(),
            offsets: OffsetHistory::new(),
            pinned: Vec::new(),
        }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::new())
    }

    /// Services to list first, in service-number order within the group.
    pub fn set_pinned(&mut self, pinned: Vec<String>) {
        self.pinned = pinned;
    }

    /// Apply a fresh snapshot and produce renderer-ready lanes.
    ///
    /// Services are ordered pinned-first, then by service number. Lane
    /// state for services (or visit slices) missing from this snapshot is
    /// dropped.
    pub fn apply(&mut self, response: &ArrivalResponse) -> Vec<ServiceLanes> {
        let mut services: Vec<&RawService> = response.services.iter().collect();
        services.sort_by_cached_key(|service| {
            let pinned = self.pinned.iter().any(|pin| pin == &service.no);
            (!pinned, service_sort_key(&service.no))
        });

        let mut seen: HashSet<LaneKey> = HashSet::new();
        let mut next_offsets: HashMap<BusId, f64> = HashMap::new();
        let mut output = Vec::with_capacity(services.len());

        for service in services {
            let mut lane_views = Vec::new();

            for (group, observations) in normalize_service(service) {
                let key = LaneKey {
                    service: service.no.clone(),
                    group,
                };
                seen.insert(key.clone());

                let window = self.config.window.clone();
                let reconciler = self
                    .lanes
                    .entry(key)
                    .or_insert_with(|| LaneReconciler::new(window));
                let tracked = reconciler.advance(&observations, &mut self.ids);

                let buses = tracked
                    .into_iter()
                    .enumerate()
                    .map(|(index, bus)| {
                        let offset_px = self.position.offset_px(bus.observation.eta_ms);
                        let transition_secs = self
                            .position
                            .transition_secs(offset_px, self.offsets.previous(bus.id));
                        next_offsets.insert(bus.id, offset_px);

                        BusView {
                            id: bus.id,
                            ghost: bus.ghost,
                            observation: bus.observation,
                            offset: self.position.place(
                                offset_px,
                                index,
                                self.config.lane_width_px,
                            ),
                            transition_secs,
                        }
                    })
                    .collect();

                lane_views.push(LaneView {
                    visit_number: group.visit_number(),
                    buses,
                });
            }

            output.push(ServiceLanes {
                service: service.no.clone(),
                lanes: lane_views,
            });
        }

        let before = self.lanes.len();
        self.lanes.retain(|key, _| seen.contains(key));
        if self.lanes.len() < before {
            debug!(
                dropped = before - self.lanes.len(),
                "lane state dropped for services absent from snapshot"
            );
        }
        self.offsets.replace(next_offsets);

        output
    }
}
