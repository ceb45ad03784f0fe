//! Position model: ETA to lane offset, movement to animation time.
//!
//! A bus's ETA maps to a one-dimensional pixel offset along its lane. Buses
//! still counting down sit further out at 10 px per minute; buses that are
//! due or already at the stop use a tighter 2.5 px per minute, keeping them
//! hovering near the stop edge instead of swinging past it.
//!
//! Offsets beyond the lane's visible width collapse into an overflow region
//! near the far edge, staggered by lane position so stacked buses stay
//! distinguishable.
//!
//! Animation time is proportional to how far the bus actually moved since
//! the previous render, so a small countdown tick glides briefly while a
//! resync sweep takes visibly longer.

use std::collections::HashMap;

use crate::model::BusId;

/// Offset scale for buses with a positive ETA, in px per minute.
pub const DEFAULT_SCHEDULED_PX_PER_MIN: f64 = 10.0;

/// Offset scale for buses that are due or at the stop, in px per minute.
pub const DEFAULT_DUE_PX_PER_MIN: f64 = 2.5;

/// Rendered bus icon width in px; offsets within this of the lane edge
/// overflow.
pub const DEFAULT_BUS_WIDTH_PX: f64 = 30.0;

/// Base placement of the overflow region, in percent of lane width.
pub const DEFAULT_OVERFLOW_BASE_PCT: f64 = 90.0;

/// Extra overflow placement per lane position, in percent.
pub const DEFAULT_OVERFLOW_STEP_PCT: f64 = 2.0;

/// How many px of movement one second of transition covers.
pub const DEFAULT_TRANSITION_PX_PER_SEC: f64 = 10.0;

/// Transition used on first appearance, when no previous offset exists.
pub const DEFAULT_FIRST_APPEARANCE_SECS: f64 = 1.0;

/// Tunable constants for the position model.
#[derive(Debug, Clone)]
pub struct PositionConfig {
    /// Px per minute for positive ETAs.
    pub scheduled_px_per_min: f64,

    /// Px per minute for ETAs at or below zero.
    pub due_px_per_min: f64,

    /// Bus icon width in px.
    pub bus_width_px: f64,

    /// Overflow region base placement, percent of lane width.
    pub overflow_base_pct: f64,

    /// Overflow stagger per lane position, percent.
    pub overflow_step_pct: f64,

    /// Px of movement covered by one second of transition.
    pub transition_px_per_sec: f64,

    /// Transition seconds used on first appearance.
    pub first_appearance_secs: f64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            scheduled_px_per_min: DEFAULT_SCHEDULED_PX_PER_MIN,
            due_px_per_min: DEFAULT_DUE_PX_PER_MIN,
            bus_width_px: DEFAULT_BUS_WIDTH_PX,
            overflow_base_pct: DEFAULT_OVERFLOW_BASE_PCT,
            overflow_step_pct: DEFAULT_OVERFLOW_STEP_PCT,
            transition_px_per_sec: DEFAULT_TRANSITION_PX_PER_SEC,
            first_appearance_secs: DEFAULT_FIRST_APPEARANCE_SECS,
        }
    }
}

/// Where a bus sits along its lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaneOffset {
    /// Within the visible lane, px from the stop edge.
    Px(f64),

    /// In the overflow region, percent of lane width from the stop edge.
    OverflowPct(f64),
}

/// Converts ETAs to lane offsets and movement into transition durations.
#[derive(Debug, Default)]
pub struct PositionModel {
    config: PositionConfig,
}

impl PositionModel {
    /// Create a model with the given configuration.
    pub fn new(config: PositionConfig) -> Self {
        Self { config }
    }

    /// Raw pixel offset for an ETA, before overflow handling.
    pub fn offset_px(&self, eta_ms: i64) -> f64 {
        let minutes = eta_ms as f64 / 60_000.0;
        let scale = if eta_ms > 0 {
            self.config.scheduled_px_per_min
        } else {
            self.config.due_px_per_min
        };
        minutes * scale
    }

    /// Final placement of a bus given its raw offset, lane position, and
    /// the lane's visible width.
    pub fn place(&self, offset_px: f64, index: usize, lane_width_px: f64) -> LaneOffset {
        if offset_px > lane_width_px - self.config.bus_width_px {
            let pct = self.config.overflow_base_pct + self.config.overflow_step_pct * index as f64;
            LaneOffset::OverflowPct(pct)
        } else {
            LaneOffset::Px(offset_px)
        }
    }

    /// Transition duration for moving from `previous_px` to `offset_px`.
    ///
    /// Proportional to the distance moved; a fixed duration applies on
    /// first appearance when there is no previous offset.
    pub fn transition_secs(&self, offset_px: f64, previous_px: Option<f64>) -> f64 {
        match previous_px {
            Some(previous) => (offset_px - previous).abs() / self.config.transition_px_per_sec,
            None => self.config.first_appearance_secs,
        }
    }
}

/// Remembered raw offsets per tracked bus, for transition computation.
///
/// Rebuilt every render: buses absent from the new snapshot fall out, and
/// since identities are never reused a reappearing bus always starts fresh.
#[derive(Debug, Default)]
pub struct OffsetHistory {
    offsets: HashMap<BusId, f64>,
}

impl OffsetHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous raw offset for a bus, if it was rendered last cycle.
    pub fn previous(&self, id: BusId) -> Option<f64> {
        self.offsets.get(&id).copied()
    }

    /// Replace the history with this cycle's offsets.
    pub fn replace(&mut self, offsets: HashMap<BusId, f64>) {
        self.offsets = offsets;
    }
}
