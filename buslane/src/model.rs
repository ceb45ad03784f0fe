//! Core data model for live bus-arrival tracking.
//!
//! The arrival feed is anonymous: a snapshot describes upcoming buses per
//! service but carries no stable vehicle identifier. The types here separate
//! what the feed observes ([`Observation`]) from what the tracker maintains
//! ([`TrackedBus`], an observation plus a synthetic [`BusId`]).

use std::fmt;

use serde::Deserialize;

/// Vehicle type reported by the arrival feed.
///
/// Unrecognized feed values map to [`VehicleType::Unknown`] rather than
/// failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum VehicleType {
    /// Single deck bus (`"SD"`).
    #[serde(rename = "SD")]
    SingleDeck,

    /// Double deck bus (`"DD"`).
    #[serde(rename = "DD")]
    DoubleDeck,

    /// Bendy (articulated) bus (`"BD"`).
    #[serde(rename = "BD")]
    Bendy,

    /// Any value the feed sends that we do not recognize.
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleType::SingleDeck => write!(f, "single-deck"),
            VehicleType::DoubleDeck => write!(f, "double-deck"),
            VehicleType::Bendy => write!(f, "bendy"),
            VehicleType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Passenger load reported by the arrival feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum OccupancyLoad {
    /// Seats available (`"SEA"`).
    #[serde(rename = "SEA")]
    SeatsAvailable,

    /// Standing available (`"SDA"`).
    #[serde(rename = "SDA")]
    StandingAvailable,

    /// Limited standing (`"LSD"`).
    #[serde(rename = "LSD")]
    LimitedStanding,

    /// Any value the feed sends that we do not recognize.
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for OccupancyLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccupancyLoad::SeatsAvailable => write!(f, "seats available"),
            OccupancyLoad::StandingAvailable => write!(f, "standing available"),
            OccupancyLoad::LimitedStanding => write!(f, "limited standing"),
            OccupancyLoad::Unknown => write!(f, "unknown"),
        }
    }
}

/// Accessibility feature value for a wheelchair-accessible bus.
pub const WHEELCHAIR_ACCESSIBLE_FEATURE: &str = "WAB";

/// One upcoming bus event for a service at the watched stop.
///
/// All fields come from a single feed snapshot. Two observations from
/// consecutive polls can only be linked heuristically; see the `reconcile`
/// module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Which visit of the route this is, when the route serves the stop
    /// more than once per loop. `None` when the feed omits it.
    pub visit_number: Option<u8>,

    /// Signed milliseconds until arrival. Zero or negative means the bus
    /// is due or already at the stop.
    pub eta_ms: i64,

    /// Vehicle type.
    pub vehicle_type: VehicleType,

    /// Accessibility feature flag. [`WHEELCHAIR_ACCESSIBLE_FEATURE`] when
    /// the bus is wheelchair accessible; empty when the feed omits it.
    pub feature: String,

    /// Passenger load.
    pub load: OccupancyLoad,

    /// Stop code where this trip started.
    pub origin_code: String,

    /// Stop code where this trip ends.
    pub destination_code: String,
}

impl Observation {
    /// Whether this bus is wheelchair accessible.
    pub fn is_wheelchair_accessible(&self) -> bool {
        self.feature.eq_ignore_ascii_case(WHEELCHAIR_ACCESSIBLE_FEATURE)
    }

    /// ETA expressed in (fractional) minutes.
    pub fn eta_minutes(&self) -> f64 {
        self.eta_ms as f64 / 60_000.0
    }
}

/// Synthetic identity for a tracked bus.
///
/// The feed has no vehicle IDs, so the tracker mints its own: monotonically
/// increasing, unique for the lifetime of the process, never reused. IDs are
/// only minted by `reconcile::IdAllocator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusId(pub u64);

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An observation with its synthetic identity attached.
///
/// `ghost` marks a bus that vanished from the feed this cycle: it is kept in
/// the output for exactly one render so the consumer can fade it out, and is
/// dropped from tracking state before the next reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedBus {
    /// Synthetic identity, stable across polls while the bus keeps matching.
    pub id: BusId,

    /// True only for the single cycle in which the bus disappeared.
    pub ghost: bool,

    /// The underlying observation. For ghosts, the last known values.
    pub observation: Observation,
}

/// Which visit-number slice of a service a lane holds.
///
/// A service whose snapshot contains a second-visit slot is split into two
/// lanes; otherwise all slots share one combined lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitGroup {
    /// All slots regardless of visit number (the common, single-visit case).
    Combined,

    /// Slots with this exact visit number (1 or 2).
    Visit(u8),
}

impl VisitGroup {
    /// The visit number to display for this lane, if any.
    pub fn visit_number(&self) -> Option<u8> {
        match self {
            VisitGroup::Combined => None,
            VisitGroup::Visit(n) => Some(*n),
        }
    }
}

/// Identity of one tracked lane: a service and its visit-number slice.
///
/// Reconciliation state is owned per lane key and never crosses keys. When a
/// service's lane shape changes between polls (combined vs. split), its keys
/// change and tracking restarts fresh.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LaneKey {
    /// Service number, e.g. `"315"`.
    pub service: String,

    /// Visit-number slice.
    pub group: VisitGroup,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(eta_ms: i64) -> Observation {
        Observation {
            visit_number: Some(1),
            eta_ms,
            vehicle_type: VehicleType::DoubleDeck,
            feature: WHEELCHAIR_ACCESSIBLE_FEATURE.to_string(),
            load: OccupancyLoad::SeatsAvailable,
            origin_code: "77009".to_string(),
            destination_code: "77131".to_string(),
        }
    }

    #[test]
    fn test_vehicle_type_parses_feed_values() {
        let sd: VehicleType = serde_json::from_str("\"SD\"").unwrap();
        let dd: VehicleType = serde_json::from_str("\"DD\"").unwrap();
        let bd: VehicleType = serde_json::from_str("\"BD\"").unwrap();
        assert_eq!(sd, VehicleType::SingleDeck);
        assert_eq!(dd, VehicleType::DoubleDeck);
        assert_eq!(bd, VehicleType::Bendy);
    }

    #[test]
    fn test_vehicle_type_unknown_value_is_tolerated() {
        let parsed: VehicleType = serde_json::from_str("\"EV\"").unwrap();
        assert_eq!(parsed, VehicleType::Unknown);
    }

    #[test]
    fn test_occupancy_load_parses_feed_values() {
        let sea: OccupancyLoad = serde_json::from_str("\"SEA\"").unwrap();
        let sda: OccupancyLoad = serde_json::from_str("\"SDA\"").unwrap();
        let lsd: OccupancyLoad = serde_json::from_str("\"LSD\"").unwrap();
        assert_eq!(sea, OccupancyLoad::SeatsAvailable);
        assert_eq!(sda, OccupancyLoad::StandingAvailable);
        assert_eq!(lsd, OccupancyLoad::LimitedStanding);
    }

    #[test]
    fn test_wheelchair_accessibility_flag() {
        let accessible = observation(60_000);
        assert!(accessible.is_wheelchair_accessible());

        let mut inaccessible = observation(60_000);
        inaccessible.feature = String::new();
        assert!(!inaccessible.is_wheelchair_accessible());
    }

    #[test]
    fn test_eta_minutes_conversion() {
        assert_eq!(observation(180_000).eta_minutes(), 3.0);
        assert_eq!(observation(-30_000).eta_minutes(), -0.5);
    }

    #[test]
    fn test_bus_id_display() {
        assert_eq!(format!("{}", BusId(42)), "#42");
    }

    #[test]
    fn test_visit_group_visit_number() {
        assert_eq!(VisitGroup::Combined.visit_number(), None);
        assert_eq!(VisitGroup::Visit(2).visit_number(), Some(2));
    }
}
