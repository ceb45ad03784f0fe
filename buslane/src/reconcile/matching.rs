//! The matching algorithm: link anonymous observations to tracked buses.
//!
//! # Matching Logic
//!
//! ```text
//! match: same static trip metadata AND  lower < Δeta(min) < upper
//! Δeta = incoming.eta − previous.eta,  defaults (−5, +3), both exclusive
//! ```
//!
//! The window is asymmetric on purpose. A bus counting down normally, or
//! resyncing after a brief estimate correction, shows an ETA *decrease*;
//! anything up to five minutes of decrease is still plausibly the same
//! vehicle. An ETA *increase* beyond small schedule jitter usually means
//! the tracked bus vanished and a later one took its slot, so only up to
//! three minutes of increase is accepted.

use crate::model::{BusId, Observation, TrackedBus};

use super::identity::IdAllocator;

/// Default lower bound of the match window, in minutes (exclusive).
pub const DEFAULT_WINDOW_LOWER_MIN: f64 = -5.0;

/// Default upper bound of the match window, in minutes (exclusive).
pub const DEFAULT_WINDOW_UPPER_MIN: f64 = 3.0;

/// ETA-delta window for accepting a match, in minutes.
///
/// Both bounds are exclusive: a delta sitting exactly on a bound does not
/// match.
#[derive(Debug, Clone)]
pub struct MatchWindow {
    /// Largest accepted ETA decrease (a negative number of minutes).
    pub lower_min: f64,

    /// Largest accepted ETA increase (a positive number of minutes).
    pub upper_min: f64,
}

impl Default for MatchWindow {
    fn default() -> Self {
        Self {
            lower_min: DEFAULT_WINDOW_LOWER_MIN,
            upper_min: DEFAULT_WINDOW_UPPER_MIN,
        }
    }
}

impl MatchWindow {
    /// Create a window with custom bounds (minutes, lower negative).
    pub fn new(lower_min: f64, upper_min: f64) -> Self {
        Self {
            lower_min,
            upper_min,
        }
    }

    /// Whether an ETA delta (minutes) falls strictly inside the window.
    pub fn contains(&self, delta_min: f64) -> bool {
        delta_min > self.lower_min && delta_min < self.upper_min
    }
}

/// Whether two observations describe the same physical trip.
///
/// Compares only the static metadata: vehicle type, accessibility feature,
/// visit number, and the origin/destination stop codes. ETA and load are
/// expected to change between polls and are deliberately excluded.
fn same_trip(a: &Observation, b: &Observation) -> bool {
    a.vehicle_type == b.vehicle_type
        && a.feature == b.feature
        && a.visit_number == b.visit_number
        && a.origin_code == b.origin_code
        && a.destination_code == b.destination_code
}

/// Signed ETA movement from `previous` to `incoming`, in minutes.
fn eta_delta_minutes(incoming: &Observation, previous: &Observation) -> f64 {
    (incoming.eta_ms - previous.eta_ms) as f64 / 60_000.0
}

/// Working entry while the result list is under construction.
enum Slot {
    /// An incoming observation, claimed by a prior identity or still free.
    Incoming {
        observation: Observation,
        claimed: Option<BusId>,
    },

    /// A previous bus with no successor, kept for one fade-out cycle.
    Ghost(TrackedBus),
}

/// Reconcile one lane's previous tracked list with a fresh snapshot.
///
/// Matched observations keep their prior identity, previous buses with no
/// match become ghosts spliced in at their original relative position, and
/// unmatched incoming observations get fresh identities. Ghost entries in
/// `previous` are from the prior cycle's fade-out and are dropped before
/// matching begins.
///
/// The result is a newly constructed list; neither input is mutated. Given
/// the same inputs and the same allocator state, the output is identical.
pub fn reconcile(
    previous: &[TrackedBus],
    incoming: &[Observation],
    window: &MatchWindow,
    ids: &mut IdAllocator,
) -> Vec<TrackedBus> {
    let mut slots: Vec<Slot> = incoming
        .iter()
        .map(|observation| Slot::Incoming {
            observation: observation.clone(),
            claimed: None,
        })
        .collect();

    for (index, prior) in previous.iter().filter(|bus| !bus.ghost).enumerate() {
        let candidate = slots.iter().position(|slot| match slot {
            Slot::Incoming {
                observation,
                claimed: None,
            } => {
                same_trip(&prior.observation, observation)
                    && window.contains(eta_delta_minutes(observation, &prior.observation))
            }
            _ => false,
        });

        match candidate {
            Some(slot_index) => {
                if let Slot::Incoming { claimed, .. } = &mut slots[slot_index] {
                    *claimed = Some(prior.id);
                }
            }
            None => {
                // No successor: fade this bus out where it last was.
                let at = index.min(slots.len());
                slots.insert(
                    at,
                    Slot::Ghost(TrackedBus {
                        id: prior.id,
                        ghost: true,
                        observation: prior.observation.clone(),
                    }),
                );
            }
        }
    }

    slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Incoming {
                observation,
                claimed,
            } => TrackedBus {
                id: claimed.unwrap_or_else(|| ids.next_id()),
                ghost: false,
                observation,
            },
            Slot::Ghost(bus) => bus,
        })
        .collect()
}
