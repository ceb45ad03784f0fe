//! Per-lane reconciliation state.

use tracing::debug;

use crate::model::{Observation, TrackedBus};

use super::identity::IdAllocator;
use super::matching::{reconcile, MatchWindow};

/// Stateful reconciler for one lane (one service and visit-number slice).
///
/// Owns the lane's previous tracked list and a fingerprint of the last
/// processed snapshot. Feeding the same snapshot again returns the cached
/// output untouched, so redundant renders cannot reshuffle identities.
#[derive(Debug)]
pub struct LaneReconciler {
    window: MatchWindow,

    /// Observations of the last snapshot actually reconciled.
    last_input: Option<Vec<Observation>>,

    /// Last reconciled output; its non-ghost subset is the next cycle's
    /// previous list.
    last_output: Vec<TrackedBus>,
}

impl LaneReconciler {
    /// Create a fresh lane with no history.
    pub fn new(window: MatchWindow) -> Self {
        Self {
            window,
            last_input: None,
            last_output: Vec::new(),
        }
    }

    /// Reconcile the lane against a new snapshot.
    ///
    /// An input identical to the previous one short-circuits to the cached
    /// output, unless that output still contains ghosts, which must not
    /// survive a second cycle; in that case reconciliation runs and the
    /// ghosts drop out.
    pub fn advance(&mut self, incoming: &[Observation], ids: &mut IdAllocator) -> Vec<TrackedBus> {
        let unchanged = self.last_input.as_deref() == Some(incoming);
        if unchanged && !self.last_output.iter().any(|bus| bus.ghost) {
            return self.last_output.clone();
        }

        let output = reconcile(&self.last_output, incoming, &self.window, ids);

        let ghosted = output.iter().filter(|bus| bus.ghost).count();
        let fresh = output
            .iter()
            .filter(|bus| !bus.ghost && !self.last_output.iter().any(|prior| prior.id == bus.id))
            .count();
        if ghosted > 0 || fresh > 0 {
            debug!(incoming = incoming.len(), ghosted, fresh, "lane reconciled");
        }

        self.last_input = Some(incoming.to_vec());
        self.last_output = output.clone();
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BusId, OccupancyLoad, VehicleType};

    fn observation(eta_ms: i64) -> Observation {
        Observation {
            visit_number: Some(1),
            eta_ms,
            vehicle_type: VehicleType::SingleDeck,
            feature: "WAB".to_string(),
            load: OccupancyLoad::SeatsAvailable,
            origin_code: "77009".to_string(),
            destination_code: "77131".to_string(),
        }
    }

    #[test]
    fn test_identity_is_stable_across_polls() {
        let mut lane = LaneReconciler::new(MatchWindow::default());
        let mut ids = IdAllocator::new();

        let first = lane.advance(&[observation(180_000)], &mut ids);
        let second = lane.advance(&[observation(120_000)], &mut ids);

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(second[0].observation.eta_ms, 120_000);
    }

    #[test]
    fn test_repeated_snapshot_is_idempotent() {
        let mut lane = LaneReconciler::new(MatchWindow::default());
        let mut ids = IdAllocator::new();

        let snapshot = vec![observation(180_000), observation(600_000)];
        let first = lane.advance(&snapshot, &mut ids);
        let second = lane.advance(&snapshot, &mut ids);

        assert_eq!(first, second);
    }

    #[test]
    fn test_ghost_lasts_exactly_one_cycle() {
        let mut lane = LaneReconciler::new(MatchWindow::default());
        let mut ids = IdAllocator::new();

        lane.advance(&[observation(180_000)], &mut ids);

        // Bus vanishes: one ghost cycle.
        let faded = lane.advance(&[], &mut ids);
        assert_eq!(faded.len(), 1);
        assert!(faded[0].ghost);
        assert_eq!(faded[0].observation.eta_ms, 180_000);

        // Next cycle: gone entirely, even though the input is unchanged.
        let gone = lane.advance(&[], &mut ids);
        assert!(gone.is_empty());
    }

    #[test]
    fn test_reappearing_bus_gets_a_new_identity() {
        let mut lane = LaneReconciler::new(MatchWindow::default());
        let mut ids = IdAllocator::new();

        let first = lane.advance(&[observation(180_000)], &mut ids);
        lane.advance(&[], &mut ids);
        lane.advance(&[], &mut ids);
        let returned = lane.advance(&[observation(180_000)], &mut ids);

        assert_eq!(returned.len(), 1);
        assert!(!returned[0].ghost);
        assert_ne!(returned[0].id, first[0].id);
    }

    #[test]
    fn test_identical_snapshot_after_ghost_reruns_reconciliation() {
        let mut lane = LaneReconciler::new(MatchWindow::default());
        let mut ids = IdAllocator::new();

        lane.advance(&[observation(180_000), observation(600_000)], &mut ids);

        // Second bus vanishes: output has a ghost.
        let snapshot = vec![observation(170_000)];
        let faded = lane.advance(&snapshot, &mut ids);
        assert!(faded.iter().any(|bus| bus.ghost));

        // Same snapshot again: the cache must not resurrect the ghost.
        let settled = lane.advance(&snapshot, &mut ids);
        assert_eq!(settled.len(), 1);
        assert!(settled.iter().all(|bus| !bus.ghost));
    }

    #[test]
    fn test_survivor_keeps_identity_while_neighbor_ghosts() {
        let mut lane = LaneReconciler::new(MatchWindow::default());
        let mut ids = IdAllocator::new();

        let first = lane.advance(&[observation(60_000), observation(420_000)], &mut ids);
        let second = lane.advance(&[observation(400_000)], &mut ids);

        // First bus arrived and vanished; the second keeps counting down.
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].id, first[0].id);
        assert!(second[0].ghost);
        assert_eq!(second[1].id, first[1].id);
        assert!(!second[1].ghost);
    }

    #[test]
    fn test_fresh_lane_mints_sequential_ids() {
        let mut lane = LaneReconciler::new(MatchWindow::default());
        let mut ids = IdAllocator::new();

        let tracked = lane.advance(&[observation(60_000), observation(300_000)], &mut ids);
        assert_eq!(tracked[0].id, BusId(1));
        assert_eq!(tracked[1].id, BusId(2));
    }
}
