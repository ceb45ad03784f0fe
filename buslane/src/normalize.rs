//! Snapshot normalization.
//!
//! Flattens a raw service record's three visit slots into ordered
//! observation lists per lane. Slots without a numeric ETA are unusable and
//! are dropped here; nothing downstream sees them.
//!
//! A service normally produces one combined lane. Only when the snapshot
//! contains a second-visit slot does the service split into separate
//! visit-1 and visit-2 lanes, so the common single-visit case never carries
//! an empty second lane.

use crate::api::{ArrivalResponse, RawService, RawVisit};
use crate::model::{Observation, VisitGroup};

/// Build an observation from a raw slot, or drop it when the ETA is absent.
///
/// Missing metadata fields fall back to empty/unknown values, which still
/// compare consistently during matching.
fn to_observation(raw: &RawVisit) -> Option<Observation> {
    let eta_ms = raw.duration_ms?;
    Some(Observation {
        visit_number: raw.visit_number,
        eta_ms,
        vehicle_type: raw.vehicle_type.unwrap_or_default(),
        feature: raw.feature.clone().unwrap_or_default(),
        load: raw.load.unwrap_or_default(),
        origin_code: raw.origin_code.clone().unwrap_or_default(),
        destination_code: raw.destination_code.clone().unwrap_or_default(),
    })
}

/// Normalize one service record into its lanes.
///
/// The split decision looks at the raw slots before ETA filtering: a
/// second-visit slot splits the service even if that slot itself has no
/// usable ETA yet. In split mode, slots whose visit number is neither 1 nor
/// 2 are dropped; in combined mode every usable slot is kept in feed order.
pub fn normalize_service(service: &RawService) -> Vec<(VisitGroup, Vec<Observation>)> {
    let slots: Vec<&RawVisit> = service.slots().collect();
    let has_second_visit = slots.iter().any(|slot| slot.visit_number == Some(2));

    if has_second_visit {
        let lane = |visit: u8| {
            slots
                .iter()
                .filter(|slot| slot.visit_number == Some(visit))
                .filter_map(|slot| to_observation(slot))
                .collect()
        };
        vec![
            (VisitGroup::Visit(1), lane(1)),
            (VisitGroup::Visit(2), lane(2)),
        ]
    } else {
        let observations = slots.iter().filter_map(|slot| to_observation(slot)).collect();
        vec![(VisitGroup::Combined, observations)]
    }
}

/// Whether any service in the snapshot serves the stop more than once.
pub fn has_multiple_visits(response: &ArrivalResponse) -> bool {
    response
        .services
        .iter()
        .flat_map(|service| service.slots())
        .any(|slot| slot.visit_number.map_or(false, |n| n > 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OccupancyLoad, VehicleType};

    fn visit(eta_ms: Option<i64>, visit_number: Option<u8>) -> RawVisit {
        RawVisit {
            duration_ms: eta_ms,
            vehicle_type: Some(VehicleType::SingleDeck),
            feature: Some("WAB".to_string()),
            load: Some(OccupancyLoad::SeatsAvailable),
            visit_number,
            origin_code: Some("77009".to_string()),
            destination_code: Some("77131".to_string()),
        }
    }

    fn service(slots: [Option<RawVisit>; 3]) -> RawService {
        let [next, next2, next3] = slots;
        RawService {
            no: "315".to_string(),
            next,
            next2,
            next3,
        }
    }

    #[test]
    fn test_single_visit_produces_combined_lane() {
        let service = service([
            Some(visit(Some(60_000), Some(1))),
            Some(visit(Some(300_000), Some(1))),
            None,
        ]);

        let lanes = normalize_service(&service);
        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0].0, VisitGroup::Combined);
        assert_eq!(lanes[0].1.len(), 2);
        assert_eq!(lanes[0].1[0].eta_ms, 60_000);
        assert_eq!(lanes[0].1[1].eta_ms, 300_000);
    }

    #[test]
    fn test_second_visit_splits_into_two_lanes() {
        let service = service([
            Some(visit(Some(60_000), Some(1))),
            Some(visit(Some(600_000), Some(2))),
            Some(visit(Some(900_000), Some(1))),
        ]);

        let lanes = normalize_service(&service);
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].0, VisitGroup::Visit(1));
        assert_eq!(lanes[1].0, VisitGroup::Visit(2));

        let etas: Vec<i64> = lanes[0].1.iter().map(|o| o.eta_ms).collect();
        assert_eq!(etas, vec![60_000, 900_000]);
        assert_eq!(lanes[1].1.len(), 1);
        assert_eq!(lanes[1].1[0].eta_ms, 600_000);
    }

    #[test]
    fn test_slot_without_eta_is_dropped() {
        let service = service([
            Some(visit(Some(60_000), Some(1))),
            Some(visit(None, Some(1))),
            None,
        ]);

        let lanes = normalize_service(&service);
        assert_eq!(lanes[0].1.len(), 1);
    }

    #[test]
    fn test_etaless_second_visit_slot_still_splits() {
        // The visit-2 slot has no usable ETA yet, but its presence alone
        // decides the lane shape.
        let service = service([
            Some(visit(Some(60_000), Some(1))),
            Some(visit(None, Some(2))),
            None,
        ]);

        let lanes = normalize_service(&service);
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].1.len(), 1);
        assert!(lanes[1].1.is_empty());
    }

    #[test]
    fn test_split_mode_drops_unnumbered_slots() {
        let service = service([
            Some(visit(Some(60_000), None)),
            Some(visit(Some(600_000), Some(2))),
            None,
        ]);

        let lanes = normalize_service(&service);
        assert_eq!(lanes.len(), 2);
        assert!(lanes[0].1.is_empty());
        assert_eq!(lanes[1].1.len(), 1);
    }

    #[test]
    fn test_combined_mode_keeps_unnumbered_slots() {
        let service = service([Some(visit(Some(60_000), None)), None, None]);

        let lanes = normalize_service(&service);
        assert_eq!(lanes[0].0, VisitGroup::Combined);
        assert_eq!(lanes[0].1.len(), 1);
    }

    #[test]
    fn test_empty_service_produces_empty_combined_lane() {
        let lanes = normalize_service(&service([None, None, None]));
        assert_eq!(lanes.len(), 1);
        assert!(lanes[0].1.is_empty());
    }

    #[test]
    fn test_has_multiple_visits() {
        let single = ArrivalResponse {
            services: vec![service([Some(visit(Some(1_000), Some(1))), None, None])],
        };
        assert!(!has_multiple_visits(&single));

        let double = ArrivalResponse {
            services: vec![service([
                Some(visit(Some(1_000), Some(1))),
                Some(visit(Some(2_000), Some(2))),
                None,
            ])],
        };
        assert!(has_multiple_visits(&double));
    }
}
