//! Text rendering of tracked lanes.
//!
//! Each lane becomes one track row: dots for empty road, a marker letter
//! per bus placed by its lane offset. Ghosts are dimmed so a vanished bus
//! visibly fades instead of snapping away.

use buslane::engine::{BusView, LaneView, ServiceLanes};
use buslane::position::LaneOffset;
use buslane::{FetchStatus, OccupancyLoad, VehicleType};

use console::style;

/// Marker letter for a bus, by vehicle type.
pub fn bus_marker(bus: &BusView) -> char {
    match bus.observation.vehicle_type {
        VehicleType::SingleDeck => 'S',
        VehicleType::DoubleDeck => 'D',
        VehicleType::Bendy => 'B',
        VehicleType::Unknown => '?',
    }
}

/// Column for a lane offset on a track of `cols` character cells.
///
/// The track maps the visible lane width; overflow percentages land in the
/// rightmost cells.
pub fn offset_column(offset: &LaneOffset, cols: usize, lane_width_px: f64) -> usize {
    let fraction = match offset {
        LaneOffset::Px(px) => px / lane_width_px,
        LaneOffset::OverflowPct(pct) => pct / 100.0,
    };
    let col = (fraction * cols as f64).floor();
    col.clamp(0.0, cols as f64 - 1.0) as usize
}

/// Short ETA label: `arr` when the bus is due, whole minutes otherwise.
pub fn eta_label(eta_ms: i64) -> String {
    if eta_ms < 60_000 {
        "arr".to_string()
    } else {
        format!("{}m", eta_ms / 60_000)
    }
}

/// Unstyled track row for one lane.
pub fn lane_track(lane: &LaneView, cols: usize, lane_width_px: f64) -> String {
    let mut cells: Vec<char> = vec!['·'; cols];
    for bus in &lane.buses {
        let col = offset_column(&bus.offset, cols, lane_width_px);
        cells[col] = bus_marker(bus);
    }
    cells.into_iter().collect()
}

/// ETA summary for one lane, in lane order.
pub fn lane_summary(lane: &LaneView) -> String {
    lane.buses
        .iter()
        .map(|bus| {
            let mut label = eta_label(bus.observation.eta_ms);
            if !bus.observation.is_wheelchair_accessible() {
                label.push('*');
            }
            if bus.ghost {
                format!("({})", label)
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn styled_label(bus: &BusView) -> String {
    let mut label = eta_label(bus.observation.eta_ms);
    if !bus.observation.is_wheelchair_accessible() {
        label.push('*');
    }
    let styled = match bus.observation.load {
        OccupancyLoad::SeatsAvailable => style(label).green(),
        OccupancyLoad::StandingAvailable => style(label).yellow(),
        OccupancyLoad::LimitedStanding => style(label).red(),
        OccupancyLoad::Unknown => style(label),
    };
    if bus.ghost {
        styled.dim().to_string()
    } else {
        styled.to_string()
    }
}

/// Print one full snapshot to stdout.
pub fn print_snapshot(
    stop_code: &str,
    status: FetchStatus,
    services: &[ServiceLanes],
    multiple_visits: bool,
    cols: usize,
    lane_width_px: f64,
) {
    let now = chrono::Local::now().format("%H:%M:%S");
    println!();
    println!(
        "{} {}  [{}]  {}",
        style("stop").dim(),
        style(stop_code).bold(),
        status,
        style(now).dim()
    );

    if services.is_empty() {
        println!("{}", style("no arrival times available").dim());
        return;
    }

    for service in services {
        for lane in &service.lanes {
            let visit = lane
                .visit_number
                .map(|n| format!("[{}]", n))
                .unwrap_or_default();
            let labels: Vec<String> = lane.buses.iter().map(styled_label).collect();
            println!(
                "{:>5} {:3} |{}| {}",
                style(&service.service).bold(),
                visit,
                lane_track(lane, cols, lane_width_px),
                labels.join("  ")
            );
        }
    }
    println!(
        "{}",
        style("S/D/B: single/double/bendy deck · (…): departing · *: not wheelchair accessible")
            .dim()
    );
    if multiple_visits {
        println!(
            "{}",
            style("[1]/[2]: the route serves this stop twice per loop").dim()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buslane::{BusId, Observation};

    fn bus(eta_ms: i64, offset: LaneOffset, ghost: bool) -> BusView {
        BusView {
            id: BusId(1),
            ghost,
            observation: Observation {
                visit_number: Some(1),
                eta_ms,
                vehicle_type: VehicleType::DoubleDeck,
                feature: "WAB".to_string(),
                load: OccupancyLoad::SeatsAvailable,
                origin_code: "77009".to_string(),
                destination_code: "77131".to_string(),
            },
            offset,
            transition_secs: 1.0,
        }
    }

    #[test]
    fn test_eta_label() {
        assert_eq!(eta_label(-5_000), "arr");
        assert_eq!(eta_label(59_999), "arr");
        assert_eq!(eta_label(60_000), "1m");
        assert_eq!(eta_label(754_000), "12m");
    }

    #[test]
    fn test_offset_column_maps_lane_width() {
        let half = LaneOffset::Px(180.0);
        assert_eq!(offset_column(&half, 40, 360.0), 20);

        let start = LaneOffset::Px(0.0);
        assert_eq!(offset_column(&start, 40, 360.0), 0);
    }

    #[test]
    fn test_offset_column_clamps_negatives() {
        let past_due = LaneOffset::Px(-5.0);
        assert_eq!(offset_column(&past_due, 40, 360.0), 0);
    }

    #[test]
    fn test_offset_column_overflow_lands_right() {
        let overflow = LaneOffset::OverflowPct(90.0);
        assert_eq!(offset_column(&overflow, 40, 360.0), 36);

        let far_overflow = LaneOffset::OverflowPct(110.0);
        assert_eq!(offset_column(&far_overflow, 40, 360.0), 39);
    }

    #[test]
    fn test_lane_track_places_markers() {
        let lane = LaneView {
            visit_number: None,
            buses: vec![
                bus(0, LaneOffset::Px(0.0), false),
                bus(1_080_000, LaneOffset::Px(180.0), false),
            ],
        };

        let track = lane_track(&lane, 40, 360.0);
        assert_eq!(track.chars().count(), 40);
        assert_eq!(track.chars().next(), Some('D'));
        assert_eq!(track.chars().nth(20), Some('D'));
    }

    #[test]
    fn test_lane_summary_marks_ghosts() {
        let lane = LaneView {
            visit_number: None,
            buses: vec![
                bus(120_000, LaneOffset::Px(20.0), false),
                bus(300_000, LaneOffset::Px(50.0), true),
            ],
        };

        assert_eq!(lane_summary(&lane), "2m  (5m)");
    }

    #[test]
    fn test_lane_summary_marks_inaccessible() {
        let mut inaccessible = bus(120_000, LaneOffset::Px(20.0), false);
        inaccessible.observation.feature = String::new();
        let lane = LaneView {
            visit_number: None,
            buses: vec![inaccessible],
        };

        assert_eq!(lane_summary(&lane), "2m*");
    }
}
