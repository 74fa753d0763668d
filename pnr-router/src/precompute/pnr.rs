//! Park-and-ride node annotation.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::domain::{ModeSet, TraverseMode, Vehicle, VertexId};
use crate::engine::Limits;
use crate::graph::{Graph, TraverseOptions, VertexKind};
use crate::planner::SearchConfig;
use crate::state::{Direction, State};

use super::profile::profile;
use super::propagation::propagate;
use super::{AnnotationTable, PrecomputeConfig, progress_step};

/// Annotate every intersection with the `vehicle` parking facilities it
/// should drive (or ride) to.
///
/// Returns the number of facilities skipped for lacking a street link.
pub(super) fn annotate_parking_nodes(
    graph: &Graph,
    vehicle: Vehicle,
    search: &SearchConfig,
    config: &PrecomputeConfig,
    table: &mut AnnotationTable,
) -> usize {
    let (parks, unlinked): (Vec<VertexId>, Vec<VertexId>) = graph
        .vertices_of_kind(VertexKind::parking_for(vehicle))
        .partition(|&p| graph.is_street_linked(p));
    for park in &unlinked {
        debug!(%park, %vehicle, "skipping parking without a street link");
    }
    let all_parks: BTreeSet<VertexId> = parks.iter().copied().collect();
    let parked = |s: State| match vehicle {
        Vehicle::Car => s.with_car_parked(true),
        Vehicle::Bicycle => s.with_bike_parked(true),
    };

    let profile_options = TraverseOptions::new(
        search,
        ModeSet::of(&[TraverseMode::Walk, TraverseMode::Transit]),
    )
    .with_parking_links(true)
    .with_time_upper_bounds(true);
    let walk_limits = Limits {
        max_walk_distance: config.walk_limit(search),
        ..Limits::default()
    };

    // bounds[v][p]: worst-case cost of getting from v to p without the vehicle
    let mut bounds: BTreeMap<VertexId, BTreeMap<VertexId, f64>> = BTreeMap::new();
    for &park in &parks {
        let origin = parked(State::seed(park, 0, Direction::Backward));
        for (v, w) in profile(graph, origin, &profile_options, walk_limits, &all_parks) {
            bounds.entry(v).or_default().insert(park, w);
        }
    }
    let bound = |from: VertexId, to: VertexId| bounds.get(&from)?.get(&to).copied();

    let drive_options = TraverseOptions::new(search, ModeSet::of(&[vehicle.mode()]));
    let step = progress_step(parks.len(), 20);
    for (done, &park) in parks.iter().enumerate() {
        let origin = State::seed(park, 0, Direction::Backward)
            .with_mode(vehicle.mode())
            .with_covered(true);
        let competitors = parks.iter().filter(|&&p| p != park).filter_map(|&other| {
            let round_trip = bound(other, park)? + bound(park, other)?;
            Some(
                State::seed(other, 0, Direction::Backward)
                    .with_mode(vehicle.mode())
                    .with_weight(round_trip * config.heuristic_coefficient),
            )
        });
        let seeds = std::iter::once(origin).chain(competitors);
        for v in propagate(
            graph,
            seeds,
            &drive_options,
            Limits::default(),
            true,
            &[VertexKind::Intersection],
        ) {
            table.add_parking_node(v, vehicle, park);
        }

        if (done + 1) % step == 0 {
            info!(
                %vehicle,
                "parking nodes: {}/{} facilities ({}%)",
                done + 1,
                parks.len(),
                (done + 1) * 100 / parks.len()
            );
        }
    }
    unlinked.len()
}
