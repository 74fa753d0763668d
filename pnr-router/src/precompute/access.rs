//! Access-node annotation.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::domain::{ModeSet, TraverseMode, VertexId};
use crate::engine::Limits;
use crate::graph::{Graph, TraverseOptions, VertexKind};
use crate::planner::SearchConfig;
use crate::state::{Direction, State};

use super::profile::profile;
use super::propagation::propagate;
use super::{AnnotationTable, PrecomputeConfig, progress_step};

const TARGETS: [VertexKind; 3] = [
    VertexKind::Intersection,
    VertexKind::CarPark,
    VertexKind::BikePark,
];

/// Annotate every vertex with the stops it should use to board transit
/// (backward runs) and to alight from it (forward runs).
///
/// Returns the number of stops skipped for lacking a street link.
pub(super) fn annotate_access_nodes(
    graph: &Graph,
    search: &SearchConfig,
    config: &PrecomputeConfig,
    table: &mut AnnotationTable,
) -> usize {
    let (stops, unlinked): (Vec<VertexId>, Vec<VertexId>) = graph
        .vertices_of_kind(VertexKind::TransitStop)
        .partition(|&s| graph.is_street_linked(s));
    for stop in &unlinked {
        debug!(%stop, "skipping stop without a street link");
    }
    let all_stops: BTreeSet<VertexId> = stops.iter().copied().collect();

    let profile_options = TraverseOptions::new(
        search,
        ModeSet::of(&[TraverseMode::Walk, TraverseMode::Transit]),
    )
    .with_parking_links(true)
    .with_time_upper_bounds(true);
    let walk_options = TraverseOptions::new(search, ModeSet::of(&[TraverseMode::Walk]))
        .with_parking_links(true);
    let limits = Limits {
        max_walk_distance: config.walk_limit(search),
        ..Limits::default()
    };

    let step = progress_step(stops.len(), 100);
    for direction in [Direction::Backward, Direction::Forward] {
        for (done, &stop) in stops.iter().enumerate() {
            let origin = State::seed(stop, 0, direction);
            let bounds = profile(graph, origin, &profile_options, limits, &all_stops);

            let seeds = std::iter::once(origin.with_covered(true)).chain(
                bounds
                    .iter()
                    .map(|(&other, &w)| State::seed(other, 0, direction).with_weight(w)),
            );
            for v in propagate(graph, seeds, &walk_options, limits, false, &TARGETS) {
                table.add_access_node(v, direction, stop);
            }

            if (done + 1) % step == 0 {
                info!(
                    ?direction,
                    "access nodes: {}/{} stops ({}%)",
                    done + 1,
                    stops.len(),
                    (done + 1) * 100 / stops.len()
                );
            }
        }
    }
    unlinked.len()
}
