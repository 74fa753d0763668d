//! Propagation stage: which vertices a candidate covers.

use crate::domain::VertexId;
use crate::engine::{Limits, MultiTargetTermination, RequestContext, Search, SearchHooks};
use crate::graph::{Edge, Graph, TraverseOptions, VertexKind};
use crate::spt::CoveredFirst;
use crate::state::State;

struct PropagationHooks<'g> {
    graph: &'g Graph,
    expand_parking: bool,
    targets: MultiTargetTermination,
}

impl SearchHooks for PropagationHooks<'_> {
    fn skip_edge(&mut self, state: &State, _edge: &Edge) -> bool {
        !self.expand_parking && self.graph.vertex(state.vertex()).kind.is_parking()
    }

    fn should_terminate(&mut self, settled: &State) -> bool {
        self.targets.should_terminate(settled)
    }
}

/// Run a multi-source search and return the target vertices the covered
/// seed reached first, in id order.
///
/// Exactly one seed should be covered; the others are competitors entered
/// at their profile bounds. When `expand_parking` is false, parking
/// vertices are reached but never expanded.
pub(super) fn propagate(
    graph: &Graph,
    seeds: impl IntoIterator<Item = State>,
    options: &TraverseOptions,
    limits: Limits,
    expand_parking: bool,
    target_kinds: &[VertexKind],
) -> Vec<VertexId> {
    let is_target = |v: VertexId| target_kinds.contains(&graph.vertex(v).kind);
    let mut hooks = PropagationHooks {
        graph,
        expand_parking,
        targets: MultiTargetTermination::new(
            graph.vertices().map(|v| v.id).filter(|&v| is_target(v)),
        ),
    };

    let mut seeds = seeds.into_iter().peekable();
    let Some(direction) = seeds.peek().map(State::direction) else {
        return Vec::new();
    };
    let mut search = Search::new(CoveredFirst, direction, options.clone(), limits);
    for seed in seeds {
        search.seed(seed, &hooks);
    }
    search.run(graph, &mut hooks, &RequestContext::unbounded());

    let mut covered: Vec<VertexId> = search
        .spt()
        .states()
        .filter(|(_, s)| s.is_covered() && is_target(s.vertex()))
        .map(|(_, s)| s.vertex())
        .collect();
    covered.sort_unstable();
    covered.dedup();
    covered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, ModeSet, TraverseMode};
    use crate::graph::{GraphBuilder, StreetPermissions};
    use crate::planner::SearchConfig;
    use crate::state::Direction;

    fn at(east_m: f64) -> Coordinate {
        Coordinate::new(52.0, 4.0).offset_m(0.0, east_m)
    }

    fn walking() -> TraverseOptions {
        TraverseOptions::new(&SearchConfig::default(), ModeSet::of(&[TraverseMode::Walk]))
            .with_parking_links(true)
    }

    /// Five intersections in a row, stops at both ends, a car park off the
    /// middle intersection with a second intersection behind it.
    fn corridor() -> (crate::graph::Graph, Vec<VertexId>, [VertexId; 4]) {
        let mut b = GraphBuilder::new();
        let ids: Vec<VertexId> = (0..5)
            .map(|i| b.intersection(format!("I{i}"), at(i as f64 * 100.0)))
            .collect();
        for w in ids.windows(2) {
            b.street(w[0], w[1], 100.0, StreetPermissions::ALL);
        }
        let west = b.transit_stop("W", at(0.0));
        let east = b.transit_stop("E", at(400.0));
        let park = b.car_park("P", at(200.0));
        let behind = b.intersection("B", at(250.0));
        b.link_stop(west, ids[0], 0)
            .link_stop(east, ids[4], 0)
            .link_parking(park, ids[2], 0)
            .link_parking(park, behind, 0);
        (b.build(), ids, [west, east, park, behind])
    }

    const TARGETS: [VertexKind; 3] = [
        VertexKind::Intersection,
        VertexKind::CarPark,
        VertexKind::BikePark,
    ];

    #[test]
    fn covered_region_stops_at_the_competitor() {
        let (g, ids, [west, east, park, _]) = corridor();
        let seeds = [
            State::seed(west, 0, Direction::Backward).with_covered(true),
            State::seed(east, 0, Direction::Backward),
        ];
        let covered = propagate(&g, seeds, &walking(), Limits::default(), false, &TARGETS);

        // Equal distance to both stops at I2 goes to the covered seed
        assert_eq!(covered, vec![ids[0], ids[1], ids[2], park]);
        assert!(!covered.contains(&ids[3]));
    }

    #[test]
    fn competitor_bound_shifts_the_boundary() {
        let (g, ids, [west, east, ..]) = corridor();
        let seeds = [
            State::seed(west, 0, Direction::Backward).with_covered(true),
            State::seed(east, 0, Direction::Backward).with_weight(500.0),
        ];
        let covered = propagate(&g, seeds, &walking(), Limits::default(), false, &TARGETS);
        // I3 is 480 from W and 160 + 500 from E
        assert!(covered.contains(&ids[3]));
        assert!(!covered.contains(&ids[4]));
    }

    #[test]
    fn parking_is_reached_but_not_crossed() {
        let (g, _, [west, _, park, behind]) = corridor();
        let seeds = [State::seed(west, 0, Direction::Backward).with_covered(true)];

        let covered = propagate(&g, seeds, &walking(), Limits::default(), false, &TARGETS);
        assert!(covered.contains(&park));
        assert!(!covered.contains(&behind));

        let covered = propagate(&g, seeds, &walking(), Limits::default(), true, &TARGETS);
        assert!(covered.contains(&behind));
    }

    #[test]
    fn no_seeds_covers_nothing() {
        let (g, ..) = corridor();
        let covered = propagate(&g, std::iter::empty(), &walking(), Limits::default(), false, &TARGETS);
        assert!(covered.is_empty());
    }
}
