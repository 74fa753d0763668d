//! Scenario tests for park-and-ride search over the demo grids.

use std::time::Instant;

use chrono::{DateTime, TimeZone, Utc};

use super::*;
use crate::demo::{self, DemoNetwork};
use crate::domain::{Coordinate, RoutingError, TraverseMode, Vehicle};
use crate::engine::RequestContext;
use crate::graph::{Graph, GraphBuilder};
use crate::precompute::{AnnotationTable, PrecomputeConfig, build_annotations};
use crate::state::{Direction, Phase};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, hour, 0, 0).unwrap()
}

struct Fixture {
    net: DemoNetwork,
    annotations: AnnotationTable,
    config: SearchConfig,
}

impl Fixture {
    fn new(net: DemoNetwork) -> Self {
        let config = SearchConfig::default();
        let (annotations, _) = build_annotations(&net.graph, &config, &PrecomputeConfig::default());
        Self {
            net,
            annotations,
            config,
        }
    }

    fn router(&self) -> Router<'_> {
        Router::new(&self.net.graph, &self.annotations, &self.config)
    }

    fn paths(&self, request: &TripRequest) -> Result<Vec<TwoWayPath>, RoutingError> {
        self.router().search(request)?.paths()
    }
}

fn leg_phases(path: &crate::spt::GraphPath) -> Vec<Phase> {
    path.legs().iter().map(|l| l.phase).collect()
}

const OUTBOUND_ORDER: [Phase; 4] = [
    Phase::CarLeg,
    Phase::PnrTransfer,
    Phase::TransitLeg,
    Phase::WalkLeg,
];

const RETURN_ORDER: [Phase; 4] = [
    Phase::WalkLeg,
    Phase::TransitLeg,
    Phase::PnrTransfer,
    Phase::CarLeg,
];

#[test]
fn one_way_grid_sums_its_legs() {
    let fx = Fixture::new(demo::grid());
    let request = TripRequest::one_way(fx.net.a, fx.net.b, at(8));

    let paths = fx.paths(&request).unwrap();
    assert_eq!(paths.len(), 1);
    let path = &paths[0];
    assert_eq!(path.parking, fx.net.car_parks[0]);
    assert!(!path.is_round_trip());

    let legs = path.outbound.legs();
    assert_eq!(leg_phases(&path.outbound), RETURN_ORDER);
    let weights: Vec<f64> = legs.iter().map(|l| l.weight).collect();
    // Stop link, no ride, stop link + 400 m + parking link, then drive
    assert_eq!(weights, vec![20.0, 0.0, 720.0, 30.0]);
    assert_eq!(path.weight(), 770.0);
    assert_eq!(weights.iter().sum::<f64>(), path.weight());

    assert_eq!(path.outbound.start_vertex(), fx.net.a);
    assert_eq!(path.outbound.end_vertex(), fx.net.b);
    assert_eq!(path.outbound.start_time(), at(8).timestamp());
    assert_eq!(legs[3].mode, TraverseMode::Car);
}

#[test]
fn one_way_arrive_by_is_searched_backward() {
    let fx = Fixture::new(demo::grid());
    let request = TripRequest::one_way(fx.net.b, fx.net.a, at(9)).arrive_by(true);

    let tree = fx.router().search(&request).unwrap();
    assert!(tree.tree(Direction::Backward).is_some());
    let paths = tree.paths().unwrap();
    let path = &paths[0].outbound;

    assert_eq!(leg_phases(path), OUTBOUND_ORDER);
    assert_eq!(path.start_vertex(), fx.net.b);
    assert_eq!(path.end_vertex(), fx.net.a);
    assert_eq!(path.end_time(), at(9).timestamp());
    // 30 s driving, 360 s transfer, 10 s to the destination
    assert_eq!(path.duration_secs(), 400);
    assert_eq!(path.weight(), 770.0);
}

#[test]
fn two_way_grid_shares_the_parking() {
    let fx = Fixture::new(demo::grid());
    let request = TripRequest::two_way(fx.net.b, fx.net.a, at(9), Some(at(17)));

    let tree = fx.router().search(&request).unwrap();
    assert!(tree.is_two_way());
    assert!(!tree.timed_out());
    let paths = tree.paths().unwrap();
    assert_eq!(paths.len(), 1);

    let path = &paths[0];
    let inbound = path.inbound.as_ref().unwrap();
    assert_eq!(path.outbound.pnr_node(), Some(fx.net.car_parks[0]));
    assert_eq!(inbound.pnr_node(), Some(fx.net.car_parks[0]));
    assert_eq!(leg_phases(&path.outbound), OUTBOUND_ORDER);
    assert_eq!(leg_phases(inbound), RETURN_ORDER);
    assert_eq!(path.outbound.weight(), 770.0);
    assert_eq!(inbound.weight(), 770.0);
    assert_eq!(path.weight(), 1540.0);

    assert_eq!(inbound.start_vertex(), fx.net.a);
    assert_eq!(inbound.start_time(), at(17).timestamp());
    assert_eq!(inbound.end_vertex(), fx.net.b);
}

#[test]
fn two_way_matches_the_two_one_way_trips() {
    let fx = Fixture::new(demo::grid_with_line());
    let (home, work) = (fx.net.b, fx.net.a);

    let there = fx
        .paths(&TripRequest::one_way(home, work, at(9)).arrive_by(true))
        .unwrap();
    let back = fx.paths(&TripRequest::one_way(work, home, at(17))).unwrap();
    let round = fx
        .paths(&TripRequest::two_way(home, work, at(9), Some(at(17))))
        .unwrap();

    assert_eq!(round[0].parking, there[0].parking);
    assert_eq!(round[0].parking, back[0].parking);
    assert_eq!(round[0].weight(), there[0].weight() + back[0].weight());
}

#[test]
fn two_way_return_defaults_to_offset() {
    let fx = Fixture::new(demo::grid());
    let request = TripRequest::two_way(fx.net.b, fx.net.a, at(9), None);

    let paths = fx.paths(&request).unwrap();
    let inbound = paths[0].inbound.as_ref().unwrap();
    assert_eq!(inbound.start_time(), at(15).timestamp());
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Weight of the morning trip plus the evening trip, each searched alone.
fn separate_trips(fx: &Fixture) -> (TwoWayPath, TwoWayPath) {
    let (home, work) = (fx.net.b, fx.net.a);
    let there = fx
        .paths(&TripRequest::one_way(home, work, at(9)).arrive_by(true))
        .unwrap();
    let back = fx.paths(&TripRequest::one_way(work, home, at(17))).unwrap();
    (there[0].clone(), back[0].clone())
}

#[test]
fn round_trip_through_competing_parks() {
    // Every stop but S0 is 3.6 km from work, beyond walking range
    let fx = Fixture::new(demo::commuter_grid(true, true));
    let [p1, p2] = [fx.net.car_parks[0], fx.net.car_parks[1]];

    let (there, back) = separate_trips(&fx);
    assert_eq!(there.parking, p1);
    assert_eq!(back.parking, p2);
    // Drive 1.2 km, walk 40 s, wait for the 08:50 and ride, walk 10 s
    assert_close(there.weight(), 827.142857);
    // Walk 10 s, wait for the 17:05 and ride, walk 40 s, drive
    assert_close(back.weight(), 647.142857);

    let through = |first, second| {
        let fx = Fixture::new(demo::commuter_grid(first, second));
        let (there, back) = separate_trips(&fx);
        there.weight() + back.weight()
    };
    let via_p1 = through(true, false);
    let via_p2 = through(false, true);
    assert!(via_p1 < via_p2);

    let request = TripRequest::two_way(fx.net.b, fx.net.a, at(9), Some(at(17)));
    let paths = fx.paths(&request).unwrap();
    assert_eq!(paths[0].parking, p1);
    assert_eq!(paths[0].inbound.as_ref().unwrap().pnr_node(), Some(p1));
    assert_close(paths[0].weight(), via_p1.min(via_p2));
    assert_close(paths[0].weight(), 827.142857 + 3347.142857);
}

#[test]
fn one_way_collects_alternative_parks() {
    let fx = Fixture::new(demo::commuter_grid(true, true));
    let [p1, p2] = [fx.net.car_parks[0], fx.net.car_parks[1]];
    let request = TripRequest::one_way(fx.net.b, fx.net.a, at(9)).arrive_by(true);

    let tree = fx.router().search(&request).unwrap();
    assert_eq!(tree.parking_candidates(), vec![p1, p2]);
    // Through P2 the trip is both heavier and longer
    let paths = tree.paths().unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].parking, p1);

    let single = fx.router().search(&request.max_results(1)).unwrap();
    assert_eq!(single.parking_candidates(), vec![p1]);
}

#[test]
fn line_trip_rides_transit() {
    let fx = Fixture::new(demo::grid_with_line());
    let request = TripRequest::one_way(fx.net.a, fx.net.b, at(8));

    let paths = fx.paths(&request).unwrap();
    let legs = paths[0].outbound.legs();
    let transit = &legs[1];

    assert_eq!(transit.phase, Phase::TransitLeg);
    assert_eq!(transit.mode, TraverseMode::Transit);
    assert_eq!(transit.from, fx.net.stops[0]);
    assert_eq!(transit.to, fx.net.stops[1]);
    // Wait for the 08:10 and ride two minutes
    assert_eq!(transit.weight, 710.0);
    assert_eq!(paths[0].weight(), 840.0);
}

#[test]
fn line_round_trip_times() {
    let fx = Fixture::new(demo::grid_with_line());
    let request = TripRequest::two_way(fx.net.b, fx.net.a, at(9), Some(at(17)));

    let paths = fx.paths(&request).unwrap();
    let path = &paths[0];
    let inbound = path.inbound.as_ref().unwrap();

    // The 08:50 from S2 arrives at 08:52
    assert_eq!(path.outbound.weight(), 720.0);
    assert_eq!(path.outbound.end_time(), at(9).timestamp());
    // The 17:10 from S1
    assert_eq!(inbound.weight(), 840.0);
    assert_eq!(path.weight(), 1560.0);
}

#[test]
fn removing_the_parking_finds_nothing() {
    let fx = Fixture::new(demo::grid_without_parking());
    let request = TripRequest::two_way(fx.net.b, fx.net.a, at(9), Some(at(17)));

    let tree = fx.router().search(&request).unwrap();
    assert!(!tree.timed_out());
    assert_eq!(tree.paths().unwrap_err(), RoutingError::PathNotFound);

    let one_way = TripRequest::one_way(fx.net.a, fx.net.b, at(8));
    assert_eq!(fx.paths(&one_way).unwrap_err(), RoutingError::PathNotFound);
}

#[test]
fn disconnected_parking_is_never_a_candidate() {
    let fx = Fixture::new(demo::grid_with_disconnected_park());
    let lonely = *fx.net.car_parks.last().unwrap();
    let request = TripRequest::two_way(fx.net.b, fx.net.a, at(9), Some(at(17)));

    let tree = fx.router().search(&request).unwrap();
    assert!(!tree.parking_candidates().contains(&lonely));
    assert!(tree.all_states().all(|s| s.vertex() != lonely));
    for path in tree.paths().unwrap() {
        assert_ne!(path.parking, lonely);
    }
}

#[test]
fn bicycle_trip_ends_cycling() {
    let fx = Fixture::new(demo::grid_with_bike_park());
    let request = TripRequest::one_way(fx.net.a, fx.net.b, at(8)).vehicle(Vehicle::Bicycle);

    let paths = fx.paths(&request).unwrap();
    let path = &paths[0];
    assert_eq!(path.parking, fx.net.bike_parks[0]);

    let legs = path.outbound.legs();
    let last = legs.last().unwrap();
    assert_eq!(last.phase, Phase::BicycleLeg);
    assert_eq!(last.mode, TraverseMode::Bicycle);
    // 20 walking to the stop, 700 to the bike park, 20 cycling out
    assert_eq!(path.weight(), 740.0);

    let by_car = fx.paths(&TripRequest::one_way(fx.net.a, fx.net.b, at(8))).unwrap();
    assert_eq!(by_car[0].parking, fx.net.car_parks[0]);
}

#[test]
fn elapsed_deadline_reports_timeout() {
    let fx = Fixture::new(demo::grid());
    let request =
        TripRequest::two_way(fx.net.b, fx.net.a, at(9), Some(at(17))).deadline(Instant::now());

    let tree = fx.router().search(&request).unwrap();
    assert!(tree.timed_out());
    assert_eq!(tree.visited(), 0);
    assert_eq!(tree.paths().unwrap_err(), RoutingError::Timeout { visited: 0 });
}

#[test]
fn cancelled_context_is_not_a_timeout() {
    let fx = Fixture::new(demo::grid());
    let request = TripRequest::one_way(fx.net.a, fx.net.b, at(8));
    let ctx = RequestContext::unbounded();
    ctx.cancel();

    let tree = fx.router().search_with_context(&request, &ctx).unwrap();
    assert!(!tree.timed_out());
    assert_eq!(tree.paths().unwrap_err(), RoutingError::PathNotFound);
}

#[test]
fn weight_limit_prunes_everything() {
    let fx = Fixture::new(demo::grid());
    let request = TripRequest::one_way(fx.net.a, fx.net.b, at(8)).max_weight(500.0);
    assert_eq!(fx.paths(&request).unwrap_err(), RoutingError::PathNotFound);

    let generous = TripRequest::one_way(fx.net.a, fx.net.b, at(8)).max_weight(800.0);
    assert_eq!(fx.paths(&generous).unwrap()[0].weight(), 770.0);
}

#[test]
fn worst_time_bounds_the_arrival() {
    let fx = Fixture::new(demo::grid());
    let five_past = at(8) + chrono::Duration::minutes(5);
    let request = TripRequest::one_way(fx.net.a, fx.net.b, at(8)).worst_time(five_past);
    assert_eq!(fx.paths(&request).unwrap_err(), RoutingError::PathNotFound);

    // The trip takes 400 s
    let ten_past = at(8) + chrono::Duration::minutes(10);
    let request = TripRequest::one_way(fx.net.a, fx.net.b, at(8)).worst_time(ten_past);
    assert_eq!(fx.paths(&request).unwrap()[0].outbound.end_time(), at(8).timestamp() + 400);
}

#[test]
fn walk_limit_prunes_the_transfer() {
    let fx = Fixture::new(demo::grid());
    let request = TripRequest::one_way(fx.net.a, fx.net.b, at(8)).max_walk_distance(300.0);
    assert_eq!(fx.paths(&request).unwrap_err(), RoutingError::PathNotFound);
}

#[test]
fn coordinates_snap_to_intersections() {
    let fx = Fixture::new(demo::grid());
    let near_a = fx.net.graph.vertex(fx.net.a).coordinate.offset_m(5.0, 5.0);
    let near_b = fx.net.graph.vertex(fx.net.b).coordinate.offset_m(-5.0, 5.0);
    let request = TripRequest::one_way(near_a, near_b, at(8));

    let paths = fx.paths(&request).unwrap();
    assert_eq!(paths[0].outbound.start_vertex(), fx.net.a);
    assert_eq!(paths[0].outbound.end_vertex(), fx.net.b);
}

#[test]
fn empty_graph_has_nothing_to_snap_to() {
    let graph: Graph = GraphBuilder::new().build();
    let annotations = AnnotationTable::default();
    let config = SearchConfig::default();
    let router = Router::new(&graph, &annotations, &config);
    let here = Coordinate::new(52.0, 4.0);

    let err = router
        .search(&TripRequest::one_way(here, here, at(8)))
        .unwrap_err();
    assert_eq!(err, RoutingError::NoNearbyVertex(here));
}

#[test]
fn invalid_endpoints_are_rejected() {
    let fx = Fixture::new(demo::grid());
    let router = fx.router();

    let same = TripRequest::one_way(fx.net.a, fx.net.a, at(8));
    assert!(matches!(
        router.search(&same),
        Err(RoutingError::InvalidRequest(_))
    ));

    let foreign = TripRequest::one_way(fx.net.a, crate::domain::VertexId(999), at(8));
    assert!(matches!(
        router.search(&foreign),
        Err(RoutingError::InvalidRequest(_))
    ));
}

#[test]
fn concurrent_queries_share_the_annotations() {
    let fx = Fixture::new(demo::grid_with_line());
    let router = fx.router();
    let requests = [
        TripRequest::one_way(fx.net.a, fx.net.b, at(8)),
        TripRequest::one_way(fx.net.b, fx.net.a, at(9)).arrive_by(true),
        TripRequest::two_way(fx.net.b, fx.net.a, at(9), Some(at(17))),
        TripRequest::one_way(fx.net.a, fx.net.b, at(12)),
    ];
    let serial: Vec<f64> = requests
        .iter()
        .map(|r| router.search(r).unwrap().paths().unwrap()[0].weight())
        .collect();

    let parallel: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = requests
            .iter()
            .map(|r| scope.spawn(move || router.search(r).unwrap().paths().unwrap()[0].weight()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(serial, parallel);
}
