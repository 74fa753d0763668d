//! Small synthetic networks for the demo binary and for tests.
//!
//! Every network is a 3x3 street grid. `A` is the south-west corner and
//! `B` the north-east one, four blocks apart along the streets.

use crate::domain::{Coordinate, VertexId, departures_every};
use crate::graph::{Graph, GraphBuilder, HopPattern, StreetPermissions};

const SHORT_BLOCK_M: f64 = 100.0;
const LONG_BLOCK_M: f64 = 1000.0;
const COMMUTER_BLOCK_M: f64 = 1200.0;

/// A demo network and the vertices tests care about.
#[derive(Debug, Clone)]
pub struct DemoNetwork {
    pub graph: Graph,
    /// South-west corner, next to the first transit stop.
    pub a: VertexId,
    /// North-east corner, next to the parking.
    pub b: VertexId,
    pub stops: Vec<VertexId>,
    pub car_parks: Vec<VertexId>,
    pub bike_parks: Vec<VertexId>,
}

fn origin() -> Coordinate {
    Coordinate::new(52.0, 4.0)
}

struct Grid {
    builder: GraphBuilder,
    cells: [[VertexId; 3]; 3],
    block_m: f64,
}

impl Grid {
    fn new(block_m: f64) -> Self {
        let mut builder = GraphBuilder::new();
        let mut cells = [[VertexId(0); 3]; 3];
        for (row, line) in cells.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                let at = origin().offset_m(row as f64 * block_m, col as f64 * block_m);
                *cell = builder.intersection(format!("I{row}{col}"), at);
            }
        }
        for row in 0..3 {
            for col in 0..3 {
                if col + 1 < 3 {
                    builder.street(cells[row][col], cells[row][col + 1], block_m, StreetPermissions::ALL);
                }
                if row + 1 < 3 {
                    builder.street(cells[row][col], cells[row + 1][col], block_m, StreetPermissions::ALL);
                }
            }
        }
        Self {
            builder,
            cells,
            block_m,
        }
    }

    /// A point `north` and `east` metres from grid corner (`row`, `col`).
    fn near(&self, row: usize, col: usize, north: f64, east: f64) -> Coordinate {
        origin().offset_m(
            row as f64 * self.block_m + north,
            col as f64 * self.block_m + east,
        )
    }

    fn a(&self) -> VertexId {
        self.cells[0][0]
    }

    fn b(&self) -> VertexId {
        self.cells[2][2]
    }

    fn finish(self, stops: Vec<VertexId>, car_parks: Vec<VertexId>, bike_parks: Vec<VertexId>) -> DemoNetwork {
        let (a, b) = (self.a(), self.b());
        DemoNetwork {
            graph: self.builder.build(),
            a,
            b,
            stops,
            car_parks,
            bike_parks,
        }
    }
}

/// Stop `S` off `A` (10 s link) and car park `P` off `B` (30 s link).
///
/// There is no transit service, so the cheapest park-and-ride trip walks
/// from `S` to `P` and drives the last link.
pub fn grid() -> DemoNetwork {
    let mut grid = Grid::new(SHORT_BLOCK_M);
    let (a, b) = (grid.a(), grid.b());
    let stop = grid.builder.transit_stop("S", grid.near(0, 0, -10.0, 0.0));
    let park = grid.builder.car_park("P", grid.near(2, 2, 20.0, 0.0));
    grid.builder.link_stop(stop, a, 10).link_parking(park, b, 30);
    grid.finish(vec![stop], vec![park], Vec::new())
}

/// [`grid`] plus a bike park `Q` off `B` (20 s link).
pub fn grid_with_bike_park() -> DemoNetwork {
    let mut grid = Grid::new(SHORT_BLOCK_M);
    let (a, b) = (grid.a(), grid.b());
    let stop = grid.builder.transit_stop("S", grid.near(0, 0, -10.0, 0.0));
    let park = grid.builder.car_park("P", grid.near(2, 2, 20.0, 0.0));
    let bikes = grid.builder.bike_park("Q", grid.near(2, 2, 0.0, 20.0));
    grid.builder
        .link_stop(stop, a, 10)
        .link_parking(park, b, 30)
        .link_parking(bikes, b, 20);
    grid.finish(vec![stop], vec![park], vec![bikes])
}

/// A line from `S1` off `A` to `S2` off `B` over a grid of 1 km blocks,
/// with car park `P` off `B`.
///
/// The stops are too far apart to walk between, so every trip rides the
/// line. Trains leave either stop every 10 minutes from 06:00 to 22:00 and
/// take two minutes.
pub fn grid_with_line() -> DemoNetwork {
    let mut grid = Grid::new(LONG_BLOCK_M);
    let (a, b) = (grid.a(), grid.b());
    let s1 = grid.builder.transit_stop("S1", grid.near(0, 0, -10.0, 0.0));
    let s2 = grid.builder.transit_stop("S2", grid.near(2, 2, 0.0, -10.0));
    let park = grid.builder.car_park("P", grid.near(2, 2, 20.0, 0.0));
    grid.builder
        .link_stop(s1, a, 10)
        .link_stop(s2, b, 10)
        .link_parking(park, b, 30);
    // The timetable is a constant and always parses
    let departures = departures_every("06:00", "22:00", 10).unwrap_or_default();
    grid.builder.transit_hop(s1, s2, vec![HopPattern::new("L1", departures.clone(), 120)]);
    grid.builder.transit_hop(s2, s1, vec![HopPattern::new("L1", departures, 120)]);
    grid.finish(vec![s1, s2], vec![park], Vec::new())
}

fn clock(hours: u32, minutes: u32) -> u32 {
    hours * 3600 + minutes * 60
}

/// A commute from home at `B` to work at `A` over 1.2 km blocks.
///
/// Stop `S0` is off `A`. Car park `P1` and stop `S1` are off `I21`, car
/// park `P2` and stop `S2` off `I12`. No two stops are within walking
/// distance of each other. Line `R1` runs between `S1` and `S0` at 08:50
/// and 17:50, line `R2` between `S2` and `S0` at 07:55 and 17:05, both
/// taking two minutes in either direction. So `P1` suits the morning and
/// `P2` the evening.
///
/// `first_park` and `second_park` choose which car parks exist. The stops
/// and lines are always there, listed as `[S0, S1, S2]`.
pub fn commuter_grid(first_park: bool, second_park: bool) -> DemoNetwork {
    let mut grid = Grid::new(COMMUTER_BLOCK_M);
    let a = grid.a();
    let (i21, i12) = (grid.cells[2][1], grid.cells[1][2]);
    let s0 = grid.builder.transit_stop("S0", grid.near(0, 0, -10.0, 0.0));
    let s1 = grid.builder.transit_stop("S1", grid.near(2, 1, 0.0, -10.0));
    let s2 = grid.builder.transit_stop("S2", grid.near(1, 2, -10.0, 0.0));
    grid.builder
        .link_stop(s0, a, 10)
        .link_stop(s1, i21, 10)
        .link_stop(s2, i12, 10);

    let lines = [
        ("R1", s1, [clock(8, 50), clock(17, 50)]),
        ("R2", s2, [clock(7, 55), clock(17, 5)]),
    ];
    for (route, stop, departures) in lines {
        grid.builder
            .transit_hop(stop, s0, vec![HopPattern::new(route, departures.to_vec(), 120)]);
        grid.builder
            .transit_hop(s0, stop, vec![HopPattern::new(route, departures.to_vec(), 120)]);
    }

    let mut car_parks = Vec::new();
    if first_park {
        let park = grid.builder.car_park("P1", grid.near(2, 1, 20.0, 0.0));
        grid.builder.link_parking(park, i21, 30);
        car_parks.push(park);
    }
    if second_park {
        let park = grid.builder.car_park("P2", grid.near(1, 2, 0.0, 20.0));
        grid.builder.link_parking(park, i12, 30);
        car_parks.push(park);
    }
    grid.finish(vec![s0, s1, s2], car_parks, Vec::new())
}

/// [`grid`] plus a car park `Z` with no street link.
pub fn grid_with_disconnected_park() -> DemoNetwork {
    let mut network = grid();
    let mut builder = GraphBuilder::from_graph(network.graph);
    let lonely = builder.car_park("Z", origin().offset_m(150.0, 150.0));
    network.graph = builder.build();
    network.car_parks.push(lonely);
    network
}

/// [`grid`] without its car park.
pub fn grid_without_parking() -> DemoNetwork {
    let mut grid = Grid::new(SHORT_BLOCK_M);
    let a = grid.a();
    let stop = grid.builder.transit_stop("S", grid.near(0, 0, -10.0, 0.0));
    grid.builder.link_stop(stop, a, 10);
    grid.finish(vec![stop], Vec::new(), Vec::new())
}
