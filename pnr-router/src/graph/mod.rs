//! The street and transit network.
//!
//! The graph is built once (see [`GraphBuilder`]) and is read-only
//! afterwards, so it can be shared by reference between concurrent queries.
//! Vertex and edge ids index straight into the graph's vectors; an id from a
//! different graph is a programming error and panics on lookup.

mod builder;
mod traverse;

pub use builder::GraphBuilder;
pub use traverse::TraverseOptions;

use crate::domain::{Coordinate, EdgeId, SECONDS_PER_DAY, TraverseMode, Vehicle, VertexId};
use crate::state::Direction;

/// What a vertex represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    Intersection,
    TransitStop,
    CarPark,
    BikePark,
}

impl VertexKind {
    /// The vehicle that can be left at this vertex, if it is a parking facility.
    pub fn parking_vehicle(self) -> Option<Vehicle> {
        match self {
            VertexKind::CarPark => Some(Vehicle::Car),
            VertexKind::BikePark => Some(Vehicle::Bicycle),
            _ => None,
        }
    }

    /// The parking kind used by `vehicle`.
    pub fn parking_for(vehicle: Vehicle) -> VertexKind {
        match vehicle {
            Vehicle::Car => VertexKind::CarPark,
            Vehicle::Bicycle => VertexKind::BikePark,
        }
    }

    pub fn is_parking(self) -> bool {
        self.parking_vehicle().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub label: String,
    pub kind: VertexKind,
    pub coordinate: Coordinate,
}

/// Which modes may use a street segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreetPermissions {
    pub walk: bool,
    pub bicycle: bool,
    pub car: bool,
}

impl StreetPermissions {
    pub const ALL: StreetPermissions = StreetPermissions {
        walk: true,
        bicycle: true,
        car: true,
    };

    pub const PEDESTRIAN: StreetPermissions = StreetPermissions {
        walk: true,
        bicycle: false,
        car: false,
    };

    pub const CAR_ONLY: StreetPermissions = StreetPermissions {
        walk: false,
        bicycle: false,
        car: true,
    };

    pub fn allows(&self, mode: TraverseMode) -> bool {
        match mode {
            TraverseMode::Walk => self.walk,
            TraverseMode::Bicycle => self.bicycle,
            TraverseMode::Car => self.car,
            TraverseMode::Transit => false,
        }
    }
}

/// One scheduled service pattern running over a transit hop.
#[derive(Debug, Clone, PartialEq)]
pub struct HopPattern {
    /// Route name, for reporting.
    pub route: String,
    /// Daily departure times in seconds after midnight, sorted ascending
    /// and below one day.
    pub departures: Vec<u32>,
    /// In-vehicle time from the hop's first stop to its second.
    pub ride_secs: u32,
}

impl HopPattern {
    /// Departures past midnight (e.g. 25:30) are folded back into the day.
    pub fn new(route: impl Into<String>, mut departures: Vec<u32>, ride_secs: u32) -> Self {
        for d in &mut departures {
            *d %= SECONDS_PER_DAY as u32;
        }
        departures.sort_unstable();
        departures.dedup();
        Self {
            route: route.into(),
            departures,
            ride_secs,
        }
    }

    /// Worst-case wait plus ride over the whole service day.
    ///
    /// The wait is bounded by the largest gap between consecutive departures,
    /// including the overnight gap from the last departure to the first.
    pub fn worst_case_secs(&self) -> Option<u32> {
        let first = *self.departures.first()?;
        let last = *self.departures.last()?;
        let day = SECONDS_PER_DAY as u32;
        let overnight = (first % day + day).saturating_sub(last % day);
        let max_gap = self
            .departures
            .windows(2)
            .map(|w| w[1].saturating_sub(w[0]))
            .fold(overnight, u32::max);
        Some(max_gap.saturating_add(self.ride_secs))
    }

    /// First departure at or after `sod` (seconds of the current service
    /// day), wrapping to the next day. The result is relative to the current
    /// day's midnight and so may exceed one day.
    pub fn next_departure(&self, sod: i64) -> Option<i64> {
        let first = *self.departures.first()?;
        let idx = self.departures.partition_point(|&d| i64::from(d) < sod);
        Some(match self.departures.get(idx) {
            Some(&d) => i64::from(d),
            None => i64::from(first) + SECONDS_PER_DAY,
        })
    }

    /// Latest departure that arrives by `sod`, possibly on the previous
    /// service day (in which case the result is negative).
    pub fn latest_departure_arriving_by(&self, sod: i64) -> Option<i64> {
        let last = *self.departures.last()?;
        let ride = i64::from(self.ride_secs);
        let idx = self
            .departures
            .partition_point(|&d| i64::from(d) + ride <= sod);
        Some(match idx {
            0 => i64::from(last) - SECONDS_PER_DAY,
            i => i64::from(self.departures[i - 1]),
        })
    }
}

/// Type-specific behaviour of an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    /// A street segment usable by the permitted modes.
    Street {
        length_m: f64,
        permissions: StreetPermissions,
    },
    /// Connects a transit stop to the street network. Walk only.
    StreetTransitLink { secs: u32 },
    /// Connects a parking facility to the street network. The facility's
    /// vehicle may use it, and pedestrians may when parking links are
    /// enabled for the search.
    ParkLink { vehicle: Vehicle, secs: u32 },
    /// A scheduled ride between two consecutive stops.
    TransitHop { patterns: Vec<HopPattern> },
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
    pub kind: EdgeKind,
}

impl Edge {
    /// Worst-case traversal time in seconds over the service day.
    ///
    /// Nonzero only for scheduled edges; everything else is time-independent
    /// and reports zero.
    pub fn time_upper_bound(&self) -> u32 {
        match &self.kind {
            EdgeKind::TransitHop { patterns } => patterns
                .iter()
                .filter_map(HopPattern::worst_case_secs)
                .min()
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// The vertex a search moving in `direction` reaches over this edge.
    pub fn head(&self, direction: Direction) -> VertexId {
        match direction {
            Direction::Forward => self.to,
            Direction::Backward => self.from,
        }
    }
}

/// An immutable street and transit network.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
}

impl Graph {
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn outgoing(&self, v: VertexId) -> &[EdgeId] {
        &self.outgoing[v.index()]
    }

    pub fn incoming(&self, v: VertexId) -> &[EdgeId] {
        &self.incoming[v.index()]
    }

    /// Edges a search moving in `direction` relaxes from `v`.
    pub fn edges_from(&self, v: VertexId, direction: Direction) -> &[EdgeId] {
        match direction {
            Direction::Forward => self.outgoing(v),
            Direction::Backward => self.incoming(v),
        }
    }

    /// Ids of every vertex of the given kind, in id order.
    pub fn vertices_of_kind(&self, kind: VertexKind) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .filter(move |v| v.kind == kind)
            .map(|v| v.id)
    }

    /// Whether a stop or parking facility has a link into the street network.
    ///
    /// Intersections are trivially linked.
    pub fn is_street_linked(&self, v: VertexId) -> bool {
        match self.vertex(v).kind {
            VertexKind::Intersection => true,
            VertexKind::TransitStop => self.outgoing(v).iter().any(|&e| {
                matches!(self.edge(e).kind, EdgeKind::StreetTransitLink { .. })
            }),
            VertexKind::CarPark | VertexKind::BikePark => self
                .outgoing(v)
                .iter()
                .any(|&e| matches!(self.edge(e).kind, EdgeKind::ParkLink { .. })),
        }
    }

    /// The intersection closest to `coordinate`.
    pub fn nearest_intersection(&self, coordinate: &Coordinate) -> Option<VertexId> {
        self.vertices
            .iter()
            .filter(|v| v.kind == VertexKind::Intersection)
            .map(|v| (v.coordinate.distance_m(coordinate), v.id))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }

    /// Look a vertex up by its label.
    pub fn find(&self, label: &str) -> Option<VertexId> {
        self.vertices.iter().find(|v| v.label == label).map(|v| v.id)
    }
}
