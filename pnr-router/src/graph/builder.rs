//! Incremental construction of a [`Graph`].

use crate::domain::{Coordinate, EdgeId, VertexId};

use super::{Edge, EdgeKind, Graph, HopPattern, StreetPermissions, Vertex, VertexKind};

/// Builder for constructing a [`Graph`].
///
/// Network import lives outside this crate; the builder is the seam it feeds.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue building on an existing graph.
    pub fn from_graph(graph: Graph) -> Self {
        Self { graph }
    }

    /// Add a vertex and return its id.
    pub fn add_vertex(
        &mut self,
        label: impl Into<String>,
        kind: VertexKind,
        coordinate: Coordinate,
    ) -> VertexId {
        let id = VertexId(self.graph.vertices.len() as u32);
        self.graph.vertices.push(Vertex {
            id,
            label: label.into(),
            kind,
            coordinate,
        });
        self.graph.outgoing.push(Vec::new());
        self.graph.incoming.push(Vec::new());
        id
    }

    pub fn intersection(&mut self, label: impl Into<String>, at: Coordinate) -> VertexId {
        self.add_vertex(label, VertexKind::Intersection, at)
    }

    pub fn transit_stop(&mut self, label: impl Into<String>, at: Coordinate) -> VertexId {
        self.add_vertex(label, VertexKind::TransitStop, at)
    }

    pub fn car_park(&mut self, label: impl Into<String>, at: Coordinate) -> VertexId {
        self.add_vertex(label, VertexKind::CarPark, at)
    }

    pub fn bike_park(&mut self, label: impl Into<String>, at: Coordinate) -> VertexId {
        self.add_vertex(label, VertexKind::BikePark, at)
    }

    /// Add a single directed edge.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, kind: EdgeKind) -> EdgeId {
        let id = EdgeId(self.graph.edges.len() as u32);
        self.graph.edges.push(Edge { id, from, to, kind });
        self.graph.outgoing[from.index()].push(id);
        self.graph.incoming[to.index()].push(id);
        id
    }

    /// Add a two-way street between `a` and `b`.
    pub fn street(
        &mut self,
        a: VertexId,
        b: VertexId,
        length_m: f64,
        permissions: StreetPermissions,
    ) -> &mut Self {
        let kind = EdgeKind::Street {
            length_m,
            permissions,
        };
        self.add_edge(a, b, kind.clone());
        self.add_edge(b, a, kind);
        self
    }

    /// Link a transit stop to a street vertex in both directions.
    pub fn link_stop(&mut self, stop: VertexId, street: VertexId, secs: u32) -> &mut Self {
        let kind = EdgeKind::StreetTransitLink { secs };
        self.add_edge(stop, street, kind.clone());
        self.add_edge(street, stop, kind);
        self
    }

    /// Link a parking facility to a street vertex in both directions.
    ///
    /// # Panics
    ///
    /// Panics if `park` is not a car or bike parking vertex.
    pub fn link_parking(&mut self, park: VertexId, street: VertexId, secs: u32) -> &mut Self {
        let kind = self.graph.vertices[park.index()].kind;
        let Some(vehicle) = kind.parking_vehicle() else {
            panic!("{park} is a {kind:?}, not a parking facility");
        };
        let kind = EdgeKind::ParkLink { vehicle, secs };
        self.add_edge(park, street, kind.clone());
        self.add_edge(street, park, kind);
        self
    }

    /// Add a scheduled hop from stop `from` to stop `to`.
    pub fn transit_hop(
        &mut self,
        from: VertexId,
        to: VertexId,
        patterns: Vec<HopPattern>,
    ) -> EdgeId {
        self.add_edge(from, to, EdgeKind::TransitHop { patterns })
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}
