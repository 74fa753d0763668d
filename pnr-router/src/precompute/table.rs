//! The immutable per-vertex annotation table.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Vehicle, VertexId};
use crate::state::Direction;

/// Precomputed reachability sets of one vertex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexAnnotations {
    /// Stops worth walking to from this vertex to board transit.
    pub access_nodes: BTreeSet<VertexId>,
    /// Stops worth alighting at to walk to this vertex.
    pub backward_access_nodes: BTreeSet<VertexId>,
    /// Car parks worth driving to from this vertex.
    pub pnr_nodes: BTreeSet<VertexId>,
    /// Bike parks worth cycling to from this vertex.
    pub bike_pnr_nodes: BTreeSet<VertexId>,
}

impl VertexAnnotations {
    pub fn is_empty(&self) -> bool {
        self.access_nodes.is_empty()
            && self.backward_access_nodes.is_empty()
            && self.pnr_nodes.is_empty()
            && self.bike_pnr_nodes.is_empty()
    }

    /// The parking set for `vehicle`.
    pub fn parking_nodes(&self, vehicle: Vehicle) -> &BTreeSet<VertexId> {
        match vehicle {
            Vehicle::Car => &self.pnr_nodes,
            Vehicle::Bicycle => &self.bike_pnr_nodes,
        }
    }
}

static EMPTY: VertexAnnotations = VertexAnnotations {
    access_nodes: BTreeSet::new(),
    backward_access_nodes: BTreeSet::new(),
    pnr_nodes: BTreeSet::new(),
    bike_pnr_nodes: BTreeSet::new(),
};

/// Access-node and PNR-node sets for every annotated vertex.
///
/// Built once by [`build_annotations`](super::build_annotations) and then
/// only read, so one table can be shared by any number of concurrent
/// queries. Vertices without annotations read as empty sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationTable {
    entries: BTreeMap<VertexId, VertexAnnotations>,
}

impl AnnotationTable {
    pub fn get(&self, v: VertexId) -> &VertexAnnotations {
        self.entries.get(&v).unwrap_or(&EMPTY)
    }

    pub fn access_nodes(&self, v: VertexId) -> &BTreeSet<VertexId> {
        &self.get(v).access_nodes
    }

    pub fn backward_access_nodes(&self, v: VertexId) -> &BTreeSet<VertexId> {
        &self.get(v).backward_access_nodes
    }

    pub fn parking_nodes(&self, v: VertexId, vehicle: Vehicle) -> &BTreeSet<VertexId> {
        self.get(v).parking_nodes(vehicle)
    }

    /// Annotated vertices in id order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &VertexAnnotations)> {
        self.entries.iter().map(|(v, a)| (*v, a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `stop` for `v` from a propagation run in `direction`.
    ///
    /// A backward run from the stop finds vertices that walk to it, so it
    /// fills the forward set; a forward run fills the backward set.
    pub(crate) fn add_access_node(&mut self, v: VertexId, direction: Direction, stop: VertexId) {
        let entry = self.entries.entry(v).or_default();
        match direction {
            Direction::Backward => entry.access_nodes.insert(stop),
            Direction::Forward => entry.backward_access_nodes.insert(stop),
        };
    }

    pub(crate) fn add_parking_node(&mut self, v: VertexId, vehicle: Vehicle, park: VertexId) {
        let entry = self.entries.entry(v).or_default();
        match vehicle {
            Vehicle::Car => entry.pnr_nodes.insert(park),
            Vehicle::Bicycle => entry.bike_pnr_nodes.insert(park),
        };
    }
}
