//! Combining per-direction trees into itineraries.

use std::collections::BTreeMap;

use crate::domain::{RoutingError, VertexId};
use crate::spt::{GraphPath, ShortestPathTree};
use crate::state::{Direction, State, StateId};

use super::rank;

/// A park-and-ride itinerary: the trip to the destination and, for two-way
/// requests, the trip back, both through the same parking facility.
#[derive(Debug, Clone)]
pub struct TwoWayPath {
    pub parking: VertexId,
    pub outbound: GraphPath,
    pub inbound: Option<GraphPath>,
}

impl TwoWayPath {
    pub fn weight(&self) -> f64 {
        self.outbound.weight() + self.inbound.as_ref().map_or(0.0, GraphPath::weight)
    }

    /// Time spent travelling, summed over both trips.
    pub fn duration_secs(&self) -> i64 {
        self.outbound.duration_secs() + self.inbound.as_ref().map_or(0, GraphPath::duration_secs)
    }

    pub fn is_round_trip(&self) -> bool {
        self.inbound.is_some()
    }
}

/// The trees a park-and-ride search produced, read as one result.
///
/// One-way searches fill only the outbound tree. Two-way searches fill
/// both: the outbound tree grows backward from the destination and the
/// inbound tree forward from it, so a state's direction says which tree it
/// belongs to.
#[derive(Debug, Clone)]
pub struct PnrSearchTree {
    outbound: ShortestPathTree,
    inbound: Option<ShortestPathTree>,
    /// First terminal state settled per parking facility.
    outbound_terminals: BTreeMap<VertexId, StateId>,
    inbound_terminals: BTreeMap<VertexId, StateId>,
    timed_out: bool,
    visited: usize,
    max_results: usize,
}

impl PnrSearchTree {
    pub(crate) fn one_way(tree: ShortestPathTree, max_results: usize) -> Self {
        Self {
            outbound: tree,
            inbound: None,
            outbound_terminals: BTreeMap::new(),
            inbound_terminals: BTreeMap::new(),
            timed_out: false,
            visited: 0,
            max_results,
        }
    }

    pub(crate) fn two_way(
        outbound: ShortestPathTree,
        inbound: ShortestPathTree,
        max_results: usize,
    ) -> Self {
        Self {
            inbound: Some(inbound),
            ..Self::one_way(outbound, max_results)
        }
    }

    pub(crate) fn set_terminals(
        &mut self,
        outbound: BTreeMap<VertexId, StateId>,
        inbound: BTreeMap<VertexId, StateId>,
    ) {
        self.outbound_terminals = outbound;
        self.inbound_terminals = inbound;
    }

    pub(crate) fn set_outcome(&mut self, timed_out: bool, visited: usize) {
        self.timed_out = timed_out;
        self.visited = visited;
    }

    /// Whether the search stopped on its deadline.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// States settled across both directions.
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn is_two_way(&self) -> bool {
        self.inbound.is_some()
    }

    /// The tree holding states of `direction`.
    pub fn tree(&self, direction: Direction) -> Option<&ShortestPathTree> {
        if self.outbound.direction() == direction {
            Some(&self.outbound)
        } else {
            self.inbound.as_ref().filter(|t| t.direction() == direction)
        }
    }

    fn tree_mut(&mut self, direction: Direction) -> Option<&mut ShortestPathTree> {
        if self.outbound.direction() == direction {
            Some(&mut self.outbound)
        } else {
            self.inbound.as_mut().filter(|t| t.direction() == direction)
        }
    }

    /// Offer `state` to the tree of its direction. Returns `None` if it was
    /// rejected or no tree runs in that direction.
    pub fn add(&mut self, state: State) -> Option<StateId> {
        self.tree_mut(state.direction())?.add(state)
    }

    /// Whether `id` is still current in the tree of `direction`.
    pub fn visit(&self, direction: Direction, id: StateId) -> bool {
        self.tree(direction).is_some_and(|t| t.visit(id))
    }

    /// Every current state of both trees.
    pub fn all_states(&self) -> impl Iterator<Item = &State> {
        self.outbound
            .states()
            .chain(self.inbound.iter().flat_map(|t| t.states()))
            .map(|(_, s)| s)
    }

    /// Parking facilities with a terminal state in every tree.
    pub fn parking_candidates(&self) -> Vec<VertexId> {
        self.outbound_terminals
            .keys()
            .copied()
            .filter(|p| !self.is_two_way() || self.inbound_terminals.contains_key(p))
            .collect()
    }

    /// The lightest path to `vertex` in the tree of `direction`.
    pub fn path(&self, direction: Direction, vertex: VertexId) -> Option<GraphPath> {
        let tree = self.tree(direction)?;
        let (id, _) = tree
            .states_at(vertex)
            .min_by(|a, b| a.1.weight().total_cmp(&b.1.weight()))?;
        Some(tree.path(id))
    }

    /// Itineraries pairing terminal states through shared parking, pruned
    /// and ranked best-first.
    pub fn paths(&self) -> Result<Vec<TwoWayPath>, RoutingError> {
        let paths: Vec<TwoWayPath> = self
            .outbound_terminals
            .iter()
            .filter_map(|(&parking, &out)| {
                let inbound = match &self.inbound {
                    None => None,
                    Some(tree) => Some(tree.path(*self.inbound_terminals.get(&parking)?)),
                };
                Some(TwoWayPath {
                    parking,
                    outbound: self.outbound.path(out),
                    inbound,
                })
            })
            .collect();

        if paths.is_empty() {
            return Err(if self.timed_out {
                RoutingError::Timeout {
                    visited: self.visited,
                }
            } else {
                RoutingError::PathNotFound
            });
        }
        Ok(rank::select(paths, self.max_results))
    }
}
