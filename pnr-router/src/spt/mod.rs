//! Shortest path trees.
//!
//! A tree owns every state its search creates in an arena, and tracks per
//! vertex which of them are still current, i.e. not dominated by a later
//! arrival. Evicted states stay in the arena because current states may
//! still point back through them.

mod dominance;
mod path;

pub use dominance::{Admission, CoveredFirst, DominanceFunction, MinimumWeight};
pub use path::{GraphPath, Leg};

use std::collections::HashMap;

use crate::domain::VertexId;
use crate::state::{Direction, State, StateId};

#[derive(Debug, Clone)]
pub struct ShortestPathTree<D = MinimumWeight> {
    dominance: D,
    direction: Direction,
    arena: Vec<State>,
    current: HashMap<VertexId, Vec<StateId>>,
}

impl<D: DominanceFunction> ShortestPathTree<D> {
    pub fn new(dominance: D, direction: Direction) -> Self {
        Self {
            dominance,
            direction,
            arena: Vec::new(),
            current: HashMap::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Offer a state to the tree.
    ///
    /// Returns the new state's id if it was accepted ("hopeful"), in which
    /// case the caller should enqueue it. Rejected states are dropped.
    ///
    /// # Panics
    ///
    /// If the arena outgrows the `u32` id space.
    pub fn add(&mut self, state: State) -> Option<StateId> {
        let admission = self.dominance.admit(&state, self.states_at(state.vertex()));
        if admission == Admission::Reject {
            return None;
        }
        let id = match u32::try_from(self.arena.len()) {
            Ok(index) => StateId(index),
            Err(_) => panic!("state arena exceeded {} entries", u32::MAX),
        };
        let at_vertex = self.current.entry(state.vertex()).or_default();
        if let Admission::Replace(evicted) = admission {
            at_vertex.retain(|s| !evicted.contains(s));
        }
        at_vertex.push(id);
        self.arena.push(state);
        Some(id)
    }

    /// Whether `id` is still a current state at its vertex.
    ///
    /// Heap entries for evicted states fail this check and are skipped.
    pub fn visit(&self, id: StateId) -> bool {
        let vertex = self.arena[id.index()].vertex();
        self.current
            .get(&vertex)
            .is_some_and(|states| states.contains(&id))
    }
}

impl<D> ShortestPathTree<D> {
    pub fn state(&self, id: StateId) -> &State {
        &self.arena[id.index()]
    }

    /// Current states at `vertex`.
    pub fn states_at(&self, vertex: VertexId) -> impl Iterator<Item = (StateId, &State)> {
        self.current
            .get(&vertex)
            .into_iter()
            .flatten()
            .map(|&id| (id, &self.arena[id.index()]))
    }

    /// Every current state, in no particular order.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.current
            .values()
            .flatten()
            .map(|&id| (id, &self.arena[id.index()]))
    }

    /// Number of vertices holding at least one current state.
    pub fn vertex_count(&self) -> usize {
        self.current.values().filter(|s| !s.is_empty()).count()
    }

    /// Number of current states.
    pub fn state_count(&self) -> usize {
        self.current.values().map(Vec::len).sum()
    }

    /// The chain of states from the search seed to `id`, seed first.
    pub fn ancestry(&self, id: StateId) -> Vec<StateId> {
        let mut chain = vec![id];
        let mut cursor = self.state(id).back();
        while let Some(back) = cursor {
            chain.push(back);
            cursor = self.state(back).back();
        }
        chain.reverse();
        chain
    }

    /// The path ending at `id`, in travel order.
    pub fn path(&self, id: StateId) -> GraphPath {
        let states = self
            .ancestry(id)
            .into_iter()
            .map(|i| *self.state(i))
            .collect();
        GraphPath::from_search_order(states, self.direction)
    }
}
