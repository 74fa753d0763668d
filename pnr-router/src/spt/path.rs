//! Paths reconstructed from a tree.

use crate::domain::{TraverseMode, VertexId};
use crate::state::{Direction, Phase, State};

/// One mode-homogeneous piece of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub phase: Phase,
    pub mode: TraverseMode,
    pub from: VertexId,
    pub to: VertexId,
    /// Unix seconds.
    pub start_time: i64,
    pub end_time: i64,
    pub weight: f64,
}

impl Leg {
    pub fn duration_secs(&self) -> i64 {
        self.end_time - self.start_time
    }
}

/// A sequence of states in travel order.
///
/// Backward searches build their chains from the trip's end, so their
/// states are reversed relative to search order.
#[derive(Debug, Clone)]
pub struct GraphPath {
    states: Vec<State>,
    weight: f64,
}

impl GraphPath {
    pub(crate) fn from_search_order(mut states: Vec<State>, direction: Direction) -> Self {
        let weight = states.last().map_or(0.0, State::weight);
        if direction == Direction::Backward {
            states.reverse();
        }
        Self { states, weight }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn start_vertex(&self) -> VertexId {
        self.states[0].vertex()
    }

    pub fn end_vertex(&self) -> VertexId {
        self.states[self.states.len() - 1].vertex()
    }

    pub fn start_time(&self) -> i64 {
        self.states[0].time()
    }

    pub fn end_time(&self) -> i64 {
        self.states[self.states.len() - 1].time()
    }

    pub fn duration_secs(&self) -> i64 {
        self.end_time() - self.start_time()
    }

    /// The parking facility used, if the path switched vehicles.
    pub fn pnr_node(&self) -> Option<VertexId> {
        self.states.iter().find_map(State::pnr_node)
    }

    /// Split into legs at every phase change, in travel order.
    ///
    /// Each leg is charged the weight accrued since the previous leg ended,
    /// so leg weights add up to the path weight.
    pub fn legs(&self) -> Vec<Leg> {
        let mut legs = Vec::new();
        let mut previous_end = self.states.first().map_or(0.0, State::weight);
        for group in self.states.chunk_by(|a, b| a.phase() == b.phase()) {
            let (first, last) = (&group[0], &group[group.len() - 1]);
            legs.push(Leg {
                phase: first.phase(),
                mode: last.mode(),
                from: first.vertex(),
                to: last.vertex(),
                start_time: first.time(),
                end_time: last.time(),
                weight: (last.weight() - previous_end).abs(),
            });
            previous_end = last.weight();
        }
        legs
    }
}
