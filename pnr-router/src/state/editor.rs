//! Deriving a new state from its predecessor.

use crate::domain::{EdgeId, TraverseMode, VertexId};

use super::{Direction, Phase, State, StateId};

/// Builds the successor of a state.
///
/// The editor copies the parent, links it as the predecessor and applies
/// deltas. Increments must be non-negative; a negative or non-finite delta
/// marks the editor defective and [`build`](Self::build) returns `None`, so
/// weight and elapsed time never decrease along a chain.
#[derive(Debug)]
pub struct StateEditor {
    child: State,
    defective: bool,
}

impl StateEditor {
    /// Start a successor reached over `edge`, arriving at `vertex`.
    pub fn new(parent: &State, parent_id: StateId, edge: EdgeId, vertex: VertexId) -> Self {
        let mut child = *parent;
        child.vertex = vertex;
        child.back = Some(parent_id);
        child.back_edge = Some(edge);
        Self {
            child,
            defective: false,
        }
    }

    /// Start a successor on the same vertex, used when switching phase.
    pub fn branch(parent: &State, parent_id: StateId) -> Self {
        let mut child = *parent;
        child.back = Some(parent_id);
        child.back_edge = None;
        Self {
            child,
            defective: false,
        }
    }

    pub fn increment_weight(&mut self, delta: f64) {
        if !delta.is_finite() || delta < 0.0 {
            self.defective = true;
            return;
        }
        self.child.weight += delta;
    }

    /// Advance the clock by `secs` in the search direction.
    pub fn increment_time(&mut self, secs: i64) {
        if secs < 0 {
            self.defective = true;
            return;
        }
        match self.child.direction {
            Direction::Forward => self.child.time += secs,
            Direction::Backward => self.child.time -= secs,
        }
    }

    pub fn increment_walk_distance(&mut self, metres: f64) {
        if !metres.is_finite() || metres < 0.0 {
            self.defective = true;
            return;
        }
        self.child.walk_distance += metres;
    }

    pub fn set_mode(&mut self, mode: TraverseMode) {
        self.child.mode = mode;
    }

    pub fn set_car_parked(&mut self, parked: bool) {
        self.child.car_parked = parked;
    }

    pub fn set_bike_parked(&mut self, parked: bool) {
        self.child.bike_parked = parked;
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.child.phase = phase;
    }

    pub fn set_pnr_node(&mut self, node: VertexId) {
        self.child.pnr_node = Some(node);
    }

    pub fn build(self) -> Option<State> {
        (!self.defective).then_some(self.child)
    }
}
