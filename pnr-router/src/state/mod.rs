//! Search states.
//!
//! A [`State`] is an immutable snapshot of one path prefix. States are
//! stored in the arena of a [`ShortestPathTree`](crate::spt::ShortestPathTree)
//! and point at their predecessor by [`StateId`]. New states are derived
//! with a [`StateEditor`], which takes the predecessor by value, applies an
//! edge's deltas and yields a fresh state.

mod editor;
mod phase;

pub use editor::StateEditor;
pub use phase::Phase;

use std::fmt;

use crate::domain::{EdgeId, TraverseMode, VertexId};

/// Index of a state in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub u32);

impl StateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which way a search expands.
///
/// Forward searches depart at the request time and relax outgoing edges.
/// Backward searches arrive by the request time and relax incoming edges,
/// moving clock time backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn from_arrive_by(arrive_by: bool) -> Self {
        if arrive_by {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    pub fn is_arrive_by(self) -> bool {
        self == Direction::Backward
    }
}

/// The part of a state that decides which other states it can be compared
/// with. States with different signatures never dominate each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    pub phase: Phase,
    pub mode: TraverseMode,
    pub car_parked: bool,
    pub bike_parked: bool,
    pub pnr_node: Option<VertexId>,
}

#[derive(Clone, Copy, PartialEq)]
pub struct State {
    pub(crate) vertex: VertexId,
    pub(crate) back: Option<StateId>,
    pub(crate) back_edge: Option<EdgeId>,
    pub(crate) direction: Direction,
    pub(crate) weight: f64,
    pub(crate) time: i64,
    pub(crate) start_time: i64,
    pub(crate) walk_distance: f64,
    pub(crate) mode: TraverseMode,
    pub(crate) car_parked: bool,
    pub(crate) bike_parked: bool,
    pub(crate) phase: Phase,
    pub(crate) pnr_node: Option<VertexId>,
    pub(crate) covered: bool,
}

impl State {
    /// A search origin: zero weight, walking, in the first phase.
    pub fn seed(vertex: VertexId, time: i64, direction: Direction) -> Self {
        Self {
            vertex,
            back: None,
            back_edge: None,
            direction,
            weight: 0.0,
            time,
            start_time: time,
            walk_distance: 0.0,
            mode: TraverseMode::Walk,
            car_parked: false,
            bike_parked: false,
            phase: Phase::WalkLeg,
            pnr_node: None,
            covered: false,
        }
    }

    /// Seed with an initial weight, used for multi-source frontiers.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_mode(mut self, mode: TraverseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_car_parked(mut self, parked: bool) -> Self {
        self.car_parked = parked;
        self
    }

    pub fn with_bike_parked(mut self, parked: bool) -> Self {
        self.bike_parked = parked;
        self
    }

    pub fn with_covered(mut self, covered: bool) -> Self {
        self.covered = covered;
        self
    }

    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    /// Predecessor in the tree, `None` for seeds.
    pub fn back(&self) -> Option<StateId> {
        self.back
    }

    /// The edge traversed to reach this state. `None` for seeds and for
    /// phase switches, which stay on the same vertex.
    pub fn back_edge(&self) -> Option<EdgeId> {
        self.back_edge
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Clock time as Unix seconds.
    pub fn time(&self) -> i64 {
        self.time
    }

    /// Seconds since the search seed, whatever the direction.
    pub fn elapsed(&self) -> i64 {
        (self.time - self.start_time).abs()
    }

    /// Metres walked on streets so far.
    pub fn walk_distance(&self) -> f64 {
        self.walk_distance
    }

    pub fn mode(&self) -> TraverseMode {
        self.mode
    }

    pub fn is_car_parked(&self) -> bool {
        self.car_parked
    }

    pub fn is_bike_parked(&self) -> bool {
        self.bike_parked
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The parking facility where the vehicle was picked up or left.
    pub fn pnr_node(&self) -> Option<VertexId> {
        self.pnr_node
    }

    /// Whether this state descends from the precomputation seed rather than
    /// from a competing frontier entry.
    pub fn is_covered(&self) -> bool {
        self.covered
    }

    pub fn signature(&self) -> Signature {
        Signature {
            phase: self.phase,
            mode: self.mode,
            car_parked: self.car_parked,
            bike_parked: self.bike_parked,
            pnr_node: self.pnr_node,
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{:?} {:?} {:?} w={:.1} t={}",
            self.vertex, self.phase, self.mode, self.weight, self.time
        )?;
        if let Some(p) = self.pnr_node {
            write!(f, " pnr={p:?}")?;
        }
        write!(f, ">")
    }
}
