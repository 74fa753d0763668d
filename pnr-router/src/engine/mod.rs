//! The relaxation loop shared by every search.
//!
//! A [`Search`] owns one shortest path tree and one priority queue. It can
//! run to completion with [`run`](Search::run), or be driven one settled
//! state at a time with [`pop`](Search::pop) and [`relax`](Search::relax)
//! by callers that interleave searches or intercept states (the phase
//! machine and the two-way search do both).
//!
//! Callers customise a run through [`SearchHooks`]: edge and result skip
//! predicates, a termination predicate and a remaining-weight heuristic.

mod context;
mod queue;

pub use context::RequestContext;
pub use queue::SearchQueue;

use std::collections::HashSet;

use tracing::trace;

use crate::domain::VertexId;
use crate::graph::{Edge, Graph, TraverseOptions};
use crate::spt::{DominanceFunction, MinimumWeight, ShortestPathTree};
use crate::state::{Direction, State, StateId};

/// Caller-supplied strategies for a search.
///
/// Every method has a neutral default, so plain Dijkstra is
/// `impl SearchHooks for MyHooks {}`.
pub trait SearchHooks {
    /// Skip relaxing `edge` out of `state`.
    fn skip_edge(&mut self, _state: &State, _edge: &Edge) -> bool {
        false
    }

    /// Drop a candidate before it reaches the tree.
    fn skip_result(&mut self, _candidate: &State) -> bool {
        false
    }

    /// Stop the search once `settled` has been popped.
    fn should_terminate(&mut self, _settled: &State) -> bool {
        false
    }

    /// Lower bound on the weight still needed from `state`. Zero makes the
    /// search plain Dijkstra.
    fn remaining_weight(&self, _state: &State) -> f64 {
        0.0
    }
}

/// Hooks that change nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl SearchHooks for NoHooks {}

/// Fires once every vertex of a target set has been settled.
#[derive(Debug, Clone)]
pub struct MultiTargetTermination {
    remaining: HashSet<VertexId>,
}

impl MultiTargetTermination {
    pub fn new(targets: impl IntoIterator<Item = VertexId>) -> Self {
        Self {
            remaining: targets.into_iter().collect(),
        }
    }

    /// Record `vertex` as settled; returns true when no target remains.
    pub fn settle(&mut self, vertex: VertexId) -> bool {
        self.remaining.remove(&vertex);
        self.remaining.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl SearchHooks for MultiTargetTermination {
    fn should_terminate(&mut self, settled: &State) -> bool {
        self.settle(settled.vertex())
    }
}

/// Silent pruning bounds applied to every candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub max_weight: f64,
    /// Latest clock time for forward searches, earliest for backward ones.
    pub worst_time: Option<i64>,
    pub max_walk_distance: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_weight: f64::INFINITY,
            worst_time: None,
            max_walk_distance: f64::INFINITY,
        }
    }
}

impl Limits {
    /// Whether `state` is within every bound.
    pub fn admits(&self, state: &State) -> bool {
        if state.weight() > self.max_weight || state.walk_distance() > self.max_walk_distance {
            return false;
        }
        match (self.worst_time, state.direction()) {
            (Some(worst), Direction::Forward) => state.time() <= worst,
            (Some(worst), Direction::Backward) => state.time() >= worst,
            (None, _) => true,
        }
    }
}

/// Why [`Search::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Exhausted,
    Terminated,
    Aborted,
}

/// One direction of a label-setting search.
#[derive(Debug, Clone)]
pub struct Search<D = MinimumWeight> {
    spt: ShortestPathTree<D>,
    queue: SearchQueue,
    options: TraverseOptions,
    limits: Limits,
    visited: usize,
}

impl<D: DominanceFunction> Search<D> {
    pub fn new(
        dominance: D,
        direction: Direction,
        options: TraverseOptions,
        limits: Limits,
    ) -> Self {
        Self {
            spt: ShortestPathTree::new(dominance, direction),
            queue: SearchQueue::new(),
            options,
            limits,
            visited: 0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.spt.direction()
    }

    /// Add an origin state and enqueue it if the tree accepts it.
    pub fn seed<H: SearchHooks>(&mut self, state: State, hooks: &H) -> Option<StateId> {
        let id = self.spt.add(state)?;
        self.queue.push(id, state.weight() + hooks.remaining_weight(&state));
        Some(id)
    }

    /// Put an existing tree state back on the queue.
    pub fn enqueue<H: SearchHooks>(&mut self, id: StateId, hooks: &H) {
        let state = self.spt.state(id);
        let key = state.weight() + hooks.remaining_weight(state);
        self.queue.push(id, key);
    }

    /// Pop the next current state, discarding stale entries.
    pub fn pop(&mut self) -> Option<StateId> {
        while let Some((id, _)) = self.queue.pop() {
            if self.spt.visit(id) {
                self.visited += 1;
                return Some(id);
            }
        }
        None
    }

    /// Relax every admissible edge out of `id`, returning how many new
    /// states were enqueued.
    pub fn relax<H: SearchHooks>(&mut self, graph: &Graph, id: StateId, hooks: &mut H) -> usize {
        let parent = *self.spt.state(id);
        let mut enqueued = 0;
        for &edge_id in graph.edges_from(parent.vertex(), parent.direction()) {
            let edge = graph.edge(edge_id);
            if hooks.skip_edge(&parent, edge) {
                continue;
            }
            for candidate in edge.traverse(&parent, id, &self.options) {
                if !self.limits.admits(&candidate) || hooks.skip_result(&candidate) {
                    continue;
                }
                if let Some(child) = self.spt.add(candidate) {
                    trace!(from = ?parent, to = ?candidate, "relaxed");
                    let key = candidate.weight() + hooks.remaining_weight(&candidate);
                    self.queue.push(child, key);
                    enqueued += 1;
                }
            }
        }
        enqueued
    }

    /// Run until the queue empties, the hooks terminate the search, or the
    /// request is aborted.
    pub fn run<H: SearchHooks>(
        &mut self,
        graph: &Graph,
        hooks: &mut H,
        ctx: &RequestContext,
    ) -> RunOutcome {
        loop {
            if ctx.should_stop() {
                return RunOutcome::Aborted;
            }
            let Some(id) = self.pop() else {
                return RunOutcome::Exhausted;
            };
            if hooks.should_terminate(self.spt.state(id)) {
                return RunOutcome::Terminated;
            }
            self.relax(graph, id, hooks);
        }
    }
}

impl<D> Search<D> {
    pub fn spt(&self) -> &ShortestPathTree<D> {
        &self.spt
    }

    pub fn into_spt(self) -> ShortestPathTree<D> {
        self.spt
    }

    pub fn options(&self) -> &TraverseOptions {
        &self.options
    }

    /// Switch traversal options, e.g. when a phase changes.
    pub fn set_options(&mut self, options: TraverseOptions) {
        self.options = options;
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Smallest key on the queue, counting stale entries.
    pub fn peek_key(&self) -> Option<f64> {
        self.queue.peek_key()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Drop every queued entry.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// States popped and expanded so far.
    pub fn visited(&self) -> usize {
        self.visited
    }
}
