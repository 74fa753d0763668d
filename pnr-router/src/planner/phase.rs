//! The phase machine driving one direction of a park-and-ride search.
//!
//! A [`PhasedSearch`] wraps an engine [`Search`] and restricts it to one
//! leg at a time. Each non-terminal phase has a boundary: the vertices the
//! leg may end at. States that reach a boundary vertex are held back as
//! milestones. Once every boundary vertex has a milestone the queue is
//! dropped and rebuilt from the milestones, switched into the next phase.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::domain::{Vehicle, VertexId};
use crate::engine::{Limits, NoHooks, Search};
use crate::graph::{Graph, TraverseOptions};
use crate::precompute::AnnotationTable;
use crate::spt::ShortestPathTree;
use crate::state::{Direction, Phase, State, StateEditor, StateId};

use super::config::SearchConfig;

/// Traversal options for a leg.
pub fn phase_options(config: &SearchConfig, phase: Phase) -> TraverseOptions {
    TraverseOptions::new(config, phase.modes()).with_parking_links(phase.walks_parking_links())
}

/// Boundary vertex sets of the three non-terminal phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Boundaries {
    pub walk: BTreeSet<VertexId>,
    pub transit: BTreeSet<VertexId>,
    pub transfer: BTreeSet<VertexId>,
}

impl Boundaries {
    /// Boundaries for a search from `start` (the transit end of the trip)
    /// towards `vehicle_side`.
    ///
    /// A backward search walks from a stop to `start` and boards near a
    /// parking facility; a forward search walks from `start` to a stop and
    /// alights near a facility.
    pub fn new(
        annotations: &AnnotationTable,
        direction: Direction,
        start: VertexId,
        vehicle_side: VertexId,
        vehicle: Vehicle,
    ) -> Self {
        let parks = annotations.parking_nodes(vehicle_side, vehicle);
        let (walk, near_park): (_, fn(&AnnotationTable, VertexId) -> &BTreeSet<VertexId>) =
            match direction {
                Direction::Backward => (
                    annotations.backward_access_nodes(start),
                    AnnotationTable::access_nodes,
                ),
                Direction::Forward => (
                    annotations.access_nodes(start),
                    AnnotationTable::backward_access_nodes,
                ),
            };
        Self {
            walk: walk.clone(),
            transit: parks
                .iter()
                .flat_map(|&p| near_park(annotations, p))
                .copied()
                .collect(),
            transfer: parks.clone(),
        }
    }

    pub fn of(&self, phase: Phase) -> Option<&BTreeSet<VertexId>> {
        match phase {
            Phase::WalkLeg => Some(&self.walk),
            Phase::TransitLeg => Some(&self.transit),
            Phase::PnrTransfer => Some(&self.transfer),
            Phase::CarLeg | Phase::BicycleLeg => None,
        }
    }

    /// Whether some phase has nowhere to end, so no trip can exist.
    pub fn any_empty(&self) -> bool {
        self.walk.is_empty() || self.transit.is_empty() || self.transfer.is_empty()
    }
}

/// What one [`PhasedSearch::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A state was settled or a phase advanced.
    Progress,
    /// A terminal state reached the vehicle-side endpoint.
    Arrived(StateId),
    /// Nothing is left to explore.
    Exhausted,
}

/// One direction of a park-and-ride search.
#[derive(Debug)]
pub struct PhasedSearch<'c> {
    search: Search,
    config: &'c SearchConfig,
    vehicle: Vehicle,
    vehicle_side: VertexId,
    boundaries: Boundaries,
    phase: Phase,
    milestones: BTreeMap<VertexId, StateId>,
}

impl<'c> PhasedSearch<'c> {
    /// Start a search at `start` at clock time `time`, moving in `direction`
    /// until it drives (or rides) into `vehicle_side`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        annotations: &AnnotationTable,
        config: &'c SearchConfig,
        direction: Direction,
        start: VertexId,
        vehicle_side: VertexId,
        time: i64,
        vehicle: Vehicle,
        limits: Limits,
    ) -> Self {
        let boundaries = Boundaries::new(annotations, direction, start, vehicle_side, vehicle);
        let mut search = Search::new(
            Default::default(),
            direction,
            phase_options(config, Phase::WalkLeg),
            limits,
        );
        if boundaries.any_empty() {
            debug!(?direction, %start, %vehicle_side, ?boundaries, "no usable boundary, nothing to search");
        } else {
            let parked = match vehicle {
                Vehicle::Car => State::seed(start, time, direction).with_car_parked(true),
                Vehicle::Bicycle => State::seed(start, time, direction).with_bike_parked(true),
            };
            search.seed(parked, &NoHooks);
        }
        Self {
            search,
            config,
            vehicle,
            vehicle_side,
            boundaries,
            phase: Phase::WalkLeg,
            milestones: BTreeMap::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.search.direction()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn boundaries(&self) -> &Boundaries {
        &self.boundaries
    }

    pub fn spt(&self) -> &ShortestPathTree {
        self.search.spt()
    }

    pub fn into_spt(self) -> ShortestPathTree {
        self.search.into_spt()
    }

    pub fn visited(&self) -> usize {
        self.search.visited()
    }

    /// Lower bound on the weight of anything this search settles from now
    /// on: the smaller of the queue's minimum key and the lightest milestone
    /// waiting for the barrier. Infinite once nothing is left.
    pub fn frontier(&self) -> f64 {
        let queued = self.search.peek_key().unwrap_or(f64::INFINITY);
        self.milestones
            .values()
            .map(|&id| self.search.spt().state(id).weight())
            .fold(queued, f64::min)
    }

    /// Settle one state, or advance a phase.
    pub fn step(&mut self, graph: &Graph) -> Step {
        let Some(id) = self.search.pop() else {
            if self.config.flush_partial_milestones && !self.milestones.is_empty() {
                debug!(
                    phase = ?self.phase,
                    reached = self.milestones.len(),
                    expected = self.boundary_len(),
                    "queue empty, advancing with partial milestones"
                );
                self.advance();
                return Step::Progress;
            }
            return Step::Exhausted;
        };
        let state = *self.search.spt().state(id);

        if state.phase().is_terminal() {
            if state.vertex() == self.vehicle_side {
                return Step::Arrived(id);
            }
        } else if self
            .boundaries
            .of(self.phase)
            .is_some_and(|b| b.contains(&state.vertex()))
        {
            self.milestones.entry(state.vertex()).or_insert(id);
            if self.milestones.len() == self.boundary_len() {
                self.advance();
            }
            return Step::Progress;
        }

        self.search.relax(graph, id, &mut NoHooks);
        Step::Progress
    }

    fn boundary_len(&self) -> usize {
        self.boundaries.of(self.phase).map_or(0, BTreeSet::len)
    }

    /// Rebuild the queue from the milestones in the next phase.
    fn advance(&mut self) {
        let Some(next) = self.phase.next(self.vehicle) else {
            return;
        };
        debug!(
            direction = ?self.direction(),
            from = ?self.phase,
            to = ?next,
            milestones = self.milestones.len(),
            "phase transition"
        );
        self.search.clear_queue();
        for (vertex, id) in std::mem::take(&mut self.milestones) {
            let parent = *self.search.spt().state(id);
            let mut ed = StateEditor::branch(&parent, id);
            ed.set_phase(next);
            ed.set_mode(next.entry_mode());
            if next.is_terminal() {
                ed.set_car_parked(false);
                ed.set_bike_parked(false);
                ed.set_pnr_node(vertex);
            }
            if let Some(state) = ed.build() {
                self.search.seed(state, &NoHooks);
            }
        }
        self.search.set_options(phase_options(self.config, next));
        self.phase = next;
    }
}
