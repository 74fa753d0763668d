//! Park-and-ride search.
//!
//! Every search starts at the transit end of the trip and finishes at the
//! vehicle end, so the phase machine always runs walk, transit, transfer and
//! then the vehicle leg.
//!
//! A one-way request runs a single [`PhasedSearch`]. A two-way request runs
//! two: the outbound trip backward from the destination (it must arrive by
//! the requested time) and the return trip forward from it. Both finish at
//! the origin, where the vehicle is, and itineraries pair their terminal
//! states through a shared parking facility. The searches take turns by
//! frontier weight and stop once no unpaired facility can beat the best
//! round trip found.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;

use crate::domain::{RoutingError, VertexId};
use crate::engine::{Limits, RequestContext};
use crate::graph::Graph;
use crate::precompute::AnnotationTable;
use crate::state::{Direction, StateId};

use super::config::{Endpoint, SearchConfig, TripRequest};
use super::merge::PnrSearchTree;
use super::phase::{PhasedSearch, Step};

/// Answers park-and-ride requests over an annotated graph.
///
/// The graph and annotations are only read, so one router can serve
/// concurrent requests from several threads.
#[derive(Debug, Clone, Copy)]
pub struct Router<'g> {
    graph: &'g Graph,
    annotations: &'g AnnotationTable,
    config: &'g SearchConfig,
}

/// Terminal states of one search, first per parking facility.
#[derive(Debug)]
struct Terminals {
    by_parking: BTreeMap<VertexId, (StateId, f64)>,
    best: f64,
}

impl Terminals {
    fn new() -> Self {
        Self {
            by_parking: BTreeMap::new(),
            best: f64::INFINITY,
        }
    }

    /// Record a terminal state unless the facility already has one.
    fn record(&mut self, parking: VertexId, id: StateId, weight: f64) -> bool {
        if self.by_parking.contains_key(&parking) {
            return false;
        }
        self.by_parking.insert(parking, (id, weight));
        self.best = self.best.min(weight);
        true
    }

    fn len(&self) -> usize {
        self.by_parking.len()
    }

    fn weight(&self, parking: VertexId) -> Option<f64> {
        self.by_parking.get(&parking).map(|&(_, w)| w)
    }

    fn into_ids(self) -> BTreeMap<VertexId, StateId> {
        self.by_parking
            .into_iter()
            .map(|(parking, (id, _))| (parking, id))
            .collect()
    }
}

impl<'g> Router<'g> {
    pub fn new(graph: &'g Graph, annotations: &'g AnnotationTable, config: &'g SearchConfig) -> Self {
        Self {
            graph,
            annotations,
            config,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn config(&self) -> &'g SearchConfig {
        self.config
    }

    /// Run `request` with its deadline, or the configured timeout.
    pub fn search(&self, request: &TripRequest) -> Result<PnrSearchTree, RoutingError> {
        let deadline = request
            .deadline
            .unwrap_or_else(|| Instant::now() + self.config.timeout());
        self.search_with_context(request, &RequestContext::new(Some(deadline)))
    }

    /// Run `request` under a caller-owned context, which another thread may
    /// cancel.
    ///
    /// Errors only for requests that cannot be searched. A search that
    /// finds nothing, or stops on its deadline, still returns its trees;
    /// [`PnrSearchTree::paths`] reports the outcome.
    pub fn search_with_context(
        &self,
        request: &TripRequest,
        ctx: &RequestContext,
    ) -> Result<PnrSearchTree, RoutingError> {
        request.validate()?;
        let from = self.resolve(&request.from)?;
        let to = self.resolve(&request.to)?;
        if from == to {
            return Err(RoutingError::InvalidRequest(
                "origin and destination are the same vertex".to_string(),
            ));
        }

        let limits = Limits {
            max_weight: request
                .max_weight
                .or(self.config.max_weight)
                .unwrap_or(f64::INFINITY),
            worst_time: request.worst_time.map(|t| t.timestamp()),
            max_walk_distance: request
                .max_walk_distance
                .unwrap_or(self.config.max_walk_distance),
        };
        let max_results = request.max_results.unwrap_or(self.config.max_results);
        debug!(
            %from,
            %to,
            two_way = request.two_way,
            arrive_by = request.arrive_by,
            vehicle = %request.vehicle,
            "park-and-ride search"
        );

        Ok(if request.two_way {
            self.two_way(request, from, to, limits, max_results, ctx)
        } else {
            self.one_way(request, from, to, limits, max_results, ctx)
        })
    }

    fn resolve(&self, endpoint: &Endpoint) -> Result<VertexId, RoutingError> {
        match *endpoint {
            Endpoint::Vertex(v) if v.index() < self.graph.vertex_count() => Ok(v),
            Endpoint::Vertex(v) => Err(RoutingError::InvalidRequest(format!(
                "{v} is not a vertex of the graph"
            ))),
            Endpoint::Coordinate(c) => self
                .graph
                .nearest_intersection(&c)
                .ok_or(RoutingError::NoNearbyVertex(c)),
        }
    }

    fn one_way(
        &self,
        request: &TripRequest,
        from: VertexId,
        to: VertexId,
        limits: Limits,
        max_results: usize,
        ctx: &RequestContext,
    ) -> PnrSearchTree {
        // Depart-at trips start on transit at the origin; arrive-by trips
        // are searched back from the destination.
        let direction = Direction::from_arrive_by(request.arrive_by);
        let (start, vehicle_side) = match direction {
            Direction::Forward => (from, to),
            Direction::Backward => (to, from),
        };
        let mut search = PhasedSearch::new(
            self.annotations,
            self.config,
            direction,
            start,
            vehicle_side,
            request.date_time.timestamp(),
            request.vehicle,
            limits,
        );

        // Terminals settle in weight order, so the first is the best. Keep
        // going for alternatives through other facilities, up to the
        // requested count.
        let wanted = max_results.min(search.boundaries().transfer.len());
        let mut terminals = Terminals::new();
        while !ctx.should_stop() && terminals.len() < wanted {
            match search.step(self.graph) {
                Step::Progress => {}
                Step::Arrived(id) => {
                    let state = search.spt().state(id);
                    if let Some(parking) = state.pnr_node() {
                        terminals.record(parking, id, state.weight());
                    }
                }
                Step::Exhausted => break,
            }
        }

        let visited = search.visited();
        debug!(
            visited,
            best = terminals.best,
            timed_out = ctx.timed_out(),
            "one-way search finished"
        );
        let mut tree = PnrSearchTree::one_way(search.into_spt(), max_results);
        tree.set_terminals(terminals.into_ids(), BTreeMap::new());
        tree.set_outcome(ctx.timed_out(), visited);
        tree
    }

    fn two_way(
        &self,
        request: &TripRequest,
        home: VertexId,
        destination: VertexId,
        limits: Limits,
        max_results: usize,
        ctx: &RequestContext,
    ) -> PnrSearchTree {
        let phased = |direction, time| {
            PhasedSearch::new(
                self.annotations,
                self.config,
                direction,
                destination,
                home,
                time,
                request.vehicle,
                limits,
            )
        };
        let mut outbound = phased(Direction::Backward, request.date_time.timestamp());
        let mut inbound = phased(
            Direction::Forward,
            request.return_time(self.config).timestamp(),
        );

        let mut out_terminals = Terminals::new();
        let mut in_terminals = Terminals::new();
        let mut out_done = false;
        let mut in_done = false;
        let mut incumbent = f64::INFINITY;
        let mut current_parking: Option<VertexId> = None;

        while !ctx.should_stop() && !(out_done && in_done) {
            let f_out = if out_done { f64::INFINITY } else { outbound.frontier() };
            let f_in = if in_done { f64::INFINITY } else { inbound.frontier() };
            let bound = f64::min(
                f_out + in_terminals.best.min(f_in),
                f_in + out_terminals.best.min(f_out),
            );
            if bound >= incumbent {
                break;
            }

            let outbound_turn = !out_done && (in_done || f_out <= f_in);
            let (search, mine, theirs, done) = if outbound_turn {
                (&mut outbound, &mut out_terminals, &in_terminals, &mut out_done)
            } else {
                (&mut inbound, &mut in_terminals, &out_terminals, &mut in_done)
            };
            match search.step(self.graph) {
                Step::Progress => {}
                Step::Exhausted => *done = true,
                Step::Arrived(id) => {
                    let state = search.spt().state(id);
                    let Some(parking) = state.pnr_node() else {
                        continue;
                    };
                    if !mine.record(parking, id, state.weight()) {
                        continue;
                    }
                    let Some(other_weight) = theirs.weight(parking) else {
                        continue;
                    };
                    let candidate = state.weight() + other_weight;
                    if candidate < incumbent {
                        debug!(%parking, candidate, previous = incumbent, "better round trip");
                        incumbent = candidate;
                        current_parking = Some(parking);
                    }
                }
            }
        }

        let visited = outbound.visited() + inbound.visited();
        debug!(
            visited,
            incumbent,
            parking = ?current_parking,
            timed_out = ctx.timed_out(),
            "two-way search finished"
        );
        let mut tree = PnrSearchTree::two_way(outbound.into_spt(), inbound.into_spt(), max_results);
        tree.set_terminals(out_terminals.into_ids(), in_terminals.into_ids());
        tree.set_outcome(ctx.timed_out(), visited);
        tree
    }
}
