//! Edge traversal.
//!
//! Every edge kind answers the same question: given a state at the edge's
//! tail (or head, for backward searches), which states does crossing it
//! produce? Most kinds yield zero or one state; a transit hop yields one per
//! service pattern.

use tracing::trace;

use crate::domain::{ModeSet, TraverseMode, Vehicle, day_start, seconds_of_day};
use crate::planner::SearchConfig;
use crate::state::{Direction, State, StateEditor, StateId};

use super::{Edge, EdgeKind, HopPattern, StreetPermissions};

const NO_PATTERNS: &[HopPattern] = &[];

/// Per-search traversal settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TraverseOptions {
    /// Modes the search may use.
    pub modes: ModeSet,
    /// Let pedestrians cross parking links.
    pub walk_parking_links: bool,
    /// Charge scheduled edges their worst-case time instead of following
    /// the timetable.
    pub use_time_upper_bounds: bool,
    pub walk_speed: f64,
    pub bicycle_speed: f64,
    pub car_speed: f64,
    pub walk_reluctance: f64,
    pub bicycle_reluctance: f64,
    pub car_reluctance: f64,
    pub wait_reluctance: f64,
}

impl TraverseOptions {
    /// Options for `modes` using the speeds and reluctances in `config`.
    pub fn new(config: &SearchConfig, modes: ModeSet) -> Self {
        Self {
            modes,
            walk_parking_links: false,
            use_time_upper_bounds: false,
            walk_speed: config.walk_speed,
            bicycle_speed: config.bicycle_speed,
            car_speed: config.car_speed,
            walk_reluctance: config.walk_reluctance,
            bicycle_reluctance: config.bicycle_reluctance,
            car_reluctance: config.car_reluctance,
            wait_reluctance: config.wait_reluctance,
        }
    }

    pub fn with_parking_links(mut self, walk: bool) -> Self {
        self.walk_parking_links = walk;
        self
    }

    pub fn with_time_upper_bounds(mut self, enabled: bool) -> Self {
        self.use_time_upper_bounds = enabled;
        self
    }

    fn speed(&self, mode: TraverseMode) -> f64 {
        match mode {
            TraverseMode::Walk => self.walk_speed,
            TraverseMode::Bicycle => self.bicycle_speed,
            TraverseMode::Car => self.car_speed,
            TraverseMode::Transit => f64::INFINITY,
        }
    }

    fn reluctance(&self, mode: TraverseMode) -> f64 {
        match mode {
            TraverseMode::Walk => self.walk_reluctance,
            TraverseMode::Bicycle => self.bicycle_reluctance,
            TraverseMode::Car => self.car_reluctance,
            TraverseMode::Transit => 1.0,
        }
    }

    /// The mode used on a street: a permitted vehicle if the search allows
    /// one, otherwise walking.
    fn street_mode(&self, permissions: &StreetPermissions) -> Option<TraverseMode> {
        [TraverseMode::Car, TraverseMode::Bicycle, TraverseMode::Walk]
            .into_iter()
            .find(|&m| self.modes.contains(m) && permissions.allows(m))
    }
}

impl Edge {
    /// Candidate states produced by crossing this edge from `parent`.
    ///
    /// The sequence is lazy and may be empty (mode not allowed, no service)
    /// or contain several states (one per transit pattern).
    pub fn traverse<'a>(
        &'a self,
        parent: &State,
        parent_id: StateId,
        opts: &'a TraverseOptions,
    ) -> impl Iterator<Item = State> + 'a {
        let parent = *parent;
        let (single, patterns): (Option<State>, &'a [HopPattern]) = match &self.kind {
            EdgeKind::TransitHop { .. } if !opts.modes.contains(TraverseMode::Transit) => {
                (None, NO_PATTERNS)
            }
            EdgeKind::TransitHop { .. } if opts.use_time_upper_bounds => {
                (self.ride_upper_bound(&parent, parent_id), NO_PATTERNS)
            }
            EdgeKind::TransitHop { patterns } => (None, patterns.as_slice()),
            EdgeKind::Street {
                length_m,
                permissions,
            } => (
                self.traverse_street(&parent, parent_id, opts, *length_m, permissions),
                NO_PATTERNS,
            ),
            EdgeKind::StreetTransitLink { secs } => {
                (self.traverse_stop_link(&parent, parent_id, opts, *secs), NO_PATTERNS)
            }
            EdgeKind::ParkLink { vehicle, secs } => (
                self.traverse_park_link(&parent, parent_id, opts, *vehicle, *secs),
                NO_PATTERNS,
            ),
        };
        single.into_iter().chain(
            patterns
                .iter()
                .filter_map(move |p| self.ride(p, &parent, parent_id, opts)),
        )
    }

    fn editor(&self, parent: &State, parent_id: StateId) -> StateEditor {
        StateEditor::new(parent, parent_id, self.id, self.head(parent.direction()))
    }

    fn traverse_street(
        &self,
        parent: &State,
        parent_id: StateId,
        opts: &TraverseOptions,
        length_m: f64,
        permissions: &StreetPermissions,
    ) -> Option<State> {
        let mode = opts.street_mode(permissions)?;
        let secs = length_m / opts.speed(mode);
        let mut ed = self.editor(parent, parent_id);
        ed.set_mode(mode);
        ed.increment_time(secs.round() as i64);
        ed.increment_weight(secs * opts.reluctance(mode));
        if mode == TraverseMode::Walk {
            ed.increment_walk_distance(length_m);
        }
        ed.build()
    }

    fn traverse_stop_link(
        &self,
        parent: &State,
        parent_id: StateId,
        opts: &TraverseOptions,
        secs: u32,
    ) -> Option<State> {
        if !opts.modes.contains(TraverseMode::Walk) {
            return None;
        }
        let mut ed = self.editor(parent, parent_id);
        ed.set_mode(TraverseMode::Walk);
        ed.increment_time(i64::from(secs));
        ed.increment_weight(f64::from(secs) * opts.walk_reluctance);
        ed.build()
    }

    fn traverse_park_link(
        &self,
        parent: &State,
        parent_id: StateId,
        opts: &TraverseOptions,
        vehicle: Vehicle,
        secs: u32,
    ) -> Option<State> {
        let mode = if opts.modes.contains(vehicle.mode()) {
            vehicle.mode()
        } else if opts.walk_parking_links && opts.modes.contains(TraverseMode::Walk) {
            TraverseMode::Walk
        } else {
            return None;
        };
        let mut ed = self.editor(parent, parent_id);
        ed.set_mode(mode);
        ed.increment_time(i64::from(secs));
        ed.increment_weight(f64::from(secs) * opts.reluctance(mode));
        ed.build()
    }

    /// Ride one pattern, waiting for the next usable departure.
    fn ride(
        &self,
        pattern: &HopPattern,
        parent: &State,
        parent_id: StateId,
        opts: &TraverseOptions,
    ) -> Option<State> {
        let sod = seconds_of_day(parent.time());
        let ride = i64::from(pattern.ride_secs);
        let wait = match parent.direction() {
            Direction::Forward => pattern.next_departure(sod)? - sod,
            Direction::Backward => sod - (pattern.latest_departure_arriving_by(sod)? + ride),
        };
        trace!(
            edge = ?self.id,
            route = %pattern.route,
            wait,
            day = day_start(parent.time()),
            "riding transit hop"
        );
        let mut ed = self.editor(parent, parent_id);
        ed.set_mode(TraverseMode::Transit);
        ed.increment_time(wait + ride);
        ed.increment_weight(wait as f64 * opts.wait_reluctance + ride as f64);
        ed.build()
    }

    /// Cross a scheduled edge at its worst-case cost.
    fn ride_upper_bound(&self, parent: &State, parent_id: StateId) -> Option<State> {
        let bound = self.time_upper_bound();
        if bound == 0 {
            return None;
        }
        let mut ed = self.editor(parent, parent_id);
        ed.set_mode(TraverseMode::Transit);
        ed.increment_time(i64::from(bound));
        ed.increment_weight(f64::from(bound));
        ed.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, EdgeId, VertexId, parse_hhmm};
    use crate::graph::{Graph, GraphBuilder};
    use chrono::{TimeZone, Utc};

    fn at(east_m: f64) -> Coordinate {
        Coordinate::new(52.0, 4.0).offset_m(0.0, east_m)
    }

    fn opts(modes: &[TraverseMode]) -> TraverseOptions {
        TraverseOptions::new(&SearchConfig::default(), ModeSet::of(modes))
    }

    fn clock(hhmm: &str) -> i64 {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap().timestamp();
        midnight + i64::from(parse_hhmm(hhmm).unwrap())
    }

    /// X --street(100m)-- Y, stop S linked to Y, car park P linked to X,
    /// and a hop S -> T.
    fn network() -> (Graph, [EdgeId; 4]) {
        let mut b = GraphBuilder::new();
        let x = b.intersection("X", at(0.0));
        let y = b.intersection("Y", at(100.0));
        let s = b.transit_stop("S", at(110.0));
        let t = b.transit_stop("T", at(2000.0));
        let p = b.car_park("P", at(-20.0));
        let street = b.add_edge(
            x,
            y,
            EdgeKind::Street {
                length_m: 100.0,
                permissions: StreetPermissions::ALL,
            },
        );
        let link = b.add_edge(y, s, EdgeKind::StreetTransitLink { secs: 10 });
        let park = b.add_edge(
            p,
            x,
            EdgeKind::ParkLink {
                vehicle: Vehicle::Car,
                secs: 30,
            },
        );
        let deps = crate::domain::departures_every("07:00", "09:00", 15).unwrap();
        let hop = b.transit_hop(s, t, vec![HopPattern::new("R1", deps, 300)]);
        (b.build(), [street, link, park, hop])
    }

    fn only(states: impl Iterator<Item = State>) -> State {
        let states: Vec<State> = states.collect();
        assert_eq!(states.len(), 1, "expected exactly one state, got {states:?}");
        states[0]
    }

    #[test]
    fn walking_a_street() {
        let (g, [street, ..]) = network();
        let parent = State::seed(VertexId(0), clock("07:00"), Direction::Forward);
        let o = opts(&[TraverseMode::Walk]);
        let s = only(g.edge(street).traverse(&parent, StateId(0), &o));

        assert_eq!(s.vertex(), VertexId(1));
        assert_eq!(s.mode(), TraverseMode::Walk);
        // 100m at 1.25 m/s with walk reluctance 2
        assert_eq!(s.elapsed(), 80);
        assert_eq!(s.weight(), 160.0);
        assert_eq!(s.walk_distance(), 100.0);
    }

    #[test]
    fn driving_prefers_the_vehicle() {
        let (g, [street, ..]) = network();
        let parent = State::seed(VertexId(0), clock("07:00"), Direction::Forward);
        let o = opts(&[TraverseMode::Walk, TraverseMode::Car]);
        let s = only(g.edge(street).traverse(&parent, StateId(0), &o));
        assert_eq!(s.mode(), TraverseMode::Car);
        assert_eq!(s.walk_distance(), 0.0);
    }

    #[test]
    fn backward_street_lands_on_tail() {
        let (g, [street, ..]) = network();
        let parent = State::seed(VertexId(1), clock("07:00"), Direction::Backward);
        let s = only(g.edge(street).traverse(&parent, StateId(0), &opts(&[TraverseMode::Walk])));
        assert_eq!(s.vertex(), VertexId(0));
        assert_eq!(s.time(), clock("07:00") - 80);
    }

    #[test]
    fn stop_link_needs_walking() {
        let (g, [_, link, ..]) = network();
        let parent = State::seed(VertexId(1), clock("07:00"), Direction::Forward);
        assert_eq!(
            g.edge(link)
                .traverse(&parent, StateId(0), &opts(&[TraverseMode::Car]))
                .count(),
            0
        );
        let s = only(g.edge(link).traverse(&parent, StateId(0), &opts(&[TraverseMode::Walk])));
        assert_eq!(s.weight(), 20.0);
    }

    #[test]
    fn park_link_by_car_or_with_flag() {
        let (g, [_, _, park, _]) = network();
        let parent = State::seed(VertexId(4), clock("07:00"), Direction::Forward);
        let walk = opts(&[TraverseMode::Walk]);
        assert_eq!(g.edge(park).traverse(&parent, StateId(0), &walk).count(), 0);

        let walk = walk.with_parking_links(true);
        let s = only(g.edge(park).traverse(&parent, StateId(0), &walk));
        assert_eq!(s.mode(), TraverseMode::Walk);
        assert_eq!(s.weight(), 60.0);

        let car = opts(&[TraverseMode::Car]);
        let s = only(g.edge(park).traverse(&parent, StateId(0), &car));
        assert_eq!(s.mode(), TraverseMode::Car);
        assert_eq!(s.weight(), 30.0);
    }

    #[test]
    fn riding_waits_for_next_departure() {
        let (g, [.., hop]) = network();
        let parent = State::seed(VertexId(2), clock("07:05"), Direction::Forward);
        let s = only(g.edge(hop).traverse(&parent, StateId(0), &opts(&[TraverseMode::Transit])));
        // Board the 07:15, ride 5 minutes
        assert_eq!(s.time(), clock("07:20"));
        assert_eq!(s.weight(), 600.0 + 300.0);
        assert_eq!(s.mode(), TraverseMode::Transit);
    }

    #[test]
    fn riding_backward_takes_latest_arrival() {
        let (g, [.., hop]) = network();
        let parent = State::seed(VertexId(3), clock("07:40"), Direction::Backward);
        let s = only(g.edge(hop).traverse(&parent, StateId(0), &opts(&[TraverseMode::Transit])));
        // The 07:30 arrives 07:35; five minutes waiting at the far end
        assert_eq!(s.vertex(), VertexId(2));
        assert_eq!(s.time(), clock("07:30"));
        assert_eq!(s.weight(), 300.0 + 300.0);
    }

    #[test]
    fn upper_bound_ignores_timetable() {
        let (g, [.., hop]) = network();
        let parent = State::seed(VertexId(2), clock("07:05"), Direction::Forward);
        let o = opts(&[TraverseMode::Transit]).with_time_upper_bounds(true);
        let s = only(g.edge(hop).traverse(&parent, StateId(0), &o));
        // Overnight gap 09:00 -> 07:00 dominates the 15 minute headway
        let bound = 22 * 3600 + 300;
        assert_eq!(g.edge(hop).time_upper_bound(), bound);
        assert_eq!(s.elapsed(), i64::from(bound));
    }

    #[test]
    fn hop_without_transit_mode_is_closed() {
        let (g, [.., hop]) = network();
        let parent = State::seed(VertexId(2), clock("07:05"), Direction::Forward);
        assert_eq!(
            g.edge(hop)
                .traverse(&parent, StateId(0), &opts(&[TraverseMode::Walk]))
                .count(),
            0
        );
    }

    #[test]
    fn one_state_per_pattern() {
        let mut b = GraphBuilder::new();
        let s = b.transit_stop("S", at(0.0));
        let t = b.transit_stop("T", at(1000.0));
        let hop = b.transit_hop(
            s,
            t,
            vec![
                HopPattern::new("fast", vec![parse_hhmm("07:30").unwrap()], 120),
                HopPattern::new("slow", vec![parse_hhmm("07:10").unwrap()], 900),
            ],
        );
        let g = b.build();
        let parent = State::seed(s, clock("07:00"), Direction::Forward);
        let o = opts(&[TraverseMode::Transit]);
        let times: Vec<i64> = g
            .edge(hop)
            .traverse(&parent, StateId(0), &o)
            .map(|s| s.time())
            .collect();
        assert_eq!(times, vec![clock("07:32"), clock("07:25")]);
    }
}
