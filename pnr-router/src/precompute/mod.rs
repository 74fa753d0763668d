//! Offline annotation of the graph with access nodes and park-and-ride
//! nodes.
//!
//! Both annotations come from the same two-stage recipe, run once per
//! candidate (a stop or a parking facility):
//!
//! 1. *Profile*: a search from the candidate with scheduled edges charged
//!    their worst-case time, giving an upper bound from (or to) every other
//!    candidate.
//! 2. *Propagation*: a multi-source search seeded with the candidate at
//!    weight zero, marked covered, and every other candidate at its bound.
//!    Vertices the covered frontier reaches first are annotated with the
//!    candidate.
//!
//! The resulting [`AnnotationTable`] is immutable and shared by queries.

mod access;
mod pnr;
mod profile;
mod propagation;
mod table;

pub use table::{AnnotationTable, VertexAnnotations};

use std::time::Instant;

use tracing::{info, warn};

use crate::domain::Vehicle;
use crate::graph::Graph;
use crate::planner::SearchConfig;

/// Settings for [`build_annotations`].
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct PrecomputeConfig {
    /// Scales the competitor bounds when annotating parking. Lower values
    /// let each facility cover more vertices.
    pub heuristic_coefficient: f64,

    /// Walking limit for access-node searches (metres). Defaults to the
    /// search limit and never exceeds it: a stop annotated beyond the
    /// query's reach would hold the walk barrier shut.
    pub max_walk_distance: Option<f64>,
}

impl Default for PrecomputeConfig {
    fn default() -> Self {
        Self {
            heuristic_coefficient: 1.0,
            max_walk_distance: None,
        }
    }
}

impl PrecomputeConfig {
    /// The coefficient clamped into `0..=1`.
    fn coefficient(&self) -> f64 {
        let c = self.heuristic_coefficient;
        if (0.0..=1.0).contains(&c) {
            return c;
        }
        let clamped = if c.is_nan() { 1.0 } else { c.clamp(0.0, 1.0) };
        warn!(
            coefficient = c,
            clamped, "parking heuristic coefficient outside 0..=1"
        );
        clamped
    }

    /// The walking radius used by both stages.
    pub(super) fn walk_limit(&self, search: &SearchConfig) -> f64 {
        self.max_walk_distance
            .map_or(search.max_walk_distance, |m| m.min(search.max_walk_distance))
    }
}

/// How many vertices carry a given annotation and how large the sets are.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coverage {
    pub vertices: usize,
    pub entries: usize,
}

impl Coverage {
    fn of(sets: impl Iterator<Item = usize>) -> Self {
        sets.filter(|&n| n > 0).fold(Self::default(), |acc, n| Self {
            vertices: acc.vertices + 1,
            entries: acc.entries + n,
        })
    }

    /// Mean set size over annotated vertices.
    pub fn average(&self) -> f64 {
        if self.vertices == 0 {
            0.0
        } else {
            self.entries as f64 / self.vertices as f64
        }
    }
}

/// Counts reported after a build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecomputeSummary {
    pub access: Coverage,
    pub backward_access: Coverage,
    pub car_parking: Coverage,
    pub bike_parking: Coverage,
    pub skipped_stops: usize,
    pub skipped_car_parks: usize,
    pub skipped_bike_parks: usize,
}

impl PrecomputeSummary {
    fn of(table: &AnnotationTable) -> Self {
        Self {
            access: Coverage::of(table.iter().map(|(_, a)| a.access_nodes.len())),
            backward_access: Coverage::of(table.iter().map(|(_, a)| a.backward_access_nodes.len())),
            car_parking: Coverage::of(table.iter().map(|(_, a)| a.pnr_nodes.len())),
            bike_parking: Coverage::of(table.iter().map(|(_, a)| a.bike_pnr_nodes.len())),
            ..Self::default()
        }
    }
}

/// Every `step`th item is logged so that a run logs about `reports` times.
fn progress_step(total: usize, reports: usize) -> usize {
    (total / reports).max(1)
}

/// Compute access nodes and park-and-ride nodes for the whole graph.
pub fn build_annotations(
    graph: &Graph,
    search: &SearchConfig,
    config: &PrecomputeConfig,
) -> (AnnotationTable, PrecomputeSummary) {
    let started = Instant::now();
    if config
        .max_walk_distance
        .is_some_and(|m| m > search.max_walk_distance)
    {
        warn!(
            requested = ?config.max_walk_distance,
            limit = search.max_walk_distance,
            "precompute walk radius capped at the search limit"
        );
    }
    let config = PrecomputeConfig {
        heuristic_coefficient: config.coefficient(),
        ..config.clone()
    };
    let mut table = AnnotationTable::default();

    let skipped_stops = access::annotate_access_nodes(graph, search, &config, &mut table);
    let skipped_car_parks =
        pnr::annotate_parking_nodes(graph, Vehicle::Car, search, &config, &mut table);
    let skipped_bike_parks =
        pnr::annotate_parking_nodes(graph, Vehicle::Bicycle, search, &config, &mut table);

    let summary = PrecomputeSummary {
        skipped_stops,
        skipped_car_parks,
        skipped_bike_parks,
        ..PrecomputeSummary::of(&table)
    };
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        annotated = table.len(),
        avg_access = summary.access.average(),
        avg_backward_access = summary.backward_access.average(),
        avg_car_parking = summary.car_parking.average(),
        avg_bike_parking = summary.bike_parking.average(),
        skipped_stops,
        skipped_car_parks,
        skipped_bike_parks,
        "precomputation finished"
    );
    (table, summary)
}
