//! Itinerary ranking for search results.
//!
//! Orders park-and-ride itineraries so the most useful options come first
//! and drops ones that are worse in every respect.

use std::cmp::Ordering;

use super::merge::TwoWayPath;

fn compare(a: &TwoWayPath, b: &TwoWayPath) -> Ordering {
    a.weight()
        .total_cmp(&b.weight())
        .then_with(|| a.duration_secs().cmp(&b.duration_secs()))
        .then_with(|| a.parking.cmp(&b.parking))
}

/// Rank itineraries by preference.
///
/// Itineraries are ranked by:
/// 1. Total weight (lower is better)
/// 2. Total duration (shorter is better)
/// 3. Parking facility id, so ties come out in a stable order
///
/// Returns itineraries sorted best-first.
pub fn rank_paths(mut paths: Vec<TwoWayPath>) -> Vec<TwoWayPath> {
    paths.sort_by(compare);
    paths
}

/// Whether `a` is no worse than `b` in weight and duration and strictly
/// better in one of them.
fn dominates(a: &TwoWayPath, b: &TwoWayPath) -> bool {
    a.weight() <= b.weight()
        && a.duration_secs() <= b.duration_secs()
        && (a.weight() < b.weight() || a.duration_secs() < b.duration_secs())
}

/// Remove dominated itineraries.
///
/// An itinerary is dominated if another one has the same or lower weight
/// and the same or shorter duration, and is strictly better in at least one.
pub fn remove_dominated(paths: Vec<TwoWayPath>) -> Vec<TwoWayPath> {
    if paths.len() <= 1 {
        return paths;
    }

    let mut result: Vec<TwoWayPath> = Vec::with_capacity(paths.len());
    for path in paths {
        if result.iter().any(|existing| dominates(existing, &path)) {
            continue;
        }
        result.retain(|existing| !dominates(&path, existing));
        result.push(path);
    }
    result
}

/// Prune, rank and truncate to `max_results`.
pub fn select(paths: Vec<TwoWayPath>, max_results: usize) -> Vec<TwoWayPath> {
    let mut paths = rank_paths(remove_dominated(paths));
    paths.truncate(max_results);
    paths
}
