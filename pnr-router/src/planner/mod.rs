//! Query-time park-and-ride planning.
//!
//! The [`Router`] answers [`TripRequest`]s over a graph annotated by
//! [`precompute`](crate::precompute). Each trip direction is searched by a
//! [`PhasedSearch`] that walks, rides transit, walks to a parking facility
//! and then drives (or cycles). The resulting trees are read through a
//! [`PnrSearchTree`], which pairs them into ranked [`TwoWayPath`]s.

mod config;
mod merge;
mod phase;
mod rank;
mod search;

#[cfg(test)]
mod search_tests;

pub use config::{Endpoint, SearchConfig, TripRequest};
pub use merge::{PnrSearchTree, TwoWayPath};
pub use phase::{Boundaries, PhasedSearch, Step, phase_options};
pub use rank::{rank_paths, remove_dominated};
pub use search::Router;
