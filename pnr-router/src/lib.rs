//! Park-and-ride router.
//!
//! Plans trips that combine a private vehicle with public transit: drive
//! or cycle to a parking facility, walk to a stop, ride, and walk to the
//! destination. Two-way requests pick one facility that serves both the
//! outbound trip and the return, so the vehicle is where it was left.
//!
//! Queries rely on per-vertex annotations computed once per graph by
//! [`precompute::build_annotations`]. They tell each phase of the search
//! which vertices end it.

pub mod demo;
pub mod domain;
pub mod engine;
pub mod graph;
pub mod planner;
pub mod precompute;
pub mod spt;
pub mod state;
