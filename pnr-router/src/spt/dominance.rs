//! Rules for discarding inferior states.

use crate::state::{State, StateId};

/// What to do with a candidate state at a vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// A comparable state at least as good already exists.
    Reject,
    /// Keep alongside the existing states.
    Add,
    /// Keep, evicting the listed states it strictly dominates.
    Replace(Vec<StateId>),
}

/// A partial order over states at the same vertex.
pub trait DominanceFunction {
    /// Whether `a` and `b` can be ranked against each other at all.
    fn comparable(&self, a: &State, b: &State) -> bool;

    /// Whether `a` is at least as good as `b`. Only asked for comparable pairs.
    fn at_least_as_good(&self, a: &State, b: &State) -> bool;

    /// Decide whether `candidate` joins the states already at its vertex.
    fn admit<'s, I>(&self, candidate: &State, existing: I) -> Admission
    where
        I: IntoIterator<Item = (StateId, &'s State)>,
    {
        let mut evicted = Vec::new();
        for (id, state) in existing {
            if !self.comparable(candidate, state) {
                continue;
            }
            if self.at_least_as_good(state, candidate) {
                return Admission::Reject;
            }
            if self.at_least_as_good(candidate, state) {
                evicted.push(id);
            }
        }
        if evicted.is_empty() {
            Admission::Add
        } else {
            Admission::Replace(evicted)
        }
    }
}

/// Lowest weight wins among states with the same signature.
///
/// The signature covers phase, mode, parked flags and the parking facility
/// used, so at most one state per signature survives at each vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumWeight;

impl DominanceFunction for MinimumWeight {
    fn comparable(&self, a: &State, b: &State) -> bool {
        a.signature() == b.signature()
    }

    fn at_least_as_good(&self, a: &State, b: &State) -> bool {
        a.weight() <= b.weight()
    }
}

/// One state per vertex; lowest weight wins and covered states win ties.
///
/// Used by the precomputation's propagation stage, where the only question
/// is whether the seed's frontier reaches a vertex first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoveredFirst;

impl DominanceFunction for CoveredFirst {
    fn comparable(&self, _a: &State, _b: &State) -> bool {
        true
    }

    fn at_least_as_good(&self, a: &State, b: &State) -> bool {
        a.weight() < b.weight() || (a.weight() == b.weight() && (a.is_covered() || !b.is_covered()))
    }
}
