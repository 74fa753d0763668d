//! Binary min-heap of states keyed by weight plus heuristic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::state::StateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    key: OrderedFloat<f64>,
    // Insertion order breaks ties so runs are reproducible.
    seq: u64,
    state: StateId,
}

/// Priority queue over state ids.
///
/// Entries are never updated in place. When a better state supersedes an
/// enqueued one, the stale entry stays in the heap and is discarded when
/// popped.
#[derive(Debug, Clone, Default)]
pub struct SearchQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    seq: u64,
}

impl SearchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: StateId, key: f64) {
        self.seq += 1;
        self.heap.push(Reverse(Entry {
            key: OrderedFloat(key),
            seq: self.seq,
            state,
        }));
    }

    /// Remove the entry with the smallest key.
    pub fn pop(&mut self) -> Option<(StateId, f64)> {
        self.heap.pop().map(|Reverse(e)| (e.state, e.key.0))
    }

    pub fn peek_key(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(e)| e.key.0)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
