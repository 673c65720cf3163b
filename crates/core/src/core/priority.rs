//! Priority queue for BPE merge candidates.
//!
//! The learner repeatedly needs the most frequent adjacent pair of
//! the current working sequence, with ties broken by the pair's
//! first occurrence so that selection is deterministic regardless of
//! hash iteration order.

use crate::core::pairs::PairCount;
use crate::tokens::Pair;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;

/// A merge candidate during BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of token ids to merge
    pub pair: Pair,
    /// The frequency of this pair
    pub count: u64,
    /// Index of the pair's first occurrence in the working sequence
    pub first_seen: usize,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64, first_seen: usize) -> Self {
        Self {
            pair,
            count,
            first_seen,
        }
    }
}

// Higher count = higher priority; equal counts fall back to the
// earliest first occurrence. Distinct pairs never share a first
// occurrence index, so the ordering is total.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.first_seen.cmp(&self.first_seen))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue over the pair statistics of one working sequence.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
pub struct PairPriorityQueue {
    heap: OctonaryHeap<MergeCandidate>,
}

impl PairPriorityQueue {
    /// Create an empty priority queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
        }
    }

    /// Build a queue from pair statistics.
    pub fn from_stats(stats: &AHashMap<Pair, PairCount>) -> Self {
        let mut heap = OctonaryHeap::with_capacity(stats.len());
        for (&pair, &PairCount { count, first_seen }) in stats {
            heap.push(MergeCandidate::new(pair, count, first_seen));
        }
        Self { heap }
    }

    /// Push a merge candidate onto the queue.
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.heap.push(candidate);
    }

    /// Pop the highest priority merge candidate.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        self.heap.pop()
    }

    /// Peek at the highest priority candidate without removing it.
    pub fn peek(&self) -> Option<&MergeCandidate> {
        self.heap.peek()
    }

    /// Number of entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for PairPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}
