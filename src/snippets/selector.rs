// Bounded top-K selection of the loudest snippets
//
// A min-heap keyed by score holds at most `capacity` candidates. The root is
// the quietest retained snippet, so deciding whether a new one makes the cut
// is a peek, and replacing it is O(log N). Anything that falls out of the set
// has its file deleted before `offer` returns.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::io::ErrorKind;
use tracing::{debug, error, warn};

use super::candidate::Candidate;
use crate::error::CaptureError;

/// Heap entry: louder ranks higher, and on equal score the earlier insertion ranks higher
#[derive(Debug)]
struct Ranked {
    candidate: Candidate,
    order: u64,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.candidate
            .score
            .total_cmp(&other.candidate.score)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Keeps the N loudest candidates seen so far and deletes the rest
#[derive(Debug)]
pub struct TopSnippets {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
    inserted: u64,
    deletion_failures: usize,
}

impl TopSnippets {
    /// Create a selector retaining at most `capacity` snippets (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity + 1),
            inserted: 0,
            deletion_failures: 0,
        }
    }

    /// Offer a candidate, taking ownership of its file.
    ///
    /// Returns true if it was retained. A rejected candidate's file is
    /// deleted immediately; an accepted one may evict the quietest retained
    /// snippet, whose file is deleted instead. Equal scores never evict.
    pub fn offer(&mut self, candidate: Candidate) -> bool {
        if self.heap.len() < self.capacity {
            debug!(
                "Added snippet: {}, RMS: {:.5} ({}/{})",
                candidate.file_name(),
                candidate.score,
                self.heap.len() + 1,
                self.capacity
            );
            self.push(candidate);
            return true;
        }

        let louder = self
            .heap
            .peek()
            .is_some_and(|Reverse(quietest)| candidate.score > quietest.candidate.score);

        if louder {
            if let Some(Reverse(evicted)) = self.heap.pop() {
                debug!(
                    "Evicted quieter snippet: {}, RMS: {:.5}",
                    evicted.candidate.file_name(),
                    evicted.candidate.score
                );
                self.discard(&evicted.candidate);
            }
            debug!(
                "Added louder snippet: {}, RMS: {:.5}",
                candidate.file_name(),
                candidate.score
            );
            self.push(candidate);
            true
        } else {
            debug!(
                "Rejected snippet: {}, RMS: {:.5} (not in top {})",
                candidate.file_name(),
                candidate.score,
                self.capacity
            );
            self.discard(&candidate);
            false
        }
    }

    /// Retained candidates, loudest first
    pub fn snapshot(&self) -> Vec<Candidate> {
        let mut ranked: Vec<&Ranked> = self.heap.iter().map(|Reverse(r)| r).collect();
        ranked.sort_by(|a, b| b.cmp(a));
        ranked.into_iter().map(|r| r.candidate.clone()).collect()
    }

    /// Close ranking and hand over every retained candidate, loudest first.
    ///
    /// Files are not deleted; ownership moves to the caller and the selector
    /// is left empty.
    pub fn finalize(&mut self) -> Vec<Candidate> {
        let mut ranked: Vec<Ranked> = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .map(|Reverse(r)| r)
            .collect();
        ranked.sort_by(|a, b| b.cmp(a));

        debug!("Finalized {} top snippets", ranked.len());
        ranked.into_iter().map(|r| r.candidate).collect()
    }

    /// Drop every retained candidate, deleting files if requested
    pub fn clear(&mut self, delete_files: bool) {
        let drained = std::mem::take(&mut self.heap);
        if delete_files {
            for Reverse(ranked) in drained.into_vec() {
                self.discard(&ranked.candidate);
            }
        }
    }

    pub fn count(&self) -> usize {
        self.heap.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Score a newcomer must beat once the set is full
    pub fn min_score(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(r)| r.candidate.score)
    }

    /// Deletions that failed for a reason other than the file being gone
    pub fn deletion_failures(&self) -> usize {
        self.deletion_failures
    }

    fn push(&mut self, candidate: Candidate) {
        let order = self.inserted;
        self.inserted += 1;
        self.heap.push(Reverse(Ranked { candidate, order }));
    }

    fn discard(&mut self, candidate: &Candidate) {
        match std::fs::remove_file(&candidate.path) {
            Ok(()) => debug!("Deleted file: {}", candidate.file_name()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Snippet file already gone: {}", candidate.path.display());
            }
            Err(source) => {
                self.deletion_failures += 1;
                let err = CaptureError::StorageDeletion {
                    path: candidate.path.clone(),
                    source,
                };
                error!("{} (left on disk)", err);
            }
        }
    }
}
