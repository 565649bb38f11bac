//! Max-priority queue of operation descriptors.

use crate::scheduler::Descriptor;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Entry {
    seq: u64,
    desc: Descriptor,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // higher priority first, then earlier insertion
    fn cmp(&self, other: &Self) -> Ordering {
        self.desc
            .priority
            .total_cmp(&other.desc.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pops the highest-priority descriptor; equal priorities in FIFO order.
#[derive(Debug, Default)]
pub struct OperationQueue {
    heap: BinaryHeap<Entry>,
    seq: u64,
}

impl OperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, desc: Descriptor) {
        self.heap.push(Entry { seq: self.seq, desc });
        self.seq += 1;
    }

    pub fn pop(&mut self) -> Option<Descriptor> {
        self.heap.pop().map(|e| e.desc)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Remove everything, highest priority first.
    pub fn drain_sorted(&mut self) -> Vec<Descriptor> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(d) = self.pop() {
            out.push(d);
        }
        out
    }
}

impl Extend<Descriptor> for OperationQueue {
    fn extend<I: IntoIterator<Item = Descriptor>>(&mut self, iter: I) {
        for d in iter {
            self.push(d);
        }
    }
}
