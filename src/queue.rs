//! The kernel's event store.
//!
//! A min-heap keyed by event time, backed by `std::collections::BinaryHeap`
//! with reversed `Ord` on the entries. std's heap is the classic
//! array-backed binary heap (sift-up on push, sift-down on pop); nothing
//! outside this module observes its internals. Stability across equal
//! keys is not guaranteed and must not be assumed by any model.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::event::Event;
use crate::time::SimTime;

/// An entry pairing a boxed event with its cached time, so ordering never
/// re-enters the trait object.
struct Entry<C, S> {
    time: SimTime,
    event: Box<dyn Event<C, S>>,
}

impl<C, S> PartialEq for Entry<C, S> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}

impl<C, S> Eq for Entry<C, S> {}

impl<C, S> PartialOrd for Entry<C, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reversed so that `BinaryHeap` pops the smallest time first.
impl<C, S> Ord for Entry<C, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.cmp(&self.time)
    }
}

/// Priority queue of pending events, earliest time first.
pub struct EventQueue<C, S> {
    heap: BinaryHeap<Entry<C, S>>,
}

impl<C, S> EventQueue<C, S> {
    /// Create an empty queue.
    pub fn new() -> Self {
        EventQueue {
            heap: BinaryHeap::new(),
        }
    }

    /// Insert an event in O(log n).
    pub fn insert(&mut self, event: Box<dyn Event<C, S>>) {
        self.heap.push(Entry {
            time: event.time(),
            event,
        });
    }

    /// Remove and return the earliest event, or `None` when empty.
    pub fn remove_first(&mut self) -> Option<Box<dyn Event<C, S>>> {
        self.heap.pop().map(|entry| entry.event)
    }

    /// Discard every pending event without touching the events themselves.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<C, S> Default for EventQueue<C, S> {
    fn default() -> Self {
        Self::new()
    }
}
