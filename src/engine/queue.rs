//! Offset-ordered event queue drained by the block scheduler.

use std::collections::VecDeque;

use crate::io::midi::{MidiEvent, TimedEvent};

/// Round `offset` down to the start of its granularity window.
///
/// A granularity of 0 or 1 leaves the offset untouched.
#[inline]
pub fn quantize(offset: usize, granularity: usize) -> usize {
    if granularity > 1 {
        (offset / granularity) * granularity
    } else {
        offset
    }
}

/// Ordered source of block-relative events.
///
/// Events come out in offset order; events sharing an offset come out in
/// the order they were added.
pub trait EventQueue {
    fn peek(&self) -> Option<&TimedEvent>;

    /// Drop the event `peek` returned.
    fn remove(&mut self);

    fn is_empty(&self) -> bool;

    /// Queue an event. Returns `false` if the queue is full and the event
    /// was dropped.
    fn add(&mut self, event: MidiEvent, offset: usize) -> bool;

    /// Advance by one processed block: remaining events move `block_len`
    /// samples closer to the start.
    fn flush(&mut self, block_len: usize);

    /// Change how many events can be pending. May allocate; never call
    /// this from the audio thread.
    fn resize(&mut self, capacity: usize);
}

/// Fixed-capacity queue backed by a ring buffer.
///
/// Insertion is a binary search plus a shift, so an add never allocates as
/// long as the queue is below capacity.
#[derive(Debug, Clone)]
pub struct BlockQueue {
    events: VecDeque<TimedEvent>,
    capacity: usize,
}

impl BlockQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for BlockQueue {
    fn default() -> Self {
        Self::with_capacity(crate::MAX_BLOCK_SIZE)
    }
}

impl EventQueue for BlockQueue {
    fn peek(&self) -> Option<&TimedEvent> {
        self.events.front()
    }

    fn remove(&mut self) {
        self.events.pop_front();
    }

    fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn add(&mut self, event: MidiEvent, offset: usize) -> bool {
        if self.events.len() >= self.capacity {
            return false;
        }
        // After every event at the same offset, so equal offsets stay FIFO
        let idx = self.events.partition_point(|e| e.offset <= offset);
        self.events.insert(idx, TimedEvent::new(offset, event));
        true
    }

    fn flush(&mut self, block_len: usize) {
        for e in self.events.iter_mut() {
            e.offset = e.offset.saturating_sub(block_len);
        }
    }

    fn resize(&mut self, capacity: usize) {
        if capacity > self.events.capacity() {
            self.events.reserve(capacity - self.events.len());
        }
        self.events.truncate(capacity);
        self.capacity = capacity;
    }
}
