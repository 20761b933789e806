//! Hand-off of events from a host or UI thread to the audio thread.

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::io::midi::TimedEvent;

/// Source of events produced outside the audio thread.
///
/// Implementations must be wait-free on the consumer side; the engine pops
/// from this at the top of every block.
pub trait EventReceiver {
    fn pop(&mut self) -> Option<TimedEvent>;
}

#[cfg(feature = "rtrb")]
impl EventReceiver for Consumer<TimedEvent> {
    fn pop(&mut self) -> Option<TimedEvent> {
        Consumer::pop(self).ok()
    }
}

/// Single-producer/single-consumer event channel.
///
/// Keep the producer on the thread that generates events and hand the
/// consumer to [`PolyEngine::ingest`](crate::PolyEngine::ingest).
#[cfg(feature = "rtrb")]
pub fn event_channel(capacity: usize) -> (Producer<TimedEvent>, Consumer<TimedEvent>) {
    RingBuffer::new(capacity)
}

/// Queued events drain front to back; handy for offline rendering.
impl EventReceiver for std::collections::VecDeque<TimedEvent> {
    fn pop(&mut self) -> Option<TimedEvent> {
        self.pop_front()
    }
}
