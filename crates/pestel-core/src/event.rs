//! Simulation events and the time-ordered queue that holds them.
//!
//! The queue is a min-heap on `(time, seq)`. `seq` is a monotone insertion
//! counter, so two events scheduled for the same time pop in the order they
//! were scheduled.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

/// What an event asks the handler to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Run one simulated day.
    DayTick {
        /// Day number, starting at 1.
        day: u64,
    },
    /// Rescore scenarios outside the regular cadence.
    ScenarioRescore,
    /// An event type this engine does not recognise.
    External {
        /// Name the event was submitted under.
        name: String,
    },
}

/// A scheduled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Dispatch time, in simulated days.
    pub time: u64,
    /// Insertion sequence number.
    pub seq: u64,
    /// Payload.
    pub kind: EventKind,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.time, self.seq).cmp(&(other.time, other.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Errors raised by the event queue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The insertion counter would overflow.
    #[error("event sequence counter overflow")]
    SequenceOverflow,
}

/// Pending events in dispatch order.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_seq: u64,
}

impl EventQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` at `time`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::SequenceOverflow`] once `u64::MAX` events have
    /// been scheduled.
    pub fn schedule(&mut self, time: u64, kind: EventKind) -> Result<u64, QueueError> {
        let seq = self.next_seq;
        self.next_seq = seq.checked_add(1).ok_or(QueueError::SequenceOverflow)?;
        self.heap.push(Reverse(Event { time, seq, kind }));
        Ok(seq)
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    /// Time of the earliest event.
    pub fn peek_time(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(event)| event.time)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Return `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule(5, EventKind::DayTick { day: 5 }).unwrap();
        queue.schedule(1, EventKind::DayTick { day: 1 }).unwrap();
        queue.schedule(3, EventKind::DayTick { day: 3 }).unwrap();
        assert_eq!(queue.peek_time(), Some(1));
        let times: Vec<u64> = std::iter::from_fn(|| queue.pop()).map(|e| e.time).collect();
        assert_eq!(times, vec![1, 3, 5]);
    }

    fn external(name: &str) -> EventKind {
        EventKind::External {
            name: name.to_owned(),
        }
    }

    #[test]
    fn ties_are_fifo() {
        let mut queue = EventQueue::new();
        queue.schedule(2, EventKind::ScenarioRescore).unwrap();
        queue.schedule(2, external("a")).unwrap();
        queue.schedule(2, EventKind::DayTick { day: 2 }).unwrap();
        let mut next = || queue.pop().map(|e| e.kind);
        assert_eq!(next(), Some(EventKind::ScenarioRescore));
        assert_eq!(next(), Some(external("a")));
        assert_eq!(next(), Some(EventKind::DayTick { day: 2 }));
        assert!(queue.is_empty());
    }

    #[test]
    fn sequence_numbers_increase() {
        let mut queue = EventQueue::new();
        let a = queue.schedule(9, EventKind::ScenarioRescore).unwrap();
        let b = queue.schedule(1, EventKind::ScenarioRescore).unwrap();
        assert!(b > a);
        assert_eq!(queue.len(), 2);
    }
}
