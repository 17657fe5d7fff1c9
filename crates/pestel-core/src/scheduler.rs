//! Discrete-event scheduler.
//!
//! The [`Scheduler`] owns the clock and the event queue and drives an
//! [`EventHandler`]:
//!
//! 1. `initialize` lets the handler seed the queue (the first day tick).
//! 2. Each step pops the earliest event, moves the clock to its time, and
//!    dispatches it. Handlers may schedule follow-up events.
//! 3. `check_conditional` runs after every dispatched event.
//! 4. The loop ends when the queue drains, the next event lies beyond the
//!    horizon, or a stop is requested. `finalize` then runs once.
//!
//! Dispatch times never decrease; events at the same time run in the order
//! they were scheduled.

use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::{ClockError, SimulationClock};
use crate::control::{RunControl, SimulationEndReason};
use crate::event::{Event, EventKind, EventQueue, QueueError};
use crate::tick::TickError;

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The event was processed.
    Handled,
    /// The event type is not one the handler processes.
    Ignored,
}

/// Reacts to scheduled events.
pub trait EventHandler {
    /// Seed the queue before the first event is dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if scheduling fails.
    fn initialize(&mut self, queue: &mut EventQueue) -> Result<(), QueueError>;

    /// Process one event, scheduling any follow-ups on `queue`.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] on an invariant violation; the run halts.
    fn handle(&mut self, event: &Event, queue: &mut EventQueue) -> Result<Dispatch, TickError>;

    /// Evaluate conditions that fire independently of the queue.
    fn check_conditional(&mut self, now: u64);

    /// Called once when the loop ends normally.
    fn finalize(&mut self);
}

/// Errors that halt the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The clock was asked to move backwards.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The event queue rejected an insertion.
    #[error("queue error: {source}")]
    Queue {
        /// The underlying queue error.
        #[from]
        source: QueueError,
    },

    /// A handler hit an invariant violation.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    /// Events popped and dispatched, ignored ones included.
    pub dispatched: u64,
    /// Events the handler did not recognise.
    pub ignored: u64,
    /// Conditional checks run.
    pub conditional_checks: u64,
    /// Time of the last dispatched event.
    pub last_time: u64,
}

/// Clock, queue, and horizon.
#[derive(Debug, Clone)]
pub struct Scheduler {
    clock: SimulationClock,
    queue: EventQueue,
    horizon: u64,
    stats: SchedulerStats,
}

impl Scheduler {
    /// A scheduler that dispatches events up to and including `horizon`.
    pub fn new(horizon: u64) -> Self {
        Self {
            clock: SimulationClock::new(),
            queue: EventQueue::new(),
            horizon,
            stats: SchedulerStats::default(),
        }
    }

    /// Current simulated time.
    pub const fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Last dispatchable time.
    pub const fn horizon(&self) -> u64 {
        self.horizon
    }

    /// Dispatch counters so far.
    pub const fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Number of pending events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue an event from outside the handler.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if the sequence counter overflows.
    pub fn schedule(&mut self, time: u64, kind: EventKind) -> Result<u64, QueueError> {
        self.queue.schedule(time, kind)
    }

    /// Let the handler seed the queue.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Queue`] if seeding fails.
    pub fn initialize<H: EventHandler + ?Sized>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), SchedulerError> {
        handler.initialize(&mut self.queue)?;
        Ok(())
    }

    /// Pop and dispatch the earliest event. Returns `false` if the queue
    /// was empty.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] on clock reversal or a handler failure.
    pub fn advance<H: EventHandler + ?Sized>(
        &mut self,
        handler: &mut H,
    ) -> Result<bool, SchedulerError> {
        let Some(event) = self.queue.pop() else {
            return Ok(false);
        };
        self.clock.advance_to(event.time)?;
        let dispatch = handler.handle(&event, &mut self.queue)?;
        self.stats.dispatched = self.stats.dispatched.saturating_add(1);
        self.stats.last_time = event.time;
        match dispatch {
            Dispatch::Handled => {
                debug!(time = event.time, seq = event.seq, "event handled");
            }
            Dispatch::Ignored => {
                self.stats.ignored = self.stats.ignored.saturating_add(1);
                warn!(
                    time = event.time,
                    seq = event.seq,
                    kind = ?event.kind,
                    "unknown event type, skipping"
                );
            }
        }
        Ok(true)
    }

    /// Run the handler's conditional checks at the current time.
    pub fn check_conditional<H: EventHandler + ?Sized>(&mut self, handler: &mut H) {
        handler.check_conditional(self.clock.now());
        self.stats.conditional_checks = self.stats.conditional_checks.saturating_add(1);
    }

    /// Drive `handler` until the queue drains, the horizon is passed, or
    /// `control` requests a stop.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] on any invariant violation. `finalize` is
    /// not called in that case.
    pub fn run<H: EventHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        control: &RunControl,
    ) -> Result<SimulationEndReason, SchedulerError> {
        self.initialize(handler)?;
        let reason = loop {
            if control.is_stop_requested() {
                break SimulationEndReason::OperatorStop;
            }
            match self.queue.peek_time() {
                Some(time) if time <= self.horizon => {}
                _ => break SimulationEndReason::Completed,
            }
            self.advance(handler)?;
            self.check_conditional(handler);
        };
        handler.finalize();
        Ok(reason)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Schedules one tick per day up to `days` and records everything.
    #[derive(Default)]
    struct Recorder {
        days: u64,
        times: Vec<u64>,
        ticks: u64,
        conditionals: u64,
        finalized: u32,
        fail_on: Option<u64>,
    }

    impl EventHandler for Recorder {
        fn initialize(&mut self, queue: &mut EventQueue) -> Result<(), QueueError> {
            queue.schedule(1, EventKind::DayTick { day: 1 })?;
            Ok(())
        }

        fn handle(&mut self, event: &Event, queue: &mut EventQueue) -> Result<Dispatch, TickError> {
            self.times.push(event.time);
            match event.kind {
                EventKind::DayTick { day } => {
                    if self.fail_on == Some(day) {
                        return Err(TickError::UnknownAgent {
                            agent_id: "ghost".to_owned(),
                        });
                    }
                    self.ticks = self.ticks.saturating_add(1);
                    if day < self.days {
                        let next = day.saturating_add(1);
                        queue.schedule(next, EventKind::DayTick { day: next })?;
                    }
                    Ok(Dispatch::Handled)
                }
                EventKind::ScenarioRescore => Ok(Dispatch::Handled),
                EventKind::External { .. } => Ok(Dispatch::Ignored),
            }
        }

        fn check_conditional(&mut self, _now: u64) {
            self.conditionals = self.conditionals.saturating_add(1);
        }

        fn finalize(&mut self) {
            self.finalized = self.finalized.saturating_add(1);
        }
    }

    #[test]
    fn five_days_give_five_ticks_and_one_finalize() {
        let mut handler = Recorder {
            days: 5,
            ..Recorder::default()
        };
        let mut scheduler = Scheduler::new(5);
        let reason = scheduler.run(&mut handler, &RunControl::new()).unwrap();
        assert_eq!(reason, SimulationEndReason::Completed);
        assert_eq!(handler.ticks, 5);
        assert_eq!(handler.finalized, 1);
        assert_eq!(handler.conditionals, 5);
        assert_eq!(scheduler.stats().dispatched, 5);
        assert_eq!(scheduler.stats().last_time, 5);
    }

    #[test]
    fn dispatch_times_never_decrease() {
        let mut handler = Recorder {
            days: 4,
            ..Recorder::default()
        };
        let mut scheduler = Scheduler::new(4);
        scheduler.schedule(3, EventKind::ScenarioRescore).unwrap();
        scheduler.schedule(2, EventKind::ScenarioRescore).unwrap();
        scheduler.run(&mut handler, &RunControl::new()).unwrap();
        assert!(handler.times.windows(2).all(|w| w.first() <= w.get(1)));
        assert_eq!(handler.times.len(), 6);
    }

    #[test]
    fn unknown_events_are_ignored_not_fatal() {
        let mut handler = Recorder {
            days: 2,
            ..Recorder::default()
        };
        let mut scheduler = Scheduler::new(2);
        scheduler
            .schedule(1, EventKind::External { name: "meteor".to_owned() })
            .unwrap();
        let reason = scheduler.run(&mut handler, &RunControl::new()).unwrap();
        assert_eq!(reason, SimulationEndReason::Completed);
        assert_eq!(handler.ticks, 2);
        assert_eq!(scheduler.stats().ignored, 1);
    }

    #[test]
    fn events_past_the_horizon_are_not_dispatched() {
        let mut handler = Recorder {
            days: 10,
            ..Recorder::default()
        };
        let mut scheduler = Scheduler::new(3);
        scheduler.run(&mut handler, &RunControl::new()).unwrap();
        assert_eq!(handler.ticks, 3);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn stop_request_ends_before_next_event() {
        let mut handler = Recorder {
            days: 5,
            ..Recorder::default()
        };
        let control = RunControl::new();
        control.request_stop();
        let mut scheduler = Scheduler::new(5);
        let reason = scheduler.run(&mut handler, &control).unwrap();
        assert_eq!(reason, SimulationEndReason::OperatorStop);
        assert_eq!(handler.ticks, 0);
        assert_eq!(handler.finalized, 1);
    }

    #[test]
    fn handler_error_halts_without_finalize() {
        let mut handler = Recorder {
            days: 5,
            fail_on: Some(2),
            ..Recorder::default()
        };
        let mut scheduler = Scheduler::new(5);
        let result = scheduler.run(&mut handler, &RunControl::new());
        assert!(matches!(result, Err(SchedulerError::Tick { .. })));
        assert_eq!(handler.finalized, 0);
    }
}
