//! Simulated time.
//!
//! Time is measured in whole days. The clock only ever moves forward: the
//! scheduler sets it to each dispatched event's time, and an attempt to move
//! it backwards means the event queue broke its ordering guarantee.

/// Errors raised by clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The requested time is earlier than the current time.
    #[error("clock cannot move backwards from day {now} to day {requested}")]
    TimeReversal {
        /// Current time.
        now: u64,
        /// Rejected target time.
        requested: u64,
    },
}

/// The simulation clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationClock {
    now: u64,
}

impl SimulationClock {
    /// A clock at day 0.
    pub const fn new() -> Self {
        Self { now: 0 }
    }

    /// Current simulated day.
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Move the clock to `time`. Staying at the same time is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TimeReversal`] if `time` is before [`Self::now`].
    pub const fn advance_to(&mut self, time: u64) -> Result<(), ClockError> {
        if time < self.now {
            return Err(ClockError::TimeReversal {
                now: self.now,
                requested: time,
            });
        }
        self.now = time;
        Ok(())
    }
}
