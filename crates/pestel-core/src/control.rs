//! Run control shared between the scheduler and the process.
//!
//! The engine binary wraps a [`RunControl`] in an [`Arc`](std::sync::Arc),
//! hands one clone to the Ctrl-C handler and another to the runner. The
//! scheduler polls the stop flag between events, so a stop always lands
//! after the current day has finished.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Every scheduled day ran.
    Completed,
    /// A stop was requested before the last day.
    OperatorStop,
}

/// Shared stop flag.
#[derive(Debug, Default)]
pub struct RunControl {
    stop_requested: AtomicBool,
}

impl RunControl {
    /// A control with no stop requested.
    pub const fn new() -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Ask the run to stop after the current event.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Return `true` once a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn stop_is_visible_across_clones() {
        let control = Arc::new(RunControl::new());
        let handle = Arc::clone(&control);
        assert!(!control.is_stop_requested());
        handle.request_stop();
        assert!(control.is_stop_requested());
    }
}
