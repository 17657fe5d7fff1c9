//! Day callback that reports run progress.

use pestel_core::{DayCallback, DaySummary, SimulationContext};
use tracing::info;

/// Logs a progress line every `every` days and on the final day.
pub struct ProgressCallback {
    total_days: u64,
    every: u64,
    decisions: usize,
    changes: usize,
}

impl ProgressCallback {
    /// Create a callback for a run of `total_days`.
    pub const fn new(total_days: u64, every: u64) -> Self {
        Self {
            total_days,
            every,
            decisions: 0,
            changes: 0,
        }
    }

    const fn is_due(&self, day: u64) -> bool {
        day == self.total_days || matches!(day.checked_rem(self.every), Some(0))
    }
}

impl DayCallback for ProgressCallback {
    fn on_day(&mut self, summary: &DaySummary, ctx: &SimulationContext) {
        self.decisions = self.decisions.saturating_add(summary.decisions);
        self.changes = self.changes.saturating_add(summary.changes);
        if !self.is_due(summary.day) {
            return;
        }
        let dominant = ctx
            .scenarios
            .dominant()
            .map(|s| format!("{} ({:.1}%)", s.name(), s.probability * 100.0))
            .unwrap_or_default();
        info!(
            day = summary.day,
            total_days = self.total_days,
            decisions = self.decisions,
            changes = self.changes,
            dominant = %dominant,
            "Simulation progress"
        );
    }
}
