//! Simulation loop runner.
//!
//! [`run_simulation`] wires the day handler into the [`Scheduler`]:
//!
//! - each `DayTick` runs [`run_day`] and schedules the next day while days
//!   remain
//! - `ScenarioRescore` rescores scenarios on demand
//! - anything else is reported as ignored
//! - after every event, union coordination runs when due
//!
//! The run stops early on a [`RunControl`] stop request, always after the
//! current day. Either way it returns a complete [`SimulationReport`].
//!
//! The runner is synchronous. Oracles that need async I/O bridge to a
//! runtime internally, so state writes stay on this thread in roster order.

use std::sync::Arc;

use chrono::Utc;
use pestel_agents::OracleChain;
use tracing::{info, warn};

use crate::context::SimulationContext;
use crate::control::RunControl;
use crate::event::{Event, EventKind, EventQueue, QueueError};
use crate::report::{RunOutcome, SimulationReport};
use crate::scheduler::{Dispatch, EventHandler, Scheduler, SchedulerError};
use crate::tick::{self, DaySummary, TickError};
use crate::unions;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The scheduler halted on an invariant violation.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: SchedulerError,
    },
}

/// Callback invoked after each day completes.
pub trait DayCallback: Send {
    /// Called after a day completes successfully.
    fn on_day(&mut self, summary: &DaySummary, ctx: &SimulationContext);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl DayCallback for NoOpCallback {
    fn on_day(&mut self, _summary: &DaySummary, _ctx: &SimulationContext) {}
}

/// Dispatches scheduler events onto a context.
struct DayHandler<'a> {
    ctx: &'a mut SimulationContext,
    oracle: &'a mut OracleChain,
    callback: &'a mut dyn DayCallback,
    days: u64,
    days_run: u64,
    last_coordination: Option<u64>,
}

impl EventHandler for DayHandler<'_> {
    fn initialize(&mut self, queue: &mut EventQueue) -> Result<(), QueueError> {
        queue.schedule(1, EventKind::DayTick { day: 1 })?;
        Ok(())
    }

    fn handle(&mut self, event: &Event, queue: &mut EventQueue) -> Result<Dispatch, TickError> {
        match &event.kind {
            EventKind::DayTick { day } => {
                let summary = tick::run_day(self.ctx, self.oracle, *day)?;
                self.days_run = self.days_run.saturating_add(1);
                self.callback.on_day(&summary, self.ctx);
                if *day < self.days {
                    let next = day.saturating_add(1);
                    queue.schedule(next, EventKind::DayTick { day: next })?;
                }
                Ok(Dispatch::Handled)
            }
            EventKind::ScenarioRescore => {
                tick::rescore(self.ctx, event.time);
                Ok(Dispatch::Handled)
            }
            EventKind::External { .. } => Ok(Dispatch::Ignored),
        }
    }

    fn check_conditional(&mut self, now: u64) {
        let interval = self.ctx.config().unions.coordination_interval_days;
        if unions::is_due(now, interval) && self.last_coordination != Some(now) {
            unions::coordinate(self.ctx, now);
            self.last_coordination = Some(now);
        }
    }

    fn finalize(&mut self) {
        info!(days_run = self.days_run, "Simulation finalized");
    }
}

/// Run the simulation for `simulation_days` days.
///
/// # Errors
///
/// Returns [`RunnerError`] if the scheduler halts on an invariant violation.
pub fn run_simulation(
    ctx: &mut SimulationContext,
    oracle: &mut OracleChain,
    control: &Arc<RunControl>,
    callback: &mut dyn DayCallback,
) -> Result<SimulationReport, RunnerError> {
    let scheduler = Scheduler::new(ctx.config().run.simulation_days);
    run_scheduled(scheduler, ctx, oracle, control, callback)
}

/// Run with a caller-prepared scheduler, for example one with extra events
/// already queued.
///
/// # Errors
///
/// Returns [`RunnerError`] if the scheduler halts on an invariant violation.
pub fn run_scheduled(
    mut scheduler: Scheduler,
    ctx: &mut SimulationContext,
    oracle: &mut OracleChain,
    control: &Arc<RunControl>,
    callback: &mut dyn DayCallback,
) -> Result<SimulationReport, RunnerError> {
    let started_at = Utc::now();
    let days = ctx.config().run.simulation_days;
    info!(
        run_id = %ctx.run_id(),
        run_name = %ctx.config().run.name,
        seed = ctx.config().run.seed,
        simulation_days = days,
        agents = ctx.agents.len(),
        oracle = oracle.primary_name(),
        "Simulation starting"
    );

    let mut handler = DayHandler {
        ctx,
        oracle,
        callback,
        days,
        days_run: 0,
        last_coordination: None,
    };
    let end_reason = scheduler.run(&mut handler, control)?;
    let days_run = handler.days_run;
    let (ctx, oracle) = (handler.ctx, handler.oracle);

    let report = SimulationReport::build(
        ctx,
        oracle,
        RunOutcome {
            started_at,
            finished_at: Utc::now(),
            days_run,
            end_reason,
            scheduler: *scheduler.stats(),
        },
    );
    log_simulation_end(&report);
    Ok(report)
}

/// Log the outcome of a finished run.
pub fn log_simulation_end(report: &SimulationReport) {
    info!(
        reason = ?report.end_reason,
        days_run = report.days_run,
        decisions = report.decisions.len(),
        changes = report.changes.len(),
        interactions = report.interactions.len(),
        fallbacks = report.oracle.stats.fallbacks,
        "Simulation ended"
    );

    if report.days_run == 0 {
        warn!("Simulation ended with no days executed");
        return;
    }
    if let Some(dominant) = &report.analysis.dominant {
        info!(dominant = %dominant, "Final dominant scenario");
    }
    for trend in &report.analysis.key_trends {
        info!("Trend: {trend}");
    }
}
