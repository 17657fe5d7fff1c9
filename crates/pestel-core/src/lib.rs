//! Simulation core for the PESTEL foresight engine.
//!
//! This crate turns a roster and a configuration into a time-stepped run:
//! a discrete-event scheduler drives one tick per simulated day, each tick
//! runs the agents through the oracle chain against the shared world state,
//! and scenario probabilities are rescored on a fixed cadence.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration ([`SimulationConfig`])
//! - [`clock`] -- Forward-only simulated time
//! - [`event`] -- Events and the `(time, seq)` ordered queue
//! - [`scheduler`] -- The event loop and the [`EventHandler`] seam
//! - [`context`] -- Per-run state ([`SimulationContext`])
//! - [`tick`] -- The six phases of one simulated day
//! - [`history`] -- Windowed and archived records
//! - [`scenario`] -- Scenario scoring and analysis ([`ScenarioEngine`])
//! - [`cluster`] -- Outlook clustering ([`ClusterAnalyzer`])
//! - [`unions`] -- Periodic country union coordination
//! - [`control`] -- Stop flag shared with the process ([`RunControl`])
//! - [`runner`] -- [`run_simulation`] and day callbacks
//! - [`report`] -- The JSON run report ([`SimulationReport`])

pub mod clock;
pub mod cluster;
pub mod config;
pub mod context;
pub mod control;
pub mod event;
pub mod history;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod scheduler;
pub mod tick;
pub mod unions;

pub use clock::{ClockError, SimulationClock};
pub use cluster::{ClusterAnalyzer, ScenarioCluster};
pub use config::{ConfigError, LogFormat, SimulationConfig};
pub use context::SimulationContext;
pub use control::{RunControl, SimulationEndReason};
pub use event::{Event, EventKind, EventQueue, QueueError};
pub use history::History;
pub use report::{ReportError, SimulationReport};
pub use runner::{
    DayCallback, NoOpCallback, RunnerError, log_simulation_end, run_scheduled, run_simulation,
};
pub use scenario::{Scenario, ScenarioAnalysis, ScenarioEngine, ScenarioTransition, ScenarioWeights};
pub use scheduler::{Dispatch, EventHandler, Scheduler, SchedulerError, SchedulerStats};
pub use tick::{DaySummary, TickError, run_day};
