//! End-of-run report.
//!
//! The report is a single serde structure written as pretty JSON. It holds
//! the full audit trail (decisions, state changes, interactions), the
//! scenario history, and rankings derived from the history.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use pestel_agents::{OracleChain, OracleStats};
use pestel_types::{AgentId, Decision, Interaction, StateChange, StructuredState};
use serde::Serialize;
use uuid::Uuid;

use crate::cluster::{ClusterAnalyzer, ScenarioCluster};
use crate::context::SimulationContext;
use crate::control::SimulationEndReason;
use crate::scenario::{DominantEntry, ProbabilitySnapshot, ScenarioAnalysis, ScenarioTransition};
use crate::scheduler::SchedulerStats;
use crate::tick::DaySummary;

/// Number of agents listed in each ranking.
pub const RANKING_SIZE: usize = 5;

/// Errors writing the report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Failed to write the report file.
    #[error("failed to write report: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to serialize the report.
    #[error("failed to serialize report: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// An agent and a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRanking {
    /// Agent id.
    pub agent_id: AgentId,
    /// Count being ranked.
    pub count: u64,
}

/// Which oracle answered and how often it fell back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleSummary {
    /// Primary oracle name.
    pub primary: String,
    /// Call counters.
    pub stats: OracleStats,
}

/// Run bookkeeping the runner passes to [`SimulationReport::build`].
#[derive(Debug, Clone, Copy)]
pub struct RunOutcome {
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end.
    pub finished_at: DateTime<Utc>,
    /// Days that completed.
    pub days_run: u64,
    /// Why the run ended.
    pub end_reason: SimulationEndReason,
    /// Scheduler counters.
    pub scheduler: SchedulerStats,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Run id.
    pub run_id: Uuid,
    /// Run name from configuration.
    pub run_name: String,
    /// Seed the run was drawn from.
    pub seed: u64,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end.
    pub finished_at: DateTime<Utc>,
    /// Days that completed.
    pub days_run: u64,
    /// Why the run ended.
    pub end_reason: SimulationEndReason,
    /// Global state at the end of the run.
    pub final_state: StructuredState,
    /// Decisions (full archive, or the last window).
    pub decisions: Vec<Decision>,
    /// State changes (full archive, or the last window).
    pub changes: Vec<StateChange>,
    /// Interactions (full archive, or the last window).
    pub interactions: Vec<Interaction>,
    /// Per-day summaries.
    pub days: Vec<DaySummary>,
    /// Scenario probabilities after each rescore.
    pub probability_history: Vec<ProbabilitySnapshot>,
    /// Dominant scenario after each rescore.
    pub dominant_timeline: Vec<DominantEntry>,
    /// Every recorded scenario transition.
    pub transitions: Vec<ScenarioTransition>,
    /// Final scenario analysis.
    pub analysis: ScenarioAnalysis,
    /// Final outlook clusters.
    pub clusters: Vec<ScenarioCluster>,
    /// Decisions per agent.
    pub decision_counts: BTreeMap<AgentId, u64>,
    /// Agents that initiated the most interactions.
    pub most_influential: Vec<AgentRanking>,
    /// Agents that took the most decisions.
    pub top_decision_makers: Vec<AgentRanking>,
    /// Oracle usage.
    pub oracle: OracleSummary,
    /// Scheduler counters.
    pub scheduler: SchedulerStats,
}

impl SimulationReport {
    /// Assemble the report from a finished context.
    pub fn build(ctx: &SimulationContext, oracle: &OracleChain, outcome: RunOutcome) -> Self {
        let decision_counts = ctx.history.decision_counts();
        let analyzer = ClusterAnalyzer::new(&ctx.config().clusters);
        let clusters = analyzer.analyze(ctx.scenarios.scenarios());
        Self {
            run_id: ctx.run_id(),
            run_name: ctx.config().run.name.clone(),
            seed: ctx.config().run.seed,
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
            days_run: outcome.days_run,
            end_reason: outcome.end_reason,
            final_state: ctx.global.clone(),
            decisions: ctx.history.all_decisions().to_vec(),
            changes: ctx.history.all_changes().to_vec(),
            interactions: ctx.history.all_interactions().to_vec(),
            days: ctx.summaries.clone(),
            probability_history: ctx.scenarios.probability_history().to_vec(),
            dominant_timeline: ctx.scenarios.dominant_timeline().to_vec(),
            transitions: ctx.scenarios.transitions().to_vec(),
            analysis: ctx.scenarios.analysis(),
            clusters,
            most_influential: rank(&ctx.history.influence_counts()),
            top_decision_makers: rank(&decision_counts),
            decision_counts,
            oracle: OracleSummary {
                primary: oracle.primary_name().to_owned(),
                stats: *oracle.stats(),
            },
            scheduler: outcome.scheduler,
        }
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if serialization or the write fails.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Highest counts first, ties by agent id.
fn rank(counts: &BTreeMap<AgentId, u64>) -> Vec<AgentRanking> {
    let mut ranked: Vec<AgentRanking> = counts
        .iter()
        .map(|(agent_id, count)| AgentRanking {
            agent_id: agent_id.clone(),
            count: *count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(RANKING_SIZE);
    ranked
}
