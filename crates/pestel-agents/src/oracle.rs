//! The decision oracle boundary.
//!
//! An oracle answers two questions: should this agent act today, and does a
//! given decision change anything in a given category. The simulation core
//! treats every oracle identically through [`DecisionOracle`]; the AI-backed
//! implementation lives in a separate crate and the deterministic
//! [`RuleEngine`](crate::rule_engine::RuleEngine) lives here.
//!
//! Calls are synchronous with an explicit deadline. Implementations that talk
//! to a network bridge to async internally and must return
//! [`OracleError::Timeout`] rather than block past the deadline.

use std::collections::BTreeMap;
use std::time::Duration;

use pestel_types::{
    AgentId, AgentKind, Category, Decision, DecisionType, FactorMap, FactorValue,
};
use serde::Serialize;

use crate::agent::AgentTraits;

/// Errors an oracle may report. None of them ever aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The backend could not be reached or failed.
    #[error("oracle unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The backend did not answer before the deadline.
    #[error("oracle timed out after {deadline_ms}ms")]
    Timeout {
        /// The deadline that was exceeded, in milliseconds.
        deadline_ms: u64,
    },

    /// The backend answered with text that does not follow the protocol.
    #[error("malformed oracle response: {message}")]
    Malformed {
        /// Description of what failed to parse.
        message: String,
    },
}

/// An oracle's answer to "should this agent act today".
#[derive(Debug, Clone, PartialEq)]
pub enum OracleVerdict {
    /// The agent stays idle.
    NoAction,
    /// The agent acts.
    Act {
        /// Free-text description of the move.
        description: String,
        /// Decision type tag.
        decision_type: DecisionType,
        /// Confidence; clamped when the decision is built.
        confidence: f64,
    },
}

/// A proposed write to one factor of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactProposal {
    /// Factor name within the requested category.
    pub factor: String,
    /// Proposed new value.
    pub value: FactorValue,
    /// Short justification.
    pub reason: String,
}

/// An oracle's answer to "does this decision change this category".
#[derive(Debug, Clone, PartialEq)]
pub enum ImpactVerdict {
    /// Nothing in the category changes.
    NoImpact,
    /// One factor changes.
    Change(ImpactProposal),
}

/// A compact view of one past action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSummary {
    /// Acting agent.
    pub agent_id: AgentId,
    /// Day the action was taken.
    pub day: u64,
    /// Free-text description.
    pub description: String,
    /// Decision type tag.
    pub decision_type: DecisionType,
}

impl From<&Decision> for ActionSummary {
    fn from(decision: &Decision) -> Self {
        Self {
            agent_id: decision.agent_id().clone(),
            day: decision.day(),
            description: decision.description().to_owned(),
            decision_type: decision.decision_type(),
        }
    }
}

/// One global factor copied into an agent's decision context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextFactor {
    /// Category of the factor.
    pub category: Category,
    /// Factor name.
    pub factor: String,
    /// Current global value.
    pub value: FactorValue,
}

/// Everything an oracle sees when asked whether an agent should act.
#[derive(Debug, Clone, Serialize)]
pub struct AgentContext {
    /// The deciding agent.
    pub agent_id: AgentId,
    /// Its kind.
    pub kind: AgentKind,
    /// Profile summary for prompts.
    pub description: String,
    /// Current simulated day.
    pub day: u64,
    /// Decisions taken so far.
    pub decision_count: u64,
    /// Kind-specific numeric attributes.
    pub attributes: BTreeMap<String, f64>,
    /// Structural traits (industry, region, fields, ...).
    pub traits: AgentTraits,
    /// Global factors relevant to this agent kind.
    pub relevant_state: Vec<ContextFactor>,
    /// Most recent actions by other agents.
    pub recent_by_others: Vec<ActionSummary>,
    /// This agent's own actions inside the activity window.
    pub own_recent: Vec<ActionSummary>,
}

impl AgentContext {
    /// Numeric attribute, `0.0` when absent.
    pub fn attribute(&self, name: &str) -> f64 {
        self.attributes.get(name).copied().unwrap_or(0.0)
    }
}

/// Everything an oracle sees when asked for the impact of a decision.
#[derive(Debug, Clone, Serialize)]
pub struct ImpactRequest {
    /// The decision being applied.
    pub decision: ImpactDecision,
    /// Acting agent.
    pub agent_id: AgentId,
    /// Acting agent's kind.
    pub kind: AgentKind,
    /// Category under analysis.
    pub category: Category,
    /// Current global factors of that category.
    pub category_state: FactorMap,
}

/// The parts of a [`Decision`] an impact analysis looks at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactDecision {
    /// Free-text description.
    pub description: String,
    /// Decision type tag.
    pub decision_type: DecisionType,
    /// Decision confidence.
    pub confidence: f64,
}

impl From<&Decision> for ImpactDecision {
    fn from(decision: &Decision) -> Self {
        Self {
            description: decision.description().to_owned(),
            decision_type: decision.decision_type(),
            confidence: decision.confidence(),
        }
    }
}

/// A source of agent decisions and impact analyses.
pub trait DecisionOracle {
    /// Short name for logs and the run report.
    fn name(&self) -> &str;

    /// Decide whether the agent described by `context` acts today.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] when no verdict can be produced in time.
    fn decide(
        &mut self,
        context: &AgentContext,
        timeout: Duration,
    ) -> Result<OracleVerdict, OracleError>;

    /// Propose at most one factor change for the requested category.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] when no verdict can be produced in time.
    fn impact_for(
        &mut self,
        request: &ImpactRequest,
        timeout: Duration,
    ) -> Result<ImpactVerdict, OracleError>;
}
