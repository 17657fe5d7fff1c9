//! Audit records for state writes and cross-agent interactions.

use serde::{Deserialize, Serialize};

use crate::enums::Category;
use crate::ids::AgentId;
use crate::state::FactorValue;

/// One global-state write caused by an agent's decision.
///
/// Only constructible through [`StateChange::record`], which refuses to build
/// a record whose old and new values are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    category: Category,
    factor: String,
    old_value: FactorValue,
    new_value: FactorValue,
    reason: String,
    source_agent: AgentId,
    day: u64,
}

impl StateChange {
    /// Build a change record, or `None` if `old_value == new_value`.
    pub fn record(
        category: Category,
        factor: impl Into<String>,
        old_value: FactorValue,
        new_value: FactorValue,
        reason: impl Into<String>,
        source_agent: AgentId,
        day: u64,
    ) -> Option<Self> {
        if old_value == new_value {
            return None;
        }
        Some(Self {
            category,
            factor: factor.into(),
            old_value,
            new_value,
            reason: reason.into(),
            source_agent,
            day,
        })
    }

    /// Category written.
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Factor written.
    pub fn factor(&self) -> &str {
        &self.factor
    }

    /// Value before the write.
    pub const fn old_value(&self) -> &FactorValue {
        &self.old_value
    }

    /// Value after the write.
    pub const fn new_value(&self) -> &FactorValue {
        &self.new_value
    }

    /// Why the acting agent's decision produced this change.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Agent whose decision caused the write.
    pub const fn source_agent(&self) -> &AgentId {
        &self.source_agent
    }

    /// Simulated day of the write.
    pub const fn day(&self) -> u64 {
        self.day
    }
}

impl core::fmt::Display for StateChange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Day {}: {} changed {}.{} from '{}' to '{}' (Reason: {})",
            self.day,
            self.source_agent,
            self.category,
            self.factor,
            self.old_value,
            self.new_value,
            self.reason
        )
    }
}

/// What kind of cross-agent contact an [`Interaction`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// A decision propagated to graph neighbours.
    Influence,
    /// Two agents blended a shared scalar.
    Collaboration,
    /// A country union coordinated its members.
    UnionCoordination,
}

/// A record of one agent (or union) reaching other agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Simulated day.
    pub day: u64,
    /// Initiating agent, or the union name for coordination.
    pub source: AgentId,
    /// Agents reached.
    pub targets: Vec<AgentId>,
    /// Short description of what was exchanged.
    pub description: String,
    /// Interaction kind.
    pub kind: InteractionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_values_produce_no_record() {
        let change = StateChange::record(
            Category::Economic,
            "market_dynamics",
            FactorValue::text("same"),
            FactorValue::text("same"),
            "noop",
            AgentId::new("Apple"),
            1,
        );
        assert!(change.is_none());
    }

    #[test]
    fn display_format() {
        let change = StateChange::record(
            Category::Environmental,
            "climate_leadership",
            FactorValue::Undefined,
            FactorValue::text("Tesla leads"),
            "Climate action commitment",
            AgentId::new("Tesla"),
            4,
        );
        let text = change.map(|c| c.to_string());
        assert_eq!(
            text.as_deref(),
            Some(
                "Day 4: Tesla changed environmental.climate_leadership from 'Not defined' \
                 to 'Tesla leads' (Reason: Climate action commitment)"
            )
        );
    }
}
