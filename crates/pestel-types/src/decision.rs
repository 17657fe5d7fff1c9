//! Agent decisions.
//!
//! A [`Decision`] is produced by an agent's decide step, consumed by impact
//! application and influence propagation, then appended to the recent-action
//! window. It is immutable once shared: the `with_*` builders consume the
//! value and are only used while it is being assembled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{DecisionOrigin, DecisionType};
use crate::ids::AgentId;
use crate::text::mentions;

/// Metadata value reported for keys that were never set.
pub const UNKNOWN_METADATA: &str = "unknown";

/// Verb pairs whose presence on opposite sides marks two decisions as
/// conflicting.
const OPPOSING_VERBS: [(&str, &str); 3] = [
    ("invest", "divest"),
    ("expand", "contract"),
    ("collaborate", "compete"),
];

/// A single agent decision for one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    agent_id: AgentId,
    day: u64,
    description: String,
    decision_type: DecisionType,
    confidence: f64,
    expected_impact: Option<f64>,
    parameters: BTreeMap<String, f64>,
    metadata: BTreeMap<String, String>,
    origin: DecisionOrigin,
}

impl Decision {
    /// Create a decision. `confidence` is clamped into `[0, 1]`; NaN becomes 0.
    pub fn new(
        agent_id: AgentId,
        day: u64,
        description: impl Into<String>,
        decision_type: DecisionType,
        confidence: f64,
        origin: DecisionOrigin,
    ) -> Self {
        Self {
            agent_id,
            day,
            description: description.into(),
            decision_type,
            confidence: clamp_unit(confidence),
            expected_impact: None,
            parameters: BTreeMap::new(),
            metadata: BTreeMap::new(),
            origin,
        }
    }

    /// Attach a signed expected impact (positive = growth).
    #[must_use]
    pub const fn with_expected_impact(mut self, impact: f64) -> Self {
        self.expected_impact = Some(impact);
        self
    }

    /// Attach a numeric parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The deciding agent.
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Simulated day the decision was taken on.
    pub const fn day(&self) -> u64 {
        self.day
    }

    /// Free-text description of the move.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Decision type tag.
    pub const fn decision_type(&self) -> DecisionType {
        self.decision_type
    }

    /// Confidence in `[0, 1]`.
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Signed expected impact, if one was attached.
    pub const fn expected_impact(&self) -> Option<f64> {
        self.expected_impact
    }

    /// Whether the oracle or the rule engine produced this decision.
    pub const fn origin(&self) -> DecisionOrigin {
        self.origin
    }

    /// Numeric parameter, `0.0` when absent.
    pub fn parameter(&self, key: &str) -> f64 {
        self.parameters.get(key).copied().unwrap_or(0.0)
    }

    /// Metadata entry, `"unknown"` when absent.
    pub fn metadata(&self, key: &str) -> &str {
        self.metadata
            .get(key)
            .map_or(UNKNOWN_METADATA, String::as_str)
    }

    /// `confidence * |expected_impact|`. Reporting only.
    pub fn strength(&self) -> f64 {
        self.confidence * self.expected_impact.map_or(0.0, f64::abs)
    }

    /// Return `true` if the two decisions pull in opposite directions.
    ///
    /// Either the same type with opposite-signed expected impacts, or
    /// descriptions on opposite sides of an opposing verb pair.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        if self.decision_type == other.decision_type
            && let (Some(a), Some(b)) = (self.expected_impact, other.expected_impact)
            && a.signum() * b.signum() < 0.0
        {
            return true;
        }
        OPPOSING_VERBS.iter().any(|(left, right)| {
            (mentions(&self.description, left) && mentions(&other.description, right))
                || (mentions(&self.description, right) && mentions(&other.description, left))
        })
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(description: &str, kind: DecisionType, confidence: f64) -> Decision {
        Decision::new(
            AgentId::new("Tesla"),
            3,
            description,
            kind,
            confidence,
            DecisionOrigin::Fallback,
        )
    }

    #[test]
    fn confidence_is_clamped() {
        let confidence = |raw| decision("x", DecisionType::Strategic, raw).confidence();
        assert!((confidence(1.7) - 1.0).abs() < f64::EPSILON);
        assert!(confidence(-0.2).abs() < f64::EPSILON);
        assert!(confidence(f64::NAN).abs() < f64::EPSILON);
    }

    #[test]
    fn defaults_for_missing_parameters_and_metadata() {
        let d = decision("x", DecisionType::Strategic, 0.5).with_metadata("region", "EU");
        assert!(d.parameter("budget").abs() < f64::EPSILON);
        assert_eq!(d.metadata("region"), "EU");
        assert_eq!(d.metadata("sector"), UNKNOWN_METADATA);
    }

    #[test]
    fn strength_uses_absolute_impact() {
        let d = decision("x", DecisionType::Investment, 0.5).with_expected_impact(-0.8);
        assert!((d.strength() - 0.4).abs() < 1e-9);
        let none = decision("x", DecisionType::Investment, 0.5);
        assert!(none.strength().abs() < f64::EPSILON);
    }

    #[test]
    fn opposite_impacts_conflict() {
        let a = decision("grow", DecisionType::Investment, 0.5).with_expected_impact(0.3);
        let b = decision("shrink", DecisionType::Investment, 0.5).with_expected_impact(-0.3);
        assert!(a.conflicts_with(&b));
    }

    #[test]
    fn opposing_verbs_conflict() {
        let a = decision("Invest in Asian markets", DecisionType::Investment, 0.5);
        let b = decision("Divest Asian holdings", DecisionType::Strategic, 0.5);
        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
        let c = decision("Launch new product", DecisionType::Development, 0.5);
        assert!(!a.conflicts_with(&c));
    }
}
