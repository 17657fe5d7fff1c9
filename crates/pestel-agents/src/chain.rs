//! Primary oracle with deterministic fallback.
//!
//! The chain is what agents actually talk to. A primary oracle that is
//! unreachable or too slow is replaced by the [`RuleEngine`] for that one
//! call; a primary that answers with garbage is taken at its word as "no
//! action". Either way the run continues. Every outcome is counted in
//! [`OracleStats`] for the run report.

use std::time::Duration;

use pestel_types::{AgentId, DecisionOrigin};
use serde::Serialize;
use tracing::warn;

use crate::oracle::{
    AgentContext, DecisionOracle, ImpactRequest, ImpactVerdict, OracleError, OracleVerdict,
};
use crate::rule_engine::RuleEngine;

/// A verdict tagged with who produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer<T> {
    /// The verdict.
    pub verdict: T,
    /// Primary oracle or fallback.
    pub origin: DecisionOrigin,
}

/// Per-run oracle outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OracleStats {
    /// Calls answered by the primary oracle.
    pub primary_ok: u64,
    /// Calls answered by the rule engine (including runs with no primary).
    pub fallbacks: u64,
    /// Primary calls that hit the deadline.
    pub timeouts: u64,
    /// Primary answers that did not follow the protocol.
    pub malformed: u64,
}

/// What to do with a failed primary call.
enum Recovery {
    Fallback,
    Empty,
}

/// An optional primary oracle backed by the rule engine.
pub struct OracleChain {
    primary: Option<Box<dyn DecisionOracle + Send>>,
    fallback: RuleEngine,
    stats: OracleStats,
}

impl core::fmt::Debug for OracleChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OracleChain")
            .field("primary", &self.primary_name())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl OracleChain {
    /// Chain a primary oracle in front of `fallback`.
    pub fn new(primary: Box<dyn DecisionOracle + Send>, fallback: RuleEngine) -> Self {
        Self {
            primary: Some(primary),
            fallback,
            stats: OracleStats::default(),
        }
    }

    /// A chain that is only the deterministic rule engine.
    pub fn fallback_only(seed: u64) -> Self {
        Self {
            primary: None,
            fallback: RuleEngine::new(seed),
            stats: OracleStats::default(),
        }
    }

    /// Name of the primary oracle, or of the rule engine when there is none.
    pub fn primary_name(&self) -> &str {
        self.primary
            .as_deref()
            .map_or_else(|| self.fallback.name(), |p| p.name())
    }

    /// Outcome counters so far.
    pub const fn stats(&self) -> &OracleStats {
        &self.stats
    }

    /// Decide for one agent.
    pub fn decide(&mut self, context: &AgentContext, timeout: Duration) -> Answer<OracleVerdict> {
        let Some(primary) = self.primary.as_deref_mut() else {
            return self.fallback_decide(context);
        };
        let result = primary.decide(context, timeout);
        match result {
            Ok(verdict) => {
                self.stats.primary_ok = self.stats.primary_ok.saturating_add(1);
                Answer {
                    verdict,
                    origin: DecisionOrigin::Oracle,
                }
            }
            Err(error) => match self.recover(&error, &context.agent_id, "decide") {
                Recovery::Fallback => self.fallback_decide(context),
                Recovery::Empty => Answer {
                    verdict: OracleVerdict::NoAction,
                    origin: DecisionOrigin::Oracle,
                },
            },
        }
    }

    /// Ask for the impact of one decision on one category.
    pub fn impact_for(
        &mut self,
        request: &ImpactRequest,
        timeout: Duration,
    ) -> Answer<ImpactVerdict> {
        let Some(primary) = self.primary.as_deref_mut() else {
            return self.fallback_impact(request);
        };
        let result = primary.impact_for(request, timeout);
        match result {
            Ok(verdict) => {
                self.stats.primary_ok = self.stats.primary_ok.saturating_add(1);
                Answer {
                    verdict,
                    origin: DecisionOrigin::Oracle,
                }
            }
            Err(error) => match self.recover(&error, &request.agent_id, "impact") {
                Recovery::Fallback => self.fallback_impact(request),
                Recovery::Empty => Answer {
                    verdict: ImpactVerdict::NoImpact,
                    origin: DecisionOrigin::Oracle,
                },
            },
        }
    }

    fn fallback_decide(&mut self, context: &AgentContext) -> Answer<OracleVerdict> {
        self.stats.fallbacks = self.stats.fallbacks.saturating_add(1);
        Answer {
            verdict: self.fallback.verdict(context),
            origin: DecisionOrigin::Fallback,
        }
    }

    fn fallback_impact(&mut self, request: &ImpactRequest) -> Answer<ImpactVerdict> {
        self.stats.fallbacks = self.stats.fallbacks.saturating_add(1);
        Answer {
            verdict: RuleEngine::impact(request),
            origin: DecisionOrigin::Fallback,
        }
    }

    fn recover(&mut self, error: &OracleError, agent: &AgentId, call: &'static str) -> Recovery {
        let oracle = self.primary_name().to_owned();
        match error {
            OracleError::Malformed { .. } => {
                self.stats.malformed = self.stats.malformed.saturating_add(1);
                warn!(
                    %agent,
                    oracle = %oracle,
                    call,
                    error = %error,
                    "malformed oracle response, treating as no-op"
                );
                Recovery::Empty
            }
            OracleError::Timeout { deadline_ms } => {
                self.stats.timeouts = self.stats.timeouts.saturating_add(1);
                warn!(
                    %agent,
                    oracle = %oracle,
                    call,
                    deadline_ms,
                    "oracle timed out, using rule engine"
                );
                Recovery::Fallback
            }
            OracleError::Unavailable { .. } => {
                warn!(
                    %agent,
                    oracle = %oracle,
                    call,
                    error = %error,
                    "oracle unavailable, using rule engine"
                );
                Recovery::Fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pestel_types::{AgentKind, Category, DecisionType, FactorMap};

    use super::*;
    use crate::agent::AgentTraits;
    use crate::oracle::ImpactDecision;

    /// Replays a fixed decide result and never proposes impacts.
    struct Scripted {
        decide: Result<OracleVerdict, OracleError>,
    }

    impl DecisionOracle for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn decide(
            &mut self,
            _context: &AgentContext,
            _timeout: Duration,
        ) -> Result<OracleVerdict, OracleError> {
            self.decide.clone()
        }

        fn impact_for(
            &mut self,
            _request: &ImpactRequest,
            timeout: Duration,
        ) -> Result<ImpactVerdict, OracleError> {
            Err(OracleError::Timeout {
                deadline_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }

    fn context() -> AgentContext {
        let mut attributes = BTreeMap::new();
        attributes.insert("market_influence".to_owned(), 1.0);
        AgentContext {
            agent_id: AgentId::new("Apple"),
            kind: AgentKind::Company,
            description: String::new(),
            day: 1,
            decision_count: 0,
            attributes,
            traits: AgentTraits::bare(AgentKind::Company),
            relevant_state: Vec::new(),
            recent_by_others: Vec::new(),
            own_recent: Vec::new(),
        }
    }

    fn chain(decide: Result<OracleVerdict, OracleError>) -> OracleChain {
        OracleChain::new(Box::new(Scripted { decide }), RuleEngine::new(1))
    }

    #[test]
    fn primary_no_action_is_respected() {
        let mut chain = chain(Ok(OracleVerdict::NoAction));
        let answer = chain.decide(&context(), Duration::from_secs(1));
        assert_eq!(answer.verdict, OracleVerdict::NoAction);
        assert_eq!(answer.origin, DecisionOrigin::Oracle);
        assert_eq!(chain.stats().primary_ok, 1);
        assert_eq!(chain.stats().fallbacks, 0);
    }

    #[test]
    fn unavailable_falls_back() {
        let mut chain = chain(Err(OracleError::Unavailable {
            message: "connection refused".to_owned(),
        }));
        let answer = chain.decide(&context(), Duration::from_secs(1));
        assert_eq!(answer.origin, DecisionOrigin::Fallback);
        assert_eq!(chain.stats().fallbacks, 1);
    }

    #[test]
    fn malformed_is_treated_as_no_action() {
        let mut chain = chain(Err(OracleError::Malformed {
            message: "no ACTION line".to_owned(),
        }));
        let answer = chain.decide(&context(), Duration::from_secs(1));
        assert_eq!(answer.verdict, OracleVerdict::NoAction);
        assert_eq!(answer.origin, DecisionOrigin::Oracle);
        assert_eq!(chain.stats().malformed, 1);
        assert_eq!(chain.stats().fallbacks, 0);
    }

    #[test]
    fn impact_timeout_uses_rule_table() {
        let mut chain = chain(Ok(OracleVerdict::NoAction));
        let request = ImpactRequest {
            decision: ImpactDecision {
                description: "Launch AI-powered product innovation initiative".to_owned(),
                decision_type: DecisionType::Development,
                confidence: 0.7,
            },
            agent_id: AgentId::new("Apple"),
            kind: AgentKind::Company,
            category: Category::Technological,
            category_state: FactorMap::new(),
        };
        let answer = chain.impact_for(&request, Duration::from_millis(50));
        assert_eq!(answer.origin, DecisionOrigin::Fallback);
        assert!(matches!(answer.verdict, ImpactVerdict::Change(_)));
        assert_eq!(chain.stats().timeouts, 1);
    }

    #[test]
    fn fallback_only_chain_is_deterministic() {
        let mut a = OracleChain::fallback_only(5);
        let mut b = OracleChain::fallback_only(5);
        for _ in 0..20 {
            assert_eq!(
                a.decide(&context(), Duration::ZERO),
                b.decide(&context(), Duration::ZERO)
            );
        }
        assert_eq!(a.primary_name(), "rule_engine");
    }
}
