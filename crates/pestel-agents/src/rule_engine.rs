//! Deterministic fallback oracle.
//!
//! Answers the same two questions as an AI-backed oracle without any I/O.
//! Whether an agent acts and what it picks are drawn from the engine's own
//! seeded RNG. Impacts are a pure keyword table lookup: for each category
//! the first matching rule wins and its value is a fixed phrase prefixed by
//! the acting agent's name, so applying the same decision twice is a no-op.

use std::time::Duration;

use pestel_types::{AgentKind, Category, DecisionType, mentions_any};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::oracle::{
    AgentContext, DecisionOracle, ImpactProposal, ImpactRequest, ImpactVerdict, OracleError,
    OracleVerdict,
};

// ---------------------------------------------------------------------------
// Decision tuning
// ---------------------------------------------------------------------------

/// Action probability before the kind bonus.
const BASE_ACTION_PROBABILITY: f64 = 0.3;

/// Upper bound on the action probability.
const MAX_ACTION_PROBABILITY: f64 = 0.8;

/// Own actions in the activity window above which the agent slows down.
const BUSY_ACTION_COUNT: usize = 2;

/// Probability multiplier applied to busy agents.
const BUSY_DAMPING: f64 = 0.7;

/// Lowest confidence the engine assigns.
const MIN_CONFIDENCE: f64 = 0.6;

/// Width of the confidence band above [`MIN_CONFIDENCE`].
const CONFIDENCE_SPREAD: f64 = 0.3;

const TECHNOLOGY_COMPANY_ACTIONS: &[&str] = &[
    "Launch AI-powered product innovation initiative",
    "Expand quantum computing research partnerships",
    "Implement advanced cybersecurity infrastructure",
    "Develop sustainable technology solutions",
];

const ENERGY_COMPANY_ACTIONS: &[&str] = &[
    "Accelerate renewable energy portfolio expansion",
    "Invest in carbon capture and storage technology",
    "Develop green hydrogen production facilities",
    "Launch energy efficiency optimization program",
];

const HEALTHCARE_COMPANY_ACTIONS: &[&str] = &[
    "Expand precision medicine research programs",
    "Develop AI-assisted diagnostic tools",
    "Launch global health access initiatives",
    "Invest in biotechnology innovation",
];

const GENERIC_COMPANY_ACTIONS: &[&str] = &[
    "Launch sustainability transformation initiative",
    "Expand international market presence",
    "Implement advanced analytics and automation",
    "Develop strategic partnerships for growth",
];

const COUNTRY_ACTIONS: &[&str] = &[
    "Launch national digital transformation program",
    "Strengthen international cooperation agreements",
    "Implement comprehensive climate action plan",
    "Expand education and research investment",
    "Develop advanced infrastructure projects",
];

const TECHNOLOGY_RESEARCH_ACTIONS: &[&str] = &[
    "Establish AI ethics and safety research center",
    "Launch quantum computing breakthrough program",
    "Develop human-AI collaboration frameworks",
    "Create technology transfer innovation hub",
];

const GENERAL_RESEARCH_ACTIONS: &[&str] = &[
    "Launch interdisciplinary research collaboration",
    "Establish international research partnership",
    "Develop innovation commercialization program",
    "Create graduate fellowship excellence program",
];

// ---------------------------------------------------------------------------
// Impact rules
// ---------------------------------------------------------------------------

/// One row of the impact table.
struct ImpactRule {
    category: Category,
    /// Only agents of this kind trigger the rule.
    scope: Option<AgentKind>,
    keywords: &'static [&'static str],
    factor: &'static str,
    phrase: &'static str,
    reason: &'static str,
}

/// Checked top to bottom; the first match per category wins.
const IMPACT_RULES: &[ImpactRule] = &[
    ImpactRule {
        category: Category::Political,
        scope: Some(AgentKind::Country),
        keywords: &["cooperation", "alliance"],
        factor: "international_relations",
        phrase: "strengthens diplomatic cooperation through strategic partnerships",
        reason: "International cooperation initiative",
    },
    ImpactRule {
        category: Category::Political,
        scope: Some(AgentKind::Country),
        keywords: &["regulation", "policy"],
        factor: "regulatory_environment",
        phrase: "enhances regulatory framework for innovation",
        reason: "Policy reform initiative",
    },
    ImpactRule {
        category: Category::Economic,
        scope: Some(AgentKind::Company),
        keywords: &["investment", "expansion", "invest", "expand"],
        factor: "investment_climate",
        phrase: "drives economic growth through strategic investment",
        reason: "Major corporate investment",
    },
    ImpactRule {
        category: Category::Economic,
        scope: Some(AgentKind::Company),
        keywords: &["market", "global"],
        factor: "market_dynamics",
        phrase: "transforms market dynamics through innovation",
        reason: "Market expansion strategy",
    },
    ImpactRule {
        category: Category::Social,
        scope: None,
        keywords: &["education", "training", "development"],
        factor: "social_development",
        phrase: "promotes social progress through education and workforce development",
        reason: "Human development initiative",
    },
    ImpactRule {
        category: Category::Social,
        scope: None,
        keywords: &["health"],
        factor: "health_consciousness",
        phrase: "advances public health through healthcare innovation",
        reason: "Health improvement initiative",
    },
    ImpactRule {
        category: Category::Technological,
        scope: None,
        keywords: &["ai", "technology", "innovation"],
        factor: "innovation_ecosystem",
        phrase: "advances global innovation through breakthrough technology development",
        reason: "Technology leadership",
    },
    ImpactRule {
        category: Category::Technological,
        scope: None,
        keywords: &["research", "development"],
        factor: "rd_activity",
        phrase: "enhances R&D capabilities through strategic research investment",
        reason: "Research investment",
    },
    ImpactRule {
        category: Category::Environmental,
        scope: None,
        keywords: &["climate", "sustainability", "renewable"],
        factor: "climate_leadership",
        phrase: "demonstrates environmental leadership through comprehensive sustainability initiatives",
        reason: "Climate action commitment",
    },
    ImpactRule {
        category: Category::Environmental,
        scope: None,
        keywords: &["green", "environment"],
        factor: "environmental_regulations",
        phrase: "strengthens environmental standards through green initiatives",
        reason: "Environmental protection",
    },
    ImpactRule {
        category: Category::Legal,
        scope: None,
        keywords: &["regulation", "compliance", "governance"],
        factor: "regulatory_framework",
        phrase: "strengthens regulatory framework through governance innovation",
        reason: "Regulatory improvement",
    },
    ImpactRule {
        category: Category::Legal,
        scope: None,
        keywords: &["intellectual property", "patent"],
        factor: "intellectual_property",
        phrase: "enhances IP protection through innovation incentives",
        reason: "IP development",
    },
];

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The deterministic oracle.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rng: StdRng,
}

impl RuleEngine {
    /// Create an engine with its own RNG seeded from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Probability that the agent described by `context` acts today.
    pub fn action_probability(context: &AgentContext) -> f64 {
        let bonus = match context.kind {
            AgentKind::Company => context.attribute("market_influence") * 0.2,
            AgentKind::Country => context.attribute("geopolitical_influence") * 0.15,
            AgentKind::Researcher => context.attribute("research_impact") * 0.1,
        };
        let mut probability = BASE_ACTION_PROBABILITY + bonus;
        if context.own_recent.len() > BUSY_ACTION_COUNT {
            probability *= BUSY_DAMPING;
        }
        probability.min(MAX_ACTION_PROBABILITY)
    }

    /// Draw today's verdict for `context`.
    pub fn verdict(&mut self, context: &AgentContext) -> OracleVerdict {
        let probability = Self::action_probability(context);
        if self.rng.random::<f64>() > probability {
            return OracleVerdict::NoAction;
        }
        let options = candidate_actions(context);
        let pick = self.rng.random_range(0..options.len());
        let Some(description) = options.get(pick) else {
            return OracleVerdict::NoAction;
        };
        let confidence = self
            .rng
            .random::<f64>()
            .mul_add(CONFIDENCE_SPREAD, MIN_CONFIDENCE);
        OracleVerdict::Act {
            description: (*description).to_owned(),
            decision_type: DecisionType::classify(description),
            confidence,
        }
    }

    /// Look up the impact of a decision on one category. Pure.
    pub fn impact(request: &ImpactRequest) -> ImpactVerdict {
        let description = request.decision.description.as_str();
        IMPACT_RULES
            .iter()
            .filter(|rule| rule.category == request.category)
            .filter(|rule| rule.scope.is_none_or(|kind| kind == request.kind))
            .find(|rule| mentions_any(description, rule.keywords))
            .map_or(ImpactVerdict::NoImpact, |rule| {
                ImpactVerdict::Change(ImpactProposal {
                    factor: rule.factor.to_owned(),
                    value: format!("{} {}", request.agent_id, rule.phrase).into(),
                    reason: rule.reason.to_owned(),
                })
            })
    }
}

/// Action list for the agent's kind and specialisation.
fn candidate_actions(context: &AgentContext) -> &'static [&'static str] {
    match context.kind {
        AgentKind::Company => {
            let industry = context.traits.industry.as_deref().unwrap_or_default();
            if mentions_any(industry, &["technology"]) {
                TECHNOLOGY_COMPANY_ACTIONS
            } else if mentions_any(industry, &["energy"]) {
                ENERGY_COMPANY_ACTIONS
            } else if mentions_any(industry, &["healthcare", "pharmaceutical"]) {
                HEALTHCARE_COMPANY_ACTIONS
            } else {
                GENERIC_COMPANY_ACTIONS
            }
        }
        AgentKind::Country => COUNTRY_ACTIONS,
        AgentKind::Researcher => {
            let technical = context.traits.fields.iter().any(|field| {
                mentions_any(
                    field,
                    &["ai", "artificial intelligence", "technology", "computer"],
                )
            });
            if technical {
                TECHNOLOGY_RESEARCH_ACTIONS
            } else {
                GENERAL_RESEARCH_ACTIONS
            }
        }
    }
}

impl DecisionOracle for RuleEngine {
    fn name(&self) -> &str {
        "rule_engine"
    }

    fn decide(
        &mut self,
        context: &AgentContext,
        _timeout: Duration,
    ) -> Result<OracleVerdict, OracleError> {
        Ok(self.verdict(context))
    }

    fn impact_for(
        &mut self,
        request: &ImpactRequest,
        _timeout: Duration,
    ) -> Result<ImpactVerdict, OracleError> {
        Ok(Self::impact(request))
    }
}
