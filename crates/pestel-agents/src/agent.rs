//! The agent capability set and the state every agent kind shares.
//!
//! Each kind (company, country, researcher) is its own struct embedding an
//! [`AgentCore`] and implementing [`Agent`]. The trait's provided methods
//! hold the protocol that is identical across kinds: deciding through the
//! oracle chain, applying impacts to the global state, receiving influence,
//! syncing toward global indicators, collaborating, and absorbing the day's
//! changes. Kinds only supply the hooks that differ.
//!
//! Every agent owns its local [`StructuredState`]. Nothing here ever holds a
//! reference into another agent's state or into the global state beyond the
//! duration of a call.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use pestel_types::{
    AgentId, AgentKind, Category, Decision, DecisionOrigin, FactorUpdate, FactorValue,
    StateChange, StructuredState, mentions,
};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::chain::OracleChain;
use crate::company::CompanyAgent;
use crate::country::CountryAgent;
use crate::oracle::{
    ActionSummary, AgentContext, ContextFactor, ImpactDecision, ImpactRequest, ImpactVerdict,
    OracleVerdict,
};
use crate::profile::{Profile, Roster};
use crate::researcher::ResearcherAgent;

/// Maximum number of own action descriptions an agent remembers.
pub const RECENT_ACTIONS_CAP: usize = 5;

/// Default step size for [`Agent::sync_from_global`].
pub const DEFAULT_SYNC_RATE: f64 = 0.1;

/// Default blend factor for [`Agent::collaborate`].
pub const DEFAULT_COLLABORATION_BLEND: f64 = 0.5;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Structural traits used to build the influence graph and prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentTraits {
    /// Agent kind.
    pub kind: AgentKind,
    /// Company industry.
    pub industry: Option<String>,
    /// Home or host country. For a country, its own name.
    pub country: Option<String>,
    /// Country region.
    pub region: Option<String>,
    /// Researcher fields.
    pub fields: Vec<String>,
}

impl AgentTraits {
    /// Traits with only the kind set.
    pub const fn bare(kind: AgentKind) -> Self {
        Self {
            kind,
            industry: None,
            country: None,
            region: None,
            fields: Vec::new(),
        }
    }
}

/// State common to every agent kind.
#[derive(Debug, Clone)]
pub struct AgentCore {
    id: AgentId,
    kind: AgentKind,
    local: StructuredState,
    attributes: BTreeMap<String, f64>,
    decision_count: u64,
    last_decision_day: Option<u64>,
    recent_actions: VecDeque<String>,
}

impl AgentCore {
    /// Create a core with an empty local state.
    pub fn new(id: AgentId, kind: AgentKind) -> Self {
        Self {
            id,
            kind,
            local: StructuredState::new(),
            attributes: BTreeMap::new(),
            decision_count: 0,
            last_decision_day: None,
            recent_actions: VecDeque::with_capacity(RECENT_ACTIONS_CAP),
        }
    }

    /// Agent id.
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Agent kind.
    pub const fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Read-only view of the local state.
    pub const fn local(&self) -> &StructuredState {
        &self.local
    }

    /// Write one local factor.
    pub fn note(
        &mut self,
        category: Category,
        factor: &str,
        value: impl Into<FactorValue>,
    ) -> FactorUpdate {
        self.local.update(category, factor, value)
    }

    /// All numeric attributes.
    pub const fn attributes(&self) -> &BTreeMap<String, f64> {
        &self.attributes
    }

    /// Numeric attribute, `0.0` when absent.
    pub fn attribute(&self, name: &str) -> f64 {
        self.attributes.get(name).copied().unwrap_or(0.0)
    }

    /// Set a numeric attribute.
    pub fn set_attribute(&mut self, name: &str, value: f64) {
        self.attributes.insert(name.to_owned(), value);
    }

    /// Decisions taken so far.
    pub const fn decision_count(&self) -> u64 {
        self.decision_count
    }

    /// Day of the most recent decision.
    pub const fn last_decision_day(&self) -> Option<u64> {
        self.last_decision_day
    }

    /// Own recent action descriptions, oldest first.
    pub fn recent_actions(&self) -> impl Iterator<Item = &str> {
        self.recent_actions.iter().map(String::as_str)
    }

    /// Record a decision taken on `day`.
    pub fn record_action(&mut self, description: &str, day: u64) {
        if self.recent_actions.len() >= RECENT_ACTIONS_CAP {
            self.recent_actions.pop_front();
        }
        self.recent_actions.push_back(description.to_owned());
        self.decision_count = self.decision_count.saturating_add(1);
        self.last_decision_day = Some(day);
    }
}

// ---------------------------------------------------------------------------
// Call inputs and outputs
// ---------------------------------------------------------------------------

/// Inputs to [`Agent::decide`], assembled by the tick from shared state.
#[derive(Debug, Clone)]
pub struct DecisionInput<'a> {
    /// Current simulated day.
    pub day: u64,
    /// The global state.
    pub global: &'a StructuredState,
    /// Most recent actions by other agents.
    pub recent_by_others: Vec<ActionSummary>,
    /// This agent's own actions inside the activity window.
    pub own_recent: Vec<ActionSummary>,
    /// Deadline for the oracle call.
    pub timeout: Duration,
}

/// Result of [`Agent::apply_impact`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactOutcome {
    /// Writes that changed the global state.
    pub changes: Vec<StateChange>,
    /// Proposals equal to the current value, skipped.
    pub suppressed: usize,
    /// Categories answered by the fallback rule engine.
    pub fallbacks: usize,
}

/// Kind-specific attribute that tracks a global indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTarget {
    /// Local attribute that moves.
    pub attribute: &'static str,
    /// Category of the global indicator.
    pub category: Category,
    /// Global indicator factor.
    pub factor: &'static str,
}

/// Global factors an agent kind is shown when deciding.
pub const fn relevant_factors(kind: AgentKind) -> [(Category, &'static str); 2] {
    match kind {
        AgentKind::Company => [
            (Category::Economic, "market_dynamics"),
            (Category::Technological, "innovation_ecosystem"),
        ],
        AgentKind::Country => [
            (Category::Political, "international_relations"),
            (Category::Economic, "growth"),
        ],
        AgentKind::Researcher => [
            (Category::Technological, "rd_activity"),
            (Category::Social, "education_levels"),
        ],
    }
}

// ---------------------------------------------------------------------------
// The capability set
// ---------------------------------------------------------------------------

/// An autonomous participant in the simulated world.
pub trait Agent {
    /// Shared state.
    fn core(&self) -> &AgentCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut AgentCore;

    /// Structural traits for graph construction.
    fn traits(&self) -> AgentTraits;

    /// One-line profile summary for prompts and logs.
    fn describe(&self) -> String;

    /// Attribute moved toward a global indicator each day.
    fn sync_target(&self) -> SyncTarget;

    /// Attribute blended during collaboration.
    fn shared_scalar(&self) -> &'static str;

    /// Whether a global change concerns this agent.
    fn is_relevant(&self, change: &StateChange) -> bool;

    /// Local factor name and text written in response to a relevant change.
    fn respond_to(&self, change: &StateChange) -> (&'static str, String);

    /// Agent id.
    fn id(&self) -> &AgentId {
        self.core().id()
    }

    /// Agent kind.
    fn kind(&self) -> AgentKind {
        self.core().kind()
    }

    /// Whether another agent's action belongs in this agent's decision
    /// context: its type lands in a category this kind watches, or its
    /// description names this agent's industry, country, region or fields.
    fn is_relevant_action(&self, decision: &Decision) -> bool {
        let (category, _) = decision.decision_type().propagation_target();
        if relevant_factors(self.kind())
            .iter()
            .any(|(watched, _)| *watched == category)
        {
            return true;
        }
        let traits = self.traits();
        traits
            .industry
            .iter()
            .chain(&traits.country)
            .chain(&traits.region)
            .chain(&traits.fields)
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .any(|keyword| !keyword.is_empty() && mentions(decision.description(), keyword))
    }

    /// Build the oracle context for today's decision.
    fn context(&self, input: &DecisionInput<'_>) -> AgentContext {
        let core = self.core();
        let relevant_state = relevant_factors(core.kind())
            .iter()
            .map(|(category, factor)| ContextFactor {
                category: *category,
                factor: (*factor).to_owned(),
                value: input.global.get(*category, factor).clone(),
            })
            .collect();
        AgentContext {
            agent_id: core.id().clone(),
            kind: core.kind(),
            description: self.describe(),
            day: input.day,
            decision_count: core.decision_count(),
            attributes: core.attributes().clone(),
            traits: self.traits(),
            relevant_state,
            recent_by_others: input.recent_by_others.clone(),
            own_recent: input.own_recent.clone(),
        }
    }

    /// Ask the oracle whether to act today and record the action if so.
    fn decide(&mut self, input: &DecisionInput<'_>, oracle: &mut OracleChain) -> Option<Decision> {
        let context = self.context(input);
        let answer = oracle.decide(&context, input.timeout);
        match answer.verdict {
            OracleVerdict::NoAction => {
                debug!(agent = %self.id(), day = input.day, "no action taken");
                None
            }
            OracleVerdict::Act {
                description,
                decision_type,
                confidence,
            } => {
                let decision = Decision::new(
                    self.id().clone(),
                    input.day,
                    description,
                    decision_type,
                    confidence,
                    answer.origin,
                )
                .with_metadata("kind", self.kind().as_str());
                self.core_mut()
                    .record_action(decision.description(), input.day);
                debug!(
                    agent = %decision.agent_id(),
                    day = input.day,
                    decision_type = %decision.decision_type(),
                    origin = decision.origin().as_str(),
                    "decides: {}",
                    decision.description()
                );
                Some(decision)
            }
        }
    }

    /// Ask the oracle for one impact per category and write the differing
    /// proposals into the global state.
    fn apply_impact(
        &self,
        decision: &Decision,
        global: &mut StructuredState,
        oracle: &mut OracleChain,
        timeout: Duration,
    ) -> ImpactOutcome {
        let mut outcome = ImpactOutcome::default();
        for category in Category::ALL {
            let request = ImpactRequest {
                decision: ImpactDecision::from(decision),
                agent_id: self.id().clone(),
                kind: self.kind(),
                category,
                category_state: global.category(category).clone(),
            };
            let answer = oracle.impact_for(&request, timeout);
            if answer.origin == DecisionOrigin::Fallback {
                outcome.fallbacks = outcome.fallbacks.saturating_add(1);
            }
            let ImpactVerdict::Change(proposal) = answer.verdict else {
                continue;
            };
            match global.update(category, &proposal.factor, proposal.value.clone()) {
                FactorUpdate::Changed { old } => {
                    if let Some(change) = StateChange::record(
                        category,
                        proposal.factor,
                        old,
                        proposal.value,
                        proposal.reason,
                        self.id().clone(),
                        decision.day(),
                    ) {
                        debug!(day = decision.day(), "{change}");
                        outcome.changes.push(change);
                    }
                }
                FactorUpdate::Unchanged => {
                    outcome.suppressed = outcome.suppressed.saturating_add(1);
                    debug!(
                        agent = %self.id(),
                        category = %category,
                        factor = %proposal.factor,
                        "no change needed"
                    );
                }
            }
        }
        outcome
    }

    /// Record a neighbour's decision in the single factor its type targets.
    fn receive_influence(&mut self, source: &AgentId, decision: &Decision) -> (Category, String) {
        let (category, factor) = decision.decision_type().propagation_target();
        let note = format!("Influenced by {source}: {}", decision.description());
        self.core_mut().note(category, factor, note);
        (category, factor.to_owned())
    }

    /// Move the sync attribute a bounded step toward its global indicator.
    ///
    /// A missing or non-numeric indicator leaves the attribute untouched.
    fn sync_from_global(&mut self, global: &StructuredState, rate: f64) {
        let target = self.sync_target();
        let Some(indicator) = global.number(target.category, target.factor) else {
            return;
        };
        let core = self.core_mut();
        let current = core.attribute(target.attribute);
        core.set_attribute(target.attribute, current + (indicator - current) * rate);
    }

    /// Blend shared scalars with `partner` and stamp both local states.
    ///
    /// Both values move `blend` of the way toward their common average.
    /// Returns the average.
    fn collaborate(&mut self, partner: &mut dyn Agent, blend: f64, day: u64) -> f64 {
        let mine_key = self.shared_scalar();
        let theirs_key = partner.shared_scalar();
        let mine = self.core().attribute(mine_key);
        let theirs = partner.core().attribute(theirs_key);
        let average = (mine + theirs) / 2.0;

        let partner_id = partner.id().clone();
        let own_id = self.id().clone();
        let core = self.core_mut();
        core.set_attribute(mine_key, mine + (average - mine) * blend);
        core.note(
            Category::Social,
            "last_collaboration",
            format!("Day {day}: collaborated with {partner_id}"),
        );
        let other = partner.core_mut();
        other.set_attribute(theirs_key, theirs + (average - theirs) * blend);
        other.note(
            Category::Social,
            "last_collaboration",
            format!("Day {day}: collaborated with {own_id}"),
        );
        average
    }

    /// Write a local response for every relevant change. Returns how many
    /// changes were relevant.
    fn absorb_changes(&mut self, changes: &[StateChange]) -> usize {
        let mut absorbed = 0_usize;
        for change in changes {
            if !self.is_relevant(change) {
                continue;
            }
            let (factor, response) = self.respond_to(change);
            self.core_mut().note(change.category(), factor, response);
            absorbed = absorbed.saturating_add(1);
        }
        absorbed
    }
}

/// Construct every agent in roster order, drawing random attributes from
/// `rng`.
pub fn build_agents<R: Rng + ?Sized>(roster: &Roster, rng: &mut R) -> Vec<Box<dyn Agent>> {
    roster
        .profiles()
        .map(|profile| -> Box<dyn Agent> {
            match profile {
                Profile::Company(p) => Box::new(CompanyAgent::new(p.clone(), rng)),
                Profile::Country(p) => Box::new(CountryAgent::new(p.clone(), &roster.unions)),
                Profile::Researcher(p) => Box::new(ResearcherAgent::new(p.clone(), rng)),
            }
        })
        .collect()
}
