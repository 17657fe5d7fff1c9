//! One simulated day.
//!
//! [`run_day`] executes these phases in order on the calling thread:
//!
//! 1. **Sync** -- every agent moves its sync attribute toward the matching
//!    global indicator.
//!
//! 2. **Decide** -- in roster order, each agent asks the oracle chain
//!    whether to act. An action is applied to the global state one category
//!    at a time, then propagated to at most `max_propagation_targets` graph
//!    neighbours, each of which records it in a single local factor.
//!
//! 3. **Absorb** -- every agent reacts locally to the day's state changes.
//!
//! 4. **Collaborate** -- with `collaboration_probability`, one random pair of
//!    distinct agents blends a shared scalar.
//!
//! 5. **Rescore** -- every `update_interval_days`, scenarios are rescored
//!    over the decision window and the global state.
//!
//! 6. **Prune** -- records older than the history window leave it.
//!
//! Given the same context and a deterministic oracle, the day is
//! deterministic: the only randomness is the context's seeded generator.

use pestel_agents::{Agent, DecisionInput, OracleChain, collaborate_pair};
use pestel_types::{AgentId, Interaction, InteractionKind, ScenarioId, StateChange};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::context::SimulationContext;
use crate::event::QueueError;

/// Errors that halt a day.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The influence graph names an agent the context does not hold.
    #[error("unknown agent in influence graph: {agent_id}")]
    UnknownAgent {
        /// The missing agent id.
        agent_id: String,
    },

    /// Scheduling the next event failed.
    #[error("queue error: {source}")]
    Queue {
        /// The underlying queue error.
        #[from]
        source: QueueError,
    },
}

/// What happened during one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    /// Day number.
    pub day: u64,
    /// Decisions taken.
    pub decisions: usize,
    /// Global state changes applied.
    pub changes: usize,
    /// Impact proposals equal to the current value.
    pub suppressed: usize,
    /// Neighbour influence deliveries.
    pub propagations: usize,
    /// Collaborating pairs.
    pub collaborations: usize,
    /// Oracle calls answered by the fallback rule engine.
    pub fallbacks: u64,
    /// Whether scenarios were rescored.
    pub rescored: bool,
    /// Dominant scenario at the end of the day.
    pub dominant_scenario: Option<ScenarioId>,
}

/// Run every phase of `day`.
///
/// # Errors
///
/// Returns [`TickError::UnknownAgent`] if propagation reaches an id that is
/// not in the context.
pub fn run_day(
    ctx: &mut SimulationContext,
    oracle: &mut OracleChain,
    day: u64,
) -> Result<DaySummary, TickError> {
    ctx.day = day;
    let fallbacks_before = oracle.stats().fallbacks;
    let mut summary = DaySummary {
        day,
        ..DaySummary::default()
    };

    // Phase 1: Sync
    let sync_rate = ctx.config().agents.sync_rate;
    for agent in &mut ctx.agents {
        agent.sync_from_global(&ctx.global, sync_rate);
    }

    // Phase 2: Decide / apply / propagate
    let day_changes = decide_all(ctx, oracle, day, &mut summary)?;

    // Phase 3: Absorb
    if !day_changes.is_empty() {
        for agent in &mut ctx.agents {
            agent.absorb_changes(&day_changes);
        }
    }

    // Phase 4: Collaborate
    if collaborate(ctx, day) {
        summary.collaborations = 1;
    }

    // Phase 5: Rescore
    let interval = ctx.config().scenarios.update_interval_days;
    if day.checked_rem(interval) == Some(0) {
        rescore(ctx, day);
        summary.rescored = true;
    }

    // Phase 6: Prune
    let window = ctx.config().history.window_days;
    ctx.history.prune(day, window);

    summary.fallbacks = oracle.stats().fallbacks.saturating_sub(fallbacks_before);
    summary.dominant_scenario = ctx.scenarios.dominant().map(|s| s.name().clone());

    info!(
        day,
        decisions = summary.decisions,
        changes = summary.changes,
        suppressed = summary.suppressed,
        propagations = summary.propagations,
        collaborations = summary.collaborations,
        fallbacks = summary.fallbacks,
        "Day complete"
    );
    ctx.summaries.push(summary.clone());
    Ok(summary)
}

/// Rescore scenarios over the current decision window.
pub fn rescore(ctx: &mut SimulationContext, day: u64) {
    ctx.scenarios
        .update(day, ctx.history.decisions(), &ctx.global);
}

/// First day counted as an agent's own recent activity: today and the
/// `window` days before it.
const fn own_activity_since(day: u64, window: u64) -> u64 {
    day.saturating_sub(window)
}

fn decide_all(
    ctx: &mut SimulationContext,
    oracle: &mut OracleChain,
    day: u64,
    summary: &mut DaySummary,
) -> Result<Vec<StateChange>, TickError> {
    let agents_cfg = ctx.config().agents.clone();
    let decision_timeout = ctx.config().run.decision_timeout();
    let impact_timeout = ctx.config().run.impact_timeout();
    let own_since = own_activity_since(day, agents_cfg.own_activity_window_days);
    let mut day_changes = Vec::new();

    for position in 0..ctx.agents.len() {
        let Some(agent) = ctx.agents.get_mut(position) else {
            continue;
        };
        let id = agent.id().clone();
        let input = DecisionInput {
            day,
            global: &ctx.global,
            recent_by_others: ctx.history.recent_by_others(
                &id,
                agents_cfg.recent_context_actions,
                |d| agent.is_relevant_action(d),
            ),
            own_recent: ctx.history.own_actions_since(&id, own_since),
            timeout: decision_timeout,
        };
        let Some(decision) = agent.decide(&input, oracle) else {
            continue;
        };
        let outcome = agent.apply_impact(&decision, &mut ctx.global, oracle, impact_timeout);
        summary.decisions = summary.decisions.saturating_add(1);
        summary.changes = summary.changes.saturating_add(outcome.changes.len());
        summary.suppressed = summary.suppressed.saturating_add(outcome.suppressed);

        let targets: Vec<AgentId> = ctx
            .graph
            .propagation_targets(&id, agents_cfg.max_propagation_targets)
            .cloned()
            .collect();
        for target in &targets {
            let neighbour = ctx
                .index_of(target)
                .and_then(|i| ctx.agents.get_mut(i))
                .ok_or_else(|| TickError::UnknownAgent {
                    agent_id: target.to_string(),
                })?;
            let (category, factor) = neighbour.receive_influence(&id, &decision);
            debug!(
                day,
                source = %id,
                target = %target,
                category = %category,
                factor = %factor,
                "influence propagated"
            );
        }
        summary.propagations = summary.propagations.saturating_add(targets.len());
        if !targets.is_empty() {
            ctx.history.record_interaction(Interaction {
                day,
                source: id,
                targets,
                description: decision.description().to_owned(),
                kind: InteractionKind::Influence,
            });
        }

        ctx.history.record_changes(&outcome.changes);
        day_changes.extend(outcome.changes);
        ctx.history.record_decision(decision);
    }
    Ok(day_changes)
}

/// Maybe pick one random pair and blend their shared scalars. Returns
/// `true` if a pair collaborated.
fn collaborate(ctx: &mut SimulationContext, day: u64) -> bool {
    let probability = ctx.config().agents.collaboration_probability;
    let blend = ctx.config().agents.collaboration_blend;
    let count = ctx.agents.len();
    if count < 2 || ctx.rng.random::<f64>() >= probability {
        return false;
    }
    let first = ctx.rng.random_range(0..count);
    let mut second = ctx.rng.random_range(0..count.saturating_sub(1));
    if second >= first {
        second = second.saturating_add(1);
    }

    let (low, high) = (first.min(second), first.max(second));
    let (left, right) = ctx.agents.split_at_mut(high);
    let (Some(low_agent), Some(high_agent)) = (left.get_mut(low), right.first_mut()) else {
        return false;
    };
    let (initiator, partner): (&mut Box<dyn Agent>, &mut Box<dyn Agent>) = if first < second {
        (low_agent, high_agent)
    } else {
        (high_agent, low_agent)
    };

    let average = collaborate_pair(initiator.as_mut(), partner.as_mut(), blend, day);
    let source = initiator.id().clone();
    let target = partner.id().clone();
    debug!(day, initiator = %source, partner = %target, average, "collaboration");
    ctx.history.record_interaction(Interaction {
        day,
        source,
        targets: vec![target],
        description: format!("Blended shared capabilities toward {average:.3}"),
        kind: InteractionKind::Collaboration,
    });
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pestel_agents::Roster;
    use pestel_types::Category;

    use super::*;
    use crate::config::SimulationConfig;

    const ROSTER: &str = r"
companies:
  - {name: Tesla, industry: 'Automotive, Energy', country: United States, revenue_musd: 127000}
  - {name: NVIDIA, industry: Technology, country: United States, revenue_musd: 118000}
countries:
  - {name: United States, region: North America, development_level: Developed, population: 333000000, gdp_musd: 26854599}
researchers:
  - {name: MIT, country: United States, fields: [Technology, AI]}
scenarios:
  - {name: AI Supremacy, base_probability: 0.5}
  - {name: Green Transition Triumph, base_probability: 0.5}
baseline:
  economic:
    economic_growth_rate: 0.03
";

    fn context(config: SimulationConfig) -> SimulationContext {
        let roster = Roster::parse(ROSTER).unwrap();
        SimulationContext::new(config, &roster).unwrap()
    }

    #[test]
    fn day_summary_is_recorded() {
        let mut ctx = context(SimulationConfig::default());
        let mut oracle = OracleChain::fallback_only(7);
        let summary = run_day(&mut ctx, &mut oracle, 1).unwrap();
        assert_eq!(summary.day, 1);
        assert_eq!(ctx.day, 1);
        assert_eq!(ctx.summaries.len(), 1);
        assert!(!summary.rescored);
        assert_eq!(ctx.history.decisions().len(), summary.decisions);
    }

    #[test]
    fn changes_always_differ() {
        let mut ctx = context(SimulationConfig::default());
        let mut oracle = OracleChain::fallback_only(3);
        for day in 1..=10 {
            run_day(&mut ctx, &mut oracle, day).unwrap();
        }
        assert!(
            ctx.history
                .all_changes()
                .iter()
                .all(|c| c.old_value() != c.new_value())
        );
    }

    #[test]
    fn rescore_runs_on_the_interval() {
        let mut config = SimulationConfig::default();
        config.scenarios.update_interval_days = 2;
        let mut ctx = context(config);
        let mut oracle = OracleChain::fallback_only(1);
        let first = run_day(&mut ctx, &mut oracle, 1).unwrap();
        let second = run_day(&mut ctx, &mut oracle, 2).unwrap();
        assert!(!first.rescored);
        assert!(second.rescored);
        assert_eq!(ctx.scenarios.probability_history().len(), 1);
        assert!((ctx.scenarios.total_probability() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn certain_collaboration_records_an_interaction() {
        let mut config = SimulationConfig::default();
        config.agents.collaboration_probability = 1.0;
        let mut ctx = context(config);
        let mut oracle = OracleChain::fallback_only(1);
        let summary = run_day(&mut ctx, &mut oracle, 1).unwrap();
        assert_eq!(summary.collaborations, 1);
        let collaborations: Vec<&Interaction> = ctx
            .history
            .interactions()
            .iter()
            .filter(|i| i.kind == InteractionKind::Collaboration)
            .collect();
        assert_eq!(collaborations.len(), 1);
        let stamped = ctx
            .agents
            .iter()
            .filter(|a| {
                a.core()
                    .local()
                    .get(Category::Social, "last_collaboration")
                    .is_defined()
            })
            .count();
        assert_eq!(stamped, 2);
    }

    #[test]
    fn zero_probability_never_collaborates() {
        let mut config = SimulationConfig::default();
        config.agents.collaboration_probability = 0.0;
        let mut ctx = context(config);
        let mut oracle = OracleChain::fallback_only(1);
        for day in 1..=5 {
            let summary = run_day(&mut ctx, &mut oracle, day).unwrap();
            assert_eq!(summary.collaborations, 0);
        }
    }

    #[test]
    fn own_activity_spans_today_and_the_window_before() {
        assert_eq!(own_activity_since(10, 3), 7);
        assert_eq!(own_activity_since(4, 3), 1);
        assert_eq!(own_activity_since(2, 3), 0);
        assert_eq!(own_activity_since(5, 0), 5);
    }

    #[test]
    fn own_recent_includes_the_boundary_day() {
        let mut ctx = context(SimulationConfig::default());
        let tesla = AgentId::new("Tesla");
        for day in [6, 7, 10] {
            ctx.history.record_decision(pestel_types::Decision::new(
                tesla.clone(),
                day,
                "Expand gigafactory capacity",
                pestel_types::DecisionType::Investment,
                0.7,
                pestel_types::DecisionOrigin::Fallback,
            ));
        }
        let since = own_activity_since(10, ctx.config().agents.own_activity_window_days);
        let days: Vec<u64> = ctx
            .history
            .own_actions_since(&tesla, since)
            .iter()
            .map(|a| a.day)
            .collect();
        assert_eq!(days, vec![7, 10]);
    }

    #[test]
    fn sync_moves_toward_the_indicator() {
        let mut ctx = context(SimulationConfig::default());
        ctx.global
            .set(Category::Economic, "economic_growth_rate", 0.13);
        let mut oracle = OracleChain::fallback_only(1);
        run_day(&mut ctx, &mut oracle, 1).unwrap();
        let tesla = ctx.agent(&AgentId::new("Tesla")).unwrap();
        let growth = tesla.core().attribute("growth_expectation");
        assert!(growth > 0.03);
    }
}
