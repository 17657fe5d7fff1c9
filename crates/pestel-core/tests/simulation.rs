//! End-to-end runs over the bundled roster.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use pestel_agents::{
    AgentContext, DecisionOracle, ImpactRequest, ImpactVerdict, OracleChain, OracleError,
    OracleVerdict, Roster, RuleEngine,
};
use pestel_core::{
    DayCallback, DaySummary, EventKind, NoOpCallback, RunControl, Scheduler, SimulationConfig,
    SimulationContext, SimulationEndReason, SimulationReport, run_scheduled, run_simulation,
};
use pestel_types::{
    AgentId, Category, Decision, DecisionOrigin, DecisionType, ScenarioDefinition,
    StructuredState,
};

const ROSTER: &str = include_str!("../../../config/roster.yaml");

fn roster() -> Roster {
    Roster::parse(ROSTER).unwrap()
}

fn config(days: u64, seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.run.simulation_days = days;
    config.run.seed = seed;
    config
}

fn run(config: SimulationConfig) -> SimulationReport {
    let seed = config.run.seed;
    let mut ctx = SimulationContext::new(config, &roster()).unwrap();
    let mut oracle = OracleChain::fallback_only(seed);
    let control = Arc::new(RunControl::new());
    run_simulation(&mut ctx, &mut oracle, &control, &mut NoOpCallback).unwrap()
}

/// Answers every call with a timeout.
struct AlwaysTimeout;

impl DecisionOracle for AlwaysTimeout {
    fn name(&self) -> &str {
        "always_timeout"
    }

    fn decide(
        &mut self,
        _context: &AgentContext,
        timeout: Duration,
    ) -> Result<OracleVerdict, OracleError> {
        Err(OracleError::Timeout {
            deadline_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
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

/// Collects day summaries and optionally stops the run after a given day.
struct Recorder {
    days: Vec<DaySummary>,
    stop_after: Option<u64>,
    control: Arc<RunControl>,
}

impl DayCallback for Recorder {
    fn on_day(&mut self, summary: &DaySummary, _ctx: &SimulationContext) {
        self.days.push(summary.clone());
        if self.stop_after == Some(summary.day) {
            self.control.request_stop();
        }
    }
}

#[test]
fn same_seed_gives_identical_change_logs() {
    let first = run(config(14, 42));
    let second = run(config(14, 42));
    assert!(!first.changes.is_empty());
    assert_eq!(
        serde_json::to_string(&first.changes).unwrap(),
        serde_json::to_string(&second.changes).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&first.final_state).unwrap(),
        serde_json::to_string(&second.final_state).unwrap()
    );
}

#[test]
fn probabilities_sum_to_one_after_every_rescore() {
    let report = run(config(28, 7));
    assert_eq!(report.probability_history.len(), 4);
    for snapshot in &report.probability_history {
        let total: f64 = snapshot.probabilities.values().sum();
        let day = snapshot.day;
        assert!((total - 1.0).abs() < 1e-9, "day {day} sums to {total}");
    }
}

#[test]
fn confidence_stays_in_unit_range() {
    let report = run(config(10, 3));
    assert!(!report.decisions.is_empty());
    assert!(
        report
            .decisions
            .iter()
            .all(|d| (0.0..=1.0).contains(&d.confidence()))
    );

    let loud = Decision::new(
        AgentId::new("x"),
        1,
        "Overreach",
        DecisionType::Strategic,
        1.7,
        DecisionOrigin::Oracle,
    );
    assert!((loud.confidence() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn every_change_differs_from_the_old_value() {
    let report = run(config(10, 11));
    assert!(!report.changes.is_empty());
    let changes = &report.changes;
    assert!(changes.iter().all(|c| c.old_value() != c.new_value()));
}

#[test]
fn applying_the_same_decision_twice_is_a_no_op() {
    let ctx = SimulationContext::new(config(1, 42), &roster()).unwrap();
    let agent = ctx.agents.first().unwrap();
    let mut global = StructuredState::new();
    let mut oracle = OracleChain::fallback_only(1);
    let decision = Decision::new(
        agent.id().clone(),
        1,
        "Launch green initiative",
        DecisionType::Sustainability,
        0.8,
        DecisionOrigin::Fallback,
    );
    let timeout = Duration::from_millis(100);

    let first = agent.apply_impact(&decision, &mut global, &mut oracle, timeout);
    assert!(!first.changes.is_empty());
    assert_eq!(first.suppressed, 0);

    let snapshot = global.clone();
    let second = agent.apply_impact(&decision, &mut global, &mut oracle, timeout);
    assert!(second.changes.is_empty());
    assert_eq!(second.suppressed, first.changes.len());
    assert_eq!(global, snapshot);
}

#[test]
fn quiet_scenarios_keep_their_bases() {
    let mut engine = pestel_core::ScenarioEngine::new(
        vec![
            ScenarioDefinition::new("First", 0.5),
            ScenarioDefinition::new("Second", 0.3),
            ScenarioDefinition::new("Third", 0.2),
        ],
        pestel_core::ScenarioWeights::default(),
    );
    engine.update(7, &[], &StructuredState::new());
    let probabilities: Vec<f64> = engine.scenarios().iter().map(|s| s.probability).collect();
    for (got, want) in probabilities.iter().zip([0.5, 0.3, 0.2]) {
        assert!((got - want).abs() < 1e-9);
    }
}

#[test]
fn sustainability_influence_touches_only_environmental() {
    let mut ctx = SimulationContext::new(config(1, 42), &roster()).unwrap();
    let source = ctx.agents.first().unwrap().id().clone();
    let neighbour = ctx.graph.neighbors(&source).first().cloned().unwrap();
    let index = ctx.index_of(&neighbour).unwrap();
    let decision = Decision::new(
        source.clone(),
        1,
        "Launch green initiative",
        DecisionType::Sustainability,
        0.8,
        DecisionOrigin::Fallback,
    );

    let agent = ctx.agents.get_mut(index).unwrap();
    let before = agent.core().local().clone();
    agent.receive_influence(&source, &decision);
    let after = agent.core().local();

    for category in Category::ALL {
        if category == Category::Environmental {
            assert_ne!(after.category(category), before.category(category));
        } else {
            assert_eq!(after.category(category), before.category(category));
        }
    }
}

#[test]
fn five_days_run_five_ticks() {
    let control = Arc::new(RunControl::new());
    let mut recorder = Recorder {
        days: Vec::new(),
        stop_after: None,
        control: Arc::clone(&control),
    };
    let mut ctx = SimulationContext::new(config(5, 42), &roster()).unwrap();
    let mut oracle = OracleChain::fallback_only(42);
    let report = run_simulation(&mut ctx, &mut oracle, &control, &mut recorder).unwrap();

    let days: Vec<u64> = recorder.days.iter().map(|d| d.day).collect();
    assert_eq!(days, vec![1, 2, 3, 4, 5]);
    assert_eq!(report.days_run, 5);
    assert_eq!(report.days.len(), 5);
    assert_eq!(report.end_reason, SimulationEndReason::Completed);
    assert_eq!(report.scheduler.dispatched, 5);
}

#[test]
fn timing_out_oracle_still_yields_fallback_decisions() {
    let mut ctx = SimulationContext::new(config(5, 42), &roster()).unwrap();
    let mut oracle = OracleChain::new(Box::new(AlwaysTimeout), RuleEngine::new(42));
    let control = Arc::new(RunControl::new());
    let report = run_simulation(&mut ctx, &mut oracle, &control, &mut NoOpCallback).unwrap();

    assert_eq!(report.oracle.primary, "always_timeout");
    assert!(report.oracle.stats.timeouts > 0);
    assert_eq!(report.oracle.stats.primary_ok, 0);
    for day in 1..=5 {
        let fallback_today = report
            .decisions
            .iter()
            .filter(|d| d.day() == day)
            .any(|d| d.origin() == DecisionOrigin::Fallback);
        assert!(fallback_today, "no fallback decision on day {day}");
    }
}

#[test]
fn stop_request_ends_after_the_current_day() {
    let control = Arc::new(RunControl::new());
    let mut recorder = Recorder {
        days: Vec::new(),
        stop_after: Some(2),
        control: Arc::clone(&control),
    };
    let mut ctx = SimulationContext::new(config(10, 42), &roster()).unwrap();
    let mut oracle = OracleChain::fallback_only(42);
    let report = run_simulation(&mut ctx, &mut oracle, &control, &mut recorder).unwrap();

    assert_eq!(report.end_reason, SimulationEndReason::OperatorStop);
    assert_eq!(report.days_run, 2);
    assert!(report.decisions.iter().all(|d| d.day() <= 2));
}

#[test]
fn unknown_event_types_are_ignored() {
    let mut scheduler = Scheduler::new(3);
    let asteroid = EventKind::External {
        name: "asteroid".to_owned(),
    };
    scheduler.schedule(2, asteroid).unwrap();
    scheduler.schedule(2, EventKind::ScenarioRescore).unwrap();

    let mut ctx = SimulationContext::new(config(3, 42), &roster()).unwrap();
    let mut oracle = OracleChain::fallback_only(42);
    let control = Arc::new(RunControl::new());
    let mut callback = NoOpCallback;
    let report = run_scheduled(scheduler, &mut ctx, &mut oracle, &control, &mut callback).unwrap();

    assert_eq!(report.end_reason, SimulationEndReason::Completed);
    assert_eq!(report.days_run, 3);
    assert_eq!(report.scheduler.ignored, 1);
    assert_eq!(report.scheduler.dispatched, 5);
    assert_eq!(report.probability_history.len(), 1);
}

#[test]
fn union_coordination_is_recorded() {
    let report = run(config(6, 42));
    let coordinations = report
        .interactions
        .iter()
        .filter(|i| i.kind == pestel_types::InteractionKind::UnionCoordination)
        .count();
    assert!(coordinations > 0);
    assert!(
        report
            .most_influential
            .iter()
            .all(|r| r.agent_id.as_str() != "European Union")
    );
}

#[test]
fn report_serializes_to_json() {
    let report = run(config(7, 5));
    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["days_run"], 7);
    assert_eq!(value["end_reason"], "Completed");
    assert!(value["analysis"]["recommendations"].as_array().is_some_and(|r| r.len() == 8));
    assert!(value["clusters"].as_array().is_some_and(|c| !c.is_empty()));
}

#[tokio::test(flavor = "multi_thread")]
async fn runs_on_a_runtime_worker() {
    let report = tokio::task::block_in_place(|| run(config(3, 9)));
    assert_eq!(report.days_run, 3);
}
