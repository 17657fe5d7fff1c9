//! Everything one simulation run owns.
//!
//! A [`SimulationContext`] is built from a configuration and a roster and
//! passed explicitly to the tick and the runner. Nothing is global, so
//! several contexts can coexist in one process.

use std::collections::BTreeMap;

use pestel_agents::{
    Agent, AgentTraits, CountryUnion, InfluenceGraph, RosterError, Roster, build_agents,
};
use pestel_types::{AgentId, StructuredState};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::history::History;
use crate::scenario::ScenarioEngine;
use crate::tick::DaySummary;

/// State of a single run.
pub struct SimulationContext {
    run_id: Uuid,
    config: SimulationConfig,
    /// Seeded generator for collaboration draws.
    pub rng: StdRng,
    /// The shared world state.
    pub global: StructuredState,
    /// Agents in roster order.
    pub agents: Vec<Box<dyn Agent>>,
    index: BTreeMap<AgentId, usize>,
    /// Static influence graph.
    pub graph: InfluenceGraph,
    /// Scenario scoring.
    pub scenarios: ScenarioEngine,
    /// Country unions.
    pub unions: Vec<CountryUnion>,
    /// Recent and archived records.
    pub history: History,
    /// Last day that started, 0 before the first tick.
    pub day: u64,
    /// One summary per completed day.
    pub summaries: Vec<DaySummary>,
}

impl SimulationContext {
    /// Build agents, graph, and scenarios from `roster`.
    ///
    /// Agent attributes are drawn from a generator seeded with
    /// `config.run.seed`, so equal seeds give equal worlds.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if the roster fails validation or its
    /// baseline names an unknown category.
    pub fn new(config: SimulationConfig, roster: &Roster) -> Result<Self, RosterError> {
        roster.validate()?;
        let global = roster.baseline_state()?;
        let mut rng = StdRng::seed_from_u64(config.run.seed);
        let agents = build_agents(roster, &mut rng);

        let index = agents
            .iter()
            .enumerate()
            .map(|(i, agent)| (agent.id().clone(), i))
            .collect();
        let traits: Vec<(AgentId, AgentTraits)> = agents
            .iter()
            .map(|agent| (agent.id().clone(), agent.traits()))
            .collect();
        let graph = InfluenceGraph::build(&traits, &config.agents.influence);
        let scenarios =
            ScenarioEngine::new(roster.scenarios.clone(), config.scenarios.weights.clone());
        let history = History::new(config.history.retain_full);
        let run_id = Uuid::now_v7();

        info!(
            run_id = %run_id,
            agents = agents.len(),
            edges = graph.edge_count(),
            scenarios = scenarios.scenarios().len(),
            unions = roster.unions.len(),
            "Simulation context built"
        );

        Ok(Self {
            run_id,
            config,
            rng,
            global,
            agents,
            index,
            graph,
            scenarios,
            unions: roster.unions.clone(),
            history,
            day: 0,
            summaries: Vec::new(),
        })
    }

    /// Unique id of this run.
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Position of `id` in [`Self::agents`].
    pub fn index_of(&self, id: &AgentId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Agent by id.
    pub fn agent(&self, id: &AgentId) -> Option<&dyn Agent> {
        self.index_of(id)
            .and_then(|i| self.agents.get(i))
            .map(|agent| &**agent)
    }
}

impl std::fmt::Debug for SimulationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationContext")
            .field("run_id", &self.run_id)
            .field("day", &self.day)
            .field("agents", &self.agents.len())
            .field("edges", &self.graph.edge_count())
            .finish_non_exhaustive()
    }
}
