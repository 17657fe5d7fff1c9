//! Agents, influence graph, and decision oracles for the PESTEL foresight
//! simulation.
//!
//! This crate holds everything that operates on a single agent or a pair of
//! agents without knowing about simulated time. The core crate drives these
//! pieces from its daily tick.
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] capability set and the shared [`AgentCore`]
//! - [`company`] -- Company agents ([`CompanyAgent`])
//! - [`country`] -- Country agents ([`CountryAgent`])
//! - [`researcher`] -- Research institution agents ([`ResearcherAgent`])
//! - [`profile`] -- Static profiles and the YAML [`Roster`]
//! - [`influence`] -- The static [`InfluenceGraph`]
//! - [`collaboration`] -- Pairwise scalar blending
//! - [`oracle`] -- The [`DecisionOracle`] boundary and its request/verdict types
//! - [`rule_engine`] -- Deterministic fallback oracle ([`RuleEngine`])
//! - [`chain`] -- Primary oracle with fallback policy ([`OracleChain`])
//! - [`error`] -- Roster loading errors ([`RosterError`])

pub mod agent;
pub mod chain;
pub mod collaboration;
pub mod company;
pub mod country;
pub mod error;
pub mod influence;
pub mod oracle;
pub mod profile;
pub mod researcher;
pub mod rule_engine;

pub use agent::{
    Agent, AgentCore, AgentTraits, DEFAULT_COLLABORATION_BLEND, DEFAULT_SYNC_RATE, DecisionInput,
    ImpactOutcome, RECENT_ACTIONS_CAP, SyncTarget, build_agents, relevant_factors,
};
pub use chain::{Answer, OracleChain, OracleStats};
pub use collaboration::collaborate_pair;
pub use company::CompanyAgent;
pub use country::CountryAgent;
pub use error::RosterError;
pub use influence::{DEFAULT_PROPAGATION_FANOUT, InfluenceGraph, InfluenceLimits};
pub use oracle::{
    ActionSummary, AgentContext, ContextFactor, DecisionOracle, ImpactDecision, ImpactProposal,
    ImpactRequest, ImpactVerdict, OracleError, OracleVerdict,
};
pub use profile::{CompanyProfile, CountryProfile, CountryUnion, Profile, ResearcherProfile, Roster};
pub use researcher::ResearcherAgent;
pub use rule_engine::RuleEngine;
