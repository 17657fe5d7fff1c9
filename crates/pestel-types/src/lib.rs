//! Shared type definitions for the PESTEL foresight simulation.
//!
//! Every crate in the workspace speaks in these types: the structured world
//! state, the closed category set, decisions, and the audit records the run
//! report is built from.
//!
//! # Modules
//!
//! - [`ids`] -- String newtypes for agent and scenario identifiers
//! - [`enums`] -- Closed enumerations (categories, agent kinds, decision types, sectors)
//! - [`state`] -- The two-level structured state and its factor values
//! - [`decision`] -- Agent decisions
//! - [`change`] -- State-change and interaction audit records
//! - [`scenario`] -- Static alternative-future scenario definitions
//! - [`text`] -- Keyword matching helpers

pub mod change;
pub mod decision;
pub mod enums;
pub mod ids;
pub mod scenario;
pub mod state;
pub mod text;

pub use change::{Interaction, InteractionKind, StateChange};
pub use decision::{Decision, UNKNOWN_METADATA};
pub use enums::{
    AgentKind, Category, ClusterKind, DecisionOrigin, DecisionType, Sector, UnknownCategory,
};
pub use ids::{AgentId, ScenarioId};
pub use scenario::ScenarioDefinition;
pub use state::{FactorMap, FactorUpdate, FactorValue, NOT_DEFINED, StructuredState};
pub use text::{mentions, mentions_any};
