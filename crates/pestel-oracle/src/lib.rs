//! LLM-backed decision oracle for the PESTEL foresight simulation.
//!
//! Implements [`DecisionOracle`](pestel_agents::DecisionOracle) on top of an
//! HTTP language model. The simulation never depends on this crate being
//! reachable: every failure surfaces as an
//! [`OracleError`](pestel_agents::OracleError) that the oracle chain answers
//! with the deterministic fallback.
//!
//! # Modules
//!
//! - [`config`] -- Environment configuration ([`OracleConfig`])
//! - [`llm`] -- Backend enum over `OpenAI`, Anthropic and Ollama HTTP APIs
//! - [`prompt`] -- `minijinja` prompt templates ([`PromptEngine`])
//! - [`parse`] -- Oracle text protocol parser
//! - [`cache`] -- FIFO response cache ([`ResponseCache`])
//! - [`oracle`] -- The [`LlmOracle`] itself
//! - [`error`] -- Service errors ([`OracleServiceError`])

pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod oracle;
pub mod parse;
pub mod prompt;

pub use cache::{CacheStats, RequestKind, ResponseCache};
pub use config::{BackendType, LlmBackendConfig, OracleConfig};
pub use error::OracleServiceError;
pub use llm::{LlmBackend, create_backend};
pub use oracle::{LlmOracle, RetryPolicy};
pub use parse::{parse_decision, parse_impact};
pub use prompt::{PromptEngine, RenderedPrompt};
