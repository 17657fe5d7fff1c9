//! The AI-backed [`DecisionOracle`].
//!
//! The simulation calls oracles synchronously with a deadline. [`LlmOracle`]
//! bridges to the ambient tokio runtime for the HTTP call: it must run on a
//! multi-threaded runtime worker, where `block_in_place` hands the worker's
//! other tasks off while this thread waits.
//!
//! Per call:
//!
//! 1. render the prompt
//! 2. answer from the response cache when possible
//! 3. otherwise call the backend under the deadline, retrying failures with
//!    exponential backoff
//! 4. parse the text; only parsable responses are cached

use std::time::Duration;

use pestel_agents::{
    AgentContext, DecisionOracle, ImpactRequest, ImpactVerdict, OracleError, OracleVerdict,
};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, warn};

use crate::cache::{CacheStats, RequestKind, ResponseCache};
use crate::config::OracleConfig;
use crate::error::OracleServiceError;
use crate::llm::{LlmBackend, create_backend};
use crate::parse;
use crate::prompt::{PromptEngine, RenderedPrompt};

/// Retry policy for backend calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(1_u32.checked_shl(attempt).unwrap_or(u32::MAX))
    }
}

/// A [`DecisionOracle`] backed by an LLM over HTTP.
pub struct LlmOracle {
    name: String,
    backend: LlmBackend,
    prompts: PromptEngine,
    cache: ResponseCache,
    retry: RetryPolicy,
}

impl LlmOracle {
    /// Build an oracle from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Template`] if the prompt templates
    /// cannot be loaded.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleServiceError> {
        let prompts = PromptEngine::load(config.templates_dir.as_deref())?;
        let cache = if config.cache_enabled {
            ResponseCache::new(config.cache_capacity)
        } else {
            ResponseCache::disabled()
        };
        Ok(Self::new(
            create_backend(&config.backend),
            prompts,
            cache,
            RetryPolicy {
                retries: config.retries,
                backoff: config.backoff,
            },
        ))
    }

    /// Assemble an oracle from its parts.
    pub fn new(
        backend: LlmBackend,
        prompts: PromptEngine,
        cache: ResponseCache,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            name: format!("llm:{}:{}", backend.name(), backend.model()),
            backend,
            prompts,
            cache,
            retry,
        }
    }

    /// Check the backend answers before the run relies on it.
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Backend`] when the backend is
    /// unreachable.
    pub async fn check_reachable(&self) -> Result<(), OracleServiceError> {
        self.backend.check_reachable().await
    }

    /// Cache hit and miss counters.
    pub const fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Cached text for `prompt`, or a fresh backend answer.
    fn respond(
        &mut self,
        kind: RequestKind,
        prompt: &RenderedPrompt,
        timeout: Duration,
    ) -> Result<String, OracleError> {
        if let Some(hit) = self.cache.get(kind, prompt) {
            debug!(oracle = %self.name, ?kind, "Oracle cache hit");
            return Ok(hit.to_owned());
        }

        let handle = Handle::try_current().map_err(|e| OracleError::Unavailable {
            message: format!("no async runtime available: {e}"),
        })?;
        if handle.runtime_flavor() != RuntimeFlavor::MultiThread {
            return Err(OracleError::Unavailable {
                message: "oracle requires a multi-threaded runtime".to_owned(),
            });
        }

        let backend = &self.backend;
        let retry = self.retry;
        let name = self.name.as_str();
        tokio::task::block_in_place(|| {
            handle.block_on(async {
                tokio::time::timeout(timeout, complete_with_retry(backend, prompt, retry, name))
                    .await
                    .unwrap_or_else(|_elapsed| {
                        Err(OracleError::Timeout {
                            deadline_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                        })
                    })
            })
        })
    }
}

/// Call the backend, retrying failures until the policy is exhausted.
async fn complete_with_retry(
    backend: &LlmBackend,
    prompt: &RenderedPrompt,
    retry: RetryPolicy,
    oracle: &str,
) -> Result<String, OracleError> {
    let mut attempt = 0_u32;
    loop {
        match backend.complete(prompt).await {
            Ok(text) => return Ok(text),
            Err(e) if attempt < retry.retries => {
                let delay = retry.delay(attempt);
                warn!(
                    oracle,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "Oracle call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt = attempt.saturating_add(1);
            }
            Err(e) => {
                return Err(OracleError::Unavailable {
                    message: e.to_string(),
                });
            }
        }
    }
}

fn malformed(err: &OracleServiceError, raw: &str) -> OracleError {
    OracleError::Malformed {
        message: format!("{err}; raw response: {raw}"),
    }
}

fn render_failed(err: &OracleServiceError) -> OracleError {
    OracleError::Unavailable {
        message: err.to_string(),
    }
}

impl DecisionOracle for LlmOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(
        &mut self,
        context: &AgentContext,
        timeout: Duration,
    ) -> Result<OracleVerdict, OracleError> {
        let prompt = self
            .prompts
            .render_decision(context)
            .map_err(|e| render_failed(&e))?;
        let raw = self.respond(RequestKind::Decision, &prompt, timeout)?;
        let verdict = parse::parse_decision(&raw).map_err(|e| malformed(&e, &raw))?;
        debug!(agent = %context.agent_id, day = context.day, ?verdict, "Oracle decision");
        self.cache.insert(RequestKind::Decision, &prompt, raw);
        Ok(verdict)
    }

    fn impact_for(
        &mut self,
        request: &ImpactRequest,
        timeout: Duration,
    ) -> Result<ImpactVerdict, OracleError> {
        let prompt = self
            .prompts
            .render_impact(request)
            .map_err(|e| render_failed(&e))?;
        let raw = self.respond(RequestKind::Impact, &prompt, timeout)?;
        let verdict = parse::parse_impact(&raw).map_err(|e| malformed(&e, &raw))?;
        self.cache.insert(RequestKind::Impact, &prompt, raw);
        Ok(verdict)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use pestel_agents::AgentTraits;
    use pestel_types::{AgentId, AgentKind};

    use super::*;
    use crate::config::{BackendType, LlmBackendConfig};

    fn unreachable_oracle(retries: u32) -> LlmOracle {
        let backend = create_backend(&LlmBackendConfig {
            backend_type: BackendType::Ollama,
            api_url: "http://127.0.0.1:9".to_owned(),
            api_key: String::new(),
            model: "test-model".to_owned(),
        });
        LlmOracle::new(
            backend,
            PromptEngine::builtin().unwrap(),
            ResponseCache::new(16),
            RetryPolicy {
                retries,
                backoff: Duration::from_millis(1),
            },
        )
    }

    fn context() -> AgentContext {
        AgentContext {
            agent_id: AgentId::new("Germany"),
            kind: AgentKind::Country,
            description: "Federal parliamentary republic in Europe".to_owned(),
            day: 2,
            decision_count: 0,
            attributes: BTreeMap::new(),
            traits: AgentTraits::bare(AgentKind::Country),
            relevant_state: Vec::new(),
            recent_by_others: Vec::new(),
            own_recent: Vec::new(),
        }
    }

    #[test]
    fn backoff_doubles() {
        let retry = RetryPolicy {
            retries: 3,
            backoff: Duration::from_millis(250),
        };
        assert_eq!(retry.delay(0), Duration::from_millis(250));
        assert_eq!(retry.delay(1), Duration::from_millis(500));
        assert_eq!(retry.delay(2), Duration::from_millis(1000));
    }

    #[test]
    fn name_carries_backend_and_model() {
        assert_eq!(unreachable_oracle(0).name(), "llm:ollama:test-model");
    }

    #[test]
    fn no_runtime_is_unavailable() {
        let mut oracle = unreachable_oracle(0);
        let result = oracle.decide(&context(), Duration::from_millis(50));
        assert!(matches!(result, Err(OracleError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn current_thread_runtime_is_unavailable() {
        let mut oracle = unreachable_oracle(0);
        let result = oracle.decide(&context(), Duration::from_millis(50));
        assert!(matches!(result, Err(OracleError::Unavailable { .. })));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_backend_fails_without_blocking_past_the_deadline() {
        let mut oracle = unreachable_oracle(1);
        let started = std::time::Instant::now();
        let result = oracle.decide(&context(), Duration::from_millis(500));
        assert!(matches!(
            result,
            Err(OracleError::Unavailable { .. } | OracleError::Timeout { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cached_answers_skip_the_backend() {
        let mut oracle = unreachable_oracle(0);
        let ctx = context();
        let prompt = oracle.prompts.render_decision(&ctx).unwrap();
        oracle.cache.insert(
            RequestKind::Decision,
            &prompt,
            "PARTNERSHIP|Deepen EU energy cooperation|0.8".to_owned(),
        );

        let verdict = oracle.decide(&ctx, Duration::from_millis(50)).unwrap();
        let OracleVerdict::Act { description, .. } = verdict else {
            panic!("expected an action");
        };
        assert_eq!(description, "Deepen EU energy cooperation");
        assert_eq!(oracle.cache_stats().hits, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_cached_text_is_reported_as_malformed() {
        let mut oracle = unreachable_oracle(0);
        let request = ImpactRequest {
            decision: pestel_agents::ImpactDecision {
                description: "Deepen EU energy cooperation".to_owned(),
                decision_type: pestel_types::DecisionType::Partnership,
                confidence: 0.8,
            },
            agent_id: AgentId::new("Germany"),
            kind: AgentKind::Country,
            category: pestel_types::Category::Political,
            category_state: BTreeMap::new(),
        };
        let prompt = oracle.prompts.render_impact(&request).unwrap();
        let raw = "It depends.\nHard to say.".to_owned();
        oracle.cache.insert(RequestKind::Impact, &prompt, raw);

        let result = oracle.impact_for(&request, Duration::from_millis(50));
        assert!(matches!(result, Err(OracleError::Malformed { .. })));
    }
}
