//! Prompt template loading and rendering via `minijinja`.
//!
//! Three templates drive every call: `system`, `decision` and `impact`. The
//! built-in set is compiled into the binary; a directory holding all three
//! files replaces it so operators can tune wording without recompiling.

use std::path::Path;

use minijinja::Environment;
use pestel_agents::{AgentContext, ImpactRequest};
use serde::Serialize;

use crate::error::OracleServiceError;

const TEMPLATE_NAMES: [&str; 3] = ["system", "decision", "impact"];

const BUILTIN_SYSTEM: &str = include_str!("../templates/system.j2");
const BUILTIN_DECISION: &str = include_str!("../templates/decision.j2");
const BUILTIN_IMPACT: &str = include_str!("../templates/impact.j2");

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderedPrompt {
    /// System message establishing the agent's role.
    pub system: String,
    /// User message carrying the question.
    pub user: String,
}

/// Renders oracle requests into prompts.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Engine with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Template`] if a built-in template does
    /// not compile.
    pub fn builtin() -> Result<Self, OracleServiceError> {
        let mut env = Environment::new();
        env.add_template("system", BUILTIN_SYSTEM)?;
        env.add_template("decision", BUILTIN_DECISION)?;
        env.add_template("impact", BUILTIN_IMPACT)?;
        Ok(Self { env })
    }

    /// Engine with templates read from `dir`.
    ///
    /// The directory must contain `system.j2`, `decision.j2` and
    /// `impact.j2`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Template`] if a file is missing or does
    /// not compile.
    pub fn from_dir(dir: &Path) -> Result<Self, OracleServiceError> {
        let mut env = Environment::new();
        for name in TEMPLATE_NAMES {
            let path = dir.join(format!("{name}.j2"));
            let source = std::fs::read_to_string(&path).map_err(|e| {
                OracleServiceError::Template {
                    message: format!("failed to read {}: {e}", path.display()),
                }
            })?;
            env.add_template_owned(name, source)?;
        }
        Ok(Self { env })
    }

    /// Built-in templates, or the ones in `dir` when given.
    ///
    /// # Errors
    ///
    /// See [`PromptEngine::builtin`] and [`PromptEngine::from_dir`].
    pub fn load(dir: Option<&Path>) -> Result<Self, OracleServiceError> {
        dir.map_or_else(Self::builtin, Self::from_dir)
    }

    /// Render the "should this agent act today" prompt.
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Template`] if rendering fails.
    pub fn render_decision(
        &self,
        context: &AgentContext,
    ) -> Result<RenderedPrompt, OracleServiceError> {
        self.render("decision", context)
    }

    /// Render the "what does this decision change" prompt.
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Template`] if rendering fails.
    pub fn render_impact(
        &self,
        request: &ImpactRequest,
    ) -> Result<RenderedPrompt, OracleServiceError> {
        self.render("impact", request)
    }

    fn render<S: Serialize>(
        &self,
        user_template: &str,
        ctx: &S,
    ) -> Result<RenderedPrompt, OracleServiceError> {
        let system = self.env.get_template("system")?.render(ctx)?;
        let user = self.env.get_template(user_template)?.render(ctx)?;
        Ok(RenderedPrompt {
            system: system.trim().to_owned(),
            user: user.trim().to_owned(),
        })
    }
}
