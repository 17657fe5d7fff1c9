//! Error types for the oracle service.
//!
//! None of these reach the simulation core directly. [`LlmOracle`] maps them
//! onto [`OracleError`](pestel_agents::OracleError) so the oracle chain can
//! fall back.
//!
//! [`LlmOracle`]: crate::oracle::LlmOracle

/// Errors raised while configuring or calling an LLM backend.
#[derive(Debug, thiserror::Error)]
pub enum OracleServiceError {
    /// Configuration is invalid or missing.
    #[error("oracle config error: {reason}")]
    Config {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Failed to load or render a prompt template.
    #[error("template error: {message}")]
    Template {
        /// Description of the failure.
        message: String,
    },

    /// The backend returned an error or was unreachable.
    #[error("LLM backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },

    /// The response does not follow the oracle text protocol.
    #[error("response parse error: {message}")]
    Parse {
        /// Description of what failed to parse.
        message: String,
    },
}

impl From<minijinja::Error> for OracleServiceError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template {
            message: err.to_string(),
        }
    }
}

impl OracleServiceError {
    /// Shorthand for a [`Self::Config`] error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`Self::Backend`] error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Self::Parse`] error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
