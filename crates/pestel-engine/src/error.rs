//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps one subsystem's error so `main` can propagate with
/// `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: pestel_core::ConfigError,
    },

    /// Roster loading or validation failed.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: pestel_agents::RosterError,
    },

    /// The LLM oracle could not be configured.
    #[error("oracle error: {source}")]
    Oracle {
        /// The underlying oracle service error.
        #[from]
        source: pestel_oracle::OracleServiceError,
    },

    /// The simulation halted on an invariant violation.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: pestel_core::RunnerError,
    },

    /// Writing the run report failed.
    #[error("report error: {source}")]
    Report {
        /// The underlying report error.
        #[from]
        source: pestel_core::ReportError,
    },
}
