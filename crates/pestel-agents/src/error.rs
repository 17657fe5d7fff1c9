//! Error types for the pestel-agents crate.

use pestel_types::UnknownCategory;

/// Errors raised while loading or validating a roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Failed to read the roster file from disk.
    #[error("failed to read roster file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse the roster YAML.
    #[error("failed to parse roster YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A baseline section names a category outside the PESTEL set.
    #[error("roster baseline: {source}")]
    UnknownCategory {
        /// The rejected category.
        #[from]
        source: UnknownCategory,
    },

    /// Two agents share the same name.
    #[error("duplicate agent name in roster: {name}")]
    DuplicateAgent {
        /// The repeated name.
        name: String,
    },

    /// The roster declares no agents at all.
    #[error("roster declares no agents")]
    Empty,
}

impl From<serde_yml::Error> for RosterError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}
