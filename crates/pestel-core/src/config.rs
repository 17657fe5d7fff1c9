//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `pestel-config.yaml` at the project
//! root. Every section and field is optional; missing values take the
//! defaults documented on each field. Two environment variables override
//! the file:
//!
//! - `PESTEL_SEED` overrides `run.seed`
//! - `PESTEL_SIMULATION_DAYS` overrides `run.simulation_days`

use std::path::{Path, PathBuf};
use std::time::Duration;

use pestel_agents::{DEFAULT_COLLABORATION_BLEND, DEFAULT_SYNC_RATE, InfluenceLimits};
use serde::{Deserialize, Serialize};

use crate::scenario::ScenarioWeights;

/// Highest probability ceiling a scenario may be configured with.
pub const MAX_PROBABILITY_CEILING: f64 = 0.8;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is outside its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Run identity, seed, length, and oracle deadlines.
    #[serde(default)]
    pub run: RunConfig,

    /// Agent behaviour parameters.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Scenario rescoring cadence and weights.
    #[serde(default)]
    pub scenarios: ScenarioConfig,

    /// Scenario clustering.
    #[serde(default)]
    pub clusters: ClusterConfig,

    /// History window.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Country union coordination.
    #[serde(default)]
    pub unions: UnionConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report output.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load, override from the environment, and validate a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or any error
    /// from [`SimulationConfig::parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse, override from the environment, and validate a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.run.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check every range constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.simulation_days == 0 {
            return Err(invalid("run.simulation_days must be at least 1"));
        }
        if self.scenarios.update_interval_days == 0 {
            return Err(invalid("scenarios.update_interval_days must be at least 1"));
        }
        let unit_fields = [
            ("agents.collaboration_probability", self.agents.collaboration_probability),
            ("agents.collaboration_blend", self.agents.collaboration_blend),
            ("agents.sync_rate", self.agents.sync_rate),
            ("scenarios.weights.min_probability", self.scenarios.weights.min_probability),
            ("scenarios.weights.max_probability", self.scenarios.weights.max_probability),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(&format!("{name} must be within [0, 1], got {value}")));
            }
        }
        let weights = &self.scenarios.weights;
        if weights.min_probability > weights.max_probability {
            return Err(invalid("scenarios.weights.min_probability exceeds max_probability"));
        }
        if weights.max_probability > MAX_PROBABILITY_CEILING {
            return Err(invalid(&format!(
                "scenarios.weights.max_probability may not exceed {MAX_PROBABILITY_CEILING}"
            )));
        }
        if self.clusters.challenging_threshold > self.clusters.optimistic_threshold {
            return Err(invalid("clusters.challenging_threshold exceeds optimistic_threshold"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run identity, seed, length, and oracle deadlines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Human-readable run name (default: `"PESTEL Foresight"`).
    #[serde(default = "default_run_name")]
    pub name: String,

    /// Seed for every random draw in the run (default: 42).
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of simulated days (default: 30).
    #[serde(default = "default_simulation_days")]
    pub simulation_days: u64,

    /// Deadline for one decision call, in milliseconds (default: 5000).
    #[serde(default = "default_decision_timeout_ms")]
    pub decision_timeout_ms: u64,

    /// Deadline for one impact call, in milliseconds (default: 3000).
    #[serde(default = "default_impact_timeout_ms")]
    pub impact_timeout_ms: u64,
}

impl RunConfig {
    /// Decision deadline as a [`Duration`].
    pub const fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    /// Impact deadline as a [`Duration`].
    pub const fn impact_timeout(&self) -> Duration {
        Duration::from_millis(self.impact_timeout_ms)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(seed) = env_number("PESTEL_SEED") {
            self.seed = seed;
        }
        if let Some(days) = env_number("PESTEL_SIMULATION_DAYS") {
            self.simulation_days = days;
        }
    }
}

fn env_number(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: default_run_name(),
            seed: default_seed(),
            simulation_days: default_simulation_days(),
            decision_timeout_ms: default_decision_timeout_ms(),
            impact_timeout_ms: default_impact_timeout_ms(),
        }
    }
}

fn default_run_name() -> String {
    "PESTEL Foresight".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_simulation_days() -> u64 {
    30
}

const fn default_decision_timeout_ms() -> u64 {
    5000
}

const fn default_impact_timeout_ms() -> u64 {
    3000
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Agent behaviour parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Graph neighbours a decision is propagated to (default: 3).
    #[serde(default = "default_max_propagation_targets")]
    pub max_propagation_targets: usize,

    /// Relevant actions by other agents shown in a decision context
    /// (default: 3).
    #[serde(default = "default_recent_context_actions")]
    pub recent_context_actions: usize,

    /// Days before today whose own actions count as recent activity in a
    /// decision context (default: 3, so four days including today).
    #[serde(default = "default_own_activity_window_days")]
    pub own_activity_window_days: u64,

    /// Daily chance that one random pair collaborates (default: 0.2).
    #[serde(default = "default_collaboration_probability")]
    pub collaboration_probability: f64,

    /// How far collaborating scalars move toward their average (default: 0.5).
    #[serde(default = "default_collaboration_blend")]
    pub collaboration_blend: f64,

    /// Step toward the global indicator per daily sync (default: 0.1).
    #[serde(default = "default_sync_rate")]
    pub sync_rate: f64,

    /// Influence graph relation caps.
    #[serde(default)]
    pub influence: InfluenceLimits,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_propagation_targets: default_max_propagation_targets(),
            recent_context_actions: default_recent_context_actions(),
            own_activity_window_days: default_own_activity_window_days(),
            collaboration_probability: default_collaboration_probability(),
            collaboration_blend: default_collaboration_blend(),
            sync_rate: default_sync_rate(),
            influence: InfluenceLimits::default(),
        }
    }
}

const fn default_max_propagation_targets() -> usize {
    pestel_agents::DEFAULT_PROPAGATION_FANOUT
}

const fn default_recent_context_actions() -> usize {
    3
}

const fn default_own_activity_window_days() -> u64 {
    3
}

const fn default_collaboration_probability() -> f64 {
    0.2
}

const fn default_collaboration_blend() -> f64 {
    DEFAULT_COLLABORATION_BLEND
}

const fn default_sync_rate() -> f64 {
    DEFAULT_SYNC_RATE
}

// ---------------------------------------------------------------------------
// Scenarios and clusters
// ---------------------------------------------------------------------------

/// Scenario rescoring cadence and weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Rescore every this many days (default: 7).
    #[serde(default = "default_update_interval_days")]
    pub update_interval_days: u64,

    /// Scoring weights.
    #[serde(default)]
    pub weights: ScenarioWeights,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            update_interval_days: default_update_interval_days(),
            weights: ScenarioWeights::default(),
        }
    }
}

const fn default_update_interval_days() -> u64 {
    7
}

/// Scenario clustering by projected outlook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Outlook indicators averaged into the composite score.
    #[serde(default = "default_cluster_indicators")]
    pub indicators: Vec<String>,

    /// Composite score above which a scenario is optimistic (default: 0.6).
    #[serde(default = "default_optimistic_threshold")]
    pub optimistic_threshold: f64,

    /// Composite score below which a scenario is challenging (default: 0.3).
    #[serde(default = "default_challenging_threshold")]
    pub challenging_threshold: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            indicators: default_cluster_indicators(),
            optimistic_threshold: default_optimistic_threshold(),
            challenging_threshold: default_challenging_threshold(),
        }
    }
}

fn default_cluster_indicators() -> Vec<String> {
    vec![
        "economic_growth_rate".to_owned(),
        "world_peace_index".to_owned(),
        "resource_availability".to_owned(),
    ]
}

const fn default_optimistic_threshold() -> f64 {
    0.6
}

const fn default_challenging_threshold() -> f64 {
    0.3
}

// ---------------------------------------------------------------------------
// History, unions, logging, output
// ---------------------------------------------------------------------------

/// Sliding history window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Days of decisions, changes, and interactions kept in the window
    /// (default: 7).
    #[serde(default = "default_window_days")]
    pub window_days: u64,

    /// Keep the full run archive for the report (default: true).
    #[serde(default = "default_true")]
    pub retain_full: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            retain_full: true,
        }
    }
}

const fn default_window_days() -> u64 {
    7
}

const fn default_true() -> bool {
    true
}

/// Country union coordination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionConfig {
    /// Coordinate every this many days; 0 disables (default: 3).
    #[serde(default = "default_coordination_interval_days")]
    pub coordination_interval_days: u64,
}

impl Default for UnionConfig {
    fn default() -> Self {
        Self {
            coordination_interval_days: default_coordination_interval_days(),
        }
    }
}

const fn default_coordination_interval_days() -> u64 {
    3
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (default: `"info"`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (default: pretty).
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

/// Report output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where the JSON run report is written (default: `pestel-report.json`).
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
        }
    }
}

fn default_report_path() -> PathBuf {
    PathBuf::from("pestel-report.json")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: SimulationConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.run.seed, 42);
        assert_eq!(config.run.simulation_days, 30);
        assert_eq!(config.agents.max_propagation_targets, 3);
        assert_eq!(config.scenarios.update_interval_days, 7);
        assert_eq!(config.history.window_days, 7);
        assert!(config.history.retain_full);
        assert_eq!(config.unions.coordination_interval_days, 3);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = r"
run:
  simulation_days: 12
agents:
  collaboration_probability: 0.5
  influence:
    industry_peers: 1
scenarios:
  weights:
    max_probability: 0.8
logging:
  format: json
";
        let config: SimulationConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.run.simulation_days, 12);
        assert_eq!(config.run.decision_timeout_ms, 5000);
        assert_eq!(config.agents.influence.industry_peers, 1);
        assert_eq!(config.agents.influence.regional_peers, 3);
        assert!((config.scenarios.weights.max_probability - 0.8).abs() < f64::EPSILON);
        assert!((config.scenarios.weights.momentum_decay - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_days() {
        let mut config = SimulationConfig::default();
        config.run.simulation_days = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_zero_rescore_interval() {
        let mut config = SimulationConfig::default();
        config.scenarios.update_interval_days = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_inverted_probability_bounds() {
        let mut config = SimulationConfig::default();
        config.scenarios.weights.min_probability = 0.5;
        config.scenarios.weights.max_probability = 0.4;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_probabilities_outside_unit_range() {
        let mut config = SimulationConfig::default();
        config.agents.collaboration_probability = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = SimulationConfig::default();
        config.scenarios.weights.max_probability = 0.9;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn bad_yaml_is_a_yaml_error() {
        assert!(matches!(
            SimulationConfig::parse("run: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
