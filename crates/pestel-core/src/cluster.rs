//! Descriptive grouping of scenarios by projected outlook.
//!
//! Each scenario's composite score is the mean of the configured outlook
//! indicators, with a missing indicator counted as zero. Clustering never
//! writes back into probabilities.

use std::collections::BTreeMap;

use pestel_types::{ClusterKind, ScenarioId};
use serde::Serialize;

use crate::config::ClusterConfig;
use crate::scenario::Scenario;

/// One non-empty bucket of scenarios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioCluster {
    /// Bucket.
    pub kind: ClusterKind,
    /// Human-readable bucket label.
    pub label: &'static str,
    /// Member scenario names in definition order.
    pub scenarios: Vec<ScenarioId>,
    /// Number of members.
    pub count: usize,
    /// Mean current probability of the members.
    pub mean_probability: f64,
    /// Mean value of each indicator across the members.
    pub mean_indicators: BTreeMap<String, f64>,
}

/// Buckets scenarios into optimistic, challenging, and outlier clusters.
#[derive(Debug, Clone)]
pub struct ClusterAnalyzer {
    indicators: Vec<String>,
    optimistic_threshold: f64,
    challenging_threshold: f64,
}

impl ClusterAnalyzer {
    /// Build an analyzer from configuration.
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            indicators: config.indicators.clone(),
            optimistic_threshold: config.optimistic_threshold,
            challenging_threshold: config.challenging_threshold,
        }
    }

    /// Mean of the configured indicators in `scenario`'s outlook.
    pub fn score(&self, scenario: &Scenario) -> f64 {
        if self.indicators.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .indicators
            .iter()
            .map(|name| indicator(scenario, name))
            .sum();
        total / count_f64(self.indicators.len())
    }

    /// Bucket for a composite score.
    pub fn classify(&self, score: f64) -> ClusterKind {
        if score > self.optimistic_threshold {
            ClusterKind::Optimistic
        } else if score < self.challenging_threshold {
            ClusterKind::Challenging
        } else {
            ClusterKind::Outlier
        }
    }

    /// Non-empty clusters in optimistic, challenging, outlier order.
    pub fn analyze(&self, scenarios: &[Scenario]) -> Vec<ScenarioCluster> {
        let mut buckets: BTreeMap<ClusterKind, Vec<&Scenario>> = BTreeMap::new();
        for scenario in scenarios {
            buckets
                .entry(self.classify(self.score(scenario)))
                .or_default()
                .push(scenario);
        }
        buckets
            .into_iter()
            .map(|(kind, members)| self.summarize(kind, &members))
            .collect()
    }

    fn summarize(&self, kind: ClusterKind, members: &[&Scenario]) -> ScenarioCluster {
        let n = count_f64(members.len());
        let mean_probability = members.iter().map(|s| s.probability).sum::<f64>() / n;
        let mean_indicators = self
            .indicators
            .iter()
            .map(|name| {
                let total: f64 = members.iter().map(|s| indicator(s, name)).sum();
                (name.clone(), total / n)
            })
            .collect();
        ScenarioCluster {
            kind,
            label: kind.label(),
            scenarios: members.iter().map(|s| s.name().clone()).collect(),
            count: members.len(),
            mean_probability,
            mean_indicators,
        }
    }
}

fn indicator(scenario: &Scenario, name: &str) -> f64 {
    let outlook = &scenario.definition.outlook;
    outlook.get(name).copied().unwrap_or(0.0)
}

fn count_f64(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}
