//! Static definitions of alternative-future scenarios.
//!
//! Definitions are loaded with the roster and never change during a run. The
//! scenario engine wraps each one with runtime probability and momentum.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::Sector;
use crate::ids::ScenarioId;
use crate::text::mentions;

/// Keyword sets derived from scenario names when a definition lists none.
const NAME_KEYWORDS: &[(&str, &[&str])] = &[
    ("ai", &["ai", "artificial intelligence"]),
    ("green", &["climate", "sustainable", "renewable"]),
    ("quantum", &["quantum"]),
    ("biotech", &["biotech", "medicine", "health"]),
    ("digital", &["digital", "virtual", "online"]),
    ("multipolar", &["alliance", "cooperation", "trade"]),
];

/// A named hypothesis about where the simulated world is heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Unique scenario name.
    pub name: ScenarioId,
    /// One-line narrative.
    #[serde(default)]
    pub description: String,
    /// Prior probability the score is anchored to.
    pub base_probability: f64,
    /// Lowercase keywords that make an action relevant to this scenario.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Thematic sector; inferred from the name when absent.
    #[serde(default)]
    pub sector: Option<Sector>,
    /// What the world looks like if this scenario plays out.
    #[serde(default)]
    pub implications: String,
    /// Indicators an analyst would watch for this scenario.
    #[serde(default)]
    pub key_indicators: Vec<String>,
    /// Projected numeric indicators used for clustering.
    #[serde(default)]
    pub outlook: BTreeMap<String, f64>,
}

impl ScenarioDefinition {
    /// Create a minimal definition with only a name and base probability.
    pub fn new(name: impl Into<String>, base_probability: f64) -> Self {
        Self {
            name: ScenarioId::new(name),
            description: String::new(),
            base_probability,
            keywords: Vec::new(),
            sector: None,
            implications: String::new(),
            key_indicators: Vec::new(),
            outlook: BTreeMap::new(),
        }
    }

    /// The configured sector, or the one inferred from the name.
    pub fn effective_sector(&self) -> Sector {
        self.sector
            .unwrap_or_else(|| Sector::infer(self.name.as_str()))
    }

    /// The configured keywords, or the set derived from the name.
    pub fn effective_keywords(&self) -> Vec<String> {
        if !self.keywords.is_empty() {
            return self.keywords.iter().map(|k| k.to_lowercase()).collect();
        }
        NAME_KEYWORDS
            .iter()
            .filter(|(trigger, _)| mentions(self.name.as_str(), trigger))
            .flat_map(|(_, keywords)| keywords.iter().map(|k| (*k).to_owned()))
            .collect()
    }

    /// Return `true` if `description` mentions any of the effective keywords.
    pub fn is_relevant(&self, description: &str) -> bool {
        self.effective_keywords()
            .iter()
            .any(|keyword| mentions(description, keyword))
    }
}
