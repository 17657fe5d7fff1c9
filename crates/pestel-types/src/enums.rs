//! Enumeration types for the PESTEL foresight simulation.
//!
//! The category set is closed: every state read or write names one of the
//! six [`Category`] variants, and free-form category strings are parsed once
//! at the boundary with [`Category::from_str`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::text::mentions_any;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// One of the six PESTEL categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Policies, stability, trade, international relations.
    Political,
    /// Growth, inflation, markets, investment.
    Economic,
    /// Demographics, education, health, lifestyle.
    Social,
    /// Innovation, automation, research and development.
    Technological,
    /// Climate, sustainability, resources.
    Environmental,
    /// Regulation, labour law, intellectual property.
    Legal,
}

impl Category {
    /// All categories in canonical P-E-S-T-E-L order.
    pub const ALL: [Self; 6] = [
        Self::Political,
        Self::Economic,
        Self::Social,
        Self::Technological,
        Self::Environmental,
        Self::Legal,
    ];

    /// Lowercase name used in logs, prompts, and change records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Political => "political",
            Self::Economic => "economic",
            Self::Social => "social",
            Self::Technological => "technological",
            Self::Environmental => "environmental",
            Self::Legal => "legal",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category string that names none of the six categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown PESTEL category: {input:?}")]
pub struct UnknownCategory {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Parse a full category name or one of the short aliases
    /// (`p`, `e`, `s`, `t`, `env`, `l`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "political" | "p" => Ok(Self::Political),
            "economic" | "e" => Ok(Self::Economic),
            "social" | "s" => Ok(Self::Social),
            "technological" | "t" => Ok(Self::Technological),
            "environmental" | "env" => Ok(Self::Environmental),
            "legal" | "l" => Ok(Self::Legal),
            _ => Err(UnknownCategory {
                input: s.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Agent kinds
// ---------------------------------------------------------------------------

/// The kind of an agent, used for quick type tests and kind-gated rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// A corporation with an industry and a home country.
    Company,
    /// A nation state with a region and optional union membership.
    Country,
    /// A research institution with one or more fields.
    Researcher,
}

impl AgentKind {
    /// Lowercase name for logs and prompts.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Country => "country",
            Self::Researcher => "researcher",
        }
    }
}

impl core::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Decision types
// ---------------------------------------------------------------------------

/// Tag describing what kind of move a decision represents.
///
/// The tag selects which local factor a neighbour's influence note lands in
/// (see [`DecisionType::propagation_target`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionType {
    /// Technology rollout or adoption.
    Technology,
    /// Research or innovation programme.
    Research,
    /// Partnership, alliance, or cooperation agreement.
    Partnership,
    /// Capital investment or expansion.
    Investment,
    /// Product or programme launch.
    Development,
    /// Climate or sustainability commitment.
    Sustainability,
    /// Anything else.
    Strategic,
}

impl DecisionType {
    /// Uppercase wire tag, as used by the oracle text protocol.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technology => "TECHNOLOGY",
            Self::Research => "RESEARCH",
            Self::Partnership => "PARTNERSHIP",
            Self::Investment => "INVESTMENT",
            Self::Development => "DEVELOPMENT",
            Self::Sustainability => "SUSTAINABILITY",
            Self::Strategic => "STRATEGIC",
        }
    }

    /// Parse a tag case-insensitively. Unknown tags become [`Self::Strategic`].
    pub fn parse_tag(tag: &str) -> Self {
        match tag.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "TECHNOLOGY" | "TECH" => Self::Technology,
            "RESEARCH" => Self::Research,
            "PARTNERSHIP" => Self::Partnership,
            "INVESTMENT" => Self::Investment,
            "DEVELOPMENT" => Self::Development,
            "SUSTAINABILITY" => Self::Sustainability,
            _ => Self::Strategic,
        }
    }

    /// Infer a tag from a free-text description.
    ///
    /// Rules are checked in order; the first match wins.
    pub fn classify(description: &str) -> Self {
        if mentions_any(description, &["research", "innovation"]) {
            Self::Research
        } else if mentions_any(description, &["partnership", "cooperation"]) {
            Self::Partnership
        } else if mentions_any(description, &["investment", "expand"]) {
            Self::Investment
        } else if mentions_any(description, &["launch", "develop"]) {
            Self::Development
        } else if mentions_any(description, &["sustainability", "climate"]) {
            Self::Sustainability
        } else {
            Self::Strategic
        }
    }

    /// The single local factor an influence note for this tag is written to.
    pub const fn propagation_target(self) -> (Category, &'static str) {
        match self {
            Self::Technology | Self::Research => (Category::Technological, "innovation_ecosystem"),
            Self::Partnership => (Category::Political, "international_relations"),
            Self::Sustainability => (Category::Environmental, "climate_leadership"),
            Self::Investment | Self::Development | Self::Strategic => {
                (Category::Economic, "market_dynamics")
            }
        }
    }
}

impl core::fmt::Display for DecisionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a decision or impact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOrigin {
    /// Answered by the primary (AI-backed) oracle.
    Oracle,
    /// Answered by the deterministic rule engine.
    Fallback,
}

impl DecisionOrigin {
    /// Short label for logs and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::Fallback => "fallback",
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario sectors and clusters
// ---------------------------------------------------------------------------

/// Thematic sector a future scenario belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    /// AI, quantum, and other frontier technology futures.
    Technology,
    /// Climate and green-transition futures.
    Environment,
    /// Multipolar and bloc-driven futures.
    Geopolitics,
    /// Digital economy and virtual-society futures.
    Digital,
    /// Biotech and ageing-society futures.
    Healthcare,
    /// Futures with no single dominant theme.
    Mixed,
}

impl Sector {
    /// Derive a sector from keywords in a scenario name.
    pub fn infer(scenario_name: &str) -> Self {
        if mentions_any(scenario_name, &["ai", "quantum"]) {
            Self::Technology
        } else if mentions_any(scenario_name, &["green", "climate"]) {
            Self::Environment
        } else if mentions_any(scenario_name, &["multipolar", "bloc"]) {
            Self::Geopolitics
        } else if mentions_any(scenario_name, &["digital", "virtual"]) {
            Self::Digital
        } else if mentions_any(scenario_name, &["biotech", "aging", "ageing"]) {
            Self::Healthcare
        } else {
            Self::Mixed
        }
    }

    /// Display name used in reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Environment => "Environment",
            Self::Geopolitics => "Geopolitics",
            Self::Digital => "Digital",
            Self::Healthcare => "Healthcare",
            Self::Mixed => "Mixed",
        }
    }
}

impl core::fmt::Display for Sector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative bucket a scenario falls into by composite outlook score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterKind {
    /// Composite score above the optimistic threshold.
    Optimistic,
    /// Composite score below the challenging threshold.
    Challenging,
    /// Everything in between.
    Outlier,
}

impl ClusterKind {
    /// Human-readable cluster label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimistic => "Optimistic Scenarios",
            Self::Challenging => "Challenging Scenarios",
            Self::Outlier => "Outlier Scenarios",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_aliases_parse() {
        assert_eq!("p".parse::<Category>().ok(), Some(Category::Political));
        assert_eq!(
            "ENV".parse::<Category>().ok(),
            Some(Category::Environmental)
        );
        assert_eq!(" legal ".parse::<Category>().ok(), Some(Category::Legal));
        assert_eq!(
            "Economic".parse::<Category>().ok(),
            Some(Category::Economic)
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = "geographic".parse::<Category>();
        assert_eq!(
            err,
            Err(UnknownCategory {
                input: "geographic".to_owned()
            })
        );
    }

    #[test]
    fn category_order_is_pestel() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names.join(" "),
            "political economic social technological environmental legal"
        );
    }

    #[test]
    fn classify_follows_rule_order() {
        assert_eq!(
            DecisionType::classify("Expand precision medicine research programs"),
            DecisionType::Research
        );
        assert_eq!(
            DecisionType::classify("Strengthen international cooperation agreements"),
            DecisionType::Partnership
        );
        assert_eq!(
            DecisionType::classify("Expand international market presence"),
            DecisionType::Investment
        );
        assert_eq!(
            DecisionType::classify("Launch national digital transformation program"),
            DecisionType::Development
        );
        assert_eq!(
            DecisionType::classify("Implement comprehensive climate action plan"),
            DecisionType::Sustainability
        );
        assert_eq!(
            DecisionType::classify("Implement advanced cybersecurity infrastructure"),
            DecisionType::Strategic
        );
    }

    #[test]
    fn parse_tag_is_lenient() {
        assert_eq!(
            DecisionType::parse_tag("sustainability"),
            DecisionType::Sustainability
        );
        assert_eq!(DecisionType::parse_tag("Research"), DecisionType::Research);
        assert_eq!(DecisionType::parse_tag("mystery"), DecisionType::Strategic);
    }

    #[test]
    fn propagation_targets() {
        assert_eq!(
            DecisionType::Sustainability.propagation_target(),
            (Category::Environmental, "climate_leadership")
        );
        assert_eq!(
            DecisionType::Research.propagation_target().0,
            Category::Technological
        );
        assert_eq!(
            DecisionType::Partnership.propagation_target().0,
            Category::Political
        );
        assert_eq!(
            DecisionType::Strategic.propagation_target().0,
            Category::Economic
        );
    }

    #[test]
    fn sector_inference() {
        assert_eq!(Sector::infer("AI Supremacy"), Sector::Technology);
        assert_eq!(
            Sector::infer("Green Transition Triumph"),
            Sector::Environment
        );
        assert_eq!(
            Sector::infer("Regional Bloc Dominance"),
            Sector::Geopolitics
        );
        assert_eq!(Sector::infer("Digital Economy Supremacy"), Sector::Digital);
        assert_eq!(
            Sector::infer("Aging Society Adaptation"),
            Sector::Healthcare
        );
        assert_eq!(Sector::infer("Democratic Renaissance"), Sector::Mixed);
    }
}
