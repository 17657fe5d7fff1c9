//! Static agent profiles and the roster that lists them.
//!
//! A roster is loaded once from YAML and is read-only afterwards. It carries
//! everything a run is seeded from: the agents in processing order, country
//! unions, the alternative-future scenarios, and the baseline world state.
//!
//! Processing order is companies, then countries, then researchers, each in
//! file order.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use pestel_types::{Category, FactorValue, ScenarioDefinition, StructuredState};
use serde::{Deserialize, Serialize};

use crate::error::RosterError;

/// A corporation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Company name, also its agent id.
    pub name: String,
    /// Industry, possibly comma-separated (`"Automotive, Energy"`).
    pub industry: String,
    /// Home country name.
    pub country: String,
    /// Headquarters city or state.
    #[serde(default)]
    pub headquarters: String,
    /// Annual revenue in millions of USD.
    pub revenue_musd: f64,
    /// One-line description.
    #[serde(default)]
    pub description: String,
}

/// A nation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    /// Country name, also its agent id.
    pub name: String,
    /// Geographic region (`"Europe"`, `"Asia"`, ...).
    pub region: String,
    /// `"Developed"` or `"Emerging"`.
    pub development_level: String,
    /// Form of government.
    #[serde(default)]
    pub government_type: String,
    /// Population in persons.
    pub population: f64,
    /// GDP in millions of USD.
    pub gdp_musd: f64,
    /// Currency code.
    #[serde(default)]
    pub currency: String,
    /// Primary language(s).
    #[serde(default)]
    pub language: String,
}

impl CountryProfile {
    /// Return `true` for developed economies.
    pub fn is_developed(&self) -> bool {
        self.development_level.eq_ignore_ascii_case("developed")
    }
}

/// A research institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearcherProfile {
    /// Institution name, also its agent id.
    pub name: String,
    /// Host country name.
    pub country: String,
    /// Research fields.
    pub fields: Vec<String>,
    /// University, government lab, independent, ...
    #[serde(default)]
    pub institution_type: String,
    /// City.
    #[serde(default)]
    pub location: String,
    /// One-line description.
    #[serde(default)]
    pub description: String,
}

/// An international organisation grouping several countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryUnion {
    /// Union name.
    pub name: String,
    /// Union kind (trade agreement, security alliance, ...).
    #[serde(default)]
    pub kind: String,
    /// Member country names.
    pub members: Vec<String>,
}

/// A borrowed profile of any agent kind, in roster order.
#[derive(Debug, Clone, Copy)]
pub enum Profile<'a> {
    /// A company profile.
    Company(&'a CompanyProfile),
    /// A country profile.
    Country(&'a CountryProfile),
    /// A researcher profile.
    Researcher(&'a ResearcherProfile),
}

impl<'a> Profile<'a> {
    /// The profile's name, borrowed from the roster.
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Company(p) => &p.name,
            Self::Country(p) => &p.name,
            Self::Researcher(p) => &p.name,
        }
    }
}

/// Everything a run is seeded from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Companies, processed first.
    #[serde(default)]
    pub companies: Vec<CompanyProfile>,
    /// Countries, processed second.
    #[serde(default)]
    pub countries: Vec<CountryProfile>,
    /// Research institutions, processed last.
    #[serde(default)]
    pub researchers: Vec<ResearcherProfile>,
    /// Country unions for periodic coordination.
    #[serde(default)]
    pub unions: Vec<CountryUnion>,
    /// Alternative-future scenarios.
    #[serde(default)]
    pub scenarios: Vec<ScenarioDefinition>,
    /// Baseline global state: category name, then factor, then value.
    #[serde(default)]
    pub baseline: BTreeMap<String, BTreeMap<String, FactorValue>>,
}

impl Roster {
    /// Load and validate a roster from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Io`] if the file cannot be read, or any
    /// parsing or validation error from [`Roster::parse`].
    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate a roster from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Yaml`] on invalid YAML, or a validation error
    /// from [`Roster::validate`].
    pub fn parse(yaml: &str) -> Result<Self, RosterError> {
        let roster: Self = serde_yml::from_str(yaml)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Check agent names are unique and baseline categories are known.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Empty`], [`RosterError::DuplicateAgent`], or
    /// [`RosterError::UnknownCategory`].
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.agent_count() == 0 {
            return Err(RosterError::Empty);
        }
        let mut seen = BTreeSet::new();
        for profile in self.profiles() {
            if !seen.insert(profile.name()) {
                return Err(RosterError::DuplicateAgent {
                    name: profile.name().to_owned(),
                });
            }
        }
        for category in self.baseline.keys() {
            category.parse::<Category>()?;
        }
        Ok(())
    }

    /// Total number of agents.
    pub fn agent_count(&self) -> usize {
        self.companies
            .len()
            .saturating_add(self.countries.len())
            .saturating_add(self.researchers.len())
    }

    /// Iterate every profile in processing order.
    pub fn profiles(&self) -> impl Iterator<Item = Profile<'_>> {
        self.companies
            .iter()
            .map(Profile::Company)
            .chain(self.countries.iter().map(Profile::Country))
            .chain(self.researchers.iter().map(Profile::Researcher))
    }

    /// Build the initial global state from the baseline section.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownCategory`] for an unknown category key.
    pub fn baseline_state(&self) -> Result<StructuredState, RosterError> {
        let mut state = StructuredState::new();
        for (category, factors) in &self.baseline {
            let category: Category = category.parse()?;
            for (factor, value) in factors {
                state.set(category, factor.as_str(), value.clone());
            }
        }
        Ok(state)
    }
}
