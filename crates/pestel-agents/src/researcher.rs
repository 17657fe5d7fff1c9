//! Research institution agents.

use pestel_types::{AgentId, AgentKind, Category, StateChange, mentions};
use rand::Rng;

use crate::agent::{Agent, AgentCore, AgentTraits, SyncTarget};
use crate::profile::ResearcherProfile;

/// Starting funding availability before any sync.
const INITIAL_FUNDING_AVAILABILITY: f64 = 0.5;

/// Institutions drawn from the top impact band.
const TOP_TIER: [&str; 3] = ["MIT", "Stanford", "Harvard"];

/// Institutions drawn from the second band.
const SECOND_TIER: [&str; 2] = ["Chinese Academy", "Max Planck"];

/// A research institution.
#[derive(Debug, Clone)]
pub struct ResearcherAgent {
    core: AgentCore,
    profile: ResearcherProfile,
}

impl ResearcherAgent {
    /// Build an institution, drawing its research impact from `rng`.
    pub fn new<R: Rng + ?Sized>(profile: ResearcherProfile, rng: &mut R) -> Self {
        let mut core = AgentCore::new(AgentId::new(profile.name.as_str()), AgentKind::Researcher);
        let research_impact = research_impact(&profile.name, rng);
        core.set_attribute("research_impact", research_impact);
        core.set_attribute("funding_availability", INITIAL_FUNDING_AVAILABILITY);

        let mut agent = Self { core, profile };
        agent.seed_local_state(research_impact);
        agent
    }

    /// The static profile.
    pub const fn profile(&self) -> &ResearcherProfile {
        &self.profile
    }

    fn fields_text(&self) -> String {
        self.profile.fields.join(", ")
    }

    fn seed_local_state(&mut self, impact: f64) {
        let fields = self.fields_text();
        let p = &self.profile;
        let seeds = [
            (
                Category::Political,
                "research_policy",
                format!(
                    "{} operates under {} research governance",
                    p.name, p.country
                ),
            ),
            (
                Category::Economic,
                "commercialization",
                format!("Technology transfer programs for {fields} research"),
            ),
            (
                Category::Social,
                "academic_community",
                format!("Leading position in global {fields} research community"),
            ),
            (
                Category::Technological,
                "research_infrastructure",
                format!("Research facilities for {fields} with impact score {impact:.2}"),
            ),
            (
                Category::Environmental,
                "climate_research",
                "Active climate research programs".to_owned(),
            ),
            (
                Category::Legal,
                "research_ethics",
                "Institutional review and research ethics framework".to_owned(),
            ),
        ];
        for (category, factor, value) in seeds {
            self.core.note(category, factor, value);
        }
    }
}

fn research_impact<R: Rng + ?Sized>(name: &str, rng: &mut R) -> f64 {
    if TOP_TIER.iter().any(|n| name.contains(n)) {
        rng.random_range(0.9..1.0)
    } else if SECOND_TIER.iter().any(|n| name.contains(n)) {
        rng.random_range(0.8..1.0)
    } else {
        rng.random_range(0.6..0.9)
    }
}

impl Agent for ResearcherAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn traits(&self) -> AgentTraits {
        AgentTraits {
            country: Some(self.profile.country.clone()),
            fields: self.profile.fields.clone(),
            ..AgentTraits::bare(AgentKind::Researcher)
        }
    }

    fn describe(&self) -> String {
        let p = &self.profile;
        format!(
            "{} ({}) - Fields: {}, Location: {}, Type: {}",
            p.name,
            p.country,
            self.fields_text(),
            p.location,
            p.institution_type
        )
    }

    fn sync_target(&self) -> SyncTarget {
        SyncTarget {
            attribute: "funding_availability",
            category: Category::Technological,
            factor: "technology_advancement",
        }
    }

    fn shared_scalar(&self) -> &'static str {
        "research_impact"
    }

    fn is_relevant(&self, change: &StateChange) -> bool {
        let value = change.new_value().to_string();
        self.profile.fields.iter().any(|f| mentions(&value, f))
            || matches!(
                change.category(),
                Category::Technological | Category::Social
            )
    }

    fn respond_to(&self, change: &StateChange) -> (&'static str, String) {
        (
            "research_response",
            format!(
                "Research strategy adapted to leverage {} developments in {}",
                change.new_value(),
                change.category()
            ),
        )
    }
}
