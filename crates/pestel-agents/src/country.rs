//! Country agents.

use pestel_types::{AgentId, AgentKind, Category, StateChange, mentions};

use crate::agent::{Agent, AgentCore, AgentTraits, SyncTarget};
use crate::profile::{CountryProfile, CountryUnion};

/// GDP (millions USD) at which the GDP share of geopolitical influence saturates.
const GDP_INFLUENCE_SATURATION_MUSD: f64 = 10_000_000.0;

/// GDP (millions USD) at which economic power saturates.
const GDP_POWER_SATURATION_MUSD: f64 = 15_000_000.0;

/// Population at which the population share of influence saturates.
const POPULATION_SATURATION: f64 = 1e9;

/// Relations text for a country outside every union.
const NO_UNION: &str = "various international organisations";

/// Starting political stability before any sync.
const INITIAL_POLITICAL_STABILITY: f64 = 0.7;

/// A nation state.
#[derive(Debug, Clone)]
pub struct CountryAgent {
    core: AgentCore,
    profile: CountryProfile,
    union: Option<String>,
}

impl CountryAgent {
    /// Build a country. Its union is the first one listing it as a member.
    pub fn new(profile: CountryProfile, unions: &[CountryUnion]) -> Self {
        let mut core = AgentCore::new(AgentId::new(profile.name.as_str()), AgentKind::Country);
        let geopolitical_influence = geopolitical_influence(&profile);
        let economic_power = (profile.gdp_musd / GDP_POWER_SATURATION_MUSD).min(1.0);
        core.set_attribute("geopolitical_influence", geopolitical_influence);
        core.set_attribute("economic_power", economic_power);
        core.set_attribute("political_stability", INITIAL_POLITICAL_STABILITY);

        let union = unions
            .iter()
            .find(|u| u.members.iter().any(|m| *m == profile.name))
            .map(|u| u.name.clone());

        let mut agent = Self {
            core,
            profile,
            union,
        };
        agent.seed_local_state(geopolitical_influence, economic_power);
        agent
    }

    /// The static profile.
    pub const fn profile(&self) -> &CountryProfile {
        &self.profile
    }

    /// First union this country belongs to.
    pub fn union(&self) -> Option<&str> {
        self.union.as_deref()
    }

    fn seed_local_state(&mut self, influence: f64, power: f64) {
        let p = &self.profile;
        let union = self.union.as_deref().unwrap_or(NO_UNION);
        let seeds = [
            (
                Category::Political,
                "government_system",
                format!("{} operates as a {}", p.name, p.government_type),
            ),
            (
                Category::Political,
                "international_relations",
                format!("Active member of {union}, maintaining diplomatic relations globally"),
            ),
            (
                Category::Economic,
                "national_economy",
                format!(
                    "GDP: ${:.0}B, Population: {:.0}M, Currency: {}",
                    p.gdp_musd / 1000.0,
                    p.population / 1e6,
                    p.currency
                ),
            ),
            (
                Category::Economic,
                "trade_relations",
                format!(
                    "Trading partner in {} with economic power index {power:.2}",
                    p.region
                ),
            ),
            (
                Category::Social,
                "demographics",
                format!(
                    "Primary language: {}, {} society",
                    p.language, p.development_level
                ),
            ),
            (
                Category::Technological,
                "innovation_ecosystem",
                format!("Innovation ecosystem with geopolitical influence {influence:.2}"),
            ),
            (
                Category::Environmental,
                "climate_commitments",
                format!("{} committed to international climate agreements", p.name),
            ),
            (
                Category::Legal,
                "legal_system",
                format!(
                    "Legal system based on {} constitutional framework",
                    p.government_type
                ),
            ),
        ];
        for (category, factor, value) in seeds {
            self.core.note(category, factor, value);
        }
    }
}

/// `min(1, gdp/10M)*0.4 + min(1, pop/1e9)*0.3 + dev*0.3`.
fn geopolitical_influence(profile: &CountryProfile) -> f64 {
    let gdp = (profile.gdp_musd / GDP_INFLUENCE_SATURATION_MUSD).min(1.0);
    let population = (profile.population / POPULATION_SATURATION).min(1.0);
    let development = if profile.is_developed() { 1.0 } else { 0.7 };
    gdp * 0.4 + population * 0.3 + development * 0.3
}

impl Agent for CountryAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn traits(&self) -> AgentTraits {
        AgentTraits {
            country: Some(self.profile.name.clone()),
            region: Some(self.profile.region.clone()),
            ..AgentTraits::bare(AgentKind::Country)
        }
    }

    fn describe(&self) -> String {
        let p = &self.profile;
        format!(
            "{} - Population: {:.0}M, GDP: ${:.0}B, Region: {}, Government: {}",
            p.name,
            p.population / 1e6,
            p.gdp_musd / 1000.0,
            p.region,
            p.government_type
        )
    }

    fn sync_target(&self) -> SyncTarget {
        SyncTarget {
            attribute: "political_stability",
            category: Category::Political,
            factor: "world_peace_index",
        }
    }

    fn shared_scalar(&self) -> &'static str {
        "economic_power"
    }

    fn is_relevant(&self, change: &StateChange) -> bool {
        let value = change.new_value().to_string();
        mentions(&value, &self.profile.region)
            || mentions(&value, &self.profile.name)
            || matches!(change.category(), Category::Political | Category::Economic)
    }

    fn respond_to(&self, change: &StateChange) -> (&'static str, String) {
        (
            "policy_response",
            format!(
                "{} adjusts {} policy in response to {} developments",
                self.profile.name,
                change.category(),
                change.new_value()
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use pestel_types::FactorValue;

    use super::*;

    fn germany() -> CountryProfile {
        CountryProfile {
            name: "Germany".to_owned(),
            region: "Europe".to_owned(),
            development_level: "Developed".to_owned(),
            government_type: "Federal Republic".to_owned(),
            population: 83_200_000.0,
            gdp_musd: 4_259_935.0,
            currency: "EUR".to_owned(),
            language: "German".to_owned(),
        }
    }

    #[test]
    fn influence_formula() {
        let expected = (4_259_935.0 / 10_000_000.0) * 0.4 + (83_200_000.0 / 1e9) * 0.3 + 0.3;
        assert!((geopolitical_influence(&germany()) - expected).abs() < 1e-9);

        let mut emerging = germany();
        emerging.development_level = "Emerging".to_owned();
        let diff = geopolitical_influence(&germany()) - geopolitical_influence(&emerging);
        assert!((diff - 0.09).abs() < 1e-9);
    }

    #[test]
    fn picks_first_union() {
        let unions = vec![
            CountryUnion {
                name: "European Union".to_owned(),
                kind: String::new(),
                members: vec!["Germany".to_owned(), "France".to_owned()],
            },
            CountryUnion {
                name: "G7".to_owned(),
                kind: String::new(),
                members: vec!["Germany".to_owned()],
            },
        ];
        let agent = CountryAgent::new(germany(), &unions);
        assert_eq!(agent.union(), Some("European Union"));
        let power = agent.core().attribute("economic_power");
        assert!((power - 4_259_935.0 / 15_000_000.0).abs() < 1e-9);
    }

    #[test]
    fn region_mention_is_relevant() {
        let mut agent = CountryAgent::new(germany(), &[]);
        let change = StateChange::record(
            Category::Environmental,
            "climate_leadership",
            FactorValue::Undefined,
            FactorValue::text("Europe leads green transition"),
            "Climate action commitment",
            AgentId::new("France"),
            2,
        );
        let changes: Vec<StateChange> = change.into_iter().collect();
        assert_eq!(agent.absorb_changes(&changes), 1);
        assert!(agent
            .core()
            .local()
            .text(Category::Environmental, "policy_response")
            .starts_with("Germany adjusts environmental policy"));
    }
}
