//! Company agents.

use pestel_types::{AgentId, AgentKind, Category, StateChange, mentions};
use rand::Rng;

use crate::agent::{Agent, AgentCore, AgentTraits, SyncTarget};
use crate::profile::CompanyProfile;

/// Revenue (millions USD) at which market influence saturates before the
/// industry multiplier.
const REVENUE_SATURATION_MUSD: f64 = 1_000_000.0;

/// Starting growth expectation before any sync.
const INITIAL_GROWTH_EXPECTATION: f64 = 0.03;

/// A corporation acting in one industry from one home country.
#[derive(Debug, Clone)]
pub struct CompanyAgent {
    core: AgentCore,
    profile: CompanyProfile,
}

impl CompanyAgent {
    /// Build a company, drawing its random attributes from `rng`.
    pub fn new<R: Rng + ?Sized>(profile: CompanyProfile, rng: &mut R) -> Self {
        let mut core = AgentCore::new(AgentId::new(profile.name.as_str()), AgentKind::Company);
        let market_influence = market_influence(&profile);
        let innovation_index = innovation_index(&profile.industry, rng);
        let sustainability_score = rng.random_range(0.4..0.9);

        core.set_attribute("market_influence", market_influence);
        core.set_attribute("innovation_index", innovation_index);
        core.set_attribute("sustainability_score", sustainability_score);
        core.set_attribute("growth_expectation", INITIAL_GROWTH_EXPECTATION);

        let mut agent = Self { core, profile };
        agent.seed_local_state(market_influence, innovation_index, sustainability_score);
        agent
    }

    /// The static profile.
    pub const fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    fn seed_local_state(&mut self, market: f64, innovation: f64, sustainability: f64) {
        let p = &self.profile;
        let seeds = [
            (
                Category::Political,
                "regulatory_compliance",
                format!(
                    "{} maintains compliance with {} regulations and international standards",
                    p.name, p.country
                ),
            ),
            (
                Category::Economic,
                "market_position",
                format!(
                    "Global revenue of ${:.0}B in {} sector, headquartered in {}",
                    p.revenue_musd / 1000.0,
                    p.industry,
                    p.headquarters
                ),
            ),
            (
                Category::Economic,
                "financial_performance",
                format!("Market influence score of {market:.2}"),
            ),
            (
                Category::Social,
                "brand_reputation",
                format!("{} recognised globally for {}", p.name, p.description),
            ),
            (
                Category::Technological,
                "innovation_capability",
                format!(
                    "Innovation index {innovation:.2} in {} technology development",
                    p.industry
                ),
            ),
            (
                Category::Environmental,
                "sustainability_initiatives",
                format!(
                    "Sustainability score {sustainability:.2} across {} operations",
                    p.industry
                ),
            ),
            (
                Category::Legal,
                "intellectual_property",
                format!("IP portfolio protecting {} innovations", p.industry),
            ),
        ];
        for (category, factor, value) in seeds {
            self.core.note(category, factor, value);
        }
    }
}

/// `min(1, revenue / 1M) * industry multiplier`, capped at 1.
fn market_influence(profile: &CompanyProfile) -> f64 {
    let base = (profile.revenue_musd / REVENUE_SATURATION_MUSD).min(1.0);
    let industry = profile.industry.to_lowercase();
    let multiplier = if industry.contains("technology") {
        1.3
    } else if industry.contains("energy") {
        1.2
    } else if industry.contains("healthcare") {
        1.1
    } else {
        1.0
    };
    (base * multiplier).min(1.0)
}

fn innovation_index<R: Rng + ?Sized>(industry: &str, rng: &mut R) -> f64 {
    let industry = industry.to_lowercase();
    if industry.contains("technology") || industry.contains("cloud") {
        rng.random_range(0.8..1.0)
    } else if industry.contains("healthcare") {
        rng.random_range(0.6..0.9)
    } else {
        rng.random_range(0.3..0.7)
    }
}

impl Agent for CompanyAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn traits(&self) -> AgentTraits {
        AgentTraits {
            industry: Some(self.profile.industry.clone()),
            country: Some(self.profile.country.clone()),
            ..AgentTraits::bare(AgentKind::Company)
        }
    }

    fn describe(&self) -> String {
        let p = &self.profile;
        format!(
            "{} - Revenue: ${:.0}B, Industry: {}, HQ: {}, {}",
            p.name,
            p.revenue_musd / 1000.0,
            p.industry,
            p.headquarters,
            p.country
        )
    }

    fn sync_target(&self) -> SyncTarget {
        SyncTarget {
            attribute: "growth_expectation",
            category: Category::Economic,
            factor: "economic_growth_rate",
        }
    }

    fn shared_scalar(&self) -> &'static str {
        "innovation_index"
    }

    fn is_relevant(&self, change: &StateChange) -> bool {
        let value = change.new_value().to_string();
        mentions(&value, &self.profile.industry)
            || mentions(&value, &self.profile.country)
            || matches!(
                change.category(),
                Category::Economic | Category::Technological
            )
    }

    fn respond_to(&self, change: &StateChange) -> (&'static str, String) {
        (
            "strategic_response",
            format!(
                "Adjusted strategy due to {} change: {}",
                change.category(),
                change.new_value()
            ),
        )
    }
}
