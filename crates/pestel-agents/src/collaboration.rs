//! Pairwise collaboration between agents.

use crate::agent::Agent;

/// Blend the shared scalars of `a` and `b` and stamp both local states.
///
/// Both values move `blend` of the way toward their average, so a blend of
/// `1.0` makes them equal and `0.0` leaves them untouched. Returns the
/// average computed from the snapshot taken before either value moved.
pub fn collaborate_pair(a: &mut dyn Agent, b: &mut dyn Agent, blend: f64, day: u64) -> f64 {
    a.collaborate(b, blend.clamp(0.0, 1.0), day)
}

#[cfg(test)]
mod tests {
    use pestel_types::Category;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::agent::DEFAULT_COLLABORATION_BLEND;
    use crate::company::CompanyAgent;
    use crate::profile::{CompanyProfile, ResearcherProfile};
    use crate::researcher::ResearcherAgent;

    fn pair() -> (CompanyAgent, ResearcherAgent) {
        let mut rng = StdRng::seed_from_u64(11);
        let company = CompanyAgent::new(
            CompanyProfile {
                name: "NVIDIA".to_owned(),
                industry: "Technology".to_owned(),
                country: "United States".to_owned(),
                headquarters: "California".to_owned(),
                revenue_musd: 118_000.0,
                description: "GPUs".to_owned(),
            },
            &mut rng,
        );
        let researcher = ResearcherAgent::new(
            ResearcherProfile {
                name: "ETH Zurich".to_owned(),
                country: "Switzerland".to_owned(),
                fields: vec!["Engineering".to_owned()],
                institution_type: "Public".to_owned(),
                location: "Zurich".to_owned(),
                description: String::new(),
            },
            &mut rng,
        );
        (company, researcher)
    }

    #[test]
    fn values_move_toward_the_average() {
        let (mut company, mut researcher) = pair();
        let before_a = company.core().attribute("innovation_index");
        let before_b = researcher.core().attribute("research_impact");
        let average = collaborate_pair(
            &mut company,
            &mut researcher,
            DEFAULT_COLLABORATION_BLEND,
            4,
        );
        assert!((average - (before_a + before_b) / 2.0).abs() < 1e-9);

        let after_a = company.core().attribute("innovation_index");
        let after_b = researcher.core().attribute("research_impact");
        assert!((after_a - (before_a + average) / 2.0).abs() < 1e-9);
        assert!((after_b - (before_b + average) / 2.0).abs() < 1e-9);
        assert!((after_a - average).abs() <= (before_a - average).abs());
    }

    #[test]
    fn both_sides_are_stamped() {
        let (mut company, mut researcher) = pair();
        collaborate_pair(&mut company, &mut researcher, 0.5, 9);
        fn stamp(agent: &dyn Agent) -> String {
            let local = agent.core().local();
            local.text(Category::Social, "last_collaboration")
        }
        assert_eq!(stamp(&company), "Day 9: collaborated with ETH Zurich");
        assert_eq!(stamp(&researcher), "Day 9: collaborated with NVIDIA");
    }

    #[test]
    fn full_blend_equalises() {
        let (mut company, mut researcher) = pair();
        let average = collaborate_pair(&mut company, &mut researcher, 1.0, 1);
        assert!((company.core().attribute("innovation_index") - average).abs() < 1e-9);
        assert!((researcher.core().attribute("research_impact") - average).abs() < 1e-9);
    }
}
