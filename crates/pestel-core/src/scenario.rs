//! Alternative-future scenarios and their probability dynamics.
//!
//! Each rescore moves every scenario's momentum and probability from the
//! actions in the decision window and a sector-specific alignment test on
//! the global state, then normalizes so the probabilities sum to one. A raw
//! probability that moves more than `transition_threshold` away from its
//! previous normalized value records a [`ScenarioTransition`].

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use pestel_types::{Category, Decision, ScenarioDefinition, ScenarioId, Sector, StructuredState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Weights and bounds of the probability formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioWeights {
    /// Fraction of momentum kept across a rescore (default: 0.9).
    pub momentum_decay: f64,
    /// Fraction of the fresh signal added to momentum (default: 0.1).
    pub fresh_weight: f64,
    /// Fresh signal per relevant action (default: 0.1).
    pub action_signal: f64,
    /// Fresh signal per unit of alignment (default: 0.2).
    pub alignment_signal: f64,
    /// Probability per unit of momentum (default: 0.1).
    pub momentum_weight: f64,
    /// Probability per relevant action (default: 0.02).
    pub relevance_weight: f64,
    /// Probability per unit of alignment (default: 0.05).
    pub alignment_weight: f64,
    /// Probability per day since the previous rescore, for scenarios with
    /// momentum above the threshold (default: 0.01).
    pub staleness_bonus_per_day: f64,
    /// Momentum a scenario needs before staleness counts (default: 0.1).
    pub staleness_momentum_threshold: f64,
    /// Lower clamp on the raw probability (default: 0.01).
    pub min_probability: f64,
    /// Upper clamp on the raw probability (default: 0.6).
    pub max_probability: f64,
    /// Raw shift that records a transition (default: 0.05).
    pub transition_threshold: f64,
    /// Supporting action descriptions kept per scenario (default: 10).
    pub max_supporting_actions: usize,
}

impl Default for ScenarioWeights {
    fn default() -> Self {
        Self {
            momentum_decay: 0.9,
            fresh_weight: 0.1,
            action_signal: 0.1,
            alignment_signal: 0.2,
            momentum_weight: 0.1,
            relevance_weight: 0.02,
            alignment_weight: 0.05,
            staleness_bonus_per_day: 0.01,
            staleness_momentum_threshold: 0.1,
            min_probability: 0.01,
            max_probability: 0.6,
            transition_threshold: 0.05,
            max_supporting_actions: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// A scenario definition with its runtime score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    /// Static definition.
    pub definition: ScenarioDefinition,
    /// Current probability.
    pub probability: f64,
    /// Current momentum.
    pub momentum: f64,
    /// Recent relevant action descriptions, unique, oldest first.
    pub supporting_actions: VecDeque<String>,
}

impl Scenario {
    /// Wrap a definition, starting at its base probability.
    pub fn new(definition: ScenarioDefinition) -> Self {
        Self {
            probability: definition.base_probability,
            definition,
            momentum: 0.0,
            supporting_actions: VecDeque::new(),
        }
    }

    /// Scenario name.
    pub const fn name(&self) -> &ScenarioId {
        &self.definition.name
    }

    /// Effective sector.
    pub fn sector(&self) -> Sector {
        self.definition.effective_sector()
    }

    fn support(&mut self, description: &str, cap: usize) {
        if self.supporting_actions.iter().any(|a| a == description) {
            return;
        }
        self.supporting_actions.push_back(description.to_owned());
        while self.supporting_actions.len() > cap {
            self.supporting_actions.pop_front();
        }
    }
}

/// How strongly the global state already points toward a sector, in `[0, 1]`.
pub fn alignment(sector: Sector, global: &StructuredState) -> f64 {
    let score: f64 = match sector {
        Sector::Technology => {
            let innovation = global.get(Category::Technological, "innovation");
            if innovation.contains("AI") || innovation.contains("advanced") {
                0.4
            } else {
                0.0
            }
        }
        Sector::Environment => {
            let climate = global.get(Category::Environmental, "climate_change");
            let sustainability = global.get(Category::Environmental, "sustainability");
            if climate.contains("transition") || sustainability.contains("progress") {
                0.4
            } else {
                0.0
            }
        }
        Sector::Geopolitics => {
            let relations = global.get(Category::Political, "international_relations");
            let stability = global.get(Category::Political, "stability");
            if relations.contains("cooperation") || stability.contains("alliance") {
                0.3
            } else {
                0.0
            }
        }
        Sector::Digital | Sector::Healthcare | Sector::Mixed => 0.0,
    };
    score.min(1.0)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A large single-rescore move in one scenario's probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioTransition {
    /// Rescore day.
    pub day: u64,
    /// Dominant scenario before the rescore.
    pub from: Option<ScenarioId>,
    /// Scenario that moved.
    pub to: ScenarioId,
    /// Raw probability minus the previous normalized probability.
    pub shift: f64,
    /// Relevant actions, as `"agent: description"` joined by `"; "`.
    pub trigger: String,
}

impl fmt::Display for ScenarioTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self.from.as_ref().map_or("none", ScenarioId::as_str);
        write!(
            f,
            "Day {}: {from} → {} ({:.2}% shift) due to {}",
            self.day,
            self.to,
            self.shift * 100.0,
            self.trigger
        )
    }
}

/// Normalized probabilities after one rescore.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilitySnapshot {
    /// Rescore day.
    pub day: u64,
    /// Probability per scenario.
    pub probabilities: BTreeMap<ScenarioId, f64>,
}

/// The dominant scenario after one rescore.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominantEntry {
    /// Rescore day.
    pub day: u64,
    /// Dominant scenario.
    pub scenario: ScenarioId,
    /// Its normalized probability.
    pub probability: f64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Scores every scenario over the run.
#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    scenarios: Vec<Scenario>,
    weights: ScenarioWeights,
    dominant: Option<usize>,
    last_update_day: u64,
    transitions: Vec<ScenarioTransition>,
    probability_history: Vec<ProbabilitySnapshot>,
    dominant_timeline: Vec<DominantEntry>,
}

impl ScenarioEngine {
    /// Create an engine over `definitions`, in the given order.
    pub fn new(definitions: Vec<ScenarioDefinition>, weights: ScenarioWeights) -> Self {
        let mut engine = Self {
            scenarios: definitions.into_iter().map(Scenario::new).collect(),
            weights,
            dominant: None,
            last_update_day: 0,
            transitions: Vec::new(),
            probability_history: Vec::new(),
            dominant_timeline: Vec::new(),
        };
        engine.dominant = engine.arg_max();
        engine
    }

    /// All scenarios in definition order.
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Scoring weights.
    pub const fn weights(&self) -> &ScenarioWeights {
        &self.weights
    }

    /// The most probable scenario; ties go to the earliest definition.
    pub fn dominant(&self) -> Option<&Scenario> {
        self.dominant.and_then(|i| self.scenarios.get(i))
    }

    /// Recorded transitions, oldest first.
    pub fn transitions(&self) -> &[ScenarioTransition] {
        &self.transitions
    }

    /// Probabilities after each rescore.
    pub fn probability_history(&self) -> &[ProbabilitySnapshot] {
        &self.probability_history
    }

    /// Dominant scenario after each rescore.
    pub fn dominant_timeline(&self) -> &[DominantEntry] {
        &self.dominant_timeline
    }

    /// Sum of current probabilities.
    pub fn total_probability(&self) -> f64 {
        self.scenarios.iter().map(|s| s.probability).sum()
    }

    /// Rescore every scenario from the decision window and global state.
    ///
    /// Returns the number of transitions recorded.
    pub fn update(&mut self, day: u64, decisions: &[Decision], global: &StructuredState) -> usize {
        let previous_dominant = self.dominant().map(|s| s.name().clone());
        let previous: Vec<f64> = self.scenarios.iter().map(|s| s.probability).collect();
        let days_since = as_f64(day.saturating_sub(self.last_update_day));
        let w = self.weights.clone();
        let transitions_before = self.transitions.len();

        for scenario in &mut self.scenarios {
            let relevant: Vec<&Decision> = decisions
                .iter()
                .filter(|d| scenario.definition.is_relevant(d.description()))
                .collect();
            for decision in &relevant {
                scenario.support(decision.description(), w.max_supporting_actions);
            }
            let count = as_f64(relevant.len());
            let aligned = alignment(scenario.sector(), global);

            scenario.momentum = scenario.momentum * w.momentum_decay
                + (w.action_signal * count + w.alignment_signal * aligned) * w.fresh_weight;

            let staleness = if scenario.momentum > w.staleness_momentum_threshold {
                days_since * w.staleness_bonus_per_day
            } else {
                0.0
            };
            let raw = (scenario.definition.base_probability
                + scenario.momentum * w.momentum_weight
                + count * w.relevance_weight
                + aligned * w.alignment_weight
                + staleness)
                .clamp(w.min_probability, w.max_probability);

            let shift = raw - scenario.probability;
            if shift.abs() > w.transition_threshold {
                let trigger = relevant
                    .iter()
                    .map(|d| format!("{}: {}", d.agent_id(), d.description()))
                    .collect::<Vec<_>>()
                    .join("; ");
                self.transitions.push(ScenarioTransition {
                    day,
                    from: previous_dominant.clone(),
                    to: scenario.name().clone(),
                    shift,
                    trigger,
                });
            }
            scenario.probability = raw;
        }

        if !self.normalize() {
            for (scenario, p) in self.scenarios.iter_mut().zip(previous) {
                scenario.probability = p;
            }
        }
        self.dominant = self.arg_max();
        self.last_update_day = day;
        self.snapshot(day);

        let recorded = self.transitions.len().saturating_sub(transitions_before);
        for transition in self.transitions.iter().skip(transitions_before) {
            debug!(day, "scenario transition: {transition}");
        }
        if let Some(dominant) = self.dominant() {
            info!(
                day,
                transitions = recorded,
                "Dominant Future: {} ({:.1}% probability, {:.2} momentum)",
                dominant.name(),
                dominant.probability * 100.0,
                dominant.momentum
            );
        }
        recorded
    }

    /// Divide every probability by their sum. Returns `false` and leaves the
    /// values untouched when the sum is not positive.
    pub fn normalize(&mut self) -> bool {
        let total = self.total_probability();
        if total <= 0.0 {
            return false;
        }
        for scenario in &mut self.scenarios {
            scenario.probability /= total;
        }
        true
    }

    fn arg_max(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, scenario) in self.scenarios.iter().enumerate() {
            match best {
                Some((_, p)) if scenario.probability <= p => {}
                _ => best = Some((index, scenario.probability)),
            }
        }
        best.map(|(index, _)| index)
    }

    fn snapshot(&mut self, day: u64) {
        let probabilities = self
            .scenarios
            .iter()
            .map(|s| (s.name().clone(), s.probability))
            .collect();
        let snapshot = ProbabilitySnapshot { day, probabilities };
        self.probability_history.push(snapshot);
        if let Some(dominant) = self.dominant() {
            let entry = DominantEntry {
                day,
                scenario: dominant.name().clone(),
                probability: dominant.probability,
            };
            self.dominant_timeline.push(entry);
        }
    }

    /// Summarize the current scores.
    pub fn analysis(&self) -> ScenarioAnalysis {
        let mut sector_totals: BTreeMap<Sector, f64> = BTreeMap::new();
        for scenario in &self.scenarios {
            *sector_totals.entry(scenario.sector()).or_default() += scenario.probability;
        }

        let mut ranked: Vec<&Scenario> = self.scenarios.iter().collect();
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        let top_scenarios = ranked
            .iter()
            .take(3)
            .map(|s| ScenarioStanding::from(*s))
            .collect();

        let mut key_trends = Vec::new();
        let mut rising: Vec<&Scenario> =
            self.scenarios.iter().filter(|s| s.momentum > 0.2).collect();
        rising.sort_by(|a, b| b.momentum.total_cmp(&a.momentum));
        for scenario in rising {
            key_trends.push(format!(
                "{} gaining momentum ({:.1}% probability, {:.2} momentum)",
                scenario.name(),
                scenario.probability * 100.0,
                scenario.momentum
            ));
        }
        if let Some(last) = self.transitions.last() {
            key_trends.push(format!("Recent shift: {} triggered by {}", last.to, last.trigger));
        }
        let leading_sector = sector_totals
            .iter()
            .fold(None, |best: Option<(Sector, f64)>, (sector, total)| match best {
                Some((_, p)) if *total <= p => best,
                _ => Some((*sector, *total)),
            });
        if let Some((sector, total)) = leading_sector {
            key_trends.push(format!(
                "{sector} sector scenarios dominate with {:.1}% combined probability",
                total * 100.0
            ));
        }

        let dominant_sector = self.dominant().map_or(Sector::Mixed, Scenario::sector);
        let recommendations = recommendations(dominant_sector)
            .iter()
            .chain(CROSS_CUTTING)
            .map(|r| (*r).to_owned())
            .collect();

        ScenarioAnalysis {
            dominant: self.dominant().map(|s| s.name().clone()),
            sector_totals,
            key_trends,
            recommendations,
            top_scenarios,
            recent_transitions: self
                .transitions
                .iter()
                .rev()
                .take(5)
                .rev()
                .cloned()
                .collect(),
        }
    }
}

fn as_f64(n: impl TryInto<u32>) -> f64 {
    f64::from(n.try_into().unwrap_or(u32::MAX))
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

const CROSS_CUTTING: &[&str] = &[
    "Enhance data analytics and strategic intelligence capabilities",
    "Develop global competency and cultural intelligence programs",
    "Create innovation ecosystems and entrepreneurship support",
    "Establish continuous learning and adaptation frameworks",
];

const fn recommendations(sector: Sector) -> &'static [&'static str] {
    match sector {
        Sector::Technology => &[
            "Invest heavily in AI and quantum computing education programs",
            "Partner with tech giants (Apple, Microsoft, NVIDIA) for curriculum development",
            "Establish technology ethics and governance research center",
            "Create AI-human collaboration training programs",
        ],
        Sector::Environment => &[
            "Develop comprehensive sustainability and climate science programs",
            "Partner with renewable energy companies and environmental organizations",
            "Create carbon-neutral campus and operations",
            "Establish climate adaptation and resilience research center",
        ],
        Sector::Geopolitics => &[
            "Strengthen international partnerships and exchange programs",
            "Develop crisis management and diplomatic studies programs",
            "Create conflict resolution and peacebuilding research center",
            "Enhance multicultural competency and language programs",
        ],
        Sector::Digital => &[
            "Expand online and hybrid learning capabilities",
            "Develop virtual reality and metaverse educational experiences",
            "Create digital transformation and cybersecurity programs",
            "Establish digital society research and policy center",
        ],
        Sector::Healthcare => &[
            "Develop aging society and healthcare innovation programs",
            "Partner with pharmaceutical and biotech companies",
            "Create personalized medicine and genomics research center",
            "Establish global health and pandemic preparedness programs",
        ],
        Sector::Mixed => &[
            "Maintain flexible and adaptive strategic planning approach",
            "Diversify partnerships across multiple sectors and regions",
            "Strengthen scenario planning and futures research capabilities",
            "Create interdisciplinary programs addressing complex global challenges",
        ],
    }
}

/// One scenario's standing in an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioStanding {
    /// Scenario name.
    pub name: ScenarioId,
    /// Narrative.
    pub description: String,
    /// Effective sector.
    pub sector: Sector,
    /// Probability.
    pub probability: f64,
    /// Momentum.
    pub momentum: f64,
}

impl From<&Scenario> for ScenarioStanding {
    fn from(scenario: &Scenario) -> Self {
        Self {
            name: scenario.name().clone(),
            description: scenario.definition.description.clone(),
            sector: scenario.sector(),
            probability: scenario.probability,
            momentum: scenario.momentum,
        }
    }
}

/// Snapshot analysis of the scenario space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioAnalysis {
    /// Dominant scenario.
    pub dominant: Option<ScenarioId>,
    /// Summed probability per sector.
    pub sector_totals: BTreeMap<Sector, f64>,
    /// Human-readable trend lines.
    pub key_trends: Vec<String>,
    /// Strategic recommendations for the dominant sector, then cross-cutting ones.
    pub recommendations: Vec<String>,
    /// Three most probable scenarios.
    pub top_scenarios: Vec<ScenarioStanding>,
    /// Up to five most recent transitions.
    pub recent_transitions: Vec<ScenarioTransition>,
}

impl fmt::Display for ScenarioAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Alternative futures analysis")?;
        writeln!(f)?;
        writeln!(f, "Top futures:")?;
        for (rank, standing) in self.top_scenarios.iter().enumerate() {
            writeln!(
                f,
                "  {}. {}: {:.1}% probability",
                rank.saturating_add(1),
                standing.name,
                standing.probability * 100.0
            )?;
            if !standing.description.is_empty() {
                writeln!(f, "     {}", standing.description)?;
            }
            writeln!(
                f,
                "     Momentum: {:.2}, Sector: {}",
                standing.momentum, standing.sector
            )?;
        }

        let mut sectors: Vec<(&Sector, &f64)> = self.sector_totals.iter().collect();
        sectors.sort_by(|a, b| b.1.total_cmp(a.1));
        writeln!(f)?;
        writeln!(f, "Probability by sector:")?;
        for (sector, total) in sectors {
            writeln!(f, "  {sector}: {:.1}%", total * 100.0)?;
        }

        writeln!(f)?;
        writeln!(f, "Key trends:")?;
        for trend in &self.key_trends {
            writeln!(f, "  - {trend}")?;
        }

        if !self.recent_transitions.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recent transitions:")?;
            for transition in &self.recent_transitions {
                writeln!(f, "  - {transition}")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Strategic recommendations:")?;
        for recommendation in &self.recommendations {
            writeln!(f, "  - {recommendation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pestel_types::{AgentId, DecisionOrigin, DecisionType};

    use super::*;

    fn engine(defs: &[(&str, f64)]) -> ScenarioEngine {
        ScenarioEngine::new(
            defs.iter()
                .map(|(name, p)| ScenarioDefinition::new(*name, *p))
                .collect(),
            ScenarioWeights::default(),
        )
    }

    fn act(agent: &str, description: &str) -> Decision {
        Decision::new(
            AgentId::new(agent),
            7,
            description,
            DecisionType::Research,
            0.8,
            DecisionOrigin::Fallback,
        )
    }

    fn probabilities(engine: &ScenarioEngine) -> Vec<f64> {
        engine.scenarios().iter().map(|s| s.probability).collect()
    }

    #[test]
    fn quiet_rescore_keeps_normalized_bases() {
        let mut engine = engine(&[("Alpha", 0.5), ("Beta", 0.3), ("Gamma", 0.2)]);
        let recorded = engine.update(7, &[], &StructuredState::new());
        assert_eq!(recorded, 0);
        let p = probabilities(&engine);
        for (got, want) in p.iter().zip([0.5, 0.3, 0.2]) {
            assert!((got - want).abs() < 1e-9);
        }
        assert!((engine.total_probability() - 1.0).abs() < 1e-9);
        assert_eq!(engine.dominant().map(|s| s.name().as_str()), Some("Alpha"));
    }

    #[test]
    fn ceiling_applies_before_normalization() {
        let mut engine = engine(&[("Alpha", 0.9), ("Beta", 0.1)]);
        engine.update(7, &[], &StructuredState::new());
        let p = probabilities(&engine);
        assert!((p.first().copied().unwrap_or_default() - 0.6 / 0.7).abs() < 1e-9);
        assert!((engine.total_probability() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn relevant_actions_build_momentum_and_support() {
        let mut engine = engine(&[("AI Supremacy", 0.3), ("Green Transition Triumph", 0.3)]);
        let decisions = vec![
            act("NVIDIA", "Launch AI-powered product innovation initiative"),
            act("Google", "Deploy artificial intelligence at scale"),
            act("NVIDIA", "Launch AI-powered product innovation initiative"),
        ];
        engine.update(7, &decisions, &StructuredState::new());
        let ai = engine.scenarios().first().cloned();
        let green = engine.scenarios().get(1).cloned();
        let (Some(ai), Some(green)) = (ai, green) else {
            panic!("two scenarios expected");
        };
        assert!((ai.momentum - 0.03).abs() < 1e-9);
        assert_eq!(ai.supporting_actions.len(), 2);
        assert!(green.momentum.abs() < 1e-12);
        assert!(ai.probability > green.probability);
        assert_eq!(engine.dominant().map(|s| s.name().as_str()), Some("AI Supremacy"));
    }

    #[test]
    fn large_move_records_transition_with_trigger() {
        let mut engine = engine(&[("AI Supremacy", 0.2), ("Other", 0.8)]);
        let decisions: Vec<Decision> = (0..4)
            .map(|i| act(&format!("agent{i}"), "Scale AI research"))
            .collect();
        engine.update(7, &decisions, &StructuredState::new());
        let transition = engine
            .transitions()
            .iter()
            .find(|t| t.to.as_str() == "AI Supremacy");
        let Some(transition) = transition else {
            panic!("expected an AI transition");
        };
        assert_eq!(transition.from.as_ref().map(ScenarioId::as_str), Some("Other"));
        let trigger = transition.trigger.as_str();
        assert!(trigger.starts_with("agent0: Scale AI research; agent1:"));
        let label = transition.to_string();
        assert!(label.starts_with("Day 7: Other → AI Supremacy ("));
    }

    #[test]
    fn alignment_reads_sector_indicators() {
        let mut global = StructuredState::new();
        assert!(alignment(Sector::Technology, &global).abs() < 1e-12);
        global.set(Category::Technological, "innovation", "advanced robotics");
        assert!((alignment(Sector::Technology, &global) - 0.4).abs() < 1e-12);
        global.set(Category::Political, "stability", "new alliance formed");
        assert!((alignment(Sector::Geopolitics, &global) - 0.3).abs() < 1e-12);
        assert!(alignment(Sector::Digital, &global).abs() < 1e-12);
    }

    #[test]
    fn supporting_actions_are_unique_and_capped() {
        let mut scenario = Scenario::new(ScenarioDefinition::new("AI Supremacy", 0.2));
        for i in 0..15 {
            scenario.support(&format!("AI action {i}"), 10);
            scenario.support(&format!("AI action {i}"), 10);
        }
        assert_eq!(scenario.supporting_actions.len(), 10);
        let oldest = scenario.supporting_actions.front();
        assert_eq!(oldest.map(String::as_str), Some("AI action 5"));
    }

    #[test]
    fn history_and_timeline_grow_per_rescore() {
        let mut engine = engine(&[("Alpha", 0.5), ("Beta", 0.5)]);
        engine.update(7, &[], &StructuredState::new());
        engine.update(14, &[], &StructuredState::new());
        assert_eq!(engine.probability_history().len(), 2);
        assert_eq!(engine.dominant_timeline().len(), 2);
        let first = engine.dominant_timeline().first();
        assert_eq!(first.map(|e| e.scenario.as_str()), Some("Alpha"));
    }

    #[test]
    fn analysis_recommends_for_dominant_sector() {
        let engine = engine(&[("Green Transition Triumph", 0.5), ("AI Supremacy", 0.3)]);
        let analysis = engine.analysis();
        assert_eq!(analysis.recommendations.len(), 8);
        assert_eq!(
            analysis.recommendations.first().map(String::as_str),
            Some("Develop comprehensive sustainability and climate science programs")
        );
        assert_eq!(analysis.top_scenarios.len(), 2);
        assert!(
            analysis
                .key_trends
                .iter()
                .any(|t| t.starts_with("Environment sector scenarios dominate"))
        );
        assert!(analysis.to_string().contains("Strategic recommendations:"));
    }
}
