//! Sliding window over recent decisions, changes, and interactions.
//!
//! The window feeds decision contexts and scenario rescoring. When
//! `retain_full` is set, every record is also appended to an archive that
//! pruning never touches; the run report is built from the archive.

use std::collections::BTreeMap;

use pestel_agents::ActionSummary;
use pestel_types::{AgentId, Decision, Interaction, InteractionKind, StateChange};

/// Recent and archived simulation records.
#[derive(Debug, Clone, Default)]
pub struct History {
    decisions: Vec<Decision>,
    changes: Vec<StateChange>,
    interactions: Vec<Interaction>,
    archive: Option<Archive>,
}

#[derive(Debug, Clone, Default)]
struct Archive {
    decisions: Vec<Decision>,
    changes: Vec<StateChange>,
    interactions: Vec<Interaction>,
}

impl History {
    /// Create an empty history, archiving everything when `retain_full`.
    pub fn new(retain_full: bool) -> Self {
        Self {
            archive: retain_full.then(Archive::default),
            ..Self::default()
        }
    }

    /// Append a decision.
    pub fn record_decision(&mut self, decision: Decision) {
        if let Some(archive) = &mut self.archive {
            archive.decisions.push(decision.clone());
        }
        self.decisions.push(decision);
    }

    /// Append state changes.
    pub fn record_changes(&mut self, changes: &[StateChange]) {
        if let Some(archive) = &mut self.archive {
            archive.changes.extend_from_slice(changes);
        }
        self.changes.extend_from_slice(changes);
    }

    /// Append an interaction.
    pub fn record_interaction(&mut self, interaction: Interaction) {
        if let Some(archive) = &mut self.archive {
            archive.interactions.push(interaction.clone());
        }
        self.interactions.push(interaction);
    }

    /// Drop windowed records from `window` or more days before `day`.
    ///
    /// After `prune(10, 7)` the window holds days 4 through 10.
    pub fn prune(&mut self, day: u64, window: u64) {
        let oldest_kept = day.saturating_add(1).saturating_sub(window);
        self.decisions.retain(|d| d.day() >= oldest_kept);
        self.changes.retain(|c| c.day() >= oldest_kept);
        self.interactions.retain(|i| i.day >= oldest_kept);
    }

    /// Windowed decisions, oldest first.
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Windowed state changes, oldest first.
    pub fn changes(&self) -> &[StateChange] {
        &self.changes
    }

    /// Windowed interactions, oldest first.
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// The last `n` windowed actions taken by anyone other than `agent`
    /// that pass `relevant`, oldest first.
    pub fn recent_by_others(
        &self,
        agent: &AgentId,
        n: usize,
        relevant: impl Fn(&Decision) -> bool,
    ) -> Vec<ActionSummary> {
        let mut recent: Vec<ActionSummary> = self
            .decisions
            .iter()
            .rev()
            .filter(|d| d.agent_id() != agent && relevant(d))
            .take(n)
            .map(ActionSummary::from)
            .collect();
        recent.reverse();
        recent
    }

    /// Windowed actions by `agent` on or after `since`, oldest first.
    pub fn own_actions_since(&self, agent: &AgentId, since: u64) -> Vec<ActionSummary> {
        self.decisions
            .iter()
            .filter(|d| d.agent_id() == agent && d.day() >= since)
            .map(ActionSummary::from)
            .collect()
    }

    /// Every decision of the run, or the window when not archiving.
    pub fn all_decisions(&self) -> &[Decision] {
        self.archive
            .as_ref()
            .map_or(self.decisions.as_slice(), |a| a.decisions.as_slice())
    }

    /// Every state change of the run, or the window when not archiving.
    pub fn all_changes(&self) -> &[StateChange] {
        self.archive
            .as_ref()
            .map_or(self.changes.as_slice(), |a| a.changes.as_slice())
    }

    /// Every interaction of the run, or the window when not archiving.
    pub fn all_interactions(&self) -> &[Interaction] {
        self.archive
            .as_ref()
            .map_or(self.interactions.as_slice(), |a| a.interactions.as_slice())
    }

    /// Decisions per agent over [`Self::all_decisions`].
    pub fn decision_counts(&self) -> BTreeMap<AgentId, u64> {
        let mut counts = BTreeMap::new();
        for decision in self.all_decisions() {
            let entry: &mut u64 = counts.entry(decision.agent_id().clone()).or_default();
            *entry = entry.saturating_add(1);
        }
        counts
    }

    /// Influence interactions initiated per agent over
    /// [`Self::all_interactions`]. Union coordination is not counted.
    pub fn influence_counts(&self) -> BTreeMap<AgentId, u64> {
        let mut counts = BTreeMap::new();
        for interaction in self.all_interactions() {
            if interaction.kind == InteractionKind::UnionCoordination {
                continue;
            }
            let entry: &mut u64 = counts.entry(interaction.source.clone()).or_default();
            *entry = entry.saturating_add(1);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use pestel_types::{DecisionOrigin, DecisionType};

    use super::*;

    fn decision(agent: &str, day: u64, description: &str) -> Decision {
        Decision::new(
            AgentId::new(agent),
            day,
            description,
            DecisionType::Research,
            0.8,
            DecisionOrigin::Fallback,
        )
    }

    fn interaction(source: &str, day: u64, kind: InteractionKind) -> Interaction {
        Interaction {
            day,
            source: AgentId::new(source),
            targets: vec![AgentId::new("x")],
            description: String::new(),
            kind,
        }
    }

    #[test]
    fn prune_keeps_the_window() {
        let mut history = History::new(true);
        for day in 1..=10 {
            history.record_decision(decision("a", day, "act"));
        }
        history.prune(10, 7);
        let days: Vec<u64> = history.decisions().iter().map(Decision::day).collect();
        assert_eq!(days, vec![4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(history.all_decisions().len(), 10);
    }

    #[test]
    fn without_archive_pruned_records_are_gone() {
        let mut history = History::new(false);
        history.record_decision(decision("a", 1, "old"));
        history.record_decision(decision("a", 9, "new"));
        history.prune(9, 3);
        assert_eq!(history.all_decisions().len(), 1);
    }

    #[test]
    fn recent_by_others_excludes_self_and_keeps_order() {
        let mut history = History::new(false);
        history.record_decision(decision("a", 1, "one"));
        history.record_decision(decision("b", 1, "two"));
        history.record_decision(decision("c", 2, "three"));
        history.record_decision(decision("b", 2, "four"));
        let recent = history.recent_by_others(&AgentId::new("b"), 5, |_| true);
        let descriptions: Vec<&str> = recent.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(descriptions, vec!["one", "three"]);

        let last = history.recent_by_others(&AgentId::new("a"), 2, |_| true);
        let descriptions: Vec<&str> = last.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(descriptions, vec!["three", "four"]);
    }

    #[test]
    fn recent_by_others_skips_irrelevant_actions() {
        let mut history = History::new(false);
        history.record_decision(decision("a", 1, "Expand gigafactory"));
        history.record_decision(decision("b", 2, "Fund opera houses"));
        history.record_decision(decision("c", 2, "Expand chip fabs"));
        let expands = |d: &Decision| d.description().starts_with("Expand");
        let recent = history.recent_by_others(&AgentId::new("x"), 3, expands);
        let descriptions: Vec<&str> = recent.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Expand gigafactory", "Expand chip fabs"]);
    }

    #[test]
    fn own_actions_since_filters_by_day() {
        let mut history = History::new(false);
        history.record_decision(decision("a", 1, "one"));
        history.record_decision(decision("a", 3, "two"));
        history.record_decision(decision("b", 3, "other"));
        let own = history.own_actions_since(&AgentId::new("a"), 2);
        assert_eq!(own.len(), 1);
        assert_eq!(own.first().map(|a| a.day), Some(3));
    }

    #[test]
    fn counts_cover_the_archive() {
        let mut history = History::new(true);
        history.record_decision(decision("a", 1, "one"));
        history.record_decision(decision("a", 2, "two"));
        history.record_decision(decision("b", 2, "three"));
        history.record_interaction(interaction("a", 1, InteractionKind::Influence));
        history.record_interaction(interaction("a", 2, InteractionKind::Collaboration));
        history.record_interaction(interaction("EU", 3, InteractionKind::UnionCoordination));
        history.prune(20, 1);

        let decisions = history.decision_counts();
        assert_eq!(decisions.get(&AgentId::new("a")), Some(&2));
        assert_eq!(decisions.get(&AgentId::new("b")), Some(&1));

        let influence = history.influence_counts();
        assert_eq!(influence.get(&AgentId::new("a")), Some(&2));
        assert_eq!(influence.get(&AgentId::new("EU")), None);
    }
}
