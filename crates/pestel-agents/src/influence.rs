//! The static influence graph.
//!
//! Built once from agent traits in roster order and read-only afterwards.
//! Edges are directed: `a -> b` means a decision by `a` is propagated to `b`.
//! Every agent has an entry, possibly empty. Self-loops and duplicate edges
//! are never inserted; cycles are expected (a company and its home country
//! point at each other).

use std::collections::BTreeMap;

use pestel_types::{AgentId, AgentKind, mentions, mentions_any};
use serde::{Deserialize, Serialize};

use crate::agent::AgentTraits;

/// Default number of propagation targets per decision.
pub const DEFAULT_PROPAGATION_FANOUT: usize = 3;

/// Researcher field to company industry keyword pairs.
const RELATED_FIELDS: &[(&str, &str)] = &[
    ("technology", "technology"),
    ("medicine", "healthcare"),
    ("engineering", "automotive"),
    ("ai", "technology"),
    ("economics", "financial"),
];

/// Caps on each relation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceLimits {
    /// Companies of the same industry a company links to.
    pub industry_peers: usize,
    /// Technology researchers a technology company links to.
    pub tech_researchers: usize,
    /// Countries of the same region a country links to.
    pub regional_peers: usize,
    /// Related-industry companies a researcher links to.
    pub related_companies: usize,
}

impl Default for InfluenceLimits {
    fn default() -> Self {
        Self {
            industry_peers: 3,
            tech_researchers: 2,
            regional_peers: 3,
            related_companies: 2,
        }
    }
}

/// Directed adjacency from each agent to the agents it influences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfluenceGraph {
    edges: BTreeMap<AgentId, Vec<AgentId>>,
}

impl InfluenceGraph {
    /// Build the graph from `(id, traits)` pairs in roster order.
    pub fn build(agents: &[(AgentId, AgentTraits)], limits: &InfluenceLimits) -> Self {
        let mut edges = BTreeMap::new();
        for (id, traits) in agents {
            let mut out = Vec::new();
            match traits.kind {
                AgentKind::Company => company_links(id, traits, agents, limits, &mut out),
                AgentKind::Country => country_links(id, traits, agents, limits, &mut out),
                AgentKind::Researcher => researcher_links(id, traits, agents, limits, &mut out),
            }
            edges.insert(id.clone(), out);
        }
        Self { edges }
    }

    /// Neighbours of `id` in insertion order. Empty for unknown ids.
    pub fn neighbors(&self, id: &AgentId) -> &[AgentId] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// The first `max` neighbours of `id`.
    pub fn propagation_targets(&self, id: &AgentId, max: usize) -> impl Iterator<Item = &AgentId> {
        self.neighbors(id).iter().take(max)
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Number of agents that list `id` as a neighbour.
    pub fn in_degree(&self, id: &AgentId) -> usize {
        self.edges
            .values()
            .filter(|targets| targets.contains(id))
            .count()
    }

    /// Number of agents in the graph.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Return `true` if the graph has no agents.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn link(source: &AgentId, target: &AgentId, out: &mut Vec<AgentId>) -> bool {
    if source == target || out.contains(target) {
        return false;
    }
    out.push(target.clone());
    true
}

/// Link up to `cap` of `candidates`, skipping self and repeats.
fn link_capped<'a>(
    source: &AgentId,
    candidates: impl Iterator<Item = &'a (AgentId, AgentTraits)>,
    cap: usize,
    out: &mut Vec<AgentId>,
) {
    let mut linked = 0_usize;
    for (target, _) in candidates {
        if linked >= cap {
            break;
        }
        if link(source, target, out) {
            linked = linked.saturating_add(1);
        }
    }
}

fn of_kind(kind: AgentKind) -> impl Fn(&&(AgentId, AgentTraits)) -> bool {
    move |(_, traits)| traits.kind == kind
}

fn company_links(
    id: &AgentId,
    traits: &AgentTraits,
    agents: &[(AgentId, AgentTraits)],
    limits: &InfluenceLimits,
    out: &mut Vec<AgentId>,
) {
    let industry = traits.industry.as_deref().unwrap_or_default();
    let peers = agents
        .iter()
        .filter(of_kind(AgentKind::Company))
        .filter(|(_, t)| t.industry.as_deref() == Some(industry));
    link_capped(id, peers, limits.industry_peers, out);

    for (target, _) in agents
        .iter()
        .filter(of_kind(AgentKind::Country))
        .filter(|(_, t)| t.country.is_some() && t.country == traits.country)
    {
        link(id, target, out);
    }

    if mentions(industry, "technology") {
        let researchers = agents
            .iter()
            .filter(of_kind(AgentKind::Researcher))
            .filter(|(_, t)| {
                t.fields
                    .iter()
                    .any(|f| mentions_any(f, &["technology", "ai"]))
            });
        link_capped(id, researchers, limits.tech_researchers, out);
    }
}

fn country_links(
    id: &AgentId,
    traits: &AgentTraits,
    agents: &[(AgentId, AgentTraits)],
    limits: &InfluenceLimits,
    out: &mut Vec<AgentId>,
) {
    let name = Some(id.as_str());
    for (target, _) in agents
        .iter()
        .filter(|(_, t)| t.kind != AgentKind::Country)
        .filter(|(_, t)| t.country.as_deref() == name)
    {
        link(id, target, out);
    }

    let regional = agents
        .iter()
        .filter(of_kind(AgentKind::Country))
        .filter(|(_, t)| t.region.is_some() && t.region == traits.region);
    link_capped(id, regional, limits.regional_peers, out);
}

fn researcher_links(
    id: &AgentId,
    traits: &AgentTraits,
    agents: &[(AgentId, AgentTraits)],
    limits: &InfluenceLimits,
    out: &mut Vec<AgentId>,
) {
    let related = agents
        .iter()
        .filter(of_kind(AgentKind::Company))
        .filter(|(_, t)| {
            let industry = t.industry.as_deref().unwrap_or_default();
            traits.fields.iter().any(|field| {
                RELATED_FIELDS
                    .iter()
                    .any(|(f, i)| mentions(field, f) && mentions(industry, i))
            })
        });
    link_capped(id, related, limits.related_companies, out);

    for (target, _) in agents
        .iter()
        .filter(of_kind(AgentKind::Country))
        .filter(|(t_id, _)| Some(t_id.as_str()) == traits.country.as_deref())
    {
        link(id, target, out);
    }
}
