//! Periodic coordination inside country unions.
//!
//! Every `coordination_interval_days`, each union with at least one member
//! present in the roster stamps its members' local political state and
//! records one coordination interaction. Unions are not agents; the
//! interaction's source is the union name.

use pestel_types::{AgentId, AgentKind, Category, Interaction, InteractionKind};
use tracing::info;

use crate::context::SimulationContext;

/// Local political factor stamped on each member.
pub const UNION_COORDINATION_FACTOR: &str = "union_coordination";

/// Return `true` if coordination is due on `day`.
pub const fn is_due(day: u64, interval: u64) -> bool {
    day > 0 && matches!(day.checked_rem(interval), Some(0))
}

/// Coordinate every union with present members. Returns the number of
/// unions that coordinated.
pub fn coordinate(ctx: &mut SimulationContext, day: u64) -> usize {
    let mut coordinated = 0_usize;
    for union in &ctx.unions {
        let members: Vec<(usize, AgentId)> = union
            .members
            .iter()
            .map(AgentId::new)
            .filter_map(|id| ctx.index_of(&id).map(|i| (i, id)))
            .filter(|(i, _)| {
                ctx.agents
                    .get(*i)
                    .is_some_and(|agent| agent.kind() == AgentKind::Country)
            })
            .collect();
        if members.is_empty() {
            continue;
        }

        info!(
            day,
            union = %union.name,
            members = members.len(),
            "{} coordinates response to global challenges affecting member states",
            union.name
        );
        let stamp = format!("Day {day}: coordinated through {}", union.name);
        for (index, _) in &members {
            if let Some(agent) = ctx.agents.get_mut(*index) {
                let core = agent.core_mut();
                core.note(
                    Category::Political,
                    UNION_COORDINATION_FACTOR,
                    stamp.as_str(),
                );
            }
        }
        ctx.history.record_interaction(Interaction {
            day,
            source: AgentId::new(union.name.as_str()),
            targets: members.into_iter().map(|(_, id)| id).collect(),
            description: format!("{} coordinates member states", union.name),
            kind: InteractionKind::UnionCoordination,
        });
        coordinated = coordinated.saturating_add(1);
    }
    coordinated
}
