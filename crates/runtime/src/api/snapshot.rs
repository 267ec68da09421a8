//! Read-only views of the arena handed to clients.

use serde::{Deserialize, Serialize};

use game_core::{Arena, ControlKind, EntityId, Millis, Team, Vec2, WorldQuery};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: EntityId,
    pub team: Team,
    pub position: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub control: Option<ControlKind>,
}

/// State of the arena between two ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub tick: u64,
    pub now: Millis,
    pub human: Option<EntityId>,
    pub combatants: Vec<CombatantSnapshot>,
    pub projectiles: usize,
    pub fields: usize,
    pub potions: usize,
}

impl ArenaSnapshot {
    pub(crate) fn capture(arena: &Arena, tick: u64) -> Self {
        let world = arena.world();
        let combatants = world
            .combatants()
            .into_iter()
            .map(|combatant| CombatantSnapshot {
                id: combatant.id(),
                team: combatant.team(),
                position: combatant.position,
                health: combatant.health(),
                max_health: combatant.max_health(),
                control: world.control(combatant.id()).map(|policy| policy.kind()),
            })
            .collect();

        Self {
            tick,
            now: arena.now(),
            human: world.human(),
            combatants,
            projectiles: world.projectiles().len(),
            fields: world.fields().count(),
            potions: world.potions().len(),
        }
    }

    /// Living combatants of `team`.
    pub fn survivors(&self, team: Team) -> usize {
        self.combatants
            .iter()
            .filter(|combatant| combatant.team == team && combatant.health > 0)
            .count()
    }
}

/// What a batch of ticks produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub ticks: u64,
    pub now: Millis,
    pub events: usize,
    pub kills: usize,
}
