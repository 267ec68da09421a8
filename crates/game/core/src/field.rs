//! Lingering area effects left by field projectiles.

use std::collections::BTreeSet;

use crate::clock::Millis;
use crate::combat::{Combatant, EffectFlags};
use crate::entity::{EntityId, Team};
use crate::geometry::Vec2;
use crate::projectile::{FieldSpec, Projectile};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    pub id: EntityId,
    pub owner: EntityId,
    pub team: Team,
    pub center: Vec2,
    pub radius: f64,
    /// Damage of each poison tick.
    pub damage: i32,
    pub effects: EffectFlags,
    pub lifetime_ms: Option<Millis>,
    /// Combatants on contact cooldown.
    collided: BTreeSet<EntityId>,
}

impl Field {
    /// Field left by `projectile` where it stopped.
    pub fn from_projectile(id: EntityId, projectile: &Projectile, spec: &FieldSpec) -> Self {
        Self {
            id,
            owner: projectile.owner,
            team: projectile.team,
            center: projectile.position,
            radius: spec.radius,
            damage: projectile.damage,
            effects: spec.effects,
            lifetime_ms: spec.lifetime_ms,
            collided: BTreeSet::new(),
        }
    }

    /// True when the combatant's hitbox touches the field.
    pub fn touches(&self, target: &Combatant) -> bool {
        target.bounds().intersects_circle(self.center, self.radius)
    }

    /// Registers contact with `target`.
    ///
    /// Returns false for allies, the dead, and combatants still on cooldown;
    /// otherwise puts the target on cooldown and returns true.
    pub fn try_contact(&mut self, target: &Combatant) -> bool {
        if !self.team.opposes(target.team()) || !target.is_alive() {
            return false;
        }
        self.collided.insert(target.id())
    }

    /// Ends the contact cooldown of `target`.
    pub fn release(&mut self, target: EntityId) {
        self.collided.remove(&target);
    }

    pub fn is_cooling_down(&self, target: EntityId) -> bool {
        self.collided.contains(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Scheduler;
    use crate::combat::CombatantSpec;
    use crate::projectile::{ProjectileBehavior, ProjectileGenerator, WeaponSpec};

    fn field() -> Field {
        let spec = FieldSpec::default();
        let weapon = WeaponSpec {
            behavior: ProjectileBehavior::Field(spec.clone()),
            ..WeaponSpec::default()
        };
        let mut timers = Scheduler::new();
        let fired = ProjectileGenerator::new(EntityId(1), Team::Friendly, &weapon)
            .fire(EntityId(2), Vec2::new(40.0, 40.0), 0.0, &mut timers, |_| true)
            .unwrap();
        Field::from_projectile(EntityId(3), &fired.projectile, &spec)
    }

    fn combatant(id: u32, team: Team) -> Combatant {
        Combatant::new(
            EntityId(id),
            &CombatantSpec {
                team,
                position: Vec2::new(40.0, 40.0),
                ..CombatantSpec::default()
            },
        )
    }

    #[test]
    fn contact_is_gated_by_cooldown() {
        let mut field = field();
        let enemy = combatant(5, Team::Hostile);
        assert!(field.touches(&enemy));
        assert!(field.try_contact(&enemy));
        assert!(!field.try_contact(&enemy));
        assert!(field.is_cooling_down(enemy.id()));

        field.release(enemy.id());
        assert!(field.try_contact(&enemy));
    }

    #[test]
    fn allies_are_unaffected() {
        let mut field = field();
        assert!(!field.try_contact(&combatant(5, Team::Friendly)));
    }

    #[test]
    fn inherits_projectile_stats() {
        let field = field();
        assert_eq!(field.owner, EntityId(1));
        assert_eq!(field.team, Team::Friendly);
        assert_eq!(field.center, Vec2::new(40.0, 40.0));
        assert_eq!(field.effects, EffectFlags::POISON);
    }
}
