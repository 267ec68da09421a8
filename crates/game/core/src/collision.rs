//! Overlap resolution.
//!
//! Every overlap is routed by the kinds of the two entities. Pairs that have
//! no effect are listed explicitly so that adding a kind forces a decision
//! here.

use crate::clock::{Millis, Scheduler, TimerEvent};
use crate::combat::{HealOutcome, Hit, HitOutcome, apply_effects};
use crate::config::GameConfig;
use crate::entity::{EntityId, EntityKind};
use crate::event::{Animation, ExpireReason, Feedback, GameEvent, Sound, Tint};
use crate::world::{World, WorldQuery};

/// Mutable state an overlap may touch.
pub struct Resolver<'a> {
    pub world: &'a mut World,
    pub timers: &'a mut Scheduler,
    pub config: &'a GameConfig,
    pub now: Millis,
}

impl Resolver<'_> {
    /// Resolves an overlap between `a` and `b`, in either order. Entities
    /// already removed are ignored.
    pub fn dispatch(&mut self, a: EntityId, b: EntityId) -> Vec<GameEvent> {
        let (Some(kind_a), Some(kind_b)) = (self.world.kind_of(a), self.world.kind_of(b)) else {
            return Vec::new();
        };
        if a == b {
            return Vec::new();
        }

        use EntityKind as K;
        match (kind_a, kind_b) {
            (K::Combatant, K::Combatant) => self.melee(a, b),
            (K::Projectile, K::Combatant) => self.projectile_contact(a, b),
            (K::Combatant, K::Projectile) => self.projectile_contact(b, a),
            (K::Field, K::Combatant) => self.field_contact(a, b),
            (K::Combatant, K::Field) => self.field_contact(b, a),
            (K::Spike, K::Combatant) => self.spike_contact(a, b),
            (K::Combatant, K::Spike) => self.spike_contact(b, a),
            (K::Potion, K::Combatant) => self.potion_contact(a, b),
            (K::Combatant, K::Potion) => self.potion_contact(b, a),
            (
                K::Projectile | K::Field | K::Spike | K::Potion,
                K::Projectile | K::Field | K::Spike | K::Potion,
            ) => Vec::new(),
        }
    }

    /// Both bodies attack each other; the hits are computed before either
    /// lands.
    fn melee(&mut self, a: EntityId, b: EntityId) -> Vec<GameEvent> {
        let (Some(first), Some(second)) = (self.world.combatant(a), self.world.combatant(b)) else {
            return Vec::new();
        };
        let hits = [(b, first.collide_attacks(second)), (a, second.collide_attacks(first))];

        let mut events = Vec::new();
        for (target, hit) in hits {
            if let Some(hit) = hit {
                events.extend(self.apply_hit(target, hit));
            }
        }
        events
    }

    /// Opposing living targets take the projectile's damage and the
    /// projectile is spent, whether the hit landed or not.
    fn projectile_contact(&mut self, projectile: EntityId, target: EntityId) -> Vec<GameEvent> {
        let (Some(shot), Some(victim)) = (
            self.world.projectile(projectile),
            self.world.combatant(target),
        ) else {
            return Vec::new();
        };
        if !victim.is_alive() || !shot.team.opposes(victim.team()) {
            return Vec::new();
        }

        let hit = Hit {
            amount: shot.damage,
            source: shot.owner,
            source_position: shot.position,
            bounce: true,
        };
        let mut events = self.apply_hit(target, hit);
        events.extend(expire(self.world, projectile, ExpireReason::Impact));
        events
    }

    fn field_contact(&mut self, field: EntityId, target: EntityId) -> Vec<GameEvent> {
        let Some(contact) = self.world.field_contact(field, target) else {
            return Vec::new();
        };
        let (owner, damage, effects) = (contact.owner, contact.damage, contact.effects);

        let status = &self.config.status;
        self.timers.schedule(
            status.field_effect_ms,
            TimerEvent::FieldCooldownExpired { field, target },
        );
        let Some(victim) = self.world.combatant_mut(target) else {
            return Vec::new();
        };
        apply_effects(victim, owner, damage, effects, self.timers, status);

        effects
            .tints()
            .into_iter()
            .map(|tint| {
                GameEvent::Feedback(Feedback::Tint {
                    entity: target,
                    tint,
                    duration_ms: status.field_effect_ms,
                })
            })
            .collect()
    }

    fn spike_contact(&mut self, spike: EntityId, target: EntityId) -> Vec<GameEvent> {
        let frame_ms = self.config.world.spike_frame_ms;
        let Some(hit) = self
            .world
            .spike(spike)
            .and_then(|spike| spike.hit_at(self.now, frame_ms))
        else {
            return Vec::new();
        };
        let mut events = self.apply_hit(target, hit);
        if !events.is_empty() {
            events.push(GameEvent::Feedback(Feedback::Sound {
                entity: spike,
                sound: Sound::Spike,
            }));
        }
        events
    }

    /// A same-team combatant drinks the potion, even at full health.
    fn potion_contact(&mut self, potion: EntityId, drinker: EntityId) -> Vec<GameEvent> {
        let Some(healing) = self.world.potion(potion).and_then(|potion| {
            let drinker = self.world.combatant(drinker)?;
            (drinker.is_alive() && potion.usable_by(drinker.team())).then_some(potion.healing)
        }) else {
            return Vec::new();
        };

        let mut events = vec![GameEvent::PotionConsumed {
            potion,
            by: drinker,
        }];
        if let Some(HealOutcome::Healed { restored, current }) = self
            .world
            .combatant_mut(drinker)
            .map(|combatant| combatant.heal(healing))
        {
            events.push(GameEvent::Healed {
                target: drinker,
                amount: restored,
                current,
            });
            events.push(GameEvent::Feedback(Feedback::Tint {
                entity: drinker,
                tint: Tint::Heal,
                duration_ms: self.config.combat.invulnerability_ms,
            }));
            events.push(GameEvent::Feedback(Feedback::Sound {
                entity: drinker,
                sound: Sound::Heal,
            }));
        }
        events.extend(despawn(self.world, potion));
        events
    }

    /// Lands `hit` on combatant `target` and reports what happened.
    pub fn apply_hit(&mut self, target: EntityId, hit: Hit) -> Vec<GameEvent> {
        let Some(victim) = self.world.combatant_mut(target) else {
            return Vec::new();
        };
        let outcome = victim.take_hit(hit, self.timers, &self.config.combat);
        hit_events(target, hit.source, outcome, self.config.combat.invulnerability_ms)
    }
}

fn hit_events(target: EntityId, source: EntityId, outcome: HitOutcome, flash_ms: Millis) -> Vec<GameEvent> {
    match outcome {
        HitOutcome::Ignored(_) => Vec::new(),
        HitOutcome::Damaged { dealt, remaining } => vec![
            GameEvent::Damaged {
                target,
                source,
                amount: dealt,
                remaining,
            },
            GameEvent::Feedback(Feedback::Tint {
                entity: target,
                tint: Tint::Hit,
                duration_ms: flash_ms,
            }),
            GameEvent::Feedback(Feedback::Animation {
                entity: target,
                animation: Animation::Hit,
            }),
            GameEvent::Feedback(Feedback::Sound {
                entity: target,
                sound: Sound::Hurt,
            }),
        ],
        HitOutcome::Killed { dealt } => vec![
            GameEvent::Damaged {
                target,
                source,
                amount: dealt,
                remaining: 0,
            },
            GameEvent::Killed { target, source },
            GameEvent::Feedback(Feedback::Sound {
                entity: target,
                sound: Sound::Death,
            }),
        ],
    }
}

/// Removes an entity and reports the removal.
pub(crate) fn despawn(world: &mut World, id: EntityId) -> Option<GameEvent> {
    world
        .remove(id)
        .map(|kind| GameEvent::Removed { entity: id, kind })
}

/// Removes a projectile, reporting why it left.
pub(crate) fn expire(world: &mut World, projectile: EntityId, reason: ExpireReason) -> Vec<GameEvent> {
    if world.projectile(projectile).is_none() {
        return Vec::new();
    }
    let mut events = vec![GameEvent::ProjectileExpired { projectile, reason }];
    events.extend(despawn(world, projectile));
    events
}
