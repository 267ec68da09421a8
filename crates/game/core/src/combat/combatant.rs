//! The combatant body and its hit/heal state machine.
//!
//! ```text
//!            take_hit (health > 0)
//!   Alive ─────────────────────────▶ Alive (invulnerable, stunned)
//!     │                                   │ timers end both windows
//!     │ take_hit (health == 0)            ▼
//!     └──────────────────────────▶ Dead (terminal)
//! ```

use std::collections::BTreeSet;

use crate::clock::{Scheduler, TimerEvent};
use crate::config::{CombatTuning, ConfigError, GameConfig, SlowPolicy};
use crate::entity::{EntityId, Facing, Team};
use crate::geometry::{Hitbox, Rect, Vec2};
use crate::projectile::ProjectileGenerator;

use super::health::Health;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum LifeState {
    #[default]
    Alive,
    Dead,
}

/// Incoming damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub amount: i32,
    pub source: EntityId,
    /// Where the source was when it hit; knockback points away from it.
    pub source_position: Vec2,
    /// Whether the hit knocks the target back.
    pub bounce: bool,
}

/// Why a hit had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum IgnoreReason {
    NonPositive,
    Dead,
    Invulnerable,
    RecentSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Ignored(IgnoreReason),
    Damaged { dealt: u32, remaining: u32 },
    Killed { dealt: u32 },
}

impl HitOutcome {
    pub fn landed(&self) -> bool {
        !matches!(self, HitOutcome::Ignored(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealOutcome {
    Ignored,
    Healed { restored: u32, current: u32 },
}

/// Initial values of a combatant. Every number is clamped or coerced on
/// construction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CombatantSpec {
    pub team: Team,
    pub position: Vec2,
    pub hitbox: Hitbox,
    pub max_health: f64,
    /// Starting health; full when absent.
    pub health: Option<i64>,
    pub movement_speed: f64,
    pub collide_attack_damage: i32,
}

impl Default for CombatantSpec {
    fn default() -> Self {
        Self {
            team: Team::Hostile,
            position: Vec2::ZERO,
            hitbox: Hitbox::default(),
            max_health: 6.0,
            health: None,
            movement_speed: 64.0,
            collide_attack_damage: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct SlowState {
    active: u32,
    generation: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    id: EntityId,
    team: Team,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    hitbox: Hitbox,
    health: Health,
    life: LifeState,
    base_speed: f64,
    slow: SlowState,
    invulnerable: bool,
    stunned: bool,
    recent_sources: BTreeSet<EntityId>,
    pre_hit_velocity: Option<Vec2>,
    collide_attack_damage: i32,
    generator: Option<ProjectileGenerator>,
}

impl Combatant {
    pub fn new(id: EntityId, spec: &CombatantSpec) -> Self {
        let health = match spec.health {
            Some(current) => Health::with_current(spec.max_health, current),
            None => Health::full(spec.max_health),
        };
        let life = if health.is_empty() {
            LifeState::Dead
        } else {
            LifeState::Alive
        };
        Self {
            id,
            team: spec.team,
            position: spec.position,
            velocity: Vec2::ZERO,
            facing: Facing::default(),
            hitbox: spec.hitbox,
            health,
            life,
            base_speed: clamp_speed(spec.movement_speed),
            slow: SlowState::default(),
            invulnerable: false,
            stunned: false,
            recent_sources: BTreeSet::new(),
            pre_hit_velocity: None,
            collide_attack_damage: spec.collide_attack_damage,
            generator: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    pub fn bounds(&self) -> Rect {
        self.hitbox.bounds_at(self.position)
    }

    pub fn health(&self) -> u32 {
        self.health.current()
    }

    pub fn max_health(&self) -> u32 {
        self.health.max()
    }

    pub fn health_ratio(&self) -> f64 {
        self.health.ratio()
    }

    pub fn life(&self) -> LifeState {
        self.life
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    /// False during hit-stun.
    pub fn can_move(&self) -> bool {
        !self.stunned && self.is_alive()
    }

    pub fn is_stunned(&self) -> bool {
        self.stunned
    }

    /// Replaces the maximum health (coerced) and clamps the current value.
    pub fn set_max_health(&mut self, max: f64) {
        self.health.set_max(max);
    }

    /// Unslowed movement speed, in `[0, 255]`.
    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }

    pub fn set_base_speed(&mut self, speed: f64) {
        self.base_speed = clamp_speed(speed);
    }

    /// Effective movement speed with every active slow applied.
    pub fn movement_speed(&self, slow_factor: f64) -> f64 {
        let exponent = i32::try_from(self.slow.active).unwrap_or(i32::MAX);
        self.base_speed * slow_factor.powi(exponent)
    }

    pub fn is_slowed(&self) -> bool {
        self.slow.active > 0
    }

    pub fn collide_attack_damage(&self) -> i32 {
        self.collide_attack_damage
    }

    pub fn generator(&self) -> Option<&ProjectileGenerator> {
        self.generator.as_ref()
    }

    pub fn generator_mut(&mut self) -> Option<&mut ProjectileGenerator> {
        self.generator.as_mut()
    }

    /// True when the combatant has a ranged weapon, ready or not.
    pub fn has_ranged_attack(&self) -> bool {
        self.generator.is_some()
    }

    /// Attaches a projectile generator. The generator must have been built
    /// for this combatant.
    pub fn equip(&mut self, generator: ProjectileGenerator) -> Result<(), ConfigError> {
        if generator.owner() != self.id {
            return Err(ConfigError::ForeignGenerator {
                owner: generator.owner(),
                combatant: self.id,
            });
        }
        self.generator = Some(generator);
        Ok(())
    }

    /// Applies a hit.
    ///
    /// Ignored when the amount is not positive, the combatant is dead or
    /// invulnerable, or the same source hit it moments ago. Otherwise opens
    /// the invulnerability and hit-stun windows, knocks the body back for
    /// bouncing hits and removes health. Reaching zero health kills.
    pub fn take_hit(
        &mut self,
        hit: Hit,
        timers: &mut Scheduler,
        tuning: &CombatTuning,
    ) -> HitOutcome {
        if hit.amount <= 0 {
            return HitOutcome::Ignored(IgnoreReason::NonPositive);
        }
        if !self.is_alive() {
            return HitOutcome::Ignored(IgnoreReason::Dead);
        }
        if self.invulnerable {
            return HitOutcome::Ignored(IgnoreReason::Invulnerable);
        }
        if self.recent_sources.contains(&hit.source) {
            return HitOutcome::Ignored(IgnoreReason::RecentSource);
        }

        self.invulnerable = true;
        timers.schedule(
            tuning.invulnerability_ms,
            TimerEvent::InvulnerabilityEnded(self.id),
        );

        self.recent_sources.insert(hit.source);
        timers.schedule(
            tuning.recent_source_ms,
            TimerEvent::RecentSourceExpired {
                target: self.id,
                source: hit.source,
            },
        );

        self.stunned = true;
        timers.schedule(tuning.hit_stun_ms, TimerEvent::HitStunEnded(self.id));

        if hit.bounce {
            if self.pre_hit_velocity.is_none() {
                self.pre_hit_velocity = Some(self.velocity);
            }
            let mut away = (self.position - hit.source_position).normalize_or_zero();
            if away.is_zero() {
                away = Vec2::new(-self.facing.sign(), 0.0);
            }
            self.velocity = away * tuning.knockback_speed;
        }

        let dealt = self.health.damage(hit.amount.unsigned_abs());
        if self.health.is_empty() {
            self.life = LifeState::Dead;
            self.velocity = Vec2::ZERO;
            self.pre_hit_velocity = None;
            HitOutcome::Killed { dealt }
        } else {
            HitOutcome::Damaged {
                dealt,
                remaining: self.health.current(),
            }
        }
    }

    /// Restores health, clamped at the maximum. Dead combatants stay dead.
    pub fn heal(&mut self, amount: i32) -> HealOutcome {
        if amount <= 0 || !self.is_alive() {
            return HealOutcome::Ignored;
        }
        let restored = self.health.heal(amount.unsigned_abs());
        HealOutcome::Healed {
            restored,
            current: self.health.current(),
        }
    }

    /// Contact damage this combatant deals to an opposing body it overlaps.
    pub fn collide_attacks(&self, target: &Combatant) -> Option<Hit> {
        if !self.is_alive() || !self.team.opposes(target.team) {
            return None;
        }
        Some(Hit {
            amount: self.collide_attack_damage,
            source: self.id,
            source_position: self.position,
            bounce: true,
        })
    }

    pub(crate) fn end_invulnerability(&mut self) {
        self.invulnerable = false;
    }

    /// Ends hit-stun and restores the velocity held before a knockback.
    pub(crate) fn end_hit_stun(&mut self) {
        self.stunned = false;
        if let Some(velocity) = self.pre_hit_velocity.take() {
            if self.is_alive() {
                self.velocity = velocity;
            }
        }
    }

    pub(crate) fn forget_source(&mut self, source: EntityId) {
        self.recent_sources.remove(&source);
    }

    /// Registers a new slow and returns its generation.
    pub(crate) fn apply_slow(&mut self, policy: SlowPolicy) -> u32 {
        self.slow.generation = self.slow.generation.wrapping_add(1);
        match policy {
            SlowPolicy::Stack => self.slow.active = self.slow.active.saturating_add(1),
            SlowPolicy::Refresh => self.slow.active = 1,
        }
        self.slow.generation
    }

    pub(crate) fn expire_slow(&mut self, generation: u32, policy: SlowPolicy) {
        match policy {
            SlowPolicy::Stack => self.slow.active = self.slow.active.saturating_sub(1),
            SlowPolicy::Refresh => {
                if generation == self.slow.generation {
                    self.slow.active = 0;
                }
            }
        }
    }

    /// Turns the sprite toward the horizontal direction of travel.
    pub fn update_facing(&mut self) {
        if let Some(facing) = Facing::from_velocity_x(self.velocity.x) {
            self.facing = facing;
        }
    }
}

fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return 0.0;
    }
    speed.clamp(0.0, GameConfig::MAX_MOVEMENT_SPEED)
}
