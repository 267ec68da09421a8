//! Poison and slow effects applied by fields.
//!
//! Effects are fully described by timers: applying an effect schedules its
//! ticks and its expiry up front, so an effect keeps running after the field
//! that caused it has gone.

use bitflags::bitflags;

use crate::clock::{Millis, Scheduler, TimerEvent};
use crate::config::StatusTuning;
use crate::entity::EntityId;
use crate::event::Tint;

use super::combatant::Combatant;

bitflags! {
    /// Status effects a field applies on contact.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EffectFlags: u8 {
        const POISON = 1 << 0;
        const SLOW = 1 << 1;
    }
}

// Written as flag names, e.g. "POISON | SLOW".
#[cfg(feature = "serde")]
impl serde::Serialize for EffectFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bitflags::serde::serialize(self, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EffectFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bitflags::serde::deserialize(deserializer)
    }
}

impl EffectFlags {
    /// Tints requested for these effects, slow first.
    pub fn tints(self) -> Vec<Tint> {
        let mut tints = Vec::new();
        if self.contains(EffectFlags::SLOW) {
            tints.push(Tint::Slow);
        }
        if self.contains(EffectFlags::POISON) {
            tints.push(Tint::Poison);
        }
        tints
    }
}

/// What [`apply_effects`] scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppliedEffects {
    pub poison_ticks: u32,
    pub slowed: bool,
}

/// Schedules poison ticks and a slow on `target`.
///
/// Poison deals `damage` as a non-bouncing hit every `poison_tick_ms` for the
/// effect duration, so a 5000 ms effect with 1000 ms ticks hits at 1000,
/// 2000, ..., 5000. Slow multiplies the movement speed by the slow factor
/// until its expiry timer fires.
pub fn apply_effects(
    target: &mut Combatant,
    source: EntityId,
    damage: i32,
    effects: EffectFlags,
    timers: &mut Scheduler,
    tuning: &StatusTuning,
) -> AppliedEffects {
    let mut applied = AppliedEffects::default();
    if !target.is_alive() {
        return applied;
    }

    if effects.contains(EffectFlags::SLOW) {
        let generation = target.apply_slow(tuning.slow_policy);
        timers.schedule(
            tuning.field_effect_ms,
            TimerEvent::SlowExpired {
                target: target.id(),
                generation,
            },
        );
        applied.slowed = true;
    }

    if effects.contains(EffectFlags::POISON) {
        for delay in poison_schedule(tuning.poison_tick_ms, tuning.field_effect_ms) {
            timers.schedule(
                delay,
                TimerEvent::PoisonTick {
                    target: target.id(),
                    source,
                    damage,
                },
            );
            applied.poison_ticks += 1;
        }
    }

    applied
}

/// Delays of every poison tick for an effect of `duration`.
pub fn poison_schedule(tick: Millis, duration: Millis) -> Vec<Millis> {
    if tick == 0 {
        return Vec::new();
    }
    (1..=duration / tick).map(|n| n * tick).collect()
}
