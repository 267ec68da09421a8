//! Combat resolution: health, the hit/heal state machine and field status
//! effects.

mod combatant;
mod health;
mod status;

pub use combatant::{
    Combatant, CombatantSpec, HealOutcome, Hit, HitOutcome, IgnoreReason, LifeState,
};
pub use health::{Health, coerce_max_health};
pub use status::{AppliedEffects, EffectFlags, apply_effects, poison_schedule};
