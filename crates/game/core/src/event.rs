//! Observable outcomes of a tick.
//!
//! The rules never draw, animate or play sounds. They report what happened
//! as [`GameEvent`]s and request presentation through fire-and-forget
//! [`Feedback`] events that a renderer may honor or drop.

use crate::clock::Millis;
use crate::entity::{EntityId, EntityKind, Team};
use crate::geometry::Vec2;

/// Color overlay requested on a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Tint {
    Hit,
    Heal,
    Slow,
    Poison,
}

impl Tint {
    /// RGB color of the overlay.
    pub const fn rgb(self) -> u32 {
        match self {
            Tint::Hit => 0xffffff,
            Tint::Heal => 0x6bea2a,
            Tint::Slow => 0x5b2986,
            Tint::Poison => 0x106910,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Animation {
    Idle,
    Run,
    Hit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Sound {
    Hurt,
    Death,
    Heal,
    Fire,
    Field,
    Spike,
}

/// Presentation request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feedback {
    Tint {
        entity: EntityId,
        tint: Tint,
        duration_ms: Millis,
    },
    Animation {
        entity: EntityId,
        animation: Animation,
    },
    Sound {
        entity: EntityId,
        sound: Sound,
    },
}

impl Feedback {
    pub fn entity(&self) -> EntityId {
        match self {
            Feedback::Tint { entity, .. }
            | Feedback::Animation { entity, .. }
            | Feedback::Sound { entity, .. } => *entity,
        }
    }
}

/// Why a projectile left the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ExpireReason {
    OutOfRange,
    OutOfBounds,
    Impact,
    /// Evicted by a newer instance from the same generator.
    Evicted,
    Lifetime,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameEvent {
    Damaged {
        target: EntityId,
        source: EntityId,
        amount: u32,
        remaining: u32,
    },
    Killed {
        target: EntityId,
        source: EntityId,
    },
    Healed {
        target: EntityId,
        amount: u32,
        current: u32,
    },
    Fired {
        owner: EntityId,
        projectile: EntityId,
        heading: f64,
    },
    ProjectileExpired {
        projectile: EntityId,
        reason: ExpireReason,
    },
    TrapArmed {
        projectile: EntityId,
        position: Vec2,
    },
    FieldSpawned {
        field: EntityId,
        team: Team,
        center: Vec2,
    },
    FieldExpired {
        field: EntityId,
    },
    PotionConsumed {
        potion: EntityId,
        by: EntityId,
    },
    /// Entity removed from the world at the end of a tick.
    Removed {
        entity: EntityId,
        kind: EntityKind,
    },
    /// A flee path was requested but no route exists.
    PathNotFound {
        entity: EntityId,
    },
    ControlSwitched {
        from: Option<EntityId>,
        to: EntityId,
    },
    Feedback(Feedback),
}
