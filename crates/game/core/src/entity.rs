//! Entity identity, team membership and kind tags.

use core::fmt;

/// Unique identifier of anything living in the world.
///
/// Ids are allocated by the world and never reused, so a timer or a path
/// request holding a stale id simply finds nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side a combatant fights for. Projectiles, fields and potions inherit the
/// team of whoever produced them.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Team {
    Friendly,
    Hostile,
}

impl Team {
    pub fn opposite(self) -> Self {
        match self {
            Team::Friendly => Team::Hostile,
            Team::Hostile => Team::Friendly,
        }
    }

    pub fn opposes(self, other: Team) -> bool {
        self != other
    }
}

/// Tag of every entity kind the world holds. Collision dispatch matches on
/// pairs of these exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Combatant,
    Projectile,
    Potion,
    Field,
    Spike,
}

/// Horizontal sprite orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a horizontal velocity; `None` when it is zero.
    pub fn from_velocity_x(x: f64) -> Option<Self> {
        if x > 0.0 {
            Some(Facing::Right)
        } else if x < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }

    /// Unit x component of this facing.
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}
