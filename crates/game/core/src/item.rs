//! Pickups.

use crate::entity::{EntityId, Team};
use crate::geometry::{Hitbox, Rect, Vec2};

/// Team-bound healing item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Potion {
    pub id: EntityId,
    pub team: Team,
    pub position: Vec2,
    pub hitbox: Hitbox,
    pub healing: i32,
}

impl Potion {
    pub const DEFAULT_HEALING: i32 = 2;

    pub fn new(id: EntityId, team: Team, position: Vec2) -> Self {
        Self {
            id,
            team,
            position,
            hitbox: Hitbox::new(8.0, 8.0),
            healing: Self::DEFAULT_HEALING,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.hitbox.bounds_at(self.position)
    }

    /// Only members of the owning team may drink it.
    pub fn usable_by(&self, team: Team) -> bool {
        self.team == team
    }
}
