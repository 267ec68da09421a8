//! Static map hazards.

use crate::clock::Millis;
use crate::combat::Hit;
use crate::entity::EntityId;
use crate::geometry::{Hitbox, Rect, Vec2};

/// Thrust cycle of a spike, played forward then backward.
const SPIKE_FRAMES: [u8; 6] = [0, 1, 2, 3, 2, 1];

/// Floor spike that hurts anyone standing on it while extended.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spike {
    pub id: EntityId,
    pub position: Vec2,
    pub hitbox: Hitbox,
    pub damage: i32,
}

impl Spike {
    pub fn new(id: EntityId, position: Vec2, damage: i32) -> Self {
        Self {
            id,
            position,
            hitbox: Hitbox::new(16.0, 16.0),
            damage,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.hitbox.bounds_at(self.position)
    }

    /// Animation frame shown at `now`.
    pub fn frame(now: Millis, frame_ms: Millis) -> u8 {
        let index = now.checked_div(frame_ms).unwrap_or(0) % SPIKE_FRAMES.len() as u64;
        SPIKE_FRAMES[index as usize]
    }

    /// Frames 2 and 3 hurt.
    pub fn is_extended(now: Millis, frame_ms: Millis) -> bool {
        Self::frame(now, frame_ms) >= 2
    }

    /// Hit dealt to anything overlapping the spike at `now`, regardless of
    /// team.
    pub fn hit_at(&self, now: Millis, frame_ms: Millis) -> Option<Hit> {
        Self::is_extended(now, frame_ms).then_some(Hit {
            amount: self.damage,
            source: self.id,
            source_position: self.position,
            bounce: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_yoyo() {
        let frames: Vec<u8> = (0..8).map(|n| Spike::frame(n * 250, 250)).collect();
        assert_eq!(frames, vec![0, 1, 2, 3, 2, 1, 0, 1]);
    }

    #[test]
    fn only_extended_frames_hit() {
        let spike = Spike::new(EntityId(9), Vec2::ZERO, 1);
        assert!(spike.hit_at(0, 250).is_none());
        assert!(spike.hit_at(260, 250).is_none());
        let hit = spike.hit_at(500, 250).unwrap();
        assert_eq!(hit.source, EntityId(9));
        assert!(hit.bounce);
        assert!(spike.hit_at(1000, 250).is_some());
        assert!(spike.hit_at(1250, 250).is_none());
    }

    #[test]
    fn zero_frame_length_freezes_on_first_frame() {
        assert_eq!(Spike::frame(12_345, 0), 0);
    }
}
