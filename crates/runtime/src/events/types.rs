use serde::{Deserialize, Serialize};

use game_core::{GameEvent, Millis};

use super::bus::Topic;

/// Marks the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvent {
    pub tick: u64,
    pub now: Millis,
    pub events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// An event emitted by the arena during tick `tick`.
    Game { tick: u64, event: GameEvent },
    Tick(TickEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Tick(_) => Topic::Tick,
            Event::Game { event, .. } => match event {
                GameEvent::Damaged { .. }
                | GameEvent::Killed { .. }
                | GameEvent::Healed { .. }
                | GameEvent::PotionConsumed { .. } => Topic::Combat,
                GameEvent::Fired { .. }
                | GameEvent::ProjectileExpired { .. }
                | GameEvent::TrapArmed { .. }
                | GameEvent::FieldSpawned { .. }
                | GameEvent::FieldExpired { .. }
                | GameEvent::Removed { .. } => Topic::World,
                GameEvent::PathNotFound { .. } | GameEvent::ControlSwitched { .. } => {
                    Topic::Control
                }
                GameEvent::Feedback(_) => Topic::Feedback,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use game_core::{EntityId, Feedback, Sound};

    use super::*;

    #[test]
    fn events_route_by_kind() {
        let kill = Event::Game {
            tick: 1,
            event: GameEvent::Killed {
                target: EntityId(1),
                source: EntityId(2),
            },
        };
        assert_eq!(kill.topic(), Topic::Combat);

        let sound = Event::Game {
            tick: 1,
            event: GameEvent::Feedback(Feedback::Sound {
                entity: EntityId(1),
                sound: Sound::Fire,
            }),
        };
        assert_eq!(sound.topic(), Topic::Feedback);

        let tick = Event::Tick(TickEvent {
            tick: 1,
            now: 16,
            events: 0,
        });
        assert_eq!(tick.topic(), Topic::Tick);
    }
}
