//! Topic-based event bus implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::Event;

/// Topics for event routing
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// Damage, deaths and healing
    Combat,
    /// Projectiles, fields and entity removal
    World,
    /// Control switches and pathfinding failures
    Control,
    /// Tints, animations and sounds
    Feedback,
    /// One event per completed tick
    Tick,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Combat,
        Topic::World,
        Topic::Control,
        Topic::Feedback,
        Topic::Tick,
    ];
}

struct Channels {
    combat: broadcast::Sender<Event>,
    world: broadcast::Sender<Event>,
    control: broadcast::Sender<Event>,
    feedback: broadcast::Sender<Event>,
    tick: broadcast::Sender<Event>,
}

impl Channels {
    fn get(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Combat => &self.combat,
            Topic::World => &self.world,
            Topic::Control => &self.control,
            Topic::Feedback => &self.feedback,
            Topic::Tick => &self.tick,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; slow subscribers see
/// `RecvError::Lagged` instead of stalling the simulation.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                combat: broadcast::channel(capacity).0,
                world: broadcast::channel(capacity).0,
                control: broadcast::channel(capacity).0,
                feedback: broadcast::channel(capacity).0,
                tick: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.get(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", %topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.get(topic).subscribe()
    }

    /// Subscribe to every topic at once.
    pub fn subscribe_all(&self) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        Topic::ALL
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use game_core::{EntityId, GameEvent};

    use super::*;
    use crate::events::TickEvent;

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut combat = bus.subscribe(Topic::Combat);
        let mut ticks = bus.subscribe(Topic::Tick);

        bus.publish(Event::Tick(TickEvent {
            tick: 1,
            now: 16,
            events: 1,
        }));
        bus.publish(Event::Game {
            tick: 1,
            event: GameEvent::Healed {
                target: EntityId(3),
                amount: 2,
                current: 6,
            },
        });

        assert!(matches!(ticks.recv().await.unwrap(), Event::Tick(_)));
        assert!(matches!(
            combat.recv().await.unwrap(),
            Event::Game {
                event: GameEvent::Healed { .. },
                ..
            }
        ));
        assert!(ticks.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::Tick(TickEvent {
            tick: 0,
            now: 0,
            events: 0,
        }));
        assert_eq!(bus.subscribe_all().len(), Topic::ALL.len());
    }
}
