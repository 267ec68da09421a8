//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! stepping the arena, steering the human-controlled combatant or streaming
//! events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{EntityId, HumanInput};

use super::errors::{Result, RuntimeError};
use super::snapshot::{ArenaSnapshot, StepReport};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Runs `ticks` ticks and reports what they produced.
    pub async fn step(&self, ticks: u64) -> Result<StepReport> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Step {
            ticks,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Sets the input of the human-controlled combatant. Returns false when
    /// nobody is under human control.
    pub async fn set_input(&self, input: HumanInput) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::SetInput {
            input,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Hands human control to friendly combatant `to`.
    pub async fn switch_character(&self, to: EntityId) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::SwitchCharacter {
            to,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Reports an overlap found outside the arena; it is resolved on the
    /// next tick.
    pub async fn notify_overlap(&self, a: EntityId, b: EntityId) -> Result<()> {
        self.send(Command::NotifyOverlap { a, b }).await
    }

    /// Starts or stops ticking on the wall clock.
    pub async fn set_realtime(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetRealtime { enabled }).await
    }

    /// Query the current arena state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<ArenaSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::QuerySnapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut combat = handle.subscribe(Topic::Combat);
    /// while let Ok(event) = combat.recv().await {
    ///     // damage, deaths and healing only
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
