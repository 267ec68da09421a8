//! Simulation worker that owns the authoritative [`game_core::Arena`].
//!
//! Receives commands from [`crate::RuntimeHandle`], advances the arena and
//! publishes every resulting event to the [`EventBus`].

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use game_core::{Arena, EntityId, GameError, GameEvent, HumanInput, Millis};

use crate::api::{ArenaSnapshot, Result, StepReport};
use crate::events::{Event, EventBus, TickEvent};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Run `ticks` ticks back to back.
    Step {
        ticks: u64,
        reply: oneshot::Sender<StepReport>,
    },
    /// Replace the input of the human-controlled combatant. Replies false
    /// when nobody is under human control.
    SetInput {
        input: HumanInput,
        reply: oneshot::Sender<bool>,
    },
    SwitchCharacter {
        to: EntityId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Overlap reported by an outside collision system.
    NotifyOverlap { a: EntityId, b: EntityId },
    /// Start or stop ticking on the wall clock.
    SetRealtime { enabled: bool },
    QuerySnapshot {
        reply: oneshot::Sender<ArenaSnapshot>,
    },
}

/// Background task that processes simulation commands.
pub struct SimulationWorker {
    arena: Arena,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    tick_ms: Millis,
    tick: u64,
    realtime: bool,
}

impl SimulationWorker {
    pub fn new(
        arena: Arena,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        tick_ms: Millis,
        realtime: bool,
    ) -> Self {
        info!(
            target: "runtime::worker",
            combatants = arena.world().combatant_ids().len(),
            tick_ms,
            realtime,
            "SimulationWorker initialized"
        );

        Self {
            arena,
            command_rx,
            event_bus,
            tick_ms,
            tick: 0,
            realtime,
        }
    }

    /// Main worker loop. Ends once every command sender is dropped.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(Duration::from_millis(self.tick_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = ticker.tick(), if self.realtime => {
                    self.advance(1);
                }
            }
        }

        info!(target: "runtime::worker", ticks = self.tick, "SimulationWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Step { ticks, reply } => {
                let report = self.advance(ticks);
                if reply.send(report).is_err() {
                    debug!(target: "runtime::worker", "Step reply channel closed (caller dropped)");
                }
            }
            Command::SetInput { input, reply } => {
                let routed = self.arena.set_input(input);
                if reply.send(routed).is_err() {
                    debug!(target: "runtime::worker", "SetInput reply channel closed (caller dropped)");
                }
            }
            Command::SwitchCharacter { to, reply } => {
                let result = match self.arena.switch_character(to) {
                    Ok(event) => {
                        self.publish(event);
                        Ok(())
                    }
                    Err(error) => {
                        let code = error.error_code();
                        if error.severity().is_recoverable() {
                            debug!(target: "runtime::worker", %to, code, %error, "switch rejected");
                        } else {
                            warn!(target: "runtime::worker", %to, code, %error, "switch failed");
                        }
                        Err(error.into())
                    }
                };
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "SwitchCharacter reply channel closed (caller dropped)");
                }
            }
            Command::NotifyOverlap { a, b } => self.arena.notify_overlap(a, b),
            Command::SetRealtime { enabled } => {
                info!(target: "runtime::worker", enabled, "realtime ticking toggled");
                self.realtime = enabled;
            }
            Command::QuerySnapshot { reply } => {
                let snapshot = ArenaSnapshot::capture(&self.arena, self.tick);
                if reply.send(snapshot).is_err() {
                    debug!(target: "runtime::worker", "QuerySnapshot reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn advance(&mut self, ticks: u64) -> StepReport {
        let mut report = StepReport::default();
        for _ in 0..ticks {
            let events = self.arena.step(self.tick_ms);
            self.tick += 1;

            report.ticks += 1;
            report.events += events.len();
            report.kills += events
                .iter()
                .filter(|event| matches!(event, GameEvent::Killed { .. }))
                .count();

            let count = events.len();
            for event in events {
                self.log(&event);
                self.publish(event);
            }
            self.event_bus.publish(Event::Tick(TickEvent {
                tick: self.tick,
                now: self.arena.now(),
                events: count,
            }));
        }
        report.now = self.arena.now();
        report
    }

    fn publish(&self, event: GameEvent) {
        self.event_bus.publish(Event::Game {
            tick: self.tick,
            event,
        });
    }

    fn log(&self, event: &GameEvent) {
        match event {
            GameEvent::Killed { target, source } => {
                info!(target: "runtime::worker", tick = self.tick, victim = %target, killer = %source, "combatant killed");
            }
            GameEvent::ControlSwitched { from, to } => {
                info!(target: "runtime::worker", tick = self.tick, ?from, %to, "control switched");
            }
            GameEvent::PathNotFound { entity } => {
                debug!(target: "runtime::worker", tick = self.tick, %entity, "no flee path");
            }
            GameEvent::Feedback(_) => {}
            other => {
                debug!(target: "runtime::worker", tick = self.tick, event = ?other, "arena event");
            }
        }
    }
}
