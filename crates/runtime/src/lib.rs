//! Runtime orchestration for the arena simulation.
//!
//! This crate runs a [`game_core::Arena`] on a tokio task, feeds it commands
//! through [`RuntimeHandle`] and fans its events out on a topic-based
//! [`EventBus`]. Flee paths can be searched off the simulation task with
//! [`AsyncPathService`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`pathing`] provides the tokio-backed path service
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod pathing;
pub mod runtime;

mod workers;

pub use api::{ArenaSnapshot, CombatantSnapshot, Result, RuntimeError, RuntimeHandle, StepReport};
pub use events::{Event, EventBus, TickEvent, Topic};
pub use pathing::AsyncPathService;
pub use runtime::{PathfindingMode, Runtime, RuntimeBuilder, RuntimeConfig};
