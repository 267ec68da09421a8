//! Topic-based event bus for runtime events.
//!
//! Every [`game_core::GameEvent`] leaving the worker is wrapped in an
//! [`Event`] and published to the topic it belongs to, so consumers can
//! subscribe only to the streams they need.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::{Event, TickEvent};
