//! Types downstream clients interact with.

mod errors;
mod handle;
mod snapshot;

pub use errors::{Result, RuntimeError};
pub use handle::RuntimeHandle;
pub use snapshot::{ArenaSnapshot, CombatantSnapshot, StepReport};
