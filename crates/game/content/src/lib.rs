//! Data-driven arena content.
//!
//! Scenarios (map grid, cover anchors, combatants and their weapons, potions,
//! spikes) are written in RON and the tuning tables in TOML. The loaders turn
//! them into `game-core` values; nothing here runs during a tick.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CombatantEntry, ConfigLoader, ContentFactory, LoadResult, PotionEntry, Roster, ScenarioLoader,
    ScenarioSpec, SpikeEntry,
};
