//! Deterministic combat rules and enemy AI for a top-down arena.
//!
//! `game-core` owns the canonical rules: the combat/health state machine,
//! projectile weapons, field and hazard effects, the collision-avoidance
//! planner and the control policies that drive every combatant. It performs
//! no I/O and keeps no wall clock; time only moves when [`Arena::step`] is
//! called, and everything observable leaves the crate as a [`GameEvent`].
pub mod arena;
pub mod clock;
pub mod collision;
pub mod combat;
pub mod config;
pub mod control;
pub mod entity;
pub mod error;
pub mod event;
pub mod field;
pub mod geometry;
pub mod hazard;
pub mod interval;
pub mod item;
pub mod pathing;
pub mod projectile;
pub mod rng;
pub mod threat;
pub mod world;

pub use arena::Arena;
pub use clock::{Millis, Scheduler, TimerEvent, TimerHandle};
pub use combat::{
    Combatant, CombatantSpec, EffectFlags, HealOutcome, Health, Hit, HitOutcome, IgnoreReason,
    LifeState,
};
pub use config::{
    AiTuning, CombatTuning, ConfigError, GameConfig, HumanTuning, SlowPolicy, StatusTuning,
    WorldTuning,
};
pub use control::{
    ControlKind, ControlPolicy, Decision, HumanControl, HumanInput, StrongAi, TickContext, WeakAi,
};
pub use entity::{EntityId, EntityKind, Facing, Team};
pub use error::{ErrorSeverity, GameError};
pub use event::{Animation, ExpireReason, Feedback, GameEvent, Sound, Tint};
pub use field::Field;
pub use geometry::{Hitbox, Rect, Vec2};
pub use hazard::Spike;
pub use interval::AngularInterval;
pub use item::Potion;
pub use pathing::{DeferredPathfinder, GridError, PathPoll, PathService, PathTicket, Tile, TileGrid};
pub use projectile::{
    FieldSpec, Fired, Projectile, ProjectileBehavior, ProjectileGenerator, WeaponSpec,
};
pub use rng::SimRng;
pub use threat::{Threat, ThreatPlanner};
pub use world::{World, WorldError, WorldQuery};
