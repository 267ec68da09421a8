//! Tunable parameters of the combat rules and AI policies.
//!
//! Every number the rules depend on lives here with its default. Loaders fill
//! a [`GameConfig`] from TOML; any table or key left out keeps its default.

use core::f64::consts::PI;

use crate::clock::Millis;
use crate::entity::EntityId;
use crate::error::{ErrorSeverity, GameError};

/// Root configuration, grouped by concern.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GameConfig {
    pub combat: CombatTuning,
    pub status: StatusTuning,
    pub ai: AiTuning,
    pub human: HumanTuning,
    pub world: WorldTuning,
}

impl GameConfig {
    // ===== fixed rules =====
    /// Smallest legal maximum health (one heart).
    pub const MIN_MAX_HEALTH: u32 = 2;
    /// Largest legal maximum health (ten hearts).
    pub const MAX_MAX_HEALTH: u32 = 20;
    /// Health points per displayed heart.
    pub const HEALTH_PER_HEART: u32 = 2;
    pub const MAX_MOVEMENT_SPEED: f64 = 255.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects combinations the rules cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.status.poison_tick_ms == 0 {
            return Err(ConfigError::InvalidTuning {
                key: "status.poison_tick_ms",
                reason: "must be positive",
            });
        }
        if !(self.status.slow_factor > 0.0 && self.status.slow_factor <= 1.0) {
            return Err(ConfigError::InvalidTuning {
                key: "status.slow_factor",
                reason: "must be in (0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.ai.critical_health_ratio) {
            return Err(ConfigError::InvalidTuning {
                key: "ai.critical_health_ratio",
                reason: "must be in [0, 1]",
            });
        }
        if !(self.ai.tolerance_factor >= 0.0) || !(self.ai.perception_radius >= 0.0) {
            return Err(ConfigError::InvalidTuning {
                key: "ai.tolerance_factor",
                reason: "perception radius and tolerance factor must be non-negative",
            });
        }
        if self.world.spike_frame_ms == 0 {
            return Err(ConfigError::InvalidTuning {
                key: "world.spike_frame_ms",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

/// Hit reaction timings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CombatTuning {
    /// Window after a successful hit during which further hits are ignored.
    pub invulnerability_ms: Millis,
    /// Movement is disabled for this long after a hit.
    pub hit_stun_ms: Millis,
    /// A source that landed a hit is ignored by the same target this long.
    pub recent_source_ms: Millis,
    /// Speed of the knockback applied by bouncing hits.
    pub knockback_speed: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            invulnerability_ms: 300,
            hit_stun_ms: 200,
            recent_source_ms: 300,
            knockback_speed: 96.0,
        }
    }
}

/// How overlapping slow effects combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum SlowPolicy {
    /// Every active slow multiplies the speed by the slow factor; each one
    /// expires on its own.
    #[default]
    Stack,
    /// At most one slow is active; a new one restarts the timer.
    Refresh,
}

/// Field status effects.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StatusTuning {
    /// Interval between poison damage ticks.
    pub poison_tick_ms: Millis,
    /// Effect duration, also the per-combatant field contact cooldown.
    pub field_effect_ms: Millis,
    pub slow_factor: f64,
    pub slow_policy: SlowPolicy,
}

impl Default for StatusTuning {
    fn default() -> Self {
        Self {
            poison_tick_ms: 1000,
            field_effect_ms: 3000,
            slow_factor: 0.5,
            slow_policy: SlowPolicy::Stack,
        }
    }
}

/// AI policy parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AiTuning {
    /// Weak AI picks a new wander heading this often.
    pub wander_interval_ms: Millis,
    /// Half-width of the weak AI aim error, radians.
    pub weak_inaccuracy: f64,
    /// Half-width of the strong AI aim error, radians.
    pub strong_inaccuracy: f64,
    /// Below this fraction of max health the strong AI seeks healing.
    pub critical_health_ratio: f64,
    /// Hostile projectiles farther than this are ignored by the planner.
    pub perception_radius: f64,
    /// Multiplier on the projectile radius when widening forbidden headings.
    pub tolerance_factor: f64,
    /// Half-angle of the cone behind a cover anchor where flee targets land.
    pub cover_cone_half_angle: f64,
    /// Minimum and maximum distance behind the anchor of a flee target.
    pub cover_offset_min: f64,
    pub cover_offset_max: f64,
    /// Anchors farther than this from the combatant are not considered.
    /// `None` considers every anchor.
    pub max_cover_distance: Option<f64>,
    /// A waypoint counts as reached within this distance.
    pub waypoint_tolerance: f64,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            wander_interval_ms: 2000,
            weak_inaccuracy: PI / 8.0,
            strong_inaccuracy: PI / 4.0,
            critical_health_ratio: 0.5,
            perception_radius: 16.0 * 8.0,
            tolerance_factor: 4.0,
            cover_cone_half_angle: PI / 6.0,
            cover_offset_min: 16.0,
            cover_offset_max: 48.0,
            max_cover_distance: None,
            waypoint_tolerance: 2.0,
        }
    }
}

/// Human control extras.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HumanTuning {
    pub dash_ms: Millis,
    pub dash_speed: f64,
    pub dash_cooldown_ms: Millis,
}

impl Default for HumanTuning {
    fn default() -> Self {
        Self {
            dash_ms: 300,
            dash_speed: 150.0,
            dash_cooldown_ms: 3000,
        }
    }
}

/// Hazards and projectile motion.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct WorldTuning {
    /// Duration of one spike animation frame (4 fps).
    pub spike_frame_ms: Millis,
    /// Maximum turn of a tracking projectile per tick, radians.
    pub tracking_turn_rate: f64,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            spike_frame_ms: 250,
            tracking_turn_rate: PI / 240.0,
        }
    }
}

/// Invalid configuration detected at construction time.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("generator owned by {owner} cannot be attached to {combatant}")]
    ForeignGenerator {
        owner: EntityId,
        combatant: EntityId,
    },

    #[error("invalid tuning `{key}`: {reason}")]
    InvalidTuning {
        key: &'static str,
        reason: &'static str,
    },
}

impl GameError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ForeignGenerator { .. } => "CONFIG_FOREIGN_GENERATOR",
            Self::InvalidTuning { .. } => "CONFIG_INVALID_TUNING",
        }
    }
}
