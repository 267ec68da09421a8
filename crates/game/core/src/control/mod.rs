//! Control policies: who decides what a combatant does each tick.
//!
//! Every policy reads the world through [`WorldQuery`] and returns a
//! [`Decision`]; the arena applies all decisions after every combatant has
//! decided, so decisions never observe each other.

mod human;
mod strong;
mod weak;

pub use human::{DashState, HumanControl, HumanInput};
pub use strong::{Blackboard, FleeState, Seen, StrongAi};
pub use weak::WeakAi;

use crate::clock::{Millis, Scheduler};
use crate::combat::Combatant;
use crate::config::GameConfig;
use crate::event::Feedback;
use crate::geometry::{Vec2, angle_of, normalize_angle};
use crate::pathing::PathService;
use crate::rng::SimRng;
use crate::world::WorldQuery;

/// Selects a policy in scenario files.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ControlKind {
    Human,
    WeakAi,
    StrongAi,
    #[default]
    None,
}

#[derive(Debug)]
pub enum ControlPolicy {
    Human(HumanControl),
    WeakAi(WeakAi),
    StrongAi(StrongAi),
    /// Never decides anything.
    None,
}

impl ControlPolicy {
    pub fn from_kind(kind: ControlKind) -> Self {
        match kind {
            ControlKind::Human => Self::Human(HumanControl::new()),
            ControlKind::WeakAi => Self::WeakAi(WeakAi::new()),
            ControlKind::StrongAi => Self::StrongAi(StrongAi::new()),
            ControlKind::None => Self::None,
        }
    }

    pub fn kind(&self) -> ControlKind {
        match self {
            Self::Human(_) => ControlKind::Human,
            Self::WeakAi(_) => ControlKind::WeakAi,
            Self::StrongAi(_) => ControlKind::StrongAi,
            Self::None => ControlKind::None,
        }
    }

    /// Decides for `ctx.me`. Dead combatants never decide.
    pub fn decide(&mut self, ctx: &mut TickContext<'_>) -> Decision {
        if !ctx.me.is_alive() {
            return Decision::default();
        }
        match self {
            Self::Human(human) => human.decide(ctx),
            Self::WeakAi(weak) => weak.decide(ctx),
            Self::StrongAi(strong) => strong.decide(ctx),
            Self::None => Decision::default(),
        }
    }
}

/// Outcome of one policy tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decision {
    /// New velocity; `None` keeps the current one.
    pub velocity: Option<Vec2>,
    /// Heading to fire along.
    pub fire: Option<f64>,
    pub feedback: Vec<Feedback>,
    /// A requested flee path turned out not to exist.
    pub path_not_found: bool,
}

impl Decision {
    pub fn is_idle(&self) -> bool {
        self.velocity.is_none() && self.fire.is_none() && self.feedback.is_empty()
    }
}

/// Everything a policy may use while deciding.
pub struct TickContext<'a> {
    pub me: &'a Combatant,
    pub world: &'a dyn WorldQuery,
    pub now: Millis,
    pub timers: &'a mut Scheduler,
    pub rng: &'a mut SimRng,
    pub paths: &'a mut dyn PathService,
    pub config: &'a GameConfig,
}

impl TickContext<'_> {
    /// Current movement speed of the deciding combatant.
    pub fn speed(&self) -> f64 {
        self.me.movement_speed(self.config.status.slow_factor)
    }

    pub fn weapon_ready(&self) -> bool {
        self.me.generator().is_some_and(|weapon| weapon.is_ready())
    }
}

/// Heading from `from` to `target` with a uniform error of up to
/// `inaccuracy` either way.
pub(crate) fn aim(from: Vec2, target: Vec2, inaccuracy: f64, rng: &mut SimRng) -> f64 {
    normalize_angle(angle_of(from, target) + rng.spread(inaccuracy))
}
