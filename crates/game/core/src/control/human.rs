use crate::clock::TimerEvent;
use crate::geometry::{Vec2, angle_of_normalized};

use super::{Decision, TickContext};

/// Input sampled from the player this tick.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HumanInput {
    /// Desired movement direction; any length, zero to stand still.
    pub direction: Vec2,
    /// World point the player aims at.
    pub aim: Option<Vec2>,
    /// Trigger held.
    pub fire: bool,
    /// Dash requested.
    pub dash: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DashState {
    #[default]
    Ready,
    Dashing {
        direction: Vec2,
    },
    CoolingDown,
}

/// Player-driven control with a dash.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HumanControl {
    input: HumanInput,
    dash: DashState,
}

impl HumanControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, input: HumanInput) {
        self.input = input;
    }

    pub fn input(&self) -> &HumanInput {
        &self.input
    }

    pub fn dash_state(&self) -> DashState {
        self.dash
    }

    pub(crate) fn end_dash(&mut self) {
        if let DashState::Dashing { .. } = self.dash {
            self.dash = DashState::CoolingDown;
        }
    }

    pub(crate) fn dash_ready(&mut self) {
        if self.dash == DashState::CoolingDown {
            self.dash = DashState::Ready;
        }
    }

    pub fn decide(&mut self, ctx: &mut TickContext<'_>) -> Decision {
        let me = ctx.me;
        let tuning = &ctx.config.human;

        if self.input.dash && self.dash == DashState::Ready {
            let mut direction = self.input.direction.normalize_or_zero();
            if direction.is_zero() {
                direction = Vec2::new(me.facing.sign(), 0.0);
            }
            self.dash = DashState::Dashing { direction };
            ctx.timers
                .schedule(tuning.dash_ms, TimerEvent::DashEnded(me.id()));
            ctx.timers
                .schedule(tuning.dash_cooldown_ms, TimerEvent::DashReady(me.id()));
        }
        self.input.dash = false;

        let velocity = match self.dash {
            DashState::Dashing { direction } => direction * tuning.dash_speed,
            DashState::Ready | DashState::CoolingDown => {
                self.input.direction.with_length(ctx.speed())
            }
        };

        let fire = match self.input.aim {
            Some(aim) if self.input.fire && ctx.weapon_ready() => {
                Some(angle_of_normalized(me.position, aim))
            }
            _ => None,
        };

        Decision {
            velocity: Some(velocity),
            fire,
            ..Decision::default()
        }
    }
}
