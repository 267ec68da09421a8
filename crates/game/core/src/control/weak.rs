//! Weak AI: random wandering and inaccurate shots.

use core::cmp::Ordering;

use crate::clock::TimerEvent;
use crate::geometry::{Vec2, distance};

use super::{Decision, TickContext, aim};

/// Wanders in random directions and takes inaccurate shots at the farthest
/// opponent in range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeakAi {
    heading: Option<f64>,
    waiting: bool,
}

impl WeakAi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    /// The wander interval elapsed; pick a new heading next tick.
    pub(crate) fn wander_ready(&mut self) {
        self.waiting = false;
    }

    pub fn decide(&mut self, ctx: &mut TickContext<'_>) -> Decision {
        if !self.waiting {
            self.heading = Some(ctx.rng.heading());
            self.waiting = true;
            ctx.timers.schedule(
                ctx.config.ai.wander_interval_ms,
                TimerEvent::WanderReady(ctx.me.id()),
            );
        }

        Decision {
            velocity: self
                .heading
                .map(|heading| Vec2::from_angle(heading) * ctx.speed()),
            fire: pick_shot(ctx),
            ..Decision::default()
        }
    }
}

/// Farthest opponent within weapon range, or a random direction when none is.
fn pick_shot(ctx: &mut TickContext<'_>) -> Option<f64> {
    let weapon = ctx.me.generator().filter(|weapon| weapon.is_ready())?;
    let origin = ctx.me.position;

    let target = ctx
        .world
        .opponents_of(ctx.me.team())
        .into_iter()
        .map(|opponent| opponent.position)
        .filter(|position| weapon.spec().reaches(distance(origin, *position)))
        .max_by(|a, b| {
            distance(origin, *a)
                .partial_cmp(&distance(origin, *b))
                .unwrap_or(Ordering::Equal)
        });

    Some(match target {
        Some(target) => aim(origin, target, ctx.config.ai.weak_inaccuracy, ctx.rng),
        None => ctx.rng.heading(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Scheduler;
    use crate::combat::CombatantSpec;
    use crate::config::GameConfig;
    use crate::entity::{EntityId, Team};
    use crate::geometry::{angle_of_normalized, angular_distance};
    use crate::pathing::{DeferredPathfinder, TileGrid};
    use crate::projectile::WeaponSpec;
    use crate::rng::SimRng;
    use crate::world::{World, WorldQuery};

    struct Harness {
        world: World,
        timers: Scheduler,
        rng: SimRng,
        config: GameConfig,
    }

    impl Harness {
        fn decide(&mut self, ai: &mut WeakAi, me: EntityId) -> Decision {
            let mut paths = DeferredPathfinder::new();
            let mut ctx = TickContext {
                me: self.world.combatant(me).unwrap(),
                world: &self.world,
                now: 0,
                timers: &mut self.timers,
                rng: &mut self.rng,
                paths: &mut paths,
                config: &self.config,
            };
            ai.decide(&mut ctx)
        }
    }

    fn harness() -> (Harness, EntityId) {
        let mut world = World::new(TileGrid::open(40, 40, 16.0));
        let me = world.spawn_combatant(&CombatantSpec {
            position: Vec2::new(320.0, 320.0),
            ..CombatantSpec::default()
        });
        let harness = Harness {
            world,
            timers: Scheduler::new(),
            rng: SimRng::new(3),
            config: GameConfig::default(),
        };
        (harness, me)
    }

    #[test]
    fn wander_heading_changes_only_when_ready() {
        let (mut h, me) = harness();
        let mut ai = WeakAi::new();
        let first = h.decide(&mut ai, me).velocity.unwrap();
        assert!((first.length() - 64.0).abs() < 1e-9);
        assert_eq!(h.decide(&mut ai, me).velocity, Some(first));

        let due = h.timers.drain_due(h.config.ai.wander_interval_ms);
        assert_eq!(due, vec![TimerEvent::WanderReady(me)]);
        ai.wander_ready();
        h.decide(&mut ai, me);
        assert_eq!(h.timers.pending(), 1, "a new wander timer is armed");
    }

    #[test]
    fn shoots_at_the_farthest_opponent_in_range() {
        let (mut h, me) = harness();
        h.world.equip(me, &WeaponSpec::default()).unwrap();
        let near = Vec2::new(360.0, 320.0);
        let far = Vec2::new(320.0, 440.0);
        let out_of_range = Vec2::new(0.0, 0.0);
        for position in [near, far, out_of_range] {
            h.world.spawn_combatant(&CombatantSpec {
                team: Team::Friendly,
                position,
                ..CombatantSpec::default()
            });
        }

        let mut ai = WeakAi::new();
        let heading = h.decide(&mut ai, me).fire.unwrap();
        let origin = Vec2::new(320.0, 320.0);
        let inaccuracy = h.config.ai.weak_inaccuracy;
        assert!(angular_distance(heading, angle_of_normalized(origin, far)) <= inaccuracy);
    }

    #[test]
    fn no_weapon_no_shot() {
        let (mut h, me) = harness();
        let mut ai = WeakAi::new();
        assert_eq!(h.decide(&mut ai, me).fire, None);
    }

    #[test]
    fn fires_randomly_without_targets() {
        let (mut h, me) = harness();
        h.world.equip(me, &WeaponSpec::default()).unwrap();
        let mut ai = WeakAi::new();
        let heading = h.decide(&mut ai, me).fire.unwrap();
        assert!((0.0..core::f64::consts::TAU).contains(&heading));
    }
}
