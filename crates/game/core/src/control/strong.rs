//! Strong AI: a behavior tree over a per-tick perception snapshot.
//!
//! ```text
//! selector
//! ├── sequence: stunned? → hold
//! └── sequence
//!     ├── always succeed: selector
//!     │   ├── sequence: path in flight or being walked? → flee to cover
//!     │   ├── sequence: critical and potion known? → seek heal
//!     │   ├── sequence: ranged? → flee to cover
//!     │   └── pursue weakest
//!     └── always succeed: sequence: weapon ready? → fire at nearest
//! ```

use core::cmp::Ordering;
use core::fmt;

use behavior_tree::{Behavior, Status, action, always_succeed, condition, selector, sequence};

use crate::config::AiTuning;
use crate::entity::{EntityId, Team};
use crate::event::{Animation, Feedback};
use crate::geometry::{Hitbox, Vec2, angle_of_normalized, distance};
use crate::pathing::{MovePlan, PathPoll, PathTicket};
use crate::rng::SimRng;
use crate::threat::{Threat, ThreatPlanner};

use super::{Decision, TickContext, aim};

/// An opponent as perceived this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Seen {
    pub id: EntityId,
    pub position: Vec2,
    pub health: u32,
}

/// Progress of a flee to cover.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FleeState {
    #[default]
    Idle,
    /// A path was requested and has not arrived yet.
    Awaiting(PathTicket),
    Moving(MovePlan),
}

impl FleeState {
    pub fn is_idle(&self) -> bool {
        matches!(self, FleeState::Idle)
    }
}

/// Working memory of one strong AI tick.
///
/// Perception is copied in before the tree runs so the tree never holds a
/// borrow of the world. Nodes write their results into `out`.
#[derive(Debug)]
pub struct Blackboard {
    pub me: EntityId,
    pub team: Team,
    pub position: Vec2,
    pub hitbox: Hitbox,
    pub speed: f64,
    pub stunned: bool,
    pub critical: bool,
    pub ranged: bool,
    pub weapon_ready: bool,
    pub opponents: Vec<Seen>,
    pub potions: Vec<Vec2>,
    pub threats: Vec<Threat>,
    pub anchors: Vec<Vec2>,
    pub tuning: AiTuning,
    pub rng: SimRng,
    pub flee: FleeState,
    /// Flee destination the policy should request a path to.
    pub path_request: Option<Vec2>,
    pub out: Decision,
}

impl Blackboard {
    fn perceive(ctx: &mut TickContext<'_>, flee: FleeState) -> Self {
        let me = ctx.me;
        let tuning = ctx.config.ai.clone();
        Self {
            me: me.id(),
            team: me.team(),
            position: me.position,
            hitbox: me.hitbox(),
            speed: ctx.speed(),
            stunned: me.is_stunned(),
            critical: me.health_ratio() < tuning.critical_health_ratio,
            ranged: me.has_ranged_attack(),
            weapon_ready: ctx.weapon_ready(),
            opponents: ctx
                .world
                .opponents_of(me.team())
                .into_iter()
                .map(|opponent| Seen {
                    id: opponent.id(),
                    position: opponent.position,
                    health: opponent.health(),
                })
                .collect(),
            potions: ctx
                .world
                .potions_for(me.team())
                .into_iter()
                .map(|potion| potion.position)
                .collect(),
            threats: ctx.world.threats_to(me.team()),
            anchors: ctx.world.cover_anchors().to_vec(),
            tuning,
            rng: SimRng::new(u64::from(ctx.rng.next_u32())),
            flee,
            path_request: None,
            out: Decision::default(),
        }
    }

    fn planner(&self) -> ThreatPlanner {
        ThreatPlanner::from_tuning(&self.tuning)
    }

    /// Walks along `desired`, bent around perceived projectiles.
    fn walk_toward(&mut self, target: Vec2) {
        let desired = angle_of_normalized(self.position, target);
        let heading = self
            .planner()
            .steer(self.position, self.hitbox, desired, &self.threats);
        self.out.velocity = Some(Vec2::from_angle(heading) * self.speed);
    }

    fn nearest(&self, points: impl Iterator<Item = Vec2>) -> Option<Vec2> {
        let from = self.position;
        points.min_by(|a, b| {
            distance(from, *a)
                .partial_cmp(&distance(from, *b))
                .unwrap_or(Ordering::Equal)
        })
    }

    fn nearest_opponent(&self) -> Option<Vec2> {
        self.nearest(self.opponents.iter().map(|seen| seen.position))
    }

    /// Cover anchor farthest, in summed distance, from every opponent.
    fn best_cover(&self) -> Option<Vec2> {
        let reachable = |anchor: &Vec2| {
            self.tuning
                .max_cover_distance
                .is_none_or(|limit| distance(self.position, *anchor) <= limit)
        };
        let score = |anchor: Vec2| -> f64 {
            self.opponents
                .iter()
                .map(|seen| distance(anchor, seen.position))
                .sum()
        };
        self.anchors
            .iter()
            .copied()
            .filter(reachable)
            .max_by(|a, b| score(*a).partial_cmp(&score(*b)).unwrap_or(Ordering::Equal))
    }

    fn animate(&mut self, animation: Animation) {
        self.out.feedback.push(Feedback::Animation {
            entity: self.me,
            animation,
        });
    }
}

fn is_stunned(bb: &Blackboard) -> bool {
    bb.stunned
}

fn hold(_: &mut Blackboard) -> Status {
    Status::Success
}

fn needs_healing(bb: &Blackboard) -> bool {
    bb.critical && !bb.potions.is_empty()
}

fn seek_heal(bb: &mut Blackboard) -> Status {
    let Some(potion) = bb.nearest(bb.potions.iter().copied()) else {
        return Status::Failure;
    };
    bb.walk_toward(potion);
    Status::Success
}

/// A flee runs to completion once its path is requested.
fn is_fleeing(bb: &Blackboard) -> bool {
    !bb.flee.is_idle()
}

fn is_ranged(bb: &Blackboard) -> bool {
    bb.ranged
}

fn flee_to_cover(bb: &mut Blackboard) -> Status {
    let tolerance = bb.tuning.waypoint_tolerance;
    let position = bb.position;
    let step = match &mut bb.flee {
        FleeState::Awaiting(_) => return Status::Running,
        FleeState::Moving(plan) => Some(plan.next_waypoint(position, tolerance)),
        FleeState::Idle => None,
    };

    match step {
        Some(Some(waypoint)) => {
            bb.out.velocity = Some((waypoint - position).with_length(bb.speed));
            Status::Running
        }
        Some(None) => {
            bb.flee = FleeState::Idle;
            bb.out.velocity = Some(Vec2::ZERO);
            bb.animate(Animation::Idle);
            Status::Success
        }
        None => {
            let (Some(anchor), Some(threat)) = (bb.best_cover(), bb.nearest_opponent()) else {
                return Status::Failure;
            };
            // a point in the cone behind the anchor, seen from the opponent
            let away = angle_of_normalized(threat, anchor);
            let heading = away + bb.rng.spread(bb.tuning.cover_cone_half_angle);
            let offset = bb
                .rng
                .range_f64(bb.tuning.cover_offset_min, bb.tuning.cover_offset_max);
            bb.path_request = Some(anchor + Vec2::from_angle(heading) * offset);
            Status::Running
        }
    }
}

fn pursue_weakest(bb: &mut Blackboard) -> Status {
    let weakest = bb
        .opponents
        .iter()
        .min_by_key(|seen| (seen.health, seen.id))
        .map(|seen| seen.position);
    match weakest {
        Some(target) => {
            bb.walk_toward(target);
            Status::Success
        }
        None => {
            bb.out.velocity = Some(Vec2::ZERO);
            Status::Failure
        }
    }
}

fn can_fire(bb: &Blackboard) -> bool {
    bb.ranged && bb.weapon_ready && !bb.opponents.is_empty()
}

fn fire_at_nearest(bb: &mut Blackboard) -> Status {
    let Some(target) = bb.nearest_opponent() else {
        return Status::Failure;
    };
    let inaccuracy = bb.tuning.strong_inaccuracy;
    bb.out.fire = Some(aim(bb.position, target, inaccuracy, &mut bb.rng));
    Status::Success
}

fn build_tree() -> Box<dyn Behavior<Blackboard>> {
    selector(vec![
        sequence(vec![condition(is_stunned), action(hold)]),
        sequence(vec![
            always_succeed(selector(vec![
                sequence(vec![condition(is_fleeing), action(flee_to_cover)]),
                sequence(vec![condition(needs_healing), action(seek_heal)]),
                sequence(vec![condition(is_ranged), action(flee_to_cover)]),
                action(pursue_weakest),
            ])),
            always_succeed(sequence(vec![condition(can_fire), action(fire_at_nearest)])),
        ]),
    ])
}

/// Healing-aware, cover-seeking AI.
pub struct StrongAi {
    tree: Box<dyn Behavior<Blackboard>>,
    flee: FleeState,
}

impl fmt::Debug for StrongAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrongAi")
            .field("flee", &self.flee)
            .finish_non_exhaustive()
    }
}

impl Default for StrongAi {
    fn default() -> Self {
        Self::new()
    }
}

impl StrongAi {
    pub fn new() -> Self {
        Self {
            tree: build_tree(),
            flee: FleeState::Idle,
        }
    }

    pub fn flee_state(&self) -> &FleeState {
        &self.flee
    }

    pub fn decide(&mut self, ctx: &mut TickContext<'_>) -> Decision {
        let mut bb = Blackboard::perceive(ctx, std::mem::take(&mut self.flee));
        let mut arrived = Vec::new();

        if let FleeState::Awaiting(ticket) = bb.flee {
            match ctx.paths.poll(ticket) {
                PathPoll::Pending => {}
                PathPoll::Ready(Some(tiles)) => {
                    bb.flee = FleeState::Moving(MovePlan::from_tiles(ctx.world.grid(), &tiles));
                    arrived.push(Feedback::Animation {
                        entity: bb.me,
                        animation: Animation::Run,
                    });
                }
                PathPoll::Ready(None) => {
                    bb.flee = FleeState::Idle;
                    bb.out.path_not_found = true;
                }
                PathPoll::Unknown => bb.flee = FleeState::Idle,
            }
        }

        self.tree.tick(&mut bb);

        if let Some(goal) = bb.path_request.take() {
            let grid = ctx.world.grid();
            let goal = grid.bounds().clamp_point(goal);
            match (grid.tile_at(bb.position), grid.tile_at(goal)) {
                (Some(from), Some(to)) => {
                    bb.flee = FleeState::Awaiting(ctx.paths.request(bb.me, from, to));
                }
                _ => bb.out.path_not_found = true,
            }
        }

        self.flee = bb.flee;
        let mut decision = bb.out;
        arrived.append(&mut decision.feedback);
        decision.feedback = arrived;
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Scheduler;
    use crate::combat::{CombatantSpec, Hit};
    use crate::config::GameConfig;
    use crate::geometry::angular_distance;
    use crate::pathing::{DeferredPathfinder, PathService, TileGrid};
    use crate::projectile::WeaponSpec;
    use crate::world::{World, WorldQuery};

    struct Harness {
        world: World,
        timers: Scheduler,
        rng: SimRng,
        paths: DeferredPathfinder,
        config: GameConfig,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                world: World::new(TileGrid::open(20, 20, 16.0)),
                timers: Scheduler::new(),
                rng: SimRng::new(7),
                paths: DeferredPathfinder::new(),
                config: GameConfig::default(),
            }
        }

        fn spawn(&mut self, team: Team, position: Vec2, health: Option<i64>) -> EntityId {
            self.world.spawn_combatant(&CombatantSpec {
                team,
                position,
                max_health: 10.0,
                health,
                ..CombatantSpec::default()
            })
        }

        fn decide(&mut self, ai: &mut StrongAi, me: EntityId) -> Decision {
            let me = self.world.combatant(me).unwrap();
            let mut ctx = TickContext {
                me,
                world: &self.world,
                now: 0,
                timers: &mut self.timers,
                rng: &mut self.rng,
                paths: &mut self.paths,
                config: &self.config,
            };
            ai.decide(&mut ctx)
        }
    }

    #[test]
    fn melee_pursues_the_weakest_opponent() {
        let mut h = Harness::new();
        let me = h.spawn(Team::Hostile, Vec2::new(160.0, 160.0), None);
        h.spawn(Team::Friendly, Vec2::new(260.0, 160.0), Some(8));
        h.spawn(Team::Friendly, Vec2::new(160.0, 60.0), Some(2));

        let mut ai = StrongAi::new();
        let decision = h.decide(&mut ai, me);
        let velocity = decision.velocity.unwrap();
        // straight up the screen toward the 2-health opponent
        assert!(angular_distance(velocity.angle(), 1.5 * core::f64::consts::PI) < 1e-9);
        assert!((velocity.length() - 64.0).abs() < 1e-9);
        assert_eq!(decision.fire, None);
    }

    #[test]
    fn critical_health_seeks_the_nearest_potion() {
        let mut h = Harness::new();
        let me = h.spawn(Team::Hostile, Vec2::new(160.0, 160.0), Some(4));
        h.spawn(Team::Friendly, Vec2::new(260.0, 160.0), None);
        h.world.spawn_potion(Team::Hostile, Vec2::new(60.0, 160.0));
        h.world.spawn_potion(Team::Hostile, Vec2::new(160.0, 300.0));
        // the other team's potion is never a target
        h.world.spawn_potion(Team::Friendly, Vec2::new(150.0, 160.0));

        let mut ai = StrongAi::new();
        let velocity = h.decide(&mut ai, me).velocity.unwrap();
        assert!(angular_distance(velocity.angle(), core::f64::consts::PI) < 1e-9);
    }

    #[test]
    fn stunned_combatants_hold() {
        let mut h = Harness::new();
        let me = h.spawn(Team::Hostile, Vec2::new(160.0, 160.0), None);
        h.spawn(Team::Friendly, Vec2::new(200.0, 160.0), None);
        let tuning = h.config.combat.clone();
        h.world.combatant_mut(me).unwrap().take_hit(
            Hit {
                amount: 1,
                source: EntityId(99),
                source_position: Vec2::new(100.0, 160.0),
                bounce: true,
            },
            &mut h.timers,
            &tuning,
        );

        let mut ai = StrongAi::new();
        assert!(h.decide(&mut ai, me).is_idle());
    }

    #[test]
    fn ranged_flees_to_cover_along_a_path() {
        let mut h = Harness::new();
        let me = h.spawn(Team::Hostile, Vec2::new(40.0, 40.0), None);
        h.world.equip(me, &WeaponSpec::default()).unwrap();
        h.spawn(Team::Friendly, Vec2::new(280.0, 40.0), None);
        h.world.add_cover_anchor(Vec2::new(200.0, 40.0));
        h.world.add_cover_anchor(Vec2::new(80.0, 200.0));

        let mut ai = StrongAi::new();
        let first = h.decide(&mut ai, me);
        assert!(matches!(ai.flee_state(), FleeState::Awaiting(_)));
        assert!(first.fire.is_some(), "fires while fleeing");

        // result only arrives after the service is pumped
        let waiting = h.decide(&mut ai, me);
        assert!(matches!(ai.flee_state(), FleeState::Awaiting(_)));
        assert_eq!(waiting.velocity, None);

        let grid = h.world.grid().clone();
        h.paths.pump(&grid);
        let moving = h.decide(&mut ai, me);
        assert!(matches!(ai.flee_state(), FleeState::Moving(_)));
        assert_eq!(
            moving.feedback.first(),
            Some(&Feedback::Animation {
                entity: me,
                animation: Animation::Run
            })
        );
        let velocity = moving.velocity.unwrap();
        assert!((velocity.length() - 64.0).abs() < 1e-9);
    }

    #[test]
    fn missing_path_is_reported_and_retried() {
        let mut h = Harness::new();
        h.world = World::new(TileGrid::from_rows(&["..#....", "..#....", "..#...."], 16.0).unwrap());
        let me = h.spawn(Team::Hostile, Vec2::new(8.0, 8.0), None);
        h.world.equip(me, &WeaponSpec::default()).unwrap();
        h.spawn(Team::Friendly, Vec2::new(24.0, 40.0), None);
        h.world.add_cover_anchor(Vec2::new(80.0, 24.0));
        h.config.ai.cover_offset_min = 0.0;
        h.config.ai.cover_offset_max = 1.0;

        let mut ai = StrongAi::new();
        h.decide(&mut ai, me);
        let grid = h.world.grid().clone();
        h.paths.pump(&grid);
        let decision = h.decide(&mut ai, me);
        assert!(decision.path_not_found);
        // a fresh request goes out on the same tick
        assert!(matches!(ai.flee_state(), FleeState::Awaiting(_)));
    }

    #[test]
    fn healing_waits_for_the_flee_to_finish() {
        let mut h = Harness::new();
        let me = h.spawn(Team::Hostile, Vec2::new(40.0, 40.0), Some(4));
        h.world.equip(me, &WeaponSpec::default()).unwrap();
        h.spawn(Team::Friendly, Vec2::new(280.0, 40.0), None);
        h.world.add_cover_anchor(Vec2::new(200.0, 40.0));

        let mut ai = StrongAi::new();
        h.decide(&mut ai, me);
        assert_eq!(h.paths.in_flight(), 1);

        let potion = Vec2::new(8.0, 8.0);
        h.world.spawn_potion(Team::Hostile, potion);
        let waiting = h.decide(&mut ai, me);
        assert!(matches!(ai.flee_state(), FleeState::Awaiting(_)));
        assert_eq!(h.paths.in_flight(), 1);
        assert_eq!(waiting.velocity, None);

        let grid = h.world.grid().clone();
        h.paths.pump(&grid);
        let walking = h.decide(&mut ai, me);
        assert!(matches!(ai.flee_state(), FleeState::Moving(_)));
        let heading = walking.velocity.unwrap().angle();
        let toward_potion = angle_of_normalized(Vec2::new(40.0, 40.0), potion);
        assert!(angular_distance(heading, toward_potion) > 1e-6, "keeps walking the path");

        // the last waypoint is reached on this tick, the potion wins the next
        ai.flee = FleeState::Moving(MovePlan::default());
        h.decide(&mut ai, me);
        let healing = h.decide(&mut ai, me);
        assert!(ai.flee_state().is_idle());
        assert!(angular_distance(healing.velocity.unwrap().angle(), toward_potion) < 1e-9);
    }
}
