//! The tick driver.
//!
//! [`Arena::step`] advances the logical clock and runs one tick in fixed
//! phases:
//!
//! 1. fire due timers, each guarded on its target still being around;
//! 2. pump the path service;
//! 3. let every control policy decide against the unchanged world;
//! 4. apply the decisions (velocities, shots, feedback);
//! 5. integrate motion and resolve projectile range and bounds;
//! 6. resolve overlaps;
//! 7. remove the dead.

use std::collections::BTreeSet;

use crate::clock::{Millis, Scheduler, TimerEvent};
use crate::collision::{Resolver, despawn, expire};
use crate::combat::Hit;
use crate::config::{ConfigError, GameConfig};
use crate::control::{ControlPolicy, Decision, HumanControl, HumanInput, TickContext};
use crate::entity::{EntityId, EntityKind, Team};
use crate::event::{ExpireReason, Feedback, GameEvent, Sound};
use crate::field::Field;
use crate::geometry::{Rect, Vec2};
use crate::pathing::{DeferredPathfinder, PathService, TileGrid};
use crate::projectile::{ProjectileBehavior, tracking_target};
use crate::rng::SimRng;
use crate::world::{World, WorldError, WorldQuery};

pub struct Arena {
    world: World,
    timers: Scheduler,
    rng: SimRng,
    paths: Box<dyn PathService + Send>,
    config: GameConfig,
    overlaps: BTreeSet<(EntityId, EntityId)>,
}

impl Arena {
    /// Creates an arena with the in-process path service.
    pub fn new(world: World, config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_path_service(world, config, seed, Box::new(DeferredPathfinder::new()))
    }

    pub fn with_path_service(
        world: World,
        config: GameConfig,
        seed: u64,
        paths: Box<dyn PathService + Send>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world,
            timers: Scheduler::new(),
            rng: SimRng::new(seed),
            paths,
            config,
            overlaps: BTreeSet::new(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Path requests the path service still holds.
    pub fn paths_in_flight(&self) -> usize {
        self.paths.in_flight()
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    /// Reports an overlap found by an external collision system. It is
    /// resolved on the next step together with the overlaps the arena finds
    /// itself.
    pub fn notify_overlap(&mut self, a: EntityId, b: EntityId) {
        if a != b {
            self.overlaps.insert((a.min(b), a.max(b)));
        }
    }

    /// Routes player input to the human-controlled combatant. Returns false
    /// when nobody is under human control.
    pub fn set_input(&mut self, input: HumanInput) -> bool {
        let Some(human) = self.world.human() else {
            return false;
        };
        match self.world.control_mut(human) {
            Some(ControlPolicy::Human(control)) => {
                control.set_input(input);
                true
            }
            _ => false,
        }
    }

    /// Hands human control to friendly combatant `to`. The previous human
    /// reverts to strong AI.
    pub fn switch_character(&mut self, to: EntityId) -> Result<GameEvent, WorldError> {
        let Some(target) = self.world.combatant(to) else {
            return Err(match self.world.kind_of(to) {
                Some(_) => WorldError::NotACombatant(to),
                None => WorldError::UnknownEntity(to),
            });
        };
        if !target.is_alive() || target.team() != Team::Friendly {
            return Err(WorldError::NotControllable(to));
        }

        let from = self.world.human();
        if from != Some(to) {
            self.world
                .set_control(to, ControlPolicy::Human(HumanControl::new()))?;
            // the replaced AI may have left a flee path pending
            self.paths.forget(to);
        }
        Ok(GameEvent::ControlSwitched { from, to })
    }

    /// Runs one tick of `dt_ms` milliseconds.
    pub fn step(&mut self, dt_ms: Millis) -> Vec<GameEvent> {
        let now = self.timers.now().saturating_add(dt_ms);
        let mut events = Vec::new();

        for timer in self.timers.drain_due(now) {
            self.on_timer(timer, now, &mut events);
        }

        self.paths.pump(self.world.grid());

        let decisions = self.decide(now);
        for (id, decision) in decisions {
            self.apply(id, decision, &mut events);
        }

        let dt = dt_ms as f64 / 1000.0;
        self.move_combatants(dt);
        self.move_projectiles(dt, &mut events);

        self.resolve_overlaps(now, &mut events);
        self.remove_dead(&mut events);
        events
    }

    fn on_timer(&mut self, timer: TimerEvent, now: Millis, events: &mut Vec<GameEvent>) {
        let world = &mut self.world;
        match timer {
            TimerEvent::InvulnerabilityEnded(id) => {
                if let Some(combatant) = world.combatant_mut(id) {
                    combatant.end_invulnerability();
                }
            }
            TimerEvent::HitStunEnded(id) => {
                if let Some(combatant) = world.combatant_mut(id) {
                    combatant.end_hit_stun();
                }
            }
            TimerEvent::RecentSourceExpired { target, source } => {
                if let Some(combatant) = world.combatant_mut(target) {
                    combatant.forget_source(source);
                }
            }
            TimerEvent::PoisonTick {
                target,
                source,
                damage,
            } => {
                let Some(position) = world.combatant(target).map(|victim| victim.position) else {
                    return;
                };
                let hit = Hit {
                    amount: damage,
                    source,
                    source_position: position,
                    bounce: false,
                };
                let mut resolver = Resolver {
                    world,
                    timers: &mut self.timers,
                    config: &self.config,
                    now,
                };
                events.extend(resolver.apply_hit(target, hit));
            }
            TimerEvent::SlowExpired { target, generation } => {
                if let Some(combatant) = world.combatant_mut(target) {
                    combatant.expire_slow(generation, self.config.status.slow_policy);
                }
            }
            TimerEvent::FieldCooldownExpired { field, target } => {
                if let Some(field) = world.field_mut(field) {
                    field.release(target);
                }
            }
            TimerEvent::Expired(id) => {
                if world.field(id).is_some() {
                    events.push(GameEvent::FieldExpired { field: id });
                    events.extend(despawn(world, id));
                } else {
                    events.extend(expire(world, id, ExpireReason::Lifetime));
                }
            }
            TimerEvent::GeneratorReady(id) => {
                if let Some(weapon) = world.combatant_mut(id).and_then(|c| c.generator_mut()) {
                    weapon.mark_ready();
                }
            }
            TimerEvent::WanderReady(id) => {
                if let Some(ControlPolicy::WeakAi(weak)) = world.control_mut(id) {
                    weak.wander_ready();
                }
            }
            TimerEvent::DashEnded(id) => {
                if let Some(ControlPolicy::Human(human)) = world.control_mut(id) {
                    human.end_dash();
                }
            }
            TimerEvent::DashReady(id) => {
                if let Some(ControlPolicy::Human(human)) = world.control_mut(id) {
                    human.dash_ready();
                }
            }
        }
    }

    fn decide(&mut self, now: Millis) -> Vec<(EntityId, Decision)> {
        let mut controls = self.world.take_controls();
        let mut decisions = Vec::with_capacity(controls.len());

        for (id, policy) in controls.iter_mut() {
            let Some(me) = self.world.combatant(*id) else {
                continue;
            };
            let mut ctx = TickContext {
                me,
                world: &self.world,
                now,
                timers: &mut self.timers,
                rng: &mut self.rng,
                paths: self.paths.as_mut(),
                config: &self.config,
            };
            decisions.push((*id, policy.decide(&mut ctx)));
        }

        self.world.restore_controls(controls);
        decisions
    }

    fn apply(&mut self, id: EntityId, decision: Decision, events: &mut Vec<GameEvent>) {
        events.extend(decision.feedback.into_iter().map(GameEvent::Feedback));
        if decision.path_not_found {
            events.push(GameEvent::PathNotFound { entity: id });
        }

        let Some(combatant) = self.world.combatant_mut(id) else {
            return;
        };
        if let Some(velocity) = decision.velocity {
            if combatant.can_move() {
                combatant.velocity = velocity;
            }
        }

        let Some(heading) = decision.fire else {
            return;
        };
        let Some(fired) = self.world.fire(id, heading, &mut self.timers) else {
            return;
        };
        for evicted in fired.evicted {
            events.push(GameEvent::ProjectileExpired {
                projectile: evicted,
                reason: ExpireReason::Evicted,
            });
            events.push(GameEvent::Removed {
                entity: evicted,
                kind: EntityKind::Projectile,
            });
        }
        let projectile = fired.projectile;
        if let ProjectileBehavior::Trap {
            lifetime_ms: Some(lifetime),
        } = projectile.behavior
        {
            self.timers
                .schedule(lifetime, TimerEvent::Expired(projectile.id));
        }
        events.push(GameEvent::Fired {
            owner: id,
            projectile: projectile.id,
            heading,
        });
        events.push(GameEvent::Feedback(Feedback::Sound {
            entity: id,
            sound: Sound::Fire,
        }));
    }

    /// Moves living combatants, keeping them inside the map and off blocked
    /// tiles. A blocked move slides along whichever axis is free.
    fn move_combatants(&mut self, dt: f64) {
        let (grid, combatants) = self.world.grid_and_combatants_mut();
        let bounds = grid.bounds();
        for combatant in combatants {
            if !combatant.is_alive() {
                continue;
            }
            combatant.update_facing();
            let step = combatant.velocity * dt;
            combatant.position = constrained_step(grid, bounds, combatant.position, step);
        }
    }

    fn move_projectiles(&mut self, dt: f64, events: &mut Vec<GameEvent>) {
        let bounds = self.world.bounds();
        let anchors = self.world.cover_anchors().to_vec();
        let positions: Vec<(Team, Vec2)> = self
            .world
            .combatants()
            .into_iter()
            .filter(|combatant| combatant.is_alive())
            .map(|combatant| (combatant.team(), combatant.position))
            .collect();
        let turn_rate = self.config.world.tracking_turn_rate;

        let mut reached_range = Vec::new();
        let mut escaped = Vec::new();
        for projectile in self.world.projectiles_mut() {
            if projectile.behavior == ProjectileBehavior::Tracking {
                let opponents: Vec<Vec2> = positions
                    .iter()
                    .filter(|(team, _)| projectile.team.opposes(*team))
                    .map(|(_, position)| *position)
                    .collect();
                if let Some(target) = tracking_target(projectile.position, &opponents, &anchors) {
                    projectile.steer_toward(target, turn_rate);
                }
            }
            if projectile.advance(dt) {
                reached_range.push(projectile.id);
            }
            if projectile.is_outside(bounds) {
                escaped.push(projectile.id);
            }
        }

        for id in escaped {
            events.extend(expire(&mut self.world, id, ExpireReason::OutOfBounds));
        }
        for id in reached_range {
            self.on_range_reached(id, events);
        }
    }

    fn on_range_reached(&mut self, id: EntityId, events: &mut Vec<GameEvent>) {
        let Some(projectile) = self.world.projectile(id).cloned() else {
            return;
        };
        match &projectile.behavior {
            ProjectileBehavior::Basic | ProjectileBehavior::Tracking => {
                events.extend(expire(&mut self.world, id, ExpireReason::OutOfRange));
            }
            ProjectileBehavior::Field(spec) => {
                let (field, evicted) = self.world.spawn_field(
                    |field| Field::from_projectile(field, &projectile, spec),
                    spec.capacity,
                );
                for old in evicted {
                    events.push(GameEvent::FieldExpired { field: old });
                    events.push(GameEvent::Removed {
                        entity: old,
                        kind: EntityKind::Field,
                    });
                }
                if let Some(lifetime) = spec.lifetime_ms {
                    self.timers.schedule(lifetime, TimerEvent::Expired(field));
                }
                events.push(GameEvent::FieldSpawned {
                    field,
                    team: projectile.team,
                    center: projectile.position,
                });
                events.push(GameEvent::Feedback(Feedback::Sound {
                    entity: field,
                    sound: Sound::Field,
                }));
                events.extend(expire(&mut self.world, id, ExpireReason::OutOfRange));
            }
            ProjectileBehavior::Trap { .. } => {
                if let Some(trap) = self.world.projectile_mut(id) {
                    trap.arm();
                    events.push(GameEvent::TrapArmed {
                        projectile: id,
                        position: trap.position,
                    });
                }
            }
        }
    }

    fn resolve_overlaps(&mut self, now: Millis, events: &mut Vec<GameEvent>) {
        let mut pairs = std::mem::take(&mut self.overlaps);
        pairs.extend(detect_overlaps(&self.world));

        let mut resolver = Resolver {
            world: &mut self.world,
            timers: &mut self.timers,
            config: &self.config,
            now,
        };
        for (a, b) in pairs {
            events.extend(resolver.dispatch(a, b));
        }
    }

    fn remove_dead(&mut self, events: &mut Vec<GameEvent>) {
        let dead: Vec<EntityId> = self
            .world
            .combatants()
            .into_iter()
            .filter(|combatant| !combatant.is_alive())
            .map(|combatant| combatant.id())
            .collect();
        for id in dead {
            self.paths.forget(id);
            events.extend(despawn(&mut self.world, id));
        }
    }
}

/// Every overlapping pair that can have an effect, ordered by id.
fn detect_overlaps(world: &World) -> BTreeSet<(EntityId, EntityId)> {
    let mut pairs = BTreeSet::new();
    let mut add = |a: EntityId, b: EntityId| {
        pairs.insert((a.min(b), a.max(b)));
    };

    let combatants: Vec<_> = world
        .combatants()
        .into_iter()
        .filter(|combatant| combatant.is_alive())
        .collect();

    for (index, body) in combatants.iter().enumerate() {
        let bounds = body.bounds();
        for other in &combatants[index + 1..] {
            if bounds.intersects(other.bounds()) {
                add(body.id(), other.id());
            }
        }
        for projectile in world.projectiles() {
            if bounds.intersects_circle(projectile.position, projectile.radius) {
                add(body.id(), projectile.id);
            }
        }
        for field in world.fields() {
            if field.touches(body) {
                add(body.id(), field.id);
            }
        }
        for spike in world.spikes() {
            if bounds.intersects(spike.bounds()) {
                add(body.id(), spike.id);
            }
        }
        for potion in world.potions() {
            if bounds.intersects(potion.bounds()) {
                add(body.id(), potion.id);
            }
        }
    }
    pairs
}

/// Applies `step` from `from`, clamped to `bounds` and kept on walkable
/// tiles.
fn constrained_step(grid: &TileGrid, bounds: Rect, from: Vec2, step: Vec2) -> Vec2 {
    let candidates = [
        from + step,
        Vec2::new(from.x + step.x, from.y),
        Vec2::new(from.x, from.y + step.y),
    ];
    candidates
        .into_iter()
        .map(|candidate| bounds.clamp_point(candidate))
        .find(|candidate| grid.is_walkable_at(*candidate))
        .unwrap_or(from)
}
