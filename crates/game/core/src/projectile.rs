//! Ranged weapons: generators and the projectiles they spawn.
//!
//! A [`ProjectileGenerator`] belongs to exactly one combatant. Firing is gated
//! by a cooldown timer and every spawned instance is recorded in a history
//! bounded by the weapon capacity; on overflow the oldest live instance is
//! evicted.

use std::collections::VecDeque;

use core::f64::consts::{PI, TAU};

use crate::clock::{Millis, Scheduler, TimerEvent};
use crate::combat::EffectFlags;
use crate::entity::{EntityId, Team};
use crate::geometry::{Rect, Vec2, angle_of_normalized, angular_distance, distance};
use crate::threat::Threat;

/// Field left behind by a field projectile when it reaches its range.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FieldSpec {
    pub radius: f64,
    pub effects: EffectFlags,
    /// Field lifetime; `None` keeps it until evicted.
    pub lifetime_ms: Option<Millis>,
    /// Maximum number of fields with the same effects; `None` is unbounded.
    pub capacity: Option<usize>,
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            radius: 24.0,
            effects: EffectFlags::POISON,
            lifetime_ms: Some(10_000),
            capacity: Some(3),
        }
    }
}

/// What a projectile does besides flying straight.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProjectileBehavior {
    #[default]
    Basic,
    /// Turns toward the closest visible opponent every tick.
    Tracking,
    /// Spawns a field on reaching its range.
    Field(FieldSpec),
    /// Stops on reaching its range and stays armed.
    Trap { lifetime_ms: Option<Millis> },
}

/// Weapon stats. `None` range or capacity means unbounded.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct WeaponSpec {
    pub damage: i32,
    pub speed: f64,
    pub range: Option<f64>,
    pub capacity: Option<usize>,
    pub cooldown_ms: Millis,
    /// Collision radius of each projectile.
    pub radius: f64,
    pub behavior: ProjectileBehavior,
}

impl Default for WeaponSpec {
    fn default() -> Self {
        Self {
            damage: 1,
            speed: 96.0,
            range: Some(160.0),
            capacity: None,
            cooldown_ms: 500,
            radius: 4.0,
            behavior: ProjectileBehavior::Basic,
        }
    }
}

impl WeaponSpec {
    /// Range limit; a negative range counts as unbounded.
    pub fn range_limit(&self) -> Option<f64> {
        self.range.filter(|range| *range >= 0.0)
    }

    /// Whether a target `dist` away can be reached.
    pub fn reaches(&self, dist: f64) -> bool {
        self.range_limit().is_none_or(|range| dist <= range)
    }
}

/// A freshly fired projectile plus the instances it pushed out.
#[derive(Clone, Debug, PartialEq)]
pub struct Fired {
    pub projectile: Projectile,
    pub evicted: Vec<EntityId>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileGenerator {
    owner: EntityId,
    team: Team,
    spec: WeaponSpec,
    ready: bool,
    history: VecDeque<EntityId>,
}

impl ProjectileGenerator {
    pub fn new(owner: EntityId, team: Team, spec: &WeaponSpec) -> Self {
        Self {
            owner,
            team,
            spec: spec.clone(),
            ready: true,
            history: VecDeque::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn spec(&self) -> &WeaponSpec {
        &self.spec
    }

    /// True when the cooldown has elapsed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub(crate) fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Ids of spawned instances, oldest first.
    pub fn history(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.history.iter().copied()
    }

    /// Spawns projectile `id` at `origin` flying along `heading`.
    ///
    /// Returns `None` while cooling down or when the capacity is zero.
    /// Instances for which `is_live` is false are dropped from the history
    /// first; if the history is still full, the oldest live instances are
    /// evicted and returned so the caller can remove them.
    pub fn fire(
        &mut self,
        id: EntityId,
        origin: Vec2,
        heading: f64,
        timers: &mut Scheduler,
        is_live: impl Fn(EntityId) -> bool,
    ) -> Option<Fired> {
        if !self.ready || self.spec.capacity == Some(0) {
            return None;
        }

        self.history.retain(|instance| is_live(*instance));
        let mut evicted = Vec::new();
        if let Some(capacity) = self.spec.capacity {
            while self.history.len() >= capacity {
                match self.history.pop_front() {
                    Some(oldest) => evicted.push(oldest),
                    None => break,
                }
            }
        }
        self.history.push_back(id);

        if self.spec.cooldown_ms > 0 {
            self.ready = false;
            timers.schedule(self.spec.cooldown_ms, TimerEvent::GeneratorReady(self.owner));
        }

        Some(Fired {
            projectile: Projectile::launch(id, self.owner, self.team, origin, heading, &self.spec),
            evicted,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ProjectileState {
    #[default]
    Flying,
    /// A trap that reached its range and sits still.
    Armed,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projectile {
    pub id: EntityId,
    pub owner: EntityId,
    pub team: Team,
    pub position: Vec2,
    pub velocity: Vec2,
    pub speed: f64,
    pub damage: i32,
    pub radius: f64,
    pub range: Option<f64>,
    pub behavior: ProjectileBehavior,
    travelled: f64,
    state: ProjectileState,
}

impl Projectile {
    fn launch(
        id: EntityId,
        owner: EntityId,
        team: Team,
        origin: Vec2,
        heading: f64,
        spec: &WeaponSpec,
    ) -> Self {
        Self {
            id,
            owner,
            team,
            position: origin,
            velocity: Vec2::from_angle(heading).with_length(spec.speed),
            speed: spec.speed,
            damage: spec.damage,
            radius: spec.radius,
            range: spec.range_limit(),
            behavior: spec.behavior.clone(),
            travelled: 0.0,
            state: ProjectileState::Flying,
        }
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn travelled(&self) -> f64 {
        self.travelled
    }

    pub fn heading(&self) -> f64 {
        self.velocity.angle()
    }

    pub fn threat(&self) -> Threat {
        Threat {
            center: self.position,
            radius: self.radius,
        }
    }

    /// Moves for `dt` seconds. Returns true on the tick the projectile first
    /// reaches its range.
    pub fn advance(&mut self, dt: f64) -> bool {
        if self.state == ProjectileState::Armed {
            return false;
        }
        let step = self.velocity * dt;
        let before = self.travelled;
        self.position += step;
        self.travelled += step.length();
        match self.range {
            Some(range) => before < range && self.travelled >= range,
            None => false,
        }
    }

    pub fn is_outside(&self, bounds: Rect) -> bool {
        !bounds.contains(self.position)
    }

    /// Stops the projectile where it is.
    pub fn arm(&mut self) {
        self.state = ProjectileState::Armed;
        self.velocity = Vec2::ZERO;
    }

    /// Turns toward `target` by at most `max_turn` radians, taking the
    /// shorter way around.
    pub fn steer_toward(&mut self, target: Vec2, max_turn: f64) {
        if self.state == ProjectileState::Armed || self.velocity.is_zero() {
            return;
        }
        let current = self.velocity.angle();
        let desired = angle_of_normalized(self.position, target);
        let diff = (desired - current + PI).rem_euclid(TAU) - PI;
        let turn = diff.clamp(-max_turn, max_turn);
        self.velocity = Vec2::from_angle(current + turn) * self.speed;
    }
}

/// Picks the target of a tracking projectile at `from`.
///
/// An opponent is hidden when a cover anchor nearer than it lies within
/// `π/√distance` of its bearing. The closest visible opponent wins; when
/// every opponent is hidden, the closest one overall.
pub fn tracking_target(from: Vec2, opponents: &[Vec2], anchors: &[Vec2]) -> Option<Vec2> {
    let closest = |candidates: &mut dyn Iterator<Item = Vec2>| {
        candidates.min_by(|a, b| distance(from, *a).total_cmp(&distance(from, *b)))
    };

    let visible = |target: Vec2| {
        let dist = distance(from, target);
        if dist <= 0.0 {
            return true;
        }
        let bearing = angle_of_normalized(from, target);
        let threshold = PI / dist.sqrt();
        !anchors.iter().any(|anchor| {
            distance(from, *anchor) < dist
                && angular_distance(angle_of_normalized(from, *anchor), bearing) <= threshold
        })
    };

    closest(&mut opponents.iter().copied().filter(|target| visible(*target)))
        .or_else(|| closest(&mut opponents.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(capacity: Option<usize>, cooldown_ms: Millis) -> ProjectileGenerator {
        ProjectileGenerator::new(
            EntityId(1),
            Team::Hostile,
            &WeaponSpec {
                capacity,
                cooldown_ms,
                ..WeaponSpec::default()
            },
        )
    }

    #[test]
    fn capacity_evicts_oldest_live_instance() {
        let mut timers = Scheduler::new();
        let mut weapon = generator(Some(2), 0);
        let live = |_: EntityId| true;

        for id in 10..12 {
            let fired = weapon
                .fire(EntityId(id), Vec2::ZERO, 0.0, &mut timers, live)
                .unwrap();
            assert!(fired.evicted.is_empty());
        }
        let fired = weapon
            .fire(EntityId(12), Vec2::ZERO, 0.0, &mut timers, live)
            .unwrap();
        assert_eq!(fired.evicted, vec![EntityId(10)]);
        assert_eq!(
            weapon.history().collect::<Vec<_>>(),
            vec![EntityId(11), EntityId(12)]
        );
    }

    #[test]
    fn dead_instances_free_capacity() {
        let mut timers = Scheduler::new();
        let mut weapon = generator(Some(2), 0);
        weapon.fire(EntityId(10), Vec2::ZERO, 0.0, &mut timers, |_| true);
        weapon.fire(EntityId(11), Vec2::ZERO, 0.0, &mut timers, |_| true);
        // #10 already hit something
        let fired = weapon
            .fire(EntityId(12), Vec2::ZERO, 0.0, &mut timers, |id| id != EntityId(10))
            .unwrap();
        assert!(fired.evicted.is_empty());
    }

    #[test]
    fn cooldown_gates_firing() {
        let mut timers = Scheduler::new();
        let mut weapon = generator(None, 500);
        assert!(weapon.fire(EntityId(10), Vec2::ZERO, 0.0, &mut timers, |_| true).is_some());
        assert!(!weapon.is_ready());
        assert!(weapon.fire(EntityId(11), Vec2::ZERO, 0.0, &mut timers, |_| true).is_none());

        assert_eq!(
            timers.drain_due(500),
            vec![TimerEvent::GeneratorReady(EntityId(1))]
        );
        weapon.mark_ready();
        assert!(weapon.fire(EntityId(11), Vec2::ZERO, 0.0, &mut timers, |_| true).is_some());
    }

    #[test]
    fn zero_capacity_never_fires() {
        let mut timers = Scheduler::new();
        let mut weapon = generator(Some(0), 0);
        assert!(weapon.fire(EntityId(10), Vec2::ZERO, 0.0, &mut timers, |_| true).is_none());
    }

    #[test]
    fn projectile_reports_range_once() {
        let mut timers = Scheduler::new();
        let mut weapon = ProjectileGenerator::new(
            EntityId(1),
            Team::Hostile,
            &WeaponSpec {
                speed: 100.0,
                range: Some(50.0),
                ..WeaponSpec::default()
            },
        );
        let mut projectile = weapon
            .fire(EntityId(2), Vec2::ZERO, 0.0, &mut timers, |_| true)
            .unwrap()
            .projectile;
        assert!(!projectile.advance(0.25));
        assert!(projectile.advance(0.25));
        assert!(!projectile.advance(0.25));
        assert!((projectile.position.x - 75.0).abs() < 1e-9);
    }

    #[test]
    fn negative_range_is_unbounded() {
        let spec = WeaponSpec {
            range: Some(-1.0),
            ..WeaponSpec::default()
        };
        assert_eq!(spec.range_limit(), None);
        assert!(spec.reaches(1e9));
    }

    #[test]
    fn armed_traps_stay_put() {
        let mut timers = Scheduler::new();
        let mut weapon = generator(None, 0);
        let mut trap = weapon
            .fire(EntityId(2), Vec2::ZERO, 0.0, &mut timers, |_| true)
            .unwrap()
            .projectile;
        trap.arm();
        assert!(!trap.advance(1.0));
        assert_eq!(trap.position, Vec2::ZERO);
        assert_eq!(trap.state(), ProjectileState::Armed);
    }

    #[test]
    fn steering_turns_by_at_most_the_turn_rate() {
        let mut timers = Scheduler::new();
        let mut weapon = generator(None, 0);
        let mut projectile = weapon
            .fire(EntityId(2), Vec2::ZERO, 0.0, &mut timers, |_| true)
            .unwrap()
            .projectile;
        let rate = PI / 240.0;
        // target straight below: turn clockwise on screen (positive angle)
        projectile.steer_toward(Vec2::new(0.0, 100.0), rate);
        assert!((projectile.heading() - rate).abs() < 1e-9);
        // target just above: take the short way through zero
        projectile.steer_toward(Vec2::new(100.0, -1.0), rate);
        assert!(angular_distance(projectile.heading(), 0.0) < rate);
        assert!((projectile.velocity.length() - projectile.speed).abs() < 1e-9);
    }

    #[test]
    fn tracking_prefers_visible_opponents() {
        let from = Vec2::ZERO;
        let near_hidden = Vec2::new(50.0, 0.0);
        let far_visible = Vec2::new(0.0, 80.0);
        let anchors = [Vec2::new(25.0, 0.0)];

        assert_eq!(
            tracking_target(from, &[near_hidden, far_visible], &anchors),
            Some(far_visible)
        );
        // with nothing visible, fall back to the closest
        assert_eq!(
            tracking_target(from, &[near_hidden], &anchors),
            Some(near_hidden)
        );
        // anchors behind the target do not hide it
        assert_eq!(
            tracking_target(from, &[near_hidden, far_visible], &[Vec2::new(90.0, 0.0)]),
            Some(near_hidden)
        );
        assert_eq!(tracking_target(from, &[], &anchors), None);
    }
}
