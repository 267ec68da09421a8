use std::f64::consts::TAU;

use game_core::clock::Scheduler;
use game_core::combat::{Health, coerce_max_health};
use game_core::geometry::{angle_in_range, normalize_angle};
use game_core::interval::{AngularInterval, clamp_heading, merge};
use game_core::{EntityId, ProjectileGenerator, Team, Vec2, WeaponSpec};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum HealthOp {
    Set(i64),
    SetMax(f64),
    Damage(u32),
    Heal(u32),
}

fn health_op() -> impl Strategy<Value = HealthOp> {
    prop_oneof![
        (-100i64..100).prop_map(HealthOp::Set),
        prop_oneof![any::<f64>(), -50.0..50.0f64].prop_map(HealthOp::SetMax),
        (0u32..40).prop_map(HealthOp::Damage),
        (0u32..40).prop_map(HealthOp::Heal),
    ]
}

fn interval() -> impl Strategy<Value = AngularInterval> {
    (0.0..TAU, 0.0..TAU).prop_map(|(lower, upper)| AngularInterval::new(lower, upper))
}

proptest! {
    #[test]
    fn max_health_is_even_and_bounded(value in any::<f64>()) {
        let max = coerce_max_health(value);
        prop_assert!((2..=20).contains(&max));
        prop_assert_eq!(max % 2, 0);
    }

    #[test]
    fn health_stays_within_bounds(max in 0.0..30.0f64, ops in prop::collection::vec(health_op(), 0..32)) {
        let mut health = Health::full(max);
        for op in ops {
            match op {
                HealthOp::Set(value) => health.set(value),
                HealthOp::SetMax(value) => health.set_max(value),
                HealthOp::Damage(amount) => {
                    let before = health.current();
                    let dealt = health.damage(amount);
                    prop_assert_eq!(before - dealt, health.current());
                }
                HealthOp::Heal(amount) => {
                    let before = health.current();
                    let restored = health.heal(amount);
                    prop_assert_eq!(before + restored, health.current());
                }
            }
            prop_assert!(health.current() <= health.max());
            prop_assert_eq!(health.max() % 2, 0);
        }
    }

    #[test]
    fn merged_intervals_are_disjoint(intervals in prop::collection::vec(interval(), 0..8)) {
        let merged = merge(&intervals);
        prop_assert!(merged.len() <= intervals.len());
        for (i, a) in merged.iter().enumerate() {
            for b in &merged[i + 1..] {
                prop_assert!(!a.overlaps(*b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn merging_twice_changes_nothing(intervals in prop::collection::vec(interval(), 0..8)) {
        let once = merge(&intervals);
        prop_assert_eq!(merge(&once), once);
    }

    #[test]
    fn merged_set_covers_every_input(intervals in prop::collection::vec(interval(), 1..8)) {
        let merged = merge(&intervals);
        for interval in &intervals {
            let middle = normalize_angle(interval.lower + interval.span() / 2.0);
            prop_assert!(
                merged.iter().any(|m| m.contains(middle)),
                "{middle} from {interval:?} lost in {merged:?}"
            );
        }
    }

    #[test]
    fn wrapping_ranges_hold_the_seam(lower in 3.5..TAU, upper in 0.0..3.0f64, angle in 0.0..TAU) {
        let expected = angle >= lower || angle <= upper;
        prop_assert_eq!(angle_in_range(angle, lower, upper), expected);
    }

    #[test]
    fn clamped_headings_leave_single_intervals(center in 0.0..TAU, half in 0.05..1.5f64, offset in -0.95..0.95f64) {
        let forbidden = AngularInterval::around(center, half);
        let heading = center + offset * half;
        let clamped = clamp_heading(heading, &[forbidden]);
        let at_lower = game_core::geometry::angular_distance(clamped, forbidden.lower) < 1e-9;
        let at_upper = game_core::geometry::angular_distance(clamped, forbidden.upper) < 1e-9;
        prop_assert!(at_lower || at_upper, "{clamped} not on a bound of {forbidden:?}");
    }

    #[test]
    fn generator_history_never_exceeds_capacity(capacity in 1usize..6, shots in 1u32..20) {
        let spec = WeaponSpec {
            capacity: Some(capacity),
            cooldown_ms: 0,
            ..WeaponSpec::default()
        };
        let mut generator = ProjectileGenerator::new(EntityId(1), Team::Hostile, &spec);
        let mut timers = Scheduler::new();
        let mut fired = Vec::new();

        for n in 0..shots {
            let id = EntityId(100 + n);
            let shot = generator
                .fire(id, Vec2::ZERO, 0.0, &mut timers, |_| true)
                .expect("no cooldown");
            if fired.len() == capacity {
                prop_assert_eq!(shot.evicted, vec![fired.remove(0)]);
            } else {
                prop_assert!(shot.evicted.is_empty());
            }
            fired.push(id);
            prop_assert_eq!(generator.history().collect::<Vec<_>>(), fired.clone());
        }
    }
}

#[test]
fn heading_inside_a_threat_snaps_to_the_nearer_bound() {
    let forbidden = [AngularInterval::new(1.0, 1.5)];
    assert_eq!(clamp_heading(1.2, &forbidden), 1.0);
    assert_eq!(clamp_heading(1.4, &forbidden), 1.5);
    assert_eq!(clamp_heading(2.0, &forbidden), 2.0);
}

#[test]
fn heading_just_past_the_seam_is_clamped() {
    let forbidden = [AngularInterval::new(6.0, 0.5)];
    let clamped = clamp_heading(0.2, &forbidden);
    assert!((clamped - 0.5).abs() < 1e-9);
}
