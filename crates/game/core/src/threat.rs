//! Projectile avoidance.
//!
//! Each hostile projectile near a combatant forbids a wedge of headings: the
//! directions in which walking would take the combatant's hitbox across the
//! projectile's line of approach. The wedges are merged into a disjoint set
//! and a desired heading is pushed to the nearest free boundary.

use crate::config::AiTuning;
use crate::geometry::{Hitbox, Vec2, angle_of_normalized, distance};
use crate::interval::{AngularInterval, clamp_heading, merge};

/// A projectile as seen by the planner.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Threat {
    pub center: Vec2,
    pub radius: f64,
}

/// Collision-avoidance planner for one combatant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThreatPlanner {
    pub perception_radius: f64,
    pub tolerance_factor: f64,
}

impl Default for ThreatPlanner {
    fn default() -> Self {
        Self::from_tuning(&AiTuning::default())
    }
}

impl ThreatPlanner {
    pub fn from_tuning(tuning: &AiTuning) -> Self {
        Self {
            perception_radius: tuning.perception_radius,
            tolerance_factor: tuning.tolerance_factor,
        }
    }

    /// Forbidden wedge for one threat, or `None` when it is out of
    /// perception range.
    pub fn forbidden_interval(
        &self,
        center: Vec2,
        hitbox: Hitbox,
        threat: &Threat,
    ) -> Option<AngularInterval> {
        let dist = distance(center, threat.center);
        if dist > self.perception_radius {
            return None;
        }
        let bearing = angle_of_normalized(center, threat.center);
        let clearance = safe_distance(hitbox, bearing);
        let half_width = (threat.radius * self.tolerance_factor + clearance).atan2(dist);
        Some(AngularInterval::around(bearing, half_width))
    }

    /// Merged forbidden set for all perceived threats.
    pub fn forbidden_intervals<'a, I>(
        &self,
        center: Vec2,
        hitbox: Hitbox,
        threats: I,
    ) -> Vec<AngularInterval>
    where
        I: IntoIterator<Item = &'a Threat>,
    {
        let raw: Vec<AngularInterval> = threats
            .into_iter()
            .filter_map(|threat| self.forbidden_interval(center, hitbox, threat))
            .collect();
        merge(&raw)
    }

    /// Adjusts `desired` so that it does not walk into any perceived threat.
    pub fn steer<'a, I>(&self, center: Vec2, hitbox: Hitbox, desired: f64, threats: I) -> f64
    where
        I: IntoIterator<Item = &'a Threat>,
    {
        let forbidden = self.forbidden_intervals(center, hitbox, threats);
        clamp_heading(desired, &forbidden)
    }
}

/// Distance from the hitbox center to the point where a ray along the
/// perpendicular of `bearing` leaves the box.
///
/// The ray exits through a vertical side when `width·|sin| < height·|cos|`,
/// otherwise through a horizontal side.
pub fn safe_distance(hitbox: Hitbox, bearing: f64) -> f64 {
    let perpendicular = bearing - core::f64::consts::FRAC_PI_2;
    let (sin, cos) = perpendicular.sin_cos();
    let (x, y) = if hitbox.width * sin.abs() < hitbox.height * cos.abs() {
        let x = cos.signum() * hitbox.half_width();
        (x, x * sin / cos)
    } else if sin != 0.0 {
        let y = sin.signum() * hitbox.half_height();
        (y * cos / sin, y)
    } else {
        // degenerate box with zero height
        (hitbox.half_width(), 0.0)
    };
    x.hypot(y)
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn safe_distance_of_square_box() {
        let hitbox = Hitbox::new(16.0, 16.0);
        // bearing along x: perpendicular is vertical, exit through the top side
        assert!((safe_distance(hitbox, 0.0) - 8.0).abs() < EPS);
        // bearing along y: perpendicular is horizontal
        assert!((safe_distance(hitbox, FRAC_PI_2) - 8.0).abs() < EPS);
        // diagonal reaches the corner
        assert!((safe_distance(hitbox, PI / 4.0) - 8.0 * 2f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn safe_distance_of_wide_box() {
        let hitbox = Hitbox::new(32.0, 8.0);
        // perpendicular of bearing 0 points up, so the half height matters
        assert!((safe_distance(hitbox, 0.0) - 4.0).abs() < EPS);
        assert!((safe_distance(hitbox, FRAC_PI_2) - 16.0).abs() < EPS);
    }

    #[test]
    fn far_threats_are_ignored() {
        let planner = ThreatPlanner::default();
        let threat = Threat {
            center: Vec2::new(200.0, 0.0),
            radius: 4.0,
        };
        assert!(
            planner
                .forbidden_interval(Vec2::ZERO, Hitbox::default(), &threat)
                .is_none()
        );
    }

    #[test]
    fn near_threat_forbids_its_bearing() {
        let planner = ThreatPlanner::default();
        let threat = Threat {
            center: Vec2::new(0.0, 64.0),
            radius: 2.0,
        };
        let interval = planner
            .forbidden_interval(Vec2::ZERO, Hitbox::default(), &threat)
            .unwrap();
        let expected = (2.0f64 * 4.0 + 8.0).atan2(64.0);
        assert!(interval.contains(FRAC_PI_2));
        assert!((interval.span() - 2.0 * expected).abs() < 1e-9);
    }

    #[test]
    fn steer_moves_heading_off_threat() {
        let planner = ThreatPlanner::default();
        let threats = [Threat {
            center: Vec2::new(50.0, 0.0),
            radius: 3.0,
        }];
        let heading = planner.steer(Vec2::ZERO, Hitbox::default(), 0.05, &threats);
        let forbidden = planner.forbidden_intervals(Vec2::ZERO, Hitbox::default(), &threats);
        assert_eq!(forbidden.len(), 1);
        // snapped onto the upper boundary, which lies just past due east
        assert!((heading - forbidden[0].upper).abs() < 1e-9);
    }

    #[test]
    fn steer_without_threats_keeps_heading() {
        let planner = ThreatPlanner::default();
        let heading = planner.steer(Vec2::ZERO, Hitbox::default(), 2.5, &[]);
        assert!((heading - 2.5).abs() < EPS);
    }
}
