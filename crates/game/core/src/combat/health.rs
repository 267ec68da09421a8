//! Health pool with clamped writes.

use crate::config::GameConfig;

/// Coerces any number into a legal maximum health: an even integer in
/// `[2, 20]`.
///
/// NaN and negative infinity fall to the minimum, positive infinity to the
/// maximum, and finite values are clamped then rounded to the nearest even
/// integer (halves round up).
pub fn coerce_max_health(value: f64) -> u32 {
    let min = f64::from(GameConfig::MIN_MAX_HEALTH);
    let max = f64::from(GameConfig::MAX_MAX_HEALTH);
    let value = if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    };
    let even = (value / 2.0).round() * 2.0;
    (even.clamp(min, max)) as u32
}

/// Current and maximum health. `0 <= current <= max` holds after every
/// write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    /// Full health pool of the coerced maximum.
    pub fn full(max: f64) -> Self {
        let max = coerce_max_health(max);
        Self { current: max, max }
    }

    /// Pool starting at `current`, clamped into `[0, max]`.
    pub fn with_current(max: f64, current: i64) -> Self {
        let mut health = Self::full(max);
        health.set(current);
        health
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Fraction of max health left, in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        f64::from(self.current) / f64::from(self.max)
    }

    /// Writes `value` clamped into `[0, max]`.
    pub fn set(&mut self, value: i64) {
        self.current = value.clamp(0, i64::from(self.max)) as u32;
    }

    /// Replaces the maximum (coerced) and clamps the current value to it.
    pub fn set_max(&mut self, max: f64) {
        self.max = coerce_max_health(max);
        self.current = self.current.min(self.max);
    }

    /// Removes up to `amount` points and returns how many were removed.
    pub fn damage(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.set(i64::from(self.current) - i64::from(amount));
        before - self.current
    }

    /// Adds up to `amount` points and returns how many were added.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.set(i64::from(self.current) + i64::from(amount));
        self.current - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_health_is_always_even_and_bounded() {
        assert_eq!(coerce_max_health(f64::NAN), 2);
        assert_eq!(coerce_max_health(f64::NEG_INFINITY), 2);
        assert_eq!(coerce_max_health(f64::INFINITY), 20);
        assert_eq!(coerce_max_health(-7.0), 2);
        assert_eq!(coerce_max_health(0.0), 2);
        assert_eq!(coerce_max_health(7.0), 8);
        assert_eq!(coerce_max_health(12.0), 12);
        assert_eq!(coerce_max_health(13.2), 14);
        assert_eq!(coerce_max_health(21.0), 20);
        assert_eq!(coerce_max_health(19.0), 20);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut health = Health::full(6.0);
        assert_eq!(health.damage(4), 4);
        assert_eq!(health.damage(4), 2);
        assert_eq!(health.current(), 0);
        assert!(health.is_empty());
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut health = Health::with_current(12.0, 10);
        assert_eq!(health.heal(5), 2);
        assert_eq!(health.current(), 12);
    }

    #[test]
    fn shrinking_max_clamps_current() {
        let mut health = Health::full(20.0);
        health.set_max(6.0);
        assert_eq!(health.current(), 6);
        assert_eq!(health.max(), 6);
    }

    #[test]
    fn set_clamps_both_ends() {
        let mut health = Health::full(10.0);
        health.set(-3);
        assert_eq!(health.current(), 0);
        health.set(99);
        assert_eq!(health.current(), 10);
    }
}
