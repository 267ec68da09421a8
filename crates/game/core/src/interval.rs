//! Forbidden-heading intervals and their merge engine.
//!
//! An [`AngularInterval`] is a closed range of headings. Intervals whose
//! `lower` bound is greater than their `upper` bound wrap through the 0/2π
//! seam. [`merge`] reduces any list of intervals to a minimal disjoint set and
//! [`clamp_heading`] moves a desired heading out of the merged set.

use core::f64::consts::TAU;

use crate::geometry::normalize_angle;

/// Closed range of headings, in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AngularInterval {
    pub lower: f64,
    pub upper: f64,
}

impl AngularInterval {
    /// The whole circle. Only produced by merging; no heading escapes it.
    pub const FULL: Self = Self {
        lower: 0.0,
        upper: TAU,
    };

    /// Creates an interval with both bounds normalized into `[0, 2π)`.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower: normalize_angle(lower),
            upper: normalize_angle(upper),
        }
    }

    /// Interval of half-width `half_width` centered on `center`.
    pub fn around(center: f64, half_width: f64) -> Self {
        if half_width * 2.0 >= TAU {
            return Self::FULL;
        }
        Self::new(center - half_width, center + half_width)
    }

    /// True when the interval crosses the 0/2π seam.
    pub fn wraps(self) -> bool {
        self.lower > self.upper
    }

    pub fn is_full(self) -> bool {
        self.upper - self.lower >= TAU
    }

    /// Angular size of the interval.
    pub fn span(self) -> f64 {
        if self.wraps() {
            self.upper + TAU - self.lower
        } else {
            self.upper - self.lower
        }
    }

    /// Inclusive membership test.
    pub fn contains(self, angle: f64) -> bool {
        if self.is_full() {
            return true;
        }
        let angle = normalize_angle(angle);
        if self.wraps() {
            angle >= self.lower || angle <= self.upper
        } else {
            angle >= self.lower && angle <= self.upper
        }
    }

    fn normalized(self) -> Self {
        if self.is_full() {
            Self::FULL
        } else {
            Self::new(self.lower, self.upper)
        }
    }

    /// Bounds on a linear axis: a wrapping interval keeps its lower bound and
    /// has 2π added to its upper bound.
    fn unwrapped(self) -> (f64, f64) {
        if self.wraps() {
            (self.lower, self.upper + TAU)
        } else {
            (self.lower, self.upper)
        }
    }

    /// Union of two intervals if they overlap or touch.
    ///
    /// Both intervals are unwrapped onto one linear axis. A non-wrapping
    /// interval can sit on either side of the seam relative to a wrapping one,
    /// so it is compared both as-is and shifted by 2π.
    fn union(self, other: Self) -> Option<Self> {
        let (a_lo, a_hi) = self.unwrapped();
        let (b_lo, b_hi) = other.unwrapped();

        let shifts: &[f64] = match (self.wraps(), other.wraps()) {
            (false, false) => &[0.0],
            (true, false) => &[0.0, TAU],
            (false, true) => &[0.0, -TAU],
            // Both contain the seam, so they always overlap.
            (true, true) => &[0.0],
        };

        for shift in shifts {
            let (lo, hi) = (b_lo + shift, b_hi + shift);
            if a_hi >= lo && hi >= a_lo {
                let merged_lo = a_lo.min(lo);
                let merged_hi = a_hi.max(hi);
                if merged_hi - merged_lo >= TAU {
                    return Some(Self::FULL);
                }
                return Some(Self::new(merged_lo, merged_hi));
            }
        }
        None
    }

    /// True when the two intervals share at least one heading.
    pub fn overlaps(self, other: Self) -> bool {
        self.union(other).is_some()
    }
}

/// Merges overlapping intervals into a minimal disjoint set.
///
/// Every ordered pair is tested; the first overlapping pair found is replaced
/// by its union and the scan restarts on the new list. The input is never
/// mutated, and merging an already merged set returns it unchanged.
pub fn merge(intervals: &[AngularInterval]) -> Vec<AngularInterval> {
    let mut current: Vec<AngularInterval> =
        intervals.iter().map(|interval| interval.normalized()).collect();

    loop {
        let Some((i, j, union)) = first_overlap(&current) else {
            return current;
        };
        current = current
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != i && *index != j)
            .map(|(_, interval)| *interval)
            .chain(core::iter::once(union))
            .collect();
    }
}

fn first_overlap(intervals: &[AngularInterval]) -> Option<(usize, usize, AngularInterval)> {
    for (i, a) in intervals.iter().enumerate() {
        for (j, b) in intervals.iter().enumerate() {
            if i == j {
                continue;
            }
            if let Some(union) = a.union(*b) {
                return Some((i, j, union));
            }
        }
    }
    None
}

/// Moves `heading` out of any forbidden interval it falls strictly inside,
/// snapping to whichever boundary is angularly closer.
///
/// For a wrapping interval the upper bound is boosted by 2π, and so is the
/// heading when it lies below the lower bound; the result is renormalized
/// afterwards. Without the boost, headings just past due east (angle 0) never
/// register as inside a seam-crossing interval.
///
/// A full-circle interval leaves the heading untouched: there is no safe
/// direction to prefer.
pub fn clamp_heading(heading: f64, forbidden: &[AngularInterval]) -> f64 {
    let mut heading = normalize_angle(heading);
    for interval in forbidden {
        if interval.is_full() {
            continue;
        }
        let lower = interval.lower;
        let mut upper = interval.upper;
        let mut boosted = heading;
        if interval.wraps() {
            upper += TAU;
            if boosted < lower {
                boosted += TAU;
            }
        }

        if boosted > lower && boosted < upper {
            boosted = if (boosted - lower).abs() < (boosted - upper).abs() {
                lower
            } else {
                upper
            };
        }

        heading = normalize_angle(boosted);
    }
    heading
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn iv(lower: f64, upper: f64) -> AngularInterval {
        AngularInterval::new(lower, upper)
    }

    fn assert_single(merged: &[AngularInterval], lower: f64, upper: f64) {
        assert_eq!(merged.len(), 1, "expected one interval, got {merged:?}");
        assert!((merged[0].lower - lower).abs() < EPS, "{merged:?}");
        assert!((merged[0].upper - upper).abs() < EPS, "{merged:?}");
    }

    #[test]
    fn disjoint_intervals_are_kept() {
        let merged = merge(&[iv(0.5, 1.0), iv(2.0, 2.5)]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn overlapping_intervals_merge_into_union() {
        let merged = merge(&[iv(1.0, 1.5), iv(1.4, 2.0), iv(3.0, 3.1)]);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&iv(1.0, 2.0)));
        assert!(merged.contains(&iv(3.0, 3.1)));
    }

    #[test]
    fn wrapping_interval_absorbs_interval_after_seam() {
        let merged = merge(&[iv(5.8, 0.3), iv(0.2, 0.6)]);
        assert_single(&merged, 5.8, 0.6);
    }

    #[test]
    fn wrapping_interval_absorbs_interval_before_seam() {
        let merged = merge(&[iv(5.9, 6.1), iv(6.0, 0.3)]);
        assert_single(&merged, 5.9, 0.3);
    }

    #[test]
    fn two_wrapping_intervals_merge() {
        let merged = merge(&[iv(5.5, 0.1), iv(6.0, 0.4)]);
        assert_single(&merged, 5.5, 0.4);
    }

    #[test]
    fn covering_the_circle_collapses_to_full() {
        let merged = merge(&[iv(0.0, 3.5), iv(3.0, 0.1)]);
        assert_eq!(merged, vec![AngularInterval::FULL]);
        assert!(merged[0].contains(4.0));
    }

    #[test]
    fn chain_of_overlaps_merges_transitively() {
        let merged = merge(&[iv(1.0, 1.2), iv(1.6, 1.8), iv(1.1, 1.7)]);
        assert_single(&merged, 1.0, 1.8);
    }

    #[test]
    fn clamp_snaps_to_closer_boundary() {
        let heading = clamp_heading(1.2, &[iv(1.0, 1.5)]);
        assert!((heading - 1.0).abs() < EPS);
        let heading = clamp_heading(1.4, &[iv(1.0, 1.5)]);
        assert!((heading - 1.5).abs() < EPS);
    }

    #[test]
    fn clamp_leaves_free_heading_alone() {
        let heading = clamp_heading(2.0, &[iv(1.0, 1.5)]);
        assert!((heading - 2.0).abs() < EPS);
    }

    #[test]
    fn clamp_across_the_seam() {
        // just past due east, inside a seam-crossing interval
        let heading = clamp_heading(0.1, &[iv(5.8, 0.3)]);
        assert!((heading - 0.3).abs() < EPS);
        // just before due east
        let heading = clamp_heading(5.9, &[iv(5.8, 0.3)]);
        assert!((heading - 5.8).abs() < EPS);
        // opposite side of the circle is free
        let heading = clamp_heading(3.0, &[iv(5.8, 0.3)]);
        assert!((heading - 3.0).abs() < EPS);
    }

    #[test]
    fn clamp_ignores_full_circle() {
        let heading = clamp_heading(2.0, &[AngularInterval::FULL]);
        assert!((heading - 2.0).abs() < EPS);
    }

    #[test]
    fn around_builds_symmetric_interval() {
        let interval = AngularInterval::around(0.0, 0.2);
        assert!(interval.wraps());
        assert!((interval.span() - 0.4).abs() < 1e-9);
        assert!(interval.contains(0.1));
        assert!(interval.contains(TAU - 0.1));
    }
}
