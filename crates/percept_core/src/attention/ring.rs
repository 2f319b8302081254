//! Angle-indexed information ring
//!
//! One bucket per degree of body-relative bearing. Rebuilt from scratch every
//! cycle, then searched for the gaze window with the largest total.

use crate::geom::normalize_angle_deg;

pub const RING_SIZE: usize = 360;

/// Scores below this count as empty.
const EMPTY: f64 = 1e-6;

/// Best window found by [`AttentionRing::best_window`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Window {
    /// Centre bearing relative to the body (degrees, not normalized).
    pub dir: f64,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct AttentionRing {
    buckets: [f64; RING_SIZE],
}

impl Default for AttentionRing {
    fn default() -> Self {
        Self { buckets: [0.0; RING_SIZE] }
    }
}

impl AttentionRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.buckets = [0.0; RING_SIZE];
    }

    #[inline]
    fn bucket(angle: i64) -> usize {
        angle.rem_euclid(RING_SIZE as i64) as usize
    }

    #[inline]
    fn at(&self, angle: i64) -> f64 {
        self.buckets[Self::bucket(angle)]
    }

    /// Score of the bucket holding `angle` (any range, rounded to 1°).
    pub fn score(&self, angle: f64) -> f64 {
        self.at(angle.round() as i64)
    }

    pub fn add(&mut self, angle: f64, value: f64) {
        self.buckets[Self::bucket(angle.round() as i64)] += value;
    }

    /// Spread `weight * value` over every bucket within `half_width` degrees of `center`.
    pub fn smear(&mut self, center: f64, half_width: i32, weight: f64, value: f64) {
        let c = center.round() as i64;
        for d in -i64::from(half_width)..=i64::from(half_width) {
            self.buckets[Self::bucket(c + d)] += weight * value;
        }
    }

    pub fn total(&self) -> f64 {
        self.buckets.iter().sum()
    }

    /// Slide a window of `width` degrees (inclusive ends) from `left_most`
    /// until its right edge reaches `right_most`, keeping the best sum.
    ///
    /// Among equally scored positions the first one wins, and the reported
    /// direction is the middle of the non-empty span inside the window, so a
    /// lone spike ends up dead centre.
    pub fn best_window(&self, left_most: f64, right_most: f64, width: f64) -> Window {
        let w = width.round().max(0.0) as i64;
        let mut left = left_most.round() as i64;
        let right_most = (right_most.round() as i64).max(left + w);
        let mut right = left + w;

        let mut sum: f64 = (left..=right).map(|a| self.at(a)).sum();
        let mut best = Window { dir: self.plateau_centre(left, right, sum), score: sum };

        while right < right_most {
            let gain = self.at(right + 1) - self.at(left);
            sum += gain;
            left += 1;
            right += 1;

            if gain < EMPTY {
                continue;
            }
            if sum > best.score {
                best = Window { dir: self.plateau_centre(left, right, sum), score: sum };
            }
        }
        best
    }

    fn plateau_centre(&self, left: i64, right: i64, sum: f64) -> f64 {
        if sum < EMPTY {
            return (left + right) as f64 * 0.5;
        }
        let mut alpha = left;
        while self.at(alpha) < EMPTY && alpha < right {
            alpha += 1;
        }
        let mut beta = right;
        while self.at(beta) < EMPTY && beta > alpha {
            beta -= 1;
        }
        (alpha + beta) as f64 * 0.5
    }

    /// Non-empty buckets as `(bearing, score)`, bearings in (-180, 180].
    pub fn nonzero(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, s)| **s >= EMPTY)
            .map(|(i, s)| (normalize_angle_deg(i as f64), *s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_angles_wrap() {
        let mut ring = AttentionRing::new();
        ring.add(-1.0, 2.0);
        assert_eq!(ring.score(359.0), 2.0);
        assert_eq!(ring.score(-361.0), 2.0);
    }

    #[test]
    fn test_smear_is_flat() {
        let mut ring = AttentionRing::new();
        ring.smear(30.0, 5, 0.1, 10.0);
        assert!((ring.total() - 11.0).abs() < 1e-9);
        assert!((ring.score(25.0) - 1.0).abs() < 1e-12);
        assert!((ring.score(35.0) - 1.0).abs() < 1e-12);
        assert_eq!(ring.score(36.0), 0.0);
    }

    #[test]
    fn test_single_spike_centred() {
        let mut ring = AttentionRing::new();
        ring.add(-40.0, 5.0);
        let best = ring.best_window(-180.0, 180.0, 60.0);
        assert_eq!(best.score, 5.0);
        assert_eq!(best.dir, -40.0);
    }

    #[test]
    fn test_spike_in_initial_window_is_centred() {
        let mut ring = AttentionRing::new();
        ring.add(-175.0, 1.0);
        let best = ring.best_window(-180.0, 180.0, 60.0);
        assert_eq!(best.score, 1.0);
        assert_eq!(best.dir, -175.0);
    }

    #[test]
    fn test_plateau_centred_between_spikes() {
        let mut ring = AttentionRing::new();
        ring.add(10.0, 1.0);
        ring.add(50.0, 1.0);
        let best = ring.best_window(-90.0, 90.0, 60.0);
        assert_eq!(best.score, 2.0);
        assert_eq!(best.dir, 30.0);
    }

    #[test]
    fn test_prefers_heavier_cluster() {
        let mut ring = AttentionRing::new();
        ring.smear(-60.0, 5, 0.1, 10.0);
        ring.smear(70.0, 10, 0.05, 40.0);
        let best = ring.best_window(-150.0, 150.0, 60.0);
        assert!((best.score - 42.0).abs() < 1e-9);
        assert_eq!(best.dir, 70.0);
    }

    #[test]
    fn test_empty_ring_looks_ahead_of_range_start() {
        let ring = AttentionRing::new();
        let best = ring.best_window(-30.0, 30.0, 60.0);
        assert_eq!(best.score, 0.0);
        assert_eq!(best.dir, 0.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn brute_force(ring: &AttentionRing, left_most: i64, right_most: i64, w: i64) -> f64 {
        (left_most..=right_most - w)
            .map(|l| (l..=l + w).map(|a| ring.at(a)).sum::<f64>())
            .fold(0.0, f64::max)
    }

    proptest! {
        #[test]
        fn single_spike_is_found_and_centred(
            bearing in -200i64..200,
            value in 0.01f64..1000.0,
            width in prop::sample::select(vec![60.0, 120.0, 180.0]),
        ) {
            let mut ring = AttentionRing::new();
            ring.add(bearing as f64, value);
            let half = width / 2.0;
            let best = ring.best_window(-270.0 - half, 270.0 + half, width);
            prop_assert!((best.score - value).abs() < 1e-9);
            prop_assert_eq!(normalize_angle_deg(best.dir), normalize_angle_deg(bearing as f64));
        }

        #[test]
        fn window_matches_brute_force(
            spikes in prop::collection::vec((-180i64..180, 1u8..20), 0..12),
            width in prop::sample::select(vec![60i64, 120, 180]),
        ) {
            let mut ring = AttentionRing::new();
            for (b, v) in &spikes {
                ring.add(*b as f64, f64::from(*v));
            }
            let (lm, rm) = (-150 - width / 2, 150 + width / 2);
            let best = ring.best_window(lm as f64, rm as f64, width as f64);
            prop_assert!((best.score - brute_force(&ring, lm, rm, width)).abs() < 1e-9);
        }
    }
}
