//! Aging belief cell.

use serde::{Deserialize, Serialize};

/// Age of a value that has never been observed.
pub const NEVER_OBSERVED_AGE: u32 = 9999;

/// A value with the number of cycles since its last direct observation and
/// a confidence in [0, 1].
///
/// `age` and `confidence` move together: [`TrackedValue::update`] resets both,
/// [`TrackedValue::auto_update`] ages and decays both. Confidence decays
/// multiplicatively and never reaches exactly zero; compare it against a small
/// threshold instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedValue<T> {
    value: T,
    age: u32,
    confidence: f64,
}

impl<T: Default> Default for TrackedValue<T> {
    fn default() -> Self {
        Self { value: T::default(), age: NEVER_OBSERVED_AGE, confidence: 0.0 }
    }
}

impl<T> TrackedValue<T> {
    /// Starts out as "never observed".
    pub fn unobserved(value: T) -> Self {
        Self { value, age: NEVER_OBSERVED_AGE, confidence: 0.0 }
    }

    /// Fresh observation. `age` is the reported delay, `confidence` the
    /// reported reliability; both come from the decoder and are not checked.
    #[inline]
    pub fn update(&mut self, value: T, age: u32, confidence: f64) {
        self.value = value;
        self.age = age;
        self.confidence = confidence;
    }

    /// One cycle (or `age_increment` cycles) without a refresh.
    #[inline]
    pub fn auto_update(&mut self, age_increment: u32, confidence_decay: f64) {
        self.age = self.age.saturating_add(age_increment);
        self.confidence *= confidence_decay;
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[inline]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[inline]
    pub fn is_known(&self, threshold: f64) -> bool {
        self.confidence > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_never_observed() {
        let v: TrackedValue<f64> = TrackedValue::default();
        assert_eq!(v.age(), NEVER_OBSERVED_AGE);
        assert_eq!(v.confidence(), 0.0);
        assert!(!v.is_known(1e-6));
    }

    #[test]
    fn test_update_resets_age_and_confidence() {
        let mut v = TrackedValue::unobserved(0.0_f64);
        v.auto_update(3, 0.5);
        v.update(4.0, 1, 0.9);
        assert_eq!(*v.value(), 4.0);
        assert_eq!(v.age(), 1);
        assert!((v.confidence() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_decay_monotonic_over_n_cycles() {
        let mut v = TrackedValue::unobserved(0u8);
        v.update(1, 0, 1.0);
        let mut prev = v.confidence();
        for _ in 0..25 {
            v.auto_update(1, 0.95);
            assert!(v.confidence() <= prev);
            assert!(v.confidence() > 0.0);
            prev = v.confidence();
        }
        assert_eq!(v.age(), 25);
    }

    #[test]
    fn test_auto_update_saturates_age() {
        let mut v = TrackedValue::unobserved(0u8);
        v.auto_update(u32::MAX, 1.0);
        assert_eq!(v.age(), u32::MAX);
    }
}
