//! Bounded-horizon motion predictor
//!
//! Same caching idea as a ball flight cache: compute the trajectory once,
//! reuse it until the seed state changes. Here the horizon is counted in
//! cycles and the cache is extended lazily, one step at a time.
//!
//! Recurrence (per cycle):
//! - `pos[i] = pos[i-1] + vel[i-1]`
//! - `vel[i] = vel[i-1] * decay`

use crate::geom::{Position, Velocity};

/// Furthest cached step. Requests beyond it return the step-`MAX_STEP` answer.
pub const MAX_STEP: usize = 50;

#[derive(Debug, Clone)]
pub struct MotionPredictor {
    decay: f64,
    pos: [Position; MAX_STEP + 1],
    vel: [Velocity; MAX_STEP + 1],
    /// Highest valid index in `pos`/`vel`.
    step: usize,
}

impl MotionPredictor {
    pub fn new(decay: f64, pos: Position, vel: Velocity) -> Self {
        let mut p = Self {
            decay,
            pos: [Position::zeros(); MAX_STEP + 1],
            vel: [Velocity::zeros(); MAX_STEP + 1],
            step: 0,
        };
        p.reset(pos, vel);
        p
    }

    /// Reseed step 0. Anything cached beyond it is discarded.
    #[inline]
    pub fn reset(&mut self, pos: Position, vel: Velocity) {
        self.pos[0] = pos;
        self.vel[0] = vel;
        self.step = 0;
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Highest step computed so far.
    pub fn cached_step(&self) -> usize {
        self.step
    }

    pub fn predicted_pos(&mut self, step: usize) -> Position {
        let step = step.min(MAX_STEP);
        self.predict_to(step);
        self.pos[step]
    }

    pub fn predicted_vel(&mut self, step: usize) -> Velocity {
        let step = step.min(MAX_STEP);
        self.predict_to(step);
        self.vel[step]
    }

    fn predict_to(&mut self, step: usize) {
        if step <= self.step {
            return;
        }
        for i in self.step + 1..=step {
            self.pos[i] = self.pos[i - 1] + self.vel[i - 1];
            self.vel[i] = self.vel[i - 1] * self.decay;
        }
        self.step = step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictor() -> MotionPredictor {
        MotionPredictor::new(0.94, Position::new(0.0, 0.0), Velocity::new(2.0, -1.0))
    }

    #[test]
    fn test_step_zero_is_seed() {
        let mut p = predictor();
        assert_eq!(p.predicted_pos(0), Position::new(0.0, 0.0));
        assert_eq!(p.predicted_vel(0), Velocity::new(2.0, -1.0));
        assert_eq!(p.cached_step(), 0);
    }

    #[test]
    fn test_recurrence_exact() {
        let mut p = predictor();
        let p3 = p.predicted_pos(3);

        let mut pos = Position::new(0.0, 0.0);
        let mut vel = Velocity::new(2.0, -1.0);
        for _ in 0..3 {
            pos += vel;
            vel *= 0.94;
        }
        assert_eq!(p3, pos);
        assert_eq!(p.predicted_vel(3), vel);
    }

    #[test]
    fn test_cache_grows_monotonically() {
        let mut p = predictor();
        p.predicted_pos(10);
        assert_eq!(p.cached_step(), 10);
        p.predicted_pos(4);
        assert_eq!(p.cached_step(), 10);
        p.predicted_vel(12);
        assert_eq!(p.cached_step(), 12);
    }

    #[test]
    fn test_clamped_at_max_step() {
        let mut p = predictor();
        let at_max = p.predicted_pos(MAX_STEP);
        assert_eq!(p.predicted_pos(MAX_STEP + 30), at_max);
        assert_eq!(p.cached_step(), MAX_STEP);
    }

    #[test]
    fn test_reset_discards_cache() {
        let mut p = predictor();
        p.predicted_pos(20);
        p.reset(Position::new(5.0, 5.0), Velocity::new(-1.0, 0.0));
        assert_eq!(p.cached_step(), 0);
        assert_eq!(p.predicted_pos(1), Position::new(4.0, 5.0));
    }
}
