//! Per-entity belief state
//!
//! [`StaticState`] is the position-only belief (landmarks). [`MobileState`]
//! embeds one and adds velocity, physical decay and the motion predictor.
//! Consumers that only need "where is it" go through [`PositionBelief`].

use std::cell::RefCell;

use crate::geom::{Position, Velocity};

use super::predictor::MotionPredictor;
use super::tracked::TrackedValue;

/// Error radius of a position that was never observed.
const UNKNOWN_EPS: f64 = 10000.0;

/// Read access shared by static and mobile entities.
pub trait PositionBelief {
    fn pos(&self) -> Position;
    fn pos_age(&self) -> u32;
    fn pos_conf(&self) -> f64;

    /// Where the entity is expected `step` cycles from now.
    fn predicted_pos(&self, step: usize) -> Position;

    fn is_known(&self, threshold: f64) -> bool {
        self.pos_conf() > threshold
    }
}

#[derive(Debug, Clone)]
pub struct StaticState {
    pos: TrackedValue<Position>,
    pos_eps: f64,
}

impl Default for StaticState {
    fn default() -> Self {
        Self {
            pos: TrackedValue::unobserved(Position::new(UNKNOWN_EPS, UNKNOWN_EPS)),
            pos_eps: UNKNOWN_EPS,
        }
    }
}

impl StaticState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_pos(&mut self, pos: Position, age: u32, confidence: f64) {
        self.pos.update(pos, age, confidence);
    }

    pub fn auto_update(&mut self, age_increment: u32, confidence_decay: f64) {
        self.pos.auto_update(age_increment, confidence_decay);
    }

    /// Radius of the position error circle. Growing it while unobserved is the
    /// caller's job.
    pub fn pos_eps(&self) -> f64 {
        self.pos_eps
    }

    pub fn set_pos_eps(&mut self, eps: f64) {
        self.pos_eps = eps;
    }

}

impl PositionBelief for StaticState {
    fn pos(&self) -> Position {
        *self.pos.value()
    }

    fn pos_age(&self) -> u32 {
        self.pos.age()
    }

    fn pos_conf(&self) -> f64 {
        self.pos.confidence()
    }

    fn predicted_pos(&self, _step: usize) -> Position {
        *self.pos.value()
    }
}

/// A moving entity (ball or player).
///
/// Preconditions (not checked): `0 < decay < 1`, `effective_max_speed >= 0`.
/// The predictor lives behind a `RefCell` so that read-only callers can
/// extend the cached trajectory; every position or velocity update reseeds it.
#[derive(Debug, Clone)]
pub struct MobileState {
    base: StaticState,
    vel: TrackedValue<Velocity>,
    vel_eps: f64,
    decay: f64,
    effective_max_speed: f64,
    guessed_cycles: u32,
    predictor: RefCell<MotionPredictor>,
}

impl MobileState {
    pub fn new(decay: f64, effective_max_speed: f64) -> Self {
        let base = StaticState::default();
        let vel = TrackedValue::unobserved(Velocity::zeros());
        let predictor = RefCell::new(MotionPredictor::new(decay, base.pos(), *vel.value()));
        Self {
            base,
            vel,
            vel_eps: UNKNOWN_EPS,
            decay,
            effective_max_speed,
            guessed_cycles: 0,
            predictor,
        }
    }

    pub fn update_pos(&mut self, pos: Position, age: u32, confidence: f64) {
        self.base.update_pos(pos, age, confidence);
        self.reset_predictor();
    }

    pub fn update_vel(&mut self, vel: Velocity, age: u32, confidence: f64) {
        self.vel.update(vel, age, confidence);
        self.reset_predictor();
    }

    /// Age and decay position and velocity together. The predictor keeps its
    /// cache: aging does not change the (pos, vel) pair.
    pub fn auto_update(&mut self, age_increment: u32, confidence_decay: f64) {
        self.auto_update_pos(age_increment, confidence_decay);
        self.auto_update_vel(age_increment, confidence_decay);
    }

    pub fn auto_update_pos(&mut self, age_increment: u32, confidence_decay: f64) {
        self.base.auto_update(age_increment, confidence_decay);
    }

    pub fn auto_update_vel(&mut self, age_increment: u32, confidence_decay: f64) {
        self.vel.auto_update(age_increment, confidence_decay);
    }

    pub fn vel(&self) -> Velocity {
        *self.vel.value()
    }

    pub fn vel_age(&self) -> u32 {
        self.vel.age()
    }

    pub fn vel_conf(&self) -> f64 {
        self.vel.confidence()
    }

    pub fn vel_eps(&self) -> f64 {
        self.vel_eps
    }

    pub fn set_vel_eps(&mut self, eps: f64) {
        self.vel_eps = eps;
    }

    pub fn pos_eps(&self) -> f64 {
        self.base.pos_eps()
    }

    pub fn set_pos_eps(&mut self, eps: f64) {
        self.base.set_pos_eps(eps);
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Changing the decay invalidates the cached trajectory.
    pub fn set_decay(&mut self, decay: f64) {
        self.decay = decay;
        self.predictor = RefCell::new(MotionPredictor::new(decay, self.pos(), self.vel()));
    }

    pub fn effective_max_speed(&self) -> f64 {
        self.effective_max_speed
    }

    pub fn set_effective_max_speed(&mut self, speed: f64) {
        self.effective_max_speed = speed;
    }

    /// Trailing cycles for which this state is a guess. Only the upstream
    /// estimator writes it.
    pub fn guessed_cycles(&self) -> u32 {
        self.guessed_cycles
    }

    pub fn set_guessed_cycles(&mut self, cycles: u32) {
        self.guessed_cycles = cycles;
    }

    pub fn predicted_vel(&self, step: usize) -> Velocity {
        self.predictor.borrow_mut().predicted_vel(step)
    }

    /// Resting point under geometric decay: `pos + vel / (1 - decay)`.
    pub fn final_pos(&self) -> Position {
        self.pos() + self.vel() / (1.0 - self.decay)
    }

    /// Highest step the predictor has computed (diagnostics and tests).
    pub fn predicted_steps(&self) -> usize {
        self.predictor.borrow().cached_step()
    }

    fn reset_predictor(&mut self) {
        let (pos, vel) = (self.pos(), self.vel());
        self.predictor.get_mut().reset(pos, vel);
    }
}

impl PositionBelief for MobileState {
    fn pos(&self) -> Position {
        self.base.pos()
    }

    fn pos_age(&self) -> u32 {
        self.base.pos_age()
    }

    fn pos_conf(&self) -> f64 {
        self.base.pos_conf()
    }

    fn predicted_pos(&self, step: usize) -> Position {
        self.predictor.borrow_mut().predicted_pos(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::predictor::MAX_STEP;

    fn ball() -> MobileState {
        let mut b = MobileState::new(0.94, 3.0);
        b.update_pos(Position::new(10.0, 0.0), 0, 1.0);
        b.update_vel(Velocity::new(1.0, 0.5), 0, 1.0);
        b
    }

    #[test]
    fn test_static_state_never_moves() {
        let mut flag = StaticState::new();
        flag.update_pos(Position::new(52.5, 34.0), 0, 1.0);
        assert_eq!(flag.predicted_pos(10), Position::new(52.5, 34.0));
        flag.auto_update(1, 0.9);
        assert_eq!(flag.pos_age(), 1);
    }

    #[test]
    fn test_predicted_pos_zero_is_current() {
        let b = ball();
        assert_eq!(b.predicted_pos(0), b.pos());
    }

    #[test]
    fn test_update_resets_predictor() {
        let mut b = ball();
        let _ = b.predicted_pos(15);
        assert_eq!(b.predicted_steps(), 15);

        b.update_vel(Velocity::new(-2.0, 0.0), 0, 1.0);
        assert_eq!(b.predicted_steps(), 0);
        assert_eq!(b.predicted_pos(1), Position::new(8.0, 0.0));

        b.update_pos(Position::new(0.0, 0.0), 1, 0.8);
        assert_eq!(b.predicted_pos(1), Position::new(-2.0, 0.0));
    }

    #[test]
    fn test_auto_update_keeps_cache_and_decays_both() {
        let mut b = ball();
        let p5 = b.predicted_pos(5);
        b.auto_update(1, 0.5);
        assert_eq!(b.predicted_steps(), 5);
        assert_eq!(b.predicted_pos(5), p5);
        assert_eq!(b.pos_age(), 1);
        assert_eq!(b.vel_age(), 1);
        assert!((b.pos_conf() - 0.5).abs() < 1e-12);
        assert!((b.vel_conf() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pos_and_vel_age_independently() {
        let mut b = ball();
        b.auto_update_vel(2, 0.5);
        assert_eq!(b.pos_age(), 0);
        assert_eq!(b.vel_age(), 2);
        b.auto_update_pos(1, 0.9);
        assert_eq!(b.pos_age(), 1);
        assert!((b.pos_conf() - 0.9).abs() < 1e-12);
        assert!((b.vel_conf() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_final_pos_closed_form_matches_long_horizon() {
        let b = ball();
        let final_pos = b.final_pos();
        let far = b.predicted_pos(MAX_STEP);
        // 0.94^50 ~ 0.045 of the remaining travel is still ahead
        assert!((final_pos - far).norm() < 1.0);
        assert!((final_pos.x - (10.0 + 1.0 / 0.06)).abs() < 1e-9);
    }

    #[test]
    fn test_set_decay_rebuilds_predictor() {
        let mut b = ball();
        let _ = b.predicted_pos(10);
        b.set_decay(0.5);
        assert_eq!(b.predicted_steps(), 0);
        assert!((b.predicted_vel(1).x - 0.5).abs() < 1e-12);
    }
}
