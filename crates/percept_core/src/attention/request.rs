//! Per-entity attention requests
//!
//! Every cycle the info-gathering pass raises refresh rates ("eva": see the
//! entity at least every `eva` cycles), then [`RequestSet::evaluate`] turns
//! them into scores from age, confidence and distance. Forced and
//! high-priority requests get their score replaced by a large multiple so a
//! single one outweighs all normal requests together.

use serde::{Deserialize, Serialize};

use crate::config::AttentionConfig;
use crate::entity::{EntityId, ENTITY_COUNT};
use crate::state::{WorldBelief, NEVER_OBSERVED_AGE};

use super::context::Prediction;

/// Score multiple of a high-priority request.
pub const HIGH_PRIORITY_MULTIPLIER: f64 = ENTITY_COUNT as f64 * 0.5;
/// Score multiple of a forced player: outweighs every high-priority request.
pub const FORCED_PLAYER_MULTIPLIER: f64 = ENTITY_COUNT as f64 * HIGH_PRIORITY_MULTIPLIER;
/// Score multiple of a forced ball: outweighs every forced player.
pub const FORCED_BALL_MULTIPLIER: f64 = ENTITY_COUNT as f64 * FORCED_PLAYER_MULTIPLIER;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    #[default]
    Normal,
    High,
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttentionRequest {
    pub entity: EntityId,
    pub valid: bool,
    /// Distance between next-cycle self and entity positions.
    pub predicted_distance: f64,
    pub cycle_age: u32,
    /// Requested refresh rate in cycles; infinite when nothing asked for it.
    pub eva: f64,
    pub confidence: f64,
    pub priority: Priority,
    pub score: f64,
}

impl AttentionRequest {
    fn new(entity: EntityId) -> Self {
        Self {
            entity,
            valid: false,
            predicted_distance: f64::INFINITY,
            cycle_age: NEVER_OBSERVED_AGE,
            eva: f64::INFINITY,
            confidence: 0.0,
            priority: Priority::Normal,
            score: 0.0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.entity);
    }

    pub fn is_raised(&self) -> bool {
        self.eva.is_finite()
    }

    /// A sight arriving next cycle would meet or miss the requested rate.
    pub fn is_due(&self) -> bool {
        self.is_raised() && f64::from(self.cycle_age) + 1.0 >= self.eva
    }

    /// Nearby entities weigh more: `1 + gain / (1 + dist / scale)`, in (1, 1 + gain].
    pub fn proximity(&self, cfg: &AttentionConfig) -> f64 {
        let dist = if self.predicted_distance.is_finite() { self.predicted_distance } else { 0.0 };
        1.0 + cfg.proximity_gain / (1.0 + dist.max(0.0) / cfg.proximity_scale)
    }

    /// Base score before priority overrides. Zero for unraised requests;
    /// a small residual for raised requests that are not due yet.
    pub fn urgency(&self, cfg: &AttentionConfig) -> f64 {
        if !self.is_raised() {
            return 0.0;
        }
        let ratio = (f64::from(self.cycle_age) + 1.0) / self.eva.max(f64::EPSILON);
        let prox = self.proximity(cfg);
        if self.is_due() {
            prox * ratio.min(cfg.overdue_cap)
        } else {
            cfg.residual_weight * ratio * prox
        }
    }

    pub fn is_forced(&self) -> bool {
        self.priority == Priority::Forced
    }
}

/// Requests for the ball and every player, indexed by [`EntityId::index`].
#[derive(Debug, Clone)]
pub struct RequestSet {
    requests: Vec<AttentionRequest>,
    /// Latched until the next sight.
    forced: [bool; ENTITY_COUNT],
    high: [bool; ENTITY_COUNT],
    /// A forgotten entity was raised since the last sight.
    searching: bool,
}

impl Default for RequestSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSet {
    pub fn new() -> Self {
        Self {
            requests: EntityId::all().map(AttentionRequest::new).collect(),
            forced: [false; ENTITY_COUNT],
            high: [false; ENTITY_COUNT],
            searching: false,
        }
    }

    /// A new sight arrived: forced latches and the searching flag expire.
    pub fn reset_for_sight(&mut self) {
        self.forced = [false; ENTITY_COUNT];
        self.searching = false;
    }

    pub fn begin_cycle(&mut self) {
        for req in &mut self.requests {
            req.reset();
        }
        self.high = [false; ENTITY_COUNT];
    }

    /// Keep the smaller of the current and the requested refresh rate.
    pub fn raise(&mut self, id: EntityId, eva: f64) {
        if let Some(req) = id.slot().and_then(|i| self.requests.get_mut(i)) {
            req.eva = req.eva.min(eva);
        }
    }

    pub fn force(&mut self, id: EntityId) {
        if let Some(flag) = id.slot().and_then(|i| self.forced.get_mut(i)) {
            *flag = true;
        }
        if !id.is_ball() {
            self.mark_high(id);
        }
    }

    pub fn mark_high(&mut self, id: EntityId) {
        if let Some(flag) = id.slot().and_then(|i| self.high.get_mut(i)) {
            *flag = true;
        }
    }

    /// Lost entity that must be found: the ball is forced, a player goes high.
    pub fn raise_forgotten(&mut self, id: EntityId) {
        self.searching = true;
        if id.is_ball() {
            self.force(id);
        } else {
            self.mark_high(id);
        }
    }

    pub fn is_forced(&self, id: EntityId) -> bool {
        id.slot().and_then(|i| self.forced.get(i)).copied().unwrap_or(false)
    }

    pub fn is_high(&self, id: EntityId) -> bool {
        id.slot().and_then(|i| self.high.get(i)).copied().unwrap_or(false)
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn get(&self, id: EntityId) -> Option<&AttentionRequest> {
        id.slot().and_then(|i| self.requests.get(i))
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut AttentionRequest> {
        id.slot().and_then(|i| self.requests.get_mut(i))
    }

    pub fn ball(&self) -> &AttentionRequest {
        &self.requests[EntityId::Ball.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttentionRequest> {
        self.requests.iter()
    }

    /// Fill validity, distance, age and base score for every request.
    ///
    /// Stale requests (confidence under the known threshold) that are due get
    /// the forced latch; stale players that are not due yet go high priority.
    /// With `penalty_shot` only the ball and the opponent goalie are valid.
    pub fn evaluate(
        &mut self,
        world: &WorldBelief,
        pre: &Prediction,
        cfg: &AttentionConfig,
        penalty_shot: bool,
    ) {
        let eps = world.known_threshold();
        let me = world.me().id();
        let their_goalie = world.their_goalie().map(EntityId::Opponent);

        for req in &mut self.requests {
            let id = req.entity;
            if id == me || (penalty_shot && !id.is_ball() && Some(id) != their_goalie) {
                req.valid = false;
                continue;
            }

            let conf = world.confidence(id);
            req.valid = conf > eps || !world.hypotheses(id).is_empty();
            if !req.valid {
                continue;
            }

            let target =
                if id.is_ball() { Some(pre.ball_pos) } else { world.expected_position(id) };
            req.predicted_distance =
                target.map_or(f64::INFINITY, |p| (p - pre.self_pos).norm());
            req.cycle_age = world.age(id);
            req.confidence = conf;
            req.score = req.urgency(cfg);

            let stale = conf <= eps;
            if stale && req.is_due() {
                self.forced[id.index()] = true;
            } else if stale && !id.is_ball() {
                self.high[id.index()] = true;
            }
        }

        for req in &mut self.requests {
            let idx = req.entity.index();
            req.priority = if self.forced[idx] {
                Priority::Forced
            } else if self.high[idx] {
                Priority::High
            } else {
                Priority::Normal
            };
        }
    }

    /// Replace the score of valid forced and high-priority requests.
    pub fn apply_priority_scores(&mut self, cfg: &AttentionConfig) {
        for req in self.requests.iter_mut().filter(|r| r.valid) {
            let multiplier = match (req.priority, req.entity.is_ball()) {
                (Priority::Normal, _) => continue,
                (Priority::High, _) => HIGH_PRIORITY_MULTIPLIER,
                (Priority::Forced, false) => FORCED_PLAYER_MULTIPLIER,
                (Priority::Forced, true) => FORCED_BALL_MULTIPLIER,
            };
            req.score = req.proximity(cfg) * multiplier;
        }
    }

    /// Forced requests that are currently valid.
    pub fn forced_requests(&self) -> impl Iterator<Item = &AttentionRequest> {
        self.requests.iter().filter(|r| r.valid && r.is_forced())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeliefConfig;
    use crate::geom::Position;
    use crate::observation::{ObservationBatch, Sighting};

    fn raised(age: u32, eva: f64, dist: f64) -> AttentionRequest {
        AttentionRequest {
            cycle_age: age,
            eva,
            predicted_distance: dist,
            valid: true,
            ..AttentionRequest::new(EntityId::Opponent(1))
        }
    }

    #[test]
    fn test_unraised_request_scores_zero() {
        let cfg = AttentionConfig::default();
        let req = AttentionRequest::new(EntityId::Ball);
        assert!(!req.is_due());
        assert_eq!(req.urgency(&cfg), 0.0);
    }

    #[test]
    fn test_not_due_keeps_residual_score() {
        let cfg = AttentionConfig::default();
        let req = raised(1, 10.0, 5.0);
        assert!(!req.is_due());
        let s = req.urgency(&cfg);
        assert!(s > 0.0);
        assert!(s < raised(9, 10.0, 5.0).urgency(&cfg));
    }

    #[test]
    fn test_overdue_is_capped() {
        let cfg = AttentionConfig::default();
        let a = raised(100, 2.0, 5.0).urgency(&cfg);
        let b = raised(1000, 2.0, 5.0).urgency(&cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn test_closer_is_more_urgent() {
        let cfg = AttentionConfig::default();
        assert!(raised(5, 5.0, 2.0).urgency(&cfg) > raised(5, 5.0, 40.0).urgency(&cfg));
    }

    #[test]
    fn test_raise_keeps_minimum() {
        let mut set = RequestSet::new();
        set.raise(EntityId::Teammate(4), 10.0);
        set.raise(EntityId::Teammate(4), 3.0);
        set.raise(EntityId::Teammate(4), 26.0);
        assert_eq!(set.get(EntityId::Teammate(4)).unwrap().eva, 3.0);
    }

    #[test]
    fn test_out_of_range_ids_touch_nothing() {
        let mut set = RequestSet::new();
        set.raise(EntityId::Teammate(15), 1.0);
        set.force(EntityId::Opponent(0));
        assert!(!set.get(EntityId::Opponent(4)).unwrap().is_raised());
        assert!(!set.is_forced(EntityId::Teammate(11)));
        assert!(!set.is_high(EntityId::Teammate(11)));
        assert!(set.get(EntityId::Teammate(15)).is_none());
    }

    #[test]
    fn test_forced_latch_survives_cycle_not_sight() {
        let mut set = RequestSet::new();
        set.force(EntityId::Opponent(2));
        set.raise_forgotten(EntityId::Ball);
        set.begin_cycle();
        assert!(set.is_forced(EntityId::Opponent(2)));
        assert!(set.is_forced(EntityId::Ball));
        assert!(!set.is_high(EntityId::Opponent(2)));
        assert!(set.is_searching());

        set.reset_for_sight();
        assert!(!set.is_forced(EntityId::Ball));
        assert!(!set.is_searching());
    }

    #[test]
    fn test_forced_dominates_every_other_score() {
        let cfg = AttentionConfig::default();
        let bcfg = BeliefConfig::default();
        let mut world = WorldBelief::new(1, &bcfg).unwrap();
        let mut batch = ObservationBatch::new(1, true)
            .with_sighting(Sighting::position(EntityId::Ball, Position::new(45.0, 0.0), 0, 1.0));
        for u in 2..=11 {
            batch = batch.with_sighting(Sighting::position(
                EntityId::Teammate(u),
                Position::new(1.0, f64::from(u)),
                30,
                0.9,
            ));
        }
        world.advance_cycle(Some(&batch), &bcfg);

        let pre = Prediction::default();
        let mut set = RequestSet::new();
        set.raise(EntityId::Ball, 20.0);
        for u in 2..=11 {
            set.raise(EntityId::Teammate(u), 1.0);
        }
        set.mark_high(EntityId::Teammate(3));
        set.force(EntityId::Ball);
        set.evaluate(&world, &pre, &cfg, false);
        set.apply_priority_scores(&cfg);

        let forced = set.ball().score;
        let next = set
            .iter()
            .filter(|r| !r.is_forced())
            .map(|r| r.score)
            .fold(0.0, f64::max);
        assert!(next > 0.0);
        assert!(forced >= HIGH_PRIORITY_MULTIPLIER * next);
    }

    #[test]
    fn test_stale_and_due_escalates_to_forced() {
        let cfg = AttentionConfig::default();
        let bcfg = BeliefConfig { player_conf_decay: 0.0, ..BeliefConfig::default() };
        let mut world = WorldBelief::new(1, &bcfg).unwrap();
        let batch = ObservationBatch::new(1, true).with_hypotheses(
            EntityId::Opponent(5),
            vec![crate::observation::Hypothesis { pos: Position::new(3.0, 3.0), probability: 1.0 }],
        );
        world.advance_cycle(Some(&batch), &bcfg);

        let mut set = RequestSet::new();
        set.raise(EntityId::Opponent(5), 2.0);
        set.evaluate(&world, &Prediction::default(), &cfg, false);
        let req = set.get(EntityId::Opponent(5)).unwrap();
        assert!(req.valid);
        assert_eq!(req.priority, Priority::Forced);
    }

    #[test]
    fn test_penalty_shot_only_ball_and_goalie() {
        let cfg = AttentionConfig::default();
        let bcfg = BeliefConfig::default();
        let mut world = WorldBelief::new(9, &bcfg).unwrap();
        world.set_goalies(Some(1), Some(1));
        let batch = ObservationBatch::new(1, true)
            .with_sighting(Sighting::position(EntityId::Opponent(1), Position::new(50.0, 0.0), 0, 1.0))
            .with_sighting(Sighting::position(EntityId::Opponent(4), Position::new(40.0, 0.0), 0, 1.0));
        world.advance_cycle(Some(&batch), &bcfg);

        let mut set = RequestSet::new();
        set.evaluate(&world, &Prediction::default(), &cfg, true);
        assert!(set.get(EntityId::Opponent(1)).unwrap().valid);
        assert!(!set.get(EntityId::Opponent(4)).unwrap().valid);
    }
}
