//! World belief: ball, both teams and the agent itself
//!
//! [`WorldBelief::advance_cycle`] is the only place entity state changes:
//! fresh sightings are applied first, then everything that was not refreshed
//! is aged and decayed. Everything else here is read access.

use tracing::{debug, trace};

use crate::config::BeliefConfig;
use crate::entity::{EntityId, ENTITY_COUNT, TEAM_SIZE};
use crate::error::Result;
use crate::geom::{normalize_angle_deg, Position, Velocity};
use crate::observation::{Hypothesis, Measurement, ObservationBatch, SelfReport};
use crate::sight::SensorWidth;

use super::entity::{MobileState, PositionBelief};
use super::tracked::NEVER_OBSERVED_AGE;

/// Largest body turn in one cycle when standing still (degrees).
const DEFAULT_MAX_TURN: f64 = 180.0;

/// The agent's own body.
#[derive(Debug, Clone)]
pub struct SelfState {
    mobile: MobileState,
    unum: u8,
    /// Global (degrees)
    body_dir: f64,
    /// Relative to body (degrees)
    neck_dir: f64,
    view_width: SensorWidth,
    max_turn_angle: f64,
    /// Body turn already committed by the behavior layer this cycle.
    queued_turn: f64,
    is_goalie: bool,
    is_idling: bool,
}

impl SelfState {
    fn new(unum: u8, cfg: &BeliefConfig) -> Self {
        Self {
            mobile: MobileState::new(cfg.player_decay, cfg.player_speed_max),
            unum,
            body_dir: 0.0,
            neck_dir: 0.0,
            view_width: SensorWidth::default(),
            max_turn_angle: DEFAULT_MAX_TURN,
            queued_turn: 0.0,
            is_goalie: false,
            is_idling: false,
        }
    }

    fn apply(&mut self, report: &SelfReport) {
        self.mobile.update_pos(report.pos, report.age, report.confidence);
        self.mobile.update_vel(report.vel, report.age, report.confidence);
        self.body_dir = normalize_angle_deg(report.body_dir);
        self.neck_dir = report.neck_dir;
        self.view_width = report.view_width;
    }

    pub fn unum(&self) -> u8 {
        self.unum
    }

    pub fn id(&self) -> EntityId {
        EntityId::Teammate(self.unum)
    }

    pub fn mobile(&self) -> &MobileState {
        &self.mobile
    }

    pub fn pos(&self) -> Position {
        self.mobile.pos()
    }

    pub fn vel(&self) -> Velocity {
        self.mobile.vel()
    }

    /// Self-localization confidence.
    pub fn pos_conf(&self) -> f64 {
        self.mobile.pos_conf()
    }

    pub fn body_dir(&self) -> f64 {
        self.body_dir
    }

    pub fn neck_dir(&self) -> f64 {
        self.neck_dir
    }

    pub fn neck_global_dir(&self) -> f64 {
        normalize_angle_deg(self.body_dir + self.neck_dir)
    }

    /// Body direction after the queued turn executes.
    pub fn predicted_body_dir(&self) -> f64 {
        normalize_angle_deg(self.body_dir + self.queued_turn)
    }

    pub fn queued_turn(&self) -> f64 {
        self.queued_turn
    }

    pub fn set_queued_turn(&mut self, turn: f64) {
        self.queued_turn = turn;
    }

    pub fn view_width(&self) -> SensorWidth {
        self.view_width
    }

    pub fn max_turn_angle(&self) -> f64 {
        self.max_turn_angle
    }

    /// Depends on current speed; set by whoever models the body.
    pub fn set_max_turn_angle(&mut self, angle: f64) {
        self.max_turn_angle = angle.max(0.0);
    }

    pub fn is_goalie(&self) -> bool {
        self.is_goalie
    }

    pub fn set_goalie(&mut self, goalie: bool) {
        self.is_goalie = goalie;
    }

    /// Waiting on stamina or a referee hold: no voluntary body motion.
    pub fn is_idling(&self) -> bool {
        self.is_idling
    }

    pub fn set_idling(&mut self, idling: bool) {
        self.is_idling = idling;
    }
}

/// What one [`WorldBelief::advance_cycle`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdvanceSummary {
    pub cycle: u64,
    pub new_sight: bool,
    /// Entities (ball and players, self excluded) refreshed by a sighting.
    pub refreshed: usize,
    pub self_refreshed: bool,
}

#[derive(Debug, Clone)]
pub struct WorldBelief {
    cycle: u64,
    ball: MobileState,
    teammates: Vec<MobileState>,
    opponents: Vec<MobileState>,
    me: SelfState,
    our_goalie: Option<u8>,
    their_goalie: Option<u8>,
    hypotheses: Vec<Vec<Hypothesis>>,
    /// Consecutive cycles the ball was seen with zero delay.
    ball_fresh_streak: u32,
    known_threshold: f64,
}

impl WorldBelief {
    pub fn new(unum: u8, cfg: &BeliefConfig) -> Result<Self> {
        let me = EntityId::teammate(unum)?;
        let players = |cfg: &BeliefConfig| {
            (0..TEAM_SIZE)
                .map(|_| MobileState::new(cfg.player_decay, cfg.player_speed_max))
                .collect::<Vec<_>>()
        };
        debug!(unum, ?me, "world belief created");
        Ok(Self {
            cycle: 0,
            ball: MobileState::new(cfg.ball_decay, cfg.ball_speed_max),
            teammates: players(cfg),
            opponents: players(cfg),
            me: SelfState::new(unum, cfg),
            our_goalie: None,
            their_goalie: None,
            hypotheses: vec![Vec::new(); ENTITY_COUNT],
            ball_fresh_streak: 0,
            known_threshold: cfg.known_threshold,
        })
    }

    /// Apply one cycle of observations (or none) and decay the rest.
    pub fn advance_cycle(
        &mut self,
        batch: Option<&ObservationBatch>,
        cfg: &BeliefConfig,
    ) -> AdvanceSummary {
        let mut pos_refreshed = [false; ENTITY_COUNT];
        let mut vel_refreshed = [false; ENTITY_COUNT];
        let mut self_refreshed = false;
        let mut new_sight = false;
        let my_id = self.me.id();

        match batch {
            Some(batch) => {
                self.cycle = batch.cycle;
                new_sight = batch.new_sight;

                if let Some(report) = &batch.self_report {
                    self.me.apply(report);
                    self_refreshed = true;
                }

                for s in &batch.sightings {
                    if s.entity == my_id {
                        trace!(entity = ?s.entity, "sighting of self ignored");
                        continue;
                    }
                    let Some(state) = self.mobile_mut(s.entity) else {
                        continue;
                    };
                    let idx = s.entity.index();
                    match s.measurement {
                        Measurement::Position(p) => {
                            state.update_pos(p, s.age, s.confidence);
                            pos_refreshed[idx] = true;
                        }
                        Measurement::Velocity(v) => {
                            state.update_vel(v, s.age, s.confidence);
                            vel_refreshed[idx] = true;
                        }
                    }
                }

                // hypotheses only describe the cycle they were computed for
                for set in &mut self.hypotheses {
                    set.clear();
                }
                for (id, set) in &batch.hypotheses {
                    if let Some(slot) = id.slot().and_then(|i| self.hypotheses.get_mut(i)) {
                        slot.extend(set.iter().filter(|h| h.probability > 0.0).copied());
                    }
                }
            }
            None => {
                self.cycle += 1;
            }
        }

        // position and velocity age separately: a position-only sighting
        // leaves the velocity to decay
        for id in EntityId::all() {
            if id == my_id {
                continue;
            }
            let idx = id.index();
            let decay = if id.is_ball() { cfg.ball_conf_decay } else { cfg.player_conf_decay };
            if let Some(state) = self.mobile_mut(id) {
                if !pos_refreshed[idx] {
                    state.auto_update_pos(1, decay);
                }
                if !vel_refreshed[idx] {
                    state.auto_update_vel(1, decay);
                }
            }
        }
        if !self_refreshed {
            self.me.mobile.auto_update(1, cfg.self_conf_decay);
        }

        if pos_refreshed[EntityId::Ball.index()] && self.ball.pos_age() == 0 {
            self.ball_fresh_streak = self.ball_fresh_streak.saturating_add(1);
        } else {
            self.ball_fresh_streak = 0;
        }
        self.me.queued_turn = 0.0;

        let summary = AdvanceSummary {
            cycle: self.cycle,
            new_sight,
            refreshed: pos_refreshed.iter().zip(&vel_refreshed).filter(|(p, v)| **p || **v).count(),
            self_refreshed,
        };
        trace!(?summary, "belief advanced");
        summary
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn ball(&self) -> &MobileState {
        &self.ball
    }

    pub fn me(&self) -> &SelfState {
        &self.me
    }

    pub fn me_mut(&mut self) -> &mut SelfState {
        &mut self.me
    }

    /// State of any entity. Own uniform number resolves to the self state.
    pub fn mobile(&self, id: EntityId) -> Option<&MobileState> {
        match id {
            EntityId::Ball => Some(&self.ball),
            EntityId::Teammate(u) if u == self.me.unum => Some(&self.me.mobile),
            EntityId::Teammate(u) => self.teammates.get((u as usize).checked_sub(1)?),
            EntityId::Opponent(u) => self.opponents.get((u as usize).checked_sub(1)?),
        }
    }

    fn mobile_mut(&mut self, id: EntityId) -> Option<&mut MobileState> {
        match id {
            EntityId::Ball => Some(&mut self.ball),
            EntityId::Teammate(u) if u == self.me.unum => Some(&mut self.me.mobile),
            EntityId::Teammate(u) => self.teammates.get_mut((u as usize).checked_sub(1)?),
            EntityId::Opponent(u) => self.opponents.get_mut((u as usize).checked_sub(1)?),
        }
    }

    pub fn predicted_position(&self, id: EntityId, step: usize) -> Option<Position> {
        self.mobile(id).map(|m| m.predicted_pos(step))
    }

    pub fn predicted_velocity(&self, id: EntityId, step: usize) -> Option<Velocity> {
        self.mobile(id).map(|m| m.predicted_vel(step))
    }

    /// Position confidence; 0 for ids outside the match.
    pub fn confidence(&self, id: EntityId) -> f64 {
        self.mobile(id).map_or(0.0, |m| m.pos_conf())
    }

    /// Cycles since the position was confirmed.
    pub fn age(&self, id: EntityId) -> u32 {
        self.mobile(id).map_or(NEVER_OBSERVED_AGE, |m| m.pos_age())
    }

    /// Seen at least once, possibly forgotten since.
    pub fn was_observed(&self, id: EntityId) -> bool {
        self.age(id) < NEVER_OBSERVED_AGE
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.confidence(id) > self.known_threshold
    }

    pub fn known_threshold(&self) -> f64 {
        self.known_threshold
    }

    pub fn hypotheses(&self, id: EntityId) -> &[Hypothesis] {
        id.slot().and_then(|i| self.hypotheses.get(i)).map_or(&[], Vec::as_slice)
    }

    /// Next-cycle position if alive, else the probability-weighted centre of
    /// the hypothesis set.
    pub fn expected_position(&self, id: EntityId) -> Option<Position> {
        if self.is_alive(id) {
            return self.predicted_position(id, 1);
        }
        let set = self.hypotheses(id);
        let total: f64 = set.iter().map(|h| h.probability).sum();
        if total <= 0.0 {
            return None;
        }
        let weighted = set.iter().fold(Position::zeros(), |acc, h| acc + h.pos * h.probability);
        Some(weighted / total)
    }

    pub fn our_goalie(&self) -> Option<u8> {
        self.our_goalie
    }

    pub fn their_goalie(&self) -> Option<u8> {
        self.their_goalie
    }

    pub fn set_goalies(&mut self, ours: Option<u8>, theirs: Option<u8>) {
        self.our_goalie = ours;
        self.their_goalie = theirs;
        self.me.is_goalie = ours == Some(self.me.unum);
    }

    pub fn is_goalie(&self, id: EntityId) -> bool {
        match id {
            EntityId::Ball => false,
            EntityId::Teammate(u) => self.our_goalie == Some(u),
            EntityId::Opponent(u) => self.their_goalie == Some(u),
        }
    }

    /// Ball seen with zero delay in this and the previous cycle.
    pub fn ball_seen_last_two_cycles(&self) -> bool {
        self.ball_fresh_streak >= 2
    }

    /// Nearest known opponent to the ball.
    pub fn closest_opponent_dist_to_ball(&self) -> f64 {
        let ball = self.ball.pos();
        EntityId::opponents()
            .filter(|id| self.is_alive(*id))
            .filter_map(|id| self.mobile(id))
            .map(|m| (m.pos() - ball).norm())
            .fold(f64::INFINITY, f64::min)
    }
}
