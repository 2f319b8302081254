//! Tactical refresh tables
//!
//! Raises ball and player requests from the play mode, the agent's role and
//! the team situation. Every raise is a min-merge, so the tables below only
//! ever tighten what an earlier rule asked for.

use tracing::trace;

use crate::config::AttentionConfig;
use crate::entity::{EntityId, TEAM_SIZE};
use crate::play_mode::PlayMode;
use crate::state::{PositionBelief, WorldBelief};

use super::context::{AttentionHint, CycleContext, LineType, Prediction, Situation};
use super::request::RequestSet;

/// eva meaning "only if nothing else is going on".
const IGNORE: f64 = 100.0;
/// Intercept estimates beyond this are not worth watching.
const INTERCEPT_HORIZON: f64 = 50.0;
/// Opponents further than this behind the ball are ignored in attack.
const OPP_AHEAD_MARGIN: f64 = 8.0;
/// Ball within this of self counts as "near" for the special cases.
const NEAR_BALL_DIST: f64 = 20.0;

pub struct InfoGatherer<'a> {
    world: &'a WorldBelief,
    ctx: &'a CycleContext,
    pre: &'a Prediction,
    cfg: &'a AttentionConfig,
    requests: &'a mut RequestSet,
    can_turn: bool,
    critical: bool,
}

impl<'a> InfoGatherer<'a> {
    pub fn new(
        world: &'a WorldBelief,
        ctx: &'a CycleContext,
        pre: &'a Prediction,
        cfg: &'a AttentionConfig,
        requests: &'a mut RequestSet,
    ) -> Self {
        Self { world, ctx, pre, cfg, requests, can_turn: false, critical: false }
    }

    pub fn with_turn_state(mut self, can_turn: bool, critical: bool) -> Self {
        self.can_turn = can_turn;
        self.critical = critical;
        self
    }

    pub fn run(mut self) {
        let (ctx, world) = (self.ctx, self.world);
        let play_mode = ctx.play_mode;
        let tactical = &ctx.tactical;
        let me = world.me();

        if play_mode.is_our_penalty_shot() {
            if let Some(g) = self.world.their_goalie() {
                self.raise_player(EntityId::Opponent(g), Some(1.0));
            }
            self.raise_ball(None);
            self.apply_hints();
            return;
        }

        if play_mode.is_opponent_restart()
            && self.world.closest_opponent_dist_to_ball() < self.cfg.sure_ball_opponent_dist
            && self.ball_dist_to_me() < NEAR_BALL_DIST
            && self.world.age(EntityId::Ball) > 1
        {
            trace!("opponent restart next to the ball");
            self.requests.force(EntityId::Ball);
        }

        if let Some(opp) = tactical.offside_line_opponent {
            if me.pos().x - tactical.offside_line_x > -5.0 {
                self.raise_player(EntityId::Opponent(opp), Some(2.0));
            }
        }

        if me.is_goalie() {
            if tactical.is_my_control(me.id()) || play_mode == PlayMode::OurGoalKick {
                self.for_defense();
            } else {
                self.for_goalie();
            }
        } else if tactical.ball_free
            && tactical.controller.is_some()
            && tactical.my_line != LineType::Defender
            && (tactical.ball_free_cycles_left > 3.0
                || (tactical.is_my_control(me.id()) && tactical.my_intercept_cycle > 3.0))
        {
            self.for_ball_free();
        } else {
            match tactical.situation {
                Situation::Defense => self.for_defense(),
                Situation::ForwardAttack => self.for_fast_forward(),
                Situation::PenaltyAttack => self.for_penalty_attack(),
            }
        }

        if play_mode != PlayMode::PlayOn {
            self.for_ball_free();
        }

        self.apply_hints();
    }

    fn apply_hints(&mut self) {
        for hint in &self.ctx.hints {
            match *hint {
                AttentionHint::Refresh { entity, eva } => self.requests.raise(entity, eva),
                AttentionHint::ForceWatch(entity) => self.requests.force(entity),
            }
        }
    }

    fn ball_dist_to_me(&self) -> f64 {
        (self.world.ball().pos() - self.world.me().pos()).norm()
    }

    fn player_x(&self, id: EntityId) -> Option<f64> {
        if !self.world.is_alive(id) {
            return None;
        }
        self.world.mobile(id).map(|m| m.pos().x)
    }

    /// Teammates other than self and our goalie, with their line type.
    fn field_teammates(&self) -> Vec<(EntityId, LineType)> {
        let me = self.world.me().unum();
        let goalie = self.world.our_goalie();
        (1..=TEAM_SIZE as u8)
            .filter(|u| *u != me && Some(*u) != goalie)
            .map(|u| (EntityId::Teammate(u), self.ctx.tactical.line_of(u)))
            .collect()
    }

    fn raise_teammates_by_line(&mut self, eva_for: impl Fn(LineType) -> Option<f64>) {
        for (id, line) in self.field_teammates() {
            self.raise_player(id, eva_for(line));
        }
    }

    fn raise_their_goalie(&mut self, eva: f64) {
        if let Some(g) = self.world.their_goalie() {
            let id = EntityId::Opponent(g);
            if self.world.is_alive(id) {
                self.raise_player(id, Some(eva));
            }
        }
    }

    /// Ball refresh. `None` derives the rate from the ball situation.
    pub(crate) fn raise_ball(&mut self, eva: Option<f64>) {
        let tactical = &self.ctx.tactical;
        let me = self.world.me().id();

        let mut eva = match eva {
            Some(e) => e,
            None if tactical.ball_free && self.ctx.play_mode == PlayMode::PlayOn => {
                let free_for = self.ctx.cycle.saturating_sub(tactical.ball_free_since);
                if u64::from(self.world.ball().vel_age()) <= free_for {
                    let left = if tactical.is_my_control(me) {
                        tactical.my_intercept_cycle
                    } else {
                        tactical.ball_free_cycles_left
                    };
                    left.min(self.cfg.ball_free_eva_cap).max(1.0)
                } else {
                    // velocity not seen since the ball went free
                    self.requests.force(EntityId::Ball);
                    1.0
                }
            }
            None if tactical.is_teammate_control(me) => {
                let e = self.pre.ball_distance() / self.cfg.ball_distance_divisor + 1.0;
                e.max(self.cfg.ball_eva_floor_team_control)
            }
            None => {
                let e = self.pre.ball_distance() / self.cfg.ball_distance_divisor;
                e.max(self.cfg.ball_eva_floor)
            }
        };

        if self.ctx.play_mode.is_restart() {
            eva = eva.min(self.cfg.restart_ball_eva_cap);
        }
        self.requests.raise(EntityId::Ball, eva);
    }

    /// Player refresh. The distance table is the floor; a table value can only
    /// tighten it. Never-seen and own entries are ignored. A lost player asked
    /// for at least every `forgot_player_eva` cycles is searched for.
    pub(crate) fn raise_player(&mut self, id: EntityId, eva: Option<f64>) {
        let me = self.world.me();
        if id.is_ball() || id == me.id() || !self.world.was_observed(id) {
            return;
        }

        let dist = self.world.mobile(id).map_or(f64::INFINITY, |m| (m.pos() - me.pos()).norm());
        let floor = self.cfg.player_eva_for_distance(dist);
        let eva = eva.map_or(floor, |e| e.min(floor));
        self.requests.raise(id, eva);

        if !self.world.is_alive(id) && eva <= self.cfg.forgot_player_eva {
            trace!(entity = ?id, eva, "lost player searched");
            self.requests.raise_forgotten(id);
            return;
        }

        let tactical = &self.ctx.tactical;
        let penalty_goalie = self.ctx.play_mode.is_our_penalty_shot() && self.world.is_goalie(id);
        let offside_watch = matches!(id, EntityId::Opponent(u) if tactical.offside_line_opponent == Some(u))
            && tactical.my_line == LineType::Forward
            && eva <= f64::from(self.world.age(id));
        if penalty_goalie || offside_watch {
            self.requests.raise_forgotten(id);
        }
    }

    fn for_ball_free(&mut self) {
        let ctx = self.ctx;
        let t = &ctx.tactical;
        let me = self.world.me().id();
        let my_control = t.is_my_control(me);

        let mut left =
            t.my_intercept_cycle.min(t.teammate_intercept_cycle).min(t.opponent_intercept_cycle);
        if t.opponent_intercept_cycle < left + 2.0 && left > 3.0 {
            left -= 1.0;
        }

        if my_control && t.my_line != LineType::Defender && left > 2.0 && left < 6.0 {
            self.raise_ball(Some(1.0));
        } else {
            self.raise_ball(None);
        }

        let order: Vec<(EntityId, f64)> = t
            .intercept_order
            .iter()
            .copied()
            .take_while(|(_, cyc)| *cyc <= INTERCEPT_HORIZON)
            .collect();

        if !my_control {
            for (i, (id, _)) in order.into_iter().enumerate() {
                self.raise_player(id, Some(3.0 + i as f64));
            }
        } else {
            self.raise_ball(Some(2.0));
            let mut eva = 3.0;
            for (id, cyc) in order.into_iter().filter(|(id, _)| *id != me) {
                eva += 1.0;
                self.raise_player(id, Some(eva));
                if self.world.is_alive(id) && f64::from(self.world.age(id)) > cyc {
                    self.requests.mark_high(id);
                }
            }
        }
    }

    fn for_fast_forward(&mut self) {
        self.raise_ball(None);
        let ball_x = self.pre.ball_pos.x;
        let ctx = self.ctx;
        let t = &ctx.tactical;
        let my_control = t.is_my_control(self.world.me().id());
        let offside_x = t.offside_line_x;

        match t.my_line {
            LineType::Goalie | LineType::Defender => {
                self.raise_teammates_by_line(|line| match line {
                    LineType::Defender => Some(8.0),
                    LineType::Midfielder | LineType::Forward => Some(5.0),
                    LineType::Goalie => None,
                });
            }
            LineType::Midfielder => {
                self.raise_teammates_by_line(|line| match line {
                    LineType::Defender => Some(IGNORE),
                    LineType::Midfielder => Some(5.0),
                    LineType::Forward => Some(2.0),
                    LineType::Goalie => None,
                });
                for id in EntityId::opponents() {
                    if let Some(x) = self.player_x(id) {
                        let eva = if x > ball_x - OPP_AHEAD_MARGIN { 4.0 } else { IGNORE };
                        self.raise_player(id, Some(eva));
                    }
                }
                self.raise_their_goalie(20.0);
            }
            LineType::Forward => {
                self.raise_teammates_by_line(|line| match line {
                    LineType::Defender => Some(IGNORE),
                    LineType::Midfielder => Some(5.0),
                    LineType::Forward => Some(3.0),
                    LineType::Goalie => None,
                });
                for id in EntityId::opponents() {
                    let Some(x) = self.player_x(id) else { continue };
                    let to_line = (x - offside_x).abs();
                    let eva = if !my_control && to_line < 1.0 {
                        2.6
                    } else if !my_control && to_line < 3.6 {
                        3.0
                    } else if x > ball_x - OPP_AHEAD_MARGIN {
                        if x > ball_x + 36.0 {
                            6.0
                        } else {
                            4.0
                        }
                    } else {
                        IGNORE
                    };
                    self.raise_player(id, Some(eva));
                }
                self.raise_their_goalie(15.0);
            }
        }
    }

    fn for_penalty_attack(&mut self) {
        self.raise_ball(None);
        let ball_x = self.pre.ball_pos.x;
        let my_line = self.ctx.tactical.my_line;

        let opponents_ahead = |g: &mut Self, eva: f64| {
            for id in EntityId::opponents() {
                if let Some(x) = g.player_x(id) {
                    let e = if x > ball_x - OPP_AHEAD_MARGIN { eva } else { IGNORE };
                    g.raise_player(id, Some(e));
                }
            }
        };

        match my_line {
            LineType::Goalie | LineType::Defender => {
                self.raise_teammates_by_line(|_| None);
                for id in EntityId::opponents() {
                    self.raise_player(id, None);
                }
            }
            LineType::Midfielder => {
                self.raise_teammates_by_line(|line| match line {
                    LineType::Defender => Some(IGNORE),
                    LineType::Midfielder | LineType::Forward => Some(5.0),
                    LineType::Goalie => None,
                });
                opponents_ahead(self, 3.0);
                self.raise_their_goalie(20.0);
            }
            LineType::Forward => {
                self.raise_teammates_by_line(|line| match line {
                    LineType::Defender => Some(IGNORE),
                    LineType::Midfielder => Some(5.0),
                    LineType::Forward => Some(3.0),
                    LineType::Goalie => None,
                });
                opponents_ahead(self, 3.0);
            }
        }

        self.watch_goalie_for_shot();
    }

    /// Inside the opponent box with the ball on our side: keep the goalie in view.
    fn watch_goalie_for_shot(&mut self) {
        let (ctx, world) = (self.ctx, self.world);
        let t = &ctx.tactical;
        let me = world.me();
        let my_control = t.is_my_control(me.id());
        let close_team_control =
            t.is_teammate_control(me.id()) && self.ball_dist_to_me() < NEAR_BALL_DIST;
        if !t.self_in_opp_penalty_area || !(my_control || close_team_control) {
            return;
        }
        let Some(g) = world.their_goalie() else { return };
        let goalie = EntityId::Opponent(g);
        if !world.is_alive(goalie) {
            return;
        }
        let Some(goalie_pos) = world.mobile(goalie).map(|m| m.pos()) else { return };

        let ball_to_goalie = (world.ball().pos() - goalie_pos).norm();
        let shooting =
            my_control && (me.pos().x > 38.0 || (ball_to_goalie < 8.0 && me.pos().x > 36.0));
        let eva = if !shooting {
            2.0
        } else if matches!(ctx.play_mode, PlayMode::OurBackPassKick | PlayMode::OurIndirectFreeKick)
        {
            1.2
        } else {
            1.0
        };
        self.raise_player(goalie, Some(eva));
    }

    fn for_defense(&mut self) {
        let ball_stale = self.world.confidence(EntityId::Ball) <= self.world.known_threshold();
        if ball_stale && !self.can_turn && !self.critical {
            self.requests.force(EntityId::Ball);
        }

        self.raise_ball(None);
        match self.ctx.tactical.my_line {
            LineType::Goalie | LineType::Defender => {
                self.raise_teammates_by_line(|line| match line {
                    LineType::Defender => Some(5.0),
                    LineType::Midfielder => Some(10.0),
                    LineType::Forward => Some(IGNORE),
                    LineType::Goalie => None,
                });
                for id in EntityId::opponents() {
                    self.raise_player(id, None);
                }
            }
            LineType::Midfielder => {
                self.raise_teammates_by_line(|_| None);
                for id in EntityId::opponents() {
                    self.raise_player(id, Some(12.0));
                }
                self.raise_their_goalie(20.0);
            }
            LineType::Forward => {
                self.raise_teammates_by_line(|line| match line {
                    LineType::Defender => Some(12.0),
                    LineType::Midfielder | LineType::Forward => Some(8.0),
                    LineType::Goalie => None,
                });
                for id in EntityId::opponents() {
                    self.raise_player(id, Some(12.0));
                }
            }
        }
    }

    fn for_goalie(&mut self) {
        self.raise_ball(None);
        let far = self.cfg.player_eva_far;
        let me = self.world.me().id();
        for id in EntityId::players().filter(|id| *id != me) {
            self.raise_player(id, Some(far));
        }

        // inside the distance at which an opponent can shoot
        if self.ball_dist_to_me() < 26.0 {
            self.requests.force(EntityId::Ball);
            let tactical = &self.ctx.tactical;
            if let (true, Some(ctrl)) = (tactical.is_opponent_control(), tactical.controller) {
                self.raise_player(ctrl, Some(2.0));
            }
        }
    }
}
