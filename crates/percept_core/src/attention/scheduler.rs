//! Gaze scheduler
//!
//! One per agent. Each cycle:
//! 1. reset requests (latches expire on a new sight) and update the mode
//! 2. restart sweep, if it applies
//! 3. raise requests from the tactical tables, evaluate them
//! 4. lost ball → scan
//! 5. priority overrides and critical checks
//! 6. build the ring, search each width, pick one
//! 7. split the chosen direction into neck and body turn

use tracing::{debug, trace, warn};

use crate::config::{AttentionConfig, PerceptConfig, SightConfig};
use crate::entity::EntityId;
use crate::geom::{angle_diff_deg, normalize_angle_deg, relative_bearing_deg};
use crate::play_mode::PlayMode;
use crate::sight::{SensorWidth, SightTiming};
use crate::state::{PositionBelief, WorldBelief, MAX_STEP};

use super::context::{CycleContext, Prediction};
use super::decision::{split_gaze, DecisionSource, GazeDecision};
use super::info_gather::InfoGatherer;
use super::mode::{AttentionMode, ModeMachine, ModeTrigger};
use super::request::{AttentionRequest, Priority, RequestSet};
use super::ring::{AttentionRing, Window};
use super::sweep::{scan_for_ball, RestartSweep, SweepStep};

/// Sense-ball estimate for a ball we know nothing about.
pub const BALL_NEVER_SENSED: u32 = 1000;

/// Score of a ball that will be body-sensed anyway.
const SENSED_SCORE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct AttentionScheduler {
    config: PerceptConfig,
    requests: RequestSet,
    ring: AttentionRing,
    mode: ModeMachine,
    sweep: RestartSweep,
}

impl AttentionScheduler {
    pub fn new(config: PerceptConfig) -> Self {
        Self {
            config,
            requests: RequestSet::new(),
            ring: AttentionRing::new(),
            mode: ModeMachine::new(),
            sweep: RestartSweep::new(),
        }
    }

    pub fn config(&self) -> &PerceptConfig {
        &self.config
    }

    pub fn mode(&self) -> AttentionMode {
        self.mode.mode()
    }

    /// Requests as evaluated by the last [`decide`](Self::decide).
    pub fn requests(&self) -> &RequestSet {
        &self.requests
    }

    pub fn ring(&self) -> &AttentionRing {
        &self.ring
    }

    /// Decide where to look next. `None` when the neck is already commanded
    /// this cycle or the restart sweep is waiting for its sight.
    pub fn decide(&mut self, world: &WorldBelief, ctx: &CycleContext) -> Option<GazeDecision> {
        if ctx.neck_locked {
            trace!(cycle = ctx.cycle, "neck already commanded");
            return None;
        }

        let Self { config, requests, ring, mode, sweep } = self;
        let (sight, attention) = (&config.sight, &config.attention);
        let eps = world.known_threshold();
        let me = world.me();

        requests.begin_cycle();
        if ctx.is_new_sight() {
            requests.reset_for_sight();
            mode.apply(ModeTrigger::NewSight);
        }
        if me.pos_conf() <= eps {
            mode.apply(ModeTrigger::SelfLocalizationLost);
        }
        if world.confidence(EntityId::Ball) <= eps {
            requests.raise_forgotten(EntityId::Ball);
        }
        let preferred = preferred_width(world, ctx, attention);

        match sweep.step(ctx, world, attention, requests.is_forced(EntityId::Ball)) {
            SweepStep::Hold => return None,
            SweepStep::Look { dir } => {
                let split = split_gaze(
                    dir,
                    me.predicted_body_dir(),
                    me.neck_dir(),
                    false,
                    me.max_turn_angle(),
                    sight,
                );
                return Some(GazeDecision {
                    cycle: ctx.cycle,
                    turn: split.turn,
                    neck_delta: split.neck_delta,
                    view_width: SensorWidth::Wide,
                    target_dir: dir,
                    score: 0.0,
                    mode: mode.mode(),
                    source: DecisionSource::RestartSweep,
                    unserved_forced: Vec::new(),
                });
            }
            SweepStep::Idle => {}
        }

        let pre = Prediction::new(world, ctx);
        let can_turn_before = !ctx.body_busy && !mode.is_critical() && !me.is_idling();
        InfoGatherer::new(world, ctx, &pre, attention, requests)
            .with_turn_state(can_turn_before, mode.is_critical())
            .run();
        requests.evaluate(world, &pre, attention, ctx.play_mode.is_our_penalty_shot());
        if requests.is_searching() || requests.forced_requests().next().is_some() {
            mode.apply(ModeTrigger::ForcedRequestRaised);
        }

        if !requests.ball().valid && !me.is_idling() {
            let scan = scan_for_ball(world, sight, !ctx.body_busy);
            let target_dir = normalize_angle_deg(
                me.predicted_body_dir() + scan.turn.unwrap_or(0.0) + me.neck_dir() + scan.neck_delta,
            );
            return Some(GazeDecision {
                cycle: ctx.cycle,
                turn: scan.turn,
                neck_delta: scan.neck_delta,
                view_width: scan.width,
                target_dir,
                score: 0.0,
                mode: mode.mode(),
                source: DecisionSource::Scan,
                unserved_forced: Vec::new(),
            });
        }

        requests.apply_priority_scores(attention);
        check_critical(requests, mode, &ctx.sight, sight, attention);

        let can_turn = can_turn_before && !mode.is_critical();
        build_ring(ring, requests, world, &pre, attention);

        let search = WidthSearch {
            ring,
            sight,
            timing: ctx.sight,
            max_turn: if can_turn { me.max_turn_angle() } else { 0.0 },
            sense_ball_cycle: sense_ball_cycle(world, requests.ball(), sight),
        };

        let (width, window) = if mode.is_critical() {
            let width = fastest_width(&ctx.sight, sight);
            (width, search.run(width, true))
        } else if preferred != SensorWidth::Narrow && !mode.is_searching() {
            (preferred, search.run(preferred, true))
        } else {
            let force = ctx.play_mode != PlayMode::OurPenaltyTaken
                && world.ball_seen_last_two_cycles()
                && world.closest_opponent_dist_to_ball() > attention.sure_ball_opponent_dist;
            if force {
                trace!(cycle = ctx.cycle, "sure ball");
            }
            let [n, m, w] = SensorWidth::ALL.map(|width| search.run(width, force));
            let buf = attention.width_tie_buffer;
            if n.score > m.score - buf {
                if n.score > w.score - buf {
                    (SensorWidth::Narrow, n)
                } else {
                    (SensorWidth::Wide, w)
                }
            } else if m.score > w.score - buf {
                (SensorWidth::Normal, m)
            } else {
                (SensorWidth::Wide, w)
            }
        };

        let unserved = unserved_forced(requests, world, &pre, &window, width, sight, attention);
        for id in &unserved {
            warn!(cycle = ctx.cycle, entity = ?id, ?width, dir = window.dir, "forced request left unserved");
        }

        let target_dir = normalize_angle_deg(window.dir + pre.body_dir);
        let split = split_gaze(
            target_dir,
            pre.body_dir,
            me.neck_dir(),
            can_turn,
            me.max_turn_angle(),
            sight,
        );

        debug!(
            cycle = ctx.cycle,
            mode = ?mode.mode(),
            width = ?width,
            dir = target_dir,
            score = window.score,
            "gaze decision"
        );

        Some(GazeDecision {
            cycle: ctx.cycle,
            turn: split.turn,
            neck_delta: split.neck_delta,
            view_width: width,
            target_dir,
            score: window.score,
            mode: mode.mode(),
            source: DecisionSource::Window,
            unserved_forced: unserved,
        })
    }
}

/// Default width on a new sight, from the ball distance. Between sights the
/// current width is kept.
pub fn preferred_width(
    world: &WorldBelief,
    ctx: &CycleContext,
    cfg: &AttentionConfig,
) -> SensorWidth {
    if !ctx.is_new_sight() {
        return world.me().view_width();
    }
    if ctx.play_mode == PlayMode::BeforeKickOff {
        return SensorWidth::Narrow;
    }
    let dist = (world.ball().pos() - world.me().pos()).norm();
    if dist > cfg.wide_view_ball_distance {
        SensorWidth::Wide
    } else if dist > cfg.normal_view_ball_distance {
        SensorWidth::Normal
    } else {
        SensorWidth::Narrow
    }
}

/// Narrowest width whose next sight comes next cycle, else the soonest one.
fn fastest_width(timing: &SightTiming, sight: &SightConfig) -> SensorWidth {
    SensorWidth::ALL
        .into_iter()
        .find(|w| timing.come_cycle(*w, sight) == 1)
        .or_else(|| SensorWidth::ALL.into_iter().min_by_key(|w| timing.come_cycle(*w, sight)))
        .unwrap_or(SensorWidth::Narrow)
}

/// Cycles until the ball will be inside body-sense range, running at it at
/// full speed.
pub fn sense_ball_cycle(world: &WorldBelief, ball: &AttentionRequest, sight: &SightConfig) -> u32 {
    if !ball.valid {
        return BALL_NEVER_SENSED;
    }
    if ball.predicted_distance < sight.visible_distance {
        return 1;
    }
    let me = world.me();
    let speed = me.mobile().effective_max_speed();
    (1..=MAX_STEP)
        .find(|k| {
            let ball_k = world.ball().predicted_pos(*k);
            (ball_k - me.pos()).norm() - *k as f64 * speed <= sight.visible_distance
        })
        .map_or(MAX_STEP as u32, |k| k as u32)
}

/// Critical when a prioritized entity is about to be body-sensed, or a
/// forced one cannot be seen in time even at the narrowest width.
fn check_critical(
    requests: &mut RequestSet,
    mode: &mut ModeMachine,
    timing: &SightTiming,
    sight: &SightConfig,
    cfg: &AttentionConfig,
) {
    let sense_radius = sight.visible_distance - cfg.sense_buffer;
    let narrow_come = f64::from(timing.come_cycle(SensorWidth::Narrow, sight));
    let ids: Vec<EntityId> = requests
        .iter()
        .filter(|r| r.valid && r.priority != Priority::Normal)
        .map(|r| r.entity)
        .collect();

    for id in ids {
        let Some(req) = requests.get_mut(id) else { continue };
        if req.confidence > cfg.sense_conf && req.predicted_distance < sense_radius {
            if id.is_ball() && req.cycle_age == 0 {
                req.score = SENSED_SCORE;
            }
            trace!(entity = ?id, "prioritized entity within sense range");
            mode.apply(ModeTrigger::UnresolvableForced);
            continue;
        }
        if req.is_forced() && req.is_raised() {
            let deadline = (req.eva - f64::from(req.cycle_age)).max(1.0);
            if narrow_come > deadline {
                mode.apply(ModeTrigger::UnresolvableForced);
            }
        }
    }
}

fn build_ring(
    ring: &mut AttentionRing,
    requests: &RequestSet,
    world: &WorldBelief,
    pre: &Prediction,
    cfg: &AttentionConfig,
) {
    ring.clear();
    for req in requests.iter().filter(|r| r.valid && r.score > 0.0) {
        let id = req.entity;
        let hypotheses = world.hypotheses(id);
        if !hypotheses.is_empty() {
            for h in hypotheses {
                let dir = relative_bearing_deg(&pre.self_pos, &h.pos, pre.body_dir);
                ring.add(dir, h.probability * req.score);
            }
            continue;
        }

        let (pos, half_width, weight) = if id.is_ball() {
            (Some(pre.ball_pos), cfg.ball_smear_half_width, cfg.ball_smear_weight)
        } else {
            (
                world.predicted_position(id, 1),
                cfg.player_smear_half_width,
                cfg.player_smear_weight,
            )
        };
        if let Some(pos) = pos {
            let dir = relative_bearing_deg(&pre.self_pos, &pos, pre.body_dir);
            ring.smear(dir, half_width, weight, req.score);
        }
    }
    trace!(total = ring.total(), "ring built");
}

struct WidthSearch<'a> {
    ring: &'a AttentionRing,
    sight: &'a SightConfig,
    timing: SightTiming,
    max_turn: f64,
    sense_ball_cycle: u32,
}

impl WidthSearch<'_> {
    /// Best window for `width`, scored per cycle of waiting. Widths whose
    /// sight comes after the ball is sensed anyway only count when `force`d.
    fn run(&self, width: SensorWidth, force: bool) -> Window {
        let come = self.timing.come_cycle(width, self.sight);
        if !force && self.sense_ball_cycle < come {
            trace!(?width, come, "width skipped: ball sensed first");
            return Window::default();
        }

        let half = width.view_angle(self.sight) * 0.5;
        let left_most = self.sight.min_neck_angle - self.max_turn - half;
        let right_most = self.sight.max_neck_angle + self.max_turn + half;
        let mut window = self.ring.best_window(left_most, right_most, half * 2.0);
        window.score /= f64::from(come);
        trace!(?width, come, dir = window.dir, score = window.score, "width searched");
        window
    }
}

/// Forced entities whose bearing falls outside the chosen cone and that will
/// not be body-sensed either.
fn unserved_forced(
    requests: &RequestSet,
    world: &WorldBelief,
    pre: &Prediction,
    window: &Window,
    width: SensorWidth,
    sight: &SightConfig,
    cfg: &AttentionConfig,
) -> Vec<EntityId> {
    let half = width.view_angle(sight) * 0.5;
    let sense_radius = sight.visible_distance - cfg.sense_buffer;
    requests
        .forced_requests()
        .filter(|req| req.predicted_distance >= sense_radius)
        .filter(|req| {
            let target =
                if req.entity.is_ball() { Some(pre.ball_pos) } else { world.expected_position(req.entity) };
            target.map_or(true, |pos| {
                let bearing = relative_bearing_deg(&pre.self_pos, &pos, pre.body_dir);
                angle_diff_deg(bearing, window.dir) > half
            })
        })
        .map(|req| req.entity)
        .collect()
}
