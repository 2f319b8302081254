//! Fallback gaze patterns: the restart sweep and the lost-ball scan

use tracing::info;

use crate::config::{AttentionConfig, SightConfig};
use crate::geom::normalize_angle_deg;
use crate::play_mode::PlayMode;
use crate::sight::SensorWidth;
use crate::state::WorldBelief;

use super::context::CycleContext;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepStep {
    /// Sweep does not apply; run the normal decision.
    Idle,
    /// Sweep in progress but no sight this cycle; make no gaze decision.
    Hold,
    /// Look at `dir` (global degrees) with the wide cone, body untouched.
    Look { dir: f64 },
}

/// Two-phase full-circle look after a restart, so nobody on the pitch is
/// missed while play is stopped. Players of one team start on different
/// cycles (uniform number modulo the sweep period) so the team does not turn
/// away from the ball all at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestartSweep {
    one_side: bool,
    both_sides: bool,
}

impl RestartSweep {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.one_side = false;
        self.both_sides = false;
    }

    fn applies(ctx: &CycleContext, world: &WorldBelief, ball_forced: bool) -> bool {
        let pm = ctx.play_mode;
        let last = ctx.last_play_mode;
        pm != PlayMode::PlayOn
            && pm != PlayMode::BeforeKickOff
            && !pm.is_our_penalty()
            && !ball_forced
            && !world.me().is_goalie()
            && last != PlayMode::BeforeKickOff
            && !last.is_kick_off()
    }

    pub fn step(
        &mut self,
        ctx: &CycleContext,
        world: &WorldBelief,
        cfg: &AttentionConfig,
        ball_forced: bool,
    ) -> SweepStep {
        if !Self::applies(ctx, world, ball_forced) {
            return SweepStep::Idle;
        }

        let elapsed = ctx.cycles_in_play_mode();
        // the first sights after a mode change are still in flight
        if elapsed < cfg.restart_settle_cycles {
            self.reset();
            return SweepStep::Idle;
        }
        if !ctx.is_new_sight() {
            return SweepStep::Hold;
        }
        if self.both_sides {
            return SweepStep::Idle;
        }

        let me = world.me();
        if !self.one_side {
            let period = cfg.restart_sweep_period.max(1);
            if elapsed % period != u64::from(me.unum()) % period {
                return SweepStep::Idle;
            }
            self.one_side = true;
            let dir = normalize_angle_deg(me.predicted_body_dir() + 90.0);
            info!(cycle = ctx.cycle, dir, "restart sweep: first side");
            SweepStep::Look { dir }
        } else {
            self.one_side = false;
            self.both_sides = true;
            let dir = normalize_angle_deg(me.neck_global_dir() + 180.0);
            info!(cycle = ctx.cycle, dir, "restart sweep: second side");
            SweepStep::Look { dir }
        }
    }
}

/// Body turn (or neck sweep) for the lost-ball scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scan {
    pub width: SensorWidth,
    /// Body turn when the body is free.
    pub turn: Option<f64>,
    /// Neck change relative to the current neck angle.
    pub neck_delta: f64,
}

/// Rotate by one wide sector minus the overlap each cycle. When the body is
/// busy the neck sweeps instead, jumping back to the far limit at the end.
pub fn scan_for_ball(world: &WorldBelief, sight: &SightConfig, body_free: bool) -> Scan {
    let me = world.me();
    let width = SensorWidth::Wide;
    let step = (width.view_angle(sight) - sight.scan_overlap_deg).max(0.0);

    if body_free {
        let turn = step.min(me.max_turn_angle());
        info!(turn, "scanning for ball");
        return Scan { width, turn: Some(turn), neck_delta: 0.0 };
    }

    let neck = me.neck_dir();
    let mut target = neck + step;
    if target > sight.max_neck_angle {
        target = if neck >= sight.max_neck_angle { sight.min_neck_angle } else { sight.max_neck_angle };
    }
    info!(neck_target = target, "scanning for ball with neck only");
    Scan { width, turn: None, neck_delta: target - neck }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeliefConfig;
    use crate::geom::{Position, Velocity};
    use crate::observation::{ObservationBatch, SelfReport};
    use crate::sight::SightTiming;

    fn world(unum: u8, neck: f64) -> WorldBelief {
        let cfg = BeliefConfig::default();
        let mut w = WorldBelief::new(unum, &cfg).unwrap();
        let report = SelfReport {
            pos: Position::zeros(),
            vel: Velocity::zeros(),
            body_dir: 10.0,
            neck_dir: neck,
            view_width: SensorWidth::Normal,
            age: 0,
            confidence: 1.0,
        };
        w.advance_cycle(Some(&ObservationBatch::new(100, true).with_self_report(report)), &cfg);
        w
    }

    fn restart_ctx(cycle: u64, new_sight: bool) -> CycleContext {
        CycleContext {
            cycle,
            play_mode: PlayMode::OppKickIn,
            last_play_mode: PlayMode::PlayOn,
            play_mode_start_cycle: 100,
            sight: SightTiming::new(if new_sight { 0 } else { 1 }),
            ..Default::default()
        }
    }

    #[test]
    fn test_sweep_two_phases_on_own_slot() {
        let cfg = AttentionConfig::default();
        // unum 8: slot 8 % 6 = 2
        let w = world(8, 0.0);
        let mut sweep = RestartSweep::new();

        assert_eq!(sweep.step(&restart_ctx(101, true), &w, &cfg, false), SweepStep::Idle);
        assert_eq!(sweep.step(&restart_ctx(103, true), &w, &cfg, false), SweepStep::Idle);
        assert_eq!(sweep.step(&restart_ctx(104, false), &w, &cfg, false), SweepStep::Hold);
        assert_eq!(sweep.step(&restart_ctx(107, true), &w, &cfg, false), SweepStep::Idle);

        let first = sweep.step(&restart_ctx(108, true), &w, &cfg, false);
        assert_eq!(first, SweepStep::Look { dir: 100.0 });
        let second = sweep.step(&restart_ctx(111, true), &w, &cfg, false);
        assert_eq!(second, SweepStep::Look { dir: -170.0 });
        assert_eq!(sweep.step(&restart_ctx(114, true), &w, &cfg, false), SweepStep::Idle);
    }

    #[test]
    fn test_sweep_skipped_after_kick_off_and_when_ball_forced() {
        let cfg = AttentionConfig::default();
        let w = world(2, 0.0);
        let mut sweep = RestartSweep::new();
        let mut ctx = restart_ctx(108, true);
        ctx.last_play_mode = PlayMode::OurKickOff;
        assert_eq!(sweep.step(&ctx, &w, &cfg, false), SweepStep::Idle);
        assert_eq!(sweep.step(&restart_ctx(108, true), &w, &cfg, true), SweepStep::Idle);
    }

    #[test]
    fn test_scan_turns_body_by_sector() {
        let sight = SightConfig::default();
        let w = world(5, 0.0);
        let scan = scan_for_ball(&w, &sight, true);
        assert_eq!(scan.width, SensorWidth::Wide);
        assert_eq!(scan.turn, Some(175.0));
    }

    #[test]
    fn test_scan_neck_only_wraps_to_far_limit() {
        let sight = SightConfig::default();
        let scan = scan_for_ball(&world(5, -90.0), &sight, false);
        assert_eq!(scan.turn, None);
        assert_eq!(scan.neck_delta, 175.0);

        let scan = scan_for_ball(&world(5, 30.0), &sight, false);
        assert_eq!(scan.neck_delta, 60.0);

        let scan = scan_for_ball(&world(5, 90.0), &sight, false);
        assert_eq!(scan.neck_delta, -180.0);
    }
}
