//! Per-cycle inputs of the gaze scheduler that do not live in the belief store

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, TEAM_SIZE};
use crate::geom::Position;
use crate::play_mode::PlayMode;
use crate::sight::SightTiming;
use crate::state::{PositionBelief, WorldBelief};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineType {
    Goalie,
    Defender,
    #[default]
    Midfielder,
    Forward,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Situation {
    #[default]
    Defense,
    ForwardAttack,
    PenaltyAttack,
}

/// Request from a tactical collaborator, applied after the built-in tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttentionHint {
    /// See `entity` at least every `eva` cycles.
    Refresh { entity: EntityId, eva: f64 },
    /// Must be seen before the next sight.
    ForceWatch(EntityId),
}

/// Team strategy snapshot produced by the tactical layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalContext {
    pub situation: Situation,
    pub my_line: LineType,
    /// Line type per teammate, index `unum - 1`.
    pub teammate_lines: [LineType; TEAM_SIZE],

    /// Who has or will first get the ball.
    pub controller: Option<EntityId>,
    pub ball_free: bool,
    /// Cycle the ball last became free.
    pub ball_free_since: u64,
    pub ball_free_cycles_left: f64,

    /// Intercept estimates (cycles) for self, best teammate and best opponent.
    pub my_intercept_cycle: f64,
    pub teammate_intercept_cycle: f64,
    pub opponent_intercept_cycle: f64,
    /// Players by ascending intercept cycle.
    pub intercept_order: Vec<(EntityId, f64)>,

    /// x of the opponents' last line (our attackers' offside line).
    pub offside_line_x: f64,
    pub offside_line_opponent: Option<u8>,

    pub self_in_opp_penalty_area: bool,
}

impl Default for TacticalContext {
    fn default() -> Self {
        Self {
            situation: Situation::default(),
            my_line: LineType::default(),
            teammate_lines: [LineType::default(); TEAM_SIZE],
            controller: None,
            ball_free: false,
            ball_free_since: 0,
            ball_free_cycles_left: 0.0,
            my_intercept_cycle: f64::INFINITY,
            teammate_intercept_cycle: f64::INFINITY,
            opponent_intercept_cycle: f64::INFINITY,
            intercept_order: Vec::new(),
            offside_line_x: f64::INFINITY,
            offside_line_opponent: None,
            self_in_opp_penalty_area: false,
        }
    }
}

impl TacticalContext {
    pub fn line_of(&self, unum: u8) -> LineType {
        (unum as usize)
            .checked_sub(1)
            .and_then(|i| self.teammate_lines.get(i).copied())
            .unwrap_or_default()
    }

    pub fn is_my_control(&self, me: EntityId) -> bool {
        self.controller == Some(me)
    }

    /// A teammate other than self controls the ball.
    pub fn is_teammate_control(&self, me: EntityId) -> bool {
        matches!(self.controller, Some(EntityId::Teammate(_))) && self.controller != Some(me)
    }

    pub fn is_opponent_control(&self) -> bool {
        matches!(self.controller, Some(EntityId::Opponent(_)))
    }
}

/// Everything the scheduler needs besides the belief store.
#[derive(Debug, Clone, Default)]
pub struct CycleContext {
    pub cycle: u64,
    pub play_mode: PlayMode,
    pub last_play_mode: PlayMode,
    pub play_mode_start_cycle: u64,
    pub sight: SightTiming,
    /// The behavior layer queued a body command that excludes a turn.
    pub body_busy: bool,
    /// The neck was already commanded this cycle; no gaze decision is made.
    pub neck_locked: bool,
    /// Player other than self with the ball in kick range.
    pub kickable_player: Option<EntityId>,
    pub tactical: TacticalContext,
    pub hints: Vec<AttentionHint>,
}

impl CycleContext {
    pub fn is_new_sight(&self) -> bool {
        self.sight.is_new_sight()
    }

    pub fn cycles_in_play_mode(&self) -> u64 {
        self.cycle.saturating_sub(self.play_mode_start_cycle)
    }
}

/// Next-cycle self and ball positions and body direction, taken once per
/// cycle so every request and ring bearing uses the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Prediction {
    pub self_pos: Position,
    /// Global (degrees)
    pub body_dir: f64,
    pub ball_pos: Position,
}

impl Prediction {
    pub fn new(world: &WorldBelief, ctx: &CycleContext) -> Self {
        let me = world.me();
        let ball = world.ball();
        // a ball held by someone else stays where it is until kicked
        let ball_pos = match ctx.kickable_player {
            Some(p) if p != me.id() => ball.pos(),
            _ => ball.predicted_pos(1),
        };
        Self {
            self_pos: me.mobile().predicted_pos(1),
            body_dir: me.predicted_body_dir(),
            ball_pos,
        }
    }

    pub fn ball_distance(&self) -> f64 {
        (self.ball_pos - self.self_pos).norm()
    }
}
