//! Scheduler output and the neck/body split

use serde::{Deserialize, Serialize};

use crate::config::SightConfig;
use crate::entity::EntityId;
use crate::geom::normalize_angle_deg;
use crate::sight::SensorWidth;

use super::mode::AttentionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionSource {
    /// Best window of the attention ring.
    Window,
    /// Lost-ball scan.
    Scan,
    /// Restart full-circle sweep.
    RestartSweep,
}

/// What the actuation side should do with the sensor this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazeDecision {
    pub cycle: u64,
    /// Body turn (degrees), only when the body was free to turn.
    pub turn: Option<f64>,
    /// Neck change relative to the current neck angle (degrees).
    pub neck_delta: f64,
    pub view_width: SensorWidth,
    /// Global gaze direction aimed for (degrees).
    pub target_dir: f64,
    /// Window score per cycle of waiting.
    pub score: f64,
    pub mode: AttentionMode,
    pub source: DecisionSource,
    /// Forced entities left outside the chosen cone.
    pub unserved_forced: Vec<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSplit {
    pub turn: Option<f64>,
    pub neck_delta: f64,
}

/// Split a global gaze direction into neck and body turn.
///
/// `body_dir` is the body direction after already queued turns and
/// `neck_dir` the current neck angle relative to the body. Beyond the neck
/// limits the neck goes to the limit and the rest becomes a body turn (when
/// allowed), clamped to `max_turn`.
pub fn split_gaze(
    target_dir: f64,
    body_dir: f64,
    neck_dir: f64,
    can_turn: bool,
    max_turn: f64,
    sight: &SightConfig,
) -> GazeSplit {
    let rel = normalize_angle_deg(target_dir - body_dir);
    let limit = if rel > sight.max_neck_angle {
        sight.max_neck_angle
    } else if rel < sight.min_neck_angle {
        sight.min_neck_angle
    } else {
        return GazeSplit { turn: None, neck_delta: rel - neck_dir };
    };

    let turn = can_turn.then(|| (rel - limit).clamp(-max_turn, max_turn));
    GazeSplit { turn, neck_delta: limit - neck_dir }
}
