//! Attention request / ring / scheduler tuning

use serde::{Deserialize, Serialize};

/// Distance step of the player refresh table: below `max_dist`, refresh every `eva` cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaStep {
    pub max_dist: f64,
    pub eva: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    // === Ball refresh rate ===
    /// eva = distance / divisor (기본: 20.0)
    pub ball_distance_divisor: f64,
    /// Floor of the distance-derived ball eva (기본: 2.0)
    pub ball_eva_floor: f64,
    /// Floor when a teammate controls the ball (기본: 3.0)
    pub ball_eva_floor_team_control: f64,
    /// Cap during restart play modes (기본: 2.0)
    pub restart_ball_eva_cap: f64,
    /// Cap while the ball is free and nobody has reached it yet (기본: 3.0)
    pub ball_free_eva_cap: f64,

    // === Player refresh rate ===
    /// Ascending distance steps
    pub player_eva_steps: Vec<EvaStep>,
    /// eva beyond the last step (기본: 50.0)
    pub player_eva_far: f64,
    /// eva at or below which a lost player is searched for (기본: 2.0)
    pub forgot_player_eva: f64,

    // === Urgency shaping ===
    /// Score multiplier for requests that are not due yet (기본: 0.1)
    pub residual_weight: f64,
    /// Upper bound of (age + 1) / eva for overdue requests (기본: 4.0)
    pub overdue_cap: f64,
    /// Extra weight for nearby entities: 1 + gain / (1 + dist / scale)
    pub proximity_gain: f64,
    pub proximity_scale: f64,

    // === Ring smear for entities without hypotheses ===
    pub ball_smear_half_width: i32,
    pub ball_smear_weight: f64,
    pub player_smear_half_width: i32,
    pub player_smear_weight: f64,

    // === Width selection ===
    /// Ball farther than this → wide by default (기본: 40.0)
    pub wide_view_ball_distance: f64,
    /// Ball farther than this → normal by default (기본: 20.0)
    pub normal_view_ball_distance: f64,
    /// Narrower width wins ties within this margin
    pub width_tie_buffer: f64,

    // === Critical / forced ===
    /// A forced entity this confident and this close will be body-sensed (기본: 0.9)
    pub sense_conf: f64,
    /// Margin inside the visible distance (기본: 0.25)
    pub sense_buffer: f64,
    /// Opponent within this of the ball blocks the "sure ball" shortcut (기본: 3.0)
    pub sure_ball_opponent_dist: f64,

    // === Restart sweep ===
    /// Cycles after a play-mode change before sweeping (기본: 3)
    pub restart_settle_cycles: u64,
    /// Phase rotation modulus shared by the team (기본: 6)
    pub restart_sweep_period: u64,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            ball_distance_divisor: 20.0,
            ball_eva_floor: 2.0,
            ball_eva_floor_team_control: 3.0,
            restart_ball_eva_cap: 2.0,
            ball_free_eva_cap: 3.0,

            player_eva_steps: vec![
                EvaStep { max_dist: 3.0, eva: 6.0 },
                EvaStep { max_dist: 6.0, eva: 5.0 },
                EvaStep { max_dist: 20.0, eva: 10.0 },
                EvaStep { max_dist: 40.0, eva: 26.0 },
            ],
            player_eva_far: 50.0,
            forgot_player_eva: 2.0,

            residual_weight: 0.1,
            overdue_cap: 4.0,
            proximity_gain: 1.0,
            proximity_scale: 10.0,

            ball_smear_half_width: 10,
            ball_smear_weight: 0.05,
            player_smear_half_width: 5,
            player_smear_weight: 0.1,

            wide_view_ball_distance: 40.0,
            normal_view_ball_distance: 20.0,
            width_tie_buffer: 1e-6,

            sense_conf: 0.9,
            sense_buffer: 0.25,
            sure_ball_opponent_dist: 3.0,

            restart_settle_cycles: 3,
            restart_sweep_period: 6,
        }
    }
}

impl AttentionConfig {
    /// Distance-based refresh rate for a player.
    pub fn player_eva_for_distance(&self, dist: f64) -> f64 {
        self.player_eva_steps
            .iter()
            .find(|step| dist < step.max_dist)
            .map(|step| step.eva)
            .unwrap_or(self.player_eva_far)
    }
}
