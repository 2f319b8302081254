//! Belief store parameters

use serde::{Deserialize, Serialize};

/// Confidence decay and physical constants for tracked entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeliefConfig {
    /// Confidence at or below this is "unknown" (기본: 1e-6)
    pub known_threshold: f64,
    /// Per-cycle confidence decay for the ball (기본: 0.95)
    pub ball_conf_decay: f64,
    /// Per-cycle confidence decay for other players (기본: 0.99)
    pub player_conf_decay: f64,
    /// Per-cycle confidence decay for self-localization (기본: 0.99)
    pub self_conf_decay: f64,

    /// Ball speed decay per cycle (기본: 0.94)
    pub ball_decay: f64,
    /// Ball max speed per cycle (기본: 3.0)
    pub ball_speed_max: f64,
    /// Player speed decay per cycle (기본: 0.4)
    pub player_decay: f64,
    /// Player effective max speed per cycle (기본: 1.05)
    pub player_speed_max: f64,
}

impl Default for BeliefConfig {
    fn default() -> Self {
        Self {
            known_threshold: 1e-6,
            ball_conf_decay: 0.95,
            player_conf_decay: 0.99,
            self_conf_decay: 0.99,

            ball_decay: 0.94,
            ball_speed_max: 3.0,
            player_decay: 0.4,
            player_speed_max: 1.05,
        }
    }
}
