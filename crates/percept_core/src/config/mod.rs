//! # Perception Configuration
//!
//! Every tuning constant of the belief store and the gaze scheduler lives here.
//!
//! ```rust
//! use percept_core::config::PerceptConfig;
//!
//! let config = PerceptConfig::default();
//! assert!(config.validate().is_ok());
//! ```

mod attention_config;
mod belief_config;
mod sight_config;

pub use attention_config::{AttentionConfig, EvaStep};
pub use belief_config::BeliefConfig;
pub use sight_config::SightConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PerceptError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PerceptConfig {
    #[serde(default)]
    pub belief: BeliefConfig,
    #[serde(default)]
    pub sight: SightConfig,
    #[serde(default)]
    pub attention: AttentionConfig,
}

impl PerceptConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load by extension (`.yaml`/`.yml` or `.json`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(PerceptError::UnsupportedConfigFormat { path: path.display().to_string() }),
        }
    }

    /// Range checks for values the hot path assumes sane.
    pub fn validate(&self) -> Result<()> {
        let b = &self.belief;
        for (name, v) in [
            ("belief.ball_conf_decay", b.ball_conf_decay),
            ("belief.player_conf_decay", b.player_conf_decay),
            ("belief.self_conf_decay", b.self_conf_decay),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(format!("{name} must be in [0, 1], got {v}")));
            }
        }
        for (name, v) in [("belief.ball_decay", b.ball_decay), ("belief.player_decay", b.player_decay)]
        {
            if !(v > 0.0 && v < 1.0) {
                return Err(invalid(format!("{name} must be in (0, 1), got {v}")));
            }
        }
        if b.known_threshold < 0.0 {
            return Err(invalid("belief.known_threshold must be >= 0".to_string()));
        }

        let s = &self.sight;
        if s.narrow_period == 0 || s.normal_period == 0 || s.wide_period == 0 {
            return Err(invalid("sight periods must be >= 1".to_string()));
        }
        if !(s.narrow_angle > 0.0 && s.narrow_angle <= s.normal_angle && s.normal_angle <= s.wide_angle)
        {
            return Err(invalid("sight angles must satisfy 0 < narrow <= normal <= wide".to_string()));
        }
        if s.wide_angle >= 360.0 {
            return Err(invalid("sight.wide_angle must be < 360".to_string()));
        }
        if s.min_neck_angle > s.max_neck_angle {
            return Err(invalid("sight.min_neck_angle > sight.max_neck_angle".to_string()));
        }

        let a = &self.attention;
        if a.player_eva_steps.windows(2).any(|w| w[0].max_dist >= w[1].max_dist) {
            return Err(invalid("attention.player_eva_steps must be ascending".to_string()));
        }
        if a.player_eva_steps.iter().any(|s| s.eva <= 0.0) || a.player_eva_far <= 0.0 {
            return Err(invalid("player eva values must be > 0".to_string()));
        }
        if a.ball_distance_divisor <= 0.0 || a.ball_eva_floor <= 0.0 {
            return Err(invalid("ball eva parameters must be > 0".to_string()));
        }
        if a.restart_sweep_period == 0 {
            return Err(invalid("attention.restart_sweep_period must be >= 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> PerceptError {
    PerceptError::InvalidConfig(msg)
}

// ========== Tests ==========
