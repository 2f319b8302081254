//! # percept_core - Belief Tracking and Gaze Scheduling
//!
//! Perception core of a simulated football agent. Keeps a decaying belief
//! about the ball and all 22 players and decides every cycle where to point
//! the directional sensor and how wide to open it.
//!
//! ## Features
//! - Age/confidence tracked entity state with cached motion prediction
//! - Tactical refresh tables per play mode, role and situation
//! - 360° attention ring with best-window search per sensor width
//! - Normal / Searching / Critical override machine
//! - Readiness gate for a decoder thread and a per-agent cycle driver
//!
//! ## Logging
//! Everything logs through `tracing`; installing a subscriber is up to the
//! embedding process.

// Doc formatting lints - purely cosmetic, fix incrementally
#![allow(clippy::doc_lazy_continuation)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]
// Gaze helpers take the full sensor/body state
#![allow(clippy::too_many_arguments)]

pub mod attention;
pub mod config;
pub mod cycle;
pub mod entity;
pub mod error;
pub mod geom;
pub mod observation;
pub mod play_mode;
pub mod sight;
pub mod state;

pub use attention::{AttentionMode, AttentionScheduler, CycleContext, GazeDecision};
pub use config::PerceptConfig;
pub use cycle::{ActuationSink, CycleInput, CycleReport, PerceptionCycle};
pub use entity::{EntityId, Side};
pub use error::{PerceptError, Result};
pub use observation::{ObservationBatch, SightGate};
pub use play_mode::PlayMode;
pub use sight::{SensorWidth, SightTiming};
pub use state::WorldBelief;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
