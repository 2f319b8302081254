//! Gaze scheduling
//!
//! ## Components
//!
//! - [`request`]: per-entity refresh requests and their scores
//! - [`info_gather`]: tactical tables raising requests
//! - [`ring`]: 360-bucket bearing histogram and the window search
//! - [`mode`]: Normal / Searching / Critical override machine
//! - [`sweep`]: restart sweep and lost-ball scan
//! - [`scheduler`]: one decision per cycle out of all of the above
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut scheduler = AttentionScheduler::new(PerceptConfig::default());
//! if let Some(decision) = scheduler.decide(&world, &ctx) {
//!     sink.submit(&decision);
//! }
//! ```

pub mod context;
pub mod decision;
pub mod info_gather;
pub mod mode;
pub mod request;
pub mod ring;
pub mod scheduler;
pub mod sweep;

pub use context::{
    AttentionHint, CycleContext, LineType, Prediction, Situation, TacticalContext,
};
pub use decision::{split_gaze, DecisionSource, GazeDecision, GazeSplit};
pub use info_gather::InfoGatherer;
pub use mode::{AttentionMode, ModeMachine, ModeTrigger};
pub use request::{
    AttentionRequest, Priority, RequestSet, FORCED_BALL_MULTIPLIER, FORCED_PLAYER_MULTIPLIER,
    HIGH_PRIORITY_MULTIPLIER,
};
pub use ring::{AttentionRing, Window, RING_SIZE};
pub use scheduler::{preferred_width, sense_ball_cycle, AttentionScheduler, BALL_NEVER_SENSED};
pub use sweep::{scan_for_ball, RestartSweep, Scan, SweepStep};
