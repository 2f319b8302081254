//! Belief store
//!
//! - [`tracked`]: the generic value cell with age and confidence
//! - [`predictor`]: lazily extended decay trajectories
//! - [`entity`]: static and mobile per-entity state
//! - [`world`]: every entity of the match plus the agent itself

pub mod entity;
pub mod predictor;
pub mod tracked;
pub mod world;

pub use entity::{MobileState, PositionBelief, StaticState};
pub use predictor::{MotionPredictor, MAX_STEP};
pub use tracked::{TrackedValue, NEVER_OBSERVED_AGE};
pub use world::{AdvanceSummary, SelfState, WorldBelief};
