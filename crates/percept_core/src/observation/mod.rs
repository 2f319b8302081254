//! Decoder output consumed by the belief store
//!
//! The decoder (outside this crate) turns sensor messages into
//! [`ObservationBatch`]es and hands them over through [`SightGate`].

mod gate;

pub use gate::SightGate;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::geom::{Position, Velocity};
use crate::sight::SensorWidth;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Measurement {
    Position(Position),
    Velocity(Velocity),
}

/// One direct observation of one quantity of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    pub entity: EntityId,
    pub measurement: Measurement,
    /// Cycles between the observation and now, as reported by the decoder.
    pub age: u32,
    /// Reliability reported by the decoder, in [0, 1].
    pub confidence: f64,
}

impl Sighting {
    pub fn position(entity: EntityId, pos: Position, age: u32, confidence: f64) -> Self {
        Self { entity, measurement: Measurement::Position(pos), age, confidence }
    }

    pub fn velocity(entity: EntityId, vel: Velocity, age: u32, confidence: f64) -> Self {
        Self { entity, measurement: Measurement::Velocity(vel), age, confidence }
    }
}

/// Self-localization and body sense for the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfReport {
    pub pos: Position,
    pub vel: Velocity,
    /// Global body direction (degrees)
    pub body_dir: f64,
    /// Neck direction relative to body (degrees)
    pub neck_dir: f64,
    pub view_width: SensorWidth,
    pub age: u32,
    pub confidence: f64,
}

/// A probable location of an entity that was not directly confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub pos: Position,
    /// In (0, 1]; probabilities of one entity sum to at most 1.
    pub probability: f64,
}

/// Everything the decoder produced for one cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationBatch {
    pub cycle: u64,
    /// A visual sight (as opposed to body sense only) arrived this cycle.
    pub new_sight: bool,
    pub self_report: Option<SelfReport>,
    pub sightings: Vec<Sighting>,
    pub hypotheses: Vec<(EntityId, Vec<Hypothesis>)>,
}

impl ObservationBatch {
    pub fn new(cycle: u64, new_sight: bool) -> Self {
        Self { cycle, new_sight, ..Default::default() }
    }

    pub fn with_sighting(mut self, sighting: Sighting) -> Self {
        self.sightings.push(sighting);
        self
    }

    pub fn with_self_report(mut self, report: SelfReport) -> Self {
        self.self_report = Some(report);
        self
    }

    pub fn with_hypotheses(mut self, entity: EntityId, set: Vec<Hypothesis>) -> Self {
        self.hypotheses.push((entity, set));
        self
    }
}
