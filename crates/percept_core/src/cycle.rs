//! Per-cycle driver
//!
//! wait for the decoder → advance the belief → decide → hand the decision to
//! the actuation side. One driver per agent; nothing here is global.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::attention::{
    AttentionHint, AttentionScheduler, CycleContext, GazeDecision, TacticalContext,
};
use crate::config::PerceptConfig;
use crate::entity::EntityId;
use crate::error::Result;
use crate::observation::SightGate;
use crate::play_mode::PlayMode;
use crate::sight::SightTiming;
use crate::state::{AdvanceSummary, WorldBelief};

/// Default wait for the decoder before a cycle runs on decayed state.
pub const DEFAULT_SIGHT_WAIT: Duration = Duration::from_millis(50);

/// Receives the gaze decision of each cycle (turn, neck, width commands).
pub trait ActuationSink {
    fn submit(&mut self, decision: &GazeDecision);
}

/// Keeps every decision, in order.
impl ActuationSink for Vec<GazeDecision> {
    fn submit(&mut self, decision: &GazeDecision) {
        self.push(decision.clone());
    }
}

/// What the behavior and tactics layers report for the coming cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleInput {
    pub play_mode: PlayMode,
    pub body_busy: bool,
    pub neck_locked: bool,
    pub kickable_player: Option<EntityId>,
    pub tactical: TacticalContext,
    pub hints: Vec<AttentionHint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub advance: AdvanceSummary,
    pub decision: Option<GazeDecision>,
}

pub struct PerceptionCycle<S: ActuationSink> {
    world: WorldBelief,
    scheduler: AttentionScheduler,
    gate: Arc<SightGate>,
    sink: S,
    sight: SightTiming,
    play_mode: PlayMode,
    last_play_mode: PlayMode,
    play_mode_start_cycle: u64,
    wait: Duration,
}

impl<S: ActuationSink> PerceptionCycle<S> {
    pub fn new(unum: u8, config: PerceptConfig, gate: Arc<SightGate>, sink: S) -> Result<Self> {
        config.validate()?;
        let world = WorldBelief::new(unum, &config.belief)?;
        info!(unum, "perception cycle ready");
        Ok(Self {
            world,
            scheduler: AttentionScheduler::new(config),
            gate,
            sink,
            sight: SightTiming::default(),
            play_mode: PlayMode::default(),
            last_play_mode: PlayMode::default(),
            play_mode_start_cycle: 0,
            wait: DEFAULT_SIGHT_WAIT,
        })
    }

    pub fn with_sight_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn world(&self) -> &WorldBelief {
        &self.world
    }

    /// Goalie numbers, turn limits and idling are set here by the embedding agent.
    pub fn world_mut(&mut self) -> &mut WorldBelief {
        &mut self.world
    }

    pub fn scheduler(&self) -> &AttentionScheduler {
        &self.scheduler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn gate(&self) -> &Arc<SightGate> {
        &self.gate
    }

    pub fn cycle(&self) -> u64 {
        self.world.cycle()
    }

    pub fn sight_timing(&self) -> SightTiming {
        self.sight
    }

    /// Cycle at which the current play mode started.
    pub fn play_mode_since(&self) -> u64 {
        self.play_mode_start_cycle
    }

    /// Run one cycle. Blocks up to the sight wait for the decoder.
    pub fn step(&mut self, input: CycleInput) -> CycleReport {
        let next = self.world.cycle() + 1;
        let batch = self.gate.wait_for(next, self.wait);
        let advance = self.world.advance_cycle(batch.as_ref(), &self.scheduler.config().belief);
        self.sight.advance(advance.new_sight);

        if input.play_mode != self.play_mode {
            info!(cycle = advance.cycle, from = ?self.play_mode, to = ?input.play_mode, "play mode");
            self.last_play_mode = self.play_mode;
            self.play_mode = input.play_mode;
            self.play_mode_start_cycle = advance.cycle;
        }

        let ctx = CycleContext {
            cycle: advance.cycle,
            play_mode: self.play_mode,
            last_play_mode: self.last_play_mode,
            play_mode_start_cycle: self.play_mode_start_cycle,
            sight: self.sight,
            body_busy: input.body_busy,
            neck_locked: input.neck_locked,
            kickable_player: input.kickable_player,
            tactical: input.tactical,
            hints: input.hints,
        };

        let decision = self.scheduler.decide(&self.world, &ctx);
        match &decision {
            Some(d) => self.sink.submit(d),
            None => debug!(cycle = advance.cycle, "no gaze decision"),
        }
        CycleReport { advance, decision }
    }
}
