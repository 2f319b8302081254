//! Sensor width options and sight timing
//!
//! Wider cones cover more bearings but arrive less often. The scheduler
//! compares widths by score per cycle of waiting, so every width carries two
//! numbers: the view angle and the cycles until its next sight.

use serde::{Deserialize, Serialize};

use crate::config::SightConfig;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SensorWidth {
    Narrow,
    #[default]
    Normal,
    Wide,
}

impl SensorWidth {
    /// Narrow to wide.
    pub const ALL: [SensorWidth; 3] = [SensorWidth::Narrow, SensorWidth::Normal, SensorWidth::Wide];

    pub fn view_angle(self, cfg: &SightConfig) -> f64 {
        match self {
            SensorWidth::Narrow => cfg.narrow_angle,
            SensorWidth::Normal => cfg.normal_angle,
            SensorWidth::Wide => cfg.wide_angle,
        }
    }

    /// Cycles between consecutive sights at this width.
    pub fn period(self, cfg: &SightConfig) -> u32 {
        match self {
            SensorWidth::Narrow => cfg.narrow_period,
            SensorWidth::Normal => cfg.normal_period,
            SensorWidth::Wide => cfg.wide_period,
        }
    }
}

/// Where we are in the sight cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SightTiming {
    /// Cycles elapsed since the last sight arrived (0 = arrived this cycle).
    pub cycles_since_sight: u32,
}

impl SightTiming {
    pub fn new(cycles_since_sight: u32) -> Self {
        Self { cycles_since_sight }
    }

    /// A sight arrived this cycle.
    pub fn is_new_sight(&self) -> bool {
        self.cycles_since_sight == 0
    }

    /// Cycles until the next sight if `width` is selected now (always ≥ 1).
    pub fn come_cycle(&self, width: SensorWidth, cfg: &SightConfig) -> u32 {
        width.period(cfg).saturating_sub(self.cycles_since_sight).max(1)
    }

    pub fn advance(&mut self, new_sight: bool) {
        if new_sight {
            self.cycles_since_sight = 0;
        } else {
            self.cycles_since_sight = self.cycles_since_sight.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_come_cycle_after_fresh_sight() {
        let cfg = SightConfig::default();
        let t = SightTiming::new(0);
        assert_eq!(t.come_cycle(SensorWidth::Narrow, &cfg), 1);
        assert_eq!(t.come_cycle(SensorWidth::Normal, &cfg), 2);
        assert_eq!(t.come_cycle(SensorWidth::Wide, &cfg), 3);
    }

    #[test]
    fn test_come_cycle_never_below_one() {
        let cfg = SightConfig::default();
        let t = SightTiming::new(7);
        for w in SensorWidth::ALL {
            assert_eq!(t.come_cycle(w, &cfg), 1);
        }
    }

    #[test]
    fn test_advance() {
        let mut t = SightTiming::default();
        t.advance(false);
        t.advance(false);
        assert_eq!(t.cycles_since_sight, 2);
        t.advance(true);
        assert!(t.is_new_sight());
    }
}
