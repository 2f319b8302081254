//! Sensor geometry and sight timing

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SightConfig {
    /// Full view cone per width (degrees)
    pub narrow_angle: f64,
    pub normal_angle: f64,
    pub wide_angle: f64,

    /// Cycles between sights per width
    pub narrow_period: u32,
    pub normal_period: u32,
    pub wide_period: u32,

    /// Body-sense radius: anything closer is sensed regardless of gaze (기본: 3.0)
    pub visible_distance: f64,

    /// Neck limits relative to body (degrees)
    pub min_neck_angle: f64,
    pub max_neck_angle: f64,

    /// Overlap kept between consecutive scan sectors (기본: 5.0)
    pub scan_overlap_deg: f64,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            narrow_angle: 60.0,
            normal_angle: 120.0,
            wide_angle: 180.0,

            narrow_period: 1,
            normal_period: 2,
            wide_period: 3,

            visible_distance: 3.0,

            min_neck_angle: -90.0,
            max_neck_angle: 90.0,

            scan_overlap_deg: 5.0,
        }
    }
}
