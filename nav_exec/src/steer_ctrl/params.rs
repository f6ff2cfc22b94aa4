//! Steering control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for steering control
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    /// Distance to the goal under which the goal is considered reached.
    pub arrival_threshold_m: f64,

    /// Forward speed demand while driving to a goal.
    pub cruise_speed_ms: f64,

    /// Proportional gain from steering error to turn rate demand.
    pub heading_gain: f64,

    /// Limit on the magnitude of the turn rate demand.
    pub max_turn_rate_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            arrival_threshold_m: 0.5,
            cruise_speed_ms: 0.5,
            heading_gain: 0.5,
            max_turn_rate_rads: 0.3,
        }
    }
}
