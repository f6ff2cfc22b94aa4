//! # Defines Telemetry Pack for Navigation

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use comms_if::msg::{GlobalPosition, Pose2D, VelCmd};
use serde::Serialize;

use super::NavState;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Default)]
pub struct NavTm {
    pub state: NavState,
    pub time_in_state_s: f64,

    pub num_local_goals: usize,
    pub num_global_goals: usize,

    /// The goal being driven to, in the local frame
    pub active_goal: Option<Pose2D>,
    pub distance_to_goal_m: Option<f64>,
    pub steering_error_rad: Option<f64>,

    pub last_cmd: Option<String>,
    pub vel_cmd: VelCmd,

    pub local_pose: Pose2D,
    pub global_position: GlobalPosition,
    pub global_pose: Pose2D,
}
