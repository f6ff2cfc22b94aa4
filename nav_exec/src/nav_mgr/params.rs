//! Navigation manager parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::HeadingFormula;
use serde::{Deserialize, Serialize};

use crate::steer_ctrl;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NavMgrParams {
    /// Forward speed demand in the GO state.
    pub go_speed_ms: f64,

    /// How odometry orientations are reduced to a heading.
    pub heading_formula: HeadingFormula,

    /// Maximum time between the local pose and global position updates for a global goal to be
    /// reconciled into the local frame. `None` disables the check.
    pub max_anchor_skew_s: Option<f64>,

    /// Steering controller parameters.
    pub steer_ctrl: steer_ctrl::Params,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("max_anchor_skew_s must be zero or more, got {0}")]
    InvalidAnchorSkew(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavMgrParams {
    /// Check values which deserialize but can't be used.
    ///
    /// An infinite anchor skew is allowed and accepts any skew.
    pub fn validate(&self) -> Result<(), ParamsError> {
        match self.max_anchor_skew_s {
            Some(s) if s.is_nan() || s < 0.0 => Err(ParamsError::InvalidAnchorSkew(s)),
            _ => Ok(()),
        }
    }
}

impl Default for NavMgrParams {
    fn default() -> Self {
        Self {
            go_speed_ms: 0.3,
            heading_formula: HeadingFormula::Yaw,
            max_anchor_skew_s: None,
            steer_ctrl: steer_ctrl::Params::default(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
