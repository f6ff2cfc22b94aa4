//! Reconciliation of global frame goals into the local frame
//!
//! The local frame has no fixed relationship to the global one since odometry drifts. Instead the
//! latest local pose and the latest global position are treated as the same physical point, and
//! a global goal is placed in the local frame at the same offset from the vehicle as it has in
//! the global frame.
//!
//! Axes are mapped as:
//!
//! - local x = +easting
//! - local y = -northing
//!
//! The result is only as good as the assumption that the two anchors describe the same instant.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// Internal
use super::PoseStore;
use comms_if::msg::{GlobalPosition, Pose2D};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons the anchors may not be trusted for reconciliation.
#[derive(Debug, Error, PartialEq)]
pub enum AnchorError {
    #[error("No local pose has been received")]
    NoLocalPose,

    #[error("No global position has been received")]
    NoGlobalPosition,

    #[error("Local pose and global position are {0:.3} s apart (limit {1:.3} s)")]
    Skewed(f64, f64),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a global frame goal (`x` northing, `y` easting) into the local frame.
///
/// The heading of the returned pose is the current local heading, only the position is
/// meaningful.
pub fn to_local_frame(store: &PoseStore, goal_global: &Pose2D) -> Pose2D {
    let goal = GlobalPosition::from(goal_global);
    let anchor = store.global_position();
    let cur = store.local_pose();

    let d_northing_m = goal.northing_m - anchor.northing_m;
    let d_easting_m = goal.easting_m - anchor.easting_m;

    Pose2D {
        x: cur.x + d_easting_m,
        y: cur.y - d_northing_m,
        theta: cur.theta,
    }
}

/// Check that both anchors exist and were written no more than `max_skew_s` apart.
///
/// An infinite limit accepts any skew, a NaN limit accepts none.
pub fn check_anchors(store: &PoseStore, max_skew_s: f64) -> Result<(), AnchorError> {
    if store.local_pose_stamp().is_none() {
        return Err(AnchorError::NoLocalPose);
    }

    let skew_s = store
        .anchor_skew()
        .ok_or(AnchorError::NoGlobalPosition)?
        .as_secs_f64();

    if skew_s <= max_skew_s {
        Ok(())
    } else {
        Err(AnchorError::Skewed(skew_s, max_skew_s))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
