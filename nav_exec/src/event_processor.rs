//! # Event processor module
//!
//! The event processor handles navigation events coming from any source, converting them into
//! the form the navigation manager works with and posting them to the inbox.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};

// Internal
use crate::{goals::GoalFrame, inbox::Inbox};
use comms_if::{
    event::NavEvent,
    msg::{GlobalPosition, HeadingFormula, Pose2D},
};
use util::geo;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute an event.
///
/// Odometry orientations are reduced to a heading using `heading_formula`. Satellite fixes are
/// projected into UTM, fixes outside the UTM grid are dropped with a warning.
pub fn exec(inbox: &Inbox, event: &NavEvent, heading_formula: HeadingFormula) {
    trace!("Processing {} event", event.kind());

    match event {
        NavEvent::LocalOdom(obs) => {
            inbox.post_local_pose(Pose2D::from_odom(obs, heading_formula));
        }
        NavEvent::GlobalFix(fix) => match geo::lat_lon_to_utm(fix.lat_deg, fix.lon_deg, fix.alt_m)
        {
            Ok(utm) => {
                inbox.post_global_position(GlobalPosition::new(utm.northing_m, utm.easting_m))
            }
            Err(e) => warn!("Dropping global fix: {}", e),
        },
        NavEvent::GlobalPosition(pos) => {
            inbox.post_global_position(*pos);
        }
        NavEvent::GlobalOdom(obs) => {
            inbox.post_global_pose(Pose2D::from_odom(obs, heading_formula));
        }
        NavEvent::GoalLocal(goal) => {
            inbox.post_goal(GoalFrame::Local, *goal);
        }
        NavEvent::GoalGlobal(goal) => {
            inbox.post_goal(GoalFrame::Global, *goal);
        }
        NavEvent::Cmd { text } => {
            inbox.post_cmd(text.as_str());
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
