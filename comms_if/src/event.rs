//! # Inbound events
//!
//! Everything the supervisor learns about the outside world arrives as a [`NavEvent`]. Events
//! are serialised as JSON objects tagged by a `type` field, for example:
//!
//! ```json
//! {"type": "goal_local", "x": 10.0, "y": 0.0}
//! {"type": "cmd", "text": "DRIVE_ODOM"}
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::msg::{GeoFix, GlobalPosition, OdomObs, Pose2D};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavEvent {
    /// Local frame odometry observation.
    LocalOdom(OdomObs),

    /// Satellite fix, to be projected into the global frame.
    GlobalFix(GeoFix),

    /// Global frame position that has already been projected.
    GlobalPosition(GlobalPosition),

    /// Odometry observation expressed in the global frame.
    GlobalOdom(OdomObs),

    /// A new goal in the local frame.
    GoalLocal(Pose2D),

    /// A new goal in the global frame (`x` northing, `y` easting).
    GoalGlobal(Pose2D),

    /// Command text, see [`crate::tc::NavCmd`].
    Cmd { text: String },
}

#[derive(Debug, Error)]
pub enum NavEventParseError {
    #[error("Event contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavEvent {
    /// Parse an event from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, NavEventParseError> {
        serde_json::from_str(json_str).map_err(NavEventParseError::InvalidJson)
    }

    /// Short name of the event kind, used when logging.
    pub fn kind(&self) -> &'static str {
        match self {
            NavEvent::LocalOdom(_) => "local_odom",
            NavEvent::GlobalFix(_) => "global_fix",
            NavEvent::GlobalPosition(_) => "global_position",
            NavEvent::GlobalOdom(_) => "global_odom",
            NavEvent::GoalLocal(_) => "goal_local",
            NavEvent::GoalGlobal(_) => "goal_global",
            NavEvent::Cmd { .. } => "cmd",
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::msg::Orientation;

    #[test]
    fn test_parse_events() {
        assert_eq!(
            NavEvent::from_json(r#"{"type": "goal_local", "x": 10.0, "y": 0.0}"#).unwrap(),
            NavEvent::GoalLocal(Pose2D::new(10.0, 0.0, 0.0))
        );

        assert_eq!(
            NavEvent::from_json(r#"{"type": "cmd", "text": "GO"}"#).unwrap(),
            NavEvent::Cmd { text: "GO".into() }
        );

        assert_eq!(
            NavEvent::from_json(r#"{"type": "global_fix", "lat_deg": 51.0, "lon_deg": -1.5}"#)
                .unwrap(),
            NavEvent::GlobalFix(GeoFix {
                lat_deg: 51.0,
                lon_deg: -1.5,
                alt_m: 0.0
            })
        );

        let odom = NavEvent::from_json(
            r#"{
                "type": "local_odom",
                "x_m": 1.0, "y_m": 2.0,
                "orientation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}
            }"#,
        )
        .unwrap();
        assert_eq!(
            odom,
            NavEvent::LocalOdom(OdomObs {
                x_m: 1.0,
                y_m: 2.0,
                z_m: 0.0,
                orientation: Orientation {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    w: 1.0
                }
            })
        );
        assert_eq!(odom.kind(), "local_odom");
    }

    #[test]
    fn test_parse_rejects() {
        assert!(NavEvent::from_json(r#"{"type": "teleport", "x": 1.0}"#).is_err());
        assert!(NavEvent::from_json(r#"{"type": "goal_local", "x": 1.0}"#).is_err());
        assert!(NavEvent::from_json("GO").is_err());
    }

    #[test]
    fn test_event_serialises_with_tag() {
        let json = serde_json::to_string(&NavEvent::GlobalPosition(GlobalPosition::new(
            5_700_000.0,
            699_000.0,
        )))
        .unwrap();
        assert!(json.contains(r#""type":"global_position""#));
        assert!(json.contains(r#""northing_m":5700000.0"#));
    }
}
