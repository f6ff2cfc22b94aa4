//! # Navigation messages
//!
//! Two planar frames are used throughout the software:
//!
//! - The local (odometry) frame, anchored where the vehicle started. Short term motion is
//!   accurate in this frame but it drifts over time.
//! - The global (UTM) frame, a fixed planar projection of satellite positions. Global positions
//!   and goals are stored with `x` as the northing and `y` as the easting.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point2, Quaternion, UnitQuaternion};
use serde::{Deserialize, Deserializer, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A position in a plane plus a heading.
///
/// `theta` is in radians, measured anticlockwise from the frame's X axis, and is kept in the
/// range (-pi, pi] by the constructors.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    #[serde(default, deserialize_with = "deserialize_angle")]
    pub theta: f64,
}

/// An orientation quaternion as it arrives from an odometry source.
///
/// The components are kept as received, they are not normalised.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// An odometry observation: a 3D position and orientation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdomObs {
    pub x_m: f64,
    pub y_m: f64,
    #[serde(default)]
    pub z_m: f64,
    pub orientation: Orientation,
}

/// A position in the global (UTM) frame.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalPosition {
    pub northing_m: f64,
    pub easting_m: f64,
}

/// A satellite navigation fix in geodetic coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub lat_deg: f64,
    pub lon_deg: f64,
    #[serde(default)]
    pub alt_m: f64,
}

/// A velocity command sent to the vehicle's motion controller.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelCmd {
    /// Forward speed in meters/second
    pub linear_ms: f64,

    /// Turn rate in radians/second, positive anticlockwise (to the left)
    pub angular_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The method used to reduce a 3D orientation to a planar heading.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingFormula {
    /// Yaw of the normalised quaternion (rotation about Z in a ZYX Euler decomposition)
    Yaw,

    /// `atan2(2(zw + xy), 2(w^2 + x^2) - 1)` on the raw components.
    ///
    /// This matches `Yaw` for unit quaternions but not for unnormalised input, and is kept for
    /// parity with vehicles fielded using it.
    Legacy,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose2D {
    /// Create a new pose, normalising the heading into (-pi, pi].
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalise_angle(theta),
        }
    }

    /// Reduce an odometry observation to a planar pose.
    pub fn from_odom(obs: &OdomObs, formula: HeadingFormula) -> Self {
        Self::new(obs.x_m, obs.y_m, obs.orientation.heading(formula))
    }

    /// The position of the pose.
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose2D) -> f64 {
        (other.position() - self.position()).norm()
    }
}

impl fmt::Display for Pose2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.1} deg)",
            self.x,
            self.y,
            self.theta.to_degrees()
        )
    }
}

impl Orientation {
    /// Orientation representing a pure rotation about the Z axis.
    pub fn from_yaw(yaw_rad: f64) -> Self {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, yaw_rad);
        Self {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        }
    }

    /// Extract the planar heading of this orientation, in (-pi, pi].
    pub fn heading(&self, formula: HeadingFormula) -> f64 {
        let heading = match formula {
            HeadingFormula::Yaw => {
                UnitQuaternion::from_quaternion(Quaternion::new(self.w, self.x, self.y, self.z))
                    .euler_angles()
                    .2
            }
            HeadingFormula::Legacy => (2.0 * (self.z * self.w + self.x * self.y))
                .atan2(-1.0 + 2.0 * (self.w * self.w + self.x * self.x)),
        };

        normalise_angle(heading)
    }
}

impl GlobalPosition {
    pub fn new(northing_m: f64, easting_m: f64) -> Self {
        Self {
            northing_m,
            easting_m,
        }
    }
}

impl From<&Pose2D> for GlobalPosition {
    /// Interpret a global-frame pose (`x` northing, `y` easting) as a position.
    fn from(pose: &Pose2D) -> Self {
        Self::new(pose.x, pose.y)
    }
}

impl VelCmd {
    /// A command with no motion.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new(linear_ms: f64, angular_rads: f64) -> Self {
        Self {
            linear_ms,
            angular_rads,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.linear_ms == 0.0 && self.angular_rads == 0.0
    }
}

impl fmt::Display for VelCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lin {:.3} m/s, ang {:.3} rad/s",
            self.linear_ms, self.angular_rads
        )
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Normalise an angle into (-pi, pi].
fn normalise_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;

    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Deserialize an angle, normalising it into (-pi, pi].
fn deserialize_angle<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(normalise_angle)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_pose_normalises_heading() {
        assert_relative_eq!(Pose2D::new(0.0, 0.0, -PI).theta, PI);
        assert_relative_eq!(Pose2D::new(0.0, 0.0, 1.5 * PI).theta, -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(Pose2D::new(0.0, 0.0, 0.25).theta, 0.25);
    }

    #[test]
    fn test_deserialized_pose_normalises_heading() {
        let pose: Pose2D = serde_json::from_str(r#"{"x": 1.0, "y": 2.0, "theta": 7.0}"#).unwrap();
        assert_relative_eq!(pose.theta, 7.0 - TAU, epsilon = 1e-12);

        let pose: Pose2D = serde_json::from_str(r#"{"x": 1.0, "y": 2.0, "theta": -3.5}"#).unwrap();
        assert_relative_eq!(pose.theta, TAU - 3.5, epsilon = 1e-12);

        let pose: Pose2D = serde_json::from_str(r#"{"x": 1.0, "y": 2.0}"#).unwrap();
        assert_eq!(pose.theta, 0.0);
    }

    #[test]
    fn test_heading_from_yaw() {
        for yaw in &[0.0, 0.3, FRAC_PI_2, -2.5, 3.0] {
            let q = Orientation::from_yaw(*yaw);
            assert_relative_eq!(q.heading(HeadingFormula::Yaw), *yaw, epsilon = 1e-9);
            assert_relative_eq!(q.heading(HeadingFormula::Legacy), *yaw, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_heading_ignores_roll_and_pitch() {
        let q = UnitQuaternion::from_euler_angles(0.1, -0.05, 1.2);
        let o = Orientation {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        };
        assert_relative_eq!(o.heading(HeadingFormula::Yaw), 1.2, epsilon = 1e-9);
    }

    #[test]
    fn test_legacy_formula_on_unnormalised_input() {
        // Scaled identity quaternion: yaw is still zero once normalised but the legacy formula
        // sees a negative denominator and flips round to pi.
        let o = Orientation {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 0.5,
        };
        assert_relative_eq!(o.heading(HeadingFormula::Yaw), 0.0);
        assert_relative_eq!(o.heading(HeadingFormula::Legacy), PI);
    }

    #[test]
    fn test_pose_from_odom() {
        let obs = OdomObs {
            x_m: 1.0,
            y_m: -2.0,
            z_m: 0.3,
            orientation: Orientation::from_yaw(FRAC_PI_2),
        };
        let pose = Pose2D::from_odom(&obs, HeadingFormula::Yaw);
        assert_eq!(pose.x, 1.0);
        assert_eq!(pose.y, -2.0);
        assert_relative_eq!(pose.theta, FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_distance() {
        let a = Pose2D::new(0.0, 0.0, 0.0);
        let b = Pose2D::new(3.0, 4.0, 1.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
    }
}
