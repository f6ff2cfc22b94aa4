//! # Steering control module
//!
//! Steering control drives the vehicle straight at a target point. It is a memoryless
//! proportional controller on the heading error:
//!
//! - The bearing to the target is found from the current position.
//! - The steering error is the current heading minus that bearing, wrapped into (-pi, pi].
//! - The turn rate demand is the negated steering error scaled by the heading gain, saturated at
//!   the maximum turn rate. The forward speed demand is constant.
//!
//! Once the target is closer than the arrival threshold the target is reached and the demand is
//! zero.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use comms_if::msg::{Pose2D, VelCmd};
pub use params::Params;
use util::maths::{limit, shortest_ang_dist};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering controller.
#[derive(Debug, Clone, Default)]
pub struct SteerCtrl {
    params: Params,
}

/// Geometry of the target relative to the vehicle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// Distance to the target
    pub distance_m: f64,

    /// Bearing of the target from the current position, in the frame of the poses
    pub bearing_rad: f64,

    /// Current heading minus the bearing, in (-pi, pi]
    pub steering_error_rad: f64,

    /// True if the target has been reached
    pub arrived: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerCtrl {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Compute the velocity command driving from `current` to `target`, and whether the target
    /// has been reached.
    ///
    /// Only the position of `target` is used.
    pub fn drive_to(&self, target: &Pose2D, current: &Pose2D) -> (VelCmd, bool) {
        let (cmd, report) = self.drive_to_with_report(target, current);
        (cmd, report.arrived)
    }

    /// As [`SteerCtrl::drive_to`] but also returning the target geometry.
    pub fn drive_to_with_report(&self, target: &Pose2D, current: &Pose2D) -> (VelCmd, StatusReport) {
        let report = self.report(target, current);

        if report.arrived {
            return (VelCmd::zero(), report);
        }

        let angular_rads = limit(
            -report.steering_error_rad * self.params.heading_gain,
            self.params.max_turn_rate_rads,
        );

        (
            VelCmd::new(self.params.cruise_speed_ms, angular_rads),
            report,
        )
    }

    /// Compute the target geometry without producing a command.
    pub fn report(&self, target: &Pose2D, current: &Pose2D) -> StatusReport {
        let delta: Vector2<f64> = target.position() - current.position();

        let distance_m = delta.norm();
        let bearing_rad = delta.y.atan2(delta.x);

        StatusReport {
            distance_m,
            bearing_rad,
            steering_error_rad: shortest_ang_dist(bearing_rad, current.theta),
            arrived: distance_m < self.params.arrival_threshold_m,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_aligned_goal() {
        let ctrl = SteerCtrl::default();
        let (cmd, arrived) =
            ctrl.drive_to(&Pose2D::new(10.0, 0.0, 0.0), &Pose2D::new(0.0, 0.0, 0.0));

        assert!(!arrived);
        assert_relative_eq!(cmd.linear_ms, 0.5);
        assert_relative_eq!(cmd.angular_rads, 0.0);
    }

    #[test]
    fn test_idempotent() {
        let ctrl = SteerCtrl::default();
        let target = Pose2D::new(3.0, -7.0, 0.0);
        let current = Pose2D::new(-1.0, 2.0, 2.2);

        assert_eq!(
            ctrl.drive_to(&target, &current),
            ctrl.drive_to(&target, &current)
        );
    }

    #[test]
    fn test_arrival_boundary() {
        let ctrl = SteerCtrl::default();
        let current = Pose2D::new(0.0, 0.0, 0.0);

        let (cmd, arrived) = ctrl.drive_to(&Pose2D::new(0.5, 0.0, 0.0), &current);
        assert!(!arrived);
        assert!(!cmd.is_zero());

        let (cmd, arrived) = ctrl.drive_to(&Pose2D::new(0.499, 0.0, 0.0), &current);
        assert!(arrived);
        assert!(cmd.is_zero());
    }

    #[test]
    fn test_turn_rate_saturates() {
        let ctrl = SteerCtrl::default();

        // Target directly behind, steering error of pi
        let (cmd, _) = ctrl.drive_to(&Pose2D::new(-10.0, 0.0, 0.0), &Pose2D::new(0.0, 0.0, 0.0));
        assert_relative_eq!(cmd.angular_rads.abs(), 0.3);

        let report = ctrl.report(&Pose2D::new(-10.0, 0.0, 0.0), &Pose2D::new(0.0, 0.0, 0.0));
        assert_relative_eq!(report.steering_error_rad.abs(), PI);
    }

    #[test]
    fn test_turns_towards_target() {
        let ctrl = SteerCtrl::default();

        // Target to the left, so turn anticlockwise
        let (cmd, _) = ctrl.drive_to(&Pose2D::new(10.0, 1.0, 0.0), &Pose2D::new(0.0, 0.0, 0.0));
        assert!(cmd.angular_rads > 0.0);
        assert!(cmd.angular_rads < 0.3);
        assert_relative_eq!(cmd.angular_rads, 0.5 * (0.1f64).atan(), epsilon = 1e-12);

        // Target to the right of a vehicle facing +y, so turn clockwise
        let (cmd, _) =
            ctrl.drive_to(&Pose2D::new(1.0, 10.0, 0.0), &Pose2D::new(0.0, 0.0, FRAC_PI_2));
        assert!(cmd.angular_rads < 0.0);
    }

    #[test]
    fn test_custom_params() {
        let ctrl = SteerCtrl::new(Params {
            arrival_threshold_m: 2.0,
            cruise_speed_ms: 1.2,
            heading_gain: 1.0,
            max_turn_rate_rads: 1.0,
        });

        let (cmd, arrived) = ctrl.drive_to(&Pose2D::new(1.5, 0.0, 0.0), &Pose2D::default());
        assert!(arrived);
        assert!(cmd.is_zero());

        let (cmd, _) = ctrl.drive_to(&Pose2D::new(0.0, 5.0, 0.0), &Pose2D::default());
        assert_relative_eq!(cmd.linear_ms, 1.2);
        assert_relative_eq!(cmd.angular_rads, 1.0);
    }
}
