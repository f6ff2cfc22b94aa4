//! # Kinematic simulator
//!
//! Closes the loop on the velocity commands when no vehicle is connected. The vehicle is modelled
//! as a unicycle which follows the last command exactly. Odometry is reported in the local frame,
//! with the origin where the simulation started, and a global position is derived from a
//! geodetic origin so that global goals can be followed too.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    event::NavEvent,
    msg::{GlobalPosition, OdomObs, Orientation, Pose2D, VelCmd},
};
use serde::{Deserialize, Serialize};
use util::geo::{self, UtmError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimParams {
    /// Factor applied to the commanded forward speed.
    pub speed_scale: f64,

    /// Latitude of the local frame origin.
    pub origin_lat_deg: f64,

    /// Longitude of the local frame origin.
    pub origin_lon_deg: f64,

    /// Heading at the start of the simulation, in the local frame.
    pub initial_heading_rad: f64,
}

/// Unicycle model simulator.
#[derive(Debug, Clone)]
pub struct KinematicSim {
    params: SimParams,

    /// Pose in the local frame
    pose: Pose2D,

    /// Global position of the local frame origin
    origin: GlobalPosition,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            speed_scale: 1.0,
            origin_lat_deg: 50.9352,
            origin_lon_deg: -1.3970,
            initial_heading_rad: 0.0,
        }
    }
}

impl KinematicSim {
    pub fn new(params: SimParams) -> Result<Self, UtmError> {
        let utm = geo::lat_lon_to_utm(params.origin_lat_deg, params.origin_lon_deg, 0.0)?;

        Ok(Self {
            pose: Pose2D::new(0.0, 0.0, params.initial_heading_rad),
            origin: GlobalPosition::new(utm.northing_m, utm.easting_m),
            params,
        })
    }

    /// Advance the simulation by `dt_s` seconds under the given command.
    pub fn step(&mut self, cmd: &VelCmd, dt_s: f64) {
        let speed_ms = cmd.linear_ms * self.params.speed_scale;

        // Integrate along the mean heading over the step
        let mean_heading = self.pose.theta + 0.5 * cmd.angular_rads * dt_s;

        self.pose = Pose2D::new(
            self.pose.x + speed_ms * mean_heading.cos() * dt_s,
            self.pose.y + speed_ms * mean_heading.sin() * dt_s,
            self.pose.theta + cmd.angular_rads * dt_s,
        );
    }

    /// Pose in the local frame.
    pub fn local_pose(&self) -> Pose2D {
        self.pose
    }

    /// Global position, with local x along east and local y along south.
    pub fn global_position(&self) -> GlobalPosition {
        GlobalPosition::new(
            self.origin.northing_m - self.pose.y,
            self.origin.easting_m + self.pose.x,
        )
    }

    /// Pose in the global frame, `x` northing and `y` easting with the heading measured from
    /// north towards east.
    pub fn global_pose(&self) -> Pose2D {
        let pos = self.global_position();
        let theta = self.pose.theta.cos().atan2(-self.pose.theta.sin());

        Pose2D::new(pos.northing_m, pos.easting_m, theta)
    }

    /// The observations the simulated vehicle would report this cycle.
    pub fn events(&self) -> Vec<NavEvent> {
        let global_pose = self.global_pose();

        vec![
            NavEvent::LocalOdom(OdomObs {
                x_m: self.pose.x,
                y_m: self.pose.y,
                z_m: 0.0,
                orientation: Orientation::from_yaw(self.pose.theta),
            }),
            NavEvent::GlobalPosition(self.global_position()),
            NavEvent::GlobalOdom(OdomObs {
                x_m: global_pose.x,
                y_m: global_pose.y,
                z_m: 0.0,
                orientation: Orientation::from_yaw(global_pose.theta),
            }),
        ]
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
