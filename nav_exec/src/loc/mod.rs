//! # Localisation module
//!
//! The vehicle is localised by external sources, this module only keeps the latest value each of
//! them reported. Three independent estimates are held:
//!
//! - The local pose, from odometry in the local frame.
//! - The global position, from the satellite fix projected into UTM.
//! - The global pose, from an odometry source tracked in the global frame.
//!
//! Each is overwritten whenever a new value arrives and nothing is buffered. The latest value at
//! the time of a tick is taken as the truth.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod frame;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::{Duration, Instant};

// Internal
use comms_if::msg::{GlobalPosition, Pose2D};
pub use frame::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A value plus the instant it was written.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stamped<T> {
    pub value: T,
    pub stamp: Instant,
}

/// Latest known pose estimates.
///
/// Before the first update of a field its value is the default (all zeros) and its stamp is
/// `None`.
#[derive(Debug, Clone, Default)]
pub struct PoseStore {
    local_pose: Pose2D,
    local_pose_stamp: Option<Instant>,

    global_position: GlobalPosition,
    global_position_stamp: Option<Instant>,

    global_pose: Pose2D,
    global_pose_stamp: Option<Instant>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> Stamped<T> {
    /// Stamp a value with the current instant.
    pub fn now(value: T) -> Self {
        Self {
            value,
            stamp: Instant::now(),
        }
    }
}

impl PoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the local pose.
    pub fn update_local(&mut self, pose: Pose2D) {
        self.update_local_at(pose, Instant::now());
    }

    /// Replace the local pose with a value observed at the given instant.
    pub fn update_local_at(&mut self, pose: Pose2D, stamp: Instant) {
        self.local_pose = pose;
        self.local_pose_stamp = Some(stamp);
    }

    /// Replace the global position.
    pub fn update_global_position(&mut self, pos: GlobalPosition) {
        self.update_global_position_at(pos, Instant::now());
    }

    /// Replace the global position with a value observed at the given instant.
    pub fn update_global_position_at(&mut self, pos: GlobalPosition, stamp: Instant) {
        self.global_position = pos;
        self.global_position_stamp = Some(stamp);
    }

    /// Replace the global pose.
    pub fn update_global_pose(&mut self, pose: Pose2D) {
        self.update_global_pose_at(pose, Instant::now());
    }

    /// Replace the global pose with a value observed at the given instant.
    pub fn update_global_pose_at(&mut self, pose: Pose2D, stamp: Instant) {
        self.global_pose = pose;
        self.global_pose_stamp = Some(stamp);
    }

    pub fn local_pose(&self) -> Pose2D {
        self.local_pose
    }

    pub fn global_position(&self) -> GlobalPosition {
        self.global_position
    }

    pub fn global_pose(&self) -> Pose2D {
        self.global_pose
    }

    pub fn local_pose_stamp(&self) -> Option<Instant> {
        self.local_pose_stamp
    }

    pub fn global_position_stamp(&self) -> Option<Instant> {
        self.global_position_stamp
    }

    pub fn global_pose_stamp(&self) -> Option<Instant> {
        self.global_pose_stamp
    }

    /// Time between the local pose and global position updates, the two anchors used when
    /// reconciling a global goal into the local frame.
    ///
    /// Returns `None` if either anchor has never been written.
    pub fn anchor_skew(&self) -> Option<Duration> {
        match (self.local_pose_stamp, self.global_position_stamp) {
            (Some(l), Some(g)) => Some(if l > g { l - g } else { g - l }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
