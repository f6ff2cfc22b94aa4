//! # NavMgr module
//!
//! This module implements the [`NavMgr`] state machine, which decides what the vehicle should be
//! doing and produces exactly one velocity command each tick. The state machine has four states:
//!
//! - `Idle` - Stationary, zero velocity is commanded.
//! - `Go` - Drive straight ahead at a fixed speed, no goals are consumed.
//! - `FollowLocal` - Drive to each goal in the local queue in turn.
//! - `FollowGlobal` - Drive to each goal in the global queue in turn, reconciling each into the
//!   local frame as it is driven to.
//!
//! A tick is made up of:
//!
//! 1. Applying everything posted to the [`Inbox`] since the last tick.
//! 2. Interpreting the command, if one was posted, which may request a new state.
//! 3. Committing the requested state, if it differs from the current one.
//! 4. Executing the behaviour of the current state.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod cmd_interp;
mod params;
pub mod tm;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::time::{Duration, Instant};

use comms_if::msg::{Pose2D, VelCmd};
use log::{debug, info, warn};
use serde::Serialize;

pub use self::{
    cmd_interp::Interpretation,
    params::{NavMgrParams, ParamsError},
    tm::NavTm,
};
use crate::{
    goals::{GoalFrame, GoalLoader, GoalQueues},
    inbox::{Inbox, InboxContents},
    loc::{self, PoseStore},
    steer_ctrl::SteerCtrl,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation Manager
///
/// Owns the pose store and goal queues. Other threads reach it only through the [`Inbox`].
pub struct NavMgr {
    params: NavMgrParams,

    steer_ctrl: SteerCtrl,

    pose_store: PoseStore,

    goals: GoalQueues,

    state: NavState,

    /// The state requested by the last command, committed at the next tick
    pending_state: NavState,

    /// When the current state was entered
    state_entry: Instant,

    /// Set once the lack of goals has been reported, so it's only reported once per occurrence
    no_goals_reported: bool,

    /// Set once an untrusted anchor has been reported
    anchor_error_reported: bool,

    tm: NavTm,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the navigation manager.
#[derive(Debug, thiserror::Error)]
pub enum NavMgrError {
    #[error("Failed to load NavMgrParams: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid NavMgrParams: {0}")]
    InvalidParams(ParamsError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavState {
    Idle,
    Go,
    FollowLocal,
    FollowGlobal,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavMgr {
    /// Create a new manager in the `Idle` state.
    pub fn new(params: NavMgrParams) -> Self {
        Self {
            steer_ctrl: SteerCtrl::new(params.steer_ctrl.clone()),
            params,
            pose_store: PoseStore::new(),
            goals: GoalQueues::new(),
            state: NavState::Idle,
            pending_state: NavState::Idle,
            state_entry: Instant::now(),
            no_goals_reported: false,
            anchor_error_reported: false,
            tm: NavTm::default(),
        }
    }

    /// Create a new manager, loading the parameters from the given file in the params directory.
    pub fn init(params_path: &str) -> Result<Self, NavMgrError> {
        let params: NavMgrParams =
            util::params::load(params_path).map_err(NavMgrError::ParamLoadError)?;
        params.validate().map_err(NavMgrError::InvalidParams)?;

        Ok(Self::new(params))
    }

    /// Drain the inbox and step the state machine, returning the velocity command for this tick.
    pub fn tick(&mut self, inbox: &Inbox, loader: &mut dyn GoalLoader, now: Instant) -> VelCmd {
        let cmd = self.apply_inbox(inbox.drain());
        self.step(cmd.as_deref(), loader, now)
    }

    /// Apply inbox contents to the pose store and goal queues, returning the command, if any.
    pub fn apply_inbox(&mut self, contents: InboxContents) -> Option<String> {
        if let Some(s) = contents.local_pose {
            self.pose_store.update_local_at(s.value, s.stamp);
        }
        if let Some(s) = contents.global_position {
            self.pose_store.update_global_position_at(s.value, s.stamp);
        }
        if let Some(s) = contents.global_pose {
            self.pose_store.update_global_pose_at(s.value, s.stamp);
        }

        for (frame, goal) in contents.goals {
            debug!("New {} goal {}", frame, goal);
            self.goals.push(frame, goal);
        }

        contents.cmd
    }

    /// Step the state machine with the given command, returning the velocity command.
    pub fn step(&mut self, cmd: Option<&str>, loader: &mut dyn GoalLoader, now: Instant) -> VelCmd {
        // ---- COMMAND ----

        if let Some(text) = cmd {
            self.tm.last_cmd = Some(text.to_string());

            match cmd_interp::interpret(
                text,
                self.state,
                &mut self.pending_state,
                &mut self.goals,
                loader,
            ) {
                Interpretation::Applied(c) => info!("{} command executed", c),
                Interpretation::Rejected(c, s) => debug!("{} command ignored in {}", c, s),
                Interpretation::Unrecognised(e) => debug!("Command ignored: {}", e),
            }
        }

        // ---- TRANSITION ----

        if self.pending_state != self.state {
            info!("NavMgr state change: {} -> {}", self.state, self.pending_state);

            self.state = self.pending_state;
            self.state_entry = now;
            self.no_goals_reported = false;
            self.anchor_error_reported = false;
        }

        // ---- BEHAVIOUR ----

        self.tm.active_goal = None;
        self.tm.distance_to_goal_m = None;
        self.tm.steering_error_rad = None;

        let vel_cmd = match self.state {
            NavState::Idle => VelCmd::zero(),
            NavState::Go => VelCmd::new(self.params.go_speed_ms, 0.0),
            NavState::FollowLocal => self.follow(GoalFrame::Local),
            NavState::FollowGlobal => self.follow(GoalFrame::Global),
        };

        self.update_tm(vel_cmd, now);

        vel_cmd
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn pending_state(&self) -> NavState {
        self.pending_state
    }

    /// Time since the current state was entered.
    pub fn time_in_state(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.state_entry)
    }

    pub fn params(&self) -> &NavMgrParams {
        &self.params
    }

    pub fn pose_store(&self) -> &PoseStore {
        &self.pose_store
    }

    pub fn pose_store_mut(&mut self) -> &mut PoseStore {
        &mut self.pose_store
    }

    pub fn goals(&self) -> &GoalQueues {
        &self.goals
    }

    pub fn goals_mut(&mut self) -> &mut GoalQueues {
        &mut self.goals
    }

    /// Telemetry as of the last tick.
    pub fn tm(&self) -> &NavTm {
        &self.tm
    }

    /// Drive to the front goal of the given queue.
    fn follow(&mut self, frame: GoalFrame) -> VelCmd {
        let goal = match self.goals.get(frame).front() {
            Some(g) => *g,
            None => {
                if !self.no_goals_reported {
                    info!("No {} goals, waiting", frame);
                    self.no_goals_reported = true;
                }
                return VelCmd::zero();
            }
        };
        self.no_goals_reported = false;

        let target = match frame {
            GoalFrame::Local => goal,
            GoalFrame::Global => match self.reconcile(&goal) {
                Some(t) => t,
                None => return VelCmd::zero(),
            },
        };

        let (vel_cmd, report) = self
            .steer_ctrl
            .drive_to_with_report(&target, &self.pose_store.local_pose());

        self.tm.active_goal = Some(target);
        self.tm.distance_to_goal_m = Some(report.distance_m);
        self.tm.steering_error_rad = Some(report.steering_error_rad);

        if report.arrived {
            self.goals.get_mut(frame).pop_front();
            info!(
                "Reached {} goal {}, {} remaining",
                frame,
                goal,
                self.goals.get(frame).len()
            );
        }

        vel_cmd
    }

    /// Convert a global goal into the local frame, or `None` if the anchors can't be trusted.
    fn reconcile(&mut self, goal: &Pose2D) -> Option<Pose2D> {
        if let Some(max_skew_s) = self.params.max_anchor_skew_s {
            if let Err(e) = loc::check_anchors(&self.pose_store, max_skew_s) {
                if !self.anchor_error_reported {
                    warn!("Holding position, cannot reconcile global goal: {}", e);
                    self.anchor_error_reported = true;
                }
                return None;
            }
            self.anchor_error_reported = false;
        }

        Some(loc::to_local_frame(&self.pose_store, goal))
    }

    fn update_tm(&mut self, vel_cmd: VelCmd, now: Instant) {
        self.tm.state = self.state;
        self.tm.time_in_state_s = self.time_in_state(now).as_secs_f64();
        self.tm.num_local_goals = self.goals.local.len();
        self.tm.num_global_goals = self.goals.global.len();
        self.tm.vel_cmd = vel_cmd;
        self.tm.local_pose = self.pose_store.local_pose();
        self.tm.global_position = self.pose_store.global_position();
        self.tm.global_pose = self.pose_store.global_pose();
    }
}

impl Default for NavState {
    fn default() -> Self {
        NavState::Idle
    }
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavState::Idle => write!(f, "IDLE"),
            NavState::Go => write!(f, "GO"),
            NavState::FollowLocal => write!(f, "FOLLOW_LOCAL"),
            NavState::FollowGlobal => write!(f, "FOLLOW_GLOBAL"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
