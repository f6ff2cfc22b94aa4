//! Command interpreter
//!
//! Maps command text onto a requested state and any goal queue side effects. Commands whose
//! preconditions aren't met, and text which isn't a command at all, change nothing.
//!
//! | Command       | Precondition  | Effect                          |
//! |---------------|---------------|---------------------------------|
//! | `GO`          | `Idle`        | request `Go`                    |
//! | `STOP`        | not `Idle`    | request `Idle`                  |
//! | `DRIVE_ODOM`  | `Idle`        | request `FollowLocal`           |
//! | `DRIVE_UTM`   | `Idle`        | request `FollowGlobal`          |
//! | `RESET`       |               | clear both queues, request `Idle` |
//! | `CLEAR_GOALS` |               | clear both queues               |
//! | `LOAD_KML`    |               | load global goals               |
//! | `LOAD_ODOM`   |               | load local goals                |
//!
//! Clearing the queues also cancels any goal loads still in progress.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::{NavCmd, NavCmdParseError};

use super::NavState;
use crate::goals::{GoalLoader, GoalQueues, LoadRequest};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Outcome of interpreting a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// The command was applied.
    Applied(NavCmd),

    /// The command was valid but can't be executed in the current state.
    Rejected(NavCmd, NavState),

    /// The text was not a command.
    Unrecognised(NavCmdParseError),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Interpret a command given the current state.
///
/// Preconditions are checked against `state`, the state committed at the last tick. Requested
/// transitions are written to `pending_state`.
pub(crate) fn interpret(
    text: &str,
    state: NavState,
    pending_state: &mut NavState,
    goals: &mut GoalQueues,
    loader: &mut dyn GoalLoader,
) -> Interpretation {
    let cmd: NavCmd = match text.parse() {
        Ok(c) => c,
        Err(e) => return Interpretation::Unrecognised(e),
    };

    let idle = state == NavState::Idle;

    match cmd {
        NavCmd::Go if idle => *pending_state = NavState::Go,
        NavCmd::DriveOdom if idle => *pending_state = NavState::FollowLocal,
        NavCmd::DriveUtm if idle => *pending_state = NavState::FollowGlobal,
        NavCmd::Stop if !idle => *pending_state = NavState::Idle,
        NavCmd::Go | NavCmd::DriveOdom | NavCmd::DriveUtm | NavCmd::Stop => {
            return Interpretation::Rejected(cmd, state)
        }
        NavCmd::Reset => {
            clear_goals(goals, loader);
            *pending_state = NavState::Idle;
        }
        NavCmd::ClearGoals => clear_goals(goals, loader),
        NavCmd::LoadKml(_) | NavCmd::LoadOdom(_) => {
            if let Some(request) = LoadRequest::from_cmd(&cmd) {
                loader.load(request, goals);
            }
        }
    }

    Interpretation::Applied(cmd)
}

fn clear_goals(goals: &mut GoalQueues, loader: &mut dyn GoalLoader) {
    goals.clear();
    loader.cancel();
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
