//! # Goal queues
//!
//! Goals are held in two first-in first-out queues, one per frame. The front of the queue for
//! the active following state is the active goal, which is popped once the vehicle arrives at
//! it. Goals are never modified once queued.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod loader;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::collections::{vec_deque, VecDeque};
use std::fmt;

// Internal
use comms_if::msg::Pose2D;
pub use loader::{BackgroundGoalLoader, FileGoalLoader, GoalLoader, LoadRequest};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single FIFO queue of goals.
#[derive(Debug, Clone, Default)]
pub struct GoalQueue(VecDeque<Pose2D>);

/// The local and global goal queues.
#[derive(Debug, Clone, Default)]
pub struct GoalQueues {
    /// Goals in the local (odometry) frame
    pub local: GoalQueue,

    /// Goals in the global frame, `x` northing and `y` easting
    pub global: GoalQueue,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The frame a goal is expressed in, selecting which queue it belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalFrame {
    Local,
    Global,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a goal to the back of the queue.
    pub fn push(&mut self, goal: Pose2D) {
        self.0.push_back(goal);
    }

    /// The goal at the front of the queue, if any.
    pub fn front(&self) -> Option<&Pose2D> {
        self.0.front()
    }

    /// Remove and return the goal at the front of the queue.
    pub fn pop_front(&mut self) -> Option<Pose2D> {
        self.0.pop_front()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Pose2D> {
        self.0.iter()
    }
}

impl Extend<Pose2D> for GoalQueue {
    fn extend<I: IntoIterator<Item = Pose2D>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl GoalQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a goal to the back of the queue for the given frame.
    pub fn push(&mut self, frame: GoalFrame, goal: Pose2D) {
        self.get_mut(frame).push(goal);
    }

    pub fn get(&self, frame: GoalFrame) -> &GoalQueue {
        match frame {
            GoalFrame::Local => &self.local,
            GoalFrame::Global => &self.global,
        }
    }

    pub fn get_mut(&mut self, frame: GoalFrame) -> &mut GoalQueue {
        match frame {
            GoalFrame::Local => &mut self.local,
            GoalFrame::Global => &mut self.global,
        }
    }

    /// Empty both queues.
    pub fn clear(&mut self) {
        self.local.clear();
        self.global.clear();
    }
}

impl fmt::Display for GoalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalFrame::Local => write!(f, "local"),
            GoalFrame::Global => write!(f, "global"),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut q = GoalQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.pop_front(), None);

        q.push(Pose2D::new(1.0, 0.0, 0.0));
        q.push(Pose2D::new(2.0, 0.0, 0.0));
        q.extend(vec![Pose2D::new(3.0, 0.0, 0.0)]);

        assert_eq!(q.len(), 3);
        assert_eq!(q.front(), Some(&Pose2D::new(1.0, 0.0, 0.0)));
        assert_eq!(q.pop_front(), Some(Pose2D::new(1.0, 0.0, 0.0)));
        assert_eq!(q.pop_front(), Some(Pose2D::new(2.0, 0.0, 0.0)));
        assert_eq!(q.pop_front(), Some(Pose2D::new(3.0, 0.0, 0.0)));
        assert!(q.is_empty());
    }

    #[test]
    fn test_queues_by_frame() {
        let mut qs = GoalQueues::new();

        qs.push(GoalFrame::Local, Pose2D::new(1.0, 1.0, 0.0));
        qs.push(GoalFrame::Global, Pose2D::new(5_700_000.0, 699_000.0, 0.0));
        qs.push(GoalFrame::Global, Pose2D::new(5_700_010.0, 699_000.0, 0.0));

        assert_eq!(qs.get(GoalFrame::Local).len(), 1);
        assert_eq!(qs.global.len(), 2);

        qs.clear();
        assert!(qs.local.is_empty());
        assert!(qs.global.is_empty());
    }
}
