//! # Inbox
//!
//! The inbox is the only way data reaches the navigation manager from other threads. Poses and
//! the command are held in latest-value slots, goals are held in insertion order. At the start of
//! each tick the manager drains the inbox and applies the contents to the state it owns.
//!
//! Goals read from files arrive as whole batches. Each batch is tagged with the goal generation
//! current when its load was requested, and cancelling pending batches starts a new generation.
//! Batches from an earlier generation are discarded, so goals cleared while a file was still
//! loading never reach the queues.
//!
//! The inbox is cheap to clone, all clones share the same slots.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// Internal
use crate::goals::GoalFrame;
use crate::loc::Stamped;
use comms_if::msg::{GlobalPosition, Pose2D};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Thread safe mailbox for inbound navigation data.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    shared: Arc<Mutex<Shared>>,
}

#[derive(Debug, Default)]
struct Shared {
    contents: InboxContents,

    /// Goal batches from file loads, in the order they completed
    batches: Vec<(GoalFrame, Vec<Pose2D>)>,

    goal_generation: u64,
}

/// Everything posted to the inbox since it was last drained.
#[derive(Debug, Default)]
pub struct InboxContents {
    pub local_pose: Option<Stamped<Pose2D>>,
    pub global_position: Option<Stamped<GlobalPosition>>,
    pub global_pose: Option<Stamped<Pose2D>>,

    /// Goal insertions in the order they were posted, followed by any loaded batches
    pub goals: Vec<(GoalFrame, Pose2D)>,

    /// The most recently posted command text
    pub cmd: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_local_pose(&self, pose: Pose2D) {
        self.lock().contents.local_pose = Some(Stamped::now(pose));
    }

    pub fn post_global_position(&self, pos: GlobalPosition) {
        self.lock().contents.global_position = Some(Stamped::now(pos));
    }

    pub fn post_global_pose(&self, pose: Pose2D) {
        self.lock().contents.global_pose = Some(Stamped::now(pose));
    }

    pub fn post_goal(&self, frame: GoalFrame, goal: Pose2D) {
        self.lock().contents.goals.push((frame, goal));
    }

    /// Post command text, replacing any command not yet taken.
    pub fn post_cmd<S: Into<String>>(&self, text: S) {
        self.lock().contents.cmd = Some(text.into());
    }

    /// The current goal generation, to be passed back with a loaded batch.
    pub fn goal_generation(&self) -> u64 {
        self.lock().goal_generation
    }

    /// Post all goals loaded from one file.
    ///
    /// Returns `false`, discarding the goals, if pending batches have been cancelled since
    /// `generation` was read.
    pub fn post_goal_batch(&self, generation: u64, frame: GoalFrame, goals: Vec<Pose2D>) -> bool {
        let mut shared = self.lock();

        if shared.goal_generation != generation {
            return false;
        }

        shared.batches.push((frame, goals));
        true
    }

    /// Discard any loaded batches not yet drained and start a new goal generation.
    pub fn cancel_goal_batches(&self) {
        let mut shared = self.lock();
        shared.batches.clear();
        shared.goal_generation = shared.goal_generation.wrapping_add(1);
    }

    /// Take everything posted so far, leaving the inbox empty.
    pub fn drain(&self) -> InboxContents {
        let mut shared = self.lock();

        let mut contents = mem::take(&mut shared.contents);
        for (frame, goals) in shared.batches.drain(..) {
            contents.goals.extend(goals.into_iter().map(|g| (frame, g)));
        }

        contents
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // Every write leaves the slots consistent, so a panic elsewhere while holding the lock
        // doesn't invalidate them.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InboxContents {
    pub fn is_empty(&self) -> bool {
        self.local_pose.is_none()
            && self.global_position.is_none()
            && self.global_pose.is_none()
            && self.goals.is_empty()
            && self.cmd.is_none()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_latest_value_wins() {
        let inbox = Inbox::new();

        inbox.post_local_pose(Pose2D::new(1.0, 0.0, 0.0));
        inbox.post_local_pose(Pose2D::new(2.0, 0.0, 0.0));
        inbox.post_cmd("GO");
        inbox.post_cmd("STOP");

        let contents = inbox.drain();
        assert_eq!(
            contents.local_pose.map(|s| s.value),
            Some(Pose2D::new(2.0, 0.0, 0.0))
        );
        assert_eq!(contents.cmd.as_deref(), Some("STOP"));
        assert!(contents.global_position.is_none());

        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_goals_keep_order() {
        let inbox = Inbox::new();

        inbox.post_goal(GoalFrame::Local, Pose2D::new(1.0, 0.0, 0.0));
        inbox.post_goal(GoalFrame::Global, Pose2D::new(2.0, 0.0, 0.0));
        inbox.post_goal(GoalFrame::Local, Pose2D::new(3.0, 0.0, 0.0));

        let goals = inbox.drain().goals;
        assert_eq!(
            goals,
            vec![
                (GoalFrame::Local, Pose2D::new(1.0, 0.0, 0.0)),
                (GoalFrame::Global, Pose2D::new(2.0, 0.0, 0.0)),
                (GoalFrame::Local, Pose2D::new(3.0, 0.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_shared_between_threads() {
        let inbox = Inbox::new();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let inbox = inbox.clone();
                thread::spawn(move || {
                    for j in 0..25 {
                        inbox.post_goal(GoalFrame::Local, Pose2D::new(i as f64, j as f64, 0.0));
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let goals = inbox.drain().goals;
        assert_eq!(goals.len(), 100);

        // Each thread's goals are still in the order that thread posted them
        for i in 0..4 {
            let ys: Vec<f64> = goals
                .iter()
                .filter(|(_, g)| g.x == i as f64)
                .map(|(_, g)| g.y)
                .collect();
            assert_eq!(ys, (0..25).map(|j| j as f64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_batches_follow_direct_goals() {
        let inbox = Inbox::new();
        let generation = inbox.goal_generation();

        assert!(inbox.post_goal_batch(
            generation,
            GoalFrame::Local,
            vec![Pose2D::new(1.0, 0.0, 0.0), Pose2D::new(2.0, 0.0, 0.0)],
        ));
        inbox.post_goal(GoalFrame::Global, Pose2D::new(9.0, 0.0, 0.0));

        assert_eq!(
            inbox.drain().goals,
            vec![
                (GoalFrame::Global, Pose2D::new(9.0, 0.0, 0.0)),
                (GoalFrame::Local, Pose2D::new(1.0, 0.0, 0.0)),
                (GoalFrame::Local, Pose2D::new(2.0, 0.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_cancelled_batches_discarded() {
        let inbox = Inbox::new();
        let generation = inbox.goal_generation();

        // Posted before the cancel but not yet drained
        assert!(inbox.post_goal_batch(generation, GoalFrame::Local, vec![Pose2D::default()]));
        inbox.post_goal(GoalFrame::Local, Pose2D::new(5.0, 0.0, 0.0));

        inbox.cancel_goal_batches();

        // Posted after the cancel by a load requested before it
        assert!(!inbox.post_goal_batch(generation, GoalFrame::Global, vec![Pose2D::default()]));

        // Directly posted goals are kept
        assert_eq!(
            inbox.drain().goals,
            vec![(GoalFrame::Local, Pose2D::new(5.0, 0.0, 0.0))]
        );

        // Loads requested after the cancel are delivered
        let generation = inbox.goal_generation();
        assert!(inbox.post_goal_batch(generation, GoalFrame::Global, vec![Pose2D::default()]));
        assert_eq!(inbox.drain().goals.len(), 1);
    }
}
