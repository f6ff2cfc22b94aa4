//! # Communications interface crate.
//!
//! Provides all common interface types for the navigation software: the messages passed between
//! the supervisor and its pose, goal, and command sources, and the velocity commands it emits.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Pose, position, and velocity command messages
pub mod msg;

/// Textual navigation commands
pub mod tc;

/// Inbound event envelope
pub mod event;
