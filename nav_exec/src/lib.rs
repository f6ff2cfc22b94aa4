//! # Navigation library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the navigation crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - cycle bookkeeping for the executable
pub mod data_store;

/// Event processor - converts inbound events and posts them to the inbox
pub mod event_processor;

/// Goals - the local and global goal queues and the goal file loaders
pub mod goals;

/// Inbox - thread safe hand over of inbound data to the navigation manager
pub mod inbox;

/// Localisation module - latest pose estimates and global to local frame reconciliation
pub mod loc;

/// Navigation manager - the navigation state machine
pub mod nav_mgr;

/// Executable parameters
pub mod params;

/// Kinematic simulator - closes the loop on velocity commands without a vehicle
pub mod sim;

/// Velocity command sink - where each tick's command is sent
pub mod sink;

/// Steering control module - drives the vehicle towards a target point
pub mod steer_ctrl;
