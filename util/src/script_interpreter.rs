//! # Navigation script interpreter module
//!
//! This module provides an interpreter for navigation event scripts, allowing pose updates, goals,
//! and commands to be replayed into the supervisor at fixed times.
//!
//! A script is a sequence of `<time_s>: <json event>;` entries, one per line by convention:
//!
//! ```text
//! 0.0: {"type": "goal_local", "x": 10.0, "y": 0.0};
//! 0.5: {"type": "cmd", "text": "DRIVE_ODOM"};
//! ```
//!
//! Entries must be given in time order. Anything outside of an entry is ignored, so comments can be
//! written freely on their own lines as long as they contain no `:` followed by a `;`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::event::{NavEvent, NavEventParseError};
use crate::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An event which is scripted to occur at a specific time.
#[derive(Debug)]
pub struct ScriptedEvent {
    /// The time the event is supposed to be posted at
    exec_time_s: f64,

    /// The event to post
    event: NavEvent
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_events` to
/// acquire a list of events that are now due.
#[derive(Debug)]
pub struct ScriptInterpreter {
    script_path: PathBuf,
    events: VecDeque<ScriptedEvent>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script timestamp {0} s is earlier than the entry before it")]
    OutOfOrder(f64),

    #[error("Script contains an invalid event at {0} s: {1}")]
    InvalidEvent(f64, NavEventParseError),

    #[error("Could not build the script parser: {0}")]
    RegexError(regex::Error)
}

#[derive(Debug)]
pub enum PendingEvents {
    None,
    Some(Vec<NavEvent>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        Self::from_script_str(&script, path)
    }

    /// Create a new interpreter from the text of a script.
    ///
    /// `script_path` is only used for reporting.
    pub fn from_script_str(script: &str, script_path: PathBuf) -> Result<Self, ScriptError> {
        let mut events: VecDeque<ScriptedEvent> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::RegexError)?;

        for cap in re.captures_iter(script) {
            let time_str = cap.get(1).map_or("", |m| m.as_str());
            let payload = cap.get(3).map_or("", |m| m.as_str());

            let exec_time_s: f64 = time_str.parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(last) = events.back() {
                if exec_time_s < last.exec_time_s {
                    return Err(ScriptError::OutOfOrder(exec_time_s));
                }
            }

            let event = NavEvent::from_json(payload)
                .map_err(|e| ScriptError::InvalidEvent(exec_time_s, e))?;

            events.push_back(ScriptedEvent {
                exec_time_s,
                event
            });
        }

        if events.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            script_path,
            events
        })
    }

    /// Return the events which are due at the current session time.
    pub fn get_pending_events(&mut self) -> PendingEvents {
        self.get_pending_events_at(get_elapsed_seconds())
    }

    /// Return the events which are due at the given script time.
    ///
    /// Events are returned in script order. Once every event has been returned this will
    /// return `PendingEvents::EndOfScript`.
    pub fn get_pending_events_at(&mut self, current_time_s: f64) -> PendingEvents {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.events.is_empty() {
            return PendingEvents::EndOfScript
        }

        let mut due: Vec<NavEvent> = vec![];

        // Pop events from the front while their exec time has passed
        while let Some(front) = self.events.front() {
            if front.exec_time_s > current_time_s {
                break;
            }
            if let Some(e) = self.events.pop_front() {
                due.push(e.event);
            }
        }

        if due.is_empty() {
            PendingEvents::None
        }
        else {
            PendingEvents::Some(due)
        }
    }

    /// Get the number of events remaining in the script
    pub fn get_num_events(&self) -> usize {
        self.events.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.events.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }

    /// Get the path the script was loaded from
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
