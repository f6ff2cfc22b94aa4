//! # Interactive console
//!
//! Reads lines from the terminal on a background thread. A line holding a JSON event is processed
//! as that event, anything else is posted as command text. `quit` or `exit` (or Ctrl-C/Ctrl-D)
//! ends the execution.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};

// Internal
use comms_if::{event::NavEvent, msg::HeadingFormula};
use nav_lib::{event_processor, inbox::Inbox};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const PROMPT: &str = "nav> ";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Start the console thread.
///
/// `stop` is set when the user asks to quit, and is checked before each prompt so the console
/// ends with the exec.
pub(crate) fn spawn(
    inbox: Inbox,
    heading_formula: HeadingFormula,
    history_path: PathBuf,
    stop: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".into())
        .spawn(move || run(inbox, heading_formula, history_path, stop))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn run(inbox: Inbox, heading_formula: HeadingFormula, history_path: PathBuf, stop: Arc<AtomicBool>) {
    let mut rl = match DefaultEditor::new() {
        Ok(r) => r,
        Err(e) => {
            warn!("Could not start the console: {}", e);
            return;
        }
    };

    if rl.load_history(&history_path).is_err() {
        info!("No console history found at {:?}", history_path);
    }

    while !stop.load(Ordering::Relaxed) {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line).ok();

                match line {
                    "quit" | "exit" => {
                        info!("Exit requested from the console");
                        stop.store(true, Ordering::Relaxed);
                    }
                    _ => match NavEvent::from_json(line) {
                        Ok(event) => event_processor::exec(&inbox, &event, heading_formula),
                        Err(_) => inbox.post_cmd(line),
                    },
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                info!("Console closed");
                stop.store(true, Ordering::Relaxed);
            }
            Err(e) => {
                warn!("Console error: {}", e);
                stop.store(true, Ordering::Relaxed);
            }
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        warn!("Could not save the console history: {}", e);
    }
}
