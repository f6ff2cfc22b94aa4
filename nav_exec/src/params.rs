//! # Navigation Executable Parameters
//!
//! This module provide parameters for the navigation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::sim::SimParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NavExecParams {
    /// Target period of one cycle
    pub cycle_period_s: f64,

    /// Minimum level of log messages, one of `trace`, `debug` or `info`
    pub log_level: String,

    /// If true goal files are loaded on a separate thread
    pub background_loading: bool,

    /// File the console history is kept in, relative to the software root
    pub console_history_path: String,

    /// Run the simulator even if `--sim` isn't given
    pub sim_enabled: bool,

    /// Simulator parameters
    pub sim: SimParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.1,
            log_level: String::from("debug"),
            background_loading: true,
            console_history_path: String::from("nav_console_history.txt"),
            sim_enabled: false,
            sim: SimParams::default(),
        }
    }
}

impl NavExecParams {
    /// Number of cycles per second
    pub fn cycle_frequency_hz(&self) -> f64 {
        1.0 / self.cycle_period_s
    }
}
