//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Event acquisition:
//!             - Simulated odometry and position
//!             - Scripted events
//!             - Console events and commands (posted directly from the console thread)
//!         - Navigation processing, producing one velocity command
//!         - Velocity command output
//!         - Telemetry
//!
//! # Usage
//!
//! ```text
//! nav_exec [--script <path>] [--console] [--sim]
//! ```
//!
//! At least one source of events must be given.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use nav_lib::{
    data_store::DataStore,
    event_processor,
    goals::{BackgroundGoalLoader, FileGoalLoader, GoalLoader},
    inbox::Inbox,
    nav_mgr::NavMgr,
    params::NavExecParams,
    sim::KinematicSim,
    sink::{JsonLineSink, VelSink},
};

#[cfg(feature = "console")]
mod console;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::fs::File;
use std::io::LineWriter;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    host,
    logger::{level_from_str, logger_init},
    raise_error,
    script_interpreter::{PendingEvents, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Limit of the number of consecutive errors writing velocity commands before the exec stops.
const MAX_SINK_ERROR_LIMIT: u64 = 5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec", about = "Waypoint following navigation supervisor")]
struct Opt {
    /// Event script to execute
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Read events and commands from an interactive console
    #[structopt(short, long)]
    console: bool,

    /// Drive the kinematic simulator with the velocity commands
    #[structopt(long)]
    sim: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Exec parameters are needed before the logger for the log level
    let exec_params: NavExecParams =
        util::params::load("nav_exec.toml").wrap_err("Could not load exec params")?;

    let log_level = level_from_str(&exec_params.log_level)
        .ok_or_else(|| eyre!("Unknown log level {:?}", exec_params.log_level))?;

    // Initialise logger
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Navigation Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    debug!("CLI options: {:?}", opt);
    info!("Exec parameters loaded");

    // ---- INITIALISE EVENT SOURCES ----

    let mut script = match opt.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} events\n",
                si.get_duration(),
                si.get_num_events()
            );

            Some(si)
        }
        None => None,
    };

    #[cfg(not(feature = "console"))]
    if opt.console {
        return Err(eyre!("The console was requested but this exec was built without it"));
    }

    let run_sim = opt.sim || exec_params.sim_enabled;

    if script.is_none() && !opt.console && !run_sim {
        return Err(eyre!(
            "No event source, provide a script (--script), the console (--console), or the \
            simulator (--sim)"
        ));
    }

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    let mut nav_mgr = NavMgr::init("nav_mgr.toml").wrap_err("Failed to initialise NavMgr")?;
    let heading_formula = nav_mgr.params().heading_formula;
    info!("NavMgr init complete");

    let inbox = Inbox::new();

    let mut loader: Box<dyn GoalLoader> = if exec_params.background_loading {
        info!("Goal files will be loaded in the background");
        Box::new(BackgroundGoalLoader::new(inbox.clone()))
    } else {
        Box::new(FileGoalLoader)
    };

    let mut sim = match run_sim {
        true => {
            let s = KinematicSim::new(exec_params.sim.clone())
                .wrap_err("Failed to initialise the simulator")?;
            info!("Simulator initialised");
            Some(s)
        }
        false => None,
    };

    let vel_log_path = session.file_path("vel_cmds.jsonl");
    let mut sink = JsonLineSink::new(LineWriter::new(
        File::create(&vel_log_path).wrap_err("Failed to create the velocity command log")?,
    ));
    info!("Velocity commands will be written to {:?}", vel_log_path);

    info!("Module initialisation complete\n");

    // Set by the console when the user asks to exit
    let stop = Arc::new(AtomicBool::new(false));

    #[cfg(feature = "console")]
    let _console = match opt.console {
        true => {
            let history_path = host::get_nav_sw_root()
                .map(|root| root.join(&exec_params.console_history_path))
                .unwrap_or_else(|_| PathBuf::from(&exec_params.console_history_path));

            let h = console::spawn(inbox.clone(), heading_formula, history_path, stop.clone())
                .wrap_err("Failed to start the console")?;
            info!("Console started, enter commands or JSON events, `quit` to exit");
            Some(h)
        }
        false => None,
    };

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.cycle_frequency_hz());

        // ---- EVENT ACQUISITION ----

        if let Some(ref s) = sim {
            for event in s.events().iter() {
                event_processor::exec(&inbox, event, heading_formula);
            }
        }

        if let Some(ref mut si) = script {
            match si.get_pending_events() {
                PendingEvents::None => (),
                PendingEvents::Some(events) => {
                    for event in events.iter() {
                        event_processor::exec(&inbox, event, heading_formula);
                    }
                }
                // Exit if end of script reached
                PendingEvents::EndOfScript => {
                    info!("End of event script reached, stopping");
                    break;
                }
            }
        }

        if stop.load(Ordering::Relaxed) {
            info!("Stop requested, stopping");
            break;
        }

        // ---- NAVIGATION PROCESSING ----

        ds.vel_cmd = nav_mgr.tick(&inbox, loader.as_mut(), cycle_start_instant);

        // ---- OUTPUT ----

        match sink.send(&ds.vel_cmd) {
            Ok(()) => ds.num_consec_sink_errors = 0,
            Err(e) => {
                warn!("Could not send the velocity command: {}", e);
                ds.num_consec_sink_errors += 1;

                if ds.num_consec_sink_errors > MAX_SINK_ERROR_LIMIT {
                    raise_error!(
                        "Maximum number of velocity sink errors ({}) has been exceeded",
                        MAX_SINK_ERROR_LIMIT
                    );
                }
            }
        }

        if let Some(ref mut s) = sim {
            s.step(&ds.vel_cmd, exec_params.cycle_period_s);
        }

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            let tm = nav_mgr.tm();

            info!(
                "[{:.1} s] {} for {:.1} s, {} local and {} global goals, {}",
                ds.sim_time_s,
                tm.state,
                tm.time_in_state_s,
                tm.num_local_goals,
                tm.num_global_goals,
                tm.vel_cmd
            );

            match serde_json::to_string(tm) {
                Ok(s) => debug!("NavTm: {}", s),
                Err(e) => warn!("Could not serialise NavTm: {}", e),
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    stop.store(true, Ordering::Relaxed);

    info!(
        "{} cycles executed, {} velocity commands sent",
        ds.num_cycles,
        sink.num_sent()
    );
    info!("End of execution");

    Ok(())
}
