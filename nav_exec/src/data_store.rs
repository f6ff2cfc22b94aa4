//! # Data Store

use comms_if::msg::VelCmd;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of the cycle, shown in the status line
    pub sim_time_s: f64,

    // Navigation
    /// The velocity command produced this cycle
    pub vel_cmd: VelCmd,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive errors sending to the velocity sink
    pub num_consec_sink_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_s = (cycle_frequency_hz.round() as u128).max(1);

        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.vel_cmd = VelCmd::zero();

        self.sim_time_s = util::session::try_get_elapsed_seconds().unwrap_or(0.0);
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_1_hz_flag() {
        let mut ds = DataStore::default();
        let mut flags = vec![];

        for _ in 0..25 {
            ds.cycle_start(10.0);
            flags.push(ds.is_1_hz_cycle);
            ds.cycle_end();
        }

        let set: Vec<usize> = flags
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(set, vec![0, 10, 20]);
        assert_eq!(ds.num_cycles, 25);
    }

    #[test]
    fn test_slow_cycle_always_1_hz() {
        let mut ds = DataStore::default();

        for _ in 0..3 {
            ds.cycle_start(0.5);
            assert!(ds.is_1_hz_cycle);
            ds.cycle_end();
        }
    }

    #[test]
    fn test_sim_time_without_session() {
        let mut ds = DataStore {
            sim_time_s: 12.5,
            ..Default::default()
        };

        ds.cycle_start(10.0);
        assert!(ds.sim_time_s >= 0.0 && ds.sim_time_s < 12.5);
    }
}
