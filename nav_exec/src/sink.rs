//! # Velocity command sink
//!
//! The sink is where each tick's velocity command goes. The executable logs commands as JSON
//! lines into the session directory, each line holding the cycle number and the command:
//!
//! ```json
//! {"cycle":12,"linear_ms":0.5,"angular_rads":-0.1}
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::io::Write;

use comms_if::msg::VelCmd;
use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A consumer of velocity commands.
pub trait VelSink {
    fn send(&mut self, cmd: &VelCmd) -> Result<(), SinkError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Writes each command as a line of JSON.
pub struct JsonLineSink<W: Write> {
    writer: W,
    num_sent: u64,
}

#[derive(Serialize)]
struct VelRecord<'a> {
    cycle: u64,

    #[serde(flatten)]
    cmd: &'a VelCmd,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Could not serialise the command: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not write the command: {0}")]
    WriteError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<W: Write> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            num_sent: 0,
        }
    }

    /// Number of commands written so far.
    pub fn num_sent(&self) -> u64 {
        self.num_sent
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> VelSink for JsonLineSink<W> {
    fn send(&mut self, cmd: &VelCmd) -> Result<(), SinkError> {
        let record = VelRecord {
            cycle: self.num_sent,
            cmd,
        };

        let line = serde_json::to_string(&record).map_err(SinkError::SerializationError)?;
        writeln!(self.writer, "{}", line).map_err(SinkError::WriteError)?;

        self.num_sent += 1;

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_json_lines() {
        let mut sink = JsonLineSink::new(Vec::new());

        sink.send(&VelCmd::new(0.5, -0.1)).unwrap();
        sink.send(&VelCmd::zero()).unwrap();
        assert_eq!(sink.num_sent(), 2);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["cycle"], 0);
        assert_eq!(first["linear_ms"], 0.5);
        assert_eq!(first["angular_rads"], -0.1);

        let second: VelCmd = serde_json::from_str(lines[1]).unwrap();
        assert!(second.is_zero());
    }
}
