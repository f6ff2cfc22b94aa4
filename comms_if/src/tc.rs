//! # Navigation telecommands
//!
//! Commands reach the supervisor as plain text, for example `GO`, `STOP`, or
//! `LOAD_KML:/data/route.kml`. This module parses that text into a [`NavCmd`] and prints it back.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const LOAD_KML_PREFIX: &str = "LOAD_KML";
const LOAD_ODOM_PREFIX: &str = "LOAD_ODOM";

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command to the navigation supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavCmd {
    /// Drive straight ahead at a fixed speed, starting from idle.
    Go,

    /// Return to idle.
    Stop,

    /// Follow the local (odometry) frame goals, starting from idle.
    DriveOdom,

    /// Follow the global (UTM) frame goals, starting from idle.
    DriveUtm,

    /// Clear all goals and return to idle.
    Reset,

    /// Clear all goals without changing state.
    ClearGoals,

    /// Load global goals from a KML file.
    LoadKml(PathBuf),

    /// Load local goals from a two-column text file.
    LoadOdom(PathBuf),
}

/// Possible parsing errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavCmdParseError {
    #[error("The command is empty")]
    Empty,

    #[error("{0:?} is not a recognised command")]
    Unknown(String),

    #[error("{0} requires a file path, e.g. {0}:/path/to/file")]
    MissingPath(&'static str),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FromStr for NavCmd {
    type Err = NavCmdParseError;

    /// Parse a command from its text form.
    ///
    /// Keywords are case sensitive. Load commands separate the keyword from the path with a
    /// single `:` or whitespace character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(NavCmdParseError::Empty);
        }

        if let Some(rest) = s.strip_prefix(LOAD_KML_PREFIX) {
            return parse_path(LOAD_KML_PREFIX, rest, s).map(NavCmd::LoadKml);
        }
        if let Some(rest) = s.strip_prefix(LOAD_ODOM_PREFIX) {
            return parse_path(LOAD_ODOM_PREFIX, rest, s).map(NavCmd::LoadOdom);
        }

        match s {
            "GO" => Ok(NavCmd::Go),
            "STOP" => Ok(NavCmd::Stop),
            "DRIVE_ODOM" => Ok(NavCmd::DriveOdom),
            "DRIVE_UTM" => Ok(NavCmd::DriveUtm),
            "RESET" => Ok(NavCmd::Reset),
            "CLEAR_GOALS" => Ok(NavCmd::ClearGoals),
            _ => Err(NavCmdParseError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for NavCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavCmd::Go => write!(f, "GO"),
            NavCmd::Stop => write!(f, "STOP"),
            NavCmd::DriveOdom => write!(f, "DRIVE_ODOM"),
            NavCmd::DriveUtm => write!(f, "DRIVE_UTM"),
            NavCmd::Reset => write!(f, "RESET"),
            NavCmd::ClearGoals => write!(f, "CLEAR_GOALS"),
            NavCmd::LoadKml(p) => write!(f, "{}:{}", LOAD_KML_PREFIX, p.display()),
            NavCmd::LoadOdom(p) => write!(f, "{}:{}", LOAD_ODOM_PREFIX, p.display()),
        }
    }
}

/// Parse the path following a load keyword.
fn parse_path(
    keyword: &'static str,
    rest: &str,
    whole: &str,
) -> Result<PathBuf, NavCmdParseError> {
    let mut chars = rest.chars();

    match chars.next() {
        None => Err(NavCmdParseError::MissingPath(keyword)),
        Some(c) if c == ':' || c.is_whitespace() => {
            let path = chars.as_str().trim();
            if path.is_empty() {
                Err(NavCmdParseError::MissingPath(keyword))
            } else {
                Ok(PathBuf::from(path))
            }
        }
        // Something like LOAD_KMLX, which isn't a load command at all
        Some(_) => Err(NavCmdParseError::Unknown(whole.to_string())),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!("GO".parse(), Ok(NavCmd::Go));
        assert_eq!("STOP".parse(), Ok(NavCmd::Stop));
        assert_eq!("DRIVE_ODOM".parse(), Ok(NavCmd::DriveOdom));
        assert_eq!("DRIVE_UTM".parse(), Ok(NavCmd::DriveUtm));
        assert_eq!("RESET".parse(), Ok(NavCmd::Reset));
        assert_eq!("CLEAR_GOALS\n".parse(), Ok(NavCmd::ClearGoals));
    }

    #[test]
    fn test_parse_loads() {
        assert_eq!(
            "LOAD_KML:/data/route.kml".parse(),
            Ok(NavCmd::LoadKml(PathBuf::from("/data/route.kml")))
        );
        assert_eq!(
            "LOAD_ODOM goals/square.txt".parse(),
            Ok(NavCmd::LoadOdom(PathBuf::from("goals/square.txt")))
        );
        assert_eq!(
            "LOAD_KML".parse::<NavCmd>(),
            Err(NavCmdParseError::MissingPath("LOAD_KML"))
        );
        assert_eq!(
            "LOAD_ODOM:  ".parse::<NavCmd>(),
            Err(NavCmdParseError::MissingPath("LOAD_ODOM"))
        );
        assert_eq!(
            "LOAD_KMLX".parse::<NavCmd>(),
            Err(NavCmdParseError::Unknown("LOAD_KMLX".into()))
        );
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!("".parse::<NavCmd>(), Err(NavCmdParseError::Empty));
        assert_eq!("go".parse::<NavCmd>(), Err(NavCmdParseError::Unknown("go".into())));
        assert_eq!(
            "FLY".parse::<NavCmd>(),
            Err(NavCmdParseError::Unknown("FLY".into()))
        );
    }

    #[test]
    fn test_display_parses_back() {
        let cmds = vec![
            NavCmd::Go,
            NavCmd::ClearGoals,
            NavCmd::LoadKml(PathBuf::from("a.kml")),
            NavCmd::LoadOdom(PathBuf::from("/tmp/b.txt")),
        ];

        for cmd in cmds {
            assert_eq!(cmd.to_string().parse(), Ok(cmd));
        }
    }
}
