//! Goal file loaders
//!
//! Two file formats are supported:
//!
//! - KML tracks, where each `<gx:coord>lon lat alt</gx:coord>` line becomes a global goal once
//!   projected into UTM. All other lines are ignored.
//! - Odometry goal files, where each line holds a whitespace separated `x y` pair in the local
//!   frame. Extra columns are ignored.
//!
//! Lines that can't be parsed are skipped. A file that can't be read results in no goals and a
//! warning, loading never fails outright.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

// Internal
use super::{GoalFrame, GoalQueues};
use crate::inbox::Inbox;
use comms_if::{msg::Pose2D, tc::NavCmd};
use util::geo;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const KML_COORD_OPEN: &str = "<gx:coord>";
const KML_COORD_CLOSE: &str = "</gx:coord>";

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which can load goals from a file into the goal queues.
pub trait GoalLoader {
    /// Start loading the requested file.
    ///
    /// Implementations may add the goals to `queues` immediately or deliver them later.
    fn load(&mut self, request: LoadRequest, queues: &mut GoalQueues);

    /// Called when the goal queues are cleared. Goals from loads requested before this call must
    /// not be delivered after it.
    fn cancel(&mut self) {}
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Loads goals synchronously, adding them to the queues before returning.
#[derive(Debug, Default)]
pub struct FileGoalLoader;

/// Loads goals on a separate thread, posting each file's goals to the inbox as one batch.
///
/// The goals are applied to the queues by the navigation manager on following ticks. Cancelling
/// discards batches from loads which were still running.
pub struct BackgroundGoalLoader {
    inbox: Inbox,
    workers: Vec<JoinHandle<usize>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A request to load a goal file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    /// KML file of global goals
    Kml(PathBuf),

    /// Two column text file of local goals
    Odom(PathBuf),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LoadRequest {
    /// Build the request matching a load command, or `None` if the command is not a load.
    pub fn from_cmd(cmd: &NavCmd) -> Option<Self> {
        match cmd {
            NavCmd::LoadKml(p) => Some(LoadRequest::Kml(p.clone())),
            NavCmd::LoadOdom(p) => Some(LoadRequest::Odom(p.clone())),
            _ => None,
        }
    }

    /// The frame of the goals in the file, and so the queue they go in.
    pub fn frame(&self) -> GoalFrame {
        match self {
            LoadRequest::Kml(_) => GoalFrame::Global,
            LoadRequest::Odom(_) => GoalFrame::Local,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            LoadRequest::Kml(p) => p,
            LoadRequest::Odom(p) => p,
        }
    }

    /// Read and parse the file.
    ///
    /// If the file can't be read a warning is issued and no goals are returned.
    pub fn read_goals(&self) -> Vec<Pose2D> {
        let text = match fs::read_to_string(self.path()) {
            Ok(t) => t,
            Err(e) => {
                warn!(
                    "Could not read goal file {:?}, no goals added: {}",
                    self.path(),
                    e
                );
                return vec![];
            }
        };

        let goals = match self {
            LoadRequest::Kml(_) => parse_kml(&text),
            LoadRequest::Odom(_) => parse_odom(&text),
        };

        if goals.is_empty() {
            warn!("Goal file {:?} contains no goals", self.path());
        }

        goals
    }
}

impl GoalLoader for FileGoalLoader {
    fn load(&mut self, request: LoadRequest, queues: &mut GoalQueues) {
        let goals = request.read_goals();

        info!(
            "Loaded {} {} goals from {:?}",
            goals.len(),
            request.frame(),
            request.path()
        );

        queues.get_mut(request.frame()).extend(goals);
    }
}

impl BackgroundGoalLoader {
    pub fn new(inbox: Inbox) -> Self {
        Self {
            inbox,
            workers: vec![],
        }
    }

    /// Wait for all outstanding loads to finish, returning the number of goals they delivered.
    pub fn join_all(&mut self) -> usize {
        self.workers
            .drain(..)
            .map(|w| match w.join() {
                Ok(n) => n,
                Err(_) => {
                    warn!("A goal loader thread panicked");
                    0
                }
            })
            .sum()
    }
}

impl GoalLoader for BackgroundGoalLoader {
    fn load(&mut self, request: LoadRequest, queues: &mut GoalQueues) {
        let inbox = self.inbox.clone();
        let worker_request = request.clone();
        let generation = self.inbox.goal_generation();

        let spawn_result = thread::Builder::new()
            .name("goal_loader".into())
            .spawn(move || {
                let frame = worker_request.frame();
                let goals = worker_request.read_goals();
                let num_goals = goals.len();

                if !inbox.post_goal_batch(generation, frame, goals) {
                    info!(
                        "Discarded {} {} goals from {:?}, goals were cleared during loading",
                        num_goals,
                        frame,
                        worker_request.path()
                    );
                    return 0;
                }

                info!(
                    "Loaded {} {} goals from {:?}",
                    num_goals,
                    frame,
                    worker_request.path()
                );

                num_goals
            });

        match spawn_result {
            Ok(h) => {
                debug!("Loading {:?} in the background", request.path());
                self.workers.retain(|w| !w.is_finished());
                self.workers.push(h);
            }
            Err(e) => {
                warn!(
                    "Could not start the goal loader thread ({}), loading in the foreground",
                    e
                );
                FileGoalLoader.load(request, queues);
            }
        }
    }

    fn cancel(&mut self) {
        self.inbox.cancel_goal_batches();
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse global goals from the text of a KML file.
///
/// Goals are returned with `x` as the northing and `y` as the easting.
pub fn parse_kml(text: &str) -> Vec<Pose2D> {
    let mut goals = vec![];

    for (line_num, line) in text.lines().enumerate() {
        let coord = match line.trim().strip_prefix(KML_COORD_OPEN) {
            Some(c) => c,
            None => continue,
        };
        let coord = coord.strip_suffix(KML_COORD_CLOSE).unwrap_or(coord);

        let values: Result<Vec<f64>, _> = coord.split_whitespace().map(str::parse).collect();

        let (lon_deg, lat_deg, alt_m) = match values.as_deref() {
            Ok([lon, lat]) => (*lon, *lat, 0.0),
            Ok([lon, lat, alt, ..]) => (*lon, *lat, *alt),
            _ => {
                debug!("Skipping malformed KML coordinate on line {}", line_num + 1);
                continue;
            }
        };

        match geo::lat_lon_to_utm(lat_deg, lon_deg, alt_m) {
            Ok(utm) => goals.push(Pose2D::new(utm.northing_m, utm.easting_m, 0.0)),
            Err(e) => warn!(
                "Skipping KML coordinate on line {} which can't be projected: {}",
                line_num + 1,
                e
            ),
        }
    }

    goals
}

/// Parse local goals from the text of a two column `x y` file.
pub fn parse_odom(text: &str) -> Vec<Pose2D> {
    let mut goals = vec![];

    for (line_num, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();

        let x = fields.next().map(str::parse::<f64>);
        let y = fields.next().map(str::parse::<f64>);

        match (x, y) {
            (Some(Ok(x)), Some(Ok(y))) => goals.push(Pose2D::new(x, y, 0.0)),
            (None, _) => (),
            _ => debug!("Skipping malformed goal on line {}", line_num + 1),
        }
    }

    goals
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    const KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2" xmlns:gx="http://www.google.com/kml/ext/2.2">
<Placemark>
<gx:Track>
<when>2021-06-01T10:00:00Z</when>
<gx:coord>-1.5 51.0 80.0</gx:coord>
    <gx:coord>-1.4999 51.0001 80.0</gx:coord>
<gx:coord>not a number</gx:coord>
<gx:coord>-1.4998 51.0002</gx:coord>
</gx:Track>
</Placemark>
</kml>
"#;

    #[test]
    fn test_parse_kml() {
        let goals = parse_kml(KML);
        assert_eq!(goals.len(), 3);

        let utm = geo::lat_lon_to_utm(51.0, -1.5, 80.0).unwrap();
        assert_relative_eq!(goals[0].x, utm.northing_m);
        assert_relative_eq!(goals[0].y, utm.easting_m);

        // Each step is north-east, so northing and easting both increase
        assert!(goals[1].x > goals[0].x && goals[1].y > goals[0].y);
        assert!(goals[2].x > goals[1].x && goals[2].y > goals[1].y);
    }

    #[test]
    fn test_parse_kml_skips_unprojectable() {
        assert!(parse_kml("<gx:coord>0.0 89.0 0.0</gx:coord>").is_empty());
    }

    #[test]
    fn test_parse_odom() {
        let goals = parse_odom("10 0\n\n# comment\n10.5 -3.25 extra\n7\nabc 1\n0 5\n");
        assert_eq!(
            goals,
            vec![
                Pose2D::new(10.0, 0.0, 0.0),
                Pose2D::new(10.5, -3.25, 0.0),
                Pose2D::new(0.0, 5.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_file_loader() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1 2\n3 4\n").unwrap();

        let mut queues = GoalQueues::new();
        FileGoalLoader.load(LoadRequest::Odom(file.path().to_path_buf()), &mut queues);

        assert_eq!(queues.local.len(), 2);
        assert!(queues.global.is_empty());
        assert_eq!(queues.local.front(), Some(&Pose2D::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let mut queues = GoalQueues::new();
        FileGoalLoader.load(
            LoadRequest::Kml(PathBuf::from("/no/such/route.kml")),
            &mut queues,
        );
        assert!(queues.global.is_empty());
        assert!(queues.local.is_empty());
    }

    #[test]
    fn test_background_loader_posts_to_inbox() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", KML).unwrap();

        let inbox = Inbox::new();
        let mut loader = BackgroundGoalLoader::new(inbox.clone());
        let mut queues = GoalQueues::new();

        loader.load(LoadRequest::Kml(file.path().to_path_buf()), &mut queues);
        assert_eq!(loader.join_all(), 3);

        // Nothing goes into the queues directly
        assert!(queues.global.is_empty());

        let contents = inbox.drain();
        assert_eq!(contents.goals.len(), 3);
        assert!(contents.goals.iter().all(|(f, _)| *f == GoalFrame::Global));
    }

    #[test]
    fn test_request_from_cmd() {
        assert_eq!(
            LoadRequest::from_cmd(&NavCmd::LoadOdom(PathBuf::from("a.txt"))),
            Some(LoadRequest::Odom(PathBuf::from("a.txt")))
        );
        assert_eq!(LoadRequest::from_cmd(&NavCmd::Go), None);
        assert_eq!(
            LoadRequest::Kml(PathBuf::from("b.kml")).frame(),
            GoalFrame::Global
        );
    }

    #[test]
    fn test_background_loader_cancel() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1 2\n3 4\n").unwrap();

        let inbox = Inbox::new();
        let mut loader = BackgroundGoalLoader::new(inbox.clone());
        let mut queues = GoalQueues::new();

        loader.load(LoadRequest::Odom(file.path().to_path_buf()), &mut queues);
        loader.cancel();

        // Whether the worker finished before or after the cancel, nothing is delivered
        loader.join_all();
        assert!(inbox.drain().goals.is_empty());

        // Loads after the cancel are unaffected
        loader.load(LoadRequest::Odom(file.path().to_path_buf()), &mut queues);
        assert_eq!(loader.join_all(), 2);
        assert_eq!(inbox.drain().goals.len(), 2);
    }
}
