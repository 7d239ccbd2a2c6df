// Landmark sources: the seam between this app and the external hand model.
//
// Frames arrive over an mpsc channel, each stamped with the instant it was
// read, so the render loop never blocks on the model and still sees real
// arrival times. The only real source is `ProcessLandmarkSource`, which runs a
// model wrapper as a child process and reads one JSON object per line from
// its stdout:
//
//   {"hands": [[[0.51, 0.62, -0.01], ... 21 points ...]]}
//   {"hands": []}
//
// Only the first hand is used. When no command is configured the app runs
// its keyboard/mouse simulator instead and no source thread is spawned.

use crate::gesture::HandLandmarks;
use glam::Vec3;
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;
use thiserror::Error;

/// One frame from the landmark model.
#[derive(Debug, Clone, PartialEq)]
pub enum HandFrame {
    Detected(HandLandmarks),
    NoHand,
    /// The source has stopped for good (child exited, pipe closed).
    Ended,
}

/// A frame plus the instant the source thread read it.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedFrame {
    pub at: Instant,
    pub frame: HandFrame,
}

impl StampedFrame {
    pub fn now(frame: HandFrame) -> Self {
        Self { at: Instant::now(), frame }
    }
}

#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("malformed landmark line: {0}")]
    Json(#[from] serde_json::Error),
    #[error("hand has {0} keypoints, expected 21")]
    WrongPointCount(usize),
    #[error("failed to start landmark command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("landmark command is empty")]
    EmptyCommand,
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// Anything that can deliver stamped hand frames over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<StampedFrame>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<StampedFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ============================================================================
// LINE PROTOCOL
// ============================================================================

#[derive(Deserialize)]
struct LandmarkLine {
    #[serde(default)]
    hands: Vec<Vec<[f32; 3]>>,
}

/// Parse one line of model output.
pub fn parse_landmark_line(line: &str) -> Result<HandFrame, LandmarkError> {
    let parsed: LandmarkLine = serde_json::from_str(line)?;
    let Some(first) = parsed.hands.first() else {
        return Ok(HandFrame::NoHand);
    };
    let points: Vec<Vec3> = first.iter().map(|&p| Vec3::from_array(p)).collect();
    HandLandmarks::from_slice(&points)
        .map(HandFrame::Detected)
        .ok_or(LandmarkError::WrongPointCount(points.len()))
}

// ============================================================================
// CHILD PROCESS SOURCE
// ============================================================================

/// Runs a command (program + whitespace-separated args, no quoting) and
/// streams its stdout as landmark frames.
pub struct ProcessLandmarkSource {
    command: String,
}

impl ProcessLandmarkSource {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }

    fn spawn_child(&self) -> Result<std::process::Child, LandmarkError> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(LandmarkError::EmptyCommand)?;
        Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| LandmarkError::Spawn {
                command: self.command.clone(),
                source,
            })
    }
}

impl LandmarkSource for ProcessLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<StampedFrame>) {
        let mut child = match self.spawn_child() {
            Ok(child) => child,
            Err(e) => {
                log::error!("{e}");
                let _ = tx.send(StampedFrame::now(HandFrame::Ended));
                return;
            }
        };
        log::info!("landmark command started: {}", self.command);

        let hung_up = match child.stdout.take() {
            Some(stdout) => forward_lines(BufReader::new(stdout), &tx),
            None => false,
        };
        if hung_up {
            log::debug!("landmark receiver gone, stopping command");
            if let Err(e) = child.kill() {
                log::warn!("landmark command kill failed: {e}");
            }
        }

        match child.wait() {
            Ok(status) => log::warn!("landmark command exited: {status}"),
            Err(e) => log::warn!("landmark command wait failed: {e}"),
        }
        let _ = tx.send(StampedFrame::now(HandFrame::Ended));
    }
}

/// Parse every line from `reader` and forward frames until EOF or the
/// receiver hangs up. Bad lines are logged and skipped.
/// Returns `true` if the receiver hung up.
fn forward_lines<R: BufRead>(reader: R, tx: &Sender<StampedFrame>) -> bool {
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::warn!("landmark stream read error: {e}");
                return false;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_landmark_line(&line) {
            Ok(frame) => {
                if tx.send(StampedFrame::now(frame)).is_err() {
                    return true;
                }
            }
            Err(e) => log::warn!("{e}"),
        }
    }
    false
}
