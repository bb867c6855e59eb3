//! Tracking session - the frame-synchronous capture → analyze → render loop
//!
//! The session owns the counter state and its collaborators. Dropping the
//! session (on every exit path of [`Session::run`]) releases the capture
//! device and closes the display.

use std::fmt;

use tracing::{debug, info, warn};

use crate::analysis::PressAnalyzer;
use crate::error::{Result, TrackerError};
use crate::landmarks::PoseFrame;
use crate::pipeline::{FrameSink, FrameSource, LandmarkProvider};
use crate::render::build_overlay;
use crate::rep_counter::RepCounterState;

/// Why the loop stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Quit key pressed
    UserRequested,
    /// Frame source ran out of frames
    EndOfStream,
}

/// Totals reported when a session ends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames_read: u64,
    pub frames_analyzed: u64,
    pub frames_without_landmarks: u64,
    pub state: RepCounterState,
    pub stop_reason: StopReason,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reps: {} | frames: {} read, {} analyzed, {} without a body",
            self.state.count, self.frames_read, self.frames_analyzed, self.frames_without_landmarks
        )
    }
}

pub struct Session<S, P, K> {
    source: S,
    provider: P,
    sink: K,
    analyzer: PressAnalyzer,
    state: RepCounterState,
    frames_read: u64,
    frames_analyzed: u64,
    frames_without_landmarks: u64,
}

impl<S, P, K> Session<S, P, K>
where
    S: FrameSource,
    P: LandmarkProvider<S::Frame>,
    K: FrameSink<S::Frame>,
{
    /// Start a session with a fresh counter (count 0, phase unknown)
    pub fn new(source: S, provider: P, sink: K, analyzer: PressAnalyzer) -> Self {
        Self {
            source,
            provider,
            sink,
            analyzer,
            state: RepCounterState::new(),
            frames_read: 0,
            frames_analyzed: 0,
            frames_without_landmarks: 0,
        }
    }

    pub fn state(&self) -> RepCounterState {
        self.state
    }

    /// Process a single frame
    ///
    /// Returns `Ok(None)` if the loop should keep going. Only a failing
    /// frame source produces an error.
    pub fn tick(&mut self) -> Result<Option<StopReason>> {
        let mut frame = match self.source.read_frame()? {
            Some(frame) => frame,
            None => return Ok(Some(StopReason::EndOfStream)),
        };
        self.frames_read += 1;

        let pose = match self.provider.detect(&frame) {
            Ok(pose) => pose,
            Err(err) => {
                warn!(frame = self.frames_read, error = %err, "pose detection failed, skipping frame");
                PoseFrame::NoLandmarks
            }
        };

        let overlay = match pose {
            PoseFrame::Detected(landmarks) => match self.analyzer.analyze(&landmarks, self.state) {
                Ok(analysis) => {
                    self.state = analysis.state;
                    self.frames_analyzed += 1;
                    Some(build_overlay(&landmarks, &analysis))
                }
                Err(TrackerError::LandmarksAbsent) => {
                    debug!(
                        frame = self.frames_read,
                        landmarks = landmarks.len(),
                        "arm joints missing, state carried over"
                    );
                    self.frames_without_landmarks += 1;
                    None
                }
                Err(err) => {
                    warn!(frame = self.frames_read, error = %err, "analysis failed, state carried over");
                    self.frames_without_landmarks += 1;
                    None
                }
            },
            PoseFrame::NoLandmarks => {
                debug!(frame = self.frames_read, "no body detected, state carried over");
                self.frames_without_landmarks += 1;
                None
            }
        };

        // Only capture failures end the session; a bad render loses one frame
        if let Err(err) = self.sink.present(&mut frame, overlay.as_ref()) {
            warn!(frame = self.frames_read, error = %err, "frame not shown");
        }

        match self.sink.stop_requested() {
            Ok(true) => Ok(Some(StopReason::UserRequested)),
            Ok(false) => Ok(None),
            Err(err) => {
                warn!(frame = self.frames_read, error = %err, "key poll failed");
                Ok(None)
            }
        }
    }

    /// Run until the user quits, the stream ends, or capture fails
    ///
    /// Consumes the session so its collaborators are released on return.
    pub fn run(mut self) -> Result<SessionSummary> {
        info!("session started");

        let stop_reason = loop {
            match self.tick() {
                Ok(Some(reason)) => break reason,
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, reps = self.state.count, "session aborted");
                    return Err(err);
                }
            }
        };

        let summary = self.summary(stop_reason);
        info!(
            reps = summary.state.count,
            frames = summary.frames_read,
            reason = ?stop_reason,
            "session finished"
        );
        Ok(summary)
    }

    fn summary(&self, stop_reason: StopReason) -> SessionSummary {
        SessionSummary {
            frames_read: self.frames_read,
            frames_analyzed: self.frames_analyzed,
            frames_without_landmarks: self.frames_without_landmarks,
            state: self.state,
            stop_reason,
        }
    }
}
