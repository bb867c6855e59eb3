//! Collaborator seams around the analysis core
//!
//! The session only talks to capture, pose detection and display through
//! these traits. Implementations release their resources on drop.

use crate::error::Result;
use crate::landmarks::PoseFrame;
use crate::render::Overlay;

/// Produces frames, e.g. a webcam
pub trait FrameSource {
    type Frame;

    /// Block until the next frame is available
    ///
    /// `Ok(None)` means the stream ended. An error means the device failed
    /// and is fatal for the session.
    fn read_frame(&mut self) -> Result<Option<Self::Frame>>;
}

/// Extracts body landmarks from a frame
pub trait LandmarkProvider<F> {
    fn detect(&mut self, frame: &F) -> Result<PoseFrame>;
}

/// Shows frames and reports the user's stop request
pub trait FrameSink<F> {
    /// Draw the overlay (if any) onto the frame and show it
    fn present(&mut self, frame: &mut F, overlay: Option<&Overlay>) -> Result<()>;

    /// Poll for the quit signal
    fn stop_requested(&mut self) -> Result<bool>;
}
