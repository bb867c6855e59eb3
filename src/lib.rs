//! Press Sentinel - shoulder press repetition counter
//!
//! Pipeline per frame:
//! 1. Read a frame from the capture device
//! 2. Detect body landmarks
//! 3. Compute both elbow angles from shoulder/elbow/wrist
//! 4. Step the repetition state machine and derive per-arm feedback
//! 5. Draw the overlay and show the frame
//!
//! Steps 3-4 are pure and live in [`analysis`], [`geometry`] and
//! [`rep_counter`]. Capture, inference and display sit behind the traits in
//! [`pipeline`]; the OpenCV/ONNX implementations need the `vision` feature.

pub mod analysis;
pub mod config;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod pipeline;
pub mod render;
pub mod rep_counter;
pub mod session;

#[cfg(feature = "vision")]
pub mod camera;
#[cfg(feature = "vision")]
pub mod inference;
#[cfg(feature = "vision")]
pub mod overlay;

pub use analysis::{FrameAnalysis, PressAnalyzer};
pub use config::Config;
pub use error::{Result, TrackerError};
pub use geometry::{joint_angle, Point2D};
pub use landmarks::{JointRole, Landmark, LandmarkSchema, PoseFrame};
pub use rep_counter::{
    Arm, ArmFeedback, Feedback, FormRating, Phase, RepCounterState, RepStateMachine, Thresholds,
};
pub use session::{Session, SessionSummary, StopReason};
