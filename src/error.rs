use thiserror::Error;

/// Tracker error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// Frame source could not be opened or a read failed. Ends the session.
    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// Frame was read but no body was detected in it.
    #[error("No body landmarks detected")]
    LandmarksAbsent,

    #[error("Pose model loading failed: {0}")]
    ModelLoad(String),

    #[error("Pose inference failed: {0}")]
    Inference(String),

    #[error("Display failed: {0}")]
    Display(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
