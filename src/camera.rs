use opencv::{
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{debug, info, warn};

use crate::error::{Result, TrackerError};
use crate::pipeline::FrameSource;

/// Webcam frame source. The device is released on drop.
pub struct Camera {
    capture: VideoCapture,
    device_id: i32,
}

fn capture_error(err: opencv::Error) -> TrackerError {
    TrackerError::CaptureUnavailable(err.to_string())
}

impl Camera {
    pub fn open(device_id: i32) -> Result<Self> {
        let capture = VideoCapture::new(device_id, videoio::CAP_ANY).map_err(capture_error)?;

        if !capture.is_opened().map_err(capture_error)? {
            return Err(TrackerError::CaptureUnavailable(format!(
                "failed to open camera {device_id}"
            )));
        }

        info!(device_id, "camera opened");
        Ok(Self { capture, device_id })
    }
}

impl FrameSource for Camera {
    type Frame = Mat;

    fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let grabbed = self.capture.read(&mut frame).map_err(capture_error)?;

        if !grabbed || frame.empty() {
            debug!(device_id = self.device_id, "camera returned no frame");
            return Ok(None);
        }

        Ok(Some(frame))
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        match self.capture.release() {
            Ok(()) => debug!(device_id = self.device_id, "camera released"),
            Err(err) => warn!(device_id = self.device_id, error = %err, "camera release failed"),
        }
    }
}
