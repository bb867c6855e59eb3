use opencv::{
    core::{Mat, Point, Scalar},
    highgui, imgproc,
    prelude::*,
};
use tracing::{debug, warn};

use crate::error::{Result, TrackerError};
use crate::pipeline::FrameSink;
use crate::render::{to_pixel, Color, Overlay, Primitive};

/// Milliseconds to wait for a key press after each frame
const KEY_POLL_MS: i32 = 10;

fn display_error(err: opencv::Error) -> TrackerError {
    TrackerError::Display(err.to_string())
}

fn scalar(color: Color) -> Scalar {
    Scalar::new(color.b as f64, color.g as f64, color.r as f64, 0.0)
}

/// HighGUI preview window. Closed on drop.
pub struct PreviewWindow {
    title: String,
    quit_key: char,
}

impl PreviewWindow {
    pub fn open(title: &str, quit_key: char) -> Result<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE).map_err(display_error)?;
        debug!(title, "preview window opened");

        Ok(Self {
            title: title.to_string(),
            quit_key,
        })
    }

    fn draw(&self, frame: &mut Mat, overlay: &Overlay) -> Result<()> {
        let (width, height) = (frame.cols(), frame.rows());
        let px = |p| {
            let (x, y) = to_pixel(p, width, height);
            Point::new(x, y)
        };

        for primitive in &overlay.primitives {
            match primitive {
                Primitive::Line {
                    from,
                    to,
                    color,
                    thickness,
                } => imgproc::line(
                    frame,
                    px(*from),
                    px(*to),
                    scalar(*color),
                    *thickness,
                    imgproc::LINE_8,
                    0,
                ),
                Primitive::Joint { at, color, radius } => imgproc::circle(
                    frame,
                    px(*at),
                    *radius,
                    scalar(*color),
                    imgproc::FILLED,
                    imgproc::LINE_8,
                    0,
                ),
                Primitive::Label {
                    text,
                    anchor,
                    color,
                    scale,
                    thickness,
                } => {
                    let (x, y) = anchor.resolve(width, height);
                    imgproc::put_text(
                        frame,
                        text,
                        Point::new(x, y),
                        imgproc::FONT_HERSHEY_SIMPLEX,
                        *scale,
                        scalar(*color),
                        *thickness,
                        imgproc::LINE_8,
                        false,
                    )
                }
            }
            .map_err(display_error)?;
        }

        Ok(())
    }
}

impl FrameSink<Mat> for PreviewWindow {
    fn present(&mut self, frame: &mut Mat, overlay: Option<&Overlay>) -> Result<()> {
        if let Some(overlay) = overlay {
            self.draw(frame, overlay)?;
        }
        highgui::imshow(&self.title, &*frame).map_err(display_error)
    }

    fn stop_requested(&mut self) -> Result<bool> {
        let key = highgui::wait_key(KEY_POLL_MS).map_err(display_error)?;
        Ok(key >= 0 && (key & 0xFF) as u8 == self.quit_key as u8)
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        if let Err(err) = highgui::destroy_window(&self.title) {
            warn!(title = %self.title, error = %err, "failed to close preview window");
        }
    }
}
