use std::sync::Arc;

use ndarray::{Array4, CowArray};
use opencv::{
    core::{self, Mat, Size, Vec3f},
    imgproc,
    prelude::*,
};
use ort::{
    tensor::OrtOwnedTensor, Environment, GraphOptimizationLevel, Session, SessionBuilder, Value,
};
use tracing::{debug, info};

use crate::error::{Result, TrackerError};
use crate::landmarks::{Landmark, PoseFrame};
use crate::pipeline::LandmarkProvider;

/// Values per landmark in a flat BlazePose output: x, y, z, visibility, presence
const BLAZEPOSE_STRIDE: usize = 5;
const DEFAULT_INPUT_SIZE: i32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputLayout {
    /// [1, 3, H, W]
    Nchw,
    /// [1, H, W, 3]
    Nhwc,
}

/// ONNX pose landmark model
///
/// Expects BlazePose-style outputs: the first output holds landmark rows of
/// `(x, y, z, visibility[, presence])`, an optional second output holds the
/// pose presence score. Models with another row layout (e.g. MoveNet's
/// `(y, x, score)`) need their own `LandmarkProvider`.
pub struct PoseDetector {
    // The session borrows the runtime environment, keep it alive alongside
    _environment: Arc<Environment>,
    session: Session,
    layout: InputLayout,
    input_width: i32,
    input_height: i32,
    min_confidence: f32,
}

fn model_error(err: impl std::fmt::Display) -> TrackerError {
    TrackerError::ModelLoad(err.to_string())
}

fn inference_error(err: impl std::fmt::Display) -> TrackerError {
    TrackerError::Inference(err.to_string())
}

impl PoseDetector {
    pub fn new(model_path: &str, min_confidence: f32) -> Result<Self> {
        let environment = Environment::builder()
            .with_name("press-sentinel")
            .build()
            .map_err(model_error)?
            .into_arc();

        let session = SessionBuilder::new(&environment)
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.with_model_from_file(model_path))
            .map_err(model_error)?;

        let (layout, input_width, input_height) = Self::input_geometry(&session)?;
        info!(
            model_path,
            input_width,
            input_height,
            layout = ?layout,
            "pose model loaded"
        );

        Ok(Self {
            _environment: environment,
            session,
            layout,
            input_width,
            input_height,
            min_confidence,
        })
    }

    fn input_geometry(session: &Session) -> Result<(InputLayout, i32, i32)> {
        let input = session
            .inputs
            .first()
            .ok_or_else(|| TrackerError::ModelLoad("model has no inputs".to_string()))?;

        let dims: Vec<Option<u32>> = input.dimensions.clone();
        if dims.len() != 4 {
            return Ok((InputLayout::Nhwc, DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE));
        }

        let dim = |i: usize| dims[i].map_or(DEFAULT_INPUT_SIZE, |d| d as i32);
        if dims[1] == Some(3) {
            Ok((InputLayout::Nchw, dim(3), dim(2)))
        } else {
            Ok((InputLayout::Nhwc, dim(2), dim(1)))
        }
    }

    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let mut rgb = Mat::default();
        imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(inference_error)?;

        let mut resized = Mat::default();
        imgproc::resize(
            &rgb,
            &mut resized,
            Size::new(self.input_width, self.input_height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(inference_error)?;

        let mut float_img = Mat::default();
        resized
            .convert_to(&mut float_img, core::CV_32FC3, 1.0 / 255.0, 0.0)
            .map_err(inference_error)?;

        let pixels = float_img.data_typed::<Vec3f>().map_err(inference_error)?;

        let h = self.input_height as usize;
        let w = self.input_width as usize;
        let mut tensor = match self.layout {
            InputLayout::Nchw => Array4::<f32>::zeros((1, 3, h, w)),
            InputLayout::Nhwc => Array4::<f32>::zeros((1, h, w, 3)),
        };

        for (idx, pixel) in pixels.iter().enumerate() {
            let (y, x) = (idx / w, idx % w);
            for c in 0..3 {
                match self.layout {
                    InputLayout::Nchw => tensor[[0, c, y, x]] = pixel[c],
                    InputLayout::Nhwc => tensor[[0, y, x, c]] = pixel[c],
                }
            }
        }

        Ok(tensor)
    }

    fn postprocess(&self, outputs: &[Value]) -> Result<PoseFrame> {
        // Optional second output: pose presence score
        if let Some(flag) = outputs.get(1) {
            let flag: OrtOwnedTensor<f32, _> = flag.try_extract().map_err(inference_error)?;
            let view = flag.view();
            if view.len() == 1 {
                let score = view.iter().copied().next().unwrap_or(0.0);
                if score < self.min_confidence {
                    debug!(score, "pose score below threshold");
                    return Ok(PoseFrame::NoLandmarks);
                }
            }
        }

        let output = outputs
            .first()
            .ok_or_else(|| TrackerError::Inference("model produced no outputs".to_string()))?;
        let tensor: OrtOwnedTensor<f32, _> = output.try_extract().map_err(inference_error)?;
        let view = tensor.view();

        let shape = view.shape().to_vec();
        let stride = if shape.len() >= 3 {
            shape[shape.len() - 1]
        } else {
            BLAZEPOSE_STRIDE
        };
        if stride < 2 {
            return Err(TrackerError::Inference(format!(
                "unexpected landmark output shape {shape:?}"
            )));
        }

        let values: Vec<f32> = view.iter().copied().collect();
        let mut landmarks: Vec<Landmark> = values
            .chunks_exact(stride)
            .map(|v| Landmark {
                x: v[0],
                y: v[1],
                z: v.get(2).copied().unwrap_or(0.0),
                visibility: v.get(3).copied().unwrap_or(1.0),
            })
            .collect();

        // Some exports report pixels of the model input instead of 0-1
        if landmarks.iter().any(|lm| lm.x > 1.5 || lm.y > 1.5) {
            let (w, h) = (self.input_width as f32, self.input_height as f32);
            for lm in &mut landmarks {
                lm.x /= w;
                lm.y /= h;
            }
        }

        if landmarks.is_empty() {
            return Ok(PoseFrame::NoLandmarks);
        }
        Ok(PoseFrame::Detected(landmarks))
    }
}

impl LandmarkProvider<Mat> for PoseDetector {
    fn detect(&mut self, frame: &Mat) -> Result<PoseFrame> {
        let input = CowArray::from(self.preprocess(frame)?.into_dyn());
        let input_tensor =
            Value::from_array(self.session.allocator(), &input).map_err(inference_error)?;

        let outputs = self.session.run(vec![input_tensor]).map_err(inference_error)?;

        self.postprocess(&outputs)
    }
}
