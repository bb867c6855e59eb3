//! Per-frame shoulder press analysis
//!
//! Pure step: landmarks in, angles + updated counter + feedback out.
//! Nothing here touches the camera or the display.

use crate::error::Result;
use crate::landmarks::{ArmPoints, Landmark, LandmarkSchema};
use crate::rep_counter::{Feedback, RepCounterState, RepStateMachine};

/// Everything derived from one frame with a detected body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAnalysis {
    pub arms: ArmPoints,
    pub left_angle: f32,
    pub right_angle: f32,
    pub state: RepCounterState,
    pub feedback: Feedback,
}

pub struct PressAnalyzer {
    schema: LandmarkSchema,
    machine: RepStateMachine,
}

impl PressAnalyzer {
    pub fn new(schema: LandmarkSchema, machine: RepStateMachine) -> Self {
        Self { schema, machine }
    }

    pub fn schema(&self) -> &LandmarkSchema {
        &self.schema
    }

    /// Analyze one frame's landmarks against the prior counter state
    ///
    /// Fails with `LandmarksAbsent` when a required joint is missing; the
    /// caller keeps its prior state in that case.
    pub fn analyze(&self, landmarks: &[Landmark], state: RepCounterState) -> Result<FrameAnalysis> {
        let arms = self.schema.arm_points(landmarks)?;

        let left_angle = arms.left.elbow_angle();
        let right_angle = arms.right.elbow_angle();

        let (state, feedback) = self.machine.step(left_angle, right_angle, state);

        Ok(FrameAnalysis {
            arms,
            left_angle,
            right_angle,
            state,
            feedback,
        })
    }
}

impl Default for PressAnalyzer {
    fn default() -> Self {
        Self::new(LandmarkSchema::default(), RepStateMachine::default())
    }
}
