//! Pose landmarks and the named-role mapping onto the pose model's indices

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::geometry::{joint_angle, Point2D};

// ============================================================================
// LANDMARK INDICES (BlazePose - 33 body landmarks)
// ============================================================================

/// Body landmarks in a BlazePose output; later rows are auxiliary ROI points
pub const POSE_LANDMARK_COUNT: usize = 33;

pub const NOSE: usize = 0;
pub const LEFT_EYE_INNER: usize = 1;
pub const LEFT_EYE: usize = 2;
pub const LEFT_EYE_OUTER: usize = 3;
pub const RIGHT_EYE_INNER: usize = 4;
pub const RIGHT_EYE: usize = 5;
pub const RIGHT_EYE_OUTER: usize = 6;
pub const LEFT_EAR: usize = 7;
pub const RIGHT_EAR: usize = 8;
pub const MOUTH_LEFT: usize = 9;
pub const MOUTH_RIGHT: usize = 10;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_PINKY: usize = 17;
pub const RIGHT_PINKY: usize = 18;
pub const LEFT_INDEX: usize = 19;
pub const RIGHT_INDEX: usize = 20;
pub const LEFT_THUMB: usize = 21;
pub const RIGHT_THUMB: usize = 22;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;
pub const LEFT_HEEL: usize = 29;
pub const RIGHT_HEEL: usize = 30;
pub const LEFT_FOOT_INDEX: usize = 31;
pub const RIGHT_FOOT_INDEX: usize = 32;

/// Full BlazePose skeleton, drawn under the arm overlay
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    // Face
    (NOSE, LEFT_EYE_INNER),
    (LEFT_EYE_INNER, LEFT_EYE),
    (LEFT_EYE, LEFT_EYE_OUTER),
    (LEFT_EYE_OUTER, LEFT_EAR),
    (NOSE, RIGHT_EYE_INNER),
    (RIGHT_EYE_INNER, RIGHT_EYE),
    (RIGHT_EYE, RIGHT_EYE_OUTER),
    (RIGHT_EYE_OUTER, RIGHT_EAR),
    (MOUTH_LEFT, MOUTH_RIGHT),
    // Arms and hands
    (LEFT_SHOULDER, RIGHT_SHOULDER),
    (LEFT_SHOULDER, LEFT_ELBOW),
    (LEFT_ELBOW, LEFT_WRIST),
    (LEFT_WRIST, LEFT_PINKY),
    (LEFT_WRIST, LEFT_INDEX),
    (LEFT_WRIST, LEFT_THUMB),
    (LEFT_PINKY, LEFT_INDEX),
    (RIGHT_SHOULDER, RIGHT_ELBOW),
    (RIGHT_ELBOW, RIGHT_WRIST),
    (RIGHT_WRIST, RIGHT_PINKY),
    (RIGHT_WRIST, RIGHT_INDEX),
    (RIGHT_WRIST, RIGHT_THUMB),
    (RIGHT_PINKY, RIGHT_INDEX),
    // Torso
    (LEFT_SHOULDER, LEFT_HIP),
    (RIGHT_SHOULDER, RIGHT_HIP),
    (LEFT_HIP, RIGHT_HIP),
    // Legs and feet
    (LEFT_HIP, LEFT_KNEE),
    (RIGHT_HIP, RIGHT_KNEE),
    (LEFT_KNEE, LEFT_ANKLE),
    (RIGHT_KNEE, RIGHT_ANKLE),
    (LEFT_ANKLE, LEFT_HEEL),
    (RIGHT_ANKLE, RIGHT_HEEL),
    (LEFT_HEEL, LEFT_FOOT_INDEX),
    (RIGHT_HEEL, RIGHT_FOOT_INDEX),
    (LEFT_ANKLE, LEFT_FOOT_INDEX),
    (RIGHT_ANKLE, RIGHT_FOOT_INDEX),
];

/// A single detected keypoint
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    /// 0-1 normalized to image width
    pub x: f32,
    /// 0-1 normalized to image height
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }

    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Result of running the pose model on one frame
#[derive(Debug, Clone, PartialEq)]
pub enum PoseFrame {
    NoLandmarks,
    Detected(Vec<Landmark>),
}

/// Joints the counter reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointRole {
    LeftShoulder,
    LeftElbow,
    LeftWrist,
    RightShoulder,
    RightElbow,
    RightWrist,
}

impl JointRole {
    pub const ALL: [JointRole; 6] = [
        JointRole::LeftShoulder,
        JointRole::LeftElbow,
        JointRole::LeftWrist,
        JointRole::RightShoulder,
        JointRole::RightElbow,
        JointRole::RightWrist,
    ];
}

/// Maps joint roles to indices of the landmark model's output
///
/// Only this mapping changes if the pose model uses another layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkSchema {
    pub left_shoulder: usize,
    pub left_elbow: usize,
    pub left_wrist: usize,
    pub right_shoulder: usize,
    pub right_elbow: usize,
    pub right_wrist: usize,
}

impl Default for LandmarkSchema {
    fn default() -> Self {
        Self::blazepose()
    }
}

impl LandmarkSchema {
    pub const fn blazepose() -> Self {
        Self {
            left_shoulder: LEFT_SHOULDER,
            left_elbow: LEFT_ELBOW,
            left_wrist: LEFT_WRIST,
            right_shoulder: RIGHT_SHOULDER,
            right_elbow: RIGHT_ELBOW,
            right_wrist: RIGHT_WRIST,
        }
    }

    pub fn index(&self, role: JointRole) -> usize {
        match role {
            JointRole::LeftShoulder => self.left_shoulder,
            JointRole::LeftElbow => self.left_elbow,
            JointRole::LeftWrist => self.left_wrist,
            JointRole::RightShoulder => self.right_shoulder,
            JointRole::RightElbow => self.right_elbow,
            JointRole::RightWrist => self.right_wrist,
        }
    }

    /// Whether two roles share an index
    pub fn has_duplicates(&self) -> bool {
        let indices = JointRole::ALL.map(|role| self.index(role));
        indices
            .iter()
            .enumerate()
            .any(|(i, idx)| indices[i + 1..].contains(idx))
    }

    pub fn point(&self, landmarks: &[Landmark], role: JointRole) -> Option<Point2D> {
        landmarks.get(self.index(role)).map(Landmark::point)
    }

    /// Pull the six arm points out of a frame's landmarks
    pub fn arm_points(&self, landmarks: &[Landmark]) -> Result<ArmPoints> {
        let point = |role: JointRole| self.point(landmarks, role).ok_or(TrackerError::LandmarksAbsent);

        Ok(ArmPoints {
            left: ArmPose {
                shoulder: point(JointRole::LeftShoulder)?,
                elbow: point(JointRole::LeftElbow)?,
                wrist: point(JointRole::LeftWrist)?,
            },
            right: ArmPose {
                shoulder: point(JointRole::RightShoulder)?,
                elbow: point(JointRole::RightElbow)?,
                wrist: point(JointRole::RightWrist)?,
            },
        })
    }
}

/// Shoulder, elbow and wrist of one arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPose {
    pub shoulder: Point2D,
    pub elbow: Point2D,
    pub wrist: Point2D,
}

impl ArmPose {
    /// Elbow angle in degrees
    pub fn elbow_angle(&self) -> f32 {
        joint_angle(self.shoulder, self.elbow, self.wrist)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPoints {
    pub left: ArmPose,
    pub right: ArmPose,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame_with(len: usize) -> Vec<Landmark> {
        (0..len)
            .map(|i| Landmark::new(i as f32 / 100.0, 0.5))
            .collect()
    }

    #[test]
    fn test_blazepose_roles() {
        let schema = LandmarkSchema::default();
        assert_eq!(schema.index(JointRole::LeftShoulder), 11);
        assert_eq!(schema.index(JointRole::RightWrist), 16);
        assert!(!schema.has_duplicates());
    }

    #[test]
    fn test_arm_points_by_role() {
        let schema = LandmarkSchema::default();
        let arms = schema.arm_points(&frame_with(33)).unwrap();
        assert_relative_eq!(arms.left.shoulder.x, 0.11);
        assert_relative_eq!(arms.left.elbow.x, 0.13);
        assert_relative_eq!(arms.right.wrist.x, 0.16);
    }

    #[test]
    fn test_short_frame_is_absent() {
        let schema = LandmarkSchema::default();
        assert_eq!(schema.arm_points(&frame_with(16)), Err(TrackerError::LandmarksAbsent));
        assert!(schema.arm_points(&frame_with(17)).is_ok());
        assert_eq!(schema.arm_points(&[]), Err(TrackerError::LandmarksAbsent));
    }

    #[test]
    fn test_custom_schema() {
        // COCO-17 layout
        let schema = LandmarkSchema {
            left_shoulder: 5,
            left_elbow: 7,
            left_wrist: 9,
            right_shoulder: 6,
            right_elbow: 8,
            right_wrist: 10,
        };
        assert_eq!(schema.arm_points(&frame_with(10)), Err(TrackerError::LandmarksAbsent));
        let arms = schema.arm_points(&frame_with(17)).unwrap();
        assert_relative_eq!(arms.right.elbow.x, 0.08);
    }

    #[test]
    fn test_duplicate_indices_detected() {
        let schema = LandmarkSchema {
            right_wrist: 11,
            ..LandmarkSchema::default()
        };
        assert!(schema.has_duplicates());
    }

    #[test]
    fn test_elbow_angle() {
        let arm = ArmPose {
            shoulder: Point2D::new(0.4, 0.3),
            elbow: Point2D::new(0.4, 0.5),
            wrist: Point2D::new(0.6, 0.5),
        };
        assert_relative_eq!(arm.elbow_angle(), 90.0, epsilon = 1e-3);
    }
}
