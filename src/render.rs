//! Overlay plan - drawing primitives derived from a frame analysis
//!
//! Built without any drawing library so the layout can be tested; the
//! preview window turns primitives into actual draw calls.

use crate::analysis::FrameAnalysis;
use crate::geometry::Point2D;
use crate::landmarks::{ArmPose, Landmark, POSE_CONNECTIONS, POSE_LANDMARK_COUNT};
use crate::rep_counter::ArmFeedback;

/// BGR color, matching OpenCV channel order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Color {
    pub const GREEN: Color = Color { b: 0, g: 255, r: 0 };
    pub const RED: Color = Color { b: 0, g: 0, r: 255 };
    pub const WHITE: Color = Color { b: 255, g: 255, r: 255 };
    /// Skeleton lines under the arm overlay
    pub const SKELETON: Color = Color { b: 230, g: 230, r: 230 };
    /// Landmark dots
    pub const JOINT: Color = Color { b: 66, g: 117, r: 245 };

    /// Color for an arm in or out of the plausible range
    pub fn for_feedback(feedback: &ArmFeedback) -> Color {
        if feedback.is_good() {
            Color::GREEN
        } else {
            Color::RED
        }
    }
}

/// Where a label is placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Next to a landmark, shifted by a pixel offset
    Landmark { at: Point2D, dx: i32, dy: i32 },
    /// Fixed pixel position
    Screen { x: i32, y: i32 },
}

impl Anchor {
    pub fn resolve(&self, width: i32, height: i32) -> (i32, i32) {
        match *self {
            Anchor::Landmark { at, dx, dy } => {
                let (x, y) = to_pixel(at, width, height);
                (x + dx, y + dy)
            }
            Anchor::Screen { x, y } => (x, y),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: Point2D,
        to: Point2D,
        color: Color,
        thickness: i32,
    },
    Joint {
        at: Point2D,
        color: Color,
        radius: i32,
    },
    Label {
        text: String,
        anchor: Anchor,
        color: Color,
        scale: f64,
        thickness: i32,
    },
}

/// Ordered list of primitives, drawn back to front
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub primitives: Vec<Primitive>,
}

impl Overlay {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Convert normalized landmark (0-1) to pixel coordinates
pub fn to_pixel(p: Point2D, width: i32, height: i32) -> (i32, i32) {
    ((p.x * width as f32) as i32, (p.y * height as f32) as i32)
}

const ARM_LINE_THICKNESS: i32 = 4;
const FEEDBACK_X: i32 = 10;
const FEEDBACK_TOP: i32 = 30;
const FEEDBACK_SPACING: i32 = 30;

/// Build the overlay for a frame with a detected body
pub fn build_overlay(landmarks: &[Landmark], analysis: &FrameAnalysis) -> Overlay {
    let mut primitives = Vec::new();

    primitives.extend(skeleton_primitives(landmarks));
    primitives.extend(arm_primitives(&analysis.arms.right, &analysis.feedback.right));
    primitives.extend(arm_primitives(&analysis.arms.left, &analysis.feedback.left));

    // Feedback text, right arm first
    let mut y = FEEDBACK_TOP;
    for feedback in [&analysis.feedback.right, &analysis.feedback.left] {
        primitives.push(Primitive::Label {
            text: feedback.to_string(),
            anchor: Anchor::Screen { x: FEEDBACK_X, y },
            color: Color::for_feedback(feedback),
            scale: 0.7,
            thickness: 2,
        });
        y += FEEDBACK_SPACING;
    }

    primitives.push(Primitive::Label {
        text: format!("Reps: {}", analysis.state.count),
        anchor: Anchor::Screen { x: FEEDBACK_X, y: y + 10 },
        color: Color::WHITE,
        scale: 1.0,
        thickness: 2,
    });

    Overlay { primitives }
}

fn skeleton_primitives(landmarks: &[Landmark]) -> Vec<Primitive> {
    let mut primitives = Vec::new();

    for &(start, end) in POSE_CONNECTIONS.iter() {
        if let (Some(a), Some(b)) = (landmarks.get(start), landmarks.get(end)) {
            primitives.push(Primitive::Line {
                from: a.point(),
                to: b.point(),
                color: Color::SKELETON,
                thickness: 2,
            });
        }
    }

    for landmark in landmarks.iter().take(POSE_LANDMARK_COUNT) {
        primitives.push(Primitive::Joint {
            at: landmark.point(),
            color: Color::JOINT,
            radius: 3,
        });
    }

    primitives
}

/// Colored shoulder→elbow→wrist lines plus the angle label
fn arm_primitives(arm: &ArmPose, feedback: &ArmFeedback) -> Vec<Primitive> {
    let color = Color::for_feedback(feedback);

    vec![
        Primitive::Line {
            from: arm.shoulder,
            to: arm.elbow,
            color,
            thickness: ARM_LINE_THICKNESS,
        },
        Primitive::Line {
            from: arm.elbow,
            to: arm.wrist,
            color,
            thickness: ARM_LINE_THICKNESS,
        },
        Primitive::Label {
            text: feedback.angle_label(),
            anchor: Anchor::Landmark {
                at: arm.elbow,
                dx: 0,
                dy: -10,
            },
            color,
            scale: 0.5,
            thickness: 2,
        },
    ]
}
