//! Shoulder press repetition state machine
//!
//! Counting uses hysteresis: both elbows must reach full extension to count
//! a rep, and either elbow dropping below the retraction threshold re-arms
//! the counter. Feedback is a separate, softer range check per arm.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Coarse motion state of the arms
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No phase observed yet. Does not satisfy the Down → Up check.
    #[default]
    Unknown,
    Down,
    Up,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Unknown => "unknown",
            Phase::Down => "down",
            Phase::Up => "up",
        }
    }
}

/// Repetition count and phase carried across frames of one session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepCounterState {
    pub count: u32,
    pub phase: Phase,
}

impl RepCounterState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Which arm a measurement belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arm {
    Left,
    Right,
}

impl Arm {
    pub fn label(&self) -> &'static str {
        match self {
            Arm::Left => "Left",
            Arm::Right => "Right",
        }
    }
}

/// Qualitative rating of a single arm position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormRating {
    Good,
    OutOfRange,
}

/// Per-arm feedback for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmFeedback {
    pub arm: Arm,
    pub rating: FormRating,
    /// Elbow angle in degrees (NaN when the points were degenerate)
    pub angle: f32,
}

impl ArmFeedback {
    pub fn is_good(&self) -> bool {
        self.rating == FormRating::Good
    }

    /// Short angle label, e.g. "Left: 165 deg"
    pub fn angle_label(&self) -> String {
        if self.angle.is_finite() {
            format!("{}: {} deg", self.arm.label(), self.angle as i32)
        } else {
            format!("{}: --", self.arm.label())
        }
    }
}

impl fmt::Display for ArmFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rating {
            FormRating::Good => write!(f, "{} arm good", self.arm.label()),
            FormRating::OutOfRange => write!(f, "{} arm out of range", self.arm.label()),
        }
    }
}

/// Feedback for both arms
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Feedback {
    pub left: ArmFeedback,
    pub right: ArmFeedback,
}

/// Angle thresholds in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Both elbows at or above this count a rep (from Down)
    pub extended: f32,
    /// Either elbow below this moves the phase to Down
    pub retracted: f32,
    /// Feedback is Good strictly above this...
    pub form_min: f32,
    /// ...and strictly below this
    pub form_max: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            extended: 160.0,
            retracted: 70.0,
            form_min: 70.0,
            form_max: 180.0,
        }
    }
}

/// Repetition counter with per-arm feedback
///
/// Holds only the thresholds. The counter state is passed in and returned
/// by [`RepStateMachine::step`], so the caller owns it.
#[derive(Clone, Copy, Debug, Default)]
pub struct RepStateMachine {
    thresholds: Thresholds,
}

impl RepStateMachine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Advance the counter by one frame
    ///
    /// Both transition checks read the phase as it was before this frame,
    /// and the new state is written once.
    pub fn step(
        &self,
        left_angle: f32,
        right_angle: f32,
        state: RepCounterState,
    ) -> (RepCounterState, Feedback) {
        let t = &self.thresholds;

        let extended = left_angle >= t.extended && right_angle >= t.extended;
        let retracted = left_angle < t.retracted || right_angle < t.retracted;
        let counted = extended && state.phase == Phase::Down;

        let phase = if retracted {
            Phase::Down
        } else if counted {
            Phase::Up
        } else {
            state.phase
        };

        let next = RepCounterState {
            count: if counted {
                state.count.saturating_add(1)
            } else {
                state.count
            },
            phase,
        };

        if counted {
            info!(count = next.count, left_angle, right_angle, "repetition counted");
        }
        if next.phase != state.phase {
            debug!(from = state.phase.name(), to = next.phase.name(), "phase changed");
        }

        let feedback = Feedback {
            left: self.feedback(Arm::Left, left_angle),
            right: self.feedback(Arm::Right, right_angle),
        };

        (next, feedback)
    }

    /// Rate an elbow angle. Boundaries and NaN are out of range.
    pub fn rate(&self, angle: f32) -> FormRating {
        if angle > self.thresholds.form_min && angle < self.thresholds.form_max {
            FormRating::Good
        } else {
            FormRating::OutOfRange
        }
    }

    fn feedback(&self, arm: Arm, angle: f32) -> ArmFeedback {
        ArmFeedback {
            arm,
            rating: self.rate(angle),
            angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(count: u32, phase: Phase) -> RepCounterState {
        RepCounterState { count, phase }
    }

    #[test]
    fn test_down_to_up_counts_once() {
        let machine = RepStateMachine::default();
        let (next, _) = machine.step(165.0, 170.0, state(3, Phase::Down));
        assert_eq!(next, state(4, Phase::Up));
    }

    #[test]
    fn test_up_does_not_count_again() {
        let machine = RepStateMachine::default();
        let (next, _) = machine.step(170.0, 175.0, state(4, Phase::Up));
        assert_eq!(next, state(4, Phase::Up));
    }

    #[test]
    fn test_unknown_phase_does_not_count() {
        let machine = RepStateMachine::default();
        let (next, _) = machine.step(170.0, 170.0, RepCounterState::new());
        assert_eq!(next, state(0, Phase::Unknown));
    }

    #[test]
    fn test_either_arm_low_rearms() {
        let machine = RepStateMachine::default();
        for prior in [Phase::Unknown, Phase::Down, Phase::Up] {
            let (next, _) = machine.step(65.0, 175.0, state(2, prior));
            assert_eq!(next, state(2, Phase::Down));

            let (next, _) = machine.step(120.0, 65.0, state(2, prior));
            assert_eq!(next, state(2, Phase::Down));
        }
    }

    #[test]
    fn test_asymmetric_press_does_not_count() {
        let machine = RepStateMachine::default();
        let (next, _) = machine.step(160.0, 155.0, state(1, Phase::Down));
        assert_eq!(next, state(1, Phase::Down));
    }

    #[test]
    fn test_threshold_boundaries() {
        let machine = RepStateMachine::default();

        // Exactly 160 on both arms counts
        let (next, _) = machine.step(160.0, 160.0, state(0, Phase::Down));
        assert_eq!(next, state(1, Phase::Up));

        // Exactly 70 does not re-arm
        let (next, _) = machine.step(70.0, 70.0, state(1, Phase::Up));
        assert_eq!(next, state(1, Phase::Up));
    }

    #[test]
    fn test_dead_zone_keeps_phase() {
        let machine = RepStateMachine::default();
        for prior in [Phase::Unknown, Phase::Down, Phase::Up] {
            let (next, _) = machine.step(110.0, 140.0, state(5, prior));
            assert_eq!(next, state(5, prior));
        }
    }

    #[test]
    fn test_nan_never_transitions() {
        let machine = RepStateMachine::default();
        for prior in [Phase::Unknown, Phase::Down, Phase::Up] {
            let (next, feedback) = machine.step(f32::NAN, 170.0, state(1, prior));
            assert_eq!(next, state(1, prior));
            assert_eq!(feedback.left.rating, FormRating::OutOfRange);
            assert_eq!(feedback.right.rating, FormRating::Good);
        }
    }

    #[test]
    fn test_feedback_boundaries() {
        let machine = RepStateMachine::default();
        assert_eq!(machine.rate(70.0), FormRating::OutOfRange);
        assert_eq!(machine.rate(70.0001), FormRating::Good);
        assert_eq!(machine.rate(180.0), FormRating::OutOfRange);
        assert_eq!(machine.rate(179.999), FormRating::Good);
        assert_eq!(machine.rate(f32::NAN), FormRating::OutOfRange);
    }

    #[test]
    fn test_feedback_independent_of_counting() {
        let machine = RepStateMachine::default();
        let (_, feedback) = machine.step(65.0, 180.0, state(0, Phase::Up));
        assert_eq!(feedback.left.rating, FormRating::OutOfRange);
        assert_eq!(feedback.right.rating, FormRating::OutOfRange);
        assert_eq!(feedback.left.angle, 65.0);
        assert_eq!(feedback.right.arm, Arm::Right);
    }

    #[test]
    fn test_press_sequence() {
        let machine = RepStateMachine::default();
        let steps = [
            ((50.0, 50.0), state(0, Phase::Down)),
            ((165.0, 170.0), state(1, Phase::Up)),
            ((165.0, 168.0), state(1, Phase::Up)),
            ((60.0, 160.0), state(1, Phase::Down)),
            ((162.0, 163.0), state(2, Phase::Up)),
        ];

        let mut current = RepCounterState::new();
        for ((left, right), expected) in steps {
            current = machine.step(left, right, current).0;
            assert_eq!(current, expected);
        }
        assert_eq!(current, state(2, Phase::Up));
    }

    #[test]
    fn test_repeated_input_is_stable() {
        let machine = RepStateMachine::default();
        for (left, right) in [(120.0, 130.0), (50.0, 100.0), (170.0, 170.0)] {
            let first = machine.step(left, right, state(7, Phase::Unknown)).0;
            let mut current = first;
            for _ in 0..10 {
                current = machine.step(left, right, current).0;
            }
            assert_eq!(current, first);
            assert_eq!(current.count, 7);
        }
    }

    #[test]
    fn test_feedback_messages() {
        let machine = RepStateMachine::default();
        let (_, feedback) = machine.step(100.0, 40.0, RepCounterState::new());
        assert_eq!(feedback.left.to_string(), "Left arm good");
        assert_eq!(feedback.right.to_string(), "Right arm out of range");
        assert_eq!(feedback.left.angle_label(), "Left: 100 deg");

        let (_, feedback) = machine.step(f32::NAN, 40.0, RepCounterState::new());
        assert_eq!(feedback.left.angle_label(), "Left: --");
    }
}
