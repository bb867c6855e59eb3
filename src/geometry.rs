//! Joint angle calculation from three landmark points
//!
//! The angle is measured at the vertex between the vectors
//! vertex→a and vertex→c, folded into the interior range [0, 180].

/// Segments shorter than this are treated as coincident points
const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// A 2D point in normalized image coordinates (0-1)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distance to another point
    pub fn distance(&self, other: Point2D) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Calculate the joint angle in degrees at `vertex`
///
/// `a` and `c` are the adjacent joints (e.g. shoulder and wrist around an
/// elbow). Returns a value in [0, 180]:
/// - 180° = fully straight
/// - 90° = right angle
///
/// Coincident points give NaN. NaN fails every threshold comparison, so
/// callers rate it out of range and it never drives a phase change.
pub fn joint_angle(a: Point2D, vertex: Point2D, c: Point2D) -> f32 {
    if vertex.distance(a) < MIN_SEGMENT_LENGTH || vertex.distance(c) < MIN_SEGMENT_LENGTH {
        return f32::NAN;
    }

    let radians = (c.y - vertex.y).atan2(c.x - vertex.x) - (a.y - vertex.y).atan2(a.x - vertex.x);
    let angle = radians.to_degrees().abs();

    // Fold the reflex side back so both rotation directions agree
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f32, y: f32) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn test_straight_arm() {
        let angle = joint_angle(p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0));
        assert_relative_eq!(angle, 180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_bent_arm() {
        let angle = joint_angle(p(0.0, 0.0), p(0.5, 0.0), p(0.5, 0.5));
        assert_relative_eq!(angle, 90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_folded_arm() {
        let angle = joint_angle(p(0.2, 0.5), p(0.5, 0.5), p(0.2, 0.5));
        assert_relative_eq!(angle, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_reflex_difference_is_folded() {
        // atan2 difference here is 270°, which must read as 90°
        let angle = joint_angle(p(0.5, 0.4), p(0.5, 0.5), p(0.4, 0.5));
        assert_relative_eq!(angle, 90.0, epsilon = 1e-3);

        // Crossing the ±180° branch cut of atan2
        let angle = joint_angle(p(0.4, 0.49), p(0.5, 0.5), p(0.4, 0.51));
        assert!(angle < 20.0, "expected a narrow angle, got {angle}");
    }

    #[test]
    fn test_always_within_interior_range() {
        let vertex = p(0.5, 0.5);
        for i in 0..24 {
            for j in 0..24 {
                let ta = i as f32 * std::f32::consts::TAU / 24.0;
                let tc = j as f32 * std::f32::consts::TAU / 24.0;
                let a = p(0.5 + 0.3 * ta.cos(), 0.5 + 0.3 * ta.sin());
                let c = p(0.5 + 0.2 * tc.cos(), 0.5 + 0.2 * tc.sin());
                let angle = joint_angle(a, vertex, c);
                assert!((0.0..=180.0).contains(&angle), "{angle} out of range");
            }
        }
    }

    #[test]
    fn test_symmetric_in_outer_points() {
        let cases = [
            (p(0.1, 0.2), p(0.4, 0.6), p(0.9, 0.3)),
            (p(0.7, 0.1), p(0.5, 0.5), p(0.2, 0.8)),
            (p(0.3, 0.3), p(0.31, 0.9), p(0.6, 0.95)),
        ];
        for (a, b, c) in cases {
            assert_eq!(joint_angle(a, b, c), joint_angle(c, b, a));
        }
    }

    #[test]
    fn test_coincident_points_are_nan() {
        assert!(joint_angle(p(0.5, 0.5), p(0.5, 0.5), p(0.9, 0.1)).is_nan());
        assert!(joint_angle(p(0.1, 0.1), p(0.5, 0.5), p(0.5, 0.5)).is_nan());
    }
}
