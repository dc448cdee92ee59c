//! Face mesh landmarks and the geometric features derived from them.
//!
//! Indices follow the 468-point face mesh emitted by the upstream detector.
//! Every feature degrades to a documented default when a landmark it needs
//! is absent or non-finite; nothing here can fail.

use crate::shared::point::Point;

const LEFT_EYE_OUTER: usize = 33;
const LEFT_EYE_INNER: usize = 133;
const RIGHT_EYE_INNER: usize = 362;
const RIGHT_EYE_OUTER: usize = 263;
const NOSE_TIP: usize = 1;
const FOREHEAD_TOP: usize = 10;
const CHIN: usize = 152;
const LEFT_CHEEK: usize = 234;
const RIGHT_CHEEK: usize = 454;

/// Fraction of the vertical eye-to-nose distance the anchor is pulled down by.
pub const NOSE_SHIFT_RATIO: f64 = 0.6;

/// Normalized size reported when the extent landmarks are missing.
pub const DEFAULT_FACE_SIZE: f64 = 0.2;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceLandmarks {
    /// Normalized `(x, y)` per mesh index.
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied().filter(Point::is_finite)
    }

    fn left_eye(&self) -> Option<Point> {
        Some(self.get(LEFT_EYE_OUTER)?.midpoint(&self.get(LEFT_EYE_INNER)?))
    }

    fn right_eye(&self) -> Option<Point> {
        Some(self.get(RIGHT_EYE_INNER)?.midpoint(&self.get(RIGHT_EYE_OUTER)?))
    }

    /// Midpoint between the eyes, pulled toward the nose tip vertically so
    /// the anchor sits above the mouth.
    ///
    /// Returns `None` when either eye or the nose tip is missing.
    pub fn center(&self) -> Option<Point> {
        let eyes = self.left_eye()?.midpoint(&self.right_eye()?);
        let nose = self.get(NOSE_TIP)?;
        Some(Point::new(
            eyes.x,
            eyes.y + (nose.y - eyes.y) * NOSE_SHIFT_RATIO,
        ))
    }

    /// Larger of the forehead-to-chin and cheek-to-cheek extents.
    pub fn size(&self) -> f64 {
        self.extent().unwrap_or(DEFAULT_FACE_SIZE)
    }

    fn extent(&self) -> Option<f64> {
        let vertical = (self.get(CHIN)?.y - self.get(FOREHEAD_TOP)?.y).abs();
        let horizontal = (self.get(RIGHT_CHEEK)?.x - self.get(LEFT_CHEEK)?.x).abs();
        Some(vertical.max(horizontal))
    }

    /// Roll angle in degrees of the line from the left to the right eye.
    pub fn rotation(&self) -> f64 {
        match (self.left_eye(), self.right_eye()) {
            (Some(left), Some(right)) => (right.y - left.y).atan2(right.x - left.x).to_degrees(),
            _ => 0.0,
        }
    }
}

impl From<Vec<(f64, f64)>> for FaceLandmarks {
    fn from(points: Vec<(f64, f64)>) -> Self {
        Self::new(points.into_iter().map(Point::from).collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const MESH_POINTS: usize = 468;

    /// Synthetic mesh: eyes level at `eye_y`, nose tip `nose_drop` below them,
    /// face extent `size` in both directions around `(cx, eye_y)`.
    pub(crate) fn synthetic_face(cx: f64, eye_y: f64, nose_drop: f64, size: f64) -> FaceLandmarks {
        let mut points = vec![Point::new(cx, eye_y); MESH_POINTS];
        let eye_half_span = size / 4.0;
        let corner = size / 16.0;
        points[LEFT_EYE_OUTER] = Point::new(cx - eye_half_span - corner, eye_y);
        points[LEFT_EYE_INNER] = Point::new(cx - eye_half_span + corner, eye_y);
        points[RIGHT_EYE_INNER] = Point::new(cx + eye_half_span - corner, eye_y);
        points[RIGHT_EYE_OUTER] = Point::new(cx + eye_half_span + corner, eye_y);
        points[NOSE_TIP] = Point::new(cx, eye_y + nose_drop);
        points[FOREHEAD_TOP] = Point::new(cx, eye_y - size / 2.0);
        points[CHIN] = Point::new(cx, eye_y + size / 2.0);
        points[LEFT_CHEEK] = Point::new(cx - size / 2.0, eye_y);
        points[RIGHT_CHEEK] = Point::new(cx + size / 2.0, eye_y);
        FaceLandmarks::new(points)
    }

    // ── center ──────────────────────────────────────────────────────

    #[test]
    fn test_center_shifts_toward_nose() {
        let lm = synthetic_face(0.5, 0.4, 0.1, 0.2);
        let c = lm.center().unwrap();
        assert_relative_eq!(c.x, 0.5, epsilon = 1e-12);
        // 0.4 + 0.1 * 0.6
        assert_relative_eq!(c.y, 0.46, epsilon = 1e-12);
    }

    #[test]
    fn test_center_uses_eye_midpoint_horizontally() {
        let mut lm = synthetic_face(0.5, 0.4, 0.1, 0.2);
        // Nose off to the side has no horizontal effect
        lm.points[NOSE_TIP] = Point::new(0.9, 0.5);
        let c = lm.center().unwrap();
        assert_relative_eq!(c.x, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_center_empty_is_none() {
        assert!(FaceLandmarks::default().center().is_none());
    }

    #[test]
    fn test_center_truncated_mesh_is_none() {
        let lm = FaceLandmarks::from(vec![(0.5, 0.5); 100]);
        assert!(lm.center().is_none());
    }

    #[test]
    fn test_center_nan_nose_is_none() {
        let mut lm = synthetic_face(0.5, 0.4, 0.1, 0.2);
        lm.points[NOSE_TIP] = Point::new(f64::NAN, 0.5);
        assert!(lm.center().is_none());
    }

    // ── size ────────────────────────────────────────────────────────

    #[test]
    fn test_size_takes_larger_extent() {
        let mut lm = synthetic_face(0.5, 0.5, 0.1, 0.2);
        lm.points[LEFT_CHEEK] = Point::new(0.3, 0.5);
        lm.points[RIGHT_CHEEK] = Point::new(0.65, 0.5);
        assert_relative_eq!(lm.size(), 0.35, epsilon = 1e-12);
    }

    #[test]
    fn test_size_vertical_extent() {
        let lm = synthetic_face(0.5, 0.5, 0.1, 0.3);
        assert_relative_eq!(lm.size(), 0.3, epsilon = 1e-12);
    }

    #[rstest]
    #[case::empty(FaceLandmarks::default())]
    #[case::truncated(FaceLandmarks::from(vec![(0.5, 0.5); 200]))]
    fn test_size_missing_landmarks_falls_back(#[case] lm: FaceLandmarks) {
        assert_relative_eq!(lm.size(), DEFAULT_FACE_SIZE);
    }

    // ── rotation ────────────────────────────────────────────────────

    #[test]
    fn test_rotation_level_eyes_is_zero() {
        let lm = synthetic_face(0.5, 0.4, 0.1, 0.2);
        assert_relative_eq!(lm.rotation(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_tilted_forty_five_degrees() {
        let mut lm = synthetic_face(0.5, 0.4, 0.1, 0.2);
        lm.points[LEFT_EYE_OUTER] = Point::new(0.4, 0.4);
        lm.points[LEFT_EYE_INNER] = Point::new(0.4, 0.4);
        lm.points[RIGHT_EYE_INNER] = Point::new(0.5, 0.5);
        lm.points[RIGHT_EYE_OUTER] = Point::new(0.5, 0.5);
        assert_relative_eq!(lm.rotation(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_missing_landmarks_is_zero() {
        assert_relative_eq!(FaceLandmarks::default().rotation(), 0.0);
    }
}
