use crate::shared::point::Point;

use super::face_landmarks::FaceLandmarks;

/// One face observed in one frame, before identity assignment.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub landmarks: FaceLandmarks,
    /// `None` when extraction failed; such detections are ignored by the registry.
    pub center: Option<Point>,
    pub size: f64,
    pub rotation: f64,
}

impl Detection {
    pub fn from_landmarks(landmarks: FaceLandmarks) -> Self {
        Self {
            center: landmarks.center(),
            size: landmarks.size(),
            rotation: landmarks.rotation(),
            landmarks,
        }
    }

    /// Detection with precomputed geometry and no landmark payload.
    pub fn from_geometry(center: Point, size: f64, rotation: f64) -> Self {
        Self {
            landmarks: FaceLandmarks::default(),
            center: Some(center),
            size,
            rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_landmarks::tests::synthetic_face;
    use crate::detection::domain::face_landmarks::DEFAULT_FACE_SIZE;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_landmarks_derives_geometry() {
        let det = Detection::from_landmarks(synthetic_face(0.3, 0.4, 0.05, 0.25));
        let c = det.center.unwrap();
        assert_relative_eq!(c.x, 0.3, epsilon = 1e-12);
        assert_relative_eq!(c.y, 0.43, epsilon = 1e-12);
        assert_relative_eq!(det.size, 0.25, epsilon = 1e-12);
        assert_relative_eq!(det.rotation, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_from_empty_landmarks_has_no_center() {
        let det = Detection::from_landmarks(FaceLandmarks::default());
        assert!(det.center.is_none());
        assert_relative_eq!(det.size, DEFAULT_FACE_SIZE);
        assert_relative_eq!(det.rotation, 0.0);
    }

    #[test]
    fn test_from_geometry() {
        let det = Detection::from_geometry(Point::new(0.7, 0.4), 0.22, 5.0);
        assert_eq!(det.center, Some(Point::new(0.7, 0.4)));
        assert!(det.landmarks.is_empty());
    }
}
