use std::time::Instant;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::identity_registry::{IdentityRegistry, RegistryConfig};
use crate::overlay::domain::projection_engine::{ProjectionConfig, ProjectionEngine};
use crate::overlay::domain::smoothed_pose::SmoothedPose;
use crate::shared::display_geometry::DisplayGeometry;

use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};

/// Everything the core needs for one detection cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInput {
    pub faces: Vec<FaceLandmarks>,
    pub geometry: DisplayGeometry,
}

/// One detection cycle: landmarks → identities → overlay poses.
///
/// Owns the registry and the engine so a frame is processed as a single
/// unit; `reset()` between frames returns both to their initial state.
pub struct TrackFacesUseCase {
    registry: IdentityRegistry,
    engine: ProjectionEngine,
    logger: Box<dyn PipelineLogger>,
    frames: usize,
}

impl TrackFacesUseCase {
    pub fn new(
        registry: IdentityRegistry,
        engine: ProjectionEngine,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            registry,
            engine,
            logger,
            frames: 0,
        }
    }

    pub fn from_configs(registry: RegistryConfig, projection: ProjectionConfig) -> Self {
        Self::new(
            IdentityRegistry::new(registry),
            ProjectionEngine::new(projection),
            Box::new(NullPipelineLogger),
        )
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn frames_processed(&self) -> usize {
        self.frames
    }

    pub fn process_frame(&mut self, input: &FrameInput) -> Vec<SmoothedPose> {
        self.process_frame_at(input, Instant::now())
    }

    pub fn process_frame_at(&mut self, input: &FrameInput, now: Instant) -> Vec<SmoothedPose> {
        let detections: Vec<Detection> = input
            .faces
            .iter()
            .cloned()
            .map(Detection::from_landmarks)
            .collect();

        let track_start = Instant::now();
        let tracked = self.registry.process_detections_at(&detections, now);
        self.logger
            .timing("track", track_start.elapsed().as_secs_f64() * 1000.0);

        let project_start = Instant::now();
        let poses = self.engine.project(&tracked, &input.geometry);
        self.logger
            .timing("project", project_start.elapsed().as_secs_f64() * 1000.0);

        self.logger
            .metric("active_tracks", self.registry.len() as f64);
        self.logger.frame(self.frames);
        self.frames += 1;
        poses
    }

    pub fn reset(&mut self) {
        log::debug!("Resetting tracking session after {} frames", self.frames);
        self.registry.reset();
        self.engine.reset();
    }

    /// Flushes the logger's end-of-run summary.
    pub fn finish(&self) {
        self.logger.summary();
    }
}

impl Default for TrackFacesUseCase {
    fn default() -> Self {
        Self::from_configs(RegistryConfig::default(), ProjectionConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::detection::domain::face_landmarks::tests::synthetic_face;
    use crate::pipeline::pipeline_logger::SummaryPipelineLogger;
    use approx::assert_relative_eq;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    pub(crate) fn geometry() -> DisplayGeometry {
        DisplayGeometry::new(1280.0, 720.0, 640.0, 480.0)
    }

    pub(crate) fn frame_with(faces: &[(f64, f64)]) -> FrameInput {
        FrameInput {
            faces: faces
                .iter()
                .map(|&(x, y)| synthetic_face(x, y, 0.05, 0.2))
                .collect(),
            geometry: geometry(),
        }
    }

    /// Logger that shares what it records with the test.
    struct RecordingLogger(Arc<Mutex<Vec<String>>>);

    impl PipelineLogger for RecordingLogger {
        fn frame(&mut self, index: usize) {
            self.0.lock().unwrap().push(format!("frame {index}"));
        }
        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.0.lock().unwrap().push(format!("timing {stage}"));
        }
        fn metric(&mut self, name: &str, value: f64) {
            self.0.lock().unwrap().push(format!("metric {name} {value}"));
        }
    }

    #[test]
    fn test_single_face_produces_one_pose() {
        let mut uc = TrackFacesUseCase::default();
        let poses = uc.process_frame(&frame_with(&[(0.5, 0.4)]));
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].slot, 1);
        assert_eq!(poses[0].mask_asset(), "mask1.png");
        assert_eq!(uc.frames_processed(), 1);
    }

    #[test]
    fn test_identity_and_slot_stable_across_frames() {
        let mut uc = TrackFacesUseCase::default();
        let start = Instant::now();
        let first = uc.process_frame_at(&frame_with(&[(0.3, 0.4), (0.7, 0.4)]), start);
        let ids: Vec<(u64, u32)> = first.iter().map(|p| (p.id, p.slot)).collect();

        for n in 1..100u64 {
            let dx = 0.002 * n as f64;
            let now = start + Duration::from_millis(33 * n);
            let input = frame_with(&[(0.3 + dx, 0.4), (0.7 + dx, 0.4)]);
            let poses = uc.process_frame_at(&input, now);
            let got: Vec<(u64, u32)> = poses.iter().map(|p| (p.id, p.slot)).collect();
            assert_eq!(got, ids);
        }
    }

    #[test]
    fn test_empty_frame_clears_everything_immediately() {
        let mut uc = TrackFacesUseCase::default();
        uc.process_frame(&frame_with(&[(0.3, 0.4), (0.7, 0.4)]));
        assert_eq!(uc.registry().len(), 2);

        let poses = uc.process_frame(&frame_with(&[]));
        assert!(poses.is_empty());
        assert!(uc.registry().is_empty());
        assert!(uc.engine().cached_ids().is_empty());
    }

    #[test]
    fn test_unusable_landmarks_treated_as_no_faces() {
        let mut uc = TrackFacesUseCase::default();
        uc.process_frame(&frame_with(&[(0.5, 0.4)]));
        let input = FrameInput {
            faces: vec![FaceLandmarks::default()],
            geometry: geometry(),
        };
        assert!(uc.process_frame(&input).is_empty());
        assert!(uc.registry().is_empty());
    }

    #[test]
    fn test_missing_face_dropped_from_poses_but_kept_in_registry() {
        let mut uc = TrackFacesUseCase::default();
        uc.process_frame(&frame_with(&[(0.3, 0.4), (0.7, 0.4)]));
        let poses = uc.process_frame(&frame_with(&[(0.3, 0.4)]));
        assert_eq!(poses.len(), 1);
        assert_eq!(uc.registry().len(), 2);
        assert_eq!(uc.engine().cached_ids().len(), 1);
    }

    #[test]
    fn test_pose_ids_match_registry_tracks() {
        let mut uc = TrackFacesUseCase::default();
        let poses = uc.process_frame(&frame_with(&[(0.2, 0.4), (0.5, 0.4), (0.8, 0.4)]));
        let pose_ids: HashSet<u64> = poses.iter().map(|p| p.id).collect();
        let track_ids: HashSet<u64> = uc.registry().tracks().map(|t| t.id).collect();
        assert_eq!(pose_ids, track_ids);
    }

    #[test]
    fn test_pose_position_is_mirrored() {
        let mut uc = TrackFacesUseCase::default();
        // Face on the left of the source appears on the right of the display.
        let poses = uc.process_frame(&frame_with(&[(0.25, 0.4)]));
        assert!(poses[0].x > geometry().display_width / 2.0);
    }

    #[test]
    fn test_reset_restarts_ids_and_clears_cache() {
        let mut uc = TrackFacesUseCase::default();
        let first = uc.process_frame(&frame_with(&[(0.5, 0.4)]))[0].id;
        uc.process_frame(&frame_with(&[(0.5, 0.4), (0.1, 0.4)]));

        uc.reset();
        assert!(uc.registry().is_empty());
        assert!(uc.engine().cached_ids().is_empty());

        let poses = uc.process_frame(&frame_with(&[(0.9, 0.4)]));
        assert_eq!(poses[0].id, first);
    }

    #[test]
    fn test_smoothing_applies_across_frames() {
        let mut uc = TrackFacesUseCase::default();
        let a = uc.process_frame(&frame_with(&[(0.5, 0.4)]))[0].clone();
        let b = uc.process_frame(&frame_with(&[(0.52, 0.4)]))[0].clone();
        // Raw step is 0.02 of the rendered width (1280px), mirrored leftwards.
        let raw_step = -0.02 * 1280.0;
        assert_relative_eq!(b.x - a.x, raw_step * 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_logger_receives_stage_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut uc = TrackFacesUseCase::new(
            IdentityRegistry::default(),
            ProjectionEngine::default(),
            Box::new(RecordingLogger(events.clone())),
        );
        uc.process_frame(&frame_with(&[(0.5, 0.4)]));

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "timing track".to_string(),
                "timing project".to_string(),
                "metric active_tracks 1".to_string(),
                "frame 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_summary_logger_counts_frames() {
        let mut uc = TrackFacesUseCase::new(
            IdentityRegistry::default(),
            ProjectionEngine::default(),
            Box::new(SummaryPipelineLogger::new(1)),
        );
        for _ in 0..3 {
            uc.process_frame(&frame_with(&[(0.5, 0.4)]));
        }
        uc.finish();
        assert_eq!(uc.frames_processed(), 3);
    }
}
