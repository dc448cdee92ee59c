use std::collections::HashSet;

use crate::detection::domain::identity_registry::TrackedFace;
use crate::shared::config_error::ConfigError;
use crate::shared::constants::{
    DEFAULT_MAX_MASK_SIZE, DEFAULT_MIN_MASK_SIZE, DEFAULT_SIZE_SCALE_FACTOR,
    DEFAULT_SMOOTHING_FACTOR,
};
use crate::shared::display_geometry::DisplayGeometry;
use crate::shared::point::Point;

use super::cover_fit::CoverFit;
use super::pose_smoother::{EmaPoseSmoother, PoseParams, PoseSmoother};
use super::smoothed_pose::SmoothedPose;

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionConfig {
    pub smoothing_factor: f64,
    pub min_mask_size: f64,
    pub max_mask_size: f64,
    pub size_scale_factor: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            min_mask_size: DEFAULT_MIN_MASK_SIZE,
            max_mask_size: DEFAULT_MAX_MASK_SIZE,
            size_scale_factor: DEFAULT_SIZE_SCALE_FACTOR,
        }
    }
}

impl ProjectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            return Err(ConfigError::SmoothingFactor(self.smoothing_factor));
        }
        if !(self.min_mask_size > 0.0 && self.min_mask_size <= self.max_mask_size) {
            return Err(ConfigError::MaskSizeRange {
                min: self.min_mask_size,
                max: self.max_mask_size,
            });
        }
        if !(self.size_scale_factor.is_finite() && self.size_scale_factor > 0.0) {
            return Err(ConfigError::SizeScaleFactor(self.size_scale_factor));
        }
        Ok(())
    }
}

/// Turns tracked faces into smoothed, mirrored, screen-space overlay poses.
///
/// Geometry is passed on every call; the only state carried between frames
/// is the smoother's per-identity cache.
pub struct ProjectionEngine {
    config: ProjectionConfig,
    smoother: Box<dyn PoseSmoother>,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        let smoother = Box::new(EmaPoseSmoother::new(config.smoothing_factor));
        Self { config, smoother }
    }

    pub fn with_smoother(config: ProjectionConfig, smoother: Box<dyn PoseSmoother>) -> Self {
        Self { config, smoother }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn cached_ids(&self) -> Vec<u64> {
        self.smoother.cached_ids()
    }

    pub fn reset(&mut self) {
        self.smoother.clear();
    }

    /// One pose per face, in input order.
    ///
    /// An empty face list clears the smoothing cache. Degenerate geometry
    /// yields no poses and leaves the cache as it was.
    pub fn project(
        &mut self,
        faces: &[TrackedFace],
        geometry: &DisplayGeometry,
    ) -> Vec<SmoothedPose> {
        if faces.is_empty() {
            self.smoother.clear();
            return Vec::new();
        }

        let Some(fit) = CoverFit::new(geometry) else {
            log::debug!("Skipping projection for degenerate geometry {geometry:?}");
            return Vec::new();
        };

        let mut poses = Vec::with_capacity(faces.len());
        for face in faces {
            let raw = raw_pose(&self.config, face, &fit);
            let [x, y, rotation, size] = self.smoother.smooth(face.id, raw);
            poses.push(SmoothedPose {
                id: face.id,
                slot: face.slot,
                x,
                y,
                rotation,
                size,
            });
        }

        let active: HashSet<u64> = faces.iter().map(|f| f.id).collect();
        self.smoother.retain(&active);
        poses
    }
}

/// Unsmoothed pose: mirror horizontally, cover-fit, and scale the size.
///
/// An inverted size range yields `max_mask_size`; a NaN bound is ignored.
fn raw_pose(config: &ProjectionConfig, face: &TrackedFace, fit: &CoverFit) -> PoseParams {
    let mirrored = Point::new(1.0 - face.center.x, face.center.y);
    let (x, y) = fit.project(&mirrored);
    let size = (face.size * fit.rendered_height * config.size_scale_factor)
        .max(config.min_mask_size)
        .min(config.max_mask_size);
    [x, y, -face.rotation, size]
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}
