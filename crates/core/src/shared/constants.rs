use std::time::Duration;

/// Number of distinct identity slots (decoration assets) available.
pub const DEFAULT_MAX_SLOTS: u32 = 5;

/// Normalized center distance at which the distance term of the score hits zero.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.15;

/// A track must score strictly above this to be matched.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.6;

/// Tracks missing for more than this many consecutive frames are removed.
pub const DEFAULT_MAX_FRAMES_MISSING: u32 = 1;

/// Tracks not seen for longer than this are removed regardless of frame count.
pub const DEFAULT_MAX_TRACK_AGE: Duration = Duration::from_millis(2000);

/// EMA blend weight for overlay poses.
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.2;

/// Overlay diameter clamp in display pixels.
pub const DEFAULT_MIN_MASK_SIZE: f64 = 100.0;
pub const DEFAULT_MAX_MASK_SIZE: f64 = 800.0;

/// Overlay diameter relative to the displayed frame height.
pub const DEFAULT_SIZE_SCALE_FACTOR: f64 = 2.5;

/// Target pace of the external detection loop.
pub const TARGET_DETECTION_FPS: f64 = 30.0;
