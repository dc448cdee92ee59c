use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max_slots must be at least 1")]
    NoSlots,
    #[error("match_threshold must be positive, got {0}")]
    MatchThreshold(f64),
    #[error("min_similarity must be between 0.0 and 1.0, got {0}")]
    MinSimilarity(f64),
    #[error("smoothing factor must be between 0.0 and 1.0, got {0}")]
    SmoothingFactor(f64),
    #[error("mask size range must satisfy 0 < min <= max, got [{min}, {max}]")]
    MaskSizeRange { min: f64, max: f64 },
    #[error("size scale factor must be positive, got {0}")]
    SizeScaleFactor(f64),
}
