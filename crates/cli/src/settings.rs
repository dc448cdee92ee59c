use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use facetag_core::detection::domain::identity_registry::{MatchPolicy, RegistryConfig};
use facetag_core::overlay::domain::projection_engine::ProjectionConfig;
use facetag_core::shared::config_error::ConfigError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Tracking tunables as stored on disk. Missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_slots: u32,
    pub match_threshold: f64,
    pub min_similarity: f64,
    pub max_frames_missing: u32,
    pub max_track_age_ms: u64,
    pub exclusive_matching: bool,
    pub smoothing_factor: f64,
    pub min_mask_size: f64,
    pub max_mask_size: f64,
    pub size_scale_factor: f64,
}

impl Default for Settings {
    fn default() -> Self {
        let registry = RegistryConfig::default();
        let projection = ProjectionConfig::default();
        Self {
            max_slots: registry.max_slots,
            match_threshold: registry.match_threshold,
            min_similarity: registry.min_similarity,
            max_frames_missing: registry.max_frames_missing,
            max_track_age_ms: registry.max_track_age.as_millis() as u64,
            exclusive_matching: registry.match_policy == MatchPolicy::Exclusive,
            smoothing_factor: projection.smoothing_factor,
            min_mask_size: projection.min_mask_size,
            max_mask_size: projection.max_mask_size,
            size_scale_factor: projection.size_scale_factor,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("facetag").join("settings.json"))
    }

    /// Loads `explicit` strictly, or the per-user file leniently.
    ///
    /// A missing or unreadable per-user file yields the defaults; an explicit
    /// path that cannot be read or parsed is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::read(path),
            None => Ok(Self::config_path()
                .filter(|p| p.exists())
                .and_then(|p| match Self::read(&p) {
                    Ok(settings) => Some(settings),
                    Err(e) => {
                        log::warn!("Ignoring settings file: {e}");
                        None
                    }
                })
                .unwrap_or_default()),
        }
    }

    fn read(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            max_slots: self.max_slots,
            match_threshold: self.match_threshold,
            min_similarity: self.min_similarity,
            max_frames_missing: self.max_frames_missing,
            max_track_age: Duration::from_millis(self.max_track_age_ms),
            match_policy: if self.exclusive_matching {
                MatchPolicy::Exclusive
            } else {
                MatchPolicy::Shared
            },
        }
    }

    pub fn projection_config(&self) -> ProjectionConfig {
        ProjectionConfig {
            smoothing_factor: self.smoothing_factor,
            min_mask_size: self.min_mask_size,
            max_mask_size: self.max_mask_size,
            size_scale_factor: self.size_scale_factor,
        }
    }

    /// Both core configs, validated.
    pub fn core_configs(&self) -> Result<(RegistryConfig, ProjectionConfig), SettingsError> {
        let registry = self.registry_config();
        registry.validate()?;
        let projection = self.projection_config();
        projection.validate()?;
        Ok((registry, projection))
    }
}
