//! Render settings loaded from JSON.
//!
//! Every field has a default, so a settings file only needs to name what it
//! changes. The binary layers its command line flags on top of whatever the
//! file provides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while reading or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// How pixels are handed out to worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    /// Contiguous row ranges, one per worker.
    #[default]
    Rows,
    /// Square buckets, center-out, work-stealing.
    Buckets,
}

/// Where gamma correction is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GammaPlacement {
    /// Once per pixel after averaging.
    #[default]
    PerPixel,
    /// On every scattered bounce, with no final pass.
    PerSample,
}

/// User-facing render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Output image width in pixels; height follows the scene's aspect ratio.
    pub width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    /// Worker threads, 0 for one per hardware thread.
    pub threads: usize,
    /// Base seed for per-pixel random streams and BVH construction.
    pub seed: u64,
    pub schedule: ScheduleKind,
    pub bucket_size: u32,
    pub gamma: GammaPlacement,
    pub output: PathBuf,
    /// How often the progress monitor logs, in milliseconds.
    pub progress_interval_ms: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 480,
            samples_per_pixel: 100,
            max_depth: 50,
            threads: 0,
            seed: 0x5EED,
            schedule: ScheduleKind::Rows,
            bucket_size: 64,
            gamma: GammaPlacement::PerPixel,
            output: PathBuf::from("output.ppm"),
            progress_interval_ms: 500,
        }
    }
}

impl RenderSettings {
    /// Load settings from a JSON file and validate them.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = Self::from_json_str(&text)?;
        log::debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Parse settings from JSON text and validate them.
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 {
            return Err(ConfigError::Invalid {
                field: "width",
                reason: "must be at least 1".into(),
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::Invalid {
                field: "samples_per_pixel",
                reason: "must be at least 1".into(),
            });
        }
        if self.bucket_size == 0 {
            return Err(ConfigError::Invalid {
                field: "bucket_size",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
