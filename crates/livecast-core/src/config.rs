//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::Error;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hls: HlsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit (async, embedded, etc.).
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.hls.segment_duration <= 0.0 {
            warnings.push(format!(
                "hls.segment_duration {} is not positive; segmentation will flush every fragment",
                self.hls.segment_duration
            ));
        }

        if self.hls.max_segments == 0 {
            warnings.push("hls.max_segments is 0; the playlist window will be empty".into());
        }

        warnings
    }
}

/// HLS segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsConfig {
    /// Target media-segment duration in seconds. Also the floor for the
    /// playlist's TARGETDURATION declaration.
    pub segment_duration: f64,
    /// Sliding playlist window size in segments.
    pub max_segments: u32,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            segment_duration: 2.0,
            max_segments: 6,
        }
    }
}
