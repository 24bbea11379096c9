// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer settings.
//!
//! Stored as RON next to the working directory (`panoseq.ron`):
//! - Tick rate of the playback loop
//! - Defaults for the keyframe form (duration, easing)
//! - Initial camera pose
//! - Upper bound on a single headless playback

use crate::error::{AppError, Result};
use panoseq_sequencer::{CameraState, Ease, DEFAULT_DURATION};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "panoseq.ron";

/// Settings for a viewing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Settings format version
    pub version: u32,
    /// Playback ticks per second
    pub tick_rate_hz: f64,
    /// Duration preset for new keyframes
    pub default_duration: f64,
    /// Easing preset for new keyframes
    pub default_ease: Ease,
    /// Camera pose when the session opens
    pub initial_pose: CameraState,
    /// Longest playback the headless loop will run, in seconds
    pub max_playback_seconds: f64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            tick_rate_hz: 60.0,
            default_duration: DEFAULT_DURATION,
            default_ease: Ease::default(),
            initial_pose: CameraState::default(),
            max_playback_seconds: 600.0,
        }
    }
}

impl ViewerSettings {
    /// Seconds between two ticks
    pub fn tick_interval(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }

    /// Check ranges
    pub fn validate(&self) -> Result<()> {
        if self.version > SETTINGS_FORMAT_VERSION {
            return Err(AppError::Settings(format!(
                "settings version {} is newer than supported version {}",
                self.version, SETTINGS_FORMAT_VERSION
            )));
        }
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(AppError::Settings(format!(
                "tick_rate_hz must be positive, got {}",
                self.tick_rate_hz
            )));
        }
        if !(self.default_duration.is_finite() && self.default_duration >= 0.0) {
            return Err(AppError::Settings(format!(
                "default_duration must be >= 0, got {}",
                self.default_duration
            )));
        }
        if !(self.max_playback_seconds.is_finite() && self.max_playback_seconds > 0.0) {
            return Err(AppError::Settings(format!(
                "max_playback_seconds must be positive, got {}",
                self.max_playback_seconds
            )));
        }
        self.initial_pose
            .validate()
            .map_err(|e| AppError::Settings(format!("initial_pose: {e}")))
    }

    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let settings: ViewerSettings =
            ron::from_str(content).map_err(|e| AppError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        Self::from_ron(&content)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {path:?}, using defaults");
            return Ok(Self::default());
        }
        let settings = Self::load(path)?;
        tracing::info!("Loaded settings from {path:?}");
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, config)
            .map_err(|e| AppError::Settings(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| AppError::io(path, e))
    }
}
