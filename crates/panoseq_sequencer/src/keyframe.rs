// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for camera sequences.

use crate::easing::Ease;
use crate::error::{Result, SequencerError};
use crate::pose::CameraState;
use serde::{Deserialize, Serialize};

/// Transition duration used when a stored keyframe has none
pub const DEFAULT_DURATION: f64 = 2.0;

/// A target pose plus the timing used to arrive at it.
///
/// `duration` and `ease` describe the transition *into* this keyframe from
/// whatever precedes it during playback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Horizontal rotation in degrees
    pub yaw: f64,
    /// Vertical rotation in degrees
    pub pitch: f64,
    /// Horizontal field of view in degrees
    pub hfov: f64,
    /// Transition duration in seconds
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Transition easing curve
    #[serde(default)]
    pub ease: Ease,
}

fn default_duration() -> f64 {
    DEFAULT_DURATION
}

impl Keyframe {
    /// Create a validated keyframe
    pub fn new(pose: CameraState, duration: f64, ease: Ease) -> Result<Self> {
        let keyframe = Self {
            yaw: pose.yaw,
            pitch: pose.pitch,
            hfov: pose.hfov,
            duration,
            ease,
        };
        keyframe.validate()?;
        Ok(keyframe)
    }

    /// Snapshot a pose with the default timing
    pub fn at(pose: CameraState) -> Result<Self> {
        Self::new(pose, DEFAULT_DURATION, Ease::default())
    }

    /// Set duration
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Set easing curve
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// The pose this keyframe targets
    pub fn pose(&self) -> CameraState {
        CameraState::new(self.yaw, self.pitch, self.hfov)
    }

    /// Check that every number is finite and the duration is not negative
    pub fn validate(&self) -> Result<()> {
        self.pose().validate()?;
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(SequencerError::Validation(format!(
                "duration must be a finite number of seconds >= 0, got {}",
                self.duration
            )));
        }
        Ok(())
    }
}
