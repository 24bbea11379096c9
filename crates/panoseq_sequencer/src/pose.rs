// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera pose on the panorama.

use crate::error::{Result, SequencerError};
use serde::{Deserialize, Serialize};

/// Default horizontal field of view in degrees
pub const DEFAULT_HFOV: f64 = 100.0;

/// Camera orientation and zoom, all in degrees.
///
/// Angles are plain real numbers: yaw is not wrapped into `[0, 360)` and
/// interpolation between two poses never takes a shorter arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Horizontal rotation
    pub yaw: f64,
    /// Vertical rotation
    pub pitch: f64,
    /// Horizontal field of view
    pub hfov: f64,
}

impl CameraState {
    /// Create a pose
    pub const fn new(yaw: f64, pitch: f64, hfov: f64) -> Self {
        Self { yaw, pitch, hfov }
    }

    /// Whether every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.hfov.is_finite()
    }

    /// Reject poses with NaN or infinite components
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("yaw", self.yaw), ("pitch", self.pitch), ("hfov", self.hfov)] {
            if !value.is_finite() {
                return Err(SequencerError::Validation(format!(
                    "{field} must be a finite number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Interpolate every component linearly by the same fraction
    pub fn lerp(&self, target: &CameraState, t: f64) -> CameraState {
        CameraState {
            yaw: lerp(self.yaw, target.yaw, t),
            pitch: lerp(self.pitch, target.pitch, t),
            hfov: lerp(self.hfov, target.hfov, t),
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(0.0, 0.0, DEFAULT_HFOV)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = CameraState::new(0.0, 0.0, 100.0);
        let b = CameraState::new(90.0, 10.0, 80.0);

        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), CameraState::new(45.0, 5.0, 90.0));
    }

    #[test]
    fn test_no_angular_wrap() {
        let a = CameraState::new(350.0, 0.0, 100.0);
        let b = CameraState::new(10.0, 0.0, 100.0);
        // The long way round: 350 -> 180 -> 10
        assert_eq!(a.lerp(&b, 0.5).yaw, 180.0);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(CameraState::default().validate().is_ok());
        assert!(CameraState::new(f64::NAN, 0.0, 90.0).validate().is_err());
        assert!(CameraState::new(0.0, f64::INFINITY, 90.0).validate().is_err());
        assert!(!CameraState::new(0.0, 0.0, f64::NEG_INFINITY).is_finite());
    }
}
