// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named, ordered lists of keyframes.

use crate::error::{Result, SequencerError};
use crate::keyframe::Keyframe;
use serde::{Deserialize, Serialize};

/// A named sequence of keyframes.
///
/// Keyframe order is playback order and only changes through the explicit
/// index operations below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sequence {
    /// Sequence name, unique within a store
    pub name: String,
    /// Keyframes in playback order
    keyframes: Vec<Keyframe>,
    /// Animate from the live camera pose instead of snapping to keyframe 0
    #[serde(default)]
    pub start_from_current_position: bool,
}

impl Sequence {
    /// Create an empty sequence
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyframes: Vec::new(),
            start_from_current_position: false,
        }
    }

    /// Create a sequence with existing keyframes
    pub fn with_keyframes(name: impl Into<String>, keyframes: Vec<Keyframe>) -> Self {
        Self {
            name: name.into(),
            keyframes,
            start_from_current_position: false,
        }
    }

    /// Set the start mode
    pub fn starting_from_current(mut self, enabled: bool) -> Self {
        self.start_from_current_position = enabled;
        self
    }

    /// All keyframes, in playback order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Get a keyframe by index
    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the sequence has no keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Append a keyframe at the end
    pub fn push_keyframe(&mut self, keyframe: Keyframe) -> Result<usize> {
        keyframe.validate()?;
        self.keyframes.push(keyframe);
        Ok(self.keyframes.len() - 1)
    }

    /// Replace the keyframe at `index` with all new fields
    pub fn update_keyframe(&mut self, index: usize, keyframe: Keyframe) -> Result<()> {
        self.check_index(index)?;
        keyframe.validate()?;
        self.keyframes[index] = keyframe;
        Ok(())
    }

    /// Remove the keyframe at `index`; later keyframes shift down by one
    pub fn remove_keyframe(&mut self, index: usize) -> Result<Keyframe> {
        self.check_index(index)?;
        Ok(self.keyframes.remove(index))
    }

    /// Move a keyframe to a new position, shifting the ones in between
    pub fn move_keyframe(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let keyframe = self.keyframes.remove(from);
        self.keyframes.insert(to, keyframe);
        Ok(())
    }

    /// Flip the start mode
    pub fn toggle_start_from_current(&mut self) -> bool {
        self.start_from_current_position = !self.start_from_current_position;
        self.start_from_current_position
    }

    /// Total animated time of one playback.
    ///
    /// Keyframe 0 only contributes when starting from the live pose; otherwise
    /// it is the instantaneous anchor.
    pub fn duration(&self) -> f64 {
        self.keyframes
            .iter()
            .skip(usize::from(!self.start_from_current_position))
            .map(|k| k.duration.max(0.0))
            .sum()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.keyframes.len() {
            Ok(())
        } else {
            Err(SequencerError::IndexOutOfRange {
                index,
                len: self.keyframes.len(),
            })
        }
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new("Untitled Sequence")
    }
}
