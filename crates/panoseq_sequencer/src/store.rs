// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence storage and the exported file format.
//!
//! The canonical file is a JSON array of sequences:
//!
//! ```json
//! [
//!   {
//!     "name": "Tour",
//!     "keyframes": [{"yaw": 0.0, "pitch": 0.0, "hfov": 100.0, "duration": 2.0, "ease": "linear"}],
//!     "startFromCurrentPosition": false
//!   }
//! ]
//! ```
//!
//! Older exports keyed sequences by name
//! (`{"Tour": {"keyframes": [...], "options": {"startFromCurrent": true}}}`).
//! Those are migrated on import; export always writes the array form.

use crate::easing::Ease;
use crate::error::{Result, SequencerError};
use crate::keyframe::Keyframe;
use crate::pose::CameraState;
use crate::sequence::Sequence;
use indexmap::IndexMap;
use serde::Deserialize;

/// Sequence record in the name-keyed legacy format
#[derive(Debug, Deserialize)]
struct LegacySequence {
    #[serde(default)]
    keyframes: Vec<Keyframe>,
    #[serde(default)]
    options: LegacyOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyOptions {
    #[serde(default)]
    start_from_current: bool,
}

/// Layout of an imported document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    /// Array of sequence records
    Canonical,
    /// Object mapping names to sequence records
    LegacyByName,
}

/// All sequences, keyed by name, in creation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceStore {
    sequences: IndexMap<String, Sequence>,
    current: Option<String>,
}

impl SequenceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sequences
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the store has no sequences
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Sequence names in creation order
    pub fn sequence_names(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }

    /// All sequences in creation order
    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    /// Get a sequence by name
    pub fn get(&self, name: &str) -> Option<&Sequence> {
        self.sequences.get(name.trim())
    }

    /// Get a sequence by name, failing if absent
    pub fn sequence(&self, name: &str) -> Result<&Sequence> {
        let name = name.trim();
        self.sequences
            .get(name)
            .ok_or_else(|| SequencerError::SequenceNotFound(name.to_string()))
    }

    fn sequence_mut(&mut self, name: &str) -> Result<&mut Sequence> {
        let name = name.trim();
        self.sequences
            .get_mut(name)
            .ok_or_else(|| SequencerError::SequenceNotFound(name.to_string()))
    }

    /// Create an empty sequence and make it current
    pub fn add_sequence(&mut self, name: &str) -> Result<&Sequence> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SequencerError::Validation("sequence name must not be empty".into()));
        }
        if self.sequences.contains_key(name) {
            return Err(SequencerError::Validation(format!(
                "a sequence named {name:?} already exists"
            )));
        }

        self.sequences.insert(name.to_string(), Sequence::new(name));
        self.current = Some(name.to_string());
        tracing::info!("Created sequence {name:?}");
        self.sequence(name)
    }

    /// Remove a sequence; clears the selection if it was current
    pub fn delete_sequence(&mut self, name: &str) -> Result<Sequence> {
        let name = name.trim();
        let removed = self
            .sequences
            .shift_remove(name)
            .ok_or_else(|| SequencerError::SequenceNotFound(name.to_string()))?;

        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        tracing::info!("Deleted sequence {name:?}");
        Ok(removed)
    }

    /// Make a sequence current
    pub fn select_sequence(&mut self, name: &str) -> Result<&Sequence> {
        let name = name.trim();
        if !self.sequences.contains_key(name) {
            return Err(SequencerError::SequenceNotFound(name.to_string()));
        }
        self.current = Some(name.to_string());
        self.sequence(name)
    }

    /// Clear the current selection
    pub fn clear_selection(&mut self) {
        self.current = None;
    }

    /// Name of the current sequence
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The current sequence
    pub fn current(&self) -> Option<&Sequence> {
        self.current.as_deref().and_then(|name| self.sequences.get(name))
    }

    /// Append a keyframe to the end of a sequence, returning its index
    pub fn add_keyframe(
        &mut self,
        name: &str,
        pose: CameraState,
        duration: f64,
        ease: Ease,
    ) -> Result<usize> {
        let name = name.trim();
        let sequence = self.sequence_mut(name)?;
        let index = sequence.push_keyframe(snapshot(pose, duration, ease))?;
        tracing::debug!("Added keyframe {index} to {name:?}");
        Ok(index)
    }

    /// Append a keyframe to the current sequence
    pub fn add_keyframe_to_current(
        &mut self,
        pose: CameraState,
        duration: f64,
        ease: Ease,
    ) -> Result<usize> {
        let Some(name) = self.current.clone() else {
            return Err(SequencerError::Validation("no sequence is selected".into()));
        };
        self.add_keyframe(&name, pose, duration, ease)
    }

    /// Replace every field of the keyframe at `index`
    pub fn update_keyframe(
        &mut self,
        name: &str,
        index: usize,
        pose: CameraState,
        duration: f64,
        ease: Ease,
    ) -> Result<()> {
        self.sequence_mut(name)?
            .update_keyframe(index, snapshot(pose, duration, ease))?;
        tracing::debug!("Updated keyframe {index} of {name:?}");
        Ok(())
    }

    /// Remove the keyframe at `index`
    pub fn delete_keyframe(&mut self, name: &str, index: usize) -> Result<Keyframe> {
        let removed = self.sequence_mut(name)?.remove_keyframe(index)?;
        tracing::debug!("Deleted keyframe {index} of {name:?}");
        Ok(removed)
    }

    /// Move a keyframe within a sequence
    pub fn move_keyframe(&mut self, name: &str, from: usize, to: usize) -> Result<()> {
        self.sequence_mut(name)?.move_keyframe(from, to)?;
        tracing::debug!("Moved keyframe {from} -> {to} in {name:?}");
        Ok(())
    }

    /// Flip the start-from-current flag, returning the new value.
    ///
    /// Only affects playbacks started afterwards.
    pub fn toggle_start_from_current(&mut self, name: &str) -> Result<bool> {
        let enabled = self.sequence_mut(name)?.toggle_start_from_current();
        tracing::debug!("Start from current for {name:?}: {enabled}");
        Ok(enabled)
    }

    /// Export every sequence as canonical JSON
    pub fn serialize(&self) -> Result<String> {
        let records: Vec<&Sequence> = self.sequences.values().collect();
        let json = serde_json::to_string_pretty(&records)?;
        tracing::info!("Exported {} sequences", records.len());
        Ok(json)
    }

    /// Replace the whole store with an imported document.
    ///
    /// On failure the store is left exactly as it was.
    pub fn deserialize(&mut self, json: &str) -> Result<StoreFormat> {
        match Self::from_json(json) {
            Ok((store, format)) => {
                tracing::info!("Imported {} sequences ({format:?})", store.len());
                *self = store;
                Ok(format)
            }
            Err(err) => {
                tracing::warn!("Rejected import: {err}");
                Err(err)
            }
        }
    }

    /// Parse a document in either format into a new store with nothing selected
    pub fn from_json(json: &str) -> Result<(Self, StoreFormat)> {
        let document: serde_json::Value = serde_json::from_str(json)?;

        let (records, format) = match document {
            serde_json::Value::Array(_) => {
                let records: Vec<Sequence> = serde_json::from_value(document)?;
                (records, StoreFormat::Canonical)
            }
            serde_json::Value::Object(_) => {
                let legacy: IndexMap<String, LegacySequence> = serde_json::from_value(document)?;
                let records = legacy
                    .into_iter()
                    .map(|(name, record)| {
                        Sequence::with_keyframes(name, record.keyframes)
                            .starting_from_current(record.options.start_from_current)
                    })
                    .collect();
                (records, StoreFormat::LegacyByName)
            }
            _ => {
                return Err(SequencerError::Parse(
                    "expected an array of sequences or an object keyed by name".into(),
                ));
            }
        };

        let mut sequences = IndexMap::with_capacity(records.len());
        for sequence in records {
            let name = sequence.name.trim().to_string();
            if name.is_empty() {
                return Err(SequencerError::Parse("sequence with an empty name".into()));
            }
            for (index, keyframe) in sequence.keyframes().iter().enumerate() {
                keyframe.validate().map_err(|err| {
                    SequencerError::Parse(format!("sequence {name:?}, keyframe {index}: {err}"))
                })?;
            }
            if sequences.contains_key(&name) {
                return Err(SequencerError::Parse(format!("duplicate sequence name {name:?}")));
            }
            let mut sequence = sequence;
            sequence.name.clone_from(&name);
            sequences.insert(name, sequence);
        }

        Ok((
            Self {
                sequences,
                current: None,
            },
            format,
        ))
    }
}

fn snapshot(pose: CameraState, duration: f64, ease: Ease) -> Keyframe {
    Keyframe {
        yaw: pose.yaw,
        pitch: pose.pitch,
        hfov: pose.hfov,
        duration,
        ease,
    }
}
