// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the sequencer.

use std::fmt;
use thiserror::Error;

/// Why a playback request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackRejection {
    /// The sequence has no keyframes
    NoKeyframes,
    /// An animated chain needs more keyframes than the sequence holds
    InsufficientKeyframes {
        /// Keyframes available
        found: usize,
    },
}

impl fmt::Display for PlaybackRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoKeyframes => write!(f, "nothing to play: the sequence has no keyframes"),
            Self::InsufficientKeyframes { found } => write!(
                f,
                "insufficient keyframes: an animated chain needs at least 2, found {found}"
            ),
        }
    }
}

/// Sequencer errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SequencerError {
    /// Bad user input (empty name, non-finite number, negative duration)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No sequence with this name
    #[error("Sequence not found: {0:?}")]
    SequenceNotFound(String),

    /// Keyframe index outside the sequence
    #[error("Keyframe index {index} out of range (sequence has {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of keyframes
        len: usize,
    },

    /// Malformed import payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// Playback refused for the requested mode
    #[error("Playback rejected: {0}")]
    PlaybackRejected(PlaybackRejection),
}

impl SequencerError {
    /// Whether this error refers to a missing sequence or keyframe
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SequenceNotFound(_) | Self::IndexOutOfRange { .. })
    }
}

impl From<serde_json::Error> for SequencerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_grouping() {
        assert!(SequencerError::SequenceNotFound("Tour".into()).is_not_found());
        assert!(SequencerError::IndexOutOfRange { index: 3, len: 1 }.is_not_found());
        assert!(!SequencerError::Validation("empty".into()).is_not_found());
    }

    #[test]
    fn test_rejection_messages() {
        let err = SequencerError::PlaybackRejected(PlaybackRejection::InsufficientKeyframes { found: 1 });
        assert!(err.to_string().contains("found 1"));

        let err = SequencerError::PlaybackRejected(PlaybackRejection::NoKeyframes);
        assert!(err.to_string().contains("nothing to play"));
    }

    #[test]
    fn test_json_error_becomes_parse() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err: SequencerError = json_err.into();
        assert!(matches!(err, SequencerError::Parse(_)));
    }
}
