// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application errors.

use panoseq_sequencer::SequencerError;
use std::path::PathBuf;

/// Errors surfaced by the `panoseq` binary
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Store, keyframe or playback error
    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    /// File could not be read or written
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Settings file is malformed or out of range
    #[error("Settings error: {0}")]
    Settings(String),

    /// Bad command line
    #[error("{0}\n\n{usage}", usage = crate::cli::USAGE)]
    Usage(String),

    /// An action script could not be parsed
    #[error("Script error: {0}")]
    Script(String),

    /// The tick loop hit its time limit
    #[error("Playback of {sequence:?} did not finish within {limit}s")]
    PlaybackTimeout {
        /// Sequence being played
        sequence: String,
        /// Limit in seconds
        limit: f64,
    },
}

impl AppError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;
