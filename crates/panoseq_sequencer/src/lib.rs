// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera sequences for panorama tours.
//!
//! This crate provides:
//! - Camera poses (yaw, pitch, horizontal field of view)
//! - Keyframes with per-transition duration and easing
//! - Named sequences and the store that owns them
//! - JSON import/export with migration of the older name-keyed format
//! - The playback engine that turns a sequence into chained tweens
//!
//! ## Architecture
//!
//! The playback side is built on:
//! - [`PlaybackPlan`]: the ordered segments of one run
//! - [`Timeline`]: the tween driver, advanced by the caller's clock
//! - [`CameraRig`]: owner of the live pose; hands control to at most one
//!   playback run and takes it back on manual input

pub mod camera;
pub mod easing;
pub mod error;
pub mod keyframe;
pub mod playback;
pub mod pose;
pub mod sequence;
pub mod store;
pub mod tween;

pub use camera::{CameraRig, Control, PoseChange, Renderer};
pub use easing::Ease;
pub use error::{PlaybackRejection, Result, SequencerError};
pub use keyframe::{Keyframe, DEFAULT_DURATION};
pub use playback::{
    build_segments, AnchorSource, PlaybackEngine, PlaybackPlan, PlaybackProgress, PlaybackStart,
    PlaybackState, PlaybackToken, Segment,
};
pub use pose::CameraState;
pub use sequence::Sequence;
pub use store::{SequenceStore, StoreFormat};
pub use tween::{Timeline, TimelineStatus, TimelineTick, Tween, TweenHandle};
