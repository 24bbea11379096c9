// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence playback.
//!
//! Playback turns a sequence into an ordered list of [`Segment`]s and drives
//! them through a [`Timeline`]:
//!
//! - Starting from the live pose, every keyframe produces one segment; the
//!   first one leaves from the pose captured when playback starts.
//! - Otherwise keyframe 0 is applied instantly as the anchor and segments run
//!   from keyframe `i` to `i + 1`. A single keyframe is a plain jump.
//!
//! The duration and ease of a segment always come from its destination
//! keyframe.

use crate::camera::Renderer;
use crate::easing::Ease;
use crate::error::{PlaybackRejection, Result, SequencerError};
use crate::pose::CameraState;
use crate::sequence::Sequence;
use crate::tween::{Timeline, TimelineStatus, Tween};

/// One animated transition of a playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Index of the destination keyframe
    pub keyframe: usize,
    /// Pose at the start
    pub from: CameraState,
    /// Pose at the end
    pub to: CameraState,
    /// Length in seconds
    pub duration: f64,
    /// Curve applied to all components
    pub ease: Ease,
}

impl Segment {
    /// The tween that plays this segment
    pub fn tween(&self) -> Tween {
        Tween::new(self.from, self.to, self.duration, self.ease)
    }
}

/// Where the first segment leaves from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSource {
    /// The live camera pose captured at playback start
    LivePose,
    /// Keyframe 0, applied instantly
    FirstKeyframe,
}

/// What a playback will do
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackPlan {
    /// Set the pose once, without animation
    Jump(CameraState),
    /// Animate a chain of segments
    Animate {
        /// Pose before the first segment
        anchor: CameraState,
        /// Origin of the anchor
        source: AnchorSource,
        /// Segments in play order
        segments: Vec<Segment>,
    },
}

impl PlaybackPlan {
    /// Plan a playback of `sequence` with `live` as the current camera pose
    pub fn build(sequence: &Sequence, live: CameraState) -> Result<Self> {
        if !sequence.start_from_current_position && sequence.len() == 1 {
            return Ok(Self::Jump(sequence.keyframes()[0].pose()));
        }
        let (anchor, source, segments) = build_segments(sequence, live)?;
        Ok(Self::Animate {
            anchor,
            source,
            segments,
        })
    }

    /// Segments to animate; empty for a jump
    pub fn segments(&self) -> &[Segment] {
        match self {
            Self::Jump(_) => &[],
            Self::Animate { segments, .. } => segments,
        }
    }
}

/// Build the animated chain for a sequence.
///
/// Fails when the sequence is empty, or when it does not start from the live
/// pose and has fewer than two keyframes.
pub fn build_segments(
    sequence: &Sequence,
    live: CameraState,
) -> Result<(CameraState, AnchorSource, Vec<Segment>)> {
    let keyframes = sequence.keyframes();
    if keyframes.is_empty() {
        return Err(SequencerError::PlaybackRejected(PlaybackRejection::NoKeyframes));
    }

    let (anchor, source, first) = if sequence.start_from_current_position {
        (live, AnchorSource::LivePose, 0)
    } else {
        if keyframes.len() < 2 {
            return Err(SequencerError::PlaybackRejected(
                PlaybackRejection::InsufficientKeyframes {
                    found: keyframes.len(),
                },
            ));
        }
        (keyframes[0].pose(), AnchorSource::FirstKeyframe, 1)
    };

    let mut from = anchor;
    let segments = keyframes
        .iter()
        .enumerate()
        .skip(first)
        .map(|(index, keyframe)| {
            let segment = Segment {
                keyframe: index,
                from,
                to: keyframe.pose(),
                duration: keyframe.duration,
                ease: keyframe.ease,
            };
            from = segment.to;
            segment
        })
        .collect();

    Ok((anchor, source, segments))
}

/// Identifies one playback run; a newer run invalidates older tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackToken(u64);

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing has played yet
    #[default]
    Idle,
    /// A segment chain is running
    Playing,
    /// The last run reached its final pose
    Finished,
    /// The last run was stopped before the end
    Cancelled,
}

/// Result of starting a playback
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackStart {
    /// Token of the new run
    pub token: PlaybackToken,
    /// The plan being played
    pub plan: PlaybackPlan,
}

/// Result of one engine tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackProgress {
    /// Pose written during the tick
    pub pose: Option<CameraState>,
    /// Segments (indices into the plan) completed during the tick, in order
    pub completed: Vec<usize>,
    /// State after the tick
    pub state: PlaybackState,
}

struct ActiveRun {
    token: PlaybackToken,
    sequence: String,
    timeline: Timeline,
}

/// Drives at most one segment chain at a time
#[derive(Default)]
pub struct PlaybackEngine {
    next_token: u64,
    run: Option<ActiveRun>,
    state: PlaybackState,
}

impl PlaybackEngine {
    /// Create an idle engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playing `sequence`, replacing any run in progress.
    ///
    /// `state` is read once as the live pose. Rejected requests leave a
    /// running playback untouched.
    pub fn play<R: Renderer + ?Sized>(
        &mut self,
        sequence: &Sequence,
        state: &mut CameraState,
        renderer: &mut R,
    ) -> Result<PlaybackStart> {
        let plan = match PlaybackPlan::build(sequence, *state) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::info!("Cannot play {:?}: {err}", sequence.name);
                return Err(err);
            }
        };

        self.cancel();
        self.next_token += 1;
        let token = PlaybackToken(self.next_token);

        match &plan {
            PlaybackPlan::Jump(pose) => {
                write_pose(*pose, state, renderer);
                self.state = PlaybackState::Finished;
                tracing::info!("Jumped to the only keyframe of {:?}", sequence.name);
            }
            PlaybackPlan::Animate {
                anchor,
                source,
                segments,
            } => {
                if *source == AnchorSource::FirstKeyframe {
                    write_pose(*anchor, state, renderer);
                }
                let timeline = Timeline::from_tweens(segments.iter().map(Segment::tween));
                tracing::info!(
                    "Playing {:?}: {} segments over {:.2}s from {source:?}",
                    sequence.name,
                    segments.len(),
                    timeline.total_duration()
                );
                self.run = Some(ActiveRun {
                    token,
                    sequence: sequence.name.clone(),
                    timeline,
                });
                self.state = PlaybackState::Playing;

                // Zero-length leading segments apply at the start
                self.tick(0.0, state, renderer);
            }
        }

        Ok(PlaybackStart { token, plan })
    }

    /// Advance the running chain by `dt` seconds, writing the new pose
    pub fn tick<R: Renderer + ?Sized>(
        &mut self,
        dt: f64,
        state: &mut CameraState,
        renderer: &mut R,
    ) -> PlaybackProgress {
        let Some(run) = self.run.as_mut() else {
            return PlaybackProgress {
                state: self.state,
                ..PlaybackProgress::default()
            };
        };

        let tick = run.timeline.advance(dt);
        if let Some(pose) = tick.pose {
            write_pose(pose, state, renderer);
        }
        let completed: Vec<usize> = tick.completed.iter().map(|handle| handle.0).collect();
        for index in &completed {
            tracing::debug!("{:?}: segment {index} complete", run.sequence);
        }

        if tick.status == TimelineStatus::Finished {
            tracing::info!("Finished playing {:?}", run.sequence);
            self.run = None;
            self.state = PlaybackState::Finished;
        }

        PlaybackProgress {
            pose: tick.pose,
            completed,
            state: self.state,
        }
    }

    /// Stop the running chain; the camera keeps the last written pose
    pub fn cancel(&mut self) -> bool {
        let Some(mut run) = self.run.take() else {
            return false;
        };
        run.timeline.cancel();
        self.state = PlaybackState::Cancelled;
        tracing::info!("Cancelled playback of {:?}", run.sequence);
        true
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether a chain is running
    pub fn is_playing(&self) -> bool {
        self.run.is_some()
    }

    /// Whether `token` belongs to the running chain
    pub fn is_active(&self, token: PlaybackToken) -> bool {
        self.run.as_ref().is_some_and(|run| run.token == token)
    }

    /// Token of the running chain
    pub fn active_token(&self) -> Option<PlaybackToken> {
        self.run.as_ref().map(|run| run.token)
    }

    /// Name of the sequence being played
    pub fn sequence_name(&self) -> Option<&str> {
        self.run.as_ref().map(|run| run.sequence.as_str())
    }

    /// Elapsed and total seconds of the running chain
    pub fn progress(&self) -> Option<(f64, f64)> {
        self.run
            .as_ref()
            .map(|run| (run.timeline.elapsed(), run.timeline.total_duration()))
    }
}

fn write_pose<R: Renderer + ?Sized>(pose: CameraState, state: &mut CameraState, renderer: &mut R) {
    *state = pose;
    renderer.set_pose(pose);
    tracing::trace!(
        "Pose yaw={:.3} pitch={:.3} hfov={:.3}",
        pose.yaw,
        pose.pitch,
        pose.hfov
    );
}
