// SPDX-License-Identifier: MIT OR Apache-2.0
//! Live camera state and control hand-off.
//!
//! [`CameraRig`] owns the single live [`CameraState`] of a panorama view.
//! Control belongs either to the user (manual pose changes) or to exactly
//! one playback run. Any manual change cancels the run in progress.

use crate::error::Result;
use crate::playback::{PlaybackEngine, PlaybackProgress, PlaybackStart, PlaybackToken};
use crate::pose::CameraState;
use crate::sequence::Sequence;

/// The panorama view being driven
pub trait Renderer {
    /// Pose currently displayed
    fn pose(&self) -> CameraState;

    /// Display a new pose
    fn set_pose(&mut self, pose: CameraState);
}

/// Who currently writes the camera pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Control {
    /// User input
    #[default]
    Manual,
    /// A playback run
    Playback(PlaybackToken),
}

/// How a renderer change notification was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseChange {
    /// The notification repeated the pose the rig wrote, or was not finite
    Ignored,
    /// A manual change was adopted
    Adopted,
    /// A manual change was adopted and stopped the running playback
    InterruptedPlayback,
}

/// Owns the live camera pose, its renderer and the playback engine
pub struct CameraRig<R: Renderer> {
    renderer: R,
    state: CameraState,
    engine: PlaybackEngine,
}

impl<R: Renderer> CameraRig<R> {
    /// Take over a renderer, starting from the pose it displays
    pub fn new(renderer: R) -> Self {
        let state = renderer.pose();
        Self {
            renderer,
            state,
            engine: PlaybackEngine::new(),
        }
    }

    /// The live pose
    pub fn pose(&self) -> CameraState {
        self.state
    }

    /// The driven renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The playback engine
    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    /// Current owner of the pose
    pub fn control(&self) -> Control {
        self.engine
            .active_token()
            .map_or(Control::Manual, Control::Playback)
    }

    /// Whether a playback run holds control
    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// Set the pose from user input, cancelling any playback
    pub fn set_manual_pose(&mut self, pose: CameraState) -> Result<()> {
        pose.validate()?;
        if self.engine.cancel() {
            tracing::debug!("Manual pose change took control from playback");
        }
        self.state = pose;
        self.renderer.set_pose(pose);
        Ok(())
    }

    /// Handle a change notification from the renderer.
    ///
    /// The embedder calls this from the view's change callback (drags,
    /// zooms). Notifications that repeat the last written pose are ignored;
    /// anything else is a manual change and cancels playback.
    pub fn handle_pose_changed(&mut self, pose: CameraState) -> PoseChange {
        if pose == self.state || !pose.is_finite() {
            return PoseChange::Ignored;
        }
        let interrupted = self.engine.cancel();
        self.state = pose;
        if interrupted {
            tracing::debug!("View change interrupted playback");
            PoseChange::InterruptedPlayback
        } else {
            PoseChange::Adopted
        }
    }

    /// Start playing a sequence from the live pose
    pub fn play(&mut self, sequence: &Sequence) -> Result<PlaybackStart> {
        self.engine.play(sequence, &mut self.state, &mut self.renderer)
    }

    /// Advance playback by `dt` seconds
    pub fn tick(&mut self, dt: f64) -> PlaybackProgress {
        self.engine.tick(dt, &mut self.state, &mut self.renderer)
    }

    /// Stop playback, keeping the current pose
    pub fn stop_playback(&mut self) -> bool {
        self.engine.cancel()
    }

    /// Give back the renderer
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Ease;
    use crate::keyframe::Keyframe;
    use crate::playback::PlaybackState;

    struct Viewer {
        shown: CameraState,
        writes: usize,
    }

    impl Renderer for Viewer {
        fn pose(&self) -> CameraState {
            self.shown
        }

        fn set_pose(&mut self, pose: CameraState) {
            self.shown = pose;
            self.writes += 1;
        }
    }

    fn rig() -> CameraRig<Viewer> {
        CameraRig::new(Viewer {
            shown: CameraState::new(45.0, 5.0, 90.0),
            writes: 0,
        })
    }

    fn tour() -> Sequence {
        Sequence::with_keyframes(
            "Tour",
            vec![
                Keyframe::new(CameraState::new(0.0, 0.0, 100.0), 2.0, Ease::Linear).unwrap(),
                Keyframe::new(CameraState::new(90.0, 10.0, 80.0), 3.0, Ease::EaseInOut).unwrap(),
            ],
        )
    }

    #[test]
    fn test_starts_from_renderer_pose() {
        let rig = rig();
        assert_eq!(rig.pose(), CameraState::new(45.0, 5.0, 90.0));
        assert_eq!(rig.control(), Control::Manual);
    }

    #[test]
    fn test_playback_takes_and_returns_control() {
        let mut rig = rig();
        let start = rig.play(&tour()).unwrap();
        assert_eq!(rig.control(), Control::Playback(start.token));

        rig.tick(3.0);
        assert_eq!(rig.control(), Control::Manual);
        assert_eq!(rig.pose(), CameraState::new(90.0, 10.0, 80.0));
        assert_eq!(rig.renderer().shown, rig.pose());
    }

    #[test]
    fn test_manual_pose_cancels_playback() {
        let mut rig = rig();
        rig.play(&tour()).unwrap();
        rig.tick(1.0);

        let manual = CameraState::new(-20.0, 3.0, 70.0);
        rig.set_manual_pose(manual).unwrap();
        assert!(!rig.is_playing());
        assert_eq!(rig.engine().state(), PlaybackState::Cancelled);

        let writes = rig.renderer().writes;
        let progress = rig.tick(1.0);
        assert_eq!(progress.pose, None);
        assert_eq!(rig.pose(), manual);
        assert_eq!(rig.renderer().writes, writes);
    }

    #[test]
    fn test_manual_pose_is_validated() {
        let mut rig = rig();
        rig.play(&tour()).unwrap();
        assert!(rig.set_manual_pose(CameraState::new(f64::NAN, 0.0, 90.0)).is_err());
        assert!(rig.is_playing());
    }

    #[test]
    fn test_echoed_notifications_are_ignored() {
        let mut rig = rig();
        rig.play(&tour()).unwrap();
        rig.tick(0.5);

        let echoed = rig.renderer().shown;
        assert_eq!(rig.handle_pose_changed(echoed), PoseChange::Ignored);
        assert!(rig.is_playing());
    }

    #[test]
    fn test_drag_interrupts_playback() {
        let mut rig = rig();
        rig.play(&tour()).unwrap();
        rig.tick(0.5);
        let before = rig.pose();

        let dragged = CameraState::new(before.yaw + 15.0, before.pitch, before.hfov);
        assert_eq!(rig.handle_pose_changed(dragged), PoseChange::InterruptedPlayback);
        assert!(!rig.is_playing());
        assert_eq!(rig.pose(), dragged);

        let other = CameraState::new(1.0, 1.0, 60.0);
        assert_eq!(rig.handle_pose_changed(other), PoseChange::Adopted);
    }

    #[test]
    fn test_stop_playback_keeps_pose() {
        let mut rig = rig();
        rig.play(&tour()).unwrap();
        rig.tick(1.0);
        let pose = rig.pose();

        assert!(rig.stop_playback());
        assert_eq!(rig.pose(), pose);
        assert!(!rig.stop_playback());
    }
}
