// SPDX-License-Identifier: MIT OR Apache-2.0
//! A viewing session: the store, the live camera and the keyframe form.
//!
//! Every user action of the sequence panel maps to one method here. The
//! session owns the single [`CameraRig`], so playback and manual input
//! always go through the same control hand-off.

use crate::error::{AppError, Result};
use crate::settings::ViewerSettings;
use crate::viewer::HeadlessViewer;
use panoseq_sequencer::{
    CameraRig, CameraState, Ease, Keyframe, PlaybackPlan, PlaybackState, PoseChange,
    SequenceStore, SequencerError, StoreFormat,
};
use serde::Serialize;
use std::path::Path;

/// Values of the keyframe form (duration and easing inputs)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeForm {
    /// Transition duration in seconds
    pub duration: f64,
    /// Transition easing curve
    pub ease: Ease,
}

/// Outcome of a completed playback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackReport {
    /// Sequence that was played
    pub sequence: String,
    /// Animated segments; zero for a jump
    pub segments: usize,
    /// Ticks run by the loop
    pub ticks: usize,
    /// Poses written to the view
    pub frames: usize,
    /// Simulated seconds
    pub elapsed: f64,
    /// Pose when playback ended
    pub final_pose: CameraState,
}

/// Store plus live camera for one panorama
pub struct Session {
    store: SequenceStore,
    rig: CameraRig<HeadlessViewer>,
    form: KeyframeForm,
    settings: ViewerSettings,
}

impl Session {
    /// Open a session with an empty store
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            store: SequenceStore::new(),
            rig: CameraRig::new(HeadlessViewer::new(settings.initial_pose)),
            form: KeyframeForm {
                duration: settings.default_duration,
                ease: settings.default_ease,
            },
            settings,
        }
    }

    /// The sequence store
    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    /// The live camera
    pub fn rig(&self) -> &CameraRig<HeadlessViewer> {
        &self.rig
    }

    /// Current form values
    pub fn form(&self) -> KeyframeForm {
        self.form
    }

    /// Change the form values used by the next keyframe add/update
    pub fn set_form(&mut self, duration: f64, ease: Ease) {
        self.form = KeyframeForm { duration, ease };
    }

    /// Point the camera somewhere by hand
    pub fn look_at(&mut self, pose: CameraState) -> Result<()> {
        Ok(self.rig.set_manual_pose(pose)?)
    }

    /// Handle a pose change reported by the view, such as a drag.
    ///
    /// Echoes of the pose playback last wrote are ignored; anything else is
    /// adopted as manual input and stops playback.
    pub fn view_changed(&mut self, pose: CameraState) -> PoseChange {
        let change = self.rig.handle_pose_changed(pose);
        if change != PoseChange::Ignored {
            self.rig.renderer_mut().user_moved(pose);
        }
        change
    }

    /// Create a sequence and select it
    pub fn create_sequence(&mut self, name: &str) -> Result<()> {
        self.store.add_sequence(name)?;
        Ok(())
    }

    /// Select a sequence for keyframe editing
    pub fn select_sequence(&mut self, name: &str) -> Result<()> {
        self.store.select_sequence(name)?;
        Ok(())
    }

    /// Delete a sequence
    pub fn delete_sequence(&mut self, name: &str) -> Result<()> {
        self.store.delete_sequence(name)?;
        Ok(())
    }

    /// Flip a sequence's start-from-current flag
    pub fn toggle_start_from_current(&mut self, name: &str) -> Result<bool> {
        Ok(self.store.toggle_start_from_current(name)?)
    }

    /// Build a keyframe from the live pose and the form values
    pub fn snapshot_keyframe(&self) -> Result<Keyframe> {
        let KeyframeForm { duration, ease } = self.form();
        Ok(Keyframe::new(self.rig.pose(), duration, ease)?)
    }

    /// Snapshot the live pose with the form values into the selected sequence
    pub fn add_keyframe(&mut self) -> Result<usize> {
        let keyframe = self.snapshot_keyframe()?;
        Ok(self
            .store
            .add_keyframe_to_current(keyframe.pose(), keyframe.duration, keyframe.ease)?)
    }

    /// Overwrite a keyframe of the selected sequence with the live pose and form values
    pub fn update_keyframe(&mut self, index: usize) -> Result<()> {
        let name = self.selected_name()?;
        let keyframe = self.snapshot_keyframe()?;
        self.store.update_keyframe(
            &name,
            index,
            keyframe.pose(),
            keyframe.duration,
            keyframe.ease,
        )?;
        Ok(())
    }

    /// Delete a keyframe of the selected sequence
    pub fn delete_keyframe(&mut self, index: usize) -> Result<()> {
        let name = self.selected_name()?;
        self.store.delete_keyframe(&name, index)?;
        Ok(())
    }

    fn selected_name(&self) -> Result<String> {
        self.store
            .current_name()
            .map(str::to_string)
            .ok_or_else(|| SequencerError::Validation("no sequence is selected".into()).into())
    }

    /// Replace the store with the contents of a JSON file
    pub fn import_file(&mut self, path: &Path) -> Result<StoreFormat> {
        let json = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        let format = self.store.deserialize(&json)?;
        tracing::info!("Imported {path:?}");
        Ok(format)
    }

    /// Write the store to a JSON file in the canonical format
    pub fn export_file(&self, path: &Path) -> Result<()> {
        let json = self.store.serialize()?;
        std::fs::write(path, json).map_err(|e| AppError::io(path, e))?;
        tracing::info!("Exported to {path:?}");
        Ok(())
    }

    /// Play a sequence to the end with the fixed-rate tick loop
    pub fn play(&mut self, name: &str) -> Result<PlaybackReport> {
        let sequence = self.store.sequence(name)?;
        let previous = self.rig.renderer().history().len();
        let start = self.rig.play(sequence)?;
        self.rig.renderer_mut().discard_history(previous);

        let segments = match &start.plan {
            PlaybackPlan::Jump(_) => 0,
            PlaybackPlan::Animate { segments, .. } => segments.len(),
        };

        let dt = self.settings.tick_interval();
        let limit = self.settings.max_playback_seconds;
        let mut ticks = 0;
        let mut elapsed = 0.0;

        while self.rig.is_playing() {
            if elapsed >= limit {
                self.rig.stop_playback();
                return Err(AppError::PlaybackTimeout {
                    sequence: name.to_string(),
                    limit,
                });
            }
            let progress = self.rig.tick(dt);
            ticks += 1;
            elapsed += dt;
            if progress.state == PlaybackState::Finished {
                break;
            }
        }

        Ok(PlaybackReport {
            sequence: name.to_string(),
            segments,
            ticks,
            frames: self.rig().renderer().history().len(),
            elapsed,
            final_pose: self.rig.pose(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panoseq_sequencer::Renderer;

    fn session() -> Session {
        Session::new(ViewerSettings::default())
    }

    fn tour_session(start_from_current: bool) -> Session {
        let mut session = session();
        session.create_sequence("Tour").unwrap();
        session.look_at(CameraState::new(0.0, 0.0, 100.0)).unwrap();
        session.set_form(2.0, Ease::Linear);
        session.add_keyframe().unwrap();
        session.look_at(CameraState::new(90.0, 10.0, 80.0)).unwrap();
        session.set_form(3.0, Ease::EaseInOut);
        session.add_keyframe().unwrap();
        if start_from_current {
            session.toggle_start_from_current("Tour").unwrap();
        }
        session
    }

    #[test]
    fn test_form_defaults_come_from_settings() {
        let mut settings = ViewerSettings::default();
        settings.default_duration = 4.0;
        settings.default_ease = Ease::Step;
        let session = Session::new(settings);
        assert_eq!(session.form(), KeyframeForm { duration: 4.0, ease: Ease::Step });
        assert_eq!(session.rig().pose(), CameraState::default());
    }

    #[test]
    fn test_add_keyframe_snapshots_live_pose() {
        let session = tour_session(false);
        let tour = session.store().sequence("Tour").unwrap();
        assert_eq!(tour.len(), 2);
        assert_eq!(tour.keyframe(0).unwrap().pose(), CameraState::new(0.0, 0.0, 100.0));
        assert_eq!(tour.keyframe(0).unwrap().duration, 2.0);
        assert_eq!(tour.keyframe(1).unwrap().ease, Ease::EaseInOut);
    }

    #[test]
    fn test_snapshot_keyframe() {
        let mut session = session();
        session.look_at(CameraState::new(12.0, -4.0, 65.0)).unwrap();
        session.set_form(1.5, Ease::SineIn);
        let keyframe = session.snapshot_keyframe().unwrap();
        assert_eq!(keyframe.pose(), CameraState::new(12.0, -4.0, 65.0));
        assert_eq!(keyframe.duration, 1.5);
        assert_eq!(keyframe.ease, Ease::SineIn);

        session.set_form(-1.0, Ease::SineIn);
        assert!(session.snapshot_keyframe().is_err());
    }

    #[test]
    fn test_keyframe_edits_need_a_selection() {
        let mut session = tour_session(false);
        session.delete_sequence("Tour").unwrap();
        assert!(matches!(
            session.add_keyframe(),
            Err(AppError::Sequencer(SequencerError::Validation(_)))
        ));
        assert!(session.update_keyframe(0).is_err());
        assert!(session.delete_keyframe(0).is_err());
    }

    #[test]
    fn test_update_and_delete_keyframe() {
        let mut session = tour_session(false);
        session.look_at(CameraState::new(30.0, 2.0, 70.0)).unwrap();
        session.set_form(1.0, Ease::SineOut);
        session.update_keyframe(0).unwrap();

        let first = *session.store().sequence("Tour").unwrap().keyframe(0).unwrap();
        assert_eq!(first.pose(), CameraState::new(30.0, 2.0, 70.0));
        assert_eq!(first.ease, Ease::SineOut);

        session.delete_keyframe(0).unwrap();
        let tour = session.store().sequence("Tour").unwrap();
        assert_eq!(tour.len(), 1);
        assert_eq!(tour.keyframe(0).unwrap().yaw, 90.0);

        assert!(matches!(
            session.delete_keyframe(3),
            Err(AppError::Sequencer(SequencerError::IndexOutOfRange { index: 3, len: 1 }))
        ));
    }

    #[test]
    fn test_play_tour_from_first_keyframe() {
        let mut session = tour_session(false);
        session.look_at(CameraState::new(45.0, 5.0, 90.0)).unwrap();

        let report = session.play("Tour").unwrap();
        assert_eq!(report.segments, 1);
        assert_eq!(report.final_pose, CameraState::new(90.0, 10.0, 80.0));
        // 3 seconds at 60 Hz, allowing for accumulated rounding
        assert!((180..=181).contains(&report.ticks), "ticks = {}", report.ticks);

        let history = session.rig().renderer().history();
        assert_eq!(history[0], CameraState::new(0.0, 0.0, 100.0));
        assert_eq!(*history.last().unwrap(), CameraState::new(90.0, 10.0, 80.0));
        assert!(history.iter().all(|p| p.yaw > -1e-9 && p.yaw < 90.0 + 1e-9));
    }

    #[test]
    fn test_play_tour_from_current_position() {
        let mut session = tour_session(true);
        let live = CameraState::new(45.0, 5.0, 90.0);
        session.look_at(live).unwrap();

        let report = session.play("Tour").unwrap();
        assert_eq!(report.segments, 2);
        assert!((report.elapsed - 5.0).abs() < 0.05);

        let history = session.rig().renderer().history();
        assert_eq!(history[0], live);
        // Passes close to keyframe 0 on the way
        assert!(history.iter().any(|p| p.yaw.abs() < 1.0 && (p.hfov - 100.0).abs() < 1.0));
        assert_eq!(report.final_pose, CameraState::new(90.0, 10.0, 80.0));
    }

    #[test]
    fn test_play_single_keyframe_jumps() {
        let mut session = session();
        session.create_sequence("Still").unwrap();
        session.look_at(CameraState::new(10.0, 20.0, 30.0)).unwrap();
        session.add_keyframe().unwrap();
        session.look_at(CameraState::default()).unwrap();

        let report = session.play("Still").unwrap();
        assert_eq!(report.segments, 0);
        assert_eq!(report.ticks, 0);
        assert_eq!(report.frames, 1);
        assert_eq!(report.final_pose, CameraState::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_view_changes_become_the_live_pose() {
        let mut session = session();
        session.create_sequence("Drag").unwrap();

        assert_eq!(session.view_changed(CameraState::default()), PoseChange::Ignored);
        assert_eq!(
            session.view_changed(CameraState::new(f64::NAN, 0.0, 90.0)),
            PoseChange::Ignored
        );
        assert!(session.rig().renderer().history().is_empty());

        let dragged = CameraState::new(-33.5, 12.25, 72.0);
        assert_eq!(session.view_changed(dragged), PoseChange::Adopted);
        assert_eq!(session.rig().pose(), dragged);
        assert_eq!(session.rig().renderer().pose(), dragged);

        session.add_keyframe().unwrap();
        let keyframe = *session.store().sequence("Drag").unwrap().keyframe(0).unwrap();
        assert_eq!(keyframe.pose(), dragged);
    }

    #[test]
    fn test_rejected_play_keeps_previous_frames() {
        let mut session = tour_session(false);
        let report = session.play("Tour").unwrap();
        let frames = session.rig().renderer().history().to_vec();
        assert_eq!(frames.len(), report.frames);

        session.create_sequence("Empty").unwrap();
        assert!(session.play("Empty").is_err());
        assert!(session.play("Missing").is_err());
        assert_eq!(session.rig().renderer().history(), frames.as_slice());

        let replay = session.play("Tour").unwrap();
        assert_eq!(session.rig().renderer().history().len(), replay.frames);
        assert_eq!(session.rig().renderer().history()[0], CameraState::new(0.0, 0.0, 100.0));
    }

    #[test]
    fn test_play_errors() {
        let mut session = session();
        assert!(matches!(
            session.play("Missing"),
            Err(AppError::Sequencer(SequencerError::SequenceNotFound(_)))
        ));
        session.create_sequence("Empty").unwrap();
        assert!(matches!(
            session.play("Empty"),
            Err(AppError::Sequencer(SequencerError::PlaybackRejected(_)))
        ));
    }

    #[test]
    fn test_playback_time_limit() {
        let mut settings = ViewerSettings::default();
        settings.max_playback_seconds = 1.0;
        let mut session = Session::new(settings);
        session.create_sequence("Long").unwrap();
        session.set_form(5.0, Ease::Linear);
        session.add_keyframe().unwrap();
        session.add_keyframe().unwrap();

        assert!(matches!(
            session.play("Long"),
            Err(AppError::PlaybackTimeout { .. })
        ));
        assert!(!session.rig().is_playing());
    }

    #[test]
    fn test_export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequences.json");

        let exported = tour_session(true);
        exported.export_file(&path).unwrap();

        let mut restored = session();
        assert_eq!(restored.import_file(&path).unwrap(), StoreFormat::Canonical);
        assert_eq!(
            restored.store().sequences().collect::<Vec<_>>(),
            exported.store().sequences().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_failed_import_keeps_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut session = tour_session(false);
        assert!(session.import_file(&path).is_err());
        assert!(session.import_file(&dir.path().join("missing.json")).is_err());
        assert_eq!(session.store().sequence("Tour").unwrap().len(), 2);
    }
}
