// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless stand-in for the panorama view.

use panoseq_sequencer::{CameraState, Renderer};

/// A renderer that only remembers the poses it was asked to show
#[derive(Debug, Clone, Default)]
pub struct HeadlessViewer {
    pose: CameraState,
    history: Vec<CameraState>,
}

impl HeadlessViewer {
    /// Create a viewer showing `pose`
    pub fn new(pose: CameraState) -> Self {
        Self {
            pose,
            history: Vec::new(),
        }
    }

    /// Every pose set so far, oldest first
    pub fn history(&self) -> &[CameraState] {
        &self.history
    }

    /// Forget the oldest `count` recorded poses
    pub fn discard_history(&mut self, count: usize) {
        self.history.drain(..count.min(self.history.len()));
    }

    /// Show a pose the user moved to, as a drag on the view would
    pub fn user_moved(&mut self, pose: CameraState) {
        self.pose = pose;
        self.history.push(pose);
    }
}

impl Renderer for HeadlessViewer {
    fn pose(&self) -> CameraState {
        self.pose
    }

    fn set_pose(&mut self, pose: CameraState) {
        self.pose = pose;
        self.history.push(pose);
    }
}
