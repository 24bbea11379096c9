// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-based action scripts.
//!
//! Each non-empty line is one user action of the sequence panel:
//!
//! ```text
//! # comments start with '#'
//! sequence Tour          # create and select
//! look 0 0 100           # yaw pitch hfov
//! drag 10 0 100          # the view reports a user drag
//! form 2 linear          # duration ease
//! keyframe               # add keyframe from the live pose
//! update 0               # overwrite keyframe 0
//! delete-keyframe 1
//! select Tour
//! toggle Tour            # start from current position
//! play Tour
//! delete Tour
//! import tours.json
//! export tours.json
//! ```

use crate::error::{AppError, Result};
use crate::session::{PlaybackReport, Session};
use panoseq_sequencer::{CameraState, Ease};
use std::path::PathBuf;

/// One scripted action
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Create and select a sequence
    CreateSequence(String),
    /// Select a sequence
    SelectSequence(String),
    /// Delete a sequence
    DeleteSequence(String),
    /// Flip a sequence's start-from-current flag
    ToggleStartFromCurrent(String),
    /// Move the camera by hand
    LookAt(CameraState),
    /// The view reports a pose change
    Drag(CameraState),
    /// Set the keyframe form
    Form(f64, Ease),
    /// Add a keyframe from the live pose
    AddKeyframe,
    /// Overwrite a keyframe with the live pose
    UpdateKeyframe(usize),
    /// Delete a keyframe
    DeleteKeyframe(usize),
    /// Play a sequence to the end
    Play(String),
    /// Load a store file
    Import(PathBuf),
    /// Save the store
    Export(PathBuf),
}

/// Parse a whole script; errors name the offending line
pub fn parse(source: &str) -> Result<Vec<Action>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(number, line)| {
            let line = line.split('#').next().unwrap_or("").trim();
            (!line.is_empty()).then_some((number + 1, line))
        })
        .map(|(number, line)| {
            parse_line(line).map_err(|e| AppError::Script(format!("line {number}: {e}")))
        })
        .collect()
}

fn parse_line(line: &str) -> std::result::Result<Action, String> {
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let name = || {
        if rest.is_empty() {
            Err(format!("{verb} needs a sequence name"))
        } else {
            Ok(rest.to_string())
        }
    };

    let action = match verb {
        "sequence" => Action::CreateSequence(name()?),
        "select" => Action::SelectSequence(name()?),
        "delete" => Action::DeleteSequence(name()?),
        "toggle" => Action::ToggleStartFromCurrent(name()?),
        "play" => Action::Play(name()?),
        "look" => Action::LookAt(parse_pose(rest)?),
        "drag" => Action::Drag(parse_pose(rest)?),
        "form" => {
            let mut parts = rest.split_whitespace();
            let duration = parse_number(parts.next(), "duration")?;
            let ease = match parts.next() {
                Some(ease) => ease.parse::<Ease>().map_err(|e| e.to_string())?,
                None => return Err("form needs a duration and an ease".into()),
            };
            Action::Form(duration, ease)
        }
        "keyframe" => Action::AddKeyframe,
        "update" => Action::UpdateKeyframe(parse_index(rest)?),
        "delete-keyframe" => Action::DeleteKeyframe(parse_index(rest)?),
        "import" => Action::Import(PathBuf::from(name()?)),
        "export" => Action::Export(PathBuf::from(name()?)),
        other => return Err(format!("unknown action {other:?}")),
    };
    Ok(action)
}

/// Parse `yaw pitch hfov`, separated by spaces or commas
pub fn parse_pose(text: &str) -> std::result::Result<CameraState, String> {
    let mut parts = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let yaw = parse_number(parts.next(), "yaw")?;
    let pitch = parse_number(parts.next(), "pitch")?;
    let hfov = parse_number(parts.next(), "hfov")?;
    if parts.next().is_some() {
        return Err("a pose has exactly three numbers: yaw pitch hfov".into());
    }
    Ok(CameraState::new(yaw, pitch, hfov))
}

fn parse_number(part: Option<&str>, field: &str) -> std::result::Result<f64, String> {
    let part = part.ok_or_else(|| format!("missing {field}"))?;
    part.parse::<f64>()
        .map_err(|_| format!("{field} is not a number: {part:?}"))
}

fn parse_index(text: &str) -> std::result::Result<usize, String> {
    text.parse::<usize>()
        .map_err(|_| format!("expected a keyframe index, got {text:?}"))
}

impl Session {
    /// Perform one action, returning a playback report for `play`
    pub fn apply(&mut self, action: &Action) -> Result<Option<PlaybackReport>> {
        match action {
            Action::CreateSequence(name) => self.create_sequence(name)?,
            Action::SelectSequence(name) => self.select_sequence(name)?,
            Action::DeleteSequence(name) => self.delete_sequence(name)?,
            Action::ToggleStartFromCurrent(name) => {
                self.toggle_start_from_current(name)?;
            }
            Action::LookAt(pose) => self.look_at(*pose)?,
            Action::Drag(pose) => {
                self.view_changed(*pose);
            }
            Action::Form(duration, ease) => self.set_form(*duration, *ease),
            Action::AddKeyframe => {
                self.add_keyframe()?;
            }
            Action::UpdateKeyframe(index) => self.update_keyframe(*index)?,
            Action::DeleteKeyframe(index) => self.delete_keyframe(*index)?,
            Action::Play(name) => return self.play(name).map(Some),
            Action::Import(path) => {
                self.import_file(path)?;
            }
            Action::Export(path) => self.export_file(path)?,
        }
        Ok(None)
    }

    /// Run every action in order, stopping at the first failure
    pub fn run_script(&mut self, actions: &[Action]) -> Result<Vec<PlaybackReport>> {
        let mut reports = Vec::new();
        for (step, action) in actions.iter().enumerate() {
            tracing::debug!("Step {step}: {action:?}");
            if let Some(report) = self.apply(action)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }
}
