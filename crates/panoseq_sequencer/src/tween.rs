// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tween driver: eased pose transitions chained back to back.
//!
//! A [`Timeline`] holds an ordered chain of [`Tween`]s and is advanced by the
//! caller's clock. Tweens never overlap: the next one starts only once the
//! previous one has reported completion.

use crate::easing::Ease;
use crate::pose::CameraState;

/// One eased transition between two poses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    /// Pose at the start
    pub from: CameraState,
    /// Pose at the end
    pub to: CameraState,
    /// Length in seconds; `<= 0` completes instantly
    pub duration: f64,
    /// Curve applied to all three components
    pub ease: Ease,
}

impl Tween {
    /// Create a tween
    pub fn new(from: CameraState, to: CameraState, duration: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration,
            ease,
        }
    }

    /// Length in seconds, never negative
    pub fn length(&self) -> f64 {
        self.duration.max(0.0)
    }

    /// Pose after `elapsed` seconds
    pub fn sample(&self, elapsed: f64) -> CameraState {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (elapsed / self.duration).clamp(0.0, 1.0);
        self.from.lerp(&self.to, self.ease.apply(t))
    }
}

/// Position of a tween inside its timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenHandle(pub usize);

/// Timeline lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineStatus {
    /// Tweens remain to be played
    #[default]
    Running,
    /// Every tween completed
    Finished,
    /// Stopped before the end
    Cancelled,
}

/// What happened during one call to [`Timeline::advance`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineTick {
    /// Pose after all of the tick's time was consumed
    pub pose: Option<CameraState>,
    /// Tweens that completed during the tick, in order
    pub completed: Vec<TweenHandle>,
    /// Status after the tick
    pub status: TimelineStatus,
}

/// A strictly sequential chain of tweens
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    tweens: Vec<Tween>,
    active: usize,
    elapsed: f64,
    status: TimelineStatus,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timeline from an ordered list of tweens
    pub fn from_tweens(tweens: impl IntoIterator<Item = Tween>) -> Self {
        let mut timeline = Self::new();
        for tween in tweens {
            timeline.chain(tween);
        }
        timeline
    }

    /// Queue a tween after every tween already chained.
    ///
    /// A finished timeline resumes with the new tween; a cancelled one stays
    /// cancelled.
    pub fn chain(&mut self, tween: Tween) -> TweenHandle {
        self.tweens.push(tween);
        if self.status == TimelineStatus::Finished {
            self.status = TimelineStatus::Running;
        }
        TweenHandle(self.tweens.len() - 1)
    }

    /// Stop immediately; no further poses or completions are produced
    pub fn cancel(&mut self) {
        if self.status == TimelineStatus::Running {
            self.status = TimelineStatus::Cancelled;
        }
    }

    /// Current status
    pub fn status(&self) -> TimelineStatus {
        self.status
    }

    /// Whether more ticks will produce poses
    pub fn is_running(&self) -> bool {
        self.status == TimelineStatus::Running
    }

    /// Number of chained tweens
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    /// Whether nothing was chained
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Chained tweens in play order
    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// The tween currently playing
    pub fn active(&self) -> Option<TweenHandle> {
        (self.is_running() && self.active < self.tweens.len()).then_some(TweenHandle(self.active))
    }

    /// Summed length of every tween
    pub fn total_duration(&self) -> f64 {
        self.tweens.iter().map(Tween::length).sum()
    }

    /// Time played so far
    pub fn elapsed(&self) -> f64 {
        let done: f64 = self.tweens[..self.active.min(self.tweens.len())]
            .iter()
            .map(Tween::length)
            .sum();
        done + self.elapsed
    }

    /// Advance the clock by `dt` seconds.
    ///
    /// A tween whose end falls inside the tick completes with its exact target
    /// pose, then the leftover time goes to the next tween.
    pub fn advance(&mut self, dt: f64) -> TimelineTick {
        if self.status != TimelineStatus::Running {
            return TimelineTick {
                status: self.status,
                ..TimelineTick::default()
            };
        }

        let mut remaining = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut tick = TimelineTick::default();

        while let Some(tween) = self.tweens.get(self.active) {
            let left = tween.length() - self.elapsed;
            if remaining >= left {
                remaining -= left.max(0.0);
                tick.pose = Some(tween.to);
                tick.completed.push(TweenHandle(self.active));
                self.active += 1;
                self.elapsed = 0.0;
            } else {
                self.elapsed += remaining;
                tick.pose = Some(tween.sample(self.elapsed));
                break;
            }
        }

        if self.active >= self.tweens.len() {
            self.status = TimelineStatus::Finished;
        }
        tick.status = self.status;
        tick
    }
}
