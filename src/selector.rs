//! Picks the image to show each frame from the current key snapshot.
//!
//! The choice is level-triggered: every tick recomputes it from the set of
//! keys held right now, never from individual press/release events.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::key_state::KeySnapshot;
use crate::zone::ZonesPressed;

/// The four poses of the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayImage {
    #[default]
    Idle,
    Left,
    Right,
    /// Both halves at once, or the space bar.
    Both,
}

impl DisplayImage {
    pub const ALL: [DisplayImage; 4] = [
        DisplayImage::Idle,
        DisplayImage::Left,
        DisplayImage::Right,
        DisplayImage::Both,
    ];

    /// Position of this image in the asset table.
    pub fn index(self) -> usize {
        match self {
            DisplayImage::Idle => 0,
            DisplayImage::Left => 1,
            DisplayImage::Right => 2,
            DisplayImage::Both => 3,
        }
    }
}

impl fmt::Display for DisplayImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayImage::Idle => write!(f, "idle"),
            DisplayImage::Left => write!(f, "left"),
            DisplayImage::Right => write!(f, "right"),
            DisplayImage::Both => write!(f, "both"),
        }
    }
}

/// What to show once every key has been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdlePolicy {
    /// Drop to idle on the first tick with nothing held. The idle timeout
    /// is still checked each tick but can only ever force idle.
    #[default]
    Immediate,
    /// Keep the last active pose until the idle timeout has passed.
    HoldLastPose,
}

impl fmt::Display for IdlePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdlePolicy::Immediate => write!(f, "immediate"),
            IdlePolicy::HoldLastPose => write!(f, "hold-last-pose"),
        }
    }
}

impl FromStr for IdlePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "immediate" => Ok(IdlePolicy::Immediate),
            "hold-last-pose" | "hold_last_pose" | "hold" => Ok(IdlePolicy::HoldLastPose),
            _ => Err(format!(
                "Invalid idle policy '{}'. Valid values: immediate, hold-last-pose",
                s
            )),
        }
    }
}

/// Priority order: space, both halves, right only, left only, nothing.
pub fn candidate(zones: &ZonesPressed) -> DisplayImage {
    if zones.space || (zones.left && zones.right) {
        DisplayImage::Both
    } else if zones.right {
        DisplayImage::Right
    } else if zones.left {
        DisplayImage::Left
    } else {
        DisplayImage::Idle
    }
}

pub struct PresentationSelector {
    idle_timeout: Duration,
    policy: IdlePolicy,
    displayed: DisplayImage,
    last_active: DisplayImage,
    last_activity_ms: Option<u64>,
}

impl PresentationSelector {
    pub fn new(idle_timeout: Duration, policy: IdlePolicy) -> Self {
        Self {
            idle_timeout,
            policy,
            displayed: DisplayImage::Idle,
            last_active: DisplayImage::Idle,
            last_activity_ms: None,
        }
    }

    /// Run one frame: candidate, record activity, apply the timeout, publish.
    pub fn tick(&mut self, snapshot: &KeySnapshot, now_ms: u64) -> DisplayImage {
        let mut image = candidate(&ZonesPressed::classify(snapshot));

        if image != DisplayImage::Idle {
            self.last_activity_ms = Some(now_ms);
            self.last_active = image;
        }

        let timeout_ms = self.idle_timeout.as_millis() as u64;
        let within_timeout = self
            .last_activity_ms
            .map(|t| now_ms.saturating_sub(t) <= timeout_ms)
            .unwrap_or(false);

        match self.policy {
            IdlePolicy::Immediate => {
                if !within_timeout {
                    image = DisplayImage::Idle;
                }
            }
            IdlePolicy::HoldLastPose => {
                if image == DisplayImage::Idle && within_timeout {
                    image = self.last_active;
                }
            }
        }

        self.displayed = image;
        image
    }

    pub fn displayed(&self) -> DisplayImage {
        self.displayed
    }

    pub fn last_active(&self) -> DisplayImage {
        self.last_active
    }
}

/// Monotonic millisecond source used for the idle timeout.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
