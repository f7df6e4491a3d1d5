//! Static split of the keyboard into left half, right half and space bar.

use std::fmt;

use evdevil::event::Key;

use crate::key_state::KeySnapshot;

/// Which part of the keyboard a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Left,
    Right,
    Space,
}

impl Zone {
    /// Classify a key. Anything not on the right half (and not the space
    /// bar) counts as left, including codes with no physical key.
    pub fn of(key: Key) -> Zone {
        match key {
            Key::KEY_SPACE => Zone::Space,
            Key::KEY_7 | Key::KEY_8 | Key::KEY_9 | Key::KEY_0 | Key::KEY_MINUS
            | Key::KEY_EQUAL | Key::KEY_BACKSPACE | Key::KEY_Y | Key::KEY_U | Key::KEY_I
            | Key::KEY_O | Key::KEY_P | Key::KEY_LEFTBRACE | Key::KEY_RIGHTBRACE
            | Key::KEY_BACKSLASH | Key::KEY_H | Key::KEY_J | Key::KEY_K | Key::KEY_L
            | Key::KEY_SEMICOLON | Key::KEY_APOSTROPHE | Key::KEY_ENTER | Key::KEY_B
            | Key::KEY_N | Key::KEY_M | Key::KEY_COMMA | Key::KEY_DOT | Key::KEY_SLASH
            | Key::KEY_RIGHTSHIFT => Zone::Right,
            _ => Zone::Left,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Left => "left",
            Zone::Right => "right",
            Zone::Space => "space",
        };
        f.pad(name)
    }
}

/// Zone flags for the keys held in one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZonesPressed {
    pub left: bool,
    pub right: bool,
    pub space: bool,
}

impl ZonesPressed {
    pub fn classify(snapshot: &KeySnapshot) -> Self {
        let mut zones = Self::default();
        for key in snapshot.pressed_keys() {
            match Zone::of(key) {
                Zone::Left => zones.left = true,
                Zone::Right => zones.right = true,
                Zone::Space => zones.space = true,
            }
        }
        zones
    }
}
