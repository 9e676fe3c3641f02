//! Per-frame keyboard state owned by the engine.
//!
//! The input collaborator reports raw key transitions through
//! [`InputState::button_state_changed`]. Once per frame the engine calls
//! [`InputState::advance_frame`] *before* polling, which copies the current
//! state into the previous one. Comparing the two gives the "just pressed"
//! and "just released" edges, distinct from the "held" state.
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Keys the core knows how to name. Anything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    E,
    Q,
    R,
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    LeftShift,
    Tab,
    Other(u32),
}

impl FromStr for Key {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_ascii_lowercase().as_str() {
            "w" => Key::W,
            "a" => Key::A,
            "s" => Key::S,
            "d" => Key::D,
            "e" => Key::E,
            "q" => Key::Q,
            "r" => Key::R,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "space" => Key::Space,
            "enter" | "return" => Key::Enter,
            "escape" | "esc" => Key::Escape,
            "leftshift" | "left_shift" | "shift" => Key::LeftShift,
            "tab" => Key::Tab,
            other => match other.parse::<u32>() {
                Ok(code) => Key::Other(code),
                Err(_) => return Err(ConfigError::UnknownKey(s.to_string())),
            },
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Other(code) => write!(f, "{code}"),
            Key::LeftShift => f.write_str("LeftShift"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Current and previous frame state of one key.
pub struct KeyState {
    pub current: bool,
    pub previous: bool,
}

impl KeyState {
    pub fn is_down(&self) -> bool {
        self.current
    }

    pub fn just_pressed(&self) -> bool {
        self.current && !self.previous
    }

    pub fn just_released(&self) -> bool {
        !self.current && self.previous
    }
}

/// Keyboard and cursor state for the running frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: FxHashMap<Key, KeyState>,
    cursor: Vec2,
}

impl InputState {
    /// Roll the frame: every key's current state becomes its previous one.
    pub fn advance_frame(&mut self) {
        for state in self.keys.values_mut() {
            state.previous = state.current;
        }
    }

    /// Record a raw transition reported by the input collaborator.
    pub fn button_state_changed(&mut self, key: Key, is_pressed: bool) {
        self.keys.entry(key).or_default().current = is_pressed;
    }

    pub fn set_cursor_position(&mut self, position: Vec2) {
        self.cursor = position;
    }

    pub fn cursor_position(&self) -> Vec2 {
        self.cursor
    }

    pub fn key(&self, key: Key) -> KeyState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.key(key).is_down()
    }

    pub fn is_key_just_pressed(&self, key: Key) -> bool {
        self.key(key).just_pressed()
    }

    pub fn is_key_just_released(&self, key: Key) -> bool {
        self.key(key).just_released()
    }
}

/// Player-facing key bindings. Defaults use WASD, space for bombs and left
/// shift for kicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub up: Key,
    pub down: Key,
    pub left: Key,
    pub right: Key,
    pub bomb: Key,
    pub kick: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: Key::W,
            down: Key::S,
            left: Key::A,
            right: Key::D,
            bomb: Key::Space,
            kick: Key::LeftShift,
        }
    }
}
