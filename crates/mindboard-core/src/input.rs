//! Input events delivered to board plugins.
//!
//! Positions are client-space pixels, as reported by the host. Plugins map
//! them to world coordinates through the board's viewport.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// The platform command key: ctrl or meta.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer press, move or release.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub timestamp: Instant,
}

impl PointerEvent {
    pub fn new(position: Point, button: MouseButton) -> Self {
        Self {
            position,
            button,
            modifiers: Modifiers::default(),
            timestamp: Instant::now(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Wheel or touchpad scroll.
#[derive(Debug, Clone)]
pub struct WheelEvent {
    pub position: Point,
    pub delta: Vec2,
    pub modifiers: Modifiers,
    pub timestamp: Instant,
    pub default_prevented: bool,
}

impl WheelEvent {
    pub fn new(position: Point, delta: Vec2) -> Self {
        Self {
            position,
            delta,
            modifiers: Modifiers::default(),
            timestamp: Instant::now(),
            default_prevented: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Key press.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// Key name as reported by the host, e.g. `"a"`, `"Delete"`, `"ArrowLeft"`.
    pub key: String,
    pub modifiers: Modifiers,
    pub timestamp: Instant,
    pub default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            timestamp: Instant::now(),
            default_prevented: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Match a hotkey such as `"mod+shift+z"`.
    ///
    /// `mod` is the command key (ctrl or meta). Modifiers not named in the
    /// combo must be released. Key names compare case-insensitively.
    pub fn is_hotkey(&self, combo: &str) -> bool {
        let mut parts: Vec<&str> = combo.split('+').collect();
        // "mod++" names the plus key.
        if combo.ends_with("++") {
            parts.truncate(parts.len().saturating_sub(2));
            parts.push("+");
        }
        let Some((key, modifiers)) = parts.split_last() else {
            return false;
        };
        let wants = |name: &str| modifiers.iter().any(|m| m.eq_ignore_ascii_case(name));
        let command = wants("mod") || wants("ctrl") || wants("meta");
        self.key.eq_ignore_ascii_case(key)
            && self.modifiers.command() == command
            && self.modifiers.shift == wants("shift")
            && self.modifiers.alt == wants("alt")
    }
}

/// Context-menu request (usually a right click).
#[derive(Debug, Clone)]
pub struct ContextMenuEvent {
    pub position: Point,
    pub default_prevented: bool,
}

impl ContextMenuEvent {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Copy, cut or paste, with the clipboard contents keyed by MIME type.
#[derive(Debug, Clone, Default)]
pub struct ClipboardEvent {
    data: BTreeMap<String, String>,
    pub default_prevented: bool,
}

impl ClipboardEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, mime: impl Into<String>, data: impl Into<String>) -> Self {
        self.set_data(mime, data);
        self
    }

    pub fn get_data(&self, mime: &str) -> Option<&str> {
        self.data.get(mime).map(String::as_str)
    }

    pub fn set_data(&mut self, mime: impl Into<String>, data: impl Into<String>) {
        self.data.insert(mime.into(), data.into());
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}
