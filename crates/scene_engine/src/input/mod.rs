//! Input state and per-tick snapshots
//!
//! The host forwards raw key and pointer events into [`InputState`]. Once per
//! tick the frame driver takes an [`InputSnapshot`], which is what scripts see.
//! Scripts only ever poll the snapshot; they cannot push events.

use std::collections::HashSet;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Left shift
    Shift,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Pointer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

bitflags! {
    /// Set of held pointer buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PointerButtons: u8 {
        /// Left button held
        const LEFT = 1;
        /// Right button held
        const RIGHT = 1 << 1;
        /// Middle button held
        const MIDDLE = 1 << 2;
    }
}

impl From<MouseButton> for PointerButtons {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Self::LEFT,
            MouseButton::Right => Self::RIGHT,
            MouseButton::Middle => Self::MIDDLE,
        }
    }
}

/// Accumulates host input events between ticks
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    buttons: PointerButtons,
    pointer_position: Vec2,
    pointer_delta: Vec2,
}

impl InputState {
    /// Create an empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed
    pub fn key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    /// Key released
    pub fn key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    /// Pointer moved to an absolute position; the delta accumulates until the next snapshot
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        self.pointer_delta += position - self.pointer_position;
        self.pointer_position = position;
    }

    /// Pointer button pressed
    pub fn button_down(&mut self, button: MouseButton) {
        self.buttons.insert(button.into());
    }

    /// Pointer button released
    pub fn button_up(&mut self, button: MouseButton) {
        self.buttons.remove(button.into());
    }

    /// Release everything, e.g. when the host window loses focus
    pub fn clear(&mut self) {
        self.keys.clear();
        self.buttons = PointerButtons::empty();
        self.pointer_delta = Vec2::zeros();
    }

    /// Freeze the current state for one tick and reset the pointer delta
    pub fn snapshot(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            keys: self.keys.clone(),
            buttons: self.buttons,
            pointer_position: self.pointer_position,
            pointer_delta: self.pointer_delta,
        };
        self.pointer_delta = Vec2::zeros();
        snapshot
    }
}

/// Read-only view of input for one tick
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    keys: HashSet<KeyCode>,
    buttons: PointerButtons,
    pointer_position: Vec2,
    pointer_delta: Vec2,
}

impl InputSnapshot {
    /// Snapshot with nothing pressed
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether a key is held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Whether a pointer button is held
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(button.into())
    }

    /// All held pointer buttons
    pub const fn buttons(&self) -> PointerButtons {
        self.buttons
    }

    /// Pointer position in host coordinates
    pub const fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    /// Pointer movement since the previous snapshot
    pub const fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    /// Same held state with the pointer movement already consumed
    #[must_use]
    pub fn without_pointer_delta(&self) -> Self {
        Self {
            pointer_delta: Vec2::zeros(),
            ..self.clone()
        }
    }

    /// -1, 0 or 1 from a pair of opposing keys
    pub fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        f32::from(i8::from(self.is_key_down(positive)) - i8::from(self.is_key_down(negative)))
    }
}
