//! Input state consumed by the engine
//!
//! The window layer (an external collaborator) feeds key, mouse button, and
//! cursor events into an [`InputState`] snapshot each frame; the engine only
//! reads it. Nothing here polls the OS.

use std::collections::HashSet;

use crate::foundation::math::Vec2;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// W key
    W,
    /// X key
    X,
    /// Z key
    Z,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Space bar
    Space,
    /// Left shift
    LeftShift,
    /// Escape key
    Escape,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button / wheel click
    Middle,
}

/// Rebindable directional key bindings for camera movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraBindings {
    /// Move along the camera front vector
    pub forward: KeyCode,
    /// Move against the camera front vector
    pub back: KeyCode,
    /// Strafe against the camera right vector
    pub left: KeyCode,
    /// Strafe along the camera right vector
    pub right: KeyCode,
}

impl Default for CameraBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::W,
            back: KeyCode::S,
            left: KeyCode::A,
            right: KeyCode::D,
        }
    }
}

/// Per-frame input snapshot
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held_keys: HashSet<KeyCode>,
    held_buttons: HashSet<MouseButton>,
    cursor_position: Vec2,
    cursor_locked: bool,
    editor_look_override: bool,
}

impl InputState {
    /// Create an empty snapshot (nothing held, cursor at origin, unlocked)
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press
    pub fn press_key(&mut self, key: KeyCode) {
        self.held_keys.insert(key);
    }

    /// Record a key release
    pub fn release_key(&mut self, key: KeyCode) {
        self.held_keys.remove(&key);
    }

    /// Whether a key is currently held
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.held_keys.contains(&key)
    }

    /// Record a mouse button press
    pub fn press_button(&mut self, button: MouseButton) {
        self.held_buttons.insert(button);
    }

    /// Record a mouse button release
    pub fn release_button(&mut self, button: MouseButton) {
        self.held_buttons.remove(&button);
    }

    /// Whether a mouse button is currently held
    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.held_buttons.contains(&button)
    }

    /// Update the cursor position (window coordinates)
    pub fn set_cursor_position(&mut self, position: Vec2) {
        self.cursor_position = position;
    }

    /// Current cursor position
    pub fn cursor_position(&self) -> Vec2 {
        self.cursor_position
    }

    /// Set whether the cursor is captured by the window
    pub fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = locked;
    }

    /// Whether the cursor is captured
    pub fn is_cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// Enable the editor-mode look override (mouse look while a button is
    /// held, without locking the cursor)
    pub fn set_editor_look_override(&mut self, enabled: bool) {
        self.editor_look_override = enabled;
    }

    /// Whether the editor look override is active
    pub fn editor_look_override(&self) -> bool {
        self.editor_look_override
    }
}
