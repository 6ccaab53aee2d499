//! # Input State
//!
//! Key and button transitions plus the mouse motion gathered over one frame.

use std::collections::HashMap;
use winit::{event::MouseButton, keyboard::KeyCode};

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Classifies a key from its state at the end of the previous and current frames
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of one frame of input.
#[derive(Debug, Default)]
pub struct ProcessedInputState {
    /// Current state of all tracked keyboard keys
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Summed raw mouse motion since the last frame (x, y), if any
    pub mouse_delta: Option<(f64, f64)>,

    /// Summed wheel movement in lines; positive scrolls up
    pub scroll_lines: f32,

    /// Set when a key or button went down since the last frame, even if it was
    /// released again before the frame ended
    pub taps: Vec<Tap>,
}

/// A press seen during the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tap {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl ProcessedInputState {
    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Gets the mouse movement delta since the last frame
    pub fn get_mouse_delta(&self) -> Option<(f64, f64)> {
        self.mouse_delta
    }

    /// Whether `key` went down during the frame.
    pub fn key_tapped(&self, key: KeyCode) -> bool {
        self.taps.contains(&Tap::Key(key))
    }

    /// Whether `button` went down during the frame.
    pub fn button_tapped(&self, button: MouseButton) -> bool {
        self.taps.contains(&Tap::Mouse(button))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_from_raw_states() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert!(!RawInputState::Released.is_active());
        assert!(RawInputState::Held.is_active());
        assert!(RawInputState::Pressed.is_active());
    }

    #[test]
    fn untracked_keys_read_as_not_pressed() {
        let input = ProcessedInputState::default();

        assert_eq!(input.get_key_state(KeyCode::KeyQ), RawInputState::NotPressed);
        assert!(!input.key_tapped(KeyCode::Escape));
    }
}
