//! # Input Manager
//!
//! This module handles input processing for the application, including:
//! - Keyboard state tracking and mouse button presses
//! - Mouse motion and wheel accumulation between frames
//! - Folding everything into a `ProcessedInputState` once per frame

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{ProcessedInputState, RawInputState, Tap};

/// Keys the game reacts to.
pub const KEY_CODES: [KeyCode; 8] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::Space,
    KeyCode::ControlLeft,
    KeyCode::Escape,
    KeyCode::F3,
];

/// Buttons whose presses are reported as taps.
const MOUSE_BUTTONS: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

/// Pixels of trackpad scroll treated as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

/// Manages the state of all input devices and processes input events.
pub struct InputManager {
    /// State of tracked keys at the end of the previous frame
    keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of tracked keys
    keyboard_inputs_new: HashMap<KeyCode, bool>,
    /// Raw mouse motion summed since the last frame
    mouse_delta: Option<(f64, f64)>,
    /// Wheel lines summed since the last frame
    scroll_lines: f32,
    /// Presses seen since the last frame
    taps: Vec<Tap>,
}

impl InputManager {
    /// Creates an input manager with every tracked key released.
    pub fn new() -> Self {
        let released_keys: HashMap<KeyCode, bool> =
            KEY_CODES.iter().map(|&key| (key, false)).collect();

        Self {
            keyboard_inputs_old: released_keys.clone(),
            keyboard_inputs_new: released_keys,
            mouse_delta: None,
            scroll_lines: 0.0,
            taps: Vec::new(),
        }
    }

    /// Processes a window event and updates internal input state.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        repeat,
                        ..
                    },
                ..
            } => {
                if let Some(key_state) = self.keyboard_inputs_new.get_mut(key) {
                    let pressed = *state == ElementState::Pressed;
                    if pressed && !*repeat {
                        self.taps.push(Tap::Key(*key));
                    }
                    *key_state = pressed;
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_lines += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if *state == ElementState::Pressed && MOUSE_BUTTONS.contains(button) {
                    self.taps.push(Tap::Mouse(*button));
                }
            }
            _ => {}
        }
    }

    /// Adds raw mouse motion from a device event.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Translates the raw boolean states into transitions for this frame.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_delta: self.mouse_delta,
            scroll_lines: self.scroll_lines,
            taps: self.taps.clone(),
        }
    }

    /// Returns this frame's input and starts accumulating the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Ends the frame: current states become the previous ones and the
    /// accumulators are cleared.
    pub fn reset_inputs(&mut self) {
        self.keyboard_inputs_old.clone_from(&self.keyboard_inputs_new);
        self.mouse_delta = None;
        self.scroll_lines = 0.0;
        self.taps.clear();
    }

    /// Releases everything, for when the window loses focus.
    pub fn release_all(&mut self) {
        self.keyboard_inputs_new.values_mut().for_each(|down| *down = false);
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
