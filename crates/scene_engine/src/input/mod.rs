//! Input state
//!
//! [`InputState`] is fed [`AppEvent`]s by the frame loop and queried by the
//! camera rigs and the game. It is passed explicitly rather than living in a
//! global, so tests can build one and press keys on it directly.
//!
//! The debug GUI sets a [`GuiCapture`] mask once per frame. While a device is
//! captured, the gameplay queries for it report nothing, so typing into a
//! text field does not also fly the camera. The `raw_*` queries ignore the
//! mask and are what the GUI itself reads, along with the ordered key
//! transitions and typed text of the frame.

use std::collections::HashSet;

use crate::application::AppEvent;
use crate::foundation::math::Vec2;

bitflags::bitflags! {
    /// Devices currently claimed by the debug GUI
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct GuiCapture: u8 {
        /// The GUI wants keyboard input
        const KEYBOARD = 1 << 0;
        /// The GUI wants mouse input
        const MOUSE = 1 << 1;
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// S key
    S,
    /// W key
    W,
    /// X key
    X,
    /// Space key
    Space,
    /// Tab key
    Tab,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Left shift
    LeftShift,
    /// Left control
    LeftControl,
    /// Left alt
    LeftAlt,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Keyboard and mouse state for the current frame
#[derive(Debug, Clone)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    key_events: Vec<(KeyCode, bool)>,
    text: String,
    buttons_down: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    wheel_delta: f32,
    gui_capture: GuiCapture,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    /// Create an empty input state
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            keys_released: HashSet::new(),
            key_events: Vec::new(),
            text: String::new(),
            buttons_down: HashSet::new(),
            mouse_position: Vec2::zeros(),
            mouse_delta: Vec2::zeros(),
            wheel_delta: 0.0,
            gui_capture: GuiCapture::empty(),
        }
    }

    /// Fold an application event into the state; non-input events are ignored
    pub fn handle_event(&mut self, event: &AppEvent) {
        match *event {
            AppEvent::KeyInput { key, pressed } => self.set_key(key, pressed),
            AppEvent::TextInput { character } => self.text.push(character),
            AppEvent::MouseButton { button, pressed } => self.set_button(button, pressed),
            AppEvent::MouseMoved { x, y } => self.move_mouse(Vec2::new(x as f32, y as f32)),
            AppEvent::MouseWheel { delta_y, .. } => self.wheel_delta += delta_y as f32,
            AppEvent::WindowResized { .. } | AppEvent::WindowCloseRequested => {}
        }
    }

    /// Press or release a key
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.key_events.push((key, pressed));
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    /// Press or release a mouse button
    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons_down.insert(button);
        } else {
            self.buttons_down.remove(&button);
        }
    }

    /// Append typed characters for this frame
    pub fn type_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Move the cursor to an absolute window position
    pub fn move_mouse(&mut self, position: Vec2) {
        self.mouse_delta += position - self.mouse_position;
        self.mouse_position = position;
    }

    /// Clear per-frame edges and deltas; call after the frame is processed
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.key_events.clear();
        self.text.clear();
        self.mouse_delta = Vec2::zeros();
        self.wheel_delta = 0.0;
    }

    /// Replace the GUI capture mask for this frame
    pub fn set_gui_capture(&mut self, capture: GuiCapture) {
        self.gui_capture = capture;
    }

    /// Current GUI capture mask
    pub fn gui_capture(&self) -> GuiCapture {
        self.gui_capture
    }

    fn keyboard_free(&self) -> bool {
        !self.gui_capture.contains(GuiCapture::KEYBOARD)
    }

    fn mouse_free(&self) -> bool {
        !self.gui_capture.contains(GuiCapture::MOUSE)
    }

    /// Key held, unless the GUI owns the keyboard
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keyboard_free() && self.keys_down.contains(&key)
    }

    /// Key went down this frame, unless the GUI owns the keyboard
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keyboard_free() && self.keys_pressed.contains(&key)
    }

    /// Key went up this frame, unless the GUI owns the keyboard
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keyboard_free() && self.keys_released.contains(&key)
    }

    /// Button held, unless the GUI owns the mouse
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_free() && self.buttons_down.contains(&button)
    }

    /// Cursor movement this frame, zero while the GUI owns the mouse
    pub fn mouse_delta(&self) -> Vec2 {
        if self.mouse_free() { self.mouse_delta } else { Vec2::zeros() }
    }

    /// Wheel movement this frame, zero while the GUI owns the mouse
    pub fn wheel_delta(&self) -> f32 {
        if self.mouse_free() { self.wheel_delta } else { 0.0 }
    }

    /// Key held, ignoring GUI capture
    pub fn raw_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Button held, ignoring GUI capture
    pub fn raw_mouse_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Wheel movement this frame, ignoring GUI capture
    pub fn raw_wheel_delta(&self) -> f32 {
        self.wheel_delta
    }

    /// Key presses and releases this frame, in arrival order
    pub fn raw_key_events(&self) -> &[(KeyCode, bool)] {
        &self.key_events
    }

    /// Text typed this frame
    pub fn text_input(&self) -> &str {
        &self.text
    }

    /// Cursor position in window pixels
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_is_an_edge_down_is_a_level() {
        let mut input = InputState::new();
        input.set_key(KeyCode::Tab, true);
        assert!(input.key_pressed(KeyCode::Tab));
        assert!(input.key_down(KeyCode::Tab));

        input.end_frame();
        input.set_key(KeyCode::Tab, true);
        assert!(!input.key_pressed(KeyCode::Tab));
        assert!(input.key_down(KeyCode::Tab));

        input.set_key(KeyCode::Tab, false);
        assert!(input.key_released(KeyCode::Tab));
        assert!(!input.key_down(KeyCode::Tab));
    }

    #[test]
    fn test_gui_capture_masks_gameplay_queries() {
        let mut input = InputState::new();
        input.set_key(KeyCode::W, true);
        input.set_button(MouseButton::Left, true);
        input.move_mouse(Vec2::new(5.0, 3.0));

        input.set_gui_capture(GuiCapture::KEYBOARD);
        assert!(!input.key_down(KeyCode::W));
        assert!(input.raw_key_down(KeyCode::W));
        assert!(input.mouse_down(MouseButton::Left));

        input.set_gui_capture(GuiCapture::MOUSE);
        assert!(input.key_down(KeyCode::W));
        assert!(!input.mouse_down(MouseButton::Left));
        assert_eq!(input.mouse_delta(), Vec2::zeros());

        input.set_gui_capture(GuiCapture::empty());
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, 3.0));
    }

    #[test]
    fn test_events_update_state_and_end_frame_clears_deltas() {
        let mut input = InputState::new();
        input.handle_event(&AppEvent::MouseMoved { x: 10.0, y: 10.0 });
        input.handle_event(&AppEvent::MouseMoved { x: 12.0, y: 7.0 });
        input.handle_event(&AppEvent::KeyInput { key: KeyCode::Escape, pressed: true });
        input.handle_event(&AppEvent::MouseWheel { delta_x: 0.0, delta_y: 1.0 });

        assert_eq!(input.mouse_delta(), Vec2::new(12.0, 7.0));
        assert!(input.key_down(KeyCode::Escape));
        assert!((input.wheel_delta() - 1.0).abs() < f32::EPSILON);

        input.end_frame();
        assert_eq!(input.mouse_delta(), Vec2::zeros());
        assert_eq!(input.mouse_position(), Vec2::new(12.0, 7.0));
        assert!(input.key_down(KeyCode::Escape));
    }

    #[test]
    fn test_key_transitions_and_text_are_kept_for_one_frame() {
        let mut input = InputState::new();
        input.handle_event(&AppEvent::KeyInput { key: KeyCode::Backspace, pressed: true });
        input.handle_event(&AppEvent::TextInput { character: '4' });
        input.handle_event(&AppEvent::KeyInput { key: KeyCode::Backspace, pressed: false });
        input.type_text("2");
        input.set_gui_capture(GuiCapture::all());

        assert_eq!(input.raw_key_events(), &[(KeyCode::Backspace, true), (KeyCode::Backspace, false)]);
        assert_eq!(input.text_input(), "42");

        input.end_frame();
        assert!(input.raw_key_events().is_empty());
        assert!(input.text_input().is_empty());
    }
}
