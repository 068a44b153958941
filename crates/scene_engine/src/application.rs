//! Application trait and lifecycle management

use thiserror::Error;

use crate::config::ConfigError;
use crate::foundation::time::FrameTime;
use crate::game::setup::SetupError;
use crate::input::{InputState, KeyCode, MouseButton};
use crate::physics::PhysicsError;
use crate::render::RenderError;

/// Per-frame data handed to [`Application::update`]
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// Timing for this frame
    pub time: FrameTime,
    /// Input accumulated since the previous frame
    pub input: &'a mut InputState,
}

/// Application lifecycle trait
///
/// Implement this trait to drive a scene with the [`Engine`](crate::engine::Engine)
/// frame loop.
pub trait Application {
    /// Update the application
    ///
    /// Called once per frame before [`draw`](Self::draw). The application may
    /// set the GUI capture mask on `frame.input`.
    fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), AppError>;

    /// Submit the frame to the renderer
    fn draw(&mut self) -> Result<(), AppError>;

    /// The window was resized
    fn resize(&mut self, width: u32, height: u32);

    /// Whether the frame loop should keep going
    fn is_running(&self) -> bool;

    /// Cleanup the application
    ///
    /// Called once when the frame loop exits.
    fn cleanup(&mut self) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Physics world failure
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    /// Renderer failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Scene setup failure
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),
}

/// Application events
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Window was resized
    WindowResized {
        /// New window width
        width: u32,
        /// New window height
        height: u32,
    },

    /// Window close requested
    WindowCloseRequested,

    /// Key input event
    KeyInput {
        /// The key that was pressed/released
        key: KeyCode,
        /// Whether the key was pressed (true) or released (false)
        pressed: bool,
    },

    /// A character was typed
    TextInput {
        /// The character, after keyboard layout and modifiers
        character: char,
    },

    /// Mouse button event
    MouseButton {
        /// The mouse button that was pressed/released
        button: MouseButton,
        /// Whether the button was pressed (true) or released (false)
        pressed: bool,
    },

    /// Mouse movement
    MouseMoved {
        /// New X coordinate
        x: f64,
        /// New Y coordinate
        y: f64,
    },

    /// Mouse wheel
    MouseWheel {
        /// Horizontal scroll delta
        delta_x: f64,
        /// Vertical scroll delta
        delta_y: f64,
    },
}

/// Source of window and input events, polled once per frame
pub trait EventSource {
    /// Events that arrived since the previous poll
    fn poll(&mut self) -> Vec<AppEvent>;
}

/// An event source that never produces events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl EventSource for NoEvents {
    fn poll(&mut self) -> Vec<AppEvent> {
        Vec::new()
    }
}
