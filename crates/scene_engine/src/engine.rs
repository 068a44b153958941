//! Core frame loop
//!
//! The engine owns the clock and the input state and drives an
//! [`Application`] one frame at a time: poll events, tick, update, draw,
//! clear the per-frame input edges. It knows nothing about scenes.

use thiserror::Error;

use crate::application::{AppError, AppEvent, Application, EventSource, FrameContext};
use crate::config::EngineSettings;
use crate::foundation::time::{FrameClock, FrameTime};
use crate::input::InputState;

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStats {
    /// Frames updated and drawn
    pub frames: u64,
    /// Seconds of frame time accumulated
    pub elapsed: f32,
    /// Smoothed frame rate at exit
    pub fps: f32,
}

/// Main engine struct
///
/// The engine coordinates input, timing and the application lifecycle.
#[derive(Debug)]
pub struct Engine {
    clock: FrameClock,
    input: InputState,
    frame_limit: Option<u64>,
    fixed_delta: Option<f32>,
}

impl Engine {
    /// Create an engine from its settings
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            clock: FrameClock::new(),
            input: InputState::new(),
            frame_limit: settings.frame_limit,
            fixed_delta: None,
        }
    }

    /// Advance the clock by a constant step instead of wall time
    ///
    /// Headless runs and tests use this to get reproducible frame times.
    pub fn with_fixed_delta(mut self, delta: f32) -> Self {
        self.fixed_delta = Some(delta);
        self
    }

    /// Stop after `frames` frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Current input state
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Run the frame loop until the application stops, the window closes or
    /// the frame limit is hit
    ///
    /// [`Application::cleanup`] runs on every exit path, including errors.
    pub fn run<A, E>(&mut self, app: &mut A, events: &mut E) -> Result<EngineStats, EngineError>
    where
        A: Application + ?Sized,
        E: EventSource + ?Sized,
    {
        log::info!("Starting main loop...");
        let result = self.run_frames(app, events);
        app.cleanup();

        match &result {
            Ok(stats) => log::info!(
                "Engine shutdown complete after {} frames ({:.2}s)",
                stats.frames,
                stats.elapsed
            ),
            Err(e) => log::error!("Frame loop aborted: {e}"),
        }
        result
    }

    fn run_frames<A, E>(&mut self, app: &mut A, events: &mut E) -> Result<EngineStats, EngineError>
    where
        A: Application + ?Sized,
        E: EventSource + ?Sized,
    {
        let mut frames = 0u64;
        let mut last = FrameTime { delta: 0.0, total: 0.0, frame: 0, fps: 0.0 };

        while app.is_running() {
            if self.frame_limit.is_some_and(|limit| frames >= limit) {
                log::info!("Frame limit of {frames} reached");
                break;
            }

            if !self.pump_events(app, events) {
                log::info!("Window close requested");
                break;
            }

            last = match self.fixed_delta {
                Some(delta) => self.clock.advance(delta),
                None => self.clock.tick(),
            };

            let mut frame = FrameContext { time: last, input: &mut self.input };
            app.update(&mut frame)?;
            app.draw()?;
            self.input.end_frame();
            frames += 1;
        }

        Ok(EngineStats { frames, elapsed: last.total, fps: last.fps })
    }

    /// Feed pending events into the input state; false when the window closed
    fn pump_events<A, E>(&mut self, app: &mut A, events: &mut E) -> bool
    where
        A: Application + ?Sized,
        E: EventSource + ?Sized,
    {
        let mut open = true;
        for event in events.poll() {
            match event {
                AppEvent::WindowResized { width, height } => app.resize(width, height),
                AppEvent::WindowCloseRequested => open = false,
                _ => {}
            }
            self.input.handle_event(&event);
        }
        open
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// The application failed during a frame
    #[error("Application error: {0}")]
    Application(#[from] AppError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::NoEvents;
    use crate::input::KeyCode;
    use crate::render::RenderError;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder {
        updates: u64,
        draws: u64,
        resizes: Vec<(u32, u32)>,
        escape_seen: bool,
        stop_after: Option<u64>,
        fail_on: Option<u64>,
        cleaned_up: bool,
    }

    impl Application for Recorder {
        fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), AppError> {
            self.updates += 1;
            self.escape_seen |= frame.input.key_pressed(KeyCode::Escape);
            if self.fail_on == Some(self.updates) {
                return Err(AppError::Render(RenderError::MissingAsset("boom".to_string())));
            }
            Ok(())
        }

        fn draw(&mut self) -> Result<(), AppError> {
            self.draws += 1;
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
        }

        fn is_running(&self) -> bool {
            self.stop_after.map_or(true, |n| self.updates < n)
        }

        fn cleanup(&mut self) {
            self.cleaned_up = true;
        }
    }

    struct Scripted(Vec<Vec<AppEvent>>);

    impl EventSource for Scripted {
        fn poll(&mut self) -> Vec<AppEvent> {
            if self.0.is_empty() { Vec::new() } else { self.0.remove(0) }
        }
    }

    #[test]
    fn test_frame_limit_stops_loop() {
        let mut engine = Engine::new(&EngineSettings::default()).with_fixed_delta(0.5).with_frame_limit(4);
        let mut app = Recorder::default();

        let stats = engine.run(&mut app, &mut NoEvents).unwrap();

        assert_eq!(stats.frames, 4);
        assert_eq!(app.updates, 4);
        assert_eq!(app.draws, 4);
        assert_relative_eq!(stats.elapsed, 2.0);
        assert!(app.cleaned_up);
    }

    #[test]
    fn test_application_can_stop_itself() {
        let mut engine = Engine::new(&EngineSettings::default()).with_fixed_delta(0.1);
        let mut app = Recorder { stop_after: Some(3), ..Recorder::default() };

        let stats = engine.run(&mut app, &mut NoEvents).unwrap();

        assert_eq!(stats.frames, 3);
    }

    #[test]
    fn test_events_reach_input_and_resize() {
        let mut engine = Engine::new(&EngineSettings::default()).with_fixed_delta(0.1).with_frame_limit(3);
        let mut app = Recorder::default();
        let mut events = Scripted(vec![
            vec![AppEvent::WindowResized { width: 800, height: 600 }],
            vec![AppEvent::KeyInput { key: KeyCode::Escape, pressed: true }],
        ]);

        engine.run(&mut app, &mut events).unwrap();

        assert_eq!(app.resizes, vec![(800, 600)]);
        assert!(app.escape_seen);
        // Edges are cleared at the end of each frame
        assert!(!engine.input().key_pressed(KeyCode::Escape));
        assert!(engine.input().key_down(KeyCode::Escape));
    }

    #[test]
    fn test_close_request_ends_before_update() {
        let mut engine = Engine::new(&EngineSettings::default()).with_fixed_delta(0.1).with_frame_limit(10);
        let mut app = Recorder::default();
        let mut events = Scripted(vec![vec![], vec![AppEvent::WindowCloseRequested]]);

        let stats = engine.run(&mut app, &mut events).unwrap();

        assert_eq!(stats.frames, 1);
        assert!(app.cleaned_up);
    }

    #[test]
    fn test_errors_propagate_after_cleanup() {
        let mut engine = Engine::new(&EngineSettings::default()).with_fixed_delta(0.1);
        let mut app = Recorder { fail_on: Some(2), ..Recorder::default() };

        let result = engine.run(&mut app, &mut NoEvents);

        assert!(matches!(result, Err(EngineError::Application(AppError::Render(_)))));
        assert!(app.cleaned_up);
        assert_eq!(app.draws, 1);
    }
}
