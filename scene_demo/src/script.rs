//! Scripted input for headless runs

use scene_engine::application::{AppEvent, EventSource};
use scene_engine::input::{KeyCode, MouseButton};

/// Event source replaying a fixed schedule keyed by frame number
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    schedule: Vec<(u64, AppEvent)>,
    frame: u64,
}

impl ScriptedEvents {
    /// Empty schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` at the start of `frame`
    pub fn at(mut self, frame: u64, event: AppEvent) -> Self {
        self.schedule.push((frame, event));
        self
    }

    /// Hold `key` from `frame` for `frames` frames
    pub fn hold(self, frame: u64, frames: u64, key: KeyCode) -> Self {
        self.at(frame, AppEvent::KeyInput { key, pressed: true })
            .at(frame + frames, AppEvent::KeyInput { key, pressed: false })
    }

    /// Drag with the left button from `from` by `step` pixels per frame
    pub fn drag(mut self, frame: u64, frames: u64, from: (f64, f64), step: (f64, f64)) -> Self {
        self = self
            .at(frame, AppEvent::MouseMoved { x: from.0, y: from.1 })
            .at(frame, AppEvent::MouseButton { button: MouseButton::Left, pressed: true });
        for i in 1..=frames {
            let (x, y) = (from.0 + step.0 * i as f64, from.1 + step.1 * i as f64);
            self = self.at(frame + i, AppEvent::MouseMoved { x, y });
        }
        self.at(frame + frames + 1, AppEvent::MouseButton { button: MouseButton::Left, pressed: false })
    }

    /// The tour used by the demo binary: walk forward, regenerate the
    /// lights, orbit, look around, then resize the window
    pub fn demo_tour() -> Self {
        Self::new()
            .hold(10, 60, KeyCode::W)
            .hold(80, 20, KeyCode::Space)
            .hold(120, 1, KeyCode::Tab)
            .hold(150, 100, KeyCode::Right)
            .drag(300, 30, (640.0, 360.0), (2.0, 0.5))
            .at(400, AppEvent::WindowResized { width: 1600, height: 900 })
    }

    /// Events not yet delivered
    pub fn pending(&self) -> usize {
        self.schedule.len()
    }
}

impl EventSource for ScriptedEvents {
    fn poll(&mut self) -> Vec<AppEvent> {
        let frame = self.frame;
        self.frame += 1;

        let (due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.schedule)
            .into_iter()
            .partition(|(at, _)| *at <= frame);
        self.schedule = later;
        due.into_iter().map(|(_, event)| event).collect()
    }
}
