//! Debug GUI binding
//!
//! The GUI never touches the scene directly. Each frame [`GuiMirror::sync`]
//! captures a [`SceneView`], hands an editable copy to a [`DebugGui`]
//! backend, and applies the per-field difference back to the scene. Any
//! backend that can edit a `SceneView` plugs in, including a plain closure.

pub mod view_model;
pub mod egui_backend;

pub use egui_backend::EguiDebugGui;
pub use view_model::{
    AppliedEdits, CameraView, Catalog, EntityView, LightView, MaterialShaders, MaterialView, SceneView,
};

use crate::assets::AssetLibrary;
use crate::input::{GuiCapture, InputState};
use crate::scene::Scene;

/// Per-frame statistics shown by the GUI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Smoothed frames per second
    pub frame_rate: f32,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
}

/// An immediate-mode GUI editing a scene view
pub trait DebugGui {
    /// Build one frame of widgets, editing `view` in place
    ///
    /// Returns which input devices the GUI wants for itself this frame.
    fn frame(&mut self, input: &InputState, info: &FrameInfo, view: &mut SceneView) -> GuiCapture;
}

impl<F> DebugGui for F
where
    F: FnMut(&InputState, &FrameInfo, &mut SceneView) -> GuiCapture,
{
    fn frame(&mut self, input: &InputState, info: &FrameInfo, view: &mut SceneView) -> GuiCapture {
        self(input, info, view)
    }
}

/// What a sync pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuiOutcome {
    /// Devices the GUI claimed
    pub capture: GuiCapture,
    /// New light count requested through the slider
    pub light_count: Option<usize>,
    /// Number of fields written back
    pub changes: usize,
}

/// Two-way binding between a [`DebugGui`] and the scene
pub struct GuiMirror {
    gui: Box<dyn DebugGui>,
    shaders: MaterialShaders,
    max_lights: usize,
    previous_lights: Vec<LightView>,
}

impl std::fmt::Debug for GuiMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuiMirror")
            .field("shaders", &self.shaders)
            .field("max_lights", &self.max_lights)
            .finish_non_exhaustive()
    }
}

impl GuiMirror {
    /// Bind `gui` to scenes whose materials switch between `shaders`
    pub fn new(gui: Box<dyn DebugGui>, shaders: MaterialShaders, max_lights: usize) -> Self {
        Self {
            gui,
            shaders,
            max_lights,
            previous_lights: Vec::new(),
        }
    }

    /// Run one capture, edit and apply pass
    pub fn sync(
        &mut self,
        input: &InputState,
        info: &FrameInfo,
        scene: &mut Scene,
        assets: &mut AssetLibrary,
        light_count: usize,
    ) -> GuiOutcome {
        let baseline = SceneView::capture(
            scene,
            assets,
            self.shaders,
            light_count,
            self.max_lights,
            &self.previous_lights,
        );
        let mut edited = baseline.clone();
        let capture = self.gui.frame(input, info, &mut edited);
        let applied = edited.apply(&baseline, scene, assets, self.shaders);

        self.previous_lights = edited.lights;

        GuiOutcome {
            capture,
            light_count: applied.light_count,
            changes: applied.changes,
        }
    }
}
