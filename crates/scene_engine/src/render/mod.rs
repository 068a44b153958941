//! Rendering collaborator interface
//!
//! The scene core never talks to a graphics API. Once per frame it hands a
//! [`Renderer`] a [`RenderView`] borrowing the camera, entities, lights, sky
//! and asset library; the renderer reads whatever it needs and returns.
//! Everything a renderer needs for its whole lifetime (viewport size and the
//! shared light-gizmo and PBR programs) arrives once in [`RendererSetup`].

pub mod lighting;
pub mod headless;

pub use headless::{DrawCommand, DrawKind, FrameRecord, HeadlessRenderer};
pub use lighting::{pack_lights, GpuLight, MAX_LIGHTS};

use thiserror::Error;

use crate::assets::{AssetLibrary, Mesh, Shader, Sky};
use crate::foundation::collections::Handle;
use crate::scene::{Camera, Entity, Light, Scene, TransformGraph};

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A handle did not resolve in the asset library
    #[error("Missing asset: {0}")]
    MissingAsset(String),

    /// A transform id did not resolve in the graph
    #[error("Missing transform for {0}")]
    MissingTransform(String),
}

/// Fixed inputs a renderer receives at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererSetup {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Mesh drawn at each point light
    pub light_mesh: Handle<Mesh>,
    /// Vertex program for light gizmos
    pub light_vertex_shader: Handle<Shader>,
    /// Solid-colour pixel program for light gizmos
    pub light_pixel_shader: Handle<Shader>,
    /// Pixel program that marks a material as PBR
    pub pbr_pixel_shader: Handle<Shader>,
}

/// Borrowed view of everything drawn this frame
#[derive(Clone, Copy)]
pub struct RenderView<'a> {
    /// Camera to draw from
    pub camera: &'a Camera,
    /// Transform arena for entity world matrices
    pub transforms: &'a TransformGraph,
    /// Entities in draw order
    pub entities: &'a [Entity],
    /// Lights in upload order
    pub lights: &'a [Light],
    /// Environment cube
    pub sky: &'a Sky,
    /// Asset library the handles resolve in
    pub assets: &'a AssetLibrary,
}

impl<'a> RenderView<'a> {
    /// View of a whole scene
    pub fn of(scene: &'a Scene, assets: &'a AssetLibrary) -> Self {
        Self {
            camera: scene.camera.camera(),
            transforms: &scene.transforms,
            entities: &scene.entities,
            lights: scene.lights.as_slice(),
            sky: &scene.sky,
            assets,
        }
    }
}

/// A backend that can draw a frame
pub trait Renderer {
    /// Draw one frame
    fn render(&mut self, view: &RenderView<'_>) -> Result<(), RenderError>;

    /// Adopt a new viewport size
    fn resize(&mut self, width: u32, height: u32);
}
