//! Headless renderer
//!
//! Resolves every draw the way a GPU backend would (handles, world and
//! normal matrices, packed light buffer) and records the result instead of
//! submitting it. Useful for running the demo without a window and for
//! asserting on what would have been drawn.

use crate::assets::{Mesh, Shader};
use crate::foundation::collections::Handle;
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::scene::Light;

use super::lighting::{light_bytes, pack_lights, GpuLight};
use super::{RenderError, RenderView, Renderer, RendererSetup};

/// Gizmo sphere radius per unit of light range
const GIZMO_SCALE_PER_RANGE: f32 = 0.1;

/// What a draw command is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    /// Entity at this index
    Entity(usize),
    /// Marker for the point light at this index
    LightGizmo(usize),
    /// Environment cube
    Sky,
}

/// One resolved draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// What is drawn
    pub kind: DrawKind,
    /// Mesh
    pub mesh: Handle<Mesh>,
    /// Vertex program
    pub vertex_shader: Handle<Shader>,
    /// Pixel program
    pub pixel_shader: Handle<Shader>,
    /// Object-to-world matrix
    pub world: Mat4,
    /// Inverse-transpose of `world`
    pub world_inverse_transpose: Mat4,
    /// Tint passed to the pixel program
    pub color: Vec4,
    /// Whether the PBR parameters are bound
    pub pbr: bool,
}

/// Everything recorded for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Viewport size
    pub viewport: (u32, u32),
    /// World-to-view
    pub view: Mat4,
    /// View-to-clip
    pub projection: Mat4,
    /// Draws in submission order: entities, light gizmos, sky
    pub draws: Vec<DrawCommand>,
    /// Packed light records
    pub lights: Vec<GpuLight>,
    /// Size of the light buffer upload in bytes
    pub light_buffer_bytes: usize,
}

impl FrameRecord {
    /// Draws of one kind class
    pub fn count(&self, matches: impl Fn(&DrawKind) -> bool) -> usize {
        self.draws.iter().filter(|draw| matches(&draw.kind)).count()
    }
}

/// Renderer that records frames instead of drawing them
#[derive(Debug)]
pub struct HeadlessRenderer {
    setup: RendererSetup,
    frames_rendered: u64,
    last_frame: Option<FrameRecord>,
}

impl HeadlessRenderer {
    /// Create a renderer with its fixed setup
    pub fn new(setup: RendererSetup) -> Self {
        log::info!("Headless renderer created at {}x{}", setup.width, setup.height);
        Self {
            setup,
            frames_rendered: 0,
            last_frame: None,
        }
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        (self.setup.width, self.setup.height)
    }

    /// Frames rendered so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Record of the most recent frame
    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.last_frame.as_ref()
    }

    fn entity_draws(&self, view: &RenderView<'_>, draws: &mut Vec<DrawCommand>) -> Result<(), RenderError> {
        for (index, entity) in view.entities.iter().enumerate() {
            let material = view.assets.material(entity.material()).ok_or_else(|| {
                RenderError::MissingAsset(format!("material {:?} of entity '{}'", entity.material(), entity.name()))
            })?;
            if view.assets.mesh(entity.mesh()).is_none() {
                return Err(RenderError::MissingAsset(format!(
                    "mesh {:?} of entity '{}'",
                    entity.mesh(),
                    entity.name()
                )));
            }

            let world = view
                .transforms
                .world_matrix(entity.transform())
                .ok_or_else(|| RenderError::MissingTransform(entity.name().to_string()))?;
            let world_inverse_transpose = view
                .transforms
                .world_inverse_transpose(entity.transform())
                .unwrap_or_else(Mat4::identity);

            draws.push(DrawCommand {
                kind: DrawKind::Entity(index),
                mesh: entity.mesh(),
                vertex_shader: material.vertex_shader,
                pixel_shader: material.pixel_shader,
                world,
                world_inverse_transpose,
                color: material.color,
                pbr: material.is_pbr(self.setup.pbr_pixel_shader),
            });
        }
        Ok(())
    }

    fn light_gizmos(&self, view: &RenderView<'_>, draws: &mut Vec<DrawCommand>) {
        for (index, light) in view.lights.iter().enumerate() {
            let Light::Point { position, range, .. } = *light else {
                continue;
            };

            let world = Mat4::new_translation(&position) * Mat4::new_scaling(range * GIZMO_SCALE_PER_RANGE);
            let tint = light.color() * light.intensity();
            draws.push(DrawCommand {
                kind: DrawKind::LightGizmo(index),
                mesh: self.setup.light_mesh,
                vertex_shader: self.setup.light_vertex_shader,
                pixel_shader: self.setup.light_pixel_shader,
                world,
                world_inverse_transpose: world.try_inverse().unwrap_or_else(Mat4::identity).transpose(),
                color: Vec4::new(tint.x, tint.y, tint.z, 1.0),
                pbr: false,
            });
        }
    }

    fn sky_draw(view: &RenderView<'_>) -> DrawCommand {
        let eye = view
            .transforms
            .world_position(view.camera.transform())
            .unwrap_or_else(Vec3::zeros);
        let world = Mat4::new_translation(&eye);
        DrawCommand {
            kind: DrawKind::Sky,
            mesh: view.sky.mesh,
            vertex_shader: view.sky.vertex_shader,
            pixel_shader: view.sky.pixel_shader,
            world,
            world_inverse_transpose: Mat4::identity(),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            pbr: false,
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, view: &RenderView<'_>) -> Result<(), RenderError> {
        let mut draws = Vec::with_capacity(view.entities.len() + view.lights.len() + 1);
        self.entity_draws(view, &mut draws)?;
        self.light_gizmos(view, &mut draws);
        draws.push(Self::sky_draw(view));

        let lights = pack_lights(view.lights);
        let light_buffer_bytes = light_bytes(&lights).len();

        log::trace!(
            "Frame {}: {} draws, {} lights ({} bytes)",
            self.frames_rendered + 1,
            draws.len(),
            lights.len(),
            light_buffer_bytes
        );

        self.last_frame = Some(FrameRecord {
            viewport: self.viewport(),
            view: view.camera.view(),
            projection: view.camera.projection(),
            draws,
            lights,
            light_buffer_bytes,
        });
        self.frames_rendered += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return;
        }
        self.setup.width = width;
        self.setup.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::setup::tests::demo_scene_with_assets;
    use crate::render::lighting::light_type;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_record_layout() {
        let (mut scene, assets, demo) = demo_scene_with_assets();
        scene.lights.push(Light::directional(Vec3::new(0.0, -2.0, 0.0), Vec3::repeat(1.0), 1.0));
        scene.lights.push(Light::point(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 0.0, 0.0), 2.0, 8.0));
        let mut renderer = HeadlessRenderer::new(demo.renderer_setup(1280, 720));

        renderer.render(&RenderView::of(&scene, &assets)).unwrap();

        let frame = renderer.last_frame().unwrap();
        assert_eq!(renderer.frames_rendered(), 1);
        assert_eq!(frame.count(|k| matches!(k, DrawKind::Entity(_))), 5);
        assert_eq!(frame.count(|k| matches!(k, DrawKind::LightGizmo(_))), 1);
        assert_eq!(frame.draws.last().unwrap().kind, DrawKind::Sky);
        assert_eq!(frame.lights.len(), 2);
        assert_eq!(frame.light_buffer_bytes, 2 * 64);
        assert_eq!(frame.lights[0].kind, light_type::DIRECTIONAL);
        assert_relative_eq!(frame.lights[0].direction[1], -1.0);

        let gizmo = &frame.draws[5];
        assert_eq!(gizmo.kind, DrawKind::LightGizmo(1));
        assert_eq!(gizmo.pixel_shader, demo.shaders.solid_color);
        assert_relative_eq!(gizmo.world[(0, 0)], 0.8);
        assert_relative_eq!(gizmo.color, Vec4::new(2.0, 0.0, 0.0, 1.0));

        let root = &frame.draws[0];
        assert!(root.pbr);
        assert_relative_eq!(root.world[(0, 0)], 3.0);
        assert_relative_eq!(root.world_inverse_transpose[(0, 0)], 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sky_follows_camera() {
        let (scene, assets, demo) = demo_scene_with_assets();
        let mut renderer = HeadlessRenderer::new(demo.renderer_setup(640, 480));

        renderer.render(&RenderView::of(&scene, &assets)).unwrap();

        let sky = renderer.last_frame().unwrap().draws.last().unwrap().clone();
        assert_eq!(sky.mesh, demo.meshes.cube);
        let eye = Vec3::new(sky.world[(0, 3)], sky.world[(1, 3)], sky.world[(2, 3)]);
        assert_relative_eq!(eye, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_missing_material_is_an_error() {
        let (mut scene, assets, demo) = demo_scene_with_assets();
        // A handle from a larger library does not resolve in the scene's one
        let template = assets.material(scene.entities[0].material()).unwrap().clone();
        let mut other = crate::assets::AssetLibrary::default();
        let bogus = (0..20).map(|_| other.add_material(template.clone())).last().unwrap();
        scene.entities[0].set_material(bogus);
        let mut renderer = HeadlessRenderer::new(demo.renderer_setup(640, 480));

        let result = renderer.render(&RenderView::of(&scene, &assets));

        assert!(matches!(result, Err(RenderError::MissingAsset(_))));
        assert_eq!(renderer.frames_rendered(), 0);
    }

    #[test]
    fn test_resize_ignores_empty_viewport() {
        let (_, _, demo) = demo_scene_with_assets();
        let mut renderer = HeadlessRenderer::new(demo.renderer_setup(640, 480));

        renderer.resize(0, 10);
        assert_eq!(renderer.viewport(), (640, 480));
        renderer.resize(1024, 768);
        assert_eq!(renderer.viewport(), (1024, 768));
    }
}
