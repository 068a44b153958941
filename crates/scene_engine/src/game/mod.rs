//! Scene controller
//!
//! [`Game`] owns the demo scene and its collaborators and implements
//! [`Application`]. Each update runs, in order: scripted motion, the GUI
//! binding pass, the camera rig, the quit and regenerate keys, one blocking
//! physics step and the physics write-back. Drawing hands the scene to the
//! renderer unchanged.

pub mod motion;
pub mod setup;

pub use motion::ScriptedMotion;
pub use setup::{BodyBinding, DemoAssets, SetupError};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::application::{AppError, Application, FrameContext};
use crate::assets::{AssetLibrary, AssetPaths};
use crate::config::{ApplicationConfig, CameraMode};
use crate::foundation::math::Vec3;
use crate::gui::{DebugGui, FrameInfo, GuiMirror};
use crate::input::KeyCode;
use crate::physics::{self, PhysicsWorld};
use crate::render::{RenderView, Renderer, RendererSetup};
use crate::scene::{Camera, CameraRig, Scene, TransformGraph};

/// The demo scene and everything that drives it
pub struct Game {
    config: ApplicationConfig,
    assets: AssetLibrary,
    demo: DemoAssets,
    scene: Scene,
    motion: ScriptedMotion,
    physics: Box<dyn PhysicsWorld>,
    bindings: Vec<BodyBinding>,
    renderer: Box<dyn Renderer>,
    gui: Option<GuiMirror>,
    rng: StdRng,
    light_count: usize,
    width: u32,
    height: u32,
    running: bool,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("entities", &self.scene.entities.len())
            .field("lights", &self.scene.lights.len())
            .field("bodies", &self.bindings.len())
            .field("viewport", &(self.width, self.height))
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Build the demo scene
    ///
    /// `make_renderer` receives the renderer's fixed inputs once the assets
    /// are loaded. `gui` is ignored when the GUI is disabled in `config`.
    pub fn new<F>(
        config: ApplicationConfig,
        mut physics: Box<dyn PhysicsWorld>,
        gui: Option<Box<dyn DebugGui>>,
        make_renderer: F,
    ) -> Result<Self, AppError>
    where
        F: FnOnce(&RendererSetup) -> Box<dyn Renderer>,
    {
        config.validate()?;
        log::info!("Building demo scene...");

        let mut assets = AssetLibrary::new(AssetPaths::new(&config.assets.search_paths));
        let demo = setup::load_demo_assets(&mut assets);

        let aspect = config.aspect_ratio();
        let mut transforms = TransformGraph::new();
        let camera = Camera::new(&mut transforms, Vec3::from(config.camera.position), aspect, &config.camera);
        let mut scene = Scene::new(transforms, CameraRig::FirstPerson(camera), demo.sky.clone());

        let spheres = setup::spawn_spheres(&mut scene, &demo)?;

        if config.camera.mode == CameraMode::Follow {
            let target = spheres
                .get(config.camera.follow_target)
                .and_then(|id| scene.entity_transform(*id));
            let rig = setup::build_camera_rig(&mut scene.transforms, &config.camera, aspect, target);
            scene.set_camera(rig);
        }

        let mut rng = config
            .lighting
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let light_count = config.lighting.initial_count;
        scene.lights.generate(light_count, &mut rng);

        let bindings = setup::spawn_physics_scene(&config.physics, physics.as_mut(), &mut scene, &demo)?;

        let renderer = make_renderer(&demo.renderer_setup(config.window.width, config.window.height));

        let gui = if config.gui.enabled {
            gui.map(|gui| GuiMirror::new(gui, demo.material_shaders(), config.lighting.max_count))
        } else {
            None
        };

        log::info!(
            "Scene ready: {} entities, {} lights, {} camera",
            scene.entities.len(),
            scene.lights.len(),
            scene.camera.label()
        );

        Ok(Self {
            motion: ScriptedMotion::new(&config.motion),
            width: config.window.width,
            height: config.window.height,
            config,
            assets,
            demo,
            scene,
            physics,
            bindings,
            renderer,
            gui,
            rng,
            light_count,
            running: true,
        })
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Registered assets
    pub fn assets(&self) -> &AssetLibrary {
        &self.assets
    }

    /// Handles of the demo's own assets
    pub fn demo_assets(&self) -> &DemoAssets {
        &self.demo
    }

    /// The physics world
    pub fn physics(&self) -> &dyn PhysicsWorld {
        self.physics.as_ref()
    }

    /// Bodies whose poses drive entities
    pub fn bindings(&self) -> &[BodyBinding] {
        &self.bindings
    }

    /// Scripted motion state
    pub fn motion(&self) -> &ScriptedMotion {
        &self.motion
    }

    /// Configured number of lights
    pub fn light_count(&self) -> usize {
        self.light_count
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether a debug GUI is bound
    pub fn has_gui(&self) -> bool {
        self.gui.is_some()
    }

    /// Rebuild the light set from scratch
    pub fn regenerate_lights(&mut self) {
        self.scene.lights.generate(self.light_count, &mut self.rng);
        log::info!("Regenerated {} lights", self.scene.lights.len());
    }

    /// Change the number of lights, keeping existing ones
    pub fn set_light_count(&mut self, count: usize) {
        let count = count.min(self.config.lighting.max_count);
        self.light_count = count;
        self.scene.lights.resize(count, &mut self.rng);
        log::debug!("Light count set to {count}");
    }

    /// Stop the frame loop after this frame
    pub fn quit(&mut self) {
        log::info!("Quit requested");
        self.running = false;
    }
}

impl Application for Game {
    fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), AppError> {
        self.motion.apply(&mut self.scene);

        if let Some(gui) = self.gui.as_mut() {
            let info = FrameInfo {
                frame_rate: frame.time.fps,
                width: self.width,
                height: self.height,
            };
            let outcome = gui.sync(frame.input, &info, &mut self.scene, &mut self.assets, self.light_count);
            frame.input.set_gui_capture(outcome.capture);
            if let Some(count) = outcome.light_count {
                self.set_light_count(count);
            }
        }

        self.scene
            .camera
            .update(frame.time.delta, frame.input, &mut self.scene.transforms);

        if frame.input.key_down(KeyCode::Escape) {
            self.quit();
        }
        if frame.input.key_pressed(KeyCode::Tab) {
            self.regenerate_lights();
        }

        physics::step(self.physics.as_mut(), self.config.physics.timestep)?;
        let synced = setup::sync_bodies(&self.bindings, self.physics.as_ref(), &mut self.scene);
        log::trace!("Frame {}: {synced} bodies synced", frame.time.frame);

        Ok(())
    }

    fn draw(&mut self) -> Result<(), AppError> {
        let view = RenderView::of(&self.scene, &self.assets);
        self.renderer.render(&view)?;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return;
        }
        self.width = width;
        self.height = height;
        self.renderer.resize(width, height);
        self.scene
            .camera
            .camera_mut()
            .update_projection_matrix(width as f32 / height as f32);
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn cleanup(&mut self) {
        log::info!(
            "Shutting down: {} entities, {} lights, {} bodies",
            self.scene.entities.len(),
            self.scene.lights.len(),
            self.physics.body_count()
        );
    }
}
