//! # Scene Engine
//!
//! Scene core for a small real-time 3D rendering demo.
//!
//! ## Features
//!
//! - **Transform Graph**: Parent/child hierarchy with lazily cached world matrices
//! - **Camera Rigs**: Free-flying first-person camera and a pivot-follow orbit camera
//! - **Lighting**: Directional, point and spot lights packed for GPU upload
//! - **Physics Seam**: Fixed-step rigid-body world behind a trait, with a bundled worker-pool implementation
//! - **Debug GUI**: Per-frame two-way binding between the scene and an egui inspector
//! - **Headless Rendering**: Renderer trait plus a recording backend that needs no GPU
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::default().with_frame_limit(600);
//!     scene_engine::foundation::logging::init_with_level(&config.engine.log_level);
//!
//!     let physics = SimplePhysicsWorld::new(&config.physics)?;
//!     let gui: Box<dyn DebugGui> = Box::new(EguiDebugGui::new());
//!     let mut game = Game::new(config.clone(), Box::new(physics), Some(gui), |setup| {
//!         Box::new(HeadlessRenderer::new(*setup))
//!     })?;
//!
//!     let stats = Engine::new(&config.engine).run(&mut game, &mut NoEvents)?;
//!     println!("Rendered {} frames", stats.frames);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod input;
pub mod assets;
pub mod scene;
pub mod physics;
pub mod render;
pub mod gui;
pub mod game;

pub mod application;
pub mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError, EngineStats};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, Application,
        application::{AppEvent, EventSource, FrameContext, NoEvents},
        Engine, EngineError, EngineStats,
        foundation::{
            math::{Mat4, Quat, Vec3},
            time::{FrameClock, FrameTime},
        },
        config::{ApplicationConfig, CameraMode, Config},
        input::{GuiCapture, InputState, KeyCode, MouseButton},
        assets::{AssetLibrary, Material, Mesh},
        scene::{Camera, CameraRig, Entity, Light, LightSet, Scene, TransformGraph, TransformId},
        physics::{PhysicsWorld, SimplePhysicsWorld},
        render::{HeadlessRenderer, RenderView, Renderer, RendererSetup},
        gui::{DebugGui, EguiDebugGui},
        game::Game,
    };
}
