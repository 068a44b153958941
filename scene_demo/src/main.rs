//! Scene demo
//!
//! Builds the demo scene and runs it headless through a scripted tour.
//! Pass a `.toml` or `.ron` config path as the first argument to override
//! the defaults.

mod script;

use scene_engine::config::{ApplicationConfig, Config};
use scene_engine::engine::Engine;
use scene_engine::foundation::logging;
use scene_engine::game::Game;
use scene_engine::gui::{DebugGui, EguiDebugGui};
use scene_engine::physics::SimplePhysicsWorld;
use scene_engine::render::HeadlessRenderer;

use script::ScriptedEvents;

/// Frames to run when the config sets no limit
const DEFAULT_FRAME_LIMIT: u64 = 600;

fn load_config() -> Result<ApplicationConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(ApplicationConfig::load_from_file(&path)?),
        None => Ok(ApplicationConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook for better error reporting
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC occurred: {panic_info}");
    }));

    let config = load_config()?;
    logging::init_with_level(&config.engine.log_level);
    log::info!("Starting scene demo: {}", config.window.title);

    let physics = SimplePhysicsWorld::new(&config.physics)?;
    let gui = config
        .gui
        .enabled
        .then(|| Box::new(EguiDebugGui::new()) as Box<dyn DebugGui>);

    let mut game = Game::new(config.clone(), Box::new(physics), gui, |setup| {
        Box::new(HeadlessRenderer::new(*setup))
    })?;

    let mut engine = Engine::new(&config.engine)
        .with_fixed_delta(config.physics.timestep)
        .with_frame_limit(config.engine.frame_limit.unwrap_or(DEFAULT_FRAME_LIMIT));
    let mut events = ScriptedEvents::demo_tour();

    match engine.run(&mut game, &mut events) {
        Ok(stats) => {
            log::info!(
                "Scene demo completed: {} frames, {:.1}s simulated, {} lights",
                stats.frames,
                stats.elapsed,
                game.scene().lights.len()
            );
            log::debug!("{} scripted events were not delivered", events.pending());
            Ok(())
        }
        Err(e) => {
            log::error!("Scene demo failed: {e}");
            Err(e.into())
        }
    }
}
