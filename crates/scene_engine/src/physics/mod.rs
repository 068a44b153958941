//! Physics collaborator interface
//!
//! The game talks to physics through [`PhysicsWorld`]: it creates bodies
//! once at setup and then advances the world by one fixed step per frame.
//! A step is split into `simulate` (kick off work, possibly on other
//! threads) and `fetch_results` (wait for and publish the results); the
//! game always calls [`step`], which does both and blocks, so no body state
//! is read while a step is in flight.
//!
//! [`SimplePhysicsWorld`] is the bundled implementation.

pub mod simple;

pub use simple::SimplePhysicsWorld;

use thiserror::Error;

use crate::config::PhysicsSettings;
use crate::foundation::math::{Quat, Vec3};

/// Surface response coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsMaterial {
    /// Friction coefficient when at rest
    pub static_friction: f32,
    /// Friction coefficient when sliding
    pub dynamic_friction: f32,
    /// Bounciness in `[0, 1]`
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            static_friction: 0.5,
            dynamic_friction: 0.5,
            restitution: 0.6,
        }
    }
}

impl PhysicsMaterial {
    /// Coefficients from settings
    pub fn from_settings(settings: &PhysicsSettings) -> Self {
        Self {
            static_friction: settings.static_friction,
            dynamic_friction: settings.dynamic_friction,
            restitution: settings.restitution,
        }
    }

    /// Coefficients for a contact between two materials, averaged
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            static_friction: (self.static_friction + other.static_friction) * 0.5,
            dynamic_friction: (self.dynamic_friction + other.dynamic_friction) * 0.5,
            restitution: (self.restitution + other.restitution) * 0.5,
        }
    }
}

/// Infinite static plane `normal . x + distance = 0`; bodies rest on the
/// side the normal points to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneDesc {
    /// Unit normal
    pub normal: Vec3,
    /// Signed offset along the normal
    pub distance: f32,
    /// Surface response
    pub material: PhysicsMaterial,
}

/// Dynamic box body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDesc {
    /// Initial world position of the centre
    pub position: Vec3,
    /// Initial world orientation
    pub rotation: Quat,
    /// Half edge lengths
    pub half_extents: Vec3,
    /// Mass per unit volume
    pub density: f32,
    /// Surface response
    pub material: PhysicsMaterial,
}

/// Reference to a dynamic body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) usize);

impl BodyHandle {
    /// Creation index of the body
    pub fn index(self) -> usize {
        self.0
    }
}

/// World-space placement of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    /// Centre of mass
    pub position: Vec3,
    /// Orientation
    pub rotation: Quat,
}

/// Physics errors
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// A world needs at least one worker
    #[error("Physics world needs at least one worker thread")]
    NoWorkers,

    /// Spawning a worker thread failed
    #[error("Failed to spawn physics worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// A worker exited before delivering its results
    #[error("Physics worker disconnected")]
    WorkerDisconnected,

    /// `simulate` was called while a step was still in flight
    #[error("A simulation step is already in progress")]
    StepInProgress,

    /// Timesteps must be positive and finite
    #[error("Invalid timestep: {0}")]
    InvalidTimestep(f32),

    /// Body parameters that cannot be simulated
    #[error("Invalid body: {0}")]
    InvalidBody(String),
}

/// Rigid-body world driven one fixed step at a time
pub trait PhysicsWorld {
    /// Gravity acceleration applied to dynamic bodies
    fn gravity(&self) -> Vec3;

    /// Add an immovable plane
    fn add_static_plane(&mut self, plane: PlaneDesc) -> Result<(), PhysicsError>;

    /// Add a dynamic box and return its handle
    fn add_dynamic_box(&mut self, body: BoxDesc) -> Result<BodyHandle, PhysicsError>;

    /// Start advancing the world by `timestep` seconds
    fn simulate(&mut self, timestep: f32) -> Result<(), PhysicsError>;

    /// Publish the results of the step started by `simulate`
    ///
    /// Returns whether the results are available. With `block` set this
    /// waits until they are. Without a step in flight it returns `Ok(true)`
    /// immediately.
    fn fetch_results(&mut self, block: bool) -> Result<bool, PhysicsError>;

    /// Current pose of a dynamic body; `None` while a step is in flight or
    /// for unknown handles
    fn body_pose(&self, body: BodyHandle) -> Option<BodyPose>;

    /// Number of dynamic bodies
    fn body_count(&self) -> usize;
}

/// Advance `world` by one step and wait for the results
pub fn step(world: &mut dyn PhysicsWorld, timestep: f32) -> Result<(), PhysicsError> {
    world.simulate(timestep)?;
    world.fetch_results(true)?;
    Ok(())
}
