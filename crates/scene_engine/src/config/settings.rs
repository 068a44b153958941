//! # Application Settings
//!
//! Every tunable of the demo lives here, grouped by subsystem. All sections
//! carry `#[serde(default)]`, so a config file only needs the values it
//! changes.
//!
//! ```toml
//! [window]
//! width = 1920
//! height = 1080
//!
//! [camera]
//! mode = "follow"
//!
//! [lighting]
//! initial_count = 16
//! seed = 7
//! ```

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Top-level configuration for the demo application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Window size and title
    pub window: WindowSettings,
    /// Frame loop behaviour
    pub engine: EngineSettings,
    /// Asset search paths
    pub assets: AssetSettings,
    /// Camera rig
    pub camera: CameraSettings,
    /// Light generation
    pub lighting: LightingSettings,
    /// Scripted entity motion
    pub motion: MotionSettings,
    /// Physics world and demo bodies
    pub physics: PhysicsSettings,
    /// Debug GUI
    pub gui: GuiSettings,
}

impl Config for ApplicationConfig {}

impl ApplicationConfig {
    /// Set the window size
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the camera mode
    pub fn with_camera_mode(mut self, mode: CameraMode) -> Self {
        self.camera.mode = mode;
        self
    }

    /// Seed light generation for reproducible runs
    pub fn with_light_seed(mut self, seed: u64) -> Self {
        self.lighting.seed = Some(seed);
        self
    }

    /// Set the number of lights generated at startup
    pub fn with_light_count(mut self, count: usize) -> Self {
        self.lighting.initial_count = count;
        self
    }

    /// Enable or disable the debug GUI
    pub fn with_gui(mut self, enabled: bool) -> Self {
        self.gui.enabled = enabled;
        self
    }

    /// Stop the frame loop after `frames` frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.engine.frame_limit = Some(frames);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "Window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        if self.lighting.initial_count > self.lighting.max_count {
            return Err(ConfigError::Invalid(format!(
                "Initial light count {} exceeds maximum {}",
                self.lighting.initial_count, self.lighting.max_count
            )));
        }

        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return Err(ConfigError::Invalid(format!(
                "Camera clip planes must satisfy 0 < near < far, got near={} far={}",
                self.camera.near, self.camera.far
            )));
        }

        if self.physics.worker_threads == 0 {
            return Err(ConfigError::Invalid("Physics needs at least one worker thread".to_string()));
        }

        if !(self.physics.timestep.is_finite() && self.physics.timestep > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "Physics timestep must be positive, got {}",
                self.physics.timestep
            )));
        }

        if self.motion.lower_bound >= self.motion.upper_bound {
            return Err(ConfigError::Invalid(format!(
                "Motion bounds must satisfy lower < upper, got {}..{}",
                self.motion.lower_bound, self.motion.upper_bound
            )));
        }

        Ok(())
    }

    /// Width over height of the window
    pub fn aspect_ratio(&self) -> f32 {
        self.window.width as f32 / self.window.height.max(1) as f32
    }
}

/// Window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window title
    pub title: String,
    /// Client width in pixels
    pub width: u32,
    /// Client height in pixels
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Scene Demo".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Frame loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Stop after this many frames; run until quit when absent
    pub frame_limit: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            frame_limit: None,
        }
    }
}

/// Asset lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directories searched in order for relative asset paths
    pub search_paths: Vec<String>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            search_paths: vec![
                "assets".to_string(),
                "../assets".to_string(),
                "../../Assets".to_string(),
            ],
        }
    }
}

/// Which camera rig drives the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Free-flying WASD + mouse-look camera
    FirstPerson,
    /// Camera orbiting a pivot that tracks an entity
    Follow,
}

/// Camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Rig selection
    pub mode: CameraMode,
    /// Start position of the first-person camera
    pub position: [f32; 3],
    /// Units per second
    pub move_speed: f32,
    /// Mouse-look sensitivity multiplier
    pub look_speed: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Entity index tracked by the follow rig
    pub follow_target: usize,
    /// Distance from the pivot to the follow camera
    pub follow_distance: f32,
    /// Pivot rotation per frame while an arrow key is held, in radians
    pub orbit_step: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            mode: CameraMode::FirstPerson,
            position: [0.0, 0.0, 10.0],
            move_speed: 3.0,
            look_speed: 1.0,
            fov_degrees: 45.0,
            near: 0.01,
            far: 1000.0,
            follow_target: 0,
            follow_distance: 15.0,
            orbit_step: 0.001,
        }
    }
}

/// Light generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Lights generated at startup and on regeneration
    pub initial_count: usize,
    /// Upper end of the GUI light-count slider
    pub max_count: usize,
    /// Seed for reproducible light layouts; entropy when absent
    pub seed: Option<u64>,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            initial_count: 64,
            max_count: 64,
            seed: None,
        }
    }
}

/// Scripted motion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Vertical movement of the bobbing entity per frame
    pub vertical_step: f32,
    /// Height at which a rising entity turns around
    pub upper_bound: f32,
    /// Height at which a falling entity turns around
    pub lower_bound: f32,
    /// Sideways move along the bobbing entity's own X axis per frame
    pub drift: f32,
    /// Pitch/yaw/roll added per frame to entity `i`
    pub spins: Vec<[f32; 3]>,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            vertical_step: 0.005,
            upper_bound: 2.0,
            lower_bound: -2.0,
            drift: 0.001,
            spins: vec![
                [0.0, 0.005, 0.0],
                [0.0, 0.02, 0.0],
                [0.0, 0.01, 0.0],
                [0.02, 0.0, 0.0],
            ],
        }
    }
}

/// Physics world settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Gravity acceleration
    pub gravity: [f32; 3],
    /// Fixed simulation step in seconds
    pub timestep: f32,
    /// Size of the simulation worker pool
    pub worker_threads: usize,
    /// Offset of the ground plane along +Y (plane is `y = -distance`)
    pub ground_distance: f32,
    /// Half edge length of each pyramid box
    pub box_half_extent: f32,
    /// Boxes on the bottom row of the pyramid
    pub pyramid_size: usize,
    /// Box density, mass is density times volume
    pub density: f32,
    /// Static friction coefficient
    pub static_friction: f32,
    /// Dynamic friction coefficient
    pub dynamic_friction: f32,
    /// Bounciness in `[0, 1]`
    pub restitution: f32,
    /// Spawn a cube entity per box and drive it from the body pose
    pub bind_box_entities: bool,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            worker_threads: 2,
            ground_distance: 50.0,
            box_half_extent: 0.5,
            pyramid_size: 10,
            density: 10.0,
            static_friction: 0.5,
            dynamic_friction: 0.5,
            restitution: 0.6,
            bind_box_entities: true,
        }
    }
}

/// Debug GUI settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiSettings {
    /// Run the GUI mirroring pass each frame
    pub enabled: bool,
}

impl Default for GuiSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApplicationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.lighting.initial_count, 64);
        assert_eq!(config.physics.worker_threads, 2);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = ApplicationConfig::default().with_window_size(0, 720);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ApplicationConfig::default();
        config.lighting.initial_count = 65;
        assert!(config.validate().is_err());

        let mut config = ApplicationConfig::default();
        config.physics.worker_threads = 0;
        assert!(config.validate().is_err());

        let mut config = ApplicationConfig::default();
        config.camera.near = 2000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApplicationConfig = toml::from_str(
            "[camera]\nmode = \"follow\"\n\n[lighting]\ninitial_count = 8\nseed = 3\n",
        )
        .unwrap();

        assert_eq!(config.camera.mode, CameraMode::Follow);
        assert_eq!(config.lighting.initial_count, 8);
        assert_eq!(config.lighting.seed, Some(3));
        assert_eq!(config.window.height, 720);
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let config = ApplicationConfig::default()
            .with_light_seed(42)
            .with_camera_mode(CameraMode::Follow);

        for name in ["demo.toml", "demo.ron"] {
            let path = dir.path().join(name);
            config.save_to_file(&path).unwrap();
            let loaded = ApplicationConfig::load_from_file(&path).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.json");
        let result = ApplicationConfig::default().save_to_file(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
