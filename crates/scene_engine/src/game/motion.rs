//! Scripted per-frame motion of the demo spheres

use crate::config::MotionSettings;
use crate::foundation::math::Vec3;
use crate::scene::Scene;

/// Deterministic animation applied to the first entities of a scene
///
/// Entity 0 drifts along its own X axis and bobs vertically between two
/// bounds; entity `i` spins by `spins[i]` every frame. The step is a fixed
/// amount per frame, not scaled by delta time.
#[derive(Debug, Clone)]
pub struct ScriptedMotion {
    vertical_step: f32,
    upper_bound: f32,
    lower_bound: f32,
    drift: f32,
    spins: Vec<Vec3>,
}

impl ScriptedMotion {
    /// Motion described by `settings`, starting upwards
    pub fn new(settings: &MotionSettings) -> Self {
        Self {
            vertical_step: settings.vertical_step,
            upper_bound: settings.upper_bound,
            lower_bound: settings.lower_bound,
            drift: settings.drift,
            spins: settings.spins.iter().copied().map(Vec3::from).collect(),
        }
    }

    /// Signed vertical step applied next frame
    pub fn vertical_step(&self) -> f32 {
        self.vertical_step
    }

    /// Advance the scene by one frame of motion
    pub fn apply(&mut self, scene: &mut Scene) {
        let transforms: Vec<_> = scene.entities.iter().map(|e| e.transform()).collect();
        let Some(&bobbing) = transforms.first() else {
            return;
        };

        if let Some(position) = scene.transforms.position(bobbing) {
            let rising = self.vertical_step > 0.0;
            if (rising && position.y >= self.upper_bound) || (!rising && position.y <= self.lower_bound) {
                self.vertical_step = -self.vertical_step;
                log::trace!("Vertical motion reversed at y = {:.3}", position.y);
            }
        }

        scene.transforms.move_relative(bobbing, Vec3::new(self.drift, 0.0, 0.0));
        scene.transforms.move_absolute(bobbing, Vec3::new(0.0, self.vertical_step, 0.0));

        for (id, spin) in transforms.iter().zip(&self.spins) {
            scene.transforms.rotate(*id, *spin);
        }
    }
}
