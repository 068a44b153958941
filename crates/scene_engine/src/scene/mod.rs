//! Scene management
//!
//! A [`Scene`] aggregates everything a frame draws: the transform arena, the
//! entity list, the lights, the active camera rig and the sky. Following
//! Game Engine Architecture Chapter 11.2.7.4, the hierarchy lives in the
//! transform graph and everything else refers into it by id.

pub mod transform;
pub mod entity;
pub mod camera;
pub mod follow_camera;
pub mod light;

pub use camera::Camera;
pub use entity::{Entity, EntityId};
pub use follow_camera::FollowCamera;
pub use light::{Light, LightKind, LightSet};
pub use transform::{LocalTransform, TransformGraph, TransformId};

use crate::assets::{Material, Mesh, Sky};
use crate::foundation::collections::Handle;
use crate::input::InputState;

/// The camera rig driving the view
#[derive(Debug, Clone)]
pub enum CameraRig {
    /// Free-flying camera
    FirstPerson(Camera),
    /// Camera orbiting a tracked entity
    Follow(FollowCamera),
}

impl CameraRig {
    /// The camera to render with
    pub fn camera(&self) -> &Camera {
        match self {
            Self::FirstPerson(camera) => camera,
            Self::Follow(follow) => follow.camera(),
        }
    }

    /// Mutable access to the camera, for projection updates
    pub fn camera_mut(&mut self) -> &mut Camera {
        match self {
            Self::FirstPerson(camera) => camera,
            Self::Follow(follow) => follow.camera_mut(),
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstPerson(_) => "First-Person Controllable",
            Self::Follow(_) => "Pivot-Follow",
        }
    }

    /// Run the rig's per-frame controls
    pub fn update(&mut self, delta_time: f32, input: &InputState, transforms: &mut TransformGraph) {
        match self {
            Self::FirstPerson(camera) => camera.update(delta_time, input, transforms),
            Self::Follow(follow) => follow.update(input, transforms),
        }
    }
}

/// Everything drawn in a frame
#[derive(Debug)]
pub struct Scene {
    /// Arena owning every transform in the scene
    pub transforms: TransformGraph,
    /// Entities in creation order; the order is stable for the scene's life
    pub entities: Vec<Entity>,
    /// Lights in render order
    pub lights: LightSet,
    /// Active camera rig
    pub camera: CameraRig,
    /// Environment cube
    pub sky: Sky,
}

impl Scene {
    /// Create a scene around an existing transform graph and camera
    pub fn new(transforms: TransformGraph, camera: CameraRig, sky: Sky) -> Self {
        Self {
            transforms,
            entities: Vec::new(),
            lights: LightSet::new(),
            camera,
            sky,
        }
    }

    /// Add an entity with a fresh root transform
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        mesh: Handle<Mesh>,
        material: Handle<Material>,
        local: LocalTransform,
    ) -> EntityId {
        let entity = Entity::new(name, mesh, material, local, &mut self.transforms);
        self.entities.push(entity);
        EntityId(self.entities.len() - 1)
    }

    /// Entity lookup
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    /// Mutable entity lookup
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    /// Transform of an entity
    pub fn entity_transform(&self, id: EntityId) -> Option<TransformId> {
        self.entity(id).map(Entity::transform)
    }

    /// Parent `child` under `parent` in the transform hierarchy
    pub fn attach(&mut self, parent: EntityId, child: EntityId) {
        if let (Some(parent), Some(child)) = (self.entity_transform(parent), self.entity_transform(child)) {
            self.transforms.add_child(parent, child);
        }
    }

    /// Replace the camera rig, releasing the old rig's transforms
    pub fn set_camera(&mut self, camera: CameraRig) {
        let previous = std::mem::replace(&mut self.camera, camera);
        match previous {
            CameraRig::FirstPerson(camera) => {
                self.transforms.remove(camera.transform());
            }
            CameraRig::Follow(follow) => {
                self.transforms.remove(follow.camera().transform());
                self.transforms.remove(follow.pivot());
            }
        }
    }
}
