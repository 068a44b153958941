//! Renderable entities

use crate::assets::{Material, Mesh};
use crate::foundation::collections::Handle;

use super::transform::{LocalTransform, TransformGraph, TransformId};

/// Index of an entity in the scene's entity list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// A mesh drawn with a material at a transform
///
/// The entity owns exactly one node in the [`TransformGraph`]; mesh and
/// material are shared library assets and can be swapped at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: String,
    mesh: Handle<Mesh>,
    material: Handle<Material>,
    transform: TransformId,
}

impl Entity {
    /// Create an entity with a fresh root transform
    pub fn new(
        name: impl Into<String>,
        mesh: Handle<Mesh>,
        material: Handle<Material>,
        local: LocalTransform,
        transforms: &mut TransformGraph,
    ) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            transform: transforms.insert(local),
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mesh drawn for this entity
    pub fn mesh(&self) -> Handle<Mesh> {
        self.mesh
    }

    /// Replace the mesh
    pub fn set_mesh(&mut self, mesh: Handle<Mesh>) {
        self.mesh = mesh;
    }

    /// Material used to draw the mesh
    pub fn material(&self) -> Handle<Material> {
        self.material
    }

    /// Replace the material
    pub fn set_material(&mut self, material: Handle<Material>) {
        self.material = material;
    }

    /// Node in the transform graph
    pub fn transform(&self) -> TransformId {
        self.transform
    }
}
