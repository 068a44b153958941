//! Asset storage and path resolution

use std::path::{Path, PathBuf};

use super::{Material, Mesh, Sampler, Shader, ShaderStage, Texture, TextureSet};
use crate::foundation::collections::{Handle, HandleList};

/// Ordered search roots for relative asset paths
///
/// Demos run from the workspace root, the crate directory or the build
/// output directory, so the same relative path is tried against each root
/// in turn.
#[derive(Debug, Clone, Default)]
pub struct AssetPaths {
    roots: Vec<PathBuf>,
}

impl AssetPaths {
    /// Search `roots` in order
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// First existing candidate for `relative`, or the path under the first root
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        let relative = relative.as_ref();
        if let Some(found) = self
            .roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.exists())
        {
            return found;
        }

        let fallback = self
            .roots
            .first()
            .map_or_else(|| relative.to_path_buf(), |root| root.join(relative));
        log::debug!("Asset {} not found in search paths, using {}", relative.display(), fallback.display());
        fallback
    }
}

/// Every asset the program uses, addressed by typed handles
#[derive(Debug, Default)]
pub struct AssetLibrary {
    paths: AssetPaths,
    meshes: HandleList<Mesh>,
    textures: HandleList<Texture>,
    shaders: HandleList<Shader>,
    samplers: HandleList<Sampler>,
    materials: HandleList<Material>,
}

impl AssetLibrary {
    /// Create an empty library resolving files through `paths`
    pub fn new(paths: AssetPaths) -> Self {
        Self {
            paths,
            ..Self::default()
        }
    }

    /// Register a mesh file
    pub fn load_mesh(&mut self, name: &str, relative: impl AsRef<Path>) -> Handle<Mesh> {
        let source = self.paths.resolve(relative);
        log::trace!("Mesh '{}' -> {}", name, source.display());
        self.meshes.push(Mesh { name: name.to_string(), source })
    }

    /// Register a texture file
    pub fn load_texture(&mut self, name: &str, relative: impl AsRef<Path>) -> Handle<Texture> {
        let source = self.paths.resolve(relative);
        self.textures.push(Texture { name: name.to_string(), source })
    }

    /// Register albedo/normal/roughness/metal maps named `<prefix>_<map>.png`
    pub fn load_texture_set(&mut self, name: &str, prefix: &str) -> TextureSet {
        TextureSet {
            albedo: self.load_texture(&format!("{name} Albedo"), format!("Textures/{prefix}_albedo.png")),
            normal: self.load_texture(&format!("{name} Normals"), format!("Textures/{prefix}_normals.png")),
            roughness: self.load_texture(&format!("{name} Roughness"), format!("Textures/{prefix}_roughness.png")),
            metal: self.load_texture(&format!("{name} Metal"), format!("Textures/{prefix}_metal.png")),
        }
    }

    /// Register a shader program file
    pub fn load_shader(&mut self, name: &str, stage: ShaderStage, relative: impl AsRef<Path>) -> Handle<Shader> {
        let source = self.paths.resolve(relative);
        self.shaders.push(Shader { name: name.to_string(), stage, source })
    }

    /// Register sampler state
    pub fn add_sampler(&mut self, sampler: Sampler) -> Handle<Sampler> {
        self.samplers.push(sampler)
    }

    /// Register a material
    pub fn add_material(&mut self, material: Material) -> Handle<Material> {
        self.materials.push(material)
    }

    /// Mesh lookup
    pub fn mesh(&self, handle: Handle<Mesh>) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    /// Texture lookup
    pub fn texture(&self, handle: Handle<Texture>) -> Option<&Texture> {
        self.textures.get(handle)
    }

    /// Shader lookup
    pub fn shader(&self, handle: Handle<Shader>) -> Option<&Shader> {
        self.shaders.get(handle)
    }

    /// Sampler lookup
    pub fn sampler(&self, handle: Handle<Sampler>) -> Option<&Sampler> {
        self.samplers.get(handle)
    }

    /// Material lookup
    pub fn material(&self, handle: Handle<Material>) -> Option<&Material> {
        self.materials.get(handle)
    }

    /// Mutable material lookup, used by the debug GUI
    pub fn material_mut(&mut self, handle: Handle<Material>) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }

    /// All meshes in registration order
    pub fn meshes(&self) -> &HandleList<Mesh> {
        &self.meshes
    }

    /// All textures in registration order
    pub fn textures(&self) -> &HandleList<Texture> {
        &self.textures
    }

    /// All materials in registration order
    pub fn materials(&self) -> &HandleList<Material> {
        &self.materials
    }

    /// Material by display name
    pub fn find_material(&self, name: &str) -> Option<Handle<Material>> {
        self.materials.find(|material| material.name == name)
    }

    /// Mesh by display name
    pub fn find_mesh(&self, name: &str) -> Option<Handle<Mesh>> {
        self.meshes.find(|mesh| mesh.name == name)
    }
}
