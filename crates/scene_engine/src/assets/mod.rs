//! Asset descriptions
//!
//! The engine does not parse model or image files; an asset here is a named
//! reference to its source file that renderer backends resolve however they
//! like. Everything is created once at startup, held in an [`AssetLibrary`]
//! and shared by [`Handle`] until shutdown.

pub mod library;

pub use library::{AssetLibrary, AssetPaths};

use std::path::PathBuf;

use crate::foundation::collections::Handle;
use crate::foundation::math::{Vec2, Vec4};

/// Triangle mesh source
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Display name
    pub name: String,
    /// Resolved model file
    pub source: PathBuf,
}

/// Texture image source
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Display name
    pub name: String,
    /// Resolved image file
    pub source: PathBuf,
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Per-vertex program
    Vertex,
    /// Per-pixel program
    Pixel,
}

/// Compiled shader program source
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    /// Display name
    pub name: String,
    /// Stage the program runs in
    pub stage: ShaderStage,
    /// Resolved program file
    pub source: PathBuf,
}

/// Texture addressing outside `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// Repeat the texture
    Wrap,
    /// Clamp to the edge texel
    Clamp,
}

/// Texture filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Trilinear filtering
    Linear,
    /// Anisotropic filtering
    Anisotropic,
}

/// Sampler state shared between materials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    /// Addressing on all three axes
    pub address: AddressMode,
    /// Filtering
    pub filter: FilterMode,
    /// Maximum anisotropy when filtering anisotropically
    pub max_anisotropy: u8,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            address: AddressMode::Wrap,
            filter: FilterMode::Anisotropic,
            max_anisotropy: 16,
        }
    }
}

/// Surface description combining shaders, tint and textures
///
/// A material counts as PBR when its pixel shader is the PBR program; there
/// is no separate flag to drift out of sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Display name
    pub name: String,
    /// Vertex program
    pub vertex_shader: Handle<Shader>,
    /// Pixel program
    pub pixel_shader: Handle<Shader>,
    /// RGBA tint
    pub color: Vec4,
    /// Specular exponent for the non-PBR pipeline
    pub shininess: f32,
    /// Texture coordinate multiplier
    pub uv_scale: Vec2,
    /// Base colour map
    pub albedo: Handle<Texture>,
    /// Tangent-space normal map
    pub normal: Handle<Texture>,
    /// Roughness map
    pub roughness: Handle<Texture>,
    /// Metalness map
    pub metal: Handle<Texture>,
    /// Sampler for all four maps
    pub sampler: Handle<Sampler>,
}

impl Material {
    /// Whether the material renders with `pbr_shader`
    pub fn is_pbr(&self, pbr_shader: Handle<Shader>) -> bool {
        self.pixel_shader == pbr_shader
    }
}

/// The four maps of a PBR texture set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSet {
    /// Base colour map
    pub albedo: Handle<Texture>,
    /// Normal map
    pub normal: Handle<Texture>,
    /// Roughness map
    pub roughness: Handle<Texture>,
    /// Metalness map
    pub metal: Handle<Texture>,
}

/// Environment cube drawn behind the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Sky {
    /// Cube mesh the faces are drawn on
    pub mesh: Handle<Mesh>,
    /// Faces in +X, -X, +Y, -Y, +Z, -Z order
    pub faces: [Handle<Texture>; 6],
    /// Sky vertex program
    pub vertex_shader: Handle<Shader>,
    /// Sky pixel program
    pub pixel_shader: Handle<Shader>,
    /// Sampler for the cube map
    pub sampler: Handle<Sampler>,
}
