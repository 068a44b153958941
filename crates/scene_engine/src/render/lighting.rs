//! GPU light packing
//!
//! Shaders read lights from a constant buffer of fixed-size records. Each
//! [`GpuLight`] is 64 bytes laid out in 16-byte rows so it matches HLSL and
//! std140 packing rules without manual padding on the shader side.

use bytemuck::{Pod, Zeroable};

use crate::scene::{Light, LightKind};

/// Most lights a single frame uploads
pub const MAX_LIGHTS: usize = 128;

/// Shader-side light type codes
pub mod light_type {
    /// Directional light
    pub const DIRECTIONAL: u32 = 0;
    /// Point light
    pub const POINT: u32 = 1;
    /// Spot light
    pub const SPOT: u32 = 2;
}

/// One light as the shader sees it
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    /// See [`light_type`]
    pub kind: u32,
    /// Normalised direction for directional and spot lights
    pub direction: [f32; 3],
    /// Falloff range for point and spot lights
    pub range: f32,
    /// World position for point and spot lights
    pub position: [f32; 3],
    /// Brightness multiplier
    pub intensity: f32,
    /// Linear RGB colour
    pub color: [f32; 3],
    /// Spot cone exponent
    pub spot_falloff: f32,
    /// Keeps the record a multiple of 16 bytes
    pub padding: [f32; 3],
}

impl From<&Light> for GpuLight {
    fn from(light: &Light) -> Self {
        let kind = match light.kind() {
            LightKind::Directional => light_type::DIRECTIONAL,
            LightKind::Point => light_type::POINT,
            LightKind::Spot => light_type::SPOT,
        };
        let direction = light
            .direction()
            .and_then(|d| d.try_normalize(f32::EPSILON))
            .map_or([0.0; 3], Into::into);

        Self {
            kind,
            direction,
            range: light.range().unwrap_or(0.0),
            position: light.position().map_or([0.0; 3], Into::into),
            intensity: light.intensity(),
            color: light.color().into(),
            spot_falloff: light.spot_falloff().unwrap_or(0.0),
            padding: [0.0; 3],
        }
    }
}

/// Pack up to [`MAX_LIGHTS`] lights for upload
pub fn pack_lights(lights: &[Light]) -> Vec<GpuLight> {
    if lights.len() > MAX_LIGHTS {
        log::warn!("Dropping {} lights over the limit of {MAX_LIGHTS}", lights.len() - MAX_LIGHTS);
    }
    lights.iter().take(MAX_LIGHTS).map(GpuLight::from).collect()
}

/// Raw bytes of packed lights, ready for a buffer upload
pub fn light_bytes(lights: &[GpuLight]) -> &[u8] {
    bytemuck::cast_slice(lights)
}
