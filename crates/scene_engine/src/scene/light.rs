//! Scene lights
//!
//! Lights are plain values; a [`LightSet`] is the ordered list the renderer
//! consumes. The demo layout is three fixed directional lights followed by
//! randomly placed point lights.

use rand::Rng;

use crate::foundation::math::Vec3;

/// Discriminant of a [`Light`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Infinitely distant light
    Directional,
    /// Omnidirectional light with a falloff range
    Point,
    /// Cone light with range and angular falloff
    Spot,
}

impl LightKind {
    /// All kinds in GUI order
    pub const ALL: [Self; 3] = [Self::Directional, Self::Point, Self::Spot];

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Self::Directional => "Directional",
            Self::Point => "Point",
            Self::Spot => "Spot",
        }
    }
}

/// A light source; each kind carries only the fields it uses
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Parallel rays along `direction`
    Directional {
        /// Direction the light travels, not necessarily normalised
        direction: Vec3,
        /// Linear RGB colour
        color: Vec3,
        /// Brightness multiplier
        intensity: f32,
    },
    /// Light radiating from `position`
    Point {
        /// World position
        position: Vec3,
        /// Linear RGB colour
        color: Vec3,
        /// Brightness multiplier
        intensity: f32,
        /// Distance at which the contribution reaches zero
        range: f32,
    },
    /// Cone of light from `position` along `direction`
    Spot {
        /// World position
        position: Vec3,
        /// Cone axis
        direction: Vec3,
        /// Linear RGB colour
        color: Vec3,
        /// Brightness multiplier
        intensity: f32,
        /// Distance at which the contribution reaches zero
        range: f32,
        /// Exponent sharpening the cone edge
        spot_falloff: f32,
    },
}

impl Light {
    /// Directional light
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self::Directional { direction, color, intensity }
    }

    /// Point light
    pub fn point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self::Point { position, color, intensity, range }
    }

    /// Kind of this light
    pub fn kind(&self) -> LightKind {
        match self {
            Self::Directional { .. } => LightKind::Directional,
            Self::Point { .. } => LightKind::Point,
            Self::Spot { .. } => LightKind::Spot,
        }
    }

    /// Colour
    pub fn color(&self) -> Vec3 {
        match *self {
            Self::Directional { color, .. } | Self::Point { color, .. } | Self::Spot { color, .. } => color,
        }
    }

    /// Intensity
    pub fn intensity(&self) -> f32 {
        match *self {
            Self::Directional { intensity, .. }
            | Self::Point { intensity, .. }
            | Self::Spot { intensity, .. } => intensity,
        }
    }

    /// Position, for lights that have one
    pub fn position(&self) -> Option<Vec3> {
        match *self {
            Self::Directional { .. } => None,
            Self::Point { position, .. } | Self::Spot { position, .. } => Some(position),
        }
    }

    /// Direction, for lights that have one
    pub fn direction(&self) -> Option<Vec3> {
        match *self {
            Self::Point { .. } => None,
            Self::Directional { direction, .. } | Self::Spot { direction, .. } => Some(direction),
        }
    }

    /// Range, for lights that have one
    pub fn range(&self) -> Option<f32> {
        match *self {
            Self::Directional { .. } => None,
            Self::Point { range, .. } | Self::Spot { range, .. } => Some(range),
        }
    }

    /// Cone falloff, for spot lights
    pub fn spot_falloff(&self) -> Option<f32> {
        match *self {
            Self::Spot { spot_falloff, .. } => Some(spot_falloff),
            _ => None,
        }
    }
}

/// Random ranges for generated point lights
pub mod point_light_ranges {
    use std::ops::RangeInclusive;

    /// X position
    pub const X: RangeInclusive<f32> = -10.0..=10.0;
    /// Y position
    pub const Y: RangeInclusive<f32> = -5.0..=5.0;
    /// Z position
    pub const Z: RangeInclusive<f32> = -10.0..=10.0;
    /// Each colour channel
    pub const COLOR: RangeInclusive<f32> = 0.0..=1.0;
    /// Falloff range
    pub const RANGE: RangeInclusive<f32> = 5.0..=10.0;
    /// Intensity
    pub const INTENSITY: RangeInclusive<f32> = 0.1..=3.0;
}

/// Number of fixed directional lights at the head of a generated set
pub const DIRECTIONAL_LIGHT_COUNT: usize = 3;

/// The fixed key, fill and rim lights
pub fn directional_presets() -> [Light; DIRECTIONAL_LIGHT_COUNT] {
    [
        Light::directional(Vec3::new(1.0, -1.0, 1.0), Vec3::new(0.8, 0.8, 0.8), 1.0),
        Light::directional(Vec3::new(-1.0, -0.25, 0.0), Vec3::new(0.2, 0.2, 0.2), 1.0),
        Light::directional(Vec3::new(0.0, -1.0, 1.0), Vec3::new(0.2, 0.2, 0.2), 1.0),
    ]
}

/// A point light with random placement, colour, range and intensity
pub fn random_point_light<R: Rng + ?Sized>(rng: &mut R) -> Light {
    use point_light_ranges as r;

    Light::point(
        Vec3::new(rng.gen_range(r::X), rng.gen_range(r::Y), rng.gen_range(r::Z)),
        Vec3::new(rng.gen_range(r::COLOR), rng.gen_range(r::COLOR), rng.gen_range(r::COLOR)),
        rng.gen_range(r::INTENSITY),
        rng.gen_range(r::RANGE),
    )
}

/// Ordered list of lights handed to the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightSet {
    lights: Vec<Light>,
}

impl LightSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with the three directional presets followed by
    /// random point lights until there are `count` lights
    ///
    /// The presets are always present, so a `count` below three still
    /// yields three lights.
    pub fn generate<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        self.lights.clear();
        self.lights.extend(directional_presets());
        while self.lights.len() < count {
            self.lights.push(random_point_light(rng));
        }
        log::info!("Generated {} lights", self.lights.len());
    }

    /// Truncate to `count` lights, or append random point lights up to it
    pub fn resize<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        if count <= self.lights.len() {
            self.lights.truncate(count);
        } else {
            while self.lights.len() < count {
                self.lights.push(random_point_light(rng));
            }
        }
    }

    /// Append a light
    pub fn push(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Lights in order
    pub fn as_slice(&self) -> &[Light] {
        &self.lights
    }

    /// Light at `index`
    pub fn get(&self, index: usize) -> Option<&Light> {
        self.lights.get(index)
    }

    /// Mutable light at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    /// Number of lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Iterate lights in order
    pub fn iter(&self) -> std::slice::Iter<'_, Light> {
        self.lights.iter()
    }
}
