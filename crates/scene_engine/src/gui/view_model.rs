//! Editable mirror of the scene for the debug GUI
//!
//! Each frame the scene is captured into a [`SceneView`] of plain values,
//! the GUI edits a copy, and [`SceneView::apply`] writes back only the
//! fields that differ from the captured baseline. Untouched transforms are
//! therefore never re-stamped, and the GUI code needs no access to the
//! scene itself.

use crate::assets::{AssetLibrary, Shader};
use crate::foundation::collections::Handle;
use crate::foundation::math::Vec3;
use crate::scene::{Light, LightKind, Scene};

/// The two pixel programs a material can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialShaders {
    /// Blinn-Phong program
    pub basic: Handle<Shader>,
    /// Physically based program
    pub pbr: Handle<Shader>,
}

/// Names shown in combo boxes, indexed like the asset lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Mesh names
    pub meshes: Vec<String>,
    /// Material names
    pub materials: Vec<String>,
    /// Texture names
    pub textures: Vec<String>,
}

/// One entity row
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    /// Display name
    pub name: String,
    /// Index into [`Catalog::meshes`]
    pub mesh: usize,
    /// Index into [`Catalog::materials`]
    pub material: usize,
    /// Local position
    pub position: [f32; 3],
    /// Local pitch/yaw/roll
    pub rotation: [f32; 3],
    /// Local scale
    pub scale: [f32; 3],
    /// `children[j]` is set when entity `j` is a direct child of this one
    pub children: Vec<bool>,
}

/// One light row
///
/// Holds the fields of every light kind so switching the kind back and
/// forth in the GUI does not lose values.
#[derive(Debug, Clone, PartialEq)]
pub struct LightView {
    /// Selected kind
    pub kind: LightKind,
    /// Direction for directional and spot lights
    pub direction: [f32; 3],
    /// Position for point and spot lights
    pub position: [f32; 3],
    /// Linear RGB colour
    pub color: [f32; 3],
    /// Brightness
    pub intensity: f32,
    /// Falloff range for point and spot lights
    pub range: f32,
    /// Cone exponent for spot lights
    pub spot_falloff: f32,
}

impl Default for LightView {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            direction: [0.0, -1.0, 0.0],
            position: [0.0; 3],
            color: [1.0; 3],
            intensity: 1.0,
            range: 10.0,
            spot_falloff: 10.0,
        }
    }
}

impl LightView {
    /// Capture a light, filling fields it does not have from `previous`
    pub fn capture(light: &Light, previous: Option<&Self>) -> Self {
        let base = previous.cloned().unwrap_or_default();
        Self {
            kind: light.kind(),
            direction: light.direction().map_or(base.direction, Into::into),
            position: light.position().map_or(base.position, Into::into),
            color: light.color().into(),
            intensity: light.intensity(),
            range: light.range().unwrap_or(base.range),
            spot_falloff: light.spot_falloff().unwrap_or(base.spot_falloff),
        }
    }

    /// Build the light the row describes
    pub fn to_light(&self) -> Light {
        let color = Vec3::from(self.color);
        match self.kind {
            LightKind::Directional => Light::Directional {
                direction: Vec3::from(self.direction),
                color,
                intensity: self.intensity,
            },
            LightKind::Point => Light::Point {
                position: Vec3::from(self.position),
                color,
                intensity: self.intensity,
                range: self.range,
            },
            LightKind::Spot => Light::Spot {
                position: Vec3::from(self.position),
                direction: Vec3::from(self.direction),
                color,
                intensity: self.intensity,
                range: self.range,
                spot_falloff: self.spot_falloff,
            },
        }
    }
}

/// The active camera
#[derive(Debug, Clone, PartialEq)]
pub struct CameraView {
    /// Rig name
    pub label: String,
    /// Local position
    pub position: [f32; 3],
    /// Local pitch and yaw; roll is not editable
    pub pitch_yaw: [f32; 2],
}

/// One material row
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialView {
    /// Display name
    pub name: String,
    /// Renders with the PBR program
    pub pbr: bool,
    /// Specular exponent, used when not PBR
    pub shininess: f32,
    /// RGB tint; alpha is not editable
    pub color: [f32; 3],
    /// Albedo texture index
    pub albedo: usize,
    /// Normal map index
    pub normal: usize,
    /// Roughness map index
    pub roughness: usize,
    /// Metalness map index
    pub metal: usize,
}

/// Everything the debug GUI shows and edits
#[derive(Debug, Clone, PartialEq)]
pub struct SceneView {
    /// Entity rows in scene order
    pub entities: Vec<EntityView>,
    /// Light rows in scene order
    pub lights: Vec<LightView>,
    /// Requested number of lights
    pub light_count: usize,
    /// Upper end of the light count slider
    pub max_lights: usize,
    /// Active camera
    pub camera: CameraView,
    /// Material rows in library order
    pub materials: Vec<MaterialView>,
    /// Names for combo boxes
    pub catalog: Catalog,
}

/// Result of writing a view back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedEdits {
    /// Number of fields written
    pub changes: usize,
    /// New light count, when the slider moved
    pub light_count: Option<usize>,
}

fn vec3(v: Vec3) -> [f32; 3] {
    v.into()
}

impl SceneView {
    /// Capture the scene
    ///
    /// `previous_lights` supplies the retained fields of each light row from
    /// the last frame, matched by index.
    pub fn capture(
        scene: &Scene,
        assets: &AssetLibrary,
        shaders: MaterialShaders,
        light_count: usize,
        max_lights: usize,
        previous_lights: &[LightView],
    ) -> Self {
        let catalog = Catalog {
            meshes: assets.meshes().iter().map(|(_, mesh)| mesh.name.clone()).collect(),
            materials: assets.materials().iter().map(|(_, material)| material.name.clone()).collect(),
            textures: assets.textures().iter().map(|(_, texture)| texture.name.clone()).collect(),
        };

        let transforms = &scene.transforms;
        let entities = scene
            .entities
            .iter()
            .map(|entity| {
                let id = entity.transform();
                let local = transforms.local(id).unwrap_or_default();
                EntityView {
                    name: entity.name().to_string(),
                    mesh: entity.mesh().index(),
                    material: entity.material().index(),
                    position: vec3(local.position),
                    rotation: vec3(local.pitch_yaw_roll),
                    scale: vec3(local.scale),
                    children: scene
                        .entities
                        .iter()
                        .map(|other| transforms.index_of_child(id, other.transform()).is_some())
                        .collect(),
                }
            })
            .collect();

        let lights = scene
            .lights
            .iter()
            .enumerate()
            .map(|(i, light)| LightView::capture(light, previous_lights.get(i)))
            .collect();

        let camera_id = scene.camera.camera().transform();
        let camera_local = transforms.local(camera_id).unwrap_or_default();
        let camera = CameraView {
            label: scene.camera.label().to_string(),
            position: vec3(camera_local.position),
            pitch_yaw: [camera_local.pitch_yaw_roll.x, camera_local.pitch_yaw_roll.y],
        };

        let materials = assets
            .materials()
            .iter()
            .map(|(_, material)| MaterialView {
                name: material.name.clone(),
                pbr: material.is_pbr(shaders.pbr),
                shininess: material.shininess,
                color: [material.color.x, material.color.y, material.color.z],
                albedo: material.albedo.index(),
                normal: material.normal.index(),
                roughness: material.roughness.index(),
                metal: material.metal.index(),
            })
            .collect();

        Self {
            entities,
            lights,
            light_count,
            max_lights,
            camera,
            materials,
            catalog,
        }
    }

    /// Write every field that differs from `baseline` back into the scene
    pub fn apply(
        &self,
        baseline: &Self,
        scene: &mut Scene,
        assets: &mut AssetLibrary,
        shaders: MaterialShaders,
    ) -> AppliedEdits {
        let mut edits = AppliedEdits::default();
        self.apply_entities(baseline, scene, assets, &mut edits);
        self.apply_lights(baseline, scene, &mut edits);
        self.apply_camera(baseline, scene, &mut edits);
        self.apply_materials(baseline, assets, shaders, &mut edits);

        if self.light_count != baseline.light_count {
            edits.light_count = Some(self.light_count.min(self.max_lights));
        }
        if edits.changes > 0 {
            log::debug!("Applied {} GUI edits", edits.changes);
        }
        edits
    }

    fn apply_entities(&self, baseline: &Self, scene: &mut Scene, assets: &AssetLibrary, edits: &mut AppliedEdits) {
        let transforms: Vec<_> = scene.entities.iter().map(|e| e.transform()).collect();

        for (i, (edited, original)) in self.entities.iter().zip(&baseline.entities).enumerate() {
            let Some(&id) = transforms.get(i) else {
                break;
            };

            if edited.mesh != original.mesh {
                if let (Some(mesh), Some(entity)) = (assets.meshes().handle_at(edited.mesh), scene.entities.get_mut(i)) {
                    entity.set_mesh(mesh);
                    edits.changes += 1;
                }
            }
            if edited.material != original.material {
                if let (Some(material), Some(entity)) =
                    (assets.materials().handle_at(edited.material), scene.entities.get_mut(i))
                {
                    entity.set_material(material);
                    edits.changes += 1;
                }
            }
            if edited.position != original.position {
                scene.transforms.set_position(id, Vec3::from(edited.position));
                edits.changes += 1;
            }
            if edited.rotation != original.rotation {
                scene.transforms.set_pitch_yaw_roll(id, Vec3::from(edited.rotation));
                edits.changes += 1;
            }
            if edited.scale != original.scale {
                scene.transforms.set_scale(id, Vec3::from(edited.scale));
                edits.changes += 1;
            }

            for (j, (now, before)) in edited.children.iter().zip(&original.children).enumerate() {
                if now == before {
                    continue;
                }
                let Some(&child) = transforms.get(j) else {
                    continue;
                };
                if *now {
                    scene.transforms.add_child(id, child);
                } else {
                    scene.transforms.remove_child(id, child);
                }
                edits.changes += 1;
            }
        }
    }

    fn apply_lights(&self, baseline: &Self, scene: &mut Scene, edits: &mut AppliedEdits) {
        for (i, (edited, original)) in self.lights.iter().zip(&baseline.lights).enumerate() {
            if edited == original {
                continue;
            }
            if let Some(light) = scene.lights.get_mut(i) {
                *light = edited.to_light();
                edits.changes += 1;
            }
        }
    }

    fn apply_camera(&self, baseline: &Self, scene: &mut Scene, edits: &mut AppliedEdits) {
        let id = scene.camera.camera().transform();
        if self.camera.position != baseline.camera.position {
            scene.transforms.set_position(id, Vec3::from(self.camera.position));
            edits.changes += 1;
        }
        if self.camera.pitch_yaw != baseline.camera.pitch_yaw {
            let roll = scene.transforms.pitch_yaw_roll(id).map_or(0.0, |r| r.z);
            let [pitch, yaw] = self.camera.pitch_yaw;
            scene.transforms.set_pitch_yaw_roll(id, Vec3::new(pitch, yaw, roll));
            edits.changes += 1;
        }
    }

    fn apply_materials(
        &self,
        baseline: &Self,
        assets: &mut AssetLibrary,
        shaders: MaterialShaders,
        edits: &mut AppliedEdits,
    ) {
        for (i, (edited, original)) in self.materials.iter().zip(&baseline.materials).enumerate() {
            if edited == original {
                continue;
            }
            let textures: Vec<_> = [edited.albedo, edited.normal, edited.roughness, edited.metal]
                .iter()
                .map(|index| assets.textures().handle_at(*index))
                .collect();
            let Some(handle) = assets.materials().handle_at(i) else {
                continue;
            };
            let Some(material) = assets.material_mut(handle) else {
                continue;
            };

            if edited.pbr != original.pbr {
                material.pixel_shader = if edited.pbr { shaders.pbr } else { shaders.basic };
            }
            material.shininess = edited.shininess;
            material.color.x = edited.color[0];
            material.color.y = edited.color[1];
            material.color.z = edited.color[2];
            if let [Some(albedo), Some(normal), Some(roughness), Some(metal)] = textures[..] {
                material.albedo = albedo;
                material.normal = normal;
                material.roughness = roughness;
                material.metal = metal;
            }
            edits.changes += 1;
        }
    }
}
