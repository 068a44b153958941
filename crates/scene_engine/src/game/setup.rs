//! Demo scene construction
//!
//! Loads the fixed asset set, spawns the sphere hierarchy and builds the
//! physics pyramid. Everything here runs once at startup.

use thiserror::Error;

use crate::assets::{AssetLibrary, Material, Mesh, Sampler, Shader, ShaderStage, Sky};
use crate::config::{CameraMode, CameraSettings, PhysicsSettings};
use crate::foundation::collections::Handle;
use crate::foundation::math::{Quat, Vec2, Vec3, Vec4};
use crate::gui::MaterialShaders;
use crate::physics::{BodyHandle, BoxDesc, PhysicsError, PhysicsMaterial, PhysicsWorld, PlaneDesc};
use crate::render::RendererSetup;
use crate::scene::{Camera, CameraRig, EntityId, FollowCamera, LocalTransform, Scene, TransformGraph, TransformId};

/// Display name and file prefix of each texture set, in material order
pub const TEXTURE_SETS: [(&str, &str); 7] = [
    ("Cobblestone", "cobblestone"),
    ("Floor", "floor"),
    ("Paint", "paint"),
    ("Scratched", "scratched"),
    ("Bronze", "bronze"),
    ("Rough", "rough"),
    ("Wood", "wood"),
];

const SKY_FACES: [&str; 6] = ["right", "left", "up", "down", "front", "back"];

/// Demo scene construction errors
#[derive(Error, Debug)]
pub enum SetupError {
    /// A texture set has no material of the required kind
    #[error("No {kind} material for texture set {name}")]
    MissingMaterial {
        /// Texture set name
        name: String,
        /// "PBR" or "basic"
        kind: &'static str,
    },

    /// The physics world rejected a body
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),
}

/// Shader programs used by the demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoShaders {
    /// Shared vertex program
    pub vertex: Handle<Shader>,
    /// Blinn-Phong pixel program
    pub pixel: Handle<Shader>,
    /// PBR pixel program
    pub pixel_pbr: Handle<Shader>,
    /// Flat colour program for light gizmos
    pub solid_color: Handle<Shader>,
    /// Sky vertex program
    pub sky_vertex: Handle<Shader>,
    /// Sky pixel program
    pub sky_pixel: Handle<Shader>,
}

/// Meshes used by the demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoMeshes {
    /// UV sphere
    pub sphere: Handle<Mesh>,
    /// Helix
    pub helix: Handle<Mesh>,
    /// Unit cube
    pub cube: Handle<Mesh>,
    /// Cone
    pub cone: Handle<Mesh>,
}

/// Handles to everything [`load_demo_assets`] registered
#[derive(Debug, Clone)]
pub struct DemoAssets {
    /// Shader programs
    pub shaders: DemoShaders,
    /// Meshes
    pub meshes: DemoMeshes,
    /// Blinn-Phong materials in [`TEXTURE_SETS`] order
    pub basic_materials: Vec<Handle<Material>>,
    /// PBR materials in [`TEXTURE_SETS`] order
    pub pbr_materials: Vec<Handle<Material>>,
    /// Night sky
    pub sky: Sky,
}

impl DemoAssets {
    /// Pixel programs a material toggles between
    pub fn material_shaders(&self) -> MaterialShaders {
        MaterialShaders {
            basic: self.shaders.pixel,
            pbr: self.shaders.pixel_pbr,
        }
    }

    /// Fixed renderer inputs for a viewport
    pub fn renderer_setup(&self, width: u32, height: u32) -> RendererSetup {
        RendererSetup {
            width,
            height,
            light_mesh: self.meshes.sphere,
            light_vertex_shader: self.shaders.vertex,
            light_pixel_shader: self.shaders.solid_color,
            pbr_pixel_shader: self.shaders.pixel_pbr,
        }
    }

    fn material(materials: &[Handle<Material>], name: &str) -> Option<Handle<Material>> {
        let index = TEXTURE_SETS.iter().position(|(set, _)| *set == name)?;
        materials.get(index).copied()
    }

    /// PBR material for a texture set name
    pub fn pbr(&self, name: &str) -> Option<Handle<Material>> {
        Self::material(&self.pbr_materials, name)
    }

    /// Blinn-Phong material for a texture set name
    pub fn basic(&self, name: &str) -> Option<Handle<Material>> {
        Self::material(&self.basic_materials, name)
    }
}

/// Register the demo's shaders, meshes, textures, materials and sky
pub fn load_demo_assets(assets: &mut AssetLibrary) -> DemoAssets {
    let shaders = DemoShaders {
        vertex: assets.load_shader("Vertex Shader", ShaderStage::Vertex, "Shaders/VertexShader.cso"),
        pixel: assets.load_shader("Pixel Shader", ShaderStage::Pixel, "Shaders/PixelShader.cso"),
        pixel_pbr: assets.load_shader("PBR Pixel Shader", ShaderStage::Pixel, "Shaders/PixelShaderPBR.cso"),
        solid_color: assets.load_shader("Solid Color Shader", ShaderStage::Pixel, "Shaders/SolidColorPS.cso"),
        sky_vertex: assets.load_shader("Sky Vertex Shader", ShaderStage::Vertex, "Shaders/SkyVS.cso"),
        sky_pixel: assets.load_shader("Sky Pixel Shader", ShaderStage::Pixel, "Shaders/SkyPS.cso"),
    };

    let meshes = DemoMeshes {
        sphere: assets.load_mesh("Sphere", "Models/sphere.obj"),
        helix: assets.load_mesh("Helix", "Models/helix.obj"),
        cube: assets.load_mesh("Cube", "Models/cube.obj"),
        cone: assets.load_mesh("Cone", "Models/cone.obj"),
    };

    let texture_sets: Vec<_> = TEXTURE_SETS
        .iter()
        .map(|(name, prefix)| assets.load_texture_set(name, prefix))
        .collect();

    let sampler = assets.add_sampler(Sampler::default());

    let faces = SKY_FACES.map(|face| assets.load_texture(&format!("Night Sky {face}"), format!("Skies/Night/{face}.png")));
    let sky = Sky {
        mesh: meshes.cube,
        faces,
        vertex_shader: shaders.sky_vertex,
        pixel_shader: shaders.sky_pixel,
        sampler,
    };

    let mut add_materials = |pixel_shader: Handle<Shader>, suffix: &str| -> Vec<Handle<Material>> {
        TEXTURE_SETS
            .iter()
            .zip(&texture_sets)
            .map(|((name, _), set)| {
                assets.add_material(Material {
                    name: format!("{name}{suffix}"),
                    vertex_shader: shaders.vertex,
                    pixel_shader,
                    color: Vec4::new(1.0, 1.0, 1.0, 1.0),
                    shininess: 256.0,
                    uv_scale: Vec2::new(2.0, 2.0),
                    albedo: set.albedo,
                    normal: set.normal,
                    roughness: set.roughness,
                    metal: set.metal,
                    sampler,
                })
            })
            .collect()
    };
    let basic_materials = add_materials(shaders.pixel, "");
    let pbr_materials = add_materials(shaders.pixel_pbr, " - PBR");

    log::info!(
        "Loaded {} meshes, {} textures, {} materials",
        assets.meshes().len(),
        assets.textures().len(),
        assets.materials().len()
    );

    DemoAssets {
        shaders,
        meshes,
        basic_materials,
        pbr_materials,
        sky,
    }
}

/// Spawn the five PBR spheres and link their hierarchy
///
/// Returns the entity ids in spawn order.
pub fn spawn_spheres(scene: &mut Scene, demo: &DemoAssets) -> Result<Vec<EntityId>, SetupError> {
    let layout: [(&str, Vec3, f32); 5] = [
        ("Cobblestone", Vec3::zeros(), 3.0),
        ("Floor", Vec3::new(4.0, 0.0, 0.0), 2.0),
        ("Scratched", Vec3::new(-4.0, 0.0, 0.0), 2.0),
        ("Bronze", Vec3::new(6.0, 0.0, 0.0), 1.0),
        ("Paint", Vec3::new(6.0, 1.0, 0.0), 0.5),
    ];

    let mut ids = Vec::with_capacity(layout.len());
    for (name, position, scale) in layout {
        let material = demo.pbr(name).ok_or_else(|| SetupError::MissingMaterial {
            name: name.to_string(),
            kind: "PBR",
        })?;
        let local = LocalTransform::from_position(position).with_scale(Vec3::repeat(scale));
        ids.push(scene.spawn(name, demo.meshes.sphere, material, local));
    }

    scene.attach(ids[0], ids[1]);
    scene.attach(ids[0], ids[2]);
    scene.attach(ids[1], ids[3]);
    scene.attach(ids[3], ids[4]);

    log::debug!("Spawned {} spheres", ids.len());
    Ok(ids)
}

/// Build the camera rig selected in `settings`
///
/// A follow rig needs its target entity to exist; when it does not, the
/// free camera is used instead.
pub fn build_camera_rig(
    scene_transforms: &mut TransformGraph,
    settings: &CameraSettings,
    aspect: f32,
    follow_target: Option<TransformId>,
) -> CameraRig {
    match (settings.mode, follow_target) {
        (CameraMode::Follow, Some(target)) => {
            CameraRig::Follow(FollowCamera::new(scene_transforms, target, aspect, settings))
        }
        (mode, _) => {
            if mode == CameraMode::Follow {
                log::warn!(
                    "Follow target {} does not exist, using the first-person camera",
                    settings.follow_target
                );
            }
            CameraRig::FirstPerson(Camera::new(scene_transforms, Vec3::from(settings.position), aspect, settings))
        }
    }
}

/// A dynamic body whose pose drives an entity's transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyBinding {
    /// Physics body
    pub body: BodyHandle,
    /// Entity following it
    pub entity: EntityId,
}

/// Centres of a box pyramid resting on y = 0
///
/// Row `i` holds `size - i` boxes; positions are in units of `half_extent`.
pub fn pyramid_positions(size: usize, half_extent: f32) -> Vec<Vec3> {
    let mut positions = Vec::with_capacity(size * (size + 1) / 2);
    for i in 0..size {
        for j in 0..size - i {
            let x = (2 * j) as f32 - (size - i) as f32;
            let y = (2 * i + 1) as f32;
            positions.push(Vec3::new(x, y, 0.0) * half_extent);
        }
    }
    positions
}

/// Add the ground plane and box pyramid to the physics world
///
/// When `bind_box_entities` is set, a cube entity is spawned per box and a
/// binding is returned for each.
pub fn spawn_physics_scene(
    settings: &PhysicsSettings,
    physics: &mut dyn PhysicsWorld,
    scene: &mut Scene,
    demo: &DemoAssets,
) -> Result<Vec<BodyBinding>, SetupError> {
    let surface = PhysicsMaterial::from_settings(settings);
    physics.add_static_plane(PlaneDesc {
        normal: Vec3::y(),
        distance: settings.ground_distance,
        material: surface,
    })?;

    let half = settings.box_half_extent;
    let box_material = if settings.bind_box_entities {
        let wood = demo.basic("Wood").ok_or_else(|| SetupError::MissingMaterial {
            name: "Wood".to_string(),
            kind: "basic",
        })?;
        Some(wood)
    } else {
        None
    };
    let mut bindings = Vec::new();

    for (n, position) in pyramid_positions(settings.pyramid_size, half).into_iter().enumerate() {
        let body = physics.add_dynamic_box(BoxDesc {
            position,
            rotation: Quat::identity(),
            half_extents: Vec3::repeat(half),
            density: settings.density,
            material: surface,
        })?;

        if let Some(box_material) = box_material {
            let local = LocalTransform::from_position(position).with_scale(Vec3::repeat(half * 2.0));
            let entity = scene.spawn(format!("Box {n}"), demo.meshes.cube, box_material, local);
            bindings.push(BodyBinding { body, entity });
        }
    }

    log::info!(
        "Physics scene: {} dynamic boxes, {} bound to entities",
        physics.body_count(),
        bindings.len()
    );
    Ok(bindings)
}

/// Copy body poses onto their bound entities; returns the number updated
pub fn sync_bodies(bindings: &[BodyBinding], physics: &dyn PhysicsWorld, scene: &mut Scene) -> usize {
    let mut updated = 0;
    for binding in bindings {
        let (Some(pose), Some(transform)) = (physics.body_pose(binding.body), scene.entity_transform(binding.entity))
        else {
            continue;
        };
        scene.transforms.set_world_pose(transform, pose.position, pose.rotation);
        updated += 1;
    }
    updated
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assets::AssetPaths;
    use crate::physics::SimplePhysicsWorld;
    use approx::assert_relative_eq;

    /// The demo sphere scene with a first-person camera and no lights
    pub(crate) fn demo_scene() -> (Scene, AssetLibrary) {
        let (scene, assets, _) = demo_scene_with_assets();
        (scene, assets)
    }

    pub(crate) fn demo_scene_with_assets() -> (Scene, AssetLibrary, DemoAssets) {
        let mut assets = AssetLibrary::new(AssetPaths::new(["assets"]));
        let demo = load_demo_assets(&mut assets);
        let mut transforms = TransformGraph::new();
        let camera = build_camera_rig(&mut transforms, &CameraSettings::default(), 16.0 / 9.0, None);
        let mut scene = Scene::new(transforms, camera, demo.sky.clone());
        spawn_spheres(&mut scene, &demo).unwrap();
        (scene, assets, demo)
    }

    #[test]
    fn test_demo_assets_are_complete() {
        let mut assets = AssetLibrary::new(AssetPaths::new(["assets"]));
        let demo = load_demo_assets(&mut assets);

        assert_eq!(assets.meshes().len(), 4);
        assert_eq!(assets.textures().len(), 7 * 4 + 6);
        assert_eq!(assets.materials().len(), 14);

        let cobble = assets.material(demo.pbr("Cobblestone").unwrap()).unwrap();
        assert_eq!(cobble.name, "Cobblestone - PBR");
        assert!(cobble.is_pbr(demo.shaders.pixel_pbr));
        assert_eq!(assets.texture(cobble.albedo).unwrap().name, "Cobblestone Albedo");

        let wood = assets.material(demo.basic("Wood").unwrap()).unwrap();
        assert!(!wood.is_pbr(demo.shaders.pixel_pbr));
        assert_relative_eq!(wood.shininess, 256.0);
        assert!(demo.basic("Marble").is_none());
    }

    #[test]
    fn test_sphere_hierarchy() {
        let (scene, _) = demo_scene();
        let t = |i: usize| scene.entities[i].transform();

        assert_eq!(scene.entities.len(), 5);
        assert_eq!(scene.transforms.parent(t(0)), None);
        assert_eq!(scene.transforms.parent(t(1)), Some(t(0)));
        assert_eq!(scene.transforms.parent(t(2)), Some(t(0)));
        assert_eq!(scene.transforms.parent(t(3)), Some(t(1)));
        assert_eq!(scene.transforms.parent(t(4)), Some(t(3)));

        // Children inherit the root's scale of 3 and the floor sphere's 2
        let bronze = scene.transforms.world_position(t(3)).unwrap();
        assert_relative_eq!(bronze, Vec3::new(4.0 * 3.0 + 6.0 * 6.0, 0.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_follow_rig_falls_back_without_target() {
        let mut transforms = TransformGraph::new();
        let settings = CameraSettings { mode: CameraMode::Follow, ..CameraSettings::default() };

        let rig = build_camera_rig(&mut transforms, &settings, 1.0, None);
        assert!(matches!(rig, CameraRig::FirstPerson(_)));

        let target = transforms.create_at(Vec3::new(1.0, 2.0, 3.0));
        let rig = build_camera_rig(&mut transforms, &settings, 1.0, Some(target));
        assert!(matches!(rig, CameraRig::Follow(_)));
    }

    #[test]
    fn test_pyramid_layout() {
        let positions = pyramid_positions(10, 0.5);

        assert_eq!(positions.len(), 55);
        assert_relative_eq!(positions[0], Vec3::new(-5.0, 0.5, 0.0));
        assert_relative_eq!(positions[9], Vec3::new(4.0, 0.5, 0.0));
        assert_relative_eq!(positions[10], Vec3::new(-4.5, 1.5, 0.0));
        assert_relative_eq!(positions[54], Vec3::new(-0.5, 9.5, 0.0));
    }

    #[test]
    fn test_physics_scene_binds_boxes() {
        let settings = PhysicsSettings { pyramid_size: 3, ..PhysicsSettings::default() };
        let (mut scene, _, demo) = demo_scene_with_assets();
        let mut physics = SimplePhysicsWorld::new(&settings).unwrap();

        let bindings = spawn_physics_scene(&settings, &mut physics, &mut scene, &demo).unwrap();

        assert_eq!(physics.body_count(), 6);
        assert_eq!(bindings.len(), 6);
        assert_eq!(scene.entities.len(), 11);
        assert_eq!(scene.entity(bindings[0].entity).unwrap().name(), "Box 0");

        crate::physics::step(&mut physics, settings.timestep).unwrap();
        assert_eq!(sync_bodies(&bindings, &physics, &mut scene), 6);

        let transform = scene.entity_transform(bindings[0].entity).unwrap();
        let position = scene.transforms.world_position(transform).unwrap();
        let pose = physics.body_pose(bindings[0].body).unwrap();
        assert_relative_eq!(position, pose.position, epsilon = 1e-5);
        assert!(position.y < 0.5);
    }

    #[test]
    fn test_unbound_boxes_spawn_no_entities() {
        let settings = PhysicsSettings { pyramid_size: 2, bind_box_entities: false, ..PhysicsSettings::default() };
        let (mut scene, _, demo) = demo_scene_with_assets();
        let mut physics = SimplePhysicsWorld::new(&settings).unwrap();

        let bindings = spawn_physics_scene(&settings, &mut physics, &mut scene, &demo).unwrap();

        assert!(bindings.is_empty());
        assert_eq!(physics.body_count(), 3);
        assert_eq!(scene.entities.len(), 5);
    }

    #[test]
    fn test_missing_materials_are_reported() {
        let (mut scene, _, mut demo) = demo_scene_with_assets();
        demo.pbr_materials.truncate(2);
        assert!(matches!(
            spawn_spheres(&mut scene, &demo),
            Err(SetupError::MissingMaterial { ref name, kind: "PBR" }) if name == "Scratched"
        ));

        let settings = PhysicsSettings { pyramid_size: 2, ..PhysicsSettings::default() };
        let mut physics = SimplePhysicsWorld::new(&settings).unwrap();
        demo.basic_materials.clear();
        assert!(matches!(
            spawn_physics_scene(&settings, &mut physics, &mut scene, &demo),
            Err(SetupError::MissingMaterial { kind: "basic", .. })
        ));
    }
}
