use bevy::pbr::{DistanceFog, FogFalloff, NotShadowCaster};
use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use constants::palette::{BACKGROUND, BLUE, CYAN, PINK};
use constants::render_settings::*;
use constants::scene::NODE_COUNT_JITTER;
use std::collections::HashMap;

use super::particle_field::{ParticleBuffer, ParticleDensity, ParticleField, ParticlePalette};
use super::polyhedra::{FloatingNode, NodeShape, jittered_count};
use crate::engine::config::VisualsConfig;
use crate::engine::config::visuals_config::hex_color;
use crate::engine::core::session::SessionRng;
use crate::engine::shaders::ParticleFieldMaterial;
use crate::engine::smoothing::ExponentialSmoother;

#[derive(Component)]
pub struct SceneCamera;

/// Root of everything the pointer rotates.
#[derive(Component)]
pub struct SceneRig;

/// Smoothed rig rotation (x, y), radians.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SceneRotation(pub ExponentialSmoother);

impl Default for SceneRotation {
    fn default() -> Self {
        Self(ExponentialSmoother::new(constants::scene::ROTATION_SMOOTHING))
    }
}

/// Visibility the host asked for through `toggle` and config.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneToggles {
    pub particles: bool,
    pub scene: bool,
}

impl Default for SceneToggles {
    fn default() -> Self {
        Self {
            particles: true,
            scene: true,
        }
    }
}

pub fn visibility(visible: bool) -> Visibility {
    if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

/// Every entity and asset the scene created, released exactly once.
#[derive(Resource, Debug, Default)]
pub struct SceneResources {
    pub roots: Vec<Entity>,
    pub meshes: Vec<Handle<Mesh>>,
    pub node_materials: Vec<Handle<StandardMaterial>>,
    pub particle_materials: Vec<Handle<ParticleFieldMaterial>>,
    pub particle_field: Option<Entity>,
    pub released: bool,
}

impl SceneResources {
    pub fn is_built(&self) -> bool {
        !self.roots.is_empty()
    }
}

fn vec3(array: [f32; 3]) -> Vec3 {
    Vec3::from_array(array)
}

fn spawn_camera(commands: &mut Commands, config: &VisualsConfig) -> Entity {
    commands
        .spawn((
            Camera3d::default(),
            Camera {
                clear_color: ClearColorConfig::Custom(Color::NONE),
                ..default()
            },
            Projection::from(PerspectiveProjection {
                fov: CAMERA_FOV_DEGREES.to_radians(),
                near: CAMERA_NEAR,
                far: CAMERA_FAR,
                ..default()
            }),
            Transform::from_xyz(0.0, 0.0, config.scene.camera_base_z)
                .looking_at(Vec3::ZERO, Vec3::Y),
            DistanceFog {
                color: hex_color(BACKGROUND),
                falloff: FogFalloff::Linear {
                    start: FOG_START,
                    end: FOG_END,
                },
                ..default()
            },
            SceneCamera,
        ))
        .id()
}

fn spawn_lights(commands: &mut Commands) -> Vec<Entity> {
    commands.insert_resource(AmbientLight {
        color: hex_color(CYAN),
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });

    let directional = commands
        .spawn((
            DirectionalLight {
                color: hex_color(CYAN),
                illuminance: DIRECTIONAL_ILLUMINANCE,
                ..default()
            },
            Transform::from_translation(vec3(DIRECTIONAL_POSITION)).looking_at(Vec3::ZERO, Vec3::Y),
        ))
        .id();

    let mut lights = vec![directional];
    for (hex, position) in [(PINK, PINK_LIGHT_POSITION), (BLUE, BLUE_LIGHT_POSITION)] {
        lights.push(
            commands
                .spawn((
                    PointLight {
                        color: hex_color(hex),
                        intensity: POINT_LIGHT_INTENSITY,
                        range: POINT_LIGHT_RANGE,
                        ..default()
                    },
                    Transform::from_translation(vec3(position)),
                ))
                .id(),
        );
    }
    lights
}

/// Build the particle field under `rig` and record its assets.
pub fn spawn_particle_field(
    commands: &mut Commands,
    rig: Entity,
    field: ParticleField,
    visible: bool,
    rng: &mut SessionRng,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ParticleFieldMaterial>,
    resources: &mut SceneResources,
) -> Entity {
    let buffer = ParticleBuffer::generate(field.count, field.palette, &mut rng.0);
    let mesh = meshes.add(buffer.to_mesh());
    let material = materials.add(ParticleFieldMaterial::new());
    resources.meshes.push(mesh.clone());
    resources.particle_materials.push(material.clone());

    let entity = commands
        .spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::IDENTITY,
            visibility(visible),
            NoFrustumCulling,
            NotShadowCaster,
            field,
            ChildOf(rig),
        ))
        .id();
    resources.particle_field = Some(entity);
    entity
}

/// Spawn camera, lights, particles and polyhedra once the config is settled.
pub fn spawn_scene(
    mut commands: Commands,
    config: Res<VisualsConfig>,
    density: Res<ParticleDensity>,
    palette: Res<ParticlePalette>,
    toggles: Res<SceneToggles>,
    mut rng: ResMut<SessionRng>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut node_materials: ResMut<Assets<StandardMaterial>>,
    mut particle_materials: ResMut<Assets<ParticleFieldMaterial>>,
    mut resources: ResMut<SceneResources>,
) {
    if resources.is_built() || resources.released {
        return;
    }

    let camera = spawn_camera(&mut commands, &config);
    let lights = spawn_lights(&mut commands);
    let rig = commands
        .spawn((
            SceneRig,
            Transform::IDENTITY,
            if toggles.scene {
                Visibility::Visible
            } else {
                Visibility::Hidden
            },
        ))
        .id();

    spawn_particle_field(
        &mut commands,
        rig,
        ParticleField {
            count: density.count,
            palette: palette.0,
        },
        toggles.particles,
        &mut rng,
        &mut meshes,
        &mut particle_materials,
        &mut resources,
    );

    let node_palette = [hex_color(CYAN), hex_color(PINK)];
    let mut shape_meshes = HashMap::new();
    let mut index = 0;
    for shape in NodeShape::ALL {
        let mesh = shape_meshes
            .entry(shape)
            .or_insert_with(|| meshes.add(shape.mesh()))
            .clone();
        for _ in 0..jittered_count(shape, NODE_COUNT_JITTER, &mut rng.0) {
            let node = FloatingNode::random(shape, index, node_palette, &mut rng.0);
            let material = node_materials.add(StandardMaterial {
                base_color: node.accent.with_alpha(0.3),
                alpha_mode: AlphaMode::Blend,
                double_sided: node.wireframe,
                cull_mode: None,
                ..default()
            });
            resources.node_materials.push(material.clone());

            #[cfg(not(target_arch = "wasm32"))]
            let wireframe = node.wireframe;
            let bundle = (
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material),
                node.transform_at(0.0, 0.0, config.scene.float_amplitude),
                NotShadowCaster,
                node,
                ChildOf(rig),
            );
            // WebGL2 has no line polygon mode; the web build draws every node solid.
            #[cfg(target_arch = "wasm32")]
            commands.spawn(bundle);
            #[cfg(not(target_arch = "wasm32"))]
            if wireframe {
                commands.spawn((bundle, bevy::pbr::wireframe::Wireframe));
            } else {
                commands.spawn(bundle);
            }
            index += 1;
        }
    }
    resources.meshes.extend(shape_meshes.into_values());

    resources.roots.push(camera);
    resources.roots.extend(lights);
    resources.roots.push(rig);
    info!(
        "✓ Scene built: {} particles, {} floating nodes",
        density.count, index
    );
}
