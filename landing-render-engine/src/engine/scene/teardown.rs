use bevy::prelude::*;

use super::scene_setup::SceneResources;
use crate::engine::shaders::ParticleFieldMaterial;

/// Despawn the scene and drop every asset it created. Runs once; later
/// calls find the resources already released.
pub fn release_scene(
    mut commands: Commands,
    mut resources: ResMut<SceneResources>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut node_materials: ResMut<Assets<StandardMaterial>>,
    mut particle_materials: ResMut<Assets<ParticleFieldMaterial>>,
    ambient: Option<ResMut<AmbientLight>>,
) {
    if resources.released {
        return;
    }

    for entity in resources.roots.drain(..) {
        commands.entity(entity).try_despawn();
    }
    for mesh in resources.meshes.drain(..) {
        meshes.remove(&mesh);
    }
    for material in resources.node_materials.drain(..) {
        node_materials.remove(&material);
    }
    for material in resources.particle_materials.drain(..) {
        particle_materials.remove(&material);
    }
    if let Some(mut ambient) = ambient {
        ambient.brightness = 0.0;
    }
    resources.particle_field = None;
    resources.released = true;
    info!("✓ Scene released");
}
