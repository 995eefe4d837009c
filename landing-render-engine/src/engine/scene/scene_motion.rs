use bevy::prelude::*;
use constants::scene::{PARTICLE_SPIN_PER_FRAME, ROTATION_INPUT_SCALE};

use super::particle_field::{ParticleDensity, ParticleField, ParticlePalette};
use super::polyhedra::FloatingNode;
use super::scene_setup::{
    SceneCamera, SceneResources, SceneRig, SceneRotation, SceneToggles, spawn_particle_field,
    visibility,
};
use crate::engine::config::VisualsConfig;
use crate::engine::core::requests::{ColorThemeRequest, ToggleRequest, ToggleTarget};
use crate::engine::core::session::SessionRng;
use crate::engine::frame::{FrameInbox, PerformanceDegraded, ScrollState};
use crate::engine::shaders::ParticleFieldMaterial;

/// Rotation target for a pointer at `pointer` in a `viewport`-sized page.
pub fn pointer_rotation_target(pointer: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::ZERO;
    }
    let ndc = Vec2::new(
        pointer.x / viewport.x * 2.0 - 1.0,
        -(pointer.y / viewport.y * 2.0 - 1.0),
    );
    Vec2::new(ndc.y, ndc.x) * ROTATION_INPUT_SCALE
}

/// Rotation target for a device tilted by `beta`/`gamma` degrees.
pub fn orientation_rotation_target(beta: f32, gamma: f32) -> Vec2 {
    Vec2::new(beta.to_radians(), gamma.to_radians()) * ROTATION_INPUT_SCALE
}

/// Camera distance for a scroll fraction; pulls back monotonically.
pub fn camera_z_for_fraction(base_z: f32, pull_back: f32, fraction: f32) -> f32 {
    base_z + fraction.clamp(0.0, 1.0) * pull_back
}

pub fn update_particle_time(
    time: Res<Time>,
    fields: Query<&MeshMaterial3d<ParticleFieldMaterial>, With<ParticleField>>,
    mut materials: ResMut<Assets<ParticleFieldMaterial>>,
) {
    for handle in &fields {
        if let Some(material) = materials.get_mut(&handle.0) {
            material.set_time(time.elapsed_secs());
        }
    }
}

pub fn spin_particle_field(mut fields: Query<&mut Transform, With<ParticleField>>) {
    for mut transform in &mut fields {
        transform.rotate_x(PARTICLE_SPIN_PER_FRAME.0);
        transform.rotate_y(PARTICLE_SPIN_PER_FRAME.1);
    }
}

/// Orientation wins over the pointer when both arrived this frame.
pub fn rotate_scene_rig(
    inbox: Res<FrameInbox>,
    scroll: Res<ScrollState>,
    mut rotation: ResMut<SceneRotation>,
    mut rigs: Query<&mut Transform, With<SceneRig>>,
) {
    if let Some(tilt) = inbox.orientation {
        rotation.0.target = orientation_rotation_target(tilt.x, tilt.y);
    } else if let Some(pointer) = inbox.pointer {
        let viewport = Vec2::new(
            scroll.metrics.viewport_width,
            scroll.metrics.viewport_height,
        );
        rotation.0.target = pointer_rotation_target(pointer, viewport);
    }

    let current = rotation.0.step();
    for mut transform in &mut rigs {
        transform.rotation = Quat::from_euler(EulerRot::XYZ, current.x, current.y, 0.0);
    }
}

pub fn animate_floating_nodes(
    time: Res<Time>,
    scroll: Res<ScrollState>,
    config: Res<VisualsConfig>,
    mut nodes: Query<(
        &FloatingNode,
        &mut Transform,
        &MeshMaterial3d<StandardMaterial>,
    )>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let elapsed = time.elapsed_secs();
    for (node, mut transform, material) in &mut nodes {
        *transform = node.transform_at(elapsed, scroll.fraction, config.scene.float_amplitude);
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color.set_alpha(node.opacity_at(elapsed));
        }
    }
}

pub fn apply_scroll_to_camera(
    scroll: Res<ScrollState>,
    config: Res<VisualsConfig>,
    mut cameras: Query<&mut Transform, With<SceneCamera>>,
) {
    let z = camera_z_for_fraction(
        config.scene.camera_base_z,
        config.scene.camera_scroll_pull_back,
        scroll.fraction,
    );
    for mut transform in &mut cameras {
        transform.translation.z = z;
    }
}

/// Recompute the aspect before this frame renders rather than waiting on
/// the camera's own resize handling.
pub fn sync_camera_aspect(
    inbox: Res<FrameInbox>,
    mut cameras: Query<&mut Projection, With<SceneCamera>>,
) {
    let Some(size) = inbox.resized else {
        return;
    };
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    for mut projection in &mut cameras {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = size.x / size.y;
        }
    }
}

/// Mirror the live config into the scene's working resources.
pub fn apply_config_to_scene(
    config: Res<VisualsConfig>,
    mut density: ResMut<ParticleDensity>,
    mut palette: ResMut<ParticlePalette>,
    mut rotation: ResMut<SceneRotation>,
    mut toggles: ResMut<SceneToggles>,
) {
    let mut configured = *density;
    configured.configure(config.particles.count);
    density.set_if_neq(configured);
    palette.set_if_neq(ParticlePalette(config.particle_palette()));
    if rotation.0.factor() != config.scene.rotation_smoothing {
        rotation.0.set_factor(config.scene.rotation_smoothing);
    }
    if toggles.particles != config.particles.enabled {
        toggles.particles = config.particles.enabled;
    }
}

/// A new theme goes through the config so later patches keep it.
pub fn handle_color_theme_requests(
    mut requests: EventReader<ColorThemeRequest>,
    mut config: ResMut<VisualsConfig>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };
    config.particles.palette = request.colors.map(|color| Srgba::from(color).to_hex());
    info!("Particle palette set to {:?}", config.particles.palette);
}

pub fn handle_scene_toggles(
    mut requests: EventReader<ToggleRequest>,
    mut toggles: ResMut<SceneToggles>,
) {
    for request in requests.read() {
        let flag = match request.target {
            ToggleTarget::Particles => &mut toggles.particles,
            ToggleTarget::Scene => &mut toggles.scene,
            ToggleTarget::Follower => continue,
        };
        *flag = request.visible.unwrap_or(!*flag);
    }
}

pub fn apply_scene_toggles(
    toggles: Res<SceneToggles>,
    mut fields: Query<&mut Visibility, (With<ParticleField>, Without<SceneRig>)>,
    mut rigs: Query<&mut Visibility, With<SceneRig>>,
) {
    for mut field in &mut fields {
        field.set_if_neq(visibility(toggles.particles));
    }
    for mut rig in &mut rigs {
        rig.set_if_neq(visibility(toggles.scene));
    }
}

pub fn degrade_particle_density(
    mut degraded: EventReader<PerformanceDegraded>,
    config: Res<VisualsConfig>,
    mut density: ResMut<ParticleDensity>,
) {
    if degraded.read().last().is_none() {
        return;
    }
    let before = density.count;
    if density.degrade(
        config.performance.degraded_density_factor,
        config.particles.min_count,
    ) {
        info!("Particle density reduced {} → {}", before, density.count);
    }
}

/// Replace the particle field when its density or palette no longer match.
pub fn rebuild_particle_field(
    mut commands: Commands,
    density: Res<ParticleDensity>,
    palette: Res<ParticlePalette>,
    toggles: Res<SceneToggles>,
    mut rng: ResMut<SessionRng>,
    mut resources: ResMut<SceneResources>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ParticleFieldMaterial>>,
    fields: Query<(&ParticleField, &Mesh3d, &MeshMaterial3d<ParticleFieldMaterial>)>,
    rigs: Query<Entity, With<SceneRig>>,
) {
    let Some(current) = resources.particle_field else {
        return;
    };
    let Ok((field, mesh, material)) = fields.get(current) else {
        return;
    };
    let wanted = ParticleField {
        count: density.count,
        palette: palette.0,
    };
    if *field == wanted {
        return;
    }
    let Ok(rig) = rigs.single() else {
        return;
    };

    meshes.remove(&mesh.0);
    materials.remove(&material.0);
    resources.meshes.retain(|handle| handle.id() != mesh.0.id());
    resources
        .particle_materials
        .retain(|handle| handle.id() != material.0.id());
    commands.entity(current).despawn();

    spawn_particle_field(
        &mut commands,
        rig,
        wanted,
        toggles.particles,
        &mut rng,
        &mut meshes,
        &mut materials,
        &mut resources,
    );
    info!("Particle field rebuilt with {} particles", density.count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_at_centre_means_no_rotation() {
        let viewport = Vec2::new(1280.0, 800.0);
        assert_eq!(pointer_rotation_target(Vec2::new(640.0, 400.0), viewport), Vec2::ZERO);

        let corner = pointer_rotation_target(Vec2::new(1280.0, 0.0), viewport);
        assert!((corner.x - 0.1).abs() < 1e-6);
        assert!((corner.y - 0.1).abs() < 1e-6);

        assert_eq!(pointer_rotation_target(Vec2::new(5.0, 5.0), Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn orientation_is_scaled_radians() {
        let target = orientation_rotation_target(90.0, -45.0);
        assert!((target.x - std::f32::consts::FRAC_PI_2 * 0.1).abs() < 1e-6);
        assert!((target.y + std::f32::consts::FRAC_PI_4 * 0.1).abs() < 1e-6);
    }

    #[test]
    fn camera_pulls_back_monotonically_and_clamps() {
        let mut previous = f32::MIN;
        for step in 0..=20 {
            let z = camera_z_for_fraction(100.0, 50.0, step as f32 / 20.0);
            assert!(z >= previous);
            previous = z;
        }
        assert_eq!(camera_z_for_fraction(100.0, 50.0, 0.0), 100.0);
        assert_eq!(camera_z_for_fraction(100.0, 50.0, 1.0), 150.0);
        assert_eq!(camera_z_for_fraction(100.0, 50.0, 7.0), 150.0);
        assert_eq!(camera_z_for_fraction(100.0, 50.0, -3.0), 100.0);
    }
}
