//! Hero scene: particle field, floating polyhedra, camera and lights.
//!
//! Everything hangs off a [`SceneRig`](scene_setup::SceneRig) so pointer and
//! device tilt rotate the whole scene at once. Per-frame systems only run in
//! `AppState::Running`; entering `TornDown` releases every entity and asset.

/// Particle buffers and density bookkeeping
pub mod particle_field;
/// Polyhedron geometry and per-node motion
pub mod polyhedra;
/// Per-frame scene systems and request handlers
pub mod scene_motion;
/// Scene construction
pub mod scene_setup;
/// Scene release
pub mod teardown;

use bevy::prelude::*;

use crate::engine::config::VisualsConfig;
use crate::engine::core::app_state::AppState;
use crate::engine::frame::{FrameSet, ScrollState, TeardownSet};
use particle_field::{ParticleDensity, ParticlePalette};
use scene_motion::*;
use scene_setup::{SceneResources, SceneRotation, SceneToggles, spawn_scene};
use teardown::release_scene;

fn animations_running(time: Res<Time<Virtual>>) -> bool {
    !time.is_paused()
}

/// Installed only when the page has a canvas for the scene.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneResources>()
            .init_resource::<SceneRotation>()
            .init_resource::<SceneToggles>()
            .init_resource::<ParticleDensity>()
            .insert_resource(ParticlePalette(
                VisualsConfig::default().particle_palette(),
            ))
            .add_systems(
                OnEnter(AppState::Running),
                (apply_config_to_scene, spawn_scene).chain(),
            )
            .add_systems(
                Update,
                (
                    (
                        handle_color_theme_requests,
                        apply_config_to_scene.run_if(resource_changed::<VisualsConfig>),
                        handle_scene_toggles,
                        degrade_particle_density,
                        rebuild_particle_field,
                        apply_scene_toggles,
                    )
                        .chain(),
                    (
                        update_particle_time,
                        (spin_particle_field, rotate_scene_rig).run_if(animations_running),
                        animate_floating_nodes,
                        apply_scroll_to_camera.run_if(
                            resource_changed::<ScrollState>.or(resource_changed::<VisualsConfig>),
                        ),
                        sync_camera_aspect,
                    ),
                )
                    .chain()
                    .in_set(FrameSet::Effects)
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(
                OnEnter(AppState::TornDown),
                release_scene.in_set(TeardownSet::Subsystems),
            );
    }
}
