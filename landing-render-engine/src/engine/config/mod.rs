//! Runtime configuration for the visual layer.
//!
//! Defaults come from the `constants` crate. An optional
//! `assets/visuals.config.json` overrides them at startup, and the host page
//! can patch the live value with `update_config`.

/// Config file loading and patch application
pub mod config_loader;
/// Serde model of the configuration
pub mod visuals_config;

pub use visuals_config::VisualsConfig;

use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::core::app_state::AppState;
use config_loader::{ConfigLoader, apply_config_patches, finish_config_load, start_config_load};

/// Loads the config file through the asset server and gates
/// `AppState::Running` on it.
pub struct VisualsConfigPlugin {
    pub path: Option<String>,
}

impl Plugin for VisualsConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(JsonAssetPlugin::<VisualsConfig>::new(&["config.json"]))
            .insert_resource(ConfigLoader::new(self.path.clone()))
            .add_systems(Startup, start_config_load)
            .add_systems(
                Update,
                finish_config_load.run_if(in_state(AppState::Loading)),
            );
    }
}

/// Patch handling only; always installed with the visual layer.
pub struct ConfigPatchPlugin;

impl Plugin for ConfigPatchPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VisualsConfig>().add_systems(
            Update,
            apply_config_patches
                .in_set(crate::engine::frame::FrameSet::Intake)
                .run_if(not(in_state(AppState::TornDown))),
        );
    }
}
