use bevy::asset::LoadState;
use bevy::prelude::*;

use super::visuals_config::VisualsConfig;
use crate::engine::core::app_state::AppState;
use crate::engine::core::requests::ConfigPatchRequest;
use crate::rpc::web_rpc::WebRpcInterface;

pub const CONFIG_PATH: &str = "visuals.config.json";

/// Tracks the optional config file. Without a path the defaults apply at once.
#[derive(Resource, Default)]
pub struct ConfigLoader {
    path: Option<String>,
    handle: Option<Handle<VisualsConfig>>,
}

impl ConfigLoader {
    pub fn new(path: Option<String>) -> Self {
        Self { path, handle: None }
    }
}

pub fn start_config_load(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    if let Some(path) = loader.path.clone() {
        println!("→ Loading {}", path);
        loader.handle = Some(asset_server.load(path));
    }
}

/// Leave `Loading` once the config file resolved one way or the other.
pub fn finish_config_load(
    loader: Res<ConfigLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<VisualsConfig>>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = &loader.handle else {
        next_state.set(AppState::Running);
        return;
    };

    if let Some(config) = configs.get(handle) {
        info!("✓ Visuals config loaded");
        commands.insert_resource(config.clone());
        next_state.set(AppState::Running);
        return;
    }

    if let LoadState::Failed(err) = asset_server.load_state(handle) {
        warn!("Visuals config unavailable ({}), using defaults", err);
        next_state.set(AppState::Running);
    }
}

/// Merge RPC `update_config` patches into the live config.
pub fn apply_config_patches(
    mut patches: EventReader<ConfigPatchRequest>,
    mut config: ResMut<VisualsConfig>,
    mut rpc: Option<ResMut<WebRpcInterface>>,
) {
    for patch in patches.read() {
        let result = config.merged(&patch.0);
        let applied = result.is_ok();
        match result {
            Ok(merged) => {
                if *config != merged {
                    *config = merged;
                }
                info!("Config patch applied");
            }
            Err(err) => warn!("Config patch rejected: {}", err),
        }
        if let Some(rpc) = rpc.as_deref_mut() {
            rpc.send_notification(
                "config_applied",
                serde_json::json!({ "applied": applied, "patch": patch.0.clone() }),
            );
        }
    }
}
