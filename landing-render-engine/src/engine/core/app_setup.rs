use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;

use crate::engine::config::{ConfigPatchPlugin, VisualsConfigPlugin};
use crate::engine::core::app_state::{AppState, announce_teardown, begin_teardown, log_running};
use crate::engine::core::context::VisualsContext;
use crate::engine::core::requests::register_request_events;
use crate::engine::core::session::SessionRng;
use crate::engine::core::window_config::create_window_config;
use crate::engine::frame::{FrameIntakePlugin, FrameMonitorPlugin, FrameSet, TeardownSet};
use crate::engine::scene::ScenePlugin;
use crate::engine::shaders::ParticleFieldMaterial;
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::page::PageHost;
use crate::page::pointer_follower::PointerFollowerPlugin;
use crate::page::reveal::RevealPlugin;
use crate::page::section_effects::SectionEffectsPlugin;
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::{create_native_overlays, fps_text_update_system};

pub fn create_app(context: VisualsContext) -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins(context.canvas_selector.as_deref()))
        .add_plugins(MaterialPlugin::<ParticleFieldMaterial>::default())
        .add_plugins(FrameTimeDiagnosticsPlugin::default());

    #[cfg(not(target_arch = "wasm32"))]
    {
        use bevy::pbr::wireframe::{WireframeConfig, WireframePlugin};

        app.add_plugins(WireframePlugin::default())
            .insert_resource(WireframeConfig {
                global: false,
                default_color: Color::WHITE,
            })
            .add_systems(Startup, create_native_overlays)
            .add_systems(Update, fps_text_update_system);
    }

    install_visual_layer(&mut app, context);
    app
}

/// Everything except windowing and rendering, so tests can drive the layer
/// on top of `MinimalPlugins`.
pub fn install_visual_layer(app: &mut App, context: VisualsContext) {
    let scene_enabled = context.scene_enabled();
    let VisualsContext {
        document,
        config_path,
        seed,
        ..
    } = context;

    app.insert_non_send_resource(PageHost::new(document))
        .init_state::<AppState>()
        .insert_resource(SessionRng::seeded(seed));
    register_request_events(app);

    app.add_plugins(WebRpcPlugin)
        .add_plugins(FrameIntakePlugin)
        .add_plugins(FrameMonitorPlugin)
        .add_plugins(ConfigPatchPlugin)
        .add_plugins(VisualsConfigPlugin { path: config_path })
        .add_plugins(RevealPlugin)
        .add_plugins(SectionEffectsPlugin)
        .add_plugins(PointerFollowerPlugin);

    if scene_enabled {
        app.add_plugins(ScenePlugin);
    } else {
        info!("No scene canvas, running page effects only");
    }

    app.add_systems(OnEnter(AppState::Running), log_running)
        .add_systems(
            Update,
            (
                begin_teardown.after(FrameSet::Effects),
                fps_notification_system,
            )
                .run_if(not(in_state(AppState::TornDown))),
        )
        .add_systems(
            OnEnter(AppState::TornDown),
            announce_teardown.after(TeardownSet::Host),
        );
}

fn create_default_plugins(canvas_selector: Option<&str>) -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config(canvas_selector)),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
