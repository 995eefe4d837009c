use bevy::prelude::*;

use crate::engine::core::requests::TeardownRequest;
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
    TornDown,
}

pub fn log_running(state: Res<State<AppState>>) {
    info!("→ Visual layer in {:?} state", state.get());
}

/// Any number of teardown requests lead to a single transition.
pub fn begin_teardown(
    mut requests: EventReader<TeardownRequest>,
    state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();
    if *state.get() != AppState::TornDown {
        info!("→ Tearing down visual layer");
        next_state.set(AppState::TornDown);
    }
}

pub fn announce_teardown(rpc: Option<ResMut<WebRpcInterface>>) {
    if let Some(mut rpc) = rpc {
        rpc.send_notification("torn_down", serde_json::json!({}));
    }
}
