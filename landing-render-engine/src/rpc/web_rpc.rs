use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::config::VisualsConfig;
use crate::engine::config::visuals_config::parse_color;
use crate::engine::core::requests::{
    ColorThemeRequest, ConfigPatchRequest, PlaybackRequest, TeardownRequest, ToggleRequest,
    ToggleTarget, TriggerRevealRequest,
};
use crate::page::reveal::RevealKind;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication with the host page.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    /// Notifications queued since the last flush.
    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    pub fn pending_responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }
}

/// A host request turned into engine work.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualRequest {
    ConfigPatch(ConfigPatchRequest),
    Toggle(ToggleRequest),
    ColorTheme(ColorThemeRequest),
    Playback(PlaybackRequest),
    Trigger(TriggerRevealRequest),
    Teardown,
}

/// Event writers for every request the host can make.
#[derive(SystemParam)]
pub struct VisualRequestWriters<'w> {
    config: EventWriter<'w, ConfigPatchRequest>,
    toggle: EventWriter<'w, ToggleRequest>,
    theme: EventWriter<'w, ColorThemeRequest>,
    playback: EventWriter<'w, PlaybackRequest>,
    trigger: EventWriter<'w, TriggerRevealRequest>,
    teardown: EventWriter<'w, TeardownRequest>,
}

impl VisualRequestWriters<'_> {
    pub fn send(&mut self, request: VisualRequest) {
        match request {
            VisualRequest::ConfigPatch(patch) => {
                self.config.write(patch);
            }
            VisualRequest::Toggle(toggle) => {
                self.toggle.write(toggle);
            }
            VisualRequest::ColorTheme(theme) => {
                self.theme.write(theme);
            }
            VisualRequest::Playback(playback) => {
                self.playback.write(playback);
            }
            VisualRequest::Trigger(trigger) => {
                self.trigger.write(trigger);
            }
            VisualRequest::Teardown => {
                self.teardown.write(TeardownRequest);
            }
        }
    }
}

/// Plugin establishing the postMessage RPC layer between page and engine.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                PreUpdate,
                (process_incoming_messages, handle_rpc_messages).chain(),
            )
            .add_systems(Last, send_outgoing_messages);

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(e) = window
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("Failed to register message listener: {:?}", e);
            }
        }
        None => warn!("No window, RPC listener not installed"),
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw JSON text received from the host page.
#[derive(Event, Debug, Clone)]
pub struct IncomingRpcMessage {
    pub content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Option<Res<DiagnosticsStore>>,
    config: Res<VisualsConfig>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut requests: VisualRequestWriters,
) {
    let fps = diagnostics.as_deref().map(current_fps).unwrap_or(0.0);

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                let (response, visual_request) = handle_rpc_request(&request, fps, &config);
                if let Some(visual_request) = visual_request {
                    requests.send(visual_request);
                }
                if let Some(response) = response {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Unparseable RPC message: {}", parse_error);
            }
        }
    }
}

/// Validate one request. Requests with an ID get a response; notifications
/// only produce the engine request.
pub fn handle_rpc_request(
    request: &RpcRequest,
    fps: f32,
    config: &VisualsConfig,
) -> (Option<RpcResponse>, Option<VisualRequest>) {
    let params = &request.params;
    let result = match request.method.as_str() {
        "update_config" => handle_update_config(params, config),
        "toggle" => handle_toggle(params),
        "set_color_theme" => handle_set_color_theme(params),
        "pause_animations" => Ok(playback(true)),
        "resume_animations" => Ok(playback(false)),
        "trigger_animation" => handle_trigger_animation(params),
        "destroy" => Ok((
            serde_json::json!({ "success": true }),
            Some(VisualRequest::Teardown),
        )),
        "get_fps" => Ok((serde_json::json!({ "fps": fps }), None)),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    let Some(id) = request.id.clone() else {
        return (None, result.ok().and_then(|(_, visual)| visual));
    };

    match result {
        Ok((result_value, visual)) => (
            Some(RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(result_value),
                error: None,
                id: Some(id),
            }),
            visual,
        ),
        Err(error) => (
            Some(RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(error),
                id: Some(id),
            }),
            None,
        ),
    }
}

type MethodResult = Result<(serde_json::Value, Option<VisualRequest>), RpcError>;

fn handle_update_config(params: &serde_json::Value, config: &VisualsConfig) -> MethodResult {
    if !params.is_object() {
        return Err(RpcError::invalid_params("Expected a configuration object"));
    }
    config
        .merged(params)
        .map_err(|e| RpcError::invalid_params(&format!("Invalid configuration: {}", e)))?;

    Ok((
        serde_json::json!({ "success": true }),
        Some(VisualRequest::ConfigPatch(ConfigPatchRequest(params.clone()))),
    ))
}

fn handle_toggle(params: &serde_json::Value) -> MethodResult {
    #[derive(serde::Deserialize)]
    struct ToggleParams {
        subsystem: String,
        visible: Option<bool>,
    }

    let toggle = serde_json::from_value::<ToggleParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'subsystem' parameter"))?;
    let target = ToggleTarget::from_string(&toggle.subsystem).ok_or_else(|| {
        RpcError::invalid_params(&format!("Unknown subsystem: {}", toggle.subsystem))
    })?;

    Ok((
        serde_json::json!({ "success": true, "subsystem": toggle.subsystem }),
        Some(VisualRequest::Toggle(ToggleRequest {
            target,
            visible: toggle.visible,
        })),
    ))
}

fn handle_set_color_theme(params: &serde_json::Value) -> MethodResult {
    #[derive(serde::Deserialize)]
    struct ThemeParams {
        colors: [String; 2],
    }

    let theme = serde_json::from_value::<ThemeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'colors' with two hex colours"))?;
    let [first, second] = &theme.colors;
    let colors = match (parse_color(first), parse_color(second)) {
        (Some(a), Some(b)) => [a, b],
        _ => return Err(RpcError::invalid_params("Colours must be CSS hex values")),
    };

    Ok((
        serde_json::json!({ "success": true, "colors": theme.colors }),
        Some(VisualRequest::ColorTheme(ColorThemeRequest { colors })),
    ))
}

fn handle_trigger_animation(params: &serde_json::Value) -> MethodResult {
    #[derive(serde::Deserialize)]
    struct TriggerParams {
        selector: String,
        #[serde(default = "default_animation")]
        kind: String,
    }

    fn default_animation() -> String {
        "fadeIn".to_string()
    }

    let trigger = serde_json::from_value::<TriggerParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'selector' parameter"))?;
    let kind = RevealKind::from_string(&trigger.kind).ok_or_else(|| {
        RpcError::invalid_params(&format!("Unknown animation: {}", trigger.kind))
    })?;

    Ok((
        serde_json::json!({ "success": true }),
        Some(VisualRequest::Trigger(TriggerRevealRequest {
            selector: trigger.selector,
            kind,
        })),
    ))
}

fn playback(paused: bool) -> (serde_json::Value, Option<VisualRequest>) {
    (
        serde_json::json!({ "success": true, "paused": paused }),
        Some(VisualRequest::Playback(PlaybackRequest { paused })),
    )
}

/// Smoothed frame rate from the diagnostics store.
pub fn current_fps(diagnostics: &DiagnosticsStore) -> f32 {
    diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    if rpc_interface.outgoing_notifications.is_empty()
        && rpc_interface.outgoing_responses.is_empty()
    {
        return;
    }

    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Ok(json) = serde_json::to_string(message) {
            debug!("→ {}", json);
        }
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(method: &str, params: serde_json::Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: Some(json!(7)),
        }
    }

    fn error_code(response: Option<RpcResponse>) -> Option<i32> {
        response.and_then(|r| r.error).map(|e| e.code)
    }

    #[test]
    fn unknown_method_is_method_not_found() {
        let (response, visual) =
            handle_rpc_request(&request("explode", json!({})), 60.0, &VisualsConfig::default());
        assert_eq!(error_code(response), Some(-32601));
        assert!(visual.is_none());
    }

    #[test]
    fn bad_params_are_invalid_params() {
        let config = VisualsConfig::default();
        let cases = [
            request("toggle", json!({})),
            request("toggle", json!({ "subsystem": "sound" })),
            request("set_color_theme", json!({ "colors": ["#ff0000"] })),
            request("set_color_theme", json!({ "colors": ["#ff0000", "teal-ish"] })),
            request("trigger_animation", json!({ "kind": "fadeIn" })),
            request("trigger_animation", json!({ "selector": ".x", "kind": "spin" })),
            request("update_config", json!([1, 2])),
            request("update_config", json!({ "particles": { "count": "many" } })),
        ];
        for case in cases {
            let (response, visual) = handle_rpc_request(&case, 60.0, &config);
            assert_eq!(error_code(response), Some(-32602), "{}", case.method);
            assert!(visual.is_none());
        }
    }

    #[test]
    fn valid_requests_map_to_engine_requests() {
        let config = VisualsConfig::default();

        let (response, visual) = handle_rpc_request(
            &request("toggle", json!({ "subsystem": "particles", "visible": false })),
            60.0,
            &config,
        );
        assert!(response.unwrap().error.is_none());
        assert_eq!(
            visual,
            Some(VisualRequest::Toggle(ToggleRequest {
                target: ToggleTarget::Particles,
                visible: Some(false),
            }))
        );

        let (_, visual) = handle_rpc_request(
            &request("trigger_animation", json!({ "selector": ".stat-item" })),
            60.0,
            &config,
        );
        assert_eq!(
            visual,
            Some(VisualRequest::Trigger(TriggerRevealRequest {
                selector: ".stat-item".to_string(),
                kind: RevealKind::Fade,
            }))
        );

        let (_, visual) = handle_rpc_request(&request("destroy", json!(null)), 60.0, &config);
        assert_eq!(visual, Some(VisualRequest::Teardown));

        let (_, visual) =
            handle_rpc_request(&request("pause_animations", json!(null)), 60.0, &config);
        assert_eq!(
            visual,
            Some(VisualRequest::Playback(PlaybackRequest { paused: true }))
        );
    }

    #[test]
    fn get_fps_reports_the_rate() {
        let (response, visual) =
            handle_rpc_request(&request("get_fps", json!({})), 59.5, &VisualsConfig::default());
        assert_eq!(response.unwrap().result, Some(json!({ "fps": 59.5 })));
        assert!(visual.is_none());
    }

    #[test]
    fn notifications_act_without_responding() {
        let mut notification = request("resume_animations", json!({}));
        notification.id = None;
        let (response, visual) =
            handle_rpc_request(&notification, 60.0, &VisualsConfig::default());
        assert!(response.is_none());
        assert_eq!(
            visual,
            Some(VisualRequest::Playback(PlaybackRequest { paused: false }))
        );
    }

    #[test]
    fn missing_params_field_parses() {
        let parsed: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"destroy","id":1}"#).unwrap();
        assert_eq!(parsed.params, serde_json::Value::Null);
    }
}
