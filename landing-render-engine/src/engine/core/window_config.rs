use bevy::prelude::*;
use bevy::window::{CompositeAlphaMode, PresentMode};

/// Primary window for the hero scene.
///
/// On the web the scene draws into the page's canvas with a transparent
/// background so the page shows through.
pub fn create_window_config(canvas_selector: Option<&str>) -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: canvas_selector.map(str::to_string),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            transparent: true,
            composite_alpha_mode: CompositeAlphaMode::PreMultiplied,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = canvas_selector;
        Window {
            title: "Landing visuals".into(),
            transparent: true,
            composite_alpha_mode: CompositeAlphaMode::Auto,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}
