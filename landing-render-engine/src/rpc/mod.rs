//! JSON-RPC 2.0 control surface for the host page.
//!
//! The landing page (or a parent window embedding it) drives the visual
//! layer through `postMessage`. Requests carrying an `id` get a response;
//! requests without one act silently.
//!
//! ## Message Flow
//!
//! ```text
//! Host page  <──postMessage──>  Visual layer
//!     │                               │
//!     ├─ Request (with ID) ─────────> │
//!     │                               ├─ Validate, emit engine request event
//!     │ <──────── Response (with ID) ─┤
//!     │                               │
//!     │ <─────── Notification (no ID) ┤
//! ```
//!
//! ## Methods
//!
//! - `update_config`: merge a partial configuration object
//! - `toggle`: `{ subsystem: "particles" | "follower" | "scene", visible? }`
//! - `set_color_theme`: `{ colors: [hex, hex] }`, rebuilds the particle field
//! - `pause_animations` / `resume_animations`
//! - `trigger_animation`: `{ selector, kind: "fadeIn" | "slideUp" | "scale" }`
//! - `destroy`: tear the whole layer down
//! - `get_fps`: current smoothed frame rate
//!
//! ## Notifications
//!
//! `fps_update` (every half second), `performance_degraded`,
//! `config_applied` and `torn_down`.
//!
//! ## Error Handling
//!
//! - `-32601`: Method not found
//! - `-32602`: Invalid params

/// JSON-RPC 2.0 bidirectional communication system.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
