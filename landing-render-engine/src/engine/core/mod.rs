//! Core application setup and state management.
//!
//! Handles the application lifecycle, window configuration, dependency
//! injection and the request events the host surface feeds in.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Builds the windowed app, or installs the visual layer on an existing one.
pub mod app_setup;

/// Application state machine: loading, running, torn down.
pub mod app_state;

/// Injected surroundings of the app: page document, canvas, seed.
pub mod context;

/// Engine-side request events raised by the host surface.
pub mod requests;

/// Session random source.
pub mod session;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
