/// Perspective camera vertical field of view, degrees.
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Camera distance from the scene origin with the page scrolled to the top.
pub const CAMERA_BASE_Z: f32 = 100.0;

/// Extra camera distance at the bottom of the page.
pub const CAMERA_SCROLL_PULL_BACK: f32 = 50.0;

pub const FOG_START: f32 = 100.0;
pub const FOG_END: f32 = 1000.0;

pub const AMBIENT_BRIGHTNESS: f32 = 300.0;
pub const DIRECTIONAL_ILLUMINANCE: f32 = 2_000.0;
pub const DIRECTIONAL_POSITION: [f32; 3] = [50.0, 50.0, 50.0];

pub const POINT_LIGHT_INTENSITY: f32 = 1_000_000.0;
pub const POINT_LIGHT_RANGE: f32 = 100.0;
pub const PINK_LIGHT_POSITION: [f32; 3] = [-50.0, -50.0, 50.0];
pub const BLUE_LIGHT_POSITION: [f32; 3] = [50.0, -50.0, 50.0];

/// Canvas the scene renders into on the web.
pub const HERO_CANVAS_SELECTOR: &str = "#hero-canvas";
