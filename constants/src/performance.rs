/// Frame budget for 60 fps, milliseconds.
pub const FRAME_BUDGET_MS: f32 = 16.0;

/// Consecutive over-budget frames that count as sustained degradation.
pub const SUSTAINED_SLOW_FRAMES: u32 = 30;

/// Particle density multiplier applied on degradation.
pub const DEGRADED_DENSITY_FACTOR: f32 = 0.5;

/// Interval between `fps_update` notifications, seconds.
pub const FPS_NOTIFY_INTERVAL: f32 = 0.5;
