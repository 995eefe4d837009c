/// Fraction of the remaining distance the follower covers per frame.
pub const FOLLOWER_SMOOTHING: f32 = 0.1;

/// Follower dot diameter, pixels.
pub const FOLLOWER_SIZE: f32 = 20.0;

pub const FOLLOWER_CLASS: &str = "cursor-follower";

/// Elements that switch the follower into its hover look.
pub const INTERACTIVE_SELECTOR: &str = "button, a, .agent-card, .feature-card";

pub const IDLE_BACKGROUND: &str = "radial-gradient(circle, #00ffff, transparent)";
pub const HOVER_BACKGROUND: &str = "radial-gradient(circle, #ff0080, transparent)";
pub const IDLE_TRANSFORM: &str = "scale(1)";
pub const HOVER_TRANSFORM: &str = "scale(2)";
