//! Compile-time defaults shared by the landing page visual layer.

pub mod follower;
pub mod palette;
pub mod performance;
pub mod render_settings;
pub mod reveal;
pub mod scene;
