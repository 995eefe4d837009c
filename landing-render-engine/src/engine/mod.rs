pub mod config;
pub mod core;
pub mod frame;
pub mod scene;
pub mod shaders;
pub mod smoothing;
pub mod systems;
