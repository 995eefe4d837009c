use bevy::prelude::*;
use constants::{follower, palette, performance, render_settings, scene};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    pub enabled: bool,
    pub count: usize,
    pub min_count: usize,
    /// Two CSS hex colours, picked per particle by coin flip.
    pub palette: [String; 2],
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            count: scene::PARTICLE_COUNT,
            min_count: scene::MIN_PARTICLE_COUNT,
            palette: palette::DEFAULT_PARTICLE_PALETTE.map(hex_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerSettings {
    pub enabled: bool,
    pub smoothing: f32,
}

impl Default for FollowerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            smoothing: follower::FOLLOWER_SMOOTHING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub rotation_smoothing: f32,
    pub camera_base_z: f32,
    pub camera_scroll_pull_back: f32,
    pub float_amplitude: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            rotation_smoothing: scene::ROTATION_SMOOTHING,
            camera_base_z: render_settings::CAMERA_BASE_Z,
            camera_scroll_pull_back: render_settings::CAMERA_SCROLL_PULL_BACK,
            float_amplitude: scene::FLOAT_AMPLITUDE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    pub frame_budget_ms: f32,
    pub sustained_frames: u32,
    pub degraded_density_factor: f32,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            frame_budget_ms: performance::FRAME_BUDGET_MS,
            sustained_frames: performance::SUSTAINED_SLOW_FRAMES,
            degraded_density_factor: performance::DEGRADED_DENSITY_FACTOR,
        }
    }
}

/// Runtime configuration, loaded from `visuals.config.json` and patched over RPC.
#[derive(Resource, Asset, TypePath, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualsConfig {
    pub particles: ParticleSettings,
    pub follower: FollowerSettings,
    pub scene: SceneSettings,
    pub performance: PerformanceSettings,
}

impl VisualsConfig {
    /// Overlay a partial JSON document. Fields the patch leaves out keep their value.
    pub fn merged(&self, patch: &Value) -> Result<Self, serde_json::Error> {
        let mut current = serde_json::to_value(self)?;
        merge_json(&mut current, patch);
        serde_json::from_value(current)
    }

    /// Particle palette as colours; unparseable entries fall back to the defaults.
    pub fn particle_palette(&self) -> [Color; 2] {
        let defaults = palette::DEFAULT_PARTICLE_PALETTE;
        [0, 1].map(|i| parse_color(&self.particles.palette[i]).unwrap_or(hex_color(defaults[i])))
    }
}

fn merge_json(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

pub fn hex_string(hex: u32) -> String {
    format!("#{:06x}", hex & 0xff_ffff)
}

pub fn hex_color(hex: u32) -> Color {
    let [r, g, b] = palette::rgb_channels(hex);
    Color::srgb_u8(r, g, b)
}

pub fn parse_color(value: &str) -> Option<Color> {
    Srgba::hex(value).ok().map(Color::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_patch_keeps_unspecified_fields() {
        let config = VisualsConfig::default();
        let patched = config
            .merged(&json!({ "particles": { "count": 80 } }))
            .unwrap();

        assert_eq!(patched.particles.count, 80);
        assert_eq!(patched.particles.min_count, config.particles.min_count);
        assert_eq!(patched.particles.palette, config.particles.palette);
        assert_eq!(patched.follower, config.follower);
        assert_eq!(patched.scene, config.scene);
    }

    #[test]
    fn ill_typed_patch_is_rejected() {
        let config = VisualsConfig::default();
        assert!(config
            .merged(&json!({ "particles": { "count": "lots" } }))
            .is_err());
    }

    #[test]
    fn partial_file_deserializes_over_defaults() {
        let config: VisualsConfig =
            serde_json::from_str(r#"{ "follower": { "enabled": false } }"#).unwrap();
        assert!(!config.follower.enabled);
        assert_eq!(config.follower.smoothing, follower::FOLLOWER_SMOOTHING);
        assert_eq!(config.particles.count, scene::PARTICLE_COUNT);
    }

    #[test]
    fn palette_parses_and_falls_back() {
        let mut config = VisualsConfig::default();
        assert_eq!(config.particles.palette[0], "#00ffff");
        assert_eq!(config.particle_palette()[1], hex_color(palette::PINK));

        config.particles.palette = ["#ffffff".into(), "not a colour".into()];
        let [first, second] = config.particle_palette();
        assert_eq!(first, Color::srgb_u8(255, 255, 255));
        assert_eq!(second, hex_color(palette::PINK));
    }
}
