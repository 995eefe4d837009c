use bevy::prelude::*;
use serde_json::Value;

use crate::page::reveal::RevealKind;

/// Partial configuration document to merge into [`VisualsConfig`](crate::engine::config::VisualsConfig).
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ConfigPatchRequest(pub Value);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    Particles,
    Follower,
    Scene,
}

impl ToggleTarget {
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "particles" => Some(ToggleTarget::Particles),
            "follower" | "cursor" => Some(ToggleTarget::Follower),
            "scene" => Some(ToggleTarget::Scene),
            _ => None,
        }
    }
}

/// Flip a subsystem's visibility, or force it when `visible` is set.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleRequest {
    pub target: ToggleTarget,
    pub visible: Option<bool>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ColorThemeRequest {
    pub colors: [Color; 2],
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub paused: bool,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct TriggerRevealRequest {
    pub selector: String,
    pub kind: RevealKind,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownRequest;

pub fn register_request_events(app: &mut App) {
    app.add_event::<ConfigPatchRequest>()
        .add_event::<ToggleRequest>()
        .add_event::<ColorThemeRequest>()
        .add_event::<PlaybackRequest>()
        .add_event::<TriggerRevealRequest>()
        .add_event::<TeardownRequest>();
}
