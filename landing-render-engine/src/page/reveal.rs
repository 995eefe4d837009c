use bevy::prelude::*;
use constants::reveal::{
    FADE_TIER, REDUCED_MOTION_STYLE_ID, RevealTierSettings, SCALE_TIER, SLIDE_STAGGER_SECS,
    SLIDE_TIER, SPARKLE_KEYFRAMES_ID,
};
use std::collections::HashMap;

use super::PageHost;
use super::document::{ElementHandle, PageDocument};
use super::sparkle::{TimedEffects, apply_action, apply_slide_glow, spawn_sparkles};
use crate::engine::core::app_state::AppState;
use crate::engine::core::requests::{PlaybackRequest, TriggerRevealRequest};
use crate::engine::core::session::SessionRng;
use crate::engine::frame::{FrameInbox, FrameSet, PageStartup, TeardownSet};

const REDUCED_MOTION_CSS: &str = "*, *::before, *::after {
    animation-duration: 0.01ms !important;
    animation-iteration-count: 1 !important;
    transition-duration: 0.01ms !important;
}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealKind {
    Fade,
    Slide,
    Scale,
}

impl RevealKind {
    pub const ALL: [RevealKind; 3] = [RevealKind::Fade, RevealKind::Slide, RevealKind::Scale];

    pub fn tier(self) -> &'static RevealTierSettings {
        match self {
            RevealKind::Fade => &FADE_TIER,
            RevealKind::Slide => &SLIDE_TIER,
            RevealKind::Scale => &SCALE_TIER,
        }
    }

    /// Accepts the host page's animation names as well as the short ones.
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "fadeIn" | "fade" => Some(RevealKind::Fade),
            "slideUp" | "slide" => Some(RevealKind::Slide),
            "scale" => Some(RevealKind::Scale),
            _ => None,
        }
    }

    /// Style applied at registration, before the element is seen.
    pub fn hidden_style(self, index: usize) -> Vec<(&'static str, String)> {
        match self {
            RevealKind::Fade => vec![
                ("opacity", "0".into()),
                ("transform", "translateY(20px)".into()),
            ],
            RevealKind::Slide => vec![
                ("opacity", "0".into()),
                ("transform", "translateY(40px)".into()),
                (
                    "transition-delay",
                    format!("{}s", index as f32 * SLIDE_STAGGER_SECS),
                ),
            ],
            RevealKind::Scale => vec![
                ("opacity", "0".into()),
                ("transform", "scale(0.8)".into()),
            ],
        }
    }

    /// Terminal style of the reveal transition.
    pub fn revealed_style(self) -> [(&'static str, &'static str); 3] {
        let transform = match self {
            RevealKind::Fade | RevealKind::Slide => "translateY(0)",
            RevealKind::Scale => "scale(1)",
        };
        [
            ("transition", self.tier().transition),
            ("opacity", "1"),
            ("transform", transform),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealTarget {
    pub element: ElementHandle,
    pub kind: RevealKind,
    pub index: usize,
    pub state: RevealState,
}

/// Whether the page asked for reduced motion. Read once at startup.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionPreference {
    pub reduced: bool,
}

/// One-shot reveal targets and their observer subscriptions. An element
/// matching several tiers holds one target per tier.
#[derive(Resource, Debug, Default)]
pub struct RevealCoordinator {
    targets: HashMap<(ElementHandle, RevealKind), RevealTarget>,
    revealed: usize,
    torn_down: bool,
}

impl RevealCoordinator {
    pub fn register(
        &mut self,
        document: &mut dyn PageDocument,
        element: ElementHandle,
        kind: RevealKind,
        index: usize,
    ) -> bool {
        if self.torn_down || self.targets.contains_key(&(element, kind)) {
            return false;
        }
        for (property, value) in kind.hidden_style(index) {
            document.set_style(element, property, &value);
        }
        document.observe(element, kind);
        self.targets.insert(
            (element, kind),
            RevealTarget {
                element,
                kind,
                index,
                state: RevealState::Hidden,
            },
        );
        true
    }

    /// Reveal a hidden target the observer reported. Returns whether anything happened.
    pub fn on_intersection(
        &mut self,
        document: &mut dyn PageDocument,
        effects: &mut TimedEffects,
        rng: &mut SessionRng,
        element: ElementHandle,
        kind: RevealKind,
    ) -> bool {
        let Some(target) = self.targets.get_mut(&(element, kind)) else {
            return false;
        };
        if target.state == RevealState::Revealed {
            return false;
        }
        target.state = RevealState::Revealed;
        self.revealed += 1;
        document.unobserve(element, kind);
        reveal(document, effects, rng, element, kind);
        true
    }

    /// Host-initiated reveal. Registered targets it touches count as revealed.
    pub fn trigger(
        &mut self,
        document: &mut dyn PageDocument,
        effects: &mut TimedEffects,
        rng: &mut SessionRng,
        element: ElementHandle,
        kind: RevealKind,
    ) {
        for target in self.targets.values_mut() {
            if target.element == element && target.state == RevealState::Hidden {
                target.state = RevealState::Revealed;
                self.revealed += 1;
                document.unobserve(element, target.kind);
            }
        }
        reveal(document, effects, rng, element, kind);
    }

    pub fn state(&self, element: ElementHandle, kind: RevealKind) -> Option<RevealState> {
        self.targets.get(&(element, kind)).map(|target| target.state)
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    pub fn teardown(&mut self, document: &mut dyn PageDocument, effects: &mut TimedEffects) {
        if self.torn_down {
            return;
        }
        document.disconnect_observers();
        for action in effects.drain_all() {
            apply_action(document, action);
        }
        document.remove_stylesheet(SPARKLE_KEYFRAMES_ID);
        document.remove_stylesheet(REDUCED_MOTION_STYLE_ID);
        self.torn_down = true;
    }
}

/// Apply the kind's transition and terminal style, plus its decoration.
pub fn reveal(
    document: &mut dyn PageDocument,
    effects: &mut TimedEffects,
    rng: &mut SessionRng,
    element: ElementHandle,
    kind: RevealKind,
) {
    for (property, value) in kind.revealed_style() {
        document.set_style(element, property, value);
    }
    match kind {
        RevealKind::Fade => {
            spawn_sparkles(document, element, effects, &mut rng.0);
        }
        RevealKind::Slide => apply_slide_glow(document, element, effects),
        RevealKind::Scale => {}
    }
}

pub struct RevealPlugin;

impl Plugin for RevealPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RevealCoordinator>()
            .init_resource::<TimedEffects>()
            .init_resource::<MotionPreference>()
            .add_systems(
                Startup,
                (
                    detect_motion_preference.in_set(PageStartup::Preferences),
                    register_reveal_targets.in_set(PageStartup::Subsystems),
                ),
            )
            .add_systems(
                Update,
                (
                    process_intersections,
                    handle_trigger_requests,
                    handle_playback_requests,
                    super::sparkle::run_timed_effects,
                )
                    .chain()
                    .in_set(FrameSet::Effects)
                    .run_if(not(in_state(AppState::TornDown))),
            )
            .add_systems(
                OnEnter(AppState::TornDown),
                teardown_reveal.in_set(TeardownSet::Subsystems),
            );
    }
}

fn detect_motion_preference(
    mut host: NonSendMut<PageHost>,
    mut preference: ResMut<MotionPreference>,
) {
    preference.reduced = host.prefers_reduced_motion();
    if preference.reduced {
        host.inject_stylesheet(REDUCED_MOTION_STYLE_ID, REDUCED_MOTION_CSS);
        info!("Reduced motion requested, scroll animations disabled");
    }
}

fn register_reveal_targets(
    mut host: NonSendMut<PageHost>,
    mut coordinator: ResMut<RevealCoordinator>,
    preference: Res<MotionPreference>,
) {
    if preference.reduced {
        return;
    }
    for kind in RevealKind::ALL {
        let elements = host.query_all(kind.tier().selector);
        for (index, element) in elements.into_iter().enumerate() {
            coordinator.register(&mut **host, element, kind, index);
        }
    }
    info!("Reveal targets registered: {}", coordinator.target_count());
}

fn process_intersections(
    inbox: Res<FrameInbox>,
    mut host: NonSendMut<PageHost>,
    mut coordinator: ResMut<RevealCoordinator>,
    mut effects: ResMut<TimedEffects>,
    mut rng: ResMut<SessionRng>,
) {
    for &(element, kind) in &inbox.intersections {
        coordinator.on_intersection(&mut **host, &mut effects, &mut rng, element, kind);
    }
}

fn handle_trigger_requests(
    mut requests: EventReader<TriggerRevealRequest>,
    mut host: NonSendMut<PageHost>,
    mut coordinator: ResMut<RevealCoordinator>,
    mut effects: ResMut<TimedEffects>,
    mut rng: ResMut<SessionRng>,
) {
    for request in requests.read() {
        let elements = host.query_all(&request.selector);
        if elements.is_empty() {
            warn!("trigger_animation: nothing matches {}", request.selector);
            continue;
        }
        for element in elements {
            coordinator.trigger(&mut **host, &mut effects, &mut rng, element, request.kind);
        }
    }
}

fn handle_playback_requests(
    mut requests: EventReader<PlaybackRequest>,
    mut host: NonSendMut<PageHost>,
    mut time: ResMut<Time<Virtual>>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };
    let play_state = if request.paused {
        time.pause();
        "paused"
    } else {
        time.unpause();
        "running"
    };
    if let Some(body) = host.body() {
        host.set_style(body, "animation-play-state", play_state);
    }
    info!("Animations {}", play_state);
}

fn teardown_reveal(
    mut host: NonSendMut<PageHost>,
    mut coordinator: ResMut<RevealCoordinator>,
    mut effects: ResMut<TimedEffects>,
) {
    coordinator.teardown(&mut **host, &mut effects);
}
