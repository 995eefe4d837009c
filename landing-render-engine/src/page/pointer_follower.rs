use bevy::prelude::*;
use constants::follower::{
    FOLLOWER_CLASS, FOLLOWER_SIZE, HOVER_BACKGROUND, HOVER_TRANSFORM, IDLE_BACKGROUND,
    IDLE_TRANSFORM, INTERACTIVE_SELECTOR,
};
use std::collections::HashSet;

use super::PageHost;
use super::document::{ElementHandle, NewElement, PageDocument};
use crate::engine::config::VisualsConfig;
use crate::engine::core::app_state::AppState;
use crate::engine::core::requests::{ToggleRequest, ToggleTarget};
use crate::engine::frame::{FrameInbox, FrameSet, PerformanceDegraded, TeardownSet};
use crate::engine::smoothing::ExponentialSmoother;

const FOLLOWER_CSS: &str = "position: fixed; width: 20px; height: 20px; \
    background: radial-gradient(circle, #00ffff, transparent); border-radius: 50%; \
    pointer-events: none; z-index: 9999; mix-blend-mode: difference; \
    transition: transform 0.1s ease; opacity: 0.7;";

/// A dot that trails the pointer and grows over interactive elements.
#[derive(Resource, Debug)]
pub struct PointerFollower {
    element: ElementHandle,
    smoother: ExponentialSmoother,
    interactive: HashSet<ElementHandle>,
    hovering: HashSet<ElementHandle>,
    hover_style: bool,
    toggled_off: bool,
    hidden_by_degradation: bool,
    torn_down: bool,
}

impl PointerFollower {
    pub fn create(document: &mut dyn PageDocument, smoothing: f32) -> Option<Self> {
        let element = document.create_element(NewElement {
            tag: "div",
            class_name: FOLLOWER_CLASS,
            id: None,
            parent: None,
            css_text: FOLLOWER_CSS,
        })?;

        let interactive: HashSet<_> = document.query_all(INTERACTIVE_SELECTOR).into_iter().collect();
        for &target in &interactive {
            document.watch_hover(target);
        }

        Some(Self {
            element,
            smoother: ExponentialSmoother::new(smoothing),
            interactive,
            hovering: HashSet::new(),
            hover_style: false,
            toggled_off: false,
            hidden_by_degradation: false,
            torn_down: false,
        })
    }

    pub fn element(&self) -> ElementHandle {
        self.element
    }

    pub fn position(&self) -> Vec2 {
        self.smoother.current
    }

    pub fn set_target(&mut self, pointer: Vec2) {
        self.smoother.target = pointer;
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoother.set_factor(smoothing);
    }

    pub fn is_visible(&self) -> bool {
        !self.torn_down && !self.toggled_off && !self.hidden_by_degradation
    }

    /// Advance one frame and write the dot's offset if it moved.
    pub fn step(&mut self, document: &mut dyn PageDocument) {
        if self.torn_down {
            return;
        }
        let previous = self.smoother.current;
        let position = self.smoother.step();
        if position == previous {
            return;
        }
        let half = FOLLOWER_SIZE / 2.0;
        document.set_style(self.element, "left", &format!("{}px", position.x - half));
        document.set_style(self.element, "top", &format!("{}px", position.y - half));
    }

    /// Styles change only when the hovered/idle look actually flips.
    pub fn on_hover(&mut self, document: &mut dyn PageDocument, element: ElementHandle, hovered: bool) {
        if self.torn_down || !self.interactive.contains(&element) {
            return;
        }
        if hovered {
            self.hovering.insert(element);
        } else {
            self.hovering.remove(&element);
        }

        let hover_style = !self.hovering.is_empty();
        if hover_style == self.hover_style {
            return;
        }
        self.hover_style = hover_style;
        let (transform, background) = if hover_style {
            (HOVER_TRANSFORM, HOVER_BACKGROUND)
        } else {
            (IDLE_TRANSFORM, IDLE_BACKGROUND)
        };
        document.set_style(self.element, "transform", transform);
        document.set_style(self.element, "background", background);
    }

    pub fn is_hover_style(&self) -> bool {
        self.hover_style
    }

    /// Permanent: neither toggling nor config brings the dot back.
    pub fn hide_for_degradation(&mut self, document: &mut dyn PageDocument) {
        if self.torn_down || self.hidden_by_degradation {
            return;
        }
        self.hidden_by_degradation = true;
        document.set_style(self.element, "display", "none");
    }

    pub fn set_toggled(&mut self, document: &mut dyn PageDocument, visible: bool) {
        if self.torn_down || self.toggled_off == !visible {
            return;
        }
        self.toggled_off = !visible;
        if self.hidden_by_degradation {
            return;
        }
        document.set_style(self.element, "display", if visible { "block" } else { "none" });
    }

    pub fn teardown(&mut self, document: &mut dyn PageDocument) {
        if self.torn_down {
            return;
        }
        document.remove_element(self.element);
        self.interactive.clear();
        self.hovering.clear();
        self.torn_down = true;
    }
}

pub struct PointerFollowerPlugin;

impl Plugin for PointerFollowerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Running), spawn_follower)
            .add_systems(
                Update,
                (
                    follow_config_changes.run_if(resource_changed::<VisualsConfig>),
                    hide_follower_on_degradation,
                    handle_follower_toggles,
                    track_pointer,
                )
                    .chain()
                    .in_set(FrameSet::Effects)
                    .run_if(resource_exists::<PointerFollower>)
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(
                OnEnter(AppState::TornDown),
                teardown_follower.in_set(TeardownSet::Subsystems),
            );
    }
}

fn spawn_follower(
    mut commands: Commands,
    mut host: NonSendMut<PageHost>,
    config: Res<VisualsConfig>,
    existing: Option<Res<PointerFollower>>,
) {
    if existing.is_some() || host.is_released() {
        return;
    }
    if !config.follower.enabled {
        info!("Pointer follower disabled by config");
        return;
    }
    match PointerFollower::create(&mut **host, config.follower.smoothing) {
        Some(follower) => {
            info!(
                "✓ Pointer follower watching {} interactive elements",
                follower.interactive.len()
            );
            commands.insert_resource(follower);
        }
        None => warn!("Pointer follower element could not be created"),
    }
}

fn follow_config_changes(config: Res<VisualsConfig>, mut follower: ResMut<PointerFollower>) {
    if follower.smoother.factor() != config.follower.smoothing {
        follower.set_smoothing(config.follower.smoothing);
    }
}

fn hide_follower_on_degradation(
    mut degraded: EventReader<PerformanceDegraded>,
    mut host: NonSendMut<PageHost>,
    mut follower: ResMut<PointerFollower>,
) {
    if degraded.read().last().is_some() {
        follower.hide_for_degradation(&mut **host);
    }
}

fn handle_follower_toggles(
    mut requests: EventReader<ToggleRequest>,
    mut host: NonSendMut<PageHost>,
    mut follower: ResMut<PointerFollower>,
) {
    for request in requests.read() {
        if request.target != ToggleTarget::Follower {
            continue;
        }
        let visible = request.visible.unwrap_or(follower.toggled_off);
        follower.set_toggled(&mut **host, visible);
    }
}

fn track_pointer(
    inbox: Res<FrameInbox>,
    mut host: NonSendMut<PageHost>,
    mut follower: ResMut<PointerFollower>,
) {
    if let Some(pointer) = inbox.pointer {
        follower.set_target(pointer);
    }
    for &(element, hovered) in &inbox.hover {
        follower.on_hover(&mut **host, element, hovered);
    }
    follower.step(&mut **host);
}

fn teardown_follower(mut host: NonSendMut<PageHost>, follower: Option<ResMut<PointerFollower>>) {
    if let Some(mut follower) = follower {
        follower.teardown(&mut **host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::headless::HeadlessDocument;

    fn page() -> (HeadlessDocument, ElementHandle) {
        let doc = HeadlessDocument::synthetic_page(1280.0, 800.0);
        let button = doc.add_element(INTERACTIVE_SELECTOR, None);
        (doc, button)
    }

    #[test]
    fn follower_trails_the_pointer_without_overshoot() {
        let (mut doc, _) = page();
        let mut follower = PointerFollower::create(&mut doc, 0.1).unwrap();
        follower.set_target(Vec2::new(500.0, 300.0));

        for _ in 0..300 {
            follower.step(&mut doc);
            let position = follower.position();
            assert!(position.x <= 500.0 && position.y <= 300.0);
        }
        assert!(follower.position().distance(Vec2::new(500.0, 300.0)) < 0.01);

        let left = doc.style(follower.element(), "left").unwrap();
        let left: f32 = left.trim_end_matches("px").parse().unwrap();
        assert!((left - 490.0).abs() < 0.05);
    }

    #[test]
    fn hover_styles_are_written_only_on_change() {
        let (mut doc, button) = page();
        let mut follower = PointerFollower::create(&mut doc, 0.1).unwrap();
        assert!(doc.is_hover_watched(button));
        let baseline = doc.style_writes();

        follower.on_hover(&mut doc, button, true);
        assert_eq!(
            doc.style(follower.element(), "transform").as_deref(),
            Some(HOVER_TRANSFORM)
        );
        let after_enter = doc.style_writes();
        assert_eq!(after_enter, baseline + 2);

        follower.on_hover(&mut doc, button, true);
        assert_eq!(doc.style_writes(), after_enter);

        follower.on_hover(&mut doc, button, false);
        assert!(!follower.is_hover_style());
        assert_eq!(
            doc.style(follower.element(), "background").as_deref(),
            Some(IDLE_BACKGROUND)
        );
    }

    #[test]
    fn hover_on_unwatched_elements_is_ignored() {
        let (mut doc, _) = page();
        let other = doc.add_element(".plain", None);
        let mut follower = PointerFollower::create(&mut doc, 0.1).unwrap();
        follower.on_hover(&mut doc, other, true);
        assert!(!follower.is_hover_style());
    }

    #[test]
    fn degradation_hides_for_good() {
        let (mut doc, _) = page();
        let mut follower = PointerFollower::create(&mut doc, 0.1).unwrap();

        follower.hide_for_degradation(&mut doc);
        follower.hide_for_degradation(&mut doc);
        assert_eq!(doc.style(follower.element(), "display").as_deref(), Some("none"));

        follower.set_toggled(&mut doc, false);
        follower.set_toggled(&mut doc, true);
        assert_eq!(doc.style(follower.element(), "display").as_deref(), Some("none"));
        assert!(!follower.is_visible());
    }

    #[test]
    fn toggle_hides_and_shows() {
        let (mut doc, _) = page();
        let mut follower = PointerFollower::create(&mut doc, 0.1).unwrap();
        follower.set_toggled(&mut doc, false);
        assert!(!follower.is_visible());
        follower.set_toggled(&mut doc, true);
        assert_eq!(doc.style(follower.element(), "display").as_deref(), Some("block"));
        assert!(follower.is_visible());
    }

    #[test]
    fn teardown_removes_the_element_once() {
        let (mut doc, _) = page();
        let mut follower = PointerFollower::create(&mut doc, 0.1).unwrap();
        assert_eq!(doc.count_with_class(FOLLOWER_CLASS), 1);

        follower.teardown(&mut doc);
        follower.teardown(&mut doc);
        assert!(doc.is_removed(follower.element()));
        assert_eq!(doc.count_with_class(FOLLOWER_CLASS), 0);

        let writes = doc.style_writes();
        follower.set_target(Vec2::new(10.0, 10.0));
        follower.step(&mut doc);
        assert_eq!(doc.style_writes(), writes);
    }
}
