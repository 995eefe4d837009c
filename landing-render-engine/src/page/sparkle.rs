use bevy::prelude::*;
use constants::reveal::{
    SLIDE_GLOW_SECS, SPARKLE_CLASS, SPARKLE_COUNT, SPARKLE_KEYFRAMES_ID, SPARKLE_LIFETIME_SECS,
};
use rand::Rng;

use super::document::{ElementHandle, NewElement, PageDocument};

const SPARKLE_KEYFRAMES: &str = "@keyframes sparkle-float {
    0% { opacity: 1; transform: translateY(0) scale(0); }
    50% { opacity: 1; transform: translateY(-20px) scale(1); }
    100% { opacity: 0; transform: translateY(-40px) scale(0); }
}";

/// Deferred DOM mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum TimedAction {
    Remove(ElementHandle),
    ClearStyle {
        element: ElementHandle,
        property: &'static str,
    },
}

#[derive(Debug)]
struct TimedEffect {
    action: TimedAction,
    timer: Timer,
}

/// Timers for short-lived decorations, ticked on the real clock.
#[derive(Resource, Debug, Default)]
pub struct TimedEffects {
    pending: Vec<TimedEffect>,
}

impl TimedEffects {
    pub fn schedule(&mut self, action: TimedAction, seconds: f32) {
        self.pending.push(TimedEffect {
            action,
            timer: Timer::from_seconds(seconds, TimerMode::Once),
        });
    }

    /// Advance every timer and hand back the actions that came due.
    pub fn tick(&mut self, delta: std::time::Duration) -> Vec<TimedAction> {
        let mut due = Vec::new();
        self.pending.retain_mut(|effect| {
            effect.timer.tick(delta);
            if effect.timer.finished() {
                due.push(effect.action.clone());
                false
            } else {
                true
            }
        });
        due
    }

    /// Every pending action, due or not.
    pub fn drain_all(&mut self) -> Vec<TimedAction> {
        self.pending.drain(..).map(|effect| effect.action).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

pub fn apply_action(document: &mut dyn PageDocument, action: TimedAction) {
    match action {
        TimedAction::Remove(element) => document.remove_element(element),
        TimedAction::ClearStyle { element, property } => {
            document.set_style(element, property, "");
        }
    }
}

/// Attach a burst of sparkle dots to `element`, each removed after its lifetime.
pub fn spawn_sparkles(
    document: &mut dyn PageDocument,
    element: ElementHandle,
    effects: &mut TimedEffects,
    rng: &mut impl Rng,
) -> usize {
    if !document.has_stylesheet(SPARKLE_KEYFRAMES_ID) {
        document.inject_stylesheet(SPARKLE_KEYFRAMES_ID, SPARKLE_KEYFRAMES);
    }

    let mut spawned = 0;
    for _ in 0..SPARKLE_COUNT {
        let css = format!(
            "position: absolute; width: 4px; height: 4px; background: #00ffff; \
             border-radius: 50%; pointer-events: none; z-index: 1000; \
             top: {:.1}%; left: {:.1}%; \
             animation: sparkle-float {}s ease-out forwards; box-shadow: 0 0 6px #00ffff;",
            rng.random::<f32>() * 100.0,
            rng.random::<f32>() * 100.0,
            SPARKLE_LIFETIME_SECS,
        );
        let sparkle = document.create_element(NewElement {
            tag: "div",
            class_name: SPARKLE_CLASS,
            id: None,
            parent: Some(element),
            css_text: &css,
        });
        if let Some(sparkle) = sparkle {
            effects.schedule(TimedAction::Remove(sparkle), SPARKLE_LIFETIME_SECS);
            spawned += 1;
        }
    }
    spawned
}

/// Glow under a freshly slid-in element, cleared after a second.
pub fn apply_slide_glow(
    document: &mut dyn PageDocument,
    element: ElementHandle,
    effects: &mut TimedEffects,
) {
    document.set_style(element, "box-shadow", constants::reveal::SLIDE_GLOW);
    effects.schedule(
        TimedAction::ClearStyle {
            element,
            property: "box-shadow",
        },
        SLIDE_GLOW_SECS,
    );
}

pub fn run_timed_effects(
    time: Res<Time<Real>>,
    mut effects: ResMut<TimedEffects>,
    mut host: NonSendMut<super::PageHost>,
) {
    if effects.is_empty() {
        return;
    }
    for action in effects.tick(time.delta()) {
        apply_action(&mut **host, action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::headless::HeadlessDocument;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    #[test]
    fn sparkles_are_removed_after_their_lifetime() {
        let mut doc = HeadlessDocument::synthetic_page(1280.0, 800.0);
        let card = doc.add_element(".feature-card", None);
        let mut effects = TimedEffects::default();
        let mut rng = StdRng::seed_from_u64(7);

        let spawned = spawn_sparkles(&mut doc, card, &mut effects, &mut rng);
        assert_eq!(spawned, SPARKLE_COUNT);
        assert_eq!(doc.count_with_class(SPARKLE_CLASS), SPARKLE_COUNT);
        assert_eq!(doc.children_of(card).len(), SPARKLE_COUNT);
        assert!(doc.stylesheet(SPARKLE_KEYFRAMES_ID).is_some());

        for action in effects.tick(Duration::from_secs_f32(1.9)) {
            apply_action(&mut doc, action);
        }
        assert_eq!(doc.count_with_class(SPARKLE_CLASS), SPARKLE_COUNT);

        for action in effects.tick(Duration::from_secs_f32(0.2)) {
            apply_action(&mut doc, action);
        }
        assert_eq!(doc.count_with_class(SPARKLE_CLASS), 0);
        assert!(effects.is_empty());
    }

    #[test]
    fn sparkles_are_removed_even_if_the_host_element_is_gone() {
        let mut doc = HeadlessDocument::synthetic_page(1280.0, 800.0);
        let card = doc.add_element(".agent-card", None);
        let mut effects = TimedEffects::default();
        let mut rng = StdRng::seed_from_u64(1);

        spawn_sparkles(&mut doc, card, &mut effects, &mut rng);
        doc.remove_element(card);

        for action in effects.tick(Duration::from_secs(3)) {
            apply_action(&mut doc, action);
        }
        assert_eq!(doc.count_with_class(SPARKLE_CLASS), 0);
    }

    #[test]
    fn slide_glow_clears_after_one_second() {
        let mut doc = HeadlessDocument::synthetic_page(1280.0, 800.0);
        let stat = doc.add_element(".hero-stats .stat-item", None);
        let mut effects = TimedEffects::default();

        apply_slide_glow(&mut doc, stat, &mut effects);
        assert_eq!(
            doc.style(stat, "box-shadow").as_deref(),
            Some(constants::reveal::SLIDE_GLOW)
        );

        for action in effects.tick(Duration::from_millis(1_050)) {
            apply_action(&mut doc, action);
        }
        assert_eq!(doc.style(stat, "box-shadow").as_deref(), Some(""));
    }
}
