//! Continuous scroll-driven section effects.
//!
//! Every effect is a pure function of the scroll offset or a section's
//! visibility; the systems only look up elements and write the results.

use bevy::prelude::*;
use constants::reveal::{
    AGENT_CARD_SELECTOR, CARD_STAGGER, DEMO_SCREEN_SELECTOR, FEATURE_CARD_SELECTOR,
    HERO_SUBTITLE_SELECTOR, HERO_TITLE_SELECTOR, PARALLAX_SELECTOR, PROGRESS_BAR_ID,
    SECTION_SELECTOR,
};
use std::f32::consts::PI;

use super::PageHost;
use super::document::{ElementHandle, ElementRect, NewElement, PageDocument};
use super::reveal::MotionPreference;
use crate::engine::core::app_state::AppState;
use crate::engine::frame::{FrameSet, PageStartup, ScrollState, TeardownSet};

const PROGRESS_BAR_CSS: &str = "position: fixed; top: 0; left: 0; height: 3px; \
    background: linear-gradient(90deg, #00ffff, #ff0080); z-index: 10001; \
    transition: width 0.1s ease; box-shadow: 0 0 10px rgba(0, 255, 255, 0.5);";

pub fn parallax_transform(offset: f32, index: usize) -> String {
    let speed = 0.1 + index as f32 * 0.05;
    format!(
        "translate3d(0, {}px, 0) rotate({}deg)",
        offset * speed,
        offset * 0.1
    )
}

pub fn progress_width(fraction: f32) -> String {
    format!("{}%", fraction.clamp(0.0, 1.0) * 100.0)
}

/// How far a section has scrolled into view, `None` while it is off screen.
pub fn section_visibility(rect: ElementRect, viewport_height: f32) -> Option<f32> {
    if viewport_height <= 0.0 || rect.top >= viewport_height || rect.bottom <= 0.0 {
        return None;
    }
    Some(((viewport_height - rect.top) / viewport_height).clamp(0.0, 1.0))
}

pub fn hero_title_transform(visibility: f32) -> String {
    format!(
        "scale({}) perspective(1000px) rotateX({}deg)",
        1.0 + visibility * 0.05,
        visibility * 2.0
    )
}

pub fn hero_subtitle_filter(visibility: f32) -> String {
    format!("blur({}px)", (1.0 - visibility) * 2.0)
}

/// Staggered card flip; `None` until the card's turn has come.
pub fn agent_card_style(visibility: f32, index: usize) -> Option<(String, f32)> {
    let progress = (visibility - index as f32 * CARD_STAGGER).clamp(0.0, 1.0);
    if progress <= 0.0 {
        return None;
    }
    Some((
        format!(
            "perspective(1000px) rotateY({}deg) translateZ({}px)",
            (1.0 - progress) * 45.0,
            progress * 20.0
        ),
        progress,
    ))
}

pub fn feature_wave_transform(visibility: f32, index: usize) -> String {
    let wave = (visibility * PI + index as f32).sin() * 10.0;
    format!("translateY({}px) rotate({}deg)", wave, visibility * 2.0)
}

pub fn demo_screen_transform(visibility: f32) -> String {
    format!(
        "perspective({}px) rotateX({}deg)",
        1000.0 - visibility * 200.0,
        (1.0 - visibility) * 15.0
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionKind {
    Hero {
        title: Option<ElementHandle>,
        subtitle: Option<ElementHandle>,
    },
    Agents {
        cards: Vec<ElementHandle>,
    },
    Features {
        cards: Vec<ElementHandle>,
    },
    Demo {
        screen: Option<ElementHandle>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionBinding {
    pub element: ElementHandle,
    pub kind: SectionKind,
}

/// Elements touched by the per-frame scroll effects, looked up once.
///
/// Only present when motion is allowed.
#[derive(Resource, Debug, Default)]
pub struct SectionEffects {
    pub parallax: Vec<ElementHandle>,
    pub sections: Vec<SectionBinding>,
    progress_bar: Option<ElementHandle>,
    handled_frames: u64,
    torn_down: bool,
}

impl SectionEffects {
    pub fn discover(document: &mut dyn PageDocument) -> Self {
        let parallax = document.query_all(PARALLAX_SELECTOR);
        let mut sections = Vec::new();
        for element in document.query_all(SECTION_SELECTOR) {
            let first = |document: &mut dyn PageDocument, selector: &str| {
                document.query_within(element, selector).into_iter().next()
            };
            let kind = match document.dom_id(element).as_deref() {
                Some("home") => SectionKind::Hero {
                    title: first(document, HERO_TITLE_SELECTOR),
                    subtitle: first(document, HERO_SUBTITLE_SELECTOR),
                },
                Some("agents") => SectionKind::Agents {
                    cards: document.query_within(element, AGENT_CARD_SELECTOR),
                },
                Some("features") => SectionKind::Features {
                    cards: document.query_within(element, FEATURE_CARD_SELECTOR),
                },
                Some("demo") => SectionKind::Demo {
                    screen: first(document, DEMO_SCREEN_SELECTOR),
                },
                _ => continue,
            };
            sections.push(SectionBinding { element, kind });
        }
        Self {
            parallax,
            sections,
            ..Default::default()
        }
    }

    pub fn handled_frames(&self) -> u64 {
        self.handled_frames
    }

    pub fn progress_bar(&self) -> Option<ElementHandle> {
        self.progress_bar
    }

    /// One coalesced scroll update.
    pub fn on_frame(&mut self, document: &mut dyn PageDocument, scroll: &ScrollState) {
        if self.torn_down {
            return;
        }
        let offset = scroll.metrics.offset;
        let viewport_height = scroll.metrics.viewport_height;

        for (index, &element) in self.parallax.iter().enumerate() {
            document.set_style(element, "transform", &parallax_transform(offset, index));
        }

        if self.progress_bar.is_none() {
            self.progress_bar = document.create_element(NewElement {
                tag: "div",
                class_name: "",
                id: Some(PROGRESS_BAR_ID),
                parent: None,
                css_text: PROGRESS_BAR_CSS,
            });
        }
        if let Some(bar) = self.progress_bar {
            document.set_style(bar, "width", &progress_width(scroll.fraction));
        }

        for section in &self.sections {
            let Some(visibility) = document
                .bounding_rect(section.element)
                .and_then(|rect| section_visibility(rect, viewport_height))
            else {
                continue;
            };
            apply_section(document, &section.kind, visibility);
        }
        self.handled_frames += 1;
    }

    pub fn teardown(&mut self, document: &mut dyn PageDocument) {
        if self.torn_down {
            return;
        }
        if let Some(bar) = self.progress_bar.take() {
            document.remove_element(bar);
        }
        self.torn_down = true;
    }
}

fn apply_section(document: &mut dyn PageDocument, kind: &SectionKind, visibility: f32) {
    match kind {
        SectionKind::Hero { title, subtitle } => {
            if let Some(title) = *title {
                document.set_style(title, "transform", &hero_title_transform(visibility));
            }
            if let Some(subtitle) = *subtitle {
                document.set_style(subtitle, "filter", &hero_subtitle_filter(visibility));
            }
        }
        SectionKind::Agents { cards } => {
            for (index, &card) in cards.iter().enumerate() {
                if let Some((transform, opacity)) = agent_card_style(visibility, index) {
                    document.set_style(card, "transform", &transform);
                    document.set_style(card, "opacity", &opacity.to_string());
                }
            }
        }
        SectionKind::Features { cards } => {
            for (index, &card) in cards.iter().enumerate() {
                document.set_style(card, "transform", &feature_wave_transform(visibility, index));
            }
        }
        SectionKind::Demo { screen } => {
            if let Some(screen) = *screen {
                document.set_style(screen, "transform", &demo_screen_transform(visibility));
            }
        }
    }
}

pub struct SectionEffectsPlugin;

impl Plugin for SectionEffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            setup_section_effects.in_set(PageStartup::Subsystems),
        )
        .add_systems(
            Update,
            apply_section_effects
                .in_set(FrameSet::Effects)
                .run_if(resource_exists::<SectionEffects>.and(resource_changed::<ScrollState>))
                .run_if(not(in_state(AppState::TornDown))),
        )
        .add_systems(
            OnEnter(AppState::TornDown),
            teardown_section_effects.in_set(TeardownSet::Subsystems),
        );
    }
}

fn setup_section_effects(
    mut commands: Commands,
    mut host: NonSendMut<PageHost>,
    preference: Res<MotionPreference>,
) {
    if preference.reduced {
        return;
    }
    let effects = SectionEffects::discover(&mut **host);
    info!(
        "Section effects: {} parallax elements, {} sections",
        effects.parallax.len(),
        effects.sections.len()
    );
    commands.insert_resource(effects);
}

fn apply_section_effects(
    mut host: NonSendMut<PageHost>,
    scroll: Res<ScrollState>,
    mut effects: ResMut<SectionEffects>,
) {
    effects.on_frame(&mut **host, &scroll);
}

fn teardown_section_effects(
    mut host: NonSendMut<PageHost>,
    effects: Option<ResMut<SectionEffects>>,
) {
    if let Some(mut effects) = effects {
        effects.teardown(&mut **host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::document::ScrollMetrics;
    use crate::page::headless::HeadlessDocument;

    #[test]
    fn visibility_is_clamped_and_hidden_offscreen() {
        let vh = 800.0;
        assert_eq!(section_visibility(ElementRect { top: 900.0, bottom: 1700.0 }, vh), None);
        assert_eq!(section_visibility(ElementRect { top: -900.0, bottom: -10.0 }, vh), None);
        assert_eq!(
            section_visibility(ElementRect { top: 400.0, bottom: 1200.0 }, vh),
            Some(0.5)
        );
        assert_eq!(
            section_visibility(ElementRect { top: -300.0, bottom: 500.0 }, vh),
            Some(1.0)
        );
    }

    #[test]
    fn agent_cards_wait_for_their_stagger() {
        assert!(agent_card_style(0.05, 1).is_none());
        assert!(agent_card_style(0.1, 1).is_none());

        let (transform, opacity) = agent_card_style(0.6, 1).unwrap();
        assert!((opacity - 0.5).abs() < 1e-6);
        assert!(transform.starts_with("perspective(1000px) rotateY(22.5deg)"));

        let (_, opacity) = agent_card_style(1.0, 0).unwrap();
        assert_eq!(opacity, 1.0);
    }

    #[test]
    fn parallax_speed_grows_with_index() {
        assert_eq!(
            parallax_transform(100.0, 0),
            "translate3d(0, 10px, 0) rotate(10deg)"
        );
        assert_eq!(
            parallax_transform(100.0, 2),
            "translate3d(0, 20px, 0) rotate(10deg)"
        );
    }

    #[test]
    fn neighbouring_feature_cards_are_out_of_phase() {
        assert_ne!(feature_wave_transform(0.3, 0), feature_wave_transform(0.3, 1));
        assert_eq!(demo_screen_transform(1.0), "perspective(800px) rotateX(0deg)");
        assert_eq!(hero_subtitle_filter(1.0), "blur(0px)");
        assert_eq!(progress_width(1.7), "100%");
    }

    #[test]
    fn frame_update_styles_visible_sections() {
        let mut doc = HeadlessDocument::synthetic_page(1280.0, 800.0);
        let home = doc.add_element(SECTION_SELECTOR, None);
        doc.set_dom_id(home, "home");
        doc.set_rect(home, 0.0, 800.0);
        let title = doc.add_element(HERO_TITLE_SELECTOR, Some(home));
        let demo = doc.add_element(SECTION_SELECTOR, None);
        doc.set_dom_id(demo, "demo");
        doc.set_rect(demo, 2400.0, 3200.0);
        let screen = doc.add_element(DEMO_SCREEN_SELECTOR, Some(demo));
        let float = doc.add_element(PARALLAX_SELECTOR, None);

        let mut effects = SectionEffects::discover(&mut doc);
        assert_eq!(effects.sections.len(), 2);

        let metrics = ScrollMetrics {
            offset: 400.0,
            ..doc.scroll_metrics()
        };
        let scroll = ScrollState::from_metrics(metrics);
        effects.on_frame(&mut doc, &scroll);

        assert_eq!(
            doc.style(title, "transform").as_deref(),
            Some(hero_title_transform(1.0).as_str())
        );
        assert_eq!(doc.style(screen, "transform"), None);
        assert!(doc.style(float, "transform").is_some());

        let bar = effects.progress_bar().unwrap();
        assert_eq!(doc.element_by_id(PROGRESS_BAR_ID), Some(bar));

        effects.teardown(&mut doc);
        effects.teardown(&mut doc);
        assert!(doc.is_removed(bar));
    }
}
