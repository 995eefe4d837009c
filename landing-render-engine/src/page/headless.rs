//! In-memory [`PageDocument`] used by native builds and tests.

use bevy::math::Vec2;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::document::{
    ElementHandle, ElementRect, NewElement, PageDocument, PageEvent, ScrollMetrics,
};
use super::reveal::RevealKind;

#[derive(Debug, Default)]
struct HeadlessElement {
    selectors: Vec<String>,
    class_name: String,
    dom_id: Option<String>,
    parent: Option<ElementHandle>,
    rect: Option<ElementRect>,
    styles: HashMap<String, String>,
    removed: bool,
}

impl HeadlessElement {
    fn matches(&self, selector: &str) -> bool {
        if self.removed {
            return false;
        }
        if self.selectors.iter().any(|s| s == selector) {
            return true;
        }
        if let Some(class) = selector.strip_prefix('.') {
            return self.class_name.split_whitespace().any(|c| c == class);
        }
        if let Some(id) = selector.strip_prefix('#') {
            return self.dom_id.as_deref() == Some(id);
        }
        false
    }
}

#[derive(Debug, Default)]
struct HeadlessState {
    elements: Vec<HeadlessElement>,
    body: Option<ElementHandle>,
    stylesheets: HashMap<String, String>,
    observed: HashSet<(ElementHandle, RevealKind)>,
    hover_watched: HashSet<ElementHandle>,
    events: Vec<PageEvent>,
    metrics: ScrollMetrics,
    reduced_motion: bool,
    style_writes: usize,
    releases: usize,
}

/// Shared handle to a synthetic page.
///
/// Elements are registered under the exact selector strings the visual layer
/// queries. Clones share state, so a test can keep one copy for inspection
/// while the app owns the other.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDocument {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessDocument {
    pub fn new(metrics: ScrollMetrics) -> Self {
        let document = Self::default();
        {
            let mut state = document.state.borrow_mut();
            state.metrics = metrics;
            state.elements.push(HeadlessElement {
                class_name: String::new(),
                selectors: vec!["body".to_string()],
                ..Default::default()
            });
            state.body = Some(ElementHandle(0));
        }
        document
    }

    /// Empty page sized like a typical landing page: four viewports tall.
    pub fn synthetic_page(width: f32, height: f32) -> Self {
        Self::new(ScrollMetrics {
            offset: 0.0,
            viewport_width: width,
            viewport_height: height,
            scroll_height: height * 4.0,
        })
    }

    pub fn add_element(&self, selector: &str, parent: Option<ElementHandle>) -> ElementHandle {
        let mut state = self.state.borrow_mut();
        let handle = ElementHandle(state.elements.len() as u32);
        state.elements.push(HeadlessElement {
            selectors: vec![selector.to_string()],
            parent,
            ..Default::default()
        });
        handle
    }

    /// Also answer to `selector` for an existing element.
    pub fn add_selector(&self, element: ElementHandle, selector: &str) {
        if let Some(el) = self.state.borrow_mut().elements.get_mut(element.0 as usize) {
            el.selectors.push(selector.to_string());
        }
    }

    pub fn set_dom_id(&self, element: ElementHandle, id: &str) {
        if let Some(el) = self.state.borrow_mut().elements.get_mut(element.0 as usize) {
            el.dom_id = Some(id.to_string());
        }
    }

    pub fn set_rect(&self, element: ElementHandle, top: f32, bottom: f32) {
        if let Some(el) = self.state.borrow_mut().elements.get_mut(element.0 as usize) {
            el.rect = Some(ElementRect { top, bottom });
        }
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        self.state.borrow_mut().reduced_motion = reduced;
    }

    /// Move the page and queue the matching scroll event.
    pub fn scroll_to(&self, offset: f32) {
        let mut state = self.state.borrow_mut();
        state.metrics.offset = offset;
        state.events.push(PageEvent::Scrolled);
    }

    pub fn push_event(&self, event: PageEvent) {
        self.state.borrow_mut().events.push(event);
    }

    pub fn style(&self, element: ElementHandle, property: &str) -> Option<String> {
        self.state
            .borrow()
            .elements
            .get(element.0 as usize)
            .and_then(|el| el.styles.get(property).cloned())
    }

    pub fn style_writes(&self) -> usize {
        self.state.borrow().style_writes
    }

    pub fn is_removed(&self, element: ElementHandle) -> bool {
        self.state
            .borrow()
            .elements
            .get(element.0 as usize)
            .is_none_or(|el| el.removed)
    }

    pub fn is_observed(&self, element: ElementHandle, kind: RevealKind) -> bool {
        self.state.borrow().observed.contains(&(element, kind))
    }

    pub fn observed_count(&self) -> usize {
        self.state.borrow().observed.len()
    }

    pub fn is_hover_watched(&self, element: ElementHandle) -> bool {
        self.state.borrow().hover_watched.contains(&element)
    }

    pub fn stylesheet(&self, id: &str) -> Option<String> {
        self.state.borrow().stylesheets.get(id).cloned()
    }

    /// Live elements carrying `class`.
    pub fn count_with_class(&self, class: &str) -> usize {
        self.state
            .borrow()
            .elements
            .iter()
            .filter(|el| !el.removed && el.class_name.split_whitespace().any(|c| c == class))
            .count()
    }

    pub fn children_of(&self, parent: ElementHandle) -> Vec<ElementHandle> {
        self.state
            .borrow()
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| !el.removed && el.parent == Some(parent))
            .map(|(i, _)| ElementHandle(i as u32))
            .collect()
    }

    pub fn releases(&self) -> usize {
        self.state.borrow().releases
    }
}

impl PageDocument for HeadlessDocument {
    fn query_all(&mut self, selector: &str) -> Vec<ElementHandle> {
        self.state
            .borrow()
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.matches(selector))
            .map(|(i, _)| ElementHandle(i as u32))
            .collect()
    }

    fn query_within(&mut self, parent: ElementHandle, selector: &str) -> Vec<ElementHandle> {
        self.state
            .borrow()
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.parent == Some(parent) && el.matches(selector))
            .map(|(i, _)| ElementHandle(i as u32))
            .collect()
    }

    fn element_by_id(&mut self, id: &str) -> Option<ElementHandle> {
        self.state
            .borrow()
            .elements
            .iter()
            .position(|el| !el.removed && el.dom_id.as_deref() == Some(id))
            .map(|i| ElementHandle(i as u32))
    }

    fn body(&mut self) -> Option<ElementHandle> {
        self.state.borrow().body
    }

    fn dom_id(&self, element: ElementHandle) -> Option<String> {
        self.state
            .borrow()
            .elements
            .get(element.0 as usize)
            .and_then(|el| el.dom_id.clone())
    }

    fn bounding_rect(&self, element: ElementHandle) -> Option<ElementRect> {
        self.state
            .borrow()
            .elements
            .get(element.0 as usize)
            .filter(|el| !el.removed)
            .and_then(|el| el.rect)
    }

    fn set_style(&mut self, element: ElementHandle, property: &str, value: &str) {
        let mut state = self.state.borrow_mut();
        let Some(el) = state.elements.get_mut(element.0 as usize) else {
            return;
        };
        if el.removed {
            return;
        }
        el.styles.insert(property.to_string(), value.to_string());
        state.style_writes += 1;
    }

    fn create_element(&mut self, element: NewElement<'_>) -> Option<ElementHandle> {
        let mut state = self.state.borrow_mut();
        let handle = ElementHandle(state.elements.len() as u32);
        let body = state.body;
        state.elements.push(HeadlessElement {
            selectors: vec![element.tag.to_string()],
            class_name: element.class_name.to_string(),
            dom_id: element.id.map(str::to_string),
            parent: element.parent.or(body),
            styles: HashMap::from([("cssText".to_string(), element.css_text.to_string())]),
            ..Default::default()
        });
        Some(handle)
    }

    fn remove_element(&mut self, element: ElementHandle) {
        if let Some(el) = self.state.borrow_mut().elements.get_mut(element.0 as usize) {
            el.removed = true;
        }
    }

    fn inject_stylesheet(&mut self, id: &str, css: &str) {
        self.state
            .borrow_mut()
            .stylesheets
            .entry(id.to_string())
            .or_insert_with(|| css.to_string());
    }

    fn remove_stylesheet(&mut self, id: &str) {
        self.state.borrow_mut().stylesheets.remove(id);
    }

    fn has_stylesheet(&self, id: &str) -> bool {
        self.state.borrow().stylesheets.contains_key(id)
    }

    fn observe(&mut self, element: ElementHandle, kind: RevealKind) {
        self.state.borrow_mut().observed.insert((element, kind));
    }

    fn unobserve(&mut self, element: ElementHandle, kind: RevealKind) {
        self.state.borrow_mut().observed.remove(&(element, kind));
    }

    fn disconnect_observers(&mut self) {
        self.state.borrow_mut().observed.clear();
    }

    fn watch_hover(&mut self, element: ElementHandle) {
        self.state.borrow_mut().hover_watched.insert(element);
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.state.borrow().metrics
    }

    fn scroll_by(&mut self, delta: f32) {
        let mut state = self.state.borrow_mut();
        let max = state.metrics.scrollable_distance();
        state.metrics.offset = (state.metrics.offset + delta).clamp(0.0, max);
        state.events.push(PageEvent::Scrolled);
    }

    fn sync_viewport(&mut self, size: Vec2) {
        let mut state = self.state.borrow_mut();
        state.metrics.viewport_width = size.x;
        state.metrics.viewport_height = size.y;
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.state.borrow().reduced_motion
    }

    fn drain_events(&mut self) -> Vec<PageEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        state.observed.clear();
        state.hover_watched.clear();
        state.events.clear();
        state.releases += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_elements_are_found_by_class_and_id() {
        let mut doc = HeadlessDocument::synthetic_page(1280.0, 800.0);
        let bar = doc
            .create_element(NewElement {
                tag: "div",
                class_name: "progress sparkle-effect",
                id: Some("scroll-progress"),
                parent: None,
                css_text: "position: fixed;",
            })
            .unwrap();

        assert_eq!(doc.element_by_id("scroll-progress"), Some(bar));
        assert_eq!(doc.query_all(".sparkle-effect"), vec![bar]);
        assert_eq!(doc.query_all("#scroll-progress"), vec![bar]);

        doc.remove_element(bar);
        assert!(doc.query_all(".sparkle-effect").is_empty());
        assert_eq!(doc.element_by_id("scroll-progress"), None);
    }

    #[test]
    fn wheel_scrolling_stays_inside_the_document() {
        let mut doc = HeadlessDocument::synthetic_page(1000.0, 500.0);
        doc.scroll_by(-100.0);
        assert_eq!(doc.scroll_metrics().offset, 0.0);

        doc.scroll_by(5000.0);
        assert_eq!(doc.scroll_metrics().offset, 1500.0);
        assert_eq!(doc.drain_events(), vec![PageEvent::Scrolled, PageEvent::Scrolled]);
        assert!(doc.drain_events().is_empty());
    }

    #[test]
    fn stylesheets_are_injected_once() {
        let mut doc = HeadlessDocument::default();
        doc.inject_stylesheet("sheet", "a {}");
        doc.inject_stylesheet("sheet", "b {}");
        assert_eq!(doc.stylesheet("sheet").as_deref(), Some("a {}"));
    }
}
