use bevy::math::Vec2;
#[cfg(any(target_arch = "wasm32", test))]
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

use super::reveal::RevealKind;

/// Opaque reference to an element owned by a [`PageDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u32);

/// Live elements behind their handles. Removed slots are freed and never
/// reused, so a stale handle cannot reach a newer element.
#[cfg(any(target_arch = "wasm32", test))]
#[derive(Debug)]
pub struct HandleTable<T> {
    slots: HashMap<u32, T>,
    next: u32,
}

#[cfg(any(target_arch = "wasm32", test))]
impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            next: 0,
        }
    }
}

#[cfg(any(target_arch = "wasm32", test))]
impl<T> HandleTable<T> {
    pub fn insert(&mut self, value: T) -> ElementHandle {
        let handle = ElementHandle(self.next);
        self.next += 1;
        self.slots.insert(handle.0, value);
        handle
    }

    pub fn get(&self, handle: ElementHandle) -> Option<&T> {
        self.slots.get(&handle.0)
    }

    pub fn remove(&mut self, handle: ElementHandle) -> Option<T> {
        self.slots.remove(&handle.0)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Viewport-relative vertical extent of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementRect {
    pub top: f32,
    pub bottom: f32,
}

/// Scroll position and viewport/document dimensions, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub scroll_height: f32,
}

impl ScrollMetrics {
    /// Distance the page can scroll before reaching the bottom.
    pub fn scrollable_distance(&self) -> f32 {
        (self.scroll_height - self.viewport_height).max(0.0)
    }

    /// Scroll progress in `[0, 1]`, whatever the raw offset says.
    pub fn fraction(&self) -> f32 {
        let distance = self.scrollable_distance();
        if distance <= 0.0 || !self.offset.is_finite() {
            return 0.0;
        }
        (self.offset / distance).clamp(0.0, 1.0)
    }
}

/// Raw browser occurrences queued by listeners until the next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    PointerMoved(Vec2),
    Scrolled,
    Resized(Vec2),
    /// Device tilt in degrees (front-back, left-right).
    Orientation { beta: f32, gamma: f32 },
    HoverChanged { element: ElementHandle, hovered: bool },
    Intersected { element: ElementHandle, kind: RevealKind },
    Unload,
}

/// Element creation request.
#[derive(Debug, Clone, Copy)]
pub struct NewElement<'a> {
    pub tag: &'a str,
    pub class_name: &'a str,
    pub id: Option<&'a str>,
    /// `None` appends to the document body.
    pub parent: Option<ElementHandle>,
    pub css_text: &'a str,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("browser window is not available")]
    MissingWindow,
    #[error("window has no document")]
    MissingDocument,
    #[error("no element matches `{0}`")]
    MissingElement(String),
    #[error("javascript error: {0}")]
    Js(String),
}

/// The slice of the DOM the visual layer drives.
///
/// Every call is best effort: an element that disappeared or a style the
/// browser rejects is skipped, never raised.
pub trait PageDocument {
    fn query_all(&mut self, selector: &str) -> Vec<ElementHandle>;
    fn query_within(&mut self, parent: ElementHandle, selector: &str) -> Vec<ElementHandle>;
    fn element_by_id(&mut self, id: &str) -> Option<ElementHandle>;
    fn body(&mut self) -> Option<ElementHandle>;
    fn dom_id(&self, element: ElementHandle) -> Option<String>;
    fn bounding_rect(&self, element: ElementHandle) -> Option<ElementRect>;

    fn set_style(&mut self, element: ElementHandle, property: &str, value: &str);
    fn create_element(&mut self, element: NewElement<'_>) -> Option<ElementHandle>;
    fn remove_element(&mut self, element: ElementHandle);

    fn inject_stylesheet(&mut self, id: &str, css: &str);
    fn remove_stylesheet(&mut self, id: &str);
    fn has_stylesheet(&self, id: &str) -> bool;

    fn observe(&mut self, element: ElementHandle, kind: RevealKind);
    fn unobserve(&mut self, element: ElementHandle, kind: RevealKind);
    fn disconnect_observers(&mut self);
    fn watch_hover(&mut self, element: ElementHandle);

    fn scroll_metrics(&self) -> ScrollMetrics;
    fn scroll_by(&mut self, delta: f32);
    /// Viewport size reported by the windowing layer; the browser tracks its own.
    fn sync_viewport(&mut self, _size: Vec2) {}
    fn prefers_reduced_motion(&self) -> bool;

    fn drain_events(&mut self) -> Vec<PageEvent>;
    /// Detach every listener and observer.
    fn release(&mut self);
}

/// Main-thread resource owning the injected document.
pub struct PageHost {
    document: Box<dyn PageDocument>,
    released: bool,
}

impl PageHost {
    pub fn new(document: Box<dyn PageDocument>) -> Self {
        Self {
            document,
            released: false,
        }
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.document.release();
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Deref for PageHost {
    type Target = dyn PageDocument;

    fn deref(&self) -> &Self::Target {
        self.document.as_ref()
    }
}

impl DerefMut for PageHost {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.document.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_fraction_clamps_beyond_document_bounds() {
        let mut metrics = ScrollMetrics {
            offset: 0.0,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            scroll_height: 4000.0,
        };
        assert_eq!(metrics.fraction(), 0.0);

        metrics.offset = 1600.0;
        assert!((metrics.fraction() - 0.5).abs() < 1e-6);

        metrics.offset = 10_000.0;
        assert_eq!(metrics.fraction(), 1.0);

        metrics.offset = -250.0;
        assert_eq!(metrics.fraction(), 0.0);
    }

    #[test]
    fn short_documents_report_zero_progress() {
        let metrics = ScrollMetrics {
            offset: 40.0,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            scroll_height: 600.0,
        };
        assert_eq!(metrics.scrollable_distance(), 0.0);
        assert_eq!(metrics.fraction(), 0.0);
    }

    #[test]
    fn removed_handles_free_their_slot_and_are_not_reused() {
        let mut table = HandleTable::default();
        let card = table.insert("card");
        let sparkles: Vec<_> = (0..5).map(|_| table.insert("sparkle")).collect();
        assert_eq!(table.len(), 6);

        for sparkle in &sparkles {
            assert_eq!(table.remove(*sparkle), Some("sparkle"));
        }
        assert_eq!(table.len(), 1);
        assert_eq!(table.remove(sparkles[0]), None);

        let next = table.insert("glow");
        assert!(!sparkles.contains(&next));
        assert_eq!(table.get(sparkles[0]), None);
        assert_eq!(table.get(card), Some(&"card"));
        assert_eq!(table.get(next), Some(&"glow"));
    }
}
