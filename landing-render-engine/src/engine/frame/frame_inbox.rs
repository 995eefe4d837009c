use bevy::prelude::*;

use crate::page::document::{ElementHandle, PageEvent, ScrollMetrics};
use crate::page::reveal::RevealKind;

/// Everything the page reported since the previous frame, coalesced.
///
/// Pointer and orientation keep only the latest sample; any number of
/// scroll events collapse into one pending flag.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct FrameInbox {
    pub pointer: Option<Vec2>,
    /// Device tilt in degrees (beta, gamma).
    pub orientation: Option<Vec2>,
    pub scroll_pending: bool,
    pub resized: Option<Vec2>,
    pub hover: Vec<(ElementHandle, bool)>,
    pub intersections: Vec<(ElementHandle, RevealKind)>,
    pub unload: bool,
}

impl FrameInbox {
    pub fn record(&mut self, event: PageEvent) {
        match event {
            PageEvent::PointerMoved(position) => self.pointer = Some(position),
            PageEvent::Scrolled => self.scroll_pending = true,
            PageEvent::Resized(size) => self.resized = Some(size),
            PageEvent::Orientation { beta, gamma } => {
                self.orientation = Some(Vec2::new(beta, gamma))
            }
            PageEvent::HoverChanged { element, hovered } => self.hover.push((element, hovered)),
            PageEvent::Intersected { element, kind } => self.intersections.push((element, kind)),
            PageEvent::Unload => self.unload = true,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Latest scroll metrics. Only written on frames that saw a scroll or
/// resize, so change detection marks the frames with work to do.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub metrics: ScrollMetrics,
    /// Clamped scroll progress in `[0, 1]`.
    pub fraction: f32,
    pub updates: u64,
}

impl ScrollState {
    pub fn from_metrics(metrics: ScrollMetrics) -> Self {
        Self {
            metrics,
            fraction: metrics.fraction(),
            updates: 0,
        }
    }

    pub fn apply(&mut self, metrics: ScrollMetrics) {
        self.metrics = metrics;
        self.fraction = metrics.fraction();
        self.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_pointer_wins_and_scrolls_collapse() {
        let mut inbox = FrameInbox::default();
        inbox.record(PageEvent::PointerMoved(Vec2::new(1.0, 2.0)));
        inbox.record(PageEvent::Scrolled);
        inbox.record(PageEvent::PointerMoved(Vec2::new(30.0, 40.0)));
        inbox.record(PageEvent::Scrolled);
        inbox.record(PageEvent::Scrolled);

        assert_eq!(inbox.pointer, Some(Vec2::new(30.0, 40.0)));
        assert!(inbox.scroll_pending);

        inbox.clear();
        assert_eq!(inbox, FrameInbox::default());
    }

    #[test]
    fn hover_records_keep_their_order() {
        let mut inbox = FrameInbox::default();
        let a = ElementHandle(3);
        inbox.record(PageEvent::HoverChanged { element: a, hovered: true });
        inbox.record(PageEvent::HoverChanged { element: a, hovered: false });
        assert_eq!(inbox.hover, vec![(a, true), (a, false)]);
    }
}
