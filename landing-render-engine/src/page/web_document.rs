//! Browser-backed [`PageDocument`] built on `web-sys`.

use bevy::log::warn;
use bevy::math::Vec2;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    DeviceOrientationEvent, Document, Element, Event, EventTarget, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, MouseEvent, Window,
};

use super::document::{
    ElementHandle, ElementRect, HandleTable, NewElement, PageDocument, PageError, PageEvent,
    ScrollMetrics,
};
use super::reveal::RevealKind;

type Registry = Rc<RefCell<HandleTable<Element>>>;

/// Carries an element's handle so lookups skip scanning the registry.
const HANDLE_ATTRIBUTE: &str = "data-visual-handle";
type EventQueue = Rc<RefCell<Vec<PageEvent>>>;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

pub struct WebDocument {
    window: Window,
    document: Document,
    registry: Registry,
    events: EventQueue,
    observers: HashMap<RevealKind, IntersectionObserver>,
    // Held so the observer callbacks outlive the observers.
    _observer_callbacks: Vec<Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>>,
    listeners: Vec<Listener>,
}

fn js_error(value: JsValue) -> PageError {
    PageError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn register(registry: &Registry, element: Element) -> ElementHandle {
    let mut elements = registry.borrow_mut();
    let tagged = element
        .get_attribute(HANDLE_ATTRIBUTE)
        .and_then(|value| value.parse().ok())
        .map(ElementHandle)
        .filter(|handle| elements.get(*handle) == Some(&element));
    if let Some(handle) = tagged {
        return handle;
    }
    let handle = elements.insert(element.clone());
    if let Err(err) = element.set_attribute(HANDLE_ATTRIBUTE, &handle.0.to_string()) {
        warn!("Could not tag element {}: {:?}", handle.0, err);
    }
    handle
}

impl WebDocument {
    /// Bind to the current window and install the page-level listeners.
    pub fn attach() -> Result<Self, PageError> {
        let window = web_sys::window().ok_or(PageError::MissingWindow)?;
        let document = window.document().ok_or(PageError::MissingDocument)?;

        let mut page = Self {
            window,
            document,
            registry: Rc::new(RefCell::new(HandleTable::default())),
            events: Rc::new(RefCell::new(Vec::new())),
            observers: HashMap::new(),
            _observer_callbacks: Vec::new(),
            listeners: Vec::new(),
        };
        page.install_window_listeners()?;
        for kind in RevealKind::ALL {
            page.create_observer(kind)?;
        }
        Ok(page)
    }

    fn listen(
        &mut self,
        target: EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), PageError> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(js_error)?;
        self.listeners.push(Listener {
            target,
            kind,
            callback,
        });
        Ok(())
    }

    fn install_window_listeners(&mut self) -> Result<(), PageError> {
        let target: EventTarget = self.window.clone().into();

        let events = self.events.clone();
        self.listen(target.clone(), "mousemove", move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                let position = Vec2::new(mouse.client_x() as f32, mouse.client_y() as f32);
                events.borrow_mut().push(PageEvent::PointerMoved(position));
            }
        })?;

        let events = self.events.clone();
        self.listen(target.clone(), "scroll", move |_| {
            events.borrow_mut().push(PageEvent::Scrolled);
        })?;

        let events = self.events.clone();
        let window = self.window.clone();
        self.listen(target.clone(), "resize", move |_| {
            let size = Vec2::new(
                window_dimension(window.inner_width()),
                window_dimension(window.inner_height()),
            );
            events.borrow_mut().push(PageEvent::Resized(size));
        })?;

        let events = self.events.clone();
        self.listen(target.clone(), "deviceorientation", move |event| {
            if let Some(tilt) = event.dyn_ref::<DeviceOrientationEvent>() {
                events.borrow_mut().push(PageEvent::Orientation {
                    beta: tilt.beta().unwrap_or(0.0) as f32,
                    gamma: tilt.gamma().unwrap_or(0.0) as f32,
                });
            }
        })?;

        let events = self.events.clone();
        self.listen(target, "beforeunload", move |_| {
            events.borrow_mut().push(PageEvent::Unload);
        })
    }

    fn create_observer(&mut self, kind: RevealKind) -> Result<(), PageError> {
        let events = self.events.clone();
        let registry = self.registry.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let element = register(&registry, entry.target());
                    events
                        .borrow_mut()
                        .push(PageEvent::Intersected { element, kind });
                }
            },
        );

        let tier = kind.tier();
        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(tier.threshold));
        options.set_root_margin(tier.root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .map_err(js_error)?;

        self.observers.insert(kind, observer);
        self._observer_callbacks.push(callback);
        Ok(())
    }

    fn element(&self, handle: ElementHandle) -> Option<Element> {
        self.registry.borrow().get(handle).cloned()
    }

    fn collect(&self, list: Result<web_sys::NodeList, JsValue>) -> Vec<ElementHandle> {
        let Ok(list) = list else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| register(&self.registry, element))
            .collect()
    }
}

fn window_dimension(value: Result<JsValue, JsValue>) -> f32 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
}

impl PageDocument for WebDocument {
    fn query_all(&mut self, selector: &str) -> Vec<ElementHandle> {
        self.collect(self.document.query_selector_all(selector))
    }

    fn query_within(&mut self, parent: ElementHandle, selector: &str) -> Vec<ElementHandle> {
        match self.element(parent) {
            Some(parent) => self.collect(parent.query_selector_all(selector)),
            None => Vec::new(),
        }
    }

    fn element_by_id(&mut self, id: &str) -> Option<ElementHandle> {
        self.document
            .get_element_by_id(id)
            .map(|element| register(&self.registry, element))
    }

    fn body(&mut self) -> Option<ElementHandle> {
        self.document
            .body()
            .map(|body| register(&self.registry, body.into()))
    }

    fn dom_id(&self, element: ElementHandle) -> Option<String> {
        self.element(element)
            .map(|el| el.id())
            .filter(|id| !id.is_empty())
    }

    fn bounding_rect(&self, element: ElementHandle) -> Option<ElementRect> {
        self.element(element).map(|el| {
            let rect = el.get_bounding_client_rect();
            ElementRect {
                top: rect.top() as f32,
                bottom: rect.bottom() as f32,
            }
        })
    }

    fn set_style(&mut self, element: ElementHandle, property: &str, value: &str) {
        let Some(element) = self.element(element) else {
            return;
        };
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            if let Err(err) = html.style().set_property(property, value) {
                warn!("Rejected style {}: {:?}", property, err);
            }
        }
    }

    fn create_element(&mut self, request: NewElement<'_>) -> Option<ElementHandle> {
        let element = self.document.create_element(request.tag).ok()?;
        element.set_class_name(request.class_name);
        if let Some(id) = request.id {
            element.set_id(id);
        }
        element.set_attribute("style", request.css_text).ok()?;

        let parent = match request.parent {
            Some(parent) => self.element(parent)?,
            None => self.document.body()?.into(),
        };
        parent.append_child(&element).ok()?;
        Some(register(&self.registry, element))
    }

    fn remove_element(&mut self, element: ElementHandle) {
        let removed = self.registry.borrow_mut().remove(element);
        if let Some(element) = removed {
            element.remove();
        }
    }

    fn inject_stylesheet(&mut self, id: &str, css: &str) {
        if self.has_stylesheet(id) {
            return;
        }
        let Some(head) = self.document.head() else {
            warn!("Document has no <head>, skipping stylesheet {}", id);
            return;
        };
        let Ok(style) = self.document.create_element("style") else {
            return;
        };
        style.set_id(id);
        style.set_text_content(Some(css));
        if let Err(err) = head.append_child(&style) {
            warn!("Failed to inject stylesheet {}: {:?}", id, err);
        }
    }

    fn remove_stylesheet(&mut self, id: &str) {
        if let Some(style) = self.document.get_element_by_id(id) {
            style.remove();
        }
    }

    fn has_stylesheet(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn observe(&mut self, element: ElementHandle, kind: RevealKind) {
        if let (Some(element), Some(observer)) = (self.element(element), self.observers.get(&kind))
        {
            observer.observe(&element);
        }
    }

    fn unobserve(&mut self, element: ElementHandle, kind: RevealKind) {
        if let (Some(element), Some(observer)) = (self.element(element), self.observers.get(&kind))
        {
            observer.unobserve(&element);
        }
    }

    fn disconnect_observers(&mut self) {
        for observer in self.observers.values() {
            observer.disconnect();
        }
    }

    fn watch_hover(&mut self, handle: ElementHandle) {
        let Some(element) = self.element(handle) else {
            return;
        };
        let target: EventTarget = element.into();
        for (kind, hovered) in [("mouseenter", true), ("mouseleave", false)] {
            let events = self.events.clone();
            let result = self.listen(target.clone(), kind, move |_| {
                events.borrow_mut().push(PageEvent::HoverChanged {
                    element: handle,
                    hovered,
                });
            });
            if let Err(err) = result {
                warn!("Hover listener not installed: {}", err);
            }
        }
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        let scroll_height = self
            .document
            .document_element()
            .map(|root| root.scroll_height() as f32)
            .unwrap_or(0.0);
        ScrollMetrics {
            offset: self.window.page_y_offset().unwrap_or(0.0) as f32,
            viewport_width: window_dimension(self.window.inner_width()),
            viewport_height: window_dimension(self.window.inner_height()),
            scroll_height,
        }
    }

    fn scroll_by(&mut self, delta: f32) {
        self.window.scroll_by_with_x_and_y(0.0, delta as f64);
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media("(prefers-reduced-motion: reduce)")
            .ok()
            .flatten()
            .is_some_and(|query| query.matches())
    }

    fn drain_events(&mut self) -> Vec<PageEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn release(&mut self) {
        for listener in self.listeners.drain(..) {
            if let Err(err) = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            ) {
                warn!("Failed to remove {} listener: {:?}", listener.kind, err);
            }
        }
        self.disconnect_observers();
        self.events.borrow_mut().clear();
        self.registry.borrow_mut().clear();
    }
}
