//! Frame tick plumbing shared by every visual subsystem.
//!
//! Browser listeners only queue [`PageEvent`]s. Once per frame the intake
//! systems drain that queue into [`FrameInbox`], refresh [`ScrollState`]
//! when a scroll or resize arrived, and clear the inbox at the end of the
//! frame.

/// Per-frame coalesced page input
pub mod frame_inbox;
/// Sustained frame-time degradation detection
pub mod frame_monitor;

pub use frame_inbox::{FrameInbox, ScrollState};
pub use frame_monitor::{FrameMonitorPlugin, FrameTimeMonitor, PerformanceDegraded};

use bevy::prelude::*;

use crate::engine::core::app_state::AppState;
use crate::engine::core::requests::TeardownRequest;
use crate::page::PageHost;
use crate::page::document::PageEvent;

/// Ordering inside `Update`: all input is folded in before effects run.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Intake,
    Effects,
}

/// Startup ordering: page preferences are read before subsystems register.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageStartup {
    Preferences,
    Subsystems,
}

/// `OnEnter(AppState::TornDown)` ordering: subsystems release their
/// resources before the page listeners go away.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TeardownSet {
    Subsystems,
    Host,
}

pub struct FrameIntakePlugin;

impl Plugin for FrameIntakePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameInbox>()
            .init_resource::<ScrollState>()
            .configure_sets(
                Startup,
                (PageStartup::Preferences, PageStartup::Subsystems).chain(),
            )
            .configure_sets(Update, (FrameSet::Intake, FrameSet::Effects).chain())
            .configure_sets(
                OnEnter(AppState::TornDown),
                (TeardownSet::Subsystems, TeardownSet::Host).chain(),
            )
            .add_systems(Startup, init_scroll_state.in_set(PageStartup::Preferences))
            .add_systems(
                First,
                (drain_page_events, coalesce_scroll, request_teardown_on_unload)
                    .chain()
                    .run_if(not(in_state(AppState::TornDown))),
            )
            .add_systems(Last, clear_frame_inbox)
            .add_systems(
                OnEnter(AppState::TornDown),
                release_page_host.in_set(TeardownSet::Host),
            );

        #[cfg(not(target_arch = "wasm32"))]
        {
            use bevy::input::mouse::MouseWheel;
            use bevy::window::{CursorMoved, WindowResized};

            let world = app.world();
            if world.contains_resource::<Events<CursorMoved>>()
                && world.contains_resource::<Events<MouseWheel>>()
                && world.contains_resource::<Events<WindowResized>>()
            {
                app.add_systems(
                    First,
                    forward_window_input
                        .before(drain_page_events)
                        .run_if(not(in_state(AppState::TornDown))),
                );
            }
        }
    }
}

fn init_scroll_state(host: NonSend<PageHost>, mut scroll: ResMut<ScrollState>) {
    scroll.apply(host.scroll_metrics());
}

fn drain_page_events(mut host: NonSendMut<PageHost>, mut inbox: ResMut<FrameInbox>) {
    for event in host.drain_events() {
        inbox.record(event);
    }
}

/// At most one scroll update per frame, however many scroll events fired.
fn coalesce_scroll(
    mut host: NonSendMut<PageHost>,
    inbox: Res<FrameInbox>,
    mut scroll: ResMut<ScrollState>,
) {
    if let Some(size) = inbox.resized {
        host.sync_viewport(size);
    }
    if inbox.scroll_pending || inbox.resized.is_some() {
        scroll.apply(host.scroll_metrics());
    }
}

fn request_teardown_on_unload(inbox: Res<FrameInbox>, mut teardown: EventWriter<TeardownRequest>) {
    if inbox.unload {
        teardown.write(TeardownRequest);
    }
}

fn clear_frame_inbox(mut inbox: ResMut<FrameInbox>) {
    if *inbox != FrameInbox::default() {
        inbox.clear();
    }
}

fn release_page_host(mut host: NonSendMut<PageHost>) {
    host.release();
    info!("Page listeners released");
}

/// Native windows have no DOM: cursor, wheel and resize come from winit.
#[cfg(not(target_arch = "wasm32"))]
fn forward_window_input(
    mut cursor: EventReader<bevy::window::CursorMoved>,
    mut wheel: EventReader<bevy::input::mouse::MouseWheel>,
    mut resized: EventReader<bevy::window::WindowResized>,
    mut host: NonSendMut<PageHost>,
    mut inbox: ResMut<FrameInbox>,
) {
    use bevy::input::mouse::MouseScrollUnit;

    if let Some(moved) = cursor.read().last() {
        inbox.record(PageEvent::PointerMoved(moved.position));
    }
    if let Some(resize) = resized.read().last() {
        inbox.record(PageEvent::Resized(Vec2::new(resize.width, resize.height)));
    }
    for scroll in wheel.read() {
        let pixels = match scroll.unit {
            MouseScrollUnit::Line => scroll.y * 40.0,
            MouseScrollUnit::Pixel => scroll.y,
        };
        host.scroll_by(-pixels);
    }
}
