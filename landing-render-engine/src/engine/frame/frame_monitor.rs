use bevy::prelude::*;

use crate::engine::config::VisualsConfig;
use crate::engine::core::app_state::AppState;
use crate::page::reveal::MotionPreference;
use crate::rpc::web_rpc::WebRpcInterface;

/// Fired once per session when frame times stay over budget.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceDegraded;

/// Counts consecutive over-budget frames.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct FrameTimeMonitor {
    budget_ms: f32,
    sustained_frames: u32,
    slow_streak: u32,
    degraded: bool,
}

impl FrameTimeMonitor {
    pub fn new(budget_ms: f32, sustained_frames: u32) -> Self {
        Self {
            budget_ms,
            sustained_frames: sustained_frames.max(1),
            slow_streak: 0,
            degraded: false,
        }
    }

    /// Feed one frame's delta. Returns `true` on the single sample that
    /// crosses into the degraded state.
    pub fn sample(&mut self, delta_ms: f32) -> bool {
        if self.degraded {
            return false;
        }
        if delta_ms > self.budget_ms {
            self.slow_streak += 1;
        } else {
            self.slow_streak = 0;
        }
        if self.slow_streak >= self.sustained_frames {
            self.degraded = true;
            return true;
        }
        false
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

impl Default for FrameTimeMonitor {
    fn default() -> Self {
        Self::new(
            constants::performance::FRAME_BUDGET_MS,
            constants::performance::SUSTAINED_SLOW_FRAMES,
        )
    }
}

pub struct FrameMonitorPlugin;

impl Plugin for FrameMonitorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameTimeMonitor>()
            .add_event::<PerformanceDegraded>()
            .add_systems(
                Update,
                (
                    configure_frame_monitor.run_if(resource_changed::<VisualsConfig>),
                    monitor_frame_time,
                )
                    .chain()
                    .in_set(super::FrameSet::Intake)
                    .run_if(in_state(AppState::Running))
                    .run_if(|preference: Res<MotionPreference>| !preference.reduced),
            );
    }
}

fn configure_frame_monitor(config: Res<VisualsConfig>, mut monitor: ResMut<FrameTimeMonitor>) {
    if monitor.is_degraded() {
        return;
    }
    *monitor = FrameTimeMonitor::new(
        config.performance.frame_budget_ms,
        config.performance.sustained_frames,
    );
}

fn monitor_frame_time(
    time: Res<Time<Real>>,
    mut monitor: ResMut<FrameTimeMonitor>,
    mut degraded: EventWriter<PerformanceDegraded>,
    rpc: Option<ResMut<WebRpcInterface>>,
) {
    let delta_ms = time.delta_secs() * 1000.0;
    if monitor.sample(delta_ms) {
        warn!(
            "Frame time above {:.0}ms for a sustained run, degrading visuals",
            monitor.budget_ms
        );
        degraded.write(PerformanceDegraded);
        if let Some(mut rpc) = rpc {
            rpc.send_notification(
                "performance_degraded",
                serde_json::json!({ "budget_ms": monitor.budget_ms, "frame_ms": delta_ms }),
            );
        }
    }
}
