//! App-level harness: the whole visual layer on `MinimalPlugins` over a
//! synthetic page.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::engine::core::app_setup::install_visual_layer;
use crate::engine::core::context::VisualsContext;
use crate::engine::shaders::ParticleFieldMaterial;
use crate::page::headless::HeadlessDocument;

pub fn visual_app(document: HeadlessDocument, with_scene: bool) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, AssetPlugin::default()))
        .init_asset::<Mesh>()
        .init_asset::<StandardMaterial>()
        .init_asset::<ParticleFieldMaterial>();

    let mut builder = VisualsContext::builder()
        .document(document)
        .seed(7)
        .skip_config_file();
    if with_scene {
        builder = builder.canvas("#hero-canvas");
    }
    let context = builder.build().expect("headless context");
    install_visual_layer(&mut app, context);
    app
}

/// Run until the layer reached `Running` and the scene settled.
pub fn start(app: &mut App) {
    for _ in 0..3 {
        app.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::follower::FOLLOWER_CLASS;
    use constants::reveal::{FADE_TIER, REDUCED_MOTION_STYLE_ID, SLIDE_TIER};
    use serde_json::json;

    use crate::engine::core::app_state::AppState;
    use crate::engine::core::requests::{
        ColorThemeRequest, ConfigPatchRequest, PlaybackRequest, TeardownRequest, ToggleRequest,
        ToggleTarget,
    };
    use crate::engine::frame::{PerformanceDegraded, ScrollState};
    use crate::engine::scene::particle_field::{ParticleDensity, ParticleField};
    use crate::engine::scene::polyhedra::FloatingNode;
    use crate::engine::scene::scene_motion::orientation_rotation_target;
    use crate::engine::scene::scene_setup::{SceneCamera, SceneResources, SceneRig, SceneRotation};
    use crate::page::document::PageEvent;
    use crate::page::PageHost;
    use crate::page::document::PageDocument;
    use crate::page::pointer_follower::PointerFollower;
    use crate::page::reveal::RevealCoordinator;
    use crate::page::section_effects::SectionEffects;
    use crate::rpc::web_rpc::IncomingRpcMessage;

    fn page() -> HeadlessDocument {
        let doc = HeadlessDocument::synthetic_page(1280.0, 800.0);
        doc.add_element(FADE_TIER.selector, None);
        doc.add_element(SLIDE_TIER.selector, None);
        doc.add_element(".parallax", None);
        doc
    }

    fn particle_counts(app: &mut App) -> Vec<usize> {
        let world = app.world_mut();
        let mut fields = world.query::<&ParticleField>();
        fields.iter(world).map(|field| field.count).collect()
    }

    fn state(app: &App) -> AppState {
        *app.world().resource::<State<AppState>>().get()
    }

    #[test]
    fn many_scroll_events_make_one_update_per_frame() {
        let doc = page();
        let mut app = visual_app(doc.clone(), false);
        start(&mut app);

        let updates = app.world().resource::<ScrollState>().updates;
        let handled = app.world().resource::<SectionEffects>().handled_frames();

        for offset in [120.0, 480.0, 900.0, 1300.0] {
            doc.scroll_to(offset);
        }
        app.update();

        let scroll = app.world().resource::<ScrollState>();
        assert_eq!(scroll.updates, updates + 1);
        assert_eq!(scroll.metrics.offset, 1300.0);
        assert_eq!(
            app.world().resource::<SectionEffects>().handled_frames(),
            handled + 1
        );

        app.update();
        assert_eq!(
            app.world().resource::<SectionEffects>().handled_frames(),
            handled + 1
        );
    }

    #[test]
    fn reduced_motion_schedules_no_scroll_work() {
        let doc = page();
        doc.set_reduced_motion(true);
        let mut app = visual_app(doc.clone(), false);
        start(&mut app);

        assert!(doc.stylesheet(REDUCED_MOTION_STYLE_ID).is_some());
        assert_eq!(app.world().resource::<RevealCoordinator>().target_count(), 0);
        assert!(app.world().get_resource::<SectionEffects>().is_none());
        assert_eq!(doc.observed_count(), 0);

        let writes = doc.style_writes();
        doc.scroll_to(2000.0);
        app.update();
        app.update();
        assert_eq!(doc.style_writes(), writes);
    }

    #[test]
    fn degradation_lowers_density_once_and_hides_the_follower() {
        let doc = page();
        let mut app = visual_app(doc.clone(), true);
        start(&mut app);
        assert_eq!(particle_counts(&mut app), vec![200]);

        app.world_mut().send_event(PerformanceDegraded);
        app.update();
        app.update();

        assert_eq!(app.world().resource::<ParticleDensity>().count, 100);
        assert_eq!(particle_counts(&mut app), vec![100]);
        let follower = app.world().resource::<PointerFollower>();
        assert!(!follower.is_visible());
        assert_eq!(doc.style(follower.element(), "display").as_deref(), Some("none"));

        app.world_mut().send_event(PerformanceDegraded);
        app.update();
        app.update();
        assert_eq!(particle_counts(&mut app), vec![100]);
    }

    #[test]
    fn config_patch_rebuilds_the_particle_field() {
        let mut app = visual_app(page(), true);
        start(&mut app);

        app.world_mut()
            .send_event(ConfigPatchRequest(json!({ "particles": { "count": 80 } })));
        app.update();
        app.update();

        assert_eq!(particle_counts(&mut app), vec![80]);
        let resources = app.world().resource::<SceneResources>();
        assert_eq!(resources.particle_materials.len(), 1);
    }

    #[test]
    fn teardown_releases_everything_once() {
        let doc = page();
        let mut app = visual_app(doc.clone(), true);
        start(&mut app);
        assert!(app.world().resource::<SceneResources>().is_built());

        app.world_mut().send_event(TeardownRequest);
        app.world_mut().send_event(TeardownRequest);
        app.update();
        app.update();
        assert_eq!(state(&app), AppState::TornDown);

        app.world_mut().send_event(TeardownRequest);
        app.update();
        app.update();

        let resources = app.world().resource::<SceneResources>();
        assert!(resources.released);
        assert!(resources.roots.is_empty());
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<ParticleFieldMaterial>>().len(), 0);
        assert!(particle_counts(&mut app).is_empty());

        assert_eq!(doc.releases(), 1);
        assert_eq!(doc.count_with_class(FOLLOWER_CLASS), 0);
        assert_eq!(doc.observed_count(), 0);
        assert!(app.world().non_send_resource::<PageHost>().is_released());
    }

    #[test]
    fn unload_tears_the_layer_down() {
        let doc = page();
        let mut app = visual_app(doc.clone(), false);
        start(&mut app);

        doc.push_event(PageEvent::Unload);
        app.update();
        app.update();
        assert_eq!(state(&app), AppState::TornDown);
        assert_eq!(doc.releases(), 1);
    }

    #[test]
    fn pausing_stops_the_virtual_clock_and_page_animations() {
        let mut doc = page();
        let mut app = visual_app(doc.clone(), false);
        start(&mut app);

        app.world_mut().send_event(PlaybackRequest { paused: true });
        app.update();
        assert!(app.world().resource::<Time<Virtual>>().is_paused());
        let body = doc.body().expect("synthetic body");
        assert_eq!(
            doc.style(body, "animation-play-state").as_deref(),
            Some("paused")
        );

        app.world_mut().send_event(PlaybackRequest { paused: false });
        app.update();
        assert!(!app.world().resource::<Time<Virtual>>().is_paused());
    }

    #[test]
    fn rpc_toggle_hides_the_follower() {
        let mut app = visual_app(page(), false);
        start(&mut app);
        assert!(app.world().resource::<PointerFollower>().is_visible());

        app.world_mut().send_event(IncomingRpcMessage {
            content: json!({
                "jsonrpc": "2.0",
                "method": "toggle",
                "params": { "subsystem": "follower", "visible": false },
                "id": 1
            })
            .to_string(),
        });
        app.update();

        assert!(!app.world().resource::<PointerFollower>().is_visible());
    }

    fn particle_visibility(app: &mut App) -> Vec<Visibility> {
        let world = app.world_mut();
        let mut fields = world.query_filtered::<&Visibility, With<ParticleField>>();
        fields.iter(world).copied().collect()
    }

    #[test]
    fn resize_updates_the_camera_aspect_in_the_same_frame() {
        let doc = page();
        let mut app = visual_app(doc.clone(), true);
        start(&mut app);

        doc.push_event(PageEvent::Resized(Vec2::new(1000.0, 500.0)));
        app.update();

        let world = app.world_mut();
        let mut cameras = world.query_filtered::<&Projection, With<SceneCamera>>();
        let projection = cameras.single(world).expect("one scene camera");
        let Projection::Perspective(perspective) = projection else {
            panic!("scene camera is not perspective");
        };
        assert_eq!(perspective.aspect_ratio, 2.0);
    }

    #[test]
    fn color_theme_rebuilds_the_field_with_one_material() {
        let mut app = visual_app(page(), true);
        start(&mut app);

        let pink = Color::srgb_u8(0xff, 0x00, 0x80);
        let blue = Color::srgb_u8(0x00, 0x80, 0xff);
        app.world_mut().send_event(ColorThemeRequest {
            colors: [blue, pink],
        });
        app.update();
        app.update();

        let world = app.world_mut();
        let mut fields = world.query::<&ParticleField>();
        let palettes: Vec<_> = fields
            .iter(world)
            .map(|field| field.palette.map(|color| Srgba::from(color).to_hex()))
            .collect();
        assert_eq!(
            palettes,
            vec![[Srgba::from(blue).to_hex(), Srgba::from(pink).to_hex()]]
        );
        assert_eq!(
            app.world().resource::<SceneResources>().particle_materials.len(),
            1
        );
        assert_eq!(app.world().resource::<Assets<ParticleFieldMaterial>>().len(), 1);
    }

    #[test]
    fn toggles_hide_and_show_particles_and_scene() {
        let mut app = visual_app(page(), true);
        start(&mut app);
        assert_eq!(particle_visibility(&mut app), vec![Visibility::Inherited]);

        app.world_mut().send_event(ToggleRequest {
            target: ToggleTarget::Particles,
            visible: Some(false),
        });
        app.update();
        assert_eq!(particle_visibility(&mut app), vec![Visibility::Hidden]);

        app.world_mut().send_event(ToggleRequest {
            target: ToggleTarget::Particles,
            visible: None,
        });
        app.world_mut().send_event(ToggleRequest {
            target: ToggleTarget::Scene,
            visible: Some(false),
        });
        app.update();
        assert_eq!(particle_visibility(&mut app), vec![Visibility::Inherited]);

        let world = app.world_mut();
        let mut rigs = world.query_filtered::<&Visibility, With<SceneRig>>();
        assert_eq!(rigs.single(world).ok(), Some(&Visibility::Hidden));
    }

    #[test]
    fn orientation_beats_pointer_in_the_same_frame() {
        let doc = page();
        let mut app = visual_app(doc.clone(), true);
        start(&mut app);

        doc.push_event(PageEvent::PointerMoved(Vec2::new(100.0, 600.0)));
        doc.push_event(PageEvent::Orientation {
            beta: 12.0,
            gamma: -30.0,
        });
        app.update();

        let target = app.world().resource::<SceneRotation>().0.target;
        assert_eq!(target, orientation_rotation_target(12.0, -30.0));
    }

    #[test]
    fn wireframe_nodes_carry_the_native_wireframe() {
        let mut app = visual_app(page(), true);
        start(&mut app);

        let world = app.world_mut();
        let mut nodes = world.query::<(&FloatingNode, Has<bevy::pbr::wireframe::Wireframe>)>();
        let nodes: Vec<_> = nodes
            .iter(world)
            .map(|(node, wireframe)| (node.wireframe, wireframe))
            .collect();
        assert!(!nodes.is_empty());
        assert!(nodes.iter().all(|(wanted, has)| wanted == has));
    }
}
