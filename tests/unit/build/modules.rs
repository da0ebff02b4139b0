use super::*;
use crate::scene::state::SceneSettings;
use crate::timeline::lint::{LintConfig, lint_source};
use crate::timeline::map::TimelineMap;

fn scene_with(actors: &[(&str, ActorKind)]) -> SceneState {
    let mut scene = SceneState::new(TimelineMap::builtin().unwrap(), SceneSettings::default());
    for (name, kind) in actors {
        scene.ensure_actor(name, *kind).unwrap();
    }
    scene
}

#[test]
fn builtin_registry_covers_the_builtin_timeline_in_order() {
    let reg = builtin_registry().unwrap();
    let timeline = TimelineMap::builtin().unwrap();
    assert_eq!(reg.names(), timeline.names().collect::<Vec<_>>());
}

#[test]
fn module_sources_only_reference_known_segments() {
    let timeline = TimelineMap::builtin().unwrap();
    let keys: Vec<&str> = timeline.names().collect();
    let src = include_str!("../../../src/build/modules.rs");
    let found = lint_source(
        std::path::Path::new("modules.rs"),
        src,
        &keys,
        &LintConfig::default(),
    );
    assert!(found.is_empty(), "{found:?}");
}

#[test]
fn every_module_tolerates_an_empty_scene() {
    let reg = builtin_registry().unwrap();
    let mut scene = scene_with(&[]);
    for name in reg.names() {
        reg.get(name).unwrap().setup(&mut scene).unwrap();
    }
    // Only the title card creates its own prop.
    assert_eq!(scene.actor_count(), 1);
    assert!(scene.contains("TitleCard"));
}

#[test]
fn walking_moves_relative_to_the_carried_position() {
    let mut scene = scene_with(&[(HERO, ActorKind::Character)]);
    scene.actor_mut(HERO).unwrap().transform.location = [-10.0, 0.0, 0.0];
    Arrival.setup(&mut scene).unwrap();
    MarketWalk.setup(&mut scene).unwrap();

    let x = |f: u64| scene.sample(HERO, "location", 0, FrameIndex(f)).unwrap();
    assert_eq!(x(721), -10.0);
    assert_eq!(x(1800), 0.0);
    assert_eq!(x(3000), 6.0);
    let walk = scene.curve(HERO, "pose.walk", 0).unwrap().unwrap();
    assert_eq!(walk.points().last().unwrap().value, (1080.0 + 1200.0) / 24.0);
}

#[test]
fn lantern_flicker_stays_in_range() {
    let mut scene = scene_with(&[(LANTERN, ActorKind::Prop)]);
    NightTalk.setup(&mut scene).unwrap();
    let curve = scene.curve(LANTERN, "energy", 0).unwrap().unwrap();
    assert_eq!(curve.len(), 100);
    assert!(
        curve
            .points()
            .iter()
            .all(|p| (40.0..48.0).contains(&p.value))
    );
}

#[test]
fn long_road_camera_tracks_the_hero() {
    let mut scene = scene_with(&[(HERO, ActorKind::Character), (CAMERA, ActorKind::Camera)]);
    LongRoad.setup(&mut scene).unwrap();
    let span = scene.timeline().lookup("long_road").unwrap();
    for frame in [span.start, span.start + 120, span.end] {
        let hero = scene.sample(HERO, "location", 0, FrameIndex(frame)).unwrap();
        let cam = scene.sample(CAMERA, "location", 0, FrameIndex(frame)).unwrap();
        assert!((hero - cam - 6.0).abs() < 1e-9);
    }
}
