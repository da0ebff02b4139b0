use super::*;
use crate::build::cast::CAMERA;
use crate::scene::state::SceneSettings;
use crate::timeline::map::TimelineMap;

fn empty_scene() -> SceneState {
    let mut scene = SceneState::new(TimelineMap::builtin().unwrap(), SceneSettings::default());
    scene.ensure_actor(HERO, ActorKind::Character).unwrap();
    scene.ensure_actor(CAMERA, ActorKind::Camera).unwrap();
    scene
}

fn finished_scene() -> SceneState {
    let mut scene = empty_scene();
    for i in 0..50 {
        scene
            .keyframe(HERO, &format!("pose.custom_{i}"), 0, FrameIndex(1), 0.0)
            .unwrap();
    }
    scene
        .keyframe(HERO, "location", 0, FrameIndex(14800), 3.0)
        .unwrap();
    scene
        .keyframe(CAMERA, "location", 1, FrameIndex(100), 0.0)
        .unwrap();
    scene
        .keyframe(CAMERA, "location", 1, FrameIndex(1300), 5.0)
        .unwrap();
    scene
}

#[test]
fn sparse_early_build_is_not_complete() {
    let mut scene = empty_scene();
    for (i, frame) in [10, 200, 500].into_iter().enumerate() {
        scene
            .keyframe(HERO, "location", i as u32, FrameIndex(frame), 1.0)
            .unwrap();
    }
    scene
        .keyframe(CAMERA, "location", 0, FrameIndex(1), 0.0)
        .unwrap();
    scene
        .keyframe(CAMERA, "location", 0, FrameIndex(1500), 0.0)
        .unwrap();
    assert!(!is_complete(&scene, &ReadinessThresholds::default()));
}

#[test]
fn dense_late_build_is_complete() {
    assert!(is_complete(&finished_scene(), &ReadinessThresholds::default()));
}

#[test]
fn short_camera_span_is_not_complete() {
    let mut scene = empty_scene();
    for i in 0..50 {
        scene
            .keyframe(HERO, &format!("pose.custom_{i}"), 0, FrameIndex(14900), 0.0)
            .unwrap();
    }
    scene
        .keyframe(CAMERA, "lens", 0, FrameIndex(100), 35.0)
        .unwrap();
    scene
        .keyframe(CAMERA, "lens", 0, FrameIndex(900), 50.0)
        .unwrap();
    assert!(!is_complete(&scene, &ReadinessThresholds::default()));
}

#[test]
fn missing_principal_or_camera_is_not_complete() {
    let scene = SceneState::new(TimelineMap::builtin().unwrap(), SceneSettings::default());
    assert!(!is_complete(&scene, &ReadinessThresholds::default()));

    let thresholds = ReadinessThresholds {
        principal_actors: vec!["Understudy".to_string()],
        ..ReadinessThresholds::default()
    };
    assert!(!is_complete(&finished_scene(), &thresholds));
}

#[test]
fn late_frame_is_a_fraction_of_the_timeline() {
    let scene = empty_scene();
    assert_eq!(
        late_frame(&scene, &ReadinessThresholds::default()),
        FrameIndex(14250)
    );
}

#[test]
fn ambient_curves_do_not_count_as_late_keys() {
    let mut scene = empty_scene();
    for i in 0..20 {
        scene
            .keyframe(HERO, &format!("pose.custom_{i}"), 0, FrameIndex(1), 0.0)
            .unwrap();
    }
    scene
        .keyframe(HERO, "pose.breath", 0, FrameIndex(14977), 1.0)
        .unwrap();
    scene
        .keyframe(CAMERA, "location", 0, FrameIndex(1), 0.0)
        .unwrap();
    scene
        .keyframe(CAMERA, "location", 0, FrameIndex(6600), 4.0)
        .unwrap();
    assert!(!is_complete(&scene, &ReadinessThresholds::default()));

    scene
        .keyframe(CAMERA, "location", 0, FrameIndex(14400), 6.0)
        .unwrap();
    assert!(is_complete(&scene, &ReadinessThresholds::default()));
}

#[test]
fn late_keys_on_supporting_actors_do_not_count() {
    let mut scene = empty_scene();
    for i in 0..20 {
        scene
            .keyframe(HERO, &format!("pose.custom_{i}"), 0, FrameIndex(1), 0.0)
            .unwrap();
    }
    scene
        .keyframe(CAMERA, "lens", 0, FrameIndex(1), 35.0)
        .unwrap();
    scene
        .keyframe(CAMERA, "lens", 0, FrameIndex(2000), 50.0)
        .unwrap();
    scene.ensure_actor("Lantern", ActorKind::Prop).unwrap();
    scene
        .keyframe("Lantern", "energy", 0, FrameIndex(15000), 0.0)
        .unwrap();
    assert!(!is_complete(&scene, &ReadinessThresholds::default()));
}
