use super::*;
use crate::timeline::map::Segment;

fn small_scene(format: ActionFormat) -> SceneState {
    let timeline = TimelineMap::new(vec![Segment::new("a", 1, 100), Segment::new("b", 101, 200)])
        .unwrap();
    SceneState::new(
        timeline,
        SceneSettings {
            action_format: format,
            ..SceneSettings::default()
        },
    )
}

#[test]
fn ensure_actor_never_duplicates() {
    let mut scene = small_scene(ActionFormat::Flat);
    scene.ensure_actor("Hero", ActorKind::Character).unwrap().visible = false;
    let again = scene.ensure_actor("Hero", ActorKind::Character).unwrap();
    assert!(!again.visible);
    assert_eq!(scene.actor_count(), 1);
}

#[test]
fn ensure_actor_rejects_kind_mismatch() {
    let mut scene = small_scene(ActionFormat::Flat);
    scene.ensure_actor("Cam", ActorKind::Camera).unwrap();
    assert!(scene.ensure_actor("Cam", ActorKind::Prop).is_err());
}

#[test]
fn keyframe_requires_existing_actor() {
    let mut scene = small_scene(ActionFormat::Layered);
    assert!(scene.keyframe("Nobody", "location", 0, FrameIndex(1), 0.0).is_err());
}

#[test]
fn keyframes_accumulate_on_one_curve_in_either_scheme() {
    for format in [ActionFormat::Flat, ActionFormat::Layered] {
        let mut scene = small_scene(format);
        scene.ensure_actor("Hero", ActorKind::Character).unwrap();
        scene
            .keyframe_vec("Hero", "location", FrameIndex(1), &[0.0, 1.0, 2.0])
            .unwrap();
        scene
            .keyframe("Hero", "location", 0, FrameIndex(50), 5.0)
            .unwrap();

        assert_eq!(scene.curves_of("Hero").unwrap().len(), 3);
        let x = scene.curve("Hero", "location", 0).unwrap().unwrap();
        assert_eq!(x.len(), 2);
        let action = scene.actor("Hero").unwrap().action.as_ref().unwrap();
        assert_eq!(action.format().unwrap(), format);
        assert_eq!(action.owner.as_deref(), Some("Hero"));
    }
}

#[test]
fn fingerprint_tracks_animation_content() {
    let mut a = small_scene(ActionFormat::Flat);
    let mut b = small_scene(ActionFormat::Layered);
    for s in [&mut a, &mut b] {
        s.ensure_actor("Hero", ActorKind::Character).unwrap();
        s.keyframe("Hero", "location", 0, FrameIndex(3), 1.0).unwrap();
    }
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

    b.keyframe("Hero", "location", 0, FrameIndex(3), 2.0).unwrap();
    assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn fingerprint_covers_curves_bound_to_other_targets() {
    let mut scene = small_scene(ActionFormat::Layered);
    scene.ensure_actor("Hero", ActorKind::Character).unwrap();
    scene.keyframe("Hero", "location", 0, FrameIndex(3), 1.0).unwrap();
    let before = scene.fingerprint().unwrap();

    let action = scene.actor_mut("Hero").unwrap().action.as_mut().unwrap();
    get_or_create_curve(action, "location", 0, Some("Ghost"))
        .unwrap()
        .insert(FrameIndex(9), 4.0);

    assert_eq!(scene.curves_of("Hero").unwrap().len(), 1);
    assert_ne!(scene.fingerprint().unwrap(), before);
}

#[test]
fn frame_span_follows_timeline() {
    let scene = small_scene(ActionFormat::Flat);
    assert_eq!(scene.frame_span(), FrameSpan { start: 1, end: 200 });
}
