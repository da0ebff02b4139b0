use std::sync::{Arc, Mutex};

use super::*;
use crate::foundation::core::FrameIndex;
use crate::scene::actor::ActorKind;
use crate::scene::state::SceneSettings;
use crate::timeline::map::Segment;

struct Recorder {
    segment: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl SegmentModule for Recorder {
    fn segment(&self) -> &str {
        self.segment
    }

    fn setup(&self, _scene: &mut SceneState) -> ReelResult<()> {
        self.log.lock().unwrap().push(self.segment.to_string());
        Ok(())
    }
}

/// Needs the optional "Guide" actor; creates a guard prop when it is there.
struct NeedsGuide;

impl SegmentModule for NeedsGuide {
    fn segment(&self) -> &str {
        "b"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        if !scene.contains("Guide") {
            return Ok(());
        }
        let span = scene.timeline().lookup("b")?;
        scene.ensure_actor("GuideMarker", ActorKind::Prop)?;
        scene.keyframe("Guide", "location", 0, FrameIndex(span.start), 1.0)
    }
}

fn scene() -> SceneState {
    let timeline = TimelineMap::new(vec![
        Segment::new("a", 1, 10),
        Segment::new("b", 11, 20),
        Segment::new("c", 21, 30),
    ])
    .unwrap();
    SceneState::new(timeline, SceneSettings::default())
}

fn recording_registry(log: &Arc<Mutex<Vec<String>>>) -> SegmentRegistry {
    let mut reg = SegmentRegistry::new();
    for segment in ["a", "b", "c"] {
        reg.register(Box::new(Recorder {
            segment,
            log: Arc::clone(log),
        }))
        .unwrap();
    }
    reg
}

#[test]
fn dispatch_follows_caller_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let reg = recording_registry(&log);
    let mut s = scene();

    let ran = dispatch(&reg, &["c", "a", "b"], &mut s).unwrap();
    assert_eq!(ran, vec!["c", "a", "b"]);
    assert_eq!(*log.lock().unwrap(), vec!["c", "a", "b"]);
}

#[test]
fn dispatch_all_uses_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let reg = recording_registry(&log);
    dispatch_all(&reg, &mut scene()).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn unknown_names_fail_before_anything_runs() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let reg = recording_registry(&log);
    let err = dispatch(&reg, &["a", "zz"], &mut scene()).unwrap_err();
    assert!(matches!(err, ReelError::UnknownSegment(name) if name == "zz"));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut reg = SegmentRegistry::new();
    reg.register(Box::new(NeedsGuide)).unwrap();
    assert!(reg.register(Box::new(NeedsGuide)).is_err());
    assert_eq!(reg.len(), 1);
}

#[test]
fn missing_optional_actor_is_a_repeatable_no_op() {
    let mut reg = SegmentRegistry::new();
    reg.register(Box::new(NeedsGuide)).unwrap();
    let mut s = scene();

    dispatch(&reg, &["b"], &mut s).unwrap();
    dispatch(&reg, &["b"], &mut s).unwrap();
    assert_eq!(s.actor_count(), 0);
}

#[test]
fn rerunning_does_not_duplicate_supporting_actors() {
    let mut reg = SegmentRegistry::new();
    reg.register(Box::new(NeedsGuide)).unwrap();
    let mut s = scene();
    s.ensure_actor("Guide", ActorKind::Character).unwrap();

    dispatch(&reg, &["b"], &mut s).unwrap();
    dispatch(&reg, &["b"], &mut s).unwrap();
    assert_eq!(s.actor_count(), 2);
    assert_eq!(s.curves_of("Guide").unwrap()[0].len(), 1);
}

#[test]
fn registry_validation_catches_unmapped_segments() {
    struct Stray;
    impl SegmentModule for Stray {
        fn segment(&self) -> &str {
            "not_on_timeline"
        }
        fn setup(&self, _scene: &mut SceneState) -> ReelResult<()> {
            Ok(())
        }
    }

    let mut reg = SegmentRegistry::new();
    reg.register(Box::new(Stray)).unwrap();
    assert!(matches!(
        reg.validate_against(scene().timeline()),
        Err(ReelError::UnknownSegment(_))
    ));
}
