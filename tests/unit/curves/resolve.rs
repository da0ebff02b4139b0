use super::*;
use crate::foundation::core::FrameIndex;

fn snapshot(action: &Action) -> Vec<(String, u32, Vec<(u64, f64)>)> {
    let mut out: Vec<_> = get_action_curves(action)
        .unwrap()
        .into_iter()
        .map(|c| {
            (
                c.data_path().to_string(),
                c.array_index(),
                c.points().iter().map(|p| (p.frame.0, p.value)).collect(),
            )
        })
        .collect();
    out.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));
    out
}

fn animate(action: &mut Action, owner: Option<&str>) {
    for (path, idx, frame, value) in [
        ("location", 0, 1, 0.0),
        ("location", 0, 100, 4.0),
        ("rotation_euler", 2, 50, 1.5),
        ("location", 1, 1, -2.0),
    ] {
        get_or_create_curve(action, path, idx, owner)
            .unwrap()
            .insert(FrameIndex(frame), value);
    }
}

#[test]
fn flat_get_or_create_is_idempotent() {
    let mut action = Action::flat("CamAction");
    get_or_create_curve(&mut action, "lens", 0, None)
        .unwrap()
        .insert(FrameIndex(10), 35.0);
    get_or_create_curve(&mut action, "lens", 0, None)
        .unwrap()
        .insert(FrameIndex(10), 50.0);

    let curves = get_action_curves(&action).unwrap();
    assert_eq!(curves.len(), 1);
    assert_eq!(curves[0].len(), 1);
    assert_eq!(curves[0].points()[0].value, 50.0);
}

#[test]
fn layered_get_or_create_is_idempotent() {
    let mut action = Action::layered("HeroAction");
    for v in [1.0, 2.0] {
        get_or_create_curve(&mut action, "location", 2, Some("Hero"))
            .unwrap()
            .insert(FrameIndex(7), v);
    }
    let curves = get_action_curves(&action).unwrap();
    assert_eq!(curves.len(), 1);
    assert_eq!(curves[0].points(), &[crate::CurvePoint {
        frame: FrameIndex(7),
        value: 2.0
    }]);
    assert_eq!(action.layers().len(), 1);
    assert_eq!(action.layers()[0].name, DEFAULT_LAYER);
    assert_eq!(action.layers()[0].bindings.len(), 1);
}

#[test]
fn both_schemes_expose_the_same_logical_curves() {
    let mut flat = Action::flat("A").with_owner("Hero");
    let mut layered = Action::layered("B").with_owner("Hero");
    animate(&mut flat, Some("Hero"));
    animate(&mut layered, Some("Hero"));
    assert_eq!(snapshot(&flat), snapshot(&layered));
    assert_eq!(snapshot(&flat).len(), 3);
}

#[test]
fn bindings_are_scoped_per_owner() {
    let mut action = Action::layered("Shared");
    get_or_create_curve(&mut action, "location", 0, Some("Hero"))
        .unwrap()
        .insert(FrameIndex(1), 1.0);
    get_or_create_curve(&mut action, "location", 0, Some("Guide"))
        .unwrap()
        .insert(FrameIndex(1), 9.0);

    assert_eq!(get_action_curves(&action).unwrap().len(), 2);
    let hero = get_owner_curves(&action, "Hero").unwrap();
    assert_eq!(hero.len(), 1);
    assert_eq!(hero[0].points()[0].value, 1.0);
}

#[test]
fn layered_without_owner_fails_instead_of_guessing() {
    let mut action = Action::layered("Orphan");
    action.layers = Some(vec![Layer {
        name: "Main".to_string(),
        bindings: vec![Binding::new("Hero")],
    }]);
    let err = get_or_create_curve(&mut action, "location", 0, None).unwrap_err();
    assert!(matches!(err, ReelError::BindingResolution { .. }));
    assert!(action.layers()[0].bindings[0].curves.is_empty());
}

#[test]
fn recorded_owner_is_used_when_no_hint_is_given() {
    let mut action = Action::layered("HeroAction").with_owner("Hero");
    get_or_create_curve(&mut action, "scale", 1, None).unwrap();
    assert_eq!(action.layers()[0].bindings[0].target, "Hero");
}

#[test]
fn duplicate_bindings_are_ambiguous() {
    let mut action = Action::layered("Dup");
    action.layers = Some(vec![Layer {
        name: "Main".to_string(),
        bindings: vec![Binding::new("Hero"), Binding::new("Hero")],
    }]);
    let err = get_or_create_curve(&mut action, "location", 0, Some("Hero")).unwrap_err();
    match err {
        ReelError::BindingResolution { message, .. } => assert!(message.contains("several")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unsupported_action_fails_both_entry_points() {
    let mut action = Action::bare("Broken");
    assert!(matches!(
        get_or_create_curve(&mut action, "location", 0, Some("Hero")),
        Err(ReelError::UnsupportedActionFormat(_))
    ));
    assert!(matches!(
        get_action_curves(&action),
        Err(ReelError::UnsupportedActionFormat(_))
    ));
}

#[test]
fn flat_owner_curves_respect_assignment() {
    let mut action = Action::flat("A").with_owner("Hero");
    animate(&mut action, None);
    assert_eq!(get_owner_curves(&action, "Hero").unwrap().len(), 3);
    assert!(get_owner_curves(&action, "Guide").unwrap().is_empty());
}

const MID_MIGRATION: &str = r#"{
    "name": "HeroAction",
    "owner": "Hero",
    "fcurves": [{"data_path": "location", "array_index": 0,
                 "points": [{"frame": 10, "value": 1.0}]}],
    "layers": []
}"#;

#[test]
fn mixed_action_reads_leftover_flat_curves() {
    let action: Action = serde_json::from_str(MID_MIGRATION).unwrap();
    assert_eq!(action.format().unwrap(), ActionFormat::Layered);
    assert_eq!(get_action_curves(&action).unwrap().len(), 1);
    assert_eq!(get_owner_curves(&action, "Hero").unwrap().len(), 1);
    assert!(get_owner_curves(&action, "Guide").unwrap().is_empty());
}

#[test]
fn mixed_action_write_extends_the_existing_flat_curve() {
    let mut action: Action = serde_json::from_str(MID_MIGRATION).unwrap();
    get_or_create_curve(&mut action, "location", 0, Some("Hero"))
        .unwrap()
        .insert(FrameIndex(20), 2.0);

    assert_eq!(
        snapshot(&action),
        vec![("location".to_string(), 0, vec![(10, 1.0), (20, 2.0)])]
    );
    let owned = get_owner_curves(&action, "Hero").unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].len(), 2);
    assert_eq!(action.layers()[0].bindings[0].target, "Hero");
}

#[test]
fn mixed_action_binding_keys_win_over_flat_keys_at_same_frame() {
    let mut action: Action = serde_json::from_str(MID_MIGRATION).unwrap();
    let mut curve = Curve::new("location", 0);
    curve.insert(FrameIndex(10), 5.0);
    let mut binding = Binding::new("Hero");
    binding.curves.push(curve);
    let mut layer = Layer::new(DEFAULT_LAYER);
    layer.bindings.push(binding);
    action.layers = Some(vec![layer]);

    get_or_create_curve(&mut action, "location", 0, None).unwrap();
    assert_eq!(
        snapshot(&action),
        vec![("location".to_string(), 0, vec![(10, 5.0)])]
    );
}

#[test]
fn mixed_action_keeps_flat_curves_of_another_owner() {
    let mut action: Action = serde_json::from_str(MID_MIGRATION).unwrap();
    get_or_create_curve(&mut action, "location", 0, Some("Guide"))
        .unwrap()
        .insert(FrameIndex(20), 2.0);
    assert_eq!(get_action_curves(&action).unwrap().len(), 2);
    assert_eq!(get_owner_curves(&action, "Hero").unwrap().len(), 1);
    assert_eq!(get_owner_curves(&action, "Guide").unwrap().len(), 1);
}
