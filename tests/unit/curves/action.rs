use super::*;

#[test]
fn probing_picks_the_available_collection() {
    assert_eq!(Action::flat("a").format().unwrap(), ActionFormat::Flat);
    assert_eq!(Action::layered("b").format().unwrap(), ActionFormat::Layered);
    assert_eq!(
        Action::new("c", ActionFormat::Layered).format().unwrap(),
        ActionFormat::Layered
    );
}

#[test]
fn action_without_collections_is_unsupported() {
    let err = Action::bare("ghost").format().unwrap_err();
    assert!(matches!(err, ReelError::UnsupportedActionFormat(name) if name == "ghost"));
}

#[test]
fn layers_win_when_both_collections_are_present() {
    let json = r#"{"name": "mid_migration", "fcurves": [], "layers": []}"#;
    let action: Action = serde_json::from_str(json).unwrap();
    assert_eq!(action.format().unwrap(), ActionFormat::Layered);
}

#[test]
fn probed_format_is_cached() {
    let mut action = Action::flat("a");
    assert_eq!(action.format().unwrap(), ActionFormat::Flat);
    action.layers = Some(Vec::new());
    assert_eq!(action.format().unwrap(), ActionFormat::Flat);
}

#[test]
fn host_json_round_trips_layered_bindings() {
    let json = r#"{
        "name": "HeroAction",
        "owner": "Hero",
        "layers": [{
            "name": "Main",
            "bindings": [{
                "target": "Hero",
                "curves": [{"data_path": "location", "array_index": 0,
                            "points": [{"frame": 1, "value": 0.0}]}]
            }]
        }]
    }"#;
    let action: Action = serde_json::from_str(json).unwrap();
    assert_eq!(action.owner.as_deref(), Some("Hero"));
    assert_eq!(action.layers()[0].bindings[0].curves[0].len(), 1);
}
