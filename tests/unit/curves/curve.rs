use super::*;

#[test]
fn insert_keeps_points_sorted_and_unique() {
    let mut c = Curve::new("location", 2);
    c.insert(FrameIndex(30), 3.0);
    c.insert(FrameIndex(10), 1.0);
    c.insert(FrameIndex(20), 2.0);
    c.insert(FrameIndex(20), 5.0);

    let frames: Vec<u64> = c.points().iter().map(|p| p.frame.0).collect();
    assert_eq!(frames, vec![10, 20, 30]);
    assert_eq!(c.points()[1].value, 5.0);
    assert_eq!(c.span(), Some(FrameSpan { start: 10, end: 30 }));
}

#[test]
fn value_at_interpolates_and_holds() {
    let mut c = Curve::new("lens", 0);
    assert_eq!(c.value_at(FrameIndex(1)), None);
    c.insert(FrameIndex(10), 0.0);
    c.insert(FrameIndex(20), 10.0);
    assert_eq!(c.value_at(FrameIndex(0)), Some(0.0));
    assert_eq!(c.value_at(FrameIndex(15)), Some(5.0));
    assert_eq!(c.value_at(FrameIndex(20)), Some(10.0));
    assert_eq!(c.value_at(FrameIndex(99)), Some(10.0));
}

#[test]
fn deserialize_normalizes_unsorted_points() {
    let json = r#"{
        "data_path": "rotation_euler",
        "array_index": 2,
        "points": [
            {"frame": 5, "value": 1.0},
            {"frame": 1, "value": 0.0},
            {"frame": 5, "value": 2.0}
        ]
    }"#;
    let c: Curve = serde_json::from_str(json).unwrap();
    assert!(c.matches("rotation_euler", 2));
    assert_eq!(c.len(), 2);
    assert_eq!(c.points()[1].value, 2.0);
}
