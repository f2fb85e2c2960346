use super::*;

#[test]
fn variable_new_checks_shape() {
    assert!(Variable::new(vec!["x".into()], vec![3], vec![1.0, 2.0, 3.0]).is_ok());
    assert!(Variable::new(vec!["x".into()], vec![4], vec![1.0, 2.0, 3.0]).is_err());
    assert!(Variable::new(vec![], vec![3], vec![1.0, 2.0, 3.0]).is_err());
}

#[test]
fn byte_size_counts_variables_and_coords() {
    let frame = Frame::empty()
        .with_variable("x", Variable::vector("size", vec![0.0; 10]))
        .with_coord("size", Variable::vector("size", vec![0.0; 10]))
        .with_attr("title", "orbit");
    assert_eq!(frame.byte_size(), 160);
    assert_eq!(Frame::empty().byte_size(), 0);
    assert!(Frame::empty().is_empty());
}

#[test]
fn nan_values_compare_equal() {
    let a = Variable::vector("size", vec![f64::NAN, 1.0]);
    let b = Variable::vector("size", vec![f64::NAN, 1.0]);
    let c = Variable::vector("size", vec![f64::NAN, 2.0]);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn attrs_round_trip_through_json() {
    let frame = Frame::empty()
        .with_attr("n", 3_i64)
        .with_attr("scale", 0.5)
        .with_attr("label", "a");
    let json = serde_json::to_string(&frame).unwrap();
    let back: Frame = serde_json::from_str(&json).unwrap();
    assert_eq!(back, frame);
}
