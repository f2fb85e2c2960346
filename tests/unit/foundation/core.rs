use super::*;

#[test]
fn frame_bound_from_max_frames() {
    assert_eq!(FrameBound::from_max_frames(None), FrameBound::Unbounded);
    assert_eq!(FrameBound::from_max_frames(Some(0)), FrameBound::Unbounded);
    assert_eq!(FrameBound::from_max_frames(Some(5)), FrameBound::Limited(5));
}

#[test]
fn frame_bound_is_reached() {
    assert!(!FrameBound::Limited(3).is_reached(2));
    assert!(FrameBound::Limited(3).is_reached(3));
    assert!(!FrameBound::Unbounded.is_reached(u64::MAX));
    assert_eq!(FrameBound::Unbounded.to_string(), "???");
}

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::integer(24).unwrap().to_string(), "24");
    assert_eq!(Fps::new(30000, 1001).unwrap().to_string(), "30000/1001");
}
