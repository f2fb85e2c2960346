use super::*;
use crate::frame::model::Variable;

fn counting(n: usize) -> impl Fn() -> Vec<Frame> {
    move || {
        (0..n)
            .map(|i| Frame::empty().with_variable("i", Variable::scalar(i as f64)))
            .collect()
    }
}

#[test]
fn neither_bound_nor_compute_is_a_config_error() {
    let err = FrameSource::new(None, None).unwrap_err();
    assert!(matches!(err, AnimError::Config(_)));
    assert!(FrameSource::new(Some(0), None).is_err());
}

#[test]
fn count_only_yields_empty_frames() {
    let src = FrameSource::count(5).unwrap();
    let frames = src.frames().collect::<Vec<_>>();
    assert_eq!(frames.len(), 5);
    assert!(frames.iter().all(|(_, f)| f.is_empty()));
    assert_eq!(frames[4].0, FrameIndex(4));
}

#[test]
fn compute_only_is_unbounded_and_runs_to_exhaustion() {
    let src = FrameSource::from_compute(counting(7));
    assert_eq!(src.bound(), FrameBound::Unbounded);
    assert_eq!(src.frames().count(), 7);
}

#[test]
fn stops_at_whichever_limit_comes_first() {
    let src = FrameSource::from_compute(counting(7)).with_max_frames(3);
    assert_eq!(src.frames().count(), 3);

    let src = FrameSource::from_compute(counting(2)).with_max_frames(10);
    assert_eq!(src.frames().count(), 2);
}

#[test]
fn each_pass_restarts_the_compute_callback() {
    let src = FrameSource::from_compute(counting(3));
    let first = src.frames().map(|(_, f)| f).collect::<Vec<_>>();
    let second = src.frames().map(|(_, f)| f).collect::<Vec<_>>();
    assert_eq!(first, second);
}
