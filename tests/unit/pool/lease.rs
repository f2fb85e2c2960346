use super::*;
use std::cell::Cell;

#[test]
fn auto_source_owns_its_pool() {
    let lease = PoolSource::Auto { workers: 2 }.acquire().unwrap();
    assert!(lease.is_owned());
    assert_eq!(lease.get().workers(), 2);
    lease.release();
}

#[test]
fn factory_is_called_exactly_once() {
    let calls = Cell::new(0);
    let src = PoolSource::factory(|| {
        calls.set(calls.get() + 1);
        WorkerPool::new(1)
    });
    let lease = src.acquire().unwrap();
    assert!(lease.is_owned());
    lease.release();
    assert_eq!(calls.get(), 1);
}

#[test]
fn factory_error_propagates() {
    let src = PoolSource::factory(|| Err(crate::foundation::error::AnimError::worker("no cluster")));
    assert!(src.acquire().is_err());
}

#[test]
fn shared_pool_survives_release() {
    let pool = WorkerPool::new(1).unwrap();
    let lease = PoolSource::Shared(&pool).acquire().unwrap();
    assert!(!lease.is_owned());
    lease.release();
    let h = pool.submit(crate::foundation::core::FrameIndex(0), || "still up");
    assert_eq!(h.wait().unwrap(), "still up");
}

#[test]
fn default_source_is_auto() {
    assert!(matches!(PoolSource::default(), PoolSource::Auto { workers: 0 }));
}
