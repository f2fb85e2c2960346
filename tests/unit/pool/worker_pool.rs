use super::*;
use std::time::Duration;

#[test]
fn zero_workers_picks_a_default() {
    let pool = WorkerPool::new(0).unwrap();
    assert!(pool.workers() >= 1);
    assert_eq!(pool.workers(), default_worker_count());
}

#[test]
fn submit_and_wait_returns_job_value() {
    let pool = WorkerPool::new(2).unwrap();
    let h = pool.submit(FrameIndex(7), || 6 * 7);
    assert_eq!(h.index(), FrameIndex(7));
    assert_eq!(h.wait().unwrap(), 42);
}

#[test]
fn panicking_job_becomes_worker_error() {
    let pool = WorkerPool::new(1).unwrap();
    let h = pool.submit(FrameIndex(1), || -> u32 { panic!("boom") });
    let err = h.wait().unwrap_err();
    assert!(matches!(err, AnimError::Worker(ref m) if m.contains("boom")));

    // The pool keeps serving jobs afterwards.
    assert_eq!(pool.submit(FrameIndex(2), || 1).wait().unwrap(), 1);
}

#[test]
fn as_completed_yields_in_completion_order() {
    let pool = WorkerPool::new(3).unwrap();
    let mut batch = JobBatch::new();
    batch.submit(&pool, FrameIndex(0), || {
        std::thread::sleep(Duration::from_millis(300));
        0
    });
    batch.submit(&pool, FrameIndex(1), || 1);
    batch.submit(&pool, FrameIndex(2), || {
        std::thread::sleep(Duration::from_millis(100));
        2
    });
    assert_eq!(batch.len(), 3);

    let done = as_completed(batch);
    assert_eq!(done.len(), 3);
    let order = done
        .map(|(i, r)| {
            assert_eq!(r.unwrap(), i.0);
            i.0
        })
        .collect::<Vec<u64>>();
    assert_eq!(order.len(), 3);
    assert_eq!(order.last(), Some(&0));
}

#[test]
fn as_completed_on_nothing_is_empty() {
    let batch = JobBatch::<()>::new();
    assert!(batch.is_empty());
    let mut it = as_completed(batch);
    assert!(it.next().is_none());
}

#[test]
fn batch_panics_stay_on_their_own_index() {
    let pool = WorkerPool::new(2).unwrap();
    let mut batch = JobBatch::new();
    for i in 0..4u64 {
        batch.submit(&pool, FrameIndex(i), move || {
            if i == 2 {
                panic!("frame two");
            }
            i
        });
    }
    let mut failed = Vec::new();
    for (index, res) in as_completed(batch) {
        match res {
            Ok(v) => assert_eq!(v, index.0),
            Err(e) => {
                assert!(matches!(e, AnimError::Worker(ref m) if m.contains("frame two")));
                failed.push(index);
            }
        }
    }
    assert_eq!(failed, vec![FrameIndex(2)]);
}

#[test]
fn harvesting_many_trivial_jobs_stays_linear() {
    let pool = WorkerPool::new(4).unwrap();
    let n = 20_000u64;
    let mut batch = JobBatch::new();
    for i in 0..n {
        batch.submit(&pool, FrameIndex(i), move || i);
    }
    let start = std::time::Instant::now();
    let mut sum = 0u64;
    let mut count = 0u64;
    for (_, res) in as_completed(batch) {
        sum += res.unwrap();
        count += 1;
    }
    let elapsed = start.elapsed();
    assert_eq!(count, n);
    assert_eq!(sum, n * (n - 1) / 2);
    assert!(elapsed < Duration::from_secs(5), "harvest took {elapsed:?}");
}
