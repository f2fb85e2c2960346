use std::collections::BTreeSet;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crossbeam_channel::{Receiver, Sender};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{AnimError, AnimResult};
use crate::render::worker::panic_message;

/// Fixed-size pool of render workers backed by a rayon thread pool.
///
/// Jobs are fire-and-forget closures; results come back through a [`JobHandle`] or a
/// [`JobBatch`].
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Build a pool with `workers` threads. `0` picks [`default_worker_count`].
    pub fn new(workers: usize) -> AnimResult<Self> {
        let workers = if workers == 0 {
            default_worker_count()
        } else {
            workers
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("animaker-worker-{i}"))
            .build()
            .map_err(|e| AnimError::worker(format!("failed to build worker pool: {e}")))?;
        tracing::debug!(workers, "worker pool started");
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queue a single `job` for frame `index`. Returns immediately.
    ///
    /// Use a [`JobBatch`] when many results are harvested together. A panicking job resolves its
    /// handle to a worker error instead of tearing down the pool.
    pub fn submit<T, F>(&self, index: FrameIndex, job: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.pool.spawn(move || {
            // Receiver gone means nobody is waiting on this frame anymore.
            let _ = tx.send(run_isolated(index, job));
        });
        JobHandle { index, rx }
    }

    /// Stop the pool. Jobs already queued still run to completion on their threads.
    pub fn shutdown(self) {
        tracing::debug!(workers = self.workers, "worker pool shut down");
        drop(self.pool);
    }
}

/// One worker per available core, minus one for the controller thread.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

/// Future-like handle to one submitted job.
#[derive(Debug)]
pub struct JobHandle<T> {
    index: FrameIndex,
    rx: Receiver<AnimResult<T>>,
}

impl<T> JobHandle<T> {
    pub fn index(&self) -> FrameIndex {
        self.index
    }

    /// Block until the job finishes.
    pub fn wait(self) -> AnimResult<T> {
        let index = self.index;
        self.rx.recv().unwrap_or_else(|_| Err(lost_result(index)))
    }
}

fn run_isolated<T>(index: FrameIndex, job: impl FnOnce() -> T) -> AnimResult<T> {
    catch_unwind(AssertUnwindSafe(job)).map_err(|p| {
        AnimError::worker(format!(
            "job for frame {index} panicked: {}",
            panic_message(p.as_ref())
        ))
    })
}

fn lost_result(index: FrameIndex) -> AnimError {
    AnimError::worker(format!("result for frame {index} was lost"))
}

/// Jobs whose results all land on one shared channel.
///
/// Harvesting a batch with [`as_completed`] costs O(1) per finished job. Frame indices must be
/// unique within a batch.
#[derive(Debug)]
pub struct JobBatch<T> {
    tx: Sender<(FrameIndex, AnimResult<T>)>,
    rx: Receiver<(FrameIndex, AnimResult<T>)>,
    pending: BTreeSet<FrameIndex>,
}

impl<T> Default for JobBatch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> JobBatch<T> {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            pending: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T: Send + 'static> JobBatch<T> {
    /// Queue `job` for frame `index` on `pool`. Returns immediately.
    pub fn submit<F>(&mut self, pool: &WorkerPool, index: FrameIndex, job: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let tx = self.tx.clone();
        pool.pool.spawn(move || {
            // Receiver gone means nobody is harvesting this batch anymore.
            let _ = tx.send((index, run_isolated(index, job)));
        });
        self.pending.insert(index);
    }
}

/// Yield the batch's results in completion order rather than submission order.
pub fn as_completed<T>(batch: JobBatch<T>) -> AsCompleted<T> {
    let JobBatch { rx, pending, .. } = batch;
    AsCompleted { rx, pending }
}

/// Iterator returned by [`as_completed`].
#[derive(Debug)]
pub struct AsCompleted<T> {
    rx: Receiver<(FrameIndex, AnimResult<T>)>,
    pending: BTreeSet<FrameIndex>,
}

impl<T> Iterator for AsCompleted<T> {
    type Item = (FrameIndex, AnimResult<T>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_empty() {
            return None;
        }
        match self.rx.recv() {
            Ok((index, res)) => {
                self.pending.remove(&index);
                Some((index, res))
            }
            // Every job sender is gone: whatever is still pending will never arrive.
            Err(_) => {
                let index = self.pending.pop_first()?;
                Some((index, Err(lost_result(index))))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.pending.len()))
    }
}

impl<T> ExactSizeIterator for AsCompleted<T> {}

#[cfg(test)]
#[path = "../../tests/unit/pool/worker_pool.rs"]
mod tests;
