use std::fmt;

use crate::foundation::error::AnimResult;
use crate::pool::worker_pool::WorkerPool;

/// Where a build gets its worker pool from.
pub enum PoolSource<'a> {
    /// Start a private pool with this many workers (`0` = auto).
    Auto { workers: usize },
    /// Call this once to build a private pool.
    Factory(Box<dyn FnOnce() -> AnimResult<WorkerPool> + 'a>),
    /// Use a pool owned by the caller. It is never shut down by the build.
    Shared(&'a WorkerPool),
}

impl fmt::Debug for PoolSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto { workers } => f.debug_struct("Auto").field("workers", workers).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Shared(p) => f.debug_tuple("Shared").field(p).finish(),
        }
    }
}

impl Default for PoolSource<'_> {
    fn default() -> Self {
        Self::Auto { workers: 0 }
    }
}

impl<'a> PoolSource<'a> {
    pub fn factory(f: impl FnOnce() -> AnimResult<WorkerPool> + 'a) -> Self {
        Self::Factory(Box::new(f))
    }

    /// Resolve into a lease that knows whether it owns the pool.
    pub fn acquire(self) -> AnimResult<PoolLease<'a>> {
        Ok(match self {
            Self::Auto { workers } => PoolLease::Owned(WorkerPool::new(workers)?),
            Self::Factory(make) => PoolLease::Owned(make()?),
            Self::Shared(pool) => PoolLease::Borrowed(pool),
        })
    }
}

/// A pool held for the duration of one build.
#[derive(Debug)]
pub enum PoolLease<'a> {
    Owned(WorkerPool),
    Borrowed(&'a WorkerPool),
}

impl PoolLease<'_> {
    pub fn get(&self) -> &WorkerPool {
        match self {
            Self::Owned(p) => p,
            Self::Borrowed(p) => p,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// End the lease. Shuts the pool down only when the build created it.
    pub fn release(self) {
        match self {
            Self::Owned(p) => p.shutdown(),
            Self::Borrowed(_) => tracing::debug!("leaving shared worker pool running"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pool/lease.rs"]
mod tests;
