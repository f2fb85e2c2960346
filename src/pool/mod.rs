//! Worker pools and the ownership rules around them.

/// Owned-or-borrowed pool handling.
pub mod lease;
/// Thread pool, job handles and completion-order harvesting.
pub mod worker_pool;
