//! Per-frame rendering: figures, image naming, the cache gate and the render worker.

/// Skip-if-exists decision point.
pub mod cache;
/// Drawing surface returned by render callbacks.
pub mod figure;
/// Index-derived image file names.
pub mod naming;
/// Decode -> render -> validate -> save -> cleanup job runner.
pub mod worker;
