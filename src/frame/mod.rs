//! Frame data model and the lazy frame source.

/// Frame dataset model.
pub mod model;
/// Compute-callback wrapper producing indexed frames.
pub mod source;
