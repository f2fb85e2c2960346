//! Adaptive payload compression for frames crossing the worker boundary.

/// Frame payload encode/decode.
pub mod payload;
