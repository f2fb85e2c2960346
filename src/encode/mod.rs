//! Out-of-process video encoding with the system `ffmpeg`.

/// ffmpeg command construction and invocation.
pub mod ffmpeg;
