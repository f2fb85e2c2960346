//! animaker builds animations frame by frame.
//!
//! A frame source produces one [`Frame`] of data per image. Each frame is handed, possibly
//! compressed, to a pool of workers that call a user render callback, rasterize the returned
//! [`Figure`] and save it under a deterministic, index-derived file name. Images that already exist
//! are skipped, so an interrupted build resumes where it stopped. Finally the system `ffmpeg`
//! assembles the images into a video.
//!
//! - Describe the data with a [`FrameSource`]
//! - Build images with [`RenderController`] / [`build_images`], or go all the way to a video with
//!   [`animate`]
//! - Try a single frame quickly with [`preview_frames`]
#![forbid(unsafe_code)]

mod foundation;

/// Frame payload compression.
pub mod codec;
/// Run options and JSON config files.
pub mod config;
/// ffmpeg video and GIF encoding.
pub mod encode;
/// Frame data model and frame sources.
pub mod frame;
/// Worker pools.
pub mod pool;
/// Figures, image naming, caching and the per-frame worker.
pub mod render;
/// Build orchestration.
pub mod session;
/// Per-image timing and size statistics.
pub mod stats;

pub use crate::foundation::core::{Fps, FrameBound, FrameIndex};
pub use crate::foundation::error::{AnimError, AnimResult};
pub use crate::foundation::timing::Timing;
pub use kurbo::Point;

pub use crate::codec::payload::{DEFAULT_MAX_PAYLOAD_BYTES, Payload};
pub use crate::config::file::AnimationConfig;
pub use crate::config::options::{
    AnimateOpts, GifOpts, ImageFormat, Rgba8, SaveOptions, VideoEncodeOpts,
};
pub use crate::encode::ffmpeg::{images_to_video, is_ffmpeg_on_path, video_to_gif};
pub use crate::frame::model::{AttrValue, Frame, Variable};
pub use crate::frame::source::FrameSource;
pub use crate::pool::lease::PoolSource;
pub use crate::pool::worker_pool::WorkerPool;
pub use crate::render::figure::{Artist, Figure};
pub use crate::render::naming::ImagePattern;
pub use crate::render::worker::{JobStage, RenderFn};
pub use crate::session::animate::{AnimationOutput, animate};
pub use crate::session::controller::{
    BuildReport, JobFailure, RenderController, RunTallies, build_images,
};
pub use crate::session::preview::preview_frames;
pub use crate::stats::record::StatsRecord;
pub use crate::stats::report::StatsReport;
pub use crate::stats::storage::StatsStorage;
