use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::config::options::AnimateOpts;
use crate::encode::ffmpeg::{images_to_video, normalize_video_path};
use crate::foundation::core::FrameBound;
use crate::foundation::error::AnimResult;
use crate::frame::source::FrameSource;
use crate::pool::lease::PoolSource;
use crate::render::naming::ImagePattern;
use crate::render::worker::RenderFn;
use crate::session::controller::{BuildReport, build_images};

/// Sub-folder of the work folder holding the numbered images.
pub const IMAGE_SUBDIR: &str = "imgs";

/// Result of [`animate`].
#[derive(Debug)]
pub struct AnimationOutput {
    pub video_path: PathBuf,
    /// `None` in only-convert mode.
    pub build: Option<BuildReport>,
}

/// Render every frame of `source` in parallel, then encode the images into a video.
///
/// Images go to `<work_folder>/imgs/`, the video to `<work_folder>/<opts.video_name>`.
/// Frames whose job failed are reported on the returned build report; the encode still runs.
#[tracing::instrument(skip(source, render, opts, pool), fields(work_folder = %work_folder.display()))]
pub fn animate(
    work_folder: &Path,
    source: FrameSource,
    render: Arc<RenderFn>,
    opts: &AnimateOpts,
    pool: PoolSource<'_>,
) -> AnimResult<AnimationOutput> {
    opts.validate()?;
    std::fs::create_dir_all(work_folder)
        .with_context(|| format!("failed to create work folder '{}'", work_folder.display()))?;

    let source = match opts.max_frames {
        Some(n) if n > 0 => source.with_max_frames(n),
        _ => source,
    };
    let image_dir = work_folder.join(IMAGE_SUBDIR);

    let (pattern, build) = if opts.only_convert {
        let bound = match source.bound() {
            FrameBound::Unbounded => FrameBound::from_max_frames(opts.max_frames),
            b => b,
        };
        let pattern = ImagePattern::new(&image_dir, bound, opts.save.format.extension());
        tracing::info!(pattern = %pattern, "only converting existing images");
        (pattern, None)
    } else {
        let report = build_images(&image_dir, source, render, opts, pool)?;
        tracing::info!("{}", report.tallies);
        tracing::info!("\n{}", report.stats);
        (report.image_pattern.clone(), Some(report))
    };

    let video_path = normalize_video_path(&work_folder.join(&opts.video_name));
    let video_path = images_to_video(&pattern, opts.fps, &video_path, &opts.video)?;
    Ok(AnimationOutput { video_path, build })
}
