use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::options::{GifOpts, VideoEncodeOpts};
use crate::foundation::core::Fps;
use crate::foundation::error::{AnimError, AnimResult};
use crate::foundation::timing::Timing;
use crate::render::naming::ImagePattern;

/// Encode the numbered images behind `pattern` into an MP4 at `out`.
///
/// `out` goes through [`normalize_video_path`] first; the final path is returned.
#[tracing::instrument(skip(pattern, opts), fields(pattern = %pattern))]
pub fn images_to_video(
    pattern: &ImagePattern,
    fps: Fps,
    out: &Path,
    opts: &VideoEncodeOpts,
) -> AnimResult<PathBuf> {
    opts.validate()?;
    let out = normalize_video_path(out);
    ensure_parent_dir(&out)?;
    require_ffmpeg()?;

    let args = video_args(&pattern.ffmpeg_pattern(), fps, &out, opts);
    let (res, timing) = Timing::measure(|| run_ffmpeg(&args, opts.log_output));
    res?;
    tracing::info!(video = %out.display(), "video built ({timing})");
    Ok(out)
}

/// Convert an MP4 into a looping GIF using a generated palette.
#[tracing::instrument(skip(opts))]
pub fn video_to_gif(video: &Path, gif: &Path, opts: &GifOpts) -> AnimResult<PathBuf> {
    if opts.fps == 0 || opts.height == 0 {
        return Err(AnimError::config("gif fps and height must be non-zero"));
    }
    if !video.is_file() {
        return Err(AnimError::encode(format!(
            "input video '{}' does not exist",
            video.display()
        )));
    }
    ensure_parent_dir(gif)?;
    require_ffmpeg()?;

    let args = gif_args(video, gif, opts);
    let (res, timing) = Timing::measure(|| run_ffmpeg(&args, false));
    res?;
    tracing::info!(gif = %gif.display(), "gif built ({timing})");
    Ok(gif.to_path_buf())
}

/// Append `.mp4` unless the path already ends with it (`out.avi` -> `out.avi.mp4`).
pub fn normalize_video_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|e| e == "mp4") {
        return path.to_path_buf();
    }
    let mut s = path.as_os_str().to_owned();
    s.push(".mp4");
    PathBuf::from(s)
}

/// ffmpeg arguments for images -> MP4.
pub fn video_args(
    input_pattern: &Path,
    fps: Fps,
    out: &Path,
    opts: &VideoEncodeOpts,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    push_loglevel(&mut args, opts.log_output);
    args.extend(["-framerate".into(), fps.to_string().into(), "-i".into()]);
    args.push(input_pattern.as_os_str().to_owned());
    for a in [
        "-c:v",
        opts.vcodec.as_str(),
        "-crf",
        &opts.crf.to_string(),
        "-pix_fmt",
        opts.pix_fmt.as_str(),
    ] {
        args.push(a.into());
    }
    args.extend(opts.extra_args.iter().map(OsString::from));
    args.push(out.as_os_str().to_owned());
    args.push("-y".into());
    args
}

/// ffmpeg arguments for MP4 -> GIF (single pass palettegen/paletteuse).
pub fn gif_args(video: &Path, gif: &Path, opts: &GifOpts) -> Vec<OsString> {
    let filter = format!(
        "fps={},scale=-1:{}:flags=lanczos,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse",
        opts.fps, opts.height
    );
    let mut args: Vec<OsString> = Vec::new();
    push_loglevel(&mut args, false);
    args.push("-i".into());
    args.push(video.as_os_str().to_owned());
    args.extend(["-vf".into(), filter.into(), "-loop".into(), "0".into()]);
    args.push(gif.as_os_str().to_owned());
    args.push("-y".into());
    args
}

fn push_loglevel(args: &mut Vec<OsString>, verbose: bool) {
    let level = if verbose { "info" } else { "error" };
    args.extend(["-hide_banner".into(), "-loglevel".into(), level.into()]);
}

fn require_ffmpeg() -> AnimResult<()> {
    if is_ffmpeg_on_path() {
        Ok(())
    } else {
        let err =
            AnimError::encode("ffmpeg is required for video encoding, but was not found on PATH");
        tracing::error!("{err}");
        Err(err)
    }
}

fn run_ffmpeg(args: &[OsString], echo: bool) -> AnimResult<()> {
    tracing::info!(
        "ffmpeg {}",
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
    let output = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            let err = AnimError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ));
            tracing::error!("{err}");
            err
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if echo && !stderr.trim().is_empty() {
        tracing::info!("ffmpeg output:\n{}", stderr.trim_end());
    }
    if !output.status.success() {
        return Err(encode_failure(output.status, &stderr));
    }
    Ok(())
}

fn encode_failure(status: impl std::fmt::Display, stderr: &str) -> AnimError {
    let err = AnimError::encode(format!("ffmpeg exited with status {status}: {}", stderr.trim()));
    tracing::error!("{err}");
    err
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> AnimResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
