use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::options::{AnimateOpts, SaveOptions, VideoEncodeOpts};
use crate::foundation::core::Fps;
use crate::foundation::error::{AnimError, AnimResult};

/// JSON run description: the bindings an animation script exposes, plus run options.
///
/// Keys accept the script spelling as aliases (`FPS`, `OUTPUT_FOLDER`, `MAX_FRAMES`,
/// `SAVE_OPTIONS`).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    #[serde(alias = "FPS")]
    pub fps: Option<u32>,
    #[serde(alias = "OUTPUT_FOLDER")]
    pub output_folder: Option<PathBuf>,
    #[serde(alias = "MAX_FRAMES")]
    pub max_frames: Option<u64>,
    #[serde(alias = "SAVE_OPTIONS")]
    pub save_options: SaveOptions,
    pub force: bool,
    pub workers: usize,
    pub max_payload_bytes: Option<u64>,
    pub only_convert: bool,
    pub video: VideoEncodeOpts,
}

impl AnimationConfig {
    pub fn from_json_str(s: &str) -> AnimResult<Self> {
        serde_json::from_str(s).map_err(|e| AnimError::serde(e.to_string()))
    }

    pub fn from_path(path: &Path) -> AnimResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Resolve into a work folder and run options. Missing `fps` or `output_folder` is a
    /// [`AnimError::Config`].
    pub fn to_opts(&self) -> AnimResult<(PathBuf, AnimateOpts)> {
        let fps = self
            .fps
            .ok_or_else(|| AnimError::config("config is missing 'fps'"))?;
        let work_folder = self
            .output_folder
            .clone()
            .ok_or_else(|| AnimError::config("config is missing 'output_folder'"))?;

        let defaults = AnimateOpts::default();
        let opts = AnimateOpts {
            fps: Fps::integer(fps)?,
            max_frames: self.max_frames,
            force: self.force,
            workers: self.workers,
            max_payload_bytes: self
                .max_payload_bytes
                .unwrap_or(defaults.max_payload_bytes),
            only_convert: self.only_convert,
            save: self.save_options.clone(),
            video: self.video.clone(),
            ..defaults
        };
        opts.validate()?;
        Ok((work_folder, opts))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/file.rs"]
mod tests;
