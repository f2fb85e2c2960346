use std::path::PathBuf;

use crate::codec::payload::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::foundation::core::Fps;
use crate::foundation::error::{AnimError, AnimResult};

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Raster format of the saved images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
        }
    }

    pub fn supports_alpha(self) -> bool {
        matches!(self, Self::Png)
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Options forwarded to [`Figure::save`](crate::Figure::save).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaveOptions {
    pub format: ImageFormat,
    /// Keep the figure background transparent (PNG only).
    pub transparent: bool,
    /// Output resolution. `None` keeps the figure's own dpi.
    pub dpi: Option<f64>,
    /// Color the figure is flattened over when not transparent.
    pub background: Rgba8,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            transparent: false,
            dpi: None,
            background: Rgba8::WHITE,
        }
    }
}

impl SaveOptions {
    pub fn validate(&self) -> AnimResult<()> {
        if let Some(dpi) = self.dpi
            && !(dpi.is_finite() && dpi > 0.0)
        {
            return Err(AnimError::config("save dpi must be a positive number"));
        }
        if self.transparent && !self.format.supports_alpha() {
            return Err(AnimError::config(format!(
                "transparent output is not supported for {:?}",
                self.format
            )));
        }
        Ok(())
    }
}

/// ffmpeg settings for turning the image sequence into a video.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoEncodeOpts {
    /// Constant rate factor (0 = lossless, 51 = worst).
    pub crf: u8,
    pub vcodec: String,
    /// `yuv420p` keeps the output playable in browsers.
    pub pix_fmt: String,
    /// Let ffmpeg print its own log instead of running quiet.
    pub log_output: bool,
    /// Extra arguments appended before the output path, passed verbatim.
    pub extra_args: Vec<String>,
}

impl Default for VideoEncodeOpts {
    fn default() -> Self {
        Self {
            crf: 24,
            vcodec: "libx264".to_owned(),
            pix_fmt: "yuv420p".to_owned(),
            log_output: false,
            extra_args: Vec::new(),
        }
    }
}

impl VideoEncodeOpts {
    pub fn validate(&self) -> AnimResult<()> {
        if self.crf > 51 {
            return Err(AnimError::config("crf must be within 0..=51"));
        }
        if self.vcodec.trim().is_empty() {
            return Err(AnimError::config("vcodec must not be empty"));
        }
        Ok(())
    }
}

/// Settings for video -> GIF conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GifOpts {
    pub fps: u32,
    /// Output height in pixels; width follows the aspect ratio.
    pub height: u32,
}

impl Default for GifOpts {
    fn default() -> Self {
        Self { fps: 10, height: 350 }
    }
}

/// Options for one [`animate`](crate::animate) run.
#[derive(Clone, Debug)]
pub struct AnimateOpts {
    pub fps: Fps,
    /// `None` (or `Some(0)`) lets the compute function decide when to stop.
    pub max_frames: Option<u64>,
    /// Delete every existing image and render all frames again.
    pub force: bool,
    /// Worker count for a pool created by the run. `0` means "available parallelism - 1".
    pub workers: usize,
    /// Frames above this size are compressed before being handed to a worker.
    pub max_payload_bytes: u64,
    /// Skip image building and only encode the images already on disk.
    pub only_convert: bool,
    pub save: SaveOptions,
    pub video: VideoEncodeOpts,
    /// Video file name inside the work folder.
    pub video_name: PathBuf,
}

impl Default for AnimateOpts {
    fn default() -> Self {
        Self {
            fps: Fps { num: 24, den: 1 },
            max_frames: None,
            force: false,
            workers: 0,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            only_convert: false,
            save: SaveOptions::default(),
            video: VideoEncodeOpts::default(),
            video_name: PathBuf::from("video.mp4"),
        }
    }
}

impl AnimateOpts {
    pub fn validate(&self) -> AnimResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        self.save.validate()?;
        self.video.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/options.rs"]
mod tests;
