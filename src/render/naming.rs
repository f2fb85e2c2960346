use std::fmt;
use std::path::{Path, PathBuf};

use crate::foundation::core::{FrameBound, FrameIndex};

/// Zero-padding used when the number of frames is not known up front.
pub const UNBOUNDED_PADDING: usize = 7;

/// Digits needed for indices below `bound`: `ceil(log10(n))`, or [`UNBOUNDED_PADDING`].
pub fn padding_width(bound: FrameBound) -> usize {
    match bound {
        FrameBound::Limited(n) => {
            let mut width = 0usize;
            let mut reach = 1u64;
            while reach < n {
                width += 1;
                reach = reach.saturating_mul(10);
            }
            width
        }
        FrameBound::Unbounded => UNBOUNDED_PADDING,
    }
}

/// Deterministic, index-derived image file names: `<dir>/img_<zero-padded index>.<ext>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePattern {
    dir: PathBuf,
    width: usize,
    ext: String,
}

impl ImagePattern {
    pub fn new(dir: impl Into<PathBuf>, bound: FrameBound, ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            width: padding_width(bound),
            ext: ext.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn file_name(&self, idx: FrameIndex) -> String {
        format!("img_{:0width$}.{}", idx.0, self.ext, width = self.width)
    }

    pub fn path_for(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(self.file_name(idx))
    }

    /// printf-style pattern understood by ffmpeg's image2 demuxer.
    pub fn ffmpeg_pattern(&self) -> PathBuf {
        let digits = if self.width == 0 {
            "%d".to_owned()
        } else {
            format!("%0{}d", self.width)
        };
        self.dir.join(format!("img_{digits}.{}", self.ext))
    }
}

impl fmt::Display for ImagePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ffmpeg_pattern().display())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/naming.rs"]
mod tests;
