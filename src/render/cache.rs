use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{AnimError, AnimResult};

/// Skip-if-exists decision point for rendered images.
///
/// With `force`, nothing is skipped and the image directory is wiped once per run before the first
/// frame.
#[derive(Debug)]
pub struct CacheGate {
    force: bool,
    cleaned: bool,
}

impl CacheGate {
    pub fn new(force: bool) -> Self {
        Self {
            force,
            cleaned: false,
        }
    }

    pub fn force(&self) -> bool {
        self.force
    }

    /// Make sure `image_dir` exists. With `force`, delete and recreate it (first call only).
    pub fn prepare(&mut self, image_dir: &Path) -> AnimResult<()> {
        if self.force && !self.cleaned {
            if image_dir.parent().is_none() || image_dir.as_os_str().is_empty() {
                return Err(AnimError::config(format!(
                    "refusing to wipe image directory '{}'",
                    image_dir.display()
                )));
            }
            tracing::warn!(dir = %image_dir.display(), "force: deleting all existing images");
            if image_dir.exists() {
                std::fs::remove_dir_all(image_dir).with_context(|| {
                    format!("failed to delete image directory '{}'", image_dir.display())
                })?;
            }
            self.cleaned = true;
        }
        std::fs::create_dir_all(image_dir).with_context(|| {
            format!("failed to create image directory '{}'", image_dir.display())
        })?;
        Ok(())
    }

    /// `true` when rendering `image_path` can be skipped.
    pub fn should_skip(&self, image_path: &Path) -> bool {
        !self.force && image_path.exists()
    }
}
