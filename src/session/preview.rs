use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::options::SaveOptions;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{AnimError, AnimResult};
use crate::frame::source::FrameSource;
use crate::render::worker::RenderFn;

/// Placeholder replaced by the frame index in preview file names.
pub const INDEX_PLACEHOLDER: &str = "{i}";

/// Render a few chosen frames sequentially on the calling thread, without the pool or the cache.
///
/// `indices` defaults to `[0]` when empty. Each figure is saved to `template` with `{i}` replaced
/// by the frame index. Stops early if the source runs out; the saved paths are returned in index
/// order.
pub fn preview_frames(
    source: &FrameSource,
    render: &RenderFn,
    indices: &[u64],
    template: &str,
    save: &SaveOptions,
) -> AnimResult<Vec<PathBuf>> {
    save.validate()?;
    let mut wanted: BTreeSet<u64> = indices.iter().copied().collect();
    if wanted.is_empty() {
        wanted.insert(0);
    }
    tracing::info!("building only images: {wanted:?}");

    let mut saved = Vec::new();
    for (index, frame) in source.frames() {
        if !wanted.remove(&index.0) {
            continue;
        }
        tracing::info!("processing image i={index}");
        let mut fig = render(index, &frame).ok_or_else(|| {
            AnimError::render_contract(format!(
                "render callback returned no figure for frame {index}"
            ))
        })?;
        fig.validate()?;

        let path = preview_path(template, index);
        fig.save(&path, save)?;
        fig.clear();
        tracing::info!("figure i={index} saved in '{}'", path.display());
        saved.push(path);
        if wanted.is_empty() {
            break;
        }
    }
    if !wanted.is_empty() {
        tracing::warn!("frame source exhausted before images {wanted:?}");
    }
    Ok(saved)
}

fn preview_path(template: &str, index: FrameIndex) -> PathBuf {
    PathBuf::from(template.replace(INDEX_PLACEHOLDER, &index.0.to_string()))
}
