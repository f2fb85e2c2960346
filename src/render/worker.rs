use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::codec::payload::{self, Payload};
use crate::config::options::SaveOptions;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{AnimError, AnimResult};
use crate::foundation::timing::Timing;
use crate::frame::model::Frame;
use crate::render::figure::Figure;
use crate::render::naming::ImagePattern;
use crate::stats::record::StatsRecord;

/// User render callback: builds the figure for frame `index`.
///
/// Returning `None` breaks the contract and fails that frame's job.
pub type RenderFn = dyn Fn(FrameIndex, &Frame) -> Option<Figure> + Send + Sync;

/// Steps a job goes through inside a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStage {
    Received,
    CacheHit,
    Decoding,
    Rendering,
    Validating,
    Saving,
    Cleanup,
    Done,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::CacheHit => "cache-hit",
            Self::Decoding => "decoding",
            Self::Rendering => "rendering",
            Self::Validating => "validating",
            Self::Saving => "saving",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Result of one job: whatever stats were gathered, plus the error that stopped it.
#[derive(Debug)]
pub struct JobOutcome {
    pub index: FrameIndex,
    pub stats: StatsRecord,
    /// Last stage reached (`Done`, `CacheHit`, or the stage that failed).
    pub stage: JobStage,
    pub error: Option<AnimError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Unit of remote execution: decode -> render -> validate -> save -> cleanup.
///
/// Cheap to clone; every job gets its own clone.
#[derive(Clone)]
pub struct RenderWorker {
    render: Arc<RenderFn>,
    pattern: Arc<ImagePattern>,
    save: Arc<SaveOptions>,
    skip_existing: bool,
}

impl fmt::Debug for RenderWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderWorker")
            .field("pattern", &self.pattern)
            .field("save", &self.save)
            .field("skip_existing", &self.skip_existing)
            .finish_non_exhaustive()
    }
}

impl RenderWorker {
    pub fn new(
        render: Arc<RenderFn>,
        pattern: ImagePattern,
        save: SaveOptions,
        skip_existing: bool,
    ) -> Self {
        Self {
            render,
            pattern: Arc::new(pattern),
            save: Arc::new(save),
            skip_existing,
        }
    }

    pub fn pattern(&self) -> &ImagePattern {
        &self.pattern
    }

    /// Run one job to completion. Never panics on callback failure; errors land on the outcome.
    pub fn run(&self, index: FrameIndex, payload: Payload) -> JobOutcome {
        let image_path = self.pattern.path_for(index);
        let mut stats = StatsRecord::named(image_path.display().to_string());

        if self.skip_existing && image_path.exists() {
            return JobOutcome {
                index,
                stats,
                stage: JobStage::CacheHit,
                error: None,
            };
        }

        let mut stage = JobStage::Received;
        let res = self.render_and_save(index, payload, &image_path, &mut stats, &mut stage);
        match res {
            Ok(()) => JobOutcome {
                index,
                stats,
                stage: JobStage::Done,
                error: None,
            },
            Err(error) => {
                tracing::debug!(frame = index.0, %stage, "job failed: {error}");
                JobOutcome {
                    index,
                    stats,
                    stage,
                    error: Some(error),
                }
            }
        }
    }

    fn render_and_save(
        &self,
        index: FrameIndex,
        payload: Payload,
        image_path: &std::path::Path,
        stats: &mut StatsRecord,
        stage: &mut JobStage,
    ) -> AnimResult<()> {
        *stage = JobStage::Decoding;
        let (frame, decode_stats) = payload::decode(payload)
            .map_err(|e| AnimError::worker(format!("failed to decode frame {index}: {e}")))?;
        stats.absorb(&decode_stats);

        *stage = JobStage::Rendering;
        let (fig, timing) = Timing::measure(|| {
            catch_unwind(AssertUnwindSafe(|| (self.render)(index, &frame)))
        });
        stats.render_time = Some(timing.as_duration());
        let fig = fig.map_err(|p| {
            AnimError::worker(format!(
                "render callback panicked on frame {index}: {}",
                panic_message(p.as_ref())
            ))
        })?;

        *stage = JobStage::Validating;
        let Some(mut fig) = fig else {
            return Err(AnimError::render_contract(format!(
                "render callback returned no figure for frame {index}"
            )));
        };
        fig.validate()?;

        *stage = JobStage::Saving;
        let (saved, timing) = Timing::measure(|| fig.save(image_path, &self.save));
        if let Err(e) = saved {
            tracing::error!(path = %image_path.display(), "problem when saving image");
            return Err(e);
        }
        stats.save_time = Some(timing.as_duration());

        *stage = JobStage::Cleanup;
        cleanup(&mut fig, index);
        Ok(())
    }
}

// Best effort: a failing teardown never fails the job.
fn cleanup(fig: &mut Figure, index: FrameIndex) {
    if let Err(p) = catch_unwind(AssertUnwindSafe(|| fig.clear())) {
        tracing::warn!(
            frame = index.0,
            "figure cleanup failed: {}",
            panic_message(p.as_ref())
        );
    }
}

pub(crate) fn panic_message(p: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = p.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = p.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/worker.rs"]
mod tests;
