use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::codec::payload;
use crate::config::options::AnimateOpts;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{AnimError, AnimResult};
use crate::foundation::timing::Timing;
use crate::frame::source::FrameSource;
use crate::pool::lease::{PoolLease, PoolSource};
use crate::pool::worker_pool::{JobBatch, as_completed};
use crate::render::cache::CacheGate;
use crate::render::naming::ImagePattern;
use crate::render::worker::{JobOutcome, JobStage, RenderFn, RenderWorker};
use crate::stats::record::StatsRecord;
use crate::stats::report::StatsReport;
use crate::stats::storage::StatsStorage;

/// Frame counts for one build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunTallies {
    /// Frames pulled from the source.
    pub frames: u64,
    /// Frames whose image already existed.
    pub skipped: u64,
    /// Jobs handed to the pool.
    pub submitted: u64,
    pub succeeded: u64,
    /// Frames that never produced an image (job errors and payload encoding errors).
    pub failed: u64,
}

impl fmt::Display for RunTallies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames={} skipped={} submitted={} succeeded={} failed={}",
            self.frames, self.skipped, self.submitted, self.succeeded, self.failed
        )
    }
}

/// A frame that did not produce an image.
#[derive(Debug)]
pub struct JobFailure {
    pub index: FrameIndex,
    pub image_name: String,
    /// Stage the job was in when it failed.
    pub stage: JobStage,
    pub error: AnimError,
}

/// What a build hands back: where the images are, and how it went.
#[derive(Debug)]
pub struct BuildReport {
    pub image_pattern: ImagePattern,
    pub stats: StatsReport,
    /// Per-image merged records, keyed by image name.
    pub records: StatsStorage,
    pub tallies: RunTallies,
    pub failures: Vec<JobFailure>,
}

impl BuildReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives one image build: produce frames, skip cached ones, ship the rest to the pool, harvest.
///
/// Production and submission run sequentially on the calling thread in frame order. Results are
/// harvested in completion order only after every frame has been submitted. Submission never
/// blocks, so queued payloads accumulate in memory when frames are produced faster than rendered.
/// There is no cancellation: a run ends when the source is done and every job has resolved.
pub struct RenderController<'a> {
    source: FrameSource,
    worker: RenderWorker,
    gate: CacheGate,
    max_payload_bytes: u64,
    lease: PoolLease<'a>,
}

impl fmt::Debug for RenderController<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderController")
            .field("source", &self.source)
            .field("worker", &self.worker)
            .field("gate", &self.gate)
            .field("max_payload_bytes", &self.max_payload_bytes)
            .field("owns_pool", &self.lease.is_owned())
            .finish()
    }
}

impl<'a> RenderController<'a> {
    /// Set up a build writing into `image_dir`.
    ///
    /// Pool ownership is settled here: `Auto` and `Factory` pools belong to the controller and are
    /// shut down when the run ends, a `Shared` pool is left running.
    pub fn new(
        image_dir: impl Into<PathBuf>,
        source: FrameSource,
        render: Arc<RenderFn>,
        opts: &AnimateOpts,
        pool: PoolSource<'a>,
    ) -> AnimResult<Self> {
        opts.validate()?;
        let pattern = ImagePattern::new(image_dir, source.bound(), opts.save.format.extension());
        tracing::info!(pattern = %pattern, "images will be saved under this pattern");

        let lease = pool.acquire()?;
        tracing::info!(
            workers = lease.get().workers(),
            owned = lease.is_owned(),
            "worker pool ready"
        );

        Ok(Self {
            source,
            worker: RenderWorker::new(render, pattern, opts.save.clone(), !opts.force),
            gate: CacheGate::new(opts.force),
            max_payload_bytes: opts.max_payload_bytes,
            lease,
        })
    }

    pub fn pattern(&self) -> &ImagePattern {
        self.worker.pattern()
    }

    /// Run the build to completion. Job-level failures are reported, not returned.
    #[tracing::instrument(skip_all, fields(pattern = %self.worker.pattern()))]
    pub fn run(self) -> AnimResult<BuildReport> {
        let Self {
            source,
            worker,
            mut gate,
            max_payload_bytes,
            lease,
        } = self;

        let res = build(&source, &worker, &mut gate, max_payload_bytes, &lease);
        lease.release();
        res
    }
}

fn build(
    source: &FrameSource,
    worker: &RenderWorker,
    gate: &mut CacheGate,
    max_payload_bytes: u64,
    lease: &PoolLease<'_>,
) -> AnimResult<BuildReport> {
    let pattern = worker.pattern().clone();
    gate.prepare(pattern.dir())?;

    let pool = lease.get();
    let bound = source.bound();
    let mut storage = StatsStorage::new();
    let mut tallies = RunTallies::default();
    let mut failures = Vec::new();
    let mut batch: JobBatch<JobOutcome> = JobBatch::new();

    let mut frames = source.frames();
    loop {
        let (next, compute) = Timing::measure(|| frames.next());
        let Some((index, frame)) = next else {
            break;
        };
        tallies.frames += 1;
        let image_name = pattern.path_for(index).display().to_string();

        if gate.should_skip(&pattern.path_for(index)) {
            tracing::debug!("img {:03}/{bound} already exists", index.0 + 1);
            storage.record(StatsRecord::named(image_name));
            tallies.skipped += 1;
            continue;
        }

        let (payload, mut stat) = match payload::encode(frame, max_payload_bytes) {
            Ok(v) => v,
            Err(error) => {
                tracing::error!(frame = index.0, "failed to encode frame payload: {error}");
                failures.push(JobFailure {
                    index,
                    image_name,
                    stage: JobStage::Received,
                    error,
                });
                tallies.failed += 1;
                continue;
            }
        };
        stat.image_name = Some(image_name.clone());
        stat.compute_time = Some(compute.as_duration());
        tracing::debug!("img {:03}/{bound} : {stat}", index.0 + 1);
        storage.record(stat);

        let job_worker = worker.clone();
        batch.submit(pool, index, move || job_worker.run(index, payload));
        tallies.submitted += 1;
    }

    if tallies.skipped > 0 {
        tracing::info!("{} images already computed", tallies.skipped);
    }
    tracing::info!("{} images to be computed..", tallies.submitted);

    let total = batch.len();
    let ((), harvest) = Timing::measure(|| {
        for (n, (index, res)) in as_completed(batch).enumerate() {
            let outcome = res.unwrap_or_else(|error| JobOutcome {
                index,
                stats: StatsRecord::named(pattern.path_for(index).display().to_string()),
                stage: JobStage::Received,
                error: Some(error),
            });
            let image_name = outcome.stats.image_name.clone().unwrap_or_default();
            tracing::debug!("fig {:03}/{total} done : {}", n + 1, outcome.stats);
            storage.record(outcome.stats);

            match outcome.error {
                None => tallies.succeeded += 1,
                Some(error) => {
                    tracing::error!(
                        frame = index.0,
                        stage = %outcome.stage,
                        "job [{:03}/{total}] failed: {error}",
                        n + 1
                    );
                    tallies.failed += 1;
                    failures.push(JobFailure {
                        index: outcome.index,
                        image_name,
                        stage: outcome.stage,
                        error,
                    });
                }
            }
        }
    });
    tracing::info!("{} images computed ({harvest})", tallies.submitted);

    failures.sort_by_key(|f| f.index);
    Ok(BuildReport {
        image_pattern: pattern,
        stats: storage.report(),
        records: storage,
        tallies,
        failures,
    })
}

/// Build every image of `source` into `image_dir`. Shorthand for [`RenderController`].
pub fn build_images(
    image_dir: impl Into<PathBuf>,
    source: FrameSource,
    render: Arc<RenderFn>,
    opts: &AnimateOpts,
    pool: PoolSource<'_>,
) -> AnimResult<BuildReport> {
    RenderController::new(image_dir, source, render, opts, pool)?.run()
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
