use std::path::Path;

use rayon::prelude::*;

use crate::foundation::core::FrameSpan;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::chunk::{
    MAX_CHUNK_FRAMES, RenderChunk, ensure_plannable, plan_chunks, split_span,
};

/// Renders one bounded chunk, blocking until it is done.
///
/// [`HostProcessRunner`](crate::HostProcessRunner) is the production implementation; tests plug
/// in runners that record or fail chunks without spawning anything.
pub trait ChunkRunner: Sync {
    /// Render `chunk`. Called with chunks of at most [`MAX_CHUNK_FRAMES`] frames.
    fn run_chunk(&self, chunk: &RenderChunk) -> ReelResult<()>;
}

impl<R: ChunkRunner + ?Sized> ChunkRunner for &R {
    fn run_chunk(&self, chunk: &RenderChunk) -> ReelResult<()> {
        (**self).run_chunk(chunk)
    }
}

/// Worker pool settings for chunk dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderThreading {
    /// Dispatch leaf chunks on a worker pool instead of one after another.
    pub parallel: bool,
    /// Pool size; `None` uses the available CPU concurrency.
    pub threads: Option<usize>,
}

/// Result of rendering one chunk.
#[derive(Debug)]
pub struct ChunkOutcome {
    /// The chunk.
    pub chunk: RenderChunk,
    /// `Ok` when the host exited successfully.
    pub result: ReelResult<()>,
}

impl ChunkOutcome {
    /// `true` when the chunk rendered.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate of every chunk dispatched by one [`RenderScheduler::render_range`] call, in frame
/// order.
///
/// Sequential runs stop at the first failure, so the failing chunk is the last outcome. Parallel
/// runs attempt every chunk; failures do not cancel siblings.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Outcomes in frame order.
    pub outcomes: Vec<ChunkOutcome>,
}

impl RenderReport {
    /// Chunks that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ChunkOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// `true` when every dispatched chunk rendered.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Frames covered by chunks that rendered.
    pub fn frames_rendered(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| o.is_ok())
            .map(|o| o.chunk.len_frames())
            .sum()
    }

    /// Fail if any chunk failed.
    ///
    /// A single failure is returned as-is; several are folded into one error naming every failing
    /// range.
    pub fn into_result(self) -> ReelResult<()> {
        let mut failed: Vec<(FrameSpan, ReelError)> = self
            .outcomes
            .into_iter()
            .filter_map(|o| o.result.err().map(|e| (o.chunk.span, e)))
            .collect();
        match failed.len() {
            0 => Ok(()),
            1 => Err(failed.remove(0).1),
            n => {
                let ranges: Vec<String> = failed.iter().map(|(s, _)| s.to_string()).collect();
                let details: Vec<String> = failed.iter().map(|(_, e)| e.to_string()).collect();
                Err(anyhow::anyhow!(
                    "{n} render chunks failed ({}):\n{}",
                    ranges.join(", "),
                    details.join("\n")
                )
                .into())
            }
        }
    }
}

/// Splits frame ranges into bounded chunks and hands each one to a [`ChunkRunner`].
pub struct RenderScheduler<R> {
    runner: R,
    threading: RenderThreading,
}

impl<R: ChunkRunner> RenderScheduler<R> {
    /// Sequential scheduler around `runner`.
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            threading: RenderThreading::default(),
        }
    }

    /// Override the threading settings.
    pub fn with_threading(mut self, threading: RenderThreading) -> Self {
        self.threading = threading;
        self
    }

    /// The wrapped runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Render `[start, end]` into `output_subdir`.
    ///
    /// Returns `Err` only when the request itself is invalid or the worker pool cannot be built;
    /// chunk failures are in the report. Call [`RenderReport::into_result`] to turn them into an
    /// error.
    #[tracing::instrument(skip(self, output_subdir), fields(subdir = %output_subdir.display()))]
    pub fn render_range(
        &self,
        start: u64,
        end: u64,
        output_subdir: &Path,
    ) -> ReelResult<RenderReport> {
        let span = FrameSpan::new(start, end)?;
        ensure_plannable(span)?;
        let mut report = RenderReport::default();
        if self.threading.parallel {
            self.render_parallel(span, output_subdir, &mut report)?;
        } else {
            self.render_sequential(span, output_subdir, &mut report);
        }
        let failed = report.failures().count();
        if failed == 0 {
            tracing::info!(chunks = report.outcomes.len(), "render range finished");
        } else {
            tracing::warn!(chunks = report.outcomes.len(), failed, "render range failed");
        }
        Ok(report)
    }

    /// Recurse over sub-ranges, stopping at the first failed chunk. Returns `false` on failure.
    fn render_sequential(
        &self,
        span: FrameSpan,
        output_subdir: &Path,
        report: &mut RenderReport,
    ) -> bool {
        if span.len_frames() > MAX_CHUNK_FRAMES {
            return split_span(span).into_iter().all(|sub| {
                self.render_sequential(sub, &output_subdir.join(sub.start.to_string()), report)
            });
        }
        let outcome = self.run_one(RenderChunk {
            span,
            output_subdir: output_subdir.to_path_buf(),
        });
        let ok = outcome.is_ok();
        report.outcomes.push(outcome);
        ok
    }

    fn render_parallel(
        &self,
        span: FrameSpan,
        output_subdir: &Path,
        report: &mut RenderReport,
    ) -> ReelResult<()> {
        let chunks = plan_chunks(span.start, span.end, output_subdir)?;
        let pool = build_thread_pool(self.threading.threads)?;
        tracing::debug!(
            chunks = chunks.len(),
            threads = pool.current_num_threads(),
            "dispatching chunks on worker pool"
        );
        let outcomes = pool.install(|| {
            chunks
                .into_par_iter()
                .map(|chunk| self.run_one(chunk))
                .collect::<Vec<_>>()
        });
        report.outcomes = outcomes;
        Ok(())
    }

    fn run_one(&self, chunk: RenderChunk) -> ChunkOutcome {
        tracing::debug!(span = %chunk.span, subdir = %chunk.output_subdir.display(), "rendering chunk");
        let result = self.runner.run_chunk(&chunk);
        if let Err(e) = &result {
            tracing::error!(span = %chunk.span, error = %e, "chunk failed");
        }
        ChunkOutcome { chunk, result }
    }
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

#[cfg(test)]
#[path = "../../tests/unit/render/scheduler.rs"]
mod tests;
