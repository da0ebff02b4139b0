use std::path::{Path, PathBuf};

use crate::foundation::core::FrameSpan;
use crate::foundation::error::{ReelError, ReelResult};

/// Largest number of frames a single host invocation may render.
pub const MAX_CHUNK_FRAMES: u64 = 200;

/// Largest number of chunks one range may be split into.
pub const MAX_PLANNED_CHUNKS: u64 = 100_000;

/// A bounded frame range rendered by one host process into its own output directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RenderChunk {
    /// Frames to render (inclusive).
    pub span: FrameSpan,
    /// Output directory relative to the render category root.
    pub output_subdir: PathBuf,
}

impl RenderChunk {
    /// Number of frames in the chunk.
    pub fn len_frames(&self) -> u64 {
        self.span.len_frames()
    }
}

/// Split `[start, end]` into chunks of at most [`MAX_CHUNK_FRAMES`] frames.
///
/// A range that fits is returned as one chunk writing to `output_subdir`. Larger ranges are split
/// into consecutive sub-ranges, each written to `output_subdir/<sub-range start>`, and every
/// sub-range is planned again. The chunks cover the range exactly once, in frame order.
///
/// Ranges needing more than [`MAX_PLANNED_CHUNKS`] chunks are rejected before anything is
/// allocated.
pub fn plan_chunks(start: u64, end: u64, output_subdir: &Path) -> ReelResult<Vec<RenderChunk>> {
    let span = FrameSpan::new(start, end)?;
    ensure_plannable(span)?;
    let mut out = Vec::new();
    subdivide(span, output_subdir, &mut out);
    Ok(out)
}

/// Fail with [`ReelError::Validation`] when `span` needs more than [`MAX_PLANNED_CHUNKS`] chunks.
pub(crate) fn ensure_plannable(span: FrameSpan) -> ReelResult<()> {
    let chunks = span.len_frames().div_ceil(MAX_CHUNK_FRAMES);
    if chunks > MAX_PLANNED_CHUNKS {
        return Err(ReelError::validation(format!(
            "frames {span} need {chunks} render chunks, more than the limit of {MAX_PLANNED_CHUNKS}"
        )));
    }
    Ok(())
}

fn subdivide(span: FrameSpan, output_subdir: &Path, out: &mut Vec<RenderChunk>) {
    if span.len_frames() <= MAX_CHUNK_FRAMES {
        out.push(RenderChunk {
            span,
            output_subdir: output_subdir.to_path_buf(),
        });
        return;
    }
    for sub in split_span(span) {
        subdivide(sub, &output_subdir.join(sub.start.to_string()), out);
    }
}

/// Consecutive sub-spans of at most [`MAX_CHUNK_FRAMES`] frames covering `span`.
pub(crate) fn split_span(span: FrameSpan) -> Vec<FrameSpan> {
    let mut out = Vec::new();
    let mut s = span.start;
    loop {
        let e = s.saturating_add(MAX_CHUNK_FRAMES - 1).min(span.end);
        out.push(FrameSpan { start: s, end: e });
        if e == span.end {
            break;
        }
        s = e + 1;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/chunk.rs"]
mod tests;
