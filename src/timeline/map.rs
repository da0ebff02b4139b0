use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::foundation::core::{FrameIndex, FrameSpan};
use crate::foundation::error::{ReelError, ReelResult};

/// Built-in segment table for the full sequence, in timeline order.
///
/// This is a load-time constant; runtime code never mutates a [`TimelineMap`].
pub const DEFAULT_SEGMENTS: &[(&str, u64, u64)] = &[
    ("cold_open", 1, 480),
    ("title_card", 481, 720),
    ("arrival", 721, 1800),
    ("market_walk", 1801, 3000),
    ("first_meeting", 3001, 4200),
    ("storm_gathers", 4201, 5400),
    ("shelter", 5401, 6600),
    ("night_talk", 6601, 7800),
    ("dawn", 7801, 9000),
    ("departure", 9001, 10200),
    ("long_road", 10201, 11700),
    ("return", 11701, 13200),
    ("finale", 13201, 14400),
    ("credits", 14401, 15000),
];

/// A named, contiguous frame range of the overall build.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Stable segment key referenced by segment modules.
    pub name: String,
    /// First frame (inclusive).
    pub start: u64,
    /// Last frame (inclusive).
    pub end: u64,
}

impl Segment {
    /// Create a segment entry without validating it.
    pub fn new(name: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Frame span covered by this segment.
    pub fn span(&self) -> FrameSpan {
        FrameSpan {
            start: self.start,
            end: self.end,
        }
    }
}

/// One contiguity violation found in a segment table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineIssue {
    /// A segment whose `start > end`.
    Inverted {
        /// Segment name.
        name: String,
        /// The segment's start frame.
        frame: u64,
    },
    /// Frames between two consecutive segments that no segment covers.
    Gap {
        /// Segment ending before the gap.
        after: String,
        /// Segment starting after the gap.
        before: String,
        /// Uncovered frames.
        missing: FrameSpan,
    },
    /// Two consecutive segments that share frames.
    Overlap {
        /// Earlier segment.
        first: String,
        /// Later segment.
        second: String,
        /// First shared frame.
        frame: u64,
    },
    /// A segment name used more than once.
    DuplicateName {
        /// Repeated name.
        name: String,
        /// Start frame of the repeated entry.
        frame: u64,
    },
}

impl TimelineIssue {
    /// First frame where the invariant is broken.
    pub fn frame(&self) -> u64 {
        match self {
            Self::Inverted { frame, .. }
            | Self::Overlap { frame, .. }
            | Self::DuplicateName { frame, .. } => *frame,
            Self::Gap { missing, .. } => missing.start,
        }
    }

    fn into_error(self) -> ReelError {
        let frame = self.frame();
        ReelError::timeline(self.to_string(), frame)
    }
}

impl fmt::Display for TimelineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inverted { name, .. } => write!(f, "segment '{name}' has start > end"),
            Self::Gap {
                after,
                before,
                missing,
            } => write!(
                f,
                "gap of {} frame(s) between '{after}' and '{before}'",
                missing.len_frames()
            ),
            Self::Overlap { first, second, .. } => {
                write!(f, "segments '{first}' and '{second}' overlap")
            }
            Self::DuplicateName { name, .. } => write!(f, "segment '{name}' is defined twice"),
        }
    }
}

/// Static table of named timeline segments, sorted by start frame.
///
/// Construction enforces the contiguity invariant: consecutive segments satisfy
/// `end[i] + 1 == start[i + 1]`, every segment has `start <= end`, and names are unique.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineMap {
    segments: Vec<Segment>,
}

impl TimelineMap {
    /// Build a validated map, failing on the first contiguity issue.
    pub fn new(mut segments: Vec<Segment>) -> ReelResult<Self> {
        if segments.is_empty() {
            return Err(ReelError::validation("timeline must contain at least one segment"));
        }
        segments.sort_by_key(|s| (s.start, s.end));
        if let Some(issue) = check_contiguity(&segments).into_iter().next() {
            return Err(issue.into_error());
        }
        Ok(Self { segments })
    }

    /// The built-in table ([`DEFAULT_SEGMENTS`]).
    pub fn builtin() -> ReelResult<Self> {
        Self::new(
            DEFAULT_SEGMENTS
                .iter()
                .map(|&(name, start, end)| Segment::new(name, start, end))
                .collect(),
        )
    }

    /// Load a JSON array of `{"name", "start", "end"}` objects from `path`.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Load a JSON segment table from `reader`.
    pub fn from_reader(reader: impl Read) -> ReelResult<Self> {
        let segments: Vec<Segment> = serde_json::from_reader(reader)
            .map_err(|e| ReelError::serde(format!("timeline JSON: {e}")))?;
        Self::new(segments)
    }

    /// Segments in timeline order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment names in timeline order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.name.as_str())
    }

    /// Return `true` when `name` is a known segment key.
    pub fn contains(&self, name: &str) -> bool {
        self.segments.iter().any(|s| s.name == name)
    }

    /// Frame span of the segment called `name`.
    pub fn lookup(&self, name: &str) -> ReelResult<FrameSpan> {
        self.segments
            .iter()
            .find(|s| s.name == name)
            .map(Segment::span)
            .ok_or_else(|| ReelError::UnknownSegment(name.to_string()))
    }

    /// The segment covering `frame`, if any.
    pub fn segment_at(&self, frame: FrameIndex) -> Option<&Segment> {
        let idx = self.segments.partition_point(|s| s.end < frame.0);
        self.segments
            .get(idx)
            .filter(|s| s.span().contains(frame))
    }

    /// Span from the first segment's start to the last segment's end.
    pub fn total_span(&self) -> FrameSpan {
        // `new` rejects empty tables.
        let first = self.segments.first().map_or(0, |s| s.start);
        let last = self.segments.last().map_or(0, |s| s.end);
        FrameSpan {
            start: first,
            end: last,
        }
    }
}

/// Report every contiguity issue in `segments` (sorted by start frame before checking).
pub fn check_contiguity(segments: &[Segment]) -> Vec<TimelineIssue> {
    let mut sorted: Vec<&Segment> = segments.iter().collect();
    sorted.sort_by_key(|s| (s.start, s.end));

    let mut issues = Vec::new();
    let mut seen = std::collections::BTreeSet::new();
    for s in &sorted {
        if !seen.insert(s.name.as_str()) {
            issues.push(TimelineIssue::DuplicateName {
                name: s.name.clone(),
                frame: s.start,
            });
        }
        if s.start > s.end {
            issues.push(TimelineIssue::Inverted {
                name: s.name.clone(),
                frame: s.start,
            });
        }
    }

    for w in sorted.windows(2) {
        let (a, b) = (w[0], w[1]);
        let expected = a.end.saturating_add(1);
        if b.start > expected {
            issues.push(TimelineIssue::Gap {
                after: a.name.clone(),
                before: b.name.clone(),
                missing: FrameSpan {
                    start: expected,
                    end: b.start - 1,
                },
            });
        } else if b.start < expected {
            issues.push(TimelineIssue::Overlap {
                first: a.name.clone(),
                second: b.name.clone(),
                frame: b.start,
            });
        }
    }

    issues.sort_by_key(TimelineIssue::frame);
    issues
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/map.rs"]
mod tests;
