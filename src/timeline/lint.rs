//! Static linter for segment-module sources.
//!
//! The linter never runs as part of a build. It walks source files, collects string literals
//! passed to timeline accessors (`segment("..")`, `lookup("..")`, `span_of("..")`) and flags keys
//! missing from the timeline table, plus any literal naming a prohibited legacy actor.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};
use crate::timeline::map::{Segment, TimelineIssue, check_contiguity};

const KEY_ACCESSORS: &[&str] = &["segment(", "lookup(", "span_of("];

/// Linter settings.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// File extensions (without dot) to scan.
    pub extensions: Vec<String>,
    /// Actor names that must no longer appear in sources.
    pub legacy_actor_names: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["rs".to_string(), "py".to_string(), "json".to_string()],
            legacy_actor_names: Vec::new(),
        }
    }
}

/// What a single violation is about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// A timeline key that the segment table does not define.
    UnknownSegmentKey(String),
    /// A reference to a prohibited legacy actor name.
    LegacyActorName(String),
}

/// One violation with its source location (1-based line).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LintViolation {
    /// File the violation was found in.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// Violation kind.
    pub kind: ViolationKind,
}

impl fmt::Display for LintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = format!("{}:{}", self.file.display(), self.line);
        match &self.kind {
            ViolationKind::UnknownSegmentKey(k) => write!(f, "{loc}: unknown timeline key '{k}'"),
            ViolationKind::LegacyActorName(n) => write!(f, "{loc}: legacy actor name '{n}'"),
        }
    }
}

/// Aggregate result of a lint pass.
#[derive(Clone, Debug, Default)]
pub struct LintReport {
    /// Number of source files scanned.
    pub files_checked: usize,
    /// Contiguity problems in the segment table itself.
    pub timeline_issues: Vec<TimelineIssue>,
    /// Source-level violations, in file then line order.
    pub violations: Vec<LintViolation>,
}

impl LintReport {
    /// Total number of problems.
    pub fn problem_count(&self) -> usize {
        self.timeline_issues.len() + self.violations.len()
    }

    /// Return `true` when nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.problem_count() == 0
    }

    /// Fail with [`ReelError::Lint`] when anything was flagged.
    pub fn into_result(self) -> ReelResult<Self> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(ReelError::Lint(self.problem_count()))
        }
    }
}

/// Lint the segment table and every matching file under `roots`.
///
/// A root may be a single file or a directory (walked recursively, in sorted order).
#[tracing::instrument(skip(segments, config))]
pub fn lint_paths(
    roots: &[PathBuf],
    segments: &[Segment],
    config: &LintConfig,
) -> ReelResult<LintReport> {
    let mut report = LintReport {
        timeline_issues: check_contiguity(segments),
        ..LintReport::default()
    };
    let keys: Vec<&str> = segments.iter().map(|s| s.name.as_str()).collect();

    for file in collect_source_files(roots, config)? {
        let text = std::fs::read_to_string(&file)
            .with_context(|| format!("read source file '{}'", file.display()))?;
        report
            .violations
            .extend(lint_source(&file, &text, &keys, config));
        report.files_checked += 1;
    }

    tracing::debug!(
        files = report.files_checked,
        problems = report.problem_count(),
        "lint pass finished"
    );
    Ok(report)
}

/// Lint a single source text. `file` is only used for reporting.
pub fn lint_source(
    file: &Path,
    text: &str,
    known_keys: &[&str],
    config: &LintConfig,
) -> Vec<LintViolation> {
    let single_quotes = file.extension().is_some_and(|ext| ext == "py");
    let mut out = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        for (offset, literal) in string_literals(line, single_quotes) {
            let before = line[..offset].trim_end();
            if KEY_ACCESSORS.iter().any(|acc| before.ends_with(acc))
                && !known_keys.contains(&literal)
            {
                out.push(LintViolation {
                    file: file.to_path_buf(),
                    line: line_idx + 1,
                    kind: ViolationKind::UnknownSegmentKey(literal.to_string()),
                });
            }
            if config.legacy_actor_names.iter().any(|n| n == literal) {
                out.push(LintViolation {
                    file: file.to_path_buf(),
                    line: line_idx + 1,
                    kind: ViolationKind::LegacyActorName(literal.to_string()),
                });
            }
        }
    }
    out
}

fn collect_source_files(roots: &[PathBuf], config: &LintConfig) -> ReelResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        if !root.exists() {
            return Err(ReelError::validation(format!(
                "lint path does not exist: {}",
                root.display()
            )));
        }
        for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walk '{}'", root.display()))?;
            let path = entry.path();
            let wanted = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| config.extensions.iter().any(|e| e == ext));
            if entry.file_type().is_file() && wanted {
                files.push(path.to_path_buf());
            }
        }
    }
    Ok(files)
}

/// Byte offset of each literal's opening quote, paired with its (unescaped-as-is) contents.
fn string_literals(line: &str, single_quotes: bool) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let q = bytes[i];
        if q == b'"' || (single_quotes && q == b'\'') {
            let open = i;
            i += 1;
            while i < bytes.len() && bytes[i] != q {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            if i < bytes.len() {
                out.push((open, &line[open + 1..i]));
            }
        }
        i += 1;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/lint.rs"]
mod tests;
