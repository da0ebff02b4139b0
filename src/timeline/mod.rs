//! Named frame ranges that partition the production timeline, and the static source linter that
//! keeps segment code in sync with them.

/// Source linter for timeline keys and legacy actor names.
pub mod lint;
/// Segment table and contiguity checks.
pub mod map;
