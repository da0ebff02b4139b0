//! Phased scene build: asset load, global setup, whole-timeline animation, then per-segment
//! modules in a fixed order.

/// Names and default placements of the built-in cast.
pub mod cast;
/// Built-in segment modules.
pub mod modules;
/// Build phases and the orchestrator that runs them.
pub mod orchestrator;
/// Heuristic check for a finished build.
pub mod readiness;
/// Segment module trait, registry and dispatcher.
pub mod segments;
