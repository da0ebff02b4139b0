//! Reelwright orchestrates the build and render of a long-form procedural animation.
//!
//! - A [`TimelineMap`] partitions the production into contiguous, named segments.
//! - A [`BuildOrchestrator`] populates a fresh [`SceneState`] in fixed phases, ending with the
//!   per-segment modules of a [`SegmentRegistry`].
//! - Curves are read and written through [`get_or_create_curve`] and [`get_action_curves`],
//!   whichever storage scheme an [`Action`] uses.
//! - A [`RenderScheduler`] splits frame ranges into [`RenderChunk`]s and renders each one in a
//!   separate host process.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Phased scene build and segment dispatch.
pub mod build;
/// Project configuration.
pub mod config;
/// Curves and action storage.
pub mod curves;
/// Chunked rendering.
pub mod render;
/// Actors and build context.
pub mod scene;
/// Segment table and linter.
pub mod timeline;

pub use crate::foundation::core::{Fps, FrameIndex, FrameSpan, Transform3D};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::build::cast::CastConfig;
pub use crate::build::modules::builtin_registry;
pub use crate::build::orchestrator::{AMBIENT_PATHS, BuildOrchestrator, BuildPhase};
pub use crate::build::readiness::{ReadinessThresholds, is_complete};
pub use crate::build::segments::{SegmentModule, SegmentRegistry, dispatch, dispatch_all};
pub use crate::config::ProjectConfig;
pub use crate::curves::action::{Action, ActionFormat, Binding, Layer};
pub use crate::curves::curve::{Curve, CurvePoint};
pub use crate::curves::resolve::{get_action_curves, get_or_create_curve, get_owner_curves};
pub use crate::render::chunk::{MAX_CHUNK_FRAMES, MAX_PLANNED_CHUNKS, RenderChunk, plan_chunks};
pub use crate::render::host::{BuildScriptArgs, HostConfig, HostProcessRunner, OutputLayout};
pub use crate::render::scheduler::{
    ChunkOutcome, ChunkRunner, RenderReport, RenderScheduler, RenderThreading,
};
pub use crate::scene::actor::{Actor, ActorKind};
pub use crate::scene::fingerprint::BuildFingerprint;
pub use crate::scene::state::{SceneSettings, SceneState};
pub use crate::timeline::lint::{LintConfig, LintReport, LintViolation, ViolationKind, lint_paths};
pub use crate::timeline::map::{Segment, TimelineIssue, TimelineMap};
