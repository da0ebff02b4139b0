//! Heuristic check for whether an in-memory scene is a finished build.
//!
//! Used to skip an expensive rebuild when a previous build can be reused. A false "not complete"
//! only costs a rebuild; a false "complete" would reuse a broken build, so every threshold errs on
//! the strict side and any failure to read curves counts as incomplete.

use crate::build::cast::HERO;
use crate::build::orchestrator::AMBIENT_PATHS;
use crate::foundation::core::FrameIndex;
use crate::scene::actor::{Actor, ActorKind};
use crate::scene::state::SceneState;

/// Thresholds for [`is_complete`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReadinessThresholds {
    /// Actors of which at least one must be sufficiently animated.
    pub principal_actors: Vec<String>,
    /// Minimum curves on a principal actor.
    pub principal_min_curves: usize,
    /// Minimum curves on the camera.
    pub camera_min_curves: usize,
    /// Some keyframe on a principal actor or camera must sit at or after this fraction of the
    /// timeline.
    pub late_fraction: f64,
    /// Curves ignored by the late-keyframe check because they span the timeline before any
    /// segment runs.
    pub ambient_paths: Vec<String>,
    /// Some camera curve must span at least this many frames.
    pub camera_min_span: u64,
}

impl Default for ReadinessThresholds {
    fn default() -> Self {
        Self {
            principal_actors: vec![HERO.to_string()],
            principal_min_curves: 12,
            camera_min_curves: 1,
            late_fraction: 0.95,
            ambient_paths: AMBIENT_PATHS.iter().map(|p| p.to_string()).collect(),
            camera_min_span: 1000,
        }
    }
}

/// Decide whether `scene` already holds a complete build.
pub fn is_complete(scene: &SceneState, thresholds: &ReadinessThresholds) -> bool {
    let principal_ok = thresholds.principal_actors.iter().any(|name| {
        scene
            .actor(name)
            .and_then(|a| a.curve_count().ok())
            .is_some_and(|n| n >= thresholds.principal_min_curves)
    });
    if !principal_ok {
        tracing::debug!("readiness: principal actor under-animated");
        return false;
    }

    let cameras: Vec<&Actor> = scene
        .actors()
        .filter(|a| a.kind == ActorKind::Camera)
        .collect();
    let camera_ok = cameras.iter().any(|cam| {
        let Ok(curves) = cam.curves() else {
            return false;
        };
        curves.len() >= thresholds.camera_min_curves
            && curves.iter().any(|c| {
                c.span()
                    .is_some_and(|s| s.end - s.start >= thresholds.camera_min_span)
            })
    });
    if !camera_ok {
        tracing::debug!("readiness: camera missing or under-animated");
        return false;
    }

    let late = late_frame(scene, thresholds);
    let late_ok = scene
        .actors()
        .filter(|a| a.kind == ActorKind::Camera || thresholds.principal_actors.contains(&a.name))
        .any(|a| {
            a.curves().is_ok_and(|curves| {
                curves.iter().any(|c| {
                    !thresholds.ambient_paths.iter().any(|p| p == c.data_path())
                        && c.points().last().is_some_and(|p| p.frame >= late)
                })
            })
        });
    if !late_ok {
        tracing::debug!(late = late.0, "readiness: no segment keyframe late in the timeline");
        return false;
    }
    true
}

/// Frame used for the late-keyframe check with `thresholds`.
pub fn late_frame(scene: &SceneState, thresholds: &ReadinessThresholds) -> FrameIndex {
    scene.frame_span().frame_at_fraction(thresholds.late_fraction)
}

#[cfg(test)]
#[path = "../../tests/unit/build/readiness.rs"]
mod tests;
