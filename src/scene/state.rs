use std::collections::BTreeMap;

use crate::build::orchestrator::BuildPhase;
use crate::curves::action::{Action, ActionFormat};
use crate::curves::curve::Curve;
use crate::curves::resolve::get_or_create_curve;
use crate::foundation::core::{FrameIndex, FrameSpan, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::actor::{Actor, ActorKind};
use crate::scene::fingerprint::{BuildFingerprint, fingerprint_state};
use crate::timeline::map::TimelineMap;

/// Global scene configuration, written by the lighting/camera/compositor phase.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Playback rate.
    pub fps: Fps,
    /// Output resolution in pixels.
    pub resolution: [u32; 2],
    /// Render samples per pixel.
    pub samples: u32,
    /// World background color (linear RGB).
    pub world_color: [f64; 3],
    /// Storage scheme used for actions created during the build.
    pub action_format: ActionFormat,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            resolution: [1920, 1080],
            samples: 64,
            world_color: [0.05, 0.05, 0.06],
            action_format: ActionFormat::Layered,
        }
    }
}

/// Build context shared by every build phase and segment module.
///
/// A new build always starts from a new `SceneState`; nothing in it is global. Actors are keyed by
/// name, so iteration order is deterministic.
#[derive(Clone, Debug)]
pub struct SceneState {
    timeline: TimelineMap,
    settings: SceneSettings,
    actors: BTreeMap<String, Actor>,
    completed_phases: Vec<BuildPhase>,
}

impl SceneState {
    /// Empty scene over `timeline`.
    pub fn new(timeline: TimelineMap, settings: SceneSettings) -> Self {
        Self {
            timeline,
            settings,
            actors: BTreeMap::new(),
            completed_phases: Vec::new(),
        }
    }

    /// Timeline the scene is built against.
    pub fn timeline(&self) -> &TimelineMap {
        &self.timeline
    }

    /// Frames covered by the whole timeline.
    pub fn frame_span(&self) -> FrameSpan {
        self.timeline.total_span()
    }

    /// Global scene settings.
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Mutable global scene settings.
    pub fn settings_mut(&mut self) -> &mut SceneSettings {
        &mut self.settings
    }

    /// Get the actor called `name`, creating it when absent.
    ///
    /// Fails when an actor with that name exists with a different kind.
    pub fn ensure_actor(&mut self, name: &str, kind: ActorKind) -> ReelResult<&mut Actor> {
        if !self.actors.contains_key(name) {
            tracing::debug!(actor = name, ?kind, "creating actor");
            self.actors.insert(name.to_string(), Actor::new(name, kind));
        }
        let actor = self
            .actors
            .get_mut(name)
            .ok_or_else(|| ReelError::validation(format!("actor '{name}' vanished")))?;
        if actor.kind != kind {
            return Err(ReelError::validation(format!(
                "actor '{name}' already exists as {:?}, not {kind:?}",
                actor.kind
            )));
        }
        Ok(actor)
    }

    /// The actor called `name`.
    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.get(name)
    }

    /// Mutable access to the actor called `name`.
    pub fn actor_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors.get_mut(name)
    }

    /// Return `true` when an actor called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    /// All actors in name order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Number of actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Key `value` on `(data_path, index)` of `actor` at `frame`.
    ///
    /// The actor's action is created on first use in the scene's configured storage scheme, and
    /// the actor's name is passed as the owner hint.
    pub fn keyframe(
        &mut self,
        actor: &str,
        data_path: &str,
        index: u32,
        frame: FrameIndex,
        value: f64,
    ) -> ReelResult<()> {
        let format = self.settings.action_format;
        let target = self.actors.get_mut(actor).ok_or_else(|| {
            ReelError::validation(format!("cannot keyframe missing actor '{actor}'"))
        })?;
        let action = target
            .action
            .get_or_insert_with(|| Action::new(format!("{actor}Action"), format).with_owner(actor));
        get_or_create_curve(action, data_path, index, Some(actor))?.insert(frame, value);
        Ok(())
    }

    /// Key every component of a vector property at `frame`.
    pub fn keyframe_vec(
        &mut self,
        actor: &str,
        data_path: &str,
        frame: FrameIndex,
        values: &[f64],
    ) -> ReelResult<()> {
        for (index, value) in values.iter().enumerate() {
            self.keyframe(actor, data_path, index as u32, frame, *value)?;
        }
        Ok(())
    }

    /// Curves animating `actor` (empty when the actor is missing or unanimated).
    pub fn curves_of(&self, actor: &str) -> ReelResult<Vec<&Curve>> {
        match self.actors.get(actor) {
            Some(a) => a.curves(),
            None => Ok(Vec::new()),
        }
    }

    /// Single curve of `actor`, if it exists.
    pub fn curve(&self, actor: &str, data_path: &str, index: u32) -> ReelResult<Option<&Curve>> {
        Ok(self
            .curves_of(actor)?
            .into_iter()
            .find(|c| c.matches(data_path, index)))
    }

    /// Value of `(data_path, index)` on `actor` at `frame`.
    ///
    /// Animated properties are sampled from their curve. Otherwise the rest transform component is
    /// used for `location`/`rotation_euler`/`scale`, then the static property `"{path}.{index}"`
    /// (or `"{path}"` for index 0), then `0.0`.
    pub fn sample(
        &self,
        actor: &str,
        data_path: &str,
        index: u32,
        frame: FrameIndex,
    ) -> ReelResult<f64> {
        if let Some(v) = self
            .curve(actor, data_path, index)?
            .and_then(|c| c.value_at(frame))
        {
            return Ok(v);
        }
        let Some(a) = self.actors.get(actor) else {
            return Ok(0.0);
        };
        let i = index as usize;
        let rest = match data_path {
            "location" => a.transform.location.get(i).copied(),
            "rotation_euler" => a.transform.rotation.get(i).copied(),
            "scale" => a.transform.scale.get(i).copied(),
            other => a
                .property(&format!("{other}.{index}"))
                .or_else(|| if index == 0 { a.property(other) } else { None }),
        };
        Ok(rest.unwrap_or(0.0))
    }

    /// Mark `phase` as finished.
    pub fn record_phase(&mut self, phase: BuildPhase) {
        self.completed_phases.push(phase);
    }

    /// Phases finished so far, in completion order.
    pub fn completed_phases(&self) -> &[BuildPhase] {
        &self.completed_phases
    }

    /// Stable digest of the scene's actors and animation.
    pub fn fingerprint(&self) -> ReelResult<BuildFingerprint> {
        fingerprint_state(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/state.rs"]
mod tests;
