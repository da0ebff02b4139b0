use crate::build::cast::{
    CAMERA, COMPOSITOR, CastConfig, FILL_LIGHT, KEY_LIGHT, LANTERN, RIM_LIGHT,
};
use crate::build::segments::{SegmentRegistry, dispatch};
use crate::foundation::core::{FrameIndex, Transform3D};
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::actor::ActorKind;
use crate::scene::state::{SceneSettings, SceneState};
use crate::timeline::map::TimelineMap;

/// Curves the whole-timeline phases ([`BuildPhase::Animation`], [`BuildPhase::Secondary`]) key
/// on characters, from the first frame to the last.
pub const AMBIENT_PATHS: &[&str] = &["pose.breath", "scale", "shape.blink", "pose.head_turn"];

/// Build phases, run strictly in [`BuildPhase::ORDER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BuildPhase {
    /// Create characters and props from the cast manifest.
    AssetLoad,
    /// Lights and world settings.
    Lighting,
    /// Render camera.
    Camera,
    /// Post-processing graph.
    Compositor,
    /// Whole-timeline character and prop motion.
    Animation,
    /// Gaze tracking and other systems layered over the animation.
    Secondary,
    /// Per-segment modules.
    SegmentDispatch,
}

impl BuildPhase {
    /// Execution order of a full build.
    pub const ORDER: [BuildPhase; 7] = [
        BuildPhase::AssetLoad,
        BuildPhase::Lighting,
        BuildPhase::Camera,
        BuildPhase::Compositor,
        BuildPhase::Animation,
        BuildPhase::Secondary,
        BuildPhase::SegmentDispatch,
    ];
}

/// Runs the build phases against a fresh [`SceneState`].
///
/// The build is single-threaded: segment modules accumulate keys on shared actors, so they run one
/// after another in the configured order.
pub struct BuildOrchestrator {
    timeline: TimelineMap,
    settings: SceneSettings,
    cast: CastConfig,
    registry: SegmentRegistry,
    order: Vec<String>,
}

impl BuildOrchestrator {
    /// Orchestrator dispatching `registry` in registration order.
    ///
    /// Fails with [`ReelError::UnknownSegment`] if a module targets a segment the timeline lacks.
    pub fn new(timeline: TimelineMap, registry: SegmentRegistry) -> ReelResult<Self> {
        registry.validate_against(&timeline)?;
        let order = registry.names().into_iter().map(str::to_string).collect();
        Ok(Self {
            timeline,
            settings: SceneSettings::default(),
            cast: CastConfig::default(),
            registry,
            order,
        })
    }

    /// Override the scene settings.
    pub fn with_settings(mut self, settings: SceneSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Override the cast manifest.
    pub fn with_cast(mut self, cast: CastConfig) -> Self {
        self.cast = cast;
        self
    }

    /// Override the segment dispatch order. Every name must have a registered module.
    pub fn with_order(mut self, order: Vec<String>) -> ReelResult<Self> {
        for name in &order {
            if self.registry.get(name).is_none() {
                return Err(ReelError::UnknownSegment(name.clone()));
            }
        }
        self.order = order;
        Ok(self)
    }

    /// Timeline this orchestrator builds against.
    pub fn timeline(&self) -> &TimelineMap {
        &self.timeline
    }

    /// Segment dispatch order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Empty scene with this orchestrator's timeline and settings.
    pub fn new_scene(&self) -> SceneState {
        SceneState::new(self.timeline.clone(), self.settings.clone())
    }

    /// Run every phase on a new scene.
    #[tracing::instrument(skip(self))]
    pub fn run(&self) -> ReelResult<SceneState> {
        let mut scene = self.new_scene();
        for phase in BuildPhase::ORDER {
            self.run_phase(phase, &mut scene)?;
        }
        tracing::info!(actors = scene.actor_count(), "build finished");
        Ok(scene)
    }

    /// Run one phase on `scene` and record it as completed.
    #[tracing::instrument(skip(self, scene))]
    pub fn run_phase(&self, phase: BuildPhase, scene: &mut SceneState) -> ReelResult<()> {
        match phase {
            BuildPhase::AssetLoad => load_assets(scene, &self.cast)?,
            BuildPhase::Lighting => setup_lighting(scene)?,
            BuildPhase::Camera => setup_camera(scene)?,
            BuildPhase::Compositor => setup_compositor(scene)?,
            BuildPhase::Animation => animate_ambient(scene)?,
            BuildPhase::Secondary => setup_gaze(scene)?,
            BuildPhase::SegmentDispatch => {
                let order: Vec<&str> = self.order.iter().map(String::as_str).collect();
                let ran = dispatch(&self.registry, &order, scene)?;
                tracing::info!(segments = ran.len(), "segments dispatched");
            }
        }
        scene.record_phase(phase);
        Ok(())
    }
}

fn load_assets(scene: &mut SceneState, cast: &CastConfig) -> ReelResult<()> {
    for c in &cast.characters {
        scene.ensure_actor(&c.name, ActorKind::Character)?.transform = c.transform();
    }
    for p in &cast.props {
        scene.ensure_actor(&p.name, ActorKind::Prop)?.transform = p.transform();
    }
    Ok(())
}

fn setup_lighting(scene: &mut SceneState) -> ReelResult<()> {
    let rig: [(&str, [f64; 3], f64, [f64; 3]); 3] = [
        (KEY_LIGHT, [6.0, -8.0, 9.0], 1000.0, [1.0, 0.95, 0.88]),
        (FILL_LIGHT, [-7.0, -6.0, 4.0], 250.0, [0.7, 0.8, 1.0]),
        (RIM_LIGHT, [0.0, 9.0, 6.0], 600.0, [1.0, 1.0, 1.0]),
    ];
    for (name, location, energy, color) in rig {
        let light = scene.ensure_actor(name, ActorKind::Light)?;
        light.transform = Transform3D::at(location);
        light.properties.insert("energy".to_string(), energy);
        for (i, c) in color.iter().enumerate() {
            light.properties.insert(format!("color.{i}"), *c);
        }
    }
    if let Some(lantern) = scene.actor_mut(LANTERN) {
        lantern.properties.insert("energy".to_string(), 40.0);
    }
    scene.settings_mut().world_color = [0.05, 0.06, 0.08];
    Ok(())
}

fn setup_camera(scene: &mut SceneState) -> ReelResult<()> {
    let start = FrameIndex(scene.frame_span().start);
    let cam = scene.ensure_actor(CAMERA, ActorKind::Camera)?;
    cam.transform = Transform3D {
        location: [-10.0, -30.0, 1.7],
        rotation: [1.5, 0.0, 0.0],
        scale: [1.0; 3],
    };
    cam.properties.insert("lens".to_string(), 35.0);
    cam.properties.insert("clip_end".to_string(), 500.0);
    let rest = cam.transform;
    scene.keyframe_vec(CAMERA, "location", start, &rest.location)?;
    scene.keyframe_vec(CAMERA, "rotation_euler", start, &rest.rotation)
}

fn setup_compositor(scene: &mut SceneState) -> ReelResult<()> {
    let comp = scene.ensure_actor(COMPOSITOR, ActorKind::CompositorGraph)?;
    for (node, value) in [("exposure", 0.0), ("glare", 0.0), ("vignette", 0.0), ("fade", 0.0)] {
        comp.properties.insert(node.to_string(), value);
    }
    Ok(())
}

fn names_of(scene: &SceneState, kind: ActorKind) -> Vec<String> {
    scene
        .actors()
        .filter(|a| a.kind == kind)
        .map(|a| a.name.clone())
        .collect()
}

/// Breathing and blinking on every character, sway on the lantern, across the whole timeline.
fn animate_ambient(scene: &mut SceneState) -> ReelResult<()> {
    let span = scene.frame_span();
    for name in names_of(scene, ActorKind::Character) {
        let mut frame = span.start;
        let mut inhale = false;
        while frame <= span.end {
            let breath = if inhale { 1.0 } else { 0.0 };
            scene.keyframe(&name, "pose.breath", 0, FrameIndex(frame), breath)?;
            let chest = 1.0 + 0.01 * breath;
            scene.keyframe_vec(&name, "scale", FrameIndex(frame), &[1.0, 1.0, chest])?;
            inhale = !inhale;
            frame += 48;
        }

        let mut frame = span.start + 30;
        while frame + 4 <= span.end {
            for (offset, value) in [(0, 0.0), (2, 1.0), (4, 0.0)] {
                scene.keyframe(&name, "shape.blink", 0, FrameIndex(frame + offset), value)?;
            }
            frame += 96;
        }
    }

    if scene.contains(LANTERN) {
        let mut frame = span.start;
        let mut side = 1.0;
        while frame <= span.end {
            scene.keyframe(LANTERN, "rotation_euler", 1, FrameIndex(frame), 0.05 * side)?;
            side = -side;
            frame += 72;
        }
    }
    Ok(())
}

/// Each character gets a gaze target that trails the camera; the head turns toward it.
fn setup_gaze(scene: &mut SceneState) -> ReelResult<()> {
    if !scene.contains(CAMERA) {
        tracing::debug!("no camera, skipping gaze setup");
        return Ok(());
    }
    let span = scene.frame_span();
    for name in names_of(scene, ActorKind::Character) {
        let target = format!("{name}GazeTarget");
        scene.ensure_actor(&target, ActorKind::Prop)?.visible = false;

        let mut frame = span.start;
        loop {
            let f = FrameIndex(frame);
            let mut cam = [0.0; 3];
            for (i, v) in cam.iter_mut().enumerate() {
                *v = scene.sample(CAMERA, "location", i as u32, f)?;
            }
            scene.keyframe_vec(&target, "location", f, &cam)?;

            let dx = cam[0] - scene.sample(&name, "location", 0, f)?;
            let dy = cam[1] - scene.sample(&name, "location", 1, f)?;
            // Heads turn at most 70 degrees either way.
            let head = dy.atan2(dx).clamp(-1.22, 1.22);
            scene.keyframe(&name, "pose.head_turn", 0, f, head)?;

            if frame == span.end {
                break;
            }
            frame = (frame + 240).min(span.end);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/build/orchestrator.rs"]
mod tests;
