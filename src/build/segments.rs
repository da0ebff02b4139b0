use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::state::SceneState;
use crate::timeline::map::TimelineMap;

/// Setup routine attached to one timeline segment.
///
/// Implementations must tolerate missing optional actors (do nothing instead of failing) and must
/// be safe to run twice: supporting actors are created through
/// [`SceneState::ensure_actor`] and keys at the same frame overwrite.
pub trait SegmentModule: Send + Sync {
    /// Timeline key of the segment this module animates.
    fn segment(&self) -> &str;

    /// Apply this segment's animation to the shared scene.
    fn setup(&self, scene: &mut SceneState) -> ReelResult<()>;
}

/// Segment modules keyed by segment name, kept in registration order.
#[derive(Default)]
pub struct SegmentRegistry {
    modules: Vec<Box<dyn SegmentModule>>,
}

impl SegmentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module`; a segment can only have one module.
    pub fn register(&mut self, module: Box<dyn SegmentModule>) -> ReelResult<()> {
        if self.get(module.segment()).is_some() {
            return Err(ReelError::validation(format!(
                "segment '{}' already has a module",
                module.segment()
            )));
        }
        self.modules.push(module);
        Ok(())
    }

    /// Module registered for `segment`.
    pub fn get(&self, segment: &str) -> Option<&dyn SegmentModule> {
        self.modules
            .iter()
            .find(|m| m.segment() == segment)
            .map(|m| m.as_ref())
    }

    /// Registered segment names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.segment()).collect()
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Return `true` when no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Fail with [`ReelError::UnknownSegment`] if any module targets a segment `timeline` lacks.
    pub fn validate_against(&self, timeline: &TimelineMap) -> ReelResult<()> {
        for name in self.names() {
            timeline.lookup(name)?;
        }
        Ok(())
    }
}

/// Run the modules named in `order`, exactly in that order, against `scene`.
///
/// Returns the segments that were dispatched. Names missing from the registry or from the scene's
/// timeline fail with [`ReelError::UnknownSegment`] before any module runs.
pub fn dispatch(
    registry: &SegmentRegistry,
    order: &[&str],
    scene: &mut SceneState,
) -> ReelResult<Vec<String>> {
    let mut modules = Vec::with_capacity(order.len());
    for &name in order {
        scene.timeline().lookup(name)?;
        let module = registry
            .get(name)
            .ok_or_else(|| ReelError::UnknownSegment(name.to_string()))?;
        modules.push(module);
    }

    let mut dispatched = Vec::with_capacity(modules.len());
    for module in modules {
        let name = module.segment();
        let _span = tracing::info_span!("segment", name).entered();
        let actors_before = scene.actor_count();
        module.setup(scene)?;
        tracing::debug!(
            created = scene.actor_count() - actors_before,
            "segment module finished"
        );
        dispatched.push(name.to_string());
    }
    Ok(dispatched)
}

/// Run every registered module in registration order.
pub fn dispatch_all(registry: &SegmentRegistry, scene: &mut SceneState) -> ReelResult<Vec<String>> {
    let order = registry.names();
    dispatch(registry, &order, scene)
}

#[cfg(test)]
#[path = "../../tests/unit/build/segments.rs"]
mod tests;
