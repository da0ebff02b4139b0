use std::collections::BTreeMap;

use crate::curves::action::Action;
use crate::curves::curve::Curve;
use crate::curves::resolve::get_owner_curves;
use crate::foundation::core::Transform3D;
use crate::foundation::error::ReelResult;

/// What an actor represents in the host scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ActorKind {
    /// Animated character rig.
    Character,
    /// Scene camera.
    Camera,
    /// Light source.
    Light,
    /// Set dressing, props and helper empties.
    Prop,
    /// Post-processing node graph.
    CompositorGraph,
}

impl ActorKind {
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Character => 0,
            Self::Camera => 1,
            Self::Light => 2,
            Self::Prop => 3,
            Self::CompositorGraph => 4,
        }
    }
}

/// A named, independently animatable entity in the build.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Actor {
    /// Deterministic, unique name.
    pub name: String,
    /// Actor kind.
    pub kind: ActorKind,
    /// Rest transform.
    pub transform: Transform3D,
    /// Whether the actor renders.
    pub visible: bool,
    /// Static scalar properties (lens, light energy, node settings).
    #[serde(default)]
    pub properties: BTreeMap<String, f64>,
    /// Animation data, created on the first keyframe.
    #[serde(default)]
    pub action: Option<Action>,
}

impl Actor {
    /// Visible actor at the origin with no animation.
    pub fn new(name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform3D::default(),
            visible: true,
            properties: BTreeMap::new(),
            action: None,
        }
    }

    /// Curves animating this actor.
    pub fn curves(&self) -> ReelResult<Vec<&Curve>> {
        match &self.action {
            Some(action) => get_owner_curves(action, &self.name),
            None => Ok(Vec::new()),
        }
    }

    /// Number of curves animating this actor.
    pub fn curve_count(&self) -> ReelResult<usize> {
        Ok(self.curves()?.len())
    }

    /// Static property value, if set.
    pub fn property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).copied()
    }
}
