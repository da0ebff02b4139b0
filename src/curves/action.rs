use std::sync::OnceLock;

use crate::curves::curve::Curve;
use crate::foundation::error::{ReelError, ReelResult};

/// Curve storage scheme of an [`Action`], resolved by probing which collections it carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ActionFormat {
    /// The action owns one flat set of self-describing curves.
    Flat,
    /// The action owns layers of per-target bindings, each with its own curve set.
    Layered,
}

/// Layer of a [`ActionFormat::Layered`] action.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Layer name (`Main` for the layer created on demand).
    pub name: String,
    /// Per-target curve sets.
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

impl Layer {
    /// Create an empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
        }
    }
}

/// Set of curves scoped to one target actor inside a [`Layer`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Binding {
    /// Name of the actor these curves animate.
    pub target: String,
    /// Curves of this binding.
    #[serde(default)]
    pub curves: Vec<Curve>,
}

impl Binding {
    /// Create an empty binding for `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            curves: Vec::new(),
        }
    }
}

/// Host animation data block.
///
/// Either collection may be absent depending on which host version produced the data; both can
/// be present on data caught mid-migration. The storage scheme is probed once and cached.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Action {
    /// Action name.
    pub name: String,
    /// Actor this action is assigned to, used when no owner hint is given.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, rename = "fcurves", skip_serializing_if = "Option::is_none")]
    pub(crate) flat_curves: Option<Vec<Curve>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) layers: Option<Vec<Layer>>,
    #[serde(skip)]
    format: OnceLock<ActionFormat>,
}

impl Action {
    /// Empty action using the flat scheme.
    pub fn flat(name: impl Into<String>) -> Self {
        Self::with_storage(name, Some(Vec::new()), None)
    }

    /// Empty action using the layered scheme (no layers yet).
    pub fn layered(name: impl Into<String>) -> Self {
        Self::with_storage(name, None, Some(Vec::new()))
    }

    /// Empty action in the given scheme.
    pub fn new(name: impl Into<String>, format: ActionFormat) -> Self {
        match format {
            ActionFormat::Flat => Self::flat(name),
            ActionFormat::Layered => Self::layered(name),
        }
    }

    /// Action carrying neither collection; every curve operation on it fails.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::with_storage(name, None, None)
    }

    fn with_storage(
        name: impl Into<String>,
        flat_curves: Option<Vec<Curve>>,
        layers: Option<Vec<Layer>>,
    ) -> Self {
        Self {
            name: name.into(),
            owner: None,
            flat_curves,
            layers,
            format: OnceLock::new(),
        }
    }

    /// Record the actor this action is assigned to.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Storage scheme, probed on first use.
    ///
    /// A layer collection wins over a flat one, so new curves go into layers; flat curves left on
    /// such an action are still read (see [`crate::get_action_curves`]). An action with neither
    /// fails with [`ReelError::UnsupportedActionFormat`].
    pub fn format(&self) -> ReelResult<ActionFormat> {
        if let Some(format) = self.format.get() {
            return Ok(*format);
        }
        let probed = if self.layers.is_some() {
            ActionFormat::Layered
        } else if self.flat_curves.is_some() {
            ActionFormat::Flat
        } else {
            return Err(ReelError::UnsupportedActionFormat(self.name.clone()));
        };
        Ok(*self.format.get_or_init(|| probed))
    }

    /// Layers of a layered action (empty for flat actions).
    pub fn layers(&self) -> &[Layer] {
        self.layers.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/curves/action.rs"]
mod tests;
