//! Scheme-independent access to action curves.
//!
//! Everything downstream of the build (tests, the readiness oracle, diagnostics) reads curves
//! through [`get_action_curves`], and every write goes through [`get_or_create_curve`], so no
//! other code needs to know how an action stores its curves.

use crate::curves::action::{Action, ActionFormat, Binding, Layer};
use crate::curves::curve::Curve;
use crate::foundation::error::{ReelError, ReelResult};

/// Name of the layer created when a layered action has none.
pub const DEFAULT_LAYER: &str = "Main";

/// Find the curve for `(data_path, index)` in `action`, creating it when absent.
///
/// In a layered action the curve lives in the first layer, inside the binding whose target is
/// `owner_hint` (or the action's recorded owner when no hint is given). Missing layers and
/// bindings are created. An unnamed owner, or more than one binding for the same owner, fails with
/// [`ReelError::BindingResolution`].
///
/// When a layered action still carries a flat curve for `(data_path, index)` that belongs to the
/// same owner, that curve is moved into the binding first, so the logical curve stays single and
/// keeps its existing keys.
pub fn get_or_create_curve<'a>(
    action: &'a mut Action,
    data_path: &str,
    index: u32,
    owner_hint: Option<&str>,
) -> ReelResult<&'a mut Curve> {
    match action.format()? {
        ActionFormat::Flat => {
            let curves = action
                .flat_curves
                .as_mut()
                .ok_or_else(|| ReelError::UnsupportedActionFormat(action.name.clone()))?;
            Ok(find_or_push(curves, data_path, index))
        }
        ActionFormat::Layered => {
            let owner = resolve_owner(action, owner_hint)?;
            let action_name = action.name.clone();
            let leftover = if action.owner.as_deref().is_none_or(|o| o == owner) {
                take_flat_curve(action, data_path, index)
            } else {
                None
            };
            let layers = action.layers.get_or_insert_with(Vec::new);
            if layers.is_empty() {
                tracing::debug!(action = %action_name, "creating default layer");
                layers.push(Layer::new(DEFAULT_LAYER));
            }
            let layer = &mut layers[0];

            let mut matching = layer
                .bindings
                .iter()
                .enumerate()
                .filter(|(_, b)| b.target == owner)
                .map(|(i, _)| i);
            let idx = match (matching.next(), matching.next()) {
                (Some(i), None) => i,
                (None, _) => {
                    layer.bindings.push(Binding::new(owner));
                    layer.bindings.len() - 1
                }
                (Some(_), Some(_)) => {
                    return Err(ReelError::binding(
                        action_name,
                        format!("layer '{}' has several bindings for '{owner}'", layer.name),
                    ));
                }
            };
            let curve = find_or_push(&mut layer.bindings[idx].curves, data_path, index);
            if let Some(old) = leftover {
                tracing::debug!(action = %action_name, data_path, index, "migrating flat curve");
                let newer = curve.points().to_vec();
                for p in old.points().iter().chain(&newer) {
                    curve.insert(p.frame, p.value);
                }
            }
            Ok(curve)
        }
    }
}

/// All curves of `action` in storage order: flat curves first, then layer, binding, curve.
///
/// A layered action caught mid-migration still reports its remaining flat curves.
pub fn get_action_curves(action: &Action) -> ReelResult<Vec<&Curve>> {
    action.format()?;
    Ok(flat_curves(action)
        .chain(
            action
                .layers()
                .iter()
                .flat_map(|layer| layer.bindings.iter())
                .flat_map(|binding| binding.curves.iter()),
        )
        .collect())
}

/// Curves of `action` that animate `owner`.
///
/// Flat actions carry no per-target scoping, so all their curves belong to the action's owner.
pub fn get_owner_curves<'a>(action: &'a Action, owner: &str) -> ReelResult<Vec<&'a Curve>> {
    match action.format()? {
        ActionFormat::Flat => {
            if action.owner.as_deref().is_some_and(|o| o != owner) {
                return Ok(Vec::new());
            }
            get_action_curves(action)
        }
        ActionFormat::Layered => {
            let owns_flat = action.owner.as_deref().is_none_or(|o| o == owner);
            let leftovers = flat_curves(action).filter(|_| owns_flat);
            Ok(leftovers
                .chain(
                    action
                        .layers()
                        .iter()
                        .flat_map(|layer| layer.bindings.iter())
                        .filter(|binding| binding.target == owner)
                        .flat_map(|binding| binding.curves.iter()),
                )
                .collect())
        }
    }
}

fn flat_curves(action: &Action) -> std::slice::Iter<'_, Curve> {
    action.flat_curves.as_deref().unwrap_or_default().iter()
}

fn take_flat_curve(action: &mut Action, data_path: &str, index: u32) -> Option<Curve> {
    let flat = action.flat_curves.as_mut()?;
    let i = flat.iter().position(|c| c.matches(data_path, index))?;
    Some(flat.remove(i))
}

fn resolve_owner(action: &Action, owner_hint: Option<&str>) -> ReelResult<String> {
    match owner_hint.or(action.owner.as_deref()) {
        Some(owner) if !owner.trim().is_empty() => Ok(owner.to_string()),
        Some(_) => Err(ReelError::binding(&action.name, "owner name is empty")),
        None => Err(ReelError::binding(
            &action.name,
            "no owner hint given and the action is not assigned to an actor",
        )),
    }
}

fn find_or_push<'a>(curves: &'a mut Vec<Curve>, data_path: &str, index: u32) -> &'a mut Curve {
    match curves.iter().position(|c| c.matches(data_path, index)) {
        Some(i) => &mut curves[i],
        None => {
            curves.push(Curve::new(data_path, index));
            let last = curves.len() - 1;
            &mut curves[last]
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/curves/resolve.rs"]
mod tests;
