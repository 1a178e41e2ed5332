//! Shape mutations
//!
//! Every edit the canvas can make to a constraint shape is one [`ShapeAction`].
//! Gestures arrive as an action paired with its inverse; [`ShapeAction::inverse_against`]
//! builds that inverse from the current shape state for callers that do not track it.

use crate::error::ShapeError;
use crate::shape::{Lock, ShapeSet};
use crate::types::{Point, ShapeId, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ShapeAction {
    SetLabel { shape: ShapeId, label: String },
    SetLocation { shape: ShapeId, location: Point },
    SetSize { shape: ShapeId, size: Size },
    Lock { shape: ShapeId, lock: Lock },
    Unlock { shape: ShapeId, lock: Lock },
    /// Insert `child` at `position` (clamped). No-op when already a child.
    AddChild {
        shape: ShapeId,
        child: ShapeId,
        position: usize,
    },
    RemoveChild { shape: ShapeId, child: ShapeId },
}

impl ShapeAction {
    /// The shape this action mutates.
    pub fn target(&self) -> &ShapeId {
        match self {
            ShapeAction::SetLabel { shape, .. }
            | ShapeAction::SetLocation { shape, .. }
            | ShapeAction::SetSize { shape, .. }
            | ShapeAction::Lock { shape, .. }
            | ShapeAction::Unlock { shape, .. }
            | ShapeAction::AddChild { shape, .. }
            | ShapeAction::RemoveChild { shape, .. } => shape,
        }
    }

    /// Apply to the set. Fails without touching state if the action cannot apply.
    pub fn apply(&self, set: &mut ShapeSet) -> Result<(), ShapeError> {
        if let ShapeAction::AddChild { shape, child, .. } = self {
            if !set.contains(child) {
                return Err(ShapeError::DanglingChild {
                    parent: shape.clone(),
                    child: child.clone(),
                });
            }
        }

        let model = set.get_mut(self.target())?;
        match self {
            ShapeAction::SetLabel { label, .. } => model.label = label.clone(),
            ShapeAction::SetLocation { location, .. } => model.location = *location,
            ShapeAction::SetSize { size, .. } => model.size = *size,
            ShapeAction::Lock { lock, .. } => {
                model.locks.insert(*lock);
            }
            ShapeAction::Unlock { lock, .. } => {
                model.locks.remove(lock);
            }
            ShapeAction::AddChild {
                shape,
                child,
                position,
            } => {
                if !model.shape_type.is_container() {
                    return Err(ShapeError::NotAContainer(shape.clone()));
                }
                if !model.children.contains(child) {
                    let at = (*position).min(model.children.len());
                    model.children.insert(at, child.clone());
                }
            }
            ShapeAction::RemoveChild { child, .. } => {
                model.children.retain(|c| c != child);
            }
        }
        Ok(())
    }

    /// Build the action that undoes `self` given the set as it is *before* `self` applies.
    pub fn inverse_against(&self, set: &ShapeSet) -> Result<ShapeAction, ShapeError> {
        let shape = self.target().clone();
        let model = set
            .get(&shape)
            .ok_or_else(|| ShapeError::ShapeNotFound(shape.clone()))?;

        Ok(match self {
            ShapeAction::SetLabel { .. } => ShapeAction::SetLabel {
                shape,
                label: model.label.clone(),
            },
            ShapeAction::SetLocation { .. } => ShapeAction::SetLocation {
                shape,
                location: model.location,
            },
            ShapeAction::SetSize { .. } => ShapeAction::SetSize {
                shape,
                size: model.size,
            },
            ShapeAction::Lock { lock, .. } | ShapeAction::Unlock { lock, .. } => {
                if model.is_locked(*lock) {
                    ShapeAction::Lock { shape, lock: *lock }
                } else {
                    ShapeAction::Unlock { shape, lock: *lock }
                }
            }
            ShapeAction::AddChild { child, .. } | ShapeAction::RemoveChild { child, .. } => {
                match model.children.iter().position(|c| c == child) {
                    Some(position) => ShapeAction::AddChild {
                        shape,
                        child: child.clone(),
                        position,
                    },
                    None => ShapeAction::RemoveChild {
                        shape,
                        child: child.clone(),
                    },
                }
            }
        })
    }
}
