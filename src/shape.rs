//! Constraint Shapes
//!
//! In-memory model of the widgets and containers a designer places on the
//! constraints canvas. Shapes live in a flat [`ShapeSet`] arena and refer to
//! their children by id, never by ownership.

use crate::types::{Point, ShapeId, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod action;
pub mod serializer;
pub mod set;

pub use action::ShapeAction;
pub use serializer::{
    serialize, ConstraintDocument, GeometrySnapshot, RenderedElement, RenderedGeometry,
    SerializedShape,
};
pub use set::ShapeSet;

/// Widget or container kind. Each kind carries its own geometry derivation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeType {
    Field,
    Text,
    Button,
    Group,
    LabelGroup,
}

impl ShapeType {
    /// Containers may hold child references.
    pub fn is_container(self) -> bool {
        matches!(self, ShapeType::Group | ShapeType::LabelGroup)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeType::Field => "field",
            ShapeType::Text => "text",
            ShapeType::Button => "button",
            ShapeType::Group => "group",
            ShapeType::LabelGroup => "labelGroup",
        }
    }
}

/// Attribute that can be pinned against recomputation from rendered geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lock {
    Location,
    Size,
}

/// A constraint shape: logical attributes, locks and child references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeModel {
    #[serde(rename = "name")]
    pub id: ShapeId,
    #[serde(rename = "type")]
    pub shape_type: ShapeType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub locks: BTreeSet<Lock>,
    #[serde(default)]
    pub location: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ShapeId>,
}

impl ShapeModel {
    pub fn new(id: impl Into<ShapeId>, shape_type: ShapeType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shape_type,
            label: label.into(),
            locks: BTreeSet::new(),
            location: Point::default(),
            size: Size::default(),
            children: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: Point) -> Self {
        self.location = location;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_lock(mut self, lock: Lock) -> Self {
        self.locks.insert(lock);
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ShapeId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_locked(&self, lock: Lock) -> bool {
        self.locks.contains(&lock)
    }
}
