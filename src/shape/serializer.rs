//! Shape Serializer
//!
//! Turns the shape set plus a snapshot of live rendered geometry into the
//! document the solver service consumes. Unlocked attributes are taken from the
//! rendering; locked ones keep their stored value.

use crate::shape::{Lock, ShapeModel, ShapeSet, ShapeType};
use crate::types::{Point, ShapeId, Size};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One rendered visual element as reported by the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderedElement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl RenderedElement {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn scaled(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    fn scaled_width(&self) -> i64 {
        (self.width * self.scale_x).round() as i64
    }

    fn scaled_height(&self) -> i64 {
        (self.height * self.scale_y).round() as i64
    }
}

/// Rendered geometry of a shape: its primary element and, for fields, the underline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderedGeometry {
    pub primary: RenderedElement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<RenderedElement>,
}

impl RenderedGeometry {
    pub fn new(primary: RenderedElement) -> Self {
        Self {
            primary,
            underline: None,
        }
    }

    pub fn with_underline(mut self, underline: RenderedElement) -> Self {
        self.underline = Some(underline);
        self
    }

    fn location(&self) -> Point {
        Point::new(self.primary.left, self.primary.top)
    }
}

impl ShapeType {
    /// Size derivation rule for this shape type.
    ///
    /// Fields measure height from the label to the underline and width from
    /// the underline. Without an underline they fall back to the generic rule.
    pub fn derive_size(self, geometry: &RenderedGeometry) -> Size {
        match (self, geometry.underline) {
            (ShapeType::Field, Some(line)) => Size::new(
                line.scaled_width(),
                (line.top - geometry.primary.top).round() as i64,
            ),
            _ => Size::new(
                geometry.primary.scaled_width(),
                geometry.primary.scaled_height(),
            ),
        }
    }
}

/// Live geometry per shape, supplied by the rendering surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySnapshot {
    elements: HashMap<ShapeId, RenderedGeometry>,
}

impl GeometrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ShapeId, geometry: RenderedGeometry) {
        self.elements.insert(id, geometry);
    }

    pub fn remove(&mut self, id: &ShapeId) -> Option<RenderedGeometry> {
        self.elements.remove(id)
    }

    pub fn get(&self, id: &ShapeId) -> Option<&RenderedGeometry> {
        self.elements.get(id)
    }
}

/// Solver-ready form of a single shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedShape {
    #[serde(rename = "type")]
    pub shape_type: ShapeType,
    pub label: String,
    pub name: ShapeId,
    pub locks: BTreeSet<Lock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ShapeId>>,
}

/// The full constraint document sent to the solver.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintDocument {
    pub shapes: Vec<SerializedShape>,
}

impl ConstraintDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.shapes)
    }

    pub fn get(&self, id: &ShapeId) -> Option<&SerializedShape> {
        self.shapes.iter().find(|s| &s.name == id)
    }
}

/// Serialize every shape in set order against the geometry snapshot.
pub fn serialize(shapes: &ShapeSet, geometry: &GeometrySnapshot) -> ConstraintDocument {
    ConstraintDocument {
        shapes: shapes
            .iter()
            .map(|shape| serialize_shape(shape, geometry.get(&shape.id)))
            .collect(),
    }
}

fn serialize_shape(shape: &ShapeModel, rendered: Option<&RenderedGeometry>) -> SerializedShape {
    let (location, size) = match rendered {
        Some(geometry) => {
            let location = if shape.is_locked(Lock::Location) {
                shape.location
            } else {
                geometry.location()
            };
            let size = if shape.is_locked(Lock::Size) {
                shape.size
            } else {
                shape.shape_type.derive_size(geometry)
            };
            (Some(location), Some(size))
        }
        None => (None, None),
    };

    SerializedShape {
        shape_type: shape.shape_type,
        label: shape.label.clone(),
        name: shape.id.clone(),
        locks: shape.locks.clone(),
        location,
        size,
        children: shape
            .shape_type
            .is_container()
            .then(|| shape.children.clone()),
    }
}
