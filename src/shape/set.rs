//! Flat shape arena with an id index.

use crate::error::ShapeError;
use crate::shape::ShapeModel;
use crate::types::ShapeId;
use std::collections::HashMap;

/// Ordered set of shapes keyed by id. Insertion order is the serialization order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeSet {
    shapes: Vec<ShapeModel>,
    index: HashMap<ShapeId, usize>,
}

impl ShapeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from shapes, checking ids are unique and every child resolves.
    pub fn from_shapes(shapes: Vec<ShapeModel>) -> Result<Self, ShapeError> {
        let mut set = Self::new();
        for shape in shapes {
            if set.index.contains_key(&shape.id) {
                return Err(ShapeError::DuplicateShape(shape.id));
            }
            set.index.insert(shape.id.clone(), set.shapes.len());
            set.shapes.push(shape);
        }
        for shape in &set.shapes {
            set.check_children(shape)?;
        }
        Ok(set)
    }

    /// Add a shape at the end. Its children must already be present.
    pub fn insert(&mut self, shape: ShapeModel) -> Result<(), ShapeError> {
        if self.index.contains_key(&shape.id) {
            return Err(ShapeError::DuplicateShape(shape.id));
        }
        self.check_children(&shape)?;
        self.index.insert(shape.id.clone(), self.shapes.len());
        self.shapes.push(shape);
        Ok(())
    }

    /// Remove a shape that no container references.
    pub fn remove(&mut self, id: &ShapeId) -> Result<ShapeModel, ShapeError> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| ShapeError::ShapeNotFound(id.clone()))?;
        if let Some(parent) = self.shapes.iter().find(|s| s.children.contains(id)) {
            return Err(ShapeError::StillReferenced(id.clone(), parent.id.clone()));
        }
        let removed = self.shapes.remove(pos);
        self.index.remove(id);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Ok(removed)
    }

    pub fn get(&self, id: &ShapeId) -> Option<&ShapeModel> {
        self.index.get(id).map(|&i| &self.shapes[i])
    }

    pub(crate) fn get_mut(&mut self, id: &ShapeId) -> Result<&mut ShapeModel, ShapeError> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.shapes[i]),
            None => Err(ShapeError::ShapeNotFound(id.clone())),
        }
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeModel> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn check_children(&self, shape: &ShapeModel) -> Result<(), ShapeError> {
        if !shape.children.is_empty() && !shape.shape_type.is_container() {
            return Err(ShapeError::NotAContainer(shape.id.clone()));
        }
        for child in &shape.children {
            if !self.contains(child) {
                return Err(ShapeError::DanglingChild {
                    parent: shape.id.clone(),
                    child: child.clone(),
                });
            }
        }
        Ok(())
    }
}
