//! Shape-to-solution links, used to tell which solutions an edit touches.

use crate::shape::ShapeSet;
use crate::solution::Solution;
use crate::types::{ShapeId, SolutionId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SolutionLinks {
    by_shape: HashMap<ShapeId, Vec<SolutionId>>,
}

impl SolutionLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link every element of `solution` to its shape. Returns element names
    /// that match no shape in `shapes`; those stay unlinked.
    pub fn link(&mut self, solution: &Solution, shapes: &ShapeSet) -> Vec<ShapeId> {
        let mut unknown = Vec::new();
        for element in &solution.elements {
            if !shapes.contains(&element.name) {
                unknown.push(element.name.clone());
                continue;
            }
            let linked = self.by_shape.entry(element.name.clone()).or_default();
            if !linked.contains(solution.id()) {
                linked.push(solution.id().clone());
            }
        }
        unknown
    }

    pub fn solutions_using(&self, shape: &ShapeId) -> &[SolutionId] {
        self.by_shape.get(shape).map(Vec::as_slice).unwrap_or(&[])
    }
}
