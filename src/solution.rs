//! Solutions
//!
//! Concrete layouts returned by the solver service, and the store that tracks
//! which of them the designer has kept, discarded or not yet judged.

use crate::types::{Point, ShapeId, SolutionId, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod links;
pub mod store;

pub use links::SolutionLinks;
pub use store::{Collection, ExploredSolution, ExploredSolutions, SolutionStore};

/// Geometry a solution assigns to one shape.
///
/// Fields the engine does not interpret are kept verbatim so explored
/// solutions are reported back to the solver exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionElement {
    pub name: ShapeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SolutionElement {
    pub fn new(name: impl Into<ShapeId>, location: Point) -> Self {
        Self {
            name: name.into(),
            location: Some(location),
            size: None,
            extra: Map::new(),
        }
    }
}

/// Solution as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionPayload {
    pub id: SolutionId,
    #[serde(default)]
    pub elements: Vec<SolutionElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
}

/// A generated solution with a pristine copy of the elements taken at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    id: SolutionId,
    /// Live copy; linking and highlighting may annotate it.
    pub elements: Vec<SolutionElement>,
    original_elements: Vec<SolutionElement>,
    cost: Option<i64>,
}

impl Solution {
    pub fn new(id: impl Into<SolutionId>, elements: Vec<SolutionElement>) -> Self {
        Self {
            id: id.into(),
            original_elements: elements.clone(),
            elements,
            cost: None,
        }
    }

    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn id(&self) -> &SolutionId {
        &self.id
    }

    pub fn original_elements(&self) -> &[SolutionElement] {
        &self.original_elements
    }

    pub fn cost(&self) -> Option<i64> {
        self.cost
    }

    /// Drop any annotations on the live elements.
    pub fn restore_original(&mut self) {
        self.elements = self.original_elements.clone();
    }

    pub fn element(&self, shape: &ShapeId) -> Option<&SolutionElement> {
        self.elements.iter().find(|e| &e.name == shape)
    }
}

impl From<SolutionPayload> for Solution {
    fn from(payload: SolutionPayload) -> Self {
        let solution = Solution::new(payload.id, payload.elements);
        match payload.cost {
            Some(cost) => solution.with_cost(cost),
            None => solution,
        }
    }
}
