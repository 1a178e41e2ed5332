//! Solution Store
//!
//! Owns the pending, saved and trashed collections. A solution id lives in
//! exactly one of them; pending entries keep their arrival order.

use crate::error::StoreError;
use crate::solution::{Solution, SolutionElement};
use crate::types::SolutionId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Pending,
    Saved,
    Trashed,
}

/// An already-returned solution as reported back to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploredSolution {
    pub id: SolutionId,
    pub elements: Vec<SolutionElement>,
}

/// Explored solutions per collection. Pending goes out as `designs`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExploredSolutions {
    pub designs: Vec<ExploredSolution>,
    pub saved: Vec<ExploredSolution>,
    pub trashed: Vec<ExploredSolution>,
}

impl ExploredSolutions {
    pub fn len(&self) -> usize {
        self.designs.len() + self.saved.len() + self.trashed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct SolutionStore {
    pending: Vec<Solution>,
    saved: Vec<Solution>,
    trashed: Vec<Solution>,
    membership: HashMap<SolutionId, Collection>,
}

impl SolutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append new solutions to pending. Ids already known anywhere are skipped.
    ///
    /// Returns the ids actually added, in order.
    pub fn add_pending(&mut self, solutions: Vec<Solution>) -> Vec<SolutionId> {
        let mut added = Vec::new();
        for solution in solutions {
            if let Some(existing) = self.membership.get(solution.id()) {
                debug!(
                    solution_id = %solution.id(),
                    collection = ?existing,
                    "Skipping already explored solution"
                );
                continue;
            }
            self.membership
                .insert(solution.id().clone(), Collection::Pending);
            added.push(solution.id().clone());
            self.pending.push(solution);
        }
        added
    }

    pub fn move_to_saved(&mut self, id: &SolutionId) -> Result<(), StoreError> {
        self.move_from_pending(id, Collection::Saved)
    }

    pub fn move_to_trashed(&mut self, id: &SolutionId) -> Result<(), StoreError> {
        self.move_from_pending(id, Collection::Trashed)
    }

    fn move_from_pending(&mut self, id: &SolutionId, target: Collection) -> Result<(), StoreError> {
        if self.membership.get(id) != Some(&Collection::Pending) {
            return Err(StoreError::NotFound(id.clone()));
        }
        let pos = self
            .pending
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let solution = self.pending.remove(pos);
        self.list_mut(target).push(solution);
        self.membership.insert(id.clone(), target);
        debug!(solution_id = %id, collection = ?target, "Moved solution out of pending");
        Ok(())
    }

    fn list_mut(&mut self, collection: Collection) -> &mut Vec<Solution> {
        match collection {
            Collection::Pending => &mut self.pending,
            Collection::Saved => &mut self.saved,
            Collection::Trashed => &mut self.trashed,
        }
    }

    /// Every solution returned so far, with its pristine elements.
    pub fn snapshot(&self) -> ExploredSolutions {
        fn explored(list: &[Solution]) -> Vec<ExploredSolution> {
            list.iter()
                .map(|s| ExploredSolution {
                    id: s.id().clone(),
                    elements: s.original_elements().to_vec(),
                })
                .collect()
        }

        ExploredSolutions {
            designs: explored(&self.pending),
            saved: explored(&self.saved),
            trashed: explored(&self.trashed),
        }
    }

    pub fn collection_of(&self, id: &SolutionId) -> Option<Collection> {
        self.membership.get(id).copied()
    }

    pub fn get(&self, id: &SolutionId) -> Option<&Solution> {
        let list = match self.collection_of(id)? {
            Collection::Pending => &self.pending,
            Collection::Saved => &self.saved,
            Collection::Trashed => &self.trashed,
        };
        list.iter().find(|s| s.id() == id)
    }

    pub fn pending(&self) -> &[Solution] {
        &self.pending
    }

    pub fn saved(&self) -> &[Solution] {
        &self.saved
    }

    pub fn trashed(&self) -> &[Solution] {
        &self.trashed
    }

    /// (pending, saved, trashed)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.pending.len(), self.saved.len(), self.trashed.len())
    }

    pub fn len(&self) -> usize {
        self.membership.len()
    }

    pub fn is_empty(&self) -> bool {
        self.membership.is_empty()
    }
}
