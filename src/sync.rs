//! Constraint Synchronization Engine
//!
//! Applies shape edits optimistically and reconciles them with the solver's
//! verdict. Each edit moves through:
//!
//! ```text
//! Applying -> Queued -> Validating -> Committed
//!                                  \-> RolledBack
//! ```
//!
//! At most one validation is in flight. Later edits are applied at once but
//! their validation waits in FIFO order. Each validation document is
//! serialized when its request is dispatched, from the state with only that
//! edit and the ones before it applied. The engine does no I/O:
//! callers send the [`ValidationTicket`]s it hands out and feed the verdict
//! back through [`ConstraintSyncEngine::resolve`].

use crate::error::ShapeError;
use crate::shape::{serialize, ConstraintDocument, GeometrySnapshot, ShapeAction, ShapeModel, ShapeSet};
use crate::types::ShapeId;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, error, warn};

/// Resolved edits whose phase stays queryable through [`ConstraintSyncEngine::phase`].
pub const RESOLVED_HISTORY: usize = 256;

/// Lifecycle phase of one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Applied locally, waiting behind an in-flight validation.
    Queued,
    /// Its validation request is in flight.
    Validating,
    Committed,
    RolledBack,
}

/// Engine-level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Validating { version: u64, queued: usize },
}

/// A validation request ready to be sent to the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationTicket {
    /// Version of the edit this request validates.
    pub version: u64,
    pub document: ConstraintDocument,
}

/// Result of applying an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub version: u64,
    pub shape_id: ShapeId,
    /// Present when the engine was idle and this edit's validation can go out now.
    pub dispatch: Option<ValidationTicket>,
}

/// Result of feeding a solver verdict back.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Committed { version: u64 },
    RolledBack { version: u64, shape_id: ShapeId },
    /// The verdict does not belong to the in-flight request and was ignored.
    Stale { version: u64 },
}

#[derive(Debug)]
struct PendingMutation {
    version: u64,
    shape_id: ShapeId,
    action: ShapeAction,
    inverse: ShapeAction,
}

#[derive(Debug, Default)]
pub struct ConstraintSyncEngine {
    shapes: ShapeSet,
    version: u64,
    outstanding: VecDeque<PendingMutation>,
    in_flight: Option<u64>,
    /// Phases of the most recently resolved edits, oldest evicted first.
    resolved: BTreeMap<u64, MutationPhase>,
    error_flag: bool,
}

impl ConstraintSyncEngine {
    pub fn new(shapes: ShapeSet) -> Self {
        Self {
            shapes,
            ..Self::default()
        }
    }

    pub fn shapes(&self) -> &ShapeSet {
        &self.shapes
    }

    /// Version of the most recent applied edit. Zero before any edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn state(&self) -> EngineState {
        match self.in_flight {
            Some(version) => EngineState::Validating {
                version,
                queued: self.outstanding.len().saturating_sub(1),
            },
            None => EngineState::Idle,
        }
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Edits applied locally whose validation has not resolved.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub fn error_flag(&self) -> bool {
        self.error_flag
    }

    pub fn clear_error(&mut self) {
        self.error_flag = false;
    }

    /// Phase of an edit. `None` for unknown versions and for resolved edits
    /// older than the last [`RESOLVED_HISTORY`].
    pub fn phase(&self, version: u64) -> Option<MutationPhase> {
        if let Some(phase) = self.resolved.get(&version) {
            return Some(*phase);
        }
        self.outstanding
            .iter()
            .find(|m| m.version == version)
            .map(|m| {
                if self.in_flight == Some(m.version) {
                    MutationPhase::Validating
                } else {
                    MutationPhase::Queued
                }
            })
    }

    /// Add a shape dropped from the palette. Not validated.
    pub fn add_shape(&mut self, shape: ShapeModel) -> Result<(), ShapeError> {
        self.shapes.insert(shape)
    }

    /// Remove a shape no container references and no outstanding edit touches.
    pub fn remove_shape(&mut self, id: &ShapeId) -> Result<ShapeModel, ShapeError> {
        let touched = self
            .outstanding
            .iter()
            .any(|m| m.action.mentions(id) || m.inverse.mentions(id));
        if touched {
            return Err(ShapeError::AwaitingValidation(id.clone()));
        }
        self.shapes.remove(id)
    }

    /// Apply an edit optimistically and queue its validation.
    ///
    /// Nothing changes when the action cannot apply.
    pub fn apply(
        &mut self,
        shape_id: &ShapeId,
        action: ShapeAction,
        inverse: ShapeAction,
        geometry: &GeometrySnapshot,
    ) -> Result<Applied, ShapeError> {
        for candidate in [&action, &inverse] {
            if candidate.target() != shape_id {
                return Err(ShapeError::TargetMismatch {
                    expected: shape_id.clone(),
                    actual: candidate.target().clone(),
                });
            }
        }

        action.apply(&mut self.shapes)?;
        self.version += 1;
        let version = self.version;
        debug!(version, shape_id = %shape_id, ?action, "Applied constraint edit");

        self.outstanding.push_back(PendingMutation {
            version,
            shape_id: shape_id.clone(),
            action,
            inverse,
        });

        Ok(Applied {
            version,
            shape_id: shape_id.clone(),
            dispatch: self.next_dispatch(geometry),
        })
    }

    /// Ticket for the oldest queued edit, if nothing is in flight.
    pub fn next_dispatch(&mut self, geometry: &GeometrySnapshot) -> Option<ValidationTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        let version = self.outstanding.front()?.version;
        self.in_flight = Some(version);
        debug!(version, queued = self.outstanding.len() - 1, "Dispatching validation");
        Some(ValidationTicket {
            version,
            document: self.document_as_of_front(geometry),
        })
    }

    /// Serialize the shapes as they stand with only the oldest outstanding edit
    /// applied on top of the committed state. Newer queued edits are rewound on
    /// a copy so each verdict judges its own edit.
    fn document_as_of_front(&self, geometry: &GeometrySnapshot) -> ConstraintDocument {
        if self.outstanding.len() <= 1 {
            return serialize(&self.shapes, geometry);
        }
        let mut snapshot = self.shapes.clone();
        for newer in self.outstanding.iter().skip(1).rev() {
            if let Err(e) = newer.inverse.apply(&mut snapshot) {
                error!(version = newer.version, error = %e, "Failed to rewind queued edit for snapshot");
            }
        }
        serialize(&snapshot, geometry)
    }

    /// Feed back the solver verdict for the request tagged `version`.
    pub fn resolve(&mut self, version: u64, satisfiable: bool) -> Resolution {
        if self.in_flight != Some(version) {
            warn!(
                version,
                in_flight = ?self.in_flight,
                "Discarding stale validation response"
            );
            return Resolution::Stale { version };
        }
        self.in_flight = None;

        let Some(mutation) = self.outstanding.pop_front() else {
            return Resolution::Stale { version };
        };

        if satisfiable {
            self.error_flag = false;
            self.record_phase(version, MutationPhase::Committed);
            debug!(version, "Constraint edit committed");
            return Resolution::Committed { version };
        }

        self.compensate(&mutation);
        self.error_flag = true;
        self.record_phase(version, MutationPhase::RolledBack);
        warn!(
            version,
            shape_id = %mutation.shape_id,
            newer = self.outstanding.len(),
            "Constraint edit rejected; rolled back"
        );
        Resolution::RolledBack {
            version,
            shape_id: mutation.shape_id,
        }
    }

    fn record_phase(&mut self, version: u64, phase: MutationPhase) {
        self.resolved.insert(version, phase);
        while self.resolved.len() > RESOLVED_HISTORY {
            self.resolved.pop_first();
        }
    }

    /// Undo `rejected` without clobbering newer edits applied on top of it:
    /// rewind the newer edits, undo the rejected one, replay the newer ones.
    ///
    /// Replayed edits get their inverse recomputed against the state they now
    /// apply to, so a later rejection restores a state without `rejected`.
    fn compensate(&mut self, rejected: &PendingMutation) {
        for newer in self.outstanding.iter().rev() {
            if let Err(e) = newer.inverse.apply(&mut self.shapes) {
                error!(version = newer.version, error = %e, "Failed to rewind newer edit");
            }
        }
        if let Err(e) = rejected.inverse.apply(&mut self.shapes) {
            error!(version = rejected.version, error = %e, "Failed to apply inverse action");
        }
        for newer in self.outstanding.iter_mut() {
            if let Ok(inverse) = newer.action.inverse_against(&self.shapes) {
                newer.inverse = inverse;
            }
            if let Err(e) = newer.action.apply(&mut self.shapes) {
                error!(version = newer.version, error = %e, "Failed to replay newer edit");
            }
        }
    }
}

impl ShapeAction {
    /// Whether this action touches `id` as target or child.
    pub fn mentions(&self, id: &ShapeId) -> bool {
        if self.target() == id {
            return true;
        }
        match self {
            ShapeAction::AddChild { child, .. } | ShapeAction::RemoveChild { child, .. } => {
                child == id
            }
            _ => false,
        }
    }
}
