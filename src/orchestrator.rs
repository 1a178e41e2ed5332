//! Design Orchestrator
//!
//! Session-level coordinator. Routes canvas edits into the sync engine, drives
//! solution fetches against the solver, links returned solutions to shapes and
//! keeps the "constraints changed since last fetch" flag.
//!
//! Request handling is split into begin/complete steps so a single-threaded
//! event loop can interleave edits with outstanding requests. The `async`
//! drivers ([`DesignOrchestrator::settle_validations`],
//! [`DesignOrchestrator::fetch_more_solutions`]) chain those steps for callers
//! that simply await the solver.

use crate::error::{ApiError, SolverError, StoreError};
use crate::session::{SessionBus, SessionEvent};
use crate::shape::{
    serialize, ConstraintDocument, GeometrySnapshot, RenderedGeometry, ShapeAction, ShapeModel,
    ShapeSet,
};
use crate::solution::{
    Collection, ExploredSolutions, Solution, SolutionLinks, SolutionStore,
};
use crate::solver::{GenerateResponse, SolverService};
use crate::sync::{Applied, ConstraintSyncEngine, Resolution, ValidationTicket};
use crate::types::{ShapeId, SolutionId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A generate request built from a consistent snapshot of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    /// Engine version when the request was built.
    pub version: u64,
    pub document: ConstraintDocument,
    pub explored: ExploredSolutions,
}

pub struct DesignOrchestrator {
    engine: ConstraintSyncEngine,
    store: SolutionStore,
    links: SolutionLinks,
    geometry: GeometrySnapshot,
    solver: Arc<dyn SolverService>,
    bus: SessionBus,
    constraints_changed: bool,
    fetch_in_flight: bool,
    service_unavailable: bool,
}

impl DesignOrchestrator {
    pub fn new(shapes: ShapeSet, solver: Arc<dyn SolverService>, bus: SessionBus) -> Self {
        Self {
            engine: ConstraintSyncEngine::new(shapes),
            store: SolutionStore::new(),
            links: SolutionLinks::new(),
            geometry: GeometrySnapshot::new(),
            solver,
            bus,
            constraints_changed: false,
            fetch_in_flight: false,
            service_unavailable: false,
        }
    }

    pub fn engine(&self) -> &ConstraintSyncEngine {
        &self.engine
    }

    pub fn shapes(&self) -> &ShapeSet {
        self.engine.shapes()
    }

    pub fn store(&self) -> &SolutionStore {
        &self.store
    }

    /// True while the last validation was rejected.
    pub fn error_shown(&self) -> bool {
        self.engine.error_flag()
    }

    pub fn constraints_changed(&self) -> bool {
        self.constraints_changed
    }

    /// True after a transport failure, until the next successful solver exchange.
    pub fn service_unavailable(&self) -> bool {
        self.service_unavailable
    }

    pub fn solutions_using(&self, shape: &ShapeId) -> &[SolutionId] {
        self.links.solutions_using(shape)
    }

    /// Record live geometry reported by the canvas for one shape.
    pub fn record_geometry(&mut self, id: ShapeId, geometry: RenderedGeometry) {
        self.geometry.insert(id, geometry);
    }

    pub fn forget_geometry(&mut self, id: &ShapeId) {
        self.geometry.remove(id);
    }

    pub fn add_shape(&mut self, shape: ShapeModel) -> Result<(), ApiError> {
        self.engine.add_shape(shape)?;
        self.constraints_changed = true;
        Ok(())
    }

    /// The document the solver would see right now.
    pub fn current_document(&self) -> ConstraintDocument {
        serialize(self.engine.shapes(), &self.geometry)
    }

    // ── Constraint edits ──────────────────────────────────────────────────

    /// Apply a canvas edit. Returns a ticket when its validation can be sent now.
    pub fn on_constraint_edited(
        &mut self,
        shape_id: &ShapeId,
        action: ShapeAction,
        inverse: ShapeAction,
    ) -> Result<Option<ValidationTicket>, ApiError> {
        let Applied {
            version,
            shape_id,
            dispatch,
        } = self.engine.apply(shape_id, action, inverse, &self.geometry)?;

        self.constraints_changed = true;
        self.bus.emit(SessionEvent::ShapeChanged {
            affected_solutions: self.links.solutions_using(&shape_id).to_vec(),
            shape_id,
            version,
        });
        Ok(dispatch)
    }

    /// Feed back the solver's answer for a validation ticket.
    ///
    /// A transport failure rolls the edit back like a rejection and marks the
    /// service unavailable. Returns the next ticket to send, if any.
    pub fn complete_validation(
        &mut self,
        version: u64,
        outcome: Result<bool, SolverError>,
    ) -> Option<ValidationTicket> {
        // a late failure says nothing about the service's current state
        let current = self.engine.in_flight() == Some(version);
        let satisfiable = match outcome {
            Ok(satisfiable) => {
                if current {
                    self.service_unavailable = false;
                }
                satisfiable
            }
            Err(err) if current => {
                warn!(version, error = %err, "Validation request failed");
                self.service_unavailable = true;
                self.bus.emit(SessionEvent::ServiceUnavailable {
                    message: err.to_string(),
                });
                false
            }
            Err(err) => {
                debug!(version, error = %err, "Ignoring failure of a superseded validation");
                false
            }
        };

        match self.engine.resolve(version, satisfiable) {
            Resolution::Committed { version } => {
                self.bus.emit(SessionEvent::ValidationCommitted { version });
            }
            Resolution::RolledBack { version, shape_id } => {
                self.bus.emit(SessionEvent::ShapeChanged {
                    affected_solutions: self.links.solutions_using(&shape_id).to_vec(),
                    shape_id: shape_id.clone(),
                    version: self.engine.version(),
                });
                self.bus
                    .emit(SessionEvent::ValidationRejected { version, shape_id });
            }
            Resolution::Stale { version } => {
                self.bus.emit(SessionEvent::StaleResponseDiscarded { version });
            }
        }

        self.engine.next_dispatch(&self.geometry)
    }

    /// Send `first` and every validation queued behind it, one at a time.
    pub async fn settle_validations(&mut self, first: Option<ValidationTicket>) {
        let mut next = first.or_else(|| self.engine.next_dispatch(&self.geometry));
        while let Some(ticket) = next {
            let outcome = self.solver.validate(&ticket.document).await;
            next = self.complete_validation(ticket.version, outcome);
        }
    }

    /// Apply an edit and await its validation (and any queued behind it).
    pub async fn edit_and_validate(
        &mut self,
        shape_id: &ShapeId,
        action: ShapeAction,
        inverse: ShapeAction,
    ) -> Result<(), ApiError> {
        let ticket = self.on_constraint_edited(shape_id, action, inverse)?;
        self.settle_validations(ticket).await;
        Ok(())
    }

    // ── Solutions ─────────────────────────────────────────────────────────

    /// Build a generate request. Refused while any validation is outstanding,
    /// since the shape state is not settled, or while another fetch is in flight.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket, ApiError> {
        let outstanding = self.engine.outstanding();
        if outstanding > 0 {
            return Err(ApiError::FetchBlocked(outstanding));
        }
        if self.fetch_in_flight {
            return Err(ApiError::FetchInProgress);
        }
        self.fetch_in_flight = true;
        Ok(FetchTicket {
            version: self.engine.version(),
            document: self.current_document(),
            explored: self.store.snapshot(),
        })
    }

    /// Merge a generate response. On failure nothing changes and the caller
    /// gets `ServiceUnavailable`.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<GenerateResponse, SolverError>,
    ) -> Result<Vec<SolutionId>, ApiError> {
        self.fetch_in_flight = false;
        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Solution fetch failed");
                self.service_unavailable = true;
                self.bus.emit(SessionEvent::ServiceUnavailable {
                    message: err.to_string(),
                });
                return Err(ApiError::ServiceUnavailable(err));
            }
        };
        self.service_unavailable = false;

        let solutions: Vec<Solution> = response
            .solutions
            .into_iter()
            .map(Solution::from)
            .collect();
        let added = self.store.add_pending(solutions);

        for id in &added {
            let Some(solution) = self.store.get(id) else {
                continue;
            };
            let unknown = self.links.link(solution, self.engine.shapes());
            if !unknown.is_empty() {
                warn!(
                    solution_id = %id,
                    unknown = ?unknown,
                    "Solution names shapes that are not on the canvas"
                );
            }
        }

        if self.engine.version() == ticket.version {
            self.constraints_changed = false;
        }
        info!(
            added = added.len(),
            pending = self.store.pending().len(),
            "Merged solver solutions"
        );
        self.bus
            .emit(SessionEvent::SolutionsAdded { ids: added.clone() });
        Ok(added)
    }

    /// Ask the solver for more solutions under the current constraints.
    pub async fn fetch_more_solutions(&mut self) -> Result<Vec<SolutionId>, ApiError> {
        let ticket = self.begin_fetch()?;
        let outcome = self
            .solver
            .generate(&ticket.document, &ticket.explored)
            .await;
        self.complete_fetch(&ticket, outcome)
    }

    pub fn save_solution(&mut self, id: &SolutionId) -> Result<(), StoreError> {
        self.store.move_to_saved(id)
    }

    pub fn trash_solution(&mut self, id: &SolutionId) -> Result<(), StoreError> {
        self.store.move_to_trashed(id)
    }

    pub fn collection_of(&self, id: &SolutionId) -> Option<Collection> {
        self.store.collection_of(id)
    }
}
