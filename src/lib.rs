//! Scout: Constraint Synchronization and Solution Lifecycle
//!
//! Keeps a designer's constraint shapes in sync with a remote layout solver and
//! tracks the concrete layouts it generates as they are kept, discarded or left
//! pending.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod session;
pub mod shape;
pub mod solution;
pub mod solver;
pub mod sync;
pub mod types;

pub use orchestrator::{DesignOrchestrator, FetchTicket};
pub use shape::{ShapeAction, ShapeModel, ShapeSet, ShapeType};
pub use solution::{Solution, SolutionStore};
pub use solver::{HttpSolverClient, SolverService};
pub use sync::ConstraintSyncEngine;
