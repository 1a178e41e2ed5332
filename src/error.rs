//! Error types for the Scout constraint engine.

use crate::types::{ShapeId, SolutionId};
use thiserror::Error;

/// Shape-set errors. Raised before any mutation takes effect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),

    #[error("Duplicate shape id: {0}")]
    DuplicateShape(ShapeId),

    #[error("Child {child} of {parent} is not in the shape set")]
    DanglingChild { parent: ShapeId, child: ShapeId },

    #[error("Shape {0} is not a container and cannot hold children")]
    NotAContainer(ShapeId),

    #[error("Shape {0} is still referenced as a child of {1}")]
    StillReferenced(ShapeId, ShapeId),

    #[error("Action targets {actual} but the edit was issued for {expected}")]
    TargetMismatch { expected: ShapeId, actual: ShapeId },

    #[error("Shape {0} has edits awaiting validation")]
    AwaitingValidation(ShapeId),
}

/// Solution store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Solution not found in pending: {0}")]
    NotFound(SolutionId),
}

/// Solver service errors
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Solver unreachable: {0}")]
    Transport(String),

    #[error("Solver request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed solver response: {0}")]
    Malformed(String),
}

/// Top-level errors surfaced to callers of the orchestrator and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Solver service unavailable: {0}")]
    ServiceUnavailable(#[from] SolverError),

    #[error("Cannot fetch solutions while {0} validation(s) are outstanding")]
    FetchBlocked(usize),

    #[error("A solution fetch is already in flight")]
    FetchInProgress,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}
