//! In-process session event bus.
//!
//! The engine and orchestrator report state changes here; the UI drains the
//! receiver to re-render. Emitting after the receiver is gone is not an error.

use crate::types::{ShapeId, SolutionId};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    ShapeChanged {
        shape_id: ShapeId,
        version: u64,
        affected_solutions: Vec<SolutionId>,
    },
    ValidationCommitted {
        version: u64,
    },
    ValidationRejected {
        version: u64,
        shape_id: ShapeId,
    },
    StaleResponseDiscarded {
        version: u64,
    },
    ServiceUnavailable {
        message: String,
    },
    SolutionsAdded {
        ids: Vec<SolutionId>,
    },
}

#[derive(Clone)]
pub struct SessionBus {
    sender: Sender<SessionEvent>,
}

impl SessionBus {
    pub fn new_pair() -> (Self, Receiver<SessionEvent>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: SessionEvent) {
        if let Err(err) = self.sender.send(event) {
            debug!(event = ?err.0, "Session event dropped; no listener");
        }
    }
}
