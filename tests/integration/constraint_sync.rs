//! Edits flowing through the orchestrator: optimistic apply, queued validation,
//! rollback on rejection and the events the UI sees.

use super::test_utils::{sample_shapes, ScriptedSolver};
use scout::error::{ApiError, ShapeError, SolverError};
use scout::session::{SessionBus, SessionEvent};
use scout::shape::{RenderedElement, RenderedGeometry, ShapeAction};
use scout::sync::{EngineState, MutationPhase};
use scout::types::{ShapeId, Size};
use scout::DesignOrchestrator;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

fn session(solver: Arc<ScriptedSolver>) -> (DesignOrchestrator, Receiver<SessionEvent>) {
    let (bus, events) = SessionBus::new_pair();
    (DesignOrchestrator::new(sample_shapes(), solver, bus), events)
}

fn set_label(shape: &str, label: &str) -> ShapeAction {
    ShapeAction::SetLabel {
        shape: shape.into(),
        label: label.to_string(),
    }
}

fn label_of(orchestrator: &DesignOrchestrator, shape: &str) -> String {
    orchestrator
        .shapes()
        .get(&ShapeId::from(shape))
        .unwrap()
        .label
        .clone()
}

#[test]
fn test_field_serializes_with_underline_geometry() {
    let solver = Arc::new(ScriptedSolver::new());
    let (mut orchestrator, _events) = session(solver);
    orchestrator.record_geometry(
        ShapeId::from("f1"),
        RenderedGeometry::new(RenderedElement::new(20.0, 100.0, 60.0, 16.0))
            .with_underline(RenderedElement::new(20.0, 140.0, 180.0, 2.0)),
    );

    let document = orchestrator.current_document();
    let field = document.get(&ShapeId::from("f1")).unwrap();
    assert_eq!(field.size, Some(Size::new(180, 40)));
    assert_eq!(field.location.map(|p| (p.x, p.y)), Some((20.0, 100.0)));

    // shapes the canvas has not rendered carry no geometry
    let button = document.get(&ShapeId::from("b1")).unwrap();
    assert!(button.location.is_none());
    assert!(button.size.is_none());
}

#[tokio::test]
async fn test_rejected_label_edit_rolls_back() {
    let solver = Arc::new(ScriptedSolver::new());
    solver.push_validation(Ok(false));
    let (mut orchestrator, events) = session(Arc::clone(&solver));

    orchestrator
        .edit_and_validate(&ShapeId::from("t1"), set_label("t1", "B"), set_label("t1", "A"))
        .await
        .unwrap();

    assert_eq!(label_of(&orchestrator, "t1"), "A");
    assert!(orchestrator.error_shown());
    assert_eq!(orchestrator.engine().phase(1), Some(MutationPhase::RolledBack));

    // the solver saw the optimistic label
    let sent = solver.validate_calls.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].get(&ShapeId::from("t1")).unwrap().label, "B");

    let events: Vec<SessionEvent> = events.try_iter().collect();
    assert!(events.contains(&SessionEvent::ValidationRejected {
        version: 1,
        shape_id: ShapeId::from("t1"),
    }));
    assert!(matches!(
        events.first(),
        Some(SessionEvent::ShapeChanged { version: 1, .. })
    ));
}

#[tokio::test]
async fn test_accepted_edit_commits_and_clears_error() {
    let solver = Arc::new(ScriptedSolver::new());
    solver.push_validation(Ok(false));
    solver.push_validation(Ok(true));
    let (mut orchestrator, _events) = session(solver);

    orchestrator
        .edit_and_validate(&ShapeId::from("t1"), set_label("t1", "B"), set_label("t1", "A"))
        .await
        .unwrap();
    assert!(orchestrator.error_shown());

    orchestrator
        .edit_and_validate(&ShapeId::from("t1"), set_label("t1", "C"), set_label("t1", "A"))
        .await
        .unwrap();
    assert_eq!(label_of(&orchestrator, "t1"), "C");
    assert!(!orchestrator.error_shown());
    assert_eq!(orchestrator.engine().phase(2), Some(MutationPhase::Committed));
}

#[test]
fn test_validations_are_serialized_in_fifo_order() {
    let solver = Arc::new(ScriptedSolver::new());
    let (mut orchestrator, _events) = session(solver);

    let first = orchestrator
        .on_constraint_edited(&ShapeId::from("t1"), set_label("t1", "B"), set_label("t1", "A"))
        .unwrap()
        .expect("idle engine dispatches at once");
    let second = orchestrator
        .on_constraint_edited(
            &ShapeId::from("b1"),
            set_label("b1", "Go"),
            set_label("b1", "Submit"),
        )
        .unwrap();
    assert!(second.is_none());
    assert_eq!(
        orchestrator.engine().state(),
        EngineState::Validating {
            version: 1,
            queued: 1
        }
    );
    // both edits are visible immediately
    assert_eq!(label_of(&orchestrator, "b1"), "Go");

    let next = orchestrator
        .complete_validation(first.version, Ok(true))
        .expect("queued edit dispatched next");
    assert_eq!(next.version, 2);
    // carries the committed edit and its own
    assert_eq!(next.document.get(&ShapeId::from("t1")).unwrap().label, "B");
    assert_eq!(next.document.get(&ShapeId::from("b1")).unwrap().label, "Go");

    assert!(orchestrator.complete_validation(2, Ok(true)).is_none());
    assert_eq!(orchestrator.engine().state(), EngineState::Idle);
}

#[test]
fn test_rejection_keeps_newer_edit_on_other_shape() {
    let solver = Arc::new(ScriptedSolver::new());
    let (mut orchestrator, _events) = session(solver);

    orchestrator
        .on_constraint_edited(&ShapeId::from("t1"), set_label("t1", "B"), set_label("t1", "A"))
        .unwrap();
    orchestrator
        .on_constraint_edited(
            &ShapeId::from("b1"),
            set_label("b1", "Go"),
            set_label("b1", "Submit"),
        )
        .unwrap();

    let next = orchestrator.complete_validation(1, Ok(false));
    assert_eq!(label_of(&orchestrator, "t1"), "A");
    assert_eq!(label_of(&orchestrator, "b1"), "Go");
    let next = next.expect("newer edit still needs validation");
    assert_eq!(next.version, 2);
    assert_eq!(next.document.get(&ShapeId::from("t1")).unwrap().label, "A");
}

#[test]
fn test_queued_edit_is_judged_on_its_own_prefix() {
    let solver = Arc::new(ScriptedSolver::new());
    let (mut orchestrator, _events) = session(solver);

    let first = orchestrator
        .on_constraint_edited(&ShapeId::from("t1"), set_label("t1", "ok1"), set_label("t1", "A"))
        .unwrap()
        .unwrap();
    orchestrator
        .on_constraint_edited(&ShapeId::from("f1"), set_label("f1", "ok2"), set_label("f1", "Email"))
        .unwrap();
    orchestrator
        .on_constraint_edited(&ShapeId::from("b1"), set_label("b1", "bad"), set_label("b1", "Submit"))
        .unwrap();

    // the solver rejects any document that contains a "bad" label
    let mut next = Some(first);
    while let Some(ticket) = next {
        let ok = ticket.document.shapes.iter().all(|s| s.label != "bad");
        next = orchestrator.complete_validation(ticket.version, Ok(ok));
    }

    assert_eq!(label_of(&orchestrator, "t1"), "ok1");
    assert_eq!(label_of(&orchestrator, "f1"), "ok2");
    assert_eq!(label_of(&orchestrator, "b1"), "Submit");
    assert_eq!(orchestrator.engine().phase(2), Some(MutationPhase::Committed));
    assert_eq!(orchestrator.engine().phase(3), Some(MutationPhase::RolledBack));
}

#[test]
fn test_stale_verdict_is_discarded() {
    let solver = Arc::new(ScriptedSolver::new());
    let (mut orchestrator, events) = session(solver);

    orchestrator
        .on_constraint_edited(&ShapeId::from("t1"), set_label("t1", "B"), set_label("t1", "A"))
        .unwrap();
    assert!(orchestrator.complete_validation(7, Ok(false)).is_none());

    assert_eq!(label_of(&orchestrator, "t1"), "B");
    assert_eq!(orchestrator.engine().in_flight(), Some(1));
    assert!(events
        .try_iter()
        .any(|e| e == SessionEvent::StaleResponseDiscarded { version: 7 }));
}

#[test]
fn test_transport_failure_rolls_back_and_reports() {
    let solver = Arc::new(ScriptedSolver::new());
    let (mut orchestrator, events) = session(solver);

    orchestrator
        .on_constraint_edited(&ShapeId::from("t1"), set_label("t1", "B"), set_label("t1", "A"))
        .unwrap();
    orchestrator.complete_validation(
        1,
        Err(SolverError::Transport("connection refused".to_string())),
    );

    assert_eq!(label_of(&orchestrator, "t1"), "A");
    assert!(orchestrator.service_unavailable());
    assert!(events
        .try_iter()
        .any(|e| matches!(e, SessionEvent::ServiceUnavailable { .. })));
}

#[test]
fn test_stale_transport_failure_is_ignored() {
    let solver = Arc::new(ScriptedSolver::new());
    let (mut orchestrator, events) = session(solver);

    orchestrator
        .on_constraint_edited(&ShapeId::from("t1"), set_label("t1", "B"), set_label("t1", "A"))
        .unwrap();
    orchestrator.complete_validation(
        99,
        Err(SolverError::Transport("connection reset".to_string())),
    );

    assert_eq!(label_of(&orchestrator, "t1"), "B");
    assert!(!orchestrator.service_unavailable());
    let events: Vec<SessionEvent> = events.try_iter().collect();
    assert!(!events
        .iter()
        .any(|e| matches!(e, SessionEvent::ServiceUnavailable { .. })));
    assert!(events.contains(&SessionEvent::StaleResponseDiscarded { version: 99 }));

    // a late failure must not mask a later success either
    orchestrator.complete_validation(1, Ok(true));
    assert!(!orchestrator.service_unavailable());
}

#[test]
fn test_invalid_edit_changes_nothing() {
    let solver = Arc::new(ScriptedSolver::new());
    let (mut orchestrator, events) = session(solver);
    let before = orchestrator.shapes().clone();

    let err = orchestrator
        .on_constraint_edited(
            &ShapeId::from("b1"),
            ShapeAction::AddChild {
                shape: "b1".into(),
                child: "t1".into(),
                position: 0,
            },
            ShapeAction::RemoveChild {
                shape: "b1".into(),
                child: "t1".into(),
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Shape(ShapeError::NotAContainer(_))
    ));
    assert_eq!(orchestrator.shapes(), &before);
    assert_eq!(orchestrator.engine().version(), 0);
    assert!(!orchestrator.constraints_changed());
    assert!(events.try_iter().next().is_none());
}
