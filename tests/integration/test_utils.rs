//! Shared test utilities for integration tests
//!
//! A scripted solver that answers from queues and records what it was asked,
//! plus environment isolation for config tests.

use async_trait::async_trait;
use scout::error::SolverError;
use scout::shape::{ConstraintDocument, ShapeModel, ShapeSet, ShapeType};
use scout::solution::{ExploredSolutions, SolutionElement, SolutionPayload};
use scout::solver::{GenerateResponse, SolverService};
use scout::types::Point;
use std::collections::VecDeque;
use std::sync::Mutex;
use tempfile::TempDir;

/// Solver double. Empty queues answer "satisfiable" and "no solutions".
#[derive(Default)]
pub struct ScriptedSolver {
    validations: Mutex<VecDeque<Result<bool, SolverError>>>,
    generations: Mutex<VecDeque<Result<GenerateResponse, SolverError>>>,
    pub validate_calls: Mutex<Vec<ConstraintDocument>>,
    pub generate_calls: Mutex<Vec<(ConstraintDocument, ExploredSolutions)>>,
}

impl ScriptedSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_validation(&self, outcome: Result<bool, SolverError>) {
        self.validations.lock().unwrap().push_back(outcome);
    }

    pub fn push_generation(&self, outcome: Result<GenerateResponse, SolverError>) {
        self.generations.lock().unwrap().push_back(outcome);
    }

    pub fn push_solutions(&self, ids: &[&str]) {
        self.push_generation(Ok(response(ids)));
    }

    pub fn generate_call_count(&self) -> usize {
        self.generate_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SolverService for ScriptedSolver {
    async fn validate(&self, document: &ConstraintDocument) -> Result<bool, SolverError> {
        self.validate_calls.lock().unwrap().push(document.clone());
        self.validations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(true))
    }

    async fn generate(
        &self,
        document: &ConstraintDocument,
        explored: &ExploredSolutions,
    ) -> Result<GenerateResponse, SolverError> {
        self.generate_calls
            .lock()
            .unwrap()
            .push((document.clone(), explored.clone()));
        self.generations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GenerateResponse::default()))
    }
}

/// A generate response with one solution per id, each placing `t1` and `f1`.
pub fn response(ids: &[&str]) -> GenerateResponse {
    GenerateResponse {
        solutions: ids
            .iter()
            .enumerate()
            .map(|(i, id)| SolutionPayload {
                id: (*id).into(),
                elements: vec![
                    SolutionElement::new("t1", Point::new(10.0, 10.0 * i as f64)),
                    SolutionElement::new("f1", Point::new(10.0, 60.0)),
                ],
                cost: Some(i as i64),
            })
            .collect(),
    }
}

/// A small canvas: a group holding a title text and a field.
pub fn sample_shapes() -> ShapeSet {
    ShapeSet::from_shapes(vec![
        ShapeModel::new("g1", ShapeType::Group, "").with_children(["t1", "f1"]),
        ShapeModel::new("t1", ShapeType::Text, "A"),
        ShapeModel::new("f1", ShapeType::Field, "Email"),
        ShapeModel::new("b1", ShapeType::Button, "Submit"),
    ])
    .unwrap()
}

static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: [&str; 5] = [
    "HOME",
    "XDG_CONFIG_HOME",
    "SCOUT_ENV",
    "SCOUT__SOLVER__BASE_URL",
    "SCOUT__LOGGING__LEVEL",
];

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into a fresh temp dir and
/// SCOUT overrides cleared. Restores the environment afterwards.
pub fn with_isolated_env<F, R>(f: F) -> R
where
    F: FnOnce(&TempDir) -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = ISOLATED_VARS
        .iter()
        .map(|key| (*key, std::env::var(key).ok()))
        .collect();

    let temp_dir = TempDir::new().unwrap();
    let home = temp_dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    for key in ISOLATED_VARS {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", &home);
    std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&temp_dir)));

    for (key, value) in saved {
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }

    match result {
        Ok(r) => r,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
