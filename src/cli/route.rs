//! CLI route: single route table and run context. Dispatches to the orchestrator and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_check_result, format_solutions_json, format_solutions_text};
use crate::config::{ConfigLoader, ScoutConfig};
use crate::error::ApiError;
use crate::orchestrator::DesignOrchestrator;
use crate::session::{SessionBus, SessionEvent};
use crate::shape::{RenderedGeometry, ShapeModel, ShapeSet};
use crate::solver::{HttpSolverClient, SolverService};
use crate::types::ShapeId;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::{debug, info};

/// Shapes on a canvas plus whatever geometry the renderer reported for them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Canvas {
    pub shapes: Vec<ShapeModel>,
    #[serde(default)]
    pub geometry: HashMap<ShapeId, RenderedGeometry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CanvasFile {
    Bare(Vec<ShapeModel>),
    Full(Canvas),
}

/// Read a canvas file: either a bare shape array or `{"shapes", "geometry"}`.
pub fn load_canvas(path: &Path) -> Result<Canvas, ApiError> {
    let raw = std::fs::read_to_string(path)?;
    let parsed: CanvasFile = serde_json::from_str(&raw).map_err(|e| {
        ApiError::InvalidInput(format!("{}: {}", path.display(), e))
    })?;
    Ok(match parsed {
        CanvasFile::Bare(shapes) => Canvas {
            shapes,
            geometry: HashMap::new(),
        },
        CanvasFile::Full(canvas) => canvas,
    })
}

/// Runtime context for CLI execution: effective config and the solver client.
pub struct RunContext {
    config: ScoutConfig,
    solver: Arc<dyn SolverService>,
}

impl RunContext {
    /// Load configuration for the workspace (or the explicit file), apply the
    /// solver URL override and build the HTTP solver client.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        solver_url: Option<String>,
    ) -> Result<Self, ApiError> {
        let mut config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        if let Some(url) = solver_url {
            config.solver.base_url = url;
        }
        config.ensure_valid()?;

        let solver = HttpSolverClient::new(config.solver.clone())?;
        Ok(Self::with_solver(config, Arc::new(solver)))
    }

    /// Build a context around an already constructed solver.
    pub fn with_solver(config: ScoutConfig, solver: Arc<dyn SolverService>) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    /// Execute a command and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Config => self.config.to_toml(),
            Commands::Check { shapes } => {
                let rt = tokio::runtime::Runtime::new()?;
                rt.block_on(self.check(shapes))
            }
            Commands::Solve {
                shapes,
                rounds,
                format,
            } => {
                let rt = tokio::runtime::Runtime::new()?;
                rt.block_on(self.solve(shapes, *rounds, format))
            }
        }
    }

    pub async fn check(&self, path: &Path) -> Result<String, ApiError> {
        let (orchestrator, _events) = self.open_canvas(path)?;
        let document = orchestrator.current_document();
        let satisfiable = self.solver.validate(&document).await?;
        info!(satisfiable, shapes = document.shapes.len(), "Checked constraints");
        Ok(format_check_result(satisfiable, document.shapes.len()))
    }

    pub async fn solve(&self, path: &Path, rounds: usize, format: &str) -> Result<String, ApiError> {
        if format != "text" && format != "json" {
            return Err(ApiError::InvalidInput(format!(
                "Unknown output format '{}' (expected text or json)",
                format
            )));
        }
        if rounds == 0 {
            return Err(ApiError::InvalidInput(
                "--rounds must be at least 1".to_string(),
            ));
        }

        let (mut orchestrator, events) = self.open_canvas(path)?;
        for round in 1..=rounds {
            let added = orchestrator.fetch_more_solutions().await?;
            debug!(round, added = added.len(), "Fetch round complete");
            if added.is_empty() {
                info!(round, "Solver returned no new solutions");
                break;
            }
        }
        for event in events.try_iter() {
            debug!(event = ?event, "Session event");
        }

        let pending = orchestrator.store().pending();
        if format == "json" {
            format_solutions_json(pending)
        } else {
            Ok(format_solutions_text(pending))
        }
    }

    fn open_canvas(
        &self,
        path: &Path,
    ) -> Result<(DesignOrchestrator, Receiver<SessionEvent>), ApiError> {
        let canvas = load_canvas(path)?;
        let shapes = ShapeSet::from_shapes(canvas.shapes)?;
        let (bus, events) = SessionBus::new_pair();
        let mut orchestrator = DesignOrchestrator::new(shapes, Arc::clone(&self.solver), bus);
        for (id, geometry) in canvas.geometry {
            orchestrator.record_geometry(id, geometry);
        }
        Ok((orchestrator, events))
    }
}
