//! Solver Service
//!
//! Contract for the remote layout solver plus an HTTP client that speaks the
//! solver's form-encoded protocol: `POST /check` answers whether a constraint
//! document is satisfiable, `POST /solve` returns fresh solutions that are not
//! among the explored ones.

use crate::error::SolverError;
use crate::shape::ConstraintDocument;
use crate::solution::{ExploredSolutions, SolutionPayload};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Body of a `generate` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub solutions: Vec<SolutionPayload>,
}

#[async_trait]
pub trait SolverService: Send + Sync {
    /// Whether the constraint set is satisfiable.
    async fn validate(&self, document: &ConstraintDocument) -> Result<bool, SolverError>;

    /// New solutions for the document, excluding the explored ones.
    async fn generate(
        &self,
        document: &ConstraintDocument,
        explored: &ExploredSolutions,
    ) -> Result<GenerateResponse, SolverError>;
}

/// Solver endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_validate_path")]
    pub validate_path: String,
    #[serde(default = "default_generate_path")]
    pub generate_path: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_validate_path() -> String {
    "/check".to_string()
}

fn default_generate_path() -> String {
    "/solve".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            validate_path: default_validate_path(),
            generate_path: default_generate_path(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SolverConfig {
    /// Validate solver settings
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "base_url must start with http:// or https:// (got '{}')",
                self.base_url
            ));
        }
        for (field, path) in [
            ("validate_path", &self.validate_path),
            ("generate_path", &self.generate_path),
        ] {
            if !path.starts_with('/') {
                return Err(format!("{} must start with '/' (got '{}')", field, path));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

// Helper function to map HTTP errors to SolverError
fn map_http_error(error: reqwest::Error) -> SolverError {
    if let Some(status) = error.status() {
        SolverError::Status {
            status: status.as_u16(),
            message: error.to_string(),
        }
    } else if error.is_timeout() {
        SolverError::Transport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        SolverError::Transport(format!("Connection error: {}", error))
    } else {
        SolverError::Transport(format!("HTTP error: {}", error))
    }
}

/// HTTP client for the solver service
pub struct HttpSolverClient {
    client: Client,
    config: SolverConfig,
}

impl HttpSolverClient {
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SolverError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn post_form(&self, path: &str, form: &[(&str, String)]) -> Result<String, SolverError> {
        let url = self.config.url(path);
        debug!(url = %url, "Posting to solver");
        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SolverError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.text().await.map_err(map_http_error)
    }
}

/// The check endpoint answers with Python's boolean text.
fn parse_check_body(body: &str) -> bool {
    body.trim() == "True"
}

fn parse_solve_body(body: &str) -> Result<GenerateResponse, SolverError> {
    serde_json::from_str(body).map_err(|e| SolverError::Malformed(e.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<String, SolverError> {
    serde_json::to_string(value).map_err(|e| SolverError::Malformed(e.to_string()))
}

#[async_trait]
impl SolverService for HttpSolverClient {
    async fn validate(&self, document: &ConstraintDocument) -> Result<bool, SolverError> {
        let elements = encode(document)?;
        let body = self
            .post_form(&self.config.validate_path, &[("elements", elements)])
            .await?;
        Ok(parse_check_body(&body))
    }

    async fn generate(
        &self,
        document: &ConstraintDocument,
        explored: &ExploredSolutions,
    ) -> Result<GenerateResponse, SolverError> {
        let elements = encode(document)?;
        let solutions = encode(explored)?;
        let body = self
            .post_form(
                &self.config.generate_path,
                &[("elements", elements), ("solutions", solutions)],
            )
            .await?;
        parse_solve_body(&body)
    }
}
