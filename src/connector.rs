//! Lifecycle of the connection to the generative-text backend.
//!
//! [`ModelConnector::initialize`] runs exactly once per connector. It walks a
//! priority-ordered list of model identifiers, smoke-testing each one, and
//! adopts the first model that answers. If none of them does, it falls back
//! to the backend's own model listing and repeats the walk over every model
//! that supports generation. A credential rejection at any point ends the
//! walk immediately, since no other model will accept a bad key.
//!
//! After initialization the outcome is frozen: a failed connector keeps
//! failing every [`ModelConnector::generate_text`] call with the recorded
//! error until the process is restarted.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::backend::{BackendError, TextBackend};

/// Shortest API key considered plausible
pub const MIN_API_KEY_LEN: usize = 10;

/// Prompt used to check that a model answers at all
pub const SMOKE_TEST_PROMPT: &str = "Reply with the single word: OK";

/// Models tried first, best first
pub const DEFAULT_CANDIDATE_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro",
    "gemini-pro",
];

/// Snapshot of the connection state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionState {
    pub is_ready: bool,
    pub active_model: Option<String>,
    pub last_error: Option<String>,
}

/// Errors raised by the connector
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectorError {
    /// The API key is missing, implausible, or was rejected by the backend
    #[error("Invalid API credential: {0}")]
    InvalidCredential(String),

    /// No model is available; carries the recorded initialization error
    #[error("Generation backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A ready backend rejected a generation call
    #[error("Generation failed: {0}")]
    Generation(String),
}

const NOT_INITIALIZED: &str = "model connection has not been initialized";

/// Outcome of walking a list of candidate models
enum CandidateWalk {
    Adopted(String),
    CredentialRejected(String),
    Exhausted(Option<String>),
}

/// Owns the backend connection and the adopted model
#[derive(Debug)]
pub struct ModelConnector {
    backend: Arc<dyn TextBackend>,
    candidates: Vec<String>,
    connection: OnceCell<Result<String, ConnectorError>>,
}

impl ModelConnector {
    /// Create a connector that tries `candidates` in order
    pub fn new(backend: Arc<dyn TextBackend>, candidates: Vec<String>) -> Self {
        Self {
            backend,
            candidates,
            connection: OnceCell::new(),
        }
    }

    /// Create a connector with [`DEFAULT_CANDIDATE_MODELS`]
    pub fn with_default_candidates(backend: Arc<dyn TextBackend>) -> Self {
        let candidates = DEFAULT_CANDIDATE_MODELS
            .iter()
            .map(|m| m.to_string())
            .collect();
        Self::new(backend, candidates)
    }

    /// Establish the connection.
    ///
    /// Idempotent: only the first call does any work, concurrent callers wait
    /// for it, and later calls return the recorded outcome.
    pub async fn initialize(&self, api_key: &str) -> ConnectionState {
        self.connection
            .get_or_init(|| self.establish(api_key))
            .await;
        self.status()
    }

    /// Current connection state
    pub fn status(&self) -> ConnectionState {
        match self.connection.get() {
            Some(Ok(model)) => ConnectionState {
                is_ready: true,
                active_model: Some(model.clone()),
                last_error: None,
            },
            Some(Err(err)) => ConnectionState {
                is_ready: false,
                active_model: None,
                last_error: Some(err.to_string()),
            },
            None => ConnectionState {
                is_ready: false,
                active_model: None,
                last_error: Some(NOT_INITIALIZED.to_string()),
            },
        }
    }

    /// Whether a model has been adopted
    pub fn is_ready(&self) -> bool {
        matches!(self.connection.get(), Some(Ok(_)))
    }

    /// The adopted model, if any
    pub fn active_model(&self) -> Option<&str> {
        match self.connection.get() {
            Some(Ok(model)) => Some(model.as_str()),
            _ => None,
        }
    }

    /// Generate text with the adopted model.
    ///
    /// Makes exactly one backend call; failures are reported, never retried.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, ConnectorError> {
        let model = match self.connection.get() {
            Some(Ok(model)) => model,
            Some(Err(err)) => return Err(ConnectorError::BackendUnavailable(err.to_string())),
            None => return Err(ConnectorError::BackendUnavailable(NOT_INITIALIZED.to_string())),
        };

        tracing::debug!(model = %model, prompt_chars = prompt.chars().count(), "Sending generation request");

        self.backend.generate(model, prompt).await.map_err(|e| {
            tracing::warn!(model = %model, error = %e, "Generation call failed");
            ConnectorError::Generation(e.to_string())
        })
    }

    async fn establish(&self, api_key: &str) -> Result<String, ConnectorError> {
        let key = api_key.trim();
        if key.is_empty() {
            tracing::error!("No API key configured; generation is disabled");
            return Err(ConnectorError::InvalidCredential(
                "API key is not set".to_string(),
            ));
        }

        let key_len = key.chars().count();
        if key_len < MIN_API_KEY_LEN {
            tracing::error!(key_len, "API key is implausibly short; generation is disabled");
            return Err(ConnectorError::InvalidCredential(format!(
                "API key is too short ({} characters, expected at least {})",
                key_len, MIN_API_KEY_LEN
            )));
        }

        self.backend
            .configure(key)
            .map_err(|e| ConnectorError::InvalidCredential(e.to_string()))?;

        let mut tried = Vec::new();
        let last_error = match self.try_models(&self.candidates, &mut tried).await {
            CandidateWalk::Adopted(model) => return Ok(model),
            CandidateWalk::CredentialRejected(msg) => return Err(ConnectorError::InvalidCredential(msg)),
            CandidateWalk::Exhausted(last) => last,
        };

        tracing::warn!(
            tried = tried.len(),
            "No preferred model answered; falling back to the backend's model list"
        );

        let listed = match self.backend.list_models().await {
            Ok(models) => models,
            Err(e) if e.is_credential_rejection() => {
                tracing::error!(error = %e, "Model listing rejected the API key");
                return Err(ConnectorError::InvalidCredential(e.to_string()));
            }
            Err(e) => {
                tracing::error!(error = %e, "Model listing failed");
                return Err(ConnectorError::BackendUnavailable(format!(
                    "none of {} candidate models responded and the model list is unavailable: {}",
                    tried.len(),
                    e
                )));
            }
        };

        let fallback: Vec<String> = listed
            .into_iter()
            .filter(|m| m.supports_generation())
            .map(|m| m.id)
            .filter(|id| !tried.contains(id))
            .collect();

        match self.try_models(&fallback, &mut tried).await {
            CandidateWalk::Adopted(model) => Ok(model),
            CandidateWalk::CredentialRejected(msg) => Err(ConnectorError::InvalidCredential(msg)),
            CandidateWalk::Exhausted(last) => {
                let last = last.or(last_error).unwrap_or_else(|| "no models available".to_string());
                tracing::error!(tried = tried.len(), last_error = %last, "No model responded");
                Err(ConnectorError::BackendUnavailable(format!(
                    "no model responded after trying {} models; last error: {}",
                    tried.len(),
                    last
                )))
            }
        }
    }

    /// Smoke-test each model in order; first success wins
    async fn try_models(&self, models: &[String], tried: &mut Vec<String>) -> CandidateWalk {
        let mut last_error = None;

        for model in models {
            tried.push(model.clone());
            tracing::debug!(model = %model, "Trying model");

            match self.smoke_test(model).await {
                Ok(()) => {
                    tracing::info!(model = %model, "Model is ready");
                    return CandidateWalk::Adopted(model.clone());
                }
                Err(e) if e.is_credential_rejection() => {
                    tracing::error!(model = %model, error = %e, "API key was rejected");
                    return CandidateWalk::CredentialRejected(e.to_string());
                }
                Err(e) => {
                    tracing::warn!(model = %model, error = %e, "Model did not respond");
                    last_error = Some(format!("{}: {}", model, e));
                }
            }
        }

        CandidateWalk::Exhausted(last_error)
    }

    async fn smoke_test(&self, model: &str) -> Result<(), BackendError> {
        let reply = self.backend.generate(model, SMOKE_TEST_PROMPT).await?;
        if reply.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(())
    }
}
