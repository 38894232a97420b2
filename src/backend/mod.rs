//! Generative-text backends.
//!
//! This module defines the [`TextBackend`] trait the model connector drives.
//! The production implementation talks to Google's Generative Language API
//! ([`GeminiBackend`]); [`MockBackend`] scripts responses for tests.
//!
//! A backend is configured once with an API key and then serves two kinds of
//! calls: one-shot text generation against a named model, and a listing of
//! the models the key can reach together with their [`ModelCapabilities`].

mod gemini;
pub mod mock;

pub use gemini::{GeminiBackend, GEMINI_API_BASE};
pub use mock::MockBackend;

use async_trait::async_trait;

bitflags::bitflags! {
    /// Generation methods a model supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModelCapabilities: u32 {
        const GENERATE_CONTENT = 1 << 0;
        const STREAM_GENERATE_CONTENT = 1 << 1;
        const COUNT_TOKENS = 1 << 2;
        const EMBED_CONTENT = 1 << 3;
    }
}

impl ModelCapabilities {
    /// Map a backend method name (e.g. `generateContent`) to its flag
    pub fn from_method(method: &str) -> Self {
        match method {
            "generateContent" => Self::GENERATE_CONTENT,
            "streamGenerateContent" => Self::STREAM_GENERATE_CONTENT,
            "countTokens" => Self::COUNT_TOKENS,
            "embedContent" | "batchEmbedContents" => Self::EMBED_CONTENT,
            _ => Self::empty(),
        }
    }
}

/// A model advertised by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Identifier usable with [`TextBackend::generate`] (no `models/` prefix)
    pub id: String,

    pub display_name: Option<String>,

    pub capabilities: ModelCapabilities,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>, capabilities: ModelCapabilities) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            capabilities,
        }
    }

    /// Whether the model can serve one-shot generation
    pub fn supports_generation(&self) -> bool {
        self.capabilities
            .contains(ModelCapabilities::GENERATE_CONTENT)
    }
}

/// Interface to a generative-text service
#[async_trait]
pub trait TextBackend: Send + Sync + std::fmt::Debug {
    /// Short identifier of the backend (e.g. "gemini")
    fn id(&self) -> &str;

    /// Install the API key used for subsequent calls
    fn configure(&self, api_key: &str) -> Result<(), BackendError>;

    /// Generate text for `prompt` with the model `model`
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, BackendError>;

    /// List every model the configured key can reach
    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError>;
}

/// Errors reported by a backend
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// No API key has been configured
    #[error("Backend has no API key configured")]
    NotConfigured,

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Error payload returned by the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The model answered with no text
    #[error("Model returned an empty response")]
    EmptyResponse,
}

impl BackendError {
    /// Whether the failure indicates the credential itself was rejected.
    ///
    /// Matches `api_key`, `invalid` or `authentication` anywhere in the
    /// message, case-insensitively.
    pub fn is_credential_rejection(&self) -> bool {
        let message = self.to_string().to_lowercase();
        ["api_key", "invalid", "authentication"]
            .iter()
            .any(|pattern| message.contains(pattern))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::MalformedResponse(format!("JSON: {}", err))
    }
}
