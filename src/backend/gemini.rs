//! Google Gemini backend (Generative Language REST API, API-key auth).

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;

use super::{BackendError, ModelCapabilities, ModelInfo, TextBackend};
use crate::utils::HttpClient;

/// Default base URL of the Generative Language API
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const MODELS_PAGE_SIZE: u32 = 1000;

/// Gemini backend
#[derive(Debug)]
pub struct GeminiBackend {
    http: HttpClient,
    base_url: String,
    api_key: RwLock<Option<String>>,
}

impl GeminiBackend {
    /// Create a backend against the public API with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self, BackendError> {
        Self::with_base_url(GEMINI_API_BASE, timeout)
    }

    /// Create a backend against a custom base URL (proxies, tests)
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            http: HttpClient::new(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: RwLock::new(None),
        })
    }

    fn api_key(&self) -> Result<String, BackendError> {
        self.api_key
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(BackendError::NotConfigured)
    }

    /// Turn a non-success response into a [`BackendError::Api`]
    async fn api_error(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => match envelope.error.status {
                Some(code) => format!("{} ({})", envelope.error.message, code),
                None => envelope.error.message,
            },
            Err(_) if body.trim().is_empty() => "no error body".to_string(),
            Err(_) => body,
        };

        BackendError::Api { status, message }
    }
}

#[async_trait]
impl TextBackend for GeminiBackend {
    fn id(&self) -> &str {
        "gemini"
    }

    fn configure(&self, api_key: &str) -> Result<(), BackendError> {
        let mut guard = self
            .api_key
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(api_key.trim().to_string());
        Ok(())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, BackendError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http
            .client()
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(format!("Failed to reach Gemini: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(format!("Failed to parse JSON: {}", e)))?;

        if let Some(reason) = data
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(BackendError::Api {
                status: 200,
                message: format!("Prompt was blocked: {}", reason),
            });
        }

        let text = data
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }

        Ok(text)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models", self.base_url);

        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .client()
                .get(&url)
                .header("x-goog-api-key", &api_key)
                .query(&[("pageSize", MODELS_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| BackendError::Network(format!("Failed to list models: {}", e)))?;

            if !response.status().is_success() {
                return Err(Self::api_error(response).await);
            }

            let page: ModelsPage = response
                .json()
                .await
                .map_err(|e| BackendError::MalformedResponse(format!("Failed to parse JSON: {}", e)))?;

            models.extend(page.models.into_iter().map(|m| {
                let capabilities = m
                    .supported_generation_methods
                    .iter()
                    .fold(ModelCapabilities::empty(), |acc, method| {
                        acc | ModelCapabilities::from_method(method)
                    });
                ModelInfo {
                    id: m.name.trim_start_matches("models/").to_string(),
                    display_name: m.display_name,
                    capabilities,
                }
            }));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }
}

// ===== Generative Language API Types =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsPage {
    #[serde(default)]
    models: Vec<ApiModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiModel {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}
