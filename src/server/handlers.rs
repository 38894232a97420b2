//! Route handlers and the JSON error response.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::assembler::GenerateError;
use crate::models::{DocumentStats, GenerationRequest, SearchHit, SourceLink, WikiLang};
use crate::wiki::ReferenceError;

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub result: String,
    pub stats: DocumentStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_sources_used: Option<Vec<SourceLink>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<SearchHit>,
    pub lang: WikiLang,
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub api_ready: bool,
    pub model: Option<String>,
    pub last_error: Option<String>,
    pub key_exists: bool,
    pub key_length: usize,
}

pub(super) async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;

    let result = state.assembler.generate(&request).await?;
    let wiki_sources_used = Some(result.sources_used).filter(|s| !s.is_empty());

    Ok(Json(GenerateResponse {
        success: true,
        result: result.text,
        stats: result.stats,
        wiki_sources_used,
    }))
}

pub(super) async fn wiki_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload?;

    let query = request.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::bad_request("Search query must not be empty"));
    }

    let lang = request
        .lang
        .as_deref()
        .and_then(WikiLang::parse)
        .unwrap_or(state.default_lang);
    let limit = request.limit.unwrap_or(state.search_limit);

    let results = state.references.search(&query, lang, limit).await?;

    Ok(Json(SearchResponse {
        success: true,
        results,
        lang,
        query,
    }))
}

pub(super) async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let connection = state.connector().status();
    Json(StatusResponse {
        api_ready: connection.is_ready,
        model: connection.active_model,
        last_error: connection.last_error,
        key_exists: state.key_length > 0,
        key_length: state.key_length,
    })
}

#[derive(Debug)]
pub(super) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(value: GenerateError) -> Self {
        let status = if value.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %value, "Generation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: value.to_string(),
        }
    }
}

impl From<ReferenceError> for ApiError {
    fn from(value: ReferenceError) -> Self {
        let status = match value {
            ReferenceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => {
                tracing::error!(error = %value, "Wikipedia search failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: value.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::bad_request(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
