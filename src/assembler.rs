//! Document assembly: references, prompt, generation, cover page and stats.

use std::sync::Arc;

use crate::composer::{compose_cover_page, PromptComposer, MAX_REFERENCE_CHARS};
use crate::connector::{ConnectorError, ModelConnector};
use crate::models::{
    combine_references, GenerationRequest, GenerationResult, ReferenceMaterial, SourceLink,
};
use crate::utils::truncate_at_sentence;
use crate::wiki::{ReferenceSource, DEFAULT_REFERENCE_BUDGET};

/// Errors returned by [`DocumentAssembler::generate`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// The request is unusable as given
    #[error("{0}")]
    Validation(String),

    /// No model is available
    #[error("{0}")]
    BackendUnavailable(String),

    /// The backend rejected this generation call
    #[error("{0}")]
    Generation(String),
}

impl GenerateError {
    /// Whether the caller can fix the request and retry
    pub fn is_client_error(&self) -> bool {
        matches!(self, GenerateError::Validation(_))
    }
}

impl From<ConnectorError> for GenerateError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::InvalidCredential(_) | ConnectorError::BackendUnavailable(_) => {
                GenerateError::BackendUnavailable(err.to_string())
            }
            ConnectorError::Generation(_) => GenerateError::Generation(err.to_string()),
        }
    }
}

/// Orchestrates one document generation
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    connector: Arc<ModelConnector>,
    references: Arc<dyn ReferenceSource>,
    composer: PromptComposer,
    reference_budget: usize,
}

impl DocumentAssembler {
    pub fn new(connector: Arc<ModelConnector>, references: Arc<dyn ReferenceSource>) -> Self {
        Self {
            connector,
            references,
            composer: PromptComposer::default(),
            reference_budget: DEFAULT_REFERENCE_BUDGET,
        }
    }

    /// Use a specific prompt composer (e.g. another output language)
    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Override the combined character budget for reference articles
    pub fn with_reference_budget(mut self, budget: usize) -> Self {
        self.reference_budget = budget;
        self
    }

    pub fn connector(&self) -> &Arc<ModelConnector> {
        &self.connector
    }

    /// Generate one document.
    ///
    /// Fails with [`GenerateError::Validation`] on a blank topic before any
    /// reference or backend call. Reference lookups never fail the request:
    /// when nothing can be fetched the prompt is built without reference
    /// material.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerateError> {
        let topic = request.trimmed_topic();
        if topic.is_empty() {
            return Err(GenerateError::Validation("Topic must not be empty".to_string()));
        }

        let mut sources_used: Vec<SourceLink> = Vec::new();
        let mut reference_text = String::new();

        if !request.reference_titles.is_empty() {
            let articles = self
                .references
                .fetch_multiple(
                    &request.reference_titles,
                    request.reference_lang,
                    self.reference_budget,
                )
                .await;

            if articles.is_empty() {
                tracing::warn!(
                    titles = ?request.reference_titles,
                    lang = %request.reference_lang,
                    "No reference material could be fetched, generating without it"
                );
            } else {
                let (text, links) = embed_references(&articles);
                tracing::info!(
                    fetched = articles.len(),
                    embedded = links.len(),
                    "Using reference articles"
                );
                reference_text = text;
                sources_used = links;
            }
        }

        let reference = Some(reference_text.as_str()).filter(|text| !text.trim().is_empty());
        if reference.is_none() {
            sources_used.clear();
        }

        let prompt = self.composer.compose_prompt(
            request.mode,
            topic,
            request.volume_tier,
            request.style_tier,
            reference,
        );

        tracing::info!(
            mode = %request.mode,
            volume = ?request.volume_tier,
            style = ?request.style_tier,
            grounded = reference.is_some(),
            "Generating document"
        );

        let body = self.connector.generate_text(&prompt).await?;

        let author = &request.author_info;
        let text = if author.include_title_page && request.mode.supports_cover_page() {
            let cover = compose_cover_page(topic, author, request.mode);
            format!("{}\n\n{}", cover, body)
        } else {
            body
        };

        Ok(GenerationResult::new(text, sources_used))
    }
}

/// Combine articles into the text embedded into the prompt.
///
/// The text is cut to [`MAX_REFERENCE_CHARS`]; only articles with content
/// left after the cut are reported as used.
fn embed_references(articles: &[ReferenceMaterial]) -> (String, Vec<SourceLink>) {
    let combined = combine_references(articles);
    let text = truncate_at_sentence(&combined, MAX_REFERENCE_CHARS).to_string();

    let links = articles
        .iter()
        .filter(|article| {
            let header = format!("=== {} ===\n", article.title);
            text.find(&header)
                .is_some_and(|start| text.len() > start + header.len())
        })
        .map(|article| article.link())
        .collect();

    (text, links)
}
