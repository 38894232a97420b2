//! Reference material from Wikipedia.
//!
//! The [`ReferenceSource`] trait is the seam the assembler and the HTTP layer
//! use to look up articles. [`WikipediaClient`] implements it against the
//! MediaWiki Action API; [`MockReferenceSource`] serves canned articles in
//! tests.
//!
//! # Budgets
//!
//! Article text is bounded twice. [`ReferenceSource::fetch_multiple`] takes
//! at most [`MAX_REFERENCE_ARTICLES`] titles and splits the total character
//! budget evenly between them; each article is then cut with
//! [`truncate_article`], which prefers a sentence boundary and marks the cut.
//!
//! ```rust
//! use autoconspect::wiki::truncate_article;
//!
//! let article = "Photosynthesis feeds plants. It runs on light and water. ".repeat(10);
//! let cut = truncate_article(&article, 120);
//! assert!(cut.chars().count() <= 120);
//! assert!(cut.ends_with("[…text truncated…]"));
//! ```

mod client;
pub mod mock;

pub use client::WikipediaClient;
pub use mock::MockReferenceSource;

use async_trait::async_trait;

use crate::models::{ReferenceMaterial, SearchHit, WikiLang};
use crate::utils::{char_count, truncate_at_sentence, truncate_chars};

/// Most articles fetched for one document
pub const MAX_REFERENCE_ARTICLES: usize = 5;

/// Combined character budget for all articles of one document
pub const DEFAULT_REFERENCE_BUDGET: usize = 25_000;

/// Appended to article text that was cut to fit its budget
pub const TRUNCATION_MARKER: &str = "\n\n[…text truncated…]";

/// Interface to an encyclopedia-like reference source
#[async_trait]
pub trait ReferenceSource: Send + Sync + std::fmt::Debug {
    /// Short identifier of the source (e.g. "wikipedia")
    fn id(&self) -> &str;

    /// Search article titles matching `query`
    async fn search(
        &self,
        query: &str,
        lang: WikiLang,
        limit: usize,
    ) -> Result<Vec<SearchHit>, ReferenceError>;

    /// Fetch one article as plain text, bounded to `max_chars`.
    ///
    /// Returns `Ok(None)` when the article does not exist or has no text.
    async fn fetch_article(
        &self,
        title: &str,
        lang: WikiLang,
        max_chars: usize,
    ) -> Result<Option<ReferenceMaterial>, ReferenceError>;

    /// Fetch several articles within a combined budget.
    ///
    /// Only the first [`MAX_REFERENCE_ARTICLES`] non-blank titles are used and
    /// `max_total_chars` is divided evenly among them. Articles that fail or
    /// do not exist are logged and skipped.
    async fn fetch_multiple(
        &self,
        titles: &[String],
        lang: WikiLang,
        max_total_chars: usize,
    ) -> Vec<ReferenceMaterial> {
        let titles: Vec<&str> = titles
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .take(MAX_REFERENCE_ARTICLES)
            .collect();

        if titles.is_empty() {
            return Vec::new();
        }

        let per_article = max_total_chars / titles.len();
        let mut articles = Vec::with_capacity(titles.len());

        for title in titles {
            match self.fetch_article(title, lang, per_article).await {
                Ok(Some(article)) => articles.push(article),
                Ok(None) => {
                    tracing::warn!(source = self.id(), title, "Reference article not found");
                }
                Err(e) => {
                    tracing::warn!(source = self.id(), title, error = %e, "Failed to fetch reference article");
                }
            }
        }

        articles
    }
}

/// Errors that can occur when talking to a reference source
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Error reported by the API
    #[error("API error: {0}")]
    Api(String),

    /// Response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ReferenceError {
    fn from(err: reqwest::Error) -> Self {
        ReferenceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ReferenceError {
    fn from(err: serde_json::Error) -> Self {
        ReferenceError::Parse(format!("JSON: {}", err))
    }
}

/// Cut article text to at most `max_chars` characters.
///
/// Text that fits is returned unchanged. Otherwise the text is cut at a
/// sentence boundary when one lies past 60% of the room left after the
/// [`TRUNCATION_MARKER`], and the marker is appended; the marker counts
/// toward `max_chars`.
pub fn truncate_article(content: &str, max_chars: usize) -> String {
    if char_count(content) <= max_chars {
        return content.to_string();
    }

    let marker_len = char_count(TRUNCATION_MARKER);
    if max_chars <= marker_len {
        return truncate_chars(content, max_chars).to_string();
    }

    let mut cut = truncate_at_sentence(content, max_chars - marker_len).to_string();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_article_fits() {
        assert_eq!(truncate_article("Short text.", 100), "Short text.");
    }

    #[test]
    fn test_truncate_article_marks_cut() {
        let content = "One. Two two two. Three three three three. ".repeat(20);
        let cut = truncate_article(&content, 200);

        assert!(char_count(&cut) <= 200);
        assert!(cut.ends_with(TRUNCATION_MARKER));
        let body = cut.trim_end_matches(TRUNCATION_MARKER);
        assert!(body.ends_with('.'));
    }

    #[test]
    fn test_truncate_article_tiny_budget() {
        let cut = truncate_article("abcdefghijklmnopqrstuvwxyz", 5);
        assert_eq!(cut, "abcde");
    }

    #[tokio::test]
    async fn test_fetch_multiple_caps_titles_and_budget() {
        let source = MockReferenceSource::new();
        let titles: Vec<String> = (1..=6).map(|i| format!("Article {}", i)).collect();
        for title in &titles {
            source.add_article(title, &"Lorem ipsum dolor sit amet. ".repeat(2_000));
        }

        let articles = source
            .fetch_multiple(&titles, WikiLang::Ru, DEFAULT_REFERENCE_BUDGET)
            .await;

        assert_eq!(articles.len(), MAX_REFERENCE_ARTICLES);
        let fetched = source.fetch_calls();
        assert_eq!(fetched.len(), MAX_REFERENCE_ARTICLES);
        assert!(fetched.iter().all(|(_, budget)| *budget == 5_000));
        assert!(!fetched.iter().any(|(title, _)| title == "Article 6"));

        let total: usize = articles.iter().map(|a| char_count(&a.content)).sum();
        assert!(total <= DEFAULT_REFERENCE_BUDGET);
    }

    #[tokio::test]
    async fn test_fetch_multiple_skips_missing_and_failing() {
        let source = MockReferenceSource::new();
        source.add_article("Present", "Some text.");
        source.fail_title("Broken");

        let titles = vec![
            "Present".to_string(),
            "Missing".to_string(),
            "Broken".to_string(),
            "  ".to_string(),
        ];
        let articles = source.fetch_multiple(&titles, WikiLang::En, 9_000).await;

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Present");
        // blank titles do not take a share of the budget
        assert!(source.fetch_calls().iter().all(|(_, budget)| *budget == 3_000));
    }
}
