//! Mock reference source for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{truncate_article, ReferenceError, ReferenceSource};
use crate::models::{ReferenceMaterial, SearchHit, WikiLang};

/// A reference source that serves predefined articles and search hits.
#[derive(Debug, Default)]
pub struct MockReferenceSource {
    articles: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    hits: Mutex<Option<Vec<SearchHit>>>,
    fetch_calls: Mutex<Vec<(String, usize)>>,
}

impl MockReferenceSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `title`.
    pub fn add_article(&self, title: &str, content: &str) {
        self.articles
            .lock()
            .unwrap()
            .insert(title.to_string(), content.to_string());
    }

    /// Make fetches of `title` fail with a network error.
    pub fn fail_title(&self, title: &str) {
        self.failing.lock().unwrap().insert(title.to_string());
    }

    /// Set the hits returned by every search.
    pub fn set_search_hits(&self, hits: Vec<SearchHit>) {
        *self.hits.lock().unwrap() = Some(hits);
    }

    /// Every `(title, max_chars)` pair passed to `fetch_article`, in order.
    pub fn fetch_calls(&self) -> Vec<(String, usize)> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReferenceSource for MockReferenceSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn search(
        &self,
        query: &str,
        _lang: WikiLang,
        limit: usize,
    ) -> Result<Vec<SearchHit>, ReferenceError> {
        if let Some(hits) = &*self.hits.lock().unwrap() {
            return Ok(hits.iter().take(limit).cloned().collect());
        }

        let query = query.to_lowercase();
        let articles = self.articles.lock().unwrap();
        let mut hits: Vec<SearchHit> = articles
            .iter()
            .filter(|(title, _)| title.to_lowercase().contains(&query))
            .map(|(title, content)| {
                SearchHit::new(title.clone(), content.chars().take(80).collect::<String>())
            })
            .collect();
        hits.sort_by(|a, b| a.title.cmp(&b.title));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn fetch_article(
        &self,
        title: &str,
        lang: WikiLang,
        max_chars: usize,
    ) -> Result<Option<ReferenceMaterial>, ReferenceError> {
        self.fetch_calls
            .lock()
            .unwrap()
            .push((title.to_string(), max_chars));

        if self.failing.lock().unwrap().contains(title) {
            return Err(ReferenceError::Network(format!("mock failure for {}", title)));
        }

        Ok(self.articles.lock().unwrap().get(title).map(|content| {
            ReferenceMaterial::new(
                title,
                truncate_article(content, max_chars),
                format!("https://{}.wikipedia.org/wiki/{}", lang.code(), title.replace(' ', "_")),
            )
        }))
    }
}
