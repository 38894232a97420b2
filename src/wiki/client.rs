//! Wikipedia client for the MediaWiki Action API.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{truncate_article, ReferenceError, ReferenceSource};
use crate::models::{ReferenceMaterial, SearchHit, WikiLang};
use crate::utils::{clean_snippet, HttpClient, DEFAULT_USER_AGENT};

const MAX_SEARCH_LIMIT: usize = 50;

/// Wikipedia reference source
///
/// Searches use a short timeout; article fetches get a longer one since
/// extracts of long articles can be large.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    search_http: HttpClient,
    fetch_http: HttpClient,
    endpoint: Option<String>,
}

impl WikipediaClient {
    /// Create a client with the given timeouts
    pub fn new(
        user_agent: Option<&str>,
        search_timeout: Duration,
        fetch_timeout: Duration,
    ) -> Result<Self, ReferenceError> {
        let user_agent = user_agent.unwrap_or(DEFAULT_USER_AGENT);
        Ok(Self {
            search_http: HttpClient::with_user_agent(user_agent, search_timeout)?,
            fetch_http: HttpClient::with_user_agent(user_agent, fetch_timeout)?,
            endpoint: None,
        })
    }

    /// Send every request to `endpoint` regardless of language (proxies, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn api_url(&self, lang: WikiLang) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.wikipedia.org/w/api.php", lang.code()),
        }
    }

    /// Canonical article URL, used when the API does not report one
    fn article_url(title: &str, lang: WikiLang) -> String {
        format!(
            "https://{}.wikipedia.org/wiki/{}",
            lang.code(),
            urlencoding::encode(&title.replace(' ', "_"))
        )
    }

    async fn query<T: for<'de> Deserialize<'de>>(
        http: &HttpClient,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ReferenceError> {
        let response = http
            .client()
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| ReferenceError::Network(format!("Failed to query Wikipedia: {}", e)))?;

        if !response.status().is_success() {
            return Err(ReferenceError::Api(format!(
                "Wikipedia API returned status: {}",
                response.status()
            )));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ReferenceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        if let Some(error) = envelope.error {
            return Err(ReferenceError::Api(format!("{}: {}", error.code, error.info)));
        }

        envelope
            .query
            .ok_or_else(|| ReferenceError::Parse("response has no query section".to_string()))
    }
}

#[async_trait]
impl ReferenceSource for WikipediaClient {
    fn id(&self) -> &str {
        "wikipedia"
    }

    async fn search(
        &self,
        query: &str,
        lang: WikiLang,
        limit: usize,
    ) -> Result<Vec<SearchHit>, ReferenceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ReferenceError::InvalidRequest("empty search query".to_string()));
        }

        let limit = limit.clamp(1, MAX_SEARCH_LIMIT).to_string();
        let params = [
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", limit.as_str()),
            ("srprop", "snippet|size|wordcount"),
            ("format", "json"),
            ("utf8", "1"),
        ];

        let data: SearchQuery = Self::query(&self.search_http, &self.api_url(lang), &params).await?;

        Ok(data
            .search
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                snippet: clean_snippet(&item.snippet),
                wordcount: item.wordcount,
                pageid: item.pageid,
            })
            .collect())
    }

    async fn fetch_article(
        &self,
        title: &str,
        lang: WikiLang,
        max_chars: usize,
    ) -> Result<Option<ReferenceMaterial>, ReferenceError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let params = [
            ("action", "query"),
            ("titles", title),
            ("prop", "extracts|info"),
            ("explaintext", "1"),
            ("inprop", "url"),
            ("redirects", "1"),
            ("format", "json"),
            ("utf8", "1"),
        ];

        let data: PagesQuery = Self::query(&self.fetch_http, &self.api_url(lang), &params).await?;

        let Some((page_id, page)) = data.pages.into_iter().next() else {
            return Ok(None);
        };
        if page_id == "-1" || page.missing.is_some() {
            return Ok(None);
        }

        let content = page.extract.unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(None);
        }

        let title = page.title.unwrap_or_else(|| title.to_string());
        let url = page
            .fullurl
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| Self::article_url(&title, lang));

        Ok(Some(ReferenceMaterial {
            content: truncate_article(&content, max_chars),
            title,
            url,
        }))
    }
}

// ===== MediaWiki API Types =====

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    query: Option<T>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    wordcount: u64,
    #[serde(default)]
    pageid: u64,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: Option<String>,
    extract: Option<String>,
    fullurl: Option<String>,
    missing: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::char_count;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> WikipediaClient {
        WikipediaClient::new(None, Duration::from_secs(5), Duration::from_secs(5))
            .unwrap()
            .with_endpoint(format!("{}/w/api.php", server.url()))
    }

    #[tokio::test]
    async fn test_search_cleans_snippets() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list".into(), "search".into()),
                Matcher::UrlEncoded("srsearch".into(), "Фотосинтез".into()),
                Matcher::UrlEncoded("srlimit".into(), "3".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"query":{"search":[
                    {"title":"Фотосинтез","pageid":42,"wordcount":9000,"size":1,
                     "snippet":"<span class=\"searchmatch\">Фотосинтез</span> — процесс &quot;света&quot;"}
                ]}}"#,
            )
            .create_async()
            .await;

        let hits = client(&server)
            .search("Фотосинтез", WikiLang::Ru, 3)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Фотосинтез");
        assert_eq!(hits[0].pageid, 42);
        assert_eq!(hits[0].wordcount, 9000);
        assert_eq!(hits[0].snippet, "Фотосинтез — процесс \"света\"");
    }

    #[tokio::test]
    async fn test_search_rejects_empty_query() {
        let server = mockito::Server::new_async().await;
        let err = client(&server).search("  ", WikiLang::Ru, 5).await.unwrap_err();
        assert!(matches!(err, ReferenceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_search_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error":{"code":"badvalue","info":"Unrecognized value"}}"#)
            .create_async()
            .await;

        let err = client(&server).search("x", WikiLang::En, 5).await.unwrap_err();
        assert!(matches!(err, ReferenceError::Api(msg) if msg.contains("badvalue")));
    }

    #[tokio::test]
    async fn test_fetch_article_truncates_and_falls_back_to_built_url() {
        let mut server = mockito::Server::new_async().await;
        let extract = "Photosynthesis is a process. ".repeat(100);
        let body = serde_json::json!({
            "query": {
                "pages": {
                    "24544": {
                        "pageid": 24544,
                        "title": "Photosynthesis",
                        "extract": extract
                    }
                }
            }
        });
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("titles".into(), "Photosynthesis".into()),
                Matcher::UrlEncoded("prop".into(), "extracts|info".into()),
            ]))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let article = client(&server)
            .fetch_article("Photosynthesis", WikiLang::En, 500)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(article.title, "Photosynthesis");
        assert_eq!(article.url, "https://en.wikipedia.org/wiki/Photosynthesis");
        assert!(char_count(&article.content) <= 500);
        assert!(article.content.ends_with("[…text truncated…]"));
    }

    #[tokio::test]
    async fn test_fetch_missing_article() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"query":{"pages":{"-1":{"ns":0,"title":"Nope","missing":""}}}}"#)
            .create_async()
            .await;

        let article = client(&server)
            .fetch_article("Nope", WikiLang::Ru, 1000)
            .await
            .unwrap();
        assert!(article.is_none());
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = client(&server)
            .fetch_article("Anything", WikiLang::Ru, 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, ReferenceError::Api(_)));
    }

    #[test]
    fn test_article_url_encoding() {
        assert_eq!(
            WikipediaClient::article_url("Солнечная система", WikiLang::Ru),
            "https://ru.wikipedia.org/wiki/%D0%A1%D0%BE%D0%BB%D0%BD%D0%B5%D1%87%D0%BD%D0%B0%D1%8F_%D1%81%D0%B8%D1%81%D1%82%D0%B5%D0%BC%D0%B0"
        );
    }
}
